//! # Init Issuance Endpoint
//!
//! Starts issuing an achievement to a wallet. The response hands the user
//! off to the wallet: mobile wallets get a deep link, QR code and app store
//! links; web wallets get a redirect.

use std::io::Cursor;

use anyhow::Context as _;
use base64ct::{Base64, Encoding};
use qrcode::QrCode;
use uuid::Uuid;

use crate::achievement::Achievement;
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{invalid, not_found};
use crate::handlers::{Body, Error, Handler, Request, Response, Result};
use crate::issuance::{CredentialIssuer, IssuanceLine};
use crate::provider::{Achievements, Provider};
use crate::types::{InitIssuanceRequest, InitIssuanceResponse};

async fn init_issuance(
    config: &Config, ctx: &RequestContext, provider: &impl Provider, request: InitIssuanceRequest,
) -> Result<InitIssuanceResponse> {
    let achievement = verify(provider, &request).await?;

    let Some(storage) = config.storage(&request.storage_id) else {
        let available =
            config.available_storages().iter().map(|s| s.id().to_string()).collect::<Vec<_>>();
        return Err(not_found!(
            "storage {} is not available, expected one of: {}",
            request.storage_id,
            available.join(", ")
        ));
    };

    let line = init_line(provider, config, &request, &achievement).await?;
    let deeplink = storage.deeplink_url(&line, &config.routes, Some(ctx))?;

    let mut response = InitIssuanceResponse::default();
    if storage.is_web() {
        response.redirect = Some(true);
    }
    if storage.is_mobile() {
        response.app_link_android = storage.app_link_android().map(ToString::to_string);
        response.app_link_ios = storage.app_link_ios().map(ToString::to_string);
    }
    if let Some(link) = &deeplink {
        response.qrcode = Some(to_qrcode(link)?);
    }
    response.deeplink = deeplink;

    Ok(response)
}

impl<P: Provider> Handler<InitIssuanceResponse, P>
    for Request<InitIssuanceRequest, RequestContext>
{
    type Error = Error;

    async fn handle(self, config: &Config, provider: &P) -> Result<Response<InitIssuanceResponse>> {
        Ok(init_issuance(config, &self.headers, provider, self.body).await?.into())
    }
}

impl Body for InitIssuanceRequest {}

async fn verify(
    provider: &impl Provider, request: &InitIssuanceRequest,
) -> Result<Achievement> {
    tracing::debug!("init_issuance::verify");

    if request.credential_uuid.is_empty() {
        return Err(invalid!("`credential_uuid`: Mandatory data is missing"));
    }
    let Ok(uuid) = Uuid::parse_str(&request.credential_uuid) else {
        return Err(invalid!("`credential_uuid`: Must be a valid UUID"));
    };
    if request.storage_id.is_empty() {
        return Err(invalid!("`storage_id`: Mandatory data is missing"));
    }

    let achievement =
        Achievements::achievement(provider, &uuid).await.context("fetching achievement")?;
    achievement.ok_or_else(|| not_found!("achievement {uuid} not found"))
}

// Two first-time requests for the same issuer can race for a status index.
// The loser gets `Conflict` and succeeds on retry.
async fn init_line(
    provider: &impl Provider, config: &Config, request: &InitIssuanceRequest,
    achievement: &Achievement,
) -> Result<IssuanceLine> {
    let issuer_id = request.issuer_id.as_deref();
    let storage_id = &request.storage_id;

    match CredentialIssuer::init(provider, config, storage_id, Some(achievement), issuer_id).await {
        Err(Error::Conflict(e)) => {
            tracing::debug!("init_issuance::retrying after conflict: {e}");
            CredentialIssuer::init(provider, config, storage_id, Some(achievement), issuer_id).await
        }
        result => result,
    }
}

/// Render `link` as a PNG QR code data URL.
fn to_qrcode(link: &str) -> Result<String> {
    let qr_code = QrCode::new(link).context("failed to create QR code")?;

    // write image to buffer
    let img_buf = qr_code.render::<image::Luma<u8>>().build();
    let mut buffer: Vec<u8> = Vec::new();
    let mut writer = Cursor::new(&mut buffer);
    img_buf.write_to(&mut writer, image::ImageFormat::Png).context("failed to create QR code")?;

    // base64 encode image
    Ok(format!("data:image/png;base64,{}", Base64::encode_string(buffer.as_slice())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qrcode_data_url() {
        let qrcode =
            to_qrcode("dccrequest://request?issuer=did%3Akey%3Az6Mk").expect("should render");
        assert!(qrcode.starts_with("data:image/png;base64,"));
    }
}
