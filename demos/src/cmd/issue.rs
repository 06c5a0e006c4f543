//! Issuance walkthrough
//!
//! Issues an achievement to the Learner Credential Wallet, revokes it, and
//! prints the issuer's status list. Configuration is read from the file
//! named by the first argument, or generated.

use anyhow::{Context, Result, anyhow};
use credibil_badge::achievement::AchievementStatus;
use credibil_badge::config::Config;
use credibil_badge::context::RequestContext;
use credibil_badge::types::{InitIssuanceRequest, IssueCredentialRequest, StatusListRequest};
use credibil_badge::{Request, registry};
use serde_json::{Value, json};
use test_utils::{Platform, data};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const BASE_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::DEBUG).finish();
    tracing::subscriber::set_global_default(subscriber).expect("should set subscriber");

    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(path)?,
        None => data::config(),
    };
    config.check()?;

    let provider = Platform::new();
    registry::create_issuers(&provider, &config).await?;
    let issuer_id = config.default_issuer.id.clone();

    let achievement = data::program();
    provider.add_achievement(achievement.clone());

    // --------------------------------------------------
    // The learner asks for their certificate in a wallet
    // --------------------------------------------------
    let request = Request {
        body: InitIssuanceRequest {
            credential_uuid: achievement.uuid.to_string(),
            storage_id: "lc_wallet".to_string(),
            issuer_id: None,
        },
        headers: RequestContext::new(BASE_URL),
    };
    let response = credibil_badge::handle(&config, request, &provider).await?;
    let deeplink = response.deeplink.clone().ok_or_else(|| anyhow!("no deep link"))?;
    tracing::info!("deep link: {deeplink}");

    // --------------------------------------------------
    // The wallet follows the deep link
    // --------------------------------------------------
    let challenge = deeplink
        .split('&')
        .find_map(|p| p.strip_prefix("challenge="))
        .context("deep link has no challenge")?;
    let Value::Object(data) = json!({"holder": "did:example:learner"}) else {
        return Err(anyhow!("holder should be an object"));
    };
    let request = Request {
        body: IssueCredentialRequest { issuance_line_uuid: challenge.parse()?, data },
        headers: RequestContext::new(BASE_URL),
    };
    let response = credibil_badge::handle(&config, request, &provider).await?;
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    let index = response.body.0["credentialStatus"]["statusListIndex"]
        .as_str()
        .context("credential has no status")?
        .parse::<usize>()?;

    // --------------------------------------------------
    // The achievement is revoked
    // --------------------------------------------------
    provider.set_achievement_status(&achievement.uuid, AchievementStatus::Revoked).await?;

    let request = Request {
        body: StatusListRequest { issuer_id },
        headers: RequestContext::new(BASE_URL),
    };
    let response = credibil_badge::handle(&config, request, &provider).await?;
    let encoded = response.body.0["credentialSubject"]["encodedList"]
        .as_str()
        .context("status list has no encoded list")?;

    let revoked = credibil_badge_status::is_revoked(encoded, index)?;
    tracing::info!("credential at index {index} revoked: {revoked}");

    Ok(())
}
