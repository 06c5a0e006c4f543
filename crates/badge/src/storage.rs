//! # Storages
//!
//! Wallet targets a credential can be delivered to. Each storage declares
//! its device type, its preferred data model, the shape of the issuance
//! request it sends, and how a wallet is pointed at an issuance line (deep
//! link or redirect).

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;
use crate::composition::DataModel;
use crate::config::Routes;
use crate::context::RequestContext;
use crate::error::invalid;
use crate::issuance::IssuanceLine;

const SUBJECT_ID_MAX_LEN: usize = 255;

/// Device class of a storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageType {
    /// A mobile wallet app.
    Mobile,

    /// A web wallet.
    Web,

    /// Used internally; never offered to users.
    Internal,
}

/// A credential storage (wallet).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Storage {
    /// Learner Credential Wallet by the Digital Credentials Consortium.
    LcWallet,

    /// A configurable web wallet.
    WebWallet(WebWallet),

    /// Status List 2021 self-issuance.
    StatusList,
}

/// Settings for a web wallet.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct WebWallet {
    /// Storage identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// URL the user is redirected to.
    pub url: String,

    /// Data model the wallet accepts.
    pub data_model: DataModel,
}

impl Storage {
    /// Learner Credential Wallet identifier.
    pub const LC_WALLET_ID: &str = "lc_wallet";
    /// Status list storage identifier.
    pub const STATUS_LIST_ID: &str = "vc_status_list_2021";

    const LC_WALLET_DEEP_LINK: &str = "dccrequest://request";

    /// Storage identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::LcWallet => Self::LC_WALLET_ID,
            Self::WebWallet(web) => &web.id,
            Self::StatusList => Self::STATUS_LIST_ID,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::LcWallet => "Learner Credential Wallet",
            Self::WebWallet(web) => &web.name,
            Self::StatusList => "Status List 2021",
        }
    }

    /// Device class.
    #[must_use]
    pub const fn storage_type(&self) -> StorageType {
        match self {
            Self::LcWallet => StorageType::Mobile,
            Self::WebWallet(_) => StorageType::Web,
            Self::StatusList => StorageType::Internal,
        }
    }

    /// Whether the storage is a mobile app.
    #[must_use]
    pub const fn is_mobile(&self) -> bool {
        matches!(self.storage_type(), StorageType::Mobile)
    }

    /// Whether the storage is a web wallet.
    #[must_use]
    pub const fn is_web(&self) -> bool {
        matches!(self.storage_type(), StorageType::Web)
    }

    /// The data model credentials for this storage are composed with.
    #[must_use]
    pub const fn data_model(&self) -> DataModel {
        match self {
            Self::LcWallet => DataModel::OpenBadges,
            Self::WebWallet(web) => web.data_model,
            Self::StatusList => DataModel::StatusList,
        }
    }

    /// Play Store link for the wallet app.
    #[must_use]
    pub const fn app_link_android(&self) -> Option<&'static str> {
        match self {
            Self::LcWallet => Some("https://play.google.com/store/apps/details?id=app.lcw"),
            _ => None,
        }
    }

    /// App Store link for the wallet app.
    #[must_use]
    pub const fn app_link_ios(&self) -> Option<&'static str> {
        match self {
            Self::LcWallet => {
                Some("https://apps.apple.com/app/learner-credential-wallet/id1590615710")
            }
            _ => None,
        }
    }

    /// Link that opens the wallet on the given issuance line. Mobile deep
    /// links embed absolute URLs and so require a request context.
    ///
    /// # Errors
    ///
    /// Returns an error if the query string cannot be encoded.
    pub fn deeplink_url(
        &self, line: &IssuanceLine, routes: &Routes, ctx: Option<&RequestContext>,
    ) -> Result<Option<String>> {
        match self {
            Self::LcWallet => {
                let Some(ctx) = ctx else {
                    return Ok(None);
                };
                let request_url = ctx.issue_url(routes, &line.uuid);
                let challenge = line.uuid.to_string();
                let params = [
                    ("issuer", line.issuer_id.as_str()),
                    ("vc_request_url", request_url.as_str()),
                    ("auth_type", "bearer"),
                    ("challenge", challenge.as_str()),
                    ("vp_version", "1.1"),
                ];
                let query = serde_urlencoded::to_string(params).context("encoding deep link")?;
                Ok(Some(format!("{}?{query}", Self::LC_WALLET_DEEP_LINK)))
            }
            Self::WebWallet(web) => Ok(Some(web.url.clone())),
            Self::StatusList => Ok(None),
        }
    }

    /// Validate a wallet's issuance request and apply accepted fields to
    /// the issuance line.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` naming the offending field.
    pub fn validate(&self, line: &mut IssuanceLine, data: &Map<String, Value>) -> Result<()> {
        match self {
            Self::LcWallet => {
                let request: LcWalletRequest = parse(data)?;
                line.subject_id = check_subject_id(&request.holder, "holder")?;
            }
            Self::WebWallet(_) | Self::StatusList => {
                let request: IssuanceRequest = parse(data)?;
                if let Some(subject_id) = request.subject_id {
                    line.subject_id = check_subject_id(&subject_id, "subject_id")?;
                }
                if request.expiration_date.is_some() {
                    line.expiration_date = request.expiration_date;
                }
            }
        }
        Ok(())
    }
}

/// Request sent by the Learner Credential Wallet.
#[derive(Debug, Deserialize)]
struct LcWalletRequest {
    holder: String,
}

/// Request shape for storages without a specific one.
#[derive(Debug, Default, Deserialize)]
struct IssuanceRequest {
    subject_id: Option<String>,
    expiration_date: Option<DateTime<Utc>>,
}

fn parse<T: for<'de> Deserialize<'de>>(data: &Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(data.clone())).map_err(|e| invalid!("{e}"))
}

fn check_subject_id(subject_id: &str, field: &str) -> Result<String> {
    if subject_id.is_empty() {
        return Err(invalid!("`{field}`: This field may not be blank."));
    }
    if subject_id.chars().count() > SUBJECT_ID_MAX_LEN {
        return Err(invalid!(
            "`{field}`: Ensure this field has no more than {SUBJECT_ID_MAX_LEN} characters."
        ));
    }
    Ok(subject_id.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::Error;
    use crate::issuance::LineKey;

    fn line() -> IssuanceLine {
        let key = LineKey::new(Storage::LC_WALLET_ID, Some(Uuid::new_v4()), "did:key:z6Mk");
        IssuanceLine::new(&key, DataModel::OpenBadges)
    }

    #[test]
    fn lc_wallet() {
        let storage = Storage::LcWallet;

        assert_eq!(storage.id(), "lc_wallet");
        assert!(storage.is_mobile());
        assert!(!storage.is_web());
        assert_eq!(storage.data_model(), DataModel::OpenBadges);
        assert!(storage.app_link_android().is_some());
        assert!(storage.app_link_ios().is_some());
    }

    #[test]
    fn lc_wallet_deeplink() {
        let line = line();
        let routes = Routes::default();
        let ctx = RequestContext::new("https://credentials.example.com");

        let link = Storage::LcWallet
            .deeplink_url(&line, &routes, Some(&ctx))
            .expect("should build")
            .expect("should have link");

        assert!(link.starts_with("dccrequest://request?issuer=did%3Akey%3Az6Mk&vc_request_url="));
        assert!(link.contains("&auth_type=bearer&"));
        assert!(link.contains(&format!("&challenge={}&", line.uuid)));
        assert!(link.ends_with("&vp_version=1.1"));

        let none = Storage::LcWallet.deeplink_url(&line, &routes, None).expect("should build");
        assert_eq!(none, None);
    }

    #[test]
    fn lc_wallet_request() {
        let mut line = line();
        let data = json!({"holder": "did:example:holder"});
        let Value::Object(data) = data else { unreachable!() };

        Storage::LcWallet.validate(&mut line, &data).expect("should validate");
        assert_eq!(line.subject_id, "did:example:holder");
    }

    #[test]
    fn lc_wallet_missing_holder() {
        let mut line = line();
        let Value::Object(data) = json!({"subject_id": "did:example:holder"}) else {
            unreachable!()
        };

        let Err(Error::InvalidRequest(msg)) = Storage::LcWallet.validate(&mut line, &data) else {
            panic!("should fail");
        };
        assert!(msg.contains("holder"));
    }

    #[test]
    fn subject_id_too_long() {
        let mut line = line();
        let Value::Object(data) = json!({"holder": "x".repeat(256)}) else { unreachable!() };

        assert!(Storage::LcWallet.validate(&mut line, &data).is_err());
        assert!(line.subject_id.is_empty());
    }

    #[test]
    fn web_wallet() {
        let storage = Storage::WebWallet(WebWallet {
            id: "web".to_string(),
            name: "Web Wallet".to_string(),
            url: "https://wallet.example.com/receive".to_string(),
            data_model: DataModel::VerifiableCredentials,
        });
        let mut line = line();

        assert!(storage.is_web());
        assert_eq!(storage.data_model(), DataModel::VerifiableCredentials);
        assert_eq!(
            storage.deeplink_url(&line, &Routes::default(), None).expect("should build").as_deref(),
            Some("https://wallet.example.com/receive")
        );

        let Value::Object(data) = json!({
            "subject_id": "did:example:holder",
            "expiration_date": "2030-01-01T00:00:00Z"
        }) else {
            unreachable!()
        };
        storage.validate(&mut line, &data).expect("should validate");
        assert_eq!(line.subject_id, "did:example:holder");
        assert!(line.expiration_date.is_some());
    }

    #[test]
    fn config_shape() {
        let storages: Vec<Storage> = serde_json::from_value(json!([
            {"kind": "lc_wallet"},
            {"kind": "web_wallet", "id": "web", "name": "Web", "url": "https://w.example", "data_model": "vc"}
        ]))
        .expect("should deserialize");

        assert_eq!(storages[0], Storage::LcWallet);
        assert_eq!(storages[1].id(), "web");
    }
}
