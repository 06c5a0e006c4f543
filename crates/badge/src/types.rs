//! # Request and Response Types
//!
//! Types exchanged with the API layer by the request handlers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Start issuing an achievement to a wallet.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InitIssuanceRequest {
    /// The achievement to issue. Must be a UUID.
    pub credential_uuid: String,

    /// The wallet to issue to.
    pub storage_id: String,

    /// The issuer to sign with. Defaults to the default issuer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
}

/// Hand-off details for the user's wallet.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct InitIssuanceResponse {
    /// Link opening the wallet on the issuance line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,

    /// The deep link as a PNG QR code data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,

    /// Set for web wallets: the user should be redirected to the deep link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<bool>,

    /// Play Store link for mobile wallets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_link_android: Option<String>,

    /// App Store link for mobile wallets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_link_ios: Option<String>,
}

/// A wallet's request for the credential of an issuance line.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssueCredentialRequest {
    /// The issuance line.
    pub issuance_line_uuid: Uuid,

    /// Storage-specific request data, e.g. `{"holder": "did:..."}`.
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// A signed credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct IssueCredentialResponse(pub Value);

/// Request an issuer's status list credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusListRequest {
    /// The issuer.
    pub issuer_id: String,
}

/// A signed status list credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StatusListResponse(pub Value);

/// List the storages offered to users.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StoragesRequest;

/// Storages offered to users.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct StoragesResponse(pub Vec<StorageInfo>);

/// Storage summary.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageInfo {
    /// Storage identifier.
    pub id: String,

    /// Display name.
    pub name: String,
}
