//! # Configuration
//!
//! Deployment configuration for the issuance core. A `Config` is built once
//! at startup (typically from a JSON file) and passed to registry, composer
//! and issuer operations by reference.

use std::path::Path;

use anyhow::Context as _;
use credibil_badge_status::DEFAULT_LENGTH;
use serde::{Deserialize, Serialize};

use crate::composition::DataModel;
use crate::error::Error;
use crate::proof::IssuerKey;
use crate::storage::Storage;

/// Issuance configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// The system-level issuer created at bootstrap.
    pub default_issuer: IssuerSettings,

    /// Data models offered to users, in order of preference.
    pub data_models: Vec<DataModel>,

    /// Storages (wallets) offered to users.
    pub storages: Vec<Storage>,

    /// Number of slots in each issuer's status list.
    pub status_list_length: usize,

    /// URL path templates for published endpoints.
    pub routes: Routes,

    /// Upper bound, in seconds, on each signing or verification call.
    pub signing_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_issuer: IssuerSettings::default(),
            data_models: vec![DataModel::OpenBadges, DataModel::VerifiableCredentials],
            storages: vec![Storage::LcWallet],
            status_list_length: DEFAULT_LENGTH,
            routes: Routes::default(),
            signing_timeout_secs: 30,
        }
    }
}

/// Static settings for the default issuer.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerSettings {
    /// Issuer DID.
    pub id: String,

    /// Issuer signing key.
    pub key: Option<IssuerKey>,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// URL path templates. `{issuer_id}` and `{uuid}` are substituted when
/// building absolute URLs.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Routes {
    /// Path of an issuer's status list credential.
    pub status_list: String,

    /// Path a wallet posts its issuance request to.
    pub issue: String,
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            status_list: "/verifiable_credentials/api/v1/status-list/2021/v1/{issuer_id}/"
                .to_string(),
            issue: "/verifiable_credentials/api/v1/credentials/issue/{uuid}/".to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from a JSON string. Missing fields take their
    /// default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parsing configuration")
    }

    /// Load configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is malformed.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Check the configuration is usable for issuance.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` listing every problem found.
    pub fn check(&self) -> Result<(), Error> {
        let mut problems = vec![];

        if self.data_models.is_empty() {
            problems.push("No default data models defined.");
        }
        if self.storages.is_empty() {
            problems.push("No default storages defined.");
        }
        if self.default_issuer.id.is_empty() {
            problems.push("Default issuer `id` is mandatory.");
        }
        if self.default_issuer.key.is_none() {
            problems.push("Default issuer `key` is mandatory.");
        }

        if problems.is_empty() {
            return Ok(());
        }
        Err(Error::Configuration(problems.join(" ")))
    }

    /// Find a storage by id, including the internal status list storage.
    #[must_use]
    pub fn storage(&self, storage_id: &str) -> Option<Storage> {
        self.storages_all().into_iter().find(|s| s.id() == storage_id)
    }

    /// Storages offered to users. The status list storage is internal and
    /// never listed.
    #[must_use]
    pub fn available_storages(&self) -> Vec<Storage> {
        self.storages.iter().filter(|s| !matches!(s, Storage::StatusList)).cloned().collect()
    }

    /// Resolve a configured data model by id. The status list model is
    /// always available.
    #[must_use]
    pub fn data_model(&self, model_id: &str) -> Option<DataModel> {
        DataModel::from_id(model_id)
            .filter(|m| *m == DataModel::StatusList || self.data_models.contains(m))
    }

    fn storages_all(&self) -> Vec<Storage> {
        let mut storages = self.available_storages();
        storages.push(Storage::StatusList);
        storages
    }
}
