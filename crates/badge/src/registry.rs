//! # Issuer Registry
//!
//! Resolves signing identities. Issuers are flat and independently keyed;
//! the most recently created enabled issuer acts as the default.

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::Config;
use crate::error::{Error, invalid, not_found};
use crate::proof::IssuerKey;
use crate::provider::IssuerStore;

/// A signing identity.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuerConfiguration {
    /// Issuer DID.
    pub issuer_id: String,

    /// Issuer signing key.
    pub issuer_key: IssuerKey,

    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_name: Option<String>,

    /// Whether the issuer may sign new credentials.
    pub enabled: bool,

    /// When the issuer was first registered.
    pub created: DateTime<Utc>,
}

/// Register the configured default issuer as enabled. An existing issuer
/// with the same id is updated in place and keeps its creation time.
///
/// # Errors
///
/// Returns `Error::Configuration` if the default issuer has no key, or a
/// server error if the store fails.
pub async fn create_issuers(
    provider: &impl IssuerStore, config: &Config,
) -> Result<IssuerConfiguration> {
    let settings = &config.default_issuer;
    let Some(issuer_key) = settings.key.clone() else {
        return Err(Error::Configuration("Default issuer `key` is mandatory.".to_string()));
    };
    if settings.id.is_empty() {
        return Err(Error::Configuration("Default issuer `id` is mandatory.".to_string()));
    }

    let existing = IssuerStore::get(provider, &settings.id).await.context("fetching issuer")?;
    let issuer = IssuerConfiguration {
        issuer_id: settings.id.clone(),
        issuer_key,
        issuer_name: settings.name.clone(),
        enabled: true,
        created: existing.map_or_else(Utc::now, |e| e.created),
    };

    IssuerStore::put(provider, &issuer).await.context("saving issuer")?;
    tracing::debug!("registered issuer {}", issuer.issuer_id);

    Ok(issuer)
}

/// Ids of all enabled issuers, in creation order.
///
/// # Errors
///
/// Returns a server error if the store fails.
pub async fn active_issuers(provider: &impl IssuerStore) -> Result<Vec<String>> {
    let issuers = IssuerStore::list(provider).await.context("listing issuers")?;
    Ok(issuers.into_iter().filter(|i| i.enabled).map(|i| i.issuer_id).collect())
}

/// Ids of all issuers, enabled or not.
///
/// # Errors
///
/// Returns a server error if the store fails.
pub async fn issuer_ids(provider: &impl IssuerStore) -> Result<Vec<String>> {
    let issuers = IssuerStore::list(provider).await.context("listing issuers")?;
    Ok(issuers.into_iter().map(|i| i.issuer_id).collect())
}

/// The most recently created enabled issuer.
///
/// # Errors
///
/// Returns `Error::Configuration` when no issuer is enabled.
pub async fn default_issuer(provider: &impl IssuerStore) -> Result<IssuerConfiguration> {
    let issuers = IssuerStore::list(provider).await.context("listing issuers")?;
    issuers.into_iter().filter(|i| i.enabled).next_back().ok_or_else(|| {
        Error::Configuration(
            "There are no enabled Issuance Configurations for some reason! At least one must be always active."
                .to_string(),
        )
    })
}

/// Look up an issuer by id. An unknown id is not an error.
///
/// # Errors
///
/// Returns a server error if the store fails.
pub async fn issuer(
    provider: &impl IssuerStore, issuer_id: &str,
) -> Result<Option<IssuerConfiguration>> {
    Ok(IssuerStore::get(provider, issuer_id).await.context("fetching issuer")?)
}

/// Enable or disable an issuer.
///
/// Disabling the last enabled issuer is rejected. The check reads the
/// current issuers and then writes; it is not atomic, so two concurrent
/// disables can still leave no issuer enabled.
///
/// # Errors
///
/// Returns `Error::NotFound` for an unknown issuer and
/// `Error::InvalidRequest` when disabling the last enabled issuer.
pub async fn set_enabled(
    provider: &impl IssuerStore, issuer_id: &str, enabled: bool,
) -> Result<IssuerConfiguration> {
    let Some(mut issuer) = issuer(provider, issuer_id).await? else {
        return Err(not_found!("no issuer {issuer_id}"));
    };

    if !enabled && issuer.enabled {
        let active = active_issuers(provider).await?;
        if active.iter().all(|id| id == issuer_id) {
            return Err(invalid!("At least one Issuer must be always enabled!"));
        }
    }

    issuer.enabled = enabled;
    IssuerStore::put(provider, &issuer).await.context("saving issuer")?;
    Ok(issuer)
}

/// Remove an issuer configuration.
///
/// # Errors
///
/// Returns `Error::NotFound` for an unknown issuer.
pub async fn remove_issuer(provider: &impl IssuerStore, issuer_id: &str) -> Result<()> {
    if issuer(provider, issuer_id).await?.is_none() {
        return Err(not_found!("no issuer {issuer_id}"));
    }
    IssuerStore::delete(provider, issuer_id).await.context("removing issuer")?;
    tracing::debug!("removed issuer {issuer_id}");
    Ok(())
}
