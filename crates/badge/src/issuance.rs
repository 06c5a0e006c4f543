//! # Issuance
//!
//! Issuance lines record one signing attempt for an (achievement, storage,
//! issuer) combination. The [`CredentialIssuer`] drives a line through
//! composition, signing, verification and finalization; the status list
//! functions derive each issuer's revocation list from its lines.

mod issuer;
mod status_list;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::issuer::{CredentialIssuer, IssuanceState};
pub use self::status_list::{
    indices_for_status, issue_status_list, next_status_index, regenerate_encoded_status_sequence,
};
use crate::Result;
use crate::achievement::AchievementStatus;
use crate::composition::DataModel;
use crate::provider::IssuanceStore;

/// One signing attempt or record for an achievement and storage.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssuanceLine {
    /// Line identifier.
    pub uuid: Uuid,

    /// The achievement being issued. Absent for status list self-issuance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievement: Option<Uuid>,

    /// Set once the credential has been signed and verified.
    pub processed: bool,

    /// DID of the signing issuer.
    pub issuer_id: String,

    /// Target storage.
    pub storage_id: String,

    /// DID of the credential subject, set by request validation.
    pub subject_id: String,

    /// Data model the credential is composed with.
    pub data_model_id: String,

    /// When the credential expires.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,

    /// Position in the issuer's status list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_index: Option<usize>,

    /// Cached status of the achievement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AchievementStatus>,

    /// When the line was created.
    pub created: DateTime<Utc>,

    /// When the line was last written.
    pub modified: DateTime<Utc>,
}

impl IssuanceLine {
    /// Create a line for `key`. Lines without an achievement are processed
    /// from the start.
    #[must_use]
    pub fn new(key: &LineKey, model: DataModel) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            achievement: key.achievement,
            processed: key.achievement.is_none(),
            issuer_id: key.issuer_id.clone(),
            storage_id: key.storage_id.clone(),
            subject_id: String::new(),
            data_model_id: model.id().to_string(),
            expiration_date: None,
            status_index: None,
            status: None,
            created: now,
            modified: now,
        }
    }

    /// The line's identifier as a URN.
    #[must_use]
    pub fn urn(&self) -> String {
        self.uuid.urn().to_string()
    }

    /// The key identifying the line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            storage_id: self.storage_id.clone(),
            achievement: self.achievement,
            issuer_id: self.issuer_id.clone(),
        }
    }
}

/// Identifies the issuance line for an (storage, achievement, issuer)
/// combination.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct LineKey {
    /// Target storage.
    pub storage_id: String,

    /// The achievement, if any.
    pub achievement: Option<Uuid>,

    /// Signing issuer.
    pub issuer_id: String,
}

impl LineKey {
    /// Create a key.
    #[must_use]
    pub fn new(
        storage_id: impl Into<String>, achievement: Option<Uuid>, issuer_id: impl Into<String>,
    ) -> Self {
        Self { storage_id: storage_id.into(), achievement, issuer_id: issuer_id.into() }
    }

    /// Whether `line` is the line for this key.
    #[must_use]
    pub fn matches(&self, line: &IssuanceLine) -> bool {
        line.storage_id == self.storage_id
            && line.achievement == self.achievement
            && line.issuer_id == self.issuer_id
    }
}

/// Mirror an achievement's new status onto every issuance line referencing
/// it. Call whenever an achievement's status changes.
///
/// # Errors
///
/// Returns a server error if the store fails.
pub async fn update_issuance_lines_status(
    provider: &impl IssuanceStore, achievement: &Uuid, status: AchievementStatus,
) -> Result<usize> {
    let updated = IssuanceStore::update_status(provider, achievement, status)
        .await
        .context("updating issuance line status")?;
    tracing::debug!("updated status of {updated} issuance line(s) for {achievement} to {status:?}");
    Ok(updated)
}
