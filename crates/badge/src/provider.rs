//! # Provider Traits
//!
//! This module defines the `Provider` trait and its associated traits, which
//! are implemented by library users to supply persistence, achievement data
//! and the cryptographic proof suite to the issuance process.
//!
//! Store methods return `anyhow::Result`. Implementations signal a
//! violation of the `(issuer_id, status_index)` uniqueness constraint by
//! returning an [`Error::Conflict`](crate::Error::Conflict) inside the
//! `anyhow` error so it can be recovered by callers.

use std::future::Future;

use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

use crate::achievement::{Achievement, AchievementStatus};
use crate::issuance::{IssuanceLine, LineKey};
pub use crate::proof::{IssuerKey, ProofOptions, VerificationResult};
use crate::registry::IssuerConfiguration;

/// Issuance Provider trait.
pub trait Provider: IssuerStore + IssuanceStore + Achievements + Suite + Clone {}

/// A blanket implementation for `Provider` trait so that any type implementing
/// the required super traits is considered a `Provider`.
impl<T> Provider for T where T: IssuerStore + IssuanceStore + Achievements + Suite + Clone {}

/// Persistence for issuer configurations.
pub trait IssuerStore: Send + Sync {
    /// Insert or replace an issuer configuration.
    fn put(&self, issuer: &IssuerConfiguration) -> impl Future<Output = Result<()>> + Send;

    /// Fetch an issuer configuration by id.
    fn get(&self, issuer_id: &str)
    -> impl Future<Output = Result<Option<IssuerConfiguration>>> + Send;

    /// All issuer configurations, in creation order.
    fn list(&self) -> impl Future<Output = Result<Vec<IssuerConfiguration>>> + Send;

    /// Remove an issuer configuration. Removing an unknown issuer is not an
    /// error.
    fn delete(&self, issuer_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Persistence for issuance lines.
pub trait IssuanceStore: Send + Sync {
    /// Fetch an issuance line by uuid.
    fn get(&self, uuid: &Uuid) -> impl Future<Output = Result<Option<IssuanceLine>>> + Send;

    /// Return the line matching `key`, or create one.
    ///
    /// When no line matches, `create` is called with every existing line
    /// for the key's issuer and the returned line is inserted. Lookup,
    /// `create` and insert must run atomically with respect to other writes
    /// for the same issuer. Returns the line and whether it was created.
    fn get_or_create<F>(
        &self, key: &LineKey, create: F,
    ) -> impl Future<Output = Result<(IssuanceLine, bool)>> + Send
    where
        F: FnOnce(&[IssuanceLine]) -> IssuanceLine + Send;

    /// Apply `update` to the stored line and return the result, or `None`
    /// for an unknown line.
    ///
    /// The read, `update` and write must run atomically with respect to
    /// other writes for the line's issuer, so fields the closure leaves
    /// alone (such as a status set concurrently) are preserved. Fails with a
    /// conflict when another line of the same issuer holds the updated
    /// status index.
    fn update<F>(
        &self, uuid: &Uuid, update: F,
    ) -> impl Future<Output = Result<Option<IssuanceLine>>> + Send
    where
        F: FnOnce(&mut IssuanceLine) + Send;

    /// All issuance lines for an issuer.
    fn lines(&self, issuer_id: &str) -> impl Future<Output = Result<Vec<IssuanceLine>>> + Send;

    /// Set the cached achievement status on every line referencing the
    /// achievement. Returns the number of lines updated.
    fn update_status(
        &self, achievement: &Uuid, status: AchievementStatus,
    ) -> impl Future<Output = Result<usize>> + Send;
}

/// Read access to learner achievements.
pub trait Achievements: Send + Sync {
    /// Fetch an achievement by uuid.
    fn achievement(&self, uuid: &Uuid) -> impl Future<Output = Result<Option<Achievement>>> + Send;
}

/// A Linked Data Proof suite.
pub trait Suite: Send + Sync {
    /// Add a proof to `document` using the issuer's key.
    fn sign(
        &self, document: &Value, options: &ProofOptions, key: &IssuerKey,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Verify the proof on a signed document.
    fn verify(
        &self, document: &Value, options: &ProofOptions,
    ) -> impl Future<Output = Result<VerificationResult>> + Send;
}
