//! # Mock Platform
//!
//! An in-memory provider standing in for the host platform: issuer and
//! issuance line persistence, the achievement catalogue, and the proof
//! suite. Faults can be injected into the proof suite to exercise failure
//! paths.

use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use credibil_badge::achievement::{Achievement, AchievementStatus};
use credibil_badge::issuance::{self, IssuanceLine, LineKey};
use credibil_badge::proof::Ed25519Signature2020;
use credibil_badge::provider::{
    Achievements, IssuanceStore, IssuerKey, IssuerStore, ProofOptions, Suite, VerificationResult,
};
use credibil_badge::registry::IssuerConfiguration;
use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::store::{IssuerTable, LineTable};

/// A failure to inject into the proof suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fault {
    /// Signing returns an error.
    Sign,

    /// Verification reports an invalid proof.
    Verify,

    /// Signing never completes.
    Hang,
}

#[derive(Clone, Default)]
pub struct Platform {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    issuers: IssuerTable,
    lines: LineTable,
    achievements: DashMap<Uuid, Achievement>,
    fault: RwLock<Option<Fault>>,
}

impl Platform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an achievement.
    pub fn add_achievement(&self, achievement: Achievement) {
        self.inner.achievements.insert(achievement.uuid, achievement);
    }

    /// Change an achievement's status and mirror it onto its issuance lines,
    /// as the achievement subsystem's status-change hook would.
    pub async fn set_achievement_status(
        &self, uuid: &Uuid, status: AchievementStatus,
    ) -> credibil_badge::Result<usize> {
        if let Some(mut achievement) = self.inner.achievements.get_mut(uuid) {
            achievement.status = status;
        }
        issuance::update_issuance_lines_status(self, uuid, status).await
    }

    /// Inject a fault into the proof suite, or clear it with `None`.
    ///
    /// # Panics
    ///
    /// Panics if the fault lock is poisoned.
    pub fn set_fault(&self, fault: Option<Fault>) {
        *self.inner.fault.write().expect("should lock") = fault;
    }

    fn fault(&self) -> Result<Option<Fault>> {
        Ok(*self.inner.fault.read().map_err(|_| anyhow!("issue locking"))?)
    }
}

impl IssuerStore for Platform {
    async fn put(&self, issuer: &IssuerConfiguration) -> Result<()> {
        self.inner.issuers.put(issuer);
        Ok(())
    }

    async fn get(&self, issuer_id: &str) -> Result<Option<IssuerConfiguration>> {
        Ok(self.inner.issuers.get(issuer_id))
    }

    async fn list(&self) -> Result<Vec<IssuerConfiguration>> {
        Ok(self.inner.issuers.list())
    }

    async fn delete(&self, issuer_id: &str) -> Result<()> {
        self.inner.issuers.delete(issuer_id);
        Ok(())
    }
}

impl IssuanceStore for Platform {
    async fn get(&self, uuid: &Uuid) -> Result<Option<IssuanceLine>> {
        Ok(self.inner.lines.get(uuid).await)
    }

    async fn get_or_create<F>(&self, key: &LineKey, create: F) -> Result<(IssuanceLine, bool)>
    where
        F: FnOnce(&[IssuanceLine]) -> IssuanceLine + Send,
    {
        self.inner.lines.get_or_create(key, create).await
    }

    async fn update<F>(&self, uuid: &Uuid, update: F) -> Result<Option<IssuanceLine>>
    where
        F: FnOnce(&mut IssuanceLine) + Send,
    {
        self.inner.lines.update(uuid, update).await
    }

    async fn lines(&self, issuer_id: &str) -> Result<Vec<IssuanceLine>> {
        Ok(self.inner.lines.lines(issuer_id).await)
    }

    async fn update_status(&self, achievement: &Uuid, status: AchievementStatus) -> Result<usize> {
        Ok(self.inner.lines.update_status(achievement, status).await)
    }
}

impl Achievements for Platform {
    async fn achievement(&self, uuid: &Uuid) -> Result<Option<Achievement>> {
        Ok(self.inner.achievements.get(uuid).map(|a| a.clone()))
    }
}

impl Suite for Platform {
    async fn sign(
        &self, document: &Value, options: &ProofOptions, key: &IssuerKey,
    ) -> Result<Value> {
        match self.fault()? {
            Some(Fault::Sign) => Err(anyhow!("signing key is unavailable")),
            Some(Fault::Hang) => std::future::pending().await,
            _ => Ed25519Signature2020.sign(document, options, key).await,
        }
    }

    async fn verify(&self, document: &Value, options: &ProofOptions) -> Result<VerificationResult> {
        if self.fault()? == Some(Fault::Verify) {
            return Ok(VerificationResult {
                checks: vec!["proof".to_string()],
                errors: vec!["signature does not verify".to_string()],
                ..VerificationResult::default()
            });
        }
        Ed25519Signature2020.verify(document, options).await
    }
}
