//! Credential issuance pipeline.
//!
//! ```text
//! Init -> Validated -> Composed -> Signed -> Verified -> Finalized
//!     \-> ValidationFailed        \---------\-> IssuanceFailed
//! ```
//!
//! Nothing is persisted between composition and finalization. A pipeline
//! interrupted part way leaves the line unprocessed and `issue` can simply
//! be run again.

use std::time::Duration;

use anyhow::Context as _;
use chrono::Utc;
use serde_json::{Map, Value};
use tokio::time::timeout;
use uuid::Uuid;

use super::{IssuanceLine, LineKey, next_status_index, regenerate_encoded_status_sequence};
use crate::achievement::{Achievement, AchievementStatus};
use crate::composition::{Composer, DataModel, Source, render};
use crate::config::Config;
use crate::context::RequestContext;
use crate::error::{Error, conflict, not_found, server};
use crate::proof::{ProofOptions, VerificationResult};
use crate::provider::{Achievements, IssuanceStore, Provider, Suite};
use crate::storage::Storage;
use crate::{Result, registry};

/// Pipeline state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssuanceState {
    /// Line picked up.
    Init,
    /// Wallet request accepted.
    Validated,
    /// Unsigned credential built.
    Composed,
    /// Proof added.
    Signed,
    /// Proof checked.
    Verified,
    /// Line marked processed.
    Finalized,
    /// Wallet request rejected.
    ValidationFailed,
    /// Signing or verification failed.
    IssuanceFailed,
}

/// Drives one issuance line through the issuance pipeline.
#[derive(Debug)]
pub struct CredentialIssuer<'a, P: Provider> {
    provider: &'a P,
    config: &'a Config,
    line: IssuanceLine,
    storage: Storage,
    achievement: Option<Achievement>,
    state: IssuanceState,
}

impl<'a, P: Provider> CredentialIssuer<'a, P> {
    /// Start issuance: fetch or create the issuance line for the storage,
    /// achievement and issuer. The default issuer is used when `issuer_id`
    /// is not given.
    ///
    /// A new line for an achievement takes the issuer's next status index
    /// and the achievement's current status. Status list lines have no
    /// index and start processed.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown storage,
    /// `Error::Configuration` when no issuer is enabled or the storage's
    /// data model is not configured, and
    /// `Error::Conflict` when the status index was taken concurrently.
    pub async fn init(
        provider: &P, config: &Config, storage_id: &str, achievement: Option<&Achievement>,
        issuer_id: Option<&str>,
    ) -> Result<IssuanceLine> {
        let Some(storage) = config.storage(storage_id) else {
            return Err(not_found!("storage {storage_id} is not available"));
        };
        let model = configured_model(config, storage.data_model().id())?;

        let issuer_id = match issuer_id {
            Some(id) => id.to_string(),
            None => registry::default_issuer(provider).await?.issuer_id,
        };

        let key = LineKey::new(storage_id, achievement.map(|a| a.uuid), issuer_id);
        let status = achievement.map(|a| a.status);
        let new_key = key.clone();

        let (line, created) = IssuanceStore::get_or_create(provider, &key, move |existing| {
            let mut line = IssuanceLine::new(&new_key, model);
            if new_key.achievement.is_some() {
                line.status_index = Some(next_status_index(existing));
                line.status = status;
            }
            line
        })
        .await
        .context("initiating issuance line")?;

        if created {
            tracing::debug!("init::created {} at index {:?}", line.uuid, line.status_index);
        }
        Ok(line)
    }

    /// Load an issuance line for processing.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown line and `Error::Conflict`
    /// when the line's achievement has been revoked.
    pub async fn pickup(provider: &'a P, config: &'a Config, uuid: &Uuid) -> Result<Self> {
        let Some(line) = IssuanceStore::get(provider, uuid).await.context("fetching issuance line")?
        else {
            return Err(not_found!("Couldn't find such issuance line: [{uuid}]"));
        };
        let Some(storage) = config.storage(&line.storage_id) else {
            return Err(not_found!("storage {} is not available", line.storage_id));
        };

        let achievement = match &line.achievement {
            Some(id) => {
                Achievements::achievement(provider, id).await.context("fetching achievement")?
            }
            None => None,
        };

        let cached_inactive = line.status.is_some_and(AchievementStatus::is_inactive);
        let live_inactive = achievement.as_ref().is_some_and(Achievement::is_inactive);
        if cached_inactive || live_inactive {
            let id = line.achievement.map(|a| a.to_string()).unwrap_or_default();
            tracing::warn!("Seems credential isn't active anymore: [{id}]");
            return Err(conflict!("Seems credential isn't active anymore: [{id}]"));
        }

        Ok(Self { provider, config, line, storage, achievement, state: IssuanceState::Init })
    }

    /// Validate the wallet's request and save accepted fields to the line.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidRequest` with field-level detail.
    pub async fn validate(&mut self, data: &Map<String, Value>) -> Result<()> {
        tracing::debug!("issue::validate");

        let mut accepted = self.line.clone();
        if let Err(e) = self.storage.validate(&mut accepted, data) {
            self.state = IssuanceState::ValidationFailed;
            return Err(e);
        }

        let IssuanceLine { subject_id, expiration_date, .. } = accepted;
        self.line = self
            .save(move |line| {
                line.subject_id = subject_id;
                line.expiration_date = expiration_date;
            })
            .await
            .context("saving issuance line")?;
        self.state = IssuanceState::Validated;
        Ok(())
    }

    /// Build the unsigned credential. Status list URLs are only included
    /// when a request context is given.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the line's data model is not
    /// configured,
    /// or a server error if the status list cannot be derived.
    pub async fn compose(&mut self, ctx: Option<&RequestContext>) -> Result<Value> {
        tracing::debug!("issue::compose");

        let model = configured_model(self.config, &self.line.data_model_id)?;

        let issuer = registry::issuer(self.provider, &self.line.issuer_id).await?;
        let encoded_list = if model == DataModel::StatusList {
            Some(
                regenerate_encoded_status_sequence(self.provider, self.config, &self.line.issuer_id)
                    .await?,
            )
        } else {
            None
        };

        let source = Source {
            line: &self.line,
            achievement: self.achievement.as_ref(),
            issuer_name: issuer.as_ref().and_then(|i| i.issuer_name.as_deref()),
            encoded_list: encoded_list.as_deref(),
        };
        let composed = Composer::new(&self.config.routes, ctx).compose(model, &source);

        self.state = IssuanceState::Composed;
        Ok(render(composed))
    }

    /// Sign the composed credential with the line's issuer key.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssuanceFailed` carrying the suite's message when
    /// signing fails or times out, and `Error::Configuration` if the issuer
    /// is not registered.
    pub async fn sign(&mut self, document: &Value) -> Result<Value> {
        tracing::debug!("issue::sign");

        let Some(issuer) = registry::issuer(self.provider, &self.line.issuer_id).await? else {
            return Err(Error::Configuration(format!(
                "no issuer configuration for {}",
                self.line.issuer_id
            )));
        };

        let options = ProofOptions::ed25519_2020();
        let signing = Suite::sign(self.provider, document, &options, &issuer.issuer_key);
        let outcome = match timeout(self.time_limit(), signing).await {
            Ok(Ok(signed)) => Ok(signed),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!("signing timed out after {}s", self.config.signing_timeout_secs)),
        };

        match outcome {
            Ok(signed) => {
                self.state = IssuanceState::Signed;
                Ok(signed)
            }
            Err(reason) => Err(self.fail("Provided data didn't validate", &reason)),
        }
    }

    /// Check the signed credential verifies.
    ///
    /// # Errors
    ///
    /// Returns `Error::IssuanceFailed` if verification fails or times out.
    pub async fn verify(&mut self, document: &Value) -> Result<VerificationResult> {
        tracing::debug!("issue::verify");

        let options = ProofOptions::default();
        let verifying = Suite::verify(self.provider, document, &options);
        let outcome = match timeout(self.time_limit(), verifying).await {
            Ok(Ok(result)) if result.is_valid() => Ok(result),
            Ok(Ok(result)) => Err(result.errors.join("; ")),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => {
                Err(format!("verification timed out after {}s", self.config.signing_timeout_secs))
            }
        };

        match outcome {
            Ok(result) => {
                tracing::debug!("verifiable credential passed verification: {result:?}");
                self.state = IssuanceState::Verified;
                Ok(result)
            }
            Err(reason) => {
                Err(self.fail("Issued verifiable credential can't be verified!", &reason))
            }
        }
    }

    /// Mark the line processed.
    ///
    /// # Errors
    ///
    /// Returns a server error if the credential has not been verified or the
    /// store fails.
    pub async fn finalize(&mut self) -> Result<()> {
        if self.state != IssuanceState::Verified {
            return Err(server!("cannot finalize issuance in state {:?}", self.state));
        }

        self.line = self
            .save(|line| line.processed = true)
            .await
            .context("finalizing issuance line")?;
        self.state = IssuanceState::Finalized;
        Ok(())
    }

    /// Compose, sign, verify and finalize, returning the signed credential.
    /// Lines already processed are issued again with a fresh proof.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn issue(&mut self, ctx: Option<&RequestContext>) -> Result<Value> {
        let composed = self.compose(ctx).await?;
        let signed = self.sign(&composed).await?;
        self.verify(&signed).await?;
        self.finalize().await?;
        Ok(signed)
    }

    /// The issuance line.
    #[must_use]
    pub const fn line(&self) -> &IssuanceLine {
        &self.line
    }

    /// The line's storage.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The line's achievement, if any.
    #[must_use]
    pub const fn achievement(&self) -> Option<&Achievement> {
        self.achievement.as_ref()
    }

    /// Current pipeline state.
    #[must_use]
    pub const fn state(&self) -> IssuanceState {
        self.state
    }

    // Writes only the fields `update` sets so a status change made since
    // pickup survives.
    async fn save<F>(&self, update: F) -> Result<IssuanceLine>
    where
        F: FnOnce(&mut IssuanceLine) + Send,
    {
        let uuid = self.line.uuid;
        let updated = IssuanceStore::update(self.provider, &uuid, move |line| {
            update(line);
            line.modified = Utc::now();
        })
        .await?;
        updated.ok_or_else(|| not_found!("Couldn't find such issuance line: [{uuid}]"))
    }

    const fn time_limit(&self) -> Duration {
        Duration::from_secs(self.config.signing_timeout_secs)
    }

    fn fail(&mut self, message: &str, reason: &str) -> Error {
        tracing::error!("{message} [{reason}]");
        self.state = IssuanceState::IssuanceFailed;
        Error::IssuanceFailed(format!("{message} [{reason}]"))
    }
}

fn configured_model(config: &Config, model_id: &str) -> Result<DataModel> {
    config
        .data_model(model_id)
        .ok_or_else(|| Error::Configuration(format!("data model {model_id} is not configured")))
}
