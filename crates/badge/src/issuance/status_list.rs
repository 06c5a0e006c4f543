//! Status List 2021 management.
//!
//! Each issuer's status list is derived from its issuance lines on every
//! request. Nothing is cached, so a revocation shows up on the next read.

use anyhow::Context as _;
use serde_json::Value;

use super::{CredentialIssuer, IssuanceLine};
use crate::Result;
use crate::achievement::AchievementStatus;
use crate::config::Config;
use crate::context::RequestContext;
use crate::provider::{IssuanceStore, Provider};
use crate::storage::Storage;

/// The next free status list index given an issuer's existing lines:
/// one past the highest index in use, or 0.
#[must_use]
pub fn next_status_index(lines: &[IssuanceLine]) -> usize {
    lines.iter().filter_map(|l| l.status_index).max().map_or(0, |max| max + 1)
}

/// Status indices, ascending, of the issuer's processed lines whose cached
/// status is `status`.
///
/// # Errors
///
/// Returns a server error if the store fails.
pub async fn indices_for_status(
    provider: &impl IssuanceStore, issuer_id: &str, status: AchievementStatus,
) -> Result<Vec<usize>> {
    let lines = IssuanceStore::lines(provider, issuer_id).await.context("listing issuance lines")?;

    let mut indices = lines
        .iter()
        .filter(|l| l.processed && l.status == Some(status))
        .filter_map(|l| l.status_index)
        .collect::<Vec<_>>();
    indices.sort_unstable();
    Ok(indices)
}

/// Build the issuer's encoded status sequence from scratch: one byte per
/// slot, `1` for revoked, gzip compressed and base64url-encoded without
/// padding.
///
/// # Errors
///
/// Returns a server error if the store fails or a revoked index lies
/// outside the configured list length.
pub async fn regenerate_encoded_status_sequence(
    provider: &impl IssuanceStore, config: &Config, issuer_id: &str,
) -> Result<String> {
    let revoked = indices_for_status(provider, issuer_id, AchievementStatus::Revoked).await?;
    tracing::debug!("{} revoked index(es) for {issuer_id}", revoked.len());
    Ok(credibil_badge_status::encode(revoked, config.status_list_length)?)
}

/// Issue the issuer's status list as a signed credential.
///
/// # Errors
///
/// Returns `Error::IssuanceFailed` if signing or verification fails, or the
/// errors of [`CredentialIssuer::init`].
pub async fn issue_status_list<P: Provider>(
    provider: &P, config: &Config, issuer_id: &str, ctx: Option<&RequestContext>,
) -> Result<Value> {
    let line =
        CredentialIssuer::init(provider, config, Storage::STATUS_LIST_ID, None, Some(issuer_id))
            .await?;
    let mut issuer = CredentialIssuer::pickup(provider, config, &line.uuid).await?;

    issuer.issue(ctx).await.inspect_err(|e| {
        tracing::error!("Status List generation failed: [{issuer_id}]: {e}");
    })
}
