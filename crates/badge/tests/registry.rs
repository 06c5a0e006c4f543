//! Issuer Registry Tests

use chrono::{Duration, Utc};
use credibil_badge::Error;
use credibil_badge::proof::generate_issuer_key;
use credibil_badge::provider::IssuerStore;
use credibil_badge::registry::{self, IssuerConfiguration};
use test_utils::{Platform, data};

fn issuer(created_offset: i64, enabled: bool) -> IssuerConfiguration {
    let (issuer_key, issuer_id) = generate_issuer_key();
    IssuerConfiguration {
        issuer_id,
        issuer_key,
        issuer_name: None,
        enabled,
        created: Utc::now() + Duration::seconds(created_offset),
    }
}

// Should register the configured issuer as the enabled default.
#[tokio::test]
async fn bootstrap() {
    let provider = Platform::new();
    let config = data::config();

    let created = registry::create_issuers(&provider, &config).await.expect("should create");
    assert_eq!(created.issuer_id, config.default_issuer.id);
    assert!(created.enabled);

    let default = registry::default_issuer(&provider).await.expect("should have default");
    assert_eq!(default.issuer_id, config.default_issuer.id);
    assert_eq!(default.issuer_name.as_deref(), Some(data::ISSUER_NAME));

    let active = registry::active_issuers(&provider).await.expect("should list");
    assert_eq!(active, vec![config.default_issuer.id.clone()]);
}

// Should keep the original creation time when bootstrapping again.
#[tokio::test]
async fn bootstrap_twice() {
    let provider = Platform::new();
    let config = data::config();

    let first = registry::create_issuers(&provider, &config).await.expect("should create");
    let second = registry::create_issuers(&provider, &config).await.expect("should update");

    assert_eq!(first.created, second.created);
    assert_eq!(registry::issuer_ids(&provider).await.expect("should list").len(), 1);
}

// Should refuse to bootstrap without a signing key.
#[tokio::test]
async fn bootstrap_no_key() {
    let provider = Platform::new();
    let mut config = data::config();
    config.default_issuer.key = None;

    let Err(Error::Configuration(_)) = registry::create_issuers(&provider, &config).await else {
        panic!("should be a configuration error");
    };
}

// Should select the most recently created enabled issuer.
#[tokio::test]
async fn newest_enabled_is_default() {
    let provider = Platform::new();
    let older = issuer(-60, true);
    let newer = issuer(0, true);
    let disabled = issuer(60, false);

    for i in [&older, &newer, &disabled] {
        IssuerStore::put(&provider, i).await.expect("should save");
    }

    let default = registry::default_issuer(&provider).await.expect("should have default");
    assert_eq!(default.issuer_id, newer.issuer_id);

    registry::set_enabled(&provider, &newer.issuer_id, false).await.expect("should disable");
    let default = registry::default_issuer(&provider).await.expect("should have default");
    assert_eq!(default.issuer_id, older.issuer_id);

    let ids = registry::issuer_ids(&provider).await.expect("should list");
    assert_eq!(ids, vec![older.issuer_id, newer.issuer_id, disabled.issuer_id]);
}

// Should fail to resolve a default issuer when none is enabled.
#[tokio::test]
async fn no_enabled_issuer() {
    let provider = Platform::new();
    IssuerStore::put(&provider, &issuer(0, false)).await.expect("should save");

    let err = registry::default_issuer(&provider).await.expect_err("should have no default");
    assert_eq!(
        err,
        Error::Configuration(
            "There are no enabled Issuance Configurations for some reason! At least one must be always active."
                .to_string()
        )
    );
}

// Should refuse to disable the last enabled issuer.
#[tokio::test]
async fn keep_one_enabled() {
    let provider = Platform::new();
    let config = data::config();
    registry::create_issuers(&provider, &config).await.expect("should create");

    let err = registry::set_enabled(&provider, &config.default_issuer.id, false)
        .await
        .expect_err("should not disable");
    assert_eq!(err, Error::InvalidRequest("At least one Issuer must be always enabled!".into()));

    let extra = issuer(60, false);
    IssuerStore::put(&provider, &extra).await.expect("should save");
    registry::set_enabled(&provider, &extra.issuer_id, true).await.expect("should enable");
    registry::set_enabled(&provider, &config.default_issuer.id, false)
        .await
        .expect("should disable when another is enabled");

    let active = registry::active_issuers(&provider).await.expect("should list");
    assert_eq!(active, vec![extra.issuer_id]);
}

// Should report unknown issuers.
#[tokio::test]
async fn unknown_issuer() {
    let provider = Platform::new();

    let issuer = registry::issuer(&provider, "did:key:unknown").await.expect("should look up");
    assert!(issuer.is_none());

    let Err(Error::NotFound(_)) = registry::set_enabled(&provider, "did:key:unknown", true).await
    else {
        panic!("should be not found");
    };
    let Err(Error::NotFound(_)) = registry::remove_issuer(&provider, "did:key:unknown").await else {
        panic!("should be not found");
    };
}

// Should remove a registered issuer.
#[tokio::test]
async fn remove() {
    let provider = Platform::new();
    let extra = issuer(0, false);
    IssuerStore::put(&provider, &extra).await.expect("should save");

    registry::remove_issuer(&provider, &extra.issuer_id).await.expect("should remove");
    assert!(registry::issuer_ids(&provider).await.expect("should list").is_empty());
}
