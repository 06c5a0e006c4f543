//! # Test Data
//!
//! Configuration and achievement fixtures.

use chrono::{TimeZone, Utc};
use credibil_badge::achievement::{
    Achievement, AchievementKind, AchievementStatus, Course, Program,
};
use credibil_badge::composition::DataModel;
use credibil_badge::config::{Config, IssuerSettings};
use credibil_badge::proof::generate_issuer_key;
use credibil_badge::storage::{Storage, WebWallet};
use uuid::Uuid;

pub const BASE_URL: &str = "https://credentials.example.com";
pub const ISSUER_NAME: &str = "Example University";
pub const WEB_WALLET_ID: &str = "web_wallet";

/// Configuration with a freshly generated default issuer, the Learner
/// Credential Wallet and a web wallet.
#[must_use]
pub fn config() -> Config {
    let (key, did) = generate_issuer_key();
    Config {
        default_issuer: IssuerSettings { id: did, key: Some(key), name: Some(ISSUER_NAME.into()) },
        storages: vec![
            Storage::LcWallet,
            Storage::WebWallet(WebWallet {
                id: WEB_WALLET_ID.to_string(),
                name: "Web Wallet".to_string(),
                url: "https://wallet.example.com/receive".to_string(),
                data_model: DataModel::VerifiableCredentials,
            }),
        ],
        ..Config::default()
    }
}

/// An awarded program certificate.
#[must_use]
pub fn program() -> Achievement {
    Achievement {
        uuid: Uuid::new_v4(),
        status: AchievementStatus::Awarded,
        title: None,
        modified: Utc.with_ymd_and_hms(2024, 3, 14, 9, 30, 0).single().unwrap_or_default(),
        recipient: Some("Ada Lovelace".to_string()),
        platform_name: Some("Example Online".to_string()),
        kind: AchievementKind::Program(Program {
            uuid: Uuid::new_v4(),
            title: "Analytical Engines".to_string(),
            authoring_organizations: vec!["Example University".to_string()],
            total_hours_of_effort: Some(120),
            course_runs: 4,
        }),
    }
}

/// An awarded course certificate.
#[must_use]
pub fn course() -> Achievement {
    Achievement {
        uuid: Uuid::new_v4(),
        status: AchievementStatus::Awarded,
        title: None,
        modified: Utc.with_ymd_and_hms(2024, 5, 2, 16, 0, 0).single().unwrap_or_default(),
        recipient: Some("Charles Babbage".to_string()),
        platform_name: Some("Example Online".to_string()),
        kind: AchievementKind::Course(Course {
            title: Some("Difference Engines 101".to_string()),
            course_run_id: "course-v1:Example+DE101+2024".to_string(),
        }),
    }
}
