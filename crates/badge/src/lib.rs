//! Issuance of [Open Badges 3.0](https://www.imsglobal.org/spec/ob/v3p0/) and
//! [W3C Verifiable Credentials](https://www.w3.org/TR/vc-data-model/) for
//! learner achievements, with revocation published through
//! [Status List 2021](https://www.w3.org/TR/2023/WD-vc-status-list-20230427/).
//!
//! The crate is storage-agnostic: persistence, achievement lookup and
//! proof generation are supplied by the host through the traits in
//! [`provider`]. Requests from the API layer are processed with [`handle`].

pub mod achievement;
pub mod composition;
pub mod config;
pub mod context;
pub mod issuance;
pub mod proof;
pub mod provider;
pub mod registry;
pub mod storage;
pub mod types;

mod error;
mod handlers;

pub use self::error::Error;
pub use self::handlers::*;
pub use self::types::*;
