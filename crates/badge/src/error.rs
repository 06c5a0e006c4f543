//! # Issuance Errors
//!
//! Errors surfaced by the issuance core. Each variant serializes to an
//! `{"error", "error_description"}` object and maps to an HTTP status code
//! for use at the API boundary.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuance error codes.
#[derive(Error, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[serde(tag = "error", content = "error_description")]
pub enum Error {
    /// The deployment is misconfigured: no enabled issuer, a missing issuer
    /// key, or an empty data model or storage list. Issuance cannot proceed
    /// until an operator intervenes.
    #[serde(rename = "configuration_error")]
    #[error(r#"{{"error": "configuration_error", "error_description": "{0}"}}"#)]
    Configuration(String),

    /// The request is missing a required parameter, includes an invalid
    /// parameter value, or is otherwise malformed.
    #[error(r#"{{"error": "invalid_request", "error_description": "{0}"}}"#)]
    InvalidRequest(String),

    /// A referenced entity (issuance line, achievement, storage, or issuer)
    /// does not exist.
    #[error(r#"{{"error": "not_found", "error_description": "{0}"}}"#)]
    NotFound(String),

    /// The operation is not permitted in the entity's current state, for
    /// example issuing against a revoked achievement. Also raised when two
    /// issuance lines race for the same status list index; callers should
    /// retry once.
    #[error(r#"{{"error": "conflict", "error_description": "{0}"}}"#)]
    Conflict(String),

    /// Signing or verifying the credential failed.
    #[serde(rename = "issuance_error")]
    #[error(r#"{{"error": "issuance_error", "error_description": "{0}"}}"#)]
    IssuanceFailed(String),

    /// An unexpected condition, typically a storage failure, prevented the
    /// request from being fulfilled.
    #[error(r#"{{"error": "server_error", "error_description": "{0}"}}"#)]
    ServerError(String),
}

impl Error {
    /// The HTTP status code to respond with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::IssuanceFailed(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Configuration(_) | Self::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<Self>() {
            Some(e) if err.chain().count() == 1 => e.clone(),
            Some(Self::Configuration(e)) => Self::Configuration(format!("{err}: {e}")),
            Some(Self::InvalidRequest(e)) => Self::InvalidRequest(format!("{err}: {e}")),
            Some(Self::NotFound(e)) => Self::NotFound(format!("{err}: {e}")),
            Some(Self::Conflict(e)) => Self::Conflict(format!("{err}: {e}")),
            Some(Self::IssuanceFailed(e)) => Self::IssuanceFailed(format!("{err}: {e}")),
            Some(Self::ServerError(e)) => Self::ServerError(format!("{err}: {e}")),
            None => {
                let chain = err.chain().map(ToString::to_string).collect::<Vec<_>>();
                Self::ServerError(chain.join(" -> "))
            }
        }
    }
}

impl From<credibil_badge_status::Error> for Error {
    fn from(err: credibil_badge_status::Error) -> Self {
        Self::ServerError(err.to_string())
    }
}

/// Construct an `Error::InvalidRequest` error from a string or existing error
/// value.
macro_rules! invalid {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::InvalidRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::InvalidRequest(format!($err))
    };
}
pub(crate) use invalid;

/// Construct an `Error::NotFound` error from a string or existing error
/// value.
macro_rules! not_found {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::NotFound(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::NotFound(format!($err))
    };
}
pub(crate) use not_found;

/// Construct an `Error::Conflict` error from a string or existing error
/// value.
macro_rules! conflict {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::Conflict(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::Conflict(format!($err))
    };
}
pub(crate) use conflict;

/// Construct an `Error::ServerError` error from a string or existing error
/// value.
macro_rules! server {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::ServerError(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::ServerError(format!($err))
    };
}
pub(crate) use server;

#[cfg(test)]
mod test {
    use anyhow::{Context, anyhow};
    use serde_json::json;

    use super::*;

    #[test]
    fn json() {
        let err = invalid!("bad request");
        let ser = serde_json::to_value(&err).expect("should serialize");
        assert_eq!(ser, json!({"error":"invalid_request", "error_description": "bad request"}));

        let err = Error::IssuanceFailed("signing failed".to_string());
        let ser = serde_json::to_value(&err).expect("should serialize");
        assert_eq!(ser, json!({"error":"issuance_error", "error_description": "signing failed"}));
    }

    #[test]
    fn querystring() {
        let err = conflict!("index {} taken", 3);
        let ser = serde_urlencoded::to_string(&err).expect("should serialize");
        assert_eq!(ser, "error=conflict&error_description=index+3+taken");
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::Configuration(String::new()).status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(invalid!("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(not_found!("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(conflict!("x").status(), StatusCode::CONFLICT);
        assert_eq!(Error::IssuanceFailed(String::new()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(server!("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn recover_typed() {
        let err: Error = anyhow::Error::new(conflict!("duplicate index")).into();
        assert_eq!(err, conflict!("duplicate index"));

        let wrapped = Err::<(), _>(conflict!("duplicate index")).context("saving line");
        let err: Error = wrapped.expect_err("should fail").into();
        assert_eq!(err, conflict!("saving line: duplicate index"));
    }

    #[test]
    fn fold_untyped() {
        let wrapped = Err::<(), _>(anyhow!("connection reset")).context("loading line");
        let err: Error = wrapped.expect_err("should fail").into();
        assert_eq!(err, server!("loading line -> connection reset"));
    }
}
