//! # Status List 2021
//!
//! Support for [Status List 2021] credential revocation.
//!
//! Each issuer maintains a single status list. Every credential the issuer
//! signs references a position (index) in that list using a
//! [`StatusList2021Entry`]. The list itself is published as a verifiable
//! credential whose subject ([`StatusList2021Subject`]) carries the encoded
//! status sequence.
//!
//! The sequence holds one byte per credential slot: `1` for revoked, `0`
//! otherwise. It is gzip compressed and base64url-encoded without padding.
//!
//! [Status List 2021]: https://w3c.github.io/vc-status-list-2021

mod error;
mod issue;
mod verify;

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub use self::error::Error;
pub use self::issue::*;
pub use self::verify::*;

/// Result type for status list operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// JSON-LD context for Status List 2021 documents.
pub const STATUS_LIST_CONTEXT: &str = "https://w3id.org/vc/status-list/2021/v1";

/// Credential type of the status list credential.
pub const STATUS_LIST_CREDENTIAL_TYPE: &str = "StatusList2021Credential";

/// Number of credential slots in a status list unless configured otherwise.
pub const DEFAULT_LENGTH: usize = 10_000;

/// Fragment used to identify the status list subject.
pub const LIST_FRAGMENT: &str = "list";

/// The purpose of the status list.
///
/// Only revocation is supported: a credential is either active or revoked.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum StatusPurpose {
    /// Used to permanently cancel the validity of a verifiable credential.
    #[default]
    Revocation,
}

impl Display for StatusPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Revocation => write!(f, "revocation"),
        }
    }
}

/// Status information embedded in an issued credential as its
/// `credentialStatus` property.
///
/// URLs are optional: they can only be built when the base URL of the
/// publishing service is known.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusList2021Entry {
    /// Identifies this entry: the status list URL with the index as
    /// fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always `StatusList2021Entry`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The purpose of the status entry.
    pub status_purpose: StatusPurpose,

    /// The position of the credential in the status list. Serialized as a
    /// string.
    pub status_list_index: String,

    /// URL of the status list credential.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_list_credential: Option<String>,
}

impl StatusList2021Entry {
    /// `credentialStatus` type.
    pub const TYPE: &str = "StatusList2021Entry";

    /// Create an entry for the credential at `index`. The `list_url` is the
    /// URL of the issuer's status list credential, when known.
    #[must_use]
    pub fn new(index: usize, list_url: Option<&str>) -> Self {
        Self {
            id: list_url.map(|url| format!("{url}#{index}")),
            type_: Self::TYPE.to_string(),
            status_purpose: StatusPurpose::Revocation,
            status_list_index: index.to_string(),
            status_list_credential: list_url.map(ToString::to_string),
        }
    }

    /// The parsed status list index.
    ///
    /// # Errors
    ///
    /// Returns an error when the index is not a non-negative integer.
    pub fn index(&self) -> Result<usize> {
        self.status_list_index
            .parse()
            .map_err(|_| Error::InvalidIndex(self.status_list_index.clone()))
    }
}

/// The `credentialSubject` of a status list credential.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusList2021Subject {
    /// Identifies the list: the status list URL with the `list` fragment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Always `StatusList2021`.
    #[serde(rename = "type")]
    pub type_: String,

    /// The purpose of the status list.
    pub status_purpose: StatusPurpose,

    /// The gzip compressed, base64url-encoded status sequence.
    pub encoded_list: String,
}

impl StatusList2021Subject {
    /// `credentialSubject` type.
    pub const TYPE: &str = "StatusList2021";

    /// Create a subject for the encoded status sequence.
    #[must_use]
    pub fn new(encoded_list: impl Into<String>, list_url: Option<&str>) -> Self {
        Self {
            id: list_url.map(|url| format!("{url}#{LIST_FRAGMENT}")),
            type_: Self::TYPE.to_string(),
            status_purpose: StatusPurpose::Revocation,
            encoded_list: encoded_list.into(),
        }
    }
}
