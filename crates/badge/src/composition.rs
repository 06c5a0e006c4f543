//! # Data Model Composer
//!
//! Builds an unsigned credential document from an issuance line and its
//! achievement according to a data model.
//!
//! A data model is a linear chain of [`Layer`]s, from the base credential
//! through mixins to the concrete model. The composer walks the chain once:
//! contexts and types are accumulated in order with the first occurrence of
//! a value keeping its position, and field tables are merged with later
//! layers overriding earlier ones.
//!
//! Composition never fails. Missing data produces empty values which
//! [`render`] removes.

mod layers;
mod templates;

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use self::layers::Layer;
pub use self::templates::{
    capitalize_first, credential_description, credential_name, credential_narrative,
    credential_verbose_type,
};
use crate::achievement::Achievement;
use crate::config::Routes;
use crate::context::RequestContext;
use crate::issuance::IssuanceLine;

/// Supported credential data models.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum DataModel {
    /// Verifiable Credentials Data Model v1.1.
    #[serde(rename = "vc")]
    VerifiableCredentials,

    /// Open Badges Specification v3.0.
    #[serde(rename = "obv3")]
    OpenBadges,

    /// Open Badges Specification v3.0.1.
    #[serde(rename = "obv301")]
    OpenBadges301,

    /// Status List 2021 credential.
    #[serde(rename = "status-list-2021")]
    StatusList,
}

impl DataModel {
    /// Model identifier.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::VerifiableCredentials => "vc",
            Self::OpenBadges => "obv3",
            Self::OpenBadges301 => "obv301",
            Self::StatusList => "status-list-2021",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VerifiableCredentials => "Verifiable Credentials Data Model v1.1",
            Self::OpenBadges => "Open Badges Specification v3.0",
            Self::OpenBadges301 => "Open Badges Specification v3.0.1",
            Self::StatusList => "Status List 2021",
        }
    }

    /// Specification version.
    #[must_use]
    pub const fn version(self) -> &'static str {
        match self {
            Self::VerifiableCredentials => "1.1",
            Self::OpenBadges => "3.0",
            Self::OpenBadges301 => "3.0.1",
            Self::StatusList => "2021",
        }
    }

    /// Parse a model identifier.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        [Self::VerifiableCredentials, Self::OpenBadges, Self::OpenBadges301, Self::StatusList]
            .into_iter()
            .find(|m| m.id() == id)
    }

    /// The model's layer chain, base first.
    #[must_use]
    pub const fn layers(self) -> &'static [Layer] {
        match self {
            Self::VerifiableCredentials => {
                &[Layer::Credential, Layer::StatusListEntry, Layer::VerifiableCredentials]
            }
            Self::OpenBadges => &[Layer::Credential, Layer::StatusListEntry, Layer::OpenBadges],
            Self::OpenBadges301 => &[
                Layer::Credential,
                Layer::StatusListEntry,
                Layer::OpenBadges,
                Layer::OpenBadges301,
            ],
            Self::StatusList => &[Layer::Credential, Layer::StatusList],
        }
    }

    /// Types derived from the achievement's kind.
    #[must_use]
    pub fn resolve_credential_type(self, source: &Source) -> Vec<&'static str> {
        self.layers().iter().flat_map(|layer| layer.credential_types(source)).collect()
    }
}

/// Data a credential is composed from.
#[derive(Clone, Copy, Debug)]
pub struct Source<'a> {
    /// The issuance line being issued.
    pub line: &'a IssuanceLine,

    /// The line's achievement. Absent for status list credentials.
    pub achievement: Option<&'a Achievement>,

    /// Display name of the line's issuer.
    pub issuer_name: Option<&'a str>,

    /// Encoded status sequence for status list credentials.
    pub encoded_list: Option<&'a str>,
}

impl Source<'_> {
    /// Issuance date: when the achievement was last modified, or the line
    /// when there is no achievement.
    #[must_use]
    pub fn issued(&self) -> String {
        let modified = self.achievement.map_or(self.line.modified, |a| a.modified);
        modified.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Expiration date, if any.
    #[must_use]
    pub fn valid_until(&self) -> Option<String> {
        self.line.expiration_date.map(|d| d.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

/// Composes credentials for a request.
#[derive(Clone, Copy, Debug)]
pub struct Composer<'a> {
    routes: &'a Routes,
    context: Option<&'a RequestContext>,
}

impl<'a> Composer<'a> {
    /// Create a composer. Without a request context, status list URLs are
    /// omitted from composed credentials.
    #[must_use]
    pub const fn new(routes: &'a Routes, context: Option<&'a RequestContext>) -> Self {
        Self { routes, context }
    }

    /// Compose the credential for `source` using `model`. The result holds
    /// the contexts under `context`; see [`render`].
    #[must_use]
    pub fn compose(&self, model: DataModel, source: &Source) -> Map<String, Value> {
        tracing::debug!("compose::{}", model.id());

        let mut context = Vec::<&str>::new();
        let mut types = Vec::<&str>::new();
        let mut fields = Map::new();

        for layer in model.layers() {
            append_unique(&mut context, layer.context());
            append_unique(&mut types, layer.types());
            for (key, value) in layer.fields(self, source) {
                fields.insert(key, value);
            }
        }
        append_unique(&mut types, &model.resolve_credential_type(source));

        let mut composed = Map::new();
        composed.insert("context".into(), context.into());
        composed.insert("type".into(), types.into());
        composed.extend(fields);
        composed
    }

    /// URL of the issuer's status list credential, when serving a request.
    #[must_use]
    pub fn status_list_url(&self, issuer_id: &str) -> Option<String> {
        self.context.map(|ctx| ctx.status_list_url(self.routes, issuer_id))
    }
}

fn append_unique<'a>(values: &mut Vec<&'a str>, additions: &[&'a str]) {
    for value in additions {
        if !values.contains(value) {
            values.push(value);
        }
    }
}

/// Shape a composed credential as JSON-LD: `context` becomes `@context`
/// and empty values (empty strings, nulls, empty arrays and objects) are
/// removed at every depth.
#[must_use]
pub fn render(mut composed: Map<String, Value>) -> Value {
    if let Some(context) = composed.remove("context") {
        composed.insert("@context".into(), context);
    }
    prune(Value::Object(composed)).unwrap_or_else(|| Value::Object(Map::new()))
}

fn prune(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::Array(items) => {
            let items = items.into_iter().filter_map(prune).collect::<Vec<_>>();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(obj) => {
            let obj = obj
                .into_iter()
                .filter_map(|(k, v)| prune(v).map(|v| (k, v)))
                .collect::<Map<_, _>>();
            (!obj.is_empty()).then_some(Value::Object(obj))
        }
        other => Some(other),
    }
}
