//! Composition layers.
//!
//! Each layer contributes JSON-LD contexts, types and a table of fields to
//! the composed credential. Data models are ordered chains of layers.

use credibil_badge_status::{
    STATUS_LIST_CONTEXT, STATUS_LIST_CREDENTIAL_TYPE, StatusList2021Entry, StatusList2021Subject,
};
use serde_json::{Map, Value, json};

use super::templates::{credential_description, credential_name, credential_narrative};
use super::{Composer, Source};
use crate::achievement::AchievementKind;

/// A composition layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Base verifiable credential: issuer and dates.
    Credential,

    /// Status List 2021 entry mixin: `credentialStatus`.
    StatusListEntry,

    /// Verifiable Credentials Data Model v1.1 with schema.org subject.
    VerifiableCredentials,

    /// Open Badges 3.0.
    OpenBadges,

    /// Open Badges 3.0.1 context.
    OpenBadges301,

    /// Status List 2021 credential.
    StatusList,
}

impl Layer {
    /// JSON-LD contexts contributed by the layer.
    #[must_use]
    pub const fn context(self) -> &'static [&'static str] {
        match self {
            Self::Credential => &[
                "https://www.w3.org/2018/credentials/v1",
                "https://w3id.org/security/suites/ed25519-2020/v1",
            ],
            Self::StatusListEntry | Self::StatusList => &[STATUS_LIST_CONTEXT],
            Self::VerifiableCredentials => &["https://schema.org/"],
            Self::OpenBadges => &["https://purl.imsglobal.org/spec/ob/v3p0/context.json"],
            Self::OpenBadges301 => &[
                "https://purl.imsglobal.org/spec/ob/v3p0/context-3.0.1.json",
                "https://purl.imsglobal.org/spec/ob/v3p0/extensions.json",
            ],
        }
    }

    /// Credential types contributed by the layer.
    #[must_use]
    pub const fn types(self) -> &'static [&'static str] {
        match self {
            Self::Credential => &["VerifiableCredential"],
            Self::OpenBadges => &["OpenBadgeCredential"],
            Self::StatusList => &[STATUS_LIST_CREDENTIAL_TYPE],
            Self::StatusListEntry | Self::VerifiableCredentials | Self::OpenBadges301 => &[],
        }
    }

    /// Additional types derived from the achievement's kind.
    #[must_use]
    pub fn credential_types(self, source: &Source) -> Vec<&'static str> {
        if self != Self::VerifiableCredentials {
            return vec![];
        }
        match source.achievement.map(|a| &a.kind) {
            Some(AchievementKind::Program(_) | AchievementKind::Course(_)) => {
                vec!["EducationalOccupationalCredential"]
            }
            _ => vec![],
        }
    }

    /// Fields contributed by the layer.
    #[must_use]
    pub fn fields(self, composer: &Composer, source: &Source) -> Map<String, Value> {
        let line = source.line;
        let mut fields = Map::new();

        match self {
            Self::Credential => {
                let issued = Value::from(source.issued());
                fields.insert(
                    "issuer".into(),
                    json!({
                        "id": line.issuer_id,
                        "type": "Profile",
                        "name": source.issuer_name,
                    }),
                );
                fields.insert("issued".into(), issued.clone());
                fields.insert("issuanceDate".into(), issued.clone());
                fields.insert("validFrom".into(), issued);
                fields.insert("validUntil".into(), json!(source.valid_until()));
            }
            Self::StatusListEntry => {
                let url = composer.status_list_url(&line.issuer_id);
                let status = line
                    .status_index
                    .map(|index| StatusList2021Entry::new(index, url.as_deref()));
                fields.insert("credentialStatus".into(), json!(status));
            }
            Self::VerifiableCredentials => {
                let achievement = source.achievement;
                let program = achievement.and_then(|a| match &a.kind {
                    AchievementKind::Program(program) => Some(program),
                    _ => None,
                });
                let course = achievement.and_then(|a| match &a.kind {
                    AchievementKind::Course(course) => Some(course),
                    _ => None,
                });

                fields.insert("id".into(), json!(line.urn()));
                fields.insert(
                    "credentialSubject".into(),
                    json!({
                        "id": line.subject_id,
                        "hasCredential": {
                            "id": "EducationalOccupationalCredential",
                            "name": achievement.and_then(credential_name),
                            "description": achievement.map(|a| a.uuid.to_string()),
                            "program": {
                                "id": "EducationalOccupationalProgram",
                                "name": program.map(|p| &p.title),
                                "description": program.map(|p| p.uuid.to_string()),
                            },
                            "course": course.map(|c| json!({
                                "id": "Course",
                                "name": c.title,
                                "courseCode": c.course_run_id,
                            })),
                        },
                    }),
                );
            }
            Self::OpenBadges => {
                let achievement = source.achievement;
                let name = achievement.and_then(credential_name);

                fields.insert("id".into(), json!(line.urn()));
                fields.insert("name".into(), json!(name));
                fields.insert(
                    "credentialSubject".into(),
                    json!({
                        "id": line.subject_id,
                        "type": "AchievementSubject",
                        "name": achievement.and_then(|a| a.recipient.as_deref()),
                        "achievement": {
                            "id": achievement.map(|a| a.uuid.urn().to_string()),
                            "type": "Achievement",
                            "name": name,
                            "description": achievement.and_then(credential_description),
                            "criteria": {
                                "narrative": achievement.and_then(credential_narrative),
                            },
                        },
                    }),
                );
            }
            Self::OpenBadges301 => {}
            Self::StatusList => {
                let url = composer.status_list_url(&line.issuer_id);
                let encoded_list = source.encoded_list.unwrap_or_default();
                let subject = StatusList2021Subject::new(encoded_list, url.as_deref());

                fields.insert("id".into(), json!(url));
                fields.insert("issuer".into(), json!({"id": line.issuer_id}));
                fields.insert("credentialSubject".into(), json!(subject));
            }
        }

        fields
    }
}
