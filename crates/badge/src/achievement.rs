//! # Achievements
//!
//! Learner achievements (program and course certificates) as supplied by
//! the achievement subsystem through the [`Achievements`] provider.
//!
//! [`Achievements`]: crate::provider::Achievements

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An awarded (or revoked) learner achievement.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Achievement {
    /// Achievement identifier.
    pub uuid: Uuid,

    /// Lifecycle status.
    pub status: AchievementStatus,

    /// Explicit certificate title, when configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// When the achievement was last modified.
    pub modified: DateTime<Utc>,

    /// Full name of the recipient, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,

    /// Name of the platform the achievement was earned on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_name: Option<String>,

    /// What was achieved.
    pub kind: AchievementKind,
}

impl Achievement {
    /// Whether the achievement can no longer be issued as a credential.
    #[must_use]
    pub const fn is_inactive(&self) -> bool {
        self.status.is_inactive()
    }
}

/// Achievement lifecycle status.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AchievementStatus {
    /// The achievement is active.
    #[default]
    Awarded,

    /// The achievement was withdrawn.
    Revoked,
}

impl AchievementStatus {
    /// Statuses that block issuance.
    #[must_use]
    pub const fn is_inactive(self) -> bool {
        matches!(self, Self::Revoked)
    }
}

/// The kind of certificate an achievement represents.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AchievementKind {
    /// Certificate for completing a program.
    Program(Program),

    /// Certificate for passing a course.
    Course(Course),

    /// Anything else. Composition omits kind-specific content.
    #[serde(other)]
    Other,
}

/// A program of courses.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Program {
    /// Program identifier.
    pub uuid: Uuid,

    /// Program title.
    pub title: String,

    /// Names of the organizations authoring the program.
    #[serde(default)]
    pub authoring_organizations: Vec<String>,

    /// Total hours of effort, when published.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours_of_effort: Option<u32>,

    /// Number of course runs in the program.
    #[serde(default)]
    pub course_runs: usize,
}

/// A course run.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Course {
    /// Course title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Course run key.
    pub course_run_id: String,
}
