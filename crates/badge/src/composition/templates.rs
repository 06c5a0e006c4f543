//! Human-readable names, descriptions and criteria narratives for
//! achievements.

use crate::achievement::{Achievement, AchievementKind, Program};

/// Upper-case the first character only, leaving the rest untouched.
#[must_use]
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| first.to_uppercase().chain(chars).collect())
}

/// Short label for the kind of certificate.
#[must_use]
pub const fn credential_verbose_type(kind: &AchievementKind) -> Option<&'static str> {
    match kind {
        AchievementKind::Program(_) => Some("program certificate"),
        AchievementKind::Course(_) => Some("course certificate"),
        AchievementKind::Other => None,
    }
}

/// The credential name: the achievement's title when set, then a course's
/// own title, otherwise generated from its kind.
#[must_use]
pub fn credential_name(achievement: &Achievement) -> Option<String> {
    let title = achievement.title.as_deref().or_else(|| match &achievement.kind {
        AchievementKind::Course(course) => course.title.as_deref(),
        _ => None,
    });
    if let Some(title) = title.filter(|t| !t.is_empty()) {
        return Some(title.to_string());
    }

    let name = match &achievement.kind {
        AchievementKind::Program(program) => {
            format!("program certificate for passing a program {}", program.title)
        }
        AchievementKind::Course(_) => "course certificate".to_string(),
        AchievementKind::Other => return None,
    };
    Some(capitalize_first(&name))
}

/// Achievement description. Course certificates have none.
#[must_use]
pub fn credential_description(achievement: &Achievement) -> Option<String> {
    let AchievementKind::Program(program) = &achievement.kind else {
        return None;
    };

    let effort = program
        .total_hours_of_effort
        .filter(|hours| *hours > 0)
        .map(|hours| format!(", with total {hours} Hours of effort required to complete it"))
        .unwrap_or_default();

    let description = format!(
        "{credential_type} is granted on program {title} completion offered by {organizations}, in collaboration with {platform}. The {title} program includes {courses} course(s){effort}.",
        credential_type = credential_verbose_type(&achievement.kind).unwrap_or_default(),
        title = program.title,
        organizations = organizations(program),
        platform = achievement.platform_name.as_deref().unwrap_or_default(),
        courses = program.course_runs,
    );
    Some(capitalize_first(&description))
}

/// Achievement criteria narrative. Course certificates have none.
#[must_use]
pub fn credential_narrative(achievement: &Achievement) -> Option<String> {
    let AchievementKind::Program(program) = &achievement.kind else {
        return None;
    };

    let recipient =
        achievement.recipient.as_deref().filter(|r| !r.is_empty()).unwrap_or("recipient");
    let narrative = format!(
        "{recipient} successfully completed all courses and received passing grades for a Professional Certificate in {title} a program offered by {organizations}, in collaboration with {platform}.",
        title = program.title,
        organizations = organizations(program),
        platform = achievement.platform_name.as_deref().unwrap_or_default(),
    );
    Some(capitalize_first(&narrative))
}

fn organizations(program: &Program) -> String {
    program.authoring_organizations.join(", ")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::achievement::{AchievementStatus, Course};

    fn program_achievement() -> Achievement {
        Achievement {
            uuid: Uuid::new_v4(),
            status: AchievementStatus::Awarded,
            title: None,
            modified: Utc::now(),
            recipient: None,
            platform_name: Some("Open edX".to_string()),
            kind: AchievementKind::Program(Program {
                uuid: Uuid::new_v4(),
                title: "Astronomy".to_string(),
                authoring_organizations: vec!["MITx".to_string(), "HarvardX".to_string()],
                total_hours_of_effort: Some(12),
                course_runs: 3,
            }),
        }
    }

    #[test]
    fn capitalize() {
        assert_eq!(capitalize_first("program certificate"), "Program certificate");
        assert_eq!(capitalize_first("éCOLE"), "ÉCOLE");
        assert_eq!(capitalize_first("ßtraße"), "SStraße");
        assert_eq!(capitalize_first(""), "");
    }

    #[test]
    fn program_texts() {
        let achievement = program_achievement();

        assert_eq!(
            credential_name(&achievement).as_deref(),
            Some("Program certificate for passing a program Astronomy")
        );
        assert_eq!(
            credential_description(&achievement).as_deref(),
            Some(
                "Program certificate is granted on program Astronomy completion offered by MITx, HarvardX, in collaboration with Open edX. The Astronomy program includes 3 course(s), with total 12 Hours of effort required to complete it."
            )
        );
        assert_eq!(
            credential_narrative(&achievement).as_deref(),
            Some(
                "Recipient successfully completed all courses and received passing grades for a Professional Certificate in Astronomy a program offered by MITx, HarvardX, in collaboration with Open edX."
            )
        );
    }

    #[test]
    fn explicit_title_wins() {
        let achievement =
            Achievement { title: Some("Rocket Science".to_string()), ..program_achievement() };
        assert_eq!(credential_name(&achievement).as_deref(), Some("Rocket Science"));
    }

    #[test]
    fn no_effort() {
        let mut achievement = program_achievement();
        if let AchievementKind::Program(program) = &mut achievement.kind {
            program.total_hours_of_effort = None;
        }
        let description = credential_description(&achievement).expect("should describe");
        assert!(description.ends_with("includes 3 course(s)."));
    }

    fn course_achievement(title: Option<&str>) -> Achievement {
        Achievement {
            kind: AchievementKind::Course(Course {
                title: title.map(ToString::to_string),
                course_run_id: "course-v1:edX+DemoX+2024".to_string(),
            }),
            ..program_achievement()
        }
    }

    #[test]
    fn course_texts() {
        let achievement = course_achievement(Some("Intro"));

        assert_eq!(credential_name(&achievement).as_deref(), Some("Intro"));
        assert_eq!(credential_description(&achievement), None);
        assert_eq!(credential_narrative(&achievement), None);
    }

    #[test]
    fn course_without_title() {
        assert_eq!(
            credential_name(&course_achievement(None)).as_deref(),
            Some("Course certificate")
        );
        assert_eq!(
            credential_name(&course_achievement(Some(""))).as_deref(),
            Some("Course certificate")
        );

        let titled =
            Achievement { title: Some("Honours".to_string()), ..course_achievement(Some("Intro")) };
        assert_eq!(credential_name(&titled).as_deref(), Some("Honours"));
    }
}
