use serde::{Deserialize, Serialize};
use thiserror::Error;

/// School phase classification for a tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolType {
    Primary,
    Secondary,
    Combined,
}

/// Terminal academic status reached at the top of a school phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionCategory {
    CompletedPrimary,
    CompletedOLevel,
    CompletedALevel,
}

impl core::fmt::Display for CompletionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            CompletionCategory::CompletedPrimary => "COMPLETED_PRIMARY",
            CompletionCategory::CompletedOLevel => "COMPLETED_O_LEVEL",
            CompletionCategory::CompletedALevel => "COMPLETED_A_LEVEL",
        };
        f.write_str(s)
    }
}

/// Grade parsing / validity error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GradeError {
    /// The label could not be parsed into a known grade or form.
    #[error("unknown grade label: {0:?}")]
    Unknown(String),

    /// The level exists but is not offered by the school's phase.
    #[error("{level} is not offered by a {school_type:?} school")]
    WrongSchoolType {
        level: GradeLevel,
        school_type: SchoolType,
    },
}

/// A parsed academic level.
///
/// - `Primary(n)`: Grade 1..=7
/// - `OLevel(n)`: Form 1..=4
/// - `ALevel(n)`: Form 5..=6
///
/// Invariant: instances produced by [`GradeLevel::parse`] are always in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeLevel {
    Primary(u8),
    OLevel(u8),
    ALevel(u8),
}

impl GradeLevel {
    /// Parse a free-text grade label ("Grade 4", "form 2", " FORM 6 ").
    ///
    /// Tolerates case and surrounding/internal whitespace; anything else is
    /// [`GradeError::Unknown`] — never a silent no-op.
    pub fn parse(label: &str) -> Result<Self, GradeError> {
        let unknown = || GradeError::Unknown(label.to_string());
        let trimmed = label.trim();

        let (word, digits) = split_label(trimmed).ok_or_else(unknown)?;
        let n: u8 = digits.parse().map_err(|_| unknown())?;

        match word.to_ascii_lowercase().as_str() {
            "grade" if (1..=7).contains(&n) => Ok(GradeLevel::Primary(n)),
            "form" if (1..=4).contains(&n) => Ok(GradeLevel::OLevel(n)),
            "form" if (5..=6).contains(&n) => Ok(GradeLevel::ALevel(n)),
            _ => Err(unknown()),
        }
    }

    /// Whether this level is offered by a school of the given phase.
    pub fn valid_for(&self, school_type: SchoolType) -> bool {
        match (self, school_type) {
            (_, SchoolType::Combined) => true,
            (GradeLevel::Primary(_), SchoolType::Primary) => true,
            (GradeLevel::OLevel(_) | GradeLevel::ALevel(_), SchoolType::Secondary) => true,
            _ => false,
        }
    }

    /// The numeric year within the label ("Grade 3" -> 3, "Form 5" -> 5).
    pub fn year(&self) -> u8 {
        match self {
            GradeLevel::Primary(n) | GradeLevel::OLevel(n) | GradeLevel::ALevel(n) => *n,
        }
    }
}

/// Split "Grade 4" / "grade4" into the word and digit parts.
fn split_label(s: &str) -> Option<(&str, &str)> {
    let digit_start = s.find(|c: char| c.is_ascii_digit())?;
    let (word, digits) = s.split_at(digit_start);
    let word = word.trim();
    if word.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((word, digits))
}

impl core::fmt::Display for GradeLevel {
    /// Canonical label form: "Grade N" / "Form N".
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GradeLevel::Primary(n) => write!(f, "Grade {n}"),
            GradeLevel::OLevel(n) | GradeLevel::ALevel(n) => write!(f, "Form {n}"),
        }
    }
}

impl core::str::FromStr for GradeLevel {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GradeLevel::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_grades_and_forms() {
        assert_eq!(GradeLevel::parse("Grade 1").unwrap(), GradeLevel::Primary(1));
        assert_eq!(GradeLevel::parse("Grade 7").unwrap(), GradeLevel::Primary(7));
        assert_eq!(GradeLevel::parse("Form 1").unwrap(), GradeLevel::OLevel(1));
        assert_eq!(GradeLevel::parse("Form 4").unwrap(), GradeLevel::OLevel(4));
        assert_eq!(GradeLevel::parse("Form 5").unwrap(), GradeLevel::ALevel(5));
        assert_eq!(GradeLevel::parse("Form 6").unwrap(), GradeLevel::ALevel(6));
    }

    #[test]
    fn parsing_is_case_and_whitespace_tolerant() {
        assert_eq!(GradeLevel::parse(" grade 3 ").unwrap(), GradeLevel::Primary(3));
        assert_eq!(GradeLevel::parse("FORM 2").unwrap(), GradeLevel::OLevel(2));
        assert_eq!(GradeLevel::parse("form6").unwrap(), GradeLevel::ALevel(6));
    }

    #[test]
    fn out_of_range_or_garbage_labels_are_unknown() {
        for label in ["Grade 0", "Grade 8", "Form 0", "Form 7", "Year 3", "", "Grade", "7"] {
            let err = GradeLevel::parse(label).unwrap_err();
            assert!(matches!(err, GradeError::Unknown(_)), "label {label:?}");
        }
    }

    #[test]
    fn validity_follows_school_phase() {
        assert!(GradeLevel::Primary(3).valid_for(SchoolType::Primary));
        assert!(!GradeLevel::Primary(3).valid_for(SchoolType::Secondary));
        assert!(GradeLevel::OLevel(2).valid_for(SchoolType::Secondary));
        assert!(!GradeLevel::OLevel(2).valid_for(SchoolType::Primary));
        assert!(GradeLevel::ALevel(6).valid_for(SchoolType::Combined));
        assert!(GradeLevel::Primary(7).valid_for(SchoolType::Combined));
    }

    #[test]
    fn display_renders_canonical_labels() {
        assert_eq!(GradeLevel::Primary(4).to_string(), "Grade 4");
        assert_eq!(GradeLevel::OLevel(4).to_string(), "Form 4");
        assert_eq!(GradeLevel::ALevel(5).to_string(), "Form 5");
    }
}
