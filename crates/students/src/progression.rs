//! The grade progression rule table.
//!
//! Pure lookup over [`GradeLevel`]; defined once, consulted read-only.

use serde::{Deserialize, Serialize};

use crate::grade::{CompletionCategory, GradeError, GradeLevel, SchoolType};

/// Outcome of advancing one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Progression {
    /// The student moves to the next grade/form.
    Promoted(GradeLevel),
    /// The student has finished the highest level of their phase.
    Completed(CompletionCategory),
}

/// Look up the next level for a student at `level` in a school of `school_type`.
///
/// Rules:
/// - Grade 1..=6 -> Grade n+1; Grade 7 -> `CompletedPrimary`
/// - Form 1..=3 -> Form n+1; Form 4 -> `CompletedOLevel`
/// - Form 5 -> Form 6; Form 6 -> `CompletedALevel`
///
/// A level the school's phase does not offer is an error, caught per student
/// by the orchestrator rather than aborting a run.
pub fn next_level(level: GradeLevel, school_type: SchoolType) -> Result<Progression, GradeError> {
    if !level.valid_for(school_type) {
        return Err(GradeError::WrongSchoolType { level, school_type });
    }

    let outcome = match level {
        GradeLevel::Primary(n @ 1..=6) => Progression::Promoted(GradeLevel::Primary(n + 1)),
        GradeLevel::Primary(7) => Progression::Completed(CompletionCategory::CompletedPrimary),
        GradeLevel::OLevel(n @ 1..=3) => Progression::Promoted(GradeLevel::OLevel(n + 1)),
        GradeLevel::OLevel(4) => Progression::Completed(CompletionCategory::CompletedOLevel),
        GradeLevel::ALevel(5) => Progression::Promoted(GradeLevel::ALevel(6)),
        GradeLevel::ALevel(6) => Progression::Completed(CompletionCategory::CompletedALevel),
        // Out-of-range variants cannot come from the boundary parser.
        other => return Err(GradeError::Unknown(other.to_string())),
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn primary_grades_advance_until_grade_seven_completes() {
        for n in 1..=6u8 {
            let got = next_level(GradeLevel::Primary(n), SchoolType::Primary).unwrap();
            assert_eq!(got, Progression::Promoted(GradeLevel::Primary(n + 1)));
        }
        assert_eq!(
            next_level(GradeLevel::Primary(7), SchoolType::Primary).unwrap(),
            Progression::Completed(CompletionCategory::CompletedPrimary)
        );
    }

    #[test]
    fn o_level_forms_advance_until_form_four_completes() {
        for n in 1..=3u8 {
            let got = next_level(GradeLevel::OLevel(n), SchoolType::Secondary).unwrap();
            assert_eq!(got, Progression::Promoted(GradeLevel::OLevel(n + 1)));
        }
        assert_eq!(
            next_level(GradeLevel::OLevel(4), SchoolType::Secondary).unwrap(),
            Progression::Completed(CompletionCategory::CompletedOLevel)
        );
    }

    #[test]
    fn a_level_form_five_advances_and_form_six_completes() {
        assert_eq!(
            next_level(GradeLevel::ALevel(5), SchoolType::Combined).unwrap(),
            Progression::Promoted(GradeLevel::ALevel(6))
        );
        assert_eq!(
            next_level(GradeLevel::ALevel(6), SchoolType::Secondary).unwrap(),
            Progression::Completed(CompletionCategory::CompletedALevel)
        );
    }

    #[test]
    fn phase_mismatch_is_an_error_not_a_no_op() {
        let err = next_level(GradeLevel::OLevel(2), SchoolType::Primary).unwrap_err();
        assert!(matches!(err, GradeError::WrongSchoolType { .. }));

        let err = next_level(GradeLevel::Primary(3), SchoolType::Secondary).unwrap_err();
        assert!(matches!(err, GradeError::WrongSchoolType { .. }));
    }

    fn arb_level() -> impl Strategy<Value = GradeLevel> {
        prop_oneof![
            (1..=7u8).prop_map(GradeLevel::Primary),
            (1..=4u8).prop_map(GradeLevel::OLevel),
            (5..=6u8).prop_map(GradeLevel::ALevel),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: canonical labels round-trip through the boundary parser.
        #[test]
        fn canonical_labels_round_trip(level in arb_level()) {
            let parsed = GradeLevel::parse(&level.to_string()).unwrap();
            prop_assert_eq!(parsed, level);
        }

        /// Property: repeatedly applying the rule table from any valid level
        /// reaches a completion in a bounded number of steps (no cycles).
        #[test]
        fn progression_always_terminates(start in arb_level()) {
            let mut level = start;
            let mut steps = 0;
            loop {
                match next_level(level, SchoolType::Combined).unwrap() {
                    Progression::Promoted(next) => {
                        prop_assert!(next != level, "promotion must change the level");
                        level = next;
                    }
                    Progression::Completed(_) => break,
                }
                steps += 1;
                prop_assert!(steps <= 7, "progression chain too long from {:?}", start);
            }
        }
    }
}
