use serde::{Deserialize, Serialize};

use campusledger_core::{DomainError, DomainResult, ValueObject};

/// One academic year/term a run targets, e.g. "2027-T1".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AcademicCycle {
    year: i32,
    term: u8,
}

impl AcademicCycle {
    /// Terms run 1..=3.
    pub fn new(year: i32, term: u8) -> DomainResult<Self> {
        if !(1..=3).contains(&term) {
            return Err(DomainError::validation(format!(
                "term must be 1..=3, got {term}"
            )));
        }
        Ok(Self { year, term })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn term(&self) -> u8 {
        self.term
    }

    /// The cycle one promotion period later: the same term of the next year.
    pub fn next(&self) -> Self {
        Self {
            year: self.year + 1,
            term: self.term,
        }
    }
}

impl ValueObject for AcademicCycle {}

impl core::fmt::Display for AcademicCycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-T{}", self.year, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_advances_the_year_keeping_the_term() {
        let cycle = AcademicCycle::new(2026, 1).unwrap();
        assert_eq!(cycle.next(), AcademicCycle::new(2027, 1).unwrap());
        assert_eq!(cycle.next().to_string(), "2027-T1");
    }

    #[test]
    fn out_of_range_terms_are_rejected() {
        assert!(AcademicCycle::new(2026, 0).is_err());
        assert!(AcademicCycle::new(2026, 4).is_err());
    }
}
