use serde::{Deserialize, Serialize};

use campusledger_core::{DomainError, DomainResult};

/// One billed line of a fee structure (tuition, levy, sports, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeComponent {
    pub name: String,
    /// Amount in smallest currency unit (e.g., cents).
    pub amount: u64,
}

impl FeeComponent {
    pub fn new(name: impl Into<String>, amount: u64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// A deduction applied against the gross amount (sibling, staff, bursary, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    pub name: String,
    /// Amount in smallest currency unit.
    pub amount: u64,
}

impl Discount {
    pub fn new(name: impl Into<String>, amount: u64) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

/// The billing definition for one destination grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeStructure {
    /// Billing category (e.g. "day", "boarding").
    pub category: String,
    pub components: Vec<FeeComponent>,
    pub discounts: Vec<Discount>,
}

impl FeeStructure {
    pub fn new(category: impl Into<String>, components: Vec<FeeComponent>) -> Self {
        Self {
            category: category.into(),
            components,
            discounts: Vec::new(),
        }
    }

    pub fn with_discounts(mut self, discounts: Vec<Discount>) -> Self {
        self.discounts = discounts;
        self
    }

    /// Sum of all components (checked).
    pub fn gross(&self) -> DomainResult<u64> {
        let mut total: u64 = 0;
        for component in &self.components {
            total = total
                .checked_add(component.amount)
                .ok_or_else(|| DomainError::invariant("fee structure gross overflow"))?;
        }
        Ok(total)
    }

    /// Sum of all discounts (checked).
    pub fn discount_total(&self) -> DomainResult<u64> {
        let mut total: u64 = 0;
        for discount in &self.discounts {
            total = total
                .checked_add(discount.amount)
                .ok_or_else(|| DomainError::invariant("fee structure discount overflow"))?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gross_and_discount_totals_sum_components() {
        let structure = FeeStructure::new(
            "day",
            vec![
                FeeComponent::new("tuition", 10_000),
                FeeComponent::new("levy", 1_000),
            ],
        )
        .with_discounts(vec![Discount::new("sibling", 500)]);

        assert_eq!(structure.gross().unwrap(), 11_000);
        assert_eq!(structure.discount_total().unwrap(), 500);
    }

    #[test]
    fn gross_overflow_is_an_invariant_violation() {
        let structure = FeeStructure::new(
            "day",
            vec![
                FeeComponent::new("a", u64::MAX),
                FeeComponent::new("b", 1),
            ],
        );
        assert!(matches!(
            structure.gross(),
            Err(DomainError::InvariantViolation(_))
        ));
    }
}
