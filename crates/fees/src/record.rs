use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use campusledger_core::{AggregateId, DomainError, DomainResult, Entity, TenantId};
use campusledger_students::StudentId;

use crate::cycle::AcademicCycle;
use crate::structure::FeeStructure;

/// Fee record identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeRecordId(pub AggregateId);

impl FeeRecordId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for FeeRecordId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One student's fee account for one academic cycle.
///
/// `previous_balance` is the outstanding amount carried forward from the most
/// recent prior record; whether it is non-zero is the caller's decision (the
/// promotion run's carry-forward flag), not this type's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeRecord {
    id: FeeRecordId,
    tenant_id: TenantId,
    student_id: StudentId,
    cycle: AcademicCycle,
    category: String,
    gross_amount: u64,
    discount_total: u64,
    previous_balance: u64,
    amount_paid: u64,
    created_at: DateTime<Utc>,
}

impl FeeRecord {
    /// Build the fee record created when a student is promoted into a new
    /// grade for `cycle`. Purely computational; validates the structure's
    /// numbers and leaves `amount_paid` at zero.
    pub fn for_promotion(
        id: FeeRecordId,
        tenant_id: TenantId,
        student_id: StudentId,
        cycle: AcademicCycle,
        structure: &FeeStructure,
        previous_balance: u64,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if structure.components.is_empty() {
            return Err(DomainError::validation(
                "cannot create fee record from a structure without components",
            ));
        }

        let gross_amount = structure.gross()?;
        let discount_total = structure.discount_total()?;
        if discount_total > gross_amount {
            return Err(DomainError::validation(
                "discounts exceed the gross amount",
            ));
        }

        // Outstanding must stay representable: net + previous balance.
        (gross_amount - discount_total)
            .checked_add(previous_balance)
            .ok_or_else(|| DomainError::invariant("fee record balance overflow"))?;

        Ok(Self {
            id,
            tenant_id,
            student_id,
            cycle,
            category: structure.category.clone(),
            gross_amount,
            discount_total,
            previous_balance,
            amount_paid: 0,
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> FeeRecordId {
        self.id
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    pub fn cycle(&self) -> AcademicCycle {
        self.cycle
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn gross_amount(&self) -> u64 {
        self.gross_amount
    }

    pub fn discount_total(&self) -> u64 {
        self.discount_total
    }

    pub fn previous_balance(&self) -> u64 {
        self.previous_balance
    }

    pub fn amount_paid(&self) -> u64 {
        self.amount_paid
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Gross minus discounts.
    pub fn net_amount(&self) -> u64 {
        self.gross_amount - self.discount_total
    }

    /// Net amount plus the carried-forward balance, minus payments.
    pub fn outstanding(&self) -> u64 {
        (self.net_amount() + self.previous_balance).saturating_sub(self.amount_paid)
    }

    /// Record a payment against this record.
    ///
    /// Invariant: cannot overpay past the outstanding amount.
    pub fn register_payment(&mut self, amount: u64) -> DomainResult<()> {
        if amount == 0 {
            return Err(DomainError::validation("payment amount must be positive"));
        }
        if amount > self.outstanding() {
            return Err(DomainError::invariant("cannot overpay fee record"));
        }
        self.amount_paid = self
            .amount_paid
            .checked_add(amount)
            .ok_or_else(|| DomainError::invariant("payment total overflow"))?;
        Ok(())
    }
}

impl Entity for FeeRecord {
    type Id = FeeRecordId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
