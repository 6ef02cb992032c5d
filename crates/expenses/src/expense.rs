use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};

/// Expense identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(pub RecordId);

impl ExpenseId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Operating expense. Amount is in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub tenant_id: TenantId,
    pub amount: i64,
    pub date: NaiveDate,
    pub category: String,
    pub vendor: String,
    pub notes: Option<String>,
}

/// Incoming expense fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub amount: i64,
    pub date: NaiveDate,
    pub category: String,
    pub vendor: String,
    pub notes: Option<String>,
}

impl ExpenseDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.amount <= 0 {
            return Err(DomainError::validation("amount must be positive"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("category is required"));
        }
        if self.vendor.trim().is_empty() {
            return Err(DomainError::validation("vendor is required"));
        }
        Ok(())
    }
}

impl Expense {
    pub fn create(id: ExpenseId, tenant_id: TenantId, draft: ExpenseDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            tenant_id,
            amount: draft.amount,
            date: draft.date,
            category: draft.category,
            vendor: draft.vendor,
            notes: draft.notes,
        })
    }

    pub fn apply(&mut self, draft: ExpenseDraft) -> DomainResult<()> {
        draft.validate()?;
        self.amount = draft.amount;
        self.date = draft.date;
        self.category = draft.category;
        self.vendor = draft.vendor;
        self.notes = draft.notes;
        Ok(())
    }
}

impl Entity for Expense {
    type Id = ExpenseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
