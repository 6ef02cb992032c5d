//! The persistence collaborator for ledger entries.
//!
//! The engine only ever talks to this surface: partition-scoped finds with
//! a `(date, id)` sort, lookup/insert/update/delete by id. Both stores must
//! apply the exact same total order, or the engine's previous-entry and
//! tail queries could disagree about where a pivot sits.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use munim_core::TenantId;
use munim_ledger::{EntryDraft, EntryId, LedgerEntry, Position};
use munim_parties::SupplierId;

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryLedgerStore;
pub use postgres::PostgresLedgerStore;

/// Storage operation error.
///
/// Infrastructure failures only; domain failures (validation, not-found)
/// live in `munim_core::DomainError`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Insert with an id that already exists.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// Any other backend failure (connection, constraint, poisoned lock).
    #[error("storage backend error in {operation}: {message}")]
    Backend { operation: String, message: String },
}

impl StoreError {
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Position bound applied on top of the partition filter, in the canonical
/// `(date, id)` order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PositionBound {
    /// Strictly before the pivot.
    Below(Position),
    /// Strictly after the pivot.
    Above(Position),
    /// At or after the pivot.
    AtOrAbove(Position),
}

/// Query filter: always partition-scoped (tenant + supplier), optionally
/// position-bounded.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EntryFilter {
    pub tenant_id: TenantId,
    pub supplier_id: SupplierId,
    pub bound: Option<PositionBound>,
}

impl EntryFilter {
    pub fn partition(tenant_id: TenantId, supplier_id: SupplierId) -> Self {
        Self {
            tenant_id,
            supplier_id,
            bound: None,
        }
    }

    pub fn below(mut self, pivot: Position) -> Self {
        self.bound = Some(PositionBound::Below(pivot));
        self
    }

    pub fn above(mut self, pivot: Position) -> Self {
        self.bound = Some(PositionBound::Above(pivot));
        self
    }

    pub fn at_or_above(mut self, pivot: Position) -> Self {
        self.bound = Some(PositionBound::AtOrAbove(pivot));
        self
    }

    /// Whether `entry` satisfies this filter. The in-memory store evaluates
    /// filters with this; the Postgres store compiles them to SQL that must
    /// agree with it.
    pub fn matches(&self, entry: &LedgerEntry) -> bool {
        if entry.tenant_id != self.tenant_id || entry.supplier_id != self.supplier_id {
            return false;
        }
        match self.bound {
            None => true,
            Some(PositionBound::Below(p)) => entry.position() < p,
            Some(PositionBound::Above(p)) => entry.position() > p,
            Some(PositionBound::AtOrAbove(p)) => entry.position() >= p,
        }
    }
}

/// Sort direction over the canonical `(date, id)` order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Fields that `update_by_id` may overwrite; `None` leaves the stored value
/// untouched. Cascades write balance-only patches; the update operation
/// writes full-field patches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub particulars: Option<String>,
    pub voucher_type: Option<String>,
    pub voucher_no: Option<String>,
    pub debit: Option<i64>,
    pub credit: Option<i64>,
    pub supplier_id: Option<SupplierId>,
    pub balance: Option<i64>,
}

impl EntryPatch {
    /// Balance-only patch, as written by a recomputation cascade.
    pub fn balance(value: i64) -> Self {
        Self {
            balance: Some(value),
            ..Self::default()
        }
    }

    /// Full-field patch from an update payload. The balance is left alone;
    /// the engine rewrites it in the rebalance pass that follows.
    pub fn fields(draft: &EntryDraft) -> Self {
        Self {
            date: Some(draft.date),
            particulars: Some(draft.particulars.clone()),
            voucher_type: Some(draft.voucher_type.clone()),
            voucher_no: Some(draft.voucher_no.clone()),
            debit: Some(draft.debit),
            credit: Some(draft.credit),
            supplier_id: Some(draft.supplier_id),
            balance: None,
        }
    }

    /// Apply to an entry in place (the in-memory store's update path).
    pub fn apply(&self, entry: &mut LedgerEntry) {
        if let Some(date) = self.date {
            entry.date = date;
        }
        if let Some(ref particulars) = self.particulars {
            entry.particulars = particulars.clone();
        }
        if let Some(ref voucher_type) = self.voucher_type {
            entry.voucher_type = voucher_type.clone();
        }
        if let Some(ref voucher_no) = self.voucher_no {
            entry.voucher_no = voucher_no.clone();
        }
        if let Some(debit) = self.debit {
            entry.debit = debit;
        }
        if let Some(credit) = self.credit {
            entry.credit = credit;
        }
        if let Some(supplier_id) = self.supplier_id {
            entry.supplier_id = supplier_id;
        }
        if let Some(balance) = self.balance {
            entry.balance = balance;
        }
    }
}

/// Document-style store for ledger entries.
///
/// Ids are assigned by the caller before `insert` (UUIDv7), so the store
/// persists them as given. `delete_by_id` returns the deleted record so the
/// caller can read its pre-deletion partition and position.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn find(&self, filter: EntryFilter, order: SortOrder)
        -> Result<Vec<LedgerEntry>, StoreError>;

    async fn find_one(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError>;

    async fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError>;

    async fn update_by_id(
        &self,
        id: EntryId,
        patch: EntryPatch,
    ) -> Result<Option<LedgerEntry>, StoreError>;

    async fn delete_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError>;
}

#[async_trait]
impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    async fn find(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        (**self).find(filter, order).await
    }

    async fn find_one(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        (**self).find_one(filter, order).await
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        (**self).find_by_id(id).await
    }

    async fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        (**self).insert(entry).await
    }

    async fn update_by_id(
        &self,
        id: EntryId,
        patch: EntryPatch,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        (**self).update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        (**self).delete_by_id(id).await
    }
}
