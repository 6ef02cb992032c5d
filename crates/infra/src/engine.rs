//! The ledger balance engine.
//!
//! Maintains, per `(tenant, supplier)` partition, the running-balance
//! invariant: sorted by `(date, id)`, every entry's `balance` equals the
//! prefix sum of `debit - credit` from the start of the partition through
//! that entry. Out-of-order inserts, in-place updates, and deletes all
//! trigger a tail recomputation from the mutated position onward.
//!
//! Mutations serialize on a per-partition async lock held across the whole
//! read-recompute-write sequence, so concurrent cascades against the same
//! partition cannot interleave. The cascade itself is still a series of
//! individual store writes (no transaction), so a crash mid-cascade can
//! leave later entries stale until the next mutation of that partition
//! rewalks them; a store failure mid-cascade is returned to the caller,
//! never masked as success.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::instrument;

use munim_core::{DomainError, RecordId, TenantId};
use munim_ledger::{balance, EntryDraft, EntryId, LedgerEntry, Position};
use munim_parties::SupplierId;

use crate::store::{EntryFilter, EntryPatch, LedgerStore, SortOrder, StoreError};

/// Engine operation error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

type PartitionKey = (TenantId, SupplierId);

/// Registry of per-partition locks. Lock objects are created on first use
/// and never dropped; a tenant's supplier count bounds the map size.
#[derive(Debug, Default)]
struct PartitionLocks {
    inner: StdMutex<HashMap<PartitionKey, Arc<AsyncMutex<()>>>>,
}

impl PartitionLocks {
    fn get(&self, key: PartitionKey) -> Arc<AsyncMutex<()>> {
        let mut map = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(key).or_default().clone()
    }
}

/// Balance maintenance over a [`LedgerStore`].
#[derive(Debug)]
pub struct LedgerBalanceEngine<S> {
    store: S,
    locks: PartitionLocks,
}

impl<S: LedgerStore> LedgerBalanceEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: PartitionLocks::default(),
        }
    }

    /// All entries of the partition, `(date, id)` ascending. Read-only; an
    /// empty partition yields an empty list.
    pub async fn list_for_supplier(
        &self,
        tenant_id: TenantId,
        supplier_id: SupplierId,
    ) -> Result<Vec<LedgerEntry>, EngineError> {
        Ok(self
            .store
            .find(
                EntryFilter::partition(tenant_id, supplier_id),
                SortOrder::Ascending,
            )
            .await?)
    }

    /// Insert a new entry at its `(date, id)` position and shift every
    /// later entry's balance.
    #[instrument(skip(self, draft), fields(tenant_id = %tenant_id, supplier_id = %draft.supplier_id), err)]
    pub async fn create_entry(
        &self,
        tenant_id: TenantId,
        draft: EntryDraft,
    ) -> Result<LedgerEntry, EngineError> {
        draft.validate()?;

        let key = (tenant_id, draft.supplier_id);
        let _guard = self.locks.get(key).lock_owned().await;

        let id = EntryId::new(RecordId::new());
        let pivot = Position {
            date: draft.date,
            id,
        };
        let previous = self.previous_balance(key, pivot).await?;
        let net = draft.net();
        let entry = draft.into_entry(id, tenant_id, previous + net);
        self.store.insert(entry.clone()).await?;
        self.cascade_above(key, pivot, entry.balance).await?;
        Ok(entry)
    }

    /// Overwrite an entry's fields in place, then restore the invariant in
    /// every affected partition.
    ///
    /// When the supplier changes, both the old and the new partition are
    /// rebalanced; when only the date moves, the rebalance starts at the
    /// earlier of the old and new positions so entries between them are
    /// corrected too. The owning tenant is never part of the payload.
    #[instrument(skip(self, draft), fields(tenant_id = %tenant_id, entry_id = %id), err)]
    pub async fn update_entry(
        &self,
        tenant_id: TenantId,
        id: EntryId,
        draft: EntryDraft,
    ) -> Result<LedgerEntry, EngineError> {
        draft.validate()?;

        let (existing, _guards) = self
            .lock_for_update(tenant_id, id, draft.supplier_id)
            .await?;
        let old_key = (tenant_id, existing.supplier_id);
        let new_key = (tenant_id, draft.supplier_id);
        let old_pos = existing.position();
        let new_pos = Position {
            date: draft.date,
            id,
        };

        self.store
            .update_by_id(id, EntryPatch::fields(&draft))
            .await?
            .ok_or(DomainError::NotFound)?;

        if old_key == new_key {
            self.rebalance_from(new_key, old_pos.min(new_pos)).await?;
        } else {
            self.rebalance_from(new_key, new_pos).await?;
            self.rebalance_from(old_key, old_pos).await?;
        }

        Ok(self
            .store
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?)
    }

    /// Remove an entry and close the gap it leaves in its partition.
    #[instrument(skip(self), fields(tenant_id = %tenant_id, entry_id = %id), err)]
    pub async fn delete_entry(&self, tenant_id: TenantId, id: EntryId) -> Result<(), EngineError> {
        let (existing, _guard) = self.lock_entry_partition(tenant_id, id).await?;
        let key = (tenant_id, existing.supplier_id);

        let deleted = self
            .store
            .delete_by_id(id)
            .await?
            .ok_or(DomainError::NotFound)?;

        self.rebalance_from(key, deleted.position()).await?;
        Ok(())
    }

    /// Balance of the last entry strictly before `pivot`, or 0 at the start
    /// of the partition.
    async fn previous_balance(
        &self,
        key: PartitionKey,
        pivot: Position,
    ) -> Result<i64, EngineError> {
        Ok(self
            .store
            .find_one(
                EntryFilter::partition(key.0, key.1).below(pivot),
                SortOrder::Descending,
            )
            .await?
            .map(|e| e.balance)
            .unwrap_or(0))
    }

    /// Rewrite the balance of every entry strictly after `pivot`, seeded by
    /// the pivot entry's own balance. Zero-length tails write nothing.
    async fn cascade_above(
        &self,
        key: PartitionKey,
        pivot: Position,
        seed: i64,
    ) -> Result<(), EngineError> {
        let tail = self
            .store
            .find(
                EntryFilter::partition(key.0, key.1).above(pivot),
                SortOrder::Ascending,
            )
            .await?;
        self.write_balances(&tail, seed).await
    }

    /// Rewrite the balance of every entry at or after `from`, seeded by the
    /// entry immediately before it.
    async fn rebalance_from(&self, key: PartitionKey, from: Position) -> Result<(), EngineError> {
        let seed = self.previous_balance(key, from).await?;
        let tail = self
            .store
            .find(
                EntryFilter::partition(key.0, key.1).at_or_above(from),
                SortOrder::Ascending,
            )
            .await?;
        self.write_balances(&tail, seed).await
    }

    async fn write_balances(&self, tail: &[LedgerEntry], seed: i64) -> Result<(), EngineError> {
        let balances = balance::running_balances(seed, tail);
        for (entry, value) in tail.iter().zip(balances) {
            self.store
                .update_by_id(entry.id, EntryPatch::balance(value))
                .await?
                .ok_or(DomainError::NotFound)?;
        }
        tracing::debug!(rewritten = tail.len(), "tail rebalanced");
        Ok(())
    }

    /// Resolve the entry and lock its partition, re-reading after the lock
    /// in case a concurrent update moved it while we waited.
    async fn lock_entry_partition(
        &self,
        tenant_id: TenantId,
        id: EntryId,
    ) -> Result<(LedgerEntry, OwnedMutexGuard<()>), EngineError> {
        loop {
            let entry = self.resolve_owned(tenant_id, id).await?;
            let guard = self
                .locks
                .get((tenant_id, entry.supplier_id))
                .lock_owned()
                .await;
            let current = self.resolve_owned(tenant_id, id).await?;
            if current.supplier_id == entry.supplier_id {
                return Ok((current, guard));
            }
        }
    }

    /// Lock the entry's current partition and the target partition, in
    /// canonical key order so two movers cannot deadlock.
    async fn lock_for_update(
        &self,
        tenant_id: TenantId,
        id: EntryId,
        target_supplier: SupplierId,
    ) -> Result<(LedgerEntry, Guards), EngineError> {
        loop {
            let entry = self.resolve_owned(tenant_id, id).await?;
            let old_key = (tenant_id, entry.supplier_id);
            let new_key = (tenant_id, target_supplier);

            let guards = if old_key == new_key {
                Guards(self.locks.get(old_key).lock_owned().await, None)
            } else {
                let (first, second) = if old_key < new_key {
                    (old_key, new_key)
                } else {
                    (new_key, old_key)
                };
                let g1 = self.locks.get(first).lock_owned().await;
                let g2 = self.locks.get(second).lock_owned().await;
                Guards(g1, Some(g2))
            };

            let current = self.resolve_owned(tenant_id, id).await?;
            if current.supplier_id == entry.supplier_id {
                return Ok((current, guards));
            }
        }
    }

    /// Fetch by id, answering `NotFound` for a missing id or one owned by a
    /// different tenant. Cross-tenant ids are never readable, let alone
    /// mutable.
    async fn resolve_owned(
        &self,
        tenant_id: TenantId,
        id: EntryId,
    ) -> Result<LedgerEntry, EngineError> {
        Ok(self
            .store
            .find_by_id(id)
            .await?
            .filter(|e| e.tenant_id == tenant_id)
            .ok_or(DomainError::NotFound)?)
    }
}

struct Guards(#[allow(dead_code)] OwnedMutexGuard<()>, #[allow(dead_code)] Option<OwnedMutexGuard<()>>);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryLedgerStore;
    use chrono::NaiveDate;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    fn draft(supplier: SupplierId, day: u32, debit: i64, credit: i64) -> EntryDraft {
        EntryDraft {
            date: d(day),
            particulars: "To goods".to_string(),
            voucher_type: "Purchase".to_string(),
            voucher_no: format!("PV-{day}"),
            debit,
            credit,
            supplier_id: supplier,
        }
    }

    fn setup() -> (
        LedgerBalanceEngine<Arc<InMemoryLedgerStore>>,
        Arc<InMemoryLedgerStore>,
        TenantId,
        SupplierId,
    ) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let engine = LedgerBalanceEngine::new(store.clone());
        (engine, store, TenantId::new(), SupplierId::new(RecordId::new()))
    }

    async fn balances(
        engine: &LedgerBalanceEngine<Arc<InMemoryLedgerStore>>,
        tenant: TenantId,
        supplier: SupplierId,
    ) -> Vec<i64> {
        engine
            .list_for_supplier(tenant, supplier)
            .await
            .unwrap()
            .iter()
            .map(|e| e.balance)
            .collect()
    }

    #[tokio::test]
    async fn first_insert_into_empty_partition_nets_own_amount() {
        let (engine, _, tenant, supplier) = setup();
        let entry = engine
            .create_entry(tenant, draft(supplier, 1, 200, 0))
            .await
            .unwrap();
        assert_eq!(entry.balance, 200);
        assert_eq!(balances(&engine, tenant, supplier).await, vec![200]);
    }

    #[tokio::test]
    async fn out_of_order_inserts_keep_prefix_sums() {
        let (engine, _, tenant, supplier) = setup();
        for (day, debit, credit) in [(5, 500, 0), (1, 1_000, 0), (3, 0, 300), (2, 250, 0)] {
            engine
                .create_entry(tenant, draft(supplier, day, debit, credit))
                .await
                .unwrap();
        }

        let listed = engine.list_for_supplier(tenant, supplier).await.unwrap();
        assert!(balance::is_consistent(&listed));
        assert_eq!(
            listed.iter().map(|e| e.balance).collect::<Vec<_>>(),
            vec![1_000, 1_250, 950, 1_450]
        );
        assert_eq!(
            listed.iter().map(|e| e.date).collect::<Vec<_>>(),
            vec![d(1), d(2), d(3), d(5)]
        );
    }

    #[tokio::test]
    async fn insert_in_middle_shifts_tail() {
        let (engine, _, tenant, supplier) = setup();
        engine.create_entry(tenant, draft(supplier, 1, 100, 0)).await.unwrap();
        engine.create_entry(tenant, draft(supplier, 3, 50, 0)).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 150]);

        engine.create_entry(tenant, draft(supplier, 2, 0, 20)).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 80, 130]);
    }

    #[tokio::test]
    async fn delete_recomputes_tail() {
        let (engine, _, tenant, supplier) = setup();
        engine.create_entry(tenant, draft(supplier, 1, 100, 0)).await.unwrap();
        let middle = engine
            .create_entry(tenant, draft(supplier, 2, 0, 20))
            .await
            .unwrap();
        engine.create_entry(tenant, draft(supplier, 3, 50, 0)).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 80, 130]);

        engine.delete_entry(tenant, middle.id).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 150]);
    }

    #[tokio::test]
    async fn deleting_the_last_entry_rewrites_nothing_else() {
        let (engine, _, tenant, supplier) = setup();
        engine.create_entry(tenant, draft(supplier, 1, 100, 0)).await.unwrap();
        let last = engine
            .create_entry(tenant, draft(supplier, 9, 40, 0))
            .await
            .unwrap();

        engine.delete_entry(tenant, last.id).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100]);
    }

    #[tokio::test]
    async fn update_shifts_tail() {
        let (engine, _, tenant, supplier) = setup();
        let first = engine
            .create_entry(tenant, draft(supplier, 1, 100, 0))
            .await
            .unwrap();
        engine.create_entry(tenant, draft(supplier, 2, 50, 0)).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 150]);

        let updated = engine
            .update_entry(tenant, first.id, draft(supplier, 1, 100, 30))
            .await
            .unwrap();
        assert_eq!(updated.balance, 70);
        assert_eq!(balances(&engine, tenant, supplier).await, vec![70, 120]);
    }

    #[tokio::test]
    async fn moving_an_entry_to_a_later_date_rebalances_the_entries_it_left_behind() {
        let (engine, _, tenant, supplier) = setup();
        let first = engine
            .create_entry(tenant, draft(supplier, 1, 100, 0))
            .await
            .unwrap();
        engine.create_entry(tenant, draft(supplier, 2, 10, 0)).await.unwrap();
        engine.create_entry(tenant, draft(supplier, 3, 1, 0)).await.unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100, 110, 111]);

        engine
            .update_entry(tenant, first.id, draft(supplier, 4, 100, 0))
            .await
            .unwrap();
        assert_eq!(balances(&engine, tenant, supplier).await, vec![10, 11, 111]);
    }

    #[tokio::test]
    async fn moving_an_entry_between_suppliers_rebalances_both_partitions() {
        let (engine, _, tenant, supplier_a) = setup();
        let supplier_b = SupplierId::new(RecordId::new());

        let moved = engine
            .create_entry(tenant, draft(supplier_a, 1, 100, 0))
            .await
            .unwrap();
        engine.create_entry(tenant, draft(supplier_a, 2, 50, 0)).await.unwrap();
        engine.create_entry(tenant, draft(supplier_b, 1, 10, 0)).await.unwrap();

        engine
            .update_entry(tenant, moved.id, draft(supplier_b, 3, 100, 0))
            .await
            .unwrap();

        assert_eq!(balances(&engine, tenant, supplier_a).await, vec![50]);
        assert_eq!(balances(&engine, tenant, supplier_b).await, vec![10, 110]);
    }

    #[tokio::test]
    async fn partitions_are_isolated() {
        let (engine, _, tenant_x, supplier_a) = setup();
        let supplier_b = SupplierId::new(RecordId::new());
        let tenant_y = TenantId::new();

        engine.create_entry(tenant_x, draft(supplier_a, 1, 100, 0)).await.unwrap();
        engine.create_entry(tenant_x, draft(supplier_b, 1, 77, 0)).await.unwrap();
        engine.create_entry(tenant_y, draft(supplier_a, 1, 33, 0)).await.unwrap();

        let b_before = engine.list_for_supplier(tenant_x, supplier_b).await.unwrap();
        let y_before = engine.list_for_supplier(tenant_y, supplier_a).await.unwrap();

        // Mutate (supplier_a, tenant_x) heavily.
        let e = engine
            .create_entry(tenant_x, draft(supplier_a, 2, 10, 0))
            .await
            .unwrap();
        engine
            .update_entry(tenant_x, e.id, draft(supplier_a, 2, 0, 5))
            .await
            .unwrap();

        assert_eq!(engine.list_for_supplier(tenant_x, supplier_b).await.unwrap(), b_before);
        assert_eq!(engine.list_for_supplier(tenant_y, supplier_a).await.unwrap(), y_before);
    }

    #[tokio::test]
    async fn listing_twice_returns_identical_data() {
        let (engine, store, tenant, supplier) = setup();
        engine.create_entry(tenant, draft(supplier, 1, 100, 0)).await.unwrap();
        engine.create_entry(tenant, draft(supplier, 2, 0, 40)).await.unwrap();

        let before = store.len();
        let first = engine.list_for_supplier(tenant, supplier).await.unwrap();
        let second = engine.list_for_supplier(tenant, supplier).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), before);
    }

    #[tokio::test]
    async fn same_date_entries_stay_stable_under_recomputation() {
        let (engine, _, tenant, supplier) = setup();
        engine.create_entry(tenant, draft(supplier, 1, 100, 0)).await.unwrap();
        engine.create_entry(tenant, draft(supplier, 1, 50, 0)).await.unwrap();

        let listed = engine.list_for_supplier(tenant, supplier).await.unwrap();
        assert!(balance::is_consistent(&listed));
        assert_eq!(listed.last().map(|e| e.balance), Some(150));

        // A full recomputation in the canonical order must be a no-op.
        let mut recomputed = listed.clone();
        balance::recompute(&mut recomputed);
        assert_eq!(listed, recomputed);
    }

    #[tokio::test]
    async fn update_of_missing_id_is_not_found() {
        let (engine, _, tenant, supplier) = setup();
        let err = engine
            .update_entry(tenant, EntryId::new(RecordId::new()), draft(supplier, 1, 1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn delete_of_missing_id_is_not_found() {
        let (engine, _, tenant, _) = setup();
        let err = engine
            .delete_entry(tenant, EntryId::new(RecordId::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::NotFound)));
    }

    #[tokio::test]
    async fn foreign_tenant_cannot_touch_an_entry() {
        let (engine, _, tenant, supplier) = setup();
        let entry = engine
            .create_entry(tenant, draft(supplier, 1, 100, 0))
            .await
            .unwrap();

        let intruder = TenantId::new();
        let err = engine.delete_entry(intruder, entry.id).await.unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::NotFound)));
        assert_eq!(balances(&engine, tenant, supplier).await, vec![100]);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_any_write() {
        let (engine, store, tenant, supplier) = setup();
        let err = engine
            .create_entry(tenant, draft(supplier, 1, -5, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Domain(DomainError::Validation(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_against_one_partition_serialize() {
        let (engine, _, tenant, supplier) = setup();
        let engine = Arc::new(engine);

        let mut handles = Vec::new();
        for day in 1..=8u32 {
            let engine = engine.clone();
            handles.push(tokio::spawn(async move {
                engine
                    .create_entry(tenant, draft(supplier, day, 100, 0))
                    .await
                    .unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let listed = engine.list_for_supplier(tenant, supplier).await.unwrap();
        assert_eq!(listed.len(), 8);
        assert!(balance::is_consistent(&listed));
        assert_eq!(listed.last().map(|e| e.balance), Some(800));
    }
}
