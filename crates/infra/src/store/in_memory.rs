use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use munim_ledger::{EntryId, LedgerEntry};

use super::{EntryFilter, EntryPatch, LedgerStore, SortOrder, StoreError};

/// In-memory ledger store.
///
/// Intended for tests/dev. Not optimized for performance: every find is a
/// full scan, which is also what the reference data model does.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    entries: RwLock<HashMap<EntryId, LedgerEntry>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry count across all partitions (test helper).
    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn find(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let map = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("find", "lock poisoned"))?;

        let mut matched: Vec<LedgerEntry> =
            map.values().filter(|e| filter.matches(e)).cloned().collect();
        matched.sort_by_key(|e| e.position());
        if order == SortOrder::Descending {
            matched.reverse();
        }
        Ok(matched)
    }

    async fn find_one(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let map = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("find_one", "lock poisoned"))?;

        let matched = map.values().filter(|e| filter.matches(e));
        let found = match order {
            SortOrder::Ascending => matched.min_by_key(|e| e.position()),
            SortOrder::Descending => matched.max_by_key(|e| e.position()),
        };
        Ok(found.cloned())
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let map = self
            .entries
            .read()
            .map_err(|_| StoreError::backend("find_by_id", "lock poisoned"))?;
        Ok(map.get(&id).cloned())
    }

    async fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("insert", "lock poisoned"))?;
        if map.contains_key(&entry.id) {
            return Err(StoreError::DuplicateId(entry.id.to_string()));
        }
        map.insert(entry.id, entry);
        Ok(())
    }

    async fn update_by_id(
        &self,
        id: EntryId,
        patch: EntryPatch,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("update_by_id", "lock poisoned"))?;
        Ok(map.get_mut(&id).map(|entry| {
            patch.apply(entry);
            entry.clone()
        }))
    }

    async fn delete_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let mut map = self
            .entries
            .write()
            .map_err(|_| StoreError::backend("delete_by_id", "lock poisoned"))?;
        Ok(map.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use munim_core::{RecordId, TenantId};
    use munim_ledger::{EntryDraft, Position};
    use munim_parties::SupplierId;

    fn entry(tenant: TenantId, supplier: SupplierId, day: u32) -> LedgerEntry {
        EntryDraft {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            particulars: "entry".to_string(),
            voucher_type: "Journal".to_string(),
            voucher_no: "J-1".to_string(),
            debit: 100,
            credit: 0,
            supplier_id: supplier,
        }
        .into_entry(EntryId::new(RecordId::new()), tenant, 0)
    }

    #[tokio::test]
    async fn insert_rejects_duplicate_ids() {
        let store = InMemoryLedgerStore::new();
        let e = entry(TenantId::new(), SupplierId::new(RecordId::new()), 1);
        store.insert(e.clone()).await.unwrap();
        let err = store.insert(e).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
    }

    #[tokio::test]
    async fn find_applies_partition_and_bound() {
        let store = InMemoryLedgerStore::new();
        let tenant = TenantId::new();
        let supplier = SupplierId::new(RecordId::new());
        let other_supplier = SupplierId::new(RecordId::new());

        let a = entry(tenant, supplier, 1);
        let b = entry(tenant, supplier, 3);
        let foreign = entry(tenant, other_supplier, 2);
        for e in [a.clone(), b.clone(), foreign] {
            store.insert(e).await.unwrap();
        }

        let all = store
            .find(EntryFilter::partition(tenant, supplier), SortOrder::Ascending)
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, a.id);

        let pivot = Position { date: a.date, id: a.id };
        let tail = store
            .find(
                EntryFilter::partition(tenant, supplier).above(pivot),
                SortOrder::Ascending,
            )
            .await
            .unwrap();
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].id, b.id);
    }

    #[tokio::test]
    async fn find_one_descending_returns_latest() {
        let store = InMemoryLedgerStore::new();
        let tenant = TenantId::new();
        let supplier = SupplierId::new(RecordId::new());
        let a = entry(tenant, supplier, 1);
        let b = entry(tenant, supplier, 5);
        for e in [a, b.clone()] {
            store.insert(e).await.unwrap();
        }

        let latest = store
            .find_one(EntryFilter::partition(tenant, supplier), SortOrder::Descending)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.id, b.id);
    }

    #[tokio::test]
    async fn delete_returns_the_removed_record() {
        let store = InMemoryLedgerStore::new();
        let e = entry(TenantId::new(), SupplierId::new(RecordId::new()), 2);
        store.insert(e.clone()).await.unwrap();

        let deleted = store.delete_by_id(e.id).await.unwrap().unwrap();
        assert_eq!(deleted.supplier_id, e.supplier_id);
        assert_eq!(deleted.date, e.date);
        assert!(store.find_by_id(e.id).await.unwrap().is_none());
    }
}
