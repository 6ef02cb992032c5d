use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_items::{Item, ItemDraft, ItemId};

use crate::collection::DocumentCollection;

/// Item catalog.
pub struct ItemCatalog<C> {
    collection: C,
}

impl<C> ItemCatalog<C>
where
    C: DocumentCollection<Item>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: ItemDraft) -> DomainResult<Item> {
        let item = Item::create(ItemId::new(RecordId::new()), tenant_id, draft)?;
        self.collection.upsert(tenant_id, item.id.0, item.clone());
        tracing::info!(item_id = %item.id, "item created");
        Ok(item)
    }

    pub fn update(&self, tenant_id: TenantId, id: ItemId, draft: ItemDraft) -> DomainResult<Item> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        existing.apply(draft)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(item_id = %id, "item updated");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: ItemId) -> Option<Item> {
        self.collection.get(tenant_id, id.0)
    }

    /// All items of the tenant, sorted by name.
    pub fn list(&self, tenant_id: TenantId) -> Vec<Item> {
        let mut items = self.collection.list(tenant_id);
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Case-insensitive substring search over item names.
    pub fn search(&self, tenant_id: TenantId, needle: &str) -> Vec<Item> {
        self.list(tenant_id)
            .into_iter()
            .filter(|i| i.matches_search(needle))
            .collect()
    }

    pub fn delete(&self, tenant_id: TenantId, id: ItemId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(item_id = %id, "item deleted");
        Ok(())
    }
}
