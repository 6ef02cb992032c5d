use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};

/// Catalog item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub RecordId);

impl ItemId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Catalog item. `selling_price` is in minor currency units; `quantity` is
/// the on-hand count, never decremented here (stock movements are the host
/// application's concern).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub tenant_id: TenantId,
    pub name: String,
    pub unit: String,
    pub hsn_code: String,
    pub selling_price: i64,
    pub quantity: i64,
    pub description: Option<String>,
}

/// Incoming item fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    pub unit: String,
    pub hsn_code: String,
    pub selling_price: i64,
    pub quantity: i64,
    pub description: Option<String>,
}

impl ItemDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name is required"));
        }
        if self.unit.trim().is_empty() {
            return Err(DomainError::validation("unit is required"));
        }
        if self.hsn_code.trim().is_empty() {
            return Err(DomainError::validation("hsn_code is required"));
        }
        if self.selling_price < 0 {
            return Err(DomainError::validation("selling_price must be non-negative"));
        }
        if self.quantity < 0 {
            return Err(DomainError::validation("quantity must be non-negative"));
        }
        Ok(())
    }
}

impl Item {
    pub fn create(id: ItemId, tenant_id: TenantId, draft: ItemDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            tenant_id,
            name: draft.name,
            unit: draft.unit,
            hsn_code: draft.hsn_code,
            selling_price: draft.selling_price,
            quantity: draft.quantity,
            description: draft.description,
        })
    }

    pub fn apply(&mut self, draft: ItemDraft) -> DomainResult<()> {
        draft.validate()?;
        self.name = draft.name;
        self.unit = draft.unit;
        self.hsn_code = draft.hsn_code;
        self.selling_price = draft.selling_price;
        self.quantity = draft.quantity;
        self.description = draft.description;
        Ok(())
    }

    /// Case-insensitive name match used by the catalog search.
    pub fn matches_search(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(&needle.to_lowercase())
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ItemDraft {
        ItemDraft {
            name: "Copper Wire 2mm".to_string(),
            unit: "kg".to_string(),
            hsn_code: "7408".to_string(),
            selling_price: 64_500,
            quantity: 120,
            description: None,
        }
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut d = draft();
        d.selling_price = -1;
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn search_is_case_insensitive() {
        let item = Item::create(ItemId::new(RecordId::new()), TenantId::new(), draft()).unwrap();
        assert!(item.matches_search("copper"));
        assert!(item.matches_search("WIRE"));
        assert!(!item.matches_search("steel"));
    }
}
