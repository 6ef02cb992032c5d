use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};
use munim_parties::SupplierId;

/// Purchase order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseOrderId(pub RecordId);

impl PurchaseOrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for PurchaseOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Purchase order status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum PurchaseOrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Purchase order line. Prices are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: i64,
    pub total_price: i64,
}

impl OrderLine {
    pub fn validate(&self) -> DomainResult<()> {
        if self.item_name.trim().is_empty() {
            return Err(DomainError::validation("line item_name is required"));
        }
        if self.quantity <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if self.unit_price < 0 {
            return Err(DomainError::validation("line unit_price must be non-negative"));
        }
        if self.total_price != self.quantity * self.unit_price {
            return Err(DomainError::validation(
                "line total_price must equal quantity * unit_price",
            ));
        }
        Ok(())
    }
}

/// Purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: PurchaseOrderId,
    pub tenant_id: TenantId,
    pub supplier_id: SupplierId,
    pub lines: Vec<OrderLine>,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
    pub status: PurchaseOrderStatus,
}

/// Incoming purchase order fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseOrderDraft {
    pub supplier_id: SupplierId,
    pub lines: Vec<OrderLine>,
    pub order_date: NaiveDate,
    pub delivery_date: NaiveDate,
}

impl PurchaseOrderDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.lines.is_empty() {
            return Err(DomainError::validation("purchase order must have lines"));
        }
        for line in &self.lines {
            line.validate()?;
        }
        if self.delivery_date < self.order_date {
            return Err(DomainError::validation(
                "delivery_date must not precede order_date",
            ));
        }
        Ok(())
    }
}

impl PurchaseOrder {
    /// New orders always start out `Pending`.
    pub fn create(
        id: PurchaseOrderId,
        tenant_id: TenantId,
        draft: PurchaseOrderDraft,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            tenant_id,
            supplier_id: draft.supplier_id,
            lines: draft.lines,
            order_date: draft.order_date,
            delivery_date: draft.delivery_date,
            status: PurchaseOrderStatus::Pending,
        })
    }

    /// Status transitions: a cancelled or completed order is terminal.
    pub fn transition(&mut self, next: PurchaseOrderStatus) -> DomainResult<()> {
        match (self.status, next) {
            (PurchaseOrderStatus::Pending, _) => {
                self.status = next;
                Ok(())
            }
            (current, _) if current == next => Ok(()),
            (current, _) => Err(DomainError::validation(format!(
                "cannot leave terminal status {current:?}"
            ))),
        }
    }
}

impl Entity for PurchaseOrder {
    type Id = PurchaseOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
