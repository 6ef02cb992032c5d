use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_purchasing::{PurchaseOrder, PurchaseOrderDraft, PurchaseOrderId, PurchaseOrderStatus};

use crate::collection::DocumentCollection;

/// Purchase order service.
pub struct PurchaseOrderService<C> {
    collection: C,
}

impl<C> PurchaseOrderService<C>
where
    C: DocumentCollection<PurchaseOrder>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: PurchaseOrderDraft) -> DomainResult<PurchaseOrder> {
        let order = PurchaseOrder::create(PurchaseOrderId::new(RecordId::new()), tenant_id, draft)?;
        self.collection.upsert(tenant_id, order.id.0, order.clone());
        tracing::info!(order_id = %order.id, "purchase order created");
        Ok(order)
    }

    /// Drive the status lifecycle; completed/cancelled orders are terminal.
    pub fn set_status(
        &self,
        tenant_id: TenantId,
        id: PurchaseOrderId,
        status: PurchaseOrderStatus,
    ) -> DomainResult<PurchaseOrder> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        existing.transition(status)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(order_id = %id, ?status, "purchase order status changed");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: PurchaseOrderId) -> Option<PurchaseOrder> {
        self.collection.get(tenant_id, id.0)
    }

    /// All purchase orders of the tenant, most recent order date first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<PurchaseOrder> {
        let mut orders = self.collection.list(tenant_id);
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then(a.id.cmp(&b.id)));
        orders
    }

    pub fn delete(&self, tenant_id: TenantId, id: PurchaseOrderId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(order_id = %id, "purchase order deleted");
        Ok(())
    }
}
