use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_invoicing::{Invoice, InvoiceDraft, InvoiceId, InvoiceStatus};

use crate::collection::DocumentCollection;

/// Invoice service. Numbers are caller-supplied and not checked for
/// sequence; status is one of the three payment states.
pub struct InvoiceService<C> {
    collection: C,
}

impl<C> InvoiceService<C>
where
    C: DocumentCollection<Invoice>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: InvoiceDraft) -> DomainResult<Invoice> {
        let invoice = Invoice::create(InvoiceId::new(RecordId::new()), tenant_id, draft)?;
        self.collection.upsert(tenant_id, invoice.id.0, invoice.clone());
        tracing::info!(invoice_id = %invoice.id, number = invoice.invoice_number, "invoice created");
        Ok(invoice)
    }

    pub fn update(
        &self,
        tenant_id: TenantId,
        id: InvoiceId,
        draft: InvoiceDraft,
    ) -> DomainResult<Invoice> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        existing.apply(draft)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(invoice_id = %id, "invoice updated");
        Ok(existing)
    }

    pub fn set_status(
        &self,
        tenant_id: TenantId,
        id: InvoiceId,
        status: InvoiceStatus,
    ) -> DomainResult<Invoice> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        existing.status = status;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(invoice_id = %id, ?status, "invoice status changed");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: InvoiceId) -> Option<Invoice> {
        self.collection.get(tenant_id, id.0)
    }

    /// All invoices of the tenant, newest number first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<Invoice> {
        let mut invoices = self.collection.list(tenant_id);
        invoices.sort_by(|a, b| b.invoice_number.cmp(&a.invoice_number));
        invoices
    }

    pub fn delete(&self, tenant_id: TenantId, id: InvoiceId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(invoice_id = %id, "invoice deleted");
        Ok(())
    }
}
