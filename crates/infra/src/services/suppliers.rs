use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_parties::{Supplier, SupplierDraft, SupplierId};

use crate::collection::DocumentCollection;

/// Supplier directory.
///
/// Email and GST number are unique within a tenant; two tenants can each
/// have a supplier with the same email.
pub struct SupplierDirectory<C> {
    collection: C,
}

impl<C> SupplierDirectory<C>
where
    C: DocumentCollection<Supplier>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: SupplierDraft) -> DomainResult<Supplier> {
        draft.validate()?;
        self.ensure_unique(tenant_id, &draft, None)?;

        let supplier = Supplier::create(SupplierId::new(RecordId::new()), tenant_id, draft)?;
        self.collection.upsert(tenant_id, supplier.id.0, supplier.clone());
        tracing::info!(supplier_id = %supplier.id, "supplier created");
        Ok(supplier)
    }

    pub fn update(
        &self,
        tenant_id: TenantId,
        id: SupplierId,
        draft: SupplierDraft,
    ) -> DomainResult<Supplier> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        draft.validate()?;
        self.ensure_unique(tenant_id, &draft, Some(id))?;

        existing.apply(draft)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(supplier_id = %id, "supplier updated");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: SupplierId) -> Option<Supplier> {
        self.collection.get(tenant_id, id.0)
    }

    /// All suppliers of the tenant, sorted by name.
    pub fn list(&self, tenant_id: TenantId) -> Vec<Supplier> {
        let mut suppliers = self.collection.list(tenant_id);
        suppliers.sort_by(|a, b| a.name.cmp(&b.name));
        suppliers
    }

    pub fn delete(&self, tenant_id: TenantId, id: SupplierId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(supplier_id = %id, "supplier deleted");
        Ok(())
    }

    fn ensure_unique(
        &self,
        tenant_id: TenantId,
        draft: &SupplierDraft,
        exclude: Option<SupplierId>,
    ) -> DomainResult<()> {
        for existing in self.collection.list(tenant_id) {
            if Some(existing.id) == exclude {
                continue;
            }
            if existing.email.eq_ignore_ascii_case(&draft.email) {
                return Err(DomainError::conflict("email already in use"));
            }
            if existing.gst_number == draft.gst_number {
                return Err(DomainError::conflict("gst_number already in use"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::InMemoryCollection;
    use std::sync::Arc;

    fn directory() -> SupplierDirectory<Arc<InMemoryCollection<Supplier>>> {
        SupplierDirectory::new(Arc::new(InMemoryCollection::new()))
    }

    fn draft(name: &str, email: &str, gst: &str) -> SupplierDraft {
        SupplierDraft {
            name: name.to_string(),
            contact_number: "9876543210".to_string(),
            email: email.to_string(),
            address: "14 Market Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            zip: "411001".to_string(),
            gst_number: gst.to_string(),
        }
    }

    #[test]
    fn duplicate_email_in_one_tenant_conflicts() {
        let dir = directory();
        let tenant = TenantId::new();
        dir.create(tenant, draft("Acme", "a@x.example", "GST-1")).unwrap();

        let err = dir
            .create(tenant, draft("Other", "A@X.EXAMPLE", "GST-2"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("email")));
    }

    #[test]
    fn duplicate_gst_in_one_tenant_conflicts() {
        let dir = directory();
        let tenant = TenantId::new();
        dir.create(tenant, draft("Acme", "a@x.example", "GST-1")).unwrap();

        let err = dir
            .create(tenant, draft("Other", "b@x.example", "GST-1"))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(msg) if msg.contains("gst")));
    }

    #[test]
    fn same_email_is_fine_across_tenants() {
        let dir = directory();
        dir.create(TenantId::new(), draft("Acme", "a@x.example", "GST-1")).unwrap();
        dir.create(TenantId::new(), draft("Acme", "a@x.example", "GST-1")).unwrap();
    }

    #[test]
    fn update_may_keep_its_own_email() {
        let dir = directory();
        let tenant = TenantId::new();
        let created = dir.create(tenant, draft("Acme", "a@x.example", "GST-1")).unwrap();

        let renamed = dir
            .update(tenant, created.id, draft("Acme Trading", "a@x.example", "GST-1"))
            .unwrap();
        assert_eq!(renamed.name, "Acme Trading");
    }

    #[test]
    fn list_is_sorted_by_name() {
        let dir = directory();
        let tenant = TenantId::new();
        dir.create(tenant, draft("Zenith", "z@x.example", "GST-9")).unwrap();
        dir.create(tenant, draft("Acme", "a@x.example", "GST-1")).unwrap();

        let names: Vec<_> = dir.list(tenant).into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Acme", "Zenith"]);
    }

    #[test]
    fn delete_of_unknown_id_is_not_found() {
        let dir = directory();
        let err = dir
            .delete(TenantId::new(), SupplierId::new(RecordId::new()))
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }
}
