use chrono::Utc;

use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_parties::{Customer, CustomerDraft, CustomerId};

use crate::collection::DocumentCollection;

/// Customer directory. Email is unique within a tenant.
pub struct CustomerDirectory<C> {
    collection: C,
}

impl<C> CustomerDirectory<C>
where
    C: DocumentCollection<Customer>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: CustomerDraft) -> DomainResult<Customer> {
        draft.validate()?;
        self.ensure_unique_email(tenant_id, &draft.email, None)?;

        let customer = Customer::create(
            CustomerId::new(RecordId::new()),
            tenant_id,
            draft,
            Utc::now(),
        )?;
        self.collection.upsert(tenant_id, customer.id.0, customer.clone());
        tracing::info!(customer_id = %customer.id, "customer created");
        Ok(customer)
    }

    pub fn update(
        &self,
        tenant_id: TenantId,
        id: CustomerId,
        draft: CustomerDraft,
    ) -> DomainResult<Customer> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        draft.validate()?;
        self.ensure_unique_email(tenant_id, &draft.email, Some(id))?;

        existing.apply(draft)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(customer_id = %id, "customer updated");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: CustomerId) -> Option<Customer> {
        self.collection.get(tenant_id, id.0)
    }

    /// All customers of the tenant, sorted by full name.
    pub fn list(&self, tenant_id: TenantId) -> Vec<Customer> {
        let mut customers = self.collection.list(tenant_id);
        customers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        customers
    }

    pub fn delete(&self, tenant_id: TenantId, id: CustomerId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }

    fn ensure_unique_email(
        &self,
        tenant_id: TenantId,
        email: &str,
        exclude: Option<CustomerId>,
    ) -> DomainResult<()> {
        for existing in self.collection.list(tenant_id) {
            if Some(existing.id) == exclude {
                continue;
            }
            if existing.email.eq_ignore_ascii_case(email) {
                return Err(DomainError::conflict("email already in use"));
            }
        }
        Ok(())
    }
}
