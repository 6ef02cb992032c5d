use uuid::Uuid;

use munim_core::{DomainResult, RecordId, TenantId};
use munim_parties::{CompanyDraft, CompanyProfile};

use crate::collection::DocumentCollection;

/// The tenant's own company profile: a singleton per tenant, stored under a
/// fixed key.
pub struct CompanyProfileService<C> {
    collection: C,
}

impl<C> CompanyProfileService<C>
where
    C: DocumentCollection<CompanyProfile>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    fn singleton_key() -> RecordId {
        RecordId::from_uuid(Uuid::nil())
    }

    pub fn get(&self, tenant_id: TenantId) -> Option<CompanyProfile> {
        self.collection.get(tenant_id, Self::singleton_key())
    }

    /// Create or replace the profile.
    pub fn set(&self, tenant_id: TenantId, draft: CompanyDraft) -> DomainResult<CompanyProfile> {
        let profile = CompanyProfile::create(tenant_id, draft)?;
        self.collection
            .upsert(tenant_id, Self::singleton_key(), profile.clone());
        tracing::info!(tenant_id = %tenant_id, "company profile saved");
        Ok(profile)
    }
}
