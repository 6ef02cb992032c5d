//! Tenant-isolated document collections for the CRUD services.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use munim_core::{RecordId, TenantId};

/// Tenant-isolated key/value collection abstraction.
///
/// The services never see another tenant's documents: every call is scoped
/// by `TenantId`, and a key only resolves inside its own tenant.
pub trait DocumentCollection<T>: Send + Sync {
    fn get(&self, tenant_id: TenantId, id: RecordId) -> Option<T>;
    fn upsert(&self, tenant_id: TenantId, id: RecordId, value: T);
    fn remove(&self, tenant_id: TenantId, id: RecordId) -> Option<T>;
    fn list(&self, tenant_id: TenantId) -> Vec<T>;
    /// Drop every document of a tenant (account teardown support).
    fn clear_tenant(&self, tenant_id: TenantId);
}

impl<T, S> DocumentCollection<T> for Arc<S>
where
    S: DocumentCollection<T> + ?Sized,
{
    fn get(&self, tenant_id: TenantId, id: RecordId) -> Option<T> {
        (**self).get(tenant_id, id)
    }

    fn upsert(&self, tenant_id: TenantId, id: RecordId, value: T) {
        (**self).upsert(tenant_id, id, value)
    }

    fn remove(&self, tenant_id: TenantId, id: RecordId) -> Option<T> {
        (**self).remove(tenant_id, id)
    }

    fn list(&self, tenant_id: TenantId) -> Vec<T> {
        (**self).list(tenant_id)
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        (**self).clear_tenant(tenant_id)
    }
}

/// In-memory tenant-isolated collection for tests/dev.
#[derive(Debug)]
pub struct InMemoryCollection<T> {
    inner: RwLock<HashMap<(TenantId, RecordId), T>>,
}

impl<T> InMemoryCollection<T> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<T> Default for InMemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DocumentCollection<T> for InMemoryCollection<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn get(&self, tenant_id: TenantId, id: RecordId) -> Option<T> {
        let map = self.inner.read().ok()?;
        map.get(&(tenant_id, id)).cloned()
    }

    fn upsert(&self, tenant_id: TenantId, id: RecordId, value: T) {
        if let Ok(mut map) = self.inner.write() {
            map.insert((tenant_id, id), value);
        }
    }

    fn remove(&self, tenant_id: TenantId, id: RecordId) -> Option<T> {
        let mut map = self.inner.write().ok()?;
        map.remove(&(tenant_id, id))
    }

    fn list(&self, tenant_id: TenantId) -> Vec<T> {
        let map = match self.inner.read() {
            Ok(m) => m,
            Err(_) => return vec![],
        };

        map.iter()
            .filter_map(|((t, _k), v)| if *t == tenant_id { Some(v.clone()) } else { None })
            .collect()
    }

    fn clear_tenant(&self, tenant_id: TenantId) {
        if let Ok(mut map) = self.inner.write() {
            map.retain(|(t, _k), _v| *t != tenant_id);
        }
    }
}
