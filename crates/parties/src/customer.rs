use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};

/// Customer identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub RecordId);

impl CustomerId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Customer master record. Only name and email are mandatory; the rest of
/// the contact block is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub tenant_id: TenantId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Incoming customer fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDraft {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

impl CustomerDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.full_name.trim().is_empty() {
            return Err(DomainError::validation("full_name is required"));
        }
        if self.email.trim().is_empty() {
            return Err(DomainError::validation("email is required"));
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        Ok(())
    }
}

impl Customer {
    pub fn create(
        id: CustomerId,
        tenant_id: TenantId,
        draft: CustomerDraft,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            tenant_id,
            full_name: draft.full_name,
            email: draft.email,
            phone: draft.phone,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            zip: draft.zip,
            created_at,
        })
    }

    /// Overwrite the mutable fields in place. Identity, tenant, and the
    /// creation timestamp are fixed.
    pub fn apply(&mut self, draft: CustomerDraft) -> DomainResult<()> {
        draft.validate()?;
        self.full_name = draft.full_name;
        self.email = draft.email;
        self.phone = draft.phone;
        self.address = draft.address;
        self.city = draft.city;
        self.state = draft.state;
        self.zip = draft.zip;
        Ok(())
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
