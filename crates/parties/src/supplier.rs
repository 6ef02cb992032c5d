use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};

/// Supplier identifier (tenant-scoped via the `tenant_id` field on the record).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SupplierId(pub RecordId);

impl SupplierId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for SupplierId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Supplier master record.
///
/// Email and GST number are unique per tenant; the directory service
/// enforces that at write time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub tenant_id: TenantId,
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub gst_number: String,
}

/// Incoming supplier fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierDraft {
    pub name: String,
    pub contact_number: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub gst_number: String,
}

impl SupplierDraft {
    pub fn validate(&self) -> DomainResult<()> {
        require("name", &self.name)?;
        require("contact_number", &self.contact_number)?;
        require("email", &self.email)?;
        require("address", &self.address)?;
        require("city", &self.city)?;
        require("state", &self.state)?;
        require("zip", &self.zip)?;
        require("gst_number", &self.gst_number)?;
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        Ok(())
    }
}

impl Supplier {
    pub fn create(id: SupplierId, tenant_id: TenantId, draft: SupplierDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            id,
            tenant_id,
            name: draft.name,
            contact_number: draft.contact_number,
            email: draft.email,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            zip: draft.zip,
            gst_number: draft.gst_number,
        })
    }

    /// Overwrite the mutable fields in place. Identity and tenant are fixed.
    pub fn apply(&mut self, draft: SupplierDraft) -> DomainResult<()> {
        draft.validate()?;
        self.name = draft.name;
        self.contact_number = draft.contact_number;
        self.email = draft.email;
        self.address = draft.address;
        self.city = draft.city;
        self.state = draft.state;
        self.zip = draft.zip;
        self.gst_number = draft.gst_number;
        Ok(())
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

fn require(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}
