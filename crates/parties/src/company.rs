use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, TenantId};

/// The tenant's own billing identity: one profile per tenant, shown on
/// invoices and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub tenant_id: TenantId,
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub contact_number: String,
    pub email: String,
    pub gst_number: String,
}

/// Incoming profile fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDraft {
    pub company_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub contact_number: String,
    pub email: String,
    pub gst_number: String,
}

impl CompanyDraft {
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("company_name", &self.company_name),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("contact_number", &self.contact_number),
            ("email", &self.email),
            ("gst_number", &self.gst_number),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!("{field} is required")));
            }
        }
        if !self.email.contains('@') {
            return Err(DomainError::validation("email must contain '@'"));
        }
        Ok(())
    }
}

impl CompanyProfile {
    pub fn create(tenant_id: TenantId, draft: CompanyDraft) -> DomainResult<Self> {
        draft.validate()?;
        Ok(Self {
            tenant_id,
            company_name: draft.company_name,
            address: draft.address,
            city: draft.city,
            state: draft.state,
            zip: draft.zip,
            contact_number: draft.contact_number,
            email: draft.email,
            gst_number: draft.gst_number,
        })
    }
}
