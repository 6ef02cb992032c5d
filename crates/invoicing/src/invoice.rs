use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};
use munim_parties::CustomerId;

/// Invoice identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub RecordId);

impl InvoiceId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Payment status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "paid")]
    Paid,
    #[serde(rename = "not paid")]
    NotPaid,
    #[serde(rename = "pending")]
    Pending,
}

/// One billed line. Amounts are in minor currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub item_details: String,
    pub hsn: String,
    pub unit: String,
    pub quantity: i64,
    pub rate: i64,
    pub amount: i64,
}

impl InvoiceLine {
    pub fn validate(&self) -> DomainResult<()> {
        if self.item_details.trim().is_empty() {
            return Err(DomainError::validation("line item_details is required"));
        }
        if self.quantity <= 0 {
            return Err(DomainError::validation("line quantity must be positive"));
        }
        if self.rate < 0 {
            return Err(DomainError::validation("line rate must be non-negative"));
        }
        if self.amount != self.quantity * self.rate {
            return Err(DomainError::validation(
                "line amount must equal quantity * rate",
            ));
        }
        Ok(())
    }
}

/// Sales invoice.
///
/// The invoice number is caller-supplied; this module does not allocate
/// numbers. Tax is carried as billed, never computed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub tenant_id: TenantId,
    pub invoice_number: u32,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<InvoiceLine>,
    pub status: InvoiceStatus,
    pub total_amount: i64,
}

/// Incoming invoice fields, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub invoice_number: u32,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub lines: Vec<InvoiceLine>,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.invoice_number == 0 {
            return Err(DomainError::validation("invoice_number must be positive"));
        }
        if self.customer_name.trim().is_empty() {
            return Err(DomainError::validation("customer_name is required"));
        }
        if self.due_date < self.invoice_date {
            return Err(DomainError::validation(
                "due_date must not precede invoice_date",
            ));
        }
        if self.lines.is_empty() {
            return Err(DomainError::validation("invoice must have lines"));
        }
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }

    fn total(&self) -> i64 {
        self.lines.iter().map(|l| l.amount).sum()
    }
}

impl Invoice {
    pub fn create(id: InvoiceId, tenant_id: TenantId, draft: InvoiceDraft) -> DomainResult<Self> {
        draft.validate()?;
        let total_amount = draft.total();
        Ok(Self {
            id,
            tenant_id,
            invoice_number: draft.invoice_number,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            invoice_date: draft.invoice_date,
            due_date: draft.due_date,
            lines: draft.lines,
            status: draft.status,
            total_amount,
        })
    }

    pub fn apply(&mut self, draft: InvoiceDraft) -> DomainResult<()> {
        draft.validate()?;
        self.total_amount = draft.total();
        self.invoice_number = draft.invoice_number;
        self.customer_id = draft.customer_id;
        self.customer_name = draft.customer_name;
        self.invoice_date = draft.invoice_date;
        self.due_date = draft.due_date;
        self.lines = draft.lines;
        self.status = draft.status;
        Ok(())
    }
}

impl Entity for Invoice {
    type Id = InvoiceId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i64, rate: i64) -> InvoiceLine {
        InvoiceLine {
            item_details: "Copper Wire 2mm".to_string(),
            hsn: "7408".to_string(),
            unit: "kg".to_string(),
            quantity,
            rate,
            amount: quantity * rate,
        }
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft {
            invoice_number: 41,
            customer_id: CustomerId::new(RecordId::new()),
            customer_name: "Rohan Mehta".to_string(),
            invoice_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            lines: vec![line(2, 64_500), line(1, 12_000)],
            status: InvoiceStatus::NotPaid,
        }
    }

    #[test]
    fn total_is_sum_of_line_amounts() {
        let inv = Invoice::create(InvoiceId::new(RecordId::new()), TenantId::new(), draft()).unwrap();
        assert_eq!(inv.total_amount, 2 * 64_500 + 12_000);
    }

    #[test]
    fn empty_invoice_is_rejected() {
        let mut d = draft();
        d.lines.clear();
        assert!(matches!(d.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn due_date_before_invoice_date_is_rejected() {
        let mut d = draft();
        d.due_date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        assert!(d.validate().is_err());
    }

    #[test]
    fn mismatched_line_amount_is_rejected() {
        let mut d = draft();
        d.lines[0].amount += 1;
        assert!(d.validate().is_err());
    }

    #[test]
    fn status_serializes_with_original_wire_values() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::NotPaid).unwrap(),
            "\"not paid\""
        );
    }
}
