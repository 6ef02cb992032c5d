//! Sales invoices.

pub mod invoice;

pub use invoice::{Invoice, InvoiceDraft, InvoiceId, InvoiceLine, InvoiceStatus};
