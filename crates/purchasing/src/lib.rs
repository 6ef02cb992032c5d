//! Purchase orders placed with suppliers.

pub mod order;

pub use order::{OrderLine, PurchaseOrder, PurchaseOrderDraft, PurchaseOrderId, PurchaseOrderStatus};
