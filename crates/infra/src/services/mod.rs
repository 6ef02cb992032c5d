//! CRUD services the host application's handlers call.
//!
//! Each service validates through its domain crate's draft types before
//! touching storage, and every operation is tenant-scoped.

pub mod company;
pub mod customers;
pub mod expenses;
pub mod invoices;
pub mod items;
pub mod purchases;
pub mod suppliers;

pub use company::CompanyProfileService;
pub use customers::CustomerDirectory;
pub use expenses::ExpenseService;
pub use invoices::InvoiceService;
pub use items::ItemCatalog;
pub use purchases::PurchaseOrderService;
pub use suppliers::SupplierDirectory;
