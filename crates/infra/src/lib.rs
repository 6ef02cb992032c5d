//! Infrastructure layer: persistence, the balance engine, and the CRUD
//! services the host application calls.

pub mod collection;
pub mod engine;
pub mod services;
pub mod store;

pub use engine::{EngineError, LedgerBalanceEngine};
pub use store::{EntryFilter, EntryPatch, LedgerStore, SortOrder, StoreError};
