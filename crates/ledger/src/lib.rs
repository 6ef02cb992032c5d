//! Supplier ledger domain: entries, the canonical partition ordering, and
//! the running-balance arithmetic.
//!
//! Each `(supplier, tenant)` pair owns an independent partition of entries.
//! Within a partition, entries are totally ordered by `(date, id)` and every
//! entry's `balance` is the prefix sum of `debit - credit` up to and
//! including itself. Maintaining that invariant under out-of-order insert,
//! update, and delete is the engine's job (`munim-infra`); this crate holds
//! the pure pieces.

pub mod balance;
pub mod entry;

pub use entry::{EntryDraft, EntryId, LedgerEntry, Position};
