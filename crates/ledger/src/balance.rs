//! Running-balance arithmetic over a partition.
//!
//! Pure functions shared by the balance engine and the tests: no store, no
//! I/O, just the prefix-sum contract.

use crate::entry::LedgerEntry;

/// Sort entries into the canonical partition order `(date, id)` ascending.
pub fn sort_canonical(entries: &mut [LedgerEntry]) {
    entries.sort_by_key(|e| e.position());
}

/// Running totals for a slice of entries already in canonical order,
/// seeded by the balance carried in from the entry immediately before the
/// slice (0 at the start of a partition).
pub fn running_balances(seed: i64, entries: &[LedgerEntry]) -> Vec<i64> {
    let mut running = seed;
    entries
        .iter()
        .map(|e| {
            running += e.net();
            running
        })
        .collect()
}

/// Recompute every balance in a full partition, in place. Entries are
/// reordered canonically as a side effect.
pub fn recompute(entries: &mut [LedgerEntry]) {
    sort_canonical(entries);
    let mut running = 0;
    for e in entries.iter_mut() {
        running += e.net();
        e.balance = running;
    }
}

/// Whether a partition satisfies the prefix-sum contract: sorted by
/// `(date, id)`, each balance equals the running sum of `debit - credit`.
pub fn is_consistent(entries: &[LedgerEntry]) -> bool {
    let mut sorted = entries.to_vec();
    sort_canonical(&mut sorted);
    running_balances(0, &sorted)
        .into_iter()
        .zip(&sorted)
        .all(|(expected, e)| expected == e.balance)
}
