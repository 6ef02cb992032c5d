use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use munim_core::{DomainError, DomainResult, Entity, RecordId, TenantId};
use munim_parties::SupplierId;

/// Ledger entry identifier.
///
/// UUIDv7, so ids minted later in time sort later; within a single
/// millisecond the random tail decides. The ordering only has to be stable
/// and total; see [`Position`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub RecordId);

impl EntryId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for EntryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// The canonical ordering key within a partition: date ascending, then id
/// ascending as the tie-break.
///
/// Every previous-entry and tail query uses this one total order, so the
/// "find previous" and "find tail" results can never disagree about where a
/// pivot sits.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub date: NaiveDate,
    pub id: EntryId,
}

/// One ledger entry. `debit` and `credit` are non-negative minor currency
/// units; `balance` is derived and only ever written by the balance engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: EntryId,
    pub tenant_id: TenantId,
    pub supplier_id: SupplierId,
    pub date: NaiveDate,
    pub particulars: String,
    pub voucher_type: String,
    pub voucher_no: String,
    pub debit: i64,
    pub credit: i64,
    pub balance: i64,
}

impl LedgerEntry {
    /// Net movement of this entry: debit minus credit.
    pub fn net(&self) -> i64 {
        self.debit - self.credit
    }

    pub fn position(&self) -> Position {
        Position {
            date: self.date,
            id: self.id,
        }
    }
}

impl Entity for LedgerEntry {
    type Id = EntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Incoming entry fields, not yet validated. Used for both create and
/// update; the owning tenant is threaded separately and never part of the
/// payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: NaiveDate,
    pub particulars: String,
    pub voucher_type: String,
    pub voucher_no: String,
    pub debit: i64,
    pub credit: i64,
    pub supplier_id: SupplierId,
}

impl EntryDraft {
    pub fn validate(&self) -> DomainResult<()> {
        if self.particulars.trim().is_empty() {
            return Err(DomainError::validation("particulars is required"));
        }
        if self.voucher_type.trim().is_empty() {
            return Err(DomainError::validation("voucher_type is required"));
        }
        if self.voucher_no.trim().is_empty() {
            return Err(DomainError::validation("voucher_no is required"));
        }
        if self.debit < 0 {
            return Err(DomainError::validation("debit must be non-negative"));
        }
        if self.credit < 0 {
            return Err(DomainError::validation("credit must be non-negative"));
        }
        Ok(())
    }

    pub fn net(&self) -> i64 {
        self.debit - self.credit
    }

    /// Materialize the draft into an entry with an engine-computed balance.
    pub fn into_entry(self, id: EntryId, tenant_id: TenantId, balance: i64) -> LedgerEntry {
        LedgerEntry {
            id,
            tenant_id,
            supplier_id: self.supplier_id,
            date: self.date,
            particulars: self.particulars,
            voucher_type: self.voucher_type,
            voucher_no: self.voucher_no,
            debit: self.debit,
            credit: self.credit,
            balance,
        }
    }
}

/// Parse a calendar date in `YYYY-MM-DD` form.
///
/// Malformed input is a validation error surfaced to the caller, never a
/// default date.
pub fn parse_date(input: &str) -> DomainResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|e| DomainError::validation(format!("invalid date {:?}: {e}", input.trim())))
}

/// Parse a money amount into minor units.
///
/// Accepts a plain integer ("150") or up to two fractional digits
/// ("150.25"). Non-numeric or negative input is a validation error, never
/// silently treated as zero.
pub fn parse_amount(input: &str) -> DomainResult<i64> {
    let s = input.trim();
    let invalid = || DomainError::validation(format!("invalid amount {s:?}"));

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if frac.len() > 2 || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let units: i64 = whole.parse().map_err(|_| invalid())?;
    let mut cents: i64 = if frac.is_empty() {
        0
    } else {
        frac.parse().map_err(|_| invalid())?
    };
    if frac.len() == 1 {
        cents *= 10;
    }

    units
        .checked_mul(100)
        .and_then(|v| v.checked_add(cents))
        .ok_or_else(|| DomainError::validation(format!("amount {s:?} out of range")))
}
