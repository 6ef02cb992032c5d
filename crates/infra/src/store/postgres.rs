//! Postgres-backed ledger store.
//!
//! The canonical `(date, id)` order is expressed as a row comparison on
//! `(entry_date, id)`. Postgres compares `uuid` values bytewise, which is
//! the same order `Uuid` implements in Rust, so this store and the
//! in-memory store agree on every tie-break.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError | Scenario |
//! |------------|----------------------|------------|----------|
//! | Database (unique violation) | `23505` | `DuplicateId` | Insert with an existing id |
//! | Database (other) | Any other | `Backend` | Constraint/storage errors |
//! | PoolClosed / network / other | N/A | `Backend` | Connection-level failures |

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use munim_core::{RecordId, TenantId};
use munim_ledger::{EntryId, LedgerEntry};
use munim_parties::SupplierId;

use super::{EntryFilter, EntryPatch, LedgerStore, PositionBound, SortOrder, StoreError};

const SELECT_COLUMNS: &str = "id, tenant_id, supplier_id, entry_date, particulars, \
     voucher_type, voucher_no, debit, credit, balance";

/// Postgres-backed ledger store.
///
/// Uses the SQLx connection pool, which is thread-safe; the schema lives in
/// `migrations/0001_ledger_entries.sql`.
#[derive(Debug, Clone)]
pub struct PostgresLedgerStore {
    pool: Arc<PgPool>,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    fn select_sql(filter: &EntryFilter, order: SortOrder, limit_one: bool) -> String {
        let mut sql = format!(
            "SELECT {SELECT_COLUMNS} FROM ledger_entries WHERE tenant_id = $1 AND supplier_id = $2"
        );
        if let Some(bound) = filter.bound {
            let op = match bound {
                PositionBound::Below(_) => "<",
                PositionBound::Above(_) => ">",
                PositionBound::AtOrAbove(_) => ">=",
            };
            sql.push_str(&format!(" AND (entry_date, id) {op} ($3::date, $4::uuid)"));
        }
        sql.push_str(match order {
            SortOrder::Ascending => " ORDER BY entry_date ASC, id ASC",
            SortOrder::Descending => " ORDER BY entry_date DESC, id DESC",
        });
        if limit_one {
            sql.push_str(" LIMIT 1");
        }
        sql
    }

    fn bind_filter<'q>(
        query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
        filter: &EntryFilter,
    ) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
        let mut query = query
            .bind(*filter.tenant_id.as_uuid())
            .bind(*filter.supplier_id.0.as_uuid());
        if let Some(bound) = filter.bound {
            let pivot = match bound {
                PositionBound::Below(p) | PositionBound::Above(p) | PositionBound::AtOrAbove(p) => p,
            };
            query = query.bind(pivot.date).bind(*pivot.id.0.as_uuid());
        }
        query
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    #[instrument(skip(self), fields(tenant_id = %filter.tenant_id, supplier_id = %filter.supplier_id), err)]
    async fn find(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Vec<LedgerEntry>, StoreError> {
        let sql = Self::select_sql(&filter, order, false);
        let rows = Self::bind_filter(sqlx::query(&sql), &filter)
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            let parsed = EntryRow::from_row(&row)
                .map_err(|e| StoreError::backend("find", format!("row decode failed: {e}")))?;
            entries.push(parsed.into());
        }
        Ok(entries)
    }

    #[instrument(skip(self), fields(tenant_id = %filter.tenant_id, supplier_id = %filter.supplier_id), err)]
    async fn find_one(
        &self,
        filter: EntryFilter,
        order: SortOrder,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let sql = Self::select_sql(&filter, order, true);
        let row = Self::bind_filter(sqlx::query(&sql), &filter)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_one", e))?;

        row.map(|row| {
            EntryRow::from_row(&row)
                .map(LedgerEntry::from)
                .map_err(|e| StoreError::backend("find_one", format!("row decode failed: {e}")))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(entry_id = %id), err)]
    async fn find_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM ledger_entries WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;

        row.map(|row| {
            EntryRow::from_row(&row)
                .map(LedgerEntry::from)
                .map_err(|e| StoreError::backend("find_by_id", format!("row decode failed: {e}")))
        })
        .transpose()
    }

    #[instrument(skip(self, entry), fields(entry_id = %entry.id, tenant_id = %entry.tenant_id), err)]
    async fn insert(&self, entry: LedgerEntry) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries (
                id,
                tenant_id,
                supplier_id,
                entry_date,
                particulars,
                voucher_type,
                voucher_no,
                debit,
                credit,
                balance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*entry.id.0.as_uuid())
        .bind(*entry.tenant_id.as_uuid())
        .bind(*entry.supplier_id.0.as_uuid())
        .bind(entry.date)
        .bind(&entry.particulars)
        .bind(&entry.voucher_type)
        .bind(&entry.voucher_no)
        .bind(entry.debit)
        .bind(entry.credit)
        .bind(entry.balance)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateId(entry.id.to_string())
            } else {
                map_sqlx_error("insert", e)
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self, patch), fields(entry_id = %id), err)]
    async fn update_by_id(
        &self,
        id: EntryId,
        patch: EntryPatch,
    ) -> Result<Option<LedgerEntry>, StoreError> {
        let sql = format!(
            r#"
            UPDATE ledger_entries SET
                entry_date = COALESCE($2, entry_date),
                particulars = COALESCE($3, particulars),
                voucher_type = COALESCE($4, voucher_type),
                voucher_no = COALESCE($5, voucher_no),
                debit = COALESCE($6, debit),
                credit = COALESCE($7, credit),
                supplier_id = COALESCE($8, supplier_id),
                balance = COALESCE($9, balance)
            WHERE id = $1
            RETURNING {SELECT_COLUMNS}
            "#
        );
        let row = sqlx::query(&sql)
            .bind(*id.0.as_uuid())
            .bind(patch.date)
            .bind(patch.particulars.as_deref())
            .bind(patch.voucher_type.as_deref())
            .bind(patch.voucher_no.as_deref())
            .bind(patch.debit)
            .bind(patch.credit)
            .bind(patch.supplier_id.map(|s| *s.0.as_uuid()))
            .bind(patch.balance)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_by_id", e))?;

        row.map(|row| {
            EntryRow::from_row(&row)
                .map(LedgerEntry::from)
                .map_err(|e| StoreError::backend("update_by_id", format!("row decode failed: {e}")))
        })
        .transpose()
    }

    #[instrument(skip(self), fields(entry_id = %id), err)]
    async fn delete_by_id(&self, id: EntryId) -> Result<Option<LedgerEntry>, StoreError> {
        let sql = format!(
            "DELETE FROM ledger_entries WHERE id = $1 RETURNING {SELECT_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(*id.0.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_by_id", e))?;

        row.map(|row| {
            EntryRow::from_row(&row)
                .map(LedgerEntry::from)
                .map_err(|e| StoreError::backend("delete_by_id", format!("row decode failed: {e}")))
        })
        .transpose()
    }
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::backend(
            operation,
            format!(
                "database error{}: {}",
                db_err
                    .code()
                    .map(|c| format!(" ({c})"))
                    .unwrap_or_default(),
                db_err.message()
            ),
        ),
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        other => StoreError::backend(operation, other.to_string()),
    }
}

/// Check if an error is a unique constraint violation.
fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

#[derive(Debug)]
struct EntryRow {
    id: Uuid,
    tenant_id: Uuid,
    supplier_id: Uuid,
    entry_date: NaiveDate,
    particulars: String,
    voucher_type: String,
    voucher_no: String,
    debit: i64,
    credit: i64,
    balance: i64,
}

impl<'r> FromRow<'r, sqlx::postgres::PgRow> for EntryRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(EntryRow {
            id: row.try_get("id")?,
            tenant_id: row.try_get("tenant_id")?,
            supplier_id: row.try_get("supplier_id")?,
            entry_date: row.try_get("entry_date")?,
            particulars: row.try_get("particulars")?,
            voucher_type: row.try_get("voucher_type")?,
            voucher_no: row.try_get("voucher_no")?,
            debit: row.try_get("debit")?,
            credit: row.try_get("credit")?,
            balance: row.try_get("balance")?,
        })
    }
}

impl From<EntryRow> for LedgerEntry {
    fn from(row: EntryRow) -> Self {
        LedgerEntry {
            id: EntryId::new(RecordId::from_uuid(row.id)),
            tenant_id: TenantId::from_uuid(row.tenant_id),
            supplier_id: SupplierId::new(RecordId::from_uuid(row.supplier_id)),
            date: row.entry_date,
            particulars: row.particulars,
            voucher_type: row.voucher_type,
            voucher_no: row.voucher_no,
            debit: row.debit,
            credit: row.credit,
            balance: row.balance,
        }
    }
}
