use chrono::NaiveDate;

use munim_core::{DomainError, DomainResult, RecordId, TenantId};
use munim_expenses::{Expense, ExpenseDraft, ExpenseId};

use crate::collection::DocumentCollection;

/// Expense service.
pub struct ExpenseService<C> {
    collection: C,
}

impl<C> ExpenseService<C>
where
    C: DocumentCollection<Expense>,
{
    pub fn new(collection: C) -> Self {
        Self { collection }
    }

    pub fn create(&self, tenant_id: TenantId, draft: ExpenseDraft) -> DomainResult<Expense> {
        let expense = Expense::create(ExpenseId::new(RecordId::new()), tenant_id, draft)?;
        self.collection.upsert(tenant_id, expense.id.0, expense.clone());
        tracing::info!(expense_id = %expense.id, "expense recorded");
        Ok(expense)
    }

    pub fn update(
        &self,
        tenant_id: TenantId,
        id: ExpenseId,
        draft: ExpenseDraft,
    ) -> DomainResult<Expense> {
        let mut existing = self
            .collection
            .get(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        existing.apply(draft)?;
        self.collection.upsert(tenant_id, id.0, existing.clone());
        tracing::info!(expense_id = %id, "expense updated");
        Ok(existing)
    }

    pub fn get(&self, tenant_id: TenantId, id: ExpenseId) -> Option<Expense> {
        self.collection.get(tenant_id, id.0)
    }

    /// All expenses of the tenant, most recent first.
    pub fn list(&self, tenant_id: TenantId) -> Vec<Expense> {
        let mut expenses = self.collection.list(tenant_id);
        expenses.sort_by(|a, b| b.date.cmp(&a.date).then(a.id.cmp(&b.id)));
        expenses
    }

    /// Total spend in `[from, to]`, for the reports view.
    pub fn total_between(&self, tenant_id: TenantId, from: NaiveDate, to: NaiveDate) -> i64 {
        self.collection
            .list(tenant_id)
            .iter()
            .filter(|e| e.date >= from && e.date <= to)
            .map(|e| e.amount)
            .sum()
    }

    pub fn delete(&self, tenant_id: TenantId, id: ExpenseId) -> DomainResult<()> {
        self.collection
            .remove(tenant_id, id.0)
            .ok_or(DomainError::NotFound)?;
        tracing::info!(expense_id = %id, "expense deleted");
        Ok(())
    }
}
