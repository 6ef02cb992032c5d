//! Operating expense records.

pub mod expense;

pub use expense::{Expense, ExpenseDraft, ExpenseId};
