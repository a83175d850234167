use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "expense_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExpenseType {
    Income,
    Expense,
    Saving,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "expense_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Clothing,
    Emi,
    Misc,
    Salary,
    #[default]
    Other,
}

/// One ledger entry. Serialized as returned by the API.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Expense {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    pub category: Category,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub amount: f64,
    pub kind: ExpenseType,
    pub category: Category,
    pub description: String,
}

#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub kind: Option<ExpenseType>,
    pub category: Option<Category>,
    pub description: Option<String>,
}
