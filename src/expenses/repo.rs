use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::expenses::repo_types::{Expense, ExpensePatch, NewExpense};

/// Ledger storage. Every call is scoped to the owning user.
#[async_trait]
pub trait ExpenseRepo: Send + Sync {
    /// Newest first.
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<Expense>>;
    async fn create(&self, user_id: Uuid, new: &NewExpense) -> anyhow::Result<Expense>;
    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Expense>>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &ExpensePatch,
    ) -> anyhow::Result<Option<Expense>>;
    /// `false` when nothing owned by `user_id` had that id.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;
}

pub struct PgExpenseRepo {
    pool: PgPool,
}

impl PgExpenseRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExpenseRepo for PgExpenseRepo {
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, amount, kind, category, description, created_at
            FROM expenses
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list expenses")?;
        Ok(rows)
    }

    async fn create(&self, user_id: Uuid, new: &NewExpense) -> anyhow::Result<Expense> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (id, user_id, amount, kind, category, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, amount, kind, category, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(new.amount)
        .bind(new.kind)
        .bind(new.category)
        .bind(&new.description)
        .fetch_one(&self.pool)
        .await
        .context("insert expense")?;
        Ok(row)
    }

    async fn get(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<Option<Expense>> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            SELECT id, user_id, amount, kind, category, description, created_at
            FROM expenses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("get expense")?;
        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &ExpensePatch,
    ) -> anyhow::Result<Option<Expense>> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            UPDATE expenses
               SET amount      = COALESCE($3, amount),
                   kind        = COALESCE($4, kind),
                   category    = COALESCE($5, category),
                   description = COALESCE($6, description)
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, amount, kind, category, description, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.amount)
        .bind(patch.kind)
        .bind(patch.category)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await
        .context("update expense")?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("delete expense")?;
        Ok(result.rows_affected() > 0)
    }
}
