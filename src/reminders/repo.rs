use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::reminders::repo_types::{DueReminder, NewReminder, Reminder, ReminderPatch};

#[async_trait]
pub trait ReminderRepo: Send + Sync {
    /// Ordered by date, then time.
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<Reminder>>;
    async fn create(&self, user_id: Uuid, new: &NewReminder) -> anyhow::Result<Reminder>;
    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &ReminderPatch,
    ) -> anyhow::Result<Option<Reminder>>;
    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool>;

    /// Stamps `claimed_at` on every pending reminder with notifications on,
    /// set for `date` at `hour:minute` and not stamped since `minute_start`,
    /// and returns them. A row is handed to one caller only, however many
    /// scans run at once.
    async fn claim_due(
        &self,
        date: Date,
        hour: u8,
        minute: u8,
        minute_start: OffsetDateTime,
        claimed_at: OffsetDateTime,
    ) -> anyhow::Result<Vec<DueReminder>>;
    /// Undoes [`ReminderRepo::claim_due`] for one reminder, unless a later
    /// claim replaced the stamp.
    async fn release_claim(&self, id: Uuid, claimed_at: OffsetDateTime) -> anyhow::Result<()>;
}

pub struct PgReminderRepo {
    pool: PgPool,
}

impl PgReminderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderRepo for PgReminderRepo {
    async fn list(&self, user_id: Uuid) -> anyhow::Result<Vec<Reminder>> {
        let rows = sqlx::query_as::<_, Reminder>(
            r#"
            SELECT id, user_id, title, description, date, time, email_notify,
                   is_completed, last_notified_at, created_at
            FROM reminders
            WHERE user_id = $1
            ORDER BY date ASC, time ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .context("list reminders")?;
        Ok(rows)
    }

    async fn create(&self, user_id: Uuid, new: &NewReminder) -> anyhow::Result<Reminder> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            INSERT INTO reminders (id, user_id, title, description, date, time, email_notify, is_completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, date, time, email_notify,
                      is_completed, last_notified_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.date)
        .bind(new.time)
        .bind(new.email_notify)
        .bind(new.is_completed)
        .fetch_one(&self.pool)
        .await
        .context("insert reminder")?;
        Ok(row)
    }

    async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        patch: &ReminderPatch,
    ) -> anyhow::Result<Option<Reminder>> {
        let row = sqlx::query_as::<_, Reminder>(
            r#"
            UPDATE reminders
               SET title        = COALESCE($3, title),
                   description  = COALESCE($4, description),
                   date         = COALESCE($5, date),
                   time         = COALESCE($6, time),
                   email_notify = COALESCE($7, email_notify),
                   is_completed = COALESCE($8, is_completed)
             WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, date, time, email_notify,
                      is_completed, last_notified_at, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(&patch.title)
        .bind(&patch.description)
        .bind(patch.date)
        .bind(patch.time)
        .bind(patch.email_notify)
        .bind(patch.is_completed)
        .fetch_optional(&self.pool)
        .await
        .context("update reminder")?;
        Ok(row)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("delete reminder")?;
        Ok(result.rows_affected() > 0)
    }

    async fn claim_due(
        &self,
        date: Date,
        hour: u8,
        minute: u8,
        minute_start: OffsetDateTime,
        claimed_at: OffsetDateTime,
    ) -> anyhow::Result<Vec<DueReminder>> {
        // Rows are locked in id order. A concurrent claim waits on the lock,
        // then re-checks the stamp and drops the row.
        let rows = sqlx::query_as::<_, DueReminder>(
            r#"
            WITH due AS (
                SELECT id
                FROM reminders
                WHERE date = $1
                  AND EXTRACT(HOUR FROM time)::int = $2
                  AND EXTRACT(MINUTE FROM time)::int = $3
                  AND email_notify
                  AND NOT is_completed
                  AND (last_notified_at IS NULL OR last_notified_at < $4)
                ORDER BY id
                FOR UPDATE
            ),
            claimed AS (
                UPDATE reminders r
                   SET last_notified_at = $5
                  FROM due
                 WHERE r.id = due.id
                RETURNING r.id, r.user_id, r.title, r.description, r.time
            )
            SELECT c.id, c.title, c.description, u.email, u.first_name, u.username
            FROM claimed c
            JOIN users u ON u.id = c.user_id
            ORDER BY c.time ASC
            "#,
        )
        .bind(date)
        .bind(i32::from(hour))
        .bind(i32::from(minute))
        .bind(minute_start)
        .bind(claimed_at)
        .fetch_all(&self.pool)
        .await
        .context("claim due reminders")?;
        Ok(rows)
    }

    async fn release_claim(&self, id: Uuid, claimed_at: OffsetDateTime) -> anyhow::Result<()> {
        sqlx::query(
            "UPDATE reminders SET last_notified_at = NULL WHERE id = $1 AND last_notified_at = $2",
        )
        .bind(id)
        .bind(claimed_at)
        .execute(&self.pool)
        .await
        .context("release reminder claim")?;
        Ok(())
    }
}
