use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, Profile, User, UserPatch};

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Case-insensitive. Addresses are unique regardless of case.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    /// Inserts the identity together with its profile.
    async fn create(&self, new: &NewUser) -> anyhow::Result<User>;
    /// Activates the identity and flags its profile as verified.
    async fn mark_verified(&self, id: Uuid) -> anyhow::Result<()>;
    /// Like [`UserRepo::mark_verified`], but also drops the password so only
    /// the identity provider can sign in to the account.
    async fn activate_via_provider(&self, id: Uuid) -> anyhow::Result<()>;
    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()>;
    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>>;
    async fn get_or_create_profile(&self, user_id: Uuid) -> anyhow::Result<Profile>;
}

pub struct PgUserRepo {
    pool: PgPool,
}

impl PgUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn activate(&self, id: Uuid, clear_password: bool) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.context("begin tx")?;
        sqlx::query(
            r#"
            UPDATE users
               SET is_active = TRUE,
                   password_hash = CASE WHEN $2 THEN NULL ELSE password_hash END
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(clear_password)
        .execute(&mut *tx)
        .await
        .context("activate user")?;
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, is_verified)
            VALUES ($1, TRUE)
            ON CONFLICT (user_id) DO UPDATE SET is_verified = TRUE
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("verify profile")?;
        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}

#[async_trait]
impl UserRepo for PgUserRepo {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, is_active, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, first_name, last_name, password_hash, is_active, created_at
            FROM users
            WHERE lower(email) = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create(&self, new: &NewUser) -> anyhow::Result<User> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, email, first_name, last_name, password_hash, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, username, email, first_name, last_name, password_hash, is_active, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.password_hash)
        .bind(new.is_active)
        .fetch_one(&mut *tx)
        .await
        .context("insert user")?;

        // Accounts created active (Google) have a provider-verified address.
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, date_of_birth, is_verified)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user.id)
        .bind(new.date_of_birth)
        .bind(new.is_active)
        .execute(&mut *tx)
        .await
        .context("insert profile")?;

        tx.commit().await.context("commit tx")?;
        Ok(user)
    }

    async fn mark_verified(&self, id: Uuid) -> anyhow::Result<()> {
        self.activate(id, false).await
    }

    async fn activate_via_provider(&self, id: Uuid) -> anyhow::Result<()> {
        self.activate(id, true).await
    }

    async fn set_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: &UserPatch) -> anyhow::Result<Option<User>> {
        let mut tx = self.pool.begin().await.context("begin tx")?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
               SET username   = COALESCE($2, username),
                   email      = COALESCE($3, email),
                   first_name = COALESCE($4, first_name),
                   last_name  = COALESCE($5, last_name)
             WHERE id = $1
            RETURNING id, username, email, first_name, last_name, password_hash, is_active, created_at
            "#,
        )
        .bind(id)
        .bind(&patch.username)
        .bind(&patch.email)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .fetch_optional(&mut *tx)
        .await
        .context("update user")?;

        if user.is_some() {
            if let Some(dob) = patch.date_of_birth {
                sqlx::query(
                    r#"
                    INSERT INTO profiles (user_id, date_of_birth)
                    VALUES ($1, $2)
                    ON CONFLICT (user_id) DO UPDATE SET date_of_birth = EXCLUDED.date_of_birth
                    "#,
                )
                .bind(id)
                .bind(dob)
                .execute(&mut *tx)
                .await
                .context("update profile")?;
            }
        }

        tx.commit().await.context("commit tx")?;
        Ok(user)
    }

    async fn get_or_create_profile(&self, user_id: Uuid) -> anyhow::Result<Profile> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .context("ensure profile")?;

        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, date_of_birth, is_verified
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .context("load profile")?;
        Ok(profile)
    }
}
