use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Identity record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>, // None for accounts created through Google
    pub is_active: bool,               // false until the email is verified
    pub created_at: OffsetDateTime,
}

/// One-to-one extension of [`User`].
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Profile {
    pub user_id: Uuid,
    pub date_of_birth: Option<Date>,
    pub is_verified: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub date_of_birth: Option<Date>,
}

/// Partial update of identity and profile fields; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<Date>,
}
