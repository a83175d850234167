use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime, Time};
use uuid::Uuid;

use crate::formats::{iso_date, time_of_day};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Reminder {
    pub id: Uuid,
    #[serde(skip)]
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(with = "time_of_day")]
    pub time: Time,
    pub email_notify: bool,
    pub is_completed: bool,
    #[serde(skip)]
    pub last_notified_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewReminder {
    pub title: String,
    pub description: String,
    pub date: Date,
    pub time: Time,
    pub email_notify: bool,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub email_notify: Option<bool>,
    pub is_completed: Option<bool>,
}

/// A reminder picked by the due-scan, joined with what is needed to mail its owner.
#[derive(Debug, Clone, FromRow)]
pub struct DueReminder {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub email: String,
    pub first_name: String,
    pub username: String,
}
