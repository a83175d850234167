use serde::Deserialize;
use time::{Date, Time};

use crate::{
    error::{ApiError, FieldErrors},
    formats::{iso_date, time_of_day},
    reminders::repo_types::{NewReminder, ReminderPatch},
};

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CreateReminderRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "time_of_day::option::deserialize")]
    pub time: Option<Time>,
    #[serde(default = "default_true")]
    pub email_notify: bool,
    #[serde(default)]
    pub is_completed: bool,
}

impl CreateReminderRequest {
    pub fn validate(self) -> Result<NewReminder, ApiError> {
        let mut errors = FieldErrors::default();
        let title = self.title.trim().to_string();
        if title.is_empty() {
            errors.add("title", "This field may not be blank.");
        }
        if self.date.is_none() {
            errors.add("date", "This field is required.");
        }
        if self.time.is_none() {
            errors.add("time", "This field is required.");
        }

        match (self.date, self.time) {
            (Some(date), Some(time)) if errors.is_empty() => Ok(NewReminder {
                title,
                description: self.description,
                date,
                time,
                email_notify: self.email_notify,
                is_completed: self.is_completed,
            }),
            _ => Err(ApiError::Validation(errors)),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "iso_date::option")]
    pub date: Option<Date>,
    #[serde(default, deserialize_with = "time_of_day::option::deserialize")]
    pub time: Option<Time>,
    pub email_notify: Option<bool>,
    pub is_completed: Option<bool>,
}

impl UpdateReminderRequest {
    pub fn validate(self) -> Result<ReminderPatch, ApiError> {
        let title = match self.title {
            Some(t) if t.trim().is_empty() => {
                return Err(ApiError::validation("title", "This field may not be blank."))
            }
            Some(t) => Some(t.trim().to_string()),
            None => None,
        };
        Ok(ReminderPatch {
            title,
            description: self.description,
            date: self.date,
            time: self.time,
            email_notify: self.email_notify,
            is_completed: self.is_completed,
        })
    }
}
