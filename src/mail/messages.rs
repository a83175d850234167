use time::{Date, Time};

use super::Email;
use crate::formats::{format_date, format_time};

pub fn verification(to: &str, username: &str, link: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Verify your Investo account".into(),
        body: format!(
            "Hi {username},\n\n\
             Please click the link below to verify your Investo account:\n\n\
             {link}\n\n\
             If you did not create this account, ignore this email.\n"
        ),
    }
}

pub fn password_reset(to: &str, username: &str, link: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: "Reset your Investo password".into(),
        body: format!(
            "Hi {username},\n\n\
             Someone asked to reset the password of your Investo account.\n\
             Use the link below to choose a new one:\n\n\
             {link}\n\n\
             If this wasn't you, you can ignore this email.\n"
        ),
    }
}

/// Confirmation sent right after a reminder with notifications is created.
pub fn reminder_created(to: &str, title: &str, description: &str, date: Date, time: Time) -> Email {
    let description = if description.trim().is_empty() {
        "No description"
    } else {
        description
    };
    Email {
        to: to.to_string(),
        subject: format!("Reminder: {title}"),
        body: format!(
            "{description}\nTime: {}\nDate: {}",
            format_time(time),
            format_date(date)
        ),
    }
}

/// Sent by the due-scan when a reminder's minute arrives.
pub fn reminder_due(to: &str, greeting_name: &str, title: &str, description: &str) -> Email {
    Email {
        to: to.to_string(),
        subject: format!("⏰ Reminder: {title}"),
        body: format!("Hi {greeting_name},\n\nIt's time to do:\n{title}\n\n{description}"),
    }
}
