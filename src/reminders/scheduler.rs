//! Periodic reminder due-scan.
//!
//! Every tick claims the reminders set to the current local minute and mails
//! their owners. The claim stamps each reminder before anything is sent, so
//! any other scan within the same minute, overlapping or not, leaves it
//! alone. A failed send gives the claim back for the next tick.

use std::time::Duration;

use anyhow::Context;
use time::OffsetDateTime;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::{mail::messages, state::AppState};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub matched: usize,
    pub sent: usize,
    pub failed: usize,
}

/// Runs one scan for the minute containing `now`.
pub async fn run_due_scan(state: &AppState, now: OffsetDateTime) -> anyhow::Result<ScanReport> {
    let local = now.to_offset(state.config.utc_offset);
    let minute_start = local
        .replace_second(0)
        .and_then(|t| t.replace_nanosecond(0))
        .context("truncate scan time to the minute")?;

    let due = state
        .reminders
        .claim_due(local.date(), local.hour(), local.minute(), minute_start, now)
        .await?;

    let mut report = ScanReport {
        matched: due.len(),
        ..Default::default()
    };
    info!(count = report.matched, date = %local.date(), hour = local.hour(), minute = local.minute(), "due reminders claimed");

    for reminder in due {
        // Stays claimed; retrying cannot help without an address.
        if reminder.email.trim().is_empty() {
            warn!(reminder_id = %reminder.id, "reminder owner has no email");
            report.failed += 1;
            continue;
        }

        let name = if reminder.first_name.trim().is_empty() {
            &reminder.username
        } else {
            &reminder.first_name
        };
        let email = messages::reminder_due(
            &reminder.email,
            name,
            &reminder.title,
            &reminder.description,
        );

        match state.mailer.send(email).await {
            Ok(()) => {
                report.sent += 1;
                debug!(reminder_id = %reminder.id, to = %reminder.email, "reminder sent");
            }
            Err(e) => {
                report.failed += 1;
                error!(error = %e, reminder_id = %reminder.id, "failed to send reminder");
                if let Err(e) = state.reminders.release_claim(reminder.id, now).await {
                    error!(error = %e, reminder_id = %reminder.id, "failed to release reminder claim");
                }
            }
        }
    }

    Ok(report)
}

/// Runs [`run_due_scan`] on a fixed interval until the runtime shuts down.
pub fn spawn_due_scanner(state: AppState) -> JoinHandle<()> {
    let period = Duration::from_secs(state.config.reminder_scan_interval_secs.max(1));
    info!(every_secs = period.as_secs(), "reminder scanner started");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = run_due_scan(&state, OffsetDateTime::now_utc()).await {
                error!(error = ?e, "reminder scan failed");
            }
        }
    })
}
