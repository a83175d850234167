//! Outbound email: the [`Mailer`] seam, its SMTP and logging implementations,
//! and the messages the app sends.

pub mod messages;
mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::SmtpConfig;

pub use smtp::{LogMailer, SmtpMailer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> anyhow::Result<()>;
}

/// SMTP when a relay is configured, otherwise a mailer that only logs.
pub fn build_mailer(smtp: Option<&SmtpConfig>) -> anyhow::Result<Arc<dyn Mailer>> {
    match smtp {
        Some(cfg) => {
            info!(host = %cfg.host, port = cfg.port, "using SMTP mailer");
            Ok(Arc::new(SmtpMailer::new(cfg)?))
        }
        None => {
            info!("SMTP not configured; emails will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Sends on a detached task. Failures are logged and never reach the caller.
pub fn spawn_send(mailer: Arc<dyn Mailer>, email: Email) {
    tokio::spawn(async move {
        let to = email.to.clone();
        let subject = email.subject.clone();
        if let Err(e) = mailer.send(email).await {
            warn!(error = %e, %to, %subject, "background email send failed");
        }
    });
}
