use std::sync::Arc;

use crate::auth::account_token::AccountTokens;
use crate::auth::google::{GoogleClient, HttpGoogleClient};
use crate::auth::repo::{PgUserRepo, UserRepo};
use crate::config::AppConfig;
use crate::db;
use crate::expenses::repo::{ExpenseRepo, PgExpenseRepo};
use crate::mail::{self, Mailer};
use crate::reminders::repo::{PgReminderRepo, ReminderRepo};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub expenses: Arc<dyn ExpenseRepo>,
    pub reminders: Arc<dyn ReminderRepo>,
    pub mailer: Arc<dyn Mailer>,
    pub google: Arc<dyn GoogleClient>,
    pub http: reqwest::Client,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let pool = db::connect(&config.database_url).await?;
        db::migrate(&pool).await;

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            users: Arc::new(PgUserRepo::new(pool.clone())),
            expenses: Arc::new(PgExpenseRepo::new(pool.clone())),
            reminders: Arc::new(PgReminderRepo::new(pool)),
            mailer: mail::build_mailer(config.smtp.as_ref())?,
            google: Arc::new(HttpGoogleClient::new(http.clone(), config.google.clone())),
            http,
            config,
        })
    }

    pub fn account_tokens(&self) -> AccountTokens {
        AccountTokens::new(&self.config.jwt.secret, self.config.account_token_ttl_secs)
    }
}
