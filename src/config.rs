use std::str::FromStr;

use anyhow::Context;
use time::{macros::format_description, UtcOffset};

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Mailbox used in the From header, e.g. `Investo <noreply@example.com>`.
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub token_url: String,
    pub userinfo_url: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    /// Lifetime of email verification and password reset tokens.
    pub account_token_ttl_secs: i64,
    pub frontend_url: String,
    pub cors_allowed_origins: Vec<String>,
    /// `None` means no SMTP relay is configured and mail is only logged.
    pub smtp: Option<SmtpConfig>,
    pub google: GoogleConfig,
    pub market_data_url: String,
    /// Offset used as "local time" by the reminder due-scan.
    pub utc_offset: UtcOffset,
    pub reminder_scan_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            issuer: env_or("JWT_ISSUER", "investo"),
            audience: env_or("JWT_AUDIENCE", "investo-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24),
        };

        let smtp = match std::env::var("SMTP_HOST") {
            Ok(host) => Some(SmtpConfig {
                host,
                port: env_parse("SMTP_PORT", 587),
                username: std::env::var("SMTP_USERNAME").context("SMTP_USERNAME not set")?,
                password: std::env::var("SMTP_PASSWORD").context("SMTP_PASSWORD not set")?,
                from: std::env::var("SMTP_FROM").context("SMTP_FROM not set")?,
            }),
            Err(_) => None,
        };

        let google = GoogleConfig {
            client_id: env_or("GOOGLE_CLIENT_ID", ""),
            client_secret: env_or("GOOGLE_CLIENT_SECRET", ""),
            token_url: env_or("GOOGLE_TOKEN_URL", "https://oauth2.googleapis.com/token"),
            userinfo_url: env_or(
                "GOOGLE_USERINFO_URL",
                "https://www.googleapis.com/oauth2/v3/userinfo",
            ),
        };

        let cors_allowed_origins = parse_list(&env_or(
            "CORS_ALLOWED_ORIGINS",
            "http://localhost:5173,http://127.0.0.1:5173",
        ));

        let utc_offset = parse_utc_offset(&env_or("APP_UTC_OFFSET", "+00:00"))?;

        Ok(Self {
            database_url,
            jwt,
            account_token_ttl_secs: env_parse("ACCOUNT_TOKEN_TTL_SECS", 3 * 24 * 60 * 60),
            frontend_url: env_or("FRONTEND_URL", "http://localhost:5173")
                .trim_end_matches('/')
                .to_string(),
            cors_allowed_origins,
            smtp,
            google,
            market_data_url: env_or("MARKET_DATA_URL", ""),
            utc_offset,
            reminder_scan_interval_secs: env_parse("REMINDER_SCAN_INTERVAL_SECS", 60),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses offsets written as `+05:45` or `-03:00`.
pub fn parse_utc_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("invalid APP_UTC_OFFSET {raw:?}"))
}
