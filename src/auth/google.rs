use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::GoogleConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleTokens {
    pub id_token: Option<String>,
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GoogleUserInfo {
    pub email: Option<String>,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
}

/// Google OAuth endpoints used by the login flow. Any error is a provider failure.
#[async_trait]
pub trait GoogleClient: Send + Sync {
    async fn exchange_code(&self, code: &str) -> anyhow::Result<GoogleTokens>;
    async fn user_info(&self, access_token: &str) -> anyhow::Result<GoogleUserInfo>;
}

pub struct HttpGoogleClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl HttpGoogleClient {
    pub fn new(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl GoogleClient for HttpGoogleClient {
    async fn exchange_code(&self, code: &str) -> anyhow::Result<GoogleTokens> {
        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", "postmessage"),
            ("grant_type", "authorization_code"),
        ];
        let tokens = self
            .http
            .post(&self.config.token_url)
            .form(&form)
            .send()
            .await
            .context("google token request")?
            .error_for_status()
            .context("google token response")?
            .json::<GoogleTokens>()
            .await
            .context("google token body")?;
        debug!(has_id_token = tokens.id_token.is_some(), "google code exchanged");
        Ok(tokens)
    }

    async fn user_info(&self, access_token: &str) -> anyhow::Result<GoogleUserInfo> {
        let info = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .context("google userinfo request")?
            .error_for_status()
            .context("google userinfo response")?
            .json::<GoogleUserInfo>()
            .await
            .context("google userinfo body")?;
        Ok(info)
    }
}
