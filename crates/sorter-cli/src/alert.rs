//! Failure notifications.

use crate::config::AlertSettings;
use crate::error::{CliError, Result};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

/// Something that tells a human a run went wrong.
#[async_trait]
pub trait Alerter: Send + Sync {
    /// Deliver one message.
    async fn alert(&self, message: &str) -> Result<()>;
}

#[derive(Serialize)]
struct PushoverMessage<'a> {
    token: &'a str,
    user: &'a str,
    message: &'a str,
}

/// Sends alerts through the Pushover messages API.
pub struct PushoverAlerter {
    endpoint: String,
    api_token: String,
    user_key: String,
    client: reqwest::Client,
}

impl PushoverAlerter {
    /// Alerter posting to `endpoint`.
    pub fn new(
        endpoint: impl Into<String>,
        api_token: impl Into<String>,
        user_key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: api_token.into(),
            user_key: user_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Alerter from config, when both credentials are present.
    pub fn from_settings(settings: &AlertSettings) -> Option<Self> {
        settings
            .credentials()
            .map(|(token, user)| Self::new(settings.endpoint.clone(), token, user))
    }
}

#[async_trait]
impl Alerter for PushoverAlerter {
    async fn alert(&self, message: &str) -> Result<()> {
        debug!(endpoint = %self.endpoint, "Sending Pushover alert");

        let body = PushoverMessage {
            token: &self.api_token,
            user: &self.user_key,
            message,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| CliError::Alert(format!("Pushover request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CliError::Alert(format!("Pushover returned {}: {}", status.as_u16(), text)));
        }

        Ok(())
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlerter;

#[async_trait]
impl Alerter for LogAlerter {
    async fn alert(&self, message: &str) -> Result<()> {
        error!(alert = %message, "Alert");
        Ok(())
    }
}

/// Pushover when credentials are configured, the log otherwise.
pub fn from_settings(settings: &AlertSettings) -> Box<dyn Alerter> {
    match PushoverAlerter::from_settings(settings) {
        Some(pushover) => Box::new(pushover),
        None => Box::new(LogAlerter),
    }
}

#[async_trait]
impl<T: Alerter + ?Sized> Alerter for Box<T> {
    async fn alert(&self, message: &str) -> Result<()> {
        (**self).alert(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[tokio::test]
    async fn test_pushover_posts_token_user_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/1/messages.json")
            .match_body(Matcher::Json(json!({
                "token": "app-token",
                "user": "user-key",
                "message": "Could not file FV_7.pdf"
            })))
            .with_status(200)
            .with_body(r#"{"status":1}"#)
            .create_async()
            .await;

        let endpoint = format!("{}/1/messages.json", server.url());
        let alerter = PushoverAlerter::new(endpoint, "app-token", "user-key");
        alerter.alert("Could not file FV_7.pdf").await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_pushover_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/1/messages.json")
            .with_status(400)
            .with_body(r#"{"user":"invalid"}"#)
            .create_async()
            .await;

        let alerter = PushoverAlerter::new(format!("{}/1/messages.json", server.url()), "t", "u");
        let err = alerter.alert("x").await.unwrap_err();

        assert!(matches!(err, CliError::Alert(ref msg) if msg.contains("400")));
    }

    #[tokio::test]
    async fn test_log_alerter_never_fails() {
        assert!(LogAlerter.alert("nothing configured").await.is_ok());
    }

    #[test]
    fn test_from_settings_without_credentials() {
        assert!(PushoverAlerter::from_settings(&AlertSettings::default()).is_none());
    }
}
