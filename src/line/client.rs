//! Reply API client

use super::types::{ReplyMessage, ReplyRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

const REPLY_URL: &str = "https://api.line.me/v2/bot/message/reply";

#[derive(Debug, Error)]
pub enum LineError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Reply rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers replies through a single-use reply token
#[async_trait]
pub trait ReplySender: Send + Sync {
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> Result<(), LineError>;
}

pub struct LineClient {
    client: Client,
    access_token: String,
}

impl LineClient {
    pub fn new(access_token: String, timeout: Duration) -> Result<Self, LineError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token,
        })
    }
}

#[async_trait]
impl ReplySender for LineClient {
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> Result<(), LineError> {
        let request = ReplyRequest {
            reply_token: reply_token.to_string(),
            messages,
        };

        let response = self
            .client
            .post(REPLY_URL)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(LineError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Stand-in used when no access token is configured: logs instead of sending
pub struct LoggingReplySender;

#[async_trait]
impl ReplySender for LoggingReplySender {
    async fn reply(&self, reply_token: &str, messages: Vec<ReplyMessage>) -> Result<(), LineError> {
        tracing::warn!(
            reply_token,
            messages = ?messages,
            "No LINE access token configured, reply not sent"
        );
        Ok(())
    }
}
