use anyhow::{anyhow, bail, Context, Result};
use log::{debug, warn};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::Duration;

use synexis_core::{ChatReply, ChatRequest};

const NETWORK_ERROR: &str = "Network error: Unable to reach the server.";
const EMPTY_RESPONSE: &str = "Empty response from server.";

/// Client for the remote chat endpoint.
pub struct ChatApi {
    client: reqwest::Client,
    endpoint: String,
}

impl ChatApi {
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one turn and return the reply text. Error messages are written
    /// for the user; they end up in the transcript.
    pub async fn send(&self, request: &ChatRequest) -> Result<String> {
        debug!("POST {} ({} messages)", self.endpoint, request.messages.len());
        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                warn!("chat request to {} failed: {e}", self.endpoint);
                anyhow!(NETWORK_ERROR)
            })?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        let reply = serde_json::from_str::<ChatReply>(&body).ok();
        reply_text(status, reply)
    }
}

/// Turn an HTTP status and (possibly unparseable) body into reply text.
pub fn reply_text(status: StatusCode, reply: Option<ChatReply>) -> Result<String> {
    let reply = reply.unwrap_or_default();

    if !status.is_success() {
        let message = reply
            .error
            .unwrap_or_else(|| format!("API error: {}", status.as_u16()));
        let details = reply.details.map(|d| format!(" {d}")).unwrap_or_default();
        bail!("{}", format!("{message}{details}").trim().to_string());
    }

    if reply.fallback {
        warn!(
            "endpoint answered with its fallback text{}",
            reply.error.as_deref().map(|e| format!(" ({e})")).unwrap_or_default()
        );
    }

    match reply.text {
        Some(text) if !text.is_empty() => Ok(text),
        _ => bail!(EMPTY_RESPONSE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(text: Option<&str>, error: Option<&str>, details: Option<&str>) -> ChatReply {
        ChatReply {
            text: text.map(str::to_string),
            error: error.map(str::to_string),
            details: details.map(str::to_string),
            fallback: false,
        }
    }

    #[test]
    fn test_success_returns_text() {
        let out = reply_text(StatusCode::OK, Some(reply(Some("Hi!"), None, None))).unwrap();
        assert_eq!(out, "Hi!");
    }

    #[test]
    fn test_missing_text_is_empty_response() {
        let err = reply_text(StatusCode::OK, Some(reply(None, None, None))).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_RESPONSE);
        let err = reply_text(StatusCode::OK, None).unwrap_err();
        assert_eq!(err.to_string(), EMPTY_RESPONSE);
    }

    #[test]
    fn test_error_body_with_details() {
        let err = reply_text(
            StatusCode::INTERNAL_SERVER_ERROR,
            Some(reply(None, Some("Missing GEMINI_API_KEY"), Some("set it in .env"))),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing GEMINI_API_KEY set it in .env");
    }

    #[test]
    fn test_error_without_body_uses_status() {
        let err = reply_text(StatusCode::BAD_GATEWAY, None).unwrap_err();
        assert_eq!(err.to_string(), "API error: 502");
    }

    #[test]
    fn test_fallback_text_is_still_a_reply() {
        let mut r = reply(Some("I can help with Synexis ML models."), Some("Upstream API error: 429"), None);
        r.fallback = true;
        assert_eq!(reply_text(StatusCode::OK, Some(r)).unwrap(), "I can help with Synexis ML models.");
    }
}
