use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::message::Message;

/// Posts messages to an incoming webhook.
#[derive(Debug, Clone, Default)]
pub struct Sender {
    client: reqwest::Client,
}

impl Sender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Sends `message` to `url`.
    ///
    /// With `dry_run` nothing goes over the network and the request text
    /// (`POST <url>` followed by the JSON body) is returned instead.
    pub async fn send(&self, message: &Message, url: Option<&str>, dry_run: bool) -> Result<Option<String>> {
        let url = url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::Config("no webhook URL configured".into()))?;
        let payload = message.payload()?;

        if dry_run {
            return Ok(Some(format!("POST {url}\n{payload}")));
        }

        debug!(%url, bytes = payload.len(), "posting to webhook");
        let resp = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await?;

        let status = resp.status();
        if status.is_server_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Transport {
                status: status.as_u16(),
                body,
            });
        }
        if !status.is_success() {
            warn!(%status, "webhook did not accept the message");
        }
        Ok(None)
    }
}
