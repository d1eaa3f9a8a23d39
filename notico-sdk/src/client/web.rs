//! Slack Web API client.

use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::ClientError;
use crate::objects::chat::PostMessage;
use crate::objects::rtm::{RtmConnection, TeamInfo};

/// Base URL of the Slack Web API.
pub const DEFAULT_API_BASE: &str = "https://slack.com/api/";

/// Typed client for the Web API methods this relay calls.
///
/// Every request authenticates with the token as a bearer credential.
#[derive(Clone)]
pub struct SlackClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for SlackClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Successful response from `chat.postMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostMessageResponse {
    pub channel: String,
    pub ts: String,
}

/// Generic response envelope shared by all Web API methods.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    team: Option<TeamInfo>,
}

impl SlackClient {
    /// Create a client rooted at `base_url` (usually [`DEFAULT_API_BASE`]).
    ///
    /// A trailing `/` is added if missing so method names join below it.
    pub fn new(mut base_url: Url, token: impl Into<String>) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            http: Client::new(),
            base_url,
            token: token.into(),
        }
    }

    /// Replace the default `reqwest::Client` (e.g. to configure timeouts).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// `chat.postMessage`.
    pub async fn post_message(
        &self,
        message: &PostMessage,
    ) -> Result<PostMessageResponse, ClientError> {
        tracing::debug!(channel = %message.channel, "Posting message");
        let resp = self.call("chat.postMessage", message).await?;
        Ok(PostMessageResponse {
            channel: resp.channel.unwrap_or_else(|| message.channel.clone()),
            ts: resp.ts.ok_or_else(|| missing("chat.postMessage", "ts"))?,
        })
    }

    /// `rtm.connect`: obtain a websocket URL and the team identity.
    pub async fn rtm_connect(&self) -> Result<RtmConnection, ClientError> {
        tracing::debug!("Opening RTM connection");
        let resp = self
            .call("rtm.connect", &serde_json::json!({}))
            .await?;
        Ok(RtmConnection {
            url: resp.url.ok_or_else(|| missing("rtm.connect", "url"))?,
            team: resp.team.unwrap_or_default(),
        })
    }

    /// POST a JSON body to a Web API method and check the `ok` flag.
    async fn call<B: serde::Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.base_url.join(method)?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?
            .error_for_status()?;

        let bytes = resp.bytes().await?;
        let api_resp: ApiResponse = serde_json::from_slice(&bytes)?;

        if !api_resp.ok {
            let error = api_resp.error.unwrap_or_else(|| "unknown".to_string());
            tracing::warn!(method, error = %error, "Slack API error");
            return Err(ClientError::Api {
                method: method.to_string(),
                error,
            });
        }
        Ok(api_resp)
    }
}

fn missing(method: &str, field: &'static str) -> ClientError {
    ClientError::MissingField {
        method: method.to_string(),
        field,
    }
}
