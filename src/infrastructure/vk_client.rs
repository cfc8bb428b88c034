//! VK API client for the two delete operations
//!
//! Calls are plain form POSTs to `<base_url>/<method>`. The API answers HTTP
//! 200 for both success and failure; failures carry an `error` object in the
//! JSON envelope.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::{ApiError, DeleteError, PurgeError, PurgeResult, RemoteDeleteClient};

/// Connection settings for the VK API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VkApiConfig {
    pub base_url: String,
    /// Value of the `v` parameter sent with every call
    pub version: String,
    pub request_timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for VkApiConfig {
    fn default() -> Self {
        Self {
            base_url: vk_api::BASE_URL.to_string(),
            version: vk_api::VERSION.to_string(),
            request_timeout_seconds: vk_api::REQUEST_TIMEOUT_SECONDS,
            user_agent: format!("vk-purge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// VK API endpoints and constants
pub mod vk_api {
    pub const BASE_URL: &str = "https://api.vk.com/method/";
    pub const VERSION: &str = "5.131";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const DELETE_COMMENT: &str = "wall.deleteComment";
    pub const DELETE_LIKE: &str = "likes.delete";
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    response: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

impl Envelope {
    fn into_result(self) -> Result<(), DeleteError> {
        match (self.error, self.response) {
            (Some(err), _) => Err(ApiError::new(err.error_code, err.error_msg).into()),
            (None, Some(_)) => Ok(()),
            (None, None) => Err(DeleteError::other(
                "unexpected_response",
                "response has neither `response` nor `error`",
            )),
        }
    }
}

/// Authenticated VK API client
#[derive(Clone)]
pub struct VkApiClient {
    client: Client,
    base_url: Url,
    access_token: String,
    version: String,
}

impl VkApiClient {
    pub fn new(config: &VkApiConfig, access_token: &str) -> PurgeResult<Self> {
        if access_token.trim().is_empty() {
            return Err(PurgeError::configuration("token", "access token is empty"));
        }

        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            PurgeError::configuration("api.base_url", format!("invalid URL '{}': {e}", config.base_url))
        })?;
        // `join` replaces the last segment unless the path ends with a slash
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| PurgeError::configuration("api.user_agent", e.to_string()))?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| PurgeError::client_setup(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            access_token: access_token.to_string(),
            version: config.version.clone(),
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, DeleteError> {
        self.base_url
            .join(method)
            .map_err(|e| DeleteError::other("invalid_url", e.to_string()))
    }

    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<(), DeleteError> {
        let url = self.method_url(method)?;
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("access_token", self.access_token.as_str()));
        form.push(("v", self.version.as_str()));

        tracing::trace!("Calling {}", method);

        let response = self
            .client
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(DeleteError::other(
                "http_status",
                format!("{method} returned HTTP {status}"),
            ));
        }

        let envelope: Envelope = response.json().await.map_err(classify_transport_error)?;
        envelope.into_result()
    }
}

fn classify_transport_error(e: reqwest::Error) -> DeleteError {
    let kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else if e.is_decode() {
        "decode"
    } else {
        "transport"
    };
    DeleteError::other(kind, e.to_string())
}

#[async_trait]
impl RemoteDeleteClient for VkApiClient {
    async fn delete_comment(&self, owner_id: &str, item_id: &str) -> Result<(), DeleteError> {
        self.call(
            vk_api::DELETE_COMMENT,
            &[("owner_id", owner_id), ("comment_id", item_id)],
        )
        .await
    }

    async fn delete_reaction(
        &self,
        kind: &str,
        owner_id: &str,
        item_id: &str,
    ) -> Result<(), DeleteError> {
        self.call(
            vk_api::DELETE_LIKE,
            &[("type", kind), ("owner_id", owner_id), ("item_id", item_id)],
        )
        .await
    }
}
