//! DataSift API client
//!
//! The preview workflow only needs a narrow view of the API: call an endpoint with a flat
//! set of parameters and get JSON back, plus the rate limit counters the API reports. That
//! view is the [`PreviewApi`] trait; [`DataSiftClient`] is the HTTP implementation.

use core::fmt;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Response;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde_json::Value;
use tracing_log::log::debug;
use url::Url;

use crate::configuration::{ApiSettings, Credentials};
use crate::error::AppErrors as Error;

/// Parameters sent with a single API call
pub type Params = serde_json::Map<String, Value>;

pub const PREVIEW_CREATE: &str = "preview/create";
pub const PREVIEW_GET: &str = "preview/get";

const RATE_LIMIT_HEADER: &str = "x-ratelimit-limit";
const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Deserialize, thiserror::Error)]
pub struct ErrorJson {
    pub error: String,
}

// Implement `fmt::Display` trait for `ErrorJson`.
impl fmt::Display for ErrorJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "message: {}", self.error)
    }
}

// -- Services -------------------------------------------------------------------------

#[async_trait]
pub trait PreviewApi: Send + Sync {
    /// Call `endpoint` with `params` and return the decoded response body.
    async fn call(&self, endpoint: &str, params: &Params) -> Result<Value, Error>;

    /// The call ceiling for these credentials, once a response has reported it
    fn rate_limit(&self) -> Option<u64>;

    /// Calls left before the ceiling is hit, once a response has reported it
    fn rate_limit_remaining(&self) -> Option<u64>;
}

#[derive(Debug, Default, Clone, Copy)]
struct RateLimit {
    limit: Option<u64>,
    remaining: Option<u64>,
}

#[derive(Debug)]
pub struct DataSiftClient {
    base_url: Url,
    client: reqwest::Client,
    rate_limit: RwLock<RateLimit>,
}

impl DataSiftClient {
    /// Build a client authenticated with `credentials`.
    ///
    /// # Errors
    /// Will return an error if the base url is invalid, the credentials can't be
    /// used as a header, or the http client can't be built.
    pub fn new(settings: &ApiSettings, credentials: &Credentials) -> Result<Self, Error> {
        let base_url = Url::parse(&settings.base_url)?;

        let mut headers = HeaderMap::new();
        let auth_header_value = format!(
            "{}:{}",
            credentials.username,
            credentials.api_key.expose_secret()
        );
        let mut auth_header = HeaderValue::from_str(&auth_header_value)?;
        auth_header.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth_header);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(DataSiftClient {
            base_url,
            client,
            rate_limit: RwLock::new(RateLimit::default()),
        })
    }

    fn record_rate_limit(&self, headers: &HeaderMap) {
        let observed = RateLimit {
            limit: header_u64(headers, RATE_LIMIT_HEADER),
            remaining: header_u64(headers, RATE_LIMIT_REMAINING_HEADER),
        };
        if let Ok(mut rate_limit) = self.rate_limit.write() {
            if observed.limit.is_some() {
                rate_limit.limit = observed.limit;
            }
            if observed.remaining.is_some() {
                rate_limit.remaining = observed.remaining;
            }
        }
    }

    async fn handle_response(response: Response) -> Result<Value, Error> {
        let status = response.status();
        if status.is_success() {
            let result = response.json::<Value>().await?;
            Ok(result)
        } else {
            let error = response.json::<ErrorJson>().await?;
            Err(Error::ApiError {
                status: status.as_u16(),
                error,
            })
        }
    }
}

#[async_trait]
impl PreviewApi for DataSiftClient {
    #[tracing::instrument(name = "Call DataSift API", skip(self))]
    async fn call(&self, endpoint: &str, params: &Params) -> Result<Value, Error> {
        let url = self.base_url.join(endpoint)?;
        debug!("url: {}", url);

        let response = self
            .client
            .post(url)
            .form(&form_pairs(params))
            .send()
            .await?;
        self.record_rate_limit(response.headers());

        Self::handle_response(response).await
    }

    fn rate_limit(&self) -> Option<u64> {
        self.rate_limit.read().ok().and_then(|r| r.limit)
    }

    fn rate_limit_remaining(&self) -> Option<u64> {
        self.rate_limit.read().ok().and_then(|r| r.remaining)
    }
}

// Flatten params into form fields. Strings go verbatim, everything else as its json text.
fn form_pairs(params: &Params) -> Vec<(&str, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.as_str(), value)
        })
        .collect()
}

fn header_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
