//! Authenticated access to the OVH REST API.
//!
//! Requests are signed with the application secret and consumer key as
//! described at <https://help.ovhcloud.com/csm/en-gb-api-getting-started-ovhcloud-api>.
//! The server clock offset is fetched once from `/auth/time` and applied to
//! every timestamp.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::Deserialize;
use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{ConfigError, OvhConfig};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Request parameters: path placeholders plus query or body fields.
pub type Params = Map<String, Value>;

/// Future returned by [`OvhApi`] calls.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Failure of a single vendor request.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("{method} {path} failed{}: {message}", status_suffix(.status))]
pub struct ApiError {
    /// HTTP method of the request.
    pub method: String,
    /// Expanded request path.
    pub path: String,
    /// HTTP status, absent for transport or decoding failures.
    pub status: Option<u16>,
    /// Raw response body, empty when none was received.
    pub body: String,
    /// Vendor or transport message.
    pub message: String,
}

impl ApiError {
    /// Builds an error for a request that never produced an HTTP response.
    #[must_use]
    pub fn transport(method: &Method, path: &str, message: impl Into<String>) -> Self {
        Self {
            method: method.as_str().to_owned(),
            path: path.to_owned(),
            status: None,
            body: String::new(),
            message: message.into(),
        }
    }

    /// Builds an error from a non-success HTTP response.
    ///
    /// The vendor `message` field is used when the body is an OVH error
    /// object; otherwise the raw body is the message.
    #[must_use]
    pub fn from_response(method: &Method, path: &str, status: u16, body: String) -> Self {
        #[derive(Deserialize)]
        struct VendorMessage {
            message: String,
        }

        let message = serde_json::from_str::<VendorMessage>(&body)
            .map(|parsed| parsed.message)
            .unwrap_or_else(|_| body.clone());
        Self {
            method: method.as_str().to_owned(),
            path: path.to_owned(),
            status: Some(status),
            body,
            message,
        }
    }
}

/// Minimal request primitive over the OVH API.
pub trait OvhApi: Send + Sync {
    /// Performs one request. `path` may contain `{name}` placeholders which
    /// are filled from, and removed from, `params`.
    fn request<'a>(&'a self, method: Method, path: &'a str, params: Params)
    -> ApiFuture<'a, Value>;
}

/// Substitutes `{name}` placeholders in `template` with values taken out of
/// `params`.
///
/// # Errors
///
/// Returns [`ApiError`] when a placeholder has no matching parameter or the
/// template has an unterminated placeholder.
pub fn expand_path(method: &Method, template: &str, params: &mut Params) -> Result<String, ApiError> {
    let mut expanded = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        expanded.push_str(literal);
        let Some(close) = tail.find('}') else {
            return Err(ApiError::transport(
                method,
                template,
                "unterminated path placeholder",
            ));
        };
        let (placeholder, after) = tail.split_at(close);
        let key = placeholder.trim_start_matches('{');
        let value = params.remove(key).ok_or_else(|| {
            ApiError::transport(method, template, format!("missing path parameter {key}"))
        })?;
        expanded.push_str(&param_to_string(&value));
        rest = after.strip_prefix('}').unwrap_or(after);
    }
    expanded.push_str(rest);
    Ok(expanded)
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|code| format!(" with status {code}")).unwrap_or_default()
}

fn param_to_string(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Computes the `X-Ovh-Signature` header value.
#[must_use]
pub fn sign(
    application_secret: &str,
    consumer_key: &str,
    method: &Method,
    url: &str,
    body: &str,
    timestamp: i64,
) -> String {
    let to_sign = format!(
        "{application_secret}+{consumer_key}+{}+{url}+{body}+{timestamp}",
        method.as_str()
    );
    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    format!("$1${}", hex::encode(hasher.finalize()))
}

/// [`OvhApi`] implementation backed by `reqwest`.
#[derive(Debug)]
pub struct HttpOvhApi {
    client: Client,
    base_url: String,
    application_key: String,
    application_secret: String,
    consumer_key: String,
    time_delta: OnceCell<i64>,
}

impl HttpOvhApi {
    /// Builds a client for the endpoint and credentials in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidField`] when the endpoint cannot be
    /// resolved or the HTTP client cannot be built.
    pub fn from_config(config: &OvhConfig) -> Result<Self, ConfigError> {
        let base_url = config
            .api_base_url()
            .ok_or_else(|| ConfigError::InvalidField {
                field: String::from("endpoint"),
                reason: format!("unknown endpoint '{}'", config.endpoint),
            })?;
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|err| ConfigError::InvalidField {
                field: String::from("endpoint"),
                reason: err.to_string(),
            })?;
        Ok(Self {
            client,
            base_url,
            application_key: config.application_key.clone(),
            application_secret: config.application_secret.clone(),
            consumer_key: config.consumer_key.clone(),
            time_delta: OnceCell::new(),
        })
    }

    /// Returns the resolved API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn time_delta(&self) -> Result<i64, ApiError> {
        self.time_delta
            .get_or_try_init(|| async {
                let path = "/auth/time";
                let url = format!("{}{path}", self.base_url);
                let response = self
                    .client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|err| ApiError::transport(&Method::GET, path, err.to_string()))?;
                let server_time: i64 = Self::read_body(&Method::GET, path, response)
                    .await
                    .and_then(|value| {
                        serde_json::from_value(value).map_err(|err| {
                            ApiError::transport(&Method::GET, path, err.to_string())
                        })
                    })?;
                let delta = server_time - chrono::Utc::now().timestamp();
                debug!(delta, "synchronised with OVH API clock");
                Ok::<i64, ApiError>(delta)
            })
            .await
            .copied()
    }

    fn build_url(&self, method: &Method, path: &str, params: &Params) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.base_url))
            .map_err(|err| ApiError::transport(method, path, err.to_string()))?;
        if sends_body(method) || params.is_empty() {
            return Ok(url);
        }
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, &param_to_string(value));
            }
        }
        Ok(url)
    }

    async fn read_body(
        method: &Method,
        path: &str,
        response: reqwest::Response,
    ) -> Result<Value, ApiError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|err| ApiError::transport(method, path, err.to_string()))?;
        if !status.is_success() {
            return Err(ApiError::from_response(method, path, status.as_u16(), text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|err| ApiError {
            method: method.as_str().to_owned(),
            path: path.to_owned(),
            status: Some(status.as_u16()),
            body: text.clone(),
            message: err.to_string(),
        })
    }

    async fn send(&self, method: Method, template: &str, mut params: Params) -> Result<Value, ApiError> {
        let path = expand_path(&method, template, &mut params)?;
        let url = self.build_url(&method, &path, &params)?;
        let body = if sends_body(&method) && !params.is_empty() {
            Value::Object(params).to_string()
        } else {
            String::new()
        };

        let timestamp = chrono::Utc::now().timestamp() + self.time_delta().await?;
        let signature = sign(
            &self.application_secret,
            &self.consumer_key,
            &method,
            url.as_str(),
            &body,
            timestamp,
        );
        debug!(method = %method, url = %url, "OVH API request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("X-Ovh-Application", &self.application_key)
            .header("X-Ovh-Consumer", &self.consumer_key)
            .header("X-Ovh-Timestamp", timestamp.to_string())
            .header("X-Ovh-Signature", signature);
        if !body.is_empty() {
            request = request
                .header("Content-Type", "application/json")
                .body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| ApiError::transport(&method, &path, err.to_string()))?;
        Self::read_body(&method, &path, response).await
    }
}

fn sends_body(method: &Method) -> bool {
    *method == Method::POST || *method == Method::PUT
}

impl OvhApi for HttpOvhApi {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        params: Params,
    ) -> ApiFuture<'a, Value> {
        Box::pin(self.send(method, path, params))
    }
}
