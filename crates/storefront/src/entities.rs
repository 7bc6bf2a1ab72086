//! Client for the hosted entity API.
//!
//! The backend exposes generic per-entity collections. The storefront only
//! ever creates records (orders at checkout), so that is all the
//! [`EntityClient`] trait asks for.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::EntityApiConfig;

/// Errors that can occur when talking to the entity API.
#[derive(Debug, Error)]
pub enum EntityError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The entity name produced an invalid URL.
    #[error("Invalid entity URL: {0}")]
    Url(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Non-success status.
    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The created record came back without an `id`.
    #[error("Created record has no id")]
    MissingId,
}

/// The `create` half of the backend's generic entity contract.
pub trait EntityClient {
    /// Create a record of `entity` from `data`, returning the stored record.
    fn create(
        &self,
        entity: &str,
        data: Value,
    ) -> impl Future<Output = Result<Value, EntityError>> + Send;
}

/// Extract a record ID, accepting string or numeric IDs.
///
/// # Errors
///
/// Returns `EntityError::MissingId` if the record has no usable `id` field.
pub fn record_id(record: &Value) -> Result<String, EntityError> {
    match record.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        _ => Err(EntityError::MissingId),
    }
}

/// HTTP implementation of [`EntityClient`].
///
/// `POST {base_url}entities/{entity}` with a bearer token. Cheaply cloneable.
#[derive(Clone)]
pub struct HttpEntityClient {
    inner: Arc<HttpEntityClientInner>,
}

struct HttpEntityClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl HttpEntityClient {
    /// Create a new client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. TLS backend
    /// initialization failure).
    pub fn new(config: &EntityApiConfig) -> Result<Self, EntityError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bakehouse/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(HttpEntityClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            }),
        })
    }

    /// Collection URL for an entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity name cannot be joined onto the base URL.
    pub fn endpoint(&self, entity: &str) -> Result<Url, EntityError> {
        Ok(self.inner.base_url.join("entities/")?.join(entity)?)
    }
}

impl std::fmt::Debug for HttpEntityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEntityClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl EntityClient for HttpEntityClient {
    async fn create(&self, entity: &str, data: Value) -> Result<Value, EntityError> {
        let url = self.endpoint(entity)?;

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(self.inner.api_key.expose_secret())
            .json(&data)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(EntityError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;
        parse_response(status.as_u16(), &text)
    }
}

/// Map a raw API response to a record or an error.
fn parse_response(status: u16, text: &str) -> Result<Value, EntityError> {
    if !(200..300).contains(&status) {
        let body: String = text.chars().take(200).collect();
        tracing::error!(status, body = %body, "Entity API returned non-success status");
        return Err(EntityError::Status { status, body });
    }

    match serde_json::from_str(text) {
        Ok(record) => Ok(record),
        Err(e) => {
            tracing::error!(
                error = %e,
                body = %text.chars().take(500).collect::<String>(),
                "Failed to parse entity API response"
            );
            Err(EntityError::Parse(e))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;

    fn client(base: &str) -> HttpEntityClient {
        HttpEntityClient::new(&EntityApiConfig {
            base_url: Url::parse(base).unwrap(),
            api_key: SecretString::from("k_9f8a7b6c5d4e3f2a1b0c"),
            order_entity: "Order".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_endpoint_appends_to_base_path() {
        let client = client("https://api.bakehouse.test/v1/");
        assert_eq!(
            client.endpoint("Order").unwrap().as_str(),
            "https://api.bakehouse.test/v1/entities/Order"
        );
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", client("https://api.bakehouse.test/"));
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("k_9f8a"));
    }

    #[test]
    fn test_parse_response_success() {
        let record = parse_response(201, r#"{"id":"ord_1","status":"pending"}"#).unwrap();
        assert_eq!(record_id(&record).unwrap(), "ord_1");
    }

    #[test]
    fn test_parse_response_error_status() {
        let err = parse_response(422, "missing customer_phone").unwrap_err();
        assert!(matches!(
            err,
            EntityError::Status { status: 422, ref body } if body == "missing customer_phone"
        ));
    }

    #[test]
    fn test_parse_response_bad_json() {
        assert!(matches!(
            parse_response(200, "<html>"),
            Err(EntityError::Parse(_))
        ));
    }

    #[test]
    fn test_record_id_variants() {
        assert_eq!(record_id(&json!({"id": 42})).unwrap(), "42");
        assert!(matches!(record_id(&json!({"id": ""})), Err(EntityError::MissingId)));
        assert!(matches!(record_id(&json!({"name": "x"})), Err(EntityError::MissingId)));
    }
}
