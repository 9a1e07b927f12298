use crate::core::{LookupOptions, SellerId, SellerLookup};
use crate::utils::error::{Result, ScanError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.keepa.com";
pub const DEFAULT_MAX_TOKEN_WAITS: u32 = 3;

const DEFAULT_REFILL_WAIT: Duration = Duration::from_secs(60);
const MAX_REFILL_WAIT: Duration = Duration::from_secs(300);

/// Keepa's numeric id for a marketplace code.
pub fn domain_id(domain: &str) -> Option<u8> {
    match domain {
        "US" => Some(1),
        "GB" => Some(2),
        "DE" => Some(3),
        "FR" => Some(4),
        "JP" => Some(5),
        "CA" => Some(6),
        "IT" => Some(8),
        "ES" => Some(9),
        "IN" => Some(10),
        "MX" => Some(11),
        _ => None,
    }
}

fn status_name(status: StatusCode) -> &'static str {
    match status.as_u16() {
        400 => "REQUEST_REJECTED",
        402 => "PAYMENT_REQUIRED",
        405 => "METHOD_NOT_ALLOWED",
        429 => "NOT_ENOUGH_TOKEN",
        500 => "INTERNAL_SERVER_ERROR",
        _ => "UNEXPECTED_STATUS",
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SellerResponse {
    sellers: Option<Map<String, Value>>,
    tokens_left: Option<i64>,
    refill_in: Option<u64>,
    error: Option<ProviderErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// Seller lookups against the Keepa `/seller` endpoint.
///
/// Token exhaustion (HTTP 429) is handled here: the client sleeps for the
/// refill time Keepa reports and sends the same request again, up to
/// `max_token_waits` times.
#[derive(Clone)]
pub struct KeepaClient {
    client: Client,
    api_key: String,
    base_url: String,
    max_token_waits: u32,
}

impl KeepaClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_token_waits: DEFAULT_MAX_TOKEN_WAITS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_token_waits(mut self, max_token_waits: u32) -> Self {
        self.max_token_waits = max_token_waits;
        self
    }

    async fn request_sellers(
        &self,
        seller_ids: &[SellerId],
        domain_id: u8,
        options: LookupOptions,
    ) -> Result<(StatusCode, String)> {
        let url = format!("{}/seller", self.base_url);
        let domain = domain_id.to_string();
        let sellers = seller_ids.join(",");
        let storefront = if options.storefront { "1" } else { "0" };

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("domain", domain.as_str()),
                ("seller", sellers.as_str()),
                ("storefront", storefront),
            ])
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(reqwest::Error::without_url)?;
        Ok((status, body))
    }
}

fn refill_wait(body: &str) -> Duration {
    serde_json::from_str::<SellerResponse>(body)
        .ok()
        .and_then(|r| r.refill_in)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_REFILL_WAIT)
        .min(MAX_REFILL_WAIT)
}

fn parse_sellers(body: &str) -> Result<HashMap<SellerId, Value>> {
    let parsed: SellerResponse =
        serde_json::from_str(body).map_err(|e| ScanError::MalformedResponse {
            message: e.to_string(),
        })?;

    if let Some(error) = parsed.error {
        return Err(ScanError::ProviderError {
            status: 200,
            message: error
                .message
                .or(error.kind)
                .unwrap_or_else(|| "unknown provider error".to_string()),
        });
    }

    if let Some(tokens_left) = parsed.tokens_left {
        tracing::debug!("Keepa tokens left: {}", tokens_left);
    }

    let sellers = parsed.sellers.ok_or_else(|| ScanError::MalformedResponse {
        message: "response has no sellers object".to_string(),
    })?;

    Ok(sellers.into_iter().collect())
}

#[async_trait]
impl SellerLookup for KeepaClient {
    async fn lookup(
        &self,
        seller_ids: &[SellerId],
        domain: &str,
        options: LookupOptions,
    ) -> Result<HashMap<SellerId, Value>> {
        let keepa_domain = domain_id(domain).ok_or_else(|| ScanError::InvalidConfigValueError {
            field: "keepa.domain".to_string(),
            value: domain.to_string(),
            reason: "Unknown Keepa domain code".to_string(),
        })?;

        let mut waits = 0;
        loop {
            let (status, body) = self.request_sellers(seller_ids, keepa_domain, options).await?;

            if status == StatusCode::TOO_MANY_REQUESTS {
                if waits >= self.max_token_waits {
                    return Err(ScanError::RateLimitExhausted { attempts: waits });
                }
                waits += 1;
                let wait = refill_wait(&body);
                tracing::info!(
                    "Keepa tokens exhausted, waiting {:?} before retrying ({}/{})",
                    wait,
                    waits,
                    self.max_token_waits
                );
                tokio::time::sleep(wait).await;
                continue;
            }

            if !status.is_success() {
                return Err(ScanError::ProviderError {
                    status: status.as_u16(),
                    message: status_name(status).to_string(),
                });
            }

            return parse_sellers(&body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn ids(values: &[&str]) -> Vec<SellerId> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_domain_ids() {
        assert_eq!(domain_id("US"), Some(1));
        assert_eq!(domain_id("GB"), Some(2));
        assert_eq!(domain_id("DE"), Some(3));
        assert_eq!(domain_id("MX"), Some(11));
        assert_eq!(domain_id("de"), None);
        assert_eq!(domain_id("XX"), None);
    }

    #[tokio::test]
    async fn test_lookup_sends_batch_in_one_request() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/seller")
                .query_param("key", "test-key")
                .query_param("domain", "3")
                .query_param("seller", "A1,B2")
                .query_param("storefront", "0");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "tokensLeft": 150,
                    "refillIn": 1000,
                    "sellers": {
                        "A1": {"sellerName": "Alpha", "country": "GB"},
                        "B2": null
                    }
                }));
        });

        let client = KeepaClient::new("test-key").with_base_url(server.base_url());
        let result = client
            .lookup(&ids(&["A1", "B2"]), "DE", LookupOptions::default())
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(result.len(), 2);
        assert_eq!(result["A1"]["sellerName"], "Alpha");
        assert!(result["B2"].is_null());
    }

    #[tokio::test]
    async fn test_storefront_option_is_forwarded() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/seller")
                .query_param("domain", "2")
                .query_param("storefront", "1");
            then.status(200).json_body(json!({"sellers": {}}));
        });

        let client = KeepaClient::new("k").with_base_url(format!("{}/", server.base_url()));
        let result = client
            .lookup(&ids(&["A1"]), "GB", LookupOptions { storefront: true })
            .await
            .unwrap();

        api_mock.assert();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/seller");
            then.status(402);
        });

        let client = KeepaClient::new("k").with_base_url(server.base_url());
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        api_mock.assert();
        match err {
            ScanError::ProviderError { status, message } => {
                assert_eq!(status, 402);
                assert_eq!(message, "PAYMENT_REQUIRED");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_body_is_provider_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/seller");
            then.status(200).json_body(json!({
                "error": {"type": "invalidParameter", "message": "seller id invalid"}
            }));
        });

        let client = KeepaClient::new("k").with_base_url(server.base_url());
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("seller id invalid"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/seller");
            then.status(200).body("<html>gateway</html>");
        });

        let client = KeepaClient::new("k").with_base_url(server.base_url());
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_sellers_object_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/seller");
            then.status(200).json_body(json!({"tokensLeft": 10}));
        });

        let client = KeepaClient::new("k").with_base_url(server.base_url());
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::MalformedResponse { .. }));
    }

    #[tokio::test]
    async fn test_token_exhaustion_waits_then_gives_up() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/seller");
            then.status(429).json_body(json!({"refillIn": 5, "tokensLeft": -20}));
        });

        let client = KeepaClient::new("k")
            .with_base_url(server.base_url())
            .with_max_token_waits(2);
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        api_mock.assert_hits(3);
        assert!(matches!(err, ScanError::RateLimitExhausted { attempts: 2 }));
    }

    #[tokio::test]
    async fn test_unknown_domain_is_rejected_before_request() {
        let client = KeepaClient::new("k").with_base_url("http://127.0.0.1:9");
        let err = client
            .lookup(&ids(&["A1"]), "XX", LookupOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::InvalidConfigValueError { .. }));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_expose_api_key() {
        let client = KeepaClient::new("SUPER-SECRET-KEY").with_base_url("http://127.0.0.1:9");
        let err = client
            .lookup(&ids(&["A1"]), "DE", LookupOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::ApiError(_)));
        let logged = format!("Batch {} failed: {}", 1, err);
        assert!(!logged.contains("SUPER-SECRET-KEY"));
        assert!(!format!("{:?}", err).contains("SUPER-SECRET-KEY"));
        assert!(!err.user_friendly_message().contains("SUPER-SECRET-KEY"));
    }

    #[test]
    fn test_refill_wait() {
        assert_eq!(refill_wait(r#"{"refillIn": 1500}"#), Duration::from_millis(1500));
        assert_eq!(refill_wait("not json"), DEFAULT_REFILL_WAIT);
        assert_eq!(refill_wait(r#"{"refillIn": 99999999}"#), MAX_REFILL_WAIT);
    }
}
