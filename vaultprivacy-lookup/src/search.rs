use crate::error::{LookupError, Result};
use crate::result::{Grade, RatingRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://api.tosdr.org/search/v4/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Body of a ToS;DR search response. Services are kept as raw JSON so a
/// single odd entry does not make the whole response unreadable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub parameters: Option<SearchParameters>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParameters {
    #[serde(default)]
    pub services: Vec<Value>,
}

impl SearchResponse {
    pub fn services(&self) -> &[Value] {
        self.parameters
            .as_ref()
            .map(|p| p.services.as_slice())
            .unwrap_or(&[])
    }

    /// Pick the service whose URLs mention `domain`, else the first one.
    pub fn best_match(&self, domain: &str) -> Option<&Value> {
        let services = self.services();
        services
            .iter()
            .find(|service| service_urls(service).any(|url| url.contains(domain)))
            .or_else(|| services.first())
    }
}

fn service_urls(service: &Value) -> impl Iterator<Item = &str> {
    service
        .get("urls")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
}

/// Service ids arrive as numbers or numeric strings.
pub(crate) fn service_id_from_value(value: Option<&Value>) -> Option<i64> {
    match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Build a record from one service descriptor of the search response.
pub fn record_from_service(domain: &str, service: &Value) -> RatingRecord {
    let name = service
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(domain)
        .to_string();

    let grade = service
        .get("rating")
        .and_then(|rating| rating.get("letter"))
        .and_then(Value::as_str)
        .map(Grade::from_letter)
        .unwrap_or(Grade::Unknown);

    let service_id = service_id_from_value(service.get("id"));

    RatingRecord {
        domain: domain.to_string(),
        grade,
        service_id,
        name,
    }
}

/// Anything that can run a search query for a domain.
#[async_trait]
pub trait ServiceSearch: Send + Sync {
    async fn search(&self, domain: &str) -> Result<SearchResponse>;
}

/// HTTP client for the ToS;DR search endpoint.
pub struct TosdrClient {
    client: Client,
    endpoint: String,
}

impl TosdrClient {
    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("VaultPrivacy/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ServiceSearch for TosdrClient {
    async fn search(&self, domain: &str) -> Result<SearchResponse> {
        debug!("Searching {} for {}", self.endpoint, domain);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", domain)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| LookupError::Decode(e.to_string()))
    }
}
