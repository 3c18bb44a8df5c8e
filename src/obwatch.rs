//! Client for a JoinMarket ob-watcher instance.
//!
//! `POST /refreshorderbook` asks the watcher to resync with the message
//! channels, `GET /orderbook.json` returns the current offers.

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Deserializer};
use std::time::Duration;

use crate::config::Config;
use crate::models::{OrderRecord, OrderType};
use crate::refresh::{CancellationToken, OrderSource, RefreshError};
use crate::utils::{fraction_to_percent, remove_trailing_slash, retry};

pub struct ObwatchApi {
    api_url: String,
    client: reqwest::Client,
    retries: u32,
    retry_base_delay: Duration,
}

impl ObwatchApi {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self::with_client(&config.obwatch_url, client)
            .with_retries(config.retries, config.retry_base_delay))
    }

    pub fn with_client(api_url: &str, client: reqwest::Client) -> Self {
        Self {
            api_url: remove_trailing_slash(api_url),
            client,
            retries: 0,
            retry_base_delay: Duration::from_millis(500),
        }
    }

    pub fn with_retries(mut self, retries: u32, base_delay: Duration) -> Self {
        self.retries = retries;
        self.retry_base_delay = base_delay;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path)
    }

    /// Ask the watcher to rebuild its orderbook. Fails when the watcher is not running.
    pub async fn refresh_orderbook(&self) -> Result<(), RefreshError> {
        let url = self.build_url("refreshorderbook");
        let response = self.client.post(&url).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    pub async fn fetch_orderbook(&self) -> Result<Vec<OrderRecord>, RefreshError> {
        let url = self.build_url("orderbook.json");
        let url = url.as_str();
        let client = &self.client;
        let orders = retry(self.retries, self.retry_base_delay, || async move {
            let response = ensure_success(client.get(url).send().await?).await?;
            let body = response.text().await?;
            parse_orderbook(&body)
        })
        .await?;
        info!("[obwatch] fetched {} offers", orders.len());
        Ok(orders)
    }
}

#[async_trait]
impl OrderSource for ObwatchApi {
    async fn refresh(&self, token: &CancellationToken) -> Result<Vec<OrderRecord>, RefreshError> {
        self.refresh_orderbook().await?;
        if token.is_cancelled() {
            // discarded by the coordinator
            return Ok(Vec::new());
        }
        self.fetch_orderbook().await
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, RefreshError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RefreshError::Status {
        status: status.as_u16(),
        reason: error_message(&body).or_else(|| status.canonical_reason().map(String::from)),
    })
}

fn error_message(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("message")
        .and_then(|m| m.as_str())
        .filter(|m| !m.trim().is_empty())
        .map(String::from)
}

/// Decode an `orderbook.json` body. Offers that do not decode are skipped.
pub fn parse_orderbook(body: &str) -> Result<Vec<OrderRecord>, RefreshError> {
    let parsed: OrderbookJson =
        serde_json::from_str(body).map_err(|e| RefreshError::Decode(e.to_string()))?;

    let mut orders = Vec::with_capacity(parsed.offers.len());
    for offer in parsed.offers {
        match serde_json::from_value::<OfferJson>(offer) {
            Ok(offer) => orders.push(offer.into_order()),
            Err(e) => warn!("[obwatch] skipping malformed offer: {}", e),
        }
    }
    Ok(orders)
}

#[derive(Deserialize)]
struct OrderbookJson {
    #[serde(default)]
    offers: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
struct OfferJson {
    counterparty: String,
    #[serde(deserialize_with = "deserialize_text")]
    oid: String,
    ordertype: String,
    #[serde(deserialize_with = "deserialize_number")]
    minsize: f64,
    #[serde(deserialize_with = "deserialize_number")]
    maxsize: f64,
    #[serde(default, deserialize_with = "deserialize_number")]
    txfee: f64,
    #[serde(deserialize_with = "deserialize_text")]
    cjfee: String,
    #[serde(default, deserialize_with = "deserialize_number")]
    fidelity_bond_value: f64,
}

impl OfferJson {
    fn into_order(self) -> OrderRecord {
        // relative fees arrive as a fraction of the coinjoin amount
        let fee = if self.ordertype.ends_with("reloffer") {
            fraction_to_percent(&self.cjfee).unwrap_or_else(|| self.cjfee.clone())
        } else {
            self.cjfee.clone()
        };
        OrderRecord {
            order_id: self.oid,
            counterparty: self.counterparty,
            order_type: OrderType::from_wire(&self.ordertype),
            fee,
            minimum_size: self.minsize,
            maximum_size: self.maxsize,
            miner_fee_contribution: self.txfee,
            bond_value: self.fidelity_bond_value,
        }
    }
}

fn deserialize_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum N {
        Num(f64),
        Str(String),
    }
    match N::deserialize(deserializer)? {
        N::Num(n) => Ok(n),
        N::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
