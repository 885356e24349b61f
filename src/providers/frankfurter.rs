use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::currency::Currency;
use crate::rate_cache::RateCache;
use crate::rate_provider::{HistoricalRateProvider, RateKey};

/// Date-keyed rate provider backed by a Frankfurter-compatible API. Each
/// (from, to, date) result is cached for the process lifetime; the cache is
/// checked before any request is issued.
pub struct FrankfurterProvider {
    base_url: String,
    cache: RateCache,
}

impl FrankfurterProvider {
    pub fn new(base_url: &str, cache: RateCache) -> Self {
        FrankfurterProvider {
            base_url: base_url.to_string(),
            cache,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    rates: HashMap<String, f64>,
}

#[async_trait]
impl HistoricalRateProvider for FrankfurterProvider {
    #[instrument(
        name = "FrankfurterRateFetch",
        skip(self),
        fields(from = %from, to = %to, date = %date)
    )]
    async fn fetch_rate(&self, from: Currency, to: Currency, date: NaiveDate) -> Result<f64> {
        let key = RateKey { from, to, date };
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!("{}/{}?from={}&to={}", self.base_url, date, from, to);
        debug!("Requesting historical rate from {}", url);

        let client = reqwest::Client::builder().user_agent("mstk/1.0").build()?;
        let response = client.get(&url).send().await.map_err(|e| {
            anyhow!("Request error: {} for pair {}->{} on {}", e, from, to, date)
        })?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for pair {}->{} on {}",
                response.status(),
                from,
                to,
                date
            ));
        }

        let text = response.text().await?;
        let data: FrankfurterResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", date, e))?;

        let rate = data
            .rates
            .get(&to.to_string())
            .copied()
            .ok_or_else(|| anyhow!("No rate data found for pair {}->{} on {}", from, to, date))?;

        self.cache.put(key, rate).await;
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    async fn create_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2024-03-15"))
            .and(query_param("from", "USD"))
            .and(query_param("to", "BRL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    #[tokio::test]
    async fn test_successful_rate_fetch() {
        let mock_response = r#"{
            "amount": 1.0,
            "base": "USD",
            "date": "2024-03-15",
            "rates": {"BRL": 4.97}
        }"#;
        let mock_server = create_mock_server(mock_response).await;
        let cache = RateCache::new();

        let provider = FrankfurterProvider::new(&mock_server.uri(), cache);
        let rate = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await
            .expect("Failed to get rate");
        assert_eq!(rate, 4.97);
    }

    #[tokio::test]
    async fn test_rate_fetch_uses_cache() {
        let mock_response = r#"{"rates": {"BRL": 4.97}}"#;
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2024-03-15"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(1)
            .mount(&mock_server)
            .await;

        let cache = RateCache::new();
        let provider = FrankfurterProvider::new(&mock_server.uri(), cache);

        let first = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await
            .unwrap();
        let second = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_target_rate() {
        let mock_response = r#"{"rates": {"EUR": 0.92}}"#;
        let mock_server = create_mock_server(mock_response).await;
        let cache = RateCache::new();

        let provider = FrankfurterProvider::new(&mock_server.uri(), cache);
        let result = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "No rate data found for pair USD->BRL on 2024-03-15"
        );
    }

    #[tokio::test]
    async fn test_api_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/2024-03-15"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let cache = RateCache::new();
        let provider = FrankfurterProvider::new(&mock_server.uri(), cache);
        let result = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await;
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().to_string(),
            "HTTP error: 500 Internal Server Error for pair USD->BRL on 2024-03-15"
        );
    }

    #[tokio::test]
    async fn test_api_malformed_response() {
        let mock_response = r#"{"rate": {"BRL": 4.97}}"#; // "rate" instead of "rates"
        let mock_server = create_mock_server(mock_response).await;
        let cache = RateCache::new();

        let provider = FrankfurterProvider::new(&mock_server.uri(), cache);
        let result = provider
            .fetch_rate(Currency::Usd, Currency::Brl, date())
            .await;
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse JSON response for 2024-03-15")
        );
    }
}
