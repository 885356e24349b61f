//! Provides historical currency rate lookup for the application.

use crate::currency::Currency;
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Cache key for a single historical rate observation. Historical rates are
/// immutable facts, so entries never expire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateKey {
    pub from: Currency,
    pub to: Currency,
    pub date: NaiveDate,
}

#[async_trait]
pub trait HistoricalRateProvider: Send + Sync {
    /// Returns the `from` -> `to` conversion rate as observed on `date`.
    async fn fetch_rate(&self, from: Currency, to: Currency, date: NaiveDate) -> Result<f64>;
}
