//! Conversion rate resolution.
//!
//! A rate is resolved with a fixed precedence: identity for same-currency
//! pairs, then the historical rate for the record's month bucket when
//! historical mode is on and the bucket has been prefetched, then the manual
//! rate for the pair. Pairs the tool does not model resolve to 1.0, a silent
//! no-op: only USD->BRL and EUR->BRL conversions exist in this domain.

use crate::currency::Currency;
use crate::dataset::Record;
use crate::rate_provider::HistoricalRateProvider;
use futures::future;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// User-configured fallback rates, used whenever no historical rate applies.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ManualRates {
    pub usd_brl: f64,
    pub eur_brl: f64,
}

impl Default for ManualRates {
    fn default() -> Self {
        ManualRates {
            usd_brl: 5.0,
            eur_brl: 6.0,
        }
    }
}

/// Historical rates for one (year, month) bucket, observed at the bucket's
/// representative mid-month date.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BucketRates {
    usd_brl: f64,
    eur_brl: f64,
}

/// Outcome of a historical prefetch batch. Failures are reported, never
/// raised: a failed bucket simply falls back to manual rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefetchStatus {
    pub loaded: usize,
    pub failed: usize,
}

/// The representative day used to pin a (year, month) bucket to a date.
pub fn mid_month(year: i32, month: u32) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::from_ymd_opt(year, month, 15)
}

pub struct RateResolver {
    manual: ManualRates,
    historical: HashMap<chrono::NaiveDate, BucketRates>,
    historical_mode: bool,
}

impl RateResolver {
    pub fn new(manual: ManualRates) -> Self {
        RateResolver {
            manual,
            historical: HashMap::new(),
            historical_mode: false,
        }
    }

    pub fn set_manual_rates(&mut self, rates: ManualRates) {
        self.manual = rates;
    }

    pub fn manual_rates(&self) -> ManualRates {
        self.manual
    }

    pub fn set_historical_mode(&mut self, enabled: bool) {
        self.historical_mode = enabled;
    }

    pub fn historical_mode(&self) -> bool {
        self.historical_mode
    }

    pub fn has_historical_rates(&self) -> bool {
        !self.historical.is_empty()
    }

    /// Resolves the rate for an amount earned in a given (year, month)
    /// bucket.
    pub fn resolve(&self, from: Currency, to: Currency, year: i32, month: u32) -> f64 {
        if from == to {
            return 1.0;
        }
        if let Some(rate) = self.historical_rate(from, to, year, month) {
            return rate;
        }
        self.manual_rate(from, to)
    }

    /// Resolves the rate for a current amount with no time bucket, such as an
    /// available balance. Historical rates never apply here.
    pub fn resolve_spot(&self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }
        self.manual_rate(from, to)
    }

    fn manual_rate(&self, from: Currency, to: Currency) -> f64 {
        match (from, to) {
            (Currency::Usd, Currency::Brl) => self.manual.usd_brl,
            (Currency::Eur, Currency::Brl) => self.manual.eur_brl,
            // Unmodeled pair: leave the amount unconverted.
            _ => 1.0,
        }
    }

    fn historical_rate(&self, from: Currency, to: Currency, year: i32, month: u32) -> Option<f64> {
        if !self.historical_mode || self.historical.is_empty() {
            return None;
        }
        let rates = self.historical.get(&mid_month(year, month)?)?;
        match (from, to) {
            (Currency::Usd, Currency::Brl) => Some(rates.usd_brl),
            (Currency::Eur, Currency::Brl) => Some(rates.eur_brl),
            _ => None,
        }
    }

    /// Fetches historical rates for every distinct (year, month) bucket in
    /// `records`. The whole batch runs concurrently, with the two currency
    /// pairs of a bucket joined together; results are folded in ascending
    /// bucket order. A bucket is stored only when both pairs succeed.
    /// Re-running is idempotent: the provider's cache answers repeat keys
    /// without another network call.
    pub async fn prefetch(
        &mut self,
        records: &[Record],
        provider: &dyn HistoricalRateProvider,
        on_progress: &(dyn Fn() + Sync),
    ) -> PrefetchStatus {
        let buckets: BTreeSet<(i32, u32)> = records.iter().map(|r| (r.year, r.month)).collect();
        let dates: Vec<chrono::NaiveDate> = buckets
            .into_iter()
            .filter_map(|(year, month)| mid_month(year, month))
            .collect();

        let fetches = dates.into_iter().map(|date| async move {
            let pair = future::join(
                provider.fetch_rate(Currency::Usd, Currency::Brl, date),
                provider.fetch_rate(Currency::Eur, Currency::Brl, date),
            )
            .await;
            on_progress();
            (date, pair)
        });
        let results = future::join_all(fetches).await;

        let mut status = PrefetchStatus::default();
        for (date, pair) in results {
            match pair {
                (Ok(usd_brl), Ok(eur_brl)) => {
                    debug!(%date, usd_brl, eur_brl, "Loaded historical rates");
                    self.historical.insert(date, BucketRates { usd_brl, eur_brl });
                    status.loaded += 1;
                }
                (usd, eur) => {
                    for err in [usd.err(), eur.err()].into_iter().flatten() {
                        warn!(%date, error = %err, "Historical rate fetch failed");
                    }
                    status.failed += 1;
                }
            }
        }
        status
    }
}
