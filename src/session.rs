//! Report session: the single state object behind the query interface.
//!
//! The record set and balances are loaded once and stay immutable for the
//! session. View state (filter, display currency, manual rates, fee, and the
//! historical-mode flag) is mutated only through the setters; every query
//! recomputes its result from the current snapshot, so repeated calls are
//! idempotent.

use crate::aggregate::{AggregateResult, aggregate};
use crate::config::{AppConfig, PlatformPolicy};
use crate::currency::{BASE_CURRENCY, Currency};
use crate::dataset::{EarningsDataset, Record};
use crate::rate_provider::HistoricalRateProvider;
use crate::rates::{ManualRates, PrefetchStatus, RateResolver};
use crate::transform::{FilterSpec, transform};
use std::collections::{BTreeSet, HashMap};

/// One platform's available balance against its payout threshold.
/// `progress_pct` is the raw ratio; presentation clamps it to 100.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceView {
    pub platform: String,
    pub native_currency: Currency,
    pub native_balance: f64,
    pub native_threshold: f64,
    pub progress_pct: f64,
}

pub struct ReportSession {
    records: Vec<Record>,
    balances: HashMap<String, Option<f64>>,
    policies: HashMap<String, PlatformPolicy>,
    filter: FilterSpec,
    display_currency: Currency,
    fee_pct: f64,
    resolver: RateResolver,
}

impl ReportSession {
    pub fn new(config: &AppConfig, dataset: &EarningsDataset) -> Self {
        ReportSession {
            records: dataset.flatten(),
            balances: dataset.available_balances.clone(),
            policies: config.platforms.clone(),
            filter: FilterSpec::default(),
            display_currency: config.currency,
            fee_pct: config.fee_pct,
            resolver: RateResolver::new(config.rates),
        }
    }

    pub fn set_filter(&mut self, filter: FilterSpec) {
        self.filter = filter;
    }

    pub fn set_display_currency(&mut self, currency: Currency) {
        self.display_currency = currency;
    }

    pub fn set_manual_rates(&mut self, usd_rate: f64, eur_rate: f64) {
        self.resolver.set_manual_rates(ManualRates {
            usd_brl: usd_rate,
            eur_brl: eur_rate,
        });
    }

    pub fn set_fee_percentage(&mut self, pct: f64) {
        self.fee_pct = pct;
    }

    pub fn set_historical_mode(&mut self, enabled: bool) {
        self.resolver.set_historical_mode(enabled);
    }

    pub fn display_currency(&self) -> Currency {
        self.display_currency
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of distinct (year, month) buckets, the unit of prefetch work.
    pub fn bucket_count(&self) -> usize {
        self.records
            .iter()
            .map(|r| (r.year, r.month))
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub async fn prefetch_historical_rates(
        &mut self,
        provider: &dyn HistoricalRateProvider,
        on_progress: &(dyn Fn() + Sync),
    ) -> PrefetchStatus {
        self.resolver
            .prefetch(&self.records, provider, on_progress)
            .await
    }

    /// Runs the full pipeline against the current state snapshot.
    pub fn aggregate_result(&self) -> AggregateResult {
        aggregate(transform(
            &self.records,
            &self.filter,
            &self.policies,
            self.fee_pct,
            self.display_currency,
            &self.resolver,
        ))
    }

    /// Balances against payout thresholds, sorted descending by balance.
    /// A zero threshold means "no ceiling": progress is 100.
    pub fn available_balance_view(&self) -> Vec<BalanceView> {
        let default_policy = PlatformPolicy::default();
        let mut views: Vec<BalanceView> = self
            .balances
            .iter()
            .filter_map(|(platform, balance)| {
                let balance = (*balance)?;
                let policy = self.policies.get(platform).unwrap_or(&default_policy);
                let progress_pct = if policy.threshold > 0.0 {
                    balance / policy.threshold * 100.0
                } else {
                    100.0
                };
                Some(BalanceView {
                    platform: platform.clone(),
                    native_currency: policy.currency,
                    native_balance: balance,
                    native_threshold: policy.threshold,
                    progress_pct,
                })
            })
            .collect();
        views.sort_by(|a, b| {
            b.native_balance
                .partial_cmp(&a.native_balance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.platform.cmp(&b.platform))
        });
        views
    }

    /// A platform's available balance expressed in the display currency.
    /// In the base currency everything is spot-converted; in a foreign
    /// display currency only same-currency balances count.
    pub fn receivable(&self, platform: &str) -> f64 {
        let balance = self
            .balances
            .get(platform)
            .copied()
            .flatten()
            .unwrap_or(0.0);
        let native = self
            .policies
            .get(platform)
            .map_or(Currency::Usd, |p| p.currency);
        if self.display_currency == BASE_CURRENCY {
            balance * self.resolver.resolve_spot(native, BASE_CURRENCY)
        } else if self.display_currency == native {
            balance
        } else {
            0.0
        }
    }

    /// Sum of all available balances in the display currency.
    pub fn available_balance_total(&self) -> f64 {
        self.balances
            .keys()
            .map(|platform| self.receivable(platform))
            .sum()
    }
}
