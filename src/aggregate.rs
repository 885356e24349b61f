//! Aggregation of transformed records into series, platform totals, and
//! KPIs. Pure and synchronous; recomputed from scratch on every query.

use crate::dataset::MONTH_NAMES;
use crate::transform::TransformedRecord;
use std::collections::BTreeMap;
use std::fmt::Display;

/// A (year, month) time bucket. `Ord` is chronological, which matches the
/// lexicographic order of the zero-padded `Display` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

impl Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl PeriodKey {
    /// Human-readable label, e.g. "Março/2024". Months outside 1-12 render
    /// as "?".
    pub fn label(&self) -> String {
        let name = (self.month as usize)
            .checked_sub(1)
            .and_then(|i| MONTH_NAMES.get(i))
            .copied()
            .unwrap_or("?");
        format!("{}/{}", name, self.year)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTotal {
    pub period: PeriodKey,
    pub gross: f64,
    pub net: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformTotal {
    pub platform: String,
    pub gross: f64,
    pub net: f64,
    /// Share of the grand total net, 0.0 when the grand total is zero.
    pub share_pct: f64,
}

#[derive(Debug, Clone, Default)]
pub struct AggregateResult {
    pub rows: Vec<TransformedRecord>,
    /// Ascending by period.
    pub monthly_series: Vec<PeriodTotal>,
    /// Descending by net.
    pub platform_totals: Vec<PlatformTotal>,
    pub grand_total_gross: f64,
    pub grand_total_net: f64,
    pub active_period_count: usize,
    pub average_per_active_period: f64,
    pub best_period: Option<PeriodTotal>,
    pub worst_period: Option<PeriodTotal>,
}

/// Groups rows by time bucket and platform.
///
/// Best and worst period ties are broken by the lowest period key: buckets
/// are visited in ascending order and an extreme is only replaced by a
/// strictly better one.
pub fn aggregate(rows: Vec<TransformedRecord>) -> AggregateResult {
    let mut by_period: BTreeMap<PeriodKey, (f64, f64)> = BTreeMap::new();
    let mut by_platform: BTreeMap<String, (f64, f64)> = BTreeMap::new();

    for row in &rows {
        let key = PeriodKey {
            year: row.year,
            month: row.month,
        };
        let period = by_period.entry(key).or_insert((0.0, 0.0));
        period.0 += row.converted_gross;
        period.1 += row.converted_net;

        let platform = by_platform.entry(row.platform.clone()).or_insert((0.0, 0.0));
        platform.0 += row.converted_gross;
        platform.1 += row.converted_net;
    }

    let monthly_series: Vec<PeriodTotal> = by_period
        .into_iter()
        .map(|(period, (gross, net))| PeriodTotal { period, gross, net })
        .collect();

    let grand_total_gross: f64 = monthly_series.iter().map(|p| p.gross).sum();
    let grand_total_net: f64 = monthly_series.iter().map(|p| p.net).sum();

    let mut platform_totals: Vec<PlatformTotal> = by_platform
        .into_iter()
        .map(|(platform, (gross, net))| PlatformTotal {
            platform,
            gross,
            net,
            share_pct: if grand_total_net != 0.0 {
                net / grand_total_net * 100.0
            } else {
                0.0
            },
        })
        .collect();
    // Descending by net; the stable sort keeps equal platforms alphabetical.
    platform_totals.sort_by(|a, b| b.net.partial_cmp(&a.net).unwrap_or(std::cmp::Ordering::Equal));

    let mut best_period: Option<PeriodTotal> = None;
    let mut worst_period: Option<PeriodTotal> = None;
    for period in &monthly_series {
        match &best_period {
            Some(best) if period.net <= best.net => {}
            _ => best_period = Some(period.clone()),
        }
        match &worst_period {
            Some(worst) if period.net >= worst.net => {}
            _ => worst_period = Some(period.clone()),
        }
    }

    let active_period_count = monthly_series.len();
    let average_per_active_period = if active_period_count > 0 {
        grand_total_net / active_period_count as f64
    } else {
        0.0
    };

    AggregateResult {
        rows,
        monthly_series,
        platform_totals,
        grand_total_gross,
        grand_total_net,
        active_period_count,
        average_per_active_period,
        best_period,
        worst_period,
    }
}
