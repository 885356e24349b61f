//! Fee deduction and display-currency conversion.

use crate::config::PlatformPolicy;
use crate::currency::{BASE_CURRENCY, Currency};
use crate::dataset::Record;
use crate::rates::RateResolver;
use std::collections::{BTreeSet, HashMap};

/// Constrains which records enter the pipeline. `None` means "all"; an empty
/// platform set selects nothing.
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub platforms: Option<BTreeSet<String>>,
}

impl FilterSpec {
    pub fn matches(&self, record: &Record) -> bool {
        self.year.is_none_or(|y| record.year == y)
            && self.month.is_none_or(|m| record.month == m)
            && self
                .platforms
                .as_ref()
                .is_none_or(|p| p.contains(&record.platform))
    }
}

/// A record with fee deduction applied and amounts converted into the
/// display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedRecord {
    pub year: i32,
    pub month: u32,
    pub platform: String,
    pub native_currency: Currency,
    /// Pre-fee amount in native currency.
    pub gross: f64,
    /// Post-fee amount in native currency.
    pub net: f64,
    pub converted_gross: f64,
    pub converted_net: f64,
}

/// Filters, fee-adjusts, and converts records into the display currency.
///
/// The fee is deducted first, in native currency, and only for fee-bearing
/// platforms. Conversion then follows the display currency: the record's own
/// currency passes through unconverted, the base currency goes through the
/// resolver, and any other display currency excludes the record from the
/// view since no cross-rate is modeled.
pub fn transform(
    records: &[Record],
    filter: &FilterSpec,
    policies: &HashMap<String, PlatformPolicy>,
    fee_pct: f64,
    display: Currency,
    resolver: &RateResolver,
) -> Vec<TransformedRecord> {
    let default_policy = PlatformPolicy::default();
    records
        .iter()
        .filter(|r| filter.matches(r))
        .filter_map(|r| {
            let policy = policies.get(&r.platform).unwrap_or(&default_policy);
            let native = policy.currency;
            let gross = r.amount;
            let net = if policy.fee_bearing {
                gross * (1.0 - fee_pct / 100.0)
            } else {
                gross
            };

            let (converted_gross, converted_net) = if display == native {
                (gross, net)
            } else if display == BASE_CURRENCY {
                let rate = resolver.resolve(native, display, r.year, r.month);
                (gross * rate, net * rate)
            } else {
                return None;
            };

            Some(TransformedRecord {
                year: r.year,
                month: r.month,
                platform: r.platform.clone(),
                native_currency: native,
                gross,
                net,
                converted_gross,
                converted_net,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rates::ManualRates;

    fn policies() -> HashMap<String, PlatformPolicy> {
        HashMap::from([
            (
                "Freepik".to_string(),
                PlatformPolicy {
                    currency: Currency::Eur,
                    threshold: 50.0,
                    fee_bearing: true,
                },
            ),
            (
                "Adobe Stock".to_string(),
                PlatformPolicy {
                    currency: Currency::Usd,
                    threshold: 25.0,
                    fee_bearing: false,
                },
            ),
        ])
    }

    fn resolver() -> RateResolver {
        RateResolver::new(ManualRates {
            usd_brl: 5.0,
            eur_brl: 6.0,
        })
    }

    fn record(platform: &str, year: i32, month: u32, amount: f64) -> Record {
        Record {
            year,
            month,
            platform: platform.to_string(),
            amount,
        }
    }

    #[test]
    fn test_fee_then_conversion() {
        // 100 EUR at 24% fee: net 76 EUR; at EUR->BRL 6.00 that is 456 BRL
        // net and 600 BRL gross.
        let records = [record("Freepik", 2024, 3, 100.0)];
        let rows = transform(
            &records,
            &FilterSpec::default(),
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].native_currency, Currency::Eur);
        assert_eq!(rows[0].gross, 100.0);
        assert_eq!(rows[0].net, 76.0);
        assert!((rows[0].converted_gross - 600.0).abs() < 1e-9);
        assert!((rows[0].converted_net - 456.0).abs() < 1e-9);
    }

    #[test]
    fn test_fee_only_for_fee_bearing_platform() {
        let records = [record("Adobe Stock", 2024, 3, 100.0)];
        let rows = transform(
            &records,
            &FilterSpec::default(),
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );
        assert_eq!(rows[0].net, 100.0);
        assert!((rows[0].converted_net - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_native_display_currency_passes_through() {
        let records = [record("Freepik", 2024, 3, 100.0)];
        let rows = transform(
            &records,
            &FilterSpec::default(),
            &policies(),
            24.0,
            Currency::Eur,
            &resolver(),
        );
        assert_eq!(rows[0].converted_gross, 100.0);
        assert_eq!(rows[0].converted_net, 76.0);
    }

    #[test]
    fn test_third_currency_excludes_record() {
        // A EUR-native record cannot be shown in USD: no cross-rate.
        let records = [
            record("Freepik", 2024, 3, 100.0),
            record("Adobe Stock", 2024, 3, 50.0),
        ];
        let rows = transform(
            &records,
            &FilterSpec::default(),
            &policies(),
            24.0,
            Currency::Usd,
            &resolver(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].platform, "Adobe Stock");
    }

    #[test]
    fn test_unknown_platform_gets_default_policy() {
        let records = [record("New Site", 2024, 3, 10.0)];
        let rows = transform(
            &records,
            &FilterSpec::default(),
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );
        assert_eq!(rows[0].native_currency, Currency::Usd);
        assert_eq!(rows[0].net, 10.0);
        assert!((rows[0].converted_net - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_filter_spec() {
        let records = [
            record("Freepik", 2024, 3, 1.0),
            record("Freepik", 2023, 3, 2.0),
            record("Adobe Stock", 2024, 4, 3.0),
        ];

        let filter = FilterSpec {
            year: Some(2024),
            month: None,
            platforms: None,
        };
        let rows = transform(
            &records,
            &filter,
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );
        assert_eq!(rows.len(), 2);

        let filter = FilterSpec {
            year: Some(2024),
            month: Some(3),
            platforms: Some(BTreeSet::from(["Freepik".to_string()])),
        };
        let rows = transform(
            &records,
            &filter,
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].platform, "Freepik");

        // Empty platform set selects nothing.
        let filter = FilterSpec {
            year: None,
            month: None,
            platforms: Some(BTreeSet::new()),
        };
        let rows = transform(
            &records,
            &filter,
            &policies(),
            24.0,
            Currency::Brl,
            &resolver(),
        );
        assert!(rows.is_empty());
    }
}
