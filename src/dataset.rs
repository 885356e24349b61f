//! Dataset loading and flattening.
//!
//! The source document is a single JSON file with a nested
//! platform -> year -> month-label -> amount map plus the current available
//! balance per platform. Loading is all-or-nothing: a malformed root fails
//! with a descriptive error. Individual malformed entries (unknown month
//! label, non-numeric amount, bad year key) are normalized or skipped during
//! flattening instead.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::{fs, path::Path};
use tracing::debug;

/// Portuguese month names, indexed by month number - 1.
pub const MONTH_NAMES: [&str; 12] = [
    "Janeiro",
    "Fevereiro",
    "Março",
    "Abril",
    "Maio",
    "Junho",
    "Julho",
    "Agosto",
    "Setembro",
    "Outubro",
    "Novembro",
    "Dezembro",
];

/// Maps a month label to its 1-based number. Case-insensitive; accepts the
/// unaccented "marco" spelling for March.
pub fn month_number(label: &str) -> Option<u32> {
    match label.to_lowercase().as_str() {
        "janeiro" => Some(1),
        "fevereiro" => Some(2),
        "março" | "marco" => Some(3),
        "abril" => Some(4),
        "maio" => Some(5),
        "junho" => Some(6),
        "julho" => Some(7),
        "agosto" => Some(8),
        "setembro" => Some(9),
        "outubro" => Some(10),
        "novembro" => Some(11),
        "dezembro" => Some(12),
        _ => None,
    }
}

/// One flattened earnings entry in the platform's native currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    pub month: u32,
    pub platform: String,
    pub amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct EarningsDataset {
    /// platform -> year string -> arbitrary JSON; non-object year values and
    /// unparseable entries are dropped during flattening.
    pub sites: HashMap<String, HashMap<String, serde_json::Value>>,
    #[serde(rename = "availableBalances", default)]
    pub available_balances: HashMap<String, Option<f64>>,
}

impl EarningsDataset {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read data file: {}", path.as_ref().display()))?;

        let dataset: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse data file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded dataset");
        Ok(dataset)
    }

    /// Flattens the nested map into records. Pure and idempotent; output
    /// order is unspecified (the aggregator re-sorts).
    pub fn flatten(&self) -> Vec<Record> {
        let mut out = Vec::new();
        for (platform, years) in &self.sites {
            for (year_str, months) in years {
                let Ok(year) = year_str.parse::<i32>() else {
                    debug!("Skipping unparseable year key: {}", year_str);
                    continue;
                };
                if year <= 0 {
                    continue;
                }
                let Some(months) = months.as_object() else {
                    debug!("Skipping non-object months for {}/{}", platform, year_str);
                    continue;
                };
                for (label, value) in months {
                    let Some(month) = month_number(label) else {
                        debug!("Skipping unrecognized month label: {}", label);
                        continue;
                    };
                    out.push(Record {
                        year,
                        month,
                        platform: platform.clone(),
                        amount: coerce_amount(value),
                    });
                }
            }
        }
        out
    }
}

/// Amounts are assumed mostly well-formed; `null` and anything non-numeric
/// coerce to zero rather than failing the load.
fn coerce_amount(value: &serde_json::Value) -> f64 {
    match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
}
