pub mod aggregate;
pub mod cli;
pub mod config;
pub mod currency;
pub mod dataset;
pub mod log;
pub mod providers;
pub mod rate_cache;
pub mod rate_provider;
pub mod rates;
pub mod session;
pub mod transform;

use crate::currency::Currency;
use crate::dataset::EarningsDataset;
use crate::providers::frankfurter::FrankfurterProvider;
use crate::session::ReportSession;
use crate::transform::FilterSpec;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Balances,
}

/// View parameters collected from the command line, applied on top of the
/// configured defaults.
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub platforms: Vec<String>,
    pub currency: Option<Currency>,
    pub usd_rate: Option<f64>,
    pub eur_rate: Option<f64>,
    pub fee_pct: Option<f64>,
    pub historical: bool,
}

pub async fn run_command(
    command: AppCommand,
    options: ReportOptions,
    config_path: Option<&str>,
    data_path: Option<&str>,
) -> Result<()> {
    info!("Earnings tracker starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let data_path: PathBuf = data_path
        .map(PathBuf::from)
        .or_else(|| config.data_file.clone())
        .context("No data file configured; pass --data-path or set data_file in the config")?;
    let dataset = EarningsDataset::load_from_path(&data_path)?;

    let mut session = ReportSession::new(&config, &dataset);

    if options.year.is_some() || options.month.is_some() || !options.platforms.is_empty() {
        let platforms = (!options.platforms.is_empty())
            .then(|| options.platforms.iter().cloned().collect::<BTreeSet<_>>());
        session.set_filter(FilterSpec {
            year: options.year,
            month: options.month,
            platforms,
        });
    }
    if let Some(currency) = options.currency {
        session.set_display_currency(currency);
    }
    session.set_manual_rates(
        options.usd_rate.unwrap_or(config.rates.usd_brl),
        options.eur_rate.unwrap_or(config.rates.eur_brl),
    );
    if let Some(fee_pct) = options.fee_pct {
        session.set_fee_percentage(fee_pct);
    }

    if options.historical {
        let rate_cache = rate_cache::RateCache::new();
        let provider = FrankfurterProvider::new(&config.provider.base_url, rate_cache);

        let pb = cli::ui::new_progress_bar(session.bucket_count() as u64, true);
        pb.set_message("Fetching historical rates...");
        let status = session
            .prefetch_historical_rates(&provider, &|| pb.inc(1))
            .await;
        pb.finish_and_clear();

        session.set_historical_mode(true);
        info!(
            loaded = status.loaded,
            failed = status.failed,
            "Historical rate prefetch finished"
        );
        if status.failed > 0 {
            println!(
                "{}",
                cli::ui::style_text(
                    &format!(
                        "{} of {} periods loaded; {} failed, falling back to manual rates",
                        status.loaded,
                        status.loaded + status.failed,
                        status.failed
                    ),
                    cli::ui::StyleType::Subtle
                )
            );
        }
    }

    match command {
        AppCommand::Summary => cli::summary::run(&session),
        AppCommand::Balances => cli::balances::run(&session),
    }
}
