use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use mstk::log::init_logging;
use mstk::{AppCommand, ReportOptions};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Path to the earnings dataset (overrides the configured data_file)
    #[arg(short, long, global = true)]
    data_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ReportArgs {
    /// Restrict to a single year
    #[arg(long)]
    year: Option<i32>,

    /// Restrict to a single month (1-12)
    #[arg(long)]
    month: Option<u32>,

    /// Restrict to one or more platforms (repeatable)
    #[arg(long = "platform")]
    platforms: Vec<String>,

    /// Display currency (BRL, USD or EUR)
    #[arg(long)]
    currency: Option<String>,

    /// Manual USD -> BRL rate
    #[arg(long)]
    usd_rate: Option<f64>,

    /// Manual EUR -> BRL rate
    #[arg(long)]
    eur_rate: Option<f64>,

    /// Fee percentage for fee-bearing platforms
    #[arg(long)]
    fee: Option<f64>,

    /// Convert with historical mid-month rates instead of manual rates
    #[arg(long)]
    historical: bool,
}

impl ReportArgs {
    fn into_options(self) -> Result<ReportOptions> {
        let currency = self
            .currency
            .as_deref()
            .map(|c| c.parse::<mstk::currency::Currency>())
            .transpose()?;
        Ok(ReportOptions {
            year: self.year,
            month: self.month,
            platforms: self.platforms,
            currency,
            usd_rate: self.usd_rate,
            eur_rate: self.eur_rate,
            fee_pct: self.fee,
            historical: self.historical,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display the earnings dashboard
    Summary(ReportArgs),
    /// Display available balances against payout thresholds
    Balances(ReportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(Commands::Summary(args)) => {
            mstk::run_command(
                AppCommand::Summary,
                args.into_options()?,
                cli.config_path.as_deref(),
                cli.data_path.as_deref(),
            )
            .await
        }
        Some(Commands::Balances(args)) => {
            mstk::run_command(
                AppCommand::Balances,
                args.into_options()?,
                cli.config_path.as_deref(),
                cli.data_path.as_deref(),
            )
            .await
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = mstk::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = serde_yaml::to_string(&mstk::config::AppConfig::default())
        .context("Failed to serialize default configuration")?;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
