//! market-pulse CLI - currency strength and cross rates from the command line
//!
//! ## Example Usage
//!
//! ```bash
//! # One-off snapshot (demo data unless MARKET_PULSE_API_KEY is set)
//! market-pulse snapshot --timeframe 1D
//!
//! # Raw JSON payload
//! market-pulse snapshot --json
//!
//! # Serve GET /api/market-data
//! market-pulse serve
//!
//! # Inspect the cached entry for a timeframe
//! market-pulse cache show --timeframe 1D
//! ```

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use market_pulse::cache::{CacheStore, SqliteCacheStore};
use market_pulse::config::PulseConfig;
use market_pulse::currency::Currency;
use market_pulse::data::TwelveDataProvider;
use market_pulse::service::{MarketDataService, ServiceResponse};
use market_pulse::types::ResponsePayload;
use market_pulse::universe::cache_key;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

type Service = MarketDataService<SqliteCacheStore, TwelveDataProvider>;

/// market-pulse: currency strength index and cross-rate matrix
#[derive(Parser)]
#[command(name = "market-pulse")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Currency strength index and cross-rate matrix with a degrading cache", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch (or reuse) a snapshot and print it
    Snapshot {
        /// Timeframe label (cache partition)
        #[arg(short = 't', long)]
        timeframe: Option<String>,

        /// Print the raw JSON payload
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP endpoint
    Serve,

    /// Inspect the persistent cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show the stored entry for a timeframe
    Show {
        #[arg(short = 't', long)]
        timeframe: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but produced no data.
async fn run(cli: Cli) -> Result<bool> {
    let config = PulseConfig::load(cli.config.as_deref()).context("loading configuration")?;

    if cli.verbose {
        println!(
            "{} v{}",
            "market-pulse".cyan().bold(),
            env!("CARGO_PKG_VERSION")
        );
        println!("Cache: {}", config.cache_path.display().to_string().dimmed());
        println!(
            "Mode: {}",
            if config.is_demo() { "demo".yellow() } else { "live".green() }
        );
    }

    let service = build_service(&config)?;

    match cli.command {
        Commands::Snapshot { timeframe, json } => snapshot(&service, timeframe.as_deref(), json).await,
        Commands::Serve => serve(service, &config).await.map(|_| true),
        Commands::Cache {
            action: CacheAction::Show { timeframe },
        } => show_cache(&service, timeframe.as_deref()),
    }
}

fn build_service(config: &PulseConfig) -> Result<Service> {
    let store = SqliteCacheStore::open(&config.cache_path)
        .with_context(|| format!("opening cache at {}", config.cache_path.display()))?;
    let provider = TwelveDataProvider::from_config(config)?;
    Ok(MarketDataService::new(store, provider, config.service_options()))
}

async fn snapshot(service: &Service, timeframe: Option<&str>, json: bool) -> Result<bool> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}")?);
    spinner.set_message("Fetching quotes...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let response = service.respond(timeframe).await;
    spinner.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&response.to_json()?)?);
        return Ok(response.is_success());
    }

    match response {
        ServiceResponse::Served { payload, source } => {
            print_payload(&payload, &format!("{:?}", source));
            Ok(true)
        }
        ServiceResponse::Failed { error } => {
            eprintln!("{} {}", "No data available:".red().bold(), error);
            Ok(false)
        }
    }
}

fn print_payload(payload: &ResponsePayload, source: &str) {
    println!(
        "{} {}  {}",
        "Timeframe".bold(),
        payload.timeframe.cyan(),
        payload.last_updated.format("%Y-%m-%d %H:%M:%S UTC").to_string().dimmed()
    );
    println!("Source: {}", source.yellow());
    if payload.is_demo() {
        println!("{}", "Demo data (no provider credential or empty upstream answer)".yellow());
    }
    if let Some(age) = payload.cache_age {
        println!("Cache age: {}s", age);
    }
    if let Some(advisory) = &payload.error {
        println!("{} {}", "Note:".yellow().bold(), advisory);
    }

    println!("\n{}", "Currency strength".bold().underline());
    for s in &payload.strength {
        let bar = "#".repeat(((s.normalized_strength + 100.0) / 10.0).round() as usize);
        let value = format!("{:+7.2}", s.strength);
        let value = if s.strength >= 0.0 { value.green() } else { value.red() };
        println!("  {:<4} {} {:>6.1}  {}", s.currency.to_string().bold(), value, s.normalized_strength, bar);
    }

    println!("\n{}", "Cross-rate changes (%)".bold().underline());
    print!("      ");
    for c in Currency::ALL {
        print!("{:>8}", c.code());
    }
    println!();
    for (base, row) in payload.matrix.rows() {
        print!("  {:<4}", base.code().bold());
        for quote in Currency::ALL {
            match row.get(&quote).copied().flatten() {
                Some(cell) if cell.change >= 0.0 => print!("{:>8}", format!("{:+.2}", cell.change).green()),
                Some(cell) => print!("{:>8}", format!("{:+.2}", cell.change).red()),
                None => print!("{:>8}", "-".dimmed()),
            }
        }
        println!();
    }

    if let Some(gold) = &payload.gold {
        println!(
            "\n{} {:.2} ({:+.2}%)",
            gold.symbol.bold(),
            gold.price,
            gold.percent_change
        );
    }
}

#[cfg(feature = "server")]
async fn serve(service: Service, config: &PulseConfig) -> Result<()> {
    let addr = config.socket_addr()?;
    println!("{} http://{}/api/market-data", "Listening on".green().bold(), addr);
    market_pulse::server::serve(std::sync::Arc::new(service), addr).await?;
    Ok(())
}

#[cfg(not(feature = "server"))]
async fn serve(_service: Service, _config: &PulseConfig) -> Result<()> {
    anyhow::bail!("this build has no HTTP endpoint; rebuild with --features server")
}

fn show_cache(service: &Service, timeframe: Option<&str>) -> Result<bool> {
    let timeframe = timeframe
        .filter(|t| !t.is_empty())
        .unwrap_or(service.options().default_timeframe.as_str());
    let key = cache_key(timeframe);
    let now = Utc::now();

    let Some(entry) = service.store().get(&key)? else {
        println!("{} nothing cached for {}", "Empty:".yellow().bold(), key);
        return Ok(false);
    };

    let age = entry.age_secs(now);
    let ttl = service.options().ttl_secs;
    let state = if entry.is_fresh(now, ttl) {
        format!("fresh, refresh in {}s", ttl.saturating_sub(age)).green()
    } else {
        "stale".red()
    };

    println!("{} {}", "Key:".bold(), entry.key);
    println!("{} {} ({}s ago, {})", "Written:".bold(), entry.updated_at, age, state);
    println!("{} {}", "Pairs:".bold(), entry.payload.pairs.len());
    println!("{} {}", "Demo:".bold(), entry.payload.is_demo());
    Ok(true)
}
