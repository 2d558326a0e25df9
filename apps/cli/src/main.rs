#![deny(warnings)]

//! Headless CLI for running the pricing pipeline and checking configuration.
//!
//! ```text
//! po-pricing run-pipeline [--config P] [--data P | --db URL] [--year Y] [--month M] [--date YYYY-MM-DD]
//!                         [--location L] [--verbose] [--json]
//! po-pricing check-config [--config P]
//! po-pricing chat "<message>" [--config P] [--data P | --db URL] [--date YYYY-MM-DD]
//! po-pricing import --data P --db URL
//! ```

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate};
use persistence::{JsonFileStore, MemoryStore, PublishedPriceTable, SqliteStore};
use pricing_core::{PricingConfig, PricingPeriod};
use pricing_service::{format_cli, PricingService};
use reasoning::{ReasoningGenerator, RuleBasedReasoner, Unavailable};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "assets/pricing_rules.yaml";
const DEFAULT_DATA: &str = "assets/sample_data.json";

#[derive(Debug, Default)]
struct Args {
    command: Option<String>,
    message: Option<String>,
    config: Option<String>,
    data: Option<String>,
    db: Option<String>,
    year: Option<i32>,
    month: Option<u32>,
    date: Option<NaiveDate>,
    location: Option<String>,
    verbose: bool,
    json: bool,
    no_reasoning: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next(),
            "--data" => args.data = it.next(),
            "--db" => args.db = it.next(),
            "--year" => args.year = Some(number(it.next(), "--year")?),
            "--month" => args.month = Some(number(it.next(), "--month")?),
            "--date" => {
                let raw = it.next().ok_or_else(|| anyhow!("--date needs a value"))?;
                args.date = Some(
                    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").with_context(|| format!("invalid --date '{raw}'"))?,
                );
            }
            "--location" => args.location = it.next(),
            "--verbose" | "-v" => args.verbose = true,
            "--json" => args.json = true,
            "--no-reasoning" => args.no_reasoning = true,
            other if other.starts_with("--") => bail!("unknown flag '{other}'"),
            _ if args.command.is_none() => args.command = Some(arg),
            _ if args.message.is_none() => args.message = Some(arg),
            _ => bail!("unexpected argument '{arg}'"),
        }
    }
    Ok(args)
}

fn number<T: std::str::FromStr>(value: Option<String>, flag: &str) -> Result<T> {
    let raw = value.ok_or_else(|| anyhow!("{flag} needs a value"))?;
    raw.parse().map_err(|_| anyhow!("invalid {flag} '{raw}'"))
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `--date` wins; otherwise `--year`/`--month`, each defaulting to today's.
fn period(args: &Args) -> Result<PricingPeriod> {
    if let Some(date) = args.date {
        return Ok(PricingPeriod::for_date(date));
    }
    let now = today();
    let year = args.year.unwrap_or(now.year());
    let month = args.month.unwrap_or(now.month());
    PricingPeriod::for_month(year, month).ok_or_else(|| anyhow!("month must be between 1 and 12, got {month}"))
}

fn load_config(args: &Args) -> Result<PricingConfig> {
    let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG);
    PricingConfig::load(path).with_context(|| format!("loading pricing rules from {path}"))
}

fn load_records(args: &Args) -> Result<(MemoryStore, PublishedPriceTable)> {
    if let Some(url) = args.db.as_deref() {
        let rt = tokio::runtime::Runtime::new()?;
        let parts = rt.block_on(async {
            let store = SqliteStore::connect(url).await?;
            store.snapshot().await
        });
        return parts.with_context(|| format!("reading records from {url}"));
    }
    let path = args.data.as_deref().unwrap_or(DEFAULT_DATA);
    JsonFileStore::new(path)
        .load()
        .and_then(|snapshot| snapshot.into_parts())
        .with_context(|| format!("reading records from {path}"))
}

fn reasoner(args: &Args) -> Box<dyn ReasoningGenerator> {
    if args.no_reasoning {
        Box::new(Unavailable::new("disabled with --no-reasoning"))
    } else {
        Box::new(RuleBasedReasoner)
    }
}

fn run_pipeline(args: &Args) -> Result<()> {
    let period = period(args)?;
    let (records, prices) = load_records(args)?;
    let service = PricingService::new(load_config(args)?, records, prices, reasoner(args))?;
    let run = service.run(&period, args.location.as_deref(), args.verbose)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&run)?);
        return Ok(());
    }
    if run.reports.is_empty() {
        let location_msg = args
            .location
            .as_deref()
            .map(|l| format!(" for location '{l}'"))
            .unwrap_or_default();
        println!("\n❌ No pricing results found{location_msg} for {}.", period.month);
        println!("This usually means:");
        println!("  1. No data is available in the record store");
        println!("  2. No data exists for the specified location");
        println!("  3. No data exists for the specified month/year");
        return Ok(());
    }
    println!("Pricing for {} (daily occupancy before {})\n", period.month, period.target_date);
    for report in &run.reports {
        println!("{}", format_cli(report, args.verbose));
    }
    for failure in &run.failures {
        println!("✗ {}: {}", failure.location, failure.error);
    }
    Ok(())
}

fn check_config(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    println!(
        "Config OK | locations: {} | tiers: {} | margin of safety: {}",
        config.locations.len(),
        config.dynamic_pricing_tiers.len(),
        config.global_margin_of_safety()
    );
    Ok(())
}

fn chat(args: &Args) -> Result<()> {
    let message = args.message.as_deref().ok_or_else(|| anyhow!("chat needs a message"))?;
    let (records, prices) = load_records(args)?;
    let service = PricingService::new(load_config(args)?, records, prices, reasoner(args))?;
    println!("{}", service.handle_chat_message(message, args.date.unwrap_or_else(today)));
    Ok(())
}

fn import(args: &Args) -> Result<()> {
    let url = args.db.as_deref().ok_or_else(|| anyhow!("import needs --db"))?;
    let path = args.data.as_deref().unwrap_or(DEFAULT_DATA);
    let snapshot = JsonFileStore::new(path).load()?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let store = SqliteStore::connect(url).await?;
        for record in &snapshot.monthly {
            store.upsert_monthly(record).await?;
        }
        for record in &snapshot.daily {
            store.upsert_daily(record).await?;
        }
        for price in &snapshot.published_prices {
            store.upsert_published_price(price).await?;
        }
        Ok::<_, persistence::StoreError>(())
    })?;
    println!(
        "Imported {} monthly, {} daily, {} published prices into {url}",
        snapshot.monthly.len(),
        snapshot.daily.len(),
        snapshot.published_prices.len()
    );
    Ok(())
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args()?;
    info!(command = ?args.command, location = ?args.location, "starting CLI");

    match args.command.as_deref() {
        Some("run-pipeline") => run_pipeline(&args),
        Some("check-config") => check_config(&args),
        Some("chat") => chat(&args),
        Some("import") => import(&args),
        Some(other) => bail!("unknown command '{other}' (expected run-pipeline, check-config, chat or import)"),
        None => bail!("usage: po-pricing <run-pipeline|check-config|chat|import> [flags]"),
    }
}
