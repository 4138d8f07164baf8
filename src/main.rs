mod api;
mod cache;
mod calendar;
mod cli;
mod config;
mod consumption;
mod cost;
mod prelude;
mod prices;
mod quantity;
mod tables;
mod tariff;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    cache::CacheDir,
    calendar::{HolidayCalendar, PolishHolidays},
    cli::{Args, Command},
    config::Config,
    consumption::HourlySeries,
    cost::CostEngine,
    prelude::*,
    prices::{
        AcquisitionPipeline,
        cache::{CachedFileSource, PriceCache},
        dataset::DatasetSource,
        scrape::ScrapeSource,
        simulated::SimulatedSource,
    },
    quantity::interval::Interval,
    tariff::ZoneClassifier,
};

#[tokio::main]
async fn main() -> Result {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::read_from(&args.config_file)?;
    let cache_dir = CacheDir::new(&args.cache_dir);
    let (year, month) = (args.period.year, args.period.month);
    ensure!((1..=12).contains(&month), "the month must be within 1..=12");

    let holidays: Option<&dyn HolidayCalendar> =
        config.meter.use_polish_holidays.then_some(&PolishHolidays);
    let classifier = ZoneClassifier::new(config.meter.supports_summer_winter, holidays);

    match args.command {
        Command::Compare(command_args) => {
            let hourly =
                fetch_hourly(&command_args.supla.token, &config, &cache_dir, year, month).await?;
            info!(n_hours = hourly.len(), total = %hourly.total(), "normalized the month");

            let engine = CostEngine::builder().config(&config).classifier(classifier).build();
            let ranked = engine.compute_static(&hourly, command_args.tariffs())?;
            println!("{}", tables::build_comparison_table(&ranked));

            // Best-effort: a missing dynamic estimate is not a failure.
            match production_pipeline(&cache_dir)?.acquire(year, month).await {
                Ok(points) => {
                    if let Some(dynamic) = engine.compute_dynamic(&hourly, &points) {
                        println!("{}", tables::build_dynamic_table(&dynamic));
                    }
                }
                Err(error) => {
                    warn!(error = format!("{error:#}"), "skipping the dynamic estimate");
                }
            }
            Ok(())
        }

        Command::Prices => {
            let points = production_pipeline(&cache_dir)?.acquire(year, month).await?;
            println!("{}", tables::build_price_summary_table(&points));
            Ok(())
        }

        Command::Consumption(command_args) => {
            let hourly =
                fetch_hourly(&command_args.supla.token, &config, &cache_dir, year, month).await?;
            println!("{}", tables::build_consumption_summary_table(&hourly, &classifier));
            Ok(())
        }
    }
}

async fn fetch_hourly(
    token: &str,
    config: &Config,
    cache_dir: &CacheDir,
    year: i32,
    month: u32,
) -> Result<HourlySeries> {
    let supla = api::Supla::try_new(token)?;
    let logs = supla
        .get_measurement_logs_cached(cache_dir, config.meter.channel_id, year, month)
        .await?;
    let readings = api::supla::parse_readings(&logs)?;
    Ok(consumption::normalize_hourly(&readings, Interval::utc_month(year, month))?)
}

/// The ordered fallback chain: cached file, then the live scrape (with cache
/// write-back), then the public dataset, then the simulation.
fn production_pipeline(cache_dir: &CacheDir) -> Result<AcquisitionPipeline> {
    let price_cache = PriceCache::new(cache_dir.clone());
    Ok(AcquisitionPipeline::new(vec![
        Box::new(CachedFileSource::new(price_cache.clone())),
        Box::new(ScrapeSource::new(api::PgeQuotes::try_new()?, price_cache)),
        Box::new(DatasetSource::new(api::PseReports::try_new()?)),
        Box::new(SimulatedSource),
    ]))
}
