use std::path::PathBuf;

use clap::{Parser, Subcommand};
use enumset::EnumSet;

use crate::tariff::Tariff;

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[clap(flatten)]
    pub period: PeriodArgs,

    /// Tariff and charge tables.
    #[clap(long = "config", env = "TARYFA_CONFIG", default_value = "taryfa.toml")]
    pub config_file: PathBuf,

    /// Where consumption snapshots and price series are kept between runs.
    #[clap(long = "cache-dir", env = "TARYFA_CACHE_DIR", default_value = ".")]
    pub cache_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Copy, Clone, Parser)]
pub struct PeriodArgs {
    /// Billing year.
    #[clap(long, env = "TARYFA_YEAR")]
    pub year: i32,

    /// Billing month (1–12).
    #[clap(long, env = "TARYFA_MONTH")]
    pub month: u32,
}

#[derive(Subcommand)]
pub enum Command {
    /// Main command: fetch the readings, acquire the prices, and compare every tariff.
    #[clap(name = "compare")]
    Compare(Box<CompareArgs>),

    /// Run the price acquisition pipeline alone and show the series.
    #[clap(name = "prices")]
    Prices,

    /// Fetch and normalize the meter readings alone.
    #[clap(name = "consumption")]
    Consumption(Box<ConsumptionArgs>),
}

#[derive(Parser)]
pub struct CompareArgs {
    #[clap(flatten)]
    pub supla: SuplaArgs,

    /// Static tariffs to compare.
    #[clap(
        long = "tariffs",
        value_delimiter = ',',
        num_args = 1..,
        default_value = "g11,g12,g12w,g12n",
    )]
    pub tariffs: Vec<Tariff>,
}

impl CompareArgs {
    #[must_use]
    pub fn tariffs(&self) -> EnumSet<Tariff> {
        self.tariffs.iter().copied().collect()
    }
}

#[derive(Parser)]
pub struct ConsumptionArgs {
    #[clap(flatten)]
    pub supla: SuplaArgs,
}

#[derive(Parser)]
pub struct SuplaArgs {
    /// SUPLA Cloud personal access token.
    #[clap(long = "supla-token", env = "SUPLA_TOKEN")]
    pub token: String,
}
