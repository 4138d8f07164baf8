use async_trait::async_trait;
use chrono::{DateTime, Datelike, TimeDelta, Timelike, Weekday};
use chrono_tz::{Europe::Warsaw, Tz};

use crate::{
    prelude::*,
    prices::{PricePoint, PriceSource},
    quantity::{interval::Interval, rate::KilowattHourRate},
};

/// Last-resort source: a synthetic series shaped like the Polish day-ahead
/// market, so the exchange-indexed estimate always has input. Never fails,
/// and is fully determined by (year, month).
pub struct SimulatedSource;

#[async_trait]
impl PriceSource for SimulatedSource {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn attempt(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>> {
        let interval = Interval::utc_month(year, month);
        let mut points = Vec::new();
        let mut hour = interval.start;
        while hour < interval.end {
            points.push(PricePoint { hour, rate: simulate(hour.with_timezone(&Warsaw)) });
            hour += TimeDelta::hours(1);
        }
        info!(n_points = points.len(), "synthesized the month");
        Ok(Some(points))
    }
}

/// Base level and spread per local hour, in PLN/MWh. The shape follows the
/// 2024 day-ahead averages: cheap nights, a morning and an evening peak.
const fn band(hour: u32) -> (f64, f64) {
    match hour {
        0..=5 => (300.0, 60.0),
        6 => (450.0, 90.0),
        7..=9 => (700.0, 120.0),
        10..=14 => (500.0, 80.0),
        15..=16 => (550.0, 90.0),
        17..=20 => (750.0, 130.0),
        21 => (600.0, 100.0),
        _ => (350.0, 70.0),
    }
}

const WEEKEND_FACTOR: f64 = 0.70;

fn simulate(at: DateTime<Tz>) -> KilowattHourRate {
    let (mut base, spread) = band(at.hour());
    if matches!(at.weekday(), Weekday::Sat | Weekday::Sun) {
        base *= WEEKEND_FACTOR;
    }
    KilowattHourRate::from_megawatt_hour_rate(base + jitter(at) * spread)
}

/// Bounded jitter in `[-0.5, 0.5)`, a pure function of the timestamp.
fn jitter(at: DateTime<Tz>) -> f64 {
    let digest = md5::compute(at.to_rfc3339());
    let seed = u64::from_be_bytes(digest.0[..8].try_into().unwrap());

    #[allow(clippy::cast_precision_loss)]
    let centered = (seed % 100) as f64 - 50.0;
    centered / 100.0
}
