pub mod cache;
pub mod dataset;
pub mod scrape;
pub mod simulated;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, MappedLocalTime, Months, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Warsaw;

use crate::{
    prelude::*,
    quantity::{interval::Interval, rate::KilowattHourRate},
};

/// One hour of the day-ahead exchange series, net of VAT.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PricePoint {
    pub hour: DateTime<Utc>,
    pub rate: KilowattHourRate,
}

/// A single strategy in the ordered acquisition chain.
///
/// Both `Ok(None)` and `Err(_)` mean "nothing here, try the next source" to the
/// pipeline; an error is only worth a log line.
#[async_trait]
pub trait PriceSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>>;
}

/// Every source came up empty. The last source in the production chain is the
/// simulation, which cannot fail, so reaching this is a defect rather than an
/// expected branch.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("every price source came up empty for {year}-{month:02}")]
pub struct AcquisitionExhausted {
    pub year: i32,
    pub month: u32,
}

/// Tries the sources strictly in order and short-circuits on the first month
/// that yields data.
pub struct AcquisitionPipeline {
    sources: Vec<Box<dyn PriceSource>>,
}

impl AcquisitionPipeline {
    #[must_use]
    pub fn new(sources: Vec<Box<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    #[instrument(skip_all, fields(year = year, month = month))]
    pub async fn acquire(&self, year: i32, month: u32) -> Result<Vec<PricePoint>> {
        for source in &self.sources {
            match source.attempt(year, month).await {
                Ok(Some(points)) => {
                    let points = Self::sanitize(points, year, month);
                    if points.is_empty() {
                        info!(source = source.name(), "nothing within the month, moving on");
                        continue;
                    }
                    info!(source = source.name(), n_points = points.len(), "acquired");
                    return Ok(points);
                }
                Ok(None) => {
                    info!(source = source.name(), "no data, moving on");
                }
                Err(error) => {
                    warn!(
                        source = source.name(),
                        error = format!("{error:#}"),
                        "failed, moving on",
                    );
                }
            }
        }
        Err(AcquisitionExhausted { year, month }.into())
    }

    /// At most one point per hour, nothing outside the month, sorted.
    fn sanitize(points: Vec<PricePoint>, year: i32, month: u32) -> Vec<PricePoint> {
        let month_interval = Interval::utc_month(year, month);
        let mut by_hour = BTreeMap::new();
        for point in points {
            if month_interval.contains(point.hour) {
                by_hour.entry(point.hour).or_insert(point.rate);
            }
        }
        by_hour.into_iter().map(|(hour, rate)| PricePoint { hour, rate }).collect()
    }
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    let next = first.checked_add_months(Months::new(1)).unwrap();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        next.signed_duration_since(first).num_days() as u32
    }
}

/// Map a Warsaw-local hour to its UTC instant. Nonexistent hours (the spring
/// DST gap) yield `None`; ambiguous ones resolve to the earlier offset.
pub(crate) fn warsaw_hour_to_utc(on: NaiveDate, hour: u32) -> Option<DateTime<Utc>> {
    let local = on.and_hms_opt(hour, 0, 0)?;
    match Warsaw.from_local_datetime(&local) {
        MappedLocalTime::Single(at) | MappedLocalTime::Ambiguous(at, _) => {
            Some(at.with_timezone(&Utc))
        }
        MappedLocalTime::None => None,
    }
}
