use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    prelude::*,
    prices::{PricePoint, PriceSource, cache::PriceCache, days_in_month, warsaw_hour_to_utc},
    quantity::rate::KilowattHourRate,
};

/// One row of a daily quote table: the Warsaw-local hour the quote starts at.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HourlyQuote {
    pub hour: u32,
    pub rate: KilowattHourRate,
}

/// Fetches the rendered quote table for a single day; `None` when the page
/// carries no table for that date.
#[async_trait]
pub trait DayQuotes: Send + Sync {
    async fn fetch_day(&self, on: NaiveDate) -> Result<Option<Vec<HourlyQuote>>>;
}

/// Scrapes the month day by day.
///
/// A day without a table is read as an upstream outage: fetching stops right
/// there instead of skipping ahead. The month is accepted only when at least
/// 80 % of its days came through; an accepted month is written back to the
/// cache so the next run short-circuits on the first source.
pub struct ScrapeSource<Q> {
    quotes: Q,
    cache: PriceCache,
}

impl<Q> ScrapeSource<Q> {
    pub const fn new(quotes: Q, cache: PriceCache) -> Self {
        Self { quotes, cache }
    }
}

#[async_trait]
impl<Q: DayQuotes> PriceSource for ScrapeSource<Q> {
    fn name(&self) -> &'static str {
        "live scrape"
    }

    #[instrument(skip_all, fields(year = year, month = month))]
    async fn attempt(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>> {
        let n_days = days_in_month(year, month);
        let mut points = Vec::new();
        let mut n_fetched_days = 0;

        for day in 1..=n_days {
            let on = NaiveDate::from_ymd_opt(year, month, day).unwrap();
            match self.quotes.fetch_day(on).await {
                Ok(Some(quotes)) if !quotes.is_empty() => {
                    points.extend(quotes.iter().filter_map(|quote| {
                        warsaw_hour_to_utc(on, quote.hour)
                            .map(|hour| PricePoint { hour, rate: quote.rate })
                    }));
                    n_fetched_days += 1;
                }
                Ok(_) => {
                    warn!(%on, "no quote table, treating it as an outage");
                    break;
                }
                Err(error) => {
                    warn!(%on, error = format!("{error:#}"), "fetch failed, treating it as an outage");
                    break;
                }
            }
        }

        // At least 80 % of the days must be in.
        if n_fetched_days * 5 < n_days * 4 {
            info!(n_fetched_days, n_days, "below the acceptance threshold");
            return Ok(None);
        }

        if let Err(error) = self.cache.store(year, month, &points) {
            warn!(error = format!("{error:#}"), "failed to persist the scraped month");
        }
        Ok(Some(points))
    }
}
