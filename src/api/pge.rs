//! Quote table on the [PGE dynamic-offer page](https://www.gkpge.pl/dla-domu/oferta/dynamiczna-energia-z-pge).

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;

use crate::{
    api::client,
    prelude::*,
    prices::scrape::{DayQuotes, HourlyQuote},
    quantity::rate::KilowattHourRate,
};

const QUOTES_URL: &str = "https://www.gkpge.pl/dla-domu/oferta/dynamiczna-energia-z-pge";

/// The quote container serializes its rows right after this header.
const TABLE_HEADER: &str = "Kurs (PLN/kWh)";

pub struct Api(Client);

impl Api {
    pub fn try_new() -> Result<Self> {
        Ok(Self(client::try_new()?))
    }
}

#[async_trait]
impl DayQuotes for Api {
    /// Get the day's exchange quotes as rendered on the offer page.
    ///
    /// The table is script-rendered, so a plain fetch legitimately comes back
    /// without it; that is a `None`, and the acquisition chain moves on.
    #[instrument(fields(on = %on), skip_all)]
    async fn fetch_day(&self, on: NaiveDate) -> Result<Option<Vec<HourlyQuote>>> {
        info!("Fetching…");
        let page = self
            .0
            .get(QUOTES_URL)
            .query(&[("tge_quotes_form[dateTime]", on.format("%Y-%m-%d").to_string())])
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .text()
            .await
            .context("failed to read the page")?;
        Ok(parse_quote_table(&page))
    }
}

/// Extract hour rows from the quote container.
///
/// After the header the text reads `H-H+1`, the PLN/MWh figure, then the
/// PLN/kWh figure, repeated per hour. Rows with a price outside the plausible
/// (0.01, 10) zł/kWh range are rejected.
fn parse_quote_table(page: &str) -> Option<Vec<HourlyQuote>> {
    let (_, table) = page.split_once(TABLE_HEADER)?;
    let text = strip_tags(table);
    let mut tokens = text.split_whitespace();

    let mut quotes = Vec::new();
    while let Some(token) = tokens.next() {
        let Some(hour) = parse_hour_span(token) else {
            continue;
        };
        let Some(_megawatt_hour_price) = tokens.next().and_then(parse_number) else {
            continue;
        };
        let Some(price) = tokens.next().and_then(parse_number) else {
            continue;
        };
        if (0.01..=10.0).contains(&price) {
            quotes.push(HourlyQuote { hour, rate: KilowattHourRate::from(price) });
        }
    }
    (!quotes.is_empty()).then_some(quotes)
}

/// `"0-1"` → hour 0; anything that is not a one-hour span is skipped.
fn parse_hour_span(token: &str) -> Option<u32> {
    let (start, end) = token.split_once('-')?;
    let start: u32 = start.parse().ok()?;
    let end: u32 = end.parse().ok()?;
    ((start < 24) && (end == start + 1)).then_some(start)
}

fn parse_number(token: &str) -> Option<f64> {
    token.replace(',', ".").parse().ok()
}

/// Markup-to-text in the crudest workable way: tags become whitespace, so the
/// remaining tokens line up the way the rendered container reads.
fn strip_tags(markup: &str) -> String {
    let mut text = String::with_capacity(markup.len());
    let mut in_tag = false;
    for character in markup.chars() {
        match character {
            '<' => in_tag = true,
            '>' => {
                in_tag = false;
                text.push(' ');
            }
            _ if !in_tag => text.push(character),
            _ => {}
        }
    }
    text
}
