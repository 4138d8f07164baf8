use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use crate::{
    prelude::*,
    prices::{PricePoint, PriceSource, warsaw_hour_to_utc},
    quantity::rate::KilowattHourRate,
};

/// Fetches the month's settlement-price table as loosely typed rows.
#[async_trait]
pub trait SettlementRows: Send + Sync {
    async fn fetch_month(&self, year: i32, month: u32) -> Result<Option<Vec<Value>>>;
}

/// Normalizes a regulator's settlement-price table into price points.
///
/// The publisher has shipped several column layouts over the years, so the
/// date, hour, and price columns are matched against known aliases; a table
/// with none of them yields nothing rather than an error.
pub struct DatasetSource<F> {
    rows: F,
}

impl<F> DatasetSource<F> {
    pub const fn new(rows: F) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl<F: SettlementRows> PriceSource for DatasetSource<F> {
    fn name(&self) -> &'static str {
        "public dataset"
    }

    #[instrument(skip_all, fields(year = year, month = month))]
    async fn attempt(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>> {
        let Some(rows) = self.rows.fetch_month(year, month).await? else {
            return Ok(None);
        };
        Ok(normalize_rows(&rows))
    }
}

const DATE_COLUMNS: &[&str] = &["business_date", "doba", "date"];
const HOUR_COLUMNS: &[&str] = &["period", "godzina", "hour"];
const PRICE_COLUMNS: &[&str] = &["rce_pln", "cena", "price"];

fn normalize_rows(rows: &[Value]) -> Option<Vec<PricePoint>> {
    let first = rows.first()?;
    let date_column = *DATE_COLUMNS.iter().find(|column| first.get(**column).is_some())?;
    let hour_column = *HOUR_COLUMNS.iter().find(|column| first.get(**column).is_some())?;
    let price_column = *PRICE_COLUMNS.iter().find(|column| first.get(**column).is_some())?;

    let mut points = Vec::new();
    for row in rows {
        let Some(point) = normalize_row(row, date_column, hour_column, price_column) else {
            continue;
        };
        points.push(point);
    }
    (!points.is_empty()).then_some(points)
}

fn normalize_row(
    row: &Value,
    date_column: &str,
    hour_column: &str,
    price_column: &str,
) -> Option<PricePoint> {
    let on: NaiveDate = row.get(date_column)?.as_str()?.parse().ok()?;
    let hour = as_u32(row.get(hour_column)?)?;
    if hour >= 24 {
        return None;
    }
    // Settlement prices are published in PLN/MWh.
    let price = as_f64(row.get(price_column)?)?;
    let hour = warsaw_hour_to_utc(on, hour)?;
    Some(PricePoint { hour, rate: KilowattHourRate::from_megawatt_hour_rate(price) })
}

fn as_u32(value: &Value) -> Option<u32> {
    match value {
        Value::Number(number) => number.as_u64().and_then(|number| u32::try_from(number).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().replace(',', ".").parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    struct StubRows(Option<Vec<Value>>);

    #[async_trait]
    impl SettlementRows for StubRows {
        async fn fetch_month(&self, _year: i32, _month: u32) -> Result<Option<Vec<Value>>> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_recognized_columns_normalize() {
        let rows = vec![
            json!({"business_date": "2025-12-01", "period": 0, "rce_pln": 350.0}),
            json!({"business_date": "2025-12-01", "period": "1", "rce_pln": "320,5"}),
        ];
        let source = DatasetSource::new(StubRows(Some(rows)));

        let points = source.attempt(2025, 12).await.unwrap().unwrap();

        assert_eq!(points.len(), 2);
        // Warsaw midnight in December is 23:00 UTC the previous day.
        assert_eq!(points[0].hour, Utc.with_ymd_and_hms(2025, 11, 30, 23, 0, 0).unwrap());
        assert_abs_diff_eq!(points[0].rate.0, 0.35, epsilon = 1e-9);
        assert_abs_diff_eq!(points[1].rate.0, 0.3205, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn test_unrecognized_columns_yield_nothing() {
        let rows = vec![json!({"when": "2025-12-01", "value": 350.0})];
        let source = DatasetSource::new(StubRows(Some(rows)));
        assert_eq!(source.attempt(2025, 12).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let rows = vec![
            json!({"business_date": "2025-12-01", "period": 0, "rce_pln": 350.0}),
            json!({"business_date": "not a date", "period": 1, "rce_pln": 320.0}),
            json!({"business_date": "2025-12-01", "period": 25, "rce_pln": 320.0}),
        ];
        let source = DatasetSource::new(StubRows(Some(rows)));

        let points = source.attempt(2025, 12).await.unwrap().unwrap();
        assert_eq!(points.len(), 1);
    }

    #[tokio::test]
    async fn test_absent_table_yields_nothing() {
        let source = DatasetSource::new(StubRows(None));
        assert_eq!(source.attempt(2025, 12).await.unwrap(), None);
    }
}
