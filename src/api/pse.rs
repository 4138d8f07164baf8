//! [PSE reports API](https://api.raporty.pse.pl): published day-ahead settlement prices.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::{
    api::client,
    prelude::*,
    prices::{dataset::SettlementRows, days_in_month},
};

const REPORTS_URL: &str = "https://api.raporty.pse.pl/api/rce-pln";

pub struct Api(Client);

impl Api {
    pub fn try_new() -> Result<Self> {
        Ok(Self(client::try_new()?))
    }
}

#[async_trait]
impl SettlementRows for Api {
    /// Get the month's settlement-price rows; `None` when the report body does
    /// not carry a row array.
    #[instrument(fields(year = year, month = month), skip_all)]
    async fn fetch_month(&self, year: i32, month: u32) -> Result<Option<Vec<Value>>> {
        info!("Fetching…");
        let last_day = days_in_month(year, month);
        let filter = format!(
            "business_date ge '{year}-{month:02}-01' and business_date le '{year}-{month:02}-{last_day:02}'"
        );
        let body = self
            .0
            .get(REPORTS_URL)
            .query(&[("$filter", filter.as_str()), ("$first", "20000")])
            .send()
            .await
            .context("failed to call")?
            .error_for_status()
            .context("request failed")?
            .json::<Value>()
            .await
            .context("failed to deserialize the report")?;
        let rows = body.get("value").and_then(Value::as_array).cloned();
        info!(n_rows = rows.as_ref().map_or(0, Vec::len), "Fetched");
        Ok(rows)
    }
}
