//! [SUPLA Cloud](https://cloud.supla.org) measurement-logs client.

use base64::{Engine, engine::general_purpose::URL_SAFE};
use chrono::DateTime;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_with::serde_as;

use crate::{
    api::client,
    cache::{self, CacheDir},
    consumption::RawReading,
    prelude::*,
    quantity::{energy::KilowattHours, interval::Interval},
};

pub struct Api {
    client: Client,
    base_url: Url,
    token: String,
}

impl Api {
    /// The personal access token carries the target cloud's base URL in its
    /// second, base64url-encoded segment.
    pub fn try_new(token: &str) -> Result<Self> {
        Ok(Self {
            client: client::try_new()?,
            base_url: decode_base_url(token)?,
            token: token.to_string(),
        })
    }

    /// Fetch the raw measurement logs for the UTC period, verbatim.
    #[instrument(skip_all, fields(channel_id = channel_id))]
    pub async fn get_measurement_logs(
        &self,
        channel_id: u64,
        period: Interval,
    ) -> Result<serde_json::Value> {
        info!("Fetching…");
        let url = self
            .base_url
            .join(&format!("api/v3/channels/{channel_id}/measurement-logs"))
            .context("failed to build the measurement-logs URL")?;
        let logs = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .query(&[
                ("dateFrom", period.start.to_rfc3339()),
                ("dateTo", period.end.to_rfc3339()),
            ])
            .send()
            .await
            .context("failed to call the SUPLA API")?
            .error_for_status()
            .context("the measurement-logs request failed")?
            .json::<serde_json::Value>()
            .await
            .context("failed to deserialize the measurement logs")?;
        info!(n_logs = logs.as_array().map_or(0, Vec::len), "Fetched");
        Ok(logs)
    }

    /// Measurement logs with the verbatim on-disk snapshot in front: a hit is
    /// returned as-is, a miss is fetched and then written back.
    pub async fn get_measurement_logs_cached(
        &self,
        cache_dir: &CacheDir,
        channel_id: u64,
        year: i32,
        month: u32,
    ) -> Result<serde_json::Value> {
        let path = cache_dir.consumption_logs(channel_id, year, month);
        if let Some(snapshot) = cache::read_json_snapshot(&path) {
            return Ok(snapshot);
        }
        let logs = self.get_measurement_logs(channel_id, Interval::utc_month(year, month)).await?;
        cache::write_json_snapshot(&path, &logs);
        Ok(logs)
    }
}

fn decode_base_url(token: &str) -> Result<Url> {
    let (_, encoded) = token
        .split_once('.')
        .context("the token does not embed an API base URL (no dot separator)")?;
    let bytes = URL_SAFE
        .decode(pad_base64(encoded))
        .context("the token's URL segment is not valid base64")?;
    let url = String::from_utf8(bytes).context("the token's URL segment is not valid UTF-8")?;
    Url::parse(&format!("{}/", url.trim().trim_end_matches('/')))
        .context("the token's URL segment is not a valid URL")
}

fn pad_base64(encoded: &str) -> String {
    let mut padded = encoded.to_string();
    while padded.len() % 4 != 0 {
        padded.push('=');
    }
    padded
}

/// Map the raw logs into meter readings. The cumulative counter (`fae_balanced`,
/// hundredths of a watt-hour) may be absent on a record: that is carried through
/// for the normalizer to reject.
pub fn parse_readings(logs: &serde_json::Value) -> Result<Vec<RawReading>> {
    let logs: Vec<MeasurementLog> =
        serde_json::from_value(logs.clone()).context("unexpected measurement-logs layout")?;
    logs.into_iter()
        .map(|log| {
            Ok(RawReading {
                timestamp: DateTime::from_timestamp(log.timestamp, 0)
                    .with_context(|| format!("invalid timestamp: {}", log.timestamp))?,
                energy_total: log.energy_total.map(KilowattHours::from_hundredths_of_watt_hour),
            })
        })
        .collect()
}

#[serde_as]
#[derive(Deserialize)]
pub struct MeasurementLog {
    /// The cloud has returned the epoch both as a number and as a string.
    #[serde_as(as = "serde_with::PickFirst<(_, serde_with::DisplayFromStr)>")]
    #[serde(rename = "date_timestamp")]
    timestamp: i64,

    #[serde(rename = "fae_balanced", default)]
    energy_total: Option<f64>,
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn test_decode_base_url_ok() -> Result {
        let token = format!("abcdef.{}", URL_SAFE_NO_PAD.encode("https://srv1.supla.org"));
        assert_eq!(decode_base_url(&token)?.as_str(), "https://srv1.supla.org/");
        Ok(())
    }

    #[test]
    fn test_decode_base_url_without_separator_fails() {
        assert!(decode_base_url("justonerandompart").is_err());
    }

    #[test]
    fn test_parse_readings_ok() -> Result {
        // language=JSON
        const LOGS: &str = r#"
            [
                {"date_timestamp": 1764633600, "fae_balanced": 1250000.0, "phases": 3},
                {"date_timestamp": "1764637200", "fae_balanced": 1260000.0}
            ]
        "#;
        let readings = parse_readings(&serde_json::from_str(LOGS)?)?;

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].timestamp, Utc.with_ymd_and_hms(2025, 12, 2, 0, 0, 0).unwrap());
        assert_abs_diff_eq!(readings[0].energy_total.unwrap().0, 12.5);
        assert_eq!(readings[1].timestamp - readings[0].timestamp, chrono::TimeDelta::hours(1));
        Ok(())
    }

    #[test]
    fn test_parse_readings_keeps_missing_counters() -> Result {
        // language=JSON
        const LOGS: &str = r#"[{"date_timestamp": 1764633600}]"#;
        let readings = parse_readings(&serde_json::from_str(LOGS)?)?;
        assert_eq!(readings[0].energy_total, None);
        Ok(())
    }
}
