use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{
    cache::CacheDir,
    prelude::*,
    prices::{PricePoint, PriceSource},
    quantity::rate::KilowattHourRate,
};

/// The persisted month series: `tge_prices_YYYY_MM.csv`, one row per hour with
/// a naive-UTC timestamp and the net price.
#[derive(Clone)]
pub struct PriceCache {
    dir: CacheDir,
}

impl PriceCache {
    #[must_use]
    pub const fn new(dir: CacheDir) -> Self {
        Self { dir }
    }

    /// `Ok(None)` when the file is absent or its schema does not match; schema
    /// drift must demote the file, not kill the run.
    #[instrument(skip_all, fields(year = year, month = month))]
    pub fn load(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>> {
        let path = self.dir.price_series(year, month);
        if !path.is_file() {
            return Ok(None);
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let mut points = Vec::new();
        for row in reader.deserialize::<PriceRow>() {
            match row {
                Ok(row) => points.push(row.into()),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "malformed price series, skipping the file",
                    );
                    return Ok(None);
                }
            }
        }
        info!(n_points = points.len(), "loaded the persisted series");
        Ok(Some(points))
    }

    #[instrument(skip_all, fields(year = year, month = month, n_points = points.len()))]
    pub fn store(&self, year: i32, month: u32, points: &[PricePoint]) -> Result {
        let path = self.dir.price_series(year, month);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("failed to create {}", path.display()))?;
        for point in points {
            writer.serialize(PriceRow::from(*point))?;
        }
        writer.flush()?;
        info!("persisted the series");
        Ok(())
    }
}

/// First source in the chain: a previously persisted month wins outright.
pub struct CachedFileSource(PriceCache);

impl CachedFileSource {
    #[must_use]
    pub const fn new(cache: PriceCache) -> Self {
        Self(cache)
    }
}

#[async_trait]
impl PriceSource for CachedFileSource {
    fn name(&self) -> &'static str {
        "cached file"
    }

    async fn attempt(&self, year: i32, month: u32) -> Result<Option<Vec<PricePoint>>> {
        self.0.load(year, month)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct PriceRow {
    #[serde(with = "timestamp_format")]
    timestamp: NaiveDateTime,

    price_kwh: f64,
}

impl From<PricePoint> for PriceRow {
    fn from(point: PricePoint) -> Self {
        Self { timestamp: point.hour.naive_utc(), price_kwh: point.rate.0 }
    }
}

impl From<PriceRow> for PricePoint {
    fn from(row: PriceRow) -> Self {
        Self { hour: row.timestamp.and_utc(), rate: KilowattHourRate::from(row.price_kwh) }
    }
}

/// `YYYY-MM-DD HH:MM:SS`, the layout the original files were written with.
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(
        timestamp: &NaiveDateTime,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&timestamp.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<NaiveDateTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, FORMAT).map_err(de::Error::custom)
    }
}
