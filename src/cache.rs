use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::prelude::*;

/// On-disk cache layout: one file per (entity, year, month) key, whole-file
/// reads and writes only. The key is the unit of mutual exclusion should this
/// ever run multi-process.
#[derive(Clone)]
pub struct CacheDir(PathBuf);

impl CacheDir {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn consumption_logs(&self, channel_id: u64, year: i32, month: u32) -> PathBuf {
        self.0.join(format!("supla_logs_{channel_id}_{year}_{month:02}.json"))
    }

    #[must_use]
    pub fn price_series(&self, year: i32, month: u32) -> PathBuf {
        self.0.join(format!("tge_prices_{year}_{month:02}.csv"))
    }
}

/// Read back a verbatim JSON snapshot. Anything unreadable demotes the file to
/// "absent" so the caller re-fetches instead of failing.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read_json_snapshot(path: &Path) -> Option<serde_json::Value> {
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => match serde_json::from_str(&contents) {
            Ok(value) => {
                info!("read the snapshot");
                Some(value)
            }
            Err(error) => {
                warn!(error = %error, "malformed snapshot, ignoring it");
                None
            }
        },
        Err(error) => {
            warn!(error = %error, "failed to read the snapshot, ignoring it");
            None
        }
    }
}

/// Best-effort snapshot write: a cache miss on the next run is cheaper than a
/// failed analysis now.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write_json_snapshot(path: &Path, value: &serde_json::Value) {
    let result = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|()| fs::write(path, serde_json::to_vec(value).unwrap_or_default()));
    match result {
        Ok(()) => info!("wrote the snapshot"),
        Err(error) => warn!(error = %error, "failed to write the snapshot"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir() -> PathBuf {
        let path = std::env::temp_dir().join(format!("taryfa-cache-test-{}", std::process::id()));
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_snapshot_round_trip() {
        let path = scratch_dir().join("snapshot_round_trip.json");
        let value = serde_json::json!([{"date_timestamp": 1, "fae_balanced": 2.0}]);
        write_json_snapshot(&path, &value);
        assert_eq!(read_json_snapshot(&path), Some(value));
    }

    #[test]
    fn test_missing_snapshot_is_none() {
        assert_eq!(read_json_snapshot(Path::new("does-not-exist.json")), None);
    }

    #[test]
    fn test_malformed_snapshot_is_none() {
        let path = scratch_dir().join("malformed.json");
        fs::write(&path, "not json at all").unwrap();
        assert_eq!(read_json_snapshot(&path), None);
    }
}
