use std::collections::BTreeMap;

use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use itertools::Itertools;

use crate::quantity::{energy::KilowattHours, interval::Interval};

/// A raw meter record: an instant and, when the channel reported it, the
/// cumulative forward-active-energy counter.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawReading {
    pub timestamp: DateTime<Utc>,
    pub energy_total: Option<KilowattHours>,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum NormalizeError {
    #[display("the meter returned no readings")]
    EmptyInput,

    #[display("reading at {timestamp} lacks the cumulative energy counter")]
    MissingEnergyTotal { timestamp: DateTime<Utc> },
}

/// Sparse per-hour consumption, keyed by the UTC hour start.
///
/// Hours without a single valid counter delta are absent, not zero. Values are
/// non-negative by construction.
#[derive(Debug, Default, PartialEq, derive_more::IntoIterator)]
pub struct HourlySeries(BTreeMap<DateTime<Utc>, KilowattHours>);

impl HourlySeries {
    pub fn iter(&self) -> impl Iterator<Item = (DateTime<Utc>, KilowattHours)> + '_ {
        self.0.iter().map(|(hour, energy)| (*hour, *energy))
    }

    #[must_use]
    pub fn get(&self, hour: DateTime<Utc>) -> Option<KilowattHours> {
        self.0.get(&hour).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> KilowattHours {
        self.0.values().fold(KilowattHours::ZERO, |total, energy| total + *energy)
    }
}

impl FromIterator<(DateTime<Utc>, KilowattHours)> for HourlySeries {
    fn from_iter<T: IntoIterator<Item = (DateTime<Utc>, KilowattHours)>>(iterator: T) -> Self {
        Self(iterator.into_iter().collect())
    }
}

/// Turn cumulative counter readings into the hourly consumption series.
///
/// Readings are sorted, restricted to the period, and differenced pairwise.
/// A non-positive delta is a duplicate, a clock regression, or a counter reset:
/// it is dropped, losing only the one bridging interval. Each surviving delta
/// is attributed to the hour of the *later* reading.
pub fn normalize_hourly(
    readings: &[RawReading],
    period: Interval,
) -> Result<HourlySeries, NormalizeError> {
    if readings.is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    let mut within: Vec<&RawReading> =
        readings.iter().filter(|reading| period.contains(reading.timestamp)).collect();
    within.sort_by_key(|reading| reading.timestamp);

    let counters = within
        .iter()
        .map(|reading| match reading.energy_total {
            Some(energy_total) => Ok((reading.timestamp, energy_total)),
            None => Err(NormalizeError::MissingEnergyTotal { timestamp: reading.timestamp }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut hours = BTreeMap::new();
    for ((_, earlier), (timestamp, later)) in counters.iter().tuple_windows() {
        let delta = *later - *earlier;
        if delta <= KilowattHours::ZERO {
            continue;
        }
        let hour = timestamp.duration_trunc(TimeDelta::hours(1)).unwrap();
        *hours.entry(hour).or_insert(KilowattHours::ZERO) += delta;
    }
    Ok(HourlySeries(hours))
}
