use chrono::{DateTime, Datelike, Timelike, Weekday};
use chrono_tz::Tz;

use crate::{
    calendar::HolidayCalendar,
    tariff::{Tariff, Zone, windows},
};

/// Assigns a local hour to its price zone.
///
/// Pure in its inputs: the only ambient data is the injected holiday calendar,
/// which is queried per call and may be absent (weekend-only degradation).
pub struct ZoneClassifier<'a> {
    supports_summer_winter: bool,
    holidays: Option<&'a dyn HolidayCalendar>,
}

impl<'a> ZoneClassifier<'a> {
    pub const fn new(
        supports_summer_winter: bool,
        holidays: Option<&'a dyn HolidayCalendar>,
    ) -> Self {
        Self { supports_summer_winter, holidays }
    }

    #[must_use]
    pub fn classify(&self, tariff: Tariff, at: DateTime<Tz>) -> Zone {
        match tariff {
            Tariff::G11 => Zone::All,

            Tariff::G12 => self.day_or_night(at),

            // Weekends and holidays are entirely off-peak.
            Tariff::G12w => {
                if self.is_weekend_or_holiday(at) {
                    Zone::Night
                } else {
                    self.day_or_night(at)
                }
            }

            // Sundays and holidays are entirely off-peak; Monday–Saturday the
            // night band is the fixed 1–5, unrelated to the seasonal windows.
            Tariff::G12n => {
                if self.is_sunday_or_holiday(at) || (1..5).contains(&at.hour()) {
                    Zone::Night
                } else {
                    Zone::Day
                }
            }
        }
    }

    fn day_or_night(&self, at: DateTime<Tz>) -> Zone {
        if windows::night_windows(at.month(), self.supports_summer_winter).contains(at.hour()) {
            Zone::Night
        } else {
            Zone::Day
        }
    }

    fn is_weekend_or_holiday(&self, at: DateTime<Tz>) -> bool {
        matches!(at.weekday(), Weekday::Sat | Weekday::Sun) || self.is_holiday(at)
    }

    fn is_sunday_or_holiday(&self, at: DateTime<Tz>) -> bool {
        (at.weekday() == Weekday::Sun) || self.is_holiday(at)
    }

    fn is_holiday(&self, at: DateTime<Tz>) -> bool {
        self.holidays.is_some_and(|calendar| calendar.is_holiday(at.date_naive()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono_tz::Europe::Warsaw;

    use super::*;
    use crate::calendar::PolishHolidays;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Tz> {
        Warsaw.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_g11_is_always_all() {
        let classifier = ZoneClassifier::new(true, None);
        assert_eq!(classifier.classify(Tariff::G11, at(2025, 1, 7, 3)), Zone::All);
        assert_eq!(classifier.classify(Tariff::G11, at(2025, 7, 13, 18)), Zone::All);
    }

    #[test]
    fn test_g12_seasonal_windows() {
        let classifier = ZoneClassifier::new(true, None);
        // Winter: 13–15 is off-peak, July it is not.
        assert_eq!(classifier.classify(Tariff::G12, at(2025, 1, 7, 13)), Zone::Night);
        assert_eq!(classifier.classify(Tariff::G12, at(2025, 7, 8, 13)), Zone::Day);
        assert_eq!(classifier.classify(Tariff::G12, at(2025, 7, 8, 15)), Zone::Night);
        // Weekends are billed like workdays in plain G12.
        assert_eq!(classifier.classify(Tariff::G12, at(2025, 1, 11, 10)), Zone::Day);
    }

    #[test]
    fn test_g12w_weekend_forces_night() {
        let classifier = ZoneClassifier::new(true, None);
        for hour in 0..24 {
            assert_eq!(classifier.classify(Tariff::G12w, at(2025, 1, 11, hour)), Zone::Night);
            assert_eq!(classifier.classify(Tariff::G12w, at(2025, 1, 12, hour)), Zone::Night);
        }
        // Tuesday 10:00 in January is peak.
        assert_eq!(classifier.classify(Tariff::G12w, at(2025, 1, 7, 10)), Zone::Day);
    }

    #[test]
    fn test_g12w_holiday_forces_night() {
        // Epiphany 2025 falls on a Monday.
        let classifier = ZoneClassifier::new(true, Some(&PolishHolidays));
        assert_eq!(classifier.classify(Tariff::G12w, at(2025, 1, 6, 10)), Zone::Night);

        // Without the calendar capability the same Monday is a workday.
        let degraded = ZoneClassifier::new(true, None);
        assert_eq!(degraded.classify(Tariff::G12w, at(2025, 1, 6, 10)), Zone::Day);
    }

    #[test]
    fn test_g12n_sunday_is_all_night() {
        for holidays in [None, Some(&PolishHolidays as &dyn HolidayCalendar)] {
            let classifier = ZoneClassifier::new(true, holidays);
            for hour in 0..24 {
                assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 12, hour)), Zone::Night);
            }
        }
    }

    #[test]
    fn test_g12n_weekday_band() {
        let classifier = ZoneClassifier::new(true, None);
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 11, 2)), Zone::Night);
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 7, 0)), Zone::Day);
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 7, 1)), Zone::Night);
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 7, 4)), Zone::Night);
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 7, 5)), Zone::Day);
        // The seasonal 13–15 window does not apply to G12n.
        assert_eq!(classifier.classify(Tariff::G12n, at(2025, 1, 7, 13)), Zone::Day);
    }

    #[test]
    fn test_every_hour_maps_to_exactly_one_zone() {
        let classifier = ZoneClassifier::new(true, Some(&PolishHolidays));
        for tariff in [Tariff::G11, Tariff::G12, Tariff::G12w, Tariff::G12n] {
            let mut counts = [0_u32; 3];
            for day in 1..=31 {
                for hour in 0..24 {
                    let zone = classifier.classify(tariff, at(2025, 1, day, hour));
                    assert!(tariff.zones().contains(&zone));
                    counts[match zone {
                        Zone::All => 0,
                        Zone::Day => 1,
                        Zone::Night => 2,
                    }] += 1;
                }
            }
            assert_eq!(counts.iter().sum::<u32>(), 31 * 24);
        }
    }
}
