use chrono::{Datelike, Days, NaiveDate};

/// Optional holiday capability for the weekend-dependent tariffs.
///
/// When no calendar is wired in, classification degrades to weekend-only rules.
pub trait HolidayCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// Polish statutory holidays: the fixed feasts plus the Easter-derived ones.
pub struct PolishHolidays;

impl PolishHolidays {
    /// Gregorian computus (anonymous/Meeus algorithm).
    fn easter_sunday(year: i32) -> NaiveDate {
        let a = year % 19;
        let b = year / 100;
        let c = year % 100;
        let d = b / 4;
        let e = b % 4;
        let f = (b + 8) / 25;
        let g = (b - f + 1) / 3;
        let h = (19 * a + b - d - g + 15) % 30;
        let i = c / 4;
        let k = c % 4;
        let l = (32 + 2 * e + 2 * i - h - k) % 7;
        let m = (a + 11 * h + 22 * l) / 451;
        let month = (h + l - 7 * m + 114) / 31;
        let day = (h + l - 7 * m + 114) % 31 + 1;

        #[allow(clippy::cast_sign_loss)]
        NaiveDate::from_ymd_opt(year, month as u32, day as u32).unwrap()
    }
}

impl HolidayCalendar for PolishHolidays {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        match (date.month(), date.day()) {
            (1, 1 | 6)
            | (5, 1 | 3)
            | (8, 15)
            | (11, 1 | 11)
            | (12, 25 | 26) => return true,

            // Statutory since 2025.
            (12, 24) if date.year() >= 2025 => return true,

            _ => {}
        }

        let easter = Self::easter_sunday(date.year());
        date == easter
            || date == easter + Days::new(1)
            || date == easter + Days::new(49)
            || date == easter + Days::new(60)
    }
}
