/// Half-open `[start, end)` hour windows within a day.
///
/// Overnight spans are spelled out as explicit `[22, 24)` + `[0, 6)` pairs;
/// there is no wraparound arithmetic here.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimeWindows(&'static [(u32, u32)]);

impl TimeWindows {
    pub const fn new(windows: &'static [(u32, u32)]) -> Self {
        Self(windows)
    }

    #[must_use]
    pub fn contains(self, hour: u32) -> bool {
        self.0.iter().any(|(start, end)| (*start <= hour) && (hour < *end))
    }
}

/// Off-peak windows of the two-zone tariffs, per the distributor's schedule:
/// winter (October–March) 13–15 and 22–6, summer (April–September) 15–17 and 22–6.
const WINTER_NIGHT: TimeWindows = TimeWindows::new(&[(13, 15), (22, 24), (0, 6)]);
const SUMMER_NIGHT: TimeWindows = TimeWindows::new(&[(15, 17), (22, 24), (0, 6)]);

/// Meters without the seasonal switch stay on the winter-shaped windows all year.
#[must_use]
pub fn night_windows(month: u32, supports_summer_winter: bool) -> TimeWindows {
    if supports_summer_winter && (4..=9).contains(&month) { SUMMER_NIGHT } else { WINTER_NIGHT }
}
