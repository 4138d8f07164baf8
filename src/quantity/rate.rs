use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Złoty per kilowatt-hour, net of VAT.
pub type KilowattHourRate = Quantity<f64, -1, 1>;

impl KilowattHourRate {
    /// Exchange quotes come in złoty per megawatt-hour.
    pub fn from_megawatt_hour_rate(value: f64) -> Self {
        Self(value / 1000.0)
    }
}

impl Default for KilowattHourRate {
    fn default() -> Self {
        Self(0.0)
    }
}

impl Display for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4} zł/kWh", self.0)
    }
}

impl Debug for KilowattHourRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}zł/kWh", self.0)
    }
}
