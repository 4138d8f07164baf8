use std::{
    fmt::{Debug, Display, Formatter},
    ops::Mul,
};

use crate::quantity::{Quantity, cost::Cost, rate::KilowattHourRate};

pub type KilowattHours = Quantity<f64, 1, 0>;

impl KilowattHours {
    /// SUPLA reports forward active energy in hundredths of a watt-hour.
    pub fn from_hundredths_of_watt_hour(value: f64) -> Self {
        Self(value / 100_000.0)
    }
}

impl Default for KilowattHours {
    fn default() -> Self {
        Self(0.0)
    }
}

impl Display for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3} kWh", self.0)
    }
}

impl Debug for KilowattHours {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}kWh", self.0)
    }
}

impl Mul<KilowattHourRate> for KilowattHours {
    type Output = Cost;

    fn mul(self, rhs: KilowattHourRate) -> Self::Output {
        Cost::from(self.0 * rhs.0)
    }
}
