use std::fmt::{Debug, Display, Formatter};

use crate::quantity::Quantity;

/// Złoty.
pub type Cost = Quantity<f64, 0, 1>;

impl Cost {
    /// Round to grosze for presentation.
    pub fn round_to_grosze(self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }
}

impl Default for Cost {
    fn default() -> Self {
        Self(0.0)
    }
}

impl Display for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} zł", self.0)
    }
}

impl Debug for Cost {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}zł", self.0)
    }
}
