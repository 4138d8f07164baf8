mod classifier;
mod windows;

use std::str::FromStr;

pub use self::{classifier::ZoneClassifier, windows::TimeWindows};

/// Static distributor tariffs with fixed zone tables.
#[derive(Debug, clap::ValueEnum, derive_more::Display, enumset::EnumSetType)]
pub enum Tariff {
    #[display("G11")]
    G11,

    #[display("G12")]
    G12,

    #[display("G12w")]
    G12w,

    #[display("G12n")]
    G12n,
}

impl Tariff {
    /// The zone labels this tariff's price table must cover, and exactly the
    /// labels classification can produce for it.
    #[must_use]
    pub const fn zones(self) -> &'static [Zone] {
        match self {
            Self::G11 => &[Zone::All],
            Self::G12 | Self::G12w | Self::G12n => &[Zone::Day, Zone::Night],
        }
    }
}

/// An unrecognized tariff identifier is a caller bug, not a recoverable state.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("unknown tariff identifier: `{identifier}`")]
pub struct UnknownTariff {
    pub identifier: String,
}

impl FromStr for Tariff {
    type Err = UnknownTariff;

    fn from_str(identifier: &str) -> Result<Self, Self::Err> {
        match identifier.to_ascii_lowercase().as_str() {
            "g11" => Ok(Self::G11),
            "g12" => Ok(Self::G12),
            "g12w" => Ok(Self::G12w),
            "g12n" => Ok(Self::G12n),
            _ => Err(UnknownTariff { identifier: identifier.to_string() }),
        }
    }
}

/// Price zone label within a tariff.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Zone {
    #[display("all")]
    All,

    #[display("day")]
    Day,

    #[display("night")]
    Night,
}

/// Labels a cost breakdown: one of the static tariffs or the exchange-indexed offer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum TariffId {
    #[display("{_0}")]
    Static(Tariff),

    #[display("Dynamic")]
    Dynamic,
}

impl From<Tariff> for TariffId {
    fn from(tariff: Tariff) -> Self {
        Self::Static(tariff)
    }
}
