use std::{collections::BTreeMap, path::Path, str::FromStr};

use serde::Deserialize;

use crate::{
    prelude::*,
    quantity::{cost::Cost, rate::KilowattHourRate},
    tariff::{Tariff, Zone},
};

/// Immutable run configuration: the price tables and charges straight off the
/// bill. Loaded once and passed into the engine, never consulted ambiently.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub meter: MeterConfig,

    /// VAT as a fraction, e.g. `0.23`.
    pub vat_rate: f64,

    /// Per-tariff zone prices, net zł/kWh, energy and variable distribution
    /// combined. Keyed by the tariff identifier.
    pub prices: BTreeMap<String, ZonePrices>,

    pub fixed_charges: FixedCharges,

    pub surcharges: Surcharges,

    pub dynamic: DynamicConfig,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MeterConfig {
    /// SUPLA channel of the energy meter.
    pub channel_id: u64,

    /// Whether the distributor's meter switches the two-zone windows between
    /// summer and winter.
    #[serde(default)]
    pub supports_summer_winter: bool,

    /// Count statutory holidays into the weekend-dependent tariffs.
    #[serde(default = "default_true")]
    pub use_polish_holidays: bool,
}

const fn default_true() -> bool {
    true
}

/// A tariff prices either the whole day or a day/night pair.
#[derive(Copy, Clone, Deserialize)]
#[serde(untagged)]
pub enum ZonePrices {
    Single { all: KilowattHourRate },
    DayNight { day: KilowattHourRate, night: KilowattHourRate },
}

impl ZonePrices {
    #[must_use]
    pub fn rate(&self, zone: Zone) -> Option<KilowattHourRate> {
        match (self, zone) {
            (Self::Single { all }, Zone::All) => Some(*all),
            (Self::DayNight { day, .. }, Zone::Day) => Some(*day),
            (Self::DayNight { night, .. }, Zone::Night) => Some(*night),
            _ => None,
        }
    }

    #[must_use]
    pub const fn zones(&self) -> &'static [Zone] {
        match self {
            Self::Single { .. } => &[Zone::All],
            Self::DayNight { .. } => &[Zone::Day, Zone::Night],
        }
    }
}

/// Monthly fixed charges, net złoty.
#[derive(Copy, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedCharges {
    /// Retail (handlowa) charge; the dynamic offer replaces this one.
    pub commercial: Cost,

    /// Capacity-market (mocowa) charge.
    pub capacity: Cost,

    /// Fixed network (stała) charge.
    pub network: Cost,

    /// Subscription (abonamentowa) charge.
    pub subscription: Cost,

    /// Transitional (przejściowa) charge.
    pub transitional: Cost,
}

impl FixedCharges {
    #[must_use]
    pub fn total(&self) -> Cost {
        self.commercial + self.total_without_commercial()
    }

    #[must_use]
    pub fn total_without_commercial(&self) -> Cost {
        self.capacity + self.network + self.subscription + self.transitional
    }
}

/// Usage-proportional surcharges, net zł/kWh.
#[derive(Copy, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Surcharges {
    /// Renewables (OZE) surcharge.
    pub res: KilowattHourRate,

    pub cogeneration: KilowattHourRate,
}

impl Surcharges {
    #[must_use]
    pub fn per_kilowatt_hour(&self) -> KilowattHourRate {
        self.res + self.cogeneration
    }
}

/// The exchange-indexed offer's own pricing parameters.
#[derive(Copy, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DynamicConfig {
    /// Supplier margin on top of the exchange price, net zł/kWh.
    pub margin: KilowattHourRate,

    /// Blended day/night variable distribution rate, net zł/kWh.
    pub distribution: KilowattHourRate,

    /// The offer's retail charge, replacing the standard commercial charge.
    pub commercial: Cost,
}

impl Config {
    pub fn read_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read the config at {}", path.display()))?;
        let config: Self = toml::from_str(&contents).context("failed to parse the config")?;
        config.validate()?;
        Ok(config)
    }

    /// The configured static tariffs; an unknown identifier in the table is a
    /// config error.
    pub fn tariffs(&self) -> Result<Vec<(Tariff, ZonePrices)>> {
        self.prices
            .iter()
            .map(|(identifier, prices)| Ok((Tariff::from_str(identifier)?, *prices)))
            .collect()
    }

    fn validate(&self) -> Result {
        ensure!((0.0..1.0).contains(&self.vat_rate), "the VAT rate must be within [0, 1)");
        for (tariff, prices) in self.tariffs()? {
            ensure!(
                prices.zones() == tariff.zones(),
                "tariff {tariff} must price exactly these zones: {:?}",
                tariff.zones(),
            );
        }
        Ok(())
    }
}
