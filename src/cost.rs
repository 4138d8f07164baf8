use std::collections::BTreeMap;

use chrono_tz::Europe::Warsaw;
use enumset::EnumSet;
use itertools::Itertools;
use ordered_float::OrderedFloat;

use crate::{
    config::Config,
    consumption::HourlySeries,
    prelude::*,
    prices::PricePoint,
    quantity::{cost::Cost, energy::KilowattHours, rate::KilowattHourRate},
    tariff::{Tariff, TariffId, ZoneClassifier},
};

/// One tariff's monthly estimate. Everything except `tax` and `gross_total`
/// is net of VAT. Derived once, never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct CostBreakdown {
    pub tariff: TariffId,
    pub energy_cost: Cost,
    pub fixed_charges: Cost,
    pub surcharges: Cost,
    pub net_total: Cost,
    pub tax: Cost,
    pub gross_total: Cost,
    pub total_energy: KilowattHours,

    /// Source-price diagnostics, present on the exchange-indexed estimate.
    pub exchange: Option<ExchangeStatistics>,
}

/// Diagnostics over the exchange prices that actually met consumption.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ExchangeStatistics {
    pub mean: KilowattHourRate,
    pub min: KilowattHourRate,
    pub max: KilowattHourRate,
}

impl ExchangeStatistics {
    #[must_use]
    pub fn from_rates(rates: &[KilowattHourRate]) -> Option<Self> {
        let (min, max) =
            rates.iter().map(|rate| OrderedFloat(rate.0)).minmax().into_option()?;

        #[allow(clippy::cast_precision_loss)]
        let mean = rates.iter().map(|rate| rate.0).sum::<f64>() / rates.len() as f64;
        Some(Self {
            mean: KilowattHourRate::from(mean),
            min: KilowattHourRate::from(min.0),
            max: KilowattHourRate::from(max.0),
        })
    }
}

/// A breakdown with its distance to the cheapest of the compared set.
#[derive(Clone, Debug, PartialEq)]
pub struct RankedCost {
    pub breakdown: CostBreakdown,
    pub above_cheapest: Cost,
}

#[derive(bon::Builder)]
pub struct CostEngine<'a> {
    config: &'a Config,
    classifier: ZoneClassifier<'a>,
}

impl CostEngine<'_> {
    /// Estimate the selected static tariffs, cheapest first, each annotated
    /// with its distance to the cheapest.
    pub fn compute_static(
        &self,
        hourly: &HourlySeries,
        tariffs: EnumSet<Tariff>,
    ) -> Result<Vec<RankedCost>> {
        let total_energy = hourly.total();
        let fixed_charges = self.config.fixed_charges.total();
        let surcharges = total_energy * self.config.surcharges.per_kilowatt_hour();

        let mut breakdowns = Vec::new();
        for (tariff, prices) in self.config.tariffs()? {
            if !tariffs.contains(tariff) {
                continue;
            }
            let mut energy_cost = Cost::ZERO;
            for (hour, energy) in hourly.iter() {
                let zone = self.classifier.classify(tariff, hour.with_timezone(&Warsaw));
                let rate = prices
                    .rate(zone)
                    .with_context(|| format!("tariff {tariff} has no price for the {zone} zone"))?;
                energy_cost += energy * rate;
            }
            breakdowns.push(self.finalize(
                tariff.into(),
                energy_cost,
                fixed_charges,
                surcharges,
                total_energy,
                None,
            ));
        }
        Ok(rank(breakdowns))
    }

    /// Exchange-indexed estimate. `None` means "no prices were acquired at
    /// all", which is different from a zero-cost month. Hours the price series
    /// does not cover contribute no energy cost.
    #[must_use]
    pub fn compute_dynamic(
        &self,
        hourly: &HourlySeries,
        prices: &[PricePoint],
    ) -> Option<CostBreakdown> {
        if prices.is_empty() {
            return None;
        }
        let dynamic = &self.config.dynamic;
        let unit_overhead =
            dynamic.margin + dynamic.distribution + self.config.surcharges.per_kilowatt_hour();

        let by_hour: BTreeMap<_, _> =
            prices.iter().map(|point| (point.hour, point.rate)).collect();
        let mut energy_cost = Cost::ZERO;
        let mut matched = Vec::new();
        for (hour, energy) in hourly.iter() {
            let Some(rate) = by_hour.get(&hour) else {
                continue;
            };
            matched.push(*rate);
            energy_cost += energy * (*rate + unit_overhead);
        }

        // When consumption and prices share no hour, fall back to whole-series
        // statistics so the report still describes the month.
        let exchange = if matched.is_empty() {
            ExchangeStatistics::from_rates(&prices.iter().map(|point| point.rate).collect_vec())
        } else {
            ExchangeStatistics::from_rates(&matched)
        };

        let fixed_charges =
            dynamic.commercial + self.config.fixed_charges.total_without_commercial();
        // The surcharges already ride inside the per-hour unit rate here.
        Some(self.finalize(
            TariffId::Dynamic,
            energy_cost,
            fixed_charges,
            Cost::ZERO,
            hourly.total(),
            exchange,
        ))
    }

    fn finalize(
        &self,
        tariff: TariffId,
        energy_cost: Cost,
        fixed_charges: Cost,
        surcharges: Cost,
        total_energy: KilowattHours,
        exchange: Option<ExchangeStatistics>,
    ) -> CostBreakdown {
        let net_total = energy_cost + fixed_charges + surcharges;
        let tax = net_total * self.config.vat_rate;
        CostBreakdown {
            tariff,
            energy_cost,
            fixed_charges,
            surcharges,
            net_total,
            tax,
            gross_total: net_total + tax,
            total_energy,
            exchange,
        }
    }
}

/// Order ascending by gross total and annotate the distance to the cheapest.
#[must_use]
pub fn rank(mut breakdowns: Vec<CostBreakdown>) -> Vec<RankedCost> {
    breakdowns.sort_by_key(|breakdown| OrderedFloat(breakdown.gross_total.0));
    let cheapest = breakdowns.first().map_or(Cost::ZERO, |breakdown| breakdown.gross_total);
    breakdowns
        .into_iter()
        .map(|breakdown| RankedCost { above_cheapest: breakdown.gross_total - cheapest, breakdown })
        .collect()
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::quantity::interval::Interval;

    fn config(prices: &str) -> Config {
        toml::from_str(&format!(
            r#"
            vat_rate = 0.23
            [meter]
            channel_id = 1
            supports_summer_winter = true
            {prices}
            [fixed_charges]
            commercial = 20.0
            capacity = 0.0
            network = 0.0
            subscription = 0.0
            transitional = 0.0
            [surcharges]
            res = 0.0
            cogeneration = 0.0
            [dynamic]
            margin = 0.15
            distribution = 0.2711
            commercial = 29.98
            "#
        ))
        .unwrap()
    }

    fn flat_consumption(total: f64, n_hours: u32) -> HourlySeries {
        let start = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();
        (0..n_hours)
            .map(|hour| {
                (
                    start + chrono::TimeDelta::hours(i64::from(hour)),
                    KilowattHours::from(total / f64::from(n_hours)),
                )
            })
            .collect()
    }

    #[test]
    fn test_static_single_zone_arithmetic() {
        // 10 kWh at 0.50 zł/kWh, 20 zł fixed, no surcharges, 23 % VAT.
        let config = config("[prices.G11]\nall = 0.5");
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();

        let ranked = engine.compute_static(&flat_consumption(10.0, 20), EnumSet::all()).unwrap();

        assert_eq!(ranked.len(), 1);
        let breakdown = &ranked[0].breakdown;
        assert_abs_diff_eq!(breakdown.energy_cost.0, 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.net_total.0, 25.0, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.tax.0, 5.75, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.gross_total.0, 30.75, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.total_energy.0, 10.0, epsilon = 1e-9);
        assert_abs_diff_eq!(ranked[0].above_cheapest.0, 0.0);
    }

    #[test]
    fn test_static_results_are_ranked_cheapest_first() {
        let config = config(
            "[prices.G11]\nall = 1.0\n[prices.G12]\nday = 0.2\nnight = 0.1",
        );
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();

        let ranked = engine.compute_static(&flat_consumption(10.0, 24), EnumSet::all()).unwrap();

        assert_eq!(ranked[0].breakdown.tariff, TariffId::Static(Tariff::G12));
        assert_eq!(ranked[1].breakdown.tariff, TariffId::Static(Tariff::G11));
        assert_abs_diff_eq!(ranked[0].above_cheapest.0, 0.0);
        assert!(ranked[1].above_cheapest > Cost::ZERO);
        assert_abs_diff_eq!(
            ranked[1].above_cheapest.0,
            ranked[1].breakdown.gross_total.0 - ranked[0].breakdown.gross_total.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_static_respects_the_tariff_selection() {
        let config = config(
            "[prices.G11]\nall = 1.0\n[prices.G12]\nday = 0.2\nnight = 0.1",
        );
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();

        let ranked = engine
            .compute_static(&flat_consumption(10.0, 24), EnumSet::only(Tariff::G11))
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].breakdown.tariff, TariffId::Static(Tariff::G11));
    }

    #[test]
    fn test_static_is_idempotent() {
        let config = config(
            "[prices.G11]\nall = 1.0\n[prices.G12]\nday = 0.2\nnight = 0.1",
        );
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();
        let hourly = flat_consumption(10.0, 24);

        let first = engine.compute_static(&hourly, EnumSet::all()).unwrap();
        let second = engine.compute_static(&hourly, EnumSet::all()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_dynamic_without_prices_is_none() {
        let config = config("[prices.G11]\nall = 0.5");
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();
        assert_eq!(engine.compute_dynamic(&flat_consumption(10.0, 20), &[]), None);
    }

    #[test]
    fn test_dynamic_arithmetic_with_partial_coverage() {
        let config = config("[prices.G11]\nall = 0.5");
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();

        // Two hours of 1 kWh each; the price series covers only the first.
        let hourly: HourlySeries = [
            (Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap(), KilowattHours::from(1.0)),
            (Utc.with_ymd_and_hms(2025, 12, 1, 1, 0, 0).unwrap(), KilowattHours::from(1.0)),
        ]
        .into_iter()
        .collect();
        let prices = [PricePoint {
            hour: Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap(),
            rate: KilowattHourRate::from(0.30),
        }];

        let breakdown = engine.compute_dynamic(&hourly, &prices).unwrap();

        // 1 kWh × (0.30 + 0.15 + 0.2711); the uncovered hour contributes nothing.
        assert_abs_diff_eq!(breakdown.energy_cost.0, 0.7211, epsilon = 1e-9);
        // 29.98 commercial, the standard non-commercial charges are all zero here.
        assert_abs_diff_eq!(breakdown.fixed_charges.0, 29.98, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.net_total.0, 30.7011, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.gross_total.0, 30.7011 * 1.23, epsilon = 1e-9);
        assert_abs_diff_eq!(breakdown.total_energy.0, 2.0, epsilon = 1e-9);

        let exchange = breakdown.exchange.unwrap();
        assert_abs_diff_eq!(exchange.mean.0, 0.30, epsilon = 1e-9);
        assert_abs_diff_eq!(exchange.min.0, 0.30, epsilon = 1e-9);
        assert_abs_diff_eq!(exchange.max.0, 0.30, epsilon = 1e-9);
    }

    #[test]
    fn test_dynamic_is_deterministic() {
        let config = config("[prices.G11]\nall = 0.5");
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();
        let hourly = flat_consumption(5.0, 10);
        let prices: Vec<PricePoint> = hourly
            .iter()
            .map(|(hour, _)| PricePoint { hour, rate: KilowattHourRate::from(0.4) })
            .collect();

        let first = engine.compute_dynamic(&hourly, &prices);
        let second = engine.compute_dynamic(&hourly, &prices);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zone_invariant_holds_for_whole_month() {
        // Every hour of the month must classify into a priced zone for every
        // configured tariff, so a full month never errors.
        let config = config(
            "[prices.G11]\nall = 1.0\n[prices.G12]\nday = 0.2\nnight = 0.1\n\
             [prices.G12w]\nday = 0.3\nnight = 0.2\n[prices.G12n]\nday = 0.3\nnight = 0.2",
        );
        let engine = CostEngine::builder()
            .config(&config)
            .classifier(ZoneClassifier::new(true, None))
            .build();

        let interval = Interval::utc_month(2025, 12);
        let mut hour = interval.start;
        let mut hours = Vec::new();
        while hour < interval.end {
            hours.push((hour, KilowattHours::from(0.5)));
            hour += chrono::TimeDelta::hours(1);
        }
        let hourly: HourlySeries = hours.into_iter().collect();

        let ranked = engine.compute_static(&hourly, EnumSet::all()).unwrap();
        assert_eq!(ranked.len(), 4);
    }
}
