use chrono_tz::Europe::Warsaw;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    consumption::HourlySeries,
    cost::{CostBreakdown, RankedCost},
    prices::PricePoint,
    quantity::{cost::Cost, energy::KilowattHours},
    tariff::{Tariff, Zone, ZoneClassifier},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

/// The tariff comparison, cheapest first.
#[must_use]
pub fn build_comparison_table(ranked: &[RankedCost]) -> Table {
    let mut table = new_table();
    table.set_header(vec![
        "Tariff",
        "Energy",
        "Fixed",
        "Surcharges",
        "Net",
        "VAT",
        "Gross",
        "Above cheapest",
    ]);
    for entry in ranked {
        let breakdown = &entry.breakdown;
        let is_cheapest = entry.above_cheapest <= Cost::ZERO;
        table.add_row(vec![
            Cell::new(breakdown.tariff).add_attribute(Attribute::Bold),
            Cell::new(breakdown.energy_cost).set_alignment(CellAlignment::Right),
            Cell::new(breakdown.fixed_charges).set_alignment(CellAlignment::Right),
            Cell::new(breakdown.surcharges).set_alignment(CellAlignment::Right),
            Cell::new(breakdown.net_total).set_alignment(CellAlignment::Right),
            Cell::new(breakdown.tax).set_alignment(CellAlignment::Right),
            Cell::new(breakdown.gross_total)
                .set_alignment(CellAlignment::Right)
                .fg(if is_cheapest { Color::Green } else { Color::Red }),
            Cell::new(entry.above_cheapest)
                .set_alignment(CellAlignment::Right)
                .fg(if is_cheapest { Color::Green } else { Color::Reset }),
        ]);
    }
    table
}

/// The exchange-indexed estimate with its source-price diagnostics.
#[must_use]
pub fn build_dynamic_table(breakdown: &CostBreakdown) -> Table {
    let mut table = new_table();
    table.set_header(vec!["", "Dynamic (exchange-indexed)"]);
    table.add_row(vec![
        Cell::new("Energy (incl. margin and distribution)"),
        Cell::new(breakdown.energy_cost).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Fixed charges"),
        Cell::new(breakdown.fixed_charges).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Net total"),
        Cell::new(breakdown.net_total).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("VAT"),
        Cell::new(breakdown.tax).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Gross total"),
        Cell::new(breakdown.gross_total)
            .set_alignment(CellAlignment::Right)
            .add_attribute(Attribute::Bold),
    ]);
    if let Some(exchange) = breakdown.exchange {
        table.add_row(vec![
            Cell::new("Exchange price (mean / min / max)"),
            Cell::new(format!("{} / {} / {}", exchange.mean, exchange.min, exchange.max))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Acquired price series at a glance.
#[must_use]
pub fn build_price_summary_table(points: &[PricePoint]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Hour (UTC)", "Price"]);
    for point in points {
        table.add_row(vec![
            Cell::new(point.hour.format("%Y-%m-%d %H:%M")),
            Cell::new(point.rate).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Consumption summary: the total plus the two-zone split the meter would bill.
#[must_use]
pub fn build_consumption_summary_table(
    hourly: &HourlySeries,
    classifier: &ZoneClassifier<'_>,
) -> Table {
    let mut day = KilowattHours::ZERO;
    let mut night = KilowattHours::ZERO;
    for (hour, energy) in hourly.iter() {
        match classifier.classify(Tariff::G12, hour.with_timezone(&Warsaw)) {
            Zone::Night => night += energy,
            _ => day += energy,
        }
    }

    let mut table = new_table();
    table.set_header(vec!["", "Consumption"]);
    table.add_row(vec![
        Cell::new("Hours with data"),
        Cell::new(hourly.len()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Total"),
        Cell::new(hourly.total()).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("G12 day zone"),
        Cell::new(day).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("G12 night zone"),
        Cell::new(night).set_alignment(CellAlignment::Right),
    ]);
    table
}
