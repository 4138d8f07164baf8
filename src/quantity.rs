pub mod cost;
pub mod energy;
pub mod interval;
pub mod rate;

use std::ops::{Div, Mul};

use serde::{Deserialize, Serialize};

/// Dimensioned scalar: `ENERGY` is the kilowatt-hour power, `COST` the złoty power.
///
/// Billing only ever combines energy and money, so two dimensions suffice:
/// `Quantity<f64, 1, 0>` is an energy, `Quantity<f64, 0, 1>` a cost, and
/// `Quantity<f64, -1, 1>` a unit rate.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Eq,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
    derive_more::Add,
    derive_more::AddAssign,
    derive_more::From,
    derive_more::FromStr,
    derive_more::Neg,
    derive_more::Sub,
    derive_more::SubAssign,
    derive_more::Sum,
)]
pub struct Quantity<T, const ENERGY: isize, const COST: isize>(pub T);

impl<T, const ENERGY: isize, const COST: isize> Quantity<T, ENERGY, COST>
where
    Self: PartialOrd,
{
    pub fn min(mut self, rhs: Self) -> Self {
        if rhs < self {
            self = rhs;
        }
        self
    }

    pub fn max(mut self, rhs: Self) -> Self {
        if rhs > self {
            self = rhs;
        }
        self
    }
}

impl<const ENERGY: isize, const COST: isize> Quantity<f64, ENERGY, COST> {
    pub const ZERO: Self = Self(0.0);
}

impl<T, const ENERGY: isize, const COST: isize> Mul<T> for Quantity<T, ENERGY, COST>
where
    T: Mul<T>,
{
    type Output = Quantity<T::Output, ENERGY, COST>;

    fn mul(self, rhs: T) -> Self::Output {
        Quantity(self.0 * rhs)
    }
}

impl<T, const ENERGY: isize, const COST: isize> Div<T> for Quantity<T, ENERGY, COST>
where
    T: Div<T>,
{
    type Output = Quantity<T::Output, ENERGY, COST>;

    fn div(self, rhs: T) -> Self::Output {
        Quantity(self.0 / rhs)
    }
}
