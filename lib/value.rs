//! Value types accepted by the formatter.

use std::{
    fmt,
    ops::{
        Neg,
        Add,
        Sub,
        Mul,
        Div,
    },
};
use chrono::NaiveDate;
use num_traits::{ One, Zero };
use crate::display;

/// A single datum destined for the definitions file.
///
/// The formatter dispatches exhaustively on this enum; there is no other
/// runtime type inspection anywhere in the crate.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Plain integer.
    Int(i64),
    /// Plain floating-point number.
    Float(f64),
    /// Nominal value with an uncertainty bound.
    Measured(Measured),
    /// Calendar date.
    Date(NaiveDate),
    /// Free-form text, passed through as-is.
    Text(String),
}

impl Value {
    /// Name of the contained variant, for error messages.
    pub fn kind(&self) -> &'static str {
        return match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Measured(_) => "measured",
            Self::Date(_) => "date",
            Self::Text(_) => "text",
        };
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Self::Int(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Self::Int(n.into()) }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self { Self::Float(x) }
}

impl From<Measured> for Value {
    fn from(m: Measured) -> Self { Self::Measured(m) }
}

impl From<(f64, f64)> for Value {
    fn from(pair: (f64, f64)) -> Self { Self::Measured(pair.into()) }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self { Self::Date(d) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Self::Text(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Self::Text(s) }
}

/// A real number with an associated uncertainty bound. Uncertainties are
/// propagated through arithmetic operations.
///
/// The spread is always stored non-negative; comparisons look at the nominal
/// value only.
///
/// # String formatting
/// This type implements [`std::fmt::Display`] as a shortcut to
/// [`display_measured`][display::display_measured] at the default precision;
/// a precision in the format spec caps the nominal's decimal places.
///
/// ```
/// # use texval::value::Measured;
/// let m = Measured::new(10.0, 0.1);
/// assert_eq!(m.to_string(), r"$10.0 \pm 0.1$");
/// ```
#[derive(Copy, Clone, Debug)]
pub struct Measured {
    nominal: f64,
    spread: f64,
}

impl Measured {
    /// Create a new `Measured`.
    pub fn new(nominal: f64, spread: f64) -> Self {
        return Self { nominal, spread: spread.abs() };
    }

    /// Get the nominal value of `self`.
    pub fn nominal(self) -> f64 { self.nominal }

    /// Get the spread of `self`.
    ///
    /// This quantity is always non-negative.
    pub fn spread(self) -> f64 { self.spread }

    /// Return the values `nominal - spread` and `nominal + spread`, in that
    /// order.
    pub fn bounds(self) -> (f64, f64) {
        return (self.nominal - self.spread, self.nominal + self.spread);
    }
}

impl From<f64> for Measured {
    fn from(x: f64) -> Self { Self { nominal: x, spread: 0.0 } }
}

impl From<(f64, f64)> for Measured {
    fn from(pair: (f64, f64)) -> Self { Self::new(pair.0, pair.1) }
}

impl From<Measured> for (f64, f64) {
    fn from(m: Measured) -> Self { (m.nominal(), m.spread()) }
}

impl PartialEq<Measured> for Measured {
    fn eq(&self, rhs: &Self) -> bool { self.nominal == rhs.nominal }
}

impl PartialOrd<Measured> for Measured {
    fn partial_cmp(&self, rhs: &Self) -> Option<std::cmp::Ordering> {
        return self.nominal.partial_cmp(&rhs.nominal);
    }
}

impl Zero for Measured {
    fn zero() -> Self { Self { nominal: 0.0, spread: 0.0 } }

    fn is_zero(&self) -> bool { self.nominal == 0.0 }
}

impl One for Measured {
    fn one() -> Self { Self { nominal: 1.0, spread: 0.0 } }
}

impl Neg for Measured {
    type Output = Self;

    fn neg(self) -> Self {
        return Self {
            nominal: -self.nominal,
            spread: self.spread,
        };
    }
}

impl Add<Measured> for Measured {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        return Self {
            nominal: self.nominal + rhs.nominal,
            spread: (self.spread.powi(2) + rhs.spread.powi(2)).sqrt(),
        };
    }
}

impl Add<f64> for Measured {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        return Self {
            nominal: self.nominal + rhs,
            spread: self.spread,
        };
    }
}

impl Add<Measured> for f64 {
    type Output = Measured;

    fn add(self, rhs: Measured) -> Measured {
        return Measured {
            nominal: self + rhs.nominal,
            spread: rhs.spread,
        };
    }
}

impl Sub<Measured> for Measured {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        return Self {
            nominal: self.nominal - rhs.nominal,
            spread: (self.spread.powi(2) + rhs.spread.powi(2)).sqrt(),
        };
    }
}

impl Sub<f64> for Measured {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        return Self {
            nominal: self.nominal - rhs,
            spread: self.spread,
        };
    }
}

impl Sub<Measured> for f64 {
    type Output = Measured;

    fn sub(self, rhs: Measured) -> Measured {
        return Measured {
            nominal: self - rhs.nominal,
            spread: rhs.spread,
        };
    }
}

impl Mul<Measured> for Measured {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        return Self {
            nominal: self.nominal * rhs.nominal,
            spread: (
                (self.spread * rhs.nominal).powi(2)
                + (self.nominal * rhs.spread).powi(2)
            ).sqrt(),
        };
    }
}

impl Mul<f64> for Measured {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        return Self {
            nominal: self.nominal * rhs,
            spread: self.spread * rhs.abs(),
        };
    }
}

impl Mul<Measured> for f64 {
    type Output = Measured;

    fn mul(self, rhs: Measured) -> Measured {
        return Measured {
            nominal: self * rhs.nominal,
            spread: self.abs() * rhs.spread,
        };
    }
}

impl Div<Measured> for Measured {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        return Self {
            nominal: self.nominal / rhs.nominal,
            spread: (
                (self.spread / rhs.nominal).powi(2)
                + (rhs.spread * self.nominal / rhs.nominal.powi(2)).powi(2)
            ).sqrt(),
        };
    }
}

impl Div<f64> for Measured {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        return Self {
            nominal: self.nominal / rhs,
            spread: self.spread / rhs.abs(),
        };
    }
}

impl Div<Measured> for f64 {
    type Output = Measured;

    fn div(self, rhs: Measured) -> Measured {
        return Measured {
            nominal: self / rhs.nominal,
            spread: rhs.spread * self.abs() / rhs.nominal.powi(2),
        };
    }
}

impl fmt::Display for Measured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: String = display::display_measured(
            self,
            display::DEFAULT_SIG_FIGS,
            f.precision(),
        );
        return write!(f, "{}", s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spread_is_stored_absolute() {
        assert_eq!(Measured::new(1.0, -0.5).spread(), 0.5);
        assert_eq!(Measured::new(1.0, 0.5).spread(), 0.5);
    }

    #[test]
    fn addition_propagates_in_quadrature() {
        let sum = Measured::new(3.0, 3.0) + Measured::new(4.0, 4.0);
        assert_eq!(sum.nominal(), 7.0);
        assert_eq!(sum.spread(), 5.0);
        let diff = Measured::new(3.0, 3.0) - Measured::new(4.0, 4.0);
        assert_eq!(diff.nominal(), -1.0);
        assert_eq!(diff.spread(), 5.0);
    }

    #[test]
    fn product_follows_the_product_rule() {
        let prod = Measured::new(2.0, 0.1) * Measured::new(3.0, 0.2);
        assert_eq!(prod.nominal(), 6.0);
        assert!((prod.spread() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scalar_operations_scale_the_spread() {
        let m = Measured::new(2.0, 0.1) * -2.0;
        assert_eq!(m.nominal(), -4.0);
        assert_eq!(m.spread(), 0.2);
        let m = -Measured::new(2.0, 0.1);
        assert_eq!(m.nominal(), -2.0);
        assert_eq!(m.spread(), 0.1);
        let m = Measured::new(2.0, 0.1) + 1.0;
        assert_eq!(m.nominal(), 3.0);
        assert_eq!(m.spread(), 0.1);
    }

    #[test]
    fn comparisons_ignore_the_spread() {
        assert_eq!(Measured::new(1.0, 0.1), Measured::new(1.0, 0.9));
        assert!(Measured::new(1.0, 0.1) < Measured::new(2.0, 0.1));
    }

    #[test]
    fn zero_and_one() {
        assert!(Measured::zero().is_zero());
        assert_eq!(Measured::one().nominal(), 1.0);
        assert_eq!(Measured::one().spread(), 0.0);
    }

    #[test]
    fn bounds_straddle_the_nominal() {
        assert_eq!(Measured::new(10.0, 0.5).bounds(), (9.5, 10.5));
    }

    #[test]
    fn conversions_pick_the_right_variant() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_eq!(Value::from(2.5), Value::Float(2.5));
        assert_eq!(Value::from((1.0, 0.2)), Value::Measured(Measured::new(1.0, 0.2)));
        assert_eq!(Value::from("abc"), Value::Text("abc".to_string()));
        assert_eq!(Value::from(3).kind(), "integer");
        assert_eq!(Value::from("abc").kind(), "text");
    }
}
