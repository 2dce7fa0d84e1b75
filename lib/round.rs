//! Significant-figure rounding and digit-significance analysis.
//!
//! Everything here is pure: no I/O, no shared state, safe to call from any
//! thread.

use std::fmt;
use regex::Regex;
use thiserror::Error;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum RoundError {
    /// Rounding is defined for integers and floats only.
    #[error("round: unsupported numeric type '{0}'")]
    UnsupportedType(&'static str),

    /// The decimal representation matched no recognized digit pattern.
    #[error("round: no significance found in '{0}'")]
    NoSignificance(String),
}
pub type RoundResult<T> = Result<T, RoundError>;

/// A number rounded to a requested count of significant figures.
///
/// Values whose significant digits all land at or above the decimal point
/// are floored to a clean integer; everything else keeps a fractional part.
/// The variant drives decimal-point handling during display; no other
/// formatting metadata is carried.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Rounded {
    Int(i64),
    Float(f64),
}

impl Rounded {
    /// The rounded value as an `f64`.
    pub fn as_f64(self) -> f64 {
        return match self {
            Self::Int(n) => n as f64,
            Self::Float(x) => x,
        };
    }
}

/// Canonical decimal form: integers bare, floats with at least one decimal
/// digit so the decimal point survives into alignment and significance
/// checks.
impl fmt::Display for Rounded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match *self {
            Self::Int(n) => write!(f, "{}", n),
            Self::Float(x) if x.fract() == 0.0 => write!(f, "{:.1}", x),
            Self::Float(x) => write!(f, "{}", x),
        };
    }
}

/// Round a numeric value to `sig_figs` significant figures.
///
/// Zero maps to zero unchanged, as do integers with fewer digits than
/// `sig_figs`. A value whose significant digits all land at or above the
/// decimal point is floored so no spurious fractional remainder from the
/// scaling survives. Non-numeric variants are an error.
///
/// ```
/// # use texval::{ round::{ round_value, Rounded }, value::Value };
/// assert_eq!(round_value(&Value::Int(1234), 3).unwrap(), Rounded::Int(1230));
/// assert_eq!(round_value(&Value::Float(12.345), 3).unwrap(), Rounded::Float(12.3));
/// assert_eq!(round_value(&Value::Float(137.0), 3).unwrap(), Rounded::Int(137));
/// ```
pub fn round_value(value: &Value, sig_figs: usize) -> RoundResult<Rounded> {
    return match value {
        Value::Int(n) => Ok(round_int(*n, sig_figs)),
        Value::Float(x) => Ok(round_f64(*x, sig_figs)),
        other => Err(RoundError::UnsupportedType(other.kind())),
    };
}

pub(crate) fn round_int(n: i64, sig_figs: usize) -> Rounded {
    let digits: usize = n.unsigned_abs().to_string().len();
    if digits < sig_figs {
        return Rounded::Int(n);
    }
    return round_f64(n as f64, sig_figs);
}

pub(crate) fn round_f64(x: f64, sig_figs: usize) -> Rounded {
    if x == 0.0 {
        return Rounded::Float(0.0);
    }
    let exponent: i32 = x.abs().log10().floor() as i32;
    let places: i32 = sig_figs as i32 - 1 - exponent;
    // scale by an exact power of ten on whichever side keeps the division
    // correctly rounded
    let rounded: f64 = if places >= 0 {
        let scale: f64 = 10.0_f64.powi(places);
        (x * scale).round() / scale
    } else {
        let scale: f64 = 10.0_f64.powi(-places);
        (x / scale).round() * scale
    };
    return if exponent >= sig_figs as i32 - 1 {
        Rounded::Int(rounded.floor() as i64)
    } else {
        Rounded::Float(rounded)
    };
}

/// Positional value of the last significant digit of `x` once rounded to
/// `sig_figs` figures, read off its decimal representation.
///
/// The digit position is located textually rather than through logarithms;
/// log-based exponent extraction misrounds near power-of-ten boundaries.
/// Sign follows the input. A representation with no significant digit at
/// all (zero) is an error.
///
/// ```
/// # use texval::round::find_significance;
/// assert_eq!(find_significance(13.0, 3).unwrap(), 1.0);
/// assert_eq!(find_significance(130000.0, 3).unwrap(), 10000.0);
/// assert_eq!(find_significance(0.13, 3).unwrap(), 0.01);
/// ```
pub fn find_significance(x: f64, sig_figs: usize) -> RoundResult<f64> {
    let repr: String = round_f64(x, sig_figs).to_string();
    // fractional part ending in a nonzero digit, e.g. "0.13", "-12.3"
    let fractional = Regex::new(r"^-?\d+\.(\d*[1-9])$").unwrap();
    // integral with trailing zeros, e.g. "13", "130000", "10.0"
    let integral = Regex::new(r"^-?\d*[1-9](0*)(?:\.0+)?$").unwrap();
    let magnitude: f64 =
        if let Some(cap) = fractional.captures(&repr) {
            10.0_f64.powi(-(cap[1].len() as i32))
        } else if let Some(cap) = integral.captures(&repr) {
            10.0_f64.powi(cap[1].len() as i32)
        } else {
            return Err(RoundError::NoSignificance(repr));
        };
    return Ok(if x < 0.0 { -magnitude } else { magnitude });
}

/// Smallest increment that is significant when `x` is rounded to `sig_figs`
/// figures: one unit in the last significant place.
///
/// Unlike [`find_significance`] this is derived purely from `log10`, with
/// zero taking a fixed exponent of 0. Sign follows the input, zero counting
/// as non-negative.
///
/// ```
/// # use texval::round::find_sig_figs_significance;
/// assert_eq!(find_sig_figs_significance(0.13, 3), 0.001);
/// assert_eq!(find_sig_figs_significance(-1.23, 3), -0.01);
/// assert_eq!(find_sig_figs_significance(130000.0, 3), 1000.0);
/// ```
pub fn find_sig_figs_significance(x: f64, sig_figs: usize) -> f64 {
    let exponent: i32 =
        if x == 0.0 { 0 } else { x.abs().log10().floor() as i32 };
    let magnitude: f64 = 10.0_f64.powi(exponent - (sig_figs as i32 - 1));
    return if x < 0.0 { -magnitude } else { magnitude };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_significant_figures() {
        assert_eq!(round_value(&Value::Int(1234), 3).unwrap(), Rounded::Int(1230));
        assert_eq!(round_value(&Value::Int(10010101), 3).unwrap(), Rounded::Int(10000000));
        assert_eq!(round_value(&Value::Float(12.345), 3).unwrap(), Rounded::Float(12.3));
        assert_eq!(round_value(&Value::Float(-12.3), 3).unwrap(), Rounded::Float(-12.3));
        assert_eq!(round_value(&Value::Float(0.13), 3).unwrap(), Rounded::Float(0.13));
    }

    #[test]
    fn small_integers_pass_through() {
        assert_eq!(round_value(&Value::Int(0), 3).unwrap(), Rounded::Int(0));
        assert_eq!(round_value(&Value::Int(-1), 3).unwrap(), Rounded::Int(-1));
        assert_eq!(round_value(&Value::Int(99), 3).unwrap(), Rounded::Int(99));
    }

    #[test]
    fn zero_float_is_zero() {
        for k in 1..=6 {
            assert_eq!(round_f64(0.0, k), Rounded::Float(0.0));
        }
    }

    #[test]
    fn values_above_the_point_are_floored_clean() {
        assert_eq!(round_f64(137.0, 3), Rounded::Int(137));
        assert_eq!(round_f64(1234.5, 3), Rounded::Int(1230));
        assert_eq!(round_f64(-1234.5, 3), Rounded::Int(-1230));
    }

    #[test]
    fn rounding_is_idempotent() {
        let cases: [f64; 6] = [0.13, 12.345, 137.0, -12.3, -0.00123, 1234.5];
        for x in cases {
            let once = round_f64(x, 3);
            let twice = match once {
                Rounded::Int(n) => round_int(n, 3),
                Rounded::Float(v) => round_f64(v, 3),
            };
            assert_eq!(twice, once, "not idempotent for {}", x);
        }
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let err = round_value(&Value::Text("abc".to_string()), 3).unwrap_err();
        assert!(matches!(err, RoundError::UnsupportedType("text")));
    }

    #[test]
    fn canonical_form_keeps_one_decimal_on_floats() {
        assert_eq!(Rounded::Int(1230).to_string(), "1230");
        assert_eq!(Rounded::Float(10.0).to_string(), "10.0");
        assert_eq!(Rounded::Float(0.13).to_string(), "0.13");
        assert_eq!(Rounded::Float(-12.3).to_string(), "-12.3");
    }

    #[test]
    fn significance_from_digits() {
        assert_eq!(find_significance(13.0, 3).unwrap(), 1.0);
        assert_eq!(find_significance(130000.0, 3).unwrap(), 10000.0);
        assert_eq!(find_significance(0.13, 3).unwrap(), 0.01);
        assert_eq!(find_significance(10.0, 3).unwrap(), 10.0);
        assert_eq!(find_significance(-12.3, 3).unwrap(), -0.1);
    }

    #[test]
    fn significance_requires_a_nonzero_digit() {
        let err = find_significance(0.0, 3).unwrap_err();
        assert!(matches!(err, RoundError::NoSignificance(_)));
    }

    #[test]
    fn sig_figs_significance_from_magnitude() {
        assert_eq!(find_sig_figs_significance(0.13, 3), 0.001);
        assert_eq!(find_sig_figs_significance(-1.23, 3), -0.01);
        assert_eq!(find_sig_figs_significance(130000.0, 3), 1000.0);
        assert_eq!(find_sig_figs_significance(0.0, 3), 0.01);
    }
}
