use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

/// A drop weight or probability as written in the data tables.
///
/// The game reads these back as text, and the mod files have always spelled
/// integral weights without a decimal point (`100`) while scaled or fractional
/// ones keep it (`250.0`, `0.25`). Keeping the two apart means a regenerated
/// file diffs cleanly against older ones.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    Int(i64),
    Float(f64),
}

impl Weight {
    pub const ZERO: Weight = Weight::Int(0);
    pub const ONE: Weight = Weight::Int(1);

    pub fn as_f64(self) -> f64 {
        match self {
            Weight::Int(v) => v as f64,
            Weight::Float(v) => v,
        }
    }

    /// Round to `places` decimals. Integers are left alone.
    pub fn round_to(self, places: i32) -> Weight {
        match self {
            Weight::Int(v) => Weight::Int(v),
            Weight::Float(v) => Weight::Float(round_places(v, places)),
        }
    }

    /// Round to the nearest whole number, ties to even.
    pub fn round_whole(self) -> i64 {
        match self {
            Weight::Int(v) => v,
            Weight::Float(v) => v.round_ties_even() as i64,
        }
    }
}

pub(crate) fn round_places(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round_ties_even() / scale
}

/// Shortest round-trip spelling of a float, with `.0` on integral values and
/// exponent notation outside `[1e-4, 1e16)`.
pub(crate) fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let abs = value.abs();
    if abs != 0.0 && !(1e-4..1e16).contains(&abs) {
        let raw = format!("{:e}", value);
        return match raw.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => raw,
        };
    }
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Weight::Int(v) => write!(f, "{}", v),
            Weight::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Weight::Int(a), Weight::Int(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

impl PartialOrd for Weight {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Weight::Int(a), Weight::Int(b)) => a.partial_cmp(b),
            _ => self.as_f64().partial_cmp(&other.as_f64()),
        }
    }
}

impl From<i64> for Weight {
    fn from(v: i64) -> Self {
        Weight::Int(v)
    }
}

impl From<i32> for Weight {
    fn from(v: i32) -> Self {
        Weight::Int(i64::from(v))
    }
}

impl From<f64> for Weight {
    fn from(v: f64) -> Self {
        Weight::Float(v)
    }
}

macro_rules! int_preserving_op {
    ($trait:ident, $method:ident, $checked:ident, $op:tt) => {
        impl $trait for Weight {
            type Output = Weight;

            fn $method(self, rhs: Weight) -> Weight {
                match (self, rhs) {
                    (Weight::Int(a), Weight::Int(b)) => match a.$checked(b) {
                        Some(v) => Weight::Int(v),
                        None => Weight::Float(a as f64 $op b as f64),
                    },
                    _ => Weight::Float(self.as_f64() $op rhs.as_f64()),
                }
            }
        }
    };
}

int_preserving_op!(Add, add, checked_add, +);
int_preserving_op!(Sub, sub, checked_sub, -);
int_preserving_op!(Mul, mul, checked_mul, *);

impl Div for Weight {
    type Output = Weight;

    fn div(self, rhs: Weight) -> Weight {
        Weight::Float(self.as_f64() / rhs.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_keep_their_spelling() {
        assert_eq!(Weight::Int(100).to_string(), "100");
        assert_eq!(Weight::Float(100.0).to_string(), "100.0");
        assert_eq!(Weight::Float(32.75).to_string(), "32.75");
        assert_eq!(Weight::Float(0.1).to_string(), "0.1");
    }

    #[test]
    fn tiny_floats_use_exponent_form() {
        assert_eq!(Weight::Float(0.00001).to_string(), "1e-05");
        assert_eq!(Weight::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Weight::Float(2.5e-7).to_string(), "2.5e-07");
    }

    #[test]
    fn scaling_an_int_by_a_float_yields_a_float() {
        let scaled = Weight::Int(100) * Weight::Float(2.5);
        assert_eq!(scaled.to_string(), "250.0");
        assert_eq!((Weight::Int(80) * Weight::Int(1)).to_string(), "80");
    }

    #[test]
    fn division_is_always_fractional() {
        assert_eq!((Weight::Int(1) / Weight::Int(4)).to_string(), "0.25");
        assert_eq!((Weight::Int(4) / Weight::Int(2)).to_string(), "2.0");
    }

    #[test]
    fn remainder_rounding_matches_table_output() {
        let total = Weight::ZERO + Weight::Float(0.33) + Weight::Float(0.6) / Weight::Int(4);
        let rest = (Weight::ONE - total).round_to(6);
        assert_eq!(rest.to_string(), "0.52");
        assert_eq!((Weight::ONE - Weight::ZERO).round_to(6).to_string(), "1");
    }

    #[test]
    fn deserializes_ints_and_floats_separately() {
        let parsed: Vec<Weight> = serde_json::from_str("[100, 0.25, 1.0]").unwrap();
        assert!(matches!(parsed[0], Weight::Int(100)));
        assert!(matches!(parsed[1], Weight::Float(v) if v == 0.25));
        assert!(matches!(parsed[2], Weight::Float(v) if v == 1.0));
    }

    #[test]
    fn mixed_comparisons_are_numeric() {
        assert_eq!(Weight::Int(1), Weight::Float(1.0));
        assert!(Weight::Float(0.5) < Weight::Int(1));
        assert!(Weight::Float(0.75) > Weight::Float(0.5));
    }
}
