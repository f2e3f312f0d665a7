//! Resource quantities (`10Gi`, `500m`, `1.5e3`).
//!
//! Follows the Kubernetes quantity grammar: an optionally signed decimal
//! number followed by a binary SI suffix (`Ki` .. `Ei`), a decimal SI suffix
//! (`n`, `u`, `m`, `k`, `M` .. `E`) or a decimal exponent (`e3`, `E-2`).
//! Values are held exactly in nano-units; anything finer is rounded away
//! from zero to the next nano-unit.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Serialize, Serializer};

use crate::errors::{Error, Result};

lazy_static! {
    static ref QUANTITY_REGEX: Regex = Regex::new(concat!(
        r"^([+-]?)([0-9]+(?:\.[0-9]*)?|\.[0-9]+)",
        r"(?:([eE][+-]?[0-9]+)|(Ki|Mi|Gi|Ti|Pi|Ei|n|u|m|k|M|G|T|P|E))?$",
    ))
    .unwrap();
}

const FORMAT_ERROR: &str =
    "quantities must match the regular expression '^([+-]?[0-9.]+)([eEinumkKMGTP]*[-+]?[0-9]*)$'";
const RANGE_ERROR: &str = "quantity is out of range";
const NANOS_PER_UNIT: i128 = 1_000_000_000;

/// A parsed resource quantity.
///
/// Equality, ordering and hashing compare the numeric value, so `1k`,
/// `1000` and `1e3` are equal. `Display` and serialization keep the literal
/// as written.
#[derive(Debug, Clone)]
pub struct Quantity {
    literal: String,
    nanos: i128,
}

impl Quantity {
    pub fn parse(literal: &str) -> Result<Self> {
        let malformed = || Error::parse("quantity", literal, FORMAT_ERROR);
        let out_of_range = || Error::parse("quantity", literal, RANGE_ERROR);
        let captures = QUANTITY_REGEX.captures(literal).ok_or_else(malformed)?;

        let negative = &captures[1] == "-";
        let number = &captures[2];
        let (whole, fraction) = number.split_once('.').unwrap_or((number, ""));

        let digits = format!("{}{}", whole, fraction);
        let digits = digits.trim_start_matches('0');
        let mantissa: i128 = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| out_of_range())?
        };

        let fraction_len = i32::try_from(fraction.len()).map_err(|_| out_of_range())?;
        let mut exp10: i32 = 9 - fraction_len;
        let mut exp2: u32 = 0;

        if let Some(exponent) = captures.get(3) {
            let exponent: i32 = exponent.as_str()[1..].parse().map_err(|_| out_of_range())?;
            exp10 = exp10.checked_add(exponent).ok_or_else(out_of_range)?;
        }

        if let Some(suffix) = captures.get(4) {
            match suffix.as_str() {
                "Ki" => exp2 = 10,
                "Mi" => exp2 = 20,
                "Gi" => exp2 = 30,
                "Ti" => exp2 = 40,
                "Pi" => exp2 = 50,
                "Ei" => exp2 = 60,
                "n" => exp10 -= 9,
                "u" => exp10 -= 6,
                "m" => exp10 -= 3,
                "k" => exp10 += 3,
                "M" => exp10 += 6,
                "G" => exp10 += 9,
                "T" => exp10 += 12,
                "P" => exp10 += 15,
                "E" => exp10 += 18,
                _ => return Err(malformed()),
            }
        }

        let magnitude = scale(mantissa, exp2, exp10).ok_or_else(out_of_range)?;
        let nanos = if negative { -magnitude } else { magnitude };

        Ok(Self { literal: literal.to_string(), nanos })
    }

    /// Exact value in nano-units.
    pub fn as_nanos(&self) -> i128 {
        self.nanos
    }

    /// Value in whole units, rounded up.
    pub fn value(&self) -> i128 {
        ceil_div(self.nanos, NANOS_PER_UNIT)
    }

    /// Value in thousandths, rounded up.
    pub fn milli_value(&self) -> i128 {
        ceil_div(self.nanos, NANOS_PER_UNIT / 1000)
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    pub fn is_negative(&self) -> bool {
        self.nanos < 0
    }

    /// The literal as written.
    pub fn as_str(&self) -> &str {
        &self.literal
    }
}

/// `mantissa * 2^exp2 * 10^exp10`, rounding a fractional result up.
fn scale(mantissa: i128, exp2: u32, exp10: i32) -> Option<i128> {
    if mantissa == 0 {
        return Some(0);
    }
    let value = mantissa.checked_mul(1i128.checked_shl(exp2)?)?;
    if exp10 >= 0 {
        value.checked_mul(10i128.checked_pow(exp10.unsigned_abs())?)
    } else {
        match 10i128.checked_pow(exp10.unsigned_abs()) {
            Some(divisor) => Some(value / divisor + i128::from(value % divisor != 0)),
            // Divisor exceeds any representable mantissa
            None => Some(1),
        }
    }
}

fn ceil_div(value: i128, divisor: i128) -> i128 {
    let quotient = value.div_euclid(divisor);
    if value.rem_euclid(divisor) != 0 {
        quotient + 1
    } else {
        quotient
    }
}

impl FromStr for Quantity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl PartialEq for Quantity {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl Eq for Quantity {}

impl PartialOrd for Quantity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Quantity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl Hash for Quantity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.nanos.hash(state);
    }
}

impl Serialize for Quantity {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.literal)
    }
}
