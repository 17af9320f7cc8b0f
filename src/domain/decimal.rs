//! Fixed-precision decimal used for every numeric Uom field.
//!
//! Values are rounded to six fractional digits on construction and always
//! leave the process as a canonical string with trailing zeros and a trailing
//! decimal point stripped (`1.2300000` -> `"1.23"`, `2.0` -> `"2"`).

use crate::utils::error::UomError;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

const SCALE: f64 = 1e6;
const FRACTION_DIGITS: usize = 6;
// 2^53 / SCALE: from here on an f64 has no sub-1e-6 digits left to round
const EXACT_LIMIT: f64 = 9_007_199_254.740_992;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct PreciseDecimal(f64);

fn round6(value: f64) -> f64 {
    if value.abs() >= EXACT_LIMIT {
        return value;
    }
    let rounded = (value * SCALE).round() / SCALE;
    // collapse -0 so it never encodes as "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

impl PreciseDecimal {
    pub fn new(value: f64) -> Self {
        Self(round6(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }

    pub fn to_canonical_string(self) -> String {
        let formatted = format!("{:.*}", FRACTION_DIGITS, self.0);
        if !formatted.contains('.') {
            return formatted;
        }
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

impl From<f64> for PreciseDecimal {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PreciseDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

impl FromStr for PreciseDecimal {
    type Err = UomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed: f64 = s.trim().parse().map_err(|_| UomError::Decode {
            message: format!("cannot decode {:?} into PreciseDecimal", s),
        })?;
        if !parsed.is_finite() {
            return Err(UomError::Decode {
                message: format!("{:?} is not a finite decimal", s),
            });
        }
        Ok(Self::new(parsed))
    }
}

impl Serialize for PreciseDecimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if !self.is_finite() {
            return Err(serde::ser::Error::custom(format!(
                "cannot encode non-finite value {} as PreciseDecimal",
                self.0
            )));
        }
        serializer.serialize_str(&self.to_canonical_string())
    }
}

struct PreciseDecimalVisitor;

impl<'de> Visitor<'de> for PreciseDecimalVisitor {
    type Value = PreciseDecimal;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a decimal string or a number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(|e: UomError| E::custom(e.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(format!("{} is not a finite decimal", v)));
        }
        Ok(PreciseDecimal::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        self.visit_f64(v as f64)
    }
}

impl<'de> Deserialize<'de> for PreciseDecimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PreciseDecimalVisitor)
    }
}
