//! Unit representation with conversion factors

use crate::Dimension;
use reckon_core::{CalcError, Number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named unit with its dimension and conversion to the base unit
/// of that dimension (value_base = value * factor + offset)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    /// The unit symbol (e.g., "m", "kg", "USD")
    pub symbol: String,
    /// The unit name (e.g., "meter", "kilogram", "US dollar")
    pub name: String,
    /// The dimensional signature
    pub dimension: Dimension,
    /// Factor to convert to the dimension's base unit
    pub factor: Number,
    /// Offset for non-proportional units like temperatures
    pub offset: Number,
}

impl Unit {
    /// Create a unit with proportional conversion (no offset)
    pub fn new(symbol: &str, name: &str, dimension: Dimension, factor: Number) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension,
            factor,
            offset: Number::zero(),
        }
    }

    /// Create a unit with an offset (temperature scales)
    pub fn with_offset(
        symbol: &str,
        name: &str,
        dimension: Dimension,
        factor: Number,
        offset: Number,
    ) -> Self {
        Unit {
            symbol: symbol.to_string(),
            name: name.to_string(),
            dimension,
            factor,
            offset,
        }
    }

    /// The dimensionless "unit" for plain numbers
    pub fn dimensionless() -> Self {
        Unit::new("", "dimensionless", Dimension::DIMENSIONLESS, Number::one())
    }

    pub fn is_base(&self) -> bool {
        self.factor.eq_value(&Number::one()) && self.offset.is_zero()
    }

    pub fn is_currency(&self) -> bool {
        self.dimension.is_currency()
    }

    /// Two units can be converted iff their dimension vectors match
    pub fn is_compatible(&self, other: &Unit) -> bool {
        self.dimension == other.dimension
    }

    /// Convert a value in this unit to the dimension's base unit
    pub fn to_base(&self, value: &Number) -> Number {
        value.mul(&self.factor).add(&self.offset)
    }

    /// Convert a value in the dimension's base unit to this unit
    pub fn from_base(&self, base_value: &Number) -> Result<Number, CalcError> {
        let shifted = base_value.sub(&self.offset);
        shifted.checked_div(&self.factor).map_err(CalcError::from)
    }

    /// Convert a value from this unit to another unit of the same dimension
    pub fn convert_to(&self, value: &Number, target: &Unit) -> Result<Number, CalcError> {
        if !self.is_compatible(target) {
            return Err(CalcError::dimension_mismatch(&self.describe(), &target.describe()));
        }
        target.from_base(&self.to_base(value))
    }

    /// "m (length)" style description for error messages
    pub fn describe(&self) -> String {
        match self.dimension.name() {
            Some(n) => format!("{} ({})", self.symbol, n),
            None => format!("{} ({})", self.symbol, self.dimension),
        }
    }

    /// Multiply two units (m * m -> m^2). Offsets lose meaning under
    /// products and are dropped.
    pub fn multiply(&self, other: &Unit) -> Unit {
        let symbol = match (self.symbol.is_empty(), other.symbol.is_empty()) {
            (true, _) => other.symbol.clone(),
            (_, true) => self.symbol.clone(),
            _ => format!("{}*{}", self.symbol, other.symbol),
        };
        Unit {
            symbol,
            name: format!("{} {}", self.name, other.name),
            dimension: self.dimension.multiply(&other.dimension),
            factor: self.factor.mul(&other.factor),
            offset: Number::zero(),
        }
    }

    /// Divide two units (m / s -> m/s)
    pub fn divide(&self, other: &Unit) -> Result<Unit, CalcError> {
        let factor = self
            .factor
            .checked_div(&other.factor)
            .map_err(CalcError::from)?;
        let symbol = if other.symbol.is_empty() {
            self.symbol.clone()
        } else if self.symbol.is_empty() {
            format!("1/{}", other.symbol)
        } else {
            format!("{}/{}", self.symbol, other.symbol)
        };
        Ok(Unit {
            symbol,
            name: format!("{} per {}", self.name, other.name),
            dimension: self.dimension.divide(&other.dimension),
            factor,
            offset: Number::zero(),
        })
    }

    /// Raise a unit to an integer power (m^2, m^3)
    pub fn power(&self, exp: i32) -> Result<Unit, CalcError> {
        let factor = self.factor.pow_int(exp as i64).map_err(CalcError::from)?;
        let symbol = if exp == 1 || self.symbol.is_empty() {
            self.symbol.clone()
        } else {
            format!("{}^{}", self.symbol, exp)
        };
        Ok(Unit {
            symbol,
            name: format!("{}^{}", self.name, exp),
            dimension: self.dimension.power(exp),
            factor,
            offset: Number::zero(),
        })
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meter() -> Unit {
        Unit::new("m", "meter", Dimension::LENGTH, Number::from_i64(1))
    }

    fn kilometer() -> Unit {
        Unit::new("km", "kilometer", Dimension::LENGTH, Number::from_i64(1000))
    }

    fn second() -> Unit {
        Unit::new("s", "second", Dimension::TIME, Number::from_i64(1))
    }

    #[test]
    fn test_compatibility() {
        assert!(meter().is_compatible(&kilometer()));
        assert!(!meter().is_compatible(&second()));
    }

    #[test]
    fn test_conversion() {
        let converted = meter()
            .convert_to(&Number::from_i64(5000), &kilometer())
            .unwrap();
        assert!(converted.eq_value(&Number::from_i64(5)));
    }

    #[test]
    fn test_conversion_round_trip() {
        let v = Number::parse("12.5").unwrap();
        let there = kilometer().convert_to(&v, &meter()).unwrap();
        let back = meter().convert_to(&there, &kilometer()).unwrap();
        assert!(back.eq_value(&v));
    }

    #[test]
    fn test_mismatch_is_error() {
        let err = meter().convert_to(&Number::one(), &second());
        assert!(err.is_err());
        assert_eq!(err.unwrap_err().code, reckon_core::codes::DIMENSION_MISMATCH);
    }

    #[test]
    fn test_offset_unit() {
        // Celsius -> Kelvin: K = C + 273.15
        let celsius = Unit::with_offset(
            "°C",
            "degree Celsius",
            Dimension::TEMPERATURE,
            Number::one(),
            Number::parse("273.15").unwrap(),
        );
        let kelvin = Unit::new("K", "kelvin", Dimension::TEMPERATURE, Number::one());
        let k = celsius.convert_to(&Number::from_i64(25), &kelvin).unwrap();
        assert!(k.eq_value(&Number::parse("298.15").unwrap()));
    }

    #[test]
    fn test_derived_units() {
        let m2 = meter().power(2).unwrap();
        assert_eq!(m2.dimension, Dimension::AREA);
        assert_eq!(m2.symbol, "m^2");

        let velocity = meter().divide(&second()).unwrap();
        assert_eq!(velocity.dimension, Dimension::VELOCITY);
    }
}
