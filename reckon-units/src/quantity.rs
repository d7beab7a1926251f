//! Quantity type - a number with an associated unit

use crate::Unit;
use reckon_core::{CalcError, Number};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A value with a unit attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quantity {
    pub value: Number,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: Number, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    pub fn dimensionless(value: Number) -> Self {
        Quantity {
            value,
            unit: Unit::dimensionless(),
        }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.unit.dimension.is_dimensionless()
    }

    pub fn is_compatible(&self, other: &Quantity) -> bool {
        self.unit.is_compatible(&other.unit)
    }

    /// Convert into another unit of the same dimension
    pub fn convert_to(&self, target: &Unit) -> Result<Quantity, CalcError> {
        let value = self.unit.convert_to(&self.value, target)?;
        Ok(Quantity::new(value, target.clone()))
    }

    /// Add; the right operand is converted into the left operand's unit
    pub fn add(&self, other: &Quantity) -> Result<Quantity, CalcError> {
        let converted = other.convert_to(&self.unit)?;
        Ok(Quantity::new(
            self.value.add(&converted.value),
            self.unit.clone(),
        ))
    }

    /// Subtract; the right operand is converted into the left operand's unit
    pub fn sub(&self, other: &Quantity) -> Result<Quantity, CalcError> {
        let converted = other.convert_to(&self.unit)?;
        Ok(Quantity::new(
            self.value.sub(&converted.value),
            self.unit.clone(),
        ))
    }

    /// Multiply; dimensions multiply
    pub fn mul(&self, other: &Quantity) -> Quantity {
        Quantity::new(
            self.value.mul(&other.value),
            self.unit.multiply(&other.unit),
        )
    }

    /// Divide; dimensions divide
    pub fn div(&self, other: &Quantity) -> Result<Quantity, CalcError> {
        let value = self
            .value
            .checked_div(&other.value)
            .map_err(CalcError::from)?;
        let unit = self.unit.divide(&other.unit)?;
        Ok(Quantity::new(value, unit))
    }

    /// Integer power; dimensions scale
    pub fn pow(&self, exp: i32) -> Result<Quantity, CalcError> {
        let value = self.value.pow_int(exp as i64).map_err(CalcError::from)?;
        let unit = self.unit.power(exp)?;
        Ok(Quantity::new(value, unit))
    }

    pub fn neg(&self) -> Quantity {
        Quantity::new(self.value.neg(), self.unit.clone())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.symbol.is_empty() {
            write!(f, "{}", self.value)
        } else {
            write!(f, "{} {}", self.value, self.unit.symbol)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dimension;

    fn meters(n: i64) -> Quantity {
        Quantity::new(
            Number::from_i64(n),
            Unit::new("m", "meter", Dimension::LENGTH, Number::from_i64(1)),
        )
    }

    fn millimeters(n: i64) -> Quantity {
        Quantity::new(
            Number::from_i64(n),
            Unit::new(
                "mm",
                "millimeter",
                Dimension::LENGTH,
                Number::parse("0.001").unwrap(),
            ),
        )
    }

    fn seconds(n: i64) -> Quantity {
        Quantity::new(
            Number::from_i64(n),
            Unit::new("s", "second", Dimension::TIME, Number::from_i64(1)),
        )
    }

    #[test]
    fn test_add_converts_right_operand() {
        // 1 m + 5 mm = 1.005 m
        let sum = meters(1).add(&millimeters(5)).unwrap();
        assert_eq!(sum.unit.symbol, "m");
        assert!(sum.value.eq_value(&Number::parse("1.005").unwrap()));
    }

    #[test]
    fn test_add_mismatch_fails() {
        let err = meters(1).add(&seconds(1));
        assert!(err.is_err());
    }

    #[test]
    fn test_mul_combines_dimensions() {
        let area = meters(3).mul(&meters(4));
        assert_eq!(area.unit.dimension, Dimension::AREA);
        assert!(area.value.eq_value(&Number::from_i64(12)));
    }

    #[test]
    fn test_div_to_velocity() {
        let v = meters(10).div(&seconds(2)).unwrap();
        assert_eq!(v.unit.dimension, Dimension::VELOCITY);
        assert!(v.value.eq_value(&Number::from_i64(5)));
    }
}
