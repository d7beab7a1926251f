//! Dimensional analysis types
//!
//! Each quantity has dimensions represented as a 9-element exponent
//! vector: [length, mass, time, current, temperature, amount, luminosity,
//! currency, information]. Currency and information are full dimensions of
//! their own so monetary values and data sizes obey the same mismatch
//! rules as physical ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of base dimensions
pub const DIMENSION_COUNT: usize = 9;

/// Dimensions of a quantity as exponents of the base dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    /// [length, mass, time, current, temperature, amount, luminosity, currency, information]
    pub exponents: [i32; DIMENSION_COUNT],
}

impl Dimension {
    /// Dimensionless quantity (all exponents zero)
    pub const DIMENSIONLESS: Dimension = Dimension { exponents: [0; DIMENSION_COUNT] };

    /// Length dimension [L]
    pub const LENGTH: Dimension = Dimension { exponents: [1, 0, 0, 0, 0, 0, 0, 0, 0] };

    /// Mass dimension [M]
    pub const MASS: Dimension = Dimension { exponents: [0, 1, 0, 0, 0, 0, 0, 0, 0] };

    /// Time dimension [T]
    pub const TIME: Dimension = Dimension { exponents: [0, 0, 1, 0, 0, 0, 0, 0, 0] };

    /// Electric current dimension [I]
    pub const CURRENT: Dimension = Dimension { exponents: [0, 0, 0, 1, 0, 0, 0, 0, 0] };

    /// Temperature dimension [Θ]
    pub const TEMPERATURE: Dimension = Dimension { exponents: [0, 0, 0, 0, 1, 0, 0, 0, 0] };

    /// Amount of substance dimension [N]
    pub const AMOUNT: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 1, 0, 0, 0] };

    /// Luminous intensity dimension [J]
    pub const LUMINOSITY: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 1, 0, 0] };

    /// Currency dimension [$]
    pub const CURRENCY: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 0, 1, 0] };

    /// Information dimension [b], counted in bits
    pub const INFORMATION: Dimension = Dimension { exponents: [0, 0, 0, 0, 0, 0, 0, 0, 1] };

    /// Velocity [L T^-1]
    pub const VELOCITY: Dimension = Dimension { exponents: [1, 0, -1, 0, 0, 0, 0, 0, 0] };

    /// Force [M L T^-2]
    pub const FORCE: Dimension = Dimension { exponents: [1, 1, -2, 0, 0, 0, 0, 0, 0] };

    /// Energy [M L^2 T^-2]
    pub const ENERGY: Dimension = Dimension { exponents: [2, 1, -2, 0, 0, 0, 0, 0, 0] };

    /// Power [M L^2 T^-3]
    pub const POWER: Dimension = Dimension { exponents: [2, 1, -3, 0, 0, 0, 0, 0, 0] };

    /// Pressure [M L^-1 T^-2]
    pub const PRESSURE: Dimension = Dimension { exponents: [-1, 1, -2, 0, 0, 0, 0, 0, 0] };

    /// Area [L^2]
    pub const AREA: Dimension = Dimension { exponents: [2, 0, 0, 0, 0, 0, 0, 0, 0] };

    /// Volume [L^3]
    pub const VOLUME: Dimension = Dimension { exponents: [3, 0, 0, 0, 0, 0, 0, 0, 0] };

    /// Frequency [T^-1]
    pub const FREQUENCY: Dimension = Dimension { exponents: [0, 0, -1, 0, 0, 0, 0, 0, 0] };

    pub fn new(exponents: [i32; DIMENSION_COUNT]) -> Self {
        Dimension { exponents }
    }

    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|&e| e == 0)
    }

    pub fn is_currency(&self) -> bool {
        *self == Self::CURRENCY
    }

    /// Multiply dimensions (add exponents)
    pub fn multiply(&self, other: &Dimension) -> Dimension {
        let mut result = [0i32; DIMENSION_COUNT];
        for i in 0..DIMENSION_COUNT {
            result[i] = self.exponents[i] + other.exponents[i];
        }
        Dimension { exponents: result }
    }

    /// Divide dimensions (subtract exponents)
    pub fn divide(&self, other: &Dimension) -> Dimension {
        let mut result = [0i32; DIMENSION_COUNT];
        for i in 0..DIMENSION_COUNT {
            result[i] = self.exponents[i] - other.exponents[i];
        }
        Dimension { exponents: result }
    }

    /// Raise to integer power (multiply exponents)
    pub fn power(&self, exp: i32) -> Dimension {
        let mut result = [0i32; DIMENSION_COUNT];
        for i in 0..DIMENSION_COUNT {
            result[i] = self.exponents[i] * exp;
        }
        Dimension { exponents: result }
    }

    pub fn invert(&self) -> Dimension {
        self.power(-1)
    }

    /// Name of this dimension if it matches a common quantity
    pub fn name(&self) -> Option<&'static str> {
        match self.exponents {
            [0, 0, 0, 0, 0, 0, 0, 0, 0] => Some("dimensionless"),
            [1, 0, 0, 0, 0, 0, 0, 0, 0] => Some("length"),
            [0, 1, 0, 0, 0, 0, 0, 0, 0] => Some("mass"),
            [0, 0, 1, 0, 0, 0, 0, 0, 0] => Some("time"),
            [0, 0, 0, 1, 0, 0, 0, 0, 0] => Some("current"),
            [0, 0, 0, 0, 1, 0, 0, 0, 0] => Some("temperature"),
            [0, 0, 0, 0, 0, 1, 0, 0, 0] => Some("amount"),
            [0, 0, 0, 0, 0, 0, 1, 0, 0] => Some("luminosity"),
            [0, 0, 0, 0, 0, 0, 0, 1, 0] => Some("currency"),
            [0, 0, 0, 0, 0, 0, 0, 0, 1] => Some("information"),
            [1, 0, -1, 0, 0, 0, 0, 0, 0] => Some("velocity"),
            [1, 1, -2, 0, 0, 0, 0, 0, 0] => Some("force"),
            [2, 1, -2, 0, 0, 0, 0, 0, 0] => Some("energy"),
            [2, 1, -3, 0, 0, 0, 0, 0, 0] => Some("power"),
            [-1, 1, -2, 0, 0, 0, 0, 0, 0] => Some("pressure"),
            [2, 0, 0, 0, 0, 0, 0, 0, 0] => Some("area"),
            [3, 0, 0, 0, 0, 0, 0, 0, 0] => Some("volume"),
            [0, 0, -1, 0, 0, 0, 0, 0, 0] => Some("frequency"),
            _ => None,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = ["L", "M", "T", "I", "Θ", "N", "J", "$", "b"];
        let mut parts = Vec::new();

        for (i, &exp) in self.exponents.iter().enumerate() {
            if exp != 0 {
                if exp == 1 {
                    parts.push(names[i].to_string());
                } else {
                    parts.push(format!("{}^{}", names[i], exp));
                }
            }
        }

        if parts.is_empty() {
            write!(f, "1")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Self::DIMENSIONLESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimensionless() {
        assert!(Dimension::DIMENSIONLESS.is_dimensionless());
        assert!(!Dimension::CURRENCY.is_dimensionless());
    }

    #[test]
    fn test_velocity_from_length_and_time() {
        let velocity = Dimension::LENGTH.divide(&Dimension::TIME);
        assert_eq!(velocity, Dimension::VELOCITY);
    }

    #[test]
    fn test_power_and_invert() {
        assert_eq!(Dimension::LENGTH.power(2), Dimension::AREA);
        assert_eq!(Dimension::TIME.invert(), Dimension::FREQUENCY);
    }

    #[test]
    fn test_currency_is_its_own_dimension() {
        assert!(Dimension::CURRENCY.is_currency());
        assert_ne!(Dimension::CURRENCY, Dimension::MASS);
        assert_eq!(Dimension::CURRENCY.name(), Some("currency"));
    }

    #[test]
    fn test_information_is_its_own_dimension() {
        assert!(!Dimension::INFORMATION.is_dimensionless());
        assert_eq!(Dimension::INFORMATION.name(), Some("information"));
        assert_ne!(Dimension::INFORMATION, Dimension::AMOUNT);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Dimension::DIMENSIONLESS), "1");
        assert_eq!(format!("{}", Dimension::VELOCITY), "L T^-1");
        assert_eq!(format!("{}", Dimension::CURRENCY), "$");
    }
}
