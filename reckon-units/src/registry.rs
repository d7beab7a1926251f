//! Built-in unit catalog
//!
//! Units are registered once at startup, organized by category, with an
//! alias index mapping alternate spellings to canonical symbols. Currency
//! units are not registered here; they are materialized on demand from the
//! exchange-rate table.

use crate::{Dimension, Unit};
use reckon_core::Number;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Global unit registry
pub static UNITS: LazyLock<UnitRegistry> = LazyLock::new(UnitRegistry::new);

/// Registry of all built-in units
pub struct UnitRegistry {
    units: HashMap<String, Unit>,
    aliases: HashMap<String, String>,
}

impl UnitRegistry {
    pub fn new() -> Self {
        let mut registry = UnitRegistry {
            units: HashMap::new(),
            aliases: HashMap::new(),
        };
        registry.register_all_units();
        registry
    }

    /// Resolve a unit by symbol or alias
    pub fn resolve(&self, name: &str) -> Option<&Unit> {
        if let Some(unit) = self.units.get(name) {
            return Some(unit);
        }
        if let Some(canonical) = self.aliases.get(name) {
            return self.units.get(canonical);
        }
        // Long-form aliases are case-insensitive ("Meters")
        let lower = name.to_lowercase();
        if lower != name {
            if let Some(canonical) = self.aliases.get(&lower) {
                return self.units.get(canonical);
            }
        }
        None
    }

    /// All canonical symbols, sorted
    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.units.keys().map(|s| s.as_str()).collect();
        symbols.sort_unstable();
        symbols
    }

    fn register(&mut self, unit: Unit) {
        self.units.insert(unit.symbol.clone(), unit);
    }

    fn alias(&mut self, alias: &str, symbol: &str) {
        self.aliases.insert(alias.to_string(), symbol.to_string());
    }

    fn register_all_units(&mut self) {
        self.register_length_units();
        self.register_mass_units();
        self.register_time_units();
        self.register_temperature_units();
        self.register_area_volume_units();
        self.register_velocity_units();
        self.register_energy_power_units();
        self.register_pressure_frequency_units();
        self.register_angle_units();
        self.register_data_units();
    }

    fn register_length_units(&mut self) {
        let d = Dimension::LENGTH;
        self.register(Unit::new("m", "meter", d, Number::from_i64(1)));
        self.register(Unit::new("km", "kilometer", d, Number::from_i64(1000)));
        self.register(Unit::new("cm", "centimeter", d, num("0.01")));
        self.register(Unit::new("mm", "millimeter", d, num("0.001")));
        self.register(Unit::new("um", "micrometer", d, num("0.000001")));
        self.register(Unit::new("nm", "nanometer", d, num("0.000000001")));
        self.register(Unit::new("in", "inch", d, num("0.0254")));
        self.register(Unit::new("ft", "foot", d, num("0.3048")));
        self.register(Unit::new("yd", "yard", d, num("0.9144")));
        self.register(Unit::new("mi", "mile", d, num("1609.344")));
        self.register(Unit::new("nmi", "nautical mile", d, Number::from_i64(1852)));
        self.register(Unit::new("au", "astronomical unit", d, num("149597870700")));
        self.register(Unit::new("ly", "light year", d, num("9460730472580800")));

        self.alias("meter", "m");
        self.alias("meters", "m");
        self.alias("metre", "m");
        self.alias("metres", "m");
        self.alias("kilometer", "km");
        self.alias("kilometers", "km");
        self.alias("kilometre", "km");
        self.alias("kilometres", "km");
        self.alias("centimeter", "cm");
        self.alias("centimeters", "cm");
        self.alias("millimeter", "mm");
        self.alias("millimeters", "mm");
        self.alias("micrometer", "um");
        self.alias("μm", "um");
        self.alias("inch", "in");
        self.alias("inches", "in");
        self.alias("foot", "ft");
        self.alias("feet", "ft");
        self.alias("yard", "yd");
        self.alias("yards", "yd");
        self.alias("mile", "mi");
        self.alias("miles", "mi");
        self.alias("lightyear", "ly");
    }

    fn register_mass_units(&mut self) {
        let d = Dimension::MASS;
        self.register(Unit::new("kg", "kilogram", d, Number::from_i64(1)));
        self.register(Unit::new("g", "gram", d, num("0.001")));
        self.register(Unit::new("mg", "milligram", d, num("0.000001")));
        self.register(Unit::new("ug", "microgram", d, num("0.000000001")));
        self.register(Unit::new("t", "tonne", d, Number::from_i64(1000)));
        self.register(Unit::new("lb", "pound", d, num("0.45359237")));
        self.register(Unit::new("oz", "ounce", d, num("0.028349523125")));
        self.register(Unit::new("st", "stone", d, num("6.35029318")));

        self.alias("kilogram", "kg");
        self.alias("kilograms", "kg");
        self.alias("gram", "g");
        self.alias("grams", "g");
        self.alias("milligram", "mg");
        self.alias("milligrams", "mg");
        self.alias("tonne", "t");
        self.alias("tonnes", "t");
        self.alias("pound", "lb");
        self.alias("pounds", "lb");
        self.alias("lbs", "lb");
        self.alias("ounce", "oz");
        self.alias("ounces", "oz");
    }

    fn register_time_units(&mut self) {
        let d = Dimension::TIME;
        self.register(Unit::new("s", "second", d, Number::from_i64(1)));
        self.register(Unit::new("ms", "millisecond", d, num("0.001")));
        self.register(Unit::new("us", "microsecond", d, num("0.000001")));
        self.register(Unit::new("ns", "nanosecond", d, num("0.000000001")));
        self.register(Unit::new("min", "minute", d, Number::from_i64(60)));
        self.register(Unit::new("h", "hour", d, Number::from_i64(3600)));
        self.register(Unit::new("d", "day", d, Number::from_i64(86400)));
        self.register(Unit::new("week", "week", d, Number::from_i64(604800)));
        self.register(Unit::new("a", "Julian year", d, Number::from_i64(31557600)));

        self.alias("second", "s");
        self.alias("seconds", "s");
        self.alias("sec", "s");
        self.alias("minute", "min");
        self.alias("minutes", "min");
        self.alias("hour", "h");
        self.alias("hours", "h");
        self.alias("hr", "h");
        self.alias("day", "d");
        self.alias("days", "d");
        self.alias("weeks", "week");
        self.alias("year", "a");
        self.alias("years", "a");
    }

    fn register_temperature_units(&mut self) {
        let d = Dimension::TEMPERATURE;
        self.register(Unit::new("K", "kelvin", d, Number::from_i64(1)));
        self.register(Unit::with_offset(
            "°C",
            "degree Celsius",
            d,
            Number::one(),
            num("273.15"),
        ));
        // °F: K = F * 5/9 + 255.372...  (exactly 2298.35/9)
        self.register(Unit::with_offset(
            "°F",
            "degree Fahrenheit",
            d,
            num("5/9"),
            num("45967/180"),
        ));

        self.alias("kelvin", "K");
        self.alias("celsius", "°C");
        self.alias("C", "°C");
        self.alias("fahrenheit", "°F");
        self.alias("F", "°F");
    }

    fn register_area_volume_units(&mut self) {
        self.register(Unit::new("ha", "hectare", Dimension::AREA, Number::from_i64(10000)));
        self.register(Unit::new("acre", "acre", Dimension::AREA, num("4046.8564224")));

        let v = Dimension::VOLUME;
        self.register(Unit::new("L", "liter", v, num("0.001")));
        self.register(Unit::new("mL", "milliliter", v, num("0.000001")));
        self.register(Unit::new("gal", "US gallon", v, num("0.003785411784")));

        self.alias("hectare", "ha");
        self.alias("hectares", "ha");
        self.alias("acres", "acre");
        self.alias("l", "L");
        self.alias("liter", "L");
        self.alias("liters", "L");
        self.alias("litre", "L");
        self.alias("litres", "L");
        self.alias("ml", "mL");
        self.alias("gallon", "gal");
        self.alias("gallons", "gal");
    }

    fn register_velocity_units(&mut self) {
        let d = Dimension::VELOCITY;
        self.register(Unit::new("mps", "meter per second", d, Number::from_i64(1)));
        self.register(Unit::new("kph", "kilometer per hour", d, num("1000/3600")));
        self.register(Unit::new("mph", "mile per hour", d, num("0.44704")));
        self.register(Unit::new("knot", "knot", d, num("1852/3600")));

        self.alias("kmh", "kph");
        self.alias("knots", "knot");
    }

    fn register_energy_power_units(&mut self) {
        let e = Dimension::ENERGY;
        self.register(Unit::new("J", "joule", e, Number::from_i64(1)));
        self.register(Unit::new("kJ", "kilojoule", e, Number::from_i64(1000)));
        self.register(Unit::new("Wh", "watt hour", e, Number::from_i64(3600)));
        self.register(Unit::new("kWh", "kilowatt hour", e, Number::from_i64(3600000)));
        self.register(Unit::new("cal", "calorie", e, num("4.184")));
        self.register(Unit::new("kcal", "kilocalorie", e, Number::from_i64(4184)));
        self.register(Unit::new("eV", "electronvolt", e, num("1.602176634e-19")));

        let p = Dimension::POWER;
        self.register(Unit::new("W", "watt", p, Number::from_i64(1)));
        self.register(Unit::new("kW", "kilowatt", p, Number::from_i64(1000)));
        self.register(Unit::new("MW", "megawatt", p, Number::from_i64(1000000)));
        self.register(Unit::new("hp", "horsepower", p, num("745.69987158227022")));

        self.alias("joule", "J");
        self.alias("joules", "J");
        self.alias("calorie", "cal");
        self.alias("calories", "cal");
        self.alias("watt", "W");
        self.alias("watts", "W");
    }

    fn register_pressure_frequency_units(&mut self) {
        let p = Dimension::PRESSURE;
        self.register(Unit::new("Pa", "pascal", p, Number::from_i64(1)));
        self.register(Unit::new("kPa", "kilopascal", p, Number::from_i64(1000)));
        self.register(Unit::new("bar", "bar", p, Number::from_i64(100000)));
        self.register(Unit::new("atm", "atmosphere", p, Number::from_i64(101325)));
        self.register(Unit::new("psi", "pound per square inch", p, num("6894.757293168361")));

        let f = Dimension::FREQUENCY;
        self.register(Unit::new("Hz", "hertz", f, Number::from_i64(1)));
        self.register(Unit::new("kHz", "kilohertz", f, Number::from_i64(1000)));
        self.register(Unit::new("MHz", "megahertz", f, Number::from_i64(1000000)));
        self.register(Unit::new("GHz", "gigahertz", f, Number::from_i64(1000000000)));

        self.alias("pascal", "Pa");
        self.alias("hertz", "Hz");
    }

    fn register_angle_units(&mut self) {
        // Angles are dimensionless; factors convert to radians
        let d = Dimension::DIMENSIONLESS;
        self.register(Unit::new("rad", "radian", d, Number::one()));
        self.register(Unit::new(
            "deg",
            "degree",
            d,
            num("0.0174532925199432957692369076848861271344"),
        ));
        self.register(Unit::new(
            "grad",
            "gradian",
            d,
            num("0.0157079632679489661923132169163975144210"),
        ));

        self.alias("radian", "rad");
        self.alias("radians", "rad");
        self.alias("degree", "deg");
        self.alias("degrees", "deg");
        self.alias("°", "deg");
        self.alias("gradian", "grad");
        self.alias("gon", "grad");
    }

    fn register_data_units(&mut self) {
        // Data sizes carry the information dimension, counted in bits
        let d = Dimension::INFORMATION;
        self.register(Unit::new("bit", "bit", d, Number::one()));
        self.register(Unit::new("B", "byte", d, Number::from_i64(8)));
        self.register(Unit::new("KiB", "kibibyte", d, Number::from_i64(8 * 1024)));
        self.register(Unit::new("MiB", "mebibyte", d, Number::from_i64(8 * 1024 * 1024)));
        self.register(Unit::new(
            "GiB",
            "gibibyte",
            d,
            Number::from_i64(8 * 1024 * 1024 * 1024),
        ));

        self.alias("bits", "bit");
        self.alias("byte", "B");
        self.alias("bytes", "B");
    }
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn num(s: &str) -> Number {
    Number::parse(s).unwrap_or_else(|_| Number::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_symbol() {
        let m = UNITS.resolve("m").unwrap();
        assert_eq!(m.name, "meter");
    }

    #[test]
    fn test_resolve_by_alias() {
        let a = UNITS.resolve("meters").unwrap();
        let b = UNITS.resolve("m").unwrap();
        assert_eq!(a.symbol, b.symbol);
        assert!(UNITS.resolve("Feet").is_some());
    }

    #[test]
    fn test_unknown_unit() {
        assert!(UNITS.resolve("flurbs").is_none());
    }

    #[test]
    fn test_mile_to_km() {
        let mi = UNITS.resolve("mi").unwrap();
        let km = UNITS.resolve("km").unwrap();
        let v = mi.convert_to(&Number::one(), km).unwrap();
        assert!(v.eq_value(&Number::parse("1.609344").unwrap()));
    }

    #[test]
    fn test_degrees_to_radians() {
        let deg = UNITS.resolve("deg").unwrap();
        let rad = UNITS.resolve("rad").unwrap();
        assert!(UNITS.resolve("degrees").is_some());
        assert!(UNITS.resolve("grad").is_some());
        let v = deg.convert_to(&Number::from_i64(180), rad).unwrap();
        // 180 deg is pi radians, to the precision the factor carries
        let expected = Number::parse("3.141592653589793238462643383279502884192").unwrap();
        assert!(v.eq_value(&expected));
    }

    #[test]
    fn test_data_units_carry_information_dimension() {
        let byte = UNITS.resolve("B").unwrap();
        assert_eq!(byte.dimension, Dimension::INFORMATION);
        assert!(!byte.dimension.is_dimensionless());
        let bit = UNITS.resolve("bit").unwrap();
        let v = byte.convert_to(&Number::one(), bit).unwrap();
        assert!(v.eq_value(&Number::from_i64(8)));
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        let f = UNITS.resolve("°F").unwrap();
        let c = UNITS.resolve("°C").unwrap();
        let v = f.convert_to(&Number::from_i64(32), c).unwrap();
        assert!(v.is_zero());
    }
}
