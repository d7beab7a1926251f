//! Configuration registry
//!
//! Named settings that modulate parsing, evaluation, and formatting.
//! Options are changed exclusively through `set_option`-style command
//! strings ("angle degrees", "limit implicit multiplication off"); a
//! command either validates and applies atomically or leaves the settings
//! untouched.

use reckon_core::DEFAULT_PRECISION;
use serde::{Deserialize, Serialize};

/// Interpretation of bare numbers passed to trigonometric functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    Radians,
    Degrees,
    Gradians,
}

/// Session-wide settings with their defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Angle unit for trig functions
    pub angle: AngleUnit,
    /// Numeric base for parsing literals (2..=36)
    pub base: u32,
    /// Working precision for approximations, in decimal digits
    pub precision: usize,
    /// Significant digits shown for approximate results
    pub digits: u32,
    /// Hard cap on decimals in rendered output; None = no cap
    pub max_decimals: Option<u32>,
    /// Whether operations may produce complex results; off restricts the
    /// domain to reals and turns e.g. sqrt(-1) into an error
    pub complex_enabled: bool,
    /// Restrict implicit multiplication to number-times-symbol forms
    pub limit_implicit_mult: bool,
    /// Whether unknown symbols stay symbolic instead of erroring
    pub unknowns_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            angle: AngleUnit::Radians,
            base: 10,
            precision: DEFAULT_PRECISION,
            digits: 10,
            max_decimals: None,
            complex_enabled: true,
            limit_implicit_mult: false,
            unknowns_enabled: false,
        }
    }
}

impl Settings {
    /// Apply a `"<name> <value>"` command. Option names may span several
    /// tokens; the longest registered name matching a prefix of the
    /// command wins and the remaining tokens form the value. Returns false
    /// (and changes nothing) for unknown names or invalid values.
    pub fn apply_option(&mut self, command: &str) -> bool {
        let tokens: Vec<&str> = command.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }

        // Longest-name match first so "limit implicit multiplication"
        // shadows a hypothetical "limit"
        for (name, apply) in OPTIONS {
            let name_tokens: Vec<&str> = name.split(' ').collect();
            if tokens.len() > name_tokens.len()
                && tokens[..name_tokens.len()]
                    .iter()
                    .zip(&name_tokens)
                    .all(|(a, b)| a.eq_ignore_ascii_case(b))
            {
                let value = tokens[name_tokens.len()..].join(" ");
                return apply(self, &value);
            }
        }
        false
    }
}

type OptionApply = fn(&mut Settings, &str) -> bool;

/// Registered options, longest names first
const OPTIONS: &[(&str, OptionApply)] = &[
    ("limit implicit multiplication", apply_limit_implicit),
    ("max decimals", apply_max_decimals),
    ("unknowns", apply_unknowns),
    ("precision", apply_precision),
    ("complex", apply_complex),
    ("digits", apply_digits),
    ("angle", apply_angle),
    ("base", apply_base),
];

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "yes" | "true" | "1" => Some(true),
        "off" | "no" | "false" | "0" => Some(false),
        _ => None,
    }
}

fn apply_angle(s: &mut Settings, value: &str) -> bool {
    // Numeric shorthands accepted alongside the keywords
    let angle = match value.to_lowercase().as_str() {
        "radians" | "radian" | "rad" | "1" => AngleUnit::Radians,
        "degrees" | "degree" | "deg" | "2" => AngleUnit::Degrees,
        "gradians" | "gradian" | "gra" | "3" => AngleUnit::Gradians,
        _ => return false,
    };
    s.angle = angle;
    true
}

fn apply_base(s: &mut Settings, value: &str) -> bool {
    match value.parse::<u32>() {
        Ok(b) if (2..=36).contains(&b) => {
            s.base = b;
            true
        }
        _ => false,
    }
}

fn apply_precision(s: &mut Settings, value: &str) -> bool {
    match value.parse::<usize>() {
        Ok(p) if (2..=1000).contains(&p) => {
            s.precision = p;
            true
        }
        _ => false,
    }
}

fn apply_digits(s: &mut Settings, value: &str) -> bool {
    match value.parse::<u32>() {
        Ok(d) if (2..=50).contains(&d) => {
            s.digits = d;
            true
        }
        _ => false,
    }
}

fn apply_max_decimals(s: &mut Settings, value: &str) -> bool {
    if value.eq_ignore_ascii_case("off") {
        s.max_decimals = None;
        return true;
    }
    match value.parse::<u32>() {
        Ok(d) if d <= 100 => {
            s.max_decimals = Some(d);
            true
        }
        _ => false,
    }
}

fn apply_complex(s: &mut Settings, value: &str) -> bool {
    match parse_bool(value) {
        Some(b) => {
            s.complex_enabled = b;
            true
        }
        None => false,
    }
}

fn apply_limit_implicit(s: &mut Settings, value: &str) -> bool {
    match parse_bool(value) {
        Some(b) => {
            s.limit_implicit_mult = b;
            true
        }
        None => false,
    }
}

fn apply_unknowns(s: &mut Settings, value: &str) -> bool {
    match parse_bool(value) {
        Some(b) => {
            s.unknowns_enabled = b;
            true
        }
        None => false,
    }
}
