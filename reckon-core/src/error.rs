//! Structured calculation errors
//!
//! Errors never abort a calculation. They are values that substitute for
//! the failed subexpression and carry a human-readable message which the
//! engine appends to the calculation's message list.

use crate::NumberError;
use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const SYNTAX_ERROR: &str = "SYNTAX_ERROR";
    pub const UNKNOWN_SYMBOL: &str = "UNKNOWN_SYMBOL";
    pub const DIMENSION_MISMATCH: &str = "DIMENSION_MISMATCH";
    pub const DOMAIN_ERROR: &str = "DOMAIN_ERROR";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const TIMEOUT: &str = "TIMEOUT";
    pub const INVALID_RATE: &str = "INVALID_RATE";
    pub const STALE_RATES: &str = "STALE_RATES";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const ARG_COUNT: &str = "ARG_COUNT";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level attached to a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note, result unaffected
    Info,
    /// Computation continued with a degraded result
    Warning,
    /// The enclosing subexpression failed
    Error,
}

impl Severity {
    /// Message prefix as the host expects it ("Error: ...")
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// An error value substituted into the result tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalcError {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Severity level
    pub severity: Severity,
}

impl CalcError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Render as a host-facing message line ("Error: division by zero")
    pub fn to_message(&self) -> String {
        format!("{}: {}", self.severity.prefix(), self.message)
    }

    // ========== Common Error Constructors ==========

    pub fn syntax(details: impl Into<String>) -> Self {
        Self::new(codes::SYNTAX_ERROR, details.into())
    }

    pub fn unknown_symbol(name: &str) -> Self {
        Self::new(
            codes::UNKNOWN_SYMBOL,
            format!("unknown symbol \"{}\"", name),
        )
    }

    pub fn dimension_mismatch(from: &str, to: &str) -> Self {
        Self::new(
            codes::DIMENSION_MISMATCH,
            format!("cannot convert {} to {}: incompatible dimensions", from, to),
        )
    }

    pub fn domain(details: impl Into<String>) -> Self {
        Self::new(codes::DOMAIN_ERROR, details.into())
    }

    pub fn div_zero() -> Self {
        Self::new(codes::DIV_ZERO, "division by zero")
    }

    pub fn timeout(elapsed_ms: u64) -> Self {
        Self::new(
            codes::TIMEOUT,
            format!("calculation aborted after {} ms, showing partial result", elapsed_ms),
        )
        .with_severity(Severity::Warning)
    }

    pub fn invalid_rate(name: &str, value: &str) -> Self {
        Self::new(
            codes::INVALID_RATE,
            format!("invalid exchange rate for {}: \"{}\"", name, value),
        )
    }

    pub fn stale_rates(age_days: u64) -> Self {
        Self::new(
            codes::STALE_RATES,
            format!(
                "exchange rates are {} days old and may be outdated",
                age_days
            ),
        )
        .with_severity(Severity::Warning)
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(
            codes::TYPE_ERROR,
            format!("expected {}, got {}", expected, got),
        )
    }

    pub fn arg_count(func: &str, expected: usize, got: usize) -> Self {
        Self::new(
            codes::ARG_COUNT,
            format!("{}() expects {} argument(s), got {}", func, expected, got),
        )
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("internal error: {}", details.into()))
    }
}

impl std::fmt::Display for CalcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for CalcError {}

impl From<NumberError> for CalcError {
    fn from(err: NumberError) -> Self {
        match err {
            NumberError::ParseError(s) => Self::syntax(format!("malformed number \"{}\"", s)),
            NumberError::DivisionByZero => Self::div_zero(),
            NumberError::DomainError(s) => Self::domain(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_prefixes() {
        assert_eq!(CalcError::div_zero().to_message(), "Error: division by zero");
        let w = CalcError::timeout(50);
        assert!(w.to_message().starts_with("Warning: "));
    }

    #[test]
    fn test_from_number_error() {
        let e: CalcError = NumberError::DivisionByZero.into();
        assert_eq!(e.code, codes::DIV_ZERO);
    }
}
