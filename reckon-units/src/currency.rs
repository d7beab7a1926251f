//! Exchange-rate table
//!
//! Currencies form their own dimension. All rates are stored relative to a
//! single fixed base currency (EUR), as the host supplies them: a rate of
//! 1.2345 for USD means 1 EUR = 1.2345 USD. Updates replace the whole
//! table atomically; partial updates are never observable. The table keeps
//! its last-update timestamp so the engine can warn on stale rates at the
//! next calculation that touches a currency.

use crate::{Dimension, Unit};
use reckon_core::{codes, CalcError, Number};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The single supported base currency
pub const BASE_CURRENCY: &str = "EUR";

/// Rates older than this trigger a staleness warning (7 days)
pub const STALE_AFTER_MS: u64 = 7 * 24 * 60 * 60 * 1000;

/// One externally supplied rate, relative to the base currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub name: String,
    pub value: String,
}

/// Immutable snapshot of all known exchange rates
#[derive(Debug, Clone, Default)]
pub struct ExchangeRateTable {
    /// currency code -> units of that currency per 1 EUR
    rates: BTreeMap<String, Number>,
    /// When the table was last replaced, in clock milliseconds; None until
    /// the first successful update
    updated_at_ms: Option<u64>,
    /// Whether the updater asked for staleness warnings
    warn_when_stale: bool,
}

impl ExchangeRateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and build a replacement table. Rejects the whole update
    /// (leaving the previous table in place) if `rates` is empty or any
    /// entry fails to parse as a positive number.
    pub fn build(
        rates: &[ExchangeRate],
        now_ms: u64,
        warn_when_stale: bool,
    ) -> Result<Self, CalcError> {
        if rates.is_empty() {
            return Err(CalcError::new(
                codes::INVALID_RATE,
                "empty exchange rate list",
            ));
        }
        let mut table = BTreeMap::new();
        for rate in rates {
            let value = Number::parse(&rate.value)
                .ok()
                .filter(|v| !v.is_zero() && !v.is_negative())
                .ok_or_else(|| CalcError::invalid_rate(&rate.name, &rate.value))?;
            table.insert(rate.name.clone(), value);
        }
        Ok(Self {
            rates: table,
            updated_at_ms: Some(now_ms),
            warn_when_stale,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn updated_at_ms(&self) -> Option<u64> {
        self.updated_at_ms
    }

    /// True if warnings were requested and the table is older than the
    /// staleness threshold (or was never filled)
    pub fn is_stale(&self, now_ms: u64) -> bool {
        if !self.warn_when_stale {
            return false;
        }
        match self.updated_at_ms {
            Some(t) => now_ms.saturating_sub(t) > STALE_AFTER_MS,
            None => true,
        }
    }

    /// Stop warning about this table's age; armed again by the next
    /// update that asks for warnings
    pub fn disarm_stale_warning(&mut self) {
        self.warn_when_stale = false;
    }

    /// Known currency codes, base currency included
    pub fn codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.rates.keys().cloned().collect();
        if !codes.iter().any(|c| c == BASE_CURRENCY) {
            codes.push(BASE_CURRENCY.to_string());
        }
        codes
    }

    /// Materialize a currency unit. The base unit of the currency dimension
    /// is EUR (factor 1); other codes convert with factor 1/rate since the
    /// stored rate counts target units per EUR.
    pub fn resolve(&self, code: &str) -> Option<Unit> {
        if code == BASE_CURRENCY {
            return Some(Unit::new(
                BASE_CURRENCY,
                "euro",
                Dimension::CURRENCY,
                Number::one(),
            ));
        }
        let rate = self.rates.get(code)?;
        let factor = Number::one().checked_div(rate).ok()?;
        Some(Unit::new(code, code, Dimension::CURRENCY, factor))
    }
}
