//! Reckon Units - unit and currency registry
//!
//! Physical units with dimensional analysis over an 8-dimension exponent
//! vector (the eighth dimension being currency), a built-in unit catalog
//! with aliases, and an atomically replaceable exchange-rate table.

mod currency;
mod dimension;
mod quantity;
mod registry;
mod unit;

pub use currency::{ExchangeRate, ExchangeRateTable, BASE_CURRENCY, STALE_AFTER_MS};
pub use dimension::{Dimension, DIMENSION_COUNT};
pub use quantity::Quantity;
pub use registry::{UnitRegistry, UNITS};
pub use unit::Unit;
