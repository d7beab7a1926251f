//! Reckon Core - fundamental types
//!
//! This crate provides the types the rest of the engine builds on:
//! - `Number`: exact rational / arbitrary-precision approximate numbers
//! - `CalcError`: structured errors that propagate as values
//! - `Clock`: injectable monotonic time source for cooperative timeouts

mod clock;
mod error;
mod number;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{codes, CalcError, Severity};
pub use number::{Number, NumberError, DEFAULT_PRECISION};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{CalcError, Clock, Number, NumberError, Severity};
}
