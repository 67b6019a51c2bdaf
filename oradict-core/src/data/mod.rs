mod value;
mod coerce;

pub use value::*;

pub use chrono;
pub use rust_decimal;
