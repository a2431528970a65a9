pub mod calendar;
pub mod engine;
pub mod error;
pub mod store;

/// Fixed annual allowance per leave type, independent of the type mix.
pub const LEAVES_PER_YEAR: i64 = 12;
