//! Arbitrary-precision numerics for the umbra database: multi-word integers,
//! scaled decimals and the SQL `NUMERIC` value with `NaN` and infinities.

mod core;

pub use crate::core::numeric::{
    ops, BigInt, ByteWidth, Decimal, Numeric, NumericContext, NumericError, NumericState,
    RoundingMode,
};
pub use crate::core::Serialize;

pub type Result<T> = std::result::Result<T, NumericError>;
