//! Arbitrary-precision numeric core.
//!
//! Layers, from the bottom up:
//!
//! - [`mpn`]: stateless routines over little-endian word slices.
//! - [`BigInt`]: signed two's-complement integers of any size.
//! - [`Decimal`]: a [`BigInt`] with a non-negative base-10 scale.
//! - [`Numeric`]: the SQL-facing value which adds `NaN` and both infinities.
//! - [`ops`]: the dispatcher the rest of the engine calls. It applies the
//!   special-state propagation rules and the precision policy before
//!   delegating to [`Decimal`].
//!
//! Every value is immutable once built.

/// Implements a binary operator trait for owned operands and references,
/// forwarding to an inherent `fn(&self, &Self) -> Self`.
macro_rules! forward_binop {
    ($ty:ident, $trait:ident, $method:ident, $inherent:ident) => {
        impl std::ops::$trait<&$ty> for &$ty {
            type Output = $ty;

            fn $method(self, rhs: &$ty) -> $ty {
                $ty::$inherent(self, rhs)
            }
        }

        impl std::ops::$trait for $ty {
            type Output = $ty;

            fn $method(self, rhs: $ty) -> $ty {
                $ty::$inherent(&self, &rhs)
            }
        }
    };
}

mod bits;
mod context;
mod decimal;
mod error;
mod integer;
mod modular;
pub(crate) mod mpn;
pub mod ops;
mod rounding;
mod value;

pub use context::NumericContext;
pub use decimal::Decimal;
pub use error::NumericError;
pub use integer::BigInt;
pub use rounding::RoundingMode;
pub use value::{ByteWidth, Numeric, NumericState};
