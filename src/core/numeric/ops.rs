//! Arithmetic over [`Numeric`] values.
//!
//! Every function here is total over the four numeric states. Special
//! operands propagate as follows:
//!
//! | operation                  | special `a`  | special `b` only            |
//! |----------------------------|--------------|-----------------------------|
//! | `add`, `multiply`          | `a`'s state  | `b`'s state                 |
//! | `subtract`                 | `a`'s state  | `b`'s state, sign inverted  |
//! | `divide`, `remainder`      | `NaN`        | `NaN`                       |
//!
//! A finite division by zero is an error, a finite remainder by zero is
//! `NaN`. Sums, differences and quotients keep the larger operand
//! precision; products and remainders carry their own.
//!
//! Functions without a context argument use [`NumericContext::DEFAULT`].

use super::{
    decimal::ten_pow, BigInt, Decimal, Numeric, NumericContext, NumericError, NumericState,
};
use crate::Result;
use std::cmp::Ordering;
use tracing::trace;

/// Largest integral exponent raised exactly by [`pow`].
const MAX_EXACT_EXPONENT: i32 = 999;

fn special(state: NumericState) -> Numeric {
    match state {
        NumericState::NegativeInfinity => Numeric::NEGATIVE_INFINITY,
        NumericState::PositiveInfinity => Numeric::POSITIVE_INFINITY,
        NumericState::NaN => Numeric::NAN,
        NumericState::Finite => unreachable!("finite operands never reach propagation"),
    }
}

/// Result for a pair with at least one non-finite operand.
fn propagate(a: &Numeric, b: &Numeric, invert_b: bool) -> Numeric {
    let state = match (a.state(), b.state()) {
        (NumericState::Finite, NumericState::Finite) => {
            unreachable!("finite operands never reach propagation")
        }
        (NumericState::Finite, state) if invert_b => state.negate(),
        (NumericState::Finite, state) => state,
        (state, _) => state,
    };

    trace!(?state, "non-finite operand propagated");
    special(state)
}

fn wider(a: &Numeric, b: &Numeric) -> u32 {
    a.precision().max(b.precision())
}

pub fn add(a: &Numeric, b: &Numeric) -> Numeric {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(sum) = x.checked_add(y) {
            return Numeric::with_precision(Decimal::from(sum), wider(a, b));
        }
    }

    match (a.decimal(), b.decimal()) {
        (Some(x), Some(y)) => Numeric::with_precision(x.add(y), wider(a, b)),
        _ => propagate(a, b, false),
    }
}

pub fn subtract(a: &Numeric, b: &Numeric) -> Numeric {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(difference) = x.checked_sub(y) {
            return Numeric::with_precision(Decimal::from(difference), wider(a, b));
        }
    }

    match (a.decimal(), b.decimal()) {
        (Some(x), Some(y)) => Numeric::with_precision(x.subtract(y), wider(a, b)),
        _ => propagate(a, b, true),
    }
}

pub fn multiply(a: &Numeric, b: &Numeric) -> Numeric {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        if let Some(product) = x.checked_mul(y) {
            return Numeric::from(product);
        }
    }

    match (a.decimal(), b.decimal()) {
        (Some(x), Some(y)) => match x.multiply(y) {
            Ok(product) => Numeric::from(product),
            Err(err) => {
                trace!(%err, "product not representable");
                Numeric::NAN
            }
        },
        _ => propagate(a, b, false),
    }
}

/// Scale of a finite quotient.
///
/// At least `min_division_digits` (or the wider operand precision)
/// significant digits are produced, and never fewer fraction digits than
/// either operand has. `qweight` estimates how many digits the quotient has
/// left of the point.
fn division_scale(a: &Numeric, b: &Numeric, x: &Decimal, y: &Decimal, ctx: &NumericContext) -> u32 {
    let weight = |d: &Decimal| d.precision() as i64 - d.scale() as i64;
    let qweight = weight(x) - weight(y);
    let digits = wider(a, b).max(ctx.min_division_digits) as i64;

    let scale = (digits - qweight)
        .max(x.scale() as i64)
        .max(y.scale() as i64)
        .max(0);

    scale.min(ctx.max_division_scale as i64) as u32
}

pub fn divide(a: &Numeric, b: &Numeric) -> Result<Numeric> {
    divide_with(a, b, &NumericContext::DEFAULT)
}

pub fn divide_with(a: &Numeric, b: &Numeric, ctx: &NumericContext) -> Result<Numeric> {
    let (x, y) = match (a.decimal(), b.decimal()) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            trace!(a = %a, b = %b, "non-finite division operand");
            return Ok(Numeric::NAN);
        }
    };
    if y.is_zero() {
        return Err(NumericError::DivisionByZero);
    }

    let scale = division_scale(a, b, x, y, ctx);
    trace!(scale, rounding = %ctx.rounding, "numeric division");

    let quotient = x.divide(y, scale, ctx.rounding)?;
    Ok(Numeric::with_precision(quotient, wider(a, b)))
}

/// Truncating remainder with the sign of `a`. Never fails: a zero divisor
/// or a special operand gives `NaN`.
pub fn remainder(a: &Numeric, b: &Numeric) -> Numeric {
    match (a.decimal(), b.decimal()) {
        (Some(x), Some(y)) if !y.is_zero() => x
            .remainder(y)
            .map_or(Numeric::NAN, Numeric::from),
        _ => Numeric::NAN,
    }
}

pub fn negate(value: &Numeric) -> Numeric {
    match value.decimal() {
        Some(decimal) => Numeric::with_precision(decimal.negate(), value.precision()),
        None => special(value.state().negate()),
    }
}

pub fn abs(value: &Numeric) -> Numeric {
    match (value.decimal(), value.state()) {
        (Some(decimal), _) => Numeric::with_precision(decimal.abs(), value.precision()),
        (None, NumericState::NegativeInfinity) => Numeric::POSITIVE_INFINITY,
        (None, state) => special(state),
    }
}

/// `-1`, `0` or `1`. Infinities have a sign, `NaN` stays `NaN`.
pub fn signum(value: &Numeric) -> Numeric {
    match (value.decimal(), value.state()) {
        (Some(decimal), _) => Numeric::from(decimal.signum()),
        (None, NumericState::NegativeInfinity) => Numeric::from(-1),
        (None, NumericState::PositiveInfinity) => Numeric::from(1),
        _ => Numeric::NAN,
    }
}

/// The total order of [`Numeric::total_cmp`].
pub fn compare(a: &Numeric, b: &Numeric) -> Ordering {
    a.total_cmp(b)
}

pub fn round(value: &Numeric, places: i32) -> Result<Numeric> {
    round_with(value, places, &NumericContext::DEFAULT)
}

/// Rounds to `places` digits after the point. Negative places round to
/// tens, hundreds and so on. `places` is limited to [`Decimal::MAX_SHIFT`]
/// either way.
pub fn round_with(value: &Numeric, places: i32, ctx: &NumericContext) -> Result<Numeric> {
    let Some(decimal) = value.decimal() else {
        return Ok(value.clone());
    };
    if places.unsigned_abs() > Decimal::MAX_SHIFT {
        return Err(NumericError::OutOfRange(format!(
            "cannot round to {places} places"
        )));
    }

    let rounded = match u32::try_from(places) {
        Ok(scale) => decimal.set_scale(scale, ctx.rounding)?,
        Err(_) => {
            let unit = Decimal::from(ten_pow(places.unsigned_abs()));
            decimal.divide(&unit, 0, ctx.rounding)?.multiply(&unit)?
        }
    };

    Ok(Numeric::from(rounded))
}

pub fn pow(base: &Numeric, exponent: &Numeric) -> Result<Numeric> {
    pow_with(base, exponent, &NumericContext::DEFAULT)
}

/// Integral exponents up to 999 in magnitude are exact, a negative one
/// divides one by the power. Everything else goes through `f64`.
pub fn pow_with(base: &Numeric, exponent: &Numeric, ctx: &NumericContext) -> Result<Numeric> {
    let integral = exponent
        .decimal()
        .filter(|d| d.is_integral())
        .and_then(|d| d.to_big_int().to_i32())
        .filter(|n| n.unsigned_abs() <= MAX_EXACT_EXPONENT as u32);

    match (base.decimal(), integral) {
        (Some(b), Some(n)) if n >= 0 => Ok(Numeric::from(b.pow(n as u32)?)),
        (Some(b), Some(n)) => {
            let power = Numeric::from(b.pow(n.unsigned_abs())?);
            divide_with(&Numeric::from(Decimal::one()), &power, ctx)
        }
        _ => Ok(rewrap(base.to_f64_lossy().powf(exponent.to_f64_lossy()), ctx)),
    }
}

/// Brings a native result back, keeping `ctx.double_precision` significant
/// digits.
fn rewrap(result: f64, ctx: &NumericContext) -> Numeric {
    if !result.is_finite() {
        trace!(result, "native result is not finite");
        return Numeric::from(result);
    }

    match Decimal::try_from(result) {
        Ok(exact) => {
            let rounded = exact
                .round_to_precision(ctx.double_precision, ctx.rounding)
                .unwrap_or(exact);
            Numeric::from(rounded.strip_trailing_zeros())
        }
        Err(_) => Numeric::NAN,
    }
}

/// Applies a native function to `value`. Special inputs and results map to
/// and from their `f64` counterparts.
pub fn apply_f64(value: &Numeric, ctx: &NumericContext, f: impl Fn(f64) -> f64) -> Numeric {
    rewrap(f(value.to_f64_lossy()), ctx)
}

macro_rules! native_fn {
    ($($name:ident => $f:expr),+ $(,)?) => {
        $(
            pub fn $name(value: &Numeric) -> Numeric {
                apply_f64(value, &NumericContext::DEFAULT, $f)
            }
        )+
    };
}

native_fn! {
    sqrt => f64::sqrt,
    ln => f64::ln,
    log10 => f64::log10,
    exp => f64::exp,
    sin => f64::sin,
    cos => f64::cos,
    tan => f64::tan,
    asin => f64::asin,
    acos => f64::acos,
    atan => f64::atan,
    sinh => f64::sinh,
    cosh => f64::cosh,
    tanh => f64::tanh,
}

/// Logarithm of `value` in `base`.
pub fn log(base: &Numeric, value: &Numeric) -> Numeric {
    rewrap(value.to_f64_lossy().ln() / base.to_f64_lossy().ln(), &NumericContext::DEFAULT)
}

fn integral(value: &Numeric) -> Option<&BigInt> {
    value
        .decimal()
        .filter(|d| d.scale() == 0)
        .map(Decimal::unscaled)
}

fn bitwise(
    a: &Numeric,
    b: &Numeric,
    op: impl Fn(&BigInt, &BigInt) -> BigInt,
) -> Numeric {
    match (integral(a), integral(b)) {
        (Some(x), Some(y)) => Numeric::from(op(x, y)),
        _ => Numeric::NAN,
    }
}

/// Bitwise operators take scale-zero operands. `4.0` or a special value
/// gives `NaN`.
pub fn and(a: &Numeric, b: &Numeric) -> Numeric {
    bitwise(a, b, |x, y| x.and(y))
}

pub fn or(a: &Numeric, b: &Numeric) -> Numeric {
    bitwise(a, b, |x, y| x.or(y))
}

pub fn xor(a: &Numeric, b: &Numeric) -> Numeric {
    bitwise(a, b, |x, y| x.xor(y))
}

pub fn not(value: &Numeric) -> Numeric {
    integral(value).map_or(Numeric::NAN, |x| Numeric::from(x.not()))
}

pub fn shift_left(value: &Numeric, count: i32) -> Numeric {
    integral(value).map_or(Numeric::NAN, |x| Numeric::from(x.shift_left(count)))
}

pub fn shift_right(value: &Numeric, count: i32) -> Numeric {
    integral(value).map_or(Numeric::NAN, |x| Numeric::from(x.shift_right(count)))
}

macro_rules! numeric_binop {
    ($($trait:ident, $method:ident => $op:path);+ $(;)?) => {
        $(
            impl std::ops::$trait<&Numeric> for &Numeric {
                type Output = Numeric;

                fn $method(self, rhs: &Numeric) -> Numeric {
                    $op(self, rhs)
                }
            }

            impl std::ops::$trait for Numeric {
                type Output = Numeric;

                fn $method(self, rhs: Numeric) -> Numeric {
                    $op(&self, &rhs)
                }
            }
        )+
    };
}

numeric_binop! {
    Add, add => add;
    Sub, sub => subtract;
    Mul, mul => multiply;
    Rem, rem => remainder;
}

impl std::ops::Neg for &Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        negate(self)
    }
}

impl std::ops::Neg for Numeric {
    type Output = Numeric;

    fn neg(self) -> Numeric {
        negate(&self)
    }
}
