//! The SQL-facing numeric value.
//!
//! A [`Numeric`] is a finite [`Decimal`] or one of `NaN`, `+Infinity` and
//! `-Infinity`. Finite values at scale zero also keep their value as a native
//! `i64` when it fits, which short-circuits comparisons and casts.

use super::{integer::BigInt, Decimal, NumericError, RoundingMode};
use crate::{core::Serialize, Result};
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    hash::{Hash, Hasher},
    str::FromStr,
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumericState {
    /// An ordinary decimal value.
    Finite,
    NegativeInfinity,
    PositiveInfinity,
    NaN,
}

impl NumericState {
    /// Position in the total order of values. Every finite value shares
    /// rank one and is ordered by its decimal within it.
    const fn rank(self) -> u8 {
        match self {
            Self::NegativeInfinity => 0,
            Self::Finite => 1,
            Self::PositiveInfinity => 2,
            Self::NaN => 3,
        }
    }

    /// State of the negated value.
    pub const fn negate(self) -> Self {
        match self {
            Self::NegativeInfinity => Self::PositiveInfinity,
            Self::PositiveInfinity => Self::NegativeInfinity,
            state => state,
        }
    }
}

/// Smallest native integer holding a scale-zero value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteWidth {
    Fits32,
    Fits64,
    Big,
}

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Numeric(Repr);

#[derive(Clone, PartialEq, Eq, Hash)]
enum Repr {
    Finite(Finite),
    NegativeInfinity,
    PositiveInfinity,
    NaN,
}

#[derive(Clone)]
struct Finite {
    decimal: Decimal,
    precision: u32,
    /// Only computed at scale zero.
    native: Option<i64>,
    width: Option<ByteWidth>,
}

// precision and the cached fields are derived data, equality is the decimal's
impl PartialEq for Finite {
    fn eq(&self, other: &Self) -> bool {
        self.decimal == other.decimal
    }
}

impl Eq for Finite {}

impl Hash for Finite {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.decimal.hash(state);
    }
}

const HEADER_LEN: usize = 8;

/// Largest tracked precision, bounded like the scale by the `i32` header.
const MAX_PRECISION: u32 = i32::MAX as u32;

impl Numeric {
    pub const NAN: Self = Self(Repr::NaN);
    pub const POSITIVE_INFINITY: Self = Self(Repr::PositiveInfinity);
    pub const NEGATIVE_INFINITY: Self = Self(Repr::NegativeInfinity);

    pub fn zero() -> Self {
        Self::from(Decimal::zero())
    }

    /// Wraps `decimal`, tracking at least `precision` significant digits.
    /// Precision beyond `i32::MAX` is clamped.
    pub fn with_precision(decimal: Decimal, precision: u32) -> Self {
        let precision = precision.max(decimal.precision()).min(MAX_PRECISION);
        let native = match decimal.scale() {
            0 => decimal.unscaled().to_i64(),
            _ => None,
        };
        let width = match (decimal.scale(), native) {
            (0, Some(value)) if i32::try_from(value).is_ok() => Some(ByteWidth::Fits32),
            (0, Some(_)) => Some(ByteWidth::Fits64),
            (0, None) => Some(ByteWidth::Big),
            _ => None,
        };

        Self(Repr::Finite(Finite {
            decimal,
            precision,
            native,
            width,
        }))
    }

    pub fn from_state(state: NumericState) -> Option<Self> {
        match state {
            NumericState::Finite => None,
            NumericState::NegativeInfinity => Some(Self::NEGATIVE_INFINITY),
            NumericState::PositiveInfinity => Some(Self::POSITIVE_INFINITY),
            NumericState::NaN => Some(Self::NAN),
        }
    }

    pub fn state(&self) -> NumericState {
        match self.0 {
            Repr::Finite(_) => NumericState::Finite,
            Repr::NegativeInfinity => NumericState::NegativeInfinity,
            Repr::PositiveInfinity => NumericState::PositiveInfinity,
            Repr::NaN => NumericState::NaN,
        }
    }

    pub fn decimal(&self) -> Option<&Decimal> {
        match &self.0 {
            Repr::Finite(finite) => Some(&finite.decimal),
            _ => None,
        }
    }

    pub fn into_decimal(self) -> Option<Decimal> {
        match self.0 {
            Repr::Finite(finite) => Some(finite.decimal),
            _ => None,
        }
    }

    /// Tracked significant digits, zero for non-finite values.
    pub fn precision(&self) -> u32 {
        match &self.0 {
            Repr::Finite(finite) => finite.precision,
            _ => 0,
        }
    }

    /// Zero for non-finite values.
    pub fn scale(&self) -> u32 {
        self.decimal().map_or(0, Decimal::scale)
    }

    /// Native width of a scale-zero value.
    pub fn byte_width(&self) -> Option<ByteWidth> {
        match &self.0 {
            Repr::Finite(finite) => finite.width,
            _ => None,
        }
    }

    /// The value as an `i64` when it is one at scale zero.
    pub fn as_i64(&self) -> Option<i64> {
        match &self.0 {
            Repr::Finite(finite) => finite.native,
            _ => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self.0, Repr::Finite(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self.0, Repr::NaN)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self.0, Repr::PositiveInfinity | Repr::NegativeInfinity)
    }

    pub fn is_zero(&self) -> bool {
        self.decimal().is_some_and(Decimal::is_zero)
    }

    /// Total order over every value:
    /// `-Infinity < finite < +Infinity < NaN`, with finite values compared
    /// numerically and `NaN` equal to itself.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Repr::Finite(a), Repr::Finite(b)) => match (a.native, b.native) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => a.decimal.compare(&b.decimal),
            },
            _ => self.state().rank().cmp(&other.state().rank()),
        }
    }

    /// Equal under [`Numeric::total_cmp`], so `1.5` matches `1.50`.
    pub fn is_numerically_equal(&self, other: &Self) -> bool {
        self.total_cmp(other) == Ordering::Equal
    }

    /// `0` is false and `1` is true, at any scale.
    pub fn to_bool(&self) -> Result<bool> {
        if let Some(value) = self.as_i64() {
            return match value {
                0 => Ok(false),
                1 => Ok(true),
                _ => Err(NumericError::InvalidCast(format!("{self} is not a boolean"))),
            };
        }

        match self.decimal() {
            Some(d) if d.compare(&Decimal::zero()) == Ordering::Equal => Ok(false),
            Some(d) if d.compare(&Decimal::one()) == Ordering::Equal => Ok(true),
            _ => Err(NumericError::InvalidCast(format!("{self} is not a boolean"))),
        }
    }

    /// Nearest `f64`. A finite value beyond the `f64` range fails instead of
    /// turning into an infinity, non-finite values map to their counterparts.
    pub fn to_f64(&self) -> Result<f64> {
        let value = self.to_f64_lossy();
        match self.is_finite() && !value.is_finite() {
            true => Err(NumericError::InvalidCast(format!("{self} overflows a double"))),
            _ => Ok(value),
        }
    }

    /// Like [`Numeric::to_f64`], with out of range values becoming infinite.
    pub(super) fn to_f64_lossy(&self) -> f64 {
        match &self.0 {
            Repr::Finite(finite) => match finite.native {
                Some(value) => value as f64,
                None => finite.decimal.to_f64(),
            },
            Repr::NegativeInfinity => f64::NEG_INFINITY,
            Repr::PositiveInfinity => f64::INFINITY,
            Repr::NaN => f64::NAN,
        }
    }

    /// Nearest `f32`, failing like [`Numeric::to_f64`] beyond the `f32`
    /// range.
    pub fn to_f32(&self) -> Result<f32> {
        match &self.0 {
            Repr::Finite(finite) => {
                let value: f32 = finite.decimal.to_string().parse().map_err(|_| {
                    NumericError::InvalidCast(format!("{self} is not a real"))
                })?;
                match value.is_finite() {
                    true => Ok(value),
                    _ => Err(NumericError::InvalidCast(format!("{self} overflows a real"))),
                }
            }
            Repr::NegativeInfinity => Ok(f32::NEG_INFINITY),
            Repr::PositiveInfinity => Ok(f32::INFINITY),
            Repr::NaN => Ok(f32::NAN),
        }
    }

    /// The value rounded to `scale` digits after the point.
    pub fn rescale(&self, scale: u32, mode: RoundingMode) -> Result<Self> {
        match self.decimal() {
            Some(decimal) => decimal.set_scale(scale, mode).map(Self::from),
            None => Ok(self.clone()),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buff = Vec::new();
        self.serialize(&mut buff);
        buff
    }

    /// Inverse of [`Serialize::serialize`] for finite values.
    pub fn from_serialized_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() <= HEADER_LEN {
            debug!(len = bytes.len(), "numeric payload too short");
            return Err(NumericError::Format(format!(
                "numeric payload needs more than {HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let (header, unscaled) = bytes.split_at(HEADER_LEN);
        let field = |at: usize| {
            i32::from_le_bytes([header[at], header[at + 1], header[at + 2], header[at + 3]])
        };
        let (precision, scale) = (field(0), field(4));

        match (u32::try_from(precision), u32::try_from(scale)) {
            (Ok(precision), Ok(scale)) => Ok(Self::with_precision(
                Decimal::from_parts(BigInt::from_bytes_be(unscaled), scale),
                precision,
            )),
            _ => {
                debug!(precision, scale, "numeric header out of range");
                Err(NumericError::Format(format!(
                    "invalid numeric header: precision {precision}, scale {scale}"
                )))
            }
        }
    }
}

impl Serialize for Numeric {
    /// `[precision: i32 LE][scale: i32 LE][unscaled: big-endian two's
    /// complement]`. Non-finite values write nothing, their state travels
    /// outside this payload.
    fn serialize(&self, buff: &mut Vec<u8>) {
        if let Repr::Finite(finite) = &self.0 {
            // both fields are capped at i32::MAX on construction
            let precision = i32::try_from(finite.precision).unwrap_or(i32::MAX);
            let scale = i32::try_from(finite.decimal.scale()).unwrap_or(i32::MAX);
            buff.extend_from_slice(&precision.to_le_bytes());
            buff.extend_from_slice(&scale.to_le_bytes());
            buff.extend_from_slice(&finite.decimal.unscaled().to_bytes_be());
        }
    }
}

impl TryFrom<&[u8]> for Numeric {
    type Error = NumericError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::from_serialized_bytes(bytes)
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<Decimal> for Numeric {
    fn from(decimal: Decimal) -> Self {
        Self::with_precision(decimal, 0)
    }
}

impl From<BigInt> for Numeric {
    fn from(value: BigInt) -> Self {
        Self::from(Decimal::from(value))
    }
}

impl From<bool> for Numeric {
    fn from(value: bool) -> Self {
        Self::from(value as i64)
    }
}

/// `NaN` and the infinities keep their state; finite doubles convert exactly.
impl From<f64> for Numeric {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            return Self::NAN;
        }
        if value.is_infinite() {
            return match value.is_sign_positive() {
                true => Self::POSITIVE_INFINITY,
                _ => Self::NEGATIVE_INFINITY,
            };
        }

        Decimal::try_from(value).map_or(Self::NAN, Self::from)
    }
}

impl From<f32> for Numeric {
    fn from(value: f32) -> Self {
        Self::from(f64::from(value))
    }
}

impl TryFrom<&Numeric> for f64 {
    type Error = NumericError;

    fn try_from(value: &Numeric) -> Result<f64> {
        value.to_f64()
    }
}

impl TryFrom<&Numeric> for f32 {
    type Error = NumericError;

    fn try_from(value: &Numeric) -> Result<f32> {
        value.to_f32()
    }
}

macro_rules! native_integer {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Numeric {
                fn from(value: $ty) -> Self {
                    Self::from(BigInt::from(i128::from(value)))
                }
            }

            /// Truncates toward zero. Out of range and non-finite values fail.
            impl TryFrom<&Numeric> for $ty {
                type Error = NumericError;

                fn try_from(value: &Numeric) -> Result<$ty> {
                    let integral = match (value.as_i64(), value.decimal()) {
                        (Some(native), _) => Some(i128::from(native)),
                        (None, Some(decimal)) => decimal.to_big_int().to_i128(),
                        _ => None,
                    };

                    integral
                        .and_then(|v| <$ty>::try_from(v).ok())
                        .ok_or_else(|| {
                            NumericError::InvalidCast(format!(
                                "{value} out of range for {}",
                                stringify!($ty)
                            ))
                        })
                }
            }
        )+
    };
}

native_integer!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Finite(finite) => Display::fmt(&finite.decimal, f),
            Repr::NegativeInfinity => f.write_str("-Infinity"),
            Repr::PositiveInfinity => f.write_str("Infinity"),
            Repr::NaN => f.write_str("NaN"),
        }
    }
}

impl Debug for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Numeric({self})")
    }
}

impl FromStr for Numeric {
    type Err = NumericError;

    /// Decimal literals plus `NaN`, `Infinity`, `+Infinity` and `-Infinity`
    /// in any case. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();

        match s.to_ascii_lowercase().as_str() {
            "nan" => Ok(Self::NAN),
            "infinity" | "+infinity" => Ok(Self::POSITIVE_INFINITY),
            "-infinity" => Ok(Self::NEGATIVE_INFINITY),
            _ => Decimal::from_str(s).map(Self::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Numeric {
        s.parse().unwrap()
    }

    #[test]
    fn total_order_across_states() {
        let mut values = vec![
            Numeric::NAN,
            num("1e100"),
            Numeric::POSITIVE_INFINITY,
            num("-1e100"),
            Numeric::zero(),
            Numeric::NEGATIVE_INFINITY,
            num("0.5"),
        ];
        values.sort_by(Numeric::total_cmp);

        let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered[0], "-Infinity");
        assert_eq!(rendered[3], "0.5");
        assert_eq!(rendered[5], "Infinity");
        assert_eq!(rendered[6], "NaN");

        assert_eq!(Numeric::NAN.total_cmp(&Numeric::NAN), Ordering::Equal);
        assert_eq!(
            Numeric::NEGATIVE_INFINITY.total_cmp(&Numeric::POSITIVE_INFINITY),
            Ordering::Less
        );
        assert_eq!(num("-2").total_cmp(&num("-1.5")), Ordering::Less);
    }

    #[test]
    fn equality_sees_scale() {
        assert_ne!(num("1.5"), num("1.50"));
        assert!(num("1.5").is_numerically_equal(&num("1.50")));
        assert_eq!(Numeric::NAN, Numeric::NAN);
        assert_ne!(Numeric::POSITIVE_INFINITY, Numeric::NEGATIVE_INFINITY);

        // precision is tracked but does not take part in equality
        let wide = Numeric::with_precision(Decimal::from(7), 10);
        assert_eq!(wide.precision(), 10);
        assert_eq!(wide, Numeric::from(7));
    }

    #[test]
    fn native_fast_path() {
        assert_eq!(Numeric::from(42).as_i64(), Some(42));
        assert_eq!(Numeric::from(42).byte_width(), Some(ByteWidth::Fits32));
        assert_eq!(Numeric::from(1i64 << 40).byte_width(), Some(ByteWidth::Fits64));
        assert_eq!(num("18446744073709551616").byte_width(), Some(ByteWidth::Big));
        assert_eq!(num("18446744073709551616").as_i64(), None);
        assert_eq!(num("1.5").byte_width(), None);
        assert_eq!(num("4.0").as_i64(), None);
        assert_eq!(Numeric::NAN.byte_width(), None);
    }

    #[test]
    fn boolean_casts() {
        assert_eq!(Numeric::from(0).to_bool(), Ok(false));
        assert_eq!(Numeric::from(1).to_bool(), Ok(true));
        assert_eq!(num("1.00").to_bool(), Ok(true));
        assert_eq!(Numeric::from(true), Numeric::from(1));
        assert!(matches!(Numeric::from(2).to_bool(), Err(NumericError::InvalidCast(_))));
        assert!(matches!(num("0.5").to_bool(), Err(NumericError::InvalidCast(_))));
        assert!(matches!(Numeric::NAN.to_bool(), Err(NumericError::InvalidCast(_))));
    }

    #[test]
    fn integer_casts() {
        assert_eq!(i32::try_from(&num("-1.9")), Ok(-1));
        assert_eq!(i8::try_from(&Numeric::from(127)), Ok(127));
        assert!(matches!(i8::try_from(&Numeric::from(128)), Err(NumericError::InvalidCast(_))));
        assert!(matches!(
            i64::try_from(&num("9223372036854775808")),
            Err(NumericError::InvalidCast(_))
        ));
        assert_eq!(i64::try_from(&Numeric::from(i64::MIN)), Ok(i64::MIN));
        assert!(i16::try_from(&Numeric::POSITIVE_INFINITY).is_err());
    }

    #[test]
    fn float_casts() {
        assert_eq!(num("2.5").to_f64(), Ok(2.5));
        assert_eq!(Numeric::NEGATIVE_INFINITY.to_f64(), Ok(f64::NEG_INFINITY));
        assert!(Numeric::NAN.to_f64().unwrap().is_nan());
        assert!(matches!(num("1e400").to_f64(), Err(NumericError::InvalidCast(_))));
        assert!(f64::try_from(&num("-1e400")).is_err());
        assert!(num("1e308").to_f64().is_ok());
        assert_eq!(num("0.1").to_f32(), Ok(0.1f32));
        assert!(matches!(num("1e39").to_f32(), Err(NumericError::InvalidCast(_))));

        assert!(Numeric::from(f64::NAN).is_nan());
        assert_eq!(Numeric::from(f64::NEG_INFINITY), Numeric::NEGATIVE_INFINITY);
        assert_eq!(Numeric::from(0.25).to_string(), "0.25");
        assert_eq!(Numeric::from(0.5f32).to_string(), "0.5");
        assert_eq!(f32::try_from(&num("0.5")), Ok(0.5f32));
    }

    #[test]
    fn unsigned_casts() {
        assert_eq!(Numeric::from(u64::MAX).to_string(), "18446744073709551615");
        assert_eq!(u64::try_from(&num("18446744073709551615")), Ok(u64::MAX));
        assert!(u64::try_from(&num("18446744073709551616")).is_err());
        assert_eq!(u8::try_from(&num("255.9")), Ok(255));
        assert!(matches!(u32::try_from(&num("-1")), Err(NumericError::InvalidCast(_))));
        assert_eq!(Numeric::from(7u16), Numeric::from(7));
    }

    #[test]
    fn byte_layout() {
        let value = num("1.50");
        assert_eq!(value.to_bytes(), vec![3, 0, 0, 0, 2, 0, 0, 0, 0x00, 0x96]);
        assert_eq!(Numeric::from(-1).to_bytes(), vec![1, 0, 0, 0, 0, 0, 0, 0, 0xFF]);
        assert!(Numeric::NAN.to_bytes().is_empty());
    }

    #[test]
    fn bytes_round_trip() {
        for literal in ["0", "-1", "1.50", "-0.000001", "123456789012345678901234567890.123"] {
            let value = num(literal);
            let restored = Numeric::try_from(value.to_bytes().as_slice()).unwrap();
            assert_eq!(restored, value);
            assert_eq!(restored.precision(), value.precision());
            assert_eq!(restored.scale(), value.scale());
        }

        let wide = Numeric::with_precision(Decimal::from(5), 12);
        let restored = Numeric::from_serialized_bytes(&wide.to_bytes()).unwrap();
        assert_eq!(restored.precision(), 12);
    }

    #[test]
    fn extreme_scales_round_trip() {
        let tiny = num("1e-2000000000");
        let restored = Numeric::try_from(tiny.to_bytes().as_slice()).unwrap();
        assert_eq!(restored, tiny);

        let edge = Numeric::from(Decimal::from_parts(BigInt::from(-3), Decimal::MAX_SCALE));
        let bytes = edge.to_bytes();
        assert_eq!(bytes[4..8], i32::MAX.to_le_bytes());
        assert_eq!(Numeric::from_serialized_bytes(&bytes).unwrap(), edge);

        let wide = Numeric::with_precision(Decimal::from(1), u32::MAX);
        assert_eq!(wide.precision(), i32::MAX as u32);
        let restored = Numeric::try_from(wide.to_bytes().as_slice()).unwrap();
        assert_eq!(restored.precision(), wide.precision());
    }

    #[test]
    fn rejects_bad_bytes() {
        assert!(matches!(
            Numeric::from_serialized_bytes(&[1, 0, 0, 0, 0, 0, 0, 0]),
            Err(NumericError::Format(_))
        ));

        let negative_scale = [1, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF, 1];
        assert!(matches!(
            Numeric::from_serialized_bytes(&negative_scale),
            Err(NumericError::Format(_))
        ));
    }

    #[test]
    fn parses_special_literals() {
        assert!(num("nan").is_nan());
        assert_eq!(num(" -Infinity "), Numeric::NEGATIVE_INFINITY);
        assert_eq!(num("+INFINITY"), Numeric::POSITIVE_INFINITY);
        assert_eq!(num("1e2"), Numeric::from(100));
        assert!(matches!(Numeric::from_str("bogus"), Err(NumericError::Format(_))));
        assert_eq!(Numeric::POSITIVE_INFINITY.to_string(), "Infinity");
    }

    #[test]
    fn state_helpers() {
        assert_eq!(NumericState::PositiveInfinity.negate(), NumericState::NegativeInfinity);
        assert_eq!(NumericState::NaN.negate(), NumericState::NaN);
        assert_eq!(Numeric::from_state(NumericState::NaN), Some(Numeric::NAN));
        assert_eq!(Numeric::from_state(NumericState::Finite), None);
        assert_eq!(num("2.50").rescale(1, RoundingMode::HalfUp).unwrap().to_string(), "2.5");
    }
}
