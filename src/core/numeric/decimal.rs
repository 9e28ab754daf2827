//! Scaled decimals.
//!
//! A [`Decimal`] is `unscaled × 10^-scale`. Equality and hashing see the
//! scale (`1.5 != 1.50`), while [`Decimal::compare`] only looks at the
//! numeric value.

use super::{integer::BigInt, mpn, NumericError, RoundingMode};
use crate::Result;
use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display},
    str::FromStr,
};

#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

pub(super) fn ten_pow(exponent: u32) -> BigInt {
    match exponent {
        0..=18 => BigInt::from(10i64.pow(exponent)),
        _ => BigInt::from(10).pow_u32(exponent),
    }
}

/// `scale` when a decimal may carry it.
fn checked_scale(scale: u64) -> Result<u32> {
    u32::try_from(scale)
        .ok()
        .filter(|&scale| scale <= Decimal::MAX_SCALE)
        .ok_or_else(|| {
            NumericError::OutOfRange(format!("scale {scale} exceeds {}", Decimal::MAX_SCALE))
        })
}

/// Truncating `dividend / divisor` adjusted by `mode`.
fn round_quotient(dividend: &BigInt, divisor: &BigInt, mode: RoundingMode) -> Result<BigInt> {
    let (quotient, remainder) = dividend.div_rem_nonzero(divisor);
    if remainder.is_zero() {
        return Ok(quotient);
    }

    let positive = dividend.is_negative() == divisor.is_negative();
    let half = remainder.abs().shl_bits(1).cmp(&divisor.abs());

    match mode.rounds_away(positive, half, quotient.test_bit(0))? {
        true if positive => Ok(quotient.add(&BigInt::one())),
        true => Ok(quotient.subtract(&BigInt::one())),
        _ => Ok(quotient),
    }
}

impl Decimal {
    /// Largest scale, so that it always fits the `i32` of the serialised
    /// header.
    pub const MAX_SCALE: u32 = i32::MAX as u32;

    /// Largest power of ten applied to grow a value left of the point, when
    /// parsing a positive exponent or rounding to negative places.
    pub const MAX_SHIFT: u32 = 131_072;

    /// Builds `unscaled × 10^-scale`, rejecting a negative scale.
    pub fn new(unscaled: BigInt, scale: i32) -> Result<Self> {
        match u32::try_from(scale) {
            Ok(scale) => Ok(Self::from_parts(unscaled, scale)),
            Err(_) => Err(NumericError::Format(format!("negative scale {scale}"))),
        }
    }

    /// # Panics
    ///
    /// If `scale` is above [`Decimal::MAX_SCALE`].
    pub const fn from_parts(unscaled: BigInt, scale: u32) -> Self {
        assert!(scale <= Self::MAX_SCALE, "decimal scale out of range");
        Self { unscaled, scale }
    }

    pub const fn zero() -> Self {
        Self::from_parts(BigInt::zero(), 0)
    }

    pub const fn one() -> Self {
        Self::from_parts(BigInt::one(), 0)
    }

    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }

    pub fn signum(&self) -> i32 {
        self.unscaled.signum()
    }

    pub fn negate(&self) -> Self {
        Self::from_parts(self.unscaled.negate(), self.scale)
    }

    pub fn abs(&self) -> Self {
        Self::from_parts(self.unscaled.abs(), self.scale)
    }

    /// Unscaled value expressed at a scale not below our own.
    fn upscaled(&self, scale: u32) -> BigInt {
        match scale - self.scale {
            0 => self.unscaled.clone(),
            diff => self.unscaled.multiply(&ten_pow(diff)),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        Self::from_parts(self.upscaled(scale).add(&other.upscaled(scale)), scale)
    }

    pub fn subtract(&self, other: &Self) -> Self {
        let scale = self.scale.max(other.scale);
        Self::from_parts(self.upscaled(scale).subtract(&other.upscaled(scale)), scale)
    }

    /// Exact product; the scales add up and fail past [`Decimal::MAX_SCALE`].
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        let scale = checked_scale(self.scale as u64 + other.scale as u64)?;
        Ok(Self::from_parts(self.unscaled.multiply(&other.unscaled), scale))
    }

    /// Quotient at `scale` digits after the point, rounded with `mode`.
    ///
    /// Only a zero divisor fails. Zero divided by anything else is zero at
    /// the requested scale.
    pub fn divide(&self, other: &Self, scale: u32, mode: RoundingMode) -> Result<Self> {
        if other.is_zero() {
            return Err(NumericError::DivisionByZero);
        }
        let scale = checked_scale(scale as u64)?;
        if self.is_zero() {
            return Ok(Self::from_parts(BigInt::zero(), scale));
        }

        // every scale is at most MAX_SCALE, so |power| stays below u32::MAX
        let power = scale as i64 - (self.scale as i64 - other.scale as i64);
        let quotient = match power >= 0 {
            true => round_quotient(
                &self.unscaled.multiply(&ten_pow(power as u32)),
                &other.unscaled,
                mode,
            )?,
            _ => round_quotient(
                &self.unscaled,
                &other.unscaled.multiply(&ten_pow(power.unsigned_abs() as u32)),
                mode,
            )?,
        };

        Ok(Self::from_parts(quotient, scale))
    }

    /// `self - trunc(self / other) * other`, carrying the sign of `self`.
    pub fn remainder(&self, other: &Self) -> Result<Self> {
        let quotient = self.divide(other, 0, RoundingMode::Down)?;
        Ok(self.subtract(&quotient.multiply(other)?))
    }

    /// Exact power with the scale multiplied by `exponent`.
    pub fn pow(&self, exponent: u32) -> Result<Self> {
        let scale = checked_scale(self.scale as u64 * exponent as u64)?;
        Ok(Self::from_parts(self.unscaled.pow_u32(exponent), scale))
    }

    /// Same value at `scale` digits after the point. Gaining digits is exact,
    /// dropping them rounds with `mode`.
    pub fn set_scale(&self, scale: u32, mode: RoundingMode) -> Result<Self> {
        match scale >= self.scale {
            true => {
                let scale = checked_scale(scale as u64)?;
                Ok(Self::from_parts(self.upscaled(scale), scale))
            }
            _ => self.divide(&Self::one(), scale, mode),
        }
    }

    /// Number of decimal digits in the unscaled value. Zero has one.
    pub fn precision(&self) -> u32 {
        let magnitude = self.unscaled.abs();
        if let Some(value) = magnitude.to_i64() {
            return value.checked_ilog10().map_or(1, |log| log + 1);
        }

        // 2^(bits - 1) <= magnitude, and log10(2) * 2^32 rounded down keeps
        // the estimate at or below the digit count
        let bits = magnitude.bit_length() as u64;
        let mut digits = (((bits - 1) * 1_292_913_986) >> 32) as u32 + 1;
        while magnitude >= ten_pow(digits) {
            digits += 1;
        }
        digits
    }

    /// Rounds to at most `digits` significant digits (plus one more when
    /// rounding carries, as in 999 to 1000). Digits left of the point are
    /// zeroed rather than given a negative scale. `digits == 0` keeps
    /// everything.
    pub fn round_to_precision(&self, digits: u32, mode: RoundingMode) -> Result<Self> {
        let precision = self.precision();
        if digits == 0 || precision <= digits {
            return Ok(self.clone());
        }

        let drop = precision - digits;
        let rounded = round_quotient(&self.unscaled, &ten_pow(drop), mode)?;

        Ok(match self.scale.checked_sub(drop) {
            Some(scale) => Self::from_parts(rounded, scale),
            None => Self::from_parts(rounded.multiply(&ten_pow(drop - self.scale)), 0),
        })
    }

    /// Drops trailing zeros after the point, never going below scale zero.
    pub fn strip_trailing_zeros(&self) -> Self {
        let ten = BigInt::from(10);
        let mut unscaled = self.unscaled.clone();
        let mut scale = self.scale;

        while scale > 0 && !unscaled.is_zero() {
            let (quotient, remainder) = unscaled.div_rem_nonzero(&ten);
            if !remainder.is_zero() {
                break;
            }
            unscaled = quotient;
            scale -= 1;
        }

        if unscaled.is_zero() {
            scale = 0;
        }

        Self::from_parts(unscaled, scale)
    }

    /// Integer part, truncated toward zero.
    pub fn to_big_int(&self) -> BigInt {
        match self.scale {
            0 => self.unscaled.clone(),
            scale => self.unscaled.div_rem_nonzero(&ten_pow(scale)).0,
        }
    }

    pub fn is_integral(&self) -> bool {
        self.scale == 0 || self.unscaled.div_rem_nonzero(&ten_pow(self.scale)).1.is_zero()
    }

    /// Nearest `f64`, ties to even.
    pub fn to_f64(&self) -> f64 {
        match self.scale {
            0 => self.unscaled.to_f64(),
            _ => self.to_string().parse().unwrap_or(f64::NAN),
        }
    }

    /// Numeric comparison, ignoring scale.
    ///
    /// Each side is split by `10^scale` into integer part and fraction
    /// digits. Integer parts are compared first and the fractions only when
    /// those tie, once aligned to the larger scale.
    pub fn compare(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }

        let (int, fraction) = self.unscaled.div_rem_nonzero(&ten_pow(self.scale));
        let (other_int, other_fraction) = other.unscaled.div_rem_nonzero(&ten_pow(other.scale));

        int.cmp(&other_int).then_with(|| {
            let scale = self.scale.max(other.scale);
            let fraction = fraction.multiply(&ten_pow(scale - self.scale));
            let other_fraction = other_fraction.multiply(&ten_pow(scale - other.scale));
            fraction.cmp(&other_fraction)
        })
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Self::from_parts(value, 0)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl From<i32> for Decimal {
    fn from(value: i32) -> Self {
        Self::from(BigInt::from(value))
    }
}

impl TryFrom<f64> for Decimal {
    type Error = NumericError;

    /// Exact value of the double, digit for digit. `0.1` becomes
    /// `0.1000000000000000055511151231257827021181583404541015625`.
    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(NumericError::Format(format!("{value} has no decimal value")));
        }
        if value == 0.0 {
            return Ok(Self::zero());
        }

        let bits = value.to_bits();
        let biased = ((bits >> 52) & 0x7FF) as i32;
        let mut mantissa = bits & ((1 << 52) - 1);
        let mut exponent = match biased {
            0 => -1074,
            _ => {
                mantissa |= 1 << 52;
                biased - 1075
            }
        };

        let zeros = mantissa.trailing_zeros();
        mantissa >>= zeros;
        exponent += zeros as i32;

        let mantissa = BigInt::from(mantissa);
        let decimal = match exponent >= 0 {
            true => Self::from_parts(mantissa.shl_bits(exponent as u32), 0),
            _ => {
                // m / 2^k == m * 5^k / 10^k
                let k = exponent.unsigned_abs();
                Self::from_parts(mantissa.multiply(&BigInt::from(5).pow_u32(k)), k)
            }
        };

        Ok(match value.is_sign_negative() {
            true => decimal.negate(),
            _ => decimal,
        })
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return Display::fmt(&self.unscaled, f);
        }

        let digits = self.unscaled.abs().to_string();
        let scale = self.scale as usize;
        if self.unscaled.is_negative() {
            f.write_str("-")?;
        }

        match digits.len() > scale {
            true => {
                let (int, fraction) = digits.split_at(digits.len() - scale);
                write!(f, "{int}.{fraction}")
            }
            _ => write!(f, "0.{}{digits}", "0".repeat(scale - digits.len())),
        }
    }
}

impl Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Decimal({self})")
    }
}

impl FromStr for Decimal {
    type Err = NumericError;

    /// Accepts `[+-]digits[.digits][(e|E)[+-]digits]` where at least one
    /// mantissa digit is present.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || NumericError::Format(format!("invalid decimal literal '{s}'"));

        let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
            Some(idx) => (&s[..idx], Some(&s[idx + 1..])),
            None => (s, None),
        };

        let (negative, mantissa) = match mantissa.as_bytes().first() {
            Some(b'-') => (true, &mantissa[1..]),
            Some(b'+') => (false, &mantissa[1..]),
            _ => (false, mantissa),
        };

        let (int, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let all_digits = int
            .bytes()
            .chain(fraction.bytes())
            .all(|b| b.is_ascii_digit());
        if (int.is_empty() && fraction.is_empty()) || !all_digits {
            return Err(invalid());
        }

        let exponent = match exponent {
            Some(exponent) => exponent.parse::<i64>().map_err(|_| invalid())?,
            None => 0,
        };

        let digits: Vec<u8> = int.bytes().chain(fraction.bytes()).map(|b| b - b'0').collect();
        let mut unscaled = BigInt::from_magnitude(negative, &mpn::from_radix_digits(&digits, 10));

        let scale = fraction.len() as i64 - exponent;
        let scale = match scale < 0 {
            true => {
                let shift = u32::try_from(-scale)
                    .ok()
                    .filter(|&shift| shift <= Self::MAX_SHIFT)
                    .ok_or_else(|| {
                        NumericError::Format(format!(
                            "exponent of '{s}' shifts past {} digits",
                            Self::MAX_SHIFT
                        ))
                    })?;
                unscaled = unscaled.multiply(&ten_pow(shift));
                0
            }
            _ => i32::try_from(scale).map_err(|_| invalid())? as u32,
        };

        Ok(Self::from_parts(unscaled, scale))
    }
}

forward_binop!(Decimal, Add, add, add);
forward_binop!(Decimal, Sub, sub, subtract);

impl std::ops::Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RoundingMode::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn int(value: i64) -> Decimal {
        Decimal::from(value)
    }

    #[test]
    fn aligned_addition() {
        let sum = dec("1.5").add(&dec("2.25"));
        assert_eq!(sum, Decimal::from_parts(BigInt::from(375), 2));
        assert_eq!(dec("1.5").subtract(&dec("2.25")).to_string(), "-0.75");
        assert_eq!(dec("1.5").multiply(&dec("2.25")).unwrap().to_string(), "3.375");
        assert_eq!((&dec("0.1") + &dec("0.2")).to_string(), "0.3");
    }

    #[test]
    fn half_even_ties() {
        assert_eq!(int(5).divide(&int(2), 0, HalfEven).unwrap(), int(2));
        assert_eq!(int(15).divide(&int(2), 0, HalfEven).unwrap(), int(8));
        assert_eq!(int(-5).divide(&int(2), 0, HalfEven).unwrap(), int(-2));
    }

    #[test]
    fn rounding_modes() {
        let quarter = |mode| dec("1").divide(&dec("4"), 1, mode).unwrap().to_string();
        assert_eq!(quarter(HalfEven), "0.2");
        assert_eq!(quarter(HalfUp), "0.3");
        assert_eq!(quarter(HalfDown), "0.2");
        assert_eq!(quarter(Up), "0.3");
        assert_eq!(quarter(Down), "0.2");

        let neg = |mode| int(-5).divide(&int(2), 0, mode).unwrap();
        assert_eq!(neg(Ceiling), int(-2));
        assert_eq!(neg(Floor), int(-3));
        assert_eq!(neg(Up), int(-3));
        assert_eq!(neg(HalfDown), int(-2));

        assert_eq!(
            int(2).divide(&int(3), 5, HalfUp).unwrap().to_string(),
            "0.66667"
        );
        assert_eq!(
            int(-2).divide(&int(3), 5, HalfUp).unwrap().to_string(),
            "-0.66667"
        );
        assert_eq!(
            int(1).divide(&int(3), 5, Unnecessary),
            Err(NumericError::InexactResult)
        );
        assert_eq!(
            int(1).divide(&int(4), 2, Unnecessary).unwrap().to_string(),
            "0.25"
        );
    }

    #[test]
    fn division_edges() {
        assert_eq!(
            Decimal::zero().divide(&int(7), 3, HalfUp).unwrap().to_string(),
            "0.000"
        );
        assert_eq!(
            int(7).divide(&Decimal::zero(), 3, HalfUp),
            Err(NumericError::DivisionByZero)
        );
        // dividend has more scale than the target: the divisor is scaled up
        assert_eq!(
            dec("1.2345").divide(&int(1), 2, HalfUp).unwrap().to_string(),
            "1.23"
        );
        assert_eq!(
            dec("10").divide(&dec("0.25"), 0, Unnecessary).unwrap(),
            int(40)
        );
    }

    #[test]
    fn remainder_keeps_dividend_sign() {
        assert_eq!(dec("7.5").remainder(&int(2)).unwrap().to_string(), "1.5");
        assert_eq!(dec("-7.5").remainder(&int(2)).unwrap().to_string(), "-1.5");
        assert_eq!(int(7).remainder(&dec("-0.4")).unwrap().to_string(), "0.2");
        assert_eq!(
            int(1).remainder(&Decimal::zero()),
            Err(NumericError::DivisionByZero)
        );
    }

    #[test]
    fn scale_insensitive_compare() {
        assert_eq!(dec("1.50").compare(&dec("1.5")), Ordering::Equal);
        assert_ne!(dec("1.50"), dec("1.5"));
        assert_eq!(dec("-1.5").compare(&dec("-1.25")), Ordering::Less);
        assert_eq!(dec("0.5").compare(&dec("-0.5")), Ordering::Greater);
        assert_eq!(dec("10").compare(&dec("9.99")), Ordering::Greater);
        assert_eq!(dec("-0.001").compare(&Decimal::zero()), Ordering::Less);
    }

    #[test]
    fn formatting() {
        assert_eq!(Decimal::from_parts(BigInt::from(5), 2).to_string(), "0.05");
        assert_eq!(Decimal::from_parts(BigInt::from(-5), 2).to_string(), "-0.05");
        assert_eq!(Decimal::from_parts(BigInt::from(12345), 2).to_string(), "123.45");
        assert_eq!(Decimal::from_parts(BigInt::zero(), 3).to_string(), "0.000");
        assert_eq!(Decimal::from_parts(BigInt::from(12300), 2).to_string(), "123.00");
        assert_eq!(Decimal::from_parts(BigInt::from(-7), 0).to_string(), "-7");
    }

    #[test]
    fn parsing() {
        assert_eq!(dec("1.5e3"), Decimal::from_parts(BigInt::from(1500), 0));
        assert_eq!(dec("1.5E-3"), Decimal::from_parts(BigInt::from(15), 4));
        assert_eq!(dec("2e+2"), int(200));
        assert_eq!(dec("-.5").to_string(), "-0.5");
        assert_eq!(dec("5."), int(5));
        assert_eq!(dec("+0012.340").scale(), 3);

        for bad in ["", ".", "-", "1.2.3", "1e", "1e+", "e5", "abc", "1,5", "--1", "1e5.5", " 1"] {
            assert!(
                matches!(Decimal::from_str(bad), Err(NumericError::Format(_))),
                "'{bad}' should not parse"
            );
        }
    }

    #[test]
    fn negative_scale_is_rejected() {
        assert!(matches!(
            Decimal::new(BigInt::one(), -1),
            Err(NumericError::Format(_))
        ));
        assert_eq!(Decimal::new(BigInt::one(), 2).unwrap().to_string(), "0.01");
    }

    #[test]
    fn exact_doubles() {
        let exact = |v: f64| Decimal::try_from(v).unwrap().to_string();
        assert_eq!(exact(0.5), "0.5");
        assert_eq!(exact(-1.25), "-1.25");
        assert_eq!(exact(3.0), "3");
        assert_eq!(exact(-0.0), "0");
        assert_eq!(
            exact(0.1),
            "0.1000000000000000055511151231257827021181583404541015625"
        );
        assert_eq!(exact(2f64.powi(70)), "1180591620717411303424");
        assert!(Decimal::try_from(f64::NAN).is_err());
        assert!(Decimal::try_from(f64::INFINITY).is_err());

        assert_eq!(dec("0.1").to_f64(), 0.1);
        assert_eq!(dec("-2.5e10").to_f64(), -2.5e10);
    }

    #[test]
    fn rescaling() {
        assert_eq!(dec("1.25").set_scale(1, HalfEven).unwrap().to_string(), "1.2");
        assert_eq!(dec("1.5").set_scale(3, Unnecessary).unwrap().to_string(), "1.500");
        assert_eq!(dec("123.456").round_to_precision(4, HalfUp).unwrap().to_string(), "123.5");
        assert_eq!(dec("98765").round_to_precision(2, HalfUp).unwrap(), int(99000));
        assert_eq!(
            dec("0.00123456").round_to_precision(3, HalfUp).unwrap().to_string(),
            "0.00123"
        );
        assert_eq!(dec("1.500").strip_trailing_zeros().to_string(), "1.5");
        assert_eq!(dec("0.000").strip_trailing_zeros(), Decimal::zero());
        assert_eq!(dec("100").strip_trailing_zeros().to_string(), "100");
    }

    #[test]
    fn digits_and_parts() {
        assert_eq!(Decimal::zero().precision(), 1);
        assert_eq!(dec("-123.45").precision(), 5);
        assert_eq!(dec("-123.45").to_big_int(), BigInt::from(-123));
        assert!(dec("4.000").is_integral());
        assert!(!dec("4.001").is_integral());
        assert_eq!(dec("1.5").pow(3).unwrap().to_string(), "3.375");
    }

    #[test]
    fn digit_counts_at_powers_of_ten() {
        let nines = "9".repeat(40);
        assert_eq!(dec("999999999999999999").precision(), 18);
        assert_eq!(dec("1000000000000000000").precision(), 19);
        assert_eq!(dec("-9223372036854775808").precision(), 19);
        assert_eq!(dec("18446744073709551616").precision(), 20);
        assert_eq!(dec(&nines).precision(), 40);
        assert_eq!(dec("-1e40").precision(), 41);
    }

    #[test]
    fn scales_stay_in_range() {
        let tiny = Decimal::from_parts(BigInt::one(), 2_000_000_000);
        assert!(matches!(tiny.multiply(&tiny), Err(NumericError::OutOfRange(_))));

        let edge = Decimal::from_parts(BigInt::one(), Decimal::MAX_SCALE - 1);
        assert_eq!(edge.multiply(&dec("0.1")).unwrap().scale(), Decimal::MAX_SCALE);
        assert!(edge.multiply(&dec("0.01")).is_err());

        let base = Decimal::from_parts(BigInt::one(), 5_000_000);
        assert!(matches!(base.pow(999), Err(NumericError::OutOfRange(_))));
        assert_eq!(dec("0.01").pow(999).unwrap().scale(), 1998);

        assert!(int(1).set_scale(u32::MAX, HalfUp).is_err());
        assert!(int(1).divide(&int(3), u32::MAX, HalfUp).is_err());
    }

    #[test]
    fn exponent_limits() {
        assert!(matches!(
            Decimal::from_str("1e2147483647"),
            Err(NumericError::Format(_))
        ));
        assert!(Decimal::from_str("1e131073").is_err());
        assert_eq!(dec("25e-1999999999").scale(), 1_999_999_999);
        assert!(Decimal::from_str("1e-2147483648").is_err());
    }
}
