//! Arbitrary-size signed integers.
//!
//! A [`BigInt`] is either a single inline `i32` or an owned slice of
//! little-endian two's-complement words. The slice is always canonical: it
//! carries no redundant sign words, and anything that fits one word is stored
//! inline instead. Because of that, derived equality and hashing compare values.

use super::{mpn, NumericError};
use crate::Result;
use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{self, Debug, Display},
    str::FromStr,
    sync::OnceLock,
};

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigInt(pub(super) Repr);

#[derive(Clone, PartialEq, Eq, Hash)]
pub(super) enum Repr {
    Inline(i32),
    /// At least two words, canonical.
    Words(Box<[u32]>),
}

use Repr::{Inline, Words};

const CACHE_MIN: i32 = -100;
const CACHE_MAX: i32 = 1024;

/// Shared small values. Populated once, read-only afterwards.
static SMALL_VALUES: OnceLock<Box<[BigInt]>> = OnceLock::new();

/// Two's-complement negation in place.
pub(super) fn negate_words(words: &mut [u32]) {
    let mut carry = true;
    for word in words.iter_mut() {
        *word = !*word;
        if carry {
            let (value, overflow) = word.overflowing_add(1);
            *word = value;
            carry = overflow;
        }
    }
}

impl BigInt {
    pub const fn zero() -> Self {
        Self(Inline(0))
    }

    pub const fn one() -> Self {
        Self(Inline(1))
    }

    /// Returns the shared instance for values in `-100..=1024`.
    pub fn cached(value: i32) -> Option<&'static BigInt> {
        if !(CACHE_MIN..=CACHE_MAX).contains(&value) {
            return None;
        }

        let values = SMALL_VALUES.get_or_init(|| {
            (CACHE_MIN..=CACHE_MAX)
                .map(|v| BigInt(Inline(v)))
                .collect()
        });

        values.get((value - CACHE_MIN) as usize)
    }

    pub const fn is_zero(&self) -> bool {
        matches!(self.0, Inline(0))
    }

    pub const fn is_one(&self) -> bool {
        matches!(self.0, Inline(1))
    }

    pub fn is_negative(&self) -> bool {
        match &self.0 {
            Inline(v) => *v < 0,
            Words(words) => (words[words.len() - 1] as i32) < 0,
        }
    }

    pub fn signum(&self) -> i32 {
        match &self.0 {
            Inline(v) => v.signum(),
            Words(_) if self.is_negative() => -1,
            Words(_) => 1,
        }
    }

    /// Number of significant two's-complement words.
    pub(super) fn word_len(&self) -> usize {
        match &self.0 {
            Inline(_) => 1,
            Words(words) => words.len(),
        }
    }

    pub(super) fn words(&self) -> Cow<'_, [u32]> {
        match &self.0 {
            Inline(v) => Cow::Owned(vec![*v as u32]),
            Words(words) => Cow::Borrowed(words),
        }
    }

    /// Two's-complement words sign-extended to at least `len` words.
    pub(super) fn twos_complement(&self, len: usize) -> Vec<u32> {
        let mut words = self.words().into_owned();
        let fill = if self.is_negative() { u32::MAX } else { 0 };
        words.resize(len.max(words.len()), fill);
        words
    }

    /// Canonicalises little-endian two's-complement words.
    pub(super) fn from_twos_complement(mut words: Vec<u32>) -> Self {
        let mut len = words.len();
        while len > 1 {
            let (top, next) = (words[len - 1], words[len - 2] as i32);
            if (top == 0 && next >= 0) || (top == u32::MAX && next < 0) {
                len -= 1;
            } else {
                break;
            }
        }

        match len {
            0 => Self::zero(),
            1 => Self::from(words[0] as i32),
            _ => {
                words.truncate(len);
                Self(Words(words.into_boxed_slice()))
            }
        }
    }

    pub(super) fn from_magnitude(negative: bool, magnitude: &[u32]) -> Self {
        let magnitude = mpn::trim(magnitude);
        let mut words = Vec::with_capacity(magnitude.len() + 1);
        words.extend_from_slice(magnitude);
        words.push(0);

        if negative {
            negate_words(&mut words);
        }

        Self::from_twos_complement(words)
    }

    /// Absolute value as an unsigned magnitude without leading zero words.
    pub(super) fn magnitude(&self) -> Vec<u32> {
        let mut words = self.words().into_owned();
        if self.is_negative() {
            negate_words(&mut words);
        }

        let len = mpn::trim(&words).len();
        words.truncate(len);
        words
    }

    pub fn negate(&self) -> Self {
        match &self.0 {
            Inline(v) => Self::from(-(*v as i64)),
            Words(_) => {
                let mut words = self.twos_complement(self.word_len() + 1);
                negate_words(&mut words);
                Self::from_twos_complement(words)
            }
        }
    }

    pub fn abs(&self) -> Self {
        match self.is_negative() {
            true => self.negate(),
            _ => self.clone(),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        if let (Inline(a), Inline(b)) = (&self.0, &other.0) {
            return Self::from(*a as i64 + *b as i64);
        }

        // one extra word means the sum can't overflow
        let len = self.word_len().max(other.word_len()) + 1;
        let mut sum = self.twos_complement(len);
        mpn::add_n(&mut sum, &other.twos_complement(len));

        Self::from_twos_complement(sum)
    }

    pub fn subtract(&self, other: &Self) -> Self {
        if let (Inline(a), Inline(b)) = (&self.0, &other.0) {
            return Self::from(*a as i64 - *b as i64);
        }

        let len = self.word_len().max(other.word_len()) + 1;
        let mut diff = self.twos_complement(len);
        mpn::sub_n(&mut diff, &other.twos_complement(len));

        Self::from_twos_complement(diff)
    }

    pub fn multiply(&self, other: &Self) -> Self {
        if let (Inline(a), Inline(b)) = (&self.0, &other.0) {
            return Self::from(*a as i64 * *b as i64);
        }
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }

        let (a, b) = (self.magnitude(), other.magnitude());
        let mut product = vec![0; a.len() + b.len()];
        mpn::mul(&mut product, &a, &b);

        Self::from_magnitude(self.is_negative() != other.is_negative(), &product)
    }

    /// Truncating division of a divisor already known to be non-zero.
    pub(super) fn div_rem_nonzero(&self, divisor: &Self) -> (Self, Self) {
        if let (Inline(a), Inline(b)) = (&self.0, &divisor.0) {
            let (a, b) = (*a as i64, *b as i64);
            return (Self::from(a / b), Self::from(a % b));
        }

        let (quotient, remainder) = mpn::div_rem(&self.magnitude(), &divisor.magnitude());
        let negative = self.is_negative();

        (
            Self::from_magnitude(negative != divisor.is_negative(), &quotient),
            Self::from_magnitude(negative, &remainder),
        )
    }

    /// Truncating division: the quotient rounds toward zero and the remainder
    /// takes the sign of the dividend.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self)> {
        if divisor.is_zero() {
            return Err(NumericError::DivisionByZero);
        }

        Ok(self.div_rem_nonzero(divisor))
    }

    pub fn divide(&self, divisor: &Self) -> Result<Self> {
        self.div_rem(divisor).map(|(quotient, _)| quotient)
    }

    pub fn remainder(&self, divisor: &Self) -> Result<Self> {
        self.div_rem(divisor).map(|(_, remainder)| remainder)
    }

    /// Non-negative residue for a modulus already known to be positive.
    pub(super) fn rem_positive(&self, modulus: &Self) -> Self {
        let (_, remainder) = self.div_rem_nonzero(modulus);
        match remainder.is_negative() {
            true => remainder.add(modulus),
            _ => remainder,
        }
    }

    /// Floor-style modulus. The result is always in `0..modulus`.
    pub fn modulo(&self, modulus: &Self) -> Result<Self> {
        if modulus.signum() <= 0 {
            return Err(NumericError::InvalidModulus);
        }

        Ok(self.rem_positive(modulus))
    }

    pub(super) fn pow_u32(&self, exponent: u32) -> Self {
        let mut result = Self::one();
        let mut base = self.clone();
        let mut exponent = exponent;

        while exponent > 0 {
            if exponent & 1 == 1 {
                result = result.multiply(&base);
            }
            exponent >>= 1;
            if exponent > 0 {
                base = base.multiply(&base);
            }
        }

        result
    }

    /// Repeated squaring. `x.pow(0)` is one, even for zero.
    pub fn pow(&self, exponent: i32) -> Result<Self> {
        match u32::try_from(exponent) {
            Ok(exponent) => Ok(self.pow_u32(exponent)),
            Err(_) => Err(NumericError::InvalidExponent(exponent as i64)),
        }
    }

    pub fn to_i32(&self) -> Option<i32> {
        match self.0 {
            Inline(v) => Some(v),
            _ => None,
        }
    }

    pub fn to_i64(&self) -> Option<i64> {
        match &self.0 {
            Inline(v) => Some(*v as i64),
            Words(words) if words.len() == 2 => {
                Some((words[1] as i32 as i64) << 32 | words[0] as i64)
            }
            _ => None,
        }
    }

    pub fn to_i128(&self) -> Option<i128> {
        if self.word_len() > 4 {
            return None;
        }

        let words = self.twos_complement(4);
        Some(
            words
                .iter()
                .rev()
                .fold(0u128, |acc, &w| acc << 32 | w as u128) as i128,
        )
    }

    /// Nearest `f64`, ties to even.
    pub fn to_f64(&self) -> f64 {
        match self.to_i64() {
            Some(value) => value as f64,
            // the std float parser rounds correctly, overflowing to infinity
            None => self.to_string().parse().unwrap_or(f64::NAN),
        }
    }

    /// Minimal big-endian two's-complement encoding.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        let len = self.bit_length() as usize / 8 + 1;
        let mut bytes: Vec<u8> = self
            .words()
            .iter()
            .rev()
            .flat_map(|w| w.to_be_bytes())
            .collect();

        bytes.split_off(bytes.len() - len)
    }

    /// Inverse of [`BigInt::to_bytes_be`]. An empty slice is zero.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        let fill = match bytes.first() {
            Some(byte) if byte & 0x80 != 0 => 0xFF,
            _ => 0,
        };

        let words = bytes
            .rchunks(4)
            .map(|chunk| {
                let mut word = [fill; 4];
                word[4 - chunk.len()..].copy_from_slice(chunk);
                u32::from_be_bytes(word)
            })
            .collect();

        Self::from_twos_complement(words)
    }

    pub fn to_str_radix(&self, radix: u32) -> String {
        assert!((2..=36).contains(&radix), "radix {radix} outside 2..=36");

        if let (Inline(v), 10) = (&self.0, radix) {
            return v.to_string();
        }

        let digits = mpn::to_radix_digits(&self.magnitude(), radix);
        let mut string = String::with_capacity(digits.len() + 1);
        if self.is_negative() {
            string.push('-');
        }
        string.extend(digits.iter().map(|&d| mpn::DIGITS[d as usize] as char));

        string
    }

    /// Parses an optionally signed string of digits in `radix`.
    pub fn from_str_radix(s: &str, radix: u32) -> Result<Self> {
        assert!((2..=36).contains(&radix), "radix {radix} outside 2..=36");

        let (negative, body) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        if body.is_empty() {
            return Err(NumericError::Format(format!("empty integer literal '{s}'")));
        }

        let digits = body
            .chars()
            .map(|c| c.to_digit(radix).map(|d| d as u8))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                NumericError::Format(format!("invalid digit in '{s}' for radix {radix}"))
            })?;

        Ok(Self::from_magnitude(
            negative,
            &mpn::from_radix_digits(&digits, radix),
        ))
    }
}

impl Default for BigInt {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<i32> for BigInt {
    fn from(value: i32) -> Self {
        match Self::cached(value) {
            Some(cached) => cached.clone(),
            None => Self(Inline(value)),
        }
    }
}

impl From<u32> for BigInt {
    fn from(value: u32) -> Self {
        Self::from(value as i64)
    }
}

impl From<i64> for BigInt {
    fn from(value: i64) -> Self {
        match i32::try_from(value) {
            Ok(small) => Self::from(small),
            _ => Self::from_twos_complement(vec![value as u32, (value >> 32) as u32]),
        }
    }
}

impl From<u64> for BigInt {
    fn from(value: u64) -> Self {
        Self::from_twos_complement(vec![value as u32, (value >> 32) as u32, 0])
    }
}

impl From<i128> for BigInt {
    fn from(value: i128) -> Self {
        let words = (0..4).map(|idx| (value >> (idx * 32)) as u32).collect();
        Self::from_twos_complement(words)
    }
}

impl Ord for BigInt {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Inline(a), Inline(b)) = (&self.0, &other.0) {
            return a.cmp(b);
        }

        let (negative, other_negative) = (self.is_negative(), other.is_negative());
        if negative != other_negative {
            return match negative {
                true => Ordering::Less,
                _ => Ordering::Greater,
            };
        }

        // with equal signs, a longer canonical form is further from zero
        let (len, other_len) = (self.word_len(), other.word_len());
        if len != other_len {
            return match negative {
                true => other_len.cmp(&len),
                _ => len.cmp(&other_len),
            };
        }

        self.words().iter().rev().cmp(other.words().iter().rev())
    }
}

impl PartialOrd for BigInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_radix(10))
    }
}

impl Debug for BigInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BigInt({self})")
    }
}

impl FromStr for BigInt {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_str_radix(s, 10)
    }
}

forward_binop!(BigInt, Add, add, add);
forward_binop!(BigInt, Sub, sub, subtract);
forward_binop!(BigInt, Mul, mul, multiply);

impl std::ops::Neg for &BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        self.negate()
    }
}

impl std::ops::Neg for BigInt {
    type Output = BigInt;

    fn neg(self) -> BigInt {
        self.negate()
    }
}
