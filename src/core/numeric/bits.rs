//! Two's-complement bit operations on [`BigInt`].
//!
//! Everything behaves as if the value were sign-extended to infinite width,
//! which is what native fixed-width integers do within their width.

use super::{
    integer::{BigInt, Repr},
    mpn,
};

impl BigInt {
    fn bitwise(&self, other: &Self, op: impl Fn(u32, u32) -> u32) -> Self {
        if let (Repr::Inline(a), Repr::Inline(b)) = (&self.0, &other.0) {
            return Self::from(op(*a as u32, *b as u32) as i32);
        }

        let len = self.word_len().max(other.word_len());
        let mut words = self.twos_complement(len);
        words
            .iter_mut()
            .zip(other.twos_complement(len))
            .for_each(|(word, rhs)| *word = op(*word, rhs));

        Self::from_twos_complement(words)
    }

    pub fn and(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a & b)
    }

    pub fn or(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a | b)
    }

    pub fn xor(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a ^ b)
    }

    pub fn and_not(&self, other: &Self) -> Self {
        self.bitwise(other, |a, b| a & !b)
    }

    /// Bitwise complement, that is `-x - 1`.
    pub fn not(&self) -> Self {
        let mut words = self.twos_complement(0);
        words.iter_mut().for_each(|word| *word = !*word);
        Self::from_twos_complement(words)
    }

    /// Shifts left by `count` bits. A negative count shifts right.
    pub fn shift_left(&self, count: i32) -> Self {
        match count < 0 {
            true => self.shr_bits(count.unsigned_abs()),
            _ => self.shl_bits(count as u32),
        }
    }

    /// Arithmetic (sign-extending) shift right. A negative count shifts left.
    pub fn shift_right(&self, count: i32) -> Self {
        match count < 0 {
            true => self.shl_bits(count.unsigned_abs()),
            _ => self.shr_bits(count as u32),
        }
    }

    pub(super) fn shl_bits(&self, count: u32) -> Self {
        if count == 0 || self.is_zero() {
            return self.clone();
        }
        if let (Repr::Inline(v), true) = (&self.0, count < mpn::WORD_BITS) {
            return Self::from((*v as i64) << count);
        }

        let word_shift = (count / mpn::WORD_BITS) as usize;
        let sign = if self.is_negative() { u32::MAX } else { 0 };

        let mut words = vec![0u32; word_shift];
        words.extend_from_slice(&self.words());
        words.push(sign);
        mpn::lshift(&mut words[word_shift..], count % mpn::WORD_BITS);

        Self::from_twos_complement(words)
    }

    pub(super) fn shr_bits(&self, count: u32) -> Self {
        if count == 0 {
            return self.clone();
        }
        if let Repr::Inline(v) = self.0 {
            return Self::from(v >> count.min(mpn::WORD_BITS - 1));
        }

        let negative = self.is_negative();
        let word_shift = (count / mpn::WORD_BITS) as usize;
        if word_shift >= self.word_len() {
            return Self::from(if negative { -1 } else { 0 });
        }

        let mut words = self.words()[word_shift..].to_vec();
        let bit_shift = count % mpn::WORD_BITS;
        mpn::rshift(&mut words, bit_shift);
        if negative && bit_shift > 0 {
            let top = words.len() - 1;
            words[top] |= u32::MAX << (mpn::WORD_BITS - bit_shift);
        }

        Self::from_twos_complement(words)
    }

    pub fn test_bit(&self, bit: u32) -> bool {
        let word = (bit / mpn::WORD_BITS) as usize;
        match self.words().get(word) {
            Some(w) => (w >> (bit % mpn::WORD_BITS)) & 1 == 1,
            None => self.is_negative(),
        }
    }

    fn with_bit(&self, bit: u32, op: impl Fn(u32, u32) -> u32) -> Self {
        // one spare word keeps the sign intact when the top bit changes
        let word = (bit / mpn::WORD_BITS) as usize;
        let mut words = self.twos_complement(word + 2);
        words[word] = op(words[word], 1 << (bit % mpn::WORD_BITS));

        Self::from_twos_complement(words)
    }

    pub fn set_bit(&self, bit: u32) -> Self {
        self.with_bit(bit, |w, mask| w | mask)
    }

    pub fn clear_bit(&self, bit: u32) -> Self {
        self.with_bit(bit, |w, mask| w & !mask)
    }

    pub fn flip_bit(&self, bit: u32) -> Self {
        self.with_bit(bit, |w, mask| w ^ mask)
    }

    /// Bits needed to represent the value, excluding the sign bit.
    pub fn bit_length(&self) -> u32 {
        if let Repr::Inline(v) = self.0 {
            let v = if v < 0 { !v } else { v };
            return mpn::WORD_BITS - v.leading_zeros();
        }

        match self.is_negative() {
            true => mpn::bit_length(&self.not().words()),
            _ => mpn::bit_length(&self.words()),
        }
    }

    /// Number of bits that differ from the sign bit.
    pub fn bit_count(&self) -> u32 {
        let flip = if self.is_negative() { u32::MAX } else { 0 };
        self.words().iter().map(|w| (w ^ flip).count_ones()).sum()
    }

    /// Index of the lowest set bit, `None` for zero.
    pub fn lowest_set_bit(&self) -> Option<u32> {
        mpn::lowest_set_bit(&self.words())
    }
}

forward_binop!(BigInt, BitAnd, bitand, and);
forward_binop!(BigInt, BitOr, bitor, or);
forward_binop!(BigInt, BitXor, bitxor, xor);

impl std::ops::Not for &BigInt {
    type Output = BigInt;

    fn not(self) -> BigInt {
        BigInt::not(self)
    }
}

impl std::ops::Not for BigInt {
    type Output = BigInt;

    fn not(self) -> BigInt {
        BigInt::not(&self)
    }
}

impl std::ops::Shl<u32> for &BigInt {
    type Output = BigInt;

    fn shl(self, count: u32) -> BigInt {
        self.shl_bits(count)
    }
}

impl std::ops::Shr<u32> for &BigInt {
    type Output = BigInt;

    fn shr(self, count: u32) -> BigInt {
        self.shr_bits(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    #[test]
    fn matches_native_semantics() {
        let samples = [0i64, 1, -1, 5, -6, 0x7FFF_FFFF, -0x8000_0000, i64::MAX, i64::MIN, 0x1234_5678_9ABC];

        for &a in &samples {
            for &b in &samples {
                let (x, y) = (BigInt::from(a), BigInt::from(b));
                assert_eq!(x.and(&y), BigInt::from(a & b), "{a} & {b}");
                assert_eq!(x.or(&y), BigInt::from(a | b), "{a} | {b}");
                assert_eq!(x.xor(&y), BigInt::from(a ^ b), "{a} ^ {b}");
            }
            assert_eq!(BigInt::from(a).not(), BigInt::from(!a));
        }
    }

    #[test]
    fn shifts_extend_the_sign() {
        assert_eq!(BigInt::from(1).shift_left(100), BigInt::from(2).pow(100).unwrap());
        assert_eq!(BigInt::from(-1).shift_left(40), BigInt::from(-(1i64 << 40)));
        assert_eq!(BigInt::from(-1).shift_right(200), BigInt::from(-1));
        assert_eq!(BigInt::from(-5).shift_right(1), BigInt::from(-3));
        assert_eq!(BigInt::from(i64::MIN).shift_right(33), BigInt::from(i64::MIN >> 33));
        assert_eq!(big("-18446744073709551617").shift_right(64), BigInt::from(-2));
        assert_eq!(BigInt::from(12).shift_left(-2), BigInt::from(3));
        assert_eq!(&BigInt::from(3) << 31, BigInt::from(3i64 << 31));
    }

    #[test]
    fn single_bits() {
        let five = BigInt::from(5);
        assert!(five.test_bit(0));
        assert!(!five.test_bit(1));
        assert!(BigInt::from(-1).test_bit(1000));

        assert_eq!(BigInt::zero().set_bit(31), BigInt::from(1i64 << 31));
        assert_eq!(BigInt::from(-1).clear_bit(0), BigInt::from(-2));
        assert_eq!(BigInt::from(-1).clear_bit(63), BigInt::from(-1i128 - (1i128 << 63)));
        assert_eq!(five.flip_bit(2), BigInt::one());
    }

    #[test]
    fn bit_counting() {
        assert_eq!(BigInt::zero().bit_length(), 0);
        assert_eq!(BigInt::from(255).bit_length(), 8);
        assert_eq!(BigInt::from(-256).bit_length(), 8);
        assert_eq!(BigInt::from(u64::MAX).bit_length(), 64);
        assert_eq!(BigInt::from(i64::MIN).bit_length(), 63);
        assert_eq!(BigInt::from(-1).bit_count(), 0);
        assert_eq!(BigInt::from(0b1011).bit_count(), 3);
        assert_eq!(BigInt::from(-8).lowest_set_bit(), Some(3));
        assert_eq!(BigInt::zero().lowest_set_bit(), None);
        assert_eq!(BigInt::one().shift_left(77).lowest_set_bit(), Some(77));
    }
}
