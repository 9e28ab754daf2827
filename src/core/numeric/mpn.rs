//! Word-vector primitives.
//!
//! Stateless routines over little-endian `u32` slices holding non-negative
//! magnitudes. Nothing here owns a value: callers hand in correctly sized
//! buffers and a buffer that is too short is a bug in the caller, so the
//! routines panic (through slice indexing or `assert!`) instead of returning
//! an error.

use std::cmp::Ordering;

pub(crate) const WORD_BITS: u32 = u32::BITS;

/// Digit alphabet used by every radix conversion.
pub(crate) const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Strips the most significant zero words.
#[inline]
pub(crate) fn trim(words: &[u32]) -> &[u32] {
    let len = words.iter().rposition(|&w| w != 0).map_or(0, |top| top + 1);
    &words[..len]
}

/// `acc += y`, where `y` is not longer than `acc`. Returns the carry out of
/// the most significant word of `acc`.
pub(crate) fn add_n(acc: &mut [u32], y: &[u32]) -> u32 {
    assert!(y.len() <= acc.len(), "addend longer than accumulator");
    let mut carry = 0u64;

    for (idx, word) in acc.iter_mut().enumerate() {
        if idx >= y.len() && carry == 0 {
            break;
        }
        let sum = *word as u64 + y.get(idx).copied().unwrap_or(0) as u64 + carry;
        *word = sum as u32;
        carry = sum >> WORD_BITS;
    }

    carry as u32
}

/// `acc -= y`, where `y` is not longer than `acc`. Returns the borrow out of
/// the most significant word.
pub(crate) fn sub_n(acc: &mut [u32], y: &[u32]) -> u32 {
    assert!(y.len() <= acc.len(), "subtrahend longer than accumulator");
    let mut borrow = 0i64;

    for (idx, word) in acc.iter_mut().enumerate() {
        if idx >= y.len() && borrow == 0 {
            break;
        }
        let diff = *word as i64 - y.get(idx).copied().unwrap_or(0) as i64 - borrow;
        *word = diff as u32;
        borrow = (diff < 0) as i64;
    }

    borrow as u32
}

/// `words = words * multiplier + addend`, returning the word that no longer fits.
pub(crate) fn mul_add_1(words: &mut [u32], multiplier: u32, addend: u32) -> u32 {
    let mut carry = addend as u64;

    for word in words.iter_mut() {
        let product = *word as u64 * multiplier as u64 + carry;
        *word = product as u32;
        carry = product >> WORD_BITS;
    }

    carry as u32
}

/// `dest += x * y`, returning the carry word.
fn addmul_1(dest: &mut [u32], x: &[u32], y: u32) -> u32 {
    let mut carry = 0u64;

    for (d, &w) in dest.iter_mut().zip(x) {
        let t = *d as u64 + w as u64 * y as u64 + carry;
        *d = t as u32;
        carry = t >> WORD_BITS;
    }

    carry as u32
}

/// Schoolbook multiplication. `dest` must hold at least `x.len() + y.len()`
/// words; the borrow checker already rules out aliasing with the inputs.
pub(crate) fn mul(dest: &mut [u32], x: &[u32], y: &[u32]) {
    let len = x.len() + y.len();
    assert!(dest.len() >= len, "product buffer too small");
    dest[..len].fill(0);

    for (j, &yj) in y.iter().enumerate() {
        if yj == 0 {
            continue;
        }
        dest[j + x.len()] = addmul_1(&mut dest[j..j + x.len()], x, yj);
    }
}

/// Divides `words` in place by a single word, returning the remainder.
pub(crate) fn div_mod_1(words: &mut [u32], divisor: u32) -> u32 {
    assert!(divisor != 0, "single word division by zero");
    let divisor = divisor as u64;
    let mut rem = 0u64;

    for word in words.iter_mut().rev() {
        let current = rem << WORD_BITS | *word as u64;
        *word = (current / divisor) as u32;
        rem = current % divisor;
    }

    rem as u32
}

/// Remainder of `words` by a single word, without touching `words`.
pub(crate) fn mod_1(words: &[u32], divisor: u32) -> u32 {
    assert!(divisor != 0, "single word division by zero");
    let divisor = divisor as u64;

    words
        .iter()
        .rev()
        .fold(0u64, |rem, &word| (rem << WORD_BITS | word as u64) % divisor) as u32
}

/// Shifts `words` left by `count < 32` bits in place, returning the bits
/// shifted out of the top word.
pub(crate) fn lshift(words: &mut [u32], count: u32) -> u32 {
    assert!(count < WORD_BITS, "bit shift of {count} is not below a word");
    if count == 0 {
        return 0;
    }

    let back = WORD_BITS - count;
    let mut carry = 0;
    for word in words.iter_mut() {
        let value = *word;
        *word = value << count | carry;
        carry = value >> back;
    }

    carry
}

/// Logical right shift by `count < 32` bits in place. Returns the bits shifted
/// out of the bottom word, left-aligned.
pub(crate) fn rshift(words: &mut [u32], count: u32) -> u32 {
    assert!(count < WORD_BITS, "bit shift of {count} is not below a word");
    if count == 0 {
        return 0;
    }

    let back = WORD_BITS - count;
    let mut carry = 0;
    for word in words.iter_mut().rev() {
        let value = *word;
        *word = value >> count | carry;
        carry = value << back;
    }

    carry
}

/// Unsigned comparison, most significant word first. Leading zero words
/// don't count.
pub(crate) fn cmp(x: &[u32], y: &[u32]) -> Ordering {
    let (x, y) = (trim(x), trim(y));

    x.len()
        .cmp(&y.len())
        .then_with(|| x.iter().rev().cmp(y.iter().rev()))
}

/// Number of significant bits of the magnitude.
pub(crate) fn bit_length(words: &[u32]) -> u32 {
    match trim(words) {
        [] => 0,
        trimmed => {
            let top = trimmed[trimmed.len() - 1];
            (trimmed.len() as u32 - 1) * WORD_BITS + (WORD_BITS - top.leading_zeros())
        }
    }
}

/// Index of the lowest set bit, if any.
pub(crate) fn lowest_set_bit(words: &[u32]) -> Option<u32> {
    words
        .iter()
        .position(|&w| w != 0)
        .map(|idx| idx as u32 * WORD_BITS + words[idx].trailing_zeros())
}

/// Long division of magnitudes, returning `(quotient, remainder)`.
///
/// Single-word divisors go through [`div_mod_1`]. Everything else runs
/// Knuth's Algorithm D: both operands are shifted left until the divisor's
/// top word has its high bit set, each quotient word is estimated from the
/// top two dividend words and corrected, and the remainder is shifted back.
pub(crate) fn div_rem(dividend: &[u32], divisor: &[u32]) -> (Vec<u32>, Vec<u32>) {
    let dividend = trim(dividend);
    let divisor = trim(divisor);
    assert!(!divisor.is_empty(), "division by a zero magnitude");

    if cmp(dividend, divisor) == Ordering::Less {
        return (Vec::new(), dividend.to_vec());
    }

    if divisor.len() == 1 {
        let mut quotient = dividend.to_vec();
        let rem = div_mod_1(&mut quotient, divisor[0]);
        return (quotient, vec![rem]);
    }

    let (m, n) = (dividend.len(), divisor.len());
    let shift = divisor[n - 1].leading_zeros();

    let mut vn = divisor.to_vec();
    lshift(&mut vn, shift);

    let mut un = Vec::with_capacity(m + 1);
    un.extend_from_slice(dividend);
    un.push(0);
    un[m] = lshift(&mut un[..m], shift);

    let mut quotient = vec![0u32; m - n + 1];
    divide_normalized(&mut un, &vn, &mut quotient);

    un.truncate(n);
    rshift(&mut un, shift);

    (quotient, un)
}

/// The inner loop of Algorithm D. `un` holds the normalised dividend plus one
/// extra word and is left holding the normalised remainder in `un[..vn.len()]`.
fn divide_normalized(un: &mut [u32], vn: &[u32], quotient: &mut [u32]) {
    const BASE: u64 = 1 << WORD_BITS;
    const LOW: u64 = BASE - 1;

    let n = vn.len();
    let top = vn[n - 1] as u64;
    let next = vn[n - 2] as u64;

    for j in (0..quotient.len()).rev() {
        let numerator = (un[j + n] as u64) << WORD_BITS | un[j + n - 1] as u64;
        let mut qhat = numerator / top;
        let mut rhat = numerator % top;

        while qhat >= BASE || qhat * next > (rhat << WORD_BITS | un[j + n - 2] as u64) {
            qhat -= 1;
            rhat += top;
            if rhat >= BASE {
                break;
            }
        }

        // multiply and subtract qhat * vn from the current window
        let mut borrow = 0i64;
        let mut carry = 0u64;
        for i in 0..n {
            let product = qhat * vn[i] as u64 + carry;
            carry = product >> WORD_BITS;
            let diff = un[i + j] as i64 - borrow - (product & LOW) as i64;
            un[i + j] = diff as u32;
            borrow = (diff < 0) as i64;
        }
        let diff = un[j + n] as i64 - borrow - carry as i64;
        un[j + n] = diff as u32;

        // qhat was one too large: add the divisor back
        if diff < 0 {
            qhat -= 1;
            let mut carry = 0u64;
            for i in 0..n {
                let sum = un[i + j] as u64 + vn[i] as u64 + carry;
                un[i + j] = sum as u32;
                carry = sum >> WORD_BITS;
            }
            un[j + n] = un[j + n].wrapping_add(carry as u32);
        }

        quotient[j] = qhat as u32;
    }
}

/// Binary GCD of two non-zero magnitudes of equal length, in place.
///
/// Returns the number of significant words; the result is left in
/// `x[..len]`. `x` keeps its original length, which always leaves room to
/// restore the common power of two.
pub(crate) fn gcd(x: &mut [u32], y: &mut [u32]) -> usize {
    assert_eq!(x.len(), y.len(), "gcd operands must have equal length");
    let mut len = x.len();

    let mut idx = 0;
    while x[idx] | y[idx] == 0 {
        idx += 1;
    }
    let shift_words = idx;
    let shift_bits = (x[idx] | y[idx]).trailing_zeros();

    // divide both by the common power of two
    len -= shift_words;
    for words in [&mut *x, &mut *y] {
        words.copy_within(shift_words.., 0);
        words[len..].fill(0);
        rshift(&mut words[..len], shift_bits);
    }

    let (mut odd, mut other): (&mut [u32], &mut [u32]) = match x[0] & 1 {
        1 => (&mut *x, &mut *y),
        _ => (&mut *y, &mut *x),
    };

    loop {
        // `other` is never zero here, so this terminates
        let zeros = other.iter().position(|&w| w != 0).unwrap_or(0);
        if zeros > 0 {
            other.copy_within(zeros..len, 0);
            other[len - zeros..len].fill(0);
        }
        let bits = other[0].trailing_zeros();
        rshift(&mut other[..len], bits);

        match cmp(&odd[..len], &other[..len]) {
            Ordering::Equal => break,
            Ordering::Greater => {
                sub_n(&mut odd[..len], &other[..len]);
                std::mem::swap(&mut odd, &mut other);
            }
            Ordering::Less => {
                sub_n(&mut other[..len], &odd[..len]);
            }
        }

        while len > 1 && odd[len - 1] == 0 && other[len - 1] == 0 {
            len -= 1;
        }
    }

    if shift_words > 0 || shift_bits > 0 {
        let carry = lshift(&mut x[..len], shift_bits);
        if carry != 0 {
            x[len] = carry;
            len += 1;
        }
        x.copy_within(..len, shift_words);
        x[..shift_words].fill(0);
        len += shift_words;
    }

    len
}

/// Largest power of `radix` that fits in a word, as `(exponent, power)`.
pub(crate) fn chars_per_word(radix: u32) -> (usize, u32) {
    let (mut count, mut power) = (1, radix as u64);
    while power * radix as u64 <= u32::MAX as u64 {
        power *= radix as u64;
        count += 1;
    }

    (count, power as u32)
}

/// Converts a magnitude into big-endian digit values of `radix`.
/// Zero converts to a single `0` digit.
pub(crate) fn to_radix_digits(words: &[u32], radix: u32) -> Vec<u8> {
    assert!((2..=36).contains(&radix), "radix {radix} outside 2..=36");

    let mut work = trim(words).to_vec();
    if work.is_empty() {
        return vec![0];
    }

    let (chars, big_base) = chars_per_word(radix);
    let mut digits = Vec::with_capacity(work.len() * chars);

    while !work.is_empty() {
        let mut chunk = div_mod_1(&mut work, big_base);
        let len = trim(&work).len();
        work.truncate(len);

        for _ in 0..chars {
            if work.is_empty() && chunk == 0 {
                break;
            }
            digits.push((chunk % radix) as u8);
            chunk /= radix;
        }
    }

    digits.reverse();
    digits
}

/// Builds a magnitude from big-endian digit values of `radix`.
pub(crate) fn from_radix_digits(digits: &[u8], radix: u32) -> Vec<u32> {
    assert!((2..=36).contains(&radix), "radix {radix} outside 2..=36");

    let (chars, _) = chars_per_word(radix);
    let mut words = Vec::with_capacity(digits.len() / chars + 1);

    for chunk in digits.chunks(chars) {
        let value = chunk
            .iter()
            .fold(0u32, |acc, &digit| acc * radix + digit as u32);
        let multiplier = radix.pow(chunk.len() as u32);

        let carry = mul_add_1(&mut words, multiplier, value);
        if carry != 0 {
            words.push(carry);
        }
    }

    words
}
