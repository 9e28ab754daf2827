//! Number-theoretic operations on [`BigInt`].

use super::{integer::BigInt, mpn, NumericError};
use crate::Result;

/// Every prime below 256. Trial divisors and Miller-Rabin witness bases.
const SMALL_PRIMES: [u32; 54] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
    101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191, 193,
    197, 199, 211, 223, 227, 229, 233, 239, 241, 251,
];

/// Miller-Rabin rounds for an error probability below 2^-80, by bit length.
/// From note 4.49 of the Handbook of Applied Cryptography.
const WITNESS_ROUNDS: [(u32, usize); 12] = [
    (100, 27),
    (150, 18),
    (200, 15),
    (250, 12),
    (300, 9),
    (350, 8),
    (400, 7),
    (500, 6),
    (600, 5),
    (800, 4),
    (1250, 3),
    (u32::MAX, 2),
];

/// Extended Euclid, recursive so each partial quotient is still around while
/// unwinding. Returns the Bezout pair for `(a, b)` shifted by `prev_quotient`.
fn euclid_inverse(a: &BigInt, b: &BigInt, prev_quotient: &BigInt) -> Result<(BigInt, BigInt)> {
    if b.is_zero() {
        return Err(NumericError::NotInvertible);
    }
    if b.is_one() {
        return Ok((prev_quotient.negate(), BigInt::one()));
    }

    let (quotient, remainder) = a.div_rem_nonzero(b);
    let (x, y) = euclid_inverse(b, &remainder, &quotient)?;

    Ok((y.subtract(&x.multiply(prev_quotient)), x))
}

impl BigInt {
    /// Greatest common divisor, never negative. `gcd(0, y)` is `|y|`.
    pub fn gcd(&self, other: &Self) -> Self {
        if let (Some(a), Some(b)) = (self.to_i64(), other.to_i64()) {
            let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
            while b != 0 {
                (a, b) = (b, a % b);
            }
            return Self::from(a);
        }

        if self.is_zero() {
            return other.abs();
        }
        if other.is_zero() {
            return self.abs();
        }

        let (mut x, mut y) = (self.magnitude(), other.magnitude());
        let len = x.len().max(y.len()) + 1;
        x.resize(len, 0);
        y.resize(len, 0);

        let len = mpn::gcd(&mut x, &mut y);
        Self::from_magnitude(false, &x[..len])
    }

    /// `self^exponent mod modulus` with a non-negative exponent and a modulus
    /// known to be positive.
    fn pow_mod_positive(&self, exponent: &Self, modulus: &Self) -> Self {
        if modulus.is_one() {
            return Self::zero();
        }

        let mut result = Self::one();
        let mut base = self.rem_positive(modulus);

        for bit in 0..exponent.bit_length() {
            if exponent.test_bit(bit) {
                result = result.multiply(&base).rem_positive(modulus);
            }
            base = base.multiply(&base).rem_positive(modulus);
        }

        result
    }

    /// Modular exponentiation. A negative exponent raises the modular inverse.
    pub fn mod_pow(&self, exponent: &Self, modulus: &Self) -> Result<Self> {
        if modulus.signum() <= 0 {
            return Err(NumericError::InvalidModulus);
        }

        match exponent.is_negative() {
            true => Ok(self
                .mod_inverse(modulus)?
                .pow_mod_positive(&exponent.negate(), modulus)),
            _ => Ok(self.pow_mod_positive(exponent, modulus)),
        }
    }

    /// The `y` in `0..modulus` with `self * y ≡ 1 (mod modulus)`.
    pub fn mod_inverse(&self, modulus: &Self) -> Result<Self> {
        if modulus.signum() <= 0 {
            return Err(NumericError::InvalidModulus);
        }
        if modulus.is_one() {
            return Ok(Self::zero());
        }

        let x = self.rem_positive(modulus);
        if x.is_one() {
            return Ok(Self::one());
        }
        if x.is_zero() {
            return Err(NumericError::NotInvertible);
        }

        let (quotient, remainder) = modulus.div_rem_nonzero(&x);
        let (inverse, _) = euclid_inverse(&x, &remainder, &quotient)?;

        Ok(match inverse.is_negative() {
            true => inverse.add(modulus),
            _ => inverse,
        })
    }

    /// Probabilistic primality test.
    ///
    /// Composites with a factor below 256 are rejected by trial division and
    /// those primes themselves are accepted outright. Everything else goes
    /// through Miller-Rabin with the first primes as fixed bases, the number
    /// of rounds chosen by bit length and doubled when `certainty > 80`.
    /// Values below two are never prime and a `certainty <= 0` is always
    /// satisfied.
    pub fn is_probable_prime(&self, certainty: i32) -> bool {
        if certainty <= 0 {
            return true;
        }
        if self.signum() <= 0 || self.is_one() {
            return false;
        }

        let magnitude = self.magnitude();
        for &prime in &SMALL_PRIMES {
            if magnitude == [prime] {
                return true;
            }
            if mpn::mod_1(&magnitude, prime) == 0 {
                return false;
            }
        }

        let minus_one = self.subtract(&Self::one());
        let twos = minus_one.lowest_set_bit().unwrap_or(0);
        let odd_part = minus_one.shr_bits(twos);

        let bits = self.bit_length();
        let mut rounds = WITNESS_ROUNDS
            .iter()
            .find(|(limit, _)| bits <= *limit)
            .map_or(2, |(_, rounds)| *rounds);
        if certainty > 80 {
            rounds *= 2;
        }

        SMALL_PRIMES.iter().take(rounds).all(|&base| {
            let mut z = Self::from(base).pow_mod_positive(&odd_part, self);
            if z.is_one() || z == minus_one {
                return true;
            }

            for _ in 1..twos {
                z = z.multiply(&z).rem_positive(self);
                if z == minus_one {
                    return true;
                }
                if z.is_one() {
                    return false;
                }
            }

            false
        })
    }
}
