use super::NumericError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt::Display, str::FromStr};

/// How an inexact quotient is brought to its target scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Toward zero, i.e. truncation.
    Down,
    /// Toward positive infinity.
    Ceiling,
    /// Toward negative infinity.
    Floor,
    /// Nearest neighbour, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest neighbour, ties toward zero.
    HalfDown,
    /// Nearest neighbour, ties to the even neighbour.
    HalfEven,
    /// Fails with [`NumericError::InexactResult`] instead of rounding.
    Unnecessary,
}

impl RoundingMode {
    pub const ALL: [RoundingMode; 8] = [
        Self::Up,
        Self::Down,
        Self::Ceiling,
        Self::Floor,
        Self::HalfUp,
        Self::HalfDown,
        Self::HalfEven,
        Self::Unnecessary,
    ];

    /// Looks a mode up by its stable numeric code, `0..=7` in declaration order.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decides whether a truncated quotient moves one unit away from zero.
    ///
    /// Only meaningful for an inexact division. `positive` is the sign of the
    /// exact quotient, `half` compares twice the remainder with the divisor
    /// (both in magnitude) and `odd` is the parity of the truncated quotient.
    pub(super) fn rounds_away(self, positive: bool, half: Ordering, odd: bool) -> Result<bool> {
        let away = match self {
            Self::Up => true,
            Self::Down => false,
            Self::Ceiling => positive,
            Self::Floor => !positive,
            Self::HalfUp => half != Ordering::Less,
            Self::HalfDown => half == Ordering::Greater,
            Self::HalfEven => match half {
                Ordering::Equal => odd,
                _ => half == Ordering::Greater,
            },
            Self::Unnecessary => return Err(NumericError::InexactResult),
        };

        Ok(away)
    }
}

impl Display for RoundingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Ceiling => "CEILING",
            Self::Floor => "FLOOR",
            Self::HalfUp => "HALF_UP",
            Self::HalfDown => "HALF_DOWN",
            Self::HalfEven => "HALF_EVEN",
            Self::Unnecessary => "UNNECESSARY",
        };

        f.write_str(name)
    }
}

impl FromStr for RoundingMode {
    type Err = NumericError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| NumericError::Format(format!("unknown rounding mode '{s}'")))
    }
}
