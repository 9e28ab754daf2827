use super::RoundingMode;
use serde::{Deserialize, Serialize};

/// Knobs for the operations whose result is not exact.
///
/// Missing fields take their default when deserialised, so an empty object is
/// the default context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumericContext {
    /// Lower bound on the significant digits of a quotient.
    pub min_division_digits: u32,
    /// Upper bound on the scale of a quotient.
    pub max_division_scale: u32,
    pub rounding: RoundingMode,
    /// Significant digits kept when a native `f64` result is brought back.
    pub double_precision: u32,
}

impl NumericContext {
    pub const DEFAULT: Self = Self {
        min_division_digits: 16,
        max_division_scale: 1000,
        rounding: RoundingMode::HalfUp,
        double_precision: 15,
    };
}

impl Default for NumericContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let ctx: NumericContext =
            serde_json::from_str(r#"{ "rounding": "HALF_EVEN", "max_division_scale": 20 }"#)
                .unwrap();

        assert_eq!(ctx.rounding, RoundingMode::HalfEven);
        assert_eq!(ctx.max_division_scale, 20);
        assert_eq!(ctx.min_division_digits, 16);
        assert_eq!(ctx.double_precision, 15);

        let empty: NumericContext = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, NumericContext::default());
    }

    #[test]
    fn round_trips_through_json() {
        let ctx = NumericContext {
            rounding: RoundingMode::Floor,
            ..Default::default()
        };
        let json = serde_json::to_string(&ctx).unwrap();

        assert!(json.contains(r#""rounding":"FLOOR""#));
        assert_eq!(serde_json::from_str::<NumericContext>(&json).unwrap(), ctx);
    }
}
