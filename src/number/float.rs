//! `f64` backend.
use super::{parse_plain_decimal, plain_string, Number, NumberError, NumberFactory};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::BigInt;
use std::fmt;
use std::num::NonZeroU64;

/// Significant digits kept when rendering a float.
const DISPLAY_DIGITS: u64 = 34;

/// Relative tolerance for `is_nearly_equal_to`.
const RELATIVE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct FloatNumber(pub f64);

impl FloatNumber {
    pub fn value(&self) -> f64 { self.0 }

    /// The exact binary value as `mantissa * 10^-scale`. Only valid for finite values.
    fn exact_decimal(&self) -> (BigInt, i64) {
        let bits = self.0.to_bits();
        let negative = bits >> 63 == 1;
        let raw_exponent = ((bits >> 52) & 0x7ff) as i64;
        let fraction = bits & 0x000f_ffff_ffff_ffff;
        let (mantissa, exponent) = if raw_exponent == 0 {
            (fraction << 1, raw_exponent - 1075)
        } else {
            (fraction | 0x0010_0000_0000_0000, raw_exponent - 1075)
        };

        let mut mantissa = BigInt::from(mantissa);
        if negative {
            mantissa = -mantissa;
        }

        if exponent >= 0 {
            (mantissa << exponent as usize, 0)
        } else {
            // m * 2^-k == m * 5^k / 10^k
            let k = (-exponent) as u32;
            (mantissa * BigInt::from(5u8).pow(k), i64::from(k))
        }
    }
}

impl From<f64> for FloatNumber {
    fn from(value: f64) -> Self { Self(value) }
}

impl Number for FloatNumber {
    fn multiply(&self, other: &Self) -> Self {
        Self(self.0 * other.0)
    }

    fn divide(&self, other: &Self) -> Result<Self, NumberError> {
        Ok(Self(self.0 / other.0))
    }

    fn inverse(&self) -> Result<Self, NumberError> {
        Ok(Self(1.0 / self.0))
    }

    fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    fn is_nearly_equal_to(&self, other: &Self) -> bool {
        if self.0 == other.0 {
            return true;
        }
        if !self.0.is_finite() || !other.0.is_finite() {
            return false;
        }
        let scale = self.0.abs().max(other.0.abs());
        (self.0 - other.0).abs() <= RELATIVE_TOLERANCE * scale
    }
}

/// Exact binary expansion rounded half-up to 34 significant digits, plain notation.
impl fmt::Display for FloatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_nan() {
            return f.write_str("NaN");
        }
        if self.0.is_infinite() {
            return f.write_str(if self.0 > 0.0 { "Infinity" } else { "-Infinity" });
        }

        let (mantissa, scale) = self.exact_decimal();
        let digits = NonZeroU64::new(DISPLAY_DIGITS).unwrap_or(NonZeroU64::MIN);
        let rounded = BigDecimal::new(mantissa, scale).with_precision_round(digits, RoundingMode::HalfUp);
        let (mantissa, scale) = rounded.as_bigint_and_exponent();
        f.write_str(&plain_string(&mantissa, scale))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatFactory;

impl NumberFactory for FloatFactory {
    type Number = FloatNumber;

    fn one(&self) -> FloatNumber {
        FloatNumber(1.0)
    }

    fn parse(&self, text: &str) -> Result<FloatNumber, NumberError> {
        parse_plain_decimal(text)?;
        // The grammar is a subset of what `f64::from_str` accepts.
        text.parse::<f64>()
            .map(FloatNumber)
            .map_err(|_| NumberError::NoDigits { text: text.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn num(x: f64) -> FloatNumber { FloatNumber(x) }

    #[test]
    fn test_arithmetic() {
        assert_relative_eq!(num(3.0).multiply(&num(9.1)).value(), 27.3, epsilon = 1e-10);
        assert_eq!(num(3.0).divide(&num(2.0)).unwrap(), num(1.5));
        assert_eq!(num(5.0).inverse().unwrap(), num(0.2));
    }

    #[test]
    fn test_division_by_zero_is_infinite() {
        // IEEE semantics, not an error.
        let quotient = num(3.0).divide(&num(0.0)).unwrap();
        assert!(quotient.value().is_infinite() && quotient.value() > 0.0);
        let inverse = num(0.0).inverse().unwrap();
        assert_eq!(inverse.value(), f64::INFINITY);
    }

    #[rstest]
    #[case(5.0, true)]
    #[case(1e-30, true)]
    #[case(f64::MIN_POSITIVE, true)]
    #[case(5e-324, true)]
    #[case(0.0, false)]
    #[case(-3.0, false)]
    fn test_positivity(#[case] x: f64, #[case] expected: bool) {
        assert_eq!(num(x).is_positive(), expected);
        assert_eq!(num(x).is_approximately_positive(), expected);
    }

    #[test]
    fn test_nearly_equal_is_relative() {
        assert!(num(1.0).is_nearly_equal_to(&num(1.0 + 1e-12)));
        assert!(num(1e300).is_nearly_equal_to(&num(1e300 * (1.0 + 1e-12))));
        assert!(!num(1.0).is_nearly_equal_to(&num(1.001)));
        assert!(num(f64::INFINITY).is_nearly_equal_to(&num(f64::INFINITY)));
        assert!(!num(f64::NAN).is_nearly_equal_to(&num(f64::NAN)));
    }

    #[rstest]
    #[case(f64::INFINITY, 1.0)]
    #[case(f64::INFINITY, f64::MAX)]
    #[case(f64::MAX, f64::INFINITY)]
    #[case(f64::NEG_INFINITY, -1e308)]
    #[case(f64::NAN, 1.0)]
    fn test_non_finite_is_never_near_a_finite_value(#[case] a: f64, #[case] b: f64) {
        assert!(!num(a).is_nearly_equal_to(&num(b)));
        assert!(!num(a).is_finite() || !num(b).is_finite());
    }

    #[test]
    fn test_display_rounds_to_34_significant_digits() {
        let x = num(1.0).divide(&num(3.0)).unwrap().multiply(&num(1000.0));
        assert_eq!(x.to_string(), "333.3333333333333143855270463973284");

        let y = num(2.0).divide(&num(3.0)).unwrap().multiply(&num(1000.0));
        assert_eq!(y.to_string(), "666.6666666666666287710540927946568");
    }

    #[rstest]
    #[case(1.5, "1.5")]
    #[case(1000.0, "1000")]
    #[case(-0.25, "-0.25")]
    #[case(0.0, "0")]
    #[case(f64::INFINITY, "Infinity")]
    #[case(f64::NEG_INFINITY, "-Infinity")]
    fn test_display_plain(#[case] x: f64, #[case] expected: &str) {
        assert_eq!(num(x).to_string(), expected);
    }

    #[test]
    fn test_display_round_trips() {
        let x = 13.565;
        let rendered = num(x).to_string();
        assert_eq!(rendered.parse::<f64>().unwrap(), x);
        assert_eq!(FloatFactory.parse(&rendered).unwrap(), num(x));
    }

    #[test]
    fn test_factory() {
        assert_eq!(FloatFactory.one(), num(1.0));
        assert_eq!(FloatFactory.parse("-0.5").unwrap(), num(-0.5));
        assert!(FloatFactory.parse("1e3").is_err());
        assert!(FloatFactory.parse("inf").is_err());
        assert_eq!(FloatFactory.parse_optional(None), Err(NumberError::MissingInput));
    }
}
