//! The numeric abstraction shared by the whole conversion engine.
//!
//! Graph, network and converter code is written once against [`Number`] and
//! [`NumberFactory`] and monomorphised for each backend:
//! - [`FloatNumber`]: native `f64`, fast, IEEE semantics on division by zero.
//! - [`DecimalNumber`]: arbitrary-precision decimal with a shared [`Precision`].
//! - [`RationalNumber`]: exact fraction of big integers.

pub mod decimal;
pub mod float;
pub mod rational;

pub use decimal::{DecimalFactory, DecimalNumber, Precision, Rounding};
pub use float::{FloatFactory, FloatNumber};
pub use rational::{RationalFactory, RationalNumber};

use num_bigint::BigInt;
use std::fmt::{Debug, Display};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumberError {
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Number text is missing")]
    MissingInput,
    #[error("Number text is empty")]
    Empty,
    #[error("Number '{text}' has more than one decimal point")]
    MultipleDecimalPoints { text: String },
    #[error("Number '{text}' has invalid character '{character}' at position {position}")]
    InvalidCharacter { text: String, character: char, position: usize },
    #[error("Number '{text}' has no digits")]
    NoDigits { text: String },
    #[error("Precision of {digits} digits is too large")]
    PrecisionTooLarge { digits: u64 },
}

/// Arithmetic contract implemented by every numeric backend.
///
/// Binary operations take `&Self`, so mixing backends is a compile error.
pub trait Number: Clone + PartialEq + Debug + Display + Send + Sync + 'static {
    fn multiply(&self, other: &Self) -> Self;

    /// Fails with [`NumberError::DivisionByZero`] for exact backends;
    /// [`FloatNumber`] follows IEEE semantics and never fails.
    fn divide(&self, other: &Self) -> Result<Self, NumberError>;

    fn inverse(&self) -> Result<Self, NumberError>;

    /// Strictly greater than zero.
    fn is_positive(&self) -> bool;

    /// Greater than the backend's tolerance. Only [`DecimalNumber`] has one.
    fn is_approximately_positive(&self) -> bool {
        self.is_positive()
    }

    fn is_nearly_equal_to(&self, other: &Self) -> bool;

    /// False for values outside the backend's range. Only [`FloatNumber`] has any.
    fn is_finite(&self) -> bool {
        true
    }
}

/// Creates numbers of one backend in a fixed context (e.g. a decimal precision).
pub trait NumberFactory: Clone + Debug + Send + Sync + 'static {
    type Number: Number;

    fn one(&self) -> Self::Number;

    fn parse(&self, text: &str) -> Result<Self::Number, NumberError>;

    /// `None` is a caller-contract violation, reported apart from format errors.
    fn parse_optional(&self, text: Option<&str>) -> Result<Self::Number, NumberError> {
        match text {
            Some(text) => self.parse(text),
            None => Err(NumberError::MissingInput),
        }
    }
}

/// A validated plain decimal split into its parts.
/// `"-12.50"` -> negative, integer `"12"`, fraction `"50"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlainDecimal<'a> {
    pub negative: bool,
    pub integer: &'a str,
    pub fraction: &'a str,
}

impl PlainDecimal<'_> {
    /// Unscaled digits and the scale, so that `value = mantissa * 10^-scale`.
    pub fn mantissa_and_scale(&self) -> (BigInt, i64) {
        let digits = format!("{}{}", self.integer, self.fraction);
        // Validated as ASCII digits, so parsing cannot fail.
        let mut mantissa: BigInt = digits.parse().unwrap_or_default();
        if self.negative {
            mantissa = -mantissa;
        }
        (mantissa, self.fraction.len() as i64)
    }
}

/// Validates the grammar `-?digits*(.digits*)?` with at least one digit.
pub(crate) fn parse_plain_decimal(text: &str) -> Result<PlainDecimal<'_>, NumberError> {
    if text.is_empty() {
        return Err(NumberError::Empty);
    }

    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let offset = text.len() - body.len();

    let mut point = None;
    for (i, ch) in body.char_indices() {
        match ch {
            '0'..='9' => {}
            '.' if point.is_none() => point = Some(i),
            '.' => return Err(NumberError::MultipleDecimalPoints { text: text.to_string() }),
            _ => {
                return Err(NumberError::InvalidCharacter {
                    text: text.to_string(),
                    character: ch,
                    position: offset + i,
                })
            }
        }
    }

    let (integer, fraction) = match point {
        Some(p) => (&body[..p], &body[p + 1..]),
        None => (body, ""),
    };
    if integer.is_empty() && fraction.is_empty() {
        return Err(NumberError::NoDigits { text: text.to_string() });
    }

    Ok(PlainDecimal { negative, integer, fraction })
}

/// Renders `mantissa * 10^-scale` in plain notation without trailing fractional zeros.
pub(crate) fn plain_string(mantissa: &BigInt, scale: i64) -> String {
    let negative = mantissa.sign() == num_bigint::Sign::Minus;
    let digits = mantissa.magnitude().to_string();
    if digits == "0" {
        return "0".to_string();
    }

    let mut out = String::with_capacity(digits.len() + 4);
    if negative {
        out.push('-');
    }

    if scale <= 0 {
        out.push_str(&digits);
        out.extend(std::iter::repeat('0').take((-scale) as usize));
        return out;
    }

    let scale = scale as usize;
    let (integer, fraction) = if digits.len() > scale {
        let split = digits.len() - scale;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{}{}", "0".repeat(scale - digits.len()), digits))
    };

    out.push_str(&integer);
    let fraction = fraction.trim_end_matches('0');
    if !fraction.is_empty() {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

/// Number of decimal digits in `|value|` (zero has one digit).
pub(crate) fn digit_count(value: &BigInt) -> u64 {
    value.magnitude().to_string().len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", false, "12", "")]
    #[case("-12.50", true, "12", "50")]
    #[case(".5", false, "", "5")]
    #[case("5.", false, "5", "")]
    #[case("0.001", false, "0", "001")]
    fn test_plain_decimal_accepts(
        #[case] input: &str,
        #[case] negative: bool,
        #[case] integer: &str,
        #[case] fraction: &str,
    ) {
        let parsed = parse_plain_decimal(input).unwrap();
        assert_eq!(parsed, PlainDecimal { negative, integer, fraction });
    }

    #[test]
    fn test_plain_decimal_rejects() {
        assert_eq!(parse_plain_decimal(""), Err(NumberError::Empty));
        assert!(matches!(parse_plain_decimal("1.2.3"), Err(NumberError::MultipleDecimalPoints { .. })));
        assert!(matches!(parse_plain_decimal("-"), Err(NumberError::NoDigits { .. })));
        assert!(matches!(parse_plain_decimal("."), Err(NumberError::NoDigits { .. })));
        assert!(matches!(parse_plain_decimal("--1"), Err(NumberError::InvalidCharacter { position: 1, .. })));
        assert!(matches!(
            parse_plain_decimal("1e5"),
            Err(NumberError::InvalidCharacter { character: 'e', position: 1, .. })
        ));
        assert!(matches!(parse_plain_decimal(" 1"), Err(NumberError::InvalidCharacter { .. })));
    }

    #[rstest]
    #[case(0, 5, "0")]
    #[case(15, 1, "1.5")]
    #[case(1500, 3, "1.5")]
    #[case(1500, 2, "15")]
    #[case(-25, 3, "-0.025")]
    #[case(234, -3, "234000")]
    #[case(1, 0, "1")]
    fn test_plain_string(#[case] mantissa: i64, #[case] scale: i64, #[case] expected: &str) {
        assert_eq!(plain_string(&BigInt::from(mantissa), scale), expected);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(&BigInt::from(0)), 1);
        assert_eq!(digit_count(&BigInt::from(-999)), 3);
        assert_eq!(digit_count(&BigInt::from(1000)), 4);
    }
}
