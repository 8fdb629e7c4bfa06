//! Arbitrary-precision decimal backend.
//!
//! Every value carries a shared [`Precision`]: the number of significant digits
//! kept by `multiply`/`divide`/`inverse`, the rounding mode, and the absolute
//! tolerance used by `is_nearly_equal_to` and `is_approximately_positive`.
//! Parsing never rounds; the full input is kept.
use super::{digit_count, parse_plain_decimal, plain_string, Number, NumberError, NumberFactory};
use bigdecimal::{BigDecimal, RoundingMode};
use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;

/// Rounding applied when a result exceeds the configured precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    Up,
    Down,
    Ceiling,
    Floor,
    HalfUp,
    HalfDown,
    #[default]
    HalfEven,
}

impl From<Rounding> for RoundingMode {
    fn from(rounding: Rounding) -> Self {
        match rounding {
            Rounding::Up => RoundingMode::Up,
            Rounding::Down => RoundingMode::Down,
            Rounding::Ceiling => RoundingMode::Ceiling,
            Rounding::Floor => RoundingMode::Floor,
            Rounding::HalfUp => RoundingMode::HalfUp,
            Rounding::HalfDown => RoundingMode::HalfDown,
            Rounding::HalfEven => RoundingMode::HalfEven,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Precision {
    pub digits: NonZeroU64,
    pub rounding: Rounding,
    /// Maximum absolute difference for two values to count as equal.
    pub epsilon: BigDecimal,
}

impl Precision {
    pub const DEFAULT_DIGITS: u64 = 34;
    /// Largest digit count the long division can scale by.
    pub const MAX_DIGITS: u64 = u32::MAX as u64;

    pub fn new(digits: NonZeroU64, rounding: Rounding, epsilon: BigDecimal) -> Self {
        Self { digits, rounding, epsilon: epsilon.abs() }
    }

    fn round(&self, value: BigDecimal) -> BigDecimal {
        value.with_precision_round(self.digits, self.rounding.into())
    }

    /// `numerator / denominator` rounded to `digits`.
    ///
    /// Long division over the unscaled integers keeps two guard digits and a
    /// sticky digit for a non-zero remainder, so the final rounding is exact
    /// at any precision.
    pub(crate) fn divide(&self, numerator: &BigDecimal, denominator: &BigDecimal) -> Result<BigDecimal, NumberError> {
        if denominator.is_zero() {
            return Err(NumberError::DivisionByZero);
        }

        let (num_mantissa, num_scale) = numerator.as_bigint_and_exponent();
        let (den_mantissa, den_scale) = denominator.as_bigint_and_exponent();
        let negative = (num_mantissa.sign() == Sign::Minus) != (den_mantissa.sign() == Sign::Minus);
        let (num_mantissa, den_mantissa) = (num_mantissa.abs(), den_mantissa.abs());

        let wanted = self.digits.get().saturating_add(2 + digit_count(&den_mantissa));
        let shift = wanted.saturating_sub(digit_count(&num_mantissa));
        let exponent = u32::try_from(shift).map_err(|_| NumberError::PrecisionTooLarge { digits: self.digits.get() })?;
        let scaled = num_mantissa * BigInt::from(10u8).pow(exponent);

        let mut quotient = &scaled / &den_mantissa;
        let remainder = &scaled % &den_mantissa;
        let mut scale = num_scale - den_scale + shift as i64;
        if !remainder.is_zero() {
            quotient = quotient * 10 + 1;
            scale += 1;
        }
        if negative {
            quotient = -quotient;
        }

        Ok(self.round(BigDecimal::new(quotient, scale)))
    }
}

/// IEEE 754 decimal128 context (34 digits, half-even) with a `1e-20` tolerance.
impl Default for Precision {
    fn default() -> Self {
        let digits = NonZeroU64::new(Self::DEFAULT_DIGITS).unwrap_or(NonZeroU64::MIN);
        Self::new(digits, Rounding::HalfEven, BigDecimal::new(BigInt::one(), 20))
    }
}

#[derive(Debug, Clone)]
pub struct DecimalNumber {
    value: BigDecimal,
    precision: Arc<Precision>,
}

impl DecimalNumber {
    pub fn new(value: BigDecimal, precision: Arc<Precision>) -> Self {
        Self { value, precision }
    }

    pub fn value(&self) -> &BigDecimal { &self.value }
    pub fn precision(&self) -> &Precision { &self.precision }
    pub fn into_value(self) -> BigDecimal { self.value }

    fn with_value(&self, value: BigDecimal) -> Self {
        Self { value, precision: Arc::clone(&self.precision) }
    }
}

/// Numeric equality; `1.50 == 1.5` and the precision is not compared.
impl PartialEq for DecimalNumber {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Number for DecimalNumber {
    fn multiply(&self, other: &Self) -> Self {
        self.with_value(self.precision.round(&self.value * &other.value))
    }

    fn divide(&self, other: &Self) -> Result<Self, NumberError> {
        Ok(self.with_value(self.precision.divide(&self.value, &other.value)?))
    }

    fn inverse(&self) -> Result<Self, NumberError> {
        Ok(self.with_value(self.precision.divide(&BigDecimal::one(), &self.value)?))
    }

    fn is_positive(&self) -> bool {
        self.value > BigDecimal::zero()
    }

    fn is_approximately_positive(&self) -> bool {
        self.value > self.precision.epsilon
    }

    fn is_nearly_equal_to(&self, other: &Self) -> bool {
        (&self.value - &other.value).abs() <= self.precision.epsilon
    }
}

/// Plain notation with every stored digit, trailing fractional zeros dropped.
impl fmt::Display for DecimalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (mantissa, scale) = self.value.as_bigint_and_exponent();
        f.write_str(&plain_string(&mantissa, scale))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DecimalFactory {
    precision: Arc<Precision>,
}

impl DecimalFactory {
    pub fn new(precision: Precision) -> Self {
        Self { precision: Arc::new(precision) }
    }

    pub fn precision(&self) -> &Precision { &self.precision }
}

impl NumberFactory for DecimalFactory {
    type Number = DecimalNumber;

    fn one(&self) -> DecimalNumber {
        DecimalNumber::new(BigDecimal::one(), Arc::clone(&self.precision))
    }

    fn parse(&self, text: &str) -> Result<DecimalNumber, NumberError> {
        let (mantissa, scale) = parse_plain_decimal(text)?.mantissa_and_scale();
        Ok(DecimalNumber::new(BigDecimal::new(mantissa, scale), Arc::clone(&self.precision)))
    }
}
