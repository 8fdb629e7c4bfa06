//! Exact rational backend.
use super::decimal::{Precision, Rounding};
use super::{parse_plain_decimal, plain_string, Number, NumberError, NumberFactory};
use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;
use std::num::NonZeroU64;

/// Always in lowest terms with a positive denominator; zero is `0/1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RationalNumber(BigRational);

impl RationalNumber {
    pub fn new(numerator: BigInt, denominator: BigInt) -> Result<Self, NumberError> {
        if denominator.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Self(BigRational::new(numerator, denominator)))
    }

    pub fn from_integer(value: impl Into<BigInt>) -> Self {
        Self(BigRational::from_integer(value.into()))
    }

    pub fn numerator(&self) -> &BigInt { self.0.numer() }
    pub fn denominator(&self) -> &BigInt { self.0.denom() }

    /// Decimal rendering rounded half-up to `significant_digits`.
    pub fn to_decimal_string(&self, significant_digits: NonZeroU64) -> String {
        let precision = Precision::new(significant_digits, Rounding::HalfUp, BigDecimal::zero());
        let numerator = BigDecimal::new(self.numerator().clone(), 0);
        let denominator = BigDecimal::new(self.denominator().clone(), 0);
        match precision.divide(&numerator, &denominator) {
            Ok(value) => {
                let (mantissa, scale) = value.as_bigint_and_exponent();
                plain_string(&mantissa, scale)
            }
            // The denominator is never zero.
            Err(_) => self.to_string(),
        }
    }

    /// Number of decimal places if the expansion terminates.
    fn terminating_places(&self) -> Option<u64> {
        let mut rest = self.denominator().clone();
        let twos = rest.trailing_zeros().unwrap_or(0);
        rest >>= twos as usize;

        let five = BigInt::from(5u8);
        let mut fives = 0u64;
        while (&rest % &five).is_zero() {
            rest /= &five;
            fives += 1;
        }

        rest.is_one().then_some(twos.max(fives))
    }

    fn parse_plain(text: &str) -> Result<Self, NumberError> {
        let (mantissa, scale) = parse_plain_decimal(text)?.mantissa_and_scale();
        Self::new(mantissa, BigInt::from(10u8).pow(scale as u32))
    }
}

impl Number for RationalNumber {
    fn multiply(&self, other: &Self) -> Self {
        Self(&self.0 * &other.0)
    }

    fn divide(&self, other: &Self) -> Result<Self, NumberError> {
        if other.0.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Self(&self.0 / &other.0))
    }

    fn inverse(&self) -> Result<Self, NumberError> {
        if self.0.is_zero() {
            return Err(NumberError::DivisionByZero);
        }
        Ok(Self(self.0.recip()))
    }

    fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    fn is_nearly_equal_to(&self, other: &Self) -> bool {
        self == other
    }
}

/// Lossless: terminating values render as plain decimals (`0.25`),
/// others as `numerator/denominator` (`5/18`).
impl fmt::Display for RationalNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.terminating_places() {
            Some(places) => {
                let mantissa = self.numerator() * BigInt::from(10u8).pow(places as u32) / self.denominator();
                f.write_str(&plain_string(&mantissa, places as i64))
            }
            None => write!(f, "{}/{}", self.numerator(), self.denominator()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RationalFactory;

impl NumberFactory for RationalFactory {
    type Number = RationalNumber;

    fn one(&self) -> RationalNumber {
        RationalNumber(BigRational::one())
    }

    /// Plain decimals, plus `a/b` with plain-decimal parts so that rendering round-trips.
    fn parse(&self, text: &str) -> Result<RationalNumber, NumberError> {
        match text.split_once('/') {
            Some((numerator, denominator)) => {
                RationalNumber::parse_plain(numerator)?.divide(&RationalNumber::parse_plain(denominator)?)
            }
            None => RationalNumber::parse_plain(text),
        }
    }
}
