//! Backend selection at the adapter boundary.
//!
//! The conversion path stays monomorphised; only the choice of backend made
//! from configuration goes through these enums.
use super::measurement::MeasurementConverter;
use crate::config::BackendConfig;
use crate::error::{ConversionError, ConverterBuildError};
use crate::expression::{parse_expression, ExpressionError};
use crate::ingest;
use crate::number::{DecimalNumber, FloatFactory, FloatNumber, RationalFactory, RationalNumber};
use crate::store::{ComplexFraction, ConversionRule};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum AnyNumber {
    Float(FloatNumber),
    Decimal(DecimalNumber),
    Rational(RationalNumber),
}

impl fmt::Display for AnyNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnyNumber::Float(x) => x.fmt(f),
            AnyNumber::Decimal(x) => x.fmt(f),
            AnyNumber::Rational(x) => x.fmt(f),
        }
    }
}

/// A failed request coming from an expression string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConvertRequestError {
    #[error("Malformed expression")]
    Malformed(#[from] ExpressionError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

impl ConvertRequestError {
    /// Unknown units answer "not found"; everything else is a bad request.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Conversion(e) if e.is_not_found())
    }
}

#[derive(Debug)]
pub enum AnyConverter {
    Float(MeasurementConverter<FloatNumber>),
    Decimal(MeasurementConverter<DecimalNumber>),
    Rational(MeasurementConverter<RationalNumber>),
}

impl AnyConverter {
    pub fn from_raw_rules(raw: &[ConversionRule<String>], backend: &BackendConfig) -> Result<Self, ConverterBuildError> {
        Ok(match backend {
            BackendConfig::Float => Self::Float(MeasurementConverter::from_raw_rules(raw, &FloatFactory)?),
            BackendConfig::Decimal(decimal) => {
                Self::Decimal(MeasurementConverter::from_raw_rules(raw, &decimal.factory()?)?)
            }
            BackendConfig::Rational => Self::Rational(MeasurementConverter::from_raw_rules(raw, &RationalFactory)?),
        })
    }

    pub fn from_csv_path(path: impl AsRef<Path>, backend: &BackendConfig) -> Result<Self, ConverterBuildError> {
        let raw = ingest::rules_from_path(path)?;
        Self::from_raw_rules(&raw, backend)
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Decimal(_) => "decimal",
            Self::Rational(_) => "rational",
        }
    }

    pub fn unit_count(&self) -> usize {
        match self {
            Self::Float(c) => c.graph().unit_count(),
            Self::Decimal(c) => c.graph().unit_count(),
            Self::Rational(c) => c.graph().unit_count(),
        }
    }

    pub fn convert<S: AsRef<str>>(&self, from: &ComplexFraction<S>, to: &ComplexFraction<S>) -> Result<AnyNumber, ConversionError> {
        Ok(match self {
            Self::Float(c) => AnyNumber::Float(c.convert(from, to)?),
            Self::Decimal(c) => AnyNumber::Decimal(c.convert(from, to)?),
            Self::Rational(c) => AnyNumber::Rational(c.convert(from, to)?),
        })
    }

    /// Parses both expressions (`"км/час"`) and converts.
    pub fn convert_expression(&self, from: &str, to: &str) -> Result<AnyNumber, ConvertRequestError> {
        let from = parse_expression(from)?;
        let to = parse_expression(to)?;
        Ok(self.convert(&from, &to)?)
    }
}
