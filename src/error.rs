//! Error types for graph construction, network construction and conversion.
use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::number::NumberError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphBuildError {
    /// A caller-contract violation, such as an empty unit name.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Rule has a non-positive weight: {rule}")]
    NonPositiveWeight { rule: String },
    /// The weight or its inverse overflows the numeric backend.
    #[error("Rule weight is not representable: {rule}")]
    UnrepresentableWeight { rule: String },
    #[error("Cannot invert the weight of rule {rule}")]
    Arithmetic {
        rule: String,
        #[source]
        source: NumberError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkBuildError {
    #[error("Root unit '{0}' is not part of the conversion graph")]
    UnknownRoot(String),
    /// A cycle whose accumulated ratio is not 1.
    #[error(
        "Inconsistent cycle in network rooted at '{root}': the rule {from} -> {to} gives 1 {to} = {found} {root}, \
         but it is already 1 {to} = {expected} {root}"
    )]
    InconsistentCycle {
        root: String,
        from: String,
        to: String,
        expected: String,
        found: String,
    },
    #[error("Arithmetic failure while building network rooted at '{root}'")]
    Arithmetic {
        root: String,
        #[source]
        source: NumberError,
    },
}

/// The specific reason a conversion failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionFailure {
    #[error("Unknown unit '{0}'")]
    NoSuchMeasurement(String),
    #[error(
        "Mismatched dimensionality: {from_numerator}/{from_denominator} units cannot be converted to \
         {to_numerator}/{to_denominator} units"
    )]
    MismatchedDimensionality {
        from_numerator: usize,
        from_denominator: usize,
        to_numerator: usize,
        to_denominator: usize,
    },
    #[error("Incompatible dimensions: units related to '{family}' do not cancel out")]
    IncompatibleDimensions { family: String },
    #[error(transparent)]
    Network(#[from] NetworkBuildError),
    #[error(transparent)]
    Arithmetic(#[from] NumberError),
}

/// The single error returned by `convert`; the cause is kept in `source`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to convert '{from}' to '{to}': {source}")]
pub struct ConversionError {
    pub from: String,
    pub to: String,
    #[source]
    pub source: ConversionFailure,
}

impl ConversionError {
    pub fn failure(&self) -> &ConversionFailure { &self.source }

    /// True when an adapter should answer "not found" rather than "bad request".
    pub fn is_not_found(&self) -> bool {
        matches!(self.source, ConversionFailure::NoSuchMeasurement(_))
    }
}

#[derive(Error, Debug)]
pub enum ConverterBuildError {
    #[error("Failed to build the conversion graph")]
    Graph(#[from] GraphBuildError),
    #[error("Invalid weight '{weight}' in rule #{index}")]
    Weight {
        index: usize,
        weight: String,
        #[source]
        source: NumberError,
    },
    #[error("Failed to read conversion rules")]
    Ingest(#[from] IngestError),
    #[error("Invalid converter configuration")]
    Config(#[from] ConfigError),
}
