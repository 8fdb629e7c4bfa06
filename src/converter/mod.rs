//! Conversion between compound unit expressions.
pub mod dynamic;
pub mod measurement;

pub use dynamic::{AnyConverter, AnyNumber, ConvertRequestError};
pub use measurement::MeasurementConverter;
