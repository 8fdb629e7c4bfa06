// Crate root: the unit conversion engine plus its optional Python facade.
//
// `build_graph`, `build_network` and `MeasurementConverter::convert` are the
// three entry points; everything else supports them.

pub mod config;
pub mod converter;
pub mod display;
pub mod error;
pub mod expression;
pub mod ingest;
pub mod network;
pub mod number;
pub mod store;

#[cfg(feature = "python")]
pub mod bindings {
    pub mod python;
}

pub use config::{BackendConfig, ConverterConfig, DecimalConfig};
pub use converter::{AnyConverter, AnyNumber, ConvertRequestError, MeasurementConverter};
pub use error::{ConversionError, ConversionFailure, ConverterBuildError, GraphBuildError, NetworkBuildError};
pub use expression::{parse_expression, ExpressionError};
pub use network::ConversionNetwork;
pub use number::{Number, NumberError, NumberFactory};
pub use store::{ComplexFraction, ConversionGraph, ConversionRule, GraphBuilder, WeightedMeasurement};

/// Builds the bidirectional graph for `rules`, numbers created by `factory`.
pub fn build_graph<F: NumberFactory>(
    rules: &[ConversionRule<F::Number>],
    factory: F,
) -> Result<ConversionGraph<F::Number>, GraphBuildError> {
    GraphBuilder::new(factory).build(rules)
}

/// Builds the network of `root`'s unit family.
pub fn build_network<T: Number>(graph: &ConversionGraph<T>, root: &str) -> Result<ConversionNetwork<T>, NetworkBuildError> {
    ConversionNetwork::build(graph, root)
}

#[cfg(feature = "python")]
mod python_module {
    use crate::bindings::python::PyConverter;
    use pyo3::prelude::*;

    #[pyfunction]
    fn rust_core_version() -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    /// Defines the `_core` Python module.
    #[pymodule]
    fn _core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
        // 1. Functions
        m.add_function(wrap_pyfunction!(rust_core_version, m)?)?;
        // 2. Classes
        m.add_class::<PyConverter>()?;
        Ok(())
    }
}
