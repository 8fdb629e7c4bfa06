use crate::config::{BackendConfig, ConverterConfig};
use crate::converter::{AnyConverter, ConvertRequestError};
use crate::display::trace;
use crate::store::ConversionRule;
use pyo3::exceptions::{PyKeyError, PyValueError};
use pyo3::prelude::*;

#[pyclass(name = "_Converter")]
#[derive(Debug)]
pub struct PyConverter {
    inner: AnyConverter,
}

fn backend_from(config_json: Option<&str>) -> PyResult<BackendConfig> {
    match config_json {
        Some(json) => ConverterConfig::from_json_str(json)
            .map(|c| c.backend)
            .map_err(|e| PyValueError::new_err(e.to_string())),
        None => Ok(BackendConfig::default()),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[pymethods]
impl PyConverter {
    /// `rules` are `(big_unit, small_unit, weight)` rows; `config_json` picks the backend.
    #[new]
    #[pyo3(signature = (rules, config_json=None))]
    pub fn new(rules: Vec<(String, String, String)>, config_json: Option<&str>) -> PyResult<Self> {
        let backend = backend_from(config_json)?;
        let raw: Vec<_> = rules.into_iter().map(|(big, small, weight)| ConversionRule::new(big, small, weight)).collect();
        AnyConverter::from_raw_rules(&raw, &backend)
            .map(|inner| Self { inner })
            .map_err(|e| PyValueError::new_err(error_chain(&e)))
    }

    #[staticmethod]
    #[pyo3(signature = (path, config_json=None))]
    pub fn from_csv(path: &str, config_json: Option<&str>) -> PyResult<Self> {
        let backend = backend_from(config_json)?;
        AnyConverter::from_csv_path(path, &backend)
            .map(|inner| Self { inner })
            .map_err(|e| PyValueError::new_err(error_chain(&e)))
    }

    /// Converts one `from` unit expression into `to`, rendering the factor as text.
    pub fn convert(&self, from: &str, to: &str) -> PyResult<String> {
        match self.inner.convert_expression(from, to) {
            Ok(value) => Ok(value.to_string()),
            Err(e @ ConvertRequestError::Conversion(_)) if e.is_not_found() => Err(PyKeyError::new_err(error_chain(&e))),
            Err(e) => Err(PyValueError::new_err(error_chain(&e))),
        }
    }

    pub fn trace_family(&self, unit: &str) -> PyResult<String> {
        let report = match &self.inner {
            AnyConverter::Float(c) => c.network_for(unit).map(|n| trace::format_network(c.graph(), &n)),
            AnyConverter::Decimal(c) => c.network_for(unit).map(|n| trace::format_network(c.graph(), &n)),
            AnyConverter::Rational(c) => c.network_for(unit).map(|n| trace::format_network(c.graph(), &n)),
        };
        report.map_err(|e| PyValueError::new_err(error_chain(&e)))
    }

    pub fn backend(&self) -> &'static str { self.inner.backend_name() }
    pub fn unit_count(&self) -> usize { self.inner.unit_count() }
}
