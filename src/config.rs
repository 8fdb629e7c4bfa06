//! Converter configuration.
//!
//! Chooses the numeric backend and, for the decimal backend, its precision.
//! Loaded from JSON, e.g. `{"backend": {"kind": "decimal", "digits": 50}}`.
use crate::number::{DecimalFactory, NumberError, NumberFactory, Precision, Rounding};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU64;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed converter configuration")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read configuration file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Decimal precision must keep at least one digit")]
    ZeroDigits,
    #[error("Decimal precision of {digits} digits exceeds the maximum of {max}")]
    TooManyDigits { digits: u64, max: u64 },
    #[error("Invalid decimal epsilon '{epsilon}'")]
    InvalidEpsilon {
        epsilon: String,
        #[source]
        source: NumberError,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConverterConfig {
    #[serde(default)]
    pub backend: BackendConfig,
}

impl ConverterConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.backend.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
        Self::from_json_str(&text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendConfig {
    Float,
    Decimal(DecimalConfig),
    Rational,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::Decimal(DecimalConfig::default())
    }
}

impl BackendConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Float => "float",
            Self::Decimal(_) => "decimal",
            Self::Rational => "rational",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Self::Decimal(decimal) = self {
            decimal.precision()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimalConfig {
    /// Significant digits kept by multiplication and division.
    #[serde(default = "default_digits")]
    pub digits: u64,

    #[serde(default)]
    pub rounding: Rounding,

    /// Plain decimal; the tolerance for cycle checks and approximate positivity.
    #[serde(default = "default_epsilon")]
    pub epsilon: String,
}

fn default_digits() -> u64 {
    Precision::DEFAULT_DIGITS
}
fn default_epsilon() -> String {
    "0.00000000000000000001".to_string()
}

impl Default for DecimalConfig {
    fn default() -> Self {
        Self { digits: default_digits(), rounding: Rounding::default(), epsilon: default_epsilon() }
    }
}

impl DecimalConfig {
    pub fn precision(&self) -> Result<Precision, ConfigError> {
        let digits = NonZeroU64::new(self.digits).ok_or(ConfigError::ZeroDigits)?;
        if digits.get() > Precision::MAX_DIGITS {
            return Err(ConfigError::TooManyDigits { digits: digits.get(), max: Precision::MAX_DIGITS });
        }
        let epsilon = DecimalFactory::default()
            .parse(self.epsilon.trim())
            .map_err(|source| ConfigError::InvalidEpsilon { epsilon: self.epsilon.clone(), source })?;
        Ok(Precision::new(digits, self.rounding, epsilon.into_value()))
    }

    pub fn factory(&self) -> Result<DecimalFactory, ConfigError> {
        Ok(DecimalFactory::new(self.precision()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[test]
    fn test_default_is_decimal128() {
        let config = ConverterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, ConverterConfig::default());
        let BackendConfig::Decimal(decimal) = config.backend else { panic!("expected decimal backend") };
        assert_eq!(decimal.precision().unwrap(), Precision::default());
    }

    #[rstest]
    #[case(r#"{"backend": {"kind": "float"}}"#, "float")]
    #[case(r#"{"backend": {"kind": "rational"}}"#, "rational")]
    #[case(r#"{"backend": {"kind": "decimal"}}"#, "decimal")]
    fn test_backend_kinds(#[case] json: &str, #[case] name: &str) {
        assert_eq!(ConverterConfig::from_json_str(json).unwrap().backend.name(), name);
    }

    #[test]
    fn test_decimal_overrides() {
        let json = r#"{"backend": {"kind": "decimal", "digits": 50, "rounding": "half_up", "epsilon": "0.001"}}"#;
        let config = ConverterConfig::from_json_str(json).unwrap();
        let BackendConfig::Decimal(decimal) = config.backend else { panic!("expected decimal backend") };
        let precision = decimal.precision().unwrap();
        assert_eq!(precision.digits.get(), 50);
        assert_eq!(precision.rounding, Rounding::HalfUp);
        assert_eq!(precision.epsilon, DecimalFactory::default().parse("0.001").unwrap().into_value());
    }

    #[rstest]
    #[case(r#"{"backend": {"kind": "decimal", "digits": 0}}"#)]
    #[case(r#"{"backend": {"kind": "decimal", "digits": 4294967296}}"#)]
    #[case(r#"{"backend": {"kind": "decimal", "epsilon": "1e-5"}}"#)]
    #[case(r#"{"backend": {"kind": "quantum"}}"#)]
    #[case(r#"{"backend": "#)]
    fn test_invalid_configs(#[case] json: &str) {
        assert!(ConverterConfig::from_json_str(json).is_err());
    }

    #[rstest]
    #[case(4_294_967_296)]
    #[case(u64::MAX)]
    fn test_digits_beyond_division_range_are_rejected(#[case] digits: u64) {
        let config = DecimalConfig { digits, ..DecimalConfig::default() };
        assert!(matches!(config.precision(), Err(ConfigError::TooManyDigits { digits: d, .. }) if d == digits));
        let at_limit = DecimalConfig { digits: Precision::MAX_DIGITS, ..DecimalConfig::default() };
        assert_eq!(at_limit.precision().unwrap().digits.get(), u64::from(u32::MAX));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"backend": {{"kind": "rational"}}}}"#).unwrap();
        let config = ConverterConfig::from_path(file.path()).unwrap();
        assert_eq!(config.backend, BackendConfig::Rational);

        let missing = ConverterConfig::from_path(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(ConfigError::Io { .. })));
    }
}
