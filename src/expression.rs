//! Parses unit expressions such as `"кг*м/с^2"` into a `ComplexFraction`.
//!
//! Spaces are ignored. `""` and `"1"` are the empty fraction. There is at
//! most one `/`, and a side equal to `1` contributes no units. A factor may
//! carry a positive exponent, `м^2` being shorthand for `м*м`.
use crate::store::ComplexFraction;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("At most one division sign is allowed: '{0}'")]
    TooManyDivisions(String),
    #[error("A division sign must separate two non-empty parts: '{0}'")]
    EmptyDivisionSide(String),
    #[error("A multiplication sign must have a unit on both sides: '{0}'")]
    DanglingMultiplication(String),
    #[error("Exponent of '{factor}' must be a positive integer")]
    InvalidExponent { factor: String },
}

pub fn parse_expression(text: &str) -> Result<ComplexFraction<String>, ExpressionError> {
    let compact: String = text.chars().filter(|c| *c != ' ').collect();

    let mut sides = compact.split('/');
    let numerator = sides.next().unwrap_or_default();
    let denominator = sides.next();
    if sides.next().is_some() {
        return Err(ExpressionError::TooManyDivisions(compact.clone()));
    }

    match denominator {
        None => Ok(ComplexFraction::new(parse_product(numerator, &compact)?, [])),
        Some(denominator) => {
            if numerator.is_empty() || denominator.is_empty() {
                return Err(ExpressionError::EmptyDivisionSide(compact.clone()));
            }
            Ok(ComplexFraction::new(parse_product(numerator, &compact)?, parse_product(denominator, &compact)?))
        }
    }
}

fn parse_product(side: &str, expression: &str) -> Result<Vec<String>, ExpressionError> {
    if side.is_empty() || side == "1" {
        return Ok(Vec::new());
    }

    let mut units = Vec::new();
    for factor in side.split('*') {
        if factor.is_empty() {
            return Err(ExpressionError::DanglingMultiplication(expression.to_string()));
        }
        let (base, exponent) = match factor.split_once('^') {
            Some((base, exponent)) => (base, parse_exponent(factor, exponent)?),
            None => (factor, 1),
        };
        if base.is_empty() {
            return Err(ExpressionError::InvalidExponent { factor: factor.to_string() });
        }
        units.extend(std::iter::repeat(base.to_string()).take(exponent as usize));
    }
    Ok(units)
}

fn parse_exponent(factor: &str, exponent: &str) -> Result<u8, ExpressionError> {
    let invalid = || ExpressionError::InvalidExponent { factor: factor.to_string() };
    if exponent.is_empty() || !exponent.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match exponent.parse::<u8>() {
        Ok(0) | Err(_) => Err(invalid()),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fraction(numerator: &[&str], denominator: &[&str]) -> ComplexFraction<String> {
        ComplexFraction::new(
            numerator.iter().map(|s| s.to_string()),
            denominator.iter().map(|s| s.to_string()),
        )
    }

    #[test]
    fn test_parse_valid() {
        let cases = vec![
            ("", fraction(&[], &[])),
            ("1", fraction(&[], &[])),
            ("м", fraction(&["м"], &[])),
            ("км/час", fraction(&["км"], &["час"])),
            ("кг*м/с*с", fraction(&["кг", "м"], &["с", "с"])),
            ("1/с", fraction(&[], &["с"])),
            ("м/1", fraction(&["м"], &[])),
            (" км / час ", fraction(&["км"], &["час"])),
            ("м^2/с^2", fraction(&["м", "м"], &["с", "с"])),
            ("кг*м/с^2", fraction(&["кг", "м"], &["с", "с"])),
            ("м^1", fraction(&["м"], &[])),
        ];

        for (input, expected) in cases {
            assert_eq!(parse_expression(input).unwrap(), expected, "Input: '{}'", input);
        }
    }

    #[test]
    fn test_parse_invalid() {
        let failures = vec![
            "/", "/с", "с/", "м//м", "м**м", "*", "*м", "м*", "*м*", "м*м/*м", "1/", "/1", "м/с/с",
            "м^", "м^0", "м^-1", "м^x", "^2", "м^2^3", "м^1000",
        ];

        for input in failures {
            assert!(parse_expression(input).is_err(), "Should fail: '{}'", input);
        }
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(parse_expression("м//м"), Err(ExpressionError::TooManyDivisions("м//м".into())));
        assert_eq!(parse_expression("/с"), Err(ExpressionError::EmptyDivisionSide("/с".into())));
        assert_eq!(parse_expression("м * "), Err(ExpressionError::DanglingMultiplication("м*".into())));
        assert!(matches!(parse_expression("с^0"), Err(ExpressionError::InvalidExponent { .. })));
    }
}
