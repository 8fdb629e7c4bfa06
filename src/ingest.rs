//! Reads conversion rules from `big,small,weight` CSV rows.
//!
//! Weights stay unparsed here; the backend chosen by configuration parses them.
use crate::store::ConversionRule;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;
use tracing::{info, trace};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Cannot read rules from '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Line {line}: {reason}")]
    MalformedRow { line: usize, reason: String },
}

pub fn rules_from_path(path: impl AsRef<Path>) -> Result<Vec<ConversionRule<String>>, IngestError> {
    let path = path.as_ref();
    let io_error = |source| IngestError::Io { path: path.display().to_string(), source };

    info!(path = %path.display(), "reading conversion rules");
    let file = File::open(path).map_err(io_error)?;
    let rules = read_rows(BufReader::new(file), &path.display().to_string())?;
    info!(path = %path.display(), rules = rules.len(), "conversion rules loaded");
    Ok(rules)
}

pub fn rules_from_reader(reader: impl BufRead) -> Result<Vec<ConversionRule<String>>, IngestError> {
    read_rows(reader, "<reader>")
}

fn read_rows(reader: impl BufRead, source: &str) -> Result<Vec<ConversionRule<String>>, IngestError> {
    let mut rules = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| IngestError::Io { path: source.to_string(), source: e })?;
        trace!(line = i + 1, row = %line);
        if line.trim().is_empty() {
            continue;
        }
        rules.push(parse_row(&line, i + 1)?);
    }
    Ok(rules)
}

fn parse_row(line: &str, number: usize) -> Result<ConversionRule<String>, IngestError> {
    let malformed = |reason: &str| IngestError::MalformedRow { line: number, reason: reason.to_string() };

    let tokens: Vec<&str> = line.split(',').map(str::trim).collect();
    if tokens.len() != 3 {
        return Err(malformed("a row must have exactly three tokens"));
    }
    if tokens.iter().any(|t| t.is_empty()) {
        return Err(malformed("a row must not have empty tokens"));
    }
    Ok(ConversionRule::new(tokens[0], tokens[1], tokens[2].to_string()))
}
