use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// A numeric field as the provider may send it: a JSON number or a string
/// such as `"12,345"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericField {
    Number(f64),
    Text(String),
}

impl From<f64> for NumericField {
    fn from(value: f64) -> Self {
        NumericField::Number(value)
    }
}

impl From<&str> for NumericField {
    fn from(value: &str) -> Self {
        NumericField::Text(value.to_string())
    }
}

/// A value that could not be read as a number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure(pub String);

impl Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "not a number: {:?}", self.0)
    }
}

impl std::error::Error for ParseFailure {}

fn strip_separators(text: &str) -> String {
    text.trim().replace(',', "")
}

/// Parses a real number, ignoring thousands separators
pub fn parse_float(field: Option<&NumericField>) -> Result<f64, ParseFailure> {
    match field {
        Some(NumericField::Number(n)) if n.is_finite() => Ok(*n),
        Some(NumericField::Number(n)) => Err(ParseFailure(n.to_string())),
        Some(NumericField::Text(text)) => strip_separators(text)
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ParseFailure(text.clone())),
        None => Err(ParseFailure(String::new())),
    }
}

/// Parses a non-negative whole count, ignoring thousands separators
///
/// Fractional values are rejected.
pub fn parse_count(field: Option<&NumericField>) -> Result<u64, ParseFailure> {
    match field {
        Some(NumericField::Number(n)) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
            Ok(*n as u64)
        }
        Some(NumericField::Number(n)) => Err(ParseFailure(n.to_string())),
        Some(NumericField::Text(text)) => strip_separators(text)
            .parse::<u64>()
            .map_err(|_| ParseFailure(text.clone())),
        None => Err(ParseFailure(String::new())),
    }
}

/// Reads the year from the first four characters of a date string
/// (`"2010-07-15"`, `"2010"`)
pub fn parse_year(date: &str) -> Result<i32, ParseFailure> {
    let date = date.trim();
    date.get(..4)
        .and_then(|year| year.parse::<i32>().ok())
        .ok_or_else(|| ParseFailure(date.to_string()))
}
