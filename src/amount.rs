use thiserror::Error;

use crate::sheet::Cell;

#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{raw}' is not a numeric amount")]
pub struct ParseError {
    pub raw: String,
}

impl ParseError {
    fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
        }
    }
}

/// Parse a currency cell such as `1,234.56` or `-50` into a number.
///
/// Commas are treated as thousands separators and dropped. What remains must
/// be an optional sign followed by digits with at most one decimal point.
pub fn parse_amount(raw: &str) -> Result<f64, ParseError> {
    let cleaned = raw.trim().replace(',', "");
    let unsigned = cleaned
        .strip_prefix('-')
        .or_else(|| cleaned.strip_prefix('+'))
        .unwrap_or(&cleaned);

    let mut digits = 0usize;
    let mut points = 0usize;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return Err(ParseError::new(raw)),
        }
    }
    if digits == 0 || points > 1 {
        return Err(ParseError::new(raw));
    }

    cleaned.parse::<f64>().map_err(|_| ParseError::new(raw))
}

/// Numeric value of an amount cell. Spreadsheet numbers pass through,
/// text goes through [`parse_amount`].
pub fn cell_amount(cell: &Cell) -> Result<f64, ParseError> {
    match cell {
        Cell::Number(n) => Ok(*n),
        Cell::Text(s) => parse_amount(s),
        other => Err(ParseError::new(&other.to_string())),
    }
}
