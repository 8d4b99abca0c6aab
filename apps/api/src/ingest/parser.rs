//! CSV Parser Adapter: raw upload bytes to ordered headers and
//! header-keyed rows. The first error aborts the whole parse; no partial
//! row set is ever returned.

use std::collections::HashSet;

use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use thiserror::Error;

use crate::mapping::RawRow;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed CSV{}: {message}", at_line(.line))]
    Malformed { line: Option<u64>, message: String },

    #[error("No column headers found in the CSV file")]
    NoHeaders,
}

impl ParseError {
    fn from_csv(err: csv::Error) -> Self {
        ParseError::Malformed {
            line: err.position().map(|p| p.line()),
            message: err.to_string(),
        }
    }
}

fn at_line(line: &Option<u64>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedCsv {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Parses an uploaded CSV. Headers are trimmed; blank and whitespace-only
/// lines are skipped; a row whose width differs from the header row is an
/// error. Repeated header names get `_1`, `_2`, ... suffixes so every row
/// key stays unambiguous.
pub fn parse_csv(bytes: &[u8]) -> Result<ParsedCsv, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let raw_headers = reader.headers().map_err(ParseError::from_csv)?.clone();
    let headers = dedupe_headers(&raw_headers);
    if headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(ParseError::from_csv)?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        if record.len() != headers.len() {
            return Err(ParseError::Malformed {
                line: record.position().map(|p| p.line()),
                message: format!(
                    "expected {} fields, found {}",
                    headers.len(),
                    record.len()
                ),
            });
        }
        rows.push(
            headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), value.to_string()))
                .collect(),
        );
    }

    Ok(ParsedCsv { headers, rows })
}

fn dedupe_headers(record: &StringRecord) -> Vec<String> {
    let mut seen = HashSet::new();
    record
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .map(|h| {
            if h.is_empty() || seen.insert(h.clone()) {
                return h;
            }
            let mut n = 1;
            loop {
                let candidate = format!("{h}_{n}");
                if seen.insert(candidate.clone()) {
                    return candidate;
                }
                n += 1;
            }
        })
        .collect()
}
