//! File readers behind the file tools

use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use warehouse_core::{Error, Result};

/// A CSV file split into its header row and records
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvContent {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvContent {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Reads a CSV file whose first line is the header.
///
/// Records may have fewer or more fields than the header.
pub async fn read_csv(path: impl AsRef<Path>) -> Result<CsvContent> {
    let bytes = tokio::fs::read(path.as_ref()).await?;

    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes.as_slice());

    let headers = rdr
        .headers()
        .map_err(|e| Error::message(format!("Failed to read CSV headers: {}", e)))?
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(|e| Error::message(format!("Invalid CSV record: {}", e)))?;
        rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    tracing::debug!(path = %path.as_ref().display(), row_count = rows.len(), "Read CSV file");
    Ok(CsvContent { headers, rows })
}

/// Reads and parses a JSON document
pub async fn read_json(path: impl AsRef<Path>) -> Result<Value> {
    let bytes = tokio::fs::read(path.as_ref()).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Reads a UTF-8 text file
pub async fn read_txt(path: impl AsRef<Path>) -> Result<String> {
    Ok(tokio::fs::read_to_string(path.as_ref()).await?)
}
