//! Local file tools for warehouse agents
//!
//! Lets an agent read CSV, JSON and plain-text files from the local
//! filesystem next to the database tools. Each tool takes a `file_path`
//! parameter; a file that cannot be read or parsed is reported back to the
//! agent as text instead of failing the call.

pub mod readers;
pub mod tools;

// Re-exports
pub use readers::{CsvContent, read_csv, read_json, read_txt};
pub use tools::{READ_CSV_TOOL, READ_JSON_TOOL, READ_TXT_TOOL, file_tools};
