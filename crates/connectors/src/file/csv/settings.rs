use serde::Deserialize;
use std::path::PathBuf;

fn default_delimiter() -> char {
    ','
}

/// How to parse a delimited text file into records.
///
/// `fields` maps positional columns onto record field names, in file order.
/// The entity name is carried onto every record produced.
#[derive(Debug, Clone, Deserialize)]
pub struct CsvSettings {
    pub path: PathBuf,
    pub entity: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub has_headers: bool,
    pub fields: Vec<String>,
}
