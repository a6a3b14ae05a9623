use std::path::Path;

use crate::error::{Error, Result};

/// One worklist row: an ordered mapping of normalized field names to raw
/// string values. Rows are read once at startup and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Like `get`, but a blank value counts as absent. Row overrides arrive
    /// in this shape.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|value| !value.is_empty())
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Normalizes a CSV header to its lower-camel field name: whitespace
/// stripped, first character lowered. `Internal Meeting ID` becomes
/// `internalMeetingID`.
pub fn normalize_header(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let mut chars = stripped.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Loads a tabular file into normalized rows. Any parse failure is an
/// init-fatal configuration error.
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Config(format!("couldn't parse {}: {}", path.display(), e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::Config(format!("couldn't parse {}: {}", path.display(), e)))?
        .iter()
        .map(normalize_header)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::Config(format!("couldn't parse {}: {}", path.display(), e)))?;
        rows.push(Row {
            fields: headers
                .iter()
                .cloned()
                .zip(record.iter().map(str::to_string))
                .collect(),
        });
    }
    Ok(rows)
}

/// Loads a provisioning worklist, requiring a non-empty email on every row.
pub fn load_provisioning_rows(path: &Path) -> Result<Vec<Row>> {
    let rows = load_rows(path)?;
    for (index, row) in rows.iter().enumerate() {
        if row.get_non_empty("email").is_none() {
            return Err(Error::Config(format!(
                "invalid email found (row: {}, email: {:?})",
                index,
                row.get("email").unwrap_or_default()
            )));
        }
    }
    Ok(rows)
}
