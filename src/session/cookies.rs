use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Reads a Netscape-format cookie jar and folds it into a single value
/// suitable for a `Cookie:` request header.
///
/// Lines are tab-separated 7-field records; comment lines start with `#`,
/// except the `#HttpOnly_` domain prefix, which marks a real cookie.
pub fn cookie_header_from_file(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("couldn't read cookie file {}: {}", path.display(), e))
    })?;

    let header = parse_jar(&contents)
        .map_err(|e| Error::Config(format!("couldn't parse cookie file {}: {}", path.display(), e)))?;
    Ok(header)
}

fn parse_jar(contents: &str) -> std::result::Result<String, String> {
    let mut pairs = Vec::new();

    for (lineno, raw) in contents.lines().enumerate() {
        // #HttpOnly_ prefixes the domain field of an otherwise normal record
        let line = raw.strip_prefix("#HttpOnly_").unwrap_or(raw);
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 7 {
            return Err(format!("malformed record on line {}", lineno + 1));
        }

        let name = fields[5];
        let value = fields[6];
        pairs.push(format!("{}={}", name, value));
    }

    if pairs.is_empty() {
        return Err("no cookies found".to_string());
    }

    Ok(pairs.join("; "))
}
