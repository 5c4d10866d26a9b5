// Vault export parsing

use crate::domain::{BuiltinSuffixes, SuffixTable, normalize_with};
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Failed to read vault export {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Vault export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Vault export is not valid CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Vault export has an unexpected layout: {0}")]
    InvalidStructure(String),

    #[error("Unsupported vault format '{0}' (expected .json or .csv)")]
    UnsupportedFormat(String),
}

pub type Result<T> = std::result::Result<T, VaultError>;

/// Bitwarden export flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultFormat {
    Json,
    Csv,
}

impl VaultFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "json" => Ok(VaultFormat::Json),
            "csv" => Ok(VaultFormat::Csv),
            _ => Err(VaultError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Keeps the first occurrence of every value, in order.
#[derive(Default)]
struct OrderedSet {
    seen: HashSet<String>,
    ordered: Vec<String>,
}

impl OrderedSet {
    fn push(&mut self, value: String) {
        if !value.is_empty() && self.seen.insert(value.clone()) {
            self.ordered.push(value);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.ordered
    }
}

/// Raw URIs from a JSON export (`items[].login.uris[].uri`), deduplicated,
/// in first-seen order. Entries of the wrong shape are skipped; a root that
/// is not an object, or an `items` that is not an array, is an error.
pub fn uris_from_json_str(content: &str) -> Result<Vec<String>> {
    let data: Value = serde_json::from_str(content)?;
    let Some(root) = data.as_object() else {
        return Err(VaultError::InvalidStructure(
            "top level is not a JSON object".to_string(),
        ));
    };
    let mut uris = OrderedSet::default();

    let items = match root.get("items") {
        None | Some(Value::Null) => &[][..],
        Some(Value::Array(items)) => items.as_slice(),
        Some(_) => {
            return Err(VaultError::InvalidStructure(
                "\"items\" is not an array".to_string(),
            ));
        }
    };

    for item in items {
        let entries = item
            .get("login")
            .and_then(|login| login.get("uris"))
            .and_then(Value::as_array);

        let Some(entries) = entries else {
            continue;
        };

        for entry in entries {
            match entry.get("uri").and_then(Value::as_str) {
                Some(uri) => uris.push(uri.trim().to_string()),
                None => debug!("Skipping vault URI entry without a string uri: {}", entry),
            }
        }
    }

    Ok(uris.into_vec())
}

/// Raw URIs from a CSV export's `login_uri` column. A cell may hold several
/// URIs separated by commas. Without that column there is nothing to read.
pub fn uris_from_csv_reader<R: Read>(reader: R) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let Some(column) = csv_reader
        .headers()?
        .iter()
        .position(|header| header == "login_uri")
    else {
        debug!("CSV export has no login_uri column");
        return Ok(Vec::new());
    };

    let mut uris = OrderedSet::default();
    for (row, record) in csv_reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                debug!("Skipping malformed CSV row {}: {}", row + 1, e);
                continue;
            }
        };
        if let Some(cell) = record.get(column) {
            for uri in cell.split(',') {
                uris.push(uri.trim().to_string());
            }
        }
    }

    Ok(uris.into_vec())
}

/// Raw URIs from an export file, format chosen by extension.
pub fn extract_uris(path: &Path) -> Result<Vec<String>> {
    let format = VaultFormat::from_path(path)?;
    let io_error = |source| VaultError::Io {
        path: path.display().to_string(),
        source,
    };

    match format {
        VaultFormat::Json => {
            let content = fs::read_to_string(path).map_err(io_error)?;
            uris_from_json_str(&content)
        }
        VaultFormat::Csv => {
            let file = File::open(path).map_err(io_error)?;
            uris_from_csv_reader(file)
        }
    }
}

/// Root domains found in an export, normalized with the built-in suffix table.
pub fn extract_domains(path: &Path) -> Result<Vec<String>> {
    extract_domains_with(path, &BuiltinSuffixes)
}

pub fn extract_domains_with(path: &Path, suffixes: &dyn SuffixTable) -> Result<Vec<String>> {
    let uris = extract_uris(path)?;
    let mut domains = OrderedSet::default();

    for uri in &uris {
        let domain = normalize_with(uri, suffixes);
        if domain.is_empty() {
            debug!("Skipping URI without a usable host: {}", uri);
            continue;
        }
        domains.push(domain);
    }

    debug!(
        "Extracted {} domains from {} URIs in {}",
        domains.ordered.len(),
        uris.len(),
        path.display()
    );
    Ok(domains.into_vec())
}
