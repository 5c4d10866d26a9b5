//! Flat-file rating cache.
//!
//! The whole file is read once when the cache is opened and rewritten in
//! full after every insert. Entries never expire, including `Unknown`
//! ones: a failed lookup stays cached until the file is removed.

use crate::error::Result;
use crate::result::{Grade, RatingRecord};
use crate::search::service_id_from_value;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_CACHE_FILE: &str = ".cache_tosdr.json";

/// On-disk value; the domain lives in the map key. A missing name falls
/// back to the domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct CachedRating {
    grade: Grade,
    service_id: Option<i64>,
    name: Option<String>,
}

impl CachedRating {
    /// Read one cache entry, tolerating `null` names and string ids.
    fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let grade = match entry.get("grade") {
            Some(Value::String(letter)) => Grade::from_letter(letter),
            None | Some(Value::Null) => Grade::Unknown,
            Some(_) => return None,
        };
        let name = match entry.get("name") {
            Some(Value::String(name)) => Some(name.clone()),
            None | Some(Value::Null) => None,
            Some(_) => return None,
        };

        Some(Self {
            grade,
            service_id: service_id_from_value(entry.get("service_id")),
            name,
        })
    }

    fn into_record(self, domain: &str) -> RatingRecord {
        RatingRecord {
            domain: domain.to_string(),
            grade: self.grade,
            service_id: self.service_id,
            name: self.name.unwrap_or_else(|| domain.to_string()),
        }
    }
}

impl From<&RatingRecord> for CachedRating {
    fn from(record: &RatingRecord) -> Self {
        Self {
            grade: record.grade,
            service_id: record.service_id,
            name: Some(record.name.clone()),
        }
    }
}

pub struct RatingCache {
    path: PathBuf,
    entries: BTreeMap<String, CachedRating>,
}

impl RatingCache {
    /// Open the cache at `path`. A missing file gives an empty cache, and so
    /// does an unreadable or malformed one (logged, never fatal). Single
    /// entries of the wrong shape are dropped and the rest are kept.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::read_entries(&path) {
            Ok(entries) => {
                debug!("Loaded {} cached ratings from {}", entries.len(), path.display());
                entries
            }
            Err(e) => {
                warn!("Ignoring rating cache {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    fn read_entries(path: &Path) -> Result<BTreeMap<String, CachedRating>> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(path)?;
        let raw: BTreeMap<String, Value> = serde_json::from_str(&content)?;

        let mut entries = BTreeMap::new();
        for (domain, value) in raw {
            match CachedRating::from_value(&value) {
                Some(cached) => {
                    entries.insert(domain, cached);
                }
                None => warn!("Skipping unreadable cache entry for {}: {}", domain, value),
            }
        }
        Ok(entries)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.entries.contains_key(domain)
    }

    pub fn get(&self, domain: &str) -> Option<RatingRecord> {
        self.entries
            .get(domain)
            .cloned()
            .map(|cached| cached.into_record(domain))
    }

    pub fn insert(&mut self, record: &RatingRecord) {
        self.entries
            .insert(record.domain.clone(), CachedRating::from(record));
    }

    /// Rewrite the whole cache file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)?;
        debug!("Saved {} cached ratings to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}
