// src/store.rs
//
// Content-keyed durable cache in front of the chart pipeline. One JSON file
// per distinct developer query plus a fixed-name options snapshot, all under
// an explicitly supplied root. Hits are trusted unconditionally; entries
// only leave the cache when someone deletes the file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::chart::{self, Entry, Options};
use crate::core::net::Fetch;
use crate::error::{Error, Result};
use crate::file::write_atomic;
use crate::params::{ENTRY_CACHE_PREFIX, OPTIONS_CACHE_FILE};

static UNSAFE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9._-]+").unwrap());

/// Whether a lookup was served from disk or acquired fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Hit,
    Miss,
}

pub struct Store {
    root: PathBuf,
}

impl Store {
    /// A store rooted at `root`. Nothing is created until the first miss.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Store { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The dropdown enumeration, fetched at most once per cache lifetime.
    pub fn options(&self, fetch: &dyn Fetch) -> Result<(Options, Freshness)> {
        self.cached(OPTIONS_CACHE_FILE, || chart::fetch_options(fetch))
    }

    /// The full table for one developer.
    pub fn entries(&self, fetch: &dyn Fetch, developer: &str) -> Result<(Vec<Entry>, Freshness)> {
        let file = format!("{ENTRY_CACHE_PREFIX}{}", cache_key(developer));
        self.cached(&file, || chart::fetch_entries(fetch, developer))
    }

    fn cached<T, F>(&self, name: &str, acquire: F) -> Result<(T, Freshness)>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        let path = self.root.join(name);
        match fs::read(&path) {
            Ok(bytes) => {
                log::debug!("cache hit: {}", path.display());
                let value = serde_json::from_slice(&bytes)
                    .map_err(|source| Error::CorruptCache { path, source })?;
                Ok((value, Freshness::Hit))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("cache miss: {}", path.display());
                let value = acquire()?;
                let bytes = serde_json::to_vec(&value).map_err(|e| Error::Cache {
                    path: path.clone(),
                    source: io::Error::new(io::ErrorKind::InvalidData, e),
                })?;
                fs::create_dir_all(&self.root).map_err(|source| Error::Cache {
                    path: self.root.clone(),
                    source,
                })?;
                write_atomic(&path, &bytes).map_err(|source| Error::Cache { path, source })?;
                Ok((value, Freshness::Miss))
            }
            Err(source) => Err(Error::Cache { path, source }),
        }
    }
}

/// Filesystem-safe cache key for a query: lowercase slug with unsafe runs
/// collapsed to '-', plus a short hash fingerprint so two queries that slug
/// identically still get distinct files.
pub fn cache_key(query: &str) -> String {
    let lower = query.to_lowercase();
    let slug = UNSAFE_RUNS.replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    let digest = Sha256::digest(query.as_bytes());
    format!("{slug}-{}", hex::encode(&digest[..4]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_slug_plus_fingerprint() {
        let key = cache_key("Ilfotec DD-X");
        assert!(key.starts_with("ilfotec-dd-x-"));
        let (_, fp) = key.rsplit_once('-').unwrap();
        assert_eq!(fp.len(), 8);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn keys_are_deterministic_and_collision_resistant() {
        assert_eq!(cache_key("Rodinal"), cache_key("Rodinal"));
        // Same slug, different raw query, different key.
        assert_ne!(cache_key("X Y"), cache_key("X-Y"));
        assert_ne!(cache_key("Rodinal"), cache_key("rodinal"));
    }

    #[test]
    fn unsafe_runs_collapse() {
        let key = cache_key("  D-76 (1:1) ");
        assert!(key.starts_with("d-76-1-1-"));
    }
}
