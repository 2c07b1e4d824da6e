use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    cache::fingerprint::ConfigFingerprint,
    foundation::error::{CompressureError, CompressureResult},
};

const MANIFEST_VERSION: u32 = 1;

/// Which kind of artifact a record describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Transcoded intermediate video.
    Transcode,
    /// Ordered set of superframe slice files.
    SliceSet,
}

impl ArtifactKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Transcode => "transcode",
            Self::SliceSet => "slice_set",
        }
    }
}

/// One materialized artifact. Immutable once appended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Cache key of the configuration that produced this artifact.
    pub fingerprint: ConfigFingerprint,
    /// Artifact kind.
    pub kind: ArtifactKind,
    /// Output file (transcode) or output directory (slice set).
    pub output_path: PathBuf,
    /// Ordered slice files; empty for transcodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub slices: Vec<PathBuf>,
    /// Human-readable copy of the producing configuration.
    #[serde(default)]
    pub config: serde_json::Value,
}

#[derive(Deserialize)]
struct ManifestFile {
    version: u32,
    records: Vec<ArtifactRecord>,
}

#[derive(Serialize)]
struct ManifestFileRef<'a> {
    version: u32,
    records: &'a [ArtifactRecord],
}

/// Durable fingerprint → artifact mapping backed by one JSON file.
///
/// Every [`ManifestStore::append`] rewrites the file before returning. The store assumes it is the
/// only writer: two processes appending to the same manifest will lose each other's records.
#[derive(Debug)]
pub struct ManifestStore {
    path: PathBuf,
    records: Vec<ArtifactRecord>,
    index: HashMap<ConfigFingerprint, usize>,
}

impl ManifestStore {
    /// Load an existing manifest. A missing file is an error, never an empty store.
    pub fn load(path: impl AsRef<Path>) -> CompressureResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CompressureError::ManifestMissing {
                path: path.to_path_buf(),
            });
        }

        let bytes = std::fs::read(path)
            .with_context(|| format!("read manifest '{}'", path.display()))?;
        let file: ManifestFile = serde_json::from_slice(&bytes).map_err(|e| {
            CompressureError::persistence(format!(
                "manifest '{}' is not valid: {e}",
                path.display()
            ))
        })?;
        if file.version != MANIFEST_VERSION {
            return Err(CompressureError::persistence(format!(
                "manifest '{}' has unsupported version {} (expected {MANIFEST_VERSION})",
                path.display(),
                file.version
            )));
        }

        let mut store = Self {
            path: path.to_path_buf(),
            records: Vec::with_capacity(file.records.len()),
            index: HashMap::with_capacity(file.records.len()),
        };
        for record in file.records {
            if store.index.contains_key(&record.fingerprint) {
                return Err(CompressureError::persistence(format!(
                    "manifest '{}' contains duplicate fingerprint {}",
                    path.display(),
                    record.fingerprint
                )));
            }
            store.index.insert(record.fingerprint, store.records.len());
            store.records.push(record);
        }

        tracing::debug!(
            path = %path.display(),
            records = store.records.len(),
            "manifest loaded"
        );
        Ok(store)
    }

    /// Initialize a new, empty manifest on disk. Refuses to overwrite an existing file.
    pub fn create(path: impl AsRef<Path>) -> CompressureResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(CompressureError::persistence(format!(
                "manifest '{}' already exists",
                path.display()
            )));
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create manifest directory '{}'", parent.display()))?;
        }

        let store = Self {
            path: path.to_path_buf(),
            records: Vec::new(),
            index: HashMap::new(),
        };
        store.flush()?;
        tracing::info!(path = %path.display(), "created empty manifest");
        Ok(store)
    }

    /// Backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no artifacts have been recorded.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in append order.
    pub fn records(&self) -> impl Iterator<Item = &ArtifactRecord> {
        self.records.iter()
    }

    pub fn lookup(&self, fingerprint: &ConfigFingerprint) -> Option<&ArtifactRecord> {
        self.index.get(fingerprint).map(|&i| &self.records[i])
    }

    /// Add a record and persist immediately. On write failure the in-memory insert is undone.
    pub fn append(&mut self, record: ArtifactRecord) -> CompressureResult<&ArtifactRecord> {
        if self.index.contains_key(&record.fingerprint) {
            return Err(CompressureError::persistence(format!(
                "fingerprint {} is already recorded",
                record.fingerprint
            )));
        }

        let fp = record.fingerprint;
        let slot = self.records.len();
        self.index.insert(fp, slot);
        self.records.push(record);

        if let Err(err) = self.flush() {
            self.records.pop();
            self.index.remove(&fp);
            tracing::warn!(fingerprint = %fp, "manifest write failed; record rolled back");
            return Err(err);
        }

        tracing::debug!(fingerprint = %fp, records = self.records.len(), "manifest appended");
        Ok(&self.records[slot])
    }

    /// Write the whole manifest through a sibling temp file and rename it into place.
    pub fn flush(&self) -> CompressureResult<()> {
        let write_err = |source: anyhow::Error| CompressureError::PersistenceWrite {
            path: self.path.clone(),
            source,
        };

        let file = ManifestFileRef {
            version: MANIFEST_VERSION,
            records: &self.records,
        };
        let bytes = serde_json::to_vec_pretty(&file)
            .context("serialize manifest")
            .map_err(write_err)?;

        let tmp = temp_sibling(&self.path);
        std::fs::write(&tmp, &bytes)
            .with_context(|| format!("write '{}'", tmp.display()))
            .map_err(write_err)?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("rename '{}' into place", tmp.display()))
            .map_err(|e| {
                let _ = std::fs::remove_file(&tmp);
                write_err(e)
            })?;
        Ok(())
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut s = OsString::from(path.as_os_str());
    s.push(".tmp");
    PathBuf::from(s)
}

#[cfg(test)]
#[path = "../../tests/unit/cache/manifest.rs"]
mod tests;
