use std::path::PathBuf;

use crate::{
    cache::fingerprint::{ConfigFingerprint, Fingerprint as _, SliceConfig, TranscodeConfig},
    cache::manifest::{ArtifactKind, ArtifactRecord, ManifestStore},
    foundation::error::{CompressureError, CompressureResult},
};

/// What a slice producer hands back: the directory it wrote and the ordered slice files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceOutput {
    /// Directory holding the slices.
    pub dir: PathBuf,
    /// Slice files in playback order.
    pub slices: Vec<PathBuf>,
}

/// Hit/miss counters for one process lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the manifest.
    pub hits: u64,
    /// Lookups that ran the producer.
    pub misses: u64,
}

/// Get-or-create facade over a [`ManifestStore`].
///
/// A hit never runs the producer. A miss runs it once and records the result before returning, so
/// the same fingerprint is produced at most once per store. Producer errors are returned as-is and
/// leave the manifest untouched.
#[derive(Debug)]
pub struct PersistenceCache {
    store: ManifestStore,
    stats: CacheStats,
}

impl PersistenceCache {
    /// Wrap a loaded manifest.
    pub fn new(store: ManifestStore) -> Self {
        Self {
            store,
            stats: CacheStats::default(),
        }
    }

    /// Underlying manifest.
    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Release the underlying manifest.
    pub fn into_store(self) -> ManifestStore {
        self.store
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Return the cached transcode for `config`, or run `producer` to make it.
    ///
    /// `producer` receives the config and its fingerprint and returns the written video path.
    pub fn get_or_create_transcode<F>(
        &mut self,
        config: &TranscodeConfig,
        producer: F,
    ) -> CompressureResult<ArtifactRecord>
    where
        F: FnOnce(&TranscodeConfig, ConfigFingerprint) -> CompressureResult<PathBuf>,
    {
        let fp = config.fingerprint();
        self.get_or_create(ArtifactKind::Transcode, fp, config_json(config)?, || {
            producer(config, fp).map(|path| (path, Vec::new()))
        })
    }

    /// Return the cached slice set for `config`, or run `producer` to cut it.
    pub fn get_or_create_slices<F>(
        &mut self,
        config: &SliceConfig,
        producer: F,
    ) -> CompressureResult<ArtifactRecord>
    where
        F: FnOnce(&SliceConfig, ConfigFingerprint) -> CompressureResult<SliceOutput>,
    {
        let fp = config.fingerprint();
        self.get_or_create(ArtifactKind::SliceSet, fp, config_json(config)?, || {
            producer(config, fp).map(|out| (out.dir, out.slices))
        })
    }

    fn get_or_create(
        &mut self,
        kind: ArtifactKind,
        fingerprint: ConfigFingerprint,
        config: serde_json::Value,
        producer: impl FnOnce() -> CompressureResult<(PathBuf, Vec<PathBuf>)>,
    ) -> CompressureResult<ArtifactRecord> {
        if let Some(hit) = self.store.lookup(&fingerprint) {
            if hit.kind != kind {
                return Err(CompressureError::persistence(format!(
                    "fingerprint {fingerprint} is recorded as {:?}, expected {kind:?}",
                    hit.kind
                )));
            }
            self.stats.hits += 1;
            tracing::info!(
                %fingerprint,
                ?kind,
                path = %hit.output_path.display(),
                "found artifact in persistent storage"
            );
            return Ok(hit.clone());
        }

        self.stats.misses += 1;
        tracing::info!(%fingerprint, ?kind, "artifact not in persistent storage; creating now");
        let (output_path, slices) = producer()?;

        let record = ArtifactRecord {
            fingerprint,
            kind,
            output_path,
            slices,
            config,
        };
        let stored = self.store.append(record)?;
        tracing::info!(
            %fingerprint,
            path = %stored.output_path.display(),
            "artifact recorded"
        );
        Ok(stored.clone())
    }
}

fn config_json<T: serde::Serialize>(config: &T) -> CompressureResult<serde_json::Value> {
    serde_json::to_value(config)
        .map_err(|e| CompressureError::persistence(format!("serialize artifact config: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/cache/persistence.rs"]
mod tests;
