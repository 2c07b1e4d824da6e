use std::path::{Path, PathBuf};

use crate::{
    cache::fingerprint::{ConfigFingerprint, Fingerprint as _, SliceConfig, TranscodeConfig},
    cache::manifest::{ArtifactRecord, ManifestStore},
    cache::persistence::{CacheStats, PersistenceCache, SliceOutput},
    config::{RunConfig, StorageConfig},
    encode::ffmpeg::{FfmpegConcatenator, FfmpegSlicer, FfmpegTranscoder, container_ext},
    encode::tools::{Concatenator, Slicer, Transcoder},
    foundation::error::CompressureResult,
    playback::sequencer::{SliceSequencer, SliceSet},
    playback::timeline,
};

/// Summary of a completed run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    /// Concatenated output video.
    pub out_path: PathBuf,
    /// Slices written to the output, in order.
    pub frames: Vec<PathBuf>,
    /// Slices in each sequencer ring.
    pub ring_len: usize,
    /// Cache activity during this run.
    pub cache: CacheStats,
}

/// Ties the persistence cache, the external tools and the sequencer together.
///
/// Owns its [`PersistenceCache`]; the cache in turn owns the manifest, so one `Compressure` is the
/// single writer of its manifest for its whole lifetime.
pub struct Compressure<T = FfmpegTranscoder, S = FfmpegSlicer, C = FfmpegConcatenator> {
    cache: PersistenceCache,
    storage: StorageConfig,
    transcoder: T,
    slicer: S,
    concatenator: C,
}

impl Compressure {
    /// Load the configured manifest and use the system `ffmpeg` tools.
    pub fn open(storage: StorageConfig) -> CompressureResult<Self> {
        let store = ManifestStore::load(&storage.manifest_path)?;
        Ok(Self::with_tools(
            PersistenceCache::new(store),
            storage,
            FfmpegTranscoder::default(),
            FfmpegSlicer::default(),
            FfmpegConcatenator::default(),
        ))
    }
}

impl<T, S, C> Compressure<T, S, C>
where
    T: Transcoder,
    S: Slicer,
    C: Concatenator,
{
    /// Assemble from explicit parts.
    pub fn with_tools(
        cache: PersistenceCache,
        storage: StorageConfig,
        transcoder: T,
        slicer: S,
        concatenator: C,
    ) -> Self {
        Self {
            cache,
            storage,
            transcoder,
            slicer,
            concatenator,
        }
    }

    pub fn cache(&self) -> &PersistenceCache {
        &self.cache
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.storage
    }

    /// Cached transcode of `config.source`, written as `<stem>-<fingerprint>.<container>`.
    pub fn compress(&mut self, config: &TranscodeConfig) -> CompressureResult<ArtifactRecord> {
        let out_path = self.storage.transcode_dir().join(format!(
            "{}-{}.{}",
            stem(&config.source),
            config.fingerprint().short(),
            config.container
        ));
        let transcoder = &self.transcoder;
        self.cache
            .get_or_create_transcode(config, |cfg, _| transcoder.transcode(cfg, &out_path))
    }

    /// Cached slice set of a transcoded video.
    pub fn slice(
        &mut self,
        transcode: &ArtifactRecord,
        superframe_size: u32,
    ) -> CompressureResult<SliceSet> {
        let config = SliceConfig {
            source: transcode.fingerprint,
            superframe_size,
        };
        let out_dir = self.slice_dir(&transcode.output_path, config.fingerprint());
        let slicer = &self.slicer;
        let record = self.cache.get_or_create_slices(&config, |cfg, _| {
            let slices = slicer.slice(&transcode.output_path, cfg.superframe_size, &out_dir)?;
            Ok(SliceOutput {
                dir: out_dir.clone(),
                slices,
            })
        })?;
        SliceSet::from_record(&record, superframe_size)
    }

    /// Pair the forward and backward slice sets.
    pub fn init_sequencer(
        &self,
        forward: SliceSet,
        backward: SliceSet,
    ) -> CompressureResult<SliceSequencer> {
        SliceSequencer::new(forward, backward)
    }

    /// Transcode, slice, sequence and concatenate both sources.
    #[tracing::instrument(skip(self, config), fields(forward = %config.forward.display(), backward = %config.backward.display()))]
    pub fn run(&mut self, config: &RunConfig) -> CompressureResult<RunReport> {
        config.validate()?;
        let before = self.cache.stats();

        let forward = self.materialize(&config.forward, config)?;
        let backward = self.materialize(&config.backward, config)?;

        let mut sequencer = self.init_sequencer(forward, backward)?;
        let targets = timeline::timeline(
            config.superframe_size,
            sequencer.len(),
            config.frequency,
            config.n_superframes - 1,
            config.waveform,
        )?;
        let frames = assemble_frames(&mut sequencer, targets);

        tracing::info!(frames = frames.len(), "concatenating slices");
        let out_path = self.concatenator.concatenate(&frames, &config.out_path)?;

        let after = self.cache.stats();
        Ok(RunReport {
            out_path,
            frames,
            ring_len: sequencer.len(),
            cache: CacheStats {
                hits: after.hits - before.hits,
                misses: after.misses - before.misses,
            },
        })
    }

    fn materialize(&mut self, source: &Path, config: &RunConfig) -> CompressureResult<SliceSet> {
        let transcode = self.compress(&TranscodeConfig {
            source: source.to_path_buf(),
            keyframe_interval: config.keyframe_interval,
            encoder: config.encoder.clone(),
            container: container_ext(&config.out_path),
        })?;
        self.slice(&transcode, config.superframe_size)
    }

    fn slice_dir(&self, transcoded: &Path, fingerprint: ConfigFingerprint) -> PathBuf {
        self.storage
            .slices_dir()
            .join(format!("{}-{}", stem(transcoded), fingerprint.short()))
    }
}

/// Initial head followed by the head after stepping to each target.
pub fn assemble_frames<X: Clone>(
    sequencer: &mut SliceSequencer<X>,
    targets: impl IntoIterator<Item = i64>,
) -> Vec<X> {
    let targets = targets.into_iter();
    let mut frames = Vec::with_capacity(targets.size_hint().0 + 1);
    frames.push(sequencer.current_head().clone());
    for target in targets {
        frames.push(sequencer.step(Some(target)).clone());
    }
    frames
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "video".to_string())
}

#[cfg(test)]
#[path = "../tests/unit/pipeline.rs"]
mod tests;
