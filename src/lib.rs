//! compressure builds non-linear playback videos out of superframe slices.
//!
//! Two source clips (a forward pass and a backward pass) are transcoded with a long keyframe
//! interval, cut into slices of `superframe_size` frames, and walked by a reversible
//! [`SliceSequencer`] driven by a [`Timeline`] of target positions. The visited slices are
//! concatenated into the output video.
//!
//! # Pipeline overview
//!
//! 1. **Transcode** each source ([`Transcoder`]), cached by [`ConfigFingerprint`]
//! 2. **Slice** each transcode ([`Slicer`]), cached the same way
//! 3. **Sequence**: pair both slice sets in a [`SliceSequencer`] and step it through a timeline
//! 4. **Concatenate** the visited slices ([`Concatenator`])
//!
//! Expensive artifacts are recorded in a JSON manifest ([`ManifestStore`]) that must exist before
//! a run; [`PersistenceCache`] guarantees each fingerprint is produced at most once. The manifest
//! assumes a single writer process.
#![forbid(unsafe_code)]

mod cache;
mod config;
mod encode;
mod foundation;
mod pipeline;
mod playback;

pub use cache::fingerprint::{
    ConfigFingerprint, Fingerprint, SliceConfig, TranscodeConfig, fingerprint, source_identity,
};
pub use cache::manifest::{ArtifactKind, ArtifactRecord, ManifestStore};
pub use cache::persistence::{CacheStats, PersistenceCache, SliceOutput};
pub use config::{
    DEFAULT_FREQUENCY, DEFAULT_MANIFEST, DEFAULT_N_SUPERFRAMES, DEFAULT_OUT_PATH,
    DEFAULT_SUPERFRAME_SIZE, DEFAULT_WORKDIR, RunConfig, StorageConfig,
};
pub use encode::config::{
    DEFAULT_ENCODER, DEFAULT_GOP_SIZE, EncoderConfig, EncoderSpec, encoder_registry, find_encoder,
};
pub use encode::ffmpeg::{
    DEFAULT_CONTAINER, FfmpegConcatenator, FfmpegSlicer, FfmpegTranscoder, container_ext,
    ensure_parent_dir, is_ffmpeg_on_path,
};
pub use encode::tools::{Concatenator, Slicer, Transcoder};
pub use foundation::error::{CompressureError, CompressureResult};
pub use pipeline::{Compressure, RunReport, assemble_frames};
pub use playback::sequencer::{Direction, SliceSequencer, SliceSet, Velocity};
pub use playback::timeline::{Timeline, Waveform, generate, timeline};
