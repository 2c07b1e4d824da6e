use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{
    encode::config::{DEFAULT_ENCODER, DEFAULT_GOP_SIZE, EncoderConfig},
    foundation::error::{CompressureError, CompressureResult},
    playback::timeline::Waveform,
};

/// Frames per superframe slice when none is given.
pub const DEFAULT_SUPERFRAME_SIZE: u32 = 6;
/// Timeline frequency, relative to one sweep, when none is given.
pub const DEFAULT_FREQUENCY: f64 = 0.5;
/// Output length in superframes when none is given.
pub const DEFAULT_N_SUPERFRAMES: usize = 400;
/// Default output video.
pub const DEFAULT_OUT_PATH: &str = "output.avi";
/// Default artifact directory.
pub const DEFAULT_WORKDIR: &str = "compressure";
/// Default manifest file.
pub const DEFAULT_MANIFEST: &str = "compressure/manifest.json";

/// Where the manifest and cached artifacts live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Manifest file. Must exist before a run (see `compressure init`).
    pub manifest_path: PathBuf,
    /// Root for transcoded videos and slice directories.
    pub workdir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST),
            workdir: PathBuf::from(DEFAULT_WORKDIR),
        }
    }
}

impl StorageConfig {
    /// Directory for transcoded intermediates.
    pub fn transcode_dir(&self) -> PathBuf {
        self.workdir.join("transcoded")
    }

    /// Directory holding one subdirectory per slice set.
    pub fn slices_dir(&self) -> PathBuf {
        self.workdir.join("slices")
    }
}

/// Everything one end-to-end run needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Source played on the forward ring.
    pub forward: PathBuf,
    /// Source played on the backward ring.
    pub backward: PathBuf,
    /// Frames per slice.
    pub superframe_size: u32,
    /// Timeline frequency.
    pub frequency: f64,
    /// Number of slices in the output, including the initial one.
    pub n_superframes: usize,
    /// Timeline waveform.
    pub waveform: Waveform,
    /// Keyframe interval passed to the transcoder.
    pub keyframe_interval: u32,
    /// Encoder selection.
    pub encoder: EncoderConfig,
    /// Final concatenated video.
    pub out_path: PathBuf,
    /// Manifest and artifact locations.
    pub storage: StorageConfig,
}

impl RunConfig {
    /// Defaults for everything except the two sources.
    pub fn new(forward: impl Into<PathBuf>, backward: impl Into<PathBuf>) -> CompressureResult<Self> {
        Ok(Self {
            forward: forward.into(),
            backward: backward.into(),
            superframe_size: DEFAULT_SUPERFRAME_SIZE,
            frequency: DEFAULT_FREQUENCY,
            n_superframes: DEFAULT_N_SUPERFRAMES,
            waveform: Waveform::default(),
            keyframe_interval: DEFAULT_GOP_SIZE,
            encoder: EncoderConfig::defaults_for(DEFAULT_ENCODER)?,
            out_path: PathBuf::from(DEFAULT_OUT_PATH),
            storage: StorageConfig::default(),
        })
    }

    pub fn validate(&self) -> CompressureResult<()> {
        if self.forward.as_os_str().is_empty() || self.backward.as_os_str().is_empty() {
            return Err(CompressureError::configuration(
                "forward and backward sources must be set",
            ));
        }
        if self.superframe_size == 0 {
            return Err(CompressureError::configuration(
                "superframe_size must be non-zero",
            ));
        }
        if self.n_superframes == 0 {
            return Err(CompressureError::configuration(
                "n_superframes must be at least 1",
            ));
        }
        if !self.frequency.is_finite() {
            return Err(CompressureError::configuration("frequency must be finite"));
        }
        if self.keyframe_interval == 0 {
            return Err(CompressureError::configuration(
                "keyframe interval must be non-zero",
            ));
        }
        if self.out_path.as_os_str().is_empty() {
            return Err(CompressureError::configuration("output path must be set"));
        }
        self.encoder.validate()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
