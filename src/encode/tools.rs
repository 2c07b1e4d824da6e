use std::path::{Path, PathBuf};

use crate::{cache::fingerprint::TranscodeConfig, foundation::error::CompressureResult};

/// Re-encodes a source video into a cache-friendly intermediate.
///
/// Output must depend only on `config`, since results are cached by its fingerprint.
pub trait Transcoder {
    /// Write the transcoded video to `out_path` and return the path actually written.
    fn transcode(&self, config: &TranscodeConfig, out_path: &Path) -> CompressureResult<PathBuf>;
}

/// Cuts a transcoded video into slices of `superframe_size` frames.
pub trait Slicer {
    /// Write slices into `out_dir`; returns them in playback order.
    fn slice(
        &self,
        transcoded: &Path,
        superframe_size: u32,
        out_dir: &Path,
    ) -> CompressureResult<Vec<PathBuf>>;
}

/// Joins slices, in order, into one output video.
pub trait Concatenator {
    fn concatenate(&self, slices: &[PathBuf], out_path: &Path) -> CompressureResult<PathBuf>;
}
