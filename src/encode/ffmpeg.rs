use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use anyhow::Context as _;

use crate::{
    cache::fingerprint::TranscodeConfig,
    encode::tools::{Concatenator, Slicer, Transcoder},
    foundation::error::{CompressureError, CompressureResult},
};

const SLICE_PREFIX: &str = "slice_";

/// True when `program -version` runs successfully.
pub fn is_ffmpeg_on_path(program: &OsStr) -> bool {
    Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> CompressureResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

fn require_tool(program: &Path, purpose: &str) -> CompressureResult<()> {
    if is_ffmpeg_on_path(program.as_os_str()) {
        Ok(())
    } else {
        Err(CompressureError::external_tool(format!(
            "'{}' is required for {purpose}, but was not found on PATH",
            program.display()
        )))
    }
}

fn run(cmd: &mut Command, what: &str) -> CompressureResult<Vec<u8>> {
    tracing::debug!(command = ?cmd, "running {what}");
    let out = cmd
        .stdin(Stdio::null())
        .output()
        .map_err(|e| CompressureError::external_tool(format!("failed to spawn {what}: {e}")))?;

    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(CompressureError::external_tool(format!(
            "{what} exited with status {}: {}",
            out.status,
            stderr.trim()
        )));
    }
    Ok(out.stdout)
}

/// [`Transcoder`] backed by the system `ffmpeg` binary.
#[derive(Clone, Debug)]
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl Default for FfmpegTranscoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegTranscoder {
    /// Use a specific `ffmpeg` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, config: &TranscodeConfig, out_path: &Path) -> CompressureResult<PathBuf> {
        config.encoder.validate()?;
        if config.keyframe_interval == 0 {
            return Err(CompressureError::configuration(
                "keyframe interval must be non-zero",
            ));
        }
        if !config.source.is_file() {
            return Err(CompressureError::configuration(format!(
                "source video '{}' does not exist",
                config.source.display()
            )));
        }
        require_tool(&self.program, "transcoding")?;
        ensure_parent_dir(out_path)?;

        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(&config.source)
            .args(["-an", "-g", &config.keyframe_interval.to_string()])
            .args(config.encoder.ffmpeg_args())
            .arg(out_path);
        run(&mut cmd, "ffmpeg transcode")?;

        tracing::info!(
            source = %config.source.display(),
            out = %out_path.display(),
            encoder = %config.encoder.encoder,
            "transcoded video"
        );
        Ok(out_path.to_path_buf())
    }
}

/// [`Slicer`] that counts frames with `ffprobe` and cuts with the `ffmpeg` segment muxer.
///
/// Cuts are made at exact frame counts even inside a GOP (`-break_non_keyframes`), without
/// re-encoding.
#[derive(Clone, Debug)]
pub struct FfmpegSlicer {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl Default for FfmpegSlicer {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
        }
    }
}

impl FfmpegSlicer {
    /// Use specific `ffmpeg`/`ffprobe` executables.
    pub fn with_programs(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    fn count_frames(&self, video: &Path) -> CompressureResult<u64> {
        require_tool(&self.ffprobe, "frame counting")?;
        let mut cmd = Command::new(&self.ffprobe);
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=nb_read_packets",
            "-of",
            "csv=p=0",
        ])
        .arg(video);
        let stdout = run(&mut cmd, "ffprobe frame count")?;
        parse_frame_count(&String::from_utf8_lossy(&stdout))
    }
}

impl Slicer for FfmpegSlicer {
    fn slice(
        &self,
        transcoded: &Path,
        superframe_size: u32,
        out_dir: &Path,
    ) -> CompressureResult<Vec<PathBuf>> {
        if superframe_size == 0 {
            return Err(CompressureError::configuration(
                "superframe_size must be non-zero",
            ));
        }
        require_tool(&self.ffmpeg, "slicing")?;

        let ext = container_ext(transcoded);
        std::fs::create_dir_all(out_dir)
            .with_context(|| format!("create slice directory '{}'", out_dir.display()))?;
        for stale in collect_slices(out_dir, &ext)? {
            std::fs::remove_file(&stale)
                .with_context(|| format!("remove stale slice '{}'", stale.display()))?;
        }

        let frames = self.count_frames(transcoded)?;
        let cuts = segment_frame_list(frames, superframe_size);
        tracing::debug!(frames, superframe_size, slices = cuts.len() + 1, "slicing video");

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-loglevel", "error", "-i"])
            .arg(transcoded)
            .args(["-map", "0:v:0", "-c", "copy"]);
        if cuts.is_empty() {
            cmd.arg(out_dir.join(format!("{SLICE_PREFIX}{:06}.{ext}", 0)));
        } else {
            let list = cuts
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            cmd.args(["-f", "segment", "-segment_frames", &list])
                .args(["-break_non_keyframes", "1", "-reset_timestamps", "1"])
                .arg(out_dir.join(format!("{SLICE_PREFIX}%06d.{ext}")));
        }
        run(&mut cmd, "ffmpeg slice")?;

        let slices = collect_slices(out_dir, &ext)?;
        if slices.is_empty() {
            return Err(CompressureError::external_tool(format!(
                "ffmpeg produced no slices for '{}'",
                transcoded.display()
            )));
        }
        Ok(slices)
    }
}

/// [`Concatenator`] using the `ffmpeg` concat demuxer with stream copy.
#[derive(Clone, Debug)]
pub struct FfmpegConcatenator {
    program: PathBuf,
}

impl Default for FfmpegConcatenator {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
        }
    }
}

impl FfmpegConcatenator {
    /// Use a specific `ffmpeg` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Concatenator for FfmpegConcatenator {
    fn concatenate(&self, slices: &[PathBuf], out_path: &Path) -> CompressureResult<PathBuf> {
        if slices.is_empty() {
            return Err(CompressureError::configuration(
                "nothing to concatenate: frame list is empty",
            ));
        }
        require_tool(&self.program, "concatenation")?;
        ensure_parent_dir(out_path)?;

        let mut absolute = Vec::with_capacity(slices.len());
        for s in slices {
            absolute.push(
                std::path::absolute(s)
                    .with_context(|| format!("resolve slice path '{}'", s.display()))?,
            );
        }

        let mut list_path = out_path.as_os_str().to_owned();
        list_path.push(".concat.txt");
        let list_path = PathBuf::from(list_path);
        std::fs::write(&list_path, concat_list(&absolute))
            .with_context(|| format!("write concat list '{}'", list_path.display()))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(["-y", "-loglevel", "error", "-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy"])
            .arg(out_path);
        let result = run(&mut cmd, "ffmpeg concat");
        let _ = std::fs::remove_file(&list_path);
        result?;

        tracing::info!(slices = slices.len(), out = %out_path.display(), "concatenated video");
        Ok(out_path.to_path_buf())
    }
}

/// Frame numbers at which a new slice starts, excluding frame 0.
pub(crate) fn segment_frame_list(frame_count: u64, superframe_size: u32) -> Vec<u64> {
    let step = u64::from(superframe_size);
    (1..)
        .map(|i| i * step)
        .take_while(|&f| f < frame_count)
        .collect()
}

pub(crate) fn parse_frame_count(stdout: &str) -> CompressureResult<u64> {
    let first = stdout
        .lines()
        .map(|l| l.trim().trim_end_matches(','))
        .find(|l| !l.is_empty())
        .ok_or_else(|| CompressureError::external_tool("ffprobe reported no video stream"))?;
    let frames = first.parse::<u64>().map_err(|e| {
        CompressureError::external_tool(format!("ffprobe frame count '{first}' is invalid: {e}"))
    })?;
    if frames == 0 {
        return Err(CompressureError::external_tool(
            "ffprobe reported a video with zero frames",
        ));
    }
    Ok(frames)
}

/// Concat demuxer script; single quotes are escaped as `'\''`.
pub(crate) fn concat_list(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in paths {
        let escaped = p.to_string_lossy().replace('\'', "'\\''");
        out.push_str(&format!("file '{escaped}'\n"));
    }
    out
}

pub(crate) fn collect_slices(dir: &Path, ext: &str) -> CompressureResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir)
        .with_context(|| format!("list slice directory '{}'", dir.display()))?;
    let mut slices = Vec::new();
    for entry in rd {
        let path = entry
            .with_context(|| format!("list slice directory '{}'", dir.display()))?
            .path();
        let is_slice = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(SLICE_PREFIX))
            && path.extension().and_then(|e| e.to_str()) == Some(ext);
        if is_slice && path.is_file() {
            slices.push(path);
        }
    }
    slices.sort();
    Ok(slices)
}

/// Container used when a path carries no extension.
pub const DEFAULT_CONTAINER: &str = "avi";

/// Container extension of `path`, lowercased, defaulting to [`DEFAULT_CONTAINER`].
pub fn container_ext(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_CONTAINER)
        .to_ascii_lowercase()
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
