use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{
    encode::config::EncoderConfig,
    encode::ffmpeg::DEFAULT_CONTAINER,
    foundation::error::{CompressureError, CompressureResult},
    foundation::math::Fnv1a128,
};

const FINGERPRINT_FORMAT: u64 = 1;
const KIND_TRANSCODE: u8 = b'T';
const KIND_SLICES: u8 = b'S';

/// Deterministic 128-bit cache key for an artifact configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl ConfigFingerprint {
    /// Short prefix used in artifact file names.
    pub fn short(&self) -> String {
        format!("{:016x}", self.hi)
    }
}

impl fmt::Display for ConfigFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl FromStr for ConfigFingerprint {
    type Err = CompressureError;

    fn from_str(s: &str) -> CompressureResult<Self> {
        if s.len() != 32 || !s.is_ascii() {
            return Err(CompressureError::persistence(format!(
                "invalid fingerprint '{s}' (expected 32 hex digits)"
            )));
        }
        let parse = |part: &str| {
            u64::from_str_radix(part, 16).map_err(|e| {
                CompressureError::persistence(format!("invalid fingerprint '{s}': {e}"))
            })
        };
        Ok(Self {
            hi: parse(&s[..16])?,
            lo: parse(&s[16..])?,
        })
    }
}

impl Serialize for ConfigFingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigFingerprint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Anything that can be reduced to a [`ConfigFingerprint`].
pub trait Fingerprint {
    /// Compute the cache key. Must be pure.
    fn fingerprint(&self) -> ConfigFingerprint;
}

/// Compute the fingerprint of any fingerprintable configuration.
pub fn fingerprint<C: Fingerprint + ?Sized>(config: &C) -> ConfigFingerprint {
    config.fingerprint()
}

/// Everything that affects the bytes of a transcoded intermediate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeConfig {
    /// Source video path.
    pub source: PathBuf,
    /// Keyframe interval (`-g`).
    pub keyframe_interval: u32,
    /// Resolved encoder selection.
    pub encoder: EncoderConfig,
    /// Container extension of the transcoded file, e.g. `avi`.
    #[serde(default = "default_container")]
    pub container: String,
}

fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

impl Fingerprint for TranscodeConfig {
    fn fingerprint(&self) -> ConfigFingerprint {
        let mut h = Fnv1a128::new();
        h.write_u64(FINGERPRINT_FORMAT);
        h.write_u8(KIND_TRANSCODE);
        h.write_str(&source_identity(&self.source));
        h.write_u64(u64::from(self.keyframe_interval));
        h.write_str(&self.encoder.encoder);
        h.write_str(&self.encoder.codec);

        let mut options = self.encoder.options.iter().collect::<Vec<_>>();
        options.sort();
        h.write_u64(options.len() as u64);
        for (k, v) in options {
            h.write_str(k);
            h.write_str(v);
        }
        h.write_str(&self.container);
        finish(h)
    }
}

/// Everything that affects the slice files cut from one transcoded intermediate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SliceConfig {
    /// Fingerprint of the transcode the slices are cut from.
    pub source: ConfigFingerprint,
    /// Frames per slice.
    pub superframe_size: u32,
}

impl Fingerprint for SliceConfig {
    fn fingerprint(&self) -> ConfigFingerprint {
        let mut h = Fnv1a128::new();
        h.write_u64(FINGERPRINT_FORMAT);
        h.write_u8(KIND_SLICES);
        h.write_u64(self.source.hi);
        h.write_u64(self.source.lo);
        h.write_i64(i64::from(self.superframe_size));
        finish(h)
    }
}

fn finish(h: Fnv1a128) -> ConfigFingerprint {
    let (hi, lo) = h.finish();
    ConfigFingerprint { hi, lo }
}

/// Separator-normalized source path, so `a\b.mp4` and `a/b.mp4` share a key.
pub fn source_identity(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
#[path = "../../tests/unit/cache/fingerprint.rs"]
mod tests;
