use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CompressureError, CompressureResult};

/// Encoder selected when none is given.
pub const DEFAULT_ENCODER: &str = "h264";

/// Keyframe interval (GOP size) used when none is given.
pub const DEFAULT_GOP_SIZE: u32 = 6000;

/// One entry of the encoder registry.
#[derive(Clone, Copy, Debug)]
pub struct EncoderSpec {
    /// User-facing encoder name.
    pub name: &'static str,
    /// `ffmpeg` codec passed to `-c:v`.
    pub codec: &'static str,
    /// Recognized option keys with their default values.
    pub defaults: &'static [(&'static str, &'static str)],
}

const ENCODERS: &[EncoderSpec] = &[
    EncoderSpec {
        name: "h264",
        codec: "libx264",
        defaults: &[("bf", "0"), ("crf", "23"), ("preset", "ultrafast")],
    },
    EncoderSpec {
        name: "hevc",
        codec: "libx265",
        defaults: &[("bf", "0"), ("crf", "28"), ("preset", "ultrafast")],
    },
    EncoderSpec {
        name: "mpeg4",
        codec: "mpeg4",
        defaults: &[("bf", "0"), ("qscale:v", "3")],
    },
    EncoderSpec {
        name: "mjpeg",
        codec: "mjpeg",
        defaults: &[("qscale:v", "3")],
    },
];

/// Registered encoders, in registry order.
pub fn encoder_registry() -> &'static [EncoderSpec] {
    ENCODERS
}

/// Lookup an encoder by its user-facing name.
pub fn find_encoder(name: &str) -> CompressureResult<&'static EncoderSpec> {
    ENCODERS
        .iter()
        .find(|e| e.name == name)
        .ok_or_else(|| CompressureError::UnknownEncoder {
            encoder: name.to_string(),
            known: ENCODERS
                .iter()
                .map(|e| e.name)
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Fully resolved encoder selection: registry defaults overlaid with user options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// User-facing encoder name.
    pub encoder: String,
    /// `ffmpeg` codec name.
    pub codec: String,
    /// Option mapping; keys are always a subset of the encoder's recognized set.
    pub options: BTreeMap<String, String>,
}

impl EncoderConfig {
    /// Registry defaults for `encoder`.
    pub fn defaults_for(encoder: &str) -> CompressureResult<Self> {
        let spec = find_encoder(encoder)?;
        Ok(Self {
            encoder: spec.name.to_string(),
            codec: spec.codec.to_string(),
            options: spec
                .defaults
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        })
    }

    /// Build from a flat `key value key value ...` list as given on the command line.
    pub fn from_user_options<S: AsRef<str>>(encoder: &str, kv: &[S]) -> CompressureResult<Self> {
        let mut cfg = Self::defaults_for(encoder)?;
        if kv.len() % 2 != 0 {
            return Err(CompressureError::MalformedEncoderConfig { len: kv.len() });
        }
        for pair in kv.chunks_exact(2) {
            cfg.set_option(pair[0].as_ref(), pair[1].as_ref())?;
        }
        Ok(cfg)
    }

    /// Override a recognized option.
    pub fn set_option(&mut self, key: &str, value: &str) -> CompressureResult<()> {
        match self.options.get_mut(key) {
            Some(slot) => {
                *slot = value.to_string();
                Ok(())
            }
            None => Err(CompressureError::UnrecognizedEncoderOption {
                encoder: self.encoder.clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Re-check the option keys against the registry.
    ///
    /// Configs deserialized from JSON bypass [`EncoderConfig::set_option`], so the pipeline calls
    /// this before any transcode attempt.
    pub fn validate(&self) -> CompressureResult<()> {
        let spec = find_encoder(&self.encoder)?;
        if spec.codec != self.codec {
            return Err(CompressureError::configuration(format!(
                "encoder '{}' must use codec '{}', got '{}'",
                self.encoder, spec.codec, self.codec
            )));
        }
        for key in self.options.keys() {
            if !spec.defaults.iter().any(|(k, _)| k == key) {
                return Err(CompressureError::UnrecognizedEncoderOption {
                    encoder: self.encoder.clone(),
                    key: key.clone(),
                });
            }
        }
        Ok(())
    }

    /// `-c:v <codec> -<key> <value> ...` in sorted key order.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args = vec!["-c:v".to_string(), self.codec.clone()];
        for (k, v) in &self.options {
            args.push(format!("-{k}"));
            args.push(v.clone());
        }
        args
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/config.rs"]
mod tests;
