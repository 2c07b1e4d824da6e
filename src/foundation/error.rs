use std::path::PathBuf;

/// Convenience result type used across compressure.
pub type CompressureResult<T> = Result<T, CompressureError>;

/// Top-level error taxonomy used by the cache, sequencer and pipeline APIs.
#[derive(thiserror::Error, Debug)]
pub enum CompressureError {
    /// Invalid user-provided settings.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The selected encoder is not in the encoder registry.
    #[error("configuration error: unknown encoder '{encoder}' (expected one of: {known})")]
    UnknownEncoder {
        /// Requested encoder name.
        encoder: String,
        /// Comma-separated list of registered encoders.
        known: String,
    },

    /// An encoder option key is not recognized by the selected encoder.
    #[error("configuration error: encoder '{encoder}' does not recognize option '{key}'")]
    UnrecognizedEncoderOption {
        /// Selected encoder name.
        encoder: String,
        /// Offending option key.
        key: String,
    },

    /// The `key value key value ...` option list had an odd number of items.
    #[error("configuration error: encoder options must be key/value pairs, got {len} items")]
    MalformedEncoderConfig {
        /// Number of items supplied.
        len: usize,
    },

    /// Timeline waveform name is not supported.
    #[error("configuration error: unsupported waveform '{0}'")]
    UnsupportedWaveform(String),

    /// The manifest does not exist at the configured path.
    #[error("persistence error: manifest not found at '{}'", path.display())]
    ManifestMissing {
        /// Configured manifest path.
        path: PathBuf,
    },

    /// Durable write of the manifest failed.
    #[error("persistence error: failed to write manifest '{}': {source}", path.display())]
    PersistenceWrite {
        /// Manifest path being written.
        path: PathBuf,
        /// Underlying IO or serialization failure.
        #[source]
        source: anyhow::Error,
    },

    /// Manifest exists but could not be read or understood.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Forward and backward slice sets do not pair up.
    #[error("sequencer error: slice set lengths differ (forward {forward}, backward {backward})")]
    SequencerLengthMismatch {
        /// Forward slice count.
        forward: usize,
        /// Backward slice count.
        backward: usize,
    },

    /// A sequencer needs at least one slice per ring.
    #[error("sequencer error: slice sets are empty")]
    SequencerEmpty,

    /// Other sequencer misuse.
    #[error("sequencer error: {0}")]
    Sequencer(String),

    /// Failure surfaced from `ffmpeg`/`ffprobe` or another external collaborator.
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CompressureError {
    /// Build a [`CompressureError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`CompressureError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`CompressureError::Sequencer`] value.
    pub fn sequencer(msg: impl Into<String>) -> Self {
        Self::Sequencer(msg.into())
    }

    /// Build a [`CompressureError::ExternalTool`] value.
    pub fn external_tool(msg: impl Into<String>) -> Self {
        Self::ExternalTool(msg.into())
    }

    /// True for every variant in the configuration family.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::UnknownEncoder { .. }
                | Self::UnrecognizedEncoderOption { .. }
                | Self::MalformedEncoderConfig { .. }
                | Self::UnsupportedWaveform(_)
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
