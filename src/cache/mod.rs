//! Fingerprint-keyed persistence for expensive transcode and slice artifacts.

pub(crate) mod fingerprint;
pub(crate) mod manifest;
pub(crate) mod persistence;
