pub(crate) mod config;
pub(crate) mod ffmpeg;
pub(crate) mod tools;
