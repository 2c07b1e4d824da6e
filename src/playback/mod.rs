//! Slice ring walking and the timelines that drive it.

pub(crate) mod sequencer;
pub(crate) mod timeline;
