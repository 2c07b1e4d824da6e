use std::{f64::consts::PI, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{CompressureError, CompressureResult};

/// Periodic shape a timeline is sampled from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Waveform {
    /// `|sin|` scaled to `buffer_length - 1`.
    #[default]
    Sinusoid,
    /// `|sin|` scaled to `buffer_length`.
    CompoundSinusoid,
}

impl Waveform {
    /// Name accepted by [`Waveform::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Sinusoid => "sinusoid",
            Self::CompoundSinusoid => "compound-sinusoid",
        }
    }

    fn amplitude(self, buffer_length: usize) -> f64 {
        match self {
            Self::Sinusoid => buffer_length.saturating_sub(1) as f64,
            Self::CompoundSinusoid => buffer_length as f64,
        }
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = CompressureError;

    fn from_str(s: &str) -> CompressureResult<Self> {
        match s {
            "sinusoid" => Ok(Self::Sinusoid),
            "compound-sinusoid" => Ok(Self::CompoundSinusoid),
            other => Err(CompressureError::UnsupportedWaveform(other.to_string())),
        }
    }
}

/// Finite, single-pass sequence of target cursor offsets.
///
/// Samples `sin(x)` at `n_points` evenly spaced `x` over `[0, 2π·frequency]` (both ends
/// included), scales by the waveform amplitude, folds negative samples onto their absolute value
/// and truncates toward zero.
#[derive(Clone, Debug)]
pub struct Timeline {
    stop: f64,
    amplitude: f64,
    n_points: usize,
    next: usize,
}

impl Iterator for Timeline {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        if self.next >= self.n_points {
            return None;
        }
        let x = linspace_at(self.stop, self.n_points, self.next);
        self.next += 1;
        Some(((x.sin() * self.amplitude).abs()).trunc() as i64)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n_points - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Timeline {}

/// Build a timeline of `n_points` targets for a ring of `buffer_length` slices.
///
/// `superframe_size` is accepted for symmetry with the sequencer and must be non-zero; it does not
/// affect the samples.
pub fn generate(
    superframe_size: u32,
    buffer_length: usize,
    frequency: f64,
    n_points: usize,
    waveform: &str,
) -> CompressureResult<Timeline> {
    timeline(
        superframe_size,
        buffer_length,
        frequency,
        n_points,
        waveform.parse()?,
    )
}

/// Typed form of [`generate`].
pub fn timeline(
    superframe_size: u32,
    buffer_length: usize,
    frequency: f64,
    n_points: usize,
    waveform: Waveform,
) -> CompressureResult<Timeline> {
    if superframe_size == 0 {
        return Err(CompressureError::configuration(
            "superframe_size must be non-zero",
        ));
    }
    if !frequency.is_finite() {
        return Err(CompressureError::configuration(
            "timeline frequency must be finite",
        ));
    }

    Ok(Timeline {
        stop: 2.0 * PI * frequency,
        amplitude: waveform.amplitude(buffer_length),
        n_points,
        next: 0,
    })
}

fn linspace_at(stop: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    if i == n - 1 {
        return stop;
    }
    let step = stop / ((n - 1) as f64);
    (i as f64) * step
}

#[cfg(test)]
#[path = "../../tests/unit/playback/timeline.rs"]
mod tests;
