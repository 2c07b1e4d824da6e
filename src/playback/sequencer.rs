use std::{fmt, path::PathBuf};

use crate::{
    cache::manifest::{ArtifactKind, ArtifactRecord},
    foundation::error::{CompressureError, CompressureResult},
};

/// Ordered superframe slices cut from one transcoded source at one superframe size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SliceSet<T = PathBuf> {
    superframe_size: u32,
    slices: Vec<T>,
}

impl<T> SliceSet<T> {
    /// Build a slice set. `superframe_size` must be non-zero.
    pub fn new(superframe_size: u32, slices: Vec<T>) -> CompressureResult<Self> {
        if superframe_size == 0 {
            return Err(CompressureError::configuration(
                "superframe_size must be non-zero",
            ));
        }
        Ok(Self {
            superframe_size,
            slices,
        })
    }

    /// Frames per slice.
    pub fn superframe_size(&self) -> u32 {
        self.superframe_size
    }

    /// Slices in playback order.
    pub fn slices(&self) -> &[T] {
        &self.slices
    }

    /// Number of slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// True when no slices were produced.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

impl SliceSet<PathBuf> {
    /// View a cached slice-set record as a [`SliceSet`].
    pub fn from_record(record: &ArtifactRecord, superframe_size: u32) -> CompressureResult<Self> {
        if record.kind != ArtifactKind::SliceSet {
            return Err(CompressureError::persistence(format!(
                "artifact {} is a {:?}, not a slice set",
                record.fingerprint, record.kind
            )));
        }
        Self::new(superframe_size, record.slices.clone())
    }
}

/// Traversal direction of the sequencer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Reading the forward ring.
    Forward,
    /// Reading the backward ring.
    Backward,
}

/// Signed rational velocity with a fixed denominator (the superframe size).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Velocity {
    numerator: i64,
    denominator: u32,
}

impl Velocity {
    /// Numerator; also the slice displacement of one velocity-driven step.
    pub fn numerator(self) -> i64 {
        self.numerator
    }

    /// Denominator, equal to the superframe size.
    pub fn denominator(self) -> u32 {
        self.denominator
    }

    /// Approximate value.
    pub fn as_f64(self) -> f64 {
        self.numerator as f64 / f64::from(self.denominator)
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Reversible walker over one ring of paired forward/backward slices.
///
/// Position `k` of the ring pairs forward slice `k` with backward slice `N - 1 - k`; both rings
/// share a single rotation offset, so either head is an O(1) read. `cursor_index` accumulates
/// total displacement and is never wrapped.
///
/// Which ring is visible lags the velocity by one update (see [`SliceSequencer::set_velocity`]),
/// and the zero-velocity tie-break depends on the current direction, so the visible slice does not
/// jump when velocity passes through zero.
#[derive(Clone, Debug)]
pub struct SliceSequencer<T = PathBuf> {
    forward: Vec<T>,
    backward: Vec<T>,
    offset: usize,
    direction: Direction,
    cursor_index: i128,
    velocity_numerator: i64,
    superframe_size: u32,
}

impl<T> SliceSequencer<T> {
    /// Pair two slice sets of equal length. Starts moving forward at velocity 1.
    pub fn new(forward: SliceSet<T>, backward: SliceSet<T>) -> CompressureResult<Self> {
        if forward.len() != backward.len() {
            return Err(CompressureError::SequencerLengthMismatch {
                forward: forward.len(),
                backward: backward.len(),
            });
        }
        if forward.is_empty() {
            return Err(CompressureError::SequencerEmpty);
        }
        if forward.superframe_size != backward.superframe_size {
            return Err(CompressureError::sequencer(format!(
                "superframe sizes differ (forward {}, backward {})",
                forward.superframe_size, backward.superframe_size
            )));
        }

        let superframe_size = forward.superframe_size;
        let mut backward = backward.slices;
        backward.reverse();

        Ok(Self {
            forward: forward.slices,
            backward,
            offset: 0,
            direction: Direction::Forward,
            cursor_index: 0,
            velocity_numerator: i64::from(superframe_size),
            superframe_size,
        })
    }

    /// Slices in one ring. Both rings always have this length.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Always false; construction rejects empty slice sets.
    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Frames per slice; the velocity denominator.
    pub fn superframe_size(&self) -> u32 {
        self.superframe_size
    }

    /// Direction derived at the last velocity update.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Total displacement since construction. Wide enough that any `i64` target is reachable.
    pub fn cursor_index(&self) -> i128 {
        self.cursor_index
    }

    /// Current velocity as `numerator / superframe_size`.
    pub fn velocity(&self) -> Velocity {
        Velocity {
            numerator: self.velocity_numerator,
            denominator: self.superframe_size,
        }
    }

    /// Head of the forward ring.
    pub fn forward_head(&self) -> &T {
        &self.forward[self.offset]
    }

    /// Head of the backward ring.
    pub fn backward_head(&self) -> &T {
        &self.backward[self.offset]
    }

    /// The visible slice.
    ///
    /// Forward head when moving forward with `velocity >= 0`, or moving backward with
    /// `velocity > 0`; the backward head otherwise.
    pub fn current_head(&self) -> &T {
        let forward = match self.direction {
            Direction::Forward => self.velocity_numerator >= 0,
            Direction::Backward => self.velocity_numerator > 0,
        };
        if forward {
            self.forward_head()
        } else {
            self.backward_head()
        }
    }

    /// Forward ring starting at its head.
    pub fn forward_queue(&self) -> impl Iterator<Item = &T> {
        rotated(&self.forward, self.offset)
    }

    /// Backward ring starting at its head.
    pub fn backward_queue(&self) -> impl Iterator<Item = &T> {
        rotated(&self.backward, self.offset)
    }

    /// Set velocity, truncated toward zero to a multiple of `1 / superframe_size`.
    ///
    /// Direction is derived from the velocity being replaced, not the new one.
    pub fn set_velocity(&mut self, velocity: f64) {
        let numerator = (velocity * f64::from(self.superframe_size)).trunc() as i64;
        self.set_velocity_numerator(numerator);
    }

    /// Exact form of [`SliceSequencer::set_velocity`]: velocity becomes
    /// `numerator / superframe_size`.
    pub fn set_velocity_numerator(&mut self, numerator: i64) {
        let old = self.velocity_numerator;
        self.direction = match self.direction {
            Direction::Forward if old >= 0 => Direction::Forward,
            Direction::Backward if old > 0 => Direction::Forward,
            _ => Direction::Backward,
        };
        self.velocity_numerator = numerator;
    }

    /// Advance and return the new visible slice.
    ///
    /// With a target, moves exactly `target - cursor_index` slices and sets velocity to the sign of
    /// that move. Without one, moves `floor(superframe_size * velocity)` slices.
    pub fn step(&mut self, target_index: Option<i64>) -> &T {
        let moves = match target_index {
            Some(target) => {
                let delta = i128::from(target) - self.cursor_index;
                let sign = delta.signum() as i64;
                self.set_velocity_numerator(sign * i64::from(self.superframe_size));
                delta
            }
            // superframe_size * (numerator / superframe_size) is exact.
            None => i128::from(self.velocity_numerator),
        };

        self.rotate(moves);
        self.cursor_index = self.cursor_index.saturating_add(moves);
        tracing::trace!(
            cursor = %self.cursor_index,
            moves = %moves,
            velocity = %self.velocity(),
            direction = ?self.direction,
            "sequencer step"
        );
        self.current_head()
    }

    /// Add `degree / superframe_size` to the velocity, then take a velocity-driven step.
    ///
    /// The velocity numerator saturates at the `i64` bounds.
    pub fn accelerate(&mut self, degree: i64) -> &T {
        self.set_velocity_numerator(self.velocity_numerator.saturating_add(degree));
        self.step(None)
    }

    fn rotate(&mut self, moves: i128) {
        let n = self.forward.len() as i128;
        self.offset = (self.offset as i128 + moves.rem_euclid(n)).rem_euclid(n) as usize;
    }
}

fn rotated<T>(ring: &[T], offset: usize) -> impl Iterator<Item = &T> {
    ring[offset..].iter().chain(ring[..offset].iter())
}

#[cfg(test)]
#[path = "../../tests/unit/playback/sequencer.rs"]
mod tests;
