//! Integer line traversal across a raster grid.

use crate::ProfileError;
use geo::geometry::Coord;
use std::{iter::StepBy, num::NonZeroUsize};

/// Keep every N-th pixel of a traversal, starting with the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleInterval(NonZeroUsize);

impl SampleInterval {
    pub fn new(interval: i64) -> Result<Self, ProfileError> {
        usize::try_from(interval)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| {
                ProfileError::Input(format!(
                    "sampling interval must be a positive integer, got {interval}"
                ))
            })
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for SampleInterval {
    fn default() -> Self {
        Self(NonZeroUsize::MIN)
    }
}

/// Bresenham traversal from `start` to `end`, both inclusive.
///
/// Every yielded pixel is 8-connected to the previous one. Exactly
/// `max(|dx|, |dy|) + 1` pixels are yielded, the last being `end`.
#[derive(Debug, Clone)]
pub struct RasterLine {
    current: Coord<i64>,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
    remaining: usize,
}

impl RasterLine {
    pub fn new(start: Coord<i64>, end: Coord<i64>) -> Self {
        let dx = (end.x - start.x).abs();
        let dy = (end.y - start.y).abs();
        let sx = if start.x < end.x { 1 } else { -1 };
        let sy = if start.y < end.y { 1 } else { -1 };
        let remaining = usize::try_from(dx.max(dy))
            .unwrap_or(usize::MAX)
            .saturating_add(1);
        Self {
            current: start,
            dx,
            dy,
            sx,
            sy,
            err: dx - dy,
            remaining,
        }
    }

    /// Returns a traversal which only yields pixels whose position
    /// in the full path is a multiple of `interval`.
    ///
    /// The stride is anchored at `start`, so swapping `start` and
    /// `end` can select a different subset when `interval > 1`.
    pub fn sampled(start: Coord<i64>, end: Coord<i64>, interval: SampleInterval) -> StepBy<Self> {
        Self::new(start, end).step_by(interval.get())
    }

    fn step(&mut self) {
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.current.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.current.y += self.sy;
        }
    }
}

impl Iterator for RasterLine {
    type Item = Coord<i64>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pixel = self.current;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.step();
        }
        Some(pixel)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for RasterLine {
    fn len(&self) -> usize {
        self.remaining
    }
}
