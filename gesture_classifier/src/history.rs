//! Fixed-length movement history.

use std::collections::VecDeque;

/// Recent absolute height displacements (pixels), most recent first.
///
/// The length is fixed at construction; every push drops the oldest entry.
#[derive(Clone, Debug, PartialEq)]
pub struct MovementHistory {
    entries: VecDeque<f32>,
}

impl MovementHistory {
    /// A zeroed history of `len` entries.  A zero length is bumped to one.
    pub fn new(len: usize) -> Self {
        let len = len.max(1);
        MovementHistory { entries: std::iter::repeat(0.0).take(len).collect() }
    }

    /// Record a displacement at the front, dropping the oldest.
    pub fn push(&mut self, displacement: f32) {
        self.entries.pop_back();
        self.entries.push_front(displacement.abs());
    }

    /// Zero every entry.
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(|e| *e = 0.0);
    }

    pub fn sum(&self) -> f32 { self.entries.iter().sum() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn latest(&self) -> f32 { self.entries.front().copied().unwrap_or(0.0) }

    pub fn iter(&self) -> impl Iterator<Item = &f32> { self.entries.iter() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
