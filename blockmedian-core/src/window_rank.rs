//! `WindowRank<T>` (C2): the value layer wrapped around a [`BitWindow`].
//!
//! A block's samples are sorted once into rank order; from then on the sliding
//! window tracks ranks (cheap bit operations) rather than values, so median queries
//! cost the same regardless of how the samples are distributed.

use num_traits::Float;
use std::cmp::Ordering;

use crate::bit_window::BitWindow;

/// Sentinel written into `rank[slot]` for slots that held a NaN sample.
const NAN_MARKER: i64 = -1;

/// Which side of the sliding window an update applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOp {
    Insert,
    Remove,
}

/// Maps a block's cells to sorted ranks and back, and exposes the median of
/// whatever subset of ranks is currently active in the wrapped [`BitWindow`].
pub struct WindowRank<T> {
    window: BitWindow,
    /// `rank[slot]` is the slot's position in `sorted`, or `NAN_MARKER`.
    rank: Vec<i64>,
    /// `(value, slot)` pairs for the non-NaN cells of the current block, ascending.
    sorted: Vec<(T, u32)>,
}

impl<T: Float> WindowRank<T> {
    /// Allocates scratch for blocks of up to `capacity` cells (`b * b`).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: BitWindow::new(capacity),
            rank: vec![NAN_MARKER; capacity],
            sorted: Vec::with_capacity(capacity),
        }
    }

    /// Fallible counterpart of [`WindowRank::with_capacity`].
    pub fn try_with_capacity(capacity: usize) -> Option<Self> {
        let window = BitWindow::try_new(capacity)?;
        let mut rank = Vec::new();
        rank.try_reserve_exact(capacity).ok()?;
        rank.resize(capacity, NAN_MARKER);
        let mut sorted = Vec::new();
        sorted.try_reserve_exact(capacity).ok()?;
        Some(Self { window, rank, sorted })
    }

    /// Begins building the rank table for a new block.
    pub fn init_begin(&mut self) {
        self.sorted.clear();
    }

    /// Feeds one block cell's value at packed index `slot`.
    ///
    /// Must be called exactly once per slot in `0..bb` before [`Self::init_finish`];
    /// every slot is written either here (NaN branch) or in `init_finish` (non-NaN),
    /// so no slot is ever read unwritten.
    pub fn init_feed(&mut self, value: T, slot: usize) {
        if value.is_nan() {
            self.rank[slot] = NAN_MARKER;
        } else {
            self.sorted.push((value, slot as u32));
        }
    }

    /// Sorts the fed values and writes back their ranks.
    pub fn init_finish(&mut self) {
        self.sorted.sort_unstable_by(|a, b| {
            a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1))
        });
        for (i, &(_, slot)) in self.sorted.iter().enumerate() {
            self.rank[slot as usize] = i as i64;
        }
    }

    /// Empties the sliding window (does not touch the rank table).
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Inserts or removes slot `slot` from the sliding window. A no-op if the
    /// slot's value was NaN.
    #[inline]
    pub fn update(&mut self, op: WindowOp, slot: usize) {
        let r = self.rank[slot];
        if r == NAN_MARKER {
            return;
        }
        match op {
            WindowOp::Insert => self.window.insert(r as usize),
            WindowOp::Remove => self.window.remove(r as usize),
        }
    }

    /// Median of the values currently active in the window. NaN if the window is
    /// empty (all-NaN or zero-size).
    pub fn median(&mut self) -> T {
        let n = self.window.len();
        if n == 0 {
            return T::nan();
        }
        let g1 = (n - 1) / 2;
        let g2 = n / 2;

        let v1 = self.sorted[self.window.find(g1)].0;
        if g1 == g2 {
            v1
        } else {
            let v2 = self.sorted[self.window.find(g2)].0;
            (v1 + v2) / (T::one() + T::one())
        }
    }
}
