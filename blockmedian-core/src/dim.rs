//! `Dim` / `BlockDim` (C3): pure geometry for tiling one axis of the image.
//!
//! `Dim` is computed once per axis from the image size, the window half-width and
//! the chosen block side. `BlockDim` derives the placement of a single tile along
//! that axis. Both are plain value types; no allocation, no state beyond their
//! fields.

/// Geometry of one axis of the tiled image.
#[derive(Debug, Clone, Copy)]
pub struct Dim {
    pub size: usize,
    pub h: usize,
    pub b: usize,
    pub step: usize,
    pub count: usize,
}

impl Dim {
    /// Builds the tiling of an axis of length `size` with window half-width `h`
    /// and block side `b`. Precondition: `2*h + 1 < b` (checked by the driver
    /// before this is called; violating it is a caller bug, not a runtime error).
    pub fn new(size: usize, h: usize, b: usize) -> Self {
        debug_assert!(2 * h + 1 < b, "window does not fit inside block: h={h} b={b}");
        let step = b - 2 * h;
        let count = if size <= b {
            1
        } else {
            let remaining = size - 2 * h;
            (remaining + step - 1) / step
        };

        let dim = Self { size, h, b, step, count };
        debug_assert!(dim.count >= 1);
        debug_assert!(2 * h + dim.count * step >= size);
        debug_assert!(dim.count == 1 || 2 * h + (dim.count - 1) * step < size);
        dim
    }

    /// Placement of tile `i` along this axis. Precondition: `i < count`.
    pub fn block(&self, i: usize) -> BlockDim {
        BlockDim::new(self, i)
    }
}

/// Placement of one tile along one axis, derived from a [`Dim`] and a tile index.
#[derive(Debug, Clone, Copy)]
pub struct BlockDim {
    /// Image coordinate of the tile's leading edge.
    pub start: usize,
    /// Image coordinate one past the tile's trailing edge.
    pub end: usize,
    /// `end - start`, at most `b`.
    pub len: usize,
    /// First interior cell (local coordinate) whose window fits without halo support
    /// from a neighboring tile.
    pub b0: usize,
    /// One past the last interior cell (local coordinate).
    pub b1: usize,
    h: usize,
}

impl BlockDim {
    fn new(dim: &Dim, i: usize) -> Self {
        debug_assert!(i < dim.count, "tile index {i} out of range (count={})", dim.count);
        let is_last = i == dim.count - 1;

        let start = i * dim.step;
        let end = if is_last { dim.size } else { 2 * dim.h + (i + 1) * dim.step };
        let len = end - start;
        let b0 = if i == 0 { 0 } else { dim.h };
        let b1 = if is_last { len } else { len - dim.h };

        debug_assert!(b0 < b1, "empty interior for tile {i}");
        Self { start, end, len, b0, b1, h: dim.h }
    }

    /// Lower bound (inclusive, local coordinate) of the window around local cell `v`.
    #[inline]
    pub fn window_lo(&self, v: usize) -> usize {
        v.saturating_sub(self.h)
    }

    /// Upper bound (exclusive, local coordinate) of the window around local cell `v`.
    #[inline]
    pub fn window_hi(&self, v: usize) -> usize {
        (v + 1 + self.h).min(self.len)
    }
}
