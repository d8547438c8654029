//! `BlockMedian<T>` (C4): processes one tile (rank build, snake traversal, window
//! updates, output writes).
//!
//! Owned once per worker and reused across every block that worker is assigned, so
//! no scratch is allocated mid-run (see [`crate::driver`]).

use num_traits::Float;

use crate::dim::{BlockDim, Dim};
use crate::window_rank::{WindowOp, WindowRank};

/// Per-worker scratch and the two axes' current tile placement.
pub struct BlockMedian<T> {
    rank: WindowRank<T>,
    bd_x: BlockDim,
    bd_y: BlockDim,
}

impl<T: Float> BlockMedian<T> {
    /// Allocates scratch sized for blocks of up to `capacity = b * b` cells.
    pub fn new(capacity: usize, dim_x: &Dim, dim_y: &Dim) -> Self {
        Self {
            rank: WindowRank::with_capacity(capacity),
            bd_x: dim_x.block(0),
            bd_y: dim_y.block(0),
        }
    }

    /// Fallible counterpart of [`BlockMedian::new`].
    pub fn try_new(capacity: usize, dim_x: &Dim, dim_y: &Dim) -> Option<Self> {
        Some(Self {
            rank: WindowRank::try_with_capacity(capacity)?,
            bd_x: dim_x.block(0),
            bd_y: dim_y.block(0),
        })
    }

    /// Processes tile `(bx, by)` using the snake traversal, writing interior cells
    /// into `output` (an `image_width * image_height` row-major buffer).
    pub fn run(
        &mut self,
        dim_x: &Dim,
        dim_y: &Dim,
        bx: usize,
        by: usize,
        input: &[T],
        output: &mut [T],
        image_width: usize,
    ) {
        self.bd_x = dim_x.block(bx);
        self.bd_y = dim_y.block(by);

        self.build_ranks(input, image_width);
        self.snake_traverse(output, image_width);
    }

    /// Reference implementation: clears and fully re-inserts the window at every
    /// interior cell instead of incrementally updating it. O(window area) per
    /// cell; used only to check the snake traversal against it in tests.
    pub fn run_naive(
        &mut self,
        dim_x: &Dim,
        dim_y: &Dim,
        bx: usize,
        by: usize,
        input: &[T],
        output: &mut [T],
        image_width: usize,
    ) {
        self.bd_x = dim_x.block(bx);
        self.bd_y = dim_y.block(by);

        self.build_ranks(input, image_width);

        for y in self.bd_y.b0..self.bd_y.b1 {
            let wy0 = self.bd_y.window_lo(y);
            let wy1 = self.bd_y.window_hi(y);
            for x in self.bd_x.b0..self.bd_x.b1 {
                self.rank.clear();
                let wx0 = self.bd_x.window_lo(x);
                let wx1 = self.bd_x.window_hi(x);
                self.update_rect(wx0, wx1, wy0, wy1, WindowOp::Insert);
                self.emit(x, y, output, image_width);
            }
        }
    }

    /// Step 1: sorts the block's samples once so the window can track ranks.
    fn build_ranks(&mut self, input: &[T], image_width: usize) {
        self.rank.init_begin();
        let len_x = self.bd_x.len;
        let len_y = self.bd_y.len;
        let start_x = self.bd_x.start;
        let start_y = self.bd_y.start;

        for y in 0..len_y {
            let row = (y + start_y) * image_width + start_x;
            for x in 0..len_x {
                let value = input[row + x];
                self.rank.init_feed(value, y * len_x + x);
            }
        }
        self.rank.init_finish();
    }

    /// Step 2: serpentine visit of every interior cell, moving the window one cell
    /// at a time instead of rebuilding it.
    fn snake_traverse(&mut self, output: &mut [T], image_width: usize) {
        let (b0x, b1x) = (self.bd_x.b0, self.bd_x.b1);
        let (b0y, b1y) = (self.bd_y.b0, self.bd_y.b1);
        debug_assert!(b0x < b1x && b0y < b1y, "empty interior");

        self.rank.clear();
        let wx0 = self.bd_x.window_lo(b0x);
        let wx1 = self.bd_x.window_hi(b0x);
        let wy0 = self.bd_y.window_lo(b0y);
        let wy1 = self.bd_y.window_hi(b0y);
        self.update_rect(wx0, wx1, wy0, wy1, WindowOp::Insert);
        self.emit(b0x, b0y, output, image_width);

        let mut x = b0x;
        let mut y = b0y;
        let mut going_down = true;

        loop {
            if going_down && y + 1 < b1y {
                self.step_vertical(x, y, y + 1);
                y += 1;
                self.emit(x, y, output, image_width);
                continue;
            }
            if !going_down && y > b0y {
                self.step_vertical(x, y, y - 1);
                y -= 1;
                self.emit(x, y, output, image_width);
                continue;
            }

            if x + 1 < b1x {
                self.step_horizontal(x, x + 1, y);
                x += 1;
                going_down = !going_down;
                self.emit(x, y, output, image_width);
            } else {
                break;
            }
        }
    }

    fn step_vertical(&mut self, x: usize, y: usize, y_new: usize) {
        let wx0 = self.bd_x.window_lo(x);
        let wx1 = self.bd_x.window_hi(x);

        if y_new == y + 1 {
            let (ry0, ry1) = (self.bd_y.window_lo(y), self.bd_y.window_lo(y_new));
            self.update_rect(wx0, wx1, ry0, ry1, WindowOp::Remove);
            let (iy0, iy1) = (self.bd_y.window_hi(y), self.bd_y.window_hi(y_new));
            self.update_rect(wx0, wx1, iy0, iy1, WindowOp::Insert);
        } else {
            debug_assert_eq!(y_new + 1, y);
            let (ry0, ry1) = (self.bd_y.window_hi(y_new), self.bd_y.window_hi(y));
            self.update_rect(wx0, wx1, ry0, ry1, WindowOp::Remove);
            let (iy0, iy1) = (self.bd_y.window_lo(y_new), self.bd_y.window_lo(y));
            self.update_rect(wx0, wx1, iy0, iy1, WindowOp::Insert);
        }
    }

    fn step_horizontal(&mut self, x: usize, x_new: usize, y: usize) {
        debug_assert_eq!(x_new, x + 1);
        let wy0 = self.bd_y.window_lo(y);
        let wy1 = self.bd_y.window_hi(y);

        let (rx0, rx1) = (self.bd_x.window_lo(x), self.bd_x.window_lo(x_new));
        self.update_rect(rx0, rx1, wy0, wy1, WindowOp::Remove);
        let (ix0, ix1) = (self.bd_x.window_hi(x), self.bd_x.window_hi(x_new));
        self.update_rect(ix0, ix1, wy0, wy1, WindowOp::Insert);
    }

    #[inline]
    fn update_rect(&mut self, x0: usize, x1: usize, y0: usize, y1: usize, op: WindowOp) {
        let len_x = self.bd_x.len;
        for y in y0..y1 {
            let row = y * len_x;
            for x in x0..x1 {
                self.rank.update(op, row + x);
            }
        }
    }

    fn emit(&mut self, x: usize, y: usize, output: &mut [T], image_width: usize) {
        let value = self.rank.median();
        let ox = self.bd_x.start + x;
        let oy = self.bd_y.start + y;
        output[oy * image_width + ox] = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3x3 block, one tile, h=1 both axes: every cell's window is the full image.
    #[test]
    fn single_block_center_is_global_median() {
        let dim_x = Dim::new(3, 1, 8);
        let dim_y = Dim::new(3, 1, 8);
        let input: Vec<f64> = (1..=9).map(|v| v as f64).collect();
        let mut output = vec![0.0f64; 9];

        let mut bm = BlockMedian::<f64>::new(9, &dim_x, &dim_y);
        bm.run(&dim_x, &dim_y, 0, 0, &input, &mut output, 3);

        assert_eq!(output[1 * 3 + 1], 5.0);
    }

    #[test]
    fn zero_radius_is_identity() {
        let dim_x = Dim::new(3, 0, 8);
        let dim_y = Dim::new(3, 0, 8);
        let input: Vec<f64> = (1..=9).map(|v| v as f64).collect();
        let mut output = vec![0.0f64; 9];

        let mut bm = BlockMedian::<f64>::new(9, &dim_x, &dim_y);
        bm.run(&dim_x, &dim_y, 0, 0, &input, &mut output, 3);

        assert_eq!(output, input);
    }
}
