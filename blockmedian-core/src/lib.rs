//! Block-decomposed 2-D sliding-window median filter.
//!
//! Given a row-major `X * Y` buffer of `f32`/`f64` samples and a window radius
//! `(hx, hy)`, [`median_filter_2d`] writes, for every cell, the median of the
//! input cells inside the axis-aligned window centered on it (clipped at image
//! boundaries). NaNs are excluded from each window's multiset; a window with no
//! non-NaN samples produces NaN.
//!
//! The image is tiled into overlapping blocks; each block sorts its samples once
//! into rank order, then a serpentine ("snake") traversal slides a bit-packed
//! window of ranks over the block's interior cells, so each output cell costs
//! O(window perimeter) bit updates instead of O(window area). Blocks are
//! independent and are processed in parallel, one per worker.

mod bit_window;
mod block_median;
mod dim;
mod driver;
mod error;
mod window_rank;

pub use block_median::BlockMedian;
pub use dim::{BlockDim, Dim};
pub use driver::median_filter_2d;
pub use error::{Error, Result};
pub use window_rank::{WindowOp, WindowRank};
