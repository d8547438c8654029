//! `Driver` (C5): resolves the block size, tiles the image, dispatches blocks to
//! workers, and writes the (disjoint) output regions in parallel.

use num_traits::Float;

use crate::block_median::BlockMedian;
use crate::dim::Dim;
use crate::error::{Error, Result};

/// Raw-pointer wrapper so the output buffer can be captured by multiple `rayon`
/// tasks at once.
///
/// SAFETY: every task that holds a copy of this pointer only ever writes to the
/// interior cells of the blocks assigned to it, and the interiors of all blocks
/// partition the image exactly (see `Dim`/`BlockDim`). No two tasks ever touch
/// the same index.
#[derive(Clone, Copy)]
struct OutputPtr<T>(*mut T);

unsafe impl<T> Send for OutputPtr<T> {}
unsafe impl<T> Sync for OutputPtr<T> {}

/// Chooses the default block side for a window half-width of `max(hx, hy)`.
///
/// Empirically balances rank-build cost (`O(b^2)`) against per-cell update cost
/// (`O(b * h)`); callers can override via `b_hint`.
fn default_block_size(hx: usize, hy: usize) -> usize {
    4 * (hx.max(hy) + 2)
}

/// Computes the 2-D sliding median of `input` into `output`.
///
/// `input` and `output` are row-major `x * y` buffers (the "x" axis, the first
/// dimension, is the one along which the packed index increases by one per step).
/// `output` is fully populated on success; on error it is left untouched.
pub fn median_filter_2d<T>(
    x: usize,
    y: usize,
    hx: usize,
    hy: usize,
    b_hint: usize,
    input: &[T],
    output: &mut [T],
) -> Result<()>
where
    T: Float + Send + Sync,
{
    if x == 0 || y == 0 {
        return Err(Error::InvalidDim { x, y });
    }
    assert_eq!(input.len(), x * y, "input buffer must hold x*y samples");
    assert_eq!(output.len(), x * y, "output buffer must hold x*y samples");

    let b = if b_hint == 0 { default_block_size(hx, hy) } else { b_hint };
    if 2 * hx + 1 >= b || 2 * hy + 1 >= b {
        return Err(Error::InvalidWindow { hx, hy, b });
    }

    let dim_x = Dim::new(x, hx, b);
    let dim_y = Dim::new(y, hy, b);
    let capacity = b * b;

    log::debug!(
        "median_filter_2d: {x}x{y} image, window ({hx},{hy}), block {b}, tiles {}x{}",
        dim_x.count,
        dim_y.count
    );

    // Probe the allocation once on the calling thread before any worker starts,
    // so a failure is reported without ever touching `output`.
    BlockMedian::<T>::try_new(capacity, &dim_x, &dim_y).ok_or(Error::AllocationFailed)?;

    let blocks: Vec<(usize, usize)> = (0..dim_y.count)
        .flat_map(|by| (0..dim_x.count).map(move |bx| (bx, by)))
        .collect();

    let out_ptr = OutputPtr(output.as_mut_ptr());
    let out_len = output.len();
    let num_threads = rayon::current_num_threads().max(1);
    let chunk_size = blocks.len().div_ceil(num_threads).max(1);

    rayon::scope(|scope| {
        for chunk in blocks.chunks(chunk_size) {
            let dim_x = &dim_x;
            let dim_y = &dim_y;
            scope.spawn(move |_| {
                let mut worker = BlockMedian::<T>::new(capacity, dim_x, dim_y);
                // SAFETY: see `OutputPtr`; each block's interior is disjoint from
                // every other block's, so concurrent tasks never alias a write.
                let out_slice = unsafe { std::slice::from_raw_parts_mut(out_ptr.0, out_len) };
                for &(bx, by) in chunk {
                    worker.run(dim_x, dim_y, bx, by, input, out_slice, x);
                }
            });
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_image() {
        let input: Vec<f64> = vec![];
        let mut output: Vec<f64> = vec![];
        let err = median_filter_2d(0, 0, 0, 0, 0, &input, &mut output).unwrap_err();
        assert_eq!(err, Error::InvalidDim { x: 0, y: 0 });
    }

    #[test]
    fn rejects_window_larger_than_block() {
        let input = vec![1.0f64; 9];
        let mut output = vec![0.0f64; 9];
        let err = median_filter_2d(3, 3, 1, 1, 2, &input, &mut output).unwrap_err();
        assert_eq!(err, Error::InvalidWindow { hx: 1, hy: 1, b: 2 });
    }

    #[test]
    fn single_row_window() {
        let input = [1.0f64, 5.0, 2.0, 4.0, 3.0];
        let mut output = [0.0f64; 5];
        median_filter_2d(5, 1, 1, 0, 0, &input, &mut output).unwrap();
        assert_eq!(output, [3.0, 2.0, 4.0, 3.0, 3.5]);
    }

    #[test]
    fn zero_radius_is_identity() {
        let input: Vec<f64> = (0..16).map(|v| v as f64).collect();
        let mut output = vec![0.0f64; 16];
        median_filter_2d(4, 4, 0, 0, 0, &input, &mut output).unwrap();
        assert_eq!(output, input);
    }
}
