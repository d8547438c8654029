//! Error taxonomy for the median filter driver.

use thiserror::Error;

/// Errors returned by [`crate::median_filter_2d`].
///
/// All validation happens before any worker starts (see
/// [`crate::driver`]); on error, the output buffer is left untouched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// The resolved block size `b` cannot hold the requested window.
    #[error("window does not fit block: need 2*h+1 < b on both axes (hx={hx}, hy={hy}, b={b})")]
    InvalidWindow { hx: usize, hy: usize, b: usize },

    /// One of the image dimensions is zero.
    #[error("image dimensions must be non-zero (got {x}x{y})")]
    InvalidDim { x: usize, y: usize },

    /// Per-worker scratch buffers could not be allocated.
    #[error("failed to allocate per-worker scratch buffers")]
    AllocationFailed,
}

pub type Result<T> = std::result::Result<T, Error>;
