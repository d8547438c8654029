//! Python bindings for the 2-D sliding-window median filter.

use blockmedian_core::{median_filter_2d, Error};
use numpy::{PyArray1, PyArray2, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyTuple;
use rayon::ThreadPoolBuilder;

fn error_to_py(err: Error) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// 2-D sliding median filter over a row-major `(y, x)` array.
///
/// NaN values in ``data`` are excluded from each window; a window with no
/// valid values produces NaN. For an even count of valid values, the two
/// middle order statistics are averaged.
///
/// Parameters
/// ----------
/// data : numpy.ndarray[float64]
///     2-D input array, shape ``(y, x)``.
/// hx : int
///     Window half-width along the ``x`` (column) axis.
/// hy : int
///     Window half-width along the ``y`` (row) axis.
/// block_size : int, optional
///     Tile side length. ``0`` (the default) picks a size from ``hx``/``hy``.
/// num_threads : int, optional
///     Size of a dedicated Rayon thread pool for this call. Defaults to the
///     global pool.
///
/// Returns
/// -------
/// numpy.ndarray[float64]
///     Array with the same shape as ``data``.
#[pyfunction(
    name = "median_filter_2d",
    signature = (data, hx, hy, block_size=0, num_threads=None)
)]
#[allow(clippy::too_many_arguments)]
fn py_median_filter_2d<'py>(
    py: Python<'py>,
    data: PyReadonlyArray2<'py, f64>,
    hx: usize,
    hy: usize,
    block_size: usize,
    num_threads: Option<usize>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let shape = data.shape();
    let (y, x) = (shape[0], shape[1]);
    // Copy out of Python-owned memory before releasing the GIL below, mirroring
    // the rest of the crate's bindings.
    let input: Vec<f64> = data
        .as_slice()
        .map_err(|_| PyValueError::new_err("data must be C-contiguous"))?
        .to_vec();

    let mut output = vec![0.0f64; x * y];

    let run = |out: &mut [f64]| median_filter_2d(x, y, hx, hy, block_size, &input, out);

    py.allow_threads(|| -> PyResult<()> {
        match num_threads {
            Some(n) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| PyRuntimeError::new_err(e.to_string()))?;
                pool.install(|| run(&mut output)).map_err(error_to_py)
            }
            None => run(&mut output).map_err(error_to_py),
        }
    })?;

    // Build as a flat 1-D array, then reshape on the Python side: avoids
    // committing to a particular nested-Vec NumPy constructor.
    let arr1 = PyArray1::from_vec_bound(py, output);
    let shape_tuple = PyTuple::new_bound(py, [y, x]);
    arr1.call_method1("reshape", (shape_tuple,))?
        .downcast_into::<PyArray2<f64>>()
        .map_err(|e| pyo3::exceptions::PyTypeError::new_err(e.to_string()))
}

#[pymodule]
fn _blockmedian(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_median_filter_2d, m)?)?;
    Ok(())
}
