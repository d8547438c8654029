//! Correctness against a sort-based brute-force reference, and snake-vs-naive
//! equivalence, driven by small exhaustive grids rather than randomized input
//! (the randomized/property variants live in `properties.rs`).

use blockmedian_core::{median_filter_2d, BlockMedian, Dim};

/// Sort-based reference median for one window, with the same tie rule as
/// `WindowRank::median` (mean of the two middle order statistics for an
/// even count).
fn brute_force_median(values: &mut [f64]) -> f64 {
    let mut vs: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if vs.is_empty() {
        return f64::NAN;
    }
    vs.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let n = vs.len();
    let g1 = (n - 1) / 2;
    let g2 = n / 2;
    if g1 == g2 {
        vs[g1]
    } else {
        (vs[g1] + vs[g2]) / 2.0
    }
}

fn brute_force_filter(x: usize, y: usize, hx: usize, hy: usize, input: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0f64; x * y];
    for oy in 0..y {
        let y0 = oy.saturating_sub(hy);
        let y1 = (oy + hy + 1).min(y);
        for ox in 0..x {
            let x0 = ox.saturating_sub(hx);
            let x1 = (ox + hx + 1).min(x);
            let mut window = Vec::with_capacity((y1 - y0) * (x1 - x0));
            for wy in y0..y1 {
                for wx in x0..x1 {
                    window.push(input[wy * x + wx]);
                }
            }
            out[oy * x + ox] = brute_force_median(&mut window);
        }
    }
    out
}

fn assert_images_eq(a: &[f64], b: &[f64]) {
    assert_eq!(a.len(), b.len());
    for (i, (&va, &vb)) in a.iter().zip(b.iter()).enumerate() {
        if va.is_nan() || vb.is_nan() {
            assert!(va.is_nan() && vb.is_nan(), "mismatch at {i}: {va} vs {vb}");
        } else {
            assert!((va - vb).abs() < 1e-9, "mismatch at {i}: {va} vs {vb}");
        }
    }
}

/// Small deterministic grids covering a spread of (X, Y, hx, hy, b) combinations,
/// some with NaNs, compared against the brute-force reference.
#[test]
fn matches_brute_force_on_small_grids() {
    let mut state: u64 = 0x9e3779b97f4a7c15;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for &(x, y) in &[(1usize, 1usize), (3, 1), (1, 4), (5, 5), (8, 6), (16, 13), (32, 17)] {
        for &(hx, hy) in &[(0usize, 0usize), (1, 0), (0, 2), (2, 2), (x / 2, y / 2)] {
            if hx > x / 2 || hy > y / 2 {
                continue;
            }
            for &b in &[4usize.max(2 * hx.max(hy) + 2), 8, 16, 32] {
                if 2 * hx + 1 >= b || 2 * hy + 1 >= b {
                    continue;
                }

                let input: Vec<f64> = (0..x * y)
                    .map(|_| {
                        let r = next();
                        if r % 11 == 0 {
                            f64::NAN
                        } else {
                            (r % 1000) as f64 / 7.0
                        }
                    })
                    .collect();

                let mut got = vec![0.0f64; x * y];
                median_filter_2d(x, y, hx, hy, b, &input, &mut got).unwrap();

                let expected = brute_force_filter(x, y, hx, hy, &input);
                assert_images_eq(&got, &expected);
            }
        }
    }
}

/// Drives `BlockMedian::run` (snake) and `BlockMedian::run_naive` over every tile
/// of the same grid and checks the outputs are bitwise identical.
#[test]
fn snake_traversal_matches_naive_traversal() {
    let mut state: u64 = 0xabcdef0123456789;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        state
    };

    for &(x, y, hx, hy, b) in &[
        (20usize, 17usize, 2usize, 3usize, 16usize),
        (40, 40, 5, 5, 24),
        (9, 30, 1, 4, 12),
        (64, 9, 6, 1, 16),
    ] {
        let input: Vec<f64> = (0..x * y)
            .map(|_| {
                let r = next();
                if r % 13 == 0 {
                    f64::NAN
                } else {
                    (r % 2000) as f64 / 3.0
                }
            })
            .collect();

        let dim_x = Dim::new(x, hx, b);
        let dim_y = Dim::new(y, hy, b);
        let capacity = b * b;

        let mut snake_out = vec![0.0f64; x * y];
        let mut naive_out = vec![0.0f64; x * y];
        let mut bm_snake = BlockMedian::<f64>::new(capacity, &dim_x, &dim_y);
        let mut bm_naive = BlockMedian::<f64>::new(capacity, &dim_x, &dim_y);

        for by in 0..dim_y.count {
            for bx in 0..dim_x.count {
                bm_snake.run(&dim_x, &dim_y, bx, by, &input, &mut snake_out, x);
                bm_naive.run_naive(&dim_x, &dim_y, bx, by, &input, &mut naive_out, x);
            }
        }

        for (i, (&s, &n)) in snake_out.iter().zip(naive_out.iter()).enumerate() {
            if s.is_nan() || n.is_nan() {
                assert!(s.is_nan() && n.is_nan(), "NaN mismatch at {i}");
            } else {
                assert_eq!(s.to_bits(), n.to_bits(), "mismatch at {i}: {s} vs {n}");
            }
        }
    }
}

/// Two runs over the same input must produce bitwise-identical output,
/// regardless of the ambient rayon thread count.
#[test]
fn deterministic_across_repeated_runs() {
    let (x, y, hx, hy) = (50usize, 40usize, 4usize, 6usize);
    let input: Vec<f64> = (0..x * y).map(|i| ((i * 48271) % 997) as f64).collect();

    let mut out1 = vec![0.0f64; x * y];
    let mut out2 = vec![0.0f64; x * y];
    median_filter_2d(x, y, hx, hy, 0, &input, &mut out1).unwrap();
    median_filter_2d(x, y, hx, hy, 0, &input, &mut out2).unwrap();

    assert_eq!(out1, out2);
}
