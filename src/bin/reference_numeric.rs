//! Numeric reference on `ndarray`: rounding, roots, statistics, trigonometry,
//! linear algebra, array construction and reductions.
//!
//! Run with: cargo run --bin reference_numeric

use colored::Colorize;
use ndarray::{array, Array, Array1, Array2, ArrayView1, Axis};
use rand::Rng;
use std::f64::consts::{E, PI};

// =============================================================================
// Milestone 1: Scalars
// =============================================================================

/// Rounds half to even, like NumPy (`round(2.5) == 2`).
pub fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

pub fn random_float<R: Rng>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Inclusive of `low`, exclusive of `high`.
pub fn random_int<R: Rng>(rng: &mut R, low: i64, high: i64) -> i64 {
    rng.gen_range(low..high)
}

// =============================================================================
// Milestone 2: Statistics
// =============================================================================

pub fn mean(values: ArrayView1<f64>) -> Option<f64> {
    values.mean()
}

pub fn median(values: ArrayView1<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Population variance (`ddof = 0`).
pub fn variance(values: ArrayView1<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.var(0.0))
}

pub fn std_dev(values: ArrayView1<f64>) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

// =============================================================================
// Milestone 3: Linear algebra
// =============================================================================

pub fn dot(a: &Array1<f64>, b: &Array1<f64>) -> Option<f64> {
    (a.len() == b.len()).then(|| a.dot(b))
}

/// Row-reduces `[matrix | identity]`; returns `(determinant, inverse)`.
/// The inverse is `None` for singular matrices.
fn gauss_jordan(matrix: &Array2<f64>) -> Option<(f64, Option<Array2<f64>>)> {
    let n = matrix.nrows();
    if n != matrix.ncols() {
        return None;
    }

    let mut work = ndarray::concatenate(Axis(1), &[matrix.view(), Array2::eye(n).view()]).ok()?;
    let mut det = 1.0;

    for col in 0..n {
        let pivot = (col..n).max_by(|&a, &b| {
            work[[a, col]].abs().total_cmp(&work[[b, col]].abs())
        })?;
        if work[[pivot, col]].abs() < 1e-12 {
            return Some((0.0, None));
        }
        if pivot != col {
            for k in 0..2 * n {
                work.swap([pivot, k], [col, k]);
            }
            det = -det;
        }

        let p = work[[col, col]];
        det *= p;
        work.row_mut(col).mapv_inplace(|v| v / p);

        for row in 0..n {
            if row != col {
                let factor = work[[row, col]];
                if factor != 0.0 {
                    let pivot_row = work.row(col).to_owned();
                    work.row_mut(row).scaled_add(-factor, &pivot_row);
                }
            }
        }
    }

    let inverse = work.slice(ndarray::s![.., n..]).to_owned();
    Some((det, Some(inverse)))
}

pub fn determinant(matrix: &Array2<f64>) -> Option<f64> {
    gauss_jordan(matrix).map(|(det, _)| det)
}

pub fn inverse(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    gauss_jordan(matrix).and_then(|(_, inv)| inv)
}

// =============================================================================
// Milestone 4: Construction and reductions
// =============================================================================

pub fn arange_reshaped(count: usize, rows: usize, cols: usize) -> Option<Array2<f64>> {
    Array::range(0.0, count as f64, 1.0)
        .into_shape_with_order((rows, cols))
        .ok()
}

pub fn cumsum(values: ArrayView1<f64>) -> Array1<f64> {
    let mut out = values.to_owned();
    out.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr += prev);
    out
}

pub fn cumprod(values: ArrayView1<f64>) -> Array1<f64> {
    let mut out = values.to_owned();
    out.accumulate_axis_inplace(Axis(0), |&prev, curr| *curr *= prev);
    out
}

pub fn sorted(values: ArrayView1<f64>) -> Array1<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    Array1::from(v)
}

pub fn unique(values: ArrayView1<f64>) -> Array1<f64> {
    let mut v = sorted(values).to_vec();
    v.dedup();
    Array1::from(v)
}

fn main() {
    println!("{}", "=== constants ===".bold());
    println!("  pi = {}  e = {}", PI, E);

    println!("\n{}", "=== rounding ===".bold());
    println!(
        "  round(5.95)={} ceil(5.3)={} floor(5.95)={} trunc(5.95)={} abs(-7.25)={}",
        round_half_even(5.95),
        5.3f64.ceil(),
        5.95f64.floor(),
        5.95f64.trunc(),
        (-7.25f64).abs()
    );

    println!("\n{}", "=== powers ===".bold());
    println!("  2^3={} sqrt(16)={} cbrt(27)={}", 2f64.powi(3), 16f64.sqrt(), 27f64.cbrt());

    let data = array![3.0, 9.0, 5.0, 6.0, 7.0];
    println!("\n{}", "=== min / max ===".bold());
    println!(
        "  min={:?} max={:?}",
        data.iter().copied().reduce(f64::min),
        data.iter().copied().reduce(f64::max)
    );

    println!("\n{}", "=== random ===".bold());
    let mut rng = rand::thread_rng();
    println!("  float={:.3} int(1..11)={}", random_float(&mut rng), random_int(&mut rng, 1, 11));

    println!("\n{}", "=== logs ===".bold());
    println!("  log10(100)={} ln(1)={} exp(1)={}", 100f64.log10(), 1f64.ln(), 1f64.exp());

    println!("\n{}", "=== statistics ===".bold());
    let sample = array![1.0, 2.0, 3.0];
    println!(
        "  mean={:?} median={:?} std={:?} var={:?}",
        mean(sample.view()),
        median(array![1.0, 3.0, 2.0].view()),
        std_dev(sample.view()),
        variance(sample.view())
    );

    println!("\n{}", "=== trigonometry ===".bold());
    println!(
        "  sin(pi/2)={} cos(pi)={} tan(pi/4)={:.3} asin(1)={:.3} acos(-1)={:.3} atan(1)={:.3}",
        (PI / 2.0).sin(),
        PI.cos(),
        (PI / 4.0).tan(),
        1f64.asin(),
        (-1f64).acos(),
        1f64.atan()
    );

    println!("\n{}", "=== linear algebra ===".bold());
    let m = array![[1.0, 2.0], [3.0, 4.0]];
    println!("  dot={:?}", dot(&array![1.0, 2.0], &array![3.0, 4.0]));
    println!("  det={:?}", determinant(&m));
    println!("  inv={:?}", inverse(&m));

    println!("\n{}", "=== arrays ===".bold());
    println!("  zeros:\n{}", Array2::<f64>::zeros((2, 3)));
    println!("  ones:\n{}", Array2::<f64>::ones((2, 3)));
    println!("  linspace: {}", Array1::linspace(0.0, 1.0, 5));
    println!("  reshape:\n{:?}", arange_reshaped(6, 2, 3));

    println!("\n{}", "=== reductions ===".bold());
    let v = array![1.0, 2.0, 3.0];
    println!(
        "  sum={} prod={} cumsum={} cumprod={}",
        v.sum(),
        v.product(),
        cumsum(v.view()),
        cumprod(v.view())
    );
    println!(
        "  sort={} unique={}",
        sorted(array![3.0, 1.0, 2.0].view()),
        unique(array![1.0, 2.0, 2.0, 3.0].view())
    );
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(5.95), 6.0);
        assert_eq!(round_half_even(2.5), 2.0);
        assert_eq!(round_half_even(3.5), 4.0);
        assert_eq!(round_half_even(-2.5), -2.0);
    }

    #[test]
    fn test_random_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let f = random_float(&mut rng);
            assert!((0.0..1.0).contains(&f));
            let i = random_int(&mut rng, 1, 11);
            assert!((1..=10).contains(&i));
        }
    }

    #[test]
    fn test_statistics() {
        let sample = array![1.0, 2.0, 3.0];
        assert_eq!(mean(sample.view()), Some(2.0));
        assert_eq!(median(array![1.0, 3.0, 2.0].view()), Some(2.0));
        assert_eq!(median(array![4.0, 1.0, 3.0, 2.0].view()), Some(2.5));
        assert!(close(variance(sample.view()).unwrap(), 2.0 / 3.0));
        assert!(close(std_dev(sample.view()).unwrap(), 0.816496580927726));
    }

    #[test]
    fn test_statistics_empty() {
        let empty = Array1::<f64>::zeros(0);
        assert_eq!(mean(empty.view()), None);
        assert_eq!(median(empty.view()), None);
        assert_eq!(variance(empty.view()), None);
    }

    #[test]
    fn test_dot() {
        assert_eq!(dot(&array![1.0, 2.0], &array![3.0, 4.0]), Some(11.0));
        assert_eq!(dot(&array![1.0], &array![3.0, 4.0]), None);
    }

    #[test]
    fn test_determinant_and_inverse() {
        let m = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(close(determinant(&m).unwrap(), -2.0));

        let inv = inverse(&m).unwrap();
        let expected = array![[-2.0, 1.0], [1.5, -0.5]];
        for (a, b) in inv.iter().zip(expected.iter()) {
            assert!(close(*a, *b), "{a} != {b}");
        }

        let identity = m.dot(&inv);
        for ((r, c), v) in identity.indexed_iter() {
            assert!(close(*v, if r == c { 1.0 } else { 0.0 }));
        }
    }

    #[test]
    fn test_determinant_needs_pivoting() {
        let m = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(close(determinant(&m).unwrap(), -1.0));
    }

    #[test]
    fn test_singular_and_non_square() {
        let singular = array![[1.0, 2.0], [2.0, 4.0]];
        assert_eq!(determinant(&singular), Some(0.0));
        assert!(inverse(&singular).is_none());
        assert!(determinant(&Array2::<f64>::zeros((2, 3))).is_none());
    }

    #[test]
    fn test_construction() {
        assert_eq!(Array1::linspace(0.0, 1.0, 5), array![0.0, 0.25, 0.5, 0.75, 1.0]);
        let reshaped = arange_reshaped(6, 2, 3).unwrap();
        assert_eq!(reshaped, array![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0]]);
        assert!(arange_reshaped(6, 4, 2).is_none());
    }

    #[test]
    fn test_reductions() {
        let v = array![1.0, 2.0, 3.0];
        assert_eq!(v.sum(), 6.0);
        assert_eq!(v.product(), 6.0);
        assert_eq!(cumsum(v.view()), array![1.0, 3.0, 6.0]);
        assert_eq!(cumprod(v.view()), array![1.0, 2.0, 6.0]);
        assert_eq!(sorted(array![3.0, 1.0, 2.0].view()), array![1.0, 2.0, 3.0]);
        assert_eq!(unique(array![1.0, 2.0, 2.0, 3.0].view()), array![1.0, 2.0, 3.0]);
    }
}
