//! Peak signal-to-noise ratio.

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::Result;

use super::{check_shapes, sample, sum_of_squares};

/// Compute the peak signal-to-noise ratio of `prediction` against `ground_truth`.
///
/// The peak is the ground truth's own dynamic range, `max - min`, not the
/// prediction's and not a combined range.
///
/// Edge cases:
/// - zero mean squared error returns `+inf`, matching [`super::snr`];
/// - a flat ground truth (zero range) with non-zero error returns `-inf`,
///   the limit of `10 * log10(0 / mse)`.
///
/// # Errors
///
/// Returns an error if the shapes differ or the arrays are empty.
#[allow(clippy::float_cmp)]
pub fn psnr<A, S, T, D>(ground_truth: &ArrayBase<S, D>, prediction: &ArrayBase<T, D>) -> Result<f64>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    check_shapes(ground_truth, prediction)?;

    let mse = mean_squared_error(ground_truth, prediction);
    if mse == 0.0 {
        return Ok(f64::INFINITY);
    }

    let data_range = data_range(ground_truth);
    if data_range == 0.0 {
        return Ok(f64::NEG_INFINITY);
    }

    Ok(10.0 * (data_range * data_range / mse).log10())
}

/// Mean of squared elementwise differences.
#[allow(clippy::cast_precision_loss)]
fn mean_squared_error<A, S, T, D>(a: &ArrayBase<S, D>, b: &ArrayBase<T, D>) -> f64
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    let diffs = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| sample(x) - sample(y));

    sum_of_squares(diffs) / a.len() as f64
}

/// `max - min` over all samples.
fn data_range<A, S, D>(array: &ArrayBase<S, D>) -> f64
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    D: Dimension,
{
    let (min, max) = array
        .iter()
        .map(|&v| sample(v))
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    max - min
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1};

    #[test]
    fn test_psnr_identical() {
        let a = array![0.0, 0.5, 1.0];
        assert_eq!(psnr(&a, &a.clone()).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_psnr_flat_identical_is_infinite() {
        // Zero error wins over zero range.
        let a = array![3.0, 3.0, 3.0];
        assert_eq!(psnr(&a, &a.clone()).unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_psnr_uses_ground_truth_range() {
        let gt = array![0.0, 10.0];
        let pred = array![1.0, 1000.0];

        // mse = (1 + 990^2) / 2, range = 10
        let expected = 10.0 * (100.0_f64 / ((1.0 + 990.0 * 990.0) / 2.0)).log10();
        assert!((psnr(&gt, &pred).unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_psnr_known_value() {
        let gt = array![0.0, 1.0, 0.0, 1.0];
        let pred = array![0.1, 0.9, 0.1, 0.9];

        // mse = 0.01, range = 1 -> 20 dB
        assert!((psnr(&gt, &pred).unwrap() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_data_range() {
        let a = Array1::from(vec![-4.0, 2.0, 7.5, 0.0]);
        assert!((data_range(&a) - 11.5).abs() < f64::EPSILON);
    }
}
