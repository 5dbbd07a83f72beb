//! Image quality metrics comparing a prediction against a ground-truth array.
//!
//! All functions are pure. Inputs are borrowed, converted to `f64` sample by
//! sample and never modified. Reductions walk both arrays in logical row-major
//! order and accumulate sequentially, so results are reproducible bit for bit
//! regardless of the arrays' memory layout.

mod log;
mod psnr;
mod snr;

pub use log::{log_snr, log_transform, LOG_SCALE};
pub use psnr::psnr;
pub use snr::{snr, snr_with_epsilon, SNR_EPSILON};

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::{Error, Result};

/// The three quality scores for one prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Peak signal-to-noise ratio in dB, normalized by the ground truth's dynamic range.
    pub psnr: f64,
    /// Signal-to-noise ratio in dB.
    pub snr: f64,
    /// SNR in dB over log-compressed copies of both arrays.
    pub logsnr: f64,
}

/// Compute PSNR, SNR and log-domain SNR in one call.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] before any numeric work if the shapes
/// differ, and [`Error::EmptyArray`] if the arrays have no samples.
pub fn compute_metrics<A, S, T, D>(
    ground_truth: &ArrayBase<S, D>,
    prediction: &ArrayBase<T, D>,
) -> Result<Metrics>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    check_shapes(ground_truth, prediction)?;

    let metrics = Metrics {
        psnr: psnr(ground_truth, prediction)?,
        snr: snr(ground_truth, prediction)?,
        logsnr: log_snr(ground_truth, prediction)?,
    };

    tracing::debug!(
        psnr = metrics.psnr,
        snr = metrics.snr,
        logsnr = metrics.logsnr,
        samples = ground_truth.len(),
        "computed metrics"
    );

    Ok(metrics)
}

/// Enforce the shared precondition of every metric: equal, non-empty shapes.
pub(crate) fn check_shapes<A, B, S, T, D>(
    ground_truth: &ArrayBase<S, D>,
    prediction: &ArrayBase<T, D>,
) -> Result<()>
where
    S: Data<Elem = A>,
    T: Data<Elem = B>,
    D: Dimension,
{
    if ground_truth.shape() != prediction.shape() {
        return Err(Error::shape_mismatch(
            ground_truth.shape(),
            prediction.shape(),
        ));
    }

    if ground_truth.is_empty() {
        return Err(Error::EmptyArray);
    }

    Ok(())
}

/// Widen one sample to `f64`.
#[inline]
fn sample<A: Into<f64>>(value: A) -> f64 {
    value.into()
}

/// Sum of squares of a stream of samples.
fn sum_of_squares(samples: impl Iterator<Item = f64>) -> f64 {
    samples.fold(0.0, |acc, v| v.mul_add(v, acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2, ArrayD, IxDyn, ShapeBuilder};

    #[test]
    fn test_identical_images_are_perfect() {
        let gt = array![[1.0, 2.0], [3.0, 4.0]];
        let pred = array![[1.0, 2.0], [3.0, 4.0]];

        let metrics = compute_metrics(&gt, &pred).unwrap();

        assert_eq!(metrics.psnr, f64::INFINITY);
        assert_eq!(metrics.snr, f64::INFINITY);
        assert_eq!(metrics.logsnr, f64::INFINITY);
    }

    #[test]
    fn test_flat_zero_ground_truth() {
        let gt = Array2::<f64>::zeros((2, 2));
        let pred = Array2::<f64>::ones((2, 2));

        let metrics = compute_metrics(&gt, &pred).unwrap();

        // Zero dynamic range with non-zero error, zero signal power.
        assert_eq!(metrics.psnr, f64::NEG_INFINITY);
        assert_eq!(metrics.snr, f64::NEG_INFINITY);
        assert_eq!(metrics.logsnr, f64::NEG_INFINITY);
    }

    #[test]
    fn test_small_errors_are_finite() {
        let gt = array![[100.0, 200.0], [300.0, 400.0]];
        let pred = array![[101.0, 199.0], [299.0, 401.0]];

        let metrics = compute_metrics(&gt, &pred).unwrap();

        assert!(metrics.psnr.is_finite());
        assert!(metrics.snr.is_finite());
        assert!(metrics.logsnr.is_finite());
        assert!((metrics.logsnr - metrics.snr).abs() > 1e-6);

        // range 300, mse 1 -> 10 * log10(90000)
        assert!((metrics.psnr - 90_000f64.log10() * 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let gt = ArrayD::<f64>::zeros(IxDyn(&[2, 2]));
        let pred = ArrayD::<f64>::zeros(IxDyn(&[3, 3]));

        let err = compute_metrics(&gt, &pred).unwrap_err();

        match err {
            Error::ShapeMismatch { expected, actual } => {
                assert_eq!(expected, "[2, 2]");
                assert_eq!(actual, "[3, 3]");
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_rank_mismatch_is_rejected() {
        let gt = ArrayD::<f64>::zeros(IxDyn(&[4]));
        let pred = ArrayD::<f64>::zeros(IxDyn(&[2, 2]));

        assert!(matches!(
            compute_metrics(&gt, &pred),
            Err(Error::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_empty_arrays_are_rejected() {
        let gt = Array2::<f64>::zeros((0, 3));
        let pred = Array2::<f64>::zeros((0, 3));

        assert!(matches!(compute_metrics(&gt, &pred), Err(Error::EmptyArray)));
    }

    #[test]
    fn test_integer_samples() {
        let gt = array![[10u16, 20], [30, 40]];
        let pred = array![[11u16, 20], [30, 40]];

        let as_float = compute_metrics(&gt.mapv(f64::from), &pred.mapv(f64::from)).unwrap();
        let as_int = compute_metrics(&gt, &pred).unwrap();

        assert_eq!(as_float, as_int);
    }

    #[test]
    fn test_memory_layout_does_not_change_results() {
        let gt = array![[1.0, 5.0, 2.0], [7.0, 3.0, 9.0]];
        let pred = array![[1.5, 4.0, 2.0], [6.0, 3.5, 9.5]];

        let direct = compute_metrics(&gt, &pred).unwrap();

        // Same logical arrays stored column-major.
        let mut gt_f = Array2::<f64>::zeros(gt.raw_dim().f());
        gt_f.assign(&gt);
        let mut pred_f = Array2::<f64>::zeros(pred.raw_dim().f());
        pred_f.assign(&pred);

        assert!(!gt_f.is_standard_layout());
        assert!(!pred_f.is_standard_layout());
        assert_eq!(gt_f, gt);

        let column_major = compute_metrics(&gt_f, &pred_f).unwrap();

        assert_eq!(direct, column_major);
    }
}
