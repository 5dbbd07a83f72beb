//! Logarithmic compression for high dynamic range intensities.

use ndarray::{Array, ArrayBase, Data, Dimension};

use crate::error::{Error, Result};

use super::{check_shapes, sample, snr};

/// Default scale constant of [`log_transform`].
pub const LOG_SCALE: f64 = 1000.0;

/// Map an array onto a log scale: `log10(a * v + 1) / log10(a)`.
///
/// Negative samples are clamped to zero first, so background-subtracted data
/// never reaches a logarithm of a negative number. NaN samples stay NaN. The
/// input is left untouched and a new array of the same shape is returned.
///
/// # Errors
///
/// Returns [`Error::InvalidParameter`] unless `scale` is finite, positive and
/// not equal to one.
#[allow(clippy::suboptimal_flops, clippy::float_cmp)]
pub fn log_transform<A, S, D>(array: &ArrayBase<S, D>, scale: f64) -> Result<Array<f64, D>>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    D: Dimension,
{
    if !scale.is_finite() || scale <= 0.0 || scale == 1.0 {
        return Err(Error::InvalidParameter {
            name: "scale".to_string(),
            reason: format!("must be finite, positive and not 1, got {scale}"),
        });
    }

    let norm = scale.log10();

    Ok(array.mapv(|v| {
        let v = sample(v);
        let clamped = if v < 0.0 { 0.0 } else { v };
        (scale * clamped + 1.0).log10() / norm
    }))
}

/// SNR of the log-compressed arrays, using [`LOG_SCALE`] and the default epsilon.
///
/// # Errors
///
/// Returns an error if the shapes differ or the arrays are empty.
pub fn log_snr<A, S, T, D>(
    ground_truth: &ArrayBase<S, D>,
    prediction: &ArrayBase<T, D>,
) -> Result<f64>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    check_shapes(ground_truth, prediction)?;

    let gt_log = log_transform(ground_truth, LOG_SCALE)?;
    let pred_log = log_transform(prediction, LOG_SCALE)?;

    snr(&gt_log, &pred_log)
}
