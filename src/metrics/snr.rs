//! Signal-to-noise ratio.

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::{Error, Result};

use super::{check_shapes, sample, sum_of_squares};

/// Noise floor below which a reconstruction counts as perfect.
pub const SNR_EPSILON: f64 = 1e-10;

/// Compute the signal-to-noise ratio with the default [`SNR_EPSILON`].
///
/// # Errors
///
/// Returns an error if the shapes differ or the arrays are empty.
pub fn snr<A, S, T, D>(ground_truth: &ArrayBase<S, D>, prediction: &ArrayBase<T, D>) -> Result<f64>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    snr_with_epsilon(ground_truth, prediction, SNR_EPSILON)
}

/// Compute `10 * log10(signal / (noise + epsilon))` over the flattened arrays.
///
/// Signal power is the squared L2 norm of the ground truth, noise power the
/// squared L2 norm of `ground_truth - prediction`. A noise power below
/// `epsilon` returns `+inf`. A ground truth of all zeros has no signal power
/// and returns `-inf` whenever the noise is above the floor.
///
/// # Errors
///
/// Returns an error if the shapes differ, the arrays are empty, or `epsilon`
/// is negative or not finite.
pub fn snr_with_epsilon<A, S, T, D>(
    ground_truth: &ArrayBase<S, D>,
    prediction: &ArrayBase<T, D>,
    epsilon: f64,
) -> Result<f64>
where
    A: Copy + Into<f64>,
    S: Data<Elem = A>,
    T: Data<Elem = A>,
    D: Dimension,
{
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(Error::InvalidParameter {
            name: "epsilon".to_string(),
            reason: format!("must be finite and non-negative, got {epsilon}"),
        });
    }

    check_shapes(ground_truth, prediction)?;

    let signal_power = sum_of_squares(ground_truth.iter().map(|&v| sample(v)));
    let noise_power = sum_of_squares(
        ground_truth
            .iter()
            .zip(prediction.iter())
            .map(|(&g, &p)| sample(g) - sample(p)),
    );

    if noise_power < epsilon {
        return Ok(f64::INFINITY);
    }

    Ok(10.0 * (signal_power / (noise_power + epsilon)).log10())
}
