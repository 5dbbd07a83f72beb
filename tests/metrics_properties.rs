//! Randomized properties of the metric functions.

use fits_metrics::metrics::{log_transform, psnr, snr, LOG_SCALE};
use ndarray::{Array2, Array3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_metrics_degrade_as_error_grows() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..25 {
        let gt = Array2::from_shape_fn((16, 16), |_| rng.random_range(0.0..1000.0));
        let pattern = Array2::from_shape_fn((16, 16), |_| rng.random_range(-1.0..1.0));

        let mut last_psnr = f64::INFINITY;
        let mut last_snr = f64::INFINITY;

        for scale in [0.01, 0.1, 1.0, 10.0, 100.0] {
            let prediction = &gt + &(&pattern * scale);

            let p = psnr(&gt, &prediction).unwrap();
            let s = snr(&gt, &prediction).unwrap();

            assert!(p.is_finite() && s.is_finite());
            assert!(p <= last_psnr, "psnr rose from {last_psnr} to {p} at scale {scale}");
            assert!(s <= last_snr, "snr rose from {last_snr} to {s} at scale {scale}");

            last_psnr = p;
            last_snr = s;
        }
    }
}

#[test]
fn test_self_comparison_is_infinite() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..10 {
        let a = Array3::from_shape_fn((3, 5, 7), |_| rng.random_range(-50.0..50.0));

        assert_eq!(psnr(&a, &a.view()).unwrap(), f64::INFINITY);
        assert_eq!(snr(&a, &a.view()).unwrap(), f64::INFINITY);
    }
}

#[test]
fn test_log_transform_clamps_and_preserves_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let zero = log_transform(&ndarray::array![0.0], LOG_SCALE).unwrap()[0];

    let input = Array2::from_shape_fn((32, 32), |_| rng.random_range(-100.0..100.0));
    let output = log_transform(&input, LOG_SCALE).unwrap();

    assert_eq!(output.shape(), input.shape());

    let mut pairs: Vec<(f64, f64)> = input.iter().copied().zip(output.iter().copied()).collect();
    for &(x, y) in &pairs {
        if x < 0.0 {
            assert_eq!(y, zero);
        }
    }

    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    for window in pairs.windows(2) {
        assert!(window[0].1 <= window[1].1);
    }
}
