//! # `fits-metrics`
//!
//! Image quality metrics for scientific images stored as FITS files.
//!
//! A prediction is scored against a fixed ground truth with three numbers:
//! PSNR (normalized by the ground truth's dynamic range), SNR, and SNR over
//! log-compressed copies of both images, which keeps bright sources from
//! dominating high dynamic range astronomical data.
//!
//! ## Example
//!
//! ```no_run
//! use fits_metrics::{compute_metrics, fits};
//!
//! # fn main() -> fits_metrics::Result<()> {
//! let ground_truth = fits::read_fits("data/ground_truth.fits")?;
//! let prediction = fits::read_fits("prediction.fits")?;
//!
//! let metrics = compute_metrics(&ground_truth.data, &prediction.data)?;
//! println!("PSNR {:.4} dB", metrics.psnr);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod evaluate;
pub mod fits;
pub mod metrics;
pub mod server;

pub use error::{Error, Result};
pub use evaluate::{Config, Evaluator, MetricsReport};
pub use metrics::{compute_metrics, Metrics};
