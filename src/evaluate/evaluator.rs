//! Prediction scoring against a ground truth loaded once at startup.

use std::io::Write;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fits;
use crate::metrics::{compute_metrics, Metrics};

use super::upload::{allowed_file, secure_filename};

/// Configuration for scoring predictions and serving uploads.
#[derive(Debug, Clone)]
pub struct Config {
    /// FITS file holding the reference image.
    pub ground_truth: PathBuf,

    /// Directory where uploads are staged while they are decoded.
    pub upload_dir: PathBuf,

    /// Accepted upload extensions, without the dot.
    pub allowed_extensions: Vec<String>,

    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,

    /// Address the HTTP service listens on.
    pub bind: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ground_truth: PathBuf::from("data/ground_truth.fits"),
            upload_dir: PathBuf::from("uploads"),
            allowed_extensions: vec!["fits".to_string()],
            max_upload_bytes: 64 * 1024 * 1024,
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

impl Config {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any parameter is out of valid range.
    pub fn validate(&self) -> Result<()> {
        if self.allowed_extensions.is_empty() {
            return Err(Error::InvalidParameter {
                name: "allowed_extensions".to_string(),
                reason: "must name at least one extension".to_string(),
            });
        }

        if let Some(bad) = self
            .allowed_extensions
            .iter()
            .find(|ext| ext.is_empty() || ext.contains('.'))
        {
            return Err(Error::InvalidParameter {
                name: "allowed_extensions".to_string(),
                reason: format!("{bad:?} must be non-empty and written without a dot"),
            });
        }

        if self.max_upload_bytes == 0 {
            return Err(Error::InvalidParameter {
                name: "max_upload_bytes".to_string(),
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Metric results formatted for display, four decimals each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Sanitized name of the scored file.
    pub filename: String,
    /// PSNR in dB.
    pub psnr: String,
    /// SNR in dB.
    pub snr: String,
    /// Log-domain SNR in dB.
    pub logsnr: String,
}

impl MetricsReport {
    /// Format `metrics` for `filename`. Infinities render as `inf` and `-inf`.
    #[must_use]
    pub fn new(filename: impl Into<String>, metrics: &Metrics) -> Self {
        Self {
            filename: filename.into(),
            psnr: format!("{:.4}", metrics.psnr),
            snr: format!("{:.4}", metrics.snr),
            logsnr: format!("{:.4}", metrics.logsnr),
        }
    }
}

/// Scores predictions against one ground truth image.
///
/// The ground truth is decoded once and shared read-only, so a single
/// evaluator can serve concurrent requests.
#[derive(Debug)]
pub struct Evaluator {
    config: Config,
    ground_truth: ArrayD<f64>,
}

impl Evaluator {
    /// Create an evaluator, loading the ground truth named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the ground truth
    /// cannot be decoded.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        tracing::info!("Loading ground truth from {}", config.ground_truth.display());
        let ground_truth = fits::read_fits(&config.ground_truth)
            .map_err(|source| Error::GroundTruth {
                path: config.ground_truth.clone(),
                source: Box::new(source),
            })?
            .data;

        Self::with_ground_truth(config, ground_truth)
    }

    /// Create an evaluator around an already decoded ground truth.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_ground_truth(config: Config, ground_truth: ArrayD<f64>) -> Result<Self> {
        config.validate()?;

        tracing::info!(shape = ?ground_truth.shape(), "Evaluator ready");

        Ok(Self {
            config,
            ground_truth,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Shape every prediction must match.
    #[must_use]
    pub fn ground_truth_shape(&self) -> &[usize] {
        self.ground_truth.shape()
    }

    /// Score an uploaded FITS file given its client name and contents.
    ///
    /// The contents are staged under a generated name inside the upload
    /// directory (created on demand), which is removed once decoding finishes
    /// whether or not it succeeded. The client name only labels the report.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or has a disallowed extension,
    /// the contents are not FITS, or the shapes differ.
    pub fn evaluate_upload(&self, filename: &str, contents: &[u8]) -> Result<MetricsReport> {
        if filename.is_empty() {
            return Err(Error::NoFileSelected);
        }

        if !allowed_file(filename, &self.config.allowed_extensions) {
            tracing::warn!(filename, "rejected upload with disallowed extension");
            return Err(Error::InvalidFileType {
                filename: filename.to_string(),
            });
        }

        let name = secure_filename(filename)?;

        std::fs::create_dir_all(&self.config.upload_dir)?;

        let prediction = {
            let mut staged = tempfile::Builder::new()
                .prefix("upload-")
                .suffix(".fits")
                .tempfile_in(&self.config.upload_dir)?;
            staged.write_all(contents)?;
            staged.flush()?;

            fits::read_fits(staged.path())?
        };

        let metrics = self.score(&prediction.data)?;

        tracing::info!(
            filename = %name,
            psnr = metrics.psnr,
            snr = metrics.snr,
            logsnr = metrics.logsnr,
            "scored upload"
        );
        Ok(MetricsReport::new(name, &metrics))
    }

    /// Score a FITS file already on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be decoded or the shapes differ.
    pub fn evaluate_path<P: AsRef<Path>>(&self, path: P) -> Result<MetricsReport> {
        let path = path.as_ref();

        let prediction = fits::read_fits(path)?;
        let metrics = self.score(&prediction.data)?;

        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        Ok(MetricsReport::new(name, &metrics))
    }

    /// Compute the metrics of `prediction` against the ground truth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] if `prediction` has a different shape.
    pub fn score(&self, prediction: &ArrayD<f64>) -> Result<Metrics> {
        if self.ground_truth.shape() != prediction.shape() {
            tracing::warn!(
                expected = ?self.ground_truth.shape(),
                actual = ?prediction.shape(),
                "prediction shape does not match ground truth"
            );
            return Err(Error::shape_mismatch(
                self.ground_truth.shape(),
                prediction.shape(),
            ));
        }

        compute_metrics(&self.ground_truth, prediction)
    }
}
