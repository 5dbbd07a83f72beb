//! FITS primary HDU reading and writing.
//!
//! Only the primary header-data unit is handled: extensions, tile
//! compression and random groups are out of reach of [`read_fits`].

mod header;
mod load;
mod save;

pub use header::{Bitpix, FitsHeader, BLOCK_SIZE, CARD_SIZE};
pub use load::{decode_fits, read_fits};
pub use save::{encode_fits, write_fits};

use ndarray::ArrayD;

/// A decoded primary HDU.
#[derive(Debug, Clone)]
pub struct FitsImage {
    /// Keywords that shaped the decoding.
    pub header: FitsHeader,
    /// Physical sample values, shaped `NAXISn x ... x NAXIS1`.
    pub data: ArrayD<f64>,
}

impl FitsImage {
    /// Array shape in row-major order.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }
}
