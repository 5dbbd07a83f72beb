//! FITS decoding.

use std::path::Path;

use ndarray::{ArrayD, IxDyn};

use crate::error::{Error, Result};

use super::header::{parse_header, Bitpix, FitsHeader};
use super::FitsImage;

/// Read the primary data array of a FITS file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a FITS file with a
/// primary data array.
pub fn read_fits<P: AsRef<Path>>(path: P) -> Result<FitsImage> {
    let path = path.as_ref();

    let bytes = std::fs::read(path).map_err(|source| Error::FitsRead {
        path: path.to_path_buf(),
        source,
    })?;

    let image = decode_fits(&bytes)?;
    tracing::debug!(
        path = %path.display(),
        shape = ?image.shape(),
        bitpix = image.header.bitpix.code(),
        "decoded FITS file"
    );

    Ok(image)
}

/// Decode the primary data array from in-memory FITS bytes.
///
/// Stored values are converted to physical values `bzero + bscale * raw`.
/// Integer samples equal to `BLANK` become NaN.
///
/// # Errors
///
/// Returns [`Error::FitsNoData`] when the primary HDU has no data array and
/// [`Error::FitsFormat`] for malformed headers or truncated data.
pub fn decode_fits(bytes: &[u8]) -> Result<FitsImage> {
    let (header, offset) = parse_header(bytes)?;

    if header.axes.is_empty() || header.sample_count()? == 0 {
        return Err(Error::FitsNoData);
    }

    let len = header.data_len()?;
    let data = offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or_else(|| Error::FitsFormat {
            reason: format!(
                "truncated data: expected {len} bytes, found {}",
                bytes.len().saturating_sub(offset)
            ),
        })?;

    let samples = decode_samples(&header, data);
    let data = ArrayD::from_shape_vec(IxDyn(&header.shape()), samples).map_err(|err| {
        Error::FitsFormat {
            reason: format!("cannot shape data array: {err}"),
        }
    })?;

    Ok(FitsImage { header, data })
}

/// Convert big-endian stored samples to physical `f64` values.
fn decode_samples(header: &FitsHeader, data: &[u8]) -> Vec<f64> {
    match header.bitpix {
        Bitpix::U8 => integers::<1>(header, data, |b| i64::from(b[0])),
        Bitpix::I16 => integers::<2>(header, data, |b| i64::from(i16::from_be_bytes(b))),
        Bitpix::I32 => integers::<4>(header, data, |b| i64::from(i32::from_be_bytes(b))),
        Bitpix::I64 => integers::<8>(header, data, i64::from_be_bytes),
        Bitpix::F32 => reals::<4>(header, data, |b| f64::from(f32::from_be_bytes(b))),
        Bitpix::F64 => reals::<8>(header, data, f64::from_be_bytes),
    }
}

#[allow(clippy::cast_precision_loss)]
fn integers<const N: usize>(
    header: &FitsHeader,
    data: &[u8],
    read: fn([u8; N]) -> i64,
) -> Vec<f64> {
    data.chunks_exact(N)
        .map(|chunk| {
            let raw = read(array(chunk));
            if header.blank == Some(raw) {
                f64::NAN
            } else {
                physical(header, raw as f64)
            }
        })
        .collect()
}

fn reals<const N: usize>(header: &FitsHeader, data: &[u8], read: fn([u8; N]) -> f64) -> Vec<f64> {
    data.chunks_exact(N)
        .map(|chunk| physical(header, read(array(chunk))))
        .collect()
}

#[inline]
#[allow(clippy::suboptimal_flops)]
fn physical(header: &FitsHeader, stored: f64) -> f64 {
    if header.is_scaled() {
        header.bzero + header.bscale * stored
    } else {
        stored
    }
}

#[inline]
fn array<const N: usize>(chunk: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    buf.copy_from_slice(chunk);
    buf
}
