//! FITS encoding.

use std::path::Path;

use ndarray::{ArrayBase, Data, Dimension};

use crate::error::Result;

use super::header::{card, Bitpix, BLOCK_SIZE, CARD_SIZE};

/// Save an array as a double precision FITS primary HDU.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_fits<P, S, D>(path: P, array: &ArrayBase<S, D>) -> Result<()>
where
    P: AsRef<Path>,
    S: Data<Elem = f64>,
    D: Dimension,
{
    std::fs::write(path, encode_fits(array))?;
    Ok(())
}

/// Encode an array as a `BITPIX = -64` primary HDU.
///
/// The last array axis becomes `NAXIS1`; samples are written big-endian in
/// logical row-major order. Header and data are padded to whole blocks.
#[must_use]
pub fn encode_fits<S, D>(array: &ArrayBase<S, D>) -> Vec<u8>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let shape = array.shape();
    let mut cards = vec![
        card("SIMPLE", "T"),
        card("BITPIX", &Bitpix::F64.code().to_string()),
        card("NAXIS", &shape.len().to_string()),
    ];
    cards.extend(
        shape
            .iter()
            .rev()
            .enumerate()
            .map(|(i, len)| card(&format!("NAXIS{}", i + 1), &len.to_string())),
    );
    cards.push(format!("{:<width$}", "END", width = CARD_SIZE));

    let mut bytes: Vec<u8> = cards.iter().flat_map(|c| c.bytes()).collect();
    pad_to_block(&mut bytes, b' ');

    bytes.reserve(array.len() * Bitpix::F64.bytes_per_sample());
    for value in array {
        bytes.extend_from_slice(&value.to_be_bytes());
    }
    pad_to_block(&mut bytes, 0);

    bytes
}

fn pad_to_block(bytes: &mut Vec<u8>, fill: u8) {
    bytes.resize(bytes.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, fill);
}
