//! FITS header cards: 2880-byte blocks of 80-character `KEYWORD = value` records.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// Size of a FITS logical record.
pub const BLOCK_SIZE: usize = 2880;

/// Size of one header card.
pub const CARD_SIZE: usize = 80;

/// Sample encoding of the data array, from the `BITPIX` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bitpix {
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Signed 32-bit integer.
    I32,
    /// Signed 64-bit integer.
    I64,
    /// IEEE 754 single precision.
    F32,
    /// IEEE 754 double precision.
    F64,
}

impl Bitpix {
    /// Parse a `BITPIX` value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FitsFormat`] for codes outside the six FITS sample types.
    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            8 => Ok(Self::U8),
            16 => Ok(Self::I16),
            32 => Ok(Self::I32),
            64 => Ok(Self::I64),
            -32 => Ok(Self::F32),
            -64 => Ok(Self::F64),
            other => Err(Error::FitsFormat {
                reason: format!("unsupported BITPIX {other}"),
            }),
        }
    }

    /// The `BITPIX` code for this sample type.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::U8 => 8,
            Self::I16 => 16,
            Self::I32 => 32,
            Self::I64 => 64,
            Self::F32 => -32,
            Self::F64 => -64,
        }
    }

    /// Bytes per stored sample.
    #[must_use]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 => 1,
            Self::I16 => 2,
            Self::I32 | Self::F32 => 4,
            Self::I64 | Self::F64 => 8,
        }
    }

    /// Whether samples are stored as integers (and may carry `BLANK`).
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }
}

/// The keywords of a primary header needed to decode its data array.
#[derive(Debug, Clone, PartialEq)]
pub struct FitsHeader {
    /// Sample type.
    pub bitpix: Bitpix,
    /// Axis lengths in header order, `NAXIS1` first.
    pub axes: Vec<usize>,
    /// Linear scale applied to stored values.
    pub bscale: f64,
    /// Offset applied to stored values.
    pub bzero: f64,
    /// Stored integer that marks an undefined sample.
    pub blank: Option<i64>,
}

impl FitsHeader {
    /// Array shape in row-major order, slowest axis first (`NAXISn, ..., NAXIS1`).
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        self.axes.iter().rev().copied().collect()
    }

    /// Number of samples in the data array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FitsFormat`] if the axis product overflows.
    pub fn sample_count(&self) -> Result<usize> {
        self.axes
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| Error::FitsFormat {
                reason: format!("axis lengths {:?} overflow", self.axes),
            })
    }

    /// Size in bytes of the data array, without block padding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FitsFormat`] if the size overflows.
    pub fn data_len(&self) -> Result<usize> {
        self.sample_count()?
            .checked_mul(self.bitpix.bytes_per_sample())
            .ok_or_else(|| Error::FitsFormat {
                reason: "data size overflows".to_string(),
            })
    }

    /// Whether stored values need `bzero + bscale * v` applied.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_scaled(&self) -> bool {
        self.bscale != 1.0 || self.bzero != 0.0
    }
}

/// Parse the primary header at the start of `bytes`.
///
/// Returns the header and the offset of the first data byte, which is the
/// start of the block following the `END` card.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<(FitsHeader, usize)> {
    let mut values: HashMap<String, String> = HashMap::new();
    let mut end_card = None;

    for (index, card) in bytes.chunks_exact(CARD_SIZE).enumerate() {
        let card = std::str::from_utf8(card)
            .ok()
            .filter(|text| text.is_ascii())
            .ok_or_else(|| Error::FitsFormat {
                reason: format!("header card {index} is not ASCII text"),
            })?;
        let keyword = card[..8].trim_end();

        if index == 0 && keyword != "SIMPLE" {
            return Err(Error::FitsFormat {
                reason: "first header card must be SIMPLE".to_string(),
            });
        }

        if keyword == "END" {
            end_card = Some(index);
            break;
        }

        if &card[8..10] == "= " {
            values
                .entry(keyword.to_string())
                .or_insert_with(|| strip_comment(&card[10..]).to_string());
        }
    }

    let end_card = end_card.ok_or_else(|| Error::FitsFormat {
        reason: "header has no END card".to_string(),
    })?;

    if values.get("SIMPLE").map(String::as_str) != Some("T") {
        return Err(Error::FitsFormat {
            reason: "SIMPLE must be T".to_string(),
        });
    }

    let bitpix = Bitpix::from_code(integer(&values, "BITPIX")?)?;
    let naxis = integer(&values, "NAXIS")?;
    if !(0..=999).contains(&naxis) {
        return Err(Error::FitsFormat {
            reason: format!("NAXIS {naxis} out of range"),
        });
    }

    let axes = (1..=naxis)
        .map(|n| {
            let key = format!("NAXIS{n}");
            let len = integer(&values, &key)?;
            usize::try_from(len).map_err(|_| Error::FitsFormat {
                reason: format!("{key} must be non-negative, got {len}"),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let header = FitsHeader {
        bitpix,
        axes,
        bscale: optional_real(&values, "BSCALE")?.unwrap_or(1.0),
        bzero: optional_real(&values, "BZERO")?.unwrap_or(0.0),
        blank: if bitpix.is_integer() {
            optional_integer(&values, "BLANK")?
        } else {
            None
        },
    };

    let header_len = (end_card + 1) * CARD_SIZE;
    Ok((header, header_len.div_ceil(BLOCK_SIZE) * BLOCK_SIZE))
}

/// Format one header card, padded to [`CARD_SIZE`].
pub(crate) fn card(keyword: &str, value: &str) -> String {
    format!("{keyword:<8}= {value:>20}{:width$}", "", width = CARD_SIZE - 30)
}

/// Drop the `/ comment` tail of a card value. String values keep their slashes.
fn strip_comment(raw: &str) -> &str {
    let raw = raw.trim();
    if raw.starts_with('\'') {
        return raw;
    }
    raw.split('/').next().unwrap_or_default().trim()
}

fn integer(values: &HashMap<String, String>, key: &str) -> Result<i64> {
    optional_integer(values, key)?.ok_or_else(|| Error::FitsFormat {
        reason: format!("missing required keyword {key}"),
    })
}

fn optional_integer(values: &HashMap<String, String>, key: &str) -> Result<Option<i64>> {
    values
        .get(key)
        .map(|raw| {
            raw.parse::<i64>().map_err(|_| Error::FitsFormat {
                reason: format!("{key} is not an integer: {raw:?}"),
            })
        })
        .transpose()
}

fn optional_real(values: &HashMap<String, String>, key: &str) -> Result<Option<f64>> {
    values
        .get(key)
        .map(|raw| {
            // Fortran-style double exponents: 1.0D+03
            raw.replace(['D', 'd'], "E")
                .parse::<f64>()
                .map_err(|_| Error::FitsFormat {
                    reason: format!("{key} is not a number: {raw:?}"),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(cards: &[String]) -> Vec<u8> {
        let mut bytes: Vec<u8> = cards.iter().flat_map(|c| c.bytes()).collect();
        bytes.extend(format!("{:<80}", "END").bytes());
        bytes.resize(bytes.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, b' ');
        bytes
    }

    #[test]
    fn test_card_layout() {
        let c = card("NAXIS1", "512");
        assert_eq!(c.len(), CARD_SIZE);
        assert_eq!(&c[..10], "NAXIS1  = ");
        assert_eq!(c[10..30].trim(), "512");
    }

    #[test]
    fn test_parse_minimal_header() {
        let bytes = header_bytes(&[
            card("SIMPLE", "T"),
            card("BITPIX", "-32"),
            card("NAXIS", "2"),
            card("NAXIS1", "3"),
            card("NAXIS2", "2"),
        ]);

        let (header, offset) = parse_header(&bytes).unwrap();

        assert_eq!(header.bitpix, Bitpix::F32);
        assert_eq!(header.axes, vec![3, 2]);
        assert_eq!(header.shape(), vec![2, 3]);
        assert_eq!(header.data_len().unwrap(), 24);
        assert!(!header.is_scaled());
        assert_eq!(offset, BLOCK_SIZE);
    }

    #[test]
    fn test_parse_scaling_with_comments() {
        let bytes = header_bytes(&[
            card("SIMPLE", "T"),
            card("BITPIX", "16"),
            card("NAXIS", "1"),
            card("NAXIS1", "4"),
            format!("{:<80}", "BSCALE  =              2.5D+00 / physical = bzero + bscale * raw"),
            card("BZERO", "32768"),
            card("BLANK", "-32768"),
        ]);

        let (header, _) = parse_header(&bytes).unwrap();

        assert!((header.bscale - 2.5).abs() < f64::EPSILON);
        assert!((header.bzero - 32768.0).abs() < f64::EPSILON);
        assert_eq!(header.blank, Some(-32768));
        assert!(header.is_scaled());
    }

    #[test]
    fn test_header_spanning_blocks() {
        let mut cards = vec![
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "1"),
            card("NAXIS1", "1"),
        ];
        cards.extend((0..40).map(|i| format!("{:<80}", format!("COMMENT filler {i}"))));

        let (_, offset) = parse_header(&header_bytes(&cards)).unwrap();
        assert_eq!(offset, 2 * BLOCK_SIZE);
    }

    #[test]
    fn test_rejects_missing_simple() {
        let bytes = header_bytes(&[card("BITPIX", "8"), card("NAXIS", "0")]);
        assert!(matches!(parse_header(&bytes), Err(Error::FitsFormat { .. })));
    }

    #[test]
    fn test_rejects_missing_end() {
        let bytes = format!("{:<2880}", card("SIMPLE", "T"));
        assert!(matches!(
            parse_header(bytes.as_bytes()),
            Err(Error::FitsFormat { .. })
        ));
    }

    #[test]
    fn test_rejects_missing_axis() {
        let bytes = header_bytes(&[
            card("SIMPLE", "T"),
            card("BITPIX", "8"),
            card("NAXIS", "2"),
            card("NAXIS1", "3"),
        ]);
        assert!(matches!(parse_header(&bytes), Err(Error::FitsFormat { .. })));
    }

    #[test]
    fn test_rejects_unknown_bitpix() {
        assert!(Bitpix::from_code(12).is_err());
        assert_eq!(Bitpix::from_code(-64).unwrap().code(), -64);
    }
}
