//! Field Extractor - zero-copy field access on raw lines
//!
//! Pulls a single numeric field out of a delimiter-separated line without
//! decoding the rest of the record. The indexing pass only ever needs the
//! user id and ad id of each line, so extracting two fields here is far
//! cheaper than a full [`Record`](crate::store::Record) decode per line.

use crate::store::error::{StoreError, StoreResult};
use memchr::memchr;

/// Extract field `field` (zero-based) from `line` as an unsigned integer
///
/// Scans the line exactly once: skips past `field` delimiter occurrences,
/// then accumulates decimal digits until the next delimiter or the end of
/// the line. An empty field decodes as 0.
///
/// # Errors
///
/// - [`StoreError::FieldOutOfRange`] when the line has fewer than
///   `field + 1` fields.
/// - [`StoreError::ValueOverflow`] when the decimal value exceeds `u64`.
/// - [`StoreError::MalformedRecord`] when the field contains a non-digit.
pub fn extract(line: &[u8], field: usize, delim: u8) -> StoreResult<u64> {
    let mut cursor = 0;

    for seen in 0..field {
        match memchr(delim, &line[cursor..]) {
            Some(i) => cursor += i + 1,
            None => {
                return Err(StoreError::FieldOutOfRange {
                    field,
                    available: seen + 1,
                })
            }
        }
    }

    let end = memchr(delim, &line[cursor..])
        .map(|i| cursor + i)
        .unwrap_or(line.len());

    parse_uint(&line[cursor..end], field)
}

/// Parse a decimal byte slice into a `u64`, checked
///
/// Shared by the extractor and the record decoder. Empty input is 0, which
/// matches how an empty field between two delimiters reads.
pub(crate) fn parse_uint(bytes: &[u8], field: usize) -> StoreResult<u64> {
    let mut value: u64 = 0;

    for &b in bytes {
        let digit = match b {
            b'0'..=b'9' => (b - b'0') as u64,
            _ => {
                return Err(StoreError::MalformedRecord(format!(
                    "non-numeric byte 0x{:02x} in field {}",
                    b, field
                )))
            }
        };
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(digit))
            .ok_or(StoreError::ValueOverflow { field })?;
    }

    Ok(value)
}
