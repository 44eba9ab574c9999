//! Byte-range fulfillment.
//!
//! Parses the `Range`-header grammar (`start-end`, `start-`, `-length`,
//! comma-separated, optional `bytes=` prefix) and extracts the selected
//! slices from a payload. Every specifier is evaluated against the
//! original full-length payload, not a running cursor, and the extracted
//! slices are concatenated in specifier order. Multipart boundaries are
//! deliberately not produced; the concatenation is the body.

use bytes::{Bytes, BytesMut};

use crate::types::{Error, Result};

/// A single parsed range specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ByteRange {
    /// `start-end`, both inclusive, 0-based. `end` clamps to the last
    /// byte of the object.
    Bounded(u64, u64),
    /// `start-`: from `start` to the end of the object.
    From(u64),
    /// `-length`: the last `length` bytes.
    Suffix(u64),
}

fn parse_bound(part: &str, spec: &str) -> Result<u64> {
    part.parse::<u64>().map_err(|e| {
        Error::invalid_argument()
            .with_message(format!("malformed range specifier: {spec}"))
            .with_source(e)
    })
}

fn parse_one(spec: &str) -> Result<ByteRange> {
    let Some((head, tail)) = spec.split_once('-') else {
        return Err(Error::invalid_argument()
            .with_message(format!("range specifier missing '-': {spec}")));
    };
    match (head.is_empty(), tail.is_empty()) {
        (true, true) => {
            Err(Error::invalid_argument().with_message("range specifier has no bounds: -"))
        }
        (true, false) => Ok(ByteRange::Suffix(parse_bound(tail, spec)?)),
        (false, true) => Ok(ByteRange::From(parse_bound(head, spec)?)),
        (false, false) => {
            let start = parse_bound(head, spec)?;
            let end = parse_bound(tail, spec)?;
            if start > end {
                return Err(Error::invalid_argument()
                    .with_message(format!("range start after end: {spec}")));
            }
            Ok(ByteRange::Bounded(start, end))
        }
    }
}

/// Parse a comma-separated range specifier list.
fn parse(spec: &str) -> Result<Vec<ByteRange>> {
    let spec = spec.trim().trim_start_matches("bytes=");
    spec.split(',').map(|part| parse_one(part.trim())).collect()
}

fn extract(range: ByteRange, data: &Bytes) -> Result<Bytes> {
    let len = data.len() as u64;
    match range {
        ByteRange::Bounded(start, end) => {
            if start >= len {
                return Err(Error::invalid_argument()
                    .with_message(format!("range start {start} beyond object of {len} bytes")));
            }
            let end = end.min(len - 1);
            Ok(data.slice(start as usize..=end as usize))
        }
        ByteRange::From(start) => {
            if start > len {
                return Err(Error::invalid_argument()
                    .with_message(format!("range start {start} beyond object of {len} bytes")));
            }
            Ok(data.slice(start as usize..))
        }
        ByteRange::Suffix(length) => {
            let length = length.min(len);
            Ok(data.slice((len - length) as usize..))
        }
    }
}

/// Apply the range specifier list `spec` to `data`.
///
/// Returns the concatenation of the extracted slices in specifier order.
pub fn apply(spec: &str, data: &Bytes) -> Result<Bytes> {
    let ranges = parse(spec)?;
    if ranges.len() == 1 {
        return extract(ranges[0], data);
    }
    let mut body = BytesMut::new();
    for range in ranges {
        body.extend_from_slice(&extract(range, data)?);
    }
    Ok(body.freeze())
}
