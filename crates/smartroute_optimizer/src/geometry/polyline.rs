//! Encoded polyline codec.
//!
//! Each coordinate is scaled by `10^precision`, delta-coded against the
//! previous one, zig-zag encoded and emitted latitude first in 5-bit groups
//! with a continuation bit, offset by 63 into printable ASCII. Paths are
//! `geo::LineString`s with `x = lng` and `y = lat`.

use geo::{Coord, LineString};
use thiserror::Error;

pub const POLYLINE_PRECISION: u32 = 5;

const CHAR_OFFSET: u8 = 63;
const CHUNK_MASK: u64 = 0x1f;
const CONTINUATION_BIT: u64 = 0x20;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolylineError {
    #[error("Invalid byte {byte:#04x} at index {index}")]
    InvalidCharacter { byte: u8, index: usize },

    #[error("Polyline ends in the middle of a value")]
    Truncated,

    #[error("Value starting at index {index} does not fit in 64 bits")]
    Overflow { index: usize },
}

fn scale(precision: u32) -> f64 {
    10f64.powi(precision as i32)
}

pub fn encode_polyline(path: &LineString<f64>, precision: u32) -> String {
    let factor = scale(precision);
    let mut output = String::with_capacity(path.0.len() * 8);
    let (mut last_lat, mut last_lng) = (0i64, 0i64);

    for coord in path.coords() {
        let lat = (coord.y * factor).round() as i64;
        let lng = (coord.x * factor).round() as i64;

        encode_value(lat - last_lat, &mut output);
        encode_value(lng - last_lng, &mut output);

        last_lat = lat;
        last_lng = lng;
    }

    output
}

fn encode_value(value: i64, output: &mut String) {
    let mut num = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    } as u64;

    while num >= CONTINUATION_BIT {
        output.push(char::from(
            ((CONTINUATION_BIT | (num & CHUNK_MASK)) as u8) + CHAR_OFFSET,
        ));
        num >>= 5;
    }

    output.push(char::from(num as u8 + CHAR_OFFSET));
}

pub fn decode_polyline(encoded: &str, precision: u32) -> Result<LineString<f64>, PolylineError> {
    let factor = scale(precision);
    let bytes = encoded.as_bytes();

    let mut index = 0;
    let (mut lat, mut lng) = (0i64, 0i64);
    let mut coords = Vec::new();

    while index < bytes.len() {
        lat += decode_value(bytes, &mut index)?;
        lng += decode_value(bytes, &mut index)?;

        coords.push(Coord {
            x: lng as f64 / factor,
            y: lat as f64 / factor,
        });
    }

    Ok(LineString::new(coords))
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: u64 = 0;
    let mut shift = 0;

    loop {
        let Some(&byte) = bytes.get(*index) else {
            return Err(PolylineError::Truncated);
        };

        if !(CHAR_OFFSET..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                byte,
                index: *index,
            });
        }

        let chunk = u64::from(byte - CHAR_OFFSET);
        let bits = chunk & CHUNK_MASK;

        // Bits shifted past the top of the word would be dropped
        if shift >= 64 || bits.leading_zeros() < shift {
            return Err(PolylineError::Overflow { index: start });
        }

        result |= bits << shift;
        shift += 5;
        *index += 1;

        if chunk < CONTINUATION_BIT {
            break;
        }
    }

    let value = (result >> 1) as i64;
    Ok(if result & 1 == 1 { !value } else { value })
}
