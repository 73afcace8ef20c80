//! Encoded polyline decoding.
//!
//! Routes from the navigation service come back as Google encoded polylines
//! with 6 digits of precision.

use thiserror::Error;

/// A decoded point, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("Invalid polyline character {ch:?} at byte {index}")]
    InvalidCharacter { ch: char, index: usize },

    #[error("Polyline ends in the middle of a value")]
    Truncated,

    #[error("Polyline value at byte {index} is too long")]
    Overflow { index: usize },
}

/// Decodes a precision-6 polyline.
pub fn decode_polyline6(encoded: &str) -> Result<Vec<Coordinate>, PolylineError> {
    decode(encoded, 6)
}

/// Decodes an encoded polyline with `precision` decimal digits.
pub fn decode(encoded: &str, precision: u8) -> Result<Vec<Coordinate>, PolylineError> {
    let factor = 10f64.powi(i32::from(precision));
    let bytes = encoded.as_bytes();

    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat = accumulate(lat, bytes, &mut index)?;
        lng = accumulate(lng, bytes, &mut index)?;

        coordinates.push(Coordinate {
            lat: lat as f64 / factor,
            lng: lng as f64 / factor,
        });
    }

    Ok(coordinates)
}

/// Adds the next delta to a running coordinate.
fn accumulate(current: i64, bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let delta = next_delta(bytes, index)?;
    current
        .checked_add(delta)
        .ok_or(PolylineError::Overflow { index: start })
}

/// Reads one zig-zag encoded delta starting at `index`.
fn next_delta(bytes: &[u8], index: &mut usize) -> Result<i64, PolylineError> {
    let start = *index;
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or(PolylineError::Truncated)?;
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter {
                ch: byte as char,
                index: *index,
            });
        }
        *index += 1;

        // 5 bits per chunk; anything past 60 bits cannot be a coordinate.
        if shift > 55 {
            return Err(PolylineError::Overflow { index: start });
        }

        let chunk = i64::from(byte - 63);
        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 != 0 { !(result >> 1) } else { result >> 1 })
}
