//! Run-length encoding over 32- and 64-bit integers.
//!
//! Layout: `varint num_runs, (varint run_length, zigzag-varint value)*`.
//! Runs are maximal: each run extends as long as successive values are
//! identical. Empty input encodes to zero bytes.

use super::{varint, EncodingError};

pub fn encode_i32(values: &[i32]) -> (Vec<u8>, u32) {
    encode_runs(values, varint::encode_i32)
}

pub fn encode_i64(values: &[i64]) -> (Vec<u8>, u32) {
    encode_runs(values, varint::encode_i64)
}

pub fn decode_i32(data: &[u8], num_values: usize) -> Result<Vec<i32>, EncodingError> {
    decode_runs(data, num_values, varint::decode_i32)
}

pub fn decode_i64(data: &[u8], num_values: usize) -> Result<Vec<i64>, EncodingError> {
    decode_runs(data, num_values, varint::decode_i64)
}

/// Returns the encoded bytes and the number of runs.
fn encode_runs<T: Copy + PartialEq>(
    values: &[T],
    put: impl Fn(T, &mut Vec<u8>),
) -> (Vec<u8>, u32) {
    if values.is_empty() {
        return (Vec::new(), 0);
    }

    let mut runs: Vec<(u32, T)> = Vec::new();
    let mut i = 0usize;
    while i < values.len() {
        let current = values[i];
        let mut run_length = 1usize;
        while i + run_length < values.len() && values[i + run_length] == current {
            run_length += 1;
        }
        runs.push((run_length as u32, current));
        i += run_length;
    }

    let mut out = Vec::with_capacity(values.len());
    varint::encode_u32(runs.len() as u32, &mut out);
    for &(run_length, value) in &runs {
        varint::encode_u32(run_length, &mut out);
        put(value, &mut out);
    }
    (out, runs.len() as u32)
}

fn decode_runs<T: Copy>(
    data: &[u8],
    num_values: usize,
    read: impl Fn(&[u8]) -> Result<(T, usize), EncodingError>,
) -> Result<Vec<T>, EncodingError> {
    if data.is_empty() && num_values == 0 {
        return Ok(Vec::new());
    }

    let mut pos = 0usize;
    let (num_runs, consumed) = varint::decode_u32(&data[pos..])?;
    pos += consumed;

    let mut out = Vec::with_capacity(num_values);
    for _ in 0..num_runs {
        let (run_length, consumed) = varint::decode_u32(&data[pos..])?;
        pos += consumed;
        if run_length == 0 {
            return Err(EncodingError::InvalidRun);
        }
        let (value, consumed) = read(&data[pos..])?;
        pos += consumed;

        if out.len() + run_length as usize > num_values {
            return Err(EncodingError::ValueCountMismatch {
                expected: num_values,
                actual: out.len() + run_length as usize,
            });
        }
        out.extend(std::iter::repeat(value).take(run_length as usize));
    }

    if pos != data.len() {
        return Err(EncodingError::TrailingBytes(data.len() - pos));
    }
    if out.len() != num_values {
        return Err(EncodingError::ValueCountMismatch {
            expected: num_values,
            actual: out.len(),
        });
    }
    Ok(out)
}
