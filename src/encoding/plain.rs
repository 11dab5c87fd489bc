//! Plain encoding: integers as native-width little-endian values, strings
//! as `(u32 length, bytes)` pairs.

use super::EncodingError;

pub fn encode_i32(values: &[i32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 4);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn encode_i64(values: &[i64]) -> Vec<u8> {
    let mut out = Vec::with_capacity(values.len() * 8);
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

pub fn encode_strings(values: &[String]) -> Vec<u8> {
    let len: usize = values.iter().map(|s| 4 + s.len()).sum();
    let mut out = Vec::with_capacity(len);
    for s in values {
        out.extend_from_slice(&(s.len() as u32).to_le_bytes());
        out.extend_from_slice(s.as_bytes());
    }
    out
}

pub fn decode_i32(data: &[u8], num_values: usize) -> Result<Vec<i32>, EncodingError> {
    decode_fixed(data, num_values, 4, |b| i32::from_le_bytes(b.try_into().unwrap()))
}

pub fn decode_i64(data: &[u8], num_values: usize) -> Result<Vec<i64>, EncodingError> {
    decode_fixed(data, num_values, 8, |b| i64::from_le_bytes(b.try_into().unwrap()))
}

fn decode_fixed<T>(
    data: &[u8],
    num_values: usize,
    width: usize,
    read: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>, EncodingError> {
    let expected = num_values * width;
    if data.len() < expected {
        return Err(EncodingError::Truncated);
    }
    if data.len() > expected {
        return Err(EncodingError::TrailingBytes(data.len() - expected));
    }
    Ok(data.chunks_exact(width).map(read).collect())
}

pub fn decode_strings(data: &[u8], num_values: usize) -> Result<Vec<String>, EncodingError> {
    let mut out = Vec::with_capacity(num_values);
    let mut pos = 0usize;
    for _ in 0..num_values {
        if data.len() - pos < 4 {
            return Err(EncodingError::Truncated);
        }
        let len = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        if data.len() - pos < len {
            return Err(EncodingError::Truncated);
        }
        out.push(String::from_utf8(data[pos..pos + len].to_vec())?);
        pos += len;
    }
    if pos != data.len() {
        return Err(EncodingError::TrailingBytes(data.len() - pos));
    }
    Ok(out)
}
