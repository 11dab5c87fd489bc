//! Delta encoding for integer sequences.
//!
//! Layout: base value in native little-endian width, `varint num_deltas`,
//! then zigzag-varint deltas against the running previous value. All
//! arithmetic wraps, on both sides. Empty input encodes to zero bytes.

use super::{varint, EncodingError};

pub fn encode_i32(values: &[i32]) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() * 2);
    out.extend_from_slice(&values[0].to_le_bytes());
    varint::encode_u32((values.len() - 1) as u32, &mut out);

    let mut prev = values[0];
    for &v in &values[1..] {
        varint::encode_i32(v.wrapping_sub(prev), &mut out);
        prev = v;
    }
    out
}

pub fn encode_i64(values: &[i64]) -> Vec<u8> {
    if values.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(values.len() * 2);
    out.extend_from_slice(&values[0].to_le_bytes());
    varint::encode_u32((values.len() - 1) as u32, &mut out);

    let mut prev = values[0];
    for &v in &values[1..] {
        varint::encode_i64(v.wrapping_sub(prev), &mut out);
        prev = v;
    }
    out
}

pub fn decode_i32(data: &[u8], num_values: usize) -> Result<Vec<i32>, EncodingError> {
    if data.is_empty() && num_values == 0 {
        return Ok(Vec::new());
    }
    if data.len() < 4 {
        return Err(EncodingError::Truncated);
    }
    let base = i32::from_le_bytes(data[..4].try_into().unwrap());
    let mut pos = 4usize;

    let (num_deltas, consumed) = varint::decode_u32(&data[pos..])?;
    pos += consumed;

    let mut out = Vec::with_capacity(num_values);
    out.push(base);
    let mut current = base;
    for _ in 0..num_deltas {
        let (delta, consumed) = varint::decode_i32(&data[pos..])?;
        pos += consumed;
        current = current.wrapping_add(delta);
        out.push(current);
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

pub fn decode_i64(data: &[u8], num_values: usize) -> Result<Vec<i64>, EncodingError> {
    if data.is_empty() && num_values == 0 {
        return Ok(Vec::new());
    }
    if data.len() < 8 {
        return Err(EncodingError::Truncated);
    }
    let base = i64::from_le_bytes(data[..8].try_into().unwrap());
    let mut pos = 8usize;

    let (num_deltas, consumed) = varint::decode_u32(&data[pos..])?;
    pos += consumed;

    let mut out = Vec::with_capacity(num_values);
    out.push(base);
    let mut current = base;
    for _ in 0..num_deltas {
        let (delta, consumed) = varint::decode_i64(&data[pos..])?;
        pos += consumed;
        current = current.wrapping_add(delta);
        out.push(current);
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_round_trip() {
        let values = vec![1000i64, 1100, 1200, 1300, 1400];
        let data = encode_i64(&values);
        // base (8) + count (1) + 4 deltas of 100 (2 bytes each)
        assert!(data.len() < 40);
        assert_eq!(decode_i64(&data, 5).unwrap(), values);
    }

    #[test]
    fn non_monotonic_round_trip() {
        let values = vec![5i32, -3, 100, 99, 0];
        assert_eq!(decode_i32(&encode_i32(&values), 5).unwrap(), values);
    }

    #[test]
    fn wrapping_deltas_round_trip() {
        let values = vec![i64::MAX, i64::MIN, 0, i64::MAX];
        assert_eq!(decode_i64(&encode_i64(&values), 4).unwrap(), values);

        let values = vec![i32::MIN, i32::MAX];
        assert_eq!(decode_i32(&encode_i32(&values), 2).unwrap(), values);
    }

    #[test]
    fn empty_input_encodes_to_zero_bytes() {
        assert!(encode_i64(&[]).is_empty());
        assert_eq!(decode_i64(&[], 0).unwrap(), Vec::<i64>::new());
    }

    #[test]
    fn missing_base_is_truncated() {
        assert_eq!(
            decode_i64(&[0x01, 0x02, 0x03], 1).unwrap_err(),
            EncodingError::Truncated
        );
    }
}
