//! Dictionary encoding for string columns.
//!
//! Layout: `u32 dict_size, (u32 length, bytes)^dict_size`, then the value
//! indices as a run-length encoded i32 stream. Indices are assigned in
//! first-seen order, so the dictionary is deterministic for a given input.
//! Encoder state lives entirely within a single call.

use std::collections::HashMap;

use super::{run_length, EncodingError};

/// Returns the encoded bytes and the dictionary size (the page's distinct
/// count). Empty input encodes to zero bytes.
pub fn encode(values: &[String]) -> (Vec<u8>, u32) {
    if values.is_empty() {
        return (Vec::new(), 0);
    }

    let mut dict: HashMap<&str, i32> = HashMap::new();
    let mut dict_values: Vec<&str> = Vec::new();
    let mut indices = Vec::with_capacity(values.len());

    for value in values {
        let index = *dict.entry(value.as_str()).or_insert_with(|| {
            dict_values.push(value.as_str());
            dict_values.len() as i32 - 1
        });
        indices.push(index);
    }

    let mut out = Vec::new();
    out.extend_from_slice(&(dict_values.len() as u32).to_le_bytes());
    for entry in &dict_values {
        out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    let (encoded_indices, _) = run_length::encode_i32(&indices);
    out.extend_from_slice(&encoded_indices);

    (out, dict_values.len() as u32)
}

pub fn decode(data: &[u8], num_values: usize) -> Result<Vec<String>, EncodingError> {
    if data.is_empty() && num_values == 0 {
        return Ok(Vec::new());
    }

    let mut pos = 0usize;
    if data.len() < 4 {
        return Err(EncodingError::Truncated);
    }
    let dict_size = u32::from_le_bytes(data[..4].try_into().unwrap());
    pos += 4;

    let mut dictionary = Vec::with_capacity(dict_size as usize);
    for _ in 0..dict_size {
        if data.len() - pos < 4 {
            return Err(EncodingError::Truncated);
        }
        let len = u32::from_le_bytes(data[pos..pos + 4].try_into().unwrap()) as usize;
        pos += 4;
        if data.len() - pos < len {
            return Err(EncodingError::Truncated);
        }
        dictionary.push(String::from_utf8(data[pos..pos + len].to_vec())?);
        pos += len;
    }

    let indices = run_length::decode_i32(&data[pos..], num_values)?;

    let mut out = Vec::with_capacity(num_values);
    for index in indices {
        if index < 0 || index as u32 >= dict_size {
            return Err(EncodingError::InvalidDictIndex {
                index: index.into(),
                dict_size,
            });
        }
        out.push(dictionary[index as usize].clone());
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn round_trip_with_duplicates() {
        let values = strings(&["Paris", "Lyon", "Paris", "Nice", "Lyon"]);
        let (data, dict_size) = encode(&values);
        assert_eq!(dict_size, 3);
        assert_eq!(decode(&data, values.len()).unwrap(), values);
    }

    #[test]
    fn indices_follow_first_seen_order() {
        let values = strings(&["b", "a", "b", "c"]);
        let (data, _) = encode(&values);
        // dict entries must appear as b, a, c
        assert_eq!(&data[4..9], &[1, 0, 0, 0, b'b']);
        assert_eq!(&data[9..14], &[1, 0, 0, 0, b'a']);
        assert_eq!(&data[14..19], &[1, 0, 0, 0, b'c']);
        assert_eq!(decode(&data, 4).unwrap(), values);
    }

    #[test]
    fn empty_input_encodes_to_zero_bytes() {
        let (data, dict_size) = encode(&[]);
        assert!(data.is_empty());
        assert_eq!(dict_size, 0);
        assert_eq!(decode(&[], 0).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let values = strings(&["only"]);
        let (mut data, _) = encode(&values);
        // Rewrite the single index run (run_length=1, value=0) so the
        // zigzag value decodes to 7, past the one-entry dictionary.
        let len = data.len();
        assert_eq!(data[len - 1], 0);
        data[len - 1] = 14;
        let err = decode(&data, 1).unwrap_err();
        assert!(matches!(err, EncodingError::InvalidDictIndex { index: 7, .. }));
    }
}
