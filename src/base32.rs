// RFC 4648 base32, the encoding authenticator apps use for shared secrets.
use crate::error::{Error, Result};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Encodes `input` without padding.
pub fn encode(input: &[u8]) -> String {
    let mut result = String::with_capacity((input.len() * 8).div_ceil(5));
    let mut buffer = 0u64;
    let mut bits = 0u32;

    for &byte in input {
        buffer = (buffer << 8) | u64::from(byte);
        bits += 8;

        while bits >= 5 {
            bits -= 5;
            result.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
    }

    if bits > 0 {
        result.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    result
}

/// Decodes padded or unpadded base32. Case is ignored, as are spaces between groups.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let input: Vec<u8> = input.bytes().filter(|&b| b != b' ').collect();

    let data_len = input.iter().rposition(|&b| b != b'=').map_or(0, |i| i + 1);
    let (data, padding) = input.split_at(data_len);

    if !padding.is_empty() {
        if input.len() % 8 != 0 {
            return Err(Error::InvalidEncoding("padded input length is not a multiple of 8"));
        }
        if !matches!(padding.len(), 1 | 3 | 4 | 6) {
            return Err(Error::InvalidEncoding("malformed padding"));
        }
    }

    // 1, 3 and 6 trailing characters cannot come from any whole number of bytes
    if matches!(data.len() % 8, 1 | 3 | 6) {
        return Err(Error::InvalidEncoding("truncated input"));
    }

    let mut result = Vec::with_capacity(data.len() * 5 / 8);
    let mut buffer = 0u64;
    let mut bits = 0u32;

    for &c in data {
        let value = symbol_value(c)
            .ok_or(Error::InvalidEncoding("character outside the base32 alphabet"))?;
        buffer = (buffer << 5) | u64::from(value);
        bits += 5;

        if bits >= 8 {
            bits -= 8;
            result.push((buffer >> bits) as u8);
        }
    }

    Ok(result)
}

fn symbol_value(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a'),
        b'2'..=b'7' => Some(c - b'2' + 26),
        _ => None,
    }
}
