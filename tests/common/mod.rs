#![allow(dead_code)]

use std::time::{SystemTime, UNIX_EPOCH};

use sha1::{Digest, Sha1};

/// HMAC-SHA1 six digit TOTP written straight from RFC 2104 and RFC 4226,
/// independent of the crate under test.
pub fn reference_totp(secret: &[u8], time: u64, time_step: u64) -> String {
    let counter = time / time_step;

    let mut key = secret.to_vec();
    if key.len() > 64 {
        key = Sha1::digest(&key).to_vec();
    }
    key.resize(64, 0);

    let mut ipad = [0x36u8; 64];
    let mut opad = [0x5cu8; 64];
    for i in 0..64 {
        ipad[i] ^= key[i];
        opad[i] ^= key[i];
    }

    let mut hasher = Sha1::new();
    hasher.update(ipad);
    hasher.update(counter.to_be_bytes());
    let inner_hash = hasher.finalize_reset();

    hasher.update(opad);
    hasher.update(inner_hash);
    let hmac = hasher.finalize();

    let offset = (hmac[19] & 0xf) as usize;
    let code = ((hmac[offset] & 0x7f) as u32) << 24
        | (hmac[offset + 1] as u32) << 16
        | (hmac[offset + 2] as u32) << 8
        | (hmac[offset + 3] as u32);

    format!("{:06}", code % 1_000_000)
}

pub fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}
