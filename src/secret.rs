//! Shared secrets and their generation.

use std::fmt;

use rand::TryRngCore;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::base32;
use crate::error::{Error, Result};

/// Smallest secret accepted for generation (80 bits).
pub const MIN_SECRET_BYTES: usize = 10;
/// Default secret length (160 bits, the SHA-1 output size).
pub const DEFAULT_SECRET_BYTES: usize = 20;

/// Raw shared secret bytes, wiped from memory on drop.
#[derive(Clone)]
pub struct Secret {
    bytes: Vec<u8>,
}

impl Secret {
    /// Draws `byte_len` bytes from the operating system CSPRNG.
    pub fn generate(byte_len: usize) -> Result<Self> {
        if byte_len < MIN_SECRET_BYTES {
            return Err(Error::WeakSecretLength {
                requested: byte_len,
                minimum: MIN_SECRET_BYTES,
            });
        }

        let mut bytes = vec![0u8; byte_len];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| Error::InsufficientEntropySource(e.to_string()))?;

        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Parses a secret as shown to users or stored in a provisioning URI.
    pub fn from_base32(encoded: &str) -> Result<Self> {
        base32::decode(encoded).map(Self::from_bytes)
    }

    pub fn to_base32(&self) -> String {
        base32::encode(&self.bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.bytes.ct_eq(&other.bytes).into()
    }
}

impl Eq for Secret {}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret(<{} bytes redacted>)", self.bytes.len())
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}
