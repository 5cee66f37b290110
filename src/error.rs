use thiserror::Error;

/// Errors returned by the one-time password core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed Base32 input.
    #[error("invalid base32 encoding: {0}")]
    InvalidEncoding(&'static str),

    /// A secret shorter than the minimum was requested.
    #[error("secret of {requested} bytes is too weak, need at least {minimum}")]
    WeakSecretLength { requested: usize, minimum: usize },

    /// The platform random source could not be read. Never retried with a weaker source.
    #[error("secure random source unavailable: {0}")]
    InsufficientEntropySource(String),

    #[error("unsupported number of digits: {0} (expected 6 to 8)")]
    InvalidDigits(u32),

    #[error("unknown hash algorithm `{0}`")]
    UnknownAlgorithm(String),

    #[error("time step must be at least one second")]
    InvalidStep,

    #[error("verification window of {window} steps exceeds the maximum of {max}")]
    WindowTooLarge { window: u64, max: u64 },

    #[error("invalid provisioning uri: {0}")]
    InvalidUri(String),

    #[error("system clock is set before the unix epoch")]
    Clock,
}

pub type Result<T> = std::result::Result<T, Error>;
