//! Second-factor registration and login verification.
//!
//! The service is pure: it hands secrets back to the caller for storage and
//! receives them again at login. Passwords never pass through here.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::secret::{DEFAULT_SECRET_BYTES, MIN_SECRET_BYTES, Secret};
use crate::totp::{Totp, unix_now};
use crate::uri::Provisioning;

/// Result of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Verified,
    /// Wrong, expired or malformed code. The user may retry.
    RejectedBadCode,
    /// No secret on file; the caller should send the user to registration.
    RejectedMissingSecret,
}

impl Outcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Outcome::Verified)
    }
}

/// What registration hands back: a secret to persist and a URI to display.
#[derive(Debug, Clone)]
pub struct Registration {
    pub secret: Secret,
    pub uri: String,
}

#[derive(Debug, Clone)]
pub struct VerificationService {
    issuer: String,
    totp: Totp,
    secret_bytes: usize,
}

impl VerificationService {
    pub fn new(issuer: impl Into<String>, totp: Totp) -> Self {
        Self {
            issuer: issuer.into(),
            totp,
            secret_bytes: DEFAULT_SECRET_BYTES,
        }
    }

    /// Sets the length of generated secrets.
    pub fn with_secret_bytes(mut self, secret_bytes: usize) -> Result<Self> {
        if secret_bytes < MIN_SECRET_BYTES {
            return Err(Error::WeakSecretLength {
                requested: secret_bytes,
                minimum: MIN_SECRET_BYTES,
            });
        }
        self.secret_bytes = secret_bytes;
        Ok(self)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn totp(&self) -> &Totp {
        &self.totp
    }

    pub fn register(&self, account: &str) -> Result<Registration> {
        let secret = Secret::generate(self.secret_bytes)?;
        let uri = self.provisioning(secret.clone(), account).to_uri();
        Ok(Registration { secret, uri })
    }

    pub fn verify_login_at(&self, stored: Option<&Secret>, candidate: &str, time: u64) -> Outcome {
        let Some(secret) = stored else {
            return Outcome::RejectedMissingSecret;
        };

        if self.totp.verify_at(secret.as_bytes(), candidate, time) {
            Outcome::Verified
        } else {
            Outcome::RejectedBadCode
        }
    }

    pub fn verify_login(&self, stored: Option<&Secret>, candidate: &str) -> Result<Outcome> {
        Ok(self.verify_login_at(stored, candidate, unix_now()?))
    }

    fn provisioning(&self, secret: Secret, account: &str) -> Provisioning {
        Provisioning {
            secret,
            account: account.to_string(),
            issuer: self.issuer.clone(),
            algorithm: self.totp.algorithm(),
            digits: self.totp.digits(),
            period: self.totp.time_step(),
        }
    }
}
