//! Time-based one-time passwords (RFC 6238).

use std::time::{SystemTime, UNIX_EPOCH};

use subtle::{Choice, ConstantTimeEq};

use crate::error::{Error, Result};
use crate::hotp::{Algorithm, DEFAULT_DIGITS, Hotp};

pub const DEFAULT_STEP: u64 = 30;
pub const DEFAULT_WINDOW: u64 = 1;
/// Every extra step of window widens the guessable code space, so it is capped.
pub const MAX_WINDOW: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totp {
    hotp: Hotp,
    time_step: u64,
    window: u64,
}

impl Default for Totp {
    fn default() -> Self {
        Self {
            hotp: Hotp::default(),
            time_step: DEFAULT_STEP,
            window: DEFAULT_WINDOW,
        }
    }
}

impl Totp {
    pub fn new(algorithm: Algorithm, digits: u32, time_step: u64, window: u64) -> Result<Self> {
        if time_step == 0 {
            return Err(Error::InvalidStep);
        }
        if window > MAX_WINDOW {
            return Err(Error::WindowTooLarge {
                window,
                max: MAX_WINDOW,
            });
        }

        Ok(Self {
            hotp: Hotp::new(algorithm, digits)?,
            time_step,
            window,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.hotp.algorithm()
    }

    pub fn digits(&self) -> u32 {
        self.hotp.digits()
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn window(&self) -> u64 {
        self.window
    }

    pub fn counter_at(&self, time: u64) -> u64 {
        time / self.time_step
    }

    pub fn code_at(&self, secret: &[u8], time: u64) -> String {
        self.hotp.generate(secret, self.counter_at(time))
    }

    pub fn code_now(&self, secret: &[u8]) -> Result<String> {
        Ok(self.code_at(secret, unix_now()?))
    }

    /// Checks `candidate` against every step in the drift window.
    ///
    /// All steps are computed and compared in constant time, so a wrong code
    /// costs the same whether it is malformed, off by one digit or entirely
    /// different. Spaces and dashes in the candidate are ignored.
    pub fn verify_at(&self, secret: &[u8], candidate: &str, time: u64) -> bool {
        let candidate = candidate.replace([' ', '-'], "");
        let counter = self.counter_at(time);
        let first = counter.saturating_sub(self.window);
        let last = counter.saturating_add(self.window);

        let mut matched = Choice::from(0u8);
        for step in first..=last {
            let expected = self.hotp.generate(secret, step);
            matched |= expected.as_bytes().ct_eq(candidate.as_bytes());
        }

        matched.into()
    }

    pub fn verify_now(&self, secret: &[u8], candidate: &str) -> Result<bool> {
        Ok(self.verify_at(secret, candidate, unix_now()?))
    }

    /// Seconds until the code for `time` rolls over.
    pub fn time_remaining_at(&self, time: u64) -> u64 {
        self.time_step - (time % self.time_step)
    }

    pub fn time_remaining(&self) -> Result<u64> {
        Ok(self.time_remaining_at(unix_now()?))
    }
}

/// SHA-1 code for `time` with the given step and digit count.
pub fn totp_code(secret: &[u8], time: u64, time_step: u64, digits: u32) -> Result<String> {
    let totp = Totp::new(Algorithm::Sha1, digits, time_step, DEFAULT_WINDOW)?;
    Ok(totp.code_at(secret, time))
}

/// SHA-1 verification of a six digit `candidate` at `time`.
pub fn totp_verify(
    secret: &[u8],
    candidate: &str,
    time: u64,
    time_step: u64,
    window: u64,
) -> Result<bool> {
    let totp = Totp::new(Algorithm::Sha1, DEFAULT_DIGITS, time_step, window)?;
    Ok(totp.verify_at(secret, candidate, time))
}

pub(crate) fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .map_err(|_| Error::Clock)
}
