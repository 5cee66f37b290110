use std::env;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::hotp::{Algorithm, DEFAULT_DIGITS};
use crate::secret::DEFAULT_SECRET_BYTES;
use crate::service::VerificationService;
use crate::totp::{DEFAULT_STEP, DEFAULT_WINDOW, Totp};

pub const CONFIG_FILE: &str = "twofactor.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Issuer shown in authenticator apps.
    pub issuer: String,
    /// Path of the SQLite secret store.
    pub database: String,
    pub algorithm: Algorithm,
    pub digits: u32,
    /// Time step in seconds.
    pub period: u64,
    /// Steps of clock drift tolerated either side of now.
    pub window: u64,
    pub secret_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            issuer: "twofactor".to_string(),
            database: "twofactor.db".to_string(),
            algorithm: Algorithm::Sha1,
            digits: DEFAULT_DIGITS,
            period: DEFAULT_STEP,
            window: DEFAULT_WINDOW,
            secret_bytes: DEFAULT_SECRET_BYTES,
        }
    }
}

impl Config {
    /// Reads `twofactor.json`, and if it doesn't exist, uses env vars.
    ///
    /// A config file that exists but does not parse is an error rather than a
    /// silent fallback to the environment.
    pub fn load() -> anyhow::Result<Self> {
        let file_content = std::fs::read_to_string(CONFIG_FILE).ok();
        Self::resolve(file_content.as_deref(), |key| env::var(key).ok())
    }

    /// Picks the config file contents when present, `lookup` otherwise.
    pub fn resolve<F>(file_content: Option<&str>, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match file_content {
            Some(json) => {
                let config = Self::from_json(json)
                    .map_err(|e| anyhow::anyhow!("{CONFIG_FILE} is invalid: {e}"))?;
                debug!("loaded configuration from {CONFIG_FILE}");
                Ok(config)
            }
            None => Self::from_vars(lookup),
        }
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Applies `TWOFACTOR_*` variables from `lookup` over the defaults.
    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(issuer) = lookup("TWOFACTOR_ISSUER") {
            config.issuer = issuer;
        }
        if let Some(database) = lookup("TWOFACTOR_DB") {
            config.database = database;
        }
        if let Some(algorithm) = parse_var::<Algorithm, _>(&lookup, "TWOFACTOR_ALGORITHM")? {
            config.algorithm = algorithm;
        }
        if let Some(digits) = parse_var(&lookup, "TWOFACTOR_DIGITS")? {
            config.digits = digits;
        }
        if let Some(period) = parse_var(&lookup, "TWOFACTOR_PERIOD")? {
            config.period = period;
        }
        if let Some(window) = parse_var(&lookup, "TWOFACTOR_WINDOW")? {
            config.window = window;
        }
        if let Some(secret_bytes) = parse_var(&lookup, "TWOFACTOR_SECRET_BYTES")? {
            config.secret_bytes = secret_bytes;
        }

        debug!("loaded configuration from environment");
        Ok(config)
    }

    pub fn totp(&self) -> anyhow::Result<Totp> {
        Ok(Totp::new(self.algorithm, self.digits, self.period, self.window)?)
    }

    pub fn service(&self) -> anyhow::Result<VerificationService> {
        Ok(VerificationService::new(&self.issuer, self.totp()?).with_secret_bytes(self.secret_bytes)?)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        None => Ok(None),
    }
}
