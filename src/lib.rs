//! Time-based one-time passwords as a second login factor.
//!
//! The core (`base32`, `secret`, `hotp`, `totp`, `uri`, `service`) is pure and
//! does no I/O. `store`, `database`, `qrcode` and `config` are the
//! collaborators a surrounding application plugs in.
//!
//! ```rust,ignore
//! use twofactor::{MemoryStore, Authenticator, Totp, VerificationService};
//!
//! let auth = Authenticator::new(VerificationService::new("Acme", Totp::default()), MemoryStore::new());
//! let registration = auth.register("alice")?;
//! println!("Scan this: {}", registration.uri);
//!
//! let outcome = auth.verify_login("alice", "123456")?;
//! ```

pub mod base32;
pub mod config;
pub mod database;
pub mod error;
pub mod hotp;
pub mod qrcode;
pub mod secret;
pub mod service;
pub mod store;
pub mod totp;
pub mod uri;

pub use config::Config;
pub use database::{AccountRecord, SqliteStore};
pub use error::{Error, Result};
pub use hotp::{Algorithm, Hotp, hotp};
pub use secret::Secret;
pub use service::{Outcome, Registration, VerificationService};
pub use store::{Authenticator, MemoryStore, SecretStore};
pub use totp::{Totp, totp_code, totp_verify};
pub use uri::{Provisioning, build_uri};
