//! Secret persistence and the account-level login facade built on it.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::service::{Outcome, Registration, VerificationService};
use crate::secret::Secret;
use crate::totp::unix_now;

/// Key-value persistence for shared secrets, keyed by account identity.
pub trait SecretStore {
    /// Stores `secret`, replacing any earlier secret for `account`.
    fn save(&self, account: &str, secret: &Secret) -> anyhow::Result<()>;

    /// `None` when no secret is on file.
    fn load(&self, account: &str) -> anyhow::Result<Option<Secret>>;

    fn delete(&self, account: &str) -> anyhow::Result<bool>;
}

#[derive(Default)]
pub struct MemoryStore {
    secrets: RwLock<HashMap<String, Secret>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemoryStore {
    fn save(&self, account: &str, secret: &Secret) -> anyhow::Result<()> {
        let mut secrets = self
            .secrets
            .write()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))?;
        secrets.insert(account.to_string(), secret.clone());
        Ok(())
    }

    fn load(&self, account: &str) -> anyhow::Result<Option<Secret>> {
        let secrets = self
            .secrets
            .read()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))?;
        Ok(secrets.get(account).cloned())
    }

    fn delete(&self, account: &str) -> anyhow::Result<bool> {
        let mut secrets = self
            .secrets
            .write()
            .map_err(|_| anyhow::anyhow!("secret store lock poisoned"))?;
        Ok(secrets.remove(account).is_some())
    }
}

/// Registration and login for accounts, backed by a store handle owned by the caller.
pub struct Authenticator<S> {
    service: VerificationService,
    store: S,
}

impl<S: SecretStore> Authenticator<S> {
    pub fn new(service: VerificationService, store: S) -> Self {
        Self { service, store }
    }

    pub fn service(&self) -> &VerificationService {
        &self.service
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Provisions a fresh secret for `account`. An existing secret is replaced and stops working.
    pub fn register(&self, account: &str) -> anyhow::Result<Registration> {
        let registration = self.service.register(account)?;
        self.store.save(account, &registration.secret)?;
        Ok(registration)
    }

    pub fn verify_login_at(&self, account: &str, candidate: &str, time: u64) -> anyhow::Result<Outcome> {
        let stored = self.store.load(account)?;
        Ok(self.service.verify_login_at(stored.as_ref(), candidate, time))
    }

    pub fn verify_login(&self, account: &str, candidate: &str) -> anyhow::Result<Outcome> {
        self.verify_login_at(account, candidate, unix_now()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totp::Totp;

    fn authenticator() -> Authenticator<MemoryStore> {
        Authenticator::new(VerificationService::new("Acme", Totp::default()), MemoryStore::new())
    }

    #[test]
    fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        let secret = Secret::generate(20).unwrap();

        assert!(store.load("alice").unwrap().is_none());
        store.save("alice", &secret).unwrap();
        assert_eq!(store.load("alice").unwrap(), Some(secret));
        assert!(store.delete("alice").unwrap());
        assert!(!store.delete("alice").unwrap());
        assert!(store.load("alice").unwrap().is_none());
    }

    #[test]
    fn test_register_persists_secret() {
        let auth = authenticator();
        let registration = auth.register("alice").unwrap();
        assert_eq!(auth.store().load("alice").unwrap(), Some(registration.secret));
    }

    #[test]
    fn test_login_against_stored_secret() {
        let auth = authenticator();
        let registration = auth.register("alice").unwrap();
        let now = 1_700_000_000;
        let code = auth.service().totp().code_at(registration.secret.as_bytes(), now);

        assert_eq!(auth.verify_login_at("alice", &code, now).unwrap(), Outcome::Verified);
        assert_eq!(
            auth.verify_login_at("bob", &code, now).unwrap(),
            Outcome::RejectedMissingSecret
        );
    }

    #[test]
    fn test_reprovisioning_invalidates_old_secret() {
        let auth = authenticator();
        let now = 1_700_000_000;
        let old = auth.register("alice").unwrap();
        let new = auth.register("alice").unwrap();
        assert_ne!(old.secret, new.secret);

        let totp = *auth.service().totp();
        let new_code = totp.code_at(new.secret.as_bytes(), now);
        assert_eq!(auth.verify_login_at("alice", &new_code, now).unwrap(), Outcome::Verified);

        let old_code = totp.code_at(old.secret.as_bytes(), now);
        if old_code != new_code {
            assert_eq!(
                auth.verify_login_at("alice", &old_code, now).unwrap(),
                Outcome::RejectedBadCode
            );
        }
    }
}
