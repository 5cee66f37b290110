use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

use crate::secret::Secret;
use crate::store::SecretStore;

/// Account listing entry. Never carries the secret.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account: String,
    pub issuer: Option<String>,
    pub created_at: String,
}

// SQLite-backed secret storage
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(db_path: &str) -> anyhow::Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account TEXT NOT NULL UNIQUE,
                secret TEXT NOT NULL,
                issuer TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        debug!("opened secret store at {db_path}");
        Ok(Self { conn })
    }

    /// Saves `secret` with the issuer it was provisioned under. Re-provisioning
    /// replaces the secret and resets the creation time.
    pub fn save_with_issuer(
        &self,
        account: &str,
        secret: &Secret,
        issuer: Option<&str>,
    ) -> anyhow::Result<()> {
        let now = chrono::Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO accounts (account, secret, issuer, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(account) DO UPDATE SET
                secret = excluded.secret,
                issuer = COALESCE(excluded.issuer, accounts.issuer),
                created_at = excluded.created_at",
            params![account, secret.to_base32(), issuer, now],
        )?;

        info!("stored secret for account {account}");
        Ok(())
    }

    pub fn list_accounts(&self) -> anyhow::Result<Vec<AccountRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT account, issuer, created_at FROM accounts ORDER BY account")?;

        let records = stmt
            .query_map([], |row| {
                Ok(AccountRecord {
                    account: row.get(0)?,
                    issuer: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }
}

impl SecretStore for SqliteStore {
    fn save(&self, account: &str, secret: &Secret) -> anyhow::Result<()> {
        self.save_with_issuer(account, secret, None)
    }

    fn load(&self, account: &str) -> anyhow::Result<Option<Secret>> {
        let encoded: Option<String> = self
            .conn
            .query_row(
                "SELECT secret FROM accounts WHERE account = ?1",
                [account],
                |row| row.get(0),
            )
            .optional()?;

        match encoded {
            Some(encoded) => Ok(Some(Secret::from_base32(&encoded)?)),
            None => {
                debug!("no secret on file for account {account}");
                Ok(None)
            }
        }
    }

    fn delete(&self, account: &str) -> anyhow::Result<bool> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM accounts WHERE account = ?1", [account])?;

        if rows_affected > 0 {
            info!("deleted account {account}");
        }
        Ok(rows_affected > 0)
    }
}
