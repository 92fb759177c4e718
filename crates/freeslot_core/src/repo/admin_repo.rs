//! Admin account storage.
//!
//! Only password hashes are stored; verification lives in the admin gate.

use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

pub trait AdminAccountRepository {
    /// Creates or replaces the hash stored for `username`.
    fn upsert_account(&self, username: &str, password_hash: &str) -> RepoResult<()>;
    fn password_hash(&self, username: &str) -> RepoResult<Option<String>>;
}

/// SQLite-backed admin account repository.
pub struct SqliteAdminAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAdminAccountRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl AdminAccountRepository for SqliteAdminAccountRepository<'_> {
    fn upsert_account(&self, username: &str, password_hash: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO admin_accounts (username, password_hash)
             VALUES (?1, ?2)
             ON CONFLICT(username) DO UPDATE SET password_hash = excluded.password_hash;",
            params![username, password_hash],
        )?;
        Ok(())
    }

    fn password_hash(&self, username: &str) -> RepoResult<Option<String>> {
        let hash = self
            .conn
            .query_row(
                "SELECT password_hash FROM admin_accounts WHERE username = ?1;",
                [username],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(hash)
    }
}
