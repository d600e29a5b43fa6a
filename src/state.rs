use sqlx::{Sqlite, SqlitePool, Transaction};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::auth::{AuthVerifier, CredentialStore, RevocationLedger, TokenIssuer};
use crate::config::Config;
use crate::error::AppError;

/// Everything a handler needs, built once at startup and shared through `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub credentials: CredentialStore,
    pub verifier: AuthVerifier,
    writer: Arc<Mutex<()>>,
}

/// A read-then-write transaction holding the process-wide writer slot. SQLite admits one
/// writer at a time and a deferred transaction that reads before it writes can fail with
/// `SQLITE_BUSY` when two of them race for the upgrade, so such transactions queue here.
pub struct WriteTx<'a> {
    pub tx: Transaction<'static, Sqlite>,
    _slot: MutexGuard<'a, ()>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        let issuer = TokenIssuer::new(
            &config.jwt_secret,
            config.access_token_ttl,
            config.refresh_token_ttl,
        );
        let ledger = RevocationLedger::new(pool.clone());
        let credentials = CredentialStore::new(pool.clone(), config.bcrypt_cost);
        Self {
            verifier: AuthVerifier::new(issuer, ledger, credentials.clone()),
            credentials,
            pool,
            writer: Arc::new(Mutex::new(())),
        }
    }

    /// Waits for the writer slot, then opens a transaction on the pool.
    pub async fn begin_write(&self) -> Result<WriteTx<'_>, AppError> {
        let slot = self.writer.lock().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTx { tx, _slot: slot })
    }

    pub fn issuer(&self) -> &TokenIssuer {
        self.verifier.issuer()
    }

    pub fn ledger(&self) -> &RevocationLedger {
        self.verifier.ledger()
    }
}
