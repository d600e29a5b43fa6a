use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::error::AppError;

/// Durable blacklist of token ids. Entries are only ever added, except by
/// [`RevocationLedger::purge_expired`], which drops rows for tokens that can no longer
/// pass the expiry check anyway.
#[derive(Clone)]
pub struct RevocationLedger {
    pool: SqlitePool,
}

impl RevocationLedger {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records `jti` as revoked. Revoking the same id twice leaves a single row.
    pub async fn revoke(&self, jti: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO revoked_tokens (jti, revoked_at, expires_at) VALUES (?, ?, ?)
             ON CONFLICT (jti) DO NOTHING",
        )
        .bind(jti)
        .bind(Utc::now())
        .bind(expires_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn is_revoked(&self, jti: &str) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM revoked_tokens WHERE jti = ?")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Deletes entries whose token expired strictly before `now`. A token whose `exp` equals
    /// the current second still passes the expiry check, so its entry has to stay.
    /// Returns how many rows went.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Spawns the periodic purge of expired ledger entries. Call this once at startup.
pub fn spawn_purge_job(ledger: RevocationLedger, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            match ledger.purge_expired(Utc::now()).await {
                Ok(0) => {}
                Ok(purged) => log::info!("purged {} expired revocation entries", purged),
                Err(e) => log::error!("revocation purge failed: {}", e),
            }
        }
    });
}
