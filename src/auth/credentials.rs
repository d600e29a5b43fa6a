use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::auth::password::{hash_password, verify_password};
use crate::error::AppError;
use crate::models::User;

/// Persists identities and checks passwords against their stored bcrypt hashes.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
    bcrypt_cost: u32,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool, bcrypt_cost: u32) -> Self {
        Self { pool, bcrypt_cost }
    }

    /// Creates an identity. Uniqueness of name and email is enforced by the table's
    /// constraints in the same statement as the insert.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<User, AppError> {
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::BadRequest(
                "Name or Email or Password is required".into(),
            ));
        }

        let password_hash = hash_password(password, self.bcrypt_cost)?;

        sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)
             RETURNING id, name, email, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Duplicate(_) => {
                AppError::Duplicate(format!("User {} is already registered.", name))
            }
            other => other,
        })
    }

    /// Returns the identity when `password` matches the hash stored for `name`.
    /// An unknown name and a wrong password both yield `None`.
    pub async fn verify(&self, name: &str, password: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, password_hash FROM users WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        let Some((id, password_hash)) = row else {
            return Ok(None);
        };
        if !verify_password(password, &password_hash)? {
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Replaces name, email and password of an existing identity inside the caller's
    /// transaction, re-hashing the password.
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let password_hash = hash_password(password, self.bcrypt_cost)?;

        sqlx::query_as::<_, User>(
            "UPDATE users SET name = ?, email = ?, password_hash = ? WHERE id = ?
             RETURNING id, name, email, created_at",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Duplicate(_) => {
                AppError::Duplicate(format!("User {} is already registered.", name))
            }
            other => other,
        })
    }

    /// Whether an identity with this id is still on record.
    pub async fn exists(&self, id: i64) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> CredentialStore {
        CredentialStore::new(db::connect("sqlite::memory:", 1).await.unwrap(), 4)
    }

    #[actix_rt::test]
    async fn test_register_then_verify() {
        let store = store().await;
        let user = store.register("alice", "a@x.com", "pw").await.unwrap();
        assert_eq!(user.name, "alice");

        let verified = store.verify("alice", "pw").await.unwrap().unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[actix_rt::test]
    async fn test_verify_rejects_wrong_password_and_unknown_name() {
        let store = store().await;
        store.register("alice", "a@x.com", "pw").await.unwrap();

        assert!(store.verify("alice", "nope").await.unwrap().is_none());
        assert!(store.verify("bob", "pw").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_password_is_never_stored_in_plaintext() {
        let store = store().await;
        let user = store.register("alice", "a@x.com", "pw").await.unwrap();

        let (stored,): (String,) = sqlx::query_as("SELECT password_hash FROM users WHERE id = ?")
            .bind(user.id)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_ne!(stored, "pw");
        assert!(stored.starts_with("$2"));
    }

    #[actix_rt::test]
    async fn test_duplicate_name_or_email_leaves_no_row() {
        let store = store().await;
        store.register("alice", "a@x.com", "pw").await.unwrap();

        let same_name = store.register("alice", "other@x.com", "pw").await;
        assert!(matches!(same_name, Err(AppError::Duplicate(_))));
        let same_email = store.register("bob", "a@x.com", "pw").await;
        assert!(matches!(same_email, Err(AppError::Duplicate(_))));

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[actix_rt::test]
    async fn test_register_requires_all_fields() {
        let store = store().await;
        for (name, email, password) in [("", "a@x.com", "pw"), ("a", "", "pw"), ("a", "a@x.com", "")] {
            let result = store.register(name, email, password).await;
            assert!(matches!(result, Err(AppError::BadRequest(_))));
        }
    }

    #[actix_rt::test]
    async fn test_update_rehashes_password() {
        let store = store().await;
        let user = store.register("alice", "a@x.com", "pw").await.unwrap();

        let mut tx = store.pool().begin().await.unwrap();
        let updated = store
            .update(&mut tx, user.id, "alice2", "a2@x.com", "new-pw")
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(updated.name, "alice2");
        assert!(store.verify("alice2", "new-pw").await.unwrap().is_some());
        assert!(store.verify("alice2", "pw").await.unwrap().is_none());
    }
}
