//! Postgres-backed credential store.
//!
//! The `accounts.email` unique index is the authoritative duplicate-email
//! guard; SQLSTATE 23505 from a write maps to [`StoreError::DuplicateEmail`].

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Connection, PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::{Account, CredentialStore, NewAccount, ProfileFields, StoreError};
use crate::auth::claims::Role;

const ACCOUNT_COLUMNS: &str = "id, first_name, last_name, email, password_hash, role";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, StoreError> {
    let role: String = row.get("role");
    let role = role
        .parse::<Role>()
        .map_err(|err| anyhow!("unexpected role in accounts row: {err}"))?;
    Ok(Account {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        role,
    })
}

fn query_span(operation: &'static str, statement: &str) -> tracing::Span {
    tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = operation,
        db.statement = statement
    )
}

#[async_trait]
impl CredentialStore for PostgresStore {
    async fn find_by_email(&self, email_normalized: &str) -> Result<Option<Account>, StoreError> {
        let query =
            format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE email = $1");
        let row = sqlx::query(&query)
            .bind(email_normalized)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by email")?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(query_span("SELECT", &query))
            .await
            .context("failed to look up account by id")?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, StoreError> {
        let query = format!(
            r"
            INSERT INTO accounts (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {ACCOUNT_COLUMNS}
            "
        );
        let row = sqlx::query(&query)
            .bind(&account.first_name)
            .bind(&account.last_name)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .instrument(query_span("INSERT", &query))
            .await;

        match row {
            Ok(row) => account_from_row(&row),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to insert account"),
            )),
        }
    }

    async fn update_profile(&self, id: Uuid, fields: ProfileFields) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts
            SET first_name = $2,
                last_name = $3,
                email = $4,
                updated_at = NOW()
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(&fields.first_name)
            .bind(&fields.last_name)
            .bind(&fields.email)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await;

        match result {
            Ok(result) => Ok(result.rows_affected() > 0),
            Err(err) if is_unique_violation(&err) => Err(StoreError::DuplicateEmail),
            Err(err) => Err(StoreError::Backend(
                anyhow::Error::new(err).context("failed to update account profile"),
            )),
        }
    }

    async fn update_password_hash(
        &self,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, StoreError> {
        let query = r"
            UPDATE accounts
            SET password_hash = $2,
                updated_at = NOW()
            WHERE id = $1
        ";
        let result = sqlx::query(query)
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .instrument(query_span("UPDATE", query))
            .await
            .context("failed to update password hash")?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let span = tracing::info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        let mut conn = self
            .pool
            .acquire()
            .await
            .context("failed to acquire database connection")?;
        conn.ping()
            .instrument(span)
            .await
            .context("failed to ping database")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[derive(Debug)]
    struct FakeDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for FakeDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "fake database error")
        }
    }

    impl StdError for FakeDbError {}

    impl DatabaseError for FakeDbError {
        fn message(&self) -> &'static str {
            "fake database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn unique_violation_matches_sqlstate_only() {
        let err = sqlx::Error::Database(Box::new(FakeDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(FakeDbError {
            code: Some("23503"),
        }));
        assert!(!is_unique_violation(&err));

        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
