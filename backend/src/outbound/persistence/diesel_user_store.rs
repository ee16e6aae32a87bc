//! PostgreSQL-backed `UserStore` implementation using Diesel ORM.
//!
//! Email uniqueness is enforced by the database; a unique violation on insert
//! is the duplicate signal, so concurrent registrations for one address race
//! safely.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserStore, UserStoreError};
use crate::domain::{CredentialRecord, NewUser, PasswordHash, UserId, UserIdentity};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserStore`] port.
#[derive(Clone)]
pub struct DieselUserStore {
    pool: DbPool,
}

impl DieselUserStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserStoreError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserStoreError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            UserStoreError::duplicate_email()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserStoreError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserStoreError::query("database query error"),
        _ => UserStoreError::query("database error"),
    }
}

fn row_to_record(row: UserRow) -> Result<CredentialRecord, UserStoreError> {
    let id = UserId::new(row.id)
        .map_err(|err| UserStoreError::query(format!("corrupt users row: {err}")))?;
    let identity = UserIdentity::new(
        id,
        NewUser {
            username: row.username,
            email: row.email,
            role: row.role,
        },
        row.created_at,
    );
    Ok(CredentialRecord {
        identity,
        password_hash: PasswordHash::new(row.password_hash),
    })
}

#[async_trait]
impl UserStore for DieselUserStore {
    async fn create_user(
        &self,
        draft: &NewUser,
        password_hash: &PasswordHash,
    ) -> Result<UserIdentity, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let new_row = NewUserRow {
            username: &draft.username,
            email: &draft.email,
            password_hash: password_hash.as_str(),
            role: &draft.role,
        };

        let row: UserRow = diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        row_to_record(row).map(|record| record.identity)
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<CredentialRecord>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        row.map(row_to_record).transpose()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, UserStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.get()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row
            .map(row_to_record)
            .transpose()?
            .map(|record| record.identity))
    }
}
