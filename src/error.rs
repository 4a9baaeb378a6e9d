use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors surfaced by repository operations.
///
/// Nothing here is retried internally; whether a failure is transient is the
/// caller's call to make.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A repository is already registered under this name (or for this entity).
    #[error("repository `{name}` already exists in registry")]
    DuplicateRegistration { name: String },

    /// A single-result query matched zero rows.
    #[error("no `{entity}` row matched the given predicates")]
    NotFound { entity: String },

    /// A single-result query matched more than one row.
    #[error("more than one `{entity}` row matched the given predicates")]
    Ambiguous { entity: String },

    /// A field name that the entity does not declare.
    #[error("entity `{entity}` has no field `{field}`")]
    InvalidField { entity: String, field: String },

    /// A dynamically supplied value whose kind conflicts with the column type.
    #[error("value for field `{field}` is not compatible with column type `{expected}`")]
    TypeMismatch { field: String, expected: String },

    /// Batch beyond the fixed ceiling; nothing was persisted.
    #[error("batch of {size} exceeds the limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// Unique or foreign-key constraint violation, propagated from the store.
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// Any other database error.
    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg))
            | Some(SqlErr::ForeignKeyConstraintViolation(msg)) => {
                RepositoryError::ConstraintViolation(msg)
            }
            _ => RepositoryError::Database(err),
        }
    }
}

/// Result type alias for repository operations.
pub type RepoResult<T> = Result<T, RepositoryError>;
