//! Errors for repository operations that validate as well as persist.

use rentora_core::error::CoreError;

/// A write rejected either by the database or by a domain rule checked
/// inside the same transaction.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}
