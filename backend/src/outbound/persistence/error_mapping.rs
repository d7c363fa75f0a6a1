//! Mapping from pool and Diesel errors to the domain's store errors.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map pool errors to domain store errors.
pub(crate) fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to domain store errors.
///
/// Unique-key violations become `Conflict`; the services decide what a
/// conflict means for their operation.
pub(crate) fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            StoreError::connection("database connection error")
        }
        DieselError::NotFound => StoreError::query("record not found"),
        _ => StoreError::query("database error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn unique_violations_map_to_conflict() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint",
        ));
        assert!(matches!(mapped, StoreError::Conflict { .. }));
    }

    #[rstest]
    fn closed_connections_map_to_connection() {
        let mapped = map_diesel_error(database_error(
            DatabaseErrorKind::ClosedConnection,
            "server closed the connection",
        ));
        assert!(matches!(mapped, StoreError::Connection { .. }));
    }

    #[rstest]
    fn other_errors_map_to_query() {
        assert!(matches!(
            map_diesel_error(DieselError::NotFound),
            StoreError::Query { .. }
        ));
    }

    #[rstest]
    fn pool_errors_map_to_connection() {
        assert!(matches!(
            map_pool_error(PoolError::checkout("timed out")),
            StoreError::Connection { .. }
        ));
    }
}
