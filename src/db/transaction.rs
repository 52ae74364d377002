/*!
 * Unit-of-work helpers
 *
 * A transaction opened with [`begin`] lives until it is handed to [`settle`],
 * which commits on success and rolls back on failure. A transaction that is
 * dropped without being settled is rolled back by sea-orm.
 */

use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::{debug, error, warn};

use crate::errors::ServiceError;

/// Opens a unit of work on its own pooled connection.
pub async fn begin(db: &DatabaseConnection) -> Result<DatabaseTransaction, ServiceError> {
    db.begin().await.map_err(|e| {
        error!(error = %e, "Failed to start transaction");
        ServiceError::from(e)
    })
}

/// Commits `txn` if `outcome` succeeded, otherwise rolls it back and returns
/// the original error.
pub async fn settle<T>(
    txn: DatabaseTransaction,
    outcome: Result<T, ServiceError>,
) -> Result<T, ServiceError> {
    match outcome {
        Ok(value) => {
            txn.commit().await.map_err(|e| {
                error!(error = %e, "Failed to commit transaction");
                ServiceError::from(e)
            })?;
            debug!("Transaction committed");
            Ok(value)
        }
        Err(err) => {
            match txn.rollback().await {
                Ok(()) => warn!(error = %err, "Transaction rolled back"),
                Err(rollback_err) => {
                    error!(error = %err, rollback_error = %rollback_err, "Transaction rollback failed")
                }
            }
            Err(err)
        }
    }
}
