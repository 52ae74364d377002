use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DatabaseTransaction};
use std::sync::Arc;

use crate::db::transaction;
use crate::errors::ServiceError;
use crate::models::{assign_id, Persisted};

pub mod order_repository;
pub mod shipment_repository;

pub use order_repository::OrderRepository;
pub use shipment_repository::ShipmentRepository;

/// Repository trait for common database operations
pub trait Repository {
    fn get_db(&self) -> &DatabaseConnection;
}

#[derive(Debug, Clone)]
pub struct BaseRepository {
    db: Arc<DatabaseConnection>,
}

impl BaseRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

impl Repository for BaseRepository {
    fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}

/// Write and read capabilities shared by the order and shipment repositories.
///
/// Writes only ever touch active rows and reads only ever return them.
#[async_trait]
pub trait EntityRepository<T>: Repository + Send + Sync
where
    T: Persisted + Clone + Send + Sync + 'static,
{
    /// Inserts `entity` in a unit of work of its own.
    ///
    /// The id is written back to `entity` only once the insert is committed;
    /// on any failure the unit of work is rolled back and `entity` is left
    /// untouched.
    async fn create(&self, entity: &mut T) -> Result<i32, ServiceError> {
        let txn = transaction::begin(self.get_db()).await?;
        let mut staged = entity.clone();
        let outcome = self.create_in_txn(&mut staged, &txn).await;
        let id = transaction::settle(txn, outcome).await?;
        assign_id(entity, id);
        Ok(id)
    }

    /// Inserts `entity` inside a transaction owned by the caller, which stays
    /// responsible for committing or rolling it back.
    ///
    /// Fails with [`ServiceError::StoreUnavailable`] when the new row cannot be
    /// read back as an active record under its generated id.
    async fn create_in_txn(
        &self,
        entity: &mut T,
        txn: &DatabaseTransaction,
    ) -> Result<i32, ServiceError>;

    /// Rewrites every column of the active row with the entity's id.
    async fn update(&self, entity: &T) -> Result<(), ServiceError>;

    /// Flags the active row with `id` as deleted.
    async fn soft_delete(&self, id: i32) -> Result<(), ServiceError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<T>, ServiceError>;

    /// All active rows in id order.
    async fn find_all(&self) -> Result<Vec<T>, ServiceError>;
}

/// Maps the affected-row count of a targeted write to its outcome.
pub(crate) fn expect_single_row(kind: &str, id: i32, rows_affected: u64) -> Result<(), ServiceError> {
    match rows_affected {
        1 => Ok(()),
        0 => Err(ServiceError::NotFoundOrInactive(format!(
            "no active {kind} with id {id}"
        ))),
        n => Err(ServiceError::ConstraintViolation(format!(
            "{n} {kind} rows matched id {id}"
        ))),
    }
}

/// The generated identity could not be confirmed against the store.
pub(crate) fn identity_not_confirmed(kind: &str, id: i32) -> ServiceError {
    ServiceError::StoreUnavailable(format!(
        "inserted {kind} could not be read back under generated id {id}"
    ))
}
