use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::entities::shipment::{ActiveModel as ShipmentActiveModel, Column, Entity as ShipmentEntity};
use crate::errors::ServiceError;
use crate::models::{assign_id, require_id, Persisted, Shipment};

use super::{expect_single_row, identity_not_confirmed, BaseRepository, EntityRepository, Repository};

/// Repository for shipment rows
#[derive(Debug, Clone)]
pub struct ShipmentRepository {
    base: BaseRepository,
}

impl ShipmentRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

impl Repository for ShipmentRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl EntityRepository<Shipment> for ShipmentRepository {
    #[instrument(skip(self, shipment, txn), fields(tracking_code = ?shipment.tracking_code))]
    async fn create_in_txn(
        &self,
        shipment: &mut Shipment,
        txn: &DatabaseTransaction,
    ) -> Result<i32, ServiceError> {
        let model = ShipmentActiveModel::from_domain(shipment)?;
        let id = ShipmentEntity::insert(model)
            .exec(txn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to insert shipment");
                ServiceError::from(e)
            })?
            .last_insert_id;

        let stored = ShipmentEntity::find_by_id(id)
            .filter(Column::Deleted.eq(false))
            .one(txn)
            .await?;
        if stored.is_none() {
            error!(shipment_id = id, "Inserted shipment not visible under generated id");
            return Err(identity_not_confirmed(Shipment::KIND, id));
        }

        assign_id(shipment, id);
        debug!(shipment_id = id, "Shipment inserted");
        Ok(id)
    }

    #[instrument(skip(self, shipment), fields(shipment_id = ?shipment.id()))]
    async fn update(&self, shipment: &Shipment) -> Result<(), ServiceError> {
        let id = require_id(shipment)?;
        let model = ShipmentActiveModel::from_domain(shipment)?;
        let result = ShipmentEntity::update_many()
            .set(model)
            .filter(Column::Id.eq(id))
            .filter(Column::Deleted.eq(false))
            .exec(self.get_db())
            .await?;
        expect_single_row(Shipment::KIND, id, result.rows_affected)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = ShipmentEntity::update_many()
            .col_expr(Column::Deleted, Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::Deleted.eq(false))
            .exec(self.get_db())
            .await?;
        expect_single_row(Shipment::KIND, id, result.rows_affected)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Shipment>, ServiceError> {
        ShipmentEntity::find_by_id(id)
            .filter(Column::Deleted.eq(false))
            .one(self.get_db())
            .await?
            .map(Shipment::try_from)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Shipment>, ServiceError> {
        ShipmentEntity::find()
            .filter(Column::Deleted.eq(false))
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(Shipment::try_from)
            .collect()
    }
}
