use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
};
use std::sync::Arc;
use tracing::{debug, error, instrument};

use crate::entities::order::{ActiveModel as OrderActiveModel, Column, Entity as OrderEntity};
use crate::errors::ServiceError;
use crate::models::{assign_id, require_id, Order, Persisted};

use super::{expect_single_row, identity_not_confirmed, BaseRepository, EntityRepository, Repository};

/// Repository for order operations
#[derive(Debug, Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find the active order carrying `order_number`, compared verbatim.
    pub async fn find_by_order_number(&self, order_number: &str) -> Result<Option<Order>, ServiceError> {
        OrderEntity::find()
            .filter(Column::OrderNumber.eq(order_number))
            .filter(Column::Deleted.eq(false))
            .one(self.get_db())
            .await?
            .map(Order::try_from)
            .transpose()
    }
}

impl Repository for OrderRepository {
    fn get_db(&self) -> &DatabaseConnection {
        self.base.get_db()
    }
}

#[async_trait]
impl EntityRepository<Order> for OrderRepository {
    #[instrument(skip(self, order, txn), fields(order_number = %order.order_number))]
    async fn create_in_txn(
        &self,
        order: &mut Order,
        txn: &DatabaseTransaction,
    ) -> Result<i32, ServiceError> {
        let model = OrderActiveModel::from_domain(order)?;
        let id = OrderEntity::insert(model)
            .exec(txn)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to insert order");
                ServiceError::from(e)
            })?
            .last_insert_id;

        let stored = OrderEntity::find_by_id(id)
            .filter(Column::Deleted.eq(false))
            .one(txn)
            .await?;
        if stored.is_none() {
            error!(order_id = id, "Inserted order not visible under generated id");
            return Err(identity_not_confirmed(Order::KIND, id));
        }

        assign_id(order, id);
        debug!(order_id = id, shipment_id = ?order.shipment_id, "Order inserted");
        Ok(id)
    }

    #[instrument(skip(self, order), fields(order_id = ?order.id()))]
    async fn update(&self, order: &Order) -> Result<(), ServiceError> {
        let id = require_id(order)?;
        let model = OrderActiveModel::from_domain(order)?;
        let result = OrderEntity::update_many()
            .set(model)
            .filter(Column::Id.eq(id))
            .filter(Column::Deleted.eq(false))
            .exec(self.get_db())
            .await?;
        expect_single_row(Order::KIND, id, result.rows_affected)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i32) -> Result<(), ServiceError> {
        let result = OrderEntity::update_many()
            .col_expr(Column::Deleted, Expr::value(true))
            .filter(Column::Id.eq(id))
            .filter(Column::Deleted.eq(false))
            .exec(self.get_db())
            .await?;
        expect_single_row(Order::KIND, id, result.rows_affected)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        OrderEntity::find_by_id(id)
            .filter(Column::Deleted.eq(false))
            .one(self.get_db())
            .await?
            .map(Order::try_from)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<Order>, ServiceError> {
        OrderEntity::find()
            .filter(Column::Deleted.eq(false))
            .order_by_asc(Column::Id)
            .all(self.get_db())
            .await?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }
}
