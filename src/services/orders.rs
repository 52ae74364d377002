use crate::{
    db::{transaction, DbPool},
    errors::ServiceError,
    models::{require_id, require_positive_id, Order, Persisted, Shipment},
    repositories::{EntityRepository, OrderRepository, Repository, ShipmentRepository},
    validation::{validate_order, validate_shipment},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Service for managing orders and their link to a shipment
#[derive(Clone)]
pub struct OrderService {
    orders: OrderRepository,
    shipments: ShipmentRepository,
}

impl OrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            orders: OrderRepository::new(db_pool.clone()),
            shipments: ShipmentRepository::new(db_pool),
        }
    }

    pub fn repository(&self) -> &OrderRepository {
        &self.orders
    }

    /// Fails with [`ServiceError::DuplicateKey`] when another active order
    /// already carries `order_number`. `current_id` is the order being
    /// updated, or `None` on create.
    ///
    /// The check reads before the caller writes; the store's unique index
    /// still rejects a colliding insert that slips in between.
    pub async fn ensure_order_number_unique(
        &self,
        order_number: &str,
        current_id: Option<i32>,
    ) -> Result<(), ServiceError> {
        let order_number = order_number.trim();
        match self.orders.find_by_order_number(order_number).await? {
            Some(existing) if existing.id() != current_id => {
                Err(ServiceError::DuplicateKey(format!(
                    "order number '{order_number}' is already in use"
                )))
            }
            _ => Ok(()),
        }
    }

    /// Normalizes and validates the order, checks the order number, and
    /// inserts it.
    ///
    /// A `shipment_id` is stored as given. An id that never existed is
    /// rejected by the store; a soft-deleted shipment is not detected.
    #[instrument(skip(self, order), fields(order_number = %order.order_number))]
    pub async fn create(&self, order: &mut Order) -> Result<i32, ServiceError> {
        order.normalize();
        validate_order(order)?;
        self.ensure_order_number_unique(&order.order_number, None).await?;
        let id = self.orders.create(order).await?;
        info!(order_id = id, shipment_id = ?order.shipment_id, "Order created successfully");
        Ok(id)
    }

    /// Persists `shipment` and then `order` referencing it, in one unit of
    /// work. Both ids are written back only after the commit; if either
    /// insert fails neither row remains.
    #[instrument(skip(self, order, shipment), fields(order_number = %order.order_number))]
    pub async fn create_with_new_shipment(
        &self,
        order: &mut Order,
        shipment: &mut Shipment,
    ) -> Result<i32, ServiceError> {
        shipment.normalize();
        order.normalize();
        validate_shipment(shipment)?;
        validate_order(order)?;
        self.ensure_order_number_unique(&order.order_number, None).await?;

        let mut staged_shipment = shipment.clone();
        let mut staged_order = order.clone();

        let txn = transaction::begin(self.orders.get_db()).await?;
        let outcome = async {
            let shipment_id = self.shipments.create_in_txn(&mut staged_shipment, &txn).await?;
            staged_order.shipment_id = Some(shipment_id);
            debug!(shipment_id, "Shipment staged for order");
            self.orders.create_in_txn(&mut staged_order, &txn).await
        }
        .await;
        let id = transaction::settle(txn, outcome).await?;

        *shipment = staged_shipment;
        *order = staged_order;
        info!(order_id = id, shipment_id = ?order.shipment_id, "Order created with new shipment");
        Ok(id)
    }

    /// Normalizes, validates and rewrites every field of an active order,
    /// including its shipment reference.
    #[instrument(skip(self, order), fields(order_id = ?order.id()))]
    pub async fn update(&self, order: &mut Order) -> Result<(), ServiceError> {
        order.normalize();
        validate_order(order)?;
        let id = require_id(order)?;
        self.ensure_order_number_unique(&order.order_number, Some(id)).await?;
        self.orders.update(&*order).await.map_err(|e| {
            warn!(error = %e, order_id = id, "Order update rejected");
            e
        })?;
        info!(order_id = id, "Order updated successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        require_positive_id(Order::KIND, id)?;
        self.orders.soft_delete(id).await?;
        info!(order_id = id, "Order deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Order>, ServiceError> {
        require_positive_id(Order::KIND, id)?;
        self.orders.find_by_id(id).await
    }

    /// Looks up an active order by its number, ignoring surrounding whitespace
    /// in the argument.
    pub async fn get_by_order_number(&self, order_number: &str) -> Result<Option<Order>, ServiceError> {
        let order_number = order_number.trim();
        if order_number.is_empty() {
            return Err(ServiceError::invalid("order number is required"));
        }
        self.orders.find_by_order_number(order_number).await
    }

    pub async fn list(&self) -> Result<Vec<Order>, ServiceError> {
        self.orders.find_all().await
    }

    /// Resolves the order's shipment reference to the active shipment, if any.
    pub async fn shipment_of(&self, order: &Order) -> Result<Option<Shipment>, ServiceError> {
        match order.shipment_id {
            Some(id) => self.shipments.find_by_id(id).await,
            None => Ok(None),
        }
    }
}
