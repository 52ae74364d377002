use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{require_id, require_positive_id, Persisted, Shipment},
    repositories::{EntityRepository, ShipmentRepository},
    validation::validate_shipment,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Service for managing shipments
#[derive(Clone)]
pub struct ShipmentService {
    repository: ShipmentRepository,
}

impl ShipmentService {
    /// Creates a new shipment service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            repository: ShipmentRepository::new(db_pool),
        }
    }

    pub fn repository(&self) -> &ShipmentRepository {
        &self.repository
    }

    /// Normalizes, validates and inserts a shipment, assigning its id.
    #[instrument(skip(self, shipment), fields(tracking_code = ?shipment.tracking_code))]
    pub async fn create(&self, shipment: &mut Shipment) -> Result<i32, ServiceError> {
        shipment.normalize();
        validate_shipment(shipment)?;
        let id = self.repository.create(shipment).await?;
        info!(shipment_id = id, "Shipment created successfully");
        Ok(id)
    }

    /// Normalizes, validates and rewrites an active shipment.
    #[instrument(skip(self, shipment), fields(shipment_id = ?shipment.id()))]
    pub async fn update(&self, shipment: &mut Shipment) -> Result<(), ServiceError> {
        shipment.normalize();
        validate_shipment(shipment)?;
        let id = require_id(shipment)?;
        self.repository.update(&*shipment).await.map_err(|e| {
            warn!(error = %e, shipment_id = id, "Shipment update rejected");
            e
        })?;
        info!(shipment_id = id, "Shipment updated successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        require_positive_id(Shipment::KIND, id)?;
        self.repository.soft_delete(id).await?;
        info!(shipment_id = id, "Shipment deleted");
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<Shipment>, ServiceError> {
        require_positive_id(Shipment::KIND, id)?;
        self.repository.find_by_id(id).await
    }

    pub async fn list(&self) -> Result<Vec<Shipment>, ServiceError> {
        self.repository.find_all().await
    }
}
