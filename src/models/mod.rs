//! Domain records for orders and shipments.
//!
//! Both entity types embed a [`Record`] carrying the store-assigned identity and
//! the soft-delete flag. There is no common behaviour beyond that field shape,
//! so the shared logic lives in free helpers over [`Persisted`].

use serde::{Deserialize, Serialize};

use crate::errors::ServiceError;

pub mod order;
pub mod shipment;

pub use order::{Order, OrderStatus};
pub use shipment::{Carrier, ServiceType, Shipment, ShipmentStatus};

/// Identity and lifecycle state shared by every persisted record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unset until the first successful insert.
    pub id: Option<i32>,
    pub deleted: bool,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn stored(id: i32, deleted: bool) -> Self {
        Self {
            id: Some(id),
            deleted,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.deleted
    }
}

/// Access to the embedded [`Record`] of an entity.
pub trait Persisted {
    const KIND: &'static str;

    fn record(&self) -> &Record;
    fn record_mut(&mut self) -> &mut Record;
}

/// Returns the entity's id, rejecting unset or non-positive identities.
pub fn require_id<T: Persisted>(entity: &T) -> Result<i32, ServiceError> {
    match entity.record().id {
        Some(id) => require_positive_id(T::KIND, id),
        None => Err(ServiceError::invalid(format!(
            "{} id must be set before it can be updated",
            T::KIND
        ))),
    }
}

pub fn require_positive_id(kind: &str, id: i32) -> Result<i32, ServiceError> {
    if id <= 0 {
        return Err(ServiceError::invalid(format!(
            "{kind} id must be greater than 0, got {id}"
        )));
    }
    Ok(id)
}

/// Trims an optional text field, treating a blank value as absent.
pub(crate) fn trimmed_or_none(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

pub(crate) fn assign_id<T: Persisted>(entity: &mut T, id: i32) {
    let record = entity.record_mut();
    record.id = Some(id);
    record.deleted = false;
}
