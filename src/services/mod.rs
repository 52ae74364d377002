//! Business rules in front of the repositories.
//!
//! Every write is validated before it reaches the store. Reads are passed
//! through unchanged apart from id guards.

pub mod orders;
pub mod shipments;

pub use orders::OrderService;
pub use shipments::ShipmentService;
