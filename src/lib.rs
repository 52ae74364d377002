//! Order Tracker Library
//!
//! Orders and shipments kept in a relational store with soft delete, behind a
//! validation layer that guards every write.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod models;
pub mod repositories;
pub mod services;
pub mod validation;

pub use errors::ServiceError;
pub use models::{Carrier, Order, OrderStatus, ServiceType, Shipment, ShipmentStatus};
pub use services::{OrderService, ShipmentService};
