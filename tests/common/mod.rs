#![allow(dead_code)]

use std::sync::Arc;

use order_tracker::{
    config::AppConfig,
    db::{self, DbPool},
    models::{Carrier, Order, OrderStatus, ServiceType, Shipment, ShipmentStatus},
    services::{OrderService, ShipmentService},
};
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, Statement};

/// Tracking code whose inserted row is hidden by [`TestApp::install_hiding_triggers`].
pub const HIDDEN_TRACKING_CODE: &str = "TRK-HIDDEN";
/// Order number whose inserted row is hidden by [`TestApp::install_hiding_triggers`].
pub const HIDDEN_ORDER_NUMBER: &str = "P-HIDDEN";

/// Services over a fresh in-memory SQLite database.
pub struct TestApp {
    pub pool: Arc<DbPool>,
    pub orders: OrderService,
    pub shipments: ShipmentService,
}

impl TestApp {
    pub async fn new() -> Self {
        let cfg = AppConfig::for_database("sqlite::memory:");
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to open in-memory database");
        db::init_schema(&pool).await.expect("failed to create schema");

        let pool = Arc::new(pool);
        Self {
            orders: OrderService::new(pool.clone()),
            shipments: ShipmentService::new(pool.clone()),
            pool,
        }
    }

    /// Runs a `SELECT COUNT(*) AS n ...` statement, soft-deleted rows included.
    pub async fn count(&self, sql: &str) -> i64 {
        let backend = self.pool.get_database_backend();
        let row = self
            .pool
            .query_one(Statement::from_string(backend, sql.to_string()))
            .await
            .expect("count query failed")
            .expect("count query returned no row");
        row.try_get::<i64>("", "n").expect("count column missing")
    }

    pub async fn count_orders(&self) -> i64 {
        self.count("SELECT COUNT(*) AS n FROM orders").await
    }

    pub async fn count_shipments(&self) -> i64 {
        self.count("SELECT COUNT(*) AS n FROM shipments").await
    }

    pub async fn execute(&self, sql: &str) {
        self.pool
            .execute_unprepared(sql)
            .await
            .expect("statement failed");
    }

    /// Flags rows inserted with a hidden key as deleted in the same statement,
    /// so the read-back of the new id fails.
    pub async fn install_hiding_triggers(&self) {
        self.execute(&format!(
            "CREATE TRIGGER hide_new_shipment AFTER INSERT ON shipments \
             WHEN NEW.tracking_code = '{HIDDEN_TRACKING_CODE}' \
             BEGIN UPDATE shipments SET deleted = 1 WHERE id = NEW.id; END"
        ))
        .await;
        self.execute(&format!(
            "CREATE TRIGGER hide_new_order AFTER INSERT ON orders \
             WHEN NEW.order_number = '{HIDDEN_ORDER_NUMBER}' \
             BEGIN UPDATE orders SET deleted = 1 WHERE id = NEW.id; END"
        ))
        .await;
    }
}

pub fn shipment(tracking_code: &str) -> Shipment {
    Shipment::new(
        Carrier::Oca,
        ServiceType::Standard,
        dec!(10.50),
        ShipmentStatus::Preparing,
    )
    .with_tracking_code(tracking_code)
}

pub fn order(order_number: &str) -> Order {
    Order::new(order_number, dec!(99.90), OrderStatus::New)
}
