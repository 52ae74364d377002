pub mod transaction;

use crate::config::AppConfig;
use crate::entities::{order, shipment};
use crate::errors::ServiceError;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, EntityName, Schema,
};
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Partial unique indexes enforcing business-key uniqueness among active rows.
const ACTIVE_UNIQUE_INDEXES: [&str; 2] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_orders_active_order_number \
     ON orders (order_number) WHERE NOT deleted",
    "CREATE UNIQUE INDEX IF NOT EXISTS ux_shipments_active_tracking_code \
     ON shipments (tracking_code) WHERE NOT deleted",
];

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns [`ServiceError::StoreUnavailable`] if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Configuring database connection"
    );

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    let pool = Database::connect(opt).await.map_err(|e| {
        error!(error = %e, "Database connection establishment failed");
        ServiceError::StoreUnavailable(e.to_string())
    })?;

    info!("Database connection pool established");
    Ok(pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Creates the `shipments` and `orders` tables and their active-row unique
/// indexes when they do not exist yet.
pub async fn init_schema(pool: &DbPool) -> Result<(), ServiceError> {
    let backend = pool.get_database_backend();
    let schema = Schema::new(backend);

    let mut shipments = schema.create_table_from_entity(shipment::Entity);
    shipments.if_not_exists();
    pool.execute(backend.build(&shipments)).await?;

    let mut orders = schema.create_table_from_entity(order::Entity);
    orders.if_not_exists();
    pool.execute(backend.build(&orders)).await?;

    for sql in ACTIVE_UNIQUE_INDEXES {
        pool.execute_unprepared(sql).await?;
    }

    info!(
        shipments = shipment::Entity.table_name(),
        orders = order::Entity.table_name(),
        "Schema ready"
    );
    Ok(())
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    pool.ping().await.map_err(|e| {
        error!(error = %e, "Database connection check failed");
        ServiceError::StoreUnavailable(e.to_string())
    })
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(ServiceError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_pool() -> DbPool {
        let cfg = AppConfig::for_database("sqlite::memory:");
        establish_connection_from_app_config(&cfg)
            .await
            .expect("in-memory sqlite")
    }

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
        assert!(check_connection(&pool).await.is_ok());
        close_pool(pool).await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_store_is_reported_as_unavailable() {
        let cfg = DbConfig {
            url: "postgres://nobody@127.0.0.1:1/none".into(),
            connect_timeout: Duration::from_millis(200),
            acquire_timeout: Duration::from_millis(200),
            min_connections: 0,
            ..Default::default()
        };
        let err = establish_connection_with_config(&cfg).await.unwrap_err();
        assert!(matches!(err, ServiceError::StoreUnavailable(_)));
    }
}
