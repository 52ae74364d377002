use std::{str::FromStr, sync::Arc};

use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use order_tracker::{
    config::{self, AppConfig},
    db::{self, DbPool},
    models::{Carrier, Order, OrderStatus, ServiceType, Shipment, ShipmentStatus},
    services::{OrderService, ShipmentService},
    validation::parse_domain,
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let context = CliContext::initialize().await?;

    let outcome = match cli.command {
        Commands::Shipments(command) => handle_shipments_command(&context, command, cli.json).await,
        Commands::Orders(command) => handle_orders_command(&context, command, cli.json).await,
    };

    context.shutdown().await?;
    outcome
}

#[derive(Parser)]
#[command(name = "order-tracker", about = "Manage orders and their shipments", version)]
struct Cli {
    #[arg(
        long,
        global = true,
        action = ArgAction::SetTrue,
        help = "Render command output as pretty JSON"
    )]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(subcommand)]
    Shipments(ShipmentsCommands),
    #[command(subcommand)]
    Orders(OrdersCommands),
}

#[derive(Subcommand)]
enum ShipmentsCommands {
    Create(CreateShipmentArgs),
    List,
    Get(IdArgs),
    Update(UpdateShipmentArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
enum OrdersCommands {
    Create(CreateOrderArgs),
    CreateWithShipment(CreateOrderWithShipmentArgs),
    List,
    Get(IdArgs),
    Find(FindOrderArgs),
    Update(UpdateOrderArgs),
    Delete(IdArgs),
}

#[derive(Args)]
struct IdArgs {
    #[arg(long, help = "Record identifier")]
    id: i32,
}

#[derive(Args)]
struct ShipmentFields {
    #[arg(long, help = "Carrier tracking code (unique among active shipments)")]
    tracking_code: Option<String>,
    #[arg(long, value_parser = parse_carrier, help = "ANDREANI, OCA or NATIONAL_POST")]
    carrier: Carrier,
    #[arg(long, value_parser = parse_service_type, help = "STANDARD or EXPRESS")]
    service_type: ServiceType,
    #[arg(long, value_parser = parse_decimal, help = "Shipping cost")]
    cost: Decimal,
    #[arg(long, value_parser = parse_date, help = "Dispatch date (YYYY-MM-DD)")]
    dispatch_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date, help = "Estimated delivery date (YYYY-MM-DD)")]
    estimated_date: Option<NaiveDate>,
    #[arg(
        long,
        value_parser = parse_shipment_status,
        default_value = "PREPARING",
        help = "PREPARING, IN_TRANSIT or DELIVERED"
    )]
    shipment_status: ShipmentStatus,
}

impl ShipmentFields {
    fn into_shipment(self) -> Shipment {
        let mut shipment = Shipment::new(self.carrier, self.service_type, self.cost, self.shipment_status)
            .with_dates(self.dispatch_date, self.estimated_date);
        shipment.tracking_code = self.tracking_code;
        shipment
    }
}

#[derive(Args)]
struct CreateShipmentArgs {
    #[command(flatten)]
    fields: ShipmentFields,
}

#[derive(Args)]
struct UpdateShipmentArgs {
    #[arg(long, help = "Shipment identifier")]
    id: i32,
    #[arg(long, help = "New tracking code")]
    tracking_code: Option<String>,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "tracking_code", help = "Remove the tracking code")]
    clear_tracking_code: bool,
    #[arg(long, value_parser = parse_carrier)]
    carrier: Option<Carrier>,
    #[arg(long, value_parser = parse_service_type)]
    service_type: Option<ServiceType>,
    #[arg(long, value_parser = parse_decimal)]
    cost: Option<Decimal>,
    #[arg(long, value_parser = parse_date)]
    dispatch_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    estimated_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_shipment_status)]
    shipment_status: Option<ShipmentStatus>,
}

#[derive(Args)]
struct OrderFields {
    #[arg(long, help = "Order number (unique among active orders)")]
    order_number: String,
    #[arg(long, value_parser = parse_decimal, help = "Order total")]
    total: Decimal,
    #[arg(long, help = "Customer name")]
    customer: Option<String>,
    #[arg(long, value_parser = parse_date, help = "Order date (YYYY-MM-DD)")]
    order_date: Option<NaiveDate>,
    #[arg(
        long,
        value_parser = parse_order_status,
        default_value = "NEW",
        help = "NEW, INVOICED or SHIPPED"
    )]
    order_status: OrderStatus,
}

impl OrderFields {
    fn into_order(self) -> Order {
        let mut order = Order::new(self.order_number, self.total, self.order_status);
        order.customer_name = self.customer;
        order.order_date = self.order_date;
        order
    }
}

#[derive(Args)]
struct CreateOrderArgs {
    #[command(flatten)]
    fields: OrderFields,
    #[arg(long, help = "Existing active shipment to reference")]
    shipment_id: Option<i32>,
}

#[derive(Args)]
struct CreateOrderWithShipmentArgs {
    #[command(flatten)]
    order: OrderFields,
    #[command(flatten)]
    shipment: ShipmentFields,
}

#[derive(Args)]
struct FindOrderArgs {
    #[arg(long, help = "Order number to look up")]
    order_number: String,
}

#[derive(Args)]
struct UpdateOrderArgs {
    #[arg(long, help = "Order identifier")]
    id: i32,
    #[arg(long)]
    order_number: Option<String>,
    #[arg(long, value_parser = parse_decimal)]
    total: Option<Decimal>,
    #[arg(long)]
    customer: Option<String>,
    #[arg(long, value_parser = parse_date)]
    order_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_order_status)]
    order_status: Option<OrderStatus>,
    #[arg(long, help = "Reference an existing active shipment")]
    shipment_id: Option<i32>,
    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "shipment_id", help = "Drop the shipment reference")]
    clear_shipment: bool,
}

struct CliContext {
    _config: AppConfig,
    db: Arc<DbPool>,
}

impl CliContext {
    async fn initialize() -> Result<Self> {
        let config = config::load_config().context("failed to load application config")?;
        config::init_tracing(config.log_level(), config.log_json);

        let db_pool = db::establish_connection_from_app_config(&config)
            .await
            .context("failed to connect to database")?;
        db::check_connection(&db_pool)
            .await
            .context("database did not answer")?;
        if config.auto_init_schema {
            db::init_schema(&db_pool)
                .await
                .context("failed to initialise schema")?;
        }
        debug!(target: "order_tracker_cli", environment = %config.environment, "context ready");

        Ok(Self {
            _config: config,
            db: Arc::new(db_pool),
        })
    }

    async fn shutdown(self) -> Result<()> {
        match Arc::try_unwrap(self.db) {
            Ok(pool) => db::close_pool(pool)
                .await
                .context("failed to close database pool"),
            Err(_) => Ok(()),
        }
    }

    fn shipment_service(&self) -> ShipmentService {
        ShipmentService::new(self.db.clone())
    }

    fn order_service(&self) -> OrderService {
        OrderService::new(self.db.clone())
    }

    /// The reference must point at an active shipment before an order stores it.
    async fn ensure_active_shipment(&self, id: i32) -> Result<()> {
        self.shipment_service()
            .get_by_id(id)
            .await
            .context("failed to look up shipment")?
            .map(|_| ())
            .ok_or_else(|| anyhow!("shipment {id} not found or inactive"))
    }
}

async fn handle_shipments_command(
    context: &CliContext,
    command: ShipmentsCommands,
    json: bool,
) -> Result<()> {
    let service = context.shipment_service();
    match command {
        ShipmentsCommands::Create(args) => {
            let mut shipment = args.fields.into_shipment();
            service
                .create(&mut shipment)
                .await
                .context("failed to create shipment")?;
            emit_shipment(&shipment, json)
        }
        ShipmentsCommands::List => {
            let shipments = service.list().await.context("failed to list shipments")?;
            if json {
                print_json(&shipments)
            } else {
                if shipments.is_empty() {
                    println!("No active shipments");
                }
                shipments.iter().for_each(render_shipment);
                Ok(())
            }
        }
        ShipmentsCommands::Get(args) => {
            let shipment = service
                .get_by_id(args.id)
                .await
                .context("failed to fetch shipment")?
                .ok_or_else(|| anyhow!("shipment {} not found or inactive", args.id))?;
            emit_shipment(&shipment, json)
        }
        ShipmentsCommands::Update(args) => {
            let mut shipment = service
                .get_by_id(args.id)
                .await
                .context("failed to fetch shipment")?
                .ok_or_else(|| anyhow!("shipment {} not found or inactive", args.id))?;

            if args.clear_tracking_code {
                shipment.tracking_code = None;
            } else if let Some(code) = args.tracking_code {
                shipment.tracking_code = Some(code);
            }
            if let Some(carrier) = args.carrier {
                shipment.carrier = Some(carrier);
            }
            if let Some(service_type) = args.service_type {
                shipment.service_type = Some(service_type);
            }
            if let Some(cost) = args.cost {
                shipment.cost = cost;
            }
            if args.dispatch_date.is_some() {
                shipment.dispatch_date = args.dispatch_date;
            }
            if args.estimated_date.is_some() {
                shipment.estimated_date = args.estimated_date;
            }
            if let Some(status) = args.shipment_status {
                shipment.status = Some(status);
            }

            service
                .update(&mut shipment)
                .await
                .context("failed to update shipment")?;
            emit_shipment(&shipment, json)
        }
        ShipmentsCommands::Delete(args) => {
            service
                .delete(args.id)
                .await
                .context("failed to delete shipment")?;
            emit_deleted("shipment", args.id, json)
        }
    }
}

async fn handle_orders_command(
    context: &CliContext,
    command: OrdersCommands,
    json: bool,
) -> Result<()> {
    let service = context.order_service();
    match command {
        OrdersCommands::Create(args) => {
            let mut order = args.fields.into_order();
            if let Some(shipment_id) = args.shipment_id {
                context.ensure_active_shipment(shipment_id).await?;
                order.shipment_id = Some(shipment_id);
            }
            service
                .create(&mut order)
                .await
                .context("failed to create order")?;
            emit_order(&order, json)
        }
        OrdersCommands::CreateWithShipment(args) => {
            let mut order = args.order.into_order();
            let mut shipment = args.shipment.into_shipment();
            service
                .create_with_new_shipment(&mut order, &mut shipment)
                .await
                .context("failed to create order with shipment")?;
            if json {
                print_json(&serde_json::json!({ "order": order, "shipment": shipment }))
            } else {
                render_order(&order);
                render_shipment(&shipment);
                Ok(())
            }
        }
        OrdersCommands::List => {
            let orders = service.list().await.context("failed to list orders")?;
            if json {
                print_json(&orders)
            } else {
                if orders.is_empty() {
                    println!("No active orders");
                }
                orders.iter().for_each(render_order);
                Ok(())
            }
        }
        OrdersCommands::Get(args) => {
            let order = service
                .get_by_id(args.id)
                .await
                .context("failed to fetch order")?
                .ok_or_else(|| anyhow!("order {} not found or inactive", args.id))?;
            let shipment = service
                .shipment_of(&order)
                .await
                .context("failed to resolve shipment")?;
            if json {
                print_json(&serde_json::json!({ "order": order, "shipment": shipment }))
            } else {
                render_order(&order);
                if let Some(shipment) = &shipment {
                    render_shipment(shipment);
                }
                Ok(())
            }
        }
        OrdersCommands::Find(args) => {
            let order = service
                .get_by_order_number(&args.order_number)
                .await
                .context("failed to look up order")?
                .ok_or_else(|| anyhow!("no active order numbered '{}'", args.order_number))?;
            emit_order(&order, json)
        }
        OrdersCommands::Update(args) => {
            let mut order = service
                .get_by_id(args.id)
                .await
                .context("failed to fetch order")?
                .ok_or_else(|| anyhow!("order {} not found or inactive", args.id))?;

            if let Some(number) = args.order_number {
                order.order_number = number;
            }
            if let Some(total) = args.total {
                order.total = total;
            }
            if args.customer.is_some() {
                order.customer_name = args.customer;
            }
            if args.order_date.is_some() {
                order.order_date = args.order_date;
            }
            if let Some(status) = args.order_status {
                order.status = Some(status);
            }
            if args.clear_shipment {
                order.shipment_id = None;
            } else if let Some(shipment_id) = args.shipment_id {
                context.ensure_active_shipment(shipment_id).await?;
                order.shipment_id = Some(shipment_id);
            }

            service
                .update(&mut order)
                .await
                .context("failed to update order")?;
            emit_order(&order, json)
        }
        OrdersCommands::Delete(args) => {
            service
                .delete(args.id)
                .await
                .context("failed to delete order")?;
            emit_deleted("order", args.id, json)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn emit_shipment(shipment: &Shipment, json: bool) -> Result<()> {
    if json {
        print_json(shipment)
    } else {
        render_shipment(shipment);
        Ok(())
    }
}

fn emit_order(order: &Order, json: bool) -> Result<()> {
    if json {
        print_json(order)
    } else {
        render_order(order);
        Ok(())
    }
}

fn emit_deleted(kind: &str, id: i32, json: bool) -> Result<()> {
    if json {
        print_json(&serde_json::json!({ "kind": kind, "id": id, "deleted": true }))
    } else {
        println!("Deleted {kind} {id}");
        Ok(())
    }
}

fn render_shipment(shipment: &Shipment) {
    println!(
        "- Shipment {} • tracking {} • {} {} • cost {} • status {}",
        display_id(shipment.id()),
        shipment.tracking_code.as_deref().unwrap_or("-"),
        display_opt(shipment.carrier.as_ref()),
        display_opt(shipment.service_type.as_ref()),
        shipment.cost,
        display_opt(shipment.status.as_ref()),
    );
}

fn render_order(order: &Order) {
    println!(
        "- Order {} • number {} • customer {} • total {} • status {} • shipment {}",
        display_id(order.id()),
        order.order_number,
        order.customer_name.as_deref().unwrap_or("-"),
        order.total,
        display_opt(order.status.as_ref()),
        display_id(order.shipment_id),
    );
}

fn display_id(id: Option<i32>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

fn display_opt<T: AsRef<str>>(value: Option<&T>) -> &str {
    value.map(|v| v.as_ref()).unwrap_or("-")
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw.trim()).map_err(|_| format!("invalid decimal '{raw}'"))
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn parse_carrier(raw: &str) -> Result<Carrier, String> {
    parse_domain("carrier", raw).map_err(|e| e.to_string())
}

fn parse_service_type(raw: &str) -> Result<ServiceType, String> {
    parse_domain("service_type", raw).map_err(|e| e.to_string())
}

fn parse_shipment_status(raw: &str) -> Result<ShipmentStatus, String> {
    parse_domain("status", raw).map_err(|e| e.to_string())
}

fn parse_order_status(raw: &str) -> Result<OrderStatus, String> {
    parse_domain("status", raw).map_err(|e| e.to_string())
}
