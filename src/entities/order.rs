use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};

use super::{decode_enum, decode_money, require};
use crate::errors::ServiceError;
use crate::models::{Order, Record};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub deleted: bool,
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub customer_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
    pub status: String,
    pub shipment_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shipment::Entity",
        from = "Column::ShipmentId",
        to = "super::shipment::Column::Id"
    )]
    Shipment,
}

impl Related<super::shipment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shipment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Order {
    type Error = ServiceError;

    fn try_from(row: Model) -> Result<Self, Self::Error> {
        Ok(Order {
            record: Record::stored(row.id, row.deleted),
            status: Some(decode_enum("orders", "status", row.id, &row.status)?),
            order_number: row.order_number,
            order_date: row.order_date,
            customer_name: row.customer_name,
            total: decode_money(row.total),
            shipment_id: row.shipment_id,
        })
    }
}

impl ActiveModel {
    pub fn from_domain(order: &Order) -> Result<Self, ServiceError> {
        let status = require("order", "status", order.status)?;

        Ok(Self {
            id: NotSet,
            deleted: Set(false),
            order_number: Set(order.order_number.clone()),
            order_date: Set(order.order_date),
            customer_name: Set(order.customer_name.clone()),
            total: Set(order.total),
            status: Set(status.to_string()),
            shipment_id: Set(order.shipment_id),
        })
    }
}
