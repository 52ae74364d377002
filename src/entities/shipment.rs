use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::{NotSet, Set};

use super::{decode_enum, decode_money, require};
use crate::errors::ServiceError;
use crate::models::{Record, Shipment};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shipments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub deleted: bool,
    pub tracking_code: Option<String>,
    pub carrier: String,
    pub service_type: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub cost: Decimal,
    pub dispatch_date: Option<NaiveDate>,
    pub estimated_date: Option<NaiveDate>,
    pub status: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Shipment {
    type Error = ServiceError;

    fn try_from(row: Model) -> Result<Self, Self::Error> {
        Ok(Shipment {
            record: Record::stored(row.id, row.deleted),
            carrier: Some(decode_enum("shipments", "carrier", row.id, &row.carrier)?),
            service_type: Some(decode_enum("shipments", "service_type", row.id, &row.service_type)?),
            status: Some(decode_enum("shipments", "status", row.id, &row.status)?),
            tracking_code: row.tracking_code,
            cost: decode_money(row.cost),
            dispatch_date: row.dispatch_date,
            estimated_date: row.estimated_date,
        })
    }
}

impl ActiveModel {
    /// Column values for an insert or a full update of an active row. Identity
    /// is left to the store.
    pub fn from_domain(shipment: &Shipment) -> Result<Self, ServiceError> {
        let carrier = require("shipment", "carrier", shipment.carrier)?;
        let service_type = require("shipment", "service_type", shipment.service_type)?;
        let status = require("shipment", "status", shipment.status)?;

        Ok(Self {
            id: NotSet,
            deleted: Set(false),
            tracking_code: Set(shipment.tracking_code.clone()),
            carrier: Set(carrier.to_string()),
            service_type: Set(service_type.to_string()),
            cost: Set(shipment.cost),
            dispatch_date: Set(shipment.dispatch_date),
            estimated_date: Set(shipment.estimated_date),
            status: Set(status.to_string()),
        })
    }
}
