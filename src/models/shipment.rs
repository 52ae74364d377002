use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trimmed_or_none, Persisted, Record};
use crate::validation::{validate_money, validate_shipment_dates, validate_tracking_code};

/// Carrier handling a shipment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Carrier {
    Andreani,
    Oca,
    NationalPost,
}

/// Delivery speed purchased for a shipment.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceType {
    Standard,
    Express,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::VariantNames,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ShipmentStatus {
    Preparing,
    InTransit,
    Delivered,
}

/// A shipment, optionally referenced by one order.
///
/// Required enum fields are `Option`s so that a value assembled from untrusted
/// input can be represented before validation rejects it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_shipment_dates", skip_on_field_errors = false))]
pub struct Shipment {
    #[serde(flatten)]
    pub record: Record,

    #[validate(custom = "validate_tracking_code")]
    pub tracking_code: Option<String>,

    #[validate(required)]
    pub carrier: Option<Carrier>,

    #[validate(required)]
    pub service_type: Option<ServiceType>,

    #[validate(custom = "validate_money")]
    pub cost: Decimal,

    pub dispatch_date: Option<NaiveDate>,

    pub estimated_date: Option<NaiveDate>,

    #[validate(required)]
    pub status: Option<ShipmentStatus>,
}

impl Shipment {
    /// A new, unsaved shipment with every required field set.
    pub fn new(
        carrier: Carrier,
        service_type: ServiceType,
        cost: Decimal,
        status: ShipmentStatus,
    ) -> Self {
        Self {
            record: Record::new(),
            tracking_code: None,
            carrier: Some(carrier),
            service_type: Some(service_type),
            cost,
            dispatch_date: None,
            estimated_date: None,
            status: Some(status),
        }
    }

    pub fn with_tracking_code(mut self, tracking_code: impl Into<String>) -> Self {
        self.tracking_code = Some(tracking_code.into());
        self
    }

    pub fn with_dates(
        mut self,
        dispatch_date: Option<NaiveDate>,
        estimated_date: Option<NaiveDate>,
    ) -> Self {
        self.dispatch_date = dispatch_date;
        self.estimated_date = estimated_date;
        self
    }

    pub fn id(&self) -> Option<i32> {
        self.record.id
    }

    /// Trims the tracking code; a blank code means the shipment has none.
    pub fn normalize(&mut self) {
        self.tracking_code = trimmed_or_none(self.tracking_code.take());
    }

    /// Two shipments are the same business entity only when both carry the
    /// same tracking code.
    pub fn same_business_entity(&self, other: &Shipment) -> bool {
        match (&self.tracking_code, &other.tracking_code) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Persisted for Shipment {
    const KIND: &'static str = "shipment";

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
