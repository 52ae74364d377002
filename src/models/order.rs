use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::{trimmed_or_none, Persisted, Record};
use crate::validation::{validate_money, validate_order_number};

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
pub enum OrderStatus {
    New,
    Invoiced,
    Shipped,
}

/// A customer order.
///
/// `shipment_id` is a weak reference: the order stores the id only and does
/// not own the shipment's lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Order {
    #[serde(flatten)]
    pub record: Record,

    #[validate(custom = "validate_order_number")]
    pub order_number: String,

    pub order_date: Option<NaiveDate>,

    #[validate(length(max = 120, message = "Customer name cannot exceed 120 characters"))]
    pub customer_name: Option<String>,

    #[validate(custom = "validate_money")]
    pub total: Decimal,

    #[validate(required)]
    pub status: Option<OrderStatus>,

    pub shipment_id: Option<i32>,
}

impl Order {
    pub fn new(order_number: impl Into<String>, total: Decimal, status: OrderStatus) -> Self {
        Self {
            record: Record::new(),
            order_number: order_number.into(),
            order_date: None,
            customer_name: None,
            total,
            status: Some(status),
            shipment_id: None,
        }
    }

    pub fn with_customer(mut self, customer_name: impl Into<String>) -> Self {
        self.customer_name = Some(customer_name.into());
        self
    }

    pub fn with_order_date(mut self, order_date: NaiveDate) -> Self {
        self.order_date = Some(order_date);
        self
    }

    pub fn with_shipment(mut self, shipment_id: i32) -> Self {
        self.shipment_id = Some(shipment_id);
        self
    }

    pub fn id(&self) -> Option<i32> {
        self.record.id
    }

    /// Trims the order number and customer name. A blank customer name is
    /// dropped.
    pub fn normalize(&mut self) {
        let trimmed = self.order_number.trim();
        if trimmed.len() != self.order_number.len() {
            self.order_number = trimmed.to_string();
        }
        self.customer_name = trimmed_or_none(self.customer_name.take());
    }

    /// Orders are the same business entity when their order numbers match.
    pub fn same_business_entity(&self, other: &Order) -> bool {
        self.order_number == other.order_number
    }
}

impl Persisted for Order {
    const KIND: &'static str = "order";

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }
}
