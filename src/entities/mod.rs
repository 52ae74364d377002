//! Row models for the two tables and the mapping to and from domain records.
//!
//! Enum columns hold the variant name as text. Reading an unknown name is a
//! [`ServiceError::CorruptRecord`], never a silent default.

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::errors::ServiceError;

pub mod order;
pub mod shipment;

/// Scale of the money columns.
const MONEY_SCALE: u32 = 2;

fn decode_enum<E: FromStr>(table: &str, column: &str, id: i32, raw: &str) -> Result<E, ServiceError> {
    E::from_str(raw).map_err(|_| {
        ServiceError::CorruptRecord(format!(
            "{table}.{column} of row {id} holds unknown value '{raw}'"
        ))
    })
}

fn require<T>(kind: &str, field: &str, value: Option<T>) -> Result<T, ServiceError> {
    value.ok_or_else(|| ServiceError::invalid(format!("{kind} {field} is required")))
}

fn decode_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_SCALE)
}
