//! Field rules gating every write.
//!
//! The derive-level rules live on the models; the functions here add the
//! checks the derive cannot express and translate failures into
//! [`ServiceError::InvalidArgument`].

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::Decimal;
use strum::VariantNames;
use validator::{Validate, ValidationError};

use crate::errors::ServiceError;
use crate::models::{Order, Shipment};

pub const ORDER_NUMBER_MAX_LEN: usize = 20;
pub const TRACKING_CODE_MAX_LEN: usize = 40;
const MONEY_SCALE: u32 = 2;

fn rule(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

/// Amounts are stored in `DECIMAL(_, 2)` columns, so a third decimal place
/// would be lost on write.
pub fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(rule("money_negative", "Amount cannot be negative"));
    }
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(rule(
            "money_scale",
            "Amount cannot have more than 2 decimal places",
        ));
    }
    Ok(())
}

pub fn validate_order_number(order_number: &str) -> Result<(), ValidationError> {
    let trimmed = order_number.trim();
    if trimmed.is_empty() {
        return Err(rule("order_number_required", "Order number is required"));
    }
    if trimmed.chars().count() > ORDER_NUMBER_MAX_LEN {
        return Err(rule(
            "order_number_length",
            "Order number cannot exceed 20 characters",
        ));
    }
    Ok(())
}

pub fn validate_tracking_code(tracking_code: &str) -> Result<(), ValidationError> {
    if tracking_code.trim().chars().count() > TRACKING_CODE_MAX_LEN {
        return Err(rule(
            "tracking_code_length",
            "Tracking code cannot exceed 40 characters",
        ));
    }
    Ok(())
}

pub fn validate_shipment_dates(shipment: &Shipment) -> Result<(), ValidationError> {
    match (shipment.dispatch_date, shipment.estimated_date) {
        (Some(dispatch), Some(estimated)) if estimated < dispatch => Err(rule(
            "estimated_before_dispatch",
            "Estimated date cannot precede the dispatch date",
        )),
        _ => Ok(()),
    }
}

/// Parses a textual enum value, as typed by a user or read from a column.
pub fn parse_domain<E>(field: &str, raw: &str) -> Result<E, ServiceError>
where
    E: FromStr + VariantNames,
{
    let normalized = raw.trim().to_ascii_uppercase();
    E::from_str(&normalized).map_err(|_| {
        ServiceError::invalid(format!(
            "{field}: '{raw}' is not one of {}",
            E::VARIANTS.join(", ")
        ))
    })
}

/// Re-checks that a typed enum value still names a member of its domain.
fn ensure_domain<E>(field: &str, value: Option<&E>) -> Result<(), ServiceError>
where
    E: AsRef<str> + FromStr + VariantNames,
{
    if let Some(value) = value {
        parse_domain::<E>(field, value.as_ref())?;
    }
    Ok(())
}

pub fn validate_shipment(shipment: &Shipment) -> Result<(), ServiceError> {
    shipment.validate()?;
    ensure_domain("carrier", shipment.carrier.as_ref())?;
    ensure_domain("service_type", shipment.service_type.as_ref())?;
    ensure_domain("status", shipment.status.as_ref())?;
    Ok(())
}

pub fn validate_order(order: &Order) -> Result<(), ServiceError> {
    order.validate()?;
    ensure_domain("status", order.status.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Carrier, OrderStatus, ServiceType, ShipmentStatus};
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn shipment() -> Shipment {
        Shipment::new(
            Carrier::Oca,
            ServiceType::Standard,
            dec!(10.50),
            ShipmentStatus::Preparing,
        )
        .with_tracking_code("TRK1")
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn accepts_a_complete_shipment() {
        assert!(validate_shipment(&shipment()).is_ok());
    }

    #[rstest]
    #[case::no_carrier(Shipment { carrier: None, ..shipment() })]
    #[case::no_service_type(Shipment { service_type: None, ..shipment() })]
    #[case::no_status(Shipment { status: None, ..shipment() })]
    #[case::negative_cost(Shipment { cost: dec!(-0.01), ..shipment() })]
    #[case::three_decimals(Shipment { cost: dec!(1.005), ..shipment() })]
    #[case::long_tracking(Shipment { tracking_code: Some("T".repeat(41)), ..shipment() })]
    fn rejects_invalid_shipments(#[case] invalid: Shipment) {
        assert_matches!(validate_shipment(&invalid), Err(ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn tracking_code_length_ignores_surrounding_whitespace() {
        let padded = format!("  {}  ", "T".repeat(TRACKING_CODE_MAX_LEN));
        assert!(validate_tracking_code(&padded).is_ok());
        let s = Shipment { tracking_code: Some(padded), ..shipment() };
        assert!(validate_shipment(&s).is_ok());
    }

    #[test]
    fn estimated_date_may_equal_dispatch_date() {
        let s = shipment().with_dates(Some(date(2024, 3, 1)), Some(date(2024, 3, 1)));
        assert!(validate_shipment(&s).is_ok());

        let s = shipment().with_dates(None, Some(date(2020, 1, 1)));
        assert!(validate_shipment(&s).is_ok());
    }

    #[test]
    fn estimated_before_dispatch_is_rejected_even_with_other_errors() {
        let s = Shipment {
            carrier: None,
            ..shipment().with_dates(Some(date(2024, 3, 2)), Some(date(2024, 3, 1)))
        };
        let err = validate_shipment(&s).unwrap_err();
        assert_matches!(&err, ServiceError::InvalidArgument(msg) if msg.contains("Estimated date cannot precede"));
    }

    #[test]
    fn trailing_zeros_do_not_count_as_precision() {
        assert!(validate_money(&dec!(10.500)).is_ok());
        assert!(validate_money(&Decimal::ZERO).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("P-000000000000000000001")]
    fn rejects_bad_order_numbers(#[case] number: &str) {
        let order = Order::new(number, dec!(1), OrderStatus::New);
        assert_matches!(validate_order(&order), Err(ServiceError::InvalidArgument(_)));
    }

    #[rstest]
    #[case::at_limit(120, true)]
    #[case::over_limit(121, false)]
    fn customer_name_is_capped_at_120_characters(#[case] len: usize, #[case] accepted: bool) {
        let order = Order::new("P-0001", dec!(1), OrderStatus::New).with_customer("ñ".repeat(len));
        assert_eq!(validate_order(&order).is_ok(), accepted);
    }

    #[test]
    fn order_requires_status_and_non_negative_total() {
        let order = Order {
            status: None,
            ..Order::new("P-0001", dec!(1), OrderStatus::New)
        };
        assert!(validate_order(&order).is_err());

        let order = Order::new("P-0001", dec!(-5), OrderStatus::New);
        assert!(validate_order(&order).is_err());

        let order = Order::new("  P-0001  ", dec!(0), OrderStatus::Shipped);
        assert!(validate_order(&order).is_ok());
    }

    #[test]
    fn parses_user_text_into_enum_domains() {
        assert_eq!(parse_domain::<Carrier>("carrier", " national_post ").unwrap(), Carrier::NationalPost);
        assert_eq!(parse_domain::<OrderStatus>("status", "invoiced").unwrap(), OrderStatus::Invoiced);
        let err = parse_domain::<Carrier>("carrier", "FEDEX").unwrap_err();
        assert_matches!(err, ServiceError::InvalidArgument(msg) if msg.contains("ANDREANI, OCA, NATIONAL_POST"));
    }
}
