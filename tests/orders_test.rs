mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::{order, TestApp, HIDDEN_ORDER_NUMBER};
use order_tracker::{
    models::{Order, OrderStatus},
    ServiceError,
};
use rstest::rstest;
use rust_decimal_macros::dec;

#[tokio::test]
async fn created_order_reads_back_equal_in_every_field() {
    let app = TestApp::new().await;
    let mut o = Order::new("P-0001", dec!(99.90), OrderStatus::Invoiced)
        .with_customer("Ana Pérez")
        .with_order_date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());

    let id = app.orders.create(&mut o).await.unwrap();
    assert!(id > 0);
    assert_eq!(o.id(), Some(id));

    let stored = app.orders.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(stored, o);
    assert_eq!(stored.shipment_id, None);
}

#[tokio::test]
async fn duplicate_order_number_is_rejected_before_writing() {
    let app = TestApp::new().await;
    app.orders.create(&mut order("P-0001")).await.unwrap();

    let mut again = order("P-0001");
    let err = app.orders.create(&mut again).await.unwrap_err();

    assert_matches!(err, ServiceError::DuplicateKey(msg) if msg.contains("P-0001"));
    assert_eq!(again.id(), None);
    assert_eq!(
        app.count("SELECT COUNT(*) AS n FROM orders WHERE order_number = 'P-0001'").await,
        1
    );
}

#[tokio::test]
async fn padded_order_number_collides_with_the_trimmed_one() {
    let app = TestApp::new().await;
    app.orders.create(&mut order("P-0001")).await.unwrap();

    let mut padded = order(" P-0001 ");
    assert_matches!(
        app.orders.create(&mut padded).await,
        Err(ServiceError::DuplicateKey(msg)) if msg.contains("'P-0001'")
    );
    assert_eq!(app.count_orders().await, 1);
}

#[tokio::test]
async fn order_number_is_stored_trimmed() {
    let app = TestApp::new().await;
    let mut o = order("  P-0001\t").with_customer("  ");
    let id = app.orders.create(&mut o).await.unwrap();
    assert_eq!(o.order_number, "P-0001");
    assert_eq!(o.customer_name, None);

    let found = app.orders.get_by_order_number(" P-0001 ").await.unwrap().unwrap();
    assert_eq!(found.id(), Some(id));
    assert_eq!(found, o);

    let mut other = order("P-0002");
    app.orders.create(&mut other).await.unwrap();
    other.order_number = " P-0001 ".into();
    assert_matches!(
        app.orders.update(&mut other).await,
        Err(ServiceError::DuplicateKey(_))
    );
}

#[tokio::test]
async fn order_number_is_free_again_after_soft_delete() {
    let app = TestApp::new().await;
    let first = app.orders.create(&mut order("P-0001")).await.unwrap();
    app.orders.delete(first).await.unwrap();

    let mut second = order("P-0001");
    let id = app.orders.create(&mut second).await.unwrap();

    assert_ne!(id, first);
    assert_eq!(app.count_orders().await, 2);
    let found = app.orders.get_by_order_number("P-0001").await.unwrap().unwrap();
    assert_eq!(found.id(), Some(id));
}

#[tokio::test]
async fn soft_deleted_order_disappears_from_reads_only() {
    let app = TestApp::new().await;
    let id = app.orders.create(&mut order("P-0001")).await.unwrap();
    app.orders.create(&mut order("P-0002")).await.unwrap();

    app.orders.delete(id).await.unwrap();

    assert_eq!(app.orders.get_by_id(id).await.unwrap(), None);
    assert_eq!(app.orders.get_by_order_number("P-0001").await.unwrap(), None);
    let remaining: Vec<_> = app
        .orders
        .list()
        .await
        .unwrap()
        .into_iter()
        .map(|o| o.order_number)
        .collect();
    assert_eq!(remaining, ["P-0002"]);
    assert_eq!(
        app.count(&format!("SELECT COUNT(*) AS n FROM orders WHERE id = {id} AND deleted")).await,
        1
    );
}

#[tokio::test]
async fn update_applies_to_active_orders_only() {
    let app = TestApp::new().await;
    let mut o = order("P-0001");
    let id = app.orders.create(&mut o).await.unwrap();

    o.status = Some(OrderStatus::Shipped);
    o.total = dec!(120.05);
    o.customer_name = Some("Luis".into());
    app.orders.update(&mut o).await.unwrap();
    assert_eq!(app.orders.get_by_id(id).await.unwrap().unwrap(), o);

    app.orders.delete(id).await.unwrap();
    o.total = dec!(1.50);
    assert_matches!(
        app.orders.update(&mut o).await,
        Err(ServiceError::NotFoundOrInactive(_))
    );
    assert_matches!(
        app.orders.delete(id).await,
        Err(ServiceError::NotFoundOrInactive(_))
    );
}

#[tokio::test]
async fn update_may_keep_its_own_number_but_not_take_another() {
    let app = TestApp::new().await;
    let mut a = order("P-0001");
    app.orders.create(&mut a).await.unwrap();
    app.orders.create(&mut order("P-0002")).await.unwrap();

    a.total = dec!(5.55);
    app.orders.update(&mut a).await.unwrap();

    a.order_number = "P-0002".into();
    assert_matches!(app.orders.update(&mut a).await, Err(ServiceError::DuplicateKey(_)));

    let stored = app.orders.get_by_id(a.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.order_number, "P-0001");
}

#[tokio::test]
async fn update_of_a_missing_order_is_not_found() {
    let app = TestApp::new().await;
    let mut ghost = order("P-0404");
    ghost.record.id = Some(404);
    assert_matches!(
        app.orders.update(&mut ghost).await,
        Err(ServiceError::NotFoundOrInactive(msg)) if msg.contains("404")
    );
}

#[rstest]
#[case::unsaved(None)]
#[case::zero(Some(0))]
#[case::negative(Some(-7))]
#[tokio::test]
async fn update_requires_a_positive_id(#[case] id: Option<i32>) {
    let app = TestApp::new().await;
    let mut o = order("P-0001");
    o.record.id = id;
    assert_matches!(app.orders.update(&mut o).await, Err(ServiceError::InvalidArgument(_)));
}

#[tokio::test]
async fn validation_runs_before_uniqueness() {
    let app = TestApp::new().await;
    app.orders.create(&mut order("P-0001")).await.unwrap();

    let mut invalid = Order::new("P-0001", dec!(-1.00), OrderStatus::New);
    assert_matches!(
        app.orders.create(&mut invalid).await,
        Err(ServiceError::InvalidArgument(_))
    );
}

#[tokio::test]
async fn lookup_by_order_number_trims_and_rejects_blank_input() {
    let app = TestApp::new().await;
    app.orders.create(&mut order("P-0001")).await.unwrap();

    let found = app.orders.get_by_order_number("  P-0001 ").await.unwrap();
    assert_matches!(found, Some(o) if o.order_number == "P-0001");
    assert_eq!(app.orders.get_by_order_number("P-9999").await.unwrap(), None);
    assert_matches!(
        app.orders.get_by_order_number("   ").await,
        Err(ServiceError::InvalidArgument(_))
    );
}

#[tokio::test]
async fn failed_identity_read_back_rolls_the_order_back() {
    let app = TestApp::new().await;
    app.install_hiding_triggers().await;

    let mut o = order(HIDDEN_ORDER_NUMBER);
    let err = app.orders.create(&mut o).await.unwrap_err();

    assert_matches!(err, ServiceError::StoreUnavailable(_));
    assert_eq!(o.id(), None);
    assert_eq!(app.count_orders().await, 0);
}

#[tokio::test]
async fn reads_reject_non_positive_ids() {
    let app = TestApp::new().await;
    assert_matches!(app.orders.get_by_id(0).await, Err(ServiceError::InvalidArgument(_)));
    assert_matches!(app.orders.delete(0).await, Err(ServiceError::InvalidArgument(_)));
}
