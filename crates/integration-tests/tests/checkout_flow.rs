//! Checkout against an in-process entity API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use bakehouse_core::{CartStore, OrderType, Price};
use bakehouse_integration_tests::{FakeEntityApi, cake, pastry, scratch_cart_path};
use bakehouse_storefront::checkout::{CheckoutError, FulfillmentDetails, Schedule, submit_order};
use bakehouse_storefront::storage::FileStore;
use chrono::{NaiveDate, NaiveTime};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
}

fn details(schedule: Schedule) -> FulfillmentDetails {
    FulfillmentDetails {
        customer_name: "Beatriz".to_string(),
        customer_phone: "+55 21 98888-1111".to_string(),
        notes: None,
        schedule,
    }
}

#[tokio::test]
async fn test_scheduled_order_is_submitted_and_cart_cleared() {
    let path = scratch_cart_path("checkout-scheduled");
    let api = FakeEntityApi::default();

    let mut cart = CartStore::load(FileStore::open(&path));
    cart.add_item(cake("M", 1), |_| false);
    cart.add_item(cake("G", 1), |_| false);

    let order = submit_order(
        &mut cart,
        &api,
        "Order",
        &details(Schedule::Scheduled {
            date: NaiveDate::from_ymd_opt(2026, 10, 25).unwrap(),
        }),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(order.id, "order_1");
    assert_eq!(order.order_type, OrderType::ScheduledOrder);
    assert_eq!(order.total, Price::from_cents(9000));

    let records = api.records.lock().unwrap();
    let (entity, payload) = &records[0];
    assert_eq!(entity, "Order");
    assert_eq!(payload["items"].as_array().unwrap().len(), 2);
    assert_eq!(payload["total"], "90.00");
    assert_eq!(payload["scheduled_date"], "2026-10-25");
    assert_eq!(payload["customer_name"], "Beatriz");
    drop(records);

    assert!(cart.is_empty());
    assert!(CartStore::load(FileStore::open(&path)).is_empty());
}

#[tokio::test]
async fn test_same_day_pickup_order() {
    let api = FakeEntityApi::default();
    let mut cart = CartStore::load(FileStore::open(scratch_cart_path("checkout-same-day")));
    cart.add_item(pastry(12), |_| false);

    let order = submit_order(
        &mut cart,
        &api,
        "Order",
        &details(Schedule::SameDay {
            pickup_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
        }),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(order.order_type, OrderType::SameDayPickup);
    assert_eq!(order.total, Price::from_cents(3000));
    assert_eq!(api.created(), 1);
}

#[tokio::test]
async fn test_failed_submission_keeps_persisted_cart() {
    let path = scratch_cart_path("checkout-failure");
    let api = FakeEntityApi::failing();

    let mut cart = CartStore::load(FileStore::open(&path));
    cart.add_item(pastry(3), |_| false);

    let err = submit_order(
        &mut cart,
        &api,
        "Order",
        &details(Schedule::SameDay {
            pickup_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
        }),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CheckoutError::Entity(_)));
    assert_eq!(cart.item_count(), 3);
    assert_eq!(CartStore::load(FileStore::open(&path)).item_count(), 3);
}

#[tokio::test]
async fn test_wrong_schedule_is_rejected_before_submission() {
    let api = FakeEntityApi::default();
    let mut cart = CartStore::load(FileStore::open(scratch_cart_path("checkout-mismatch")));
    cart.add_item(pastry(1), |_| false);

    let err = submit_order(
        &mut cart,
        &api,
        "Order",
        &details(Schedule::Scheduled {
            date: NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
        }),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, CheckoutError::FulfillmentMismatch { .. }));
    assert_eq!(api.created(), 0);
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn test_retry_after_restart_reuses_reference() {
    let path = scratch_cart_path("checkout-retry");
    let pickup = || {
        details(Schedule::SameDay {
            pickup_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        })
    };

    let mut cart = CartStore::load(FileStore::open(&path));
    cart.add_item(pastry(6), |_| false);
    submit_order(&mut cart, &FakeEntityApi::failing(), "Order", &pickup(), today())
        .await
        .unwrap_err();
    let pending = cart.checkout_reference().unwrap().to_string();
    drop(cart);

    let api = FakeEntityApi::default();
    let mut cart = CartStore::load(FileStore::open(&path));
    let order = submit_order(&mut cart, &api, "Order", &pickup(), today())
        .await
        .unwrap();

    assert_eq!(order.reference.to_string(), pending);
    assert_eq!(api.records.lock().unwrap()[0].1["client_reference"], pending.as_str());
    assert_eq!(CartStore::load(FileStore::open(&path)).checkout_reference(), None);
}
