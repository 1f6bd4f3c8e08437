//! Order placement: validation, totals, stock decrements, cart teardown.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal::prelude::RoundingStrategy;

use creamline_core::{OrderStatus, UserId};
use creamline_integration_tests::{TestContext, valid_checkout_form};
use creamline_store::checkout::CheckoutError;
use creamline_store::datastore::DataService;

#[tokio::test]
async fn placed_order_snapshots_cart_and_totals() {
    let ctx = TestContext::new();
    let milk = ctx.seed_product("Whole Milk 1l", 129, 50).await;
    let butter = ctx.seed_product("Butter 250g", 349, 20).await;

    let user = UserId::generate();
    let mut session = ctx.session(user).unwrap();
    session.add(&milk, 4).unwrap();
    session.add(&butter, 2).unwrap();
    let totals = session.totals();

    let placed = ctx
        .checkout
        .place_order(&mut session, &valid_checkout_form())
        .await
        .unwrap();
    placed.stock_sync.await.unwrap();

    let order = ctx.data.get_order(placed.order_id).await.unwrap();
    assert_eq!(order.user_id, user);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.subtotal, totals.subtotal);
    assert_eq!(order.tax, totals.tax);
    assert_eq!(order.total, totals.total);

    // total == round(subtotal * 1.10, 2)
    let expected = (order.subtotal * Decimal::new(110, 2))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    assert_eq!(order.total, expected);

    // The cart is gone, locally and remotely.
    assert!(session.is_empty());

    // Stock went down by the ordered quantities.
    assert_eq!(ctx.data.get_product(milk.id).await.unwrap().quantity, 46);
    assert_eq!(ctx.data.get_product(butter.id).await.unwrap().quantity, 18);
}

#[tokio::test]
async fn order_is_immutable_after_placement() {
    let ctx = TestContext::new();
    let milk = ctx.seed_product("Whole Milk 1l", 129, 50).await;

    let mut session = ctx.session(UserId::generate()).unwrap();
    session.add(&milk, 1).unwrap();
    let placed = ctx
        .checkout
        .place_order(&mut session, &valid_checkout_form())
        .await
        .unwrap();
    placed.stock_sync.await.unwrap();

    let before = ctx.data.get_order(placed.order_id).await.unwrap();

    // Status transitions succeed but never touch the item/total snapshot.
    let after = ctx
        .data
        .set_order_status(placed.order_id, OrderStatus::Processing)
        .await
        .unwrap();
    assert_eq!(after.items, before.items);
    assert_eq!(after.total, before.total);
    assert_eq!(after.status, OrderStatus::Processing);

    // Backward transitions are rejected.
    let err = ctx
        .data
        .set_order_status(placed.order_id, OrderStatus::Pending)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        creamline_store::datastore::DataError::InvalidTransition { .. }
    ));
}

#[tokio::test]
async fn oversell_clamps_stock_at_zero() {
    let ctx = TestContext::new();
    // Two shoppers each saw 3 in stock and both cart all of it.
    let gouda = ctx.seed_product("Aged Gouda 300g", 699, 3).await;

    let mut first = ctx.session(UserId::generate()).unwrap();
    first.add(&gouda, 3).unwrap();
    let mut second = ctx.session(UserId::generate()).unwrap();
    second.add(&gouda, 3).unwrap();

    let a = ctx
        .checkout
        .place_order(&mut first, &valid_checkout_form())
        .await
        .unwrap();
    a.stock_sync.await.unwrap();
    let b = ctx
        .checkout
        .place_order(&mut second, &valid_checkout_form())
        .await
        .unwrap();
    b.stock_sync.await.unwrap();

    // Both orders exist (oversell is reconciled out of band), stock floors
    // at zero instead of going negative.
    assert!(ctx.data.get_order(a.order_id).await.is_ok());
    assert!(ctx.data.get_order(b.order_id).await.is_ok());
    assert_eq!(ctx.data.get_product(gouda.id).await.unwrap().quantity, 0);
}

#[tokio::test]
async fn orders_listed_newest_first() {
    let ctx = TestContext::new();
    let milk = ctx.seed_product("Whole Milk 1l", 129, 50).await;
    let user = UserId::generate();

    let mut session = ctx.session(user).unwrap();
    let mut order_ids = Vec::new();
    for _ in 0..3 {
        session.add(&milk, 1).unwrap();
        let placed = ctx
            .checkout
            .place_order(&mut session, &valid_checkout_form())
            .await
            .unwrap();
        placed.stock_sync.await.unwrap();
        order_ids.push(placed.order_id);
    }

    let history = ctx.data.orders_for_user(user).await.unwrap();
    assert_eq!(history.len(), 3);
    for pair in history.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn validation_failure_leaves_cart_untouched() {
    let ctx = TestContext::new();
    let milk = ctx.seed_product("Whole Milk 1l", 129, 50).await;

    let mut session = ctx.session(UserId::generate()).unwrap();
    session.add(&milk, 2).unwrap();

    let mut form = valid_checkout_form();
    form.email = "foo".to_string();
    let err = ctx
        .checkout
        .place_order(&mut session, &form)
        .await
        .unwrap_err();

    let CheckoutError::Validation(errors) = err else {
        panic!("expected validation failure");
    };
    assert!(errors.contains_key("email"));
    assert_eq!(session.entries().len(), 1);
    assert_eq!(ctx.data.get_product(milk.id).await.unwrap().quantity, 50);
}
