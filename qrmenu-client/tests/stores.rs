mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{AYRAN, KOFTE, MockApi, PASSWORD, SLUG, device};
use qrmenu_client::storage::keys;
use qrmenu_client::stores::{
    AuthStore, CartStore, MAX_REPLAY_ATTEMPTS, MenuStore, OrderStore, StaffStore, spawn_polling,
};
use qrmenu_client::{ClientError, OrderSource, OrderStatus, ReportPeriod, Role};
use shared::error::ErrorCode;
use shared::order::{CreateOrderItem, CreateOrderRequest};
use tokio::sync::Mutex;

fn request(table: i32, items: &[(i64, &str, f64, i32)]) -> CreateOrderRequest {
    CreateOrderRequest {
        table_number: Some(table),
        items: items
            .iter()
            .map(|(id, name, price, qty)| CreateOrderItem {
                product_id: *id,
                name: name.to_string(),
                price: *price,
                quantity: *qty,
            })
            .collect(),
        note: None,
        source: None,
    }
}

async fn staff_login(api: &qrmenu_client::ApiClient, email: &str) {
    AuthStore::new(api.clone())
        .login(email, PASSWORD, Some(SLUG))
        .await
        .unwrap();
}

#[tokio::test]
async fn login_persists_session_and_a_401_clears_it() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    let auth = AuthStore::new(dev.api.clone());

    let err = auth.login("garson@kofteci.test", "wrong", Some(SLUG)).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidCredentials));
    assert!(!err.is_transport());
    assert!(!auth.is_authenticated());

    let session = auth.login("Garson@Kofteci.test", PASSWORD, Some(SLUG)).await.unwrap();
    assert_eq!(session.role, Role::Waiter);
    assert_eq!(session.home_path(), "/waiter");
    assert_eq!(auth.session(), Some(session));
    assert!(auth.can_access(&[Role::Waiter, Role::Admin]));
    assert!(!auth.can_access(&[Role::Kitchen]));

    let mut orders = OrderStore::load(dev.api.clone());
    orders.refresh().await.unwrap();
    assert!(orders.is_online());

    mock.revoke_tokens();
    let err = orders.refresh().await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!auth.is_authenticated());
    // a rejected session is not an outage
    assert!(orders.is_online());
}

#[tokio::test]
async fn offline_orders_are_numbered_and_survive_a_reload() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "garson@kofteci.test").await;

    mock.set_down(true);
    let mut store = OrderStore::load(dev.api.clone());
    let first = store
        .create_order(request(3, &[(KOFTE, "Köfte", 180.0, 2)]))
        .await
        .unwrap();
    let second = store
        .create_order(request(4, &[(AYRAN, "Ayran", 25.0, 3)]))
        .await
        .unwrap();

    assert_eq!(first.order_code, "SIP-0001");
    assert_eq!(first.total, 360.0);
    assert_eq!(second.order_code, "SIP-0002");
    assert_eq!(second.table_number(), Some(4));
    assert!(!store.is_online());
    assert_eq!(store.orders()[0].order_code, "SIP-0002");
    assert!(store.is_pending("SIP-0001"));

    // app restart
    let mut store = OrderStore::load(dev.api.clone());
    assert_eq!(store.orders().len(), 2);
    assert_eq!(store.outbox().len(), 2);

    // still unreachable: the local orders stay visible
    assert!(!store.refresh().await.unwrap());
    assert_eq!(store.orders().len(), 2);

    mock.set_down(false);
    store.refresh().await.unwrap();
    assert!(store.is_online());
    assert!(store.outbox().is_empty());
    assert_eq!(mock.orders().len(), 2);
    assert!(store.orders().iter().all(|o| o.order_code.starts_with("ORD-")));

    // the sequence keeps counting after a sync
    mock.set_down(true);
    let third = store
        .create_order(request(3, &[(AYRAN, "Ayran", 25.0, 1)]))
        .await
        .unwrap();
    assert_eq!(third.order_code, "SIP-0003");
}

#[tokio::test]
async fn queued_status_update_is_replayed_on_reconnect() {
    let mock = MockApi::default();
    let url = mock.spawn().await;

    let waiter = device(&url);
    staff_login(&waiter.api, "garson@kofteci.test").await;
    let mut waiter_orders = OrderStore::load(waiter.api.clone());
    let order = waiter_orders
        .create_order(request(2, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap();

    let kitchen = device(&url);
    staff_login(&kitchen.api, "mutfak@kofteci.test").await;
    let mut store = OrderStore::load(kitchen.api.clone());
    store.refresh().await.unwrap();
    assert_eq!(store.kitchen_orders().len(), 1);

    mock.set_down(true);
    let local = store
        .update_status(&order.order_code, OrderStatus::Ready)
        .await
        .unwrap();
    assert_eq!(local.status, OrderStatus::Ready);
    assert_eq!(store.outbox().len(), 1);
    assert_eq!(mock.orders()[0].status, OrderStatus::InKitchen);

    mock.set_down(false);
    store.refresh().await.unwrap();
    assert!(store.outbox().is_empty());
    assert_eq!(mock.orders()[0].status, OrderStatus::Ready);
    assert_eq!(store.ready_orders().len(), 1);
}

#[tokio::test]
async fn rejected_status_update_yields_to_the_server() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "admin@kofteci.test").await;

    let mut store = OrderStore::load(dev.api.clone());
    let order = store
        .create_order(request(5, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap();

    // another device cancels it while this one is offline
    mock.force_status(&order.order_code, OrderStatus::Cancelled);
    mock.set_down(true);
    store
        .update_status(&order.order_code, OrderStatus::Ready)
        .await
        .unwrap();

    mock.set_down(false);
    store.refresh().await.unwrap();
    assert!(store.outbox().is_empty());
    assert_eq!(store.find(&order.order_code).unwrap().status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn role_and_state_machine_are_checked_locally() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "mutfak@kofteci.test").await;

    let waiter = device(&url);
    staff_login(&waiter.api, "garson@kofteci.test").await;
    let order = OrderStore::load(waiter.api.clone())
        .create_order(request(1, &[(AYRAN, "Ayran", 25.0, 1)]))
        .await
        .unwrap();

    let mut store = OrderStore::load(dev.api.clone());
    store.refresh().await.unwrap();
    let err = store
        .update_status(&order.order_code, OrderStatus::Delivered)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::PermissionDenied));
    assert!(store.outbox().is_empty());

    let err = store
        .update_status("ORD-2025-NOPE", OrderStatus::Ready)
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::OrderNotFound));
}

#[tokio::test]
async fn server_rejections_do_not_flip_offline() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    mock.add_table(3);
    let dev = device(&url);
    staff_login(&dev.api, "admin@kofteci.test").await;

    let mut orders = OrderStore::load(dev.api.clone());
    orders
        .create_order(request(3, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap();

    let mut staff = StaffStore::load(dev.api.clone());
    let tables = staff.refresh_tables().await.unwrap();
    assert_eq!(tables.len(), 1);
    let id = tables[0].id.clone();

    let err = staff.delete_table(&id).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TableHasOrders));
    assert!(staff.is_online());

    let err = staff.create_table(3).await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::TableNumberExists));

    staff.create_table(7).await.unwrap();
    assert_eq!(staff.tables().len(), 2);

    // cached list when the server goes away
    mock.set_down(true);
    let mut reloaded = StaffStore::load(dev.api.clone());
    assert_eq!(reloaded.refresh_tables().await.unwrap().len(), 2);
    assert!(!reloaded.is_online());
    assert!(dev.api.storage().contains(keys::TABLES_CACHE));
}

#[tokio::test]
async fn menu_falls_back_to_the_cached_copy() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);

    let mut menu = MenuStore::new(dev.api.clone());
    let loaded = menu.load(SLUG).await.unwrap();
    assert_eq!(loaded.products.len(), 2);
    assert_eq!(menu.groups().len(), 2);

    menu.select_category(Some(11));
    assert_eq!(menu.visible_products().len(), 1);
    assert_eq!(menu.visible_products()[0].name, "Ayran");
    assert_eq!(menu.search("köf").len(), 1);

    let err = menu.load("yok-boyle-bir-yer").await.unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::RestaurantNotFound));
    assert!(menu.is_online());

    mock.set_down(true);
    let mut offline = MenuStore::new(dev.api.clone());
    assert_eq!(offline.load(SLUG).await.unwrap().products.len(), 2);
    assert!(!offline.is_online());
    assert!(offline.load("baska-restoran").await.unwrap_err().is_transport());
}

#[tokio::test]
async fn polling_picks_up_changes_until_dropped() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "mutfak@kofteci.test").await;

    let store = Arc::new(Mutex::new(OrderStore::load(dev.api.clone())));
    let poller = spawn_polling(store.clone(), Duration::from_millis(20));

    let waiter = device(&url);
    staff_login(&waiter.api, "garson@kofteci.test").await;
    OrderStore::load(waiter.api.clone())
        .create_order(request(6, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap();

    let mut seen = false;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        if store.lock().await.kitchen_orders().len() == 1 {
            seen = true;
            break;
        }
    }
    assert!(seen);
    assert!(!poller.is_finished());
    poller.stop();
}

#[tokio::test]
async fn create_the_server_keeps_failing_is_given_up() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "admin@kofteci.test").await;

    let mut store = OrderStore::load(dev.api.clone());
    let served = store
        .create_order(request(2, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap();

    mock.set_down(true);
    let stuck = store
        .create_order(request(3, &[(AYRAN, "Ayran", 25.0, 2)]))
        .await
        .unwrap();
    assert_eq!(stuck.order_code, "SIP-0001");
    store
        .update_status(&served.order_code, OrderStatus::Ready)
        .await
        .unwrap();
    assert_eq!(store.outbox().len(), 2);

    // back up, but every insert fails
    mock.set_down(false);
    mock.fail_creates(true);
    store.refresh().await.unwrap();
    assert!(store.is_online());
    assert_eq!(store.outbox().len(), 1);
    assert!(store.find("SIP-0001").is_some());
    // the update queued behind the failing create went through
    assert_eq!(mock.orders()[0].status, OrderStatus::Ready);

    for _ in 1..MAX_REPLAY_ATTEMPTS {
        store.refresh().await.unwrap();
    }
    assert!(store.outbox().is_empty());
    assert!(store.find("SIP-0001").is_none());
    assert_eq!(store.orders().len(), 1);
    assert_eq!(mock.orders().len(), 1);

    // nothing left to retry after a restart either
    assert!(OrderStore::load(dev.api.clone()).outbox().is_empty());
}

#[tokio::test]
async fn orders_without_a_table_need_a_platform() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "admin@kofteci.test").await;
    let mut store = OrderStore::load(dev.api.clone());

    let courier = store
        .create_order(CreateOrderRequest {
            source: Some(OrderSource::Getir),
            ..request(0, &[(AYRAN, "Ayran", 25.0, 1)])
        })
        .await
        .unwrap();
    assert_eq!(courier.table_number(), None);
    assert_eq!(store.third_party_orders().len(), 1);

    let err = store
        .create_order(CreateOrderRequest {
            source: Some(OrderSource::Trendyol),
            ..request(4, &[(AYRAN, "Ayran", 25.0, 1)])
        })
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidOrderSource));
    assert!(store.is_online());

    // offline orders are held to the same rule
    mock.set_down(true);
    let err = store
        .create_order(request(0, &[(KOFTE, "Köfte", 180.0, 1)]))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::InvalidOrderSource));
    assert!(store.outbox().is_empty());
    assert_eq!(store.orders().len(), 1);
}

#[tokio::test]
async fn slow_poll_does_not_hold_the_store() {
    let mock = MockApi::default();
    let url = mock.spawn().await;
    let dev = device(&url);
    staff_login(&dev.api, "admin@kofteci.test").await;
    mock.slow_order_list(Duration::from_millis(600));

    let store = Arc::new(Mutex::new(OrderStore::load(dev.api.clone())));
    let poller = spawn_polling(store.clone(), Duration::from_secs(5));
    tokio::time::sleep(Duration::from_millis(100)).await;

    // the first poll is still waiting on the server
    let mut guard = tokio::time::timeout(Duration::from_millis(200), store.lock())
        .await
        .expect("store is free while the list is fetched");
    let order = guard
        .create_order(request(1, &[(KOFTE, "Köfte", 180.0, 2)]))
        .await
        .unwrap();
    drop(guard);

    // the stale list must not wipe the order placed meanwhile
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert!(store.lock().await.find(&order.order_code).is_some());
    poller.stop();
}

#[tokio::test]
async fn kofteci_ramiz_table_three() {
    let mock = MockApi::default();
    let url = mock.spawn().await;

    // customer phone
    let phone = device(&url);
    let session = AuthStore::new(phone.api.clone())
        .customer_login(SLUG, 3)
        .await
        .unwrap();
    assert_eq!(session.home_path(), "/menu/kofteci-ramiz?table=3");

    let mut menu = MenuStore::new(phone.api.clone());
    menu.load(SLUG).await.unwrap();
    let mut cart = CartStore::load(phone.api.storage().clone());
    cart.add(menu.product(KOFTE).unwrap()).unwrap();
    cart.add(menu.product(KOFTE).unwrap()).unwrap();
    cart.add(menu.product(AYRAN).unwrap()).unwrap();
    assert_eq!(cart.total(), 385.0);

    let mut phone_orders = OrderStore::load(phone.api.clone());
    let order = cart.checkout(&mut phone_orders, None, None).await.unwrap();
    assert!(cart.is_empty());
    assert_eq!(order.table_number(), Some(3));
    assert_eq!(order.total, 385.0);
    let code = order.order_code.clone();

    // kitchen
    let kitchen = device(&url);
    staff_login(&kitchen.api, "mutfak@kofteci.test").await;
    let mut kitchen_orders = OrderStore::load(kitchen.api.clone());
    kitchen_orders.refresh().await.unwrap();
    assert_eq!(kitchen_orders.kitchen_orders()[0].order_code, code);
    kitchen_orders.update_status(&code, OrderStatus::Ready).await.unwrap();

    // waiter
    let waiter = device(&url);
    staff_login(&waiter.api, "garson@kofteci.test").await;
    let mut waiter_orders = OrderStore::load(waiter.api.clone());
    waiter_orders.refresh().await.unwrap();
    assert_eq!(waiter_orders.ready_orders()[0].order_code, code);
    waiter_orders.update_status(&code, OrderStatus::Delivered).await.unwrap();

    // cashier
    let cashier = device(&url);
    staff_login(&cashier.api, "admin@kofteci.test").await;
    let mut cashier_orders = OrderStore::load(cashier.api.clone());
    cashier_orders.refresh().await.unwrap();
    let bills = cashier_orders.pending_payment_by_table();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].table_number, 3);
    assert_eq!(bills[0].total, 385.0);

    let paid = cashier_orders.update_status(&code, OrderStatus::Paid).await.unwrap();
    assert!(paid.paid_at.is_some());
    assert!(cashier_orders.pending_payment_by_table().is_empty());

    let report = cashier_orders
        .revenue_report(ReportPeriod::Daily, None)
        .await
        .unwrap();
    assert_eq!(report.order_count, 1);
    assert_eq!(report.orders[0].order_code, code);
    assert_eq!(report.restaurant_revenue, 385.0);

    // the offline report over the same orders agrees
    mock.set_down(true);
    let offline = cashier_orders
        .revenue_report(ReportPeriod::Daily, None)
        .await
        .unwrap();
    assert_eq!(offline.window, report.window);
    assert_eq!(offline.total_revenue, report.total_revenue);
    assert!(!cashier_orders.is_online());
}
