//! In-process mock of the QR-menu API for the store tests

#![allow(dead_code)]

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::Utc;
use qrmenu_client::{ApiClient, ClientConfig};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Category, CustomerLoginRequest, CustomerLoginResponse, DiningTable, DiningTableCreate,
    LoginRequest, LoginResponse, Product, PublicMenu, PublicRestaurant, Role, User,
    group_categories, table_id,
};
use shared::money;
use shared::order::{
    CreateOrderRequest, Order, OrderItem, OrderListQuery, OrderSource, OrderStatus, OrderTable,
    UpdateStatusRequest,
};
use shared::report::{ReportLine, ReportQuery, RevenueReport, istanbul_offset, report_window};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use uuid::Uuid;

pub const SLUG: &str = "kofteci-ramiz";
pub const PASSWORD: &str = "123456";
pub const KOFTE: i64 = 1;
pub const AYRAN: i64 = 2;

pub fn restaurant_id() -> Uuid {
    Uuid::from_u128(0x6b6f_6674_6563_69)
}

#[derive(Default)]
struct Inner {
    orders: Vec<Order>,
    tables: Vec<DiningTable>,
    next_code: u32,
    down: bool,
    revoked: bool,
    failing_creates: bool,
    list_delay: Duration,
}

/// Mock server state, shared with the test body
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<Inner>>,
}

impl MockApi {
    /// Answer every request with 503 while `down`
    pub fn set_down(&self, down: bool) {
        self.inner.lock().unwrap().down = down;
    }

    /// Answer order creation with 500 while set
    pub fn fail_creates(&self, failing: bool) {
        self.inner.lock().unwrap().failing_creates = failing;
    }

    /// Hold every order list answer for `delay`
    pub fn slow_order_list(&self, delay: Duration) {
        self.inner.lock().unwrap().list_delay = delay;
    }

    /// Reject every token from now on
    pub fn revoke_tokens(&self) {
        self.inner.lock().unwrap().revoked = true;
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.lock().unwrap().orders.clone()
    }

    /// Status change made by another device
    pub fn force_status(&self, order_code: &str, status: OrderStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(order) = inner.orders.iter_mut().find(|o| o.order_code == order_code) {
            order.status = status;
            if status.is_revenue() {
                order.paid_at = Some(shared::util::now_millis());
            }
        }
    }

    pub fn add_table(&self, table_number: i32) {
        self.inner.lock().unwrap().tables.push(DiningTable {
            id: table_id(&restaurant_id(), table_number),
            restaurant_id: restaurant_id(),
            table_number,
            is_active: true,
            created_at: 0,
        });
    }

    /// Bind an ephemeral port and serve; returns the base URL
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

/// A device: its own storage directory and gateway
pub struct Device {
    pub dir: TempDir,
    pub api: ApiClient,
}

pub fn device(base_url: &str) -> Device {
    let dir = TempDir::new().unwrap();
    let config = ClientConfig::new(base_url)
        .with_storage_dir(dir.path())
        .with_timeout(Duration::from_secs(2));
    let api = ApiClient::new(&config).unwrap();
    Device { dir, api }
}

fn router(mock: MockApi) -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/customer-login", post(customer_login))
        .route("/api/v1/menu/public/{slug}", get(public_menu))
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route("/api/v1/orders/report", get(report))
        .route("/api/v1/orders/{id}/status", patch(update_status))
        .route("/api/v1/tables", get(list_tables).post(create_table))
        .route("/api/v1/tables/{id}", delete(delete_table))
        .layer(middleware::from_fn_with_state(mock.clone(), outage))
        .with_state(mock)
}

async fn outage(State(mock): State<MockApi>, req: Request, next: Next) -> Response {
    if mock.inner.lock().unwrap().down {
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    next.run(req).await
}

/// Tokens are `token:<role>` or `token:customer:<table>`
fn caller(mock: &MockApi, headers: &HeaderMap) -> Result<(Role, Option<i32>), AppError> {
    let token = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer token:"))
        .ok_or_else(AppError::unauthorized)?;
    if mock.inner.lock().unwrap().revoked {
        return Err(AppError::token_expired());
    }
    match token.split_once(':') {
        Some(("customer", table)) => Ok((Role::Customer, table.parse().ok())),
        _ => token
            .parse::<Role>()
            .map(|role| (role, None))
            .map_err(|_| AppError::invalid_token("bad token")),
    }
}

fn public_restaurant() -> PublicRestaurant {
    PublicRestaurant {
        id: restaurant_id(),
        name: "Köfteci Ramiz".into(),
        slug: SLUG.into(),
        logo_url: None,
        phone: None,
        address: None,
    }
}

fn catalog() -> (Vec<Category>, Vec<Product>) {
    let category = |id: i64, name: &str, sort_order: i32| Category {
        id,
        restaurant_id: restaurant_id(),
        name: name.into(),
        icon: None,
        sort_order,
        image_url: None,
    };
    let product = |id: i64, category_id: i64, name: &str, price: f64| Product {
        id,
        restaurant_id: restaurant_id(),
        category_id,
        name: name.into(),
        description: None,
        price,
        is_available: true,
        image_url: None,
    };
    (
        vec![category(10, "Izgara", 1), category(11, "İçecekler", 2)],
        vec![
            product(KOFTE, 10, "Köfte", 180.0),
            product(AYRAN, 11, "Ayran", 25.0),
        ],
    )
}

async fn login(Json(req): Json<LoginRequest>) -> Result<Json<LoginResponse>, AppError> {
    let email = shared::util::normalize_email(req.email.as_deref().unwrap_or_default());
    let role = match email.split('@').next() {
        Some("admin") => Role::Admin,
        Some("mutfak") => Role::Kitchen,
        Some("garson") => Role::Waiter,
        _ => return Err(AppError::new(ErrorCode::InvalidCredentials)),
    };
    if req.password != PASSWORD {
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    }
    Ok(Json(LoginResponse {
        token: format!("token:{role}"),
        user: User {
            id: Uuid::new_v4(),
            restaurant_id: Some(restaurant_id()),
            email,
            name: role.to_string(),
            role,
            is_active: true,
            created_at: 0,
        },
    }))
}

async fn customer_login(
    Json(req): Json<CustomerLoginRequest>,
) -> Result<Json<CustomerLoginResponse>, AppError> {
    if req.restaurant_slug != SLUG {
        return Err(AppError::new(ErrorCode::RestaurantNotFound));
    }
    if req.table_number <= 0 {
        return Err(AppError::new(ErrorCode::TableNumberInvalid));
    }
    Ok(Json(CustomerLoginResponse {
        token: format!("token:customer:{}", req.table_number),
        restaurant: public_restaurant(),
        table_number: req.table_number,
    }))
}

async fn public_menu(Path(slug): Path<String>) -> Result<Json<PublicMenu>, AppError> {
    if slug != SLUG {
        return Err(AppError::new(ErrorCode::RestaurantNotFound));
    }
    let (categories, products) = catalog();
    Ok(Json(PublicMenu {
        restaurant: public_restaurant(),
        groups: group_categories(categories),
        products,
    }))
}

async fn list_orders(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let (role, _) = caller(&mock, &headers)?;
    if role == Role::Customer {
        return Err(AppError::forbidden("staff only"));
    }
    let status = query.status.as_deref().map(str::parse::<OrderStatus>).transpose()?;
    let mut orders: Vec<Order> = mock
        .orders()
        .into_iter()
        .filter(|o| status.is_none_or(|s| o.status == s))
        .collect();
    // the answer reflects the moment the request arrived
    let delay = mock.inner.lock().unwrap().list_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(Json(orders))
}

async fn create_order(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), AppError> {
    let (role, token_table) = caller(&mock, &headers)?;
    if role == Role::Kitchen {
        return Err(AppError::forbidden("kitchen cannot order"));
    }
    if mock.inner.lock().unwrap().failing_creates {
        return Err(AppError::internal("order insert failed"));
    }
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    let (_, products) = catalog();
    let mut items = Vec::new();
    for (item, id) in req.items.iter().zip(1..) {
        let product = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;
        items.push(OrderItem {
            id,
            product_id: product.id,
            product_name: product.name.clone(),
            quantity: item.quantity,
            unit_price: product.price,
            subtotal: money::line_subtotal(product.price, item.quantity),
        });
    }
    let total = money::order_total(items.iter().map(|i| (i.unit_price, i.quantity)));
    let (table_number, source) = match role {
        Role::Customer => (token_table, OrderSource::Restaurant),
        _ => (req.dine_in_table(), req.resolve_source()?),
    };

    let mut inner = mock.inner.lock().unwrap();
    inner.next_code += 1;
    let order = Order {
        id: Uuid::new_v4(),
        order_code: format!("ORD-2025-{:04}", inner.next_code),
        restaurant_id: restaurant_id(),
        table: table_number.map(|n| OrderTable {
            id: table_id(&restaurant_id(), n),
            table_number: n,
        }),
        status: OrderStatus::InKitchen,
        subtotal: total,
        total,
        customer_note: req.note.clone(),
        source,
        created_at: shared::util::now_millis() + i64::from(inner.next_code),
        paid_at: None,
        items,
    };
    inner.orders.push(order.clone());
    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_status(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, AppError> {
    let (role, _) = caller(&mock, &headers)?;
    let next: OrderStatus = req.status.parse()?;
    let mut inner = mock.inner.lock().unwrap();
    let order = inner
        .orders
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    order.status.check_transition(next, role)?;
    order.status = next;
    if next.is_revenue() && order.paid_at.is_none() {
        order.paid_at = Some(shared::util::now_millis());
    }
    Ok(Json(order.clone()))
}

async fn report(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Query(query): Query<ReportQuery>,
) -> Result<Json<RevenueReport>, AppError> {
    let (role, _) = caller(&mock, &headers)?;
    if !matches!(role, Role::Admin | Role::SuperAdmin) {
        return Err(AppError::forbidden("managers only"));
    }
    let window = report_window(query.period()?, istanbul_offset(), Utc::now())?;
    let orders = mock.orders();
    Ok(Json(RevenueReport::build(
        window,
        query.source()?,
        orders.iter().map(ReportLine::from),
    )))
}

async fn list_tables(
    State(mock): State<MockApi>,
    headers: HeaderMap,
) -> Result<Json<Vec<DiningTable>>, AppError> {
    caller(&mock, &headers)?;
    Ok(Json(mock.inner.lock().unwrap().tables.clone()))
}

async fn create_table(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Json(req): Json<DiningTableCreate>,
) -> Result<(StatusCode, Json<DiningTable>), AppError> {
    caller(&mock, &headers)?;
    if mock
        .inner
        .lock()
        .unwrap()
        .tables
        .iter()
        .any(|t| t.table_number == req.table_number)
    {
        return Err(AppError::new(ErrorCode::TableNumberExists));
    }
    mock.add_table(req.table_number);
    let table = mock.inner.lock().unwrap().tables.last().cloned().unwrap();
    Ok((StatusCode::CREATED, Json(table)))
}

async fn delete_table(
    State(mock): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    caller(&mock, &headers)?;
    let mut inner = mock.inner.lock().unwrap();
    let open = inner
        .orders
        .iter()
        .any(|o| o.table.as_ref().is_some_and(|t| t.id == id) && !o.status.is_terminal());
    if open {
        return Err(AppError::new(ErrorCode::TableHasOrders));
    }
    let before = inner.tables.len();
    inner.tables.retain(|t| t.id != id);
    if inner.tables.len() == before {
        return Err(AppError::new(ErrorCode::TableNotFound));
    }
    Ok(StatusCode::NO_CONTENT)
}
