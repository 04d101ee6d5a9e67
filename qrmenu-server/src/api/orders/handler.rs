//! Order handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use shared::error::AppError;
use shared::models::Role;
use shared::order::{
    CreateOrderRequest, Order, OrderListQuery, OrderSource, OrderStatus, UpdateStatusRequest,
};
use shared::report::{ReportLine, ReportQuery, RevenueReport, istanbul_offset, report_window};
use uuid::Uuid;

use crate::api::ScopeQuery;
use crate::auth::Identity;
use crate::db::orders;
use crate::error::{ApiResult, ServiceError};
use crate::state::AppState;

/// GET /api/v1/orders?status=
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<Order>> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()?;

    let orders = orders::list(&state.pool, restaurant_id, status).await?;
    Ok(Json(orders))
}

/// POST /api/v1/orders
///
/// Customers always order for the table in their token, as a dine-in
/// restaurant order.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(mut req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>), ServiceError> {
    let restaurant_id = identity.require_restaurant()?;

    if identity.role == Role::Customer {
        req.table_number = identity.table_number;
        req.source = Some(OrderSource::Restaurant);
    }

    let order = orders::create(&state.pool, restaurant_id, &req, shared::util::now_millis()).await?;

    tracing::info!(
        order_id = %order.id,
        order_code = %order.order_code,
        table_number = ?order.table_number(),
        total = order.total,
        "Order created"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// PATCH /api/v1/orders/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Query(scope): Query<ScopeQuery>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Order> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let next: OrderStatus = req.status.trim().parse()?;

    let order = orders::update_status(
        &state.pool,
        restaurant_id,
        id,
        next,
        identity.role,
        shared::util::now_millis(),
    )
    .await?;
    Ok(Json(order))
}

/// DELETE /api/v1/orders/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<Uuid>,
    Query(scope): Query<ScopeQuery>,
) -> Result<StatusCode, ServiceError> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    if !orders::delete(&state.pool, restaurant_id, id).await? {
        return Err(AppError::new(shared::ErrorCode::OrderNotFound)
            .with_detail("id", id.to_string())
            .into());
    }
    tracing::info!(order_id = %id, "Order deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/orders/report?period=|startDate&endDate&source=
pub async fn report(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(scope): Query<ScopeQuery>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<RevenueReport> {
    let restaurant_id = identity.restaurant_scope(scope.restaurant_id)?;
    let period = query.period()?;
    let source = query.source()?;
    let window = report_window(period, istanbul_offset(), Utc::now())?;

    let paid = orders::paid_in_window(&state.pool, restaurant_id, window, source).await?;
    let report = RevenueReport::build(window, source, paid.iter().map(ReportLine::from));
    Ok(Json(report))
}
