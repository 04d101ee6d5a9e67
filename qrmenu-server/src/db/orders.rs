//! Orders and order items
//!
//! Creation snapshots the stored product name and price, computes the totals
//! server-side and writes header and lines in one transaction. Status updates
//! lock the row and validate the transition against its current status.

use chrono::{DateTime, Datelike};
use shared::error::{AppError, ErrorCode};
use shared::models::Role;
use shared::money;
use shared::order::{
    CreateOrderRequest, Order, OrderItem, OrderSource, OrderStatus, OrderTable,
    generate_order_code,
};
use shared::report::{ReportWindow, istanbul_offset};
use sqlx::postgres::PgExecutor;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashMap;
use uuid::Uuid;

use super::{decode_enum, products, tables};
use crate::error::ServiceResult;

/// Attempts at drawing an unused random order code
const CODE_ATTEMPTS: usize = 5;

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    order_code: String,
    restaurant_id: Uuid,
    table_id: Option<String>,
    table_number: Option<i32>,
    status: String,
    subtotal: f64,
    total: f64,
    customer_note: Option<String>,
    source: String,
    created_at: i64,
    paid_at: Option<i64>,
}

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    order_id: Uuid,
    product_id: i64,
    product_name: String,
    quantity: i32,
    unit_price: f64,
    subtotal: f64,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, sqlx::Error> {
        Ok(Order {
            id: self.id,
            order_code: self.order_code,
            restaurant_id: self.restaurant_id,
            table: match (self.table_id, self.table_number) {
                (Some(id), Some(table_number)) => Some(OrderTable { id, table_number }),
                _ => None,
            },
            status: decode_enum(&self.status)?,
            subtotal: self.subtotal,
            total: self.total,
            customer_note: self.customer_note,
            source: decode_enum(&self.source)?,
            created_at: self.created_at,
            paid_at: self.paid_at,
            items,
        })
    }
}

impl From<ItemRow> for OrderItem {
    fn from(row: ItemRow) -> Self {
        OrderItem {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

/// Attach items to their order rows, keeping the row order
async fn hydrate<'e, E>(executor: E, rows: Vec<OrderRow>) -> Result<Vec<Order>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let item_rows: Vec<ItemRow> =
        sqlx::query_as("SELECT * FROM order_items WHERE order_id = ANY($1) ORDER BY id")
            .bind(&ids)
            .fetch_all(executor)
            .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
    for item in item_rows {
        by_order.entry(item.order_id).or_default().push(item.into());
    }

    rows.into_iter()
        .map(|row| {
            let items = by_order.remove(&row.id).unwrap_or_default();
            row.into_order(items)
        })
        .collect()
}

/// Orders of a restaurant, newest first
pub async fn list(
    pool: &PgPool,
    restaurant_id: Uuid,
    status: Option<OrderStatus>,
) -> Result<Vec<Order>, sqlx::Error> {
    let rows: Vec<OrderRow> = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(restaurant_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    hydrate(pool, rows).await
}

pub async fn find(pool: &PgPool, restaurant_id: Uuid, id: Uuid) -> Result<Option<Order>, sqlx::Error> {
    let row: Option<OrderRow> =
        sqlx::query_as("SELECT * FROM orders WHERE id = $1 AND restaurant_id = $2")
            .bind(id)
            .bind(restaurant_id)
            .fetch_optional(pool)
            .await?;
    match row {
        Some(row) => Ok(hydrate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

/// Year of `now_ms` on the Istanbul calendar, for order codes
fn code_year(now_ms: i64) -> i32 {
    DateTime::from_timestamp_millis(now_ms)
        .map(|t| t.with_timezone(&istanbul_offset()).year())
        .unwrap_or(1970)
}

/// A validated order line: stored product snapshot and quantity
struct Line {
    product_id: i64,
    product_name: String,
    unit_price: f64,
    quantity: i32,
}

async fn resolve_lines(
    tx: &mut Transaction<'_, Postgres>,
    restaurant_id: Uuid,
    req: &CreateOrderRequest,
) -> ServiceResult<Vec<Line>> {
    if req.items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty).into());
    }
    for item in &req.items {
        money::validate_quantity(item.quantity)?;
    }

    let ids: Vec<i64> = req.items.iter().map(|i| i.product_id).collect();
    let catalog: HashMap<i64, shared::models::Product> =
        products::find_many(&mut **tx, restaurant_id, &ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

    req.items
        .iter()
        .map(|item| -> ServiceResult<Line> {
            let product = catalog.get(&item.product_id).ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("productId", item.product_id)
            })?;
            if !product.is_available {
                return Err(AppError::new(ErrorCode::ProductUnavailable)
                    .with_detail("productId", item.product_id)
                    .into());
            }
            Ok(Line {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: product.price,
                quantity: item.quantity,
            })
        })
        .collect()
}

/// Create an order for `restaurant_id` (transactional)
pub async fn create(
    pool: &PgPool,
    restaurant_id: Uuid,
    req: &CreateOrderRequest,
    now: i64,
) -> ServiceResult<Order> {
    let source = req.resolve_source()?;
    let mut tx = pool.begin().await?;

    let table = match req.dine_in_table() {
        Some(number) => {
            let table = tables::find_by_number(&mut *tx, restaurant_id, number)
                .await?
                .filter(|t| t.is_active)
                .ok_or_else(|| {
                    AppError::new(ErrorCode::TableNotFound).with_detail("tableNumber", number)
                })?;
            Some(OrderTable {
                id: table.id,
                table_number: table.table_number,
            })
        }
        None => None,
    };

    let lines = resolve_lines(&mut tx, restaurant_id, req).await?;
    let subtotal = money::order_total(lines.iter().map(|l| (l.unit_price, l.quantity)));
    let total = subtotal;
    let note = req
        .note
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let id = Uuid::new_v4();
    let mut order_code = None;
    for _ in 0..CODE_ATTEMPTS {
        let code = generate_order_code(code_year(now));
        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r#"
            INSERT INTO orders (
                id, order_code, restaurant_id, table_id, table_number, status,
                subtotal, total, customer_note, source, created_at, paid_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NULL)
            ON CONFLICT (restaurant_id, order_code) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&code)
        .bind(restaurant_id)
        .bind(table.as_ref().map(|t| t.id.as_str()))
        .bind(table.as_ref().map(|t| t.table_number))
        .bind(OrderStatus::InKitchen.as_str())
        .bind(subtotal)
        .bind(total)
        .bind(note)
        .bind(source.as_str())
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        if inserted.is_some() {
            order_code = Some(code);
            break;
        }
        tracing::debug!(code = %code, "Order code collision, drawing another");
    }
    let order_code = order_code.ok_or_else(|| {
        AppError::with_message(ErrorCode::InternalError, "Could not allocate an order code")
    })?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = OrderItem {
            id: shared::util::snowflake_id(),
            product_id: line.product_id,
            subtotal: money::line_subtotal(line.unit_price, line.quantity),
            product_name: line.product_name,
            quantity: line.quantity,
            unit_price: line.unit_price,
        };
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, product_id, product_name, quantity, unit_price, subtotal)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(item.id)
        .bind(id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(item.subtotal)
        .execute(&mut *tx)
        .await?;
        items.push(item);
    }

    tx.commit().await?;

    Ok(Order {
        id,
        order_code,
        restaurant_id,
        table,
        status: OrderStatus::InKitchen,
        subtotal,
        total,
        customer_note: note.map(str::to_owned),
        source,
        created_at: now,
        paid_at: None,
        items,
    })
}

/// Move an order to `next` on behalf of `role`
///
/// Entering a revenue status stamps `paid_at` once; a courier-delivered
/// order keeps its stamp when it is later marked paid.
pub async fn update_status(
    pool: &PgPool,
    restaurant_id: Uuid,
    id: Uuid,
    next: OrderStatus,
    role: Role,
    now: i64,
) -> ServiceResult<Order> {
    let mut tx = pool.begin().await?;

    let current: Option<(String,)> = sqlx::query_as(
        "SELECT status FROM orders WHERE id = $1 AND restaurant_id = $2 FOR UPDATE",
    )
    .bind(id)
    .bind(restaurant_id)
    .fetch_optional(&mut *tx)
    .await?;
    let (current,) = current
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).with_detail("id", id.to_string()))?;
    let current: OrderStatus = decode_enum(&current)?;

    current.check_transition(next, role)?;

    let row: OrderRow = sqlx::query_as(
        r#"
        UPDATE orders SET
            status = $2,
            paid_at = CASE WHEN $3 THEN COALESCE(paid_at, $4) ELSE paid_at END
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(next.as_str())
    .bind(next.is_revenue())
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let mut orders = hydrate(&mut *tx, vec![row]).await?;
    tx.commit().await?;

    tracing::info!(order_id = %id, from = %current, to = %next, role = %role, "Order status changed");
    orders
        .pop()
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound).into())
}

pub async fn delete(pool: &PgPool, restaurant_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND restaurant_id = $2")
        .bind(id)
        .bind(restaurant_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Orders on a table that are neither paid nor cancelled
pub async fn count_open_for_table<'e, E>(executor: E, table_id: &str) -> Result<i64, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let terminal: Vec<&str> = OrderStatus::ALL
        .iter()
        .filter(|s| s.is_terminal())
        .map(|s| s.as_str())
        .collect();
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE table_id = $1 AND status <> ALL($2)")
            .bind(table_id)
            .bind(&terminal)
            .fetch_one(executor)
            .await?;
    Ok(count)
}

/// Revenue-status orders paid inside `window`
pub async fn paid_in_window(
    pool: &PgPool,
    restaurant_id: Uuid,
    window: ReportWindow,
    source: Option<OrderSource>,
) -> Result<Vec<Order>, sqlx::Error> {
    let revenue: Vec<&str> = OrderStatus::ALL
        .iter()
        .filter(|s| s.is_revenue())
        .map(|s| s.as_str())
        .collect();
    let rows: Vec<OrderRow> = sqlx::query_as(
        r#"
        SELECT * FROM orders
        WHERE restaurant_id = $1
          AND status = ANY($2)
          AND paid_at >= $3 AND paid_at < $4
          AND ($5::text IS NULL OR source = $5)
        ORDER BY paid_at
        "#,
    )
    .bind(restaurant_id)
    .bind(&revenue)
    .bind(window.start_ms)
    .bind(window.end_ms)
    .bind(source.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    hydrate(pool, rows).await
}
