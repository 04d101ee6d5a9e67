//! Order store: server first, local snapshot and outbox when offline
//!
//! Every mutation is persisted under `orders`. Mutations that could not
//! reach the server wait in `order_outbox` and are replayed before the
//! next refresh:
//!
//! - queued creates are re-posted; one the server rejects is dropped
//!   together with its local `SIP-` order
//! - queued status updates are dropped when the server rejects them, and
//!   the refresh that follows adopts the server's state
//! - an entry the server keeps failing on (500) is retried on the next
//!   syncs without holding back entries for other orders, and given up
//!   after [`MAX_REPLAY_ATTEMPTS`]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{Role, table_id};
use shared::money;
use shared::order::{
    CreateOrderRequest, Order, OrderItem, OrderSource, OrderStatus, OrderTable, is_offline_code,
    offline_order_code,
};
use shared::report::{
    ReportLine, ReportPeriod, ReportQuery, RevenueReport, istanbul_offset, report_window,
};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::auth::Session;
use crate::http::ApiClient;
use crate::storage::keys;
use crate::{ClientError, ClientResult};

/// Server failures tolerated per outbox entry before it is given up
pub const MAX_REPLAY_ATTEMPTS: u32 = 5;

/// Mutation waiting for the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboxEntry {
    /// Order shown locally as `local_code` until the server accepts it
    #[serde(rename_all = "camelCase")]
    Create {
        local_code: String,
        request: CreateOrderRequest,
        #[serde(default)]
        attempts: u32,
    },
    #[serde(rename_all = "camelCase")]
    UpdateStatus {
        order_code: String,
        status: OrderStatus,
        #[serde(default)]
        attempts: u32,
    },
}

impl OutboxEntry {
    pub fn order_code(&self) -> &str {
        match self {
            OutboxEntry::Create { local_code, .. } => local_code,
            OutboxEntry::UpdateStatus { order_code, .. } => order_code,
        }
    }

    /// Count one server failure; returns the total so far
    fn record_failure(&mut self) -> u32 {
        let (OutboxEntry::Create { attempts, .. } | OutboxEntry::UpdateStatus { attempts, .. }) =
            self;
        *attempts += 1;
        *attempts
    }
}

/// Unpaid orders of one table (cashier view)
#[derive(Debug, Clone, PartialEq)]
pub struct TableBill<'a> {
    pub table_number: i32,
    pub orders: Vec<&'a Order>,
    pub total: f64,
}

pub struct OrderStore {
    api: ApiClient,
    orders: Vec<Order>,
    /// order code -> server id
    server_ids: HashMap<String, Uuid>,
    outbox: Vec<OutboxEntry>,
    /// Last offline sequence number handed out
    seq: u32,
    online: bool,
    /// Bumped on every local change; a list fetched across one is stale
    revision: u64,
}

impl OrderStore {
    /// Restore the snapshot, outbox and sequence left on this device
    pub fn load(api: ApiClient) -> Self {
        let storage = api.storage();
        let orders: Vec<Order> = storage.get(keys::ORDERS).unwrap_or_default();
        let outbox = storage.get(keys::ORDER_OUTBOX).unwrap_or_default();
        let seq = storage.get(keys::ORDER_SEQ).unwrap_or(0);

        let mut store = Self {
            api,
            orders: Vec::new(),
            server_ids: HashMap::new(),
            outbox,
            seq,
            online: true,
            revision: 0,
        };
        for order in &orders {
            store.remember(order);
        }
        store.orders = orders;
        store
    }

    fn remember(&mut self, order: &Order) {
        if !is_offline_code(&order.order_code) {
            self.server_ids.insert(order.order_code.clone(), order.id);
        }
    }

    fn persist(&self) -> ClientResult<()> {
        self.api.storage().set(keys::ORDERS, &self.orders)
    }

    fn persist_outbox(&self) -> ClientResult<()> {
        self.api.storage().set(keys::ORDER_OUTBOX, &self.outbox)
    }

    fn session(&self) -> Option<Session> {
        self.api.storage().get(keys::AUTH)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn find(&self, order_code: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.order_code == order_code)
    }

    /// Server id behind an order code, once the server has seen the order
    pub fn server_id(&self, order_code: &str) -> Option<Uuid> {
        self.server_ids.get(order_code).copied()
    }

    pub fn outbox(&self) -> &[OutboxEntry] {
        &self.outbox
    }

    /// Whether the order has mutations the server has not seen yet
    pub fn is_pending(&self, order_code: &str) -> bool {
        self.outbox.iter().any(|e| e.order_code() == order_code)
    }

    // ========== Mutations ==========

    /// Place an order; falls back to an offline `SIP-NNNN` order when the
    /// server is unreachable
    pub async fn create_order(&mut self, request: CreateOrderRequest) -> ClientResult<Order> {
        match self.api.create_order(&request).await {
            Ok(order) => {
                self.online = true;
                self.revision += 1;
                self.remember(&order);
                self.orders.insert(0, order.clone());
                self.persist()?;
                Ok(order)
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(error = %e, "Order create failed, keeping it offline");
                self.online = false;

                let order = self.offline_order(&request, shared::util::now_millis())?;
                self.revision += 1;
                self.orders.insert(0, order.clone());
                self.outbox.push(OutboxEntry::Create {
                    local_code: order.order_code.clone(),
                    request,
                    attempts: 0,
                });
                self.persist()?;
                self.persist_outbox()?;
                Ok(order)
            }
            Err(e) => Err(e),
        }
    }

    /// Local stand-in for an order the server has not accepted yet
    fn offline_order(&mut self, request: &CreateOrderRequest, now: i64) -> ClientResult<Order> {
        if request.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        for item in &request.items {
            money::validate_quantity(item.quantity)?;
        }

        let session = self.session();
        let restaurant_id = session
            .as_ref()
            .and_then(|s| s.restaurant_id)
            .unwrap_or_else(Uuid::nil);
        // Customers always order for the table on their token
        let (table_number, source) = match &session {
            Some(s) if s.role == Role::Customer => (s.table_number, OrderSource::Restaurant),
            _ => (request.dine_in_table(), request.resolve_source()?),
        };

        self.seq += 1;
        self.api.storage().set(keys::ORDER_SEQ, &self.seq)?;

        let items: Vec<OrderItem> = request
            .items
            .iter()
            .zip(1..)
            .map(|(item, id)| OrderItem {
                id,
                product_id: item.product_id,
                product_name: item.name.trim().to_string(),
                quantity: item.quantity,
                unit_price: item.price,
                subtotal: money::line_subtotal(item.price, item.quantity),
            })
            .collect();
        let total = money::order_total(items.iter().map(|i| (i.unit_price, i.quantity)));

        Ok(Order {
            id: Uuid::new_v4(),
            order_code: offline_order_code(self.seq),
            restaurant_id,
            table: table_number.map(|n| OrderTable {
                id: table_id(&restaurant_id, n),
                table_number: n,
            }),
            status: OrderStatus::InKitchen,
            subtotal: total,
            total,
            customer_note: request
                .note
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
            source,
            created_at: now,
            paid_at: None,
            items,
        })
    }

    /// Move an order to `status`
    ///
    /// Unknown-to-the-server orders and network failures queue the update;
    /// the local copy changes either way. A 4xx answer leaves the local copy
    /// untouched.
    pub async fn update_status(
        &mut self,
        order_code: &str,
        status: OrderStatus,
    ) -> ClientResult<Order> {
        let idx = self
            .orders
            .iter()
            .position(|o| o.order_code == order_code)
            .ok_or_else(|| {
                AppError::new(ErrorCode::OrderNotFound).with_detail("orderCode", order_code)
            })?;
        let role = self.session().ok_or(ClientError::Unauthorized)?.role;
        self.orders[idx].status.check_transition(status, role)?;

        if let Some(id) = self.server_id(order_code) {
            match self.api.update_order_status(id, status).await {
                Ok(order) => {
                    self.online = true;
                    self.revision += 1;
                    self.orders[idx] = order.clone();
                    self.persist()?;
                    return Ok(order);
                }
                Err(e) if e.is_transport() => {
                    tracing::warn!(order_code = order_code, error = %e, "Status update queued");
                    self.online = false;
                }
                Err(e) => return Err(e),
            }
        }

        self.outbox.push(OutboxEntry::UpdateStatus {
            order_code: order_code.to_string(),
            status,
            attempts: 0,
        });
        self.revision += 1;
        apply_status(&mut self.orders[idx], status, shared::util::now_millis());
        self.persist_outbox()?;
        self.persist()?;
        Ok(self.orders[idx].clone())
    }

    /// Delete an order on the server (admin only, never queued)
    pub async fn delete_order(&mut self, order_code: &str) -> ClientResult<()> {
        let id = self.server_id(order_code).ok_or_else(|| {
            AppError::new(ErrorCode::OrderNotFound).with_detail("orderCode", order_code)
        })?;
        self.api.delete_order(id).await?;
        self.revision += 1;
        self.orders.retain(|o| o.order_code != order_code);
        self.server_ids.remove(order_code);
        self.persist()
    }

    // ========== Sync ==========

    /// Replay the outbox in order; returns how many entries went through
    ///
    /// Stops at the first transport failure and keeps the rest queued.
    /// Rejected entries are dropped. An entry the server fails on is kept
    /// for the next sync along with the later entries for the same order,
    /// and dropped once it has failed [`MAX_REPLAY_ATTEMPTS`] times.
    pub async fn sync_outbox(&mut self) -> ClientResult<usize> {
        let queued = self.outbox.len();
        let mut entries = std::mem::take(&mut self.outbox).into_iter();
        let mut remaining = Vec::new();
        // offline code -> server code, for updates queued behind a create
        let mut renamed: HashMap<String, String> = HashMap::new();
        // orders with an entry waiting on a server fault; their later entries wait too
        let mut held: HashSet<String> = HashSet::new();
        let mut replayed = 0;
        let mut outcome = Ok(());

        while let Some(mut entry) = entries.next() {
            if held.contains(entry.order_code()) {
                remaining.push(entry);
                continue;
            }
            match self.replay(&entry, &mut renamed).await {
                Ok(()) => replayed += 1,
                Err(e) if e.is_server_fault() => {
                    let failures = entry.record_failure();
                    if failures >= MAX_REPLAY_ATTEMPTS {
                        tracing::warn!(
                            order_code = entry.order_code(),
                            failures = failures,
                            error = %e,
                            "Giving up on outbox entry"
                        );
                        self.discard(&entry);
                    } else {
                        tracing::warn!(
                            order_code = entry.order_code(),
                            failures = failures,
                            error = %e,
                            "Outbox entry failed on the server, retrying on next sync"
                        );
                        held.insert(entry.order_code().to_string());
                        remaining.push(entry);
                    }
                }
                Err(e) if e.is_transport() || matches!(e, ClientError::Unauthorized) => {
                    if e.is_transport() {
                        self.online = false;
                    } else {
                        outcome = Err(e);
                    }
                    remaining.push(entry);
                    remaining.extend(entries.by_ref());
                    break;
                }
                Err(e) => {
                    tracing::warn!(order_code = entry.order_code(), error = %e, "Dropping rejected outbox entry");
                    self.discard(&entry);
                }
            }
        }

        for entry in &mut remaining {
            if let OutboxEntry::UpdateStatus { order_code, .. } = entry
                && let Some(code) = renamed.get(order_code.as_str())
            {
                *order_code = code.clone();
            }
        }
        if replayed > 0 || remaining.len() != queued {
            self.revision += 1;
        }
        self.outbox = remaining;
        self.persist_outbox()?;
        self.persist()?;
        if replayed > 0 {
            tracing::info!(replayed = replayed, pending = self.outbox.len(), "Outbox synced");
        }
        outcome.map(|()| replayed)
    }

    /// Forget a dropped entry; a create the server never took stops showing
    fn discard(&mut self, entry: &OutboxEntry) {
        if let OutboxEntry::Create { local_code, .. } = entry {
            self.orders.retain(|o| o.order_code != *local_code);
        }
    }

    async fn replay(
        &mut self,
        entry: &OutboxEntry,
        renamed: &mut HashMap<String, String>,
    ) -> ClientResult<()> {
        match entry {
            OutboxEntry::Create {
                local_code,
                request,
                ..
            } => match self.api.create_order(request).await {
                Ok(order) => {
                    self.remember(&order);
                    renamed.insert(local_code.clone(), order.order_code.clone());
                    match self.orders.iter().position(|o| o.order_code == *local_code) {
                        Some(pos) => self.orders[pos] = order,
                        None => self.orders.insert(0, order),
                    }
                    Ok(())
                }
                Err(e) => Err(e),
            },
            OutboxEntry::UpdateStatus {
                order_code, status, ..
            } => {
                let code = renamed.get(order_code).unwrap_or(order_code);
                let id = self.server_id(code).ok_or_else(|| {
                    AppError::new(ErrorCode::OrderNotFound).with_detail("orderCode", code.as_str())
                })?;
                let order = self.api.update_order_status(id, *status).await?;
                if let Some(local) = self.orders.iter_mut().find(|o| o.id == order.id) {
                    *local = order;
                }
                Ok(())
            }
        }
    }

    /// Sync the outbox, then reload the order list
    ///
    /// Returns whether the visible list changed. When the server is
    /// unreachable the persisted snapshot is served and the store goes
    /// offline.
    pub async fn refresh(&mut self) -> ClientResult<bool> {
        if !self.outbox.is_empty() {
            self.sync_outbox().await?;
        }
        let fetched = self.api.orders(None).await;
        self.apply_fetched(fetched)
    }

    /// Fold the result of an order list fetch into the store
    pub fn apply_fetched(&mut self, fetched: ClientResult<Vec<Order>>) -> ClientResult<bool> {
        match fetched {
            Ok(fetched) => {
                self.online = true;
                for order in &fetched {
                    self.remember(order);
                }
                let merged = self.merge(fetched);
                if merged == self.orders {
                    return Ok(false);
                }
                self.orders = merged;
                self.persist()?;
                Ok(true)
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(error = %e, "Order refresh failed, serving local snapshot");
                self.online = false;
                let snapshot: Vec<Order> =
                    self.api.storage().get(keys::ORDERS).unwrap_or_default();
                if snapshot == self.orders {
                    return Ok(false);
                }
                self.orders = snapshot;
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Server list plus what the outbox still owes it
    fn merge(&self, fetched: Vec<Order>) -> Vec<Order> {
        let mut merged: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| {
                self.outbox.iter().any(|e| {
                    matches!(e, OutboxEntry::Create { local_code, .. } if *local_code == o.order_code)
                })
            })
            .cloned()
            .collect();
        merged.extend(fetched);

        let now = shared::util::now_millis();
        for entry in &self.outbox {
            if let OutboxEntry::UpdateStatus {
                order_code, status, ..
            } = entry
                && let Some(order) = merged.iter_mut().find(|o| o.order_code == *order_code)
            {
                apply_status(order, *status, now);
            }
        }
        merged
    }

    // ========== Views ==========

    fn with_status(&self, status: OrderStatus) -> Vec<&Order> {
        self.orders.iter().filter(|o| o.status == status).collect()
    }

    /// Kitchen screen
    pub fn kitchen_orders(&self) -> Vec<&Order> {
        self.with_status(OrderStatus::InKitchen)
    }

    /// Waiter screen
    pub fn ready_orders(&self) -> Vec<&Order> {
        self.with_status(OrderStatus::Ready)
    }

    /// Served or handed to a courier
    pub fn delivered_orders(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| matches!(o.status, OrderStatus::Delivered | OrderStatus::CourierDelivered))
            .collect()
    }

    pub fn third_party_orders(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| o.source.is_third_party())
            .collect()
    }

    /// Open table orders grouped by table number, ascending
    pub fn pending_payment_by_table(&self) -> Vec<TableBill<'_>> {
        let mut bills: Vec<TableBill<'_>> = Vec::new();
        for order in self.orders.iter().filter(|o| !o.status.is_terminal()) {
            let Some(table_number) = order.table_number() else {
                continue;
            };
            match bills.iter_mut().find(|b| b.table_number == table_number) {
                Some(bill) => bill.orders.push(order),
                None => bills.push(TableBill {
                    table_number,
                    orders: vec![order],
                    total: 0.0,
                }),
            }
        }
        for bill in &mut bills {
            bill.total = money::sum(bill.orders.iter().map(|o| o.total));
        }
        bills.sort_by_key(|b| b.table_number);
        bills
    }

    // ========== Reports ==========

    /// Revenue report computed from the local orders
    pub fn offline_report(
        &self,
        period: ReportPeriod,
        source: Option<OrderSource>,
        now: DateTime<Utc>,
    ) -> ClientResult<RevenueReport> {
        let window = report_window(period, istanbul_offset(), now)?;
        Ok(RevenueReport::build(
            window,
            source,
            self.orders.iter().map(ReportLine::from),
        ))
    }

    /// Server report, or the local one when the server is unreachable
    pub async fn revenue_report(
        &mut self,
        period: ReportPeriod,
        source: Option<OrderSource>,
    ) -> ClientResult<RevenueReport> {
        let query = ReportQuery::for_period(period, source);
        match self.api.revenue_report(&query).await {
            Ok(report) => {
                self.online = true;
                Ok(report)
            }
            Err(e) if e.is_transport() => {
                self.online = false;
                self.offline_report(period, source, Utc::now())
            }
            Err(e) => Err(e),
        }
    }
}

/// Local mirror of the server's status write
fn apply_status(order: &mut Order, status: OrderStatus, now: i64) {
    order.status = status;
    if status.is_revenue() && order.paid_at.is_none() {
        order.paid_at = Some(now);
    }
}

/// Background refresh; dropping the handle stops polling
pub struct Poller {
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn stop(self) {}

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Refresh now, then every `every`
///
/// The list fetch runs without holding the store, so screens keep mutating
/// while the server is slow. The task ends on its own when the session is
/// rejected.
pub fn spawn_polling(store: Arc<Mutex<OrderStore>>, every: Duration) -> Poller {
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match poll_once(&store).await {
                Ok(true) => tracing::debug!("Orders changed"),
                Ok(false) => {}
                Err(ClientError::Unauthorized) => {
                    tracing::info!("Session rejected, order polling stopped");
                    break;
                }
                Err(e) => tracing::warn!(error = %e, "Order refresh failed"),
            }
        }
    });
    Poller { handle }
}

async fn poll_once(store: &Mutex<OrderStore>) -> ClientResult<bool> {
    let (api, revision) = {
        let mut guard = store.lock().await;
        // replay writes into the store, so it runs under the lock
        if !guard.outbox.is_empty() {
            guard.sync_outbox().await?;
        }
        (guard.api.clone(), guard.revision)
    };

    let fetched = api.orders(None).await;

    let mut guard = store.lock().await;
    if guard.revision != revision {
        // changed locally while fetching; the next tick reloads
        return Ok(false);
    }
    guard.apply_fetched(fetched)
}
