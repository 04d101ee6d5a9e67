//! Typed endpoints over [`ApiClient`]

use serde::Serialize;
use shared::models::{
    CustomerLoginRequest, CustomerLoginResponse, DiningTable, DiningTableCreate,
    DiningTableUpdate, IdentityInfo, LoginRequest, LoginResponse, PublicMenu, Waiter,
    WaiterCreate, WaiterUpdate,
};
use shared::order::{CreateOrderRequest, Order, OrderStatus, UpdateStatusRequest};
use shared::report::{ReportQuery, RevenueReport};
use uuid::Uuid;

use crate::ClientResult;
use crate::http::ApiClient;

#[derive(Serialize)]
struct StatusFilter<'a> {
    status: &'a str,
}

impl ApiClient {
    // ========== Auth ==========

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.post("/api/v1/auth/login", request).await
    }

    pub async fn customer_login(
        &self,
        request: &CustomerLoginRequest,
    ) -> ClientResult<CustomerLoginResponse> {
        self.post("/api/v1/auth/customer-login", request).await
    }

    pub async fn me(&self) -> ClientResult<IdentityInfo> {
        self.get("/api/v1/auth/me").await
    }

    // ========== Menu ==========

    pub async fn public_menu(&self, slug: &str) -> ClientResult<PublicMenu> {
        self.get(&format!("/api/v1/menu/public/{slug}")).await
    }

    // ========== Orders ==========

    pub async fn orders(&self, status: Option<OrderStatus>) -> ClientResult<Vec<Order>> {
        match status {
            Some(status) => {
                let filter = StatusFilter {
                    status: status.as_str(),
                };
                self.get_with_query("/api/v1/orders", &filter).await
            }
            None => self.get("/api/v1/orders").await,
        }
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> ClientResult<Order> {
        self.post("/api/v1/orders", request).await
    }

    pub async fn update_order_status(&self, id: Uuid, status: OrderStatus) -> ClientResult<Order> {
        let body = UpdateStatusRequest {
            status: status.as_str().to_string(),
        };
        self.patch(&format!("/api/v1/orders/{id}/status"), &body).await
    }

    pub async fn delete_order(&self, id: Uuid) -> ClientResult<()> {
        self.delete(&format!("/api/v1/orders/{id}")).await
    }

    pub async fn revenue_report(&self, query: &ReportQuery) -> ClientResult<RevenueReport> {
        self.get_with_query("/api/v1/orders/report", query).await
    }

    // ========== Tables ==========

    pub async fn tables(&self) -> ClientResult<Vec<DiningTable>> {
        self.get("/api/v1/tables").await
    }

    pub async fn create_table(&self, table_number: i32) -> ClientResult<DiningTable> {
        self.post("/api/v1/tables", &DiningTableCreate { table_number })
            .await
    }

    pub async fn set_table_active(&self, id: &str, is_active: bool) -> ClientResult<DiningTable> {
        let body = DiningTableUpdate {
            is_active: Some(is_active),
        };
        self.patch(&format!("/api/v1/tables/{id}"), &body).await
    }

    pub async fn delete_table(&self, id: &str) -> ClientResult<()> {
        self.delete(&format!("/api/v1/tables/{id}")).await
    }

    // ========== Waiters ==========

    pub async fn waiters(&self) -> ClientResult<Vec<Waiter>> {
        self.get("/api/v1/waiters").await
    }

    pub async fn create_waiter(&self, data: &WaiterCreate) -> ClientResult<Waiter> {
        self.post("/api/v1/waiters", data).await
    }

    pub async fn update_waiter(&self, id: i64, data: &WaiterUpdate) -> ClientResult<Waiter> {
        self.patch(&format!("/api/v1/waiters/{id}"), data).await
    }

    pub async fn delete_waiter(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/api/v1/waiters/{id}")).await
    }
}
