//! Authentication store: persisted token and role

use serde::{Deserialize, Serialize};
use shared::models::{CustomerLoginRequest, LoginRequest, PublicRestaurant, Role, User};
use uuid::Uuid;

use crate::ClientResult;
use crate::http::ApiClient;
use crate::storage::keys;

/// Logged-in session as persisted under `auth`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub role: Role,
    pub restaurant_id: Option<Uuid>,
    /// Staff account; `None` for QR customers
    #[serde(default)]
    pub user: Option<User>,
    /// Restaurant a QR customer is sitting in
    #[serde(default)]
    pub restaurant: Option<PublicRestaurant>,
    #[serde(default)]
    pub table_number: Option<i32>,
}

impl Session {
    /// Page the role lands on after login
    pub fn home_path(&self) -> String {
        match self.role {
            Role::Admin => "/admin".to_string(),
            Role::Waiter => "/waiter".to_string(),
            Role::Kitchen => "/kitchen".to_string(),
            Role::SuperAdmin => "/crm".to_string(),
            Role::Customer => match (&self.restaurant, self.table_number) {
                (Some(r), Some(table)) => format!("/menu/{}?table={}", r.slug, table),
                _ => "/".to_string(),
            },
        }
    }
}

/// Session state backed by local storage
///
/// The gateway clears the stored session on a 401, so reads always go to
/// storage instead of a cached copy.
#[derive(Debug, Clone)]
pub struct AuthStore {
    api: ApiClient,
}

impl AuthStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub fn session(&self) -> Option<Session> {
        self.api.storage().get(keys::AUTH)
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.session().map(|s| s.role)
    }

    /// Whether the current session may open a page reserved for `roles`
    pub fn can_access(&self, roles: &[Role]) -> bool {
        self.role().is_some_and(|r| roles.contains(&r))
    }

    /// Staff login; `restaurant_slug` picks the tenant when the email is
    /// registered at several restaurants
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        restaurant_slug: Option<&str>,
    ) -> ClientResult<Session> {
        self.logout()?;
        let request = LoginRequest {
            email: Some(email.to_string()),
            password: password.to_string(),
            restaurant_slug: restaurant_slug.map(str::to_string),
            restaurant_id: None,
        };
        let response = self.api.login(&request).await?;

        let session = Session {
            token: response.token,
            role: response.user.role,
            restaurant_id: response.user.restaurant_id,
            user: Some(response.user),
            restaurant: None,
            table_number: None,
        };
        self.api.storage().set(keys::AUTH, &session)?;
        tracing::info!(role = %session.role, "Logged in");
        Ok(session)
    }

    /// QR scan: anonymous customer bound to a restaurant and table
    pub async fn customer_login(&self, slug: &str, table_number: i32) -> ClientResult<Session> {
        self.logout()?;
        let request = CustomerLoginRequest {
            restaurant_slug: slug.to_string(),
            table_number,
        };
        let response = self.api.customer_login(&request).await?;

        let session = Session {
            token: response.token,
            role: Role::Customer,
            restaurant_id: Some(response.restaurant.id),
            user: None,
            restaurant: Some(response.restaurant),
            table_number: Some(response.table_number),
        };
        self.api.storage().set(keys::AUTH, &session)?;
        Ok(session)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.api.storage().remove(keys::AUTH)
    }
}
