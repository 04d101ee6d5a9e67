//! Tables and waiters for the admin and waiter screens
//!
//! Reads fall back to the last list fetched; writes need the server.

use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::models::{DiningTable, Waiter, WaiterCreate, WaiterUpdate};

use crate::ClientResult;
use crate::http::ApiClient;
use crate::storage::keys;

#[derive(Debug)]
pub struct StaffStore {
    api: ApiClient,
    tables: Vec<DiningTable>,
    waiters: Vec<Waiter>,
    online: bool,
}

impl StaffStore {
    pub fn load(api: ApiClient) -> Self {
        let tables = api.storage().get(keys::TABLES_CACHE).unwrap_or_default();
        let waiters = api.storage().get(keys::WAITERS_CACHE).unwrap_or_default();
        Self {
            api,
            tables,
            waiters,
            online: true,
        }
    }

    pub fn tables(&self) -> &[DiningTable] {
        &self.tables
    }

    pub fn active_tables(&self) -> impl Iterator<Item = &DiningTable> {
        self.tables.iter().filter(|t| t.is_active)
    }

    pub fn waiters(&self) -> &[Waiter] {
        &self.waiters
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// Fetched list, cached under `key`; the cached copy when unreachable
    async fn fetch_cached<T, F>(&mut self, key: &str, fetched: F) -> ClientResult<Option<Vec<T>>>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = ClientResult<Vec<T>>>,
    {
        match fetched.await {
            Ok(list) => {
                self.online = true;
                self.api.storage().set(key, &list)?;
                Ok(Some(list))
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(key = key, error = %e, "Fetch failed, using cached list");
                self.online = false;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn refresh_tables(&mut self) -> ClientResult<&[DiningTable]> {
        let api = self.api.clone();
        if let Some(tables) = self.fetch_cached(keys::TABLES_CACHE, api.tables()).await? {
            self.tables = tables;
        }
        Ok(&self.tables)
    }

    pub async fn refresh_waiters(&mut self) -> ClientResult<&[Waiter]> {
        let api = self.api.clone();
        if let Some(waiters) = self.fetch_cached(keys::WAITERS_CACHE, api.waiters()).await? {
            self.waiters = waiters;
        }
        Ok(&self.waiters)
    }

    pub async fn create_table(&mut self, table_number: i32) -> ClientResult<DiningTable> {
        let table = self.api.create_table(table_number).await?;
        self.tables.push(table.clone());
        self.tables.sort_by_key(|t| t.table_number);
        self.api.storage().set(keys::TABLES_CACHE, &self.tables)?;
        Ok(table)
    }

    pub async fn set_table_active(&mut self, id: &str, is_active: bool) -> ClientResult<DiningTable> {
        let table = self.api.set_table_active(id, is_active).await?;
        if let Some(slot) = self.tables.iter_mut().find(|t| t.id == table.id) {
            *slot = table.clone();
        }
        self.api.storage().set(keys::TABLES_CACHE, &self.tables)?;
        Ok(table)
    }

    /// Fails with `TableHasOrders` while the table has unpaid orders
    pub async fn delete_table(&mut self, id: &str) -> ClientResult<()> {
        self.api.delete_table(id).await?;
        self.tables.retain(|t| t.id != id);
        self.api.storage().set(keys::TABLES_CACHE, &self.tables)
    }

    pub async fn create_waiter(&mut self, data: &WaiterCreate) -> ClientResult<Waiter> {
        let waiter = self.api.create_waiter(data).await?;
        self.waiters.push(waiter.clone());
        self.api.storage().set(keys::WAITERS_CACHE, &self.waiters)?;
        Ok(waiter)
    }

    pub async fn update_waiter(&mut self, id: i64, data: &WaiterUpdate) -> ClientResult<Waiter> {
        let waiter = self.api.update_waiter(id, data).await?;
        if let Some(slot) = self.waiters.iter_mut().find(|w| w.id == id) {
            *slot = waiter.clone();
        }
        self.api.storage().set(keys::WAITERS_CACHE, &self.waiters)?;
        Ok(waiter)
    }

    pub async fn delete_waiter(&mut self, id: i64) -> ClientResult<()> {
        self.api.delete_waiter(id).await?;
        self.waiters.retain(|w| w.id != id);
        self.api.storage().set(keys::WAITERS_CACHE, &self.waiters)
    }
}
