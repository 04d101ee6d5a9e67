//! Local device storage: one JSON file per key

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ClientResult;

/// Storage keys
pub mod keys {
    pub const AUTH: &str = "auth";
    pub const CART: &str = "cart";
    pub const ORDERS: &str = "orders";
    pub const ORDER_SEQ: &str = "order_seq";
    pub const ORDER_OUTBOX: &str = "order_outbox";
    pub const MENU: &str = "menu";
    pub const TABLES_CACHE: &str = "tables_cache";
    pub const WAITERS_CACHE: &str = "waiters_cache";
}

/// Key-value JSON store rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read a value; a missing or unreadable entry is `None`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let json = fs::read_to_string(self.path(key)).ok()?;
        match serde_json::from_str(&json) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Discarding corrupt local state");
                None
            }
        }
    }

    /// Write a value, replacing the previous one
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> ClientResult<()> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string_pretty(value)?;
        // write-then-rename so a crash never leaves half a file
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> ClientResult<()> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.path(key).exists()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
