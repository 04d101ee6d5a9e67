//! Menu catalog with an offline copy

use serde::{Deserialize, Serialize};
use shared::models::{CategoryGroup, Product, PublicMenu};

use crate::http::ApiClient;
use crate::storage::keys;
use crate::ClientResult;

#[derive(Serialize, Deserialize)]
struct CachedMenu {
    slug: String,
    menu: PublicMenu,
}

#[derive(Debug)]
pub struct MenuStore {
    api: ApiClient,
    menu: Option<PublicMenu>,
    selected_category: Option<i64>,
    online: bool,
}

impl MenuStore {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            menu: None,
            selected_category: None,
            online: true,
        }
    }

    /// Fetch the public menu of `slug`
    ///
    /// When the server is unreachable the last menu fetched for the same
    /// restaurant is served instead.
    pub async fn load(&mut self, slug: &str) -> ClientResult<&PublicMenu> {
        let menu = match self.api.public_menu(slug).await {
            Ok(menu) => {
                let cached = CachedMenu {
                    slug: slug.to_string(),
                    menu,
                };
                self.api.storage().set(keys::MENU, &cached)?;
                self.online = true;
                cached.menu
            }
            Err(e) if e.is_transport() => {
                tracing::warn!(slug = slug, error = %e, "Menu fetch failed, using cached copy");
                self.online = false;
                self.api
                    .storage()
                    .get::<CachedMenu>(keys::MENU)
                    .filter(|c| c.slug == slug)
                    .map(|c| c.menu)
                    .ok_or(e)?
            }
            Err(e) => return Err(e),
        };

        if self
            .selected_category
            .is_some_and(|id| !menu.groups.iter().flat_map(|g| &g.categories).any(|c| c.id == id))
        {
            self.selected_category = None;
        }
        Ok(self.menu.insert(menu))
    }

    pub fn menu(&self) -> Option<&PublicMenu> {
        self.menu.as_ref()
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        self.menu.as_ref().map(|m| m.groups.as_slice()).unwrap_or_default()
    }

    /// `None` shows every category
    pub fn select_category(&mut self, category_id: Option<i64>) {
        self.selected_category = category_id;
    }

    pub fn selected_category(&self) -> Option<i64> {
        self.selected_category
    }

    /// Products of the selected category, in menu order
    pub fn visible_products(&self) -> Vec<&Product> {
        let Some(menu) = &self.menu else {
            return Vec::new();
        };
        match self.selected_category {
            Some(id) => menu.products_in(id).collect(),
            None => menu.products.iter().collect(),
        }
    }

    /// Case-insensitive name search across the whole menu
    pub fn search(&self, term: &str) -> Vec<&Product> {
        let term = term.trim().to_lowercase();
        let Some(menu) = &self.menu else {
            return Vec::new();
        };
        menu.products
            .iter()
            .filter(|p| term.is_empty() || p.name.to_lowercase().contains(&term))
            .collect()
    }

    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.menu.as_ref()?.product(product_id)
    }
}
