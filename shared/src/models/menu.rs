//! Public QR menu

use super::category::CategoryGroup;
use super::product::Product;
use super::restaurant::PublicRestaurant;
use serde::{Deserialize, Serialize};

/// `GET /api/v1/menu/public/:slug`: groups plus available products only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMenu {
    pub restaurant: PublicRestaurant,
    pub groups: Vec<CategoryGroup>,
    pub products: Vec<Product>,
}

impl PublicMenu {
    pub fn products_in(&self, category_id: i64) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| p.category_id == category_id)
    }

    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}
