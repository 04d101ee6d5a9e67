//! Shopping cart for the QR menu

use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::Product;
use shared::money;
use shared::order::{CreateOrderItem, CreateOrderRequest, Order};

use super::orders::OrderStore;
use crate::ClientResult;
use crate::storage::{LocalStorage, keys};

/// One product in the cart, with the price shown when it was added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        money::line_subtotal(self.price, self.quantity)
    }
}

/// Cart persisted under `cart`
#[derive(Debug)]
pub struct CartStore {
    storage: LocalStorage,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Restore the cart left on this device
    pub fn load(storage: LocalStorage) -> Self {
        let lines = storage.get(keys::CART).unwrap_or_default();
        Self { storage, lines }
    }

    fn persist(&self) -> ClientResult<()> {
        self.storage.set(keys::CART, &self.lines)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add one unit of `product`
    pub fn add(&mut self, product: &Product) -> ClientResult<()> {
        if !product.is_available {
            return Err(AppError::new(ErrorCode::ProductUnavailable)
                .with_detail("productId", product.id)
                .into());
        }
        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                money::validate_quantity(line.quantity + 1)?;
                line.quantity += 1;
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
            }),
        }
        self.persist()
    }

    pub fn increment(&mut self, product_id: i64) -> ClientResult<()> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            money::validate_quantity(line.quantity + 1)?;
            line.quantity += 1;
            self.persist()?;
        }
        Ok(())
    }

    /// Remove one unit; the line goes away at zero
    pub fn decrement(&mut self, product_id: i64) -> ClientResult<()> {
        if let Some(pos) = self.lines.iter().position(|l| l.product_id == product_id) {
            if self.lines[pos].quantity <= 1 {
                self.lines.remove(pos);
            } else {
                self.lines[pos].quantity -= 1;
            }
            self.persist()?;
        }
        Ok(())
    }

    pub fn remove(&mut self, product_id: i64) -> ClientResult<()> {
        self.lines.retain(|l| l.product_id != product_id);
        self.persist()
    }

    pub fn clear(&mut self) -> ClientResult<()> {
        self.lines.clear();
        self.storage.remove(keys::CART)
    }

    pub fn total(&self) -> f64 {
        money::order_total(self.lines.iter().map(|l| (l.price, l.quantity)))
    }

    pub fn item_count(&self) -> i32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Place the cart as an order and empty it
    ///
    /// The order store decides between the server and the offline outbox;
    /// the cart is kept when the order is rejected.
    pub async fn checkout(
        &mut self,
        orders: &mut OrderStore,
        table_number: Option<i32>,
        note: Option<String>,
    ) -> ClientResult<Order> {
        if self.lines.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        let request = CreateOrderRequest {
            table_number,
            items: self
                .lines
                .iter()
                .map(|l| CreateOrderItem {
                    product_id: l.product_id,
                    name: l.name.clone(),
                    price: l.price,
                    quantity: l.quantity,
                })
                .collect(),
            note,
            source: None,
        };

        let order = orders.create_order(request).await?;
        self.clear()?;
        Ok(order)
    }
}
