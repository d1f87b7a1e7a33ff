//! Order cart
//!
//! Lives with the customer's session and travels to the server inside the
//! order request. Each entry keeps the unit price seen when it was first
//! added, so later menu edits do not change what the customer was shown.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{MenuItem, NewOrderItem};

use crate::utils::validation::validate_cart_line;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    pub menu_item: MenuItem,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl CartEntry {
    /// `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Ordered item → quantity map; never holds a zero-quantity entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one of `item`, capturing its price on first add
    pub fn add(&mut self, item: &MenuItem) {
        match self.entries.iter_mut().find(|e| e.menu_item.id == item.id) {
            Some(entry) => entry.quantity += 1,
            None => self.entries.push(CartEntry {
                menu_item: item.clone(),
                quantity: 1,
                unit_price: item.price,
            }),
        }
    }

    /// Remove one of `menu_item_id`; no-op when absent
    pub fn remove(&mut self, menu_item_id: &str) {
        let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.menu_item.id == menu_item_id)
        else {
            return;
        };
        if self.entries[pos].quantity > 1 {
            self.entries[pos].quantity -= 1;
        } else {
            self.entries.remove(pos);
        }
    }

    pub fn quantity_of(&self, menu_item_id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.menu_item.id == menu_item_id)
            .map_or(0, |e| e.quantity)
    }

    /// `None` when the item is not in the cart or the line overflows
    pub fn line_total(&self, menu_item_id: &str) -> Option<Decimal> {
        self.entries
            .iter()
            .find(|e| e.menu_item.id == menu_item_id)
            .and_then(CartEntry::line_total)
    }

    /// `None` on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.line_total()?))
    }

    /// Check every line of a submitted cart and return its total
    pub fn validated_total(&self) -> Result<Decimal, AppError> {
        for entry in &self.entries {
            validate_cart_line(&entry.menu_item.id, entry.quantity, entry.unit_price)?;
        }
        self.total().ok_or_else(|| {
            AppError::with_message(ErrorCode::InvalidCartLine, "Order total is out of range")
        })
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop entries a deserialized cart may carry with quantity 0
    pub fn normalized(mut self) -> Self {
        self.entries.retain(|e| e.quantity > 0);
        self
    }

    /// Replace the line for `stored.id` with the catalog's copy and price
    pub fn reprice(&mut self, stored: &MenuItem) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.menu_item.id == stored.id) {
            entry.menu_item = stored.clone();
            entry.unit_price = stored.price;
        }
    }

    /// Order lines at the captured unit prices
    pub fn order_items(&self) -> Vec<NewOrderItem> {
        self.entries
            .iter()
            .map(|e| NewOrderItem {
                menu_item_id: e.menu_item.id.clone(),
                quantity: i32::try_from(e.quantity).unwrap_or(i32::MAX),
                price: e.unit_price,
            })
            .collect()
    }
}
