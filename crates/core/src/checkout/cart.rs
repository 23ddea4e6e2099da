//! Cart lines and quantity rules.
//!
//! Quantities are `NonZeroU32`, so a zero-quantity line cannot exist.
//! Decrementing stops at one; taking the last unit away is a removal.

use std::collections::HashSet;
use std::num::NonZeroU32;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CartItemId, CurrencyCode, Money};

/// Errors from cart operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemId),
    #[error("cart item {0} appears more than once")]
    DuplicateItem(CartItemId),
    #[error("cart item {id} is priced in {currency}, expected {expected}", expected = Cart::LISTING_CURRENCY)]
    UnsupportedCurrency { id: CartItemId, currency: CurrencyCode },
    #[error("cart item {0} quantity is at its maximum")]
    QuantityOverflow(CartItemId),
}

/// A line entry: a part reference, unit price and quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub name: String,
    pub part_number: String,
    pub unit_price: Money,
    pub quantity: NonZeroU32,
}

impl CartItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity.get())
    }
}

/// Ordered cart contents with unique item ids.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Currency every cart line is priced in.
    pub const LISTING_CURRENCY: CurrencyCode = CurrencyCode::KRW;

    /// Build a cart, checking id uniqueness and pricing currency.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::DuplicateItem`] or [`CartError::UnsupportedCurrency`].
    pub fn new(items: Vec<CartItem>) -> Result<Self, CartError> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(item.id) {
                return Err(CartError::DuplicateItem(item.id));
            }
            if item.unit_price.currency != Self::LISTING_CURRENCY {
                return Err(CartError::UnsupportedCurrency {
                    id: item.id,
                    currency: item.unit_price.currency,
                });
            }
        }
        Ok(Self { items })
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: CartItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity.get()))
    }

    /// Σ(unit price × quantity), in the listing currency.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        let amount: Decimal = self
            .items
            .iter()
            .map(|item| item.line_total().amount)
            .sum();
        Money::new(amount, Self::LISTING_CURRENCY)
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown id.
    pub fn increment(&mut self, id: CartItemId) -> Result<NonZeroU32, CartError> {
        let item = self.item_mut(id)?;
        item.quantity = item
            .quantity
            .checked_add(1)
            .ok_or(CartError::QuantityOverflow(id))?;
        Ok(item.quantity)
    }

    /// Take one unit off a line, never going below one.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown id.
    pub fn decrement(&mut self, id: CartItemId) -> Result<NonZeroU32, CartError> {
        let item = self.item_mut(id)?;
        if let Some(lower) = NonZeroU32::new(item.quantity.get() - 1) {
            item.quantity = lower;
        }
        Ok(item.quantity)
    }

    /// Remove a whole line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ItemNotFound`] for an unknown id.
    pub fn remove(&mut self, id: CartItemId) -> Result<CartItem, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))?;
        Ok(self.items.remove(index))
    }

    fn item_mut(&mut self, id: CartItemId) -> Result<&mut CartItem, CartError> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(CartError::ItemNotFound(id))
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
