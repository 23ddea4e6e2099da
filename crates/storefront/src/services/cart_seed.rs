//! The cart a new checkout starts from.
//!
//! A cart service would normally supply this per buyer. Until one exists,
//! checkouts start from a fixed set of parts, optionally read from a JSON
//! file (an array of cart items).

use std::num::NonZeroU32;
use std::path::Path;

use hanbit_core::{Cart, CartError, CartItem, CartItemId, CurrencyCode, Money};
use thiserror::Error;

/// Errors loading a seed cart file.
#[derive(Debug, Error)]
pub enum SeedCartError {
    #[error("failed to read seed cart {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid seed cart JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid seed cart: {0}")]
    Cart(#[from] CartError),
}

/// Initial cart contents for every new checkout.
#[derive(Debug, Clone)]
pub struct SeedCart(Cart);

impl SeedCart {
    /// Built-in mock parts.
    #[must_use]
    pub fn builtin() -> Self {
        let items = [
            (1, "Hyundai Tucson front brake pad set", "58101-D3A10", 89_000, 1),
            (2, "Kia Sportage oil filter", "26300-35505", 12_000, 2),
            (3, "Hyundai Elantra LED headlamp assembly", "92101-F2000", 245_000, 1),
        ]
        .into_iter()
        .filter_map(|(id, name, part_number, price, quantity)| {
            Some(CartItem {
                id: CartItemId::new(id),
                name: name.to_string(),
                part_number: part_number.to_string(),
                unit_price: Money::whole(price, CurrencyCode::KRW),
                quantity: NonZeroU32::new(quantity)?,
            })
        })
        .collect();

        Self(Cart::new(items).unwrap_or_default())
    }

    /// Read a seed cart from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// breaks cart rules (duplicate ids, zero quantities, non-KRW prices).
    pub fn load(path: &Path) -> Result<Self, SeedCartError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedCartError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse a seed cart from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid JSON or cart rule violations.
    pub fn from_json(raw: &str) -> Result<Self, SeedCartError> {
        let items: Vec<CartItem> = serde_json::from_str(raw)?;
        Ok(Self(Cart::new(items)?))
    }

    /// Builtin parts, or the file if one is configured.
    ///
    /// # Errors
    ///
    /// See [`SeedCart::load`].
    pub fn from_path(path: Option<&Path>) -> Result<Self, SeedCartError> {
        path.map_or_else(|| Ok(Self::builtin()), Self::load)
    }

    /// A fresh copy of the seed contents.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.0.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_not_empty() {
        let cart = SeedCart::builtin().cart();
        assert_eq!(cart.len(), 3);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.subtotal(), Money::whole(358_000, CurrencyCode::KRW));
    }

    #[test]
    fn test_from_json() {
        let seed = SeedCart::from_json(
            r#"[{"id":10,"name":"Kia K5 wiper blade","part_number":"98350-L2000","unit_price":{"amount":"9500","currency":"KRW"},"quantity":2}]"#,
        )
        .unwrap();
        assert_eq!(seed.cart().item_count(), 2);
    }

    #[test]
    fn test_from_json_rejects_duplicates() {
        let item = r#"{"id":1,"name":"a","part_number":"b","unit_price":{"amount":"1","currency":"KRW"},"quantity":1}"#;
        let err = SeedCart::from_json(&format!("[{item},{item}]")).unwrap_err();
        assert!(matches!(err, SeedCartError::Cart(CartError::DuplicateItem(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = SeedCart::load(Path::new("/nonexistent/seed.json")).unwrap_err();
        assert!(matches!(err, SeedCartError::Io { .. }));
    }

    #[test]
    fn test_from_path_defaults_to_builtin() {
        assert_eq!(SeedCart::from_path(None).unwrap().cart(), SeedCart::builtin().cart());
    }
}
