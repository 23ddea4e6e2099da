//! Newtype identifiers.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Macro to define a type-safe ID wrapper around `i32`.
///
/// Creates a newtype with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `Display`
/// - `new()`, `as_i32()`, `From<i32>` and `Into<i32>`
/// - `FromStr`, so ids can be read straight out of form fields
///
/// # Example
///
/// ```rust
/// # use hanbit_core::define_id;
/// define_id!(ListingId);
///
/// let id: ListingId = "42".parse().unwrap();
/// assert_eq!(id.as_i32(), 42);
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Create a new ID from an i32 value.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// Get the underlying i32 value.
            #[must_use]
            pub const fn as_i32(&self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = ::core::num::ParseIntError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.trim().parse::<i32>().map(Self)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(CartItemId);

/// Confirmation identifier assigned by the order backend.
///
/// Opaque to this crate; only guaranteed non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderReference(String);

impl OrderReference {
    /// Wrap a backend-issued reference.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference is blank.
    pub fn parse(s: &str) -> Result<Self, String> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err("order reference cannot be empty".to_string());
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for OrderReference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<OrderReference> for String {
    fn from(reference: OrderReference) -> Self {
        reference.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_form_value() {
        let id: CartItemId = " 7 ".parse().unwrap();
        assert_eq!(id, CartItemId::new(7));
        assert!("seven".parse::<CartItemId>().is_err());
    }

    #[test]
    fn test_order_reference_rejects_blank() {
        assert!(OrderReference::parse("   ").is_err());
        assert_eq!(OrderReference::parse(" HB-1001 ").unwrap().as_str(), "HB-1001");
    }

    #[test]
    fn test_order_reference_deserialize_validates() {
        assert!(serde_json::from_str::<OrderReference>(r#""""#).is_err());
        let reference: OrderReference = serde_json::from_str(r#""HB-2""#).unwrap();
        assert_eq!(reference.to_string(), "HB-2");
    }
}
