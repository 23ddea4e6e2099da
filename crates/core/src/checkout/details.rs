//! Buyer details collected by the contact, address, delivery and payment steps.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Email;

/// How to reach the buyer about the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub email: Email,
    pub phone: String,
    /// Dialling prefix, e.g. `+234`.
    pub country_code: String,
    pub whatsapp_opt_in: bool,
}

impl Contact {
    /// Phone number with its dialling prefix.
    #[must_use]
    pub fn full_phone(&self) -> String {
        format!("{} {}", self.country_code, self.phone)
    }
}

/// Delivery destination.
///
/// `zip` may be empty: many destination countries have no postal codes in
/// common use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub address2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl ShippingAddress {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Address lines as they appear on a label.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.address1.clone()];
        if let Some(address2) = &self.address2 {
            lines.push(address2.clone());
        }
        let locality = if self.zip.is_empty() {
            format!("{}, {}", self.city, self.state)
        } else {
            format!("{}, {} {}", self.city, self.state, self.zip)
        };
        lines.push(locality);
        lines.push(self.country.clone());
        lines
    }
}

/// Freight option, priced from a fixed two-tier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// Consolidated sea freight.
    #[default]
    Standard,
    /// Air freight.
    Express,
}

impl ShippingMethod {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Express];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Express => "express",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard sea freight",
            Self::Express => "Express air freight",
        }
    }

    #[must_use]
    pub const fn estimate(self) -> &'static str {
        match self {
            Self::Standard => "25-35 business days",
            Self::Express => "5-8 business days",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ShippingMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "standard" => Ok(Self::Standard),
            "express" => Ok(Self::Express),
            other => Err(format!("unknown shipping method: {other}")),
        }
    }
}

/// How the buyer intends to pay. Only the choice is kept; card numbers and
/// wallet numbers entered alongside it are never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    /// Bank transfer.
    Bank,
    /// M-Pesa mobile money.
    Mpesa,
    /// MTN Mobile Money.
    Mtn,
}

impl PaymentMethod {
    pub const ALL: [Self; 4] = [Self::Card, Self::Bank, Self::Mpesa, Self::Mtn];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::Bank => "bank",
            Self::Mpesa => "mpesa",
            Self::Mtn => "mtn",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Card => "Credit or debit card",
            Self::Bank => "Bank transfer",
            Self::Mpesa => "M-Pesa",
            Self::Mtn => "MTN Mobile Money",
        }
    }

    /// Whether choosing this method reveals a mobile-wallet number field.
    #[must_use]
    pub const fn uses_mobile_wallet(self) -> bool {
        matches!(self, Self::Mpesa | Self::Mtn)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s.trim())
            .ok_or_else(|| format!("unknown payment method: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn address(zip: &str, address2: Option<&str>) -> ShippingAddress {
        ShippingAddress {
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            address1: "12 Marina Road".to_string(),
            address2: address2.map(String::from),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            zip: zip.to_string(),
            country: "Nigeria".to_string(),
        }
    }

    #[test]
    fn test_address_lines_without_zip() {
        assert_eq!(
            address("", None).lines(),
            vec!["12 Marina Road", "Lagos, Lagos", "Nigeria"]
        );
    }

    #[test]
    fn test_address_lines_with_zip_and_line_two() {
        assert_eq!(
            address("101001", Some("Suite 4")).lines(),
            vec!["12 Marina Road", "Suite 4", "Lagos, Lagos 101001", "Nigeria"]
        );
    }

    #[test]
    fn test_payment_method_parse() {
        for method in PaymentMethod::ALL {
            assert_eq!(method.as_str().parse::<PaymentMethod>().unwrap(), method);
        }
        assert!("paypal".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_mobile_wallet_methods() {
        assert!(PaymentMethod::Mpesa.uses_mobile_wallet());
        assert!(PaymentMethod::Mtn.uses_mobile_wallet());
        assert!(!PaymentMethod::Card.uses_mobile_wallet());
        assert!(!PaymentMethod::Bank.uses_mobile_wallet());
    }

    #[test]
    fn test_shipping_method_parse() {
        assert_eq!("express".parse::<ShippingMethod>().unwrap(), ShippingMethod::Express);
        assert!("overnight".parse::<ShippingMethod>().is_err());
    }
}
