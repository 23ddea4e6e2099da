//! Step form inputs and their validation.
//!
//! Each input struct deserializes straight from a submitted form and turns
//! into the domain value the reducer expects, or into [`FieldErrors`] that
//! the step re-renders next to the offending fields. Only presence is
//! checked, matching required-field semantics; payment detail contents are
//! not validated and are dropped once the method is accepted.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use super::details::{Contact, PaymentMethod, ShippingAddress, ShippingMethod};
use crate::types::Email;

/// Dialling prefix assumed when the form leaves it blank.
pub const DEFAULT_COUNTRY_CODE: &str = "+234";

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn require(&mut self, field: &'static str, value: &str, label: &str) -> String {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            self.insert(field, format!("{label} is required"));
        }
        trimmed.to_owned()
    }

    fn finish<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

/// Deserialize an HTML checkbox: present (any value) means checked.
///
/// # Errors
///
/// Propagates the underlying deserializer's error.
pub fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| !matches!(v.as_str(), "false" | "off" | "0")))
}

/// Contact step form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContactInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub whatsapp_opt_in: bool,
}

impl ContactInput {
    /// Prefill from a previously accepted contact.
    #[must_use]
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            email: contact.email.to_string(),
            phone: contact.phone.clone(),
            country_code: contact.country_code.clone(),
            whatsapp_opt_in: contact.whatsapp_opt_in,
        }
    }

    /// # Errors
    ///
    /// Returns field errors for a missing or malformed email or a missing phone.
    pub fn validate(&self) -> Result<Contact, FieldErrors> {
        let mut errors = FieldErrors::default();

        let email = match Email::parse(&self.email) {
            Ok(email) => Some(email),
            Err(e) => {
                errors.insert("email", capitalize(&e.to_string()));
                None
            }
        };
        let phone = errors.require("phone", &self.phone, "Phone number");
        let country_code = match self.country_code.trim() {
            "" => DEFAULT_COUNTRY_CODE.to_owned(),
            code => code.to_owned(),
        };

        match email {
            Some(email) => errors.finish(Contact {
                email,
                phone,
                country_code,
                whatsapp_opt_in: self.whatsapp_opt_in,
            }),
            None => Err(errors),
        }
    }
}

/// Shipping address step form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AddressInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

impl AddressInput {
    #[must_use]
    pub fn from_address(address: &ShippingAddress) -> Self {
        Self {
            first_name: address.first_name.clone(),
            last_name: address.last_name.clone(),
            address1: address.address1.clone(),
            address2: address.address2.clone().unwrap_or_default(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip: address.zip.clone(),
            country: address.country.clone(),
        }
    }

    /// Zip and the second address line are optional.
    ///
    /// # Errors
    ///
    /// Returns field errors for each missing required field.
    pub fn validate(&self) -> Result<ShippingAddress, FieldErrors> {
        let mut errors = FieldErrors::default();
        let address = ShippingAddress {
            first_name: errors.require("first_name", &self.first_name, "First name"),
            last_name: errors.require("last_name", &self.last_name, "Last name"),
            address1: errors.require("address1", &self.address1, "Address"),
            address2: Some(self.address2.trim().to_owned()).filter(|s| !s.is_empty()),
            city: errors.require("city", &self.city, "City"),
            state: errors.require("state", &self.state, "State"),
            zip: self.zip.trim().to_owned(),
            country: errors.require("country", &self.country, "Country"),
        };
        errors.finish(address)
    }
}

/// Shipping method step form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeliveryInput {
    #[serde(default)]
    pub shipping_method: String,
}

impl DeliveryInput {
    /// # Errors
    ///
    /// Returns a field error unless the choice is `standard` or `express`.
    pub fn validate(&self) -> Result<ShippingMethod, FieldErrors> {
        self.shipping_method.parse().map_err(|_| {
            let mut errors = FieldErrors::default();
            errors.insert("shipping_method", "Choose a shipping method");
            errors
        })
    }
}

/// Payment step form, including the method-specific sub-form.
///
/// The sub-form fields are transient: they are checked for presence here
/// and never reach [`crate::CheckoutState`].
#[derive(Clone, Default, Deserialize)]
pub struct PaymentInput {
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_expiry: String,
    #[serde(default)]
    pub card_cvc: String,
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub mobile_number: String,
}

impl PaymentInput {
    /// # Errors
    ///
    /// Returns field errors for an unknown method or for empty fields of the
    /// selected method's sub-form. Fields of other methods are ignored.
    pub fn validate(&self) -> Result<PaymentMethod, FieldErrors> {
        let mut errors = FieldErrors::default();
        let Ok(method) = self.payment_method.parse::<PaymentMethod>() else {
            errors.insert("payment_method", "Choose a payment method");
            return Err(errors);
        };

        match method {
            PaymentMethod::Card => {
                errors.require("card_number", &self.card_number, "Card number");
                errors.require("card_expiry", &self.card_expiry, "Expiry date");
                errors.require("card_cvc", &self.card_cvc, "CVC");
                errors.require("card_name", &self.card_name, "Name on card");
            }
            PaymentMethod::Mpesa | PaymentMethod::Mtn => {
                errors.require("mobile_number", &self.mobile_number, "Mobile number");
            }
            PaymentMethod::Bank => {}
        }

        errors.finish(method)
    }
}

impl std::fmt::Debug for PaymentInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentInput")
            .field("payment_method", &self.payment_method)
            .field("card_number", &"[REDACTED]")
            .field("card_expiry", &"[REDACTED]")
            .field("card_cvc", &"[REDACTED]")
            .field("card_name", &"[REDACTED]")
            .field("mobile_number", &"[REDACTED]")
            .finish()
    }
}

/// Review step terms checkbox.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TermsInput {
    #[serde(default, deserialize_with = "checkbox")]
    pub accept_terms: bool,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn contact_input() -> ContactInput {
        ContactInput {
            email: "buyer@example.ng".to_string(),
            phone: "8031234567".to_string(),
            country_code: String::new(),
            whatsapp_opt_in: true,
        }
    }

    fn address_input() -> AddressInput {
        AddressInput {
            first_name: "Ada".to_string(),
            last_name: "Okafor".to_string(),
            address1: "12 Marina Road".to_string(),
            address2: "  ".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
            zip: String::new(),
            country: "Nigeria".to_string(),
        }
    }

    #[test]
    fn test_contact_defaults_country_code() {
        let contact = contact_input().validate().unwrap();
        assert_eq!(contact.country_code, DEFAULT_COUNTRY_CODE);
        assert!(contact.whatsapp_opt_in);
    }

    #[test]
    fn test_contact_requires_email_and_phone() {
        let errors = ContactInput::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Email is required"));
        assert_eq!(errors.get("phone"), Some("Phone number is required"));
    }

    #[test]
    fn test_contact_rejects_malformed_email() {
        let input = ContactInput {
            email: "buyer.example.ng".to_string(),
            ..contact_input()
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("email").unwrap().contains('@'));
    }

    #[test]
    fn test_address_zip_is_optional() {
        let address = address_input().validate().unwrap();
        assert_eq!(address.zip, "");
        assert_eq!(address.address2, None);
    }

    #[test]
    fn test_address_requires_core_fields() {
        let errors = AddressInput::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(
            fields,
            vec!["address1", "city", "country", "first_name", "last_name", "state"]
        );
    }

    #[test]
    fn test_delivery_choice() {
        let input = DeliveryInput {
            shipping_method: "express".to_string(),
        };
        assert_eq!(input.validate().unwrap(), ShippingMethod::Express);
        assert!(DeliveryInput::default().validate().is_err());
    }

    #[test]
    fn test_card_requires_its_sub_form() {
        let input = PaymentInput {
            payment_method: "card".to_string(),
            card_number: "4242 4242 4242 4242".to_string(),
            ..PaymentInput::default()
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.get("card_number").is_none());
        assert!(errors.get("card_expiry").is_some());
        assert!(errors.get("card_cvc").is_some());
        assert!(errors.get("card_name").is_some());
    }

    #[test]
    fn test_card_number_contents_are_not_checked() {
        let input = PaymentInput {
            payment_method: "card".to_string(),
            card_number: "not a number".to_string(),
            card_expiry: "x".to_string(),
            card_cvc: "y".to_string(),
            card_name: "z".to_string(),
            ..PaymentInput::default()
        };
        assert_eq!(input.validate().unwrap(), PaymentMethod::Card);
    }

    #[test]
    fn test_mobile_wallets_require_number() {
        for method in ["mpesa", "mtn"] {
            let input = PaymentInput {
                payment_method: method.to_string(),
                ..PaymentInput::default()
            };
            assert!(input.validate().unwrap_err().get("mobile_number").is_some());
        }
    }

    #[test]
    fn test_switching_method_ignores_other_sub_forms() {
        // leftover card fields do not matter once bank is chosen
        let input = PaymentInput {
            payment_method: "bank".to_string(),
            card_number: "4242".to_string(),
            ..PaymentInput::default()
        };
        assert_eq!(input.validate().unwrap(), PaymentMethod::Bank);
    }

    #[test]
    fn test_unknown_payment_method() {
        let errors = PaymentInput::default().validate().unwrap_err();
        assert_eq!(errors.get("payment_method"), Some("Choose a payment method"));
    }

    #[test]
    fn test_payment_debug_redacts_details() {
        let input = PaymentInput {
            payment_method: "card".to_string(),
            card_number: "4111111111111111".to_string(),
            ..PaymentInput::default()
        };
        let debug = format!("{input:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("4111111111111111"));
    }

    #[test]
    fn test_checkbox_deserialization() {
        let checked: TermsInput = serde_json::from_str(r#"{"accept_terms":"on"}"#).unwrap();
        assert!(checked.accept_terms);
        let unchecked: TermsInput = serde_json::from_str("{}").unwrap();
        assert!(!unchecked.accept_terms);
        let explicit: TermsInput = serde_json::from_str(r#"{"accept_terms":"false"}"#).unwrap();
        assert!(!explicit.accept_terms);
    }
}
