//! Order pricing: subtotal, shipping, customs estimate and converted total.
//!
//! [`quote`] is the single source for every figure shown in the checkout
//! summary and on the review page, so the two can never disagree.
//!
//! ```
//! use hanbit_core::pricing::{PricingTable, quote};
//! use hanbit_core::{Cart, ShippingMethod, Step};
//!
//! let summary = quote(&Cart::default(), ShippingMethod::Standard, Step::Cart, &PricingTable::default())?;
//! assert!(summary.total.is_zero());
//! # Ok::<(), hanbit_core::pricing::PricingError>(())
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::checkout::{Cart, ShippingMethod, Step};
use crate::types::{CurrencyCode, Money, MoneyError};

/// Errors in a pricing table.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("{0} must not be negative")]
    Negative(&'static str),
    #[error("shipping costs must be quoted in {expected}, got {actual}")]
    WrongCurrency {
        expected: CurrencyCode,
        actual: CurrencyCode,
    },
    #[error("express shipping must cost more than standard shipping")]
    ExpressNotDearer,
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Fixed rates the calculator works from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTable {
    pub standard_shipping: Money,
    pub express_shipping: Money,
    /// Flat share of the subtotal charged as estimated import duty.
    pub customs_rate: Decimal,
    /// Listing-currency to display-currency multiplier. Not a live rate.
    pub exchange_rate: Decimal,
    pub display_currency: CurrencyCode,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            standard_shipping: Money::whole(15_000, Cart::LISTING_CURRENCY),
            express_shipping: Money::whole(45_000, Cart::LISTING_CURRENCY),
            customs_rate: Decimal::new(15, 2),
            exchange_rate: Decimal::new(115, 2),
            display_currency: CurrencyCode::NGN,
        }
    }
}

impl PricingTable {
    /// Check the table is usable.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] for negative rates or costs, shipping not
    /// quoted in the listing currency, or express not dearer than standard.
    pub fn validate(&self) -> Result<(), PricingError> {
        for (name, cost) in [
            ("standard shipping", self.standard_shipping),
            ("express shipping", self.express_shipping),
        ] {
            if cost.currency != Cart::LISTING_CURRENCY {
                return Err(PricingError::WrongCurrency {
                    expected: Cart::LISTING_CURRENCY,
                    actual: cost.currency,
                });
            }
            if cost.amount.is_sign_negative() {
                return Err(PricingError::Negative(name));
            }
        }
        if self.customs_rate.is_sign_negative() {
            return Err(PricingError::Negative("customs rate"));
        }
        if self.exchange_rate.is_sign_negative() {
            return Err(PricingError::Negative("exchange rate"));
        }
        if self.express_shipping.amount <= self.standard_shipping.amount {
            return Err(PricingError::ExpressNotDearer);
        }
        Ok(())
    }

    /// Fixed cost of a shipping method.
    #[must_use]
    pub const fn shipping_cost(&self, method: ShippingMethod) -> Money {
        match method {
            ShippingMethod::Standard => self.standard_shipping,
            ShippingMethod::Express => self.express_shipping,
        }
    }

    /// Convert a listing-currency amount for display.
    #[must_use]
    pub fn to_display(&self, amount: Money) -> Money {
        amount.convert(self.exchange_rate, self.display_currency)
    }
}

/// Shipping as shown in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "cost", rename_all = "snake_case")]
pub enum ShippingQuote {
    /// Not shown until the buyer reaches the shipping method step.
    Pending,
    Resolved(Money),
}

impl ShippingQuote {
    /// Cost counted towards the total; nothing while pending.
    #[must_use]
    pub const fn charged(&self) -> Option<Money> {
        match self {
            Self::Pending => None,
            Self::Resolved(cost) => Some(*cost),
        }
    }
}

/// Every figure in the order summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub item_count: u32,
    /// Listing currency.
    pub subtotal: Money,
    pub shipping: ShippingQuote,
    /// Listing currency, rounded to whole units.
    pub customs_estimate: Money,
    /// Subtotal + charged shipping + customs, listing currency.
    pub total: Money,
    /// `total` converted at the table's fixed rate.
    pub display_total: Money,
}

/// Price a cart for a given shipping method at a given step.
///
/// # Errors
///
/// Returns [`PricingError::Money`] if the table's shipping costs are not in
/// the cart's currency.
pub fn quote(
    cart: &Cart,
    shipping_method: ShippingMethod,
    step: Step,
    table: &PricingTable,
) -> Result<OrderSummary, PricingError> {
    let subtotal = cart.subtotal();
    let shipping = if step.reveals_shipping_cost() {
        ShippingQuote::Resolved(table.shipping_cost(shipping_method))
    } else {
        ShippingQuote::Pending
    };
    let customs_estimate = subtotal.scale(table.customs_rate);

    let charged_shipping = shipping
        .charged()
        .unwrap_or_else(|| Money::zero(subtotal.currency));
    let total = subtotal
        .checked_add(charged_shipping)?
        .checked_add(customs_estimate)?;

    Ok(OrderSummary {
        item_count: cart.item_count(),
        subtotal,
        shipping,
        customs_estimate,
        total,
        display_total: table.to_display(total),
    })
}
