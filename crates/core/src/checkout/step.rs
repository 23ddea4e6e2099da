//! Checkout steps and their fixed order.

use core::fmt;

use serde::{Deserialize, Serialize};

/// One named stage in the fixed checkout sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Cart,
    Contact,
    /// Shipping address.
    Shipping,
    /// Shipping method.
    Delivery,
    Payment,
    Review,
    Confirmation,
}

impl Step {
    /// Every step, in forward order.
    pub const ALL: [Self; 7] = [
        Self::Cart,
        Self::Contact,
        Self::Shipping,
        Self::Delivery,
        Self::Payment,
        Self::Review,
        Self::Confirmation,
    ];

    /// The step a "Next" action leads to. `None` for the terminal step.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Cart => Some(Self::Contact),
            Self::Contact => Some(Self::Shipping),
            Self::Shipping => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => Some(Self::Review),
            Self::Review => Some(Self::Confirmation),
            Self::Confirmation => None,
        }
    }

    /// The step a "Back" action leads to. `None` where going back is not
    /// offered (the first step and the terminal step).
    #[must_use]
    pub const fn previous(self) -> Option<Self> {
        match self {
            Self::Cart | Self::Confirmation => None,
            Self::Contact => Some(Self::Cart),
            Self::Shipping => Some(Self::Contact),
            Self::Delivery => Some(Self::Shipping),
            Self::Payment => Some(Self::Delivery),
            Self::Review => Some(Self::Payment),
        }
    }

    /// 1-based position in the sequence.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::Cart => 1,
            Self::Contact => 2,
            Self::Shipping => 3,
            Self::Delivery => 4,
            Self::Payment => 5,
            Self::Review => 6,
            Self::Confirmation => 7,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cart => "cart",
            Self::Contact => "contact",
            Self::Shipping => "shipping",
            Self::Delivery => "delivery",
            Self::Payment => "payment",
            Self::Review => "review",
            Self::Confirmation => "confirmation",
        }
    }

    /// Heading shown to buyers.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Cart => "Cart",
            Self::Contact => "Contact",
            Self::Shipping => "Shipping address",
            Self::Delivery => "Shipping method",
            Self::Payment => "Payment",
            Self::Review => "Review",
            Self::Confirmation => "Confirmation",
        }
    }

    /// Steps the review page links back to with "Edit".
    #[must_use]
    pub const fn is_editable_from_review(self) -> bool {
        matches!(
            self,
            Self::Contact | Self::Shipping | Self::Delivery | Self::Payment
        )
    }

    /// Whether the shipping cost is known by the time this step is shown.
    #[must_use]
    pub const fn reveals_shipping_cost(self) -> bool {
        matches!(
            self,
            Self::Delivery | Self::Payment | Self::Review | Self::Confirmation
        )
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| format!("unknown checkout step: {s}"))
    }
}
