//! Decimal money amounts tagged with a currency.
//!
//! Listing prices are quoted in KRW (no minor unit); totals are shown to
//! buyers in NGN. Conversions always round to the target currency's minor
//! units, midpoint away from zero.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors from money arithmetic.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoneyError {
    /// Two amounts in different currencies were combined.
    #[error("cannot combine {left} with {right}")]
    CurrencyMismatch {
        left: CurrencyCode,
        right: CurrencyCode,
    },
}

/// ISO 4217 currency codes used by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// South Korean won. Listing currency.
    #[default]
    KRW,
    /// Nigerian naira. Default display currency.
    NGN,
    USD,
}

impl CurrencyCode {
    /// The ISO code, e.g. `"KRW"`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::KRW => "KRW",
            Self::NGN => "NGN",
            Self::USD => "USD",
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::KRW => "\u{20a9}",
            Self::NGN => "\u{20a6}",
            Self::USD => "$",
        }
    }

    /// Number of minor-unit digits.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        match self {
            Self::KRW => 0,
            Self::NGN | Self::USD => 2,
        }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "KRW" => Ok(Self::KRW),
            "NGN" => Ok(Self::NGN),
            "USD" => Ok(Self::USD),
            other => Err(format!("unsupported currency: {other}")),
        }
    }
}

/// An amount of money in a specific currency.
///
/// ```
/// use hanbit_core::{CurrencyCode, Money};
///
/// let price = Money::whole(89_000, CurrencyCode::KRW);
/// assert_eq!(price.display(), "\u{20a9}89,000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in the currency's standard unit (won, naira), not minor units.
    pub amount: Decimal,
    pub currency: CurrencyCode,
}

impl Money {
    #[must_use]
    pub const fn new(amount: Decimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// A whole-unit amount, e.g. `Money::whole(15_000, CurrencyCode::KRW)`.
    #[must_use]
    pub fn whole(units: i64, currency: CurrencyCode) -> Self {
        Self::new(Decimal::from(units), currency)
    }

    #[must_use]
    pub const fn zero(currency: CurrencyCode) -> Self {
        Self::new(Decimal::ZERO, currency)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Add two amounts of the same currency.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::CurrencyMismatch`] if the currencies differ.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch {
                left: self.currency,
                right: other.currency,
            });
        }
        Ok(Self::new(self.amount + other.amount, self.currency))
    }

    /// Multiply by a quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self::new(self.amount * Decimal::from(quantity), self.currency)
    }

    /// Multiply by a rate and round to this currency's minor units.
    #[must_use]
    pub fn scale(self, rate: Decimal) -> Self {
        Self::new(round_to(self.amount * rate, self.currency), self.currency)
    }

    /// Convert into `target` with a fixed exchange multiplier.
    #[must_use]
    pub fn convert(self, rate: Decimal, target: CurrencyCode) -> Self {
        Self::new(round_to(self.amount * rate, target), target)
    }

    /// Symbol, thousands separators and the currency's minor digits,
    /// e.g. `₦166,692.50`.
    #[must_use]
    pub fn display(&self) -> String {
        let places = self.currency.decimal_places();
        let rounded = round_to(self.amount, self.currency);
        let text = format!("{:.*}", places as usize, rounded.abs());
        let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

        let mut out = String::with_capacity(text.len() + 8);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            out.push('-');
        }
        out.push_str(self.currency.symbol());
        out.push_str(&group_thousands(whole));
        if !fraction.is_empty() {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

fn round_to(amount: Decimal, currency: CurrencyCode) -> Decimal {
    amount.round_dp_with_strategy(
        currency.decimal_places(),
        RoundingStrategy::MidpointAwayFromZero,
    )
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_display_krw_has_no_minor_units() {
        assert_eq!(Money::whole(113_000, CurrencyCode::KRW).display(), "\u{20a9}113,000");
        assert_eq!(Money::whole(950, CurrencyCode::KRW).display(), "\u{20a9}950");
        assert_eq!(Money::zero(CurrencyCode::KRW).display(), "\u{20a9}0");
    }

    #[test]
    fn test_display_ngn_two_places() {
        let m = Money::new(Decimal::from_str("166692.5").unwrap(), CurrencyCode::NGN);
        assert_eq!(m.display(), "\u{20a6}166,692.50");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(Money::whole(-1_234_567, CurrencyCode::USD).display(), "-$1,234,567.00");
    }

    #[test]
    fn test_checked_add_rejects_mixed_currencies() {
        let won = Money::whole(1, CurrencyCode::KRW);
        let naira = Money::whole(1, CurrencyCode::NGN);
        assert_eq!(
            won.checked_add(naira),
            Err(MoneyError::CurrencyMismatch {
                left: CurrencyCode::KRW,
                right: CurrencyCode::NGN,
            })
        );
        assert_eq!(
            won.checked_add(won).unwrap(),
            Money::whole(2, CurrencyCode::KRW)
        );
    }

    #[test]
    fn test_scale_rounds_midpoint_away_from_zero() {
        let rate = Decimal::from_str("0.15").unwrap();
        // 10 * 0.15 = 1.5 -> 2
        assert_eq!(
            Money::whole(10, CurrencyCode::KRW).scale(rate),
            Money::whole(2, CurrencyCode::KRW)
        );
        assert_eq!(
            Money::whole(113_000, CurrencyCode::KRW).scale(rate),
            Money::whole(16_950, CurrencyCode::KRW)
        );
    }

    #[test]
    fn test_convert_uses_target_precision() {
        let rate = Decimal::from_str("1.15").unwrap();
        let converted = Money::whole(144_950, CurrencyCode::KRW).convert(rate, CurrencyCode::NGN);
        assert_eq!(converted.currency, CurrencyCode::NGN);
        assert_eq!(converted.amount, Decimal::from_str("166692.50").unwrap());
    }

    #[test]
    fn test_currency_from_str() {
        assert_eq!(CurrencyCode::from_str("ngn").unwrap(), CurrencyCode::NGN);
        assert!(CurrencyCode::from_str("JPY").is_err());
    }

    #[test]
    fn test_serde_amount_is_string() {
        let json = serde_json::to_string(&Money::whole(12_000, CurrencyCode::KRW)).unwrap();
        assert_eq!(json, r#"{"amount":"12000","currency":"KRW"}"#);
    }
}
