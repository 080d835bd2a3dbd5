//! Value Objects for pricing and shipping

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{PricingError, Result};

/// Money value object
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money { amount: Decimal, currency: String }

impl Money {
    pub fn new(amount: Decimal, currency: &str) -> Self { Self { amount, currency: currency.to_string() } }
    pub fn usd(amount: Decimal) -> Self { Self::new(amount, "USD") }
    pub fn amount(&self) -> Decimal { self.amount }
    pub fn currency(&self) -> &str { &self.currency }

    /// Amount rounded to cents, half away from zero.
    pub fn rounded(&self) -> Decimal { round_cents(self.amount) }

    pub fn symbol(&self) -> &str {
        match self.currency.as_str() { "USD" => "$", "EUR" => "\u{20ac}", "GBP" => "\u{00a3}", other => other }
    }

    /// Display form with two decimal places, e.g. `$15.00`.
    pub fn display(&self) -> String { format!("{}{:.2}", self.symbol(), self.rounded()) }
}

impl Default for Money { fn default() -> Self { Self::usd(Decimal::ZERO) } }

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.display()) }
}

pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Order quantity, always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(u32);

impl Quantity {
    pub const ONE: Quantity = Quantity(1);

    pub fn new(value: i64) -> Result<Self> {
        match u32::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(PricingError::InvalidQuantity(value)),
        }
    }
    pub fn value(&self) -> u32 { self.0 }
    /// Units beyond the first.
    pub fn additional(&self) -> u32 { self.0 - 1 }
    pub fn as_decimal(&self) -> Decimal { Decimal::from(self.0) }
}

impl Default for Quantity { fn default() -> Self { Self::ONE } }

/// Product weight in kilograms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weight(Decimal);

impl Weight {
    pub fn kg(value: Decimal) -> Result<Self> {
        if value < Decimal::ZERO { return Err(PricingError::InvalidWeight(value)); }
        Ok(Self(value))
    }
    pub fn value(&self) -> Decimal { self.0 }
}

impl Default for Weight { fn default() -> Self { Self(Decimal::ZERO) } }

impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}kg", self.0.normalize()) }
}

/// Buyer country as supplied by the request context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySelection {
    pub name: String,
    pub code: String,
    pub city: Option<String>,
    pub region: Option<String>,
}

impl CountrySelection {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self { name: name.into(), code: code.into(), city: None, region: None }
    }

    pub fn united_states() -> Self { Self::new("United States", "US") }

    /// Uses the supplied name and code when both are present and non-blank,
    /// otherwise falls back to `default`. The city is kept either way.
    pub fn resolve(name: Option<&str>, code: Option<&str>, city: Option<&str>, default: &CountrySelection) -> Self {
        let city = city.map(str::trim).filter(|c| !c.is_empty()).map(str::to_string);
        match (name.map(str::trim), code.map(str::trim)) {
            (Some(n), Some(c)) if !n.is_empty() && !c.is_empty() => {
                Self { name: n.to_string(), code: c.to_uppercase(), city, region: None }
            }
            _ => {
                tracing::debug!(country = %default.name, "buyer country missing, using default");
                Self { city, ..default.clone() }
            }
        }
    }

    /// The default country for a buyer whose (name, code) matched no country row.
    /// The buyer's city is kept.
    pub fn unmatched(&self, default: &CountrySelection) -> Self {
        tracing::debug!(country = %self.name, code = %self.code, fallback = %default.code, "unknown buyer country, using default");
        Self { city: self.city.clone(), ..default.clone() }
    }
}

impl Default for CountrySelection { fn default() -> Self { Self::united_states() } }
