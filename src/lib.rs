//! Marketplace Pricing Engine
//!
//! Shipping fee and price resolution for a multi-vendor storefront.
//!
//! ## Features
//! - Per-field shipping rate resolution (country override over store defaults)
//! - Free-shipping eligibility per product
//! - Shipping fee quotes for item, weight and fixed methods
//! - Price ranges and exact size prices with discounts
//! - Rating statistics

pub mod api;
pub mod config;
pub mod domain;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// Core Types
// =============================================================================

/// Reference country record. Lookups are keyed by the (name, code) pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub id: Uuid,
    pub name: String,
    pub code: String,
}

/// Per-(store, country) shipping override. Every field may be absent.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub shipping_service: Option<String>,
    pub shipping_fee_per_item: Option<Decimal>,
    pub shipping_fee_for_additional_item: Option<Decimal>,
    pub shipping_fee_per_kg: Option<Decimal>,
    pub shipping_fee_fixed: Option<Decimal>,
    pub delivery_time_min: Option<u32>,
    pub delivery_time_max: Option<u32>,
    pub return_policy: Option<String>,
}

/// Store-wide shipping configuration, the fallback for every rate field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreShippingDefaults {
    pub shipping_service: String,
    pub shipping_fee_per_item: Decimal,
    pub shipping_fee_for_additional_item: Decimal,
    pub shipping_fee_per_kg: Decimal,
    pub shipping_fee_fixed: Decimal,
    pub delivery_time_min: u32,
    pub delivery_time_max: u32,
    pub return_policy: String,
}

/// Countries that ship a product for free.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeShippingRule {
    pub eligible_countries: HashSet<Uuid>,
}

impl FreeShippingRule {
    pub fn new(countries: impl IntoIterator<Item = Uuid>) -> Self {
        Self { eligible_countries: countries.into_iter().collect() }
    }
}

/// A purchasable size of a product variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    pub id: Uuid,
    pub size: String,
    pub quantity: u32,
    pub price: Decimal,
    /// Percentage in `[0, 100]`.
    pub discount: Decimal,
}

impl SizeOption {
    /// List price reduced by the size's discount, full precision.
    pub fn discounted_price(&self) -> Decimal {
        self.price * (Decimal::ONE - self.discount / Decimal::ONE_HUNDRED)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub rating: f64,
    pub has_images: bool,
}

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("No shipping configuration for store {store_id} and country {country}")]
    ConfigurationMissing { store_id: Uuid, country: String },

    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Invalid weight: {0}")]
    InvalidWeight(Decimal),

    #[error("Unknown shipping method: {0}")]
    UnknownShippingMethod(String),

    #[error("Size not found: {0}")]
    SizeNotFound(Uuid),

    #[error("Quantity {requested} exceeds available stock ({available})")]
    QuantityExceedsStock { requested: u32, available: u32 },

    #[error("Shipping fee overflowed for quantity {quantity}")]
    FeeOverflow { quantity: u32 },
}

pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_discounted_price() {
        let size = SizeOption { id: Uuid::new_v4(), size: "M".into(), quantity: 4, price: dec!(30), discount: dec!(50) };
        assert_eq!(size.discounted_price(), dec!(15));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(PricingError::InvalidQuantity(0).to_string(), "Invalid quantity: 0");
        assert_eq!(PricingError::UnknownShippingMethod("PALLET".into()).to_string(), "Unknown shipping method: PALLET");
    }
}
