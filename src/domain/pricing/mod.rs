//! Size pricing
//!
//! Without a selected size a variant shows the range of its discounted size
//! prices; with one it shows that size's exact price and stock.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{round_cents, Money, Quantity};
use crate::{PricingError, Result, SizeOption};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PriceResult {
    /// No sizes configured; the variant cannot be purchased.
    Unavailable,
    Range(PriceRange),
    Exact(SizePrice),
}

impl PriceResult {
    pub fn is_purchasable(&self) -> bool { !matches!(self, Self::Unavailable) }

    pub fn display(&self) -> Option<String> {
        match self {
            Self::Unavailable => None,
            Self::Range(r) => Some(r.display()),
            Self::Exact(p) => Some(Money::usd(p.price).display()),
        }
    }
}

/// Discounted price bounds across all sizes, kept at full precision.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Only set when every size shows the same price and it carries a discount.
    pub discount: Option<Decimal>,
    pub total_quantity: u64,
}

impl PriceRange {
    /// Bounds are compared at display precision.
    pub fn is_single_price(&self) -> bool { round_cents(self.min_price) == round_cents(self.max_price) }

    /// `$15.00 - $20.00`, or `$20.00` when the bounds agree.
    pub fn display(&self) -> String {
        let (min, max) = (Money::usd(self.min_price), Money::usd(self.max_price));
        if self.is_single_price() { min.display() } else { format!("{} - {}", min.display(), max.display()) }
    }
}

/// Exact price of the selected size.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizePrice {
    pub size_id: Uuid,
    pub size: String,
    pub price: Decimal,
    /// List price, present only when the discount changes it.
    pub original_price: Option<Decimal>,
    pub discount: Decimal,
    pub stock: u32,
}

impl SizePrice {
    pub fn quantity_bounds(&self) -> QuantityBounds { QuantityBounds::new(self.stock) }
}

/// Allowed quantity selector range `[1, stock]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityBounds { pub min: u32, pub max: u32 }

impl QuantityBounds {
    pub fn new(stock: u32) -> Self { Self { min: 1, max: stock } }
    pub fn is_empty(&self) -> bool { self.max < self.min }

    pub fn check(&self, requested: i64) -> Result<Quantity> {
        let quantity = Quantity::new(requested)?;
        if quantity.value() > self.max {
            return Err(PricingError::QuantityExceedsStock { requested: quantity.value(), available: self.max });
        }
        Ok(quantity)
    }

    /// Next quantity up, held at the stock limit.
    pub fn increase(&self, current: u32) -> u32 { if current < self.max { current + 1 } else { current } }

    /// Next quantity down, never below one.
    pub fn decrease(&self, current: u32) -> u32 { if current > self.min { current - 1 } else { current } }
}

/// Resolves the displayed price for a variant's sizes.
///
/// An empty size list yields [`PriceResult::Unavailable`]. A selected id that
/// matches no size is [`PricingError::SizeNotFound`].
pub fn resolve_price(sizes: &[SizeOption], selected_size_id: Option<Uuid>) -> Result<PriceResult> {
    if sizes.is_empty() { return Ok(PriceResult::Unavailable); }
    match selected_size_id {
        None => Ok(PriceResult::Range(price_range(sizes))),
        Some(id) => {
            let size = sizes.iter().find(|s| s.id == id).ok_or(PricingError::SizeNotFound(id))?;
            let price = size.discounted_price();
            tracing::debug!(size_id = %id, %price, "resolved size price");
            Ok(PriceResult::Exact(SizePrice {
                size_id: size.id,
                size: size.size.clone(),
                price,
                original_price: (price != size.price).then_some(size.price),
                discount: size.discount,
                stock: size.quantity,
            }))
        }
    }
}

fn price_range(sizes: &[SizeOption]) -> PriceRange {
    let prices: Vec<Decimal> = sizes.iter().map(SizeOption::discounted_price).collect();
    let min_price = prices.iter().copied().min().unwrap_or_default();
    let max_price = prices.iter().copied().max().unwrap_or_default();
    let total_quantity = sizes.iter().map(|s| u64::from(s.quantity)).sum();

    let single = round_cents(min_price) == round_cents(max_price);
    let discount = if single {
        sizes.iter()
            .zip(&prices)
            .find(|(s, p)| s.discount > Decimal::ZERO && round_cents(**p) == round_cents(min_price))
            .map(|(s, _)| s.discount)
    } else {
        None
    };
    PriceRange { min_price, max_price, discount, total_quantity }
}
