//! Shipping fee calculation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::rate::RateFields;
use super::ShippingFeeMethod;
use crate::domain::value_objects::{Money, Quantity, Weight};
use crate::{PricingError, Result};

/// Priced shipping for one order line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeeQuote {
    pub method: ShippingFeeMethod,
    /// First-item fee, per-kg fee or flat fee depending on `method`.
    pub fee: Decimal,
    /// Fee for each additional item; only non-zero for `ITEM`.
    pub extra_fee: Decimal,
    pub total: Decimal,
    pub breakdown: FeeBreakdown,
}

/// How the total was reached, keyed by method.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeeBreakdown {
    Free,
    PerItem { first_item: Decimal, additional_item: Decimal, quantity: u32, total: Decimal },
    PerWeight { per_kg: Decimal, weight: Weight, quantity: u32, total: Decimal },
    Fixed { fee: Decimal, quantity: u32 },
}

impl FeeBreakdown {
    /// Buyer-facing notes explaining the method.
    pub fn notes(&self) -> Vec<&'static str> {
        match self {
            Self::Free => vec!["This product ships for free to your country."],
            Self::PerItem { .. } => {
                let mut notes = vec!["This store calculates the delivery fee based on the number of items in the order."];
                if self.has_additional_item_rate() {
                    notes.push("If you purchase multiple items, you'll receive a discounted delivery fee.");
                }
                notes
            }
            Self::PerWeight { .. } => vec!["This store calculates the delivery fee based on product weight."],
            Self::Fixed { .. } => vec!["This store calculates the delivery fee on a fixed price."],
        }
    }

    /// Whether the first and additional items are billed differently.
    pub fn has_additional_item_rate(&self) -> bool {
        matches!(self, Self::PerItem { first_item, additional_item, .. }
            if first_item != additional_item && !additional_item.is_zero())
    }
}

impl fmt::Display for FeeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let usd = |d: Decimal| Money::usd(d).display();
        match self {
            Self::Free => write!(f, "Free shipping"),
            Self::PerItem { first_item, additional_item, quantity, total } => {
                if *quantity == 1 || first_item == additional_item {
                    write!(f, "{} (fee) x {} (items) = {}", usd(*first_item), quantity, usd(*total))
                } else {
                    write!(f, "{} (first item) + {} (additional items) x {} = {}",
                        usd(*first_item), quantity - 1, usd(*additional_item), usd(*total))
                }
            }
            Self::PerWeight { per_kg, weight, quantity, total } => {
                write!(f, "{} (fee) x {} (weight) x {} (items) = {}", usd(*per_kg), weight, quantity, usd(*total))
            }
            Self::Fixed { fee, .. } => write!(f, "{} (quantity doesn't affect shipping fee)", usd(*fee)),
        }
    }
}

/// Prices shipping for `quantity` units weighing `weight` kg each.
///
/// Free shipping zeroes both the fee and the extra fee whatever the method.
/// Quantity below one and negative weight are rejected, never clamped.
pub fn compute_fee(method: ShippingFeeMethod, rate: &RateFields, is_free_shipping: bool, quantity: i64, weight: Decimal) -> Result<FeeQuote> {
    let (fee, extra_fee) = unit_fees(method, rate, is_free_shipping);
    quote(method, fee, extra_fee, is_free_shipping, quantity, weight)
}

/// Per-unit fees shown for a method before quantity is applied.
pub(crate) fn unit_fees(method: ShippingFeeMethod, rate: &RateFields, is_free_shipping: bool) -> (Decimal, Decimal) {
    if is_free_shipping { return (Decimal::ZERO, Decimal::ZERO); }
    match method {
        ShippingFeeMethod::Item => (rate.fee_per_item, rate.fee_for_additional_item),
        ShippingFeeMethod::Weight => (rate.fee_per_kg, Decimal::ZERO),
        ShippingFeeMethod::Fixed => (rate.fee_fixed, Decimal::ZERO),
    }
}

pub(crate) fn quote(method: ShippingFeeMethod, fee: Decimal, extra_fee: Decimal, is_free_shipping: bool, quantity: i64, weight: Decimal) -> Result<FeeQuote> {
    let quantity = Quantity::new(quantity)?;
    let weight = Weight::kg(weight)?;
    let q = quantity.value();
    let overflow = || PricingError::FeeOverflow { quantity: q };

    let (total, breakdown) = if is_free_shipping {
        (Decimal::ZERO, FeeBreakdown::Free)
    } else {
        match method {
            ShippingFeeMethod::Item => {
                let total = Decimal::from(quantity.additional()).checked_mul(extra_fee)
                    .and_then(|extra| fee.checked_add(extra))
                    .ok_or_else(overflow)?;
                (total, FeeBreakdown::PerItem { first_item: fee, additional_item: extra_fee, quantity: q, total })
            }
            ShippingFeeMethod::Weight => {
                let total = fee.checked_mul(weight.value())
                    .and_then(|per_unit| per_unit.checked_mul(quantity.as_decimal()))
                    .ok_or_else(overflow)?;
                (total, FeeBreakdown::PerWeight { per_kg: fee, weight, quantity: q, total })
            }
            ShippingFeeMethod::Fixed => (fee, FeeBreakdown::Fixed { fee, quantity: q }),
        }
    };
    tracing::debug!(%method, quantity = q, %total, is_free_shipping, "computed shipping fee");
    Ok(FeeQuote { method, fee, extra_fee, total, breakdown })
}
