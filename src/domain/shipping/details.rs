//! Resolved shipping details and delivery windows

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fee::{self, FeeQuote};
use super::rate::RateFields;
use super::ShippingFeeMethod;
use crate::domain::value_objects::CountrySelection;
use crate::Result;

/// Shipping copy for a product page, recomputed on every view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShippingDetails {
    pub shipping_fee_method: ShippingFeeMethod,
    pub shipping_service: String,
    pub fee: Decimal,
    pub extra_fee: Decimal,
    pub delivery_time_min: u32,
    pub delivery_time_max: u32,
    pub return_policy: String,
    pub country_code: String,
    pub country_name: String,
    pub city: Option<String>,
    pub is_free_shipping: bool,
}

impl ShippingDetails {
    pub fn resolve(method: ShippingFeeMethod, rate: &RateFields, is_free_shipping: bool, buyer: &CountrySelection) -> Self {
        let (fee, extra_fee) = fee::unit_fees(method, rate, is_free_shipping);
        Self {
            shipping_fee_method: method,
            shipping_service: rate.shipping_service.clone(),
            fee,
            extra_fee,
            delivery_time_min: rate.delivery_time_min,
            delivery_time_max: rate.delivery_time_max,
            return_policy: rate.return_policy.clone(),
            country_code: buyer.code.clone(),
            country_name: buyer.name.clone(),
            city: buyer.city.clone(),
            is_free_shipping,
        }
    }

    /// Prices these details for an order of `quantity` units of `weight` kg.
    pub fn quote(&self, quantity: i64, weight: Decimal) -> Result<FeeQuote> {
        fee::quote(self.shipping_fee_method, self.fee, self.extra_fee, self.is_free_shipping, quantity, weight)
    }

    pub fn delivery_window(&self, today: NaiveDate) -> DeliveryWindow {
        DeliveryWindow::from_today(today, self.delivery_time_min, self.delivery_time_max)
    }

    /// Headline copy, e.g. `Shipping to Canada` or `Free Shipping to Canada`.
    pub fn headline(&self) -> String {
        if self.is_free_shipping { format!("Free Shipping to {}", self.country_name) } else { format!("Shipping to {}", self.country_name) }
    }
}

/// Earliest and latest expected delivery dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryWindow {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl DeliveryWindow {
    pub fn from_today(today: NaiveDate, min_days: u32, max_days: u32) -> Self {
        let add = |days: u32| today.checked_add_days(Days::new(u64::from(days))).unwrap_or(NaiveDate::MAX);
        Self { earliest: add(min_days), latest: add(max_days) }
    }
}

impl fmt::Display for DeliveryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.earliest.format("%b %d %Y"), self.latest.format("%b %d %Y"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate() -> RateFields {
        RateFields {
            shipping_service: "Standard".into(),
            fee_per_item: dec!(5),
            fee_for_additional_item: dec!(2),
            fee_per_kg: dec!(0),
            fee_fixed: dec!(0),
            delivery_time_min: 3,
            delivery_time_max: 7,
            return_policy: "30 day returns".into(),
        }
    }

    #[test]
    fn test_details_and_quote() {
        let mut buyer = CountrySelection::new("Canada", "CA");
        buyer.city = Some("Toronto".into());
        let details = ShippingDetails::resolve(ShippingFeeMethod::Item, &rate(), false, &buyer);
        assert_eq!((details.fee, details.extra_fee), (dec!(5), dec!(2)));
        assert_eq!(details.city.as_deref(), Some("Toronto"));
        assert_eq!(details.headline(), "Shipping to Canada");
        assert_eq!(details.quote(3, dec!(0)).unwrap().total, dec!(9));
    }

    #[test]
    fn test_delivery_window() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let details = ShippingDetails::resolve(ShippingFeeMethod::Item, &rate(), false, &CountrySelection::default());
        let window = details.delivery_window(today);
        assert_eq!(window.earliest, NaiveDate::from_ymd_opt(2026, 10, 21).unwrap());
        assert_eq!(window.latest, NaiveDate::from_ymd_opt(2026, 10, 25).unwrap());
        assert_eq!(window.to_string(), "Oct 21 2026 - Oct 25 2026");
    }
}
