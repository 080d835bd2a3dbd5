//! Shipping resolution
//!
//! Rate fields are resolved per field from the country override and the store
//! defaults, free shipping is decided per product, and the fee is then priced by
//! the product's fee method.

pub mod details;
pub mod fee;
pub mod free_shipping;
pub mod rate;
pub mod settings;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::CountrySelection;
use crate::{Country, FreeShippingRule, PricingError, Result, ShippingRate, StoreShippingDefaults};

pub use details::{DeliveryWindow, ShippingDetails};
pub use fee::{compute_fee, FeeBreakdown, FeeQuote};
pub use free_shipping::is_eligible;
pub use rate::{RateFields, RateResolver};
pub use settings::{ShippingDefaultsInput, ShippingRateInput};

/// How a product's shipping fee scales with the order. Set per product, never inferred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShippingFeeMethod {
    Item,
    Weight,
    Fixed,
}

impl ShippingFeeMethod {
    pub fn as_str(&self) -> &'static str {
        match self { Self::Item => "ITEM", Self::Weight => "WEIGHT", Self::Fixed => "FIXED" }
    }
}

impl FromStr for ShippingFeeMethod {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ITEM" => Ok(Self::Item),
            "WEIGHT" => Ok(Self::Weight),
            "FIXED" => Ok(Self::Fixed),
            other => Err(PricingError::UnknownShippingMethod(other.to_string())),
        }
    }
}

impl fmt::Display for ShippingFeeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Everything fetched for one shipping lookup.
#[derive(Clone, Copy, Debug)]
pub struct ShippingInputs<'a> {
    pub store_id: Uuid,
    pub method: ShippingFeeMethod,
    pub buyer: &'a CountrySelection,
    /// Reference row matching the buyer's (name, code), if any.
    pub country: Option<&'a Country>,
    pub rate: Option<&'a ShippingRate>,
    pub defaults: Option<&'a StoreShippingDefaults>,
    pub free_shipping: Option<&'a FreeShippingRule>,
}

/// Resolves rate fields and free-shipping eligibility into the details shown on a product page.
pub fn resolve_shipping_details(inputs: &ShippingInputs<'_>) -> Result<ShippingDetails> {
    let rate = if inputs.country.is_some() { inputs.rate } else { None };
    let fields = RateResolver::new(inputs.defaults, rate).resolve(inputs.store_id, inputs.buyer)?;
    let is_free = inputs.country.map_or(false, |c| is_eligible(inputs.free_shipping, c.id));
    Ok(ShippingDetails::resolve(inputs.method, &fields, is_free, inputs.buyer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn defaults() -> StoreShippingDefaults {
        StoreShippingDefaults {
            shipping_service: "Standard".into(),
            shipping_fee_per_item: dec!(5),
            shipping_fee_for_additional_item: dec!(2),
            shipping_fee_per_kg: dec!(3),
            shipping_fee_fixed: dec!(10),
            delivery_time_min: 3,
            delivery_time_max: 7,
            return_policy: "Returns within 30 days".into(),
        }
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("WEIGHT".parse::<ShippingFeeMethod>().unwrap(), ShippingFeeMethod::Weight);
        assert_eq!("item".parse::<ShippingFeeMethod>(), Err(PricingError::UnknownShippingMethod("item".into())));
        assert_eq!(serde_json::to_string(&ShippingFeeMethod::Fixed).unwrap(), "\"FIXED\"");
    }

    #[test]
    fn test_free_shipping_country() {
        let buyer = CountrySelection::new("Canada", "CA");
        let country = Country { id: Uuid::new_v4(), name: "Canada".into(), code: "CA".into() };
        let rule = FreeShippingRule::new([country.id]);
        let d = defaults();
        let inputs = ShippingInputs {
            store_id: Uuid::new_v4(), method: ShippingFeeMethod::Item, buyer: &buyer,
            country: Some(&country), rate: None, defaults: Some(&d), free_shipping: Some(&rule),
        };
        let details = resolve_shipping_details(&inputs).unwrap();
        assert!(details.is_free_shipping);
        assert_eq!(details.fee, dec!(0));
        assert_eq!(details.extra_fee, dec!(0));
        assert_eq!(details.shipping_service, "Standard");
    }

    #[test]
    fn test_missing_country_row_ignores_override() {
        let buyer = CountrySelection::resolve(Some("Atlantis"), Some("ZZ"), None, &CountrySelection::united_states())
            .unmatched(&CountrySelection::united_states());
        let rate = ShippingRate { shipping_service: Some("Express".into()), ..Default::default() };
        let d = defaults();
        let inputs = ShippingInputs {
            store_id: Uuid::new_v4(), method: ShippingFeeMethod::Fixed, buyer: &buyer,
            country: None, rate: Some(&rate), defaults: Some(&d), free_shipping: None,
        };
        let details = resolve_shipping_details(&inputs).unwrap();
        assert_eq!(details.shipping_service, "Standard");
        assert_eq!(details.fee, dec!(10));
        assert_eq!((details.country_name.as_str(), details.country_code.as_str()), ("United States", "US"));
    }
}
