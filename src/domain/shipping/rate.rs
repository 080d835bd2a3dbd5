//! Rate resolution

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::CountrySelection;
use crate::{PricingError, Result, ShippingRate, StoreShippingDefaults};

/// Effective shipping parameters for one (store, country) pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RateFields {
    pub shipping_service: String,
    pub fee_per_item: Decimal,
    pub fee_for_additional_item: Decimal,
    pub fee_per_kg: Decimal,
    pub fee_fixed: Decimal,
    pub delivery_time_min: u32,
    pub delivery_time_max: u32,
    pub return_policy: String,
}

/// Merges a country override onto the store defaults, field by field.
///
/// An override field wins only when it is present and meaningful: non-empty
/// text, non-zero number. Anything else borrows the store default, so a
/// partially filled override still gets the remaining fields from the store.
#[derive(Clone, Copy, Debug)]
pub struct RateResolver<'a> {
    defaults: Option<&'a StoreShippingDefaults>,
    rate: Option<&'a ShippingRate>,
}

impl<'a> RateResolver<'a> {
    pub fn new(defaults: Option<&'a StoreShippingDefaults>, rate: Option<&'a ShippingRate>) -> Self {
        Self { defaults, rate }
    }

    pub fn resolve(&self, store_id: Uuid, country: &CountrySelection) -> Result<RateFields> {
        let (defaults, rate) = match (self.defaults, self.rate) {
            (None, None) => {
                tracing::warn!(%store_id, country = %country.code, "no shipping configuration");
                return Err(PricingError::ConfigurationMissing { store_id, country: country.name.clone() });
            }
            (Some(d), rate) => (d.clone(), rate),
            // An override without store defaults has nothing to borrow from.
            (None, Some(rate)) => (StoreShippingDefaults::empty(), Some(rate)),
        };
        let Some(rate) = rate else {
            tracing::debug!(%store_id, country = %country.code, "no country override, using store defaults");
            return Ok(RateFields::from(defaults));
        };

        let mut fields = RateFields {
            shipping_service: text(&rate.shipping_service, defaults.shipping_service),
            fee_per_item: amount(rate.shipping_fee_per_item, defaults.shipping_fee_per_item),
            fee_for_additional_item: amount(rate.shipping_fee_for_additional_item, defaults.shipping_fee_for_additional_item),
            fee_per_kg: amount(rate.shipping_fee_per_kg, defaults.shipping_fee_per_kg),
            fee_fixed: amount(rate.shipping_fee_fixed, defaults.shipping_fee_fixed),
            delivery_time_min: days(rate.delivery_time_min, defaults.delivery_time_min),
            delivery_time_max: days(rate.delivery_time_max, defaults.delivery_time_max),
            return_policy: text(&rate.return_policy, defaults.return_policy),
        };
        if fields.delivery_time_min > fields.delivery_time_max {
            tracing::warn!(%store_id, country = %country.code, min = fields.delivery_time_min, max = fields.delivery_time_max, "override inverts delivery window, raising max to min");
            fields.delivery_time_max = fields.delivery_time_min;
        }
        tracing::debug!(%store_id, country = %country.code, service = %fields.shipping_service, "resolved country shipping rate");
        Ok(fields)
    }
}

fn text(value: &Option<String>, fallback: String) -> String {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map_or(fallback, str::to_string)
}

fn amount(value: Option<Decimal>, fallback: Decimal) -> Decimal {
    value.filter(|v| !v.is_zero()).unwrap_or(fallback)
}

fn days(value: Option<u32>, fallback: u32) -> u32 {
    value.filter(|v| *v != 0).unwrap_or(fallback)
}

impl StoreShippingDefaults {
    fn empty() -> Self {
        Self {
            shipping_service: String::new(),
            shipping_fee_per_item: Decimal::ZERO,
            shipping_fee_for_additional_item: Decimal::ZERO,
            shipping_fee_per_kg: Decimal::ZERO,
            shipping_fee_fixed: Decimal::ZERO,
            delivery_time_min: 0,
            delivery_time_max: 0,
            return_policy: String::new(),
        }
    }
}

impl From<StoreShippingDefaults> for RateFields {
    fn from(d: StoreShippingDefaults) -> Self {
        Self {
            shipping_service: d.shipping_service,
            fee_per_item: d.shipping_fee_per_item,
            fee_for_additional_item: d.shipping_fee_for_additional_item,
            fee_per_kg: d.shipping_fee_per_kg,
            fee_fixed: d.shipping_fee_fixed,
            delivery_time_min: d.delivery_time_min,
            delivery_time_max: d.delivery_time_max,
            return_policy: d.return_policy,
        }
    }
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
            shipping_fee_per_kg: dec!(1.5),
            shipping_fee_fixed: dec!(12),
            delivery_time_min: 3,
            delivery_time_max: 7,
            return_policy: "30 day returns".into(),
        }
    }

    #[test]
    fn test_defaults_without_override() {
        let d = defaults();
        let fields = RateResolver::new(Some(&d), None).resolve(Uuid::new_v4(), &CountrySelection::default()).unwrap();
        assert_eq!(fields, RateFields::from(d));
    }

    #[test]
    fn test_partial_override_borrows_defaults() {
        let d = defaults();
        let rate = ShippingRate {
            shipping_service: Some("DHL Express".into()),
            shipping_fee_per_item: Some(dec!(8)),
            shipping_fee_for_additional_item: Some(dec!(0)),
            delivery_time_max: Some(4),
            return_policy: Some("   ".into()),
            ..Default::default()
        };
        let fields = RateResolver::new(Some(&d), Some(&rate)).resolve(Uuid::new_v4(), &CountrySelection::default()).unwrap();
        assert_eq!(fields.shipping_service, "DHL Express");
        assert_eq!(fields.fee_per_item, dec!(8));
        assert_eq!(fields.fee_for_additional_item, dec!(2));
        assert_eq!(fields.fee_per_kg, dec!(1.5));
        assert_eq!(fields.delivery_time_min, 3);
        assert_eq!(fields.delivery_time_max, 4);
        assert_eq!(fields.return_policy, "30 day returns");
    }

    #[test]
    fn test_missing_configuration() {
        let store_id = Uuid::new_v4();
        let err = RateResolver::new(None, None).resolve(store_id, &CountrySelection::default()).unwrap_err();
        assert_eq!(err, PricingError::ConfigurationMissing { store_id, country: "United States".into() });
    }

    #[test]
    fn test_override_without_defaults() {
        let rate = ShippingRate { shipping_service: Some("Local".into()), shipping_fee_fixed: Some(dec!(4)), ..Default::default() };
        let fields = RateResolver::new(None, Some(&rate)).resolve(Uuid::new_v4(), &CountrySelection::default()).unwrap();
        assert_eq!(fields.shipping_service, "Local");
        assert_eq!(fields.fee_fixed, dec!(4));
        assert_eq!(fields.fee_per_item, dec!(0));
    }

    #[test]
    fn test_one_sided_override_keeps_window_ordered() {
        let d = defaults();
        let rate = ShippingRate { delivery_time_min: Some(10), ..Default::default() };
        let fields = RateResolver::new(Some(&d), Some(&rate)).resolve(Uuid::new_v4(), &CountrySelection::default()).unwrap();
        assert_eq!((fields.delivery_time_min, fields.delivery_time_max), (10, 10));

        let rate = ShippingRate { delivery_time_max: Some(2), ..Default::default() };
        let fields = RateResolver::new(Some(&d), Some(&rate)).resolve(Uuid::new_v4(), &CountrySelection::default()).unwrap();
        assert_eq!((fields.delivery_time_min, fields.delivery_time_max), (3, 3));
    }
}
