//! Store-owner shipping settings input

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{ShippingRate, StoreShippingDefaults};

/// Store default shipping form.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_default_window"))]
pub struct ShippingDefaultsInput {
    #[validate(length(min = 1, max = 100))]
    pub shipping_service: String,
    #[validate(custom = "non_negative")]
    pub shipping_fee_per_item: Decimal,
    #[validate(custom = "non_negative")]
    pub shipping_fee_for_additional_item: Decimal,
    #[validate(custom = "non_negative")]
    pub shipping_fee_per_kg: Decimal,
    #[validate(custom = "non_negative")]
    pub shipping_fee_fixed: Decimal,
    #[validate(range(max = 365))]
    pub delivery_time_min: u32,
    #[validate(range(min = 1, max = 365))]
    pub delivery_time_max: u32,
    #[validate(length(max = 5000))]
    pub return_policy: String,
}

/// Per-country override form. Blank fields fall back to the store defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_rate_window"))]
pub struct ShippingRateInput {
    #[validate(length(max = 100))]
    pub shipping_service: Option<String>,
    #[validate(custom = "non_negative")]
    pub shipping_fee_per_item: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub shipping_fee_for_additional_item: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub shipping_fee_per_kg: Option<Decimal>,
    #[validate(custom = "non_negative")]
    pub shipping_fee_fixed: Option<Decimal>,
    #[validate(range(max = 365))]
    pub delivery_time_min: Option<u32>,
    #[validate(range(max = 365))]
    pub delivery_time_max: Option<u32>,
    #[validate(length(max = 5000))]
    pub return_policy: Option<String>,
}

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO { return Err(ValidationError::new("negative_fee")); }
    Ok(())
}

fn validate_default_window(input: &ShippingDefaultsInput) -> Result<(), ValidationError> {
    check_window(input.delivery_time_min, input.delivery_time_max)
}

fn validate_rate_window(input: &ShippingRateInput) -> Result<(), ValidationError> {
    match (input.delivery_time_min, input.delivery_time_max) {
        (Some(min), Some(max)) => check_window(min, max),
        _ => Ok(()),
    }
}

fn check_window(min: u32, max: u32) -> Result<(), ValidationError> {
    if min > max { return Err(ValidationError::new("delivery_window")); }
    Ok(())
}

impl From<ShippingDefaultsInput> for StoreShippingDefaults {
    fn from(i: ShippingDefaultsInput) -> Self {
        Self {
            shipping_service: i.shipping_service.trim().to_string(),
            shipping_fee_per_item: i.shipping_fee_per_item,
            shipping_fee_for_additional_item: i.shipping_fee_for_additional_item,
            shipping_fee_per_kg: i.shipping_fee_per_kg,
            shipping_fee_fixed: i.shipping_fee_fixed,
            delivery_time_min: i.delivery_time_min,
            delivery_time_max: i.delivery_time_max,
            return_policy: i.return_policy,
        }
    }
}

impl From<ShippingRateInput> for ShippingRate {
    fn from(i: ShippingRateInput) -> Self {
        let blank_to_none = |s: Option<String>| s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            shipping_service: blank_to_none(i.shipping_service),
            shipping_fee_per_item: i.shipping_fee_per_item,
            shipping_fee_for_additional_item: i.shipping_fee_for_additional_item,
            shipping_fee_per_kg: i.shipping_fee_per_kg,
            shipping_fee_fixed: i.shipping_fee_fixed,
            delivery_time_min: i.delivery_time_min,
            delivery_time_max: i.delivery_time_max,
            return_policy: blank_to_none(i.return_policy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn defaults_input() -> ShippingDefaultsInput {
        ShippingDefaultsInput {
            shipping_service: "Standard".into(),
            shipping_fee_per_item: dec!(5),
            shipping_fee_for_additional_item: dec!(2),
            shipping_fee_per_kg: dec!(0),
            shipping_fee_fixed: dec!(0),
            delivery_time_min: 3,
            delivery_time_max: 7,
            return_policy: String::new(),
        }
    }

    #[test]
    fn test_valid_defaults() { assert!(defaults_input().validate().is_ok()); }

    #[test]
    fn test_negative_fee_rejected() {
        let input = ShippingDefaultsInput { shipping_fee_per_kg: dec!(-1), ..defaults_input() };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("shipping_fee_per_kg"));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let input = ShippingDefaultsInput { delivery_time_min: 9, ..defaults_input() };
        assert!(input.validate().is_err());
        let rate = ShippingRateInput { delivery_time_min: Some(5), delivery_time_max: Some(2), ..Default::default() };
        assert!(rate.validate().is_err());
    }

    #[test]
    fn test_partial_rate() {
        let input = ShippingRateInput { shipping_service: Some("  ".into()), shipping_fee_fixed: Some(dec!(3)), delivery_time_min: Some(2), ..Default::default() };
        assert!(input.validate().is_ok());
        let rate = ShippingRate::from(input);
        assert_eq!(rate.shipping_service, None);
        assert_eq!(rate.shipping_fee_fixed, Some(dec!(3)));
    }
}
