//! Database rows and their domain conversions

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::{Country, Review, ShippingRate, SizeOption, StoreShippingDefaults};

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductShippingRow { pub product_id: Uuid, pub store_id: Uuid, pub shipping_fee_method: String, pub weight: Option<Decimal> }

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SizeRow { pub id: Uuid, pub size: String, pub quantity: i32, pub price: Decimal, pub discount: Decimal }

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CountryRow { pub id: Uuid, pub name: String, pub code: String }

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreDefaultsRow {
    pub store_id: Uuid, pub shipping_service: String,
    pub shipping_fee_per_item: Decimal, pub shipping_fee_for_additional_item: Decimal,
    pub shipping_fee_per_kg: Decimal, pub shipping_fee_fixed: Decimal,
    pub delivery_time_min: i32, pub delivery_time_max: i32, pub return_policy: String,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ShippingRateRow {
    pub store_id: Uuid, pub country_id: Uuid, pub shipping_service: Option<String>,
    pub shipping_fee_per_item: Option<Decimal>, pub shipping_fee_for_additional_item: Option<Decimal>,
    pub shipping_fee_per_kg: Option<Decimal>, pub shipping_fee_fixed: Option<Decimal>,
    pub delivery_time_min: Option<i32>, pub delivery_time_max: Option<i32>, pub return_policy: Option<String>,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ReviewRow { pub rating: f64, pub has_images: bool }

/// Negative counts in the database read as zero.
pub fn to_u32(value: i32) -> u32 { u32::try_from(value).unwrap_or_default() }

pub fn to_i32(value: u32) -> i32 { i32::try_from(value).unwrap_or(i32::MAX) }

impl From<SizeRow> for SizeOption {
    fn from(r: SizeRow) -> Self {
        Self { id: r.id, size: r.size, quantity: to_u32(r.quantity), price: r.price, discount: r.discount }
    }
}

impl From<CountryRow> for Country {
    fn from(r: CountryRow) -> Self { Self { id: r.id, name: r.name, code: r.code } }
}

impl From<StoreDefaultsRow> for StoreShippingDefaults {
    fn from(r: StoreDefaultsRow) -> Self {
        Self {
            shipping_service: r.shipping_service,
            shipping_fee_per_item: r.shipping_fee_per_item,
            shipping_fee_for_additional_item: r.shipping_fee_for_additional_item,
            shipping_fee_per_kg: r.shipping_fee_per_kg,
            shipping_fee_fixed: r.shipping_fee_fixed,
            delivery_time_min: to_u32(r.delivery_time_min),
            delivery_time_max: to_u32(r.delivery_time_max),
            return_policy: r.return_policy,
        }
    }
}

impl From<ShippingRateRow> for ShippingRate {
    fn from(r: ShippingRateRow) -> Self {
        Self {
            shipping_service: r.shipping_service,
            shipping_fee_per_item: r.shipping_fee_per_item,
            shipping_fee_for_additional_item: r.shipping_fee_for_additional_item,
            shipping_fee_per_kg: r.shipping_fee_per_kg,
            shipping_fee_fixed: r.shipping_fee_fixed,
            delivery_time_min: r.delivery_time_min.map(to_u32),
            delivery_time_max: r.delivery_time_max.map(to_u32),
            return_policy: r.return_policy,
        }
    }
}

impl From<ReviewRow> for Review {
    fn from(r: ReviewRow) -> Self { Self { rating: r.rating, has_images: r.has_images } }
}
