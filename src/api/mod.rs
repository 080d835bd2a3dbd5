//! HTTP boundary: fetches records, runs the engine, renders JSON.

pub mod rows;

use axum::{extract::{Path, Query, RawQuery, State}, http::StatusCode, response::{IntoResponse, Redirect, Response}, routing::{get, put}, Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;
use validator::Validate;

use crate::domain::shipping::{DeliveryWindow, FeeQuote, ShippingDefaultsInput, ShippingDetails, ShippingRateInput};
use crate::domain::{aggregate, resolve_price, resolve_shipping_details, CountrySelection, PriceResult, RatingStatistics, ShippingFeeMethod, ShippingInputs};
use crate::{Country, FreeShippingRule, PricingError, Review, ShippingRate, SizeOption, StoreShippingDefaults};
use rows::{to_i32, CountryRow, ProductShippingRow, ReviewRow, ShippingRateRow, SizeRow, StoreDefaultsRow};

#[derive(Clone)]
pub struct AppState { pub db: PgPool, pub default_country: CountrySelection }

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "marketplace-pricing"})) }))
        .route("/api/v1/products/:product_id/variants/:variant_id/quote", get(quote))
        .route("/api/v1/products/:product_id/rating-statistics", get(rating_statistics))
        .route("/api/v1/stores/:store_id/shipping-defaults", put(put_shipping_defaults))
        .route("/api/v1/stores/:store_id/shipping-rates/:country_id", put(put_shipping_rate))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

type ApiError = (StatusCode, String);

fn reject(e: PricingError) -> ApiError {
    let status = match e {
        PricingError::InvalidQuantity(_) | PricingError::InvalidWeight(_) | PricingError::QuantityExceedsStock { .. }
        | PricingError::FeeOverflow { .. } => StatusCode::BAD_REQUEST,
        PricingError::SizeNotFound(_) => StatusCode::NOT_FOUND,
        PricingError::UnknownShippingMethod(_) | PricingError::ConfigurationMissing { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, e.to_string())
}

fn db_error(e: sqlx::Error) -> ApiError {
    tracing::error!(error = %e, "database query failed");
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

// =============================================================================
// Quote
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct QuoteParams {
    pub country_name: Option<String>, pub country_code: Option<String>, pub city: Option<String>,
    pub size_id: Option<Uuid>, pub quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub price: PriceResult,
    pub price_display: Option<String>,
    pub shipping: Option<ShippingDetails>,
    pub fee_quote: Option<FeeQuote>,
    pub delivery_window: Option<DeliveryWindow>,
    /// Set when the store has no usable shipping configuration; the product stays viewable.
    pub shipping_error: Option<String>,
}

async fn quote(State(s): State<AppState>, Path((product_id, variant_id)): Path<(Uuid, Uuid)>, Query(q): Query<QuoteParams>, RawQuery(raw_query): RawQuery) -> Result<Response, ApiError> {
    let requested = CountrySelection::resolve(q.country_name.as_deref(), q.country_code.as_deref(), q.city.as_deref(), &s.default_country);
    let (buyer, country) = fetch_buyer_country(&s.db, requested, &s.default_country).await.map_err(db_error)?;
    let (product, sizes, defaults, rate, free_shipping) = tokio::try_join!(
        fetch_product(&s.db, product_id, variant_id),
        fetch_sizes(&s.db, variant_id),
        fetch_store_defaults(&s.db, product_id),
        fetch_country_rate(&s.db, product_id, &buyer),
        fetch_free_shipping(&s.db, product_id),
    ).map_err(db_error)?;
    let product = product.ok_or((StatusCode::NOT_FOUND, "Not found".to_string()))?;

    let price = match resolve_price(&sizes, q.size_id) {
        Err(PricingError::SizeNotFound(size_id)) => {
            tracing::info!(%product_id, %size_id, "unknown size, redirecting to size-less quote");
            return Ok(Redirect::permanent(&size_less_quote_path(product_id, variant_id, raw_query.as_deref())).into_response());
        }
        other => other.map_err(reject)?,
    };
    let quantity = q.quantity.unwrap_or(1);
    if let PriceResult::Exact(size) = &price {
        size.quantity_bounds().check(quantity).map_err(reject)?;
    }

    let method: ShippingFeeMethod = product.shipping_fee_method.parse().map_err(|e: PricingError| {
        tracing::error!(%product_id, method = %product.shipping_fee_method, "product has an unknown shipping method");
        reject(e)
    })?;
    let inputs = ShippingInputs {
        store_id: product.store_id, method, buyer: &buyer, country: country.as_ref(),
        rate: rate.as_ref(), defaults: defaults.as_ref(), free_shipping: free_shipping.as_ref(),
    };
    let mut response = QuoteResponse { price_display: price.display(), price, shipping: None, fee_quote: None, delivery_window: None, shipping_error: None };
    match resolve_shipping_details(&inputs) {
        Ok(details) => {
            let fee_quote = details.quote(quantity, product.weight.unwrap_or_default()).map_err(reject)?;
            response.delivery_window = Some(details.delivery_window(Utc::now().date_naive()));
            response.fee_quote = Some(fee_quote);
            response.shipping = Some(details);
        }
        Err(e @ PricingError::ConfigurationMissing { .. }) => response.shipping_error = Some(e.to_string()),
        Err(e) => return Err(reject(e)),
    }
    Ok(Json(response).into_response())
}

/// Quote path without a size, keeping every other query parameter.
fn size_less_quote_path(product_id: Uuid, variant_id: Uuid, raw_query: Option<&str>) -> String {
    let path = format!("/api/v1/products/{product_id}/variants/{variant_id}/quote");
    let kept: Vec<&str> = raw_query.unwrap_or_default().split('&')
        .filter(|pair| !pair.is_empty() && pair.split('=').next() != Some("size_id"))
        .collect();
    if kept.is_empty() { path } else { format!("{path}?{}", kept.join("&")) }
}

/// Looks up the buyer's country row, switching to the default country when (name, code) matches nothing.
async fn fetch_buyer_country(db: &PgPool, buyer: CountrySelection, default: &CountrySelection) -> sqlx::Result<(CountrySelection, Option<Country>)> {
    if let Some(country) = fetch_country(db, &buyer).await? {
        return Ok((buyer, Some(country)));
    }
    if buyer.name == default.name && buyer.code == default.code {
        tracing::warn!(country = %default.code, "default country has no country record");
        return Ok((buyer, None));
    }
    let buyer = buyer.unmatched(default);
    let country = fetch_country(db, &buyer).await?;
    Ok((buyer, country))
}

async fn fetch_product(db: &PgPool, product_id: Uuid, variant_id: Uuid) -> sqlx::Result<Option<ProductShippingRow>> {
    sqlx::query_as::<_, ProductShippingRow>("SELECT p.id AS product_id, p.store_id, p.shipping_fee_method, v.weight FROM products p JOIN product_variants v ON v.product_id = p.id WHERE p.id = $1 AND v.id = $2")
        .bind(product_id).bind(variant_id).fetch_optional(db).await
}

async fn fetch_sizes(db: &PgPool, variant_id: Uuid) -> sqlx::Result<Vec<SizeOption>> {
    let rows = sqlx::query_as::<_, SizeRow>("SELECT id, size, quantity, price, discount FROM sizes WHERE variant_id = $1")
        .bind(variant_id).fetch_all(db).await?;
    Ok(rows.into_iter().map(SizeOption::from).collect())
}

async fn fetch_country(db: &PgPool, buyer: &CountrySelection) -> sqlx::Result<Option<Country>> {
    let row = sqlx::query_as::<_, CountryRow>("SELECT id, name, code FROM countries WHERE name = $1 AND code = $2")
        .bind(&buyer.name).bind(&buyer.code).fetch_optional(db).await?;
    Ok(row.map(Country::from))
}

async fn fetch_store_defaults(db: &PgPool, product_id: Uuid) -> sqlx::Result<Option<StoreShippingDefaults>> {
    let row = sqlx::query_as::<_, StoreDefaultsRow>("SELECT * FROM store_shipping_defaults WHERE store_id = (SELECT store_id FROM products WHERE id = $1)")
        .bind(product_id).fetch_optional(db).await?;
    Ok(row.map(StoreShippingDefaults::from))
}

async fn fetch_country_rate(db: &PgPool, product_id: Uuid, buyer: &CountrySelection) -> sqlx::Result<Option<ShippingRate>> {
    let row = sqlx::query_as::<_, ShippingRateRow>("SELECT sr.* FROM shipping_rates sr JOIN countries c ON c.id = sr.country_id WHERE sr.store_id = (SELECT store_id FROM products WHERE id = $1) AND c.name = $2 AND c.code = $3")
        .bind(product_id).bind(&buyer.name).bind(&buyer.code).fetch_optional(db).await?;
    Ok(row.map(ShippingRate::from))
}

async fn fetch_free_shipping(db: &PgPool, product_id: Uuid) -> sqlx::Result<Option<FreeShippingRule>> {
    let rule: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM free_shipping WHERE product_id = $1").bind(product_id).fetch_optional(db).await?;
    let Some((rule_id,)) = rule else { return Ok(None) };
    let countries: Vec<(Uuid,)> = sqlx::query_as("SELECT country_id FROM free_shipping_countries WHERE free_shipping_id = $1")
        .bind(rule_id).fetch_all(db).await?;
    Ok(Some(FreeShippingRule::new(countries.into_iter().map(|(id,)| id))))
}

// =============================================================================
// Ratings
// =============================================================================

async fn rating_statistics(State(s): State<AppState>, Path(product_id): Path<Uuid>) -> Result<Json<RatingStatistics>, ApiError> {
    let rows = sqlx::query_as::<_, ReviewRow>("SELECT r.rating, EXISTS (SELECT 1 FROM review_images i WHERE i.review_id = r.id) AS has_images FROM reviews r WHERE r.product_id = $1")
        .bind(product_id).fetch_all(&s.db).await.map_err(db_error)?;
    let reviews: Vec<Review> = rows.into_iter().map(Review::from).collect();
    Ok(Json(aggregate(&reviews)))
}

// =============================================================================
// Store shipping settings
// =============================================================================

async fn put_shipping_defaults(State(s): State<AppState>, Path(store_id): Path<Uuid>, Json(r): Json<ShippingDefaultsInput>) -> Result<Json<StoreShippingDefaults>, ApiError> {
    r.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let d = StoreShippingDefaults::from(r);
    let row = sqlx::query_as::<_, StoreDefaultsRow>("INSERT INTO store_shipping_defaults (store_id, shipping_service, shipping_fee_per_item, shipping_fee_for_additional_item, shipping_fee_per_kg, shipping_fee_fixed, delivery_time_min, delivery_time_max, return_policy) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) ON CONFLICT (store_id) DO UPDATE SET shipping_service = $2, shipping_fee_per_item = $3, shipping_fee_for_additional_item = $4, shipping_fee_per_kg = $5, shipping_fee_fixed = $6, delivery_time_min = $7, delivery_time_max = $8, return_policy = $9 RETURNING *")
        .bind(store_id).bind(&d.shipping_service).bind(d.shipping_fee_per_item).bind(d.shipping_fee_for_additional_item)
        .bind(d.shipping_fee_per_kg).bind(d.shipping_fee_fixed).bind(to_i32(d.delivery_time_min)).bind(to_i32(d.delivery_time_max)).bind(&d.return_policy)
        .fetch_one(&s.db).await.map_err(db_error)?;
    tracing::info!(%store_id, "store shipping defaults updated");
    Ok(Json(row.into()))
}

async fn put_shipping_rate(State(s): State<AppState>, Path((store_id, country_id)): Path<(Uuid, Uuid)>, Json(r): Json<ShippingRateInput>) -> Result<Json<ShippingRateRow>, ApiError> {
    r.validate().map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    let rate = ShippingRate::from(r);
    let row = sqlx::query_as::<_, ShippingRateRow>("INSERT INTO shipping_rates (id, store_id, country_id, shipping_service, shipping_fee_per_item, shipping_fee_for_additional_item, shipping_fee_per_kg, shipping_fee_fixed, delivery_time_min, delivery_time_max, return_policy) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) ON CONFLICT (store_id, country_id) DO UPDATE SET shipping_service = $4, shipping_fee_per_item = $5, shipping_fee_for_additional_item = $6, shipping_fee_per_kg = $7, shipping_fee_fixed = $8, delivery_time_min = $9, delivery_time_max = $10, return_policy = $11 RETURNING store_id, country_id, shipping_service, shipping_fee_per_item, shipping_fee_for_additional_item, shipping_fee_per_kg, shipping_fee_fixed, delivery_time_min, delivery_time_max, return_policy")
        .bind(Uuid::now_v7()).bind(store_id).bind(country_id).bind(&rate.shipping_service)
        .bind(rate.shipping_fee_per_item).bind(rate.shipping_fee_for_additional_item).bind(rate.shipping_fee_per_kg).bind(rate.shipping_fee_fixed)
        .bind(rate.delivery_time_min.map(to_i32)).bind(rate.delivery_time_max.map(to_i32)).bind(&rate.return_policy)
        .fetch_one(&s.db).await.map_err(db_error)?;
    tracing::info!(%store_id, %country_id, "country shipping rate updated");
    Ok(Json(row))
}
