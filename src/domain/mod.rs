//! Pricing and shipping domain
pub mod value_objects;
pub mod shipping;
pub mod pricing;
pub mod reviews;

pub use pricing::{resolve_price, PriceRange, PriceResult, QuantityBounds, SizePrice};
pub use reviews::{aggregate, RatingStatistics, StarCount};
pub use shipping::{resolve_shipping_details, ShippingFeeMethod, ShippingInputs};
pub use value_objects::{CountrySelection, Money, Quantity, Weight};
