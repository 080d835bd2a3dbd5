//! Price resolution and rating statistics scenarios.

use marketplace_pricing::domain::{aggregate, resolve_price, PriceResult};
use marketplace_pricing::{PricingError, Review, SizeOption};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn size(label: &str, price: Decimal, discount: Decimal, quantity: u32) -> SizeOption {
    SizeOption { id: Uuid::new_v4(), size: label.into(), quantity, price, discount }
}

#[test]
fn range_without_selection() {
    let sizes = vec![size("S", dec!(20), dec!(0), 3), size("M", dec!(30), dec!(50), 4)];
    let result = resolve_price(&sizes, None).unwrap();
    assert_eq!(result.display().as_deref(), Some("$15.00 - $20.00"));
    let PriceResult::Range(range) = result else { panic!("expected a range") };
    assert_eq!(range.discount, None);
    assert_eq!(range.total_quantity, 7);
}

#[test]
fn exact_price_for_selected_size() {
    let sizes = vec![size("S", dec!(20), dec!(0), 3), size("M", dec!(30), dec!(50), 4)];
    let PriceResult::Exact(price) = resolve_price(&sizes, Some(sizes[1].id)).unwrap() else { panic!("expected an exact price") };
    assert_eq!(price.price, dec!(15));
    assert_eq!(price.original_price, Some(dec!(30)));
    assert_eq!(price.discount, dec!(50));
    assert_eq!(price.stock, 4);
    assert_eq!(price.size, "M");
    assert_eq!(price.quantity_bounds().max, 4);
}

#[test]
fn stale_size_reference() {
    let sizes = vec![size("S", dec!(20), dec!(0), 3)];
    let stale = Uuid::new_v4();
    assert_eq!(resolve_price(&sizes, Some(stale)), Err(PricingError::SizeNotFound(stale)));
}

#[rstest]
#[case(dec!(19.99), dec!(0), "$19.99")]
#[case(dec!(10), dec!(33), "$6.70")]
#[case(dec!(0.05), dec!(10), "$0.05")]
fn single_size_display(#[case] price: Decimal, #[case] discount: Decimal, #[case] shown: &str) {
    let sizes = vec![size("One size", price, discount, 1)];
    assert_eq!(resolve_price(&sizes, None).unwrap().display().as_deref(), Some(shown));
}

#[test]
fn near_equal_prices_collapse_at_display_precision() {
    let sizes = vec![size("S", dec!(10), dec!(0), 1), size("M", dec!(10.004), dec!(0), 1)];
    let PriceResult::Range(range) = resolve_price(&sizes, None).unwrap() else { panic!("expected a range") };
    assert!(range.is_single_price());
    assert_eq!(range.display(), "$10.00");
    assert_eq!(range.max_price, dec!(10.004));
}

#[test]
fn unavailable_variant() {
    let result = resolve_price(&[], None).unwrap();
    assert!(!result.is_purchasable());
    assert_eq!(result.display(), None);
}

#[test]
fn rating_statistics_for_four_reviews() {
    let reviews: Vec<Review> = [5.0, 5.0, 4.0, 1.0].into_iter().map(|rating| Review { rating, has_images: rating > 4.0 }).collect();
    let stats = aggregate(&reviews);
    let counts: Vec<u64> = stats.rating_statistics.iter().map(|s| s.num_reviews).collect();
    let percentages: Vec<f64> = stats.rating_statistics.iter().map(|s| s.percentage).collect();
    assert_eq!(counts, vec![1, 0, 0, 1, 2]);
    assert_eq!(percentages, vec![25.0, 0.0, 0.0, 25.0, 50.0]);
    assert_eq!(stats.total_reviews, 4);
    assert_eq!(stats.reviews_with_images_count, 2);
}
