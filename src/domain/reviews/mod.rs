//! Rating statistics

use serde::{Deserialize, Serialize};

use crate::Review;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StarCount {
    pub rating: u8,
    pub num_reviews: u64,
    pub percentage: f64,
}

/// Per-star breakdown, ascending from one to five stars.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatingStatistics {
    pub rating_statistics: Vec<StarCount>,
    pub total_reviews: u64,
    pub reviews_with_images_count: u64,
}

impl RatingStatistics {
    pub fn star(&self, rating: u8) -> Option<&StarCount> {
        self.rating_statistics.iter().find(|s| s.rating == rating)
    }
}

/// Floors each rating to a whole star; ratings outside 1..=5 are skipped.
pub fn aggregate(reviews: &[Review]) -> RatingStatistics {
    let mut counts = [0u64; 5];
    for review in reviews {
        let star = review.rating.floor();
        if (1.0..=5.0).contains(&star) {
            counts[star as usize - 1] += 1;
        }
    }
    let total: u64 = counts.iter().sum();
    let rating_statistics = counts.iter().zip(1u8..).map(|(&count, rating)| StarCount {
        rating,
        num_reviews: count,
        percentage: if total > 0 { count as f64 / total as f64 * 100.0 } else { 0.0 },
    }).collect();
    let reviews_with_images_count = reviews.iter().filter(|r| r.has_images).count() as u64;

    RatingStatistics { rating_statistics, total_reviews: total, reviews_with_images_count }
}
