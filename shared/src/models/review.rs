//! Review Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Customer review shown on the "find us" page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Review {
    pub id: String,
    pub customer_name: String,
    pub rating: i16,
    pub comment: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewCreate {
    pub customer_name: String,
    pub rating: i16,
    pub comment: String,
    pub image_url: Option<String>,
}

impl ReviewCreate {
    pub fn rating_in_range(&self) -> bool {
        (MIN_RATING..=MAX_RATING).contains(&self.rating)
    }
}
