//! Catalog store
//!
//! The relational tables behind the site (locations, menu, schedules, orders,
//! blog posts, reviews) sit behind [`CatalogStore`]. [`PgCatalog`] is the real
//! backend; [`MemoryCatalog`] backs tests and `STORE_BACKEND=memory`.
//! [`TimedCatalog`] wraps either one so every call is bounded by a
//! [`CallPolicy`].

mod memory;
mod postgres;
mod timed;

pub use memory::{FailurePoint, MemoryCatalog};
pub use postgres::PgCatalog;
pub use timed::TimedCatalog;

use async_trait::async_trait;
use shared::models::{
    BlogPost, BlogPostCreate, BlogPostUpdate, BlogStatus, CategoryFilter, Location,
    LocationCreate, LocationUpdate, MenuItem, MenuItemCreate, MenuItemUpdate, NewOrder,
    NewOrderItem, Order, OrderDetail, OrderItem, OrderQuery, OrderStatus, Review, ReviewCreate,
    Schedule, ScheduleCreate, ScheduleQuery, ScheduleUpdate, ScheduleWithLocation,
};
use thiserror::Error;

use crate::call::CallError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    /// The order header was written but its line items were not
    #[error("order {order_id} was stored without its items: {reason}")]
    PartialOrder { order_id: String, reason: String },

    #[error("store call failed: {0}")]
    Call(#[from] CallError),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        StoreError::Database(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Menu listing filter
#[derive(Debug, Clone, Default)]
pub struct MenuQuery {
    pub category: CategoryFilter,
}

/// Blog listing filter
#[derive(Debug, Clone, Default)]
pub struct BlogQuery {
    pub status: Option<BlogStatus>,
    pub category: Option<String>,
}

impl BlogQuery {
    pub fn published() -> Self {
        Self {
            status: Some(BlogStatus::Published),
            category: None,
        }
    }

    pub fn matches(&self, post: &BlogPost) -> bool {
        self.status.is_none_or(|s| post.status == s)
            && self
                .category
                .as_deref()
                .is_none_or(|c| post.category.eq_ignore_ascii_case(c))
    }
}

/// List/get/insert/update/delete over each table.
///
/// Listing order: locations by name, menu items by name, schedules by date
/// then start time, orders and reviews newest first, blog posts newest first
/// (by `published_at` when listing published posts).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ── Locations ──
    async fn list_locations(&self) -> StoreResult<Vec<Location>>;
    async fn get_location(&self, id: &str) -> StoreResult<Location>;
    /// `data.lat`/`data.lng` must be resolved before calling
    async fn create_location(&self, data: &LocationCreate) -> StoreResult<Location>;
    async fn update_location(&self, id: &str, data: &LocationUpdate) -> StoreResult<Location>;
    async fn delete_location(&self, id: &str) -> StoreResult<()>;

    // ── Menu ──
    async fn list_menu_items(&self, query: &MenuQuery) -> StoreResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: &str) -> StoreResult<MenuItem>;
    async fn create_menu_item(&self, data: &MenuItemCreate) -> StoreResult<MenuItem>;
    async fn update_menu_item(&self, id: &str, data: &MenuItemUpdate) -> StoreResult<MenuItem>;
    async fn delete_menu_item(&self, id: &str) -> StoreResult<()>;

    // ── Schedules ──
    async fn list_schedules(&self, query: &ScheduleQuery)
    -> StoreResult<Vec<ScheduleWithLocation>>;
    async fn get_schedule(&self, id: &str) -> StoreResult<Schedule>;
    async fn create_schedule(&self, data: &ScheduleCreate) -> StoreResult<Schedule>;
    async fn update_schedule(&self, id: &str, data: &ScheduleUpdate) -> StoreResult<Schedule>;
    async fn delete_schedule(&self, id: &str) -> StoreResult<()>;

    // ── Orders ──
    /// Insert an order header with status `pending`
    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order>;
    async fn insert_order_items(
        &self,
        order_id: &str,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>>;

    /// Store an order and its lines.
    ///
    /// Backends that can should override this with a single transaction.
    /// This default writes the header first; if the lines then fail the
    /// header stays behind and the error is [`StoreError::PartialOrder`].
    async fn create_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> StoreResult<(Order, Vec<OrderItem>)> {
        let created = self.insert_order(order).await?;
        match self.insert_order_items(&created.id, items).await {
            Ok(lines) => Ok((created, lines)),
            Err(e) => Err(StoreError::PartialOrder {
                order_id: created.id,
                reason: e.to_string(),
            }),
        }
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<OrderDetail>>;
    async fn get_order(&self, id: &str) -> StoreResult<OrderDetail>;
    async fn update_order_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order>;

    // ── Blog ──
    async fn list_blog_posts(&self, query: &BlogQuery) -> StoreResult<Vec<BlogPost>>;
    async fn get_blog_post(&self, id: &str) -> StoreResult<BlogPost>;
    async fn create_blog_post(&self, data: &BlogPostCreate) -> StoreResult<BlogPost>;
    async fn update_blog_post(&self, id: &str, data: &BlogPostUpdate) -> StoreResult<BlogPost>;
    async fn delete_blog_post(&self, id: &str) -> StoreResult<()>;

    // ── Reviews ──
    async fn list_reviews(&self) -> StoreResult<Vec<Review>>;
    async fn create_review(&self, data: &ReviewCreate) -> StoreResult<Review>;
}

/// `published_at` after a status change: set on first publish, kept otherwise
pub(crate) fn published_at_for(
    status: BlogStatus,
    current: Option<chrono::DateTime<chrono::Utc>>,
) -> Option<chrono::DateTime<chrono::Utc>> {
    match (status, current) {
        (BlogStatus::Published, None) => Some(shared::util::now()),
        (_, current) => current,
    }
}

pub(crate) fn require_coordinates(data: &LocationCreate) -> StoreResult<(f64, f64)> {
    match (data.lat, data.lng) {
        (Some(lat), Some(lng)) => Ok((lat, lng)),
        _ => Err(StoreError::Validation(
            "Location requires latitude and longitude".into(),
        )),
    }
}
