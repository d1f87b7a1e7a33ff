//! Deadline wrapper around any catalog store

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use shared::models::{
    BlogPost, BlogPostCreate, BlogPostUpdate, Location, LocationCreate, LocationUpdate,
    MenuItem, MenuItemCreate, MenuItemUpdate, NewOrder, NewOrderItem, Order, OrderDetail,
    OrderItem, OrderQuery, OrderStatus, Review, ReviewCreate, Schedule, ScheduleCreate,
    ScheduleQuery, ScheduleUpdate, ScheduleWithLocation,
};

use super::{BlogQuery, CatalogStore, MenuQuery, StoreError, StoreResult};
use crate::call::CallPolicy;

/// Forwards every call to `inner` under the policy's deadline.
///
/// A call that outlives the deadline becomes `StoreError::Call` with a
/// timeout kind; for writes this means the outcome is unknown.
pub struct TimedCatalog {
    inner: Arc<dyn CatalogStore>,
    policy: CallPolicy,
}

impl TimedCatalog {
    pub fn new(inner: Arc<dyn CatalogStore>, policy: CallPolicy) -> Self {
        Self { inner, policy }
    }

    async fn timed<T, F>(&self, what: &str, fut: F) -> StoreResult<T>
    where
        F: Future<Output = StoreResult<T>> + Send,
    {
        self.policy
            .run(what, fut)
            .await
            .map_err(StoreError::Call)?
    }
}

#[async_trait]
impl CatalogStore for TimedCatalog {
    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        self.timed("list_locations", self.inner.list_locations()).await
    }

    async fn get_location(&self, id: &str) -> StoreResult<Location> {
        self.timed("get_location", self.inner.get_location(id)).await
    }

    async fn create_location(&self, data: &LocationCreate) -> StoreResult<Location> {
        self.timed("create_location", self.inner.create_location(data))
            .await
    }

    async fn update_location(&self, id: &str, data: &LocationUpdate) -> StoreResult<Location> {
        self.timed("update_location", self.inner.update_location(id, data))
            .await
    }

    async fn delete_location(&self, id: &str) -> StoreResult<()> {
        self.timed("delete_location", self.inner.delete_location(id))
            .await
    }

    async fn list_menu_items(&self, query: &MenuQuery) -> StoreResult<Vec<MenuItem>> {
        self.timed("list_menu_items", self.inner.list_menu_items(query))
            .await
    }

    async fn get_menu_item(&self, id: &str) -> StoreResult<MenuItem> {
        self.timed("get_menu_item", self.inner.get_menu_item(id)).await
    }

    async fn create_menu_item(&self, data: &MenuItemCreate) -> StoreResult<MenuItem> {
        self.timed("create_menu_item", self.inner.create_menu_item(data))
            .await
    }

    async fn update_menu_item(&self, id: &str, data: &MenuItemUpdate) -> StoreResult<MenuItem> {
        self.timed("update_menu_item", self.inner.update_menu_item(id, data))
            .await
    }

    async fn delete_menu_item(&self, id: &str) -> StoreResult<()> {
        self.timed("delete_menu_item", self.inner.delete_menu_item(id))
            .await
    }

    async fn list_schedules(
        &self,
        query: &ScheduleQuery,
    ) -> StoreResult<Vec<ScheduleWithLocation>> {
        self.timed("list_schedules", self.inner.list_schedules(query))
            .await
    }

    async fn get_schedule(&self, id: &str) -> StoreResult<Schedule> {
        self.timed("get_schedule", self.inner.get_schedule(id)).await
    }

    async fn create_schedule(&self, data: &ScheduleCreate) -> StoreResult<Schedule> {
        self.timed("create_schedule", self.inner.create_schedule(data))
            .await
    }

    async fn update_schedule(&self, id: &str, data: &ScheduleUpdate) -> StoreResult<Schedule> {
        self.timed("update_schedule", self.inner.update_schedule(id, data))
            .await
    }

    async fn delete_schedule(&self, id: &str) -> StoreResult<()> {
        self.timed("delete_schedule", self.inner.delete_schedule(id))
            .await
    }

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        self.timed("insert_order", self.inner.insert_order(order)).await
    }

    async fn insert_order_items(
        &self,
        order_id: &str,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>> {
        self.timed(
            "insert_order_items",
            self.inner.insert_order_items(order_id, items),
        )
        .await
    }

    async fn create_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> StoreResult<(Order, Vec<OrderItem>)> {
        self.timed("create_order", self.inner.create_order(order, items))
            .await
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<OrderDetail>> {
        self.timed("list_orders", self.inner.list_orders(query)).await
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderDetail> {
        self.timed("get_order", self.inner.get_order(id)).await
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        self.timed(
            "update_order_status",
            self.inner.update_order_status(id, status),
        )
        .await
    }

    async fn list_blog_posts(&self, query: &BlogQuery) -> StoreResult<Vec<BlogPost>> {
        self.timed("list_blog_posts", self.inner.list_blog_posts(query))
            .await
    }

    async fn get_blog_post(&self, id: &str) -> StoreResult<BlogPost> {
        self.timed("get_blog_post", self.inner.get_blog_post(id)).await
    }

    async fn create_blog_post(&self, data: &BlogPostCreate) -> StoreResult<BlogPost> {
        self.timed("create_blog_post", self.inner.create_blog_post(data))
            .await
    }

    async fn update_blog_post(&self, id: &str, data: &BlogPostUpdate) -> StoreResult<BlogPost> {
        self.timed("update_blog_post", self.inner.update_blog_post(id, data))
            .await
    }

    async fn delete_blog_post(&self, id: &str) -> StoreResult<()> {
        self.timed("delete_blog_post", self.inner.delete_blog_post(id))
            .await
    }

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        self.timed("list_reviews", self.inner.list_reviews()).await
    }

    async fn create_review(&self, data: &ReviewCreate) -> StoreResult<Review> {
        self.timed("create_review", self.inner.create_review(data)).await
    }
}
