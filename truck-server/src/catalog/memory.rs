//! In-memory catalog
//!
//! Tables are plain vectors behind one `RwLock`. Used by the test suite and
//! by `STORE_BACKEND=memory` for local development. Order creation can be
//! switched between an all-or-nothing write and the two-step write, and
//! individual operations can be made to fail.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use shared::models::{
    BlogPost, BlogPostCreate, BlogPostUpdate, BlogStatus, Location, LocationCreate,
    LocationUpdate, MenuItem, MenuItemCreate, MenuItemUpdate, NewOrder, NewOrderItem, Order,
    OrderDetail, OrderItem, OrderItemDetail, OrderQuery, OrderStatus, Review, ReviewCreate,
    Schedule, ScheduleCreate, ScheduleQuery, ScheduleUpdate, ScheduleWithLocation,
};
use shared::util::{new_id, now};

use super::{
    BlogQuery, CatalogStore, MenuQuery, StoreError, StoreResult, published_at_for,
    require_coordinates,
};

/// Operation that should fail on its next calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailurePoint {
    InsertOrder,
    InsertOrderItems,
    /// Every list/get call
    Reads,
}

#[derive(Debug, Default)]
struct Tables {
    locations: Vec<Location>,
    menu_items: Vec<MenuItem>,
    schedules: Vec<Schedule>,
    orders: Vec<Order>,
    order_items: Vec<OrderItem>,
    blog_posts: Vec<BlogPost>,
    reviews: Vec<Review>,
}

#[derive(Debug)]
pub struct MemoryCatalog {
    tables: RwLock<Tables>,
    transactional: bool,
    failures: Mutex<HashSet<FailurePoint>>,
    latency: Mutex<Option<Duration>>,
    write_latency: Mutex<Option<Duration>>,
    calls: AtomicUsize,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCatalog {
    /// All-or-nothing order creation
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            transactional: true,
            failures: Mutex::new(HashSet::new()),
            latency: Mutex::new(None),
            write_latency: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Order header and lines written as two separate steps
    pub fn non_transactional() -> Self {
        Self {
            transactional: false,
            ..Self::new()
        }
    }

    pub fn fail_at(&self, point: FailurePoint) {
        self.failures.lock().insert(point);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().clear();
    }

    /// Delay every call by `latency`
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Extra delay on order writes only
    pub fn set_write_latency(&self, latency: Option<Duration>) {
        *self.write_latency.lock() = latency;
    }

    /// Number of trait calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn order_count(&self) -> usize {
        self.tables.read().orders.len()
    }

    pub fn order_item_count(&self) -> usize {
        self.tables.read().order_items.len()
    }

    /// Orders and their stored lines, as raw rows
    pub fn orders_snapshot(&self) -> Vec<(Order, Vec<OrderItem>)> {
        let tables = self.tables.read();
        tables
            .orders
            .iter()
            .map(|o| {
                let items = tables
                    .order_items
                    .iter()
                    .filter(|i| i.order_id == o.id)
                    .cloned()
                    .collect();
                (o.clone(), items)
            })
            .collect()
    }

    async fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.latency.lock();
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }
    }

    async fn enter_write(&self) {
        self.enter().await;
        let latency = *self.write_latency.lock();
        if let Some(d) = latency {
            tokio::time::sleep(d).await;
        }
    }

    fn check(&self, point: FailurePoint) -> StoreResult<()> {
        if self.failures.lock().contains(&point) {
            return Err(StoreError::Database(format!("injected failure at {point:?}")));
        }
        Ok(())
    }

    fn build_order(order: &NewOrder) -> StoreResult<Order> {
        if order.total_amount.is_sign_negative() {
            return Err(StoreError::Validation(
                "order total must not be negative".into(),
            ));
        }
        let ts = now();
        Ok(Order {
            id: new_id(),
            customer_name: order.customer_name.clone(),
            customer_email: order.customer_email.clone(),
            customer_phone: order.customer_phone.clone(),
            location_id: order.location_id.clone(),
            status: OrderStatus::Pending,
            total_amount: order.total_amount,
            pickup_time: order.pickup_time,
            created_at: ts,
            updated_at: ts,
        })
    }

    /// Same row checks as the `order_items` table constraints
    fn build_items(
        tables: &Tables,
        order_id: &str,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>> {
        let ts = now();
        items
            .iter()
            .map(|i| {
                if i.quantity <= 0 {
                    return Err(StoreError::Validation(format!(
                        "quantity must be positive for {}",
                        i.menu_item_id
                    )));
                }
                if i.price.is_sign_negative() {
                    return Err(StoreError::Validation(format!(
                        "price must not be negative for {}",
                        i.menu_item_id
                    )));
                }
                if !tables.menu_items.iter().any(|m| m.id == i.menu_item_id) {
                    return Err(StoreError::Validation(format!(
                        "menu item {} does not exist",
                        i.menu_item_id
                    )));
                }
                Ok(OrderItem {
                    id: new_id(),
                    order_id: order_id.to_string(),
                    menu_item_id: i.menu_item_id.clone(),
                    quantity: i.quantity,
                    price: i.price,
                    created_at: ts,
                })
            })
            .collect()
    }

    fn detail(tables: &Tables, order: &Order) -> OrderDetail {
        let items = tables
            .order_items
            .iter()
            .filter(|i| i.order_id == order.id)
            .map(|i| OrderItemDetail {
                item: i.clone(),
                menu_item_name: tables
                    .menu_items
                    .iter()
                    .find(|m| m.id == i.menu_item_id)
                    .map(|m| m.name.clone()),
            })
            .collect();
        OrderDetail {
            order: order.clone(),
            location: tables
                .locations
                .iter()
                .find(|l| l.id == order.location_id)
                .cloned(),
            items,
        }
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    // ── Locations ──

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let mut rows = self.tables.read().locations.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_location(&self, id: &str) -> StoreResult<Location> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        self.tables
            .read()
            .locations
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("location", id))
    }

    async fn create_location(&self, data: &LocationCreate) -> StoreResult<Location> {
        self.enter().await;
        let (lat, lng) = require_coordinates(data)?;
        let ts = now();
        let location = Location {
            id: new_id(),
            name: data.name.clone(),
            address: data.address.clone(),
            lat,
            lng,
            image_url: data.image_url.clone(),
            created_at: ts,
            updated_at: ts,
        };
        self.tables.write().locations.push(location.clone());
        Ok(location)
    }

    async fn update_location(&self, id: &str, data: &LocationUpdate) -> StoreResult<Location> {
        self.enter().await;
        let mut tables = self.tables.write();
        let loc = tables
            .locations
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| StoreError::not_found("location", id))?;
        if let Some(v) = &data.name {
            loc.name = v.clone();
        }
        if let Some(v) = &data.address {
            loc.address = v.clone();
        }
        if let Some(v) = data.lat {
            loc.lat = v;
        }
        if let Some(v) = data.lng {
            loc.lng = v;
        }
        if data.image_url.is_some() {
            loc.image_url = data.image_url.clone();
        }
        loc.updated_at = now();
        Ok(loc.clone())
    }

    async fn delete_location(&self, id: &str) -> StoreResult<()> {
        self.enter().await;
        let mut tables = self.tables.write();
        let before = tables.locations.len();
        tables.locations.retain(|l| l.id != id);
        if tables.locations.len() == before {
            return Err(StoreError::not_found("location", id));
        }
        tables.schedules.retain(|s| s.location_id != id);
        Ok(())
    }

    // ── Menu ──

    async fn list_menu_items(&self, query: &MenuQuery) -> StoreResult<Vec<MenuItem>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let mut rows: Vec<MenuItem> = self
            .tables
            .read()
            .menu_items
            .iter()
            .filter(|m| query.category.matches(m.category))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn get_menu_item(&self, id: &str) -> StoreResult<MenuItem> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        self.tables
            .read()
            .menu_items
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("menu item", id))
    }

    async fn create_menu_item(&self, data: &MenuItemCreate) -> StoreResult<MenuItem> {
        self.enter().await;
        let ts = now();
        let item = MenuItem {
            id: new_id(),
            name: data.name.clone(),
            description: data.description.clone(),
            price: data.price,
            image_url: data.image_url.clone(),
            category: data.category,
            is_vegetarian: data.is_vegetarian,
            is_spicy: data.is_spicy,
            is_gluten_free: data.is_gluten_free,
            created_at: ts,
            updated_at: ts,
        };
        self.tables.write().menu_items.push(item.clone());
        Ok(item)
    }

    async fn update_menu_item(&self, id: &str, data: &MenuItemUpdate) -> StoreResult<MenuItem> {
        self.enter().await;
        let mut tables = self.tables.write();
        let item = tables
            .menu_items
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::not_found("menu item", id))?;
        if let Some(v) = &data.name {
            item.name = v.clone();
        }
        if data.description.is_some() {
            item.description = data.description.clone();
        }
        if let Some(v) = data.price {
            item.price = v;
        }
        if data.image_url.is_some() {
            item.image_url = data.image_url.clone();
        }
        if let Some(v) = data.category {
            item.category = v;
        }
        if let Some(v) = data.is_vegetarian {
            item.is_vegetarian = v;
        }
        if let Some(v) = data.is_spicy {
            item.is_spicy = v;
        }
        if let Some(v) = data.is_gluten_free {
            item.is_gluten_free = v;
        }
        item.updated_at = now();
        Ok(item.clone())
    }

    async fn delete_menu_item(&self, id: &str) -> StoreResult<()> {
        self.enter().await;
        let mut tables = self.tables.write();
        let before = tables.menu_items.len();
        tables.menu_items.retain(|m| m.id != id);
        if tables.menu_items.len() == before {
            return Err(StoreError::not_found("menu item", id));
        }
        Ok(())
    }

    // ── Schedules ──

    async fn list_schedules(
        &self,
        query: &ScheduleQuery,
    ) -> StoreResult<Vec<ScheduleWithLocation>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let tables = self.tables.read();
        let mut rows: Vec<&Schedule> = tables
            .schedules
            .iter()
            .filter(|s| query.matches(s))
            .collect();
        rows.sort_by_key(|s| (s.date, s.start_time));
        Ok(rows
            .into_iter()
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|s| ScheduleWithLocation {
                schedule: s.clone(),
                location: tables
                    .locations
                    .iter()
                    .find(|l| l.id == s.location_id)
                    .cloned(),
            })
            .collect())
    }

    async fn get_schedule(&self, id: &str) -> StoreResult<Schedule> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        self.tables
            .read()
            .schedules
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("schedule", id))
    }

    async fn create_schedule(&self, data: &ScheduleCreate) -> StoreResult<Schedule> {
        self.enter().await;
        let mut tables = self.tables.write();
        if !tables.locations.iter().any(|l| l.id == data.location_id) {
            return Err(StoreError::not_found("location", &data.location_id));
        }
        let ts = now();
        let schedule = Schedule {
            id: new_id(),
            location_id: data.location_id.clone(),
            date: data.date,
            start_time: data.start_time,
            end_time: data.end_time,
            created_at: ts,
            updated_at: ts,
        };
        tables.schedules.push(schedule.clone());
        Ok(schedule)
    }

    async fn update_schedule(&self, id: &str, data: &ScheduleUpdate) -> StoreResult<Schedule> {
        self.enter().await;
        let mut tables = self.tables.write();
        if let Some(loc) = &data.location_id
            && !tables.locations.iter().any(|l| &l.id == loc)
        {
            return Err(StoreError::not_found("location", loc));
        }
        let schedule = tables
            .schedules
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::not_found("schedule", id))?;
        if let Some(v) = &data.location_id {
            schedule.location_id = v.clone();
        }
        if let Some(v) = data.date {
            schedule.date = v;
        }
        if let Some(v) = data.start_time {
            schedule.start_time = v;
        }
        if let Some(v) = data.end_time {
            schedule.end_time = v;
        }
        schedule.updated_at = now();
        Ok(schedule.clone())
    }

    async fn delete_schedule(&self, id: &str) -> StoreResult<()> {
        self.enter().await;
        let mut tables = self.tables.write();
        let before = tables.schedules.len();
        tables.schedules.retain(|s| s.id != id);
        if tables.schedules.len() == before {
            return Err(StoreError::not_found("schedule", id));
        }
        Ok(())
    }

    // ── Orders ──

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        self.enter_write().await;
        self.check(FailurePoint::InsertOrder)?;
        let created = Self::build_order(order)?;
        self.tables.write().orders.push(created.clone());
        Ok(created)
    }

    async fn insert_order_items(
        &self,
        order_id: &str,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>> {
        self.enter_write().await;
        self.check(FailurePoint::InsertOrderItems)?;
        let mut tables = self.tables.write();
        if !tables.orders.iter().any(|o| o.id == order_id) {
            return Err(StoreError::not_found("order", order_id));
        }
        let lines = Self::build_items(&tables, order_id, items)?;
        tables.order_items.extend(lines.iter().cloned());
        Ok(lines)
    }

    async fn create_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> StoreResult<(Order, Vec<OrderItem>)> {
        if !self.transactional {
            let created = self.insert_order(order).await?;
            return match self.insert_order_items(&created.id, items).await {
                Ok(lines) => Ok((created, lines)),
                Err(e) => Err(StoreError::PartialOrder {
                    order_id: created.id,
                    reason: e.to_string(),
                }),
            };
        }

        self.enter_write().await;
        self.check(FailurePoint::InsertOrder)?;
        let created = Self::build_order(order)?;
        self.check(FailurePoint::InsertOrderItems)?;

        let mut tables = self.tables.write();
        let lines = Self::build_items(&tables, &created.id, items)?;
        tables.orders.push(created.clone());
        tables.order_items.extend(lines.iter().cloned());
        Ok((created, lines))
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<OrderDetail>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let tables = self.tables.read();
        let mut rows: Vec<&Order> = tables.orders.iter().filter(|o| query.matches(o)).collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|o| Self::detail(&tables, o))
            .collect())
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderDetail> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let tables = self.tables.read();
        tables
            .orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| Self::detail(&tables, o))
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        self.enter().await;
        let mut tables = self.tables.write();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| StoreError::not_found("order", id))?;
        order.status = status;
        order.updated_at = now();
        Ok(order.clone())
    }

    // ── Blog ──

    async fn list_blog_posts(&self, query: &BlogQuery) -> StoreResult<Vec<BlogPost>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let mut rows: Vec<BlogPost> = self
            .tables
            .read()
            .blog_posts
            .iter()
            .filter(|p| query.matches(p))
            .cloned()
            .collect();
        if query.status == Some(BlogStatus::Published) {
            rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        } else {
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }
        Ok(rows)
    }

    async fn get_blog_post(&self, id: &str) -> StoreResult<BlogPost> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        self.tables
            .read()
            .blog_posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("blog post", id))
    }

    async fn create_blog_post(&self, data: &BlogPostCreate) -> StoreResult<BlogPost> {
        self.enter().await;
        let ts = now();
        let post = BlogPost {
            id: new_id(),
            title: data.title.clone(),
            excerpt: data.excerpt.clone(),
            content: data.content.clone(),
            image_url: data.image_url.clone(),
            category: data.category.clone(),
            author: data.author.clone(),
            status: data.status,
            published_at: published_at_for(data.status, None),
            created_at: ts,
            updated_at: ts,
        };
        self.tables.write().blog_posts.push(post.clone());
        Ok(post)
    }

    async fn update_blog_post(&self, id: &str, data: &BlogPostUpdate) -> StoreResult<BlogPost> {
        self.enter().await;
        let mut tables = self.tables.write();
        let post = tables
            .blog_posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::not_found("blog post", id))?;
        if let Some(v) = &data.title {
            post.title = v.clone();
        }
        if data.excerpt.is_some() {
            post.excerpt = data.excerpt.clone();
        }
        if data.content.is_some() {
            post.content = data.content.clone();
        }
        if data.image_url.is_some() {
            post.image_url = data.image_url.clone();
        }
        if let Some(v) = &data.category {
            post.category = v.clone();
        }
        if let Some(v) = &data.author {
            post.author = v.clone();
        }
        if let Some(status) = data.status {
            post.status = status;
            post.published_at = published_at_for(status, post.published_at);
        }
        post.updated_at = now();
        Ok(post.clone())
    }

    async fn delete_blog_post(&self, id: &str) -> StoreResult<()> {
        self.enter().await;
        let mut tables = self.tables.write();
        let before = tables.blog_posts.len();
        tables.blog_posts.retain(|p| p.id != id);
        if tables.blog_posts.len() == before {
            return Err(StoreError::not_found("blog post", id));
        }
        Ok(())
    }

    // ── Reviews ──

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        self.enter().await;
        self.check(FailurePoint::Reads)?;
        let mut rows = self.tables.read().reviews.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_review(&self, data: &ReviewCreate) -> StoreResult<Review> {
        self.enter().await;
        if !data.rating_in_range() {
            return Err(StoreError::Validation("Rating must be between 1 and 5".into()));
        }
        let review = Review {
            id: new_id(),
            customer_name: data.customer_name.clone(),
            rating: data.rating,
            comment: data.comment.clone(),
            image_url: data.image_url.clone(),
            created_at: now(),
        };
        self.tables.write().reviews.push(review.clone());
        Ok(review)
    }
}
