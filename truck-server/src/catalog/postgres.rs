//! PostgreSQL catalog

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    BlogPost, BlogPostCreate, BlogPostUpdate, BlogStatus, CategoryFilter, Location,
    LocationCreate, LocationUpdate, MenuItem, MenuItemCreate, MenuItemUpdate, NewOrder,
    NewOrderItem, Order, OrderDetail, OrderItem, OrderItemDetail, OrderQuery, OrderStatus,
    Review, ReviewCreate, Schedule, ScheduleCreate, ScheduleQuery, ScheduleUpdate,
    ScheduleWithLocation,
};
use shared::util::new_id;
use sqlx::{PgExecutor, PgPool, Postgres, QueryBuilder};

use super::{
    BlogQuery, CatalogStore, MenuQuery, StoreError, StoreResult, published_at_for,
    require_coordinates,
};

const LOCATION_COLUMNS: &str = "id, name, address, lat, lng, image_url, created_at, updated_at";
const MENU_COLUMNS: &str = "id, name, description, price, image_url, category, \
     is_vegetarian, is_spicy, is_gluten_free, created_at, updated_at";
const SCHEDULE_COLUMNS: &str =
    "id, location_id, date, start_time, end_time, created_at, updated_at";
const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, location_id, \
     status, total_amount, pickup_time, created_at, updated_at";
const BLOG_COLUMNS: &str = "id, title, excerpt, content, image_url, category, author, status, \
     published_at, created_at, updated_at";

// ── Row types for columns stored as text enums ──

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: String,
    name: String,
    description: Option<String>,
    price: Decimal,
    image_url: Option<String>,
    category: String,
    is_vegetarian: bool,
    is_spicy: bool,
    is_gluten_free: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MenuItemRow> for MenuItem {
    type Error = StoreError;

    fn try_from(r: MenuItemRow) -> Result<Self, Self::Error> {
        Ok(MenuItem {
            category: r
                .category
                .parse()
                .map_err(|e| StoreError::Database(format!("menu_items.category: {e}")))?,
            id: r.id,
            name: r.name,
            description: r.description,
            price: r.price,
            image_url: r.image_url,
            is_vegetarian: r.is_vegetarian,
            is_spicy: r.is_spicy,
            is_gluten_free: r.is_gluten_free,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    location_id: String,
    status: String,
    total_amount: Decimal,
    pickup_time: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(r: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            status: r
                .status
                .parse()
                .map_err(|e| StoreError::Database(format!("orders.status: {e}")))?,
            id: r.id,
            customer_name: r.customer_name,
            customer_email: r.customer_email,
            customer_phone: r.customer_phone,
            location_id: r.location_id,
            total_amount: r.total_amount,
            pickup_time: r.pickup_time,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BlogPostRow {
    id: String,
    title: String,
    excerpt: Option<String>,
    content: Option<String>,
    image_url: Option<String>,
    category: String,
    author: String,
    status: String,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogPostRow> for BlogPost {
    type Error = StoreError;

    fn try_from(r: BlogPostRow) -> Result<Self, Self::Error> {
        Ok(BlogPost {
            status: r
                .status
                .parse()
                .map_err(|e| StoreError::Database(format!("blog_posts.status: {e}")))?,
            id: r.id,
            title: r.title,
            excerpt: r.excerpt,
            content: r.content,
            image_url: r.image_url,
            category: r.category,
            author: r.author,
            published_at: r.published_at,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Schedule row with the location columns of a LEFT JOIN
#[derive(sqlx::FromRow)]
struct ScheduleJoinRow {
    id: String,
    location_id: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    l_name: Option<String>,
    l_address: Option<String>,
    l_lat: Option<f64>,
    l_lng: Option<f64>,
    l_image_url: Option<String>,
    l_created_at: Option<DateTime<Utc>>,
    l_updated_at: Option<DateTime<Utc>>,
}

impl From<ScheduleJoinRow> for ScheduleWithLocation {
    fn from(r: ScheduleJoinRow) -> Self {
        let location = match (r.l_name, r.l_address, r.l_lat, r.l_lng) {
            (Some(name), Some(address), Some(lat), Some(lng)) => Some(Location {
                id: r.location_id.clone(),
                name,
                address,
                lat,
                lng,
                image_url: r.l_image_url,
                created_at: r.l_created_at.unwrap_or(r.created_at),
                updated_at: r.l_updated_at.unwrap_or(r.updated_at),
            }),
            _ => None,
        };
        ScheduleWithLocation {
            schedule: Schedule {
                id: r.id,
                location_id: r.location_id,
                date: r.date,
                start_time: r.start_time,
                end_time: r.end_time,
                created_at: r.created_at,
                updated_at: r.updated_at,
            },
            location,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    #[sqlx(flatten)]
    item: OrderItem,
    menu_item_name: Option<String>,
}

fn collect<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

fn location_fk(e: sqlx::Error, location_id: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            StoreError::not_found("location", location_id)
        }
        _ => e.into(),
    }
}

async fn insert_items<'e, E>(
    executor: E,
    order_id: &str,
    items: &[NewOrderItem],
) -> StoreResult<Vec<OrderItem>>
where
    E: PgExecutor<'e>,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = items.iter().map(|_| new_id()).collect();
    let order_ids: Vec<String> = items.iter().map(|_| order_id.to_string()).collect();
    let menu_item_ids: Vec<String> = items.iter().map(|i| i.menu_item_id.clone()).collect();
    let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
    let prices: Vec<Decimal> = items.iter().map(|i| i.price).collect();

    let rows: Vec<OrderItem> = sqlx::query_as(
        r#"
        INSERT INTO order_items (id, order_id, menu_item_id, quantity, price)
        SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::integer[], $5::numeric[])
        RETURNING id, order_id, menu_item_id, quantity, price, created_at
        "#,
    )
    .bind(&ids)
    .bind(&order_ids)
    .bind(&menu_item_ids)
    .bind(&quantities)
    .bind(&prices)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

async fn insert_order_row<'e, E>(executor: E, order: &NewOrder) -> StoreResult<Order>
where
    E: PgExecutor<'e>,
{
    let row: OrderRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO orders (
            id, customer_name, customer_email, customer_phone, location_id,
            status, total_amount, pickup_time
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING {ORDER_COLUMNS}
        "#
    ))
    .bind(new_id())
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.location_id)
    .bind(OrderStatus::Pending.as_str())
    .bind(order.total_amount)
    .bind(order.pickup_time)
    .fetch_one(executor)
    .await
    .map_err(|e| location_fk(e, &order.location_id))?;
    row.try_into()
}

/// Catalog backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and apply pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn attach_details(&self, orders: Vec<Order>) -> StoreResult<Vec<OrderDetail>> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<String> = orders.iter().map(|o| o.id.clone()).collect();
        let location_ids: Vec<String> = orders.iter().map(|o| o.location_id.clone()).collect();

        let locations: Vec<Location> = sqlx::query_as(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = ANY($1)"
        ))
        .bind(&location_ids)
        .fetch_all(&self.pool)
        .await?;

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT oi.id, oi.order_id, oi.menu_item_id, oi.quantity, oi.price, oi.created_at,
                   m.name AS menu_item_name
            FROM order_items oi
            LEFT JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.created_at, oi.id
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders
            .into_iter()
            .map(|order| OrderDetail {
                location: locations
                    .iter()
                    .find(|l| l.id == order.location_id)
                    .cloned(),
                items: items
                    .iter()
                    .filter(|r| r.item.order_id == order.id)
                    .map(|r| OrderItemDetail {
                        item: r.item.clone(),
                        menu_item_name: r.menu_item_name.clone(),
                    })
                    .collect(),
                order,
            })
            .collect())
    }

    async fn delete_by_id(&self, table: &str, entity: &'static str, id: &str) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found(entity, id));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PgCatalog {
    // ── Locations ──

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        let rows = sqlx::query_as(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_location(&self, id: &str) -> StoreResult<Location> {
        sqlx::query_as(&format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("location", id))
    }

    async fn create_location(&self, data: &LocationCreate) -> StoreResult<Location> {
        let (lat, lng) = require_coordinates(data)?;
        let row = sqlx::query_as(&format!(
            r#"
            INSERT INTO locations (id, name, address, lat, lng, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(&data.name)
        .bind(&data.address)
        .bind(lat)
        .bind(lng)
        .bind(&data.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_location(&self, id: &str, data: &LocationUpdate) -> StoreResult<Location> {
        sqlx::query_as(&format!(
            r#"
            UPDATE locations SET
                name = COALESCE($1, name),
                address = COALESCE($2, address),
                lat = COALESCE($3, lat),
                lng = COALESCE($4, lng),
                image_url = COALESCE($5, image_url),
                updated_at = now()
            WHERE id = $6
            RETURNING {LOCATION_COLUMNS}
            "#
        ))
        .bind(&data.name)
        .bind(&data.address)
        .bind(data.lat)
        .bind(data.lng)
        .bind(&data.image_url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("location", id))
    }

    async fn delete_location(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("locations", "location", id).await
    }

    // ── Menu ──

    async fn list_menu_items(&self, query: &MenuQuery) -> StoreResult<Vec<MenuItem>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {MENU_COLUMNS} FROM menu_items"));
        match query.category {
            CategoryFilter::Dessert => return Ok(Vec::new()),
            CategoryFilter::Only(category) => {
                qb.push(" WHERE category = ").push_bind(category.as_str());
            }
            CategoryFilter::All => {}
        }
        qb.push(" ORDER BY name");
        let rows: Vec<MenuItemRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        collect(rows)
    }

    async fn get_menu_item(&self, id: &str) -> StoreResult<MenuItem> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            "SELECT {MENU_COLUMNS} FROM menu_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("menu item", id))?;
        row.try_into()
    }

    async fn create_menu_item(&self, data: &MenuItemCreate) -> StoreResult<MenuItem> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO menu_items (
                id, name, description, price, image_url, category,
                is_vegetarian, is_spicy, is_gluten_free
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.image_url)
        .bind(data.category.as_str())
        .bind(data.is_vegetarian)
        .bind(data.is_spicy)
        .bind(data.is_gluten_free)
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_menu_item(&self, id: &str, data: &MenuItemUpdate) -> StoreResult<MenuItem> {
        let row: MenuItemRow = sqlx::query_as(&format!(
            r#"
            UPDATE menu_items SET
                name = COALESCE($1, name),
                description = COALESCE($2, description),
                price = COALESCE($3, price),
                image_url = COALESCE($4, image_url),
                category = COALESCE($5, category),
                is_vegetarian = COALESCE($6, is_vegetarian),
                is_spicy = COALESCE($7, is_spicy),
                is_gluten_free = COALESCE($8, is_gluten_free),
                updated_at = now()
            WHERE id = $9
            RETURNING {MENU_COLUMNS}
            "#
        ))
        .bind(&data.name)
        .bind(&data.description)
        .bind(data.price)
        .bind(&data.image_url)
        .bind(data.category.map(|c| c.as_str()))
        .bind(data.is_vegetarian)
        .bind(data.is_spicy)
        .bind(data.is_gluten_free)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("menu item", id))?;
        row.try_into()
    }

    async fn delete_menu_item(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("menu_items", "menu item", id).await
    }

    // ── Schedules ──

    async fn list_schedules(
        &self,
        query: &ScheduleQuery,
    ) -> StoreResult<Vec<ScheduleWithLocation>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT s.id, s.location_id, s.date, s.start_time, s.end_time,
                   s.created_at, s.updated_at,
                   l.name AS l_name, l.address AS l_address, l.lat AS l_lat, l.lng AS l_lng,
                   l.image_url AS l_image_url, l.created_at AS l_created_at,
                   l.updated_at AS l_updated_at
            FROM schedules s
            LEFT JOIN locations l ON l.id = s.location_id
            WHERE TRUE
            "#,
        );
        if let Some(from) = query.from {
            qb.push(" AND s.date >= ").push_bind(from);
        }
        if let Some(date) = query.date {
            qb.push(" AND s.date = ").push_bind(date);
        }
        if let Some(location_id) = &query.location_id {
            qb.push(" AND s.location_id = ").push_bind(location_id.clone());
        }
        qb.push(" ORDER BY s.date, s.start_time");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows: Vec<ScheduleJoinRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_schedule(&self, id: &str) -> StoreResult<Schedule> {
        sqlx::query_as(&format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("schedule", id))
    }

    async fn create_schedule(&self, data: &ScheduleCreate) -> StoreResult<Schedule> {
        sqlx::query_as(&format!(
            r#"
            INSERT INTO schedules (id, location_id, date, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(&data.location_id)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.end_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| location_fk(e, &data.location_id))
    }

    async fn update_schedule(&self, id: &str, data: &ScheduleUpdate) -> StoreResult<Schedule> {
        sqlx::query_as(&format!(
            r#"
            UPDATE schedules SET
                location_id = COALESCE($1, location_id),
                date = COALESCE($2, date),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                updated_at = now()
            WHERE id = $5
            RETURNING {SCHEDULE_COLUMNS}
            "#
        ))
        .bind(&data.location_id)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| location_fk(e, data.location_id.as_deref().unwrap_or_default()))?
        .ok_or_else(|| StoreError::not_found("schedule", id))
    }

    async fn delete_schedule(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("schedules", "schedule", id).await
    }

    // ── Orders ──

    async fn insert_order(&self, order: &NewOrder) -> StoreResult<Order> {
        insert_order_row(&self.pool, order).await
    }

    async fn insert_order_items(
        &self,
        order_id: &str,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<OrderItem>> {
        insert_items(&self.pool, order_id, items).await
    }

    /// Header and lines in one transaction; a failure leaves no rows
    async fn create_order(
        &self,
        order: &NewOrder,
        items: &[NewOrderItem],
    ) -> StoreResult<(Order, Vec<OrderItem>)> {
        let mut tx = self.pool.begin().await?;
        let created = insert_order_row(&mut *tx, order).await?;
        let lines = insert_items(&mut *tx, &created.id, items).await?;
        tx.commit().await?;
        Ok((created, lines))
    }

    async fn list_orders(&self, query: &OrderQuery) -> StoreResult<Vec<OrderDetail>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE TRUE"));
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(since) = query.since {
            qb.push(" AND created_at >= ").push_bind(since);
        }
        if let Some(until) = query.until {
            qb.push(" AND created_at < ").push_bind(until);
        }
        qb.push(" ORDER BY created_at DESC");
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ")
                .push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
        }
        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        let orders: Vec<Order> = collect(rows)?;
        self.attach_details(orders).await
    }

    async fn get_order(&self, id: &str) -> StoreResult<OrderDetail> {
        let row: OrderRow = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))?;
        let mut details = self.attach_details(vec![row.try_into()?]).await?;
        details
            .pop()
            .ok_or_else(|| StoreError::not_found("order", id))
    }

    async fn update_order_status(&self, id: &str, status: OrderStatus) -> StoreResult<Order> {
        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            UPDATE orders SET status = $1, updated_at = now()
            WHERE id = $2
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("order", id))?;
        row.try_into()
    }

    // ── Blog ──

    async fn list_blog_posts(&self, query: &BlogQuery) -> StoreResult<Vec<BlogPost>> {
        let mut qb =
            QueryBuilder::<Postgres>::new(format!("SELECT {BLOG_COLUMNS} FROM blog_posts WHERE TRUE"));
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(category) = &query.category {
            qb.push(" AND lower(category) = lower(")
                .push_bind(category.clone())
                .push(")");
        }
        if query.status == Some(BlogStatus::Published) {
            qb.push(" ORDER BY published_at DESC NULLS LAST");
        } else {
            qb.push(" ORDER BY created_at DESC");
        }
        let rows: Vec<BlogPostRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        collect(rows)
    }

    async fn get_blog_post(&self, id: &str) -> StoreResult<BlogPost> {
        let row: BlogPostRow = sqlx::query_as(&format!(
            "SELECT {BLOG_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("blog post", id))?;
        row.try_into()
    }

    async fn create_blog_post(&self, data: &BlogPostCreate) -> StoreResult<BlogPost> {
        let row: BlogPostRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO blog_posts (
                id, title, excerpt, content, image_url, category, author, status, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(new_id())
        .bind(&data.title)
        .bind(&data.excerpt)
        .bind(&data.content)
        .bind(&data.image_url)
        .bind(&data.category)
        .bind(&data.author)
        .bind(data.status.as_str())
        .bind(published_at_for(data.status, None))
        .fetch_one(&self.pool)
        .await?;
        row.try_into()
    }

    async fn update_blog_post(&self, id: &str, data: &BlogPostUpdate) -> StoreResult<BlogPost> {
        let row: BlogPostRow = sqlx::query_as(&format!(
            r#"
            UPDATE blog_posts SET
                title = COALESCE($1, title),
                excerpt = COALESCE($2, excerpt),
                content = COALESCE($3, content),
                image_url = COALESCE($4, image_url),
                category = COALESCE($5, category),
                author = COALESCE($6, author),
                status = COALESCE($7, status),
                published_at = CASE
                    WHEN $7 = 'published' AND published_at IS NULL THEN now()
                    ELSE published_at
                END,
                updated_at = now()
            WHERE id = $8
            RETURNING {BLOG_COLUMNS}
            "#
        ))
        .bind(&data.title)
        .bind(&data.excerpt)
        .bind(&data.content)
        .bind(&data.image_url)
        .bind(&data.category)
        .bind(&data.author)
        .bind(data.status.map(|s| s.as_str()))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::not_found("blog post", id))?;
        row.try_into()
    }

    async fn delete_blog_post(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("blog_posts", "blog post", id).await
    }

    // ── Reviews ──

    async fn list_reviews(&self) -> StoreResult<Vec<Review>> {
        let rows = sqlx::query_as(
            r#"
            SELECT id, customer_name, rating, comment, image_url, created_at
            FROM reviews
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn create_review(&self, data: &ReviewCreate) -> StoreResult<Review> {
        if !data.rating_in_range() {
            return Err(StoreError::Validation("Rating must be between 1 and 5".into()));
        }
        let row = sqlx::query_as(
            r#"
            INSERT INTO reviews (id, customer_name, rating, comment, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, customer_name, rating, comment, image_url, created_at
            "#,
        )
        .bind(new_id())
        .bind(&data.customer_name)
        .bind(data.rating)
        .bind(&data.comment)
        .bind(&data.image_url)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
