//! Public site API
//!
//! Menu, upcoming stops, availability, blog and reviews, catering quotes,
//! plus order placement. Nothing here needs a login.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    BlogPost, BlogStatus, CategoryFilter, Location, MenuItem, Review, ReviewCreate, Schedule,
    ScheduleQuery, ScheduleWithLocation,
};
use shared::util::today;

use super::{ApiResult, search_term};
use crate::availability::{available_dates, available_times};
use crate::catalog::{BlogQuery, MenuQuery};
use crate::catering::{
    CateringPackage, MAX_GUESTS, MIN_GUESTS, PACKAGES, Quote, QuoteRequest, earliest_event_date,
    quote,
};
use crate::maps::MapView;
use crate::orders::{BookingRequest, OrderConfirmation};
use crate::state::AppState;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_rating,
    validate_required_text,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/locations", get(list_locations))
        .route("/api/menu", get(list_menu))
        .route("/api/schedules", get(list_schedules))
        .route("/api/schedules/today", get(today_stop))
        .route("/api/availability", get(availability))
        .route("/api/orders", post(place_order))
        .route("/api/blog", get(list_blog))
        .route("/api/blog/{id}", get(get_blog_post))
        .route("/api/reviews", get(list_reviews).post(create_review))
        .route("/api/catering/packages", get(catering_packages))
        .route("/api/catering/quote", post(catering_quote))
}

/// GET /api/locations
pub async fn list_locations(State(state): State<AppState>) -> ApiResult<Vec<Location>> {
    Ok(Json(state.store.list_locations().await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct MenuParams {
    pub category: Option<String>,
}

pub(crate) fn parse_category(raw: Option<&str>) -> Result<CategoryFilter, AppError> {
    raw.unwrap_or_default().parse().map_err(|e| {
        AppError::with_message(ErrorCode::InvalidMenuCategory, format!("{e}"))
    })
}

/// GET /api/menu?category= - `all`, a category, or `dessert` (always empty)
pub async fn list_menu(
    State(state): State<AppState>,
    Query(params): Query<MenuParams>,
) -> ApiResult<Vec<MenuItem>> {
    let category = parse_category(params.category.as_deref())?;
    let items = state.store.list_menu_items(&MenuQuery { category }).await?;
    Ok(Json(items))
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleParams {
    pub limit: Option<usize>,
    pub location_id: Option<String>,
}

/// GET /api/schedules - stops from today on, by date then start time
pub async fn list_schedules(
    State(state): State<AppState>,
    Query(params): Query<ScheduleParams>,
) -> ApiResult<Vec<ScheduleWithLocation>> {
    let mut query = ScheduleQuery::upcoming(today());
    query.location_id = params.location_id;
    query.limit = params.limit;
    Ok(Json(state.store.list_schedules(&query).await?))
}

#[derive(Debug, Serialize)]
pub struct TodayStop {
    pub date: NaiveDate,
    pub stop: Option<ScheduleWithLocation>,
    pub map: Option<MapView>,
}

/// GET /api/schedules/today - where the truck is today
pub async fn today_stop(State(state): State<AppState>) -> ApiResult<TodayStop> {
    let date = today();
    let stop = state
        .store
        .list_schedules(&ScheduleQuery::on(date).with_limit(1))
        .await?
        .into_iter()
        .next();

    let map = match stop.as_ref().and_then(|s| s.location.as_ref()) {
        Some(location) => Some(state.maps.render(location).await),
        None => None,
    };
    Ok(Json(TodayStop { date, stop, map }))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityParams {
    pub location_id: String,
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct Availability {
    pub location_id: String,
    /// Days with a scheduled stop at this location
    pub dates: Vec<NaiveDate>,
    pub date: Option<NaiveDate>,
    /// Pickup labels for `date`; empty without a date or a stop that day
    pub times: Vec<String>,
}

/// GET /api/availability?location_id=&date=
pub async fn availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> ApiResult<Availability> {
    let query = ScheduleQuery {
        from: Some(today()),
        location_id: Some(params.location_id.clone()),
        ..Default::default()
    };
    let schedules: Vec<Schedule> = state
        .store
        .list_schedules(&query)
        .await?
        .into_iter()
        .map(|s| s.schedule)
        .collect();

    let times = params
        .date
        .map(|d| available_times(&schedules, d, &params.location_id))
        .unwrap_or_default();

    Ok(Json(Availability {
        dates: available_dates(&schedules),
        location_id: params.location_id,
        date: params.date,
        times,
    }))
}

/// POST /api/orders - place an order
pub async fn place_order(
    State(state): State<AppState>,
    Json(req): Json<BookingRequest>,
) -> ApiResult<OrderConfirmation> {
    Ok(Json(state.orders.submit(req).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct BlogParams {
    pub category: Option<String>,
    pub q: Option<String>,
}

/// GET /api/blog - published posts, newest first
pub async fn list_blog(
    State(state): State<AppState>,
    Query(params): Query<BlogParams>,
) -> ApiResult<Vec<BlogPost>> {
    let query = BlogQuery {
        category: params
            .category
            .filter(|c| !c.trim().is_empty() && !c.eq_ignore_ascii_case("all")),
        ..BlogQuery::published()
    };
    let mut posts = state.store.list_blog_posts(&query).await?;
    if let Some(q) = search_term(params.q.as_deref()) {
        posts.retain(|p| p.matches_search(&q));
    }
    Ok(Json(posts))
}

/// GET /api/blog/{id} - a published post
pub async fn get_blog_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<BlogPost> {
    let post = state.store.get_blog_post(&id).await?;
    if post.status != BlogStatus::Published {
        return Err(AppError::new(ErrorCode::BlogPostNotFound)
            .with_detail("id", id)
            .into());
    }
    Ok(Json(post))
}

/// GET /api/reviews
pub async fn list_reviews(State(state): State<AppState>) -> ApiResult<Vec<Review>> {
    Ok(Json(state.store.list_reviews().await?))
}

/// POST /api/reviews
pub async fn create_review(
    State(state): State<AppState>,
    Json(payload): Json<ReviewCreate>,
) -> ApiResult<Review> {
    validate_required_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_rating(payload.rating)?;
    validate_required_text(&payload.comment, "comment", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image_url, "image_url", MAX_URL_LEN)?;
    Ok(Json(state.store.create_review(&payload).await?))
}


#[derive(Debug, Serialize)]
pub struct CateringMenu {
    pub packages: &'static [CateringPackage],
    pub earliest_date: NaiveDate,
    pub min_guests: u32,
    pub max_guests: u32,
}

/// GET /api/catering/packages
pub async fn catering_packages() -> ApiResult<CateringMenu> {
    Ok(Json(CateringMenu {
        packages: &PACKAGES,
        earliest_date: earliest_event_date(today()),
        min_guests: MIN_GUESTS,
        max_guests: MAX_GUESTS,
    }))
}

/// POST /api/catering/quote - price a selection for an event date
pub async fn catering_quote(Json(req): Json<QuoteRequest>) -> ApiResult<Quote> {
    Ok(Json(quote(&req, today())?))
}
