//! Data models
//!
//! Shared between the server and its HTTP clients (public site, admin console).
//! Row types that map 1:1 onto a table use
//! `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are UUID strings.

pub mod blog_post;
pub mod location;
pub mod menu_item;
pub mod order;
pub mod review;
pub mod schedule;

// Re-exports
pub use blog_post::*;
pub use location::*;
pub use menu_item::*;
pub use order::*;
pub use review::*;
pub use schedule::*;
