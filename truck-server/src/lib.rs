//! Food truck ordering backend
//!
//! Serves the public site (menu, where the truck is, pickup availability,
//! blog, reviews), takes pickup orders, and backs the admin console.
//!
//! # Module layout
//!
//! ```text
//! truck-server/src/
//! ├── availability.rs  # pickup slots from a day's schedule window
//! ├── cart.rs          # cart with captured unit prices
//! ├── catering.rs      # catering packages and quotes
//! ├── orders/          # order submission flow
//! ├── catalog/         # store trait, Postgres and in-memory backends
//! ├── notifier/        # confirmation email (function client, Resend relay)
//! ├── maps.rs          # map load + geocoding
//! ├── dashboard.rs     # admin statistics
//! ├── call.rs          # per-call deadlines
//! ├── api/             # axum routes
//! └── utils/           # logging, validation
//! ```

pub mod api;
pub mod availability;
pub mod call;
pub mod cart;
pub mod catalog;
pub mod catering;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod maps;
pub mod notifier;
pub mod orders;
pub mod state;
pub mod utils;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
