//! Shared types for the food-truck backend
//!
//! Domain models, the unified error system and small time/id helpers used
//! by the server and by anything that talks to its HTTP API.

pub mod error;
pub mod models;
pub mod util;

