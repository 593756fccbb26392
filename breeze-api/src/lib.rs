//! Read-only HTTP API over the request log.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, serve};
pub use state::AppState;
