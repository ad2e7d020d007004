//! Axum web server adapter.
//!
//! Binds the tile store, synchronizer, manifest client and asset server to
//! HTTP routes. Construction follows the composition-root pattern:
//! [`ServerConfig`] → [`bootstrap`] → [`AppContext`] → [`create_router`].
//!
//! [`bootstrap`]: bootstrap::bootstrap
//! [`create_router`]: routes::create_router

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use bootstrap::{AppContext, CorsConfig, ServerConfig, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
