//! HTTP API consumed by the single-page front end.
//!
//! Routes are nested under `/api/`; every request passes through the
//! access-log middleware. `api_router()` returns a composable `Router`
//! that can be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError};
pub use types::ApiContext;
