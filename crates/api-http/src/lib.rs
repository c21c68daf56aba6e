//! HTTP API Layer
//!
//! JSON over HTTP for the DontQ queue service. Identity is asserted by the
//! fronting gateway in the `x-user-id` header.

pub mod auth;
pub mod error;
pub mod handler;
pub mod rate_limiter;
pub mod server;
pub mod types;

pub use handler::ApiState;
pub use server::{build_router, HttpServer, HttpServerConfig};
