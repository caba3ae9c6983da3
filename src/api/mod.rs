//! API Module
//!
//! HTTP handlers and routing. This is the transport boundary: it derives cache
//! keys from requests and renders domain errors as structured responses.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
