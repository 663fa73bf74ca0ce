//! Kestrel DNS API Layer
//!
//! HTTP control surface for the resolver service: status, config,
//! lifecycle actions, ad-hoc lookups and the grouped query log.
pub mod dto;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_api_routes;
pub use state::AppState;
