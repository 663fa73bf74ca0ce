//! Kestrel DNS Infrastructure Layer
//!
//! Wire codec, cache engine, upstream transports and the resolver
//! service control surface.
pub mod dns;
