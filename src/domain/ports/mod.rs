//! Port trait definitions (Hexagonal Architecture)
//!
//! - ResourceClient: remote operations against the DoubleTrust backend
//!
//! The query cache and mutation runner depend only on this trait, so tests
//! can substitute an in-memory implementation for the HTTP adapter.

pub mod resource_client;

pub use resource_client::ResourceClient;
