//! HTTP adapter for the DoubleTrust backend.
//!
//! Implements the [`ResourceClient`](crate::domain::ports::ResourceClient)
//! port with `reqwest`, sending and accepting JSON.

pub mod client;
pub mod error_body;

pub use client::HttpResourceClient;
