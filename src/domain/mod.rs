//! Domain layer for the DoubleTrust client
//!
//! Transport models for agents, tools and discovery, the client error
//! taxonomy, and the port the resource client implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{ClientError, ClientResult};
