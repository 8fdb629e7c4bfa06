//! Rooted conversion networks and their lazy cache.
pub mod builder;
pub mod cache;

pub use builder::ConversionNetwork;
pub use cache::{ComponentId, Components, NetworkCache};
