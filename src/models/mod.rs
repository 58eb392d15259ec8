//! Data models for API records, reconciled cards, and set definitions.

pub mod card;
pub mod set;

pub use card::{ApiCard, Card, CardFace, ImageUris};
pub use set::{PlaceholderSpec, SearchPage, SetDefinition, SetMetadata};
