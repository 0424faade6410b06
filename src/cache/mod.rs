//! Caching layer for card lookups and images

pub mod card_cache;
pub mod image_cache;
pub mod store;

pub use card_cache::CardResolver;
pub use image_cache::ImageResolver;
pub use store::{BlobKind, CacheStore, DirStore, MemoryStore};
