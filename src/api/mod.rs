//! Scryfall API client and card objects

pub mod client;
pub mod rate_limit;
pub mod scryfall;

// Re-exports for public API convenience
pub use client::{ClientConfig, ScryfallClient, DEFAULT_BASE_URL};
pub use rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};
pub use scryfall::{
    CardFace, Component, ImageUris, ImageVariant, Lang, Layout, RelatedCard, ScryfallCard,
};
