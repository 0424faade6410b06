//! MTG Proxy - printable proxy sheets for Magic: The Gathering decks
//!
//! Resolves deck lists against the Scryfall API (rate limited, cached on disk),
//! expands them into front faces, back faces and tokens, and lays the cards out
//! on A4 sheets with crop marks.

pub mod api;
pub mod cache;
pub mod deck;
pub mod error;
pub mod expand;
pub mod layout;
pub mod models;

pub use api::{ClientConfig, ImageVariant, Lang, RateLimiter, ScryfallClient};
pub use cache::{CacheStore, CardResolver, DirStore, ImageResolver, MemoryStore};
pub use deck::parse_deck;
pub use error::{ProxyError, Result};
pub use expand::{DeckExpander, ExpandOptions, Expansion, Issue, Stage};
pub use layout::{section_from_directory, PageCanvas, ProxyStyle, SheetLayout};
pub use models::{CardRequest, Deck, PrintSection, ResolvedCard, SectionKind, Version};
