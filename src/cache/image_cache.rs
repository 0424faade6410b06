//! Cache-aside image downloads, keyed by image URL

use crate::api::scryfall::ImageVariant;
use crate::api::ScryfallClient;
use crate::cache::store::{BlobKind, CacheStore};
use crate::error::{ProxyError, Result};
use crate::models::ResolvedCard;
use std::sync::Arc;

/// Resolves image URLs to image bytes
#[derive(Clone)]
pub struct ImageResolver {
    client: ScryfallClient,
    store: Arc<dyn CacheStore>,
    variant: ImageVariant,
}

impl ImageResolver {
    pub fn new(client: ScryfallClient, store: Arc<dyn CacheStore>) -> Self {
        Self {
            client,
            store,
            variant: ImageVariant::default(),
        }
    }

    /// Use another image variant than `large`
    pub fn with_variant(mut self, variant: ImageVariant) -> Self {
        self.variant = variant;
        self
    }

    fn kind(&self) -> BlobKind {
        match self.variant {
            ImageVariant::Png => BlobKind::Png,
            _ => BlobKind::Jpeg,
        }
    }

    /// Fetch image bytes, checking cache first
    pub async fn resolve(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.store.get(url)? {
            log::debug!("Image cache hit for {}", url);
            return Ok(bytes);
        }

        log::info!("Image cache miss for {}, fetching from Scryfall", url);
        let bytes = self.client.fetch(url).await?;
        self.store.put(url, &bytes, self.kind())?;
        Ok(bytes)
    }

    /// Image of the configured variant for a resolved card
    pub async fn image_for(&self, card: &ResolvedCard) -> Result<Vec<u8>> {
        let url = card
            .image_uris
            .get(self.variant.as_str())
            .ok_or_else(|| ProxyError::NoSuchVariant {
                card: card.name.clone(),
                variant: self.variant.to_string(),
            })?;
        self.resolve(url).await
    }
}
