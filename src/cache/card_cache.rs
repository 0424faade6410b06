//! Cache-aside card lookups
//!
//! Every lookup is keyed by its full request URL. A hit never touches the
//! network; a miss is fetched through the rate-limited client and the raw
//! response is written back.

use crate::api::scryfall::{Lang, ScryfallCard};
use crate::api::ScryfallClient;
use crate::cache::store::{BlobKind, CacheStore};
use crate::error::{ProxyError, Result};
use std::sync::Arc;

/// Resolves card names and printings to Scryfall card objects
#[derive(Clone)]
pub struct CardResolver {
    client: ScryfallClient,
    store: Arc<dyn CacheStore>,
}

impl CardResolver {
    pub fn new(client: ScryfallClient, store: Arc<dyn CacheStore>) -> Self {
        Self { client, store }
    }

    pub fn client(&self) -> &ScryfallClient {
        &self.client
    }

    /// Best fuzzy match for `name`
    pub async fn resolve_by_name(&self, name: &str) -> Result<ScryfallCard> {
        log::debug!("Resolving card by name: {:?}", name);
        let url = self.client.named_url(name);
        self.resolve(&url, name).await
    }

    /// Best fuzzy match for `name` within one set
    pub async fn resolve_by_name_in_set(&self, name: &str, set_code: &str) -> Result<ScryfallCard> {
        log::debug!("Resolving card by name: {:?} in set {}", name, set_code);
        let url = self.client.named_in_set_url(name, set_code);
        self.resolve(&url, name).await
    }

    /// Exact printing by set code, collector number and language
    pub async fn resolve_by_identity(
        &self,
        set_code: &str,
        collector_number: &str,
        lang: Lang,
    ) -> Result<ScryfallCard> {
        log::debug!(
            "Resolving card by identity: {}/{}/{}",
            set_code,
            collector_number,
            lang
        );
        let url = self.client.identity_url(set_code, collector_number, lang);
        let label = format!("{}/{}/{}", set_code, collector_number, lang);
        self.resolve(&url, &label).await
    }

    /// Follow a related card reference (`all_parts[].uri`)
    pub async fn resolve_related(&self, uri: &str) -> Result<ScryfallCard> {
        log::debug!("Resolving related card: {}", uri);
        self.resolve(uri, uri).await
    }

    async fn resolve(&self, url: &str, label: &str) -> Result<ScryfallCard> {
        // Check cache first
        if let Some(bytes) = self.store.get(url)? {
            log::debug!("Card cache hit for {}", label);
            return decode(url, &bytes);
        }

        log::info!("Card cache miss for {}, fetching from Scryfall", label);
        let bytes = match self.client.fetch(url).await {
            Ok(bytes) => bytes,
            Err(ProxyError::BadStatus { status, .. })
                if status == reqwest::StatusCode::NOT_FOUND =>
            {
                return Err(ProxyError::NotFound(label.to_string()));
            }
            Err(e) => return Err(e),
        };

        let card = decode(url, &bytes)?;

        // Last write wins; the value for a key never changes
        self.store.put(url, &bytes, BlobKind::Json)?;

        Ok(card)
    }
}

fn decode(key: &str, bytes: &[u8]) -> Result<ScryfallCard> {
    serde_json::from_slice(bytes).map_err(|source| ProxyError::Decode {
        key: key.to_string(),
        source,
    })
}

#[cfg(test)]
#[path = "card_cache_tests.rs"]
mod tests;
