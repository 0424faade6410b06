//! Deck expansion into print sections
//!
//! Turns a deck (one request per physical copy) into the FrontFaces, BackFaces
//! and Tokens sections, in deck order. Cards that cannot be resolved are left
//! out and reported; cards whose image cannot be fetched keep their place
//! without an image.

use crate::api::scryfall::{Lang, ScryfallCard};
use crate::cache::{CardResolver, ImageResolver};
use crate::error::{ProxyError, Result};
use crate::models::{CardRequest, Deck, FaceRole, PrintSection, ResolvedCard, SectionKind};
use std::collections::HashSet;
use std::sync::Arc;

/// Copies printed of every distinct token
pub const DEFAULT_TOKEN_COPIES: usize = 4;

/// What to print
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Language of the printed cards. Non-English printings are looked up by set and number.
    pub lang: Lang,
    pub front_faces: bool,
    pub back_faces: bool,
    pub tokens: bool,
    /// Copies of each distinct token
    pub token_copies: usize,
    /// Download images (not needed for text proxies)
    pub fetch_images: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            lang: Lang::English,
            front_faces: true,
            back_faces: true,
            tokens: false,
            token_copies: DEFAULT_TOKEN_COPIES,
            fetch_images: true,
        }
    }
}

impl ExpandOptions {
    pub fn with_tokens(mut self) -> Self {
        self.tokens = true;
        self
    }

    /// Print only the tokens the deck creates
    pub fn only_tokens(mut self) -> Self {
        self.front_faces = false;
        self.back_faces = false;
        self.tokens = true;
        self
    }
}

/// Step at which a card ran into a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Card lookup failed; the entry was dropped
    Resolve,
    /// Localized printing lookup failed; the entry was dropped
    Localize,
    /// Token lookup failed; the token was dropped
    Token,
    /// Image missing; the entry is kept without image
    Image,
}

/// A card that was dropped or printed without image
#[derive(Debug)]
pub struct Issue {
    pub card: String,
    pub stage: Stage,
    pub error: ProxyError,
}

impl Issue {
    /// True if the card is missing from the output altogether
    pub fn is_dropped(&self) -> bool {
        self.stage != Stage::Image
    }
}

/// Print sections plus everything that went wrong on the way
#[derive(Debug, Default)]
pub struct Expansion {
    pub sections: Vec<PrintSection>,
    pub issues: Vec<Issue>,
}

impl Expansion {
    pub fn section(&self, kind: &SectionKind) -> Option<&PrintSection> {
        self.sections.iter().find(|s| &s.kind == kind)
    }

    /// Cards of a section; empty if the section was not emitted
    pub fn cards(&self, kind: &SectionKind) -> &[ResolvedCard] {
        self.section(kind).map(|s| s.cards.as_slice()).unwrap_or(&[])
    }

    pub fn dropped(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| issue.is_dropped())
    }

    pub fn missing_images(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|issue| !issue.is_dropped())
    }

    pub fn is_complete(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Expands decks using the given resolvers
pub struct DeckExpander<'a> {
    cards: &'a CardResolver,
    images: &'a ImageResolver,
    options: ExpandOptions,
}

impl<'a> DeckExpander<'a> {
    pub fn new(cards: &'a CardResolver, images: &'a ImageResolver, options: ExpandOptions) -> Self {
        Self {
            cards,
            images,
            options,
        }
    }

    /// Expand `deck` into print sections.
    ///
    /// Only cache store failures abort the expansion; every other problem is
    /// recorded in [`Expansion::issues`].
    pub async fn expand(&self, deck: &Deck) -> Result<Expansion> {
        let mut front = PrintSection::new(SectionKind::FrontFaces);
        let mut back = PrintSection::new(SectionKind::BackFaces);
        let mut tokens = PrintSection::new(SectionKind::Tokens);
        let mut seen_tokens: HashSet<String> = HashSet::new();
        let mut issues = Vec::new();

        log::info!(
            "Expanding deck {:?}: {} cards",
            deck.name,
            deck.len()
        );

        for request in deck.cards() {
            let card = match self.resolve_request(request).await {
                Ok(card) => card,
                Err((stage, error)) => {
                    if error.is_fatal() {
                        return Err(error);
                    }
                    log::warn!("Skipping {:?}: {}", request.name, error);
                    issues.push(Issue {
                        card: request.name.clone(),
                        stage,
                        error,
                    });
                    continue;
                }
            };

            for face in ResolvedCard::faces(&card) {
                match face.role {
                    FaceRole::BackFace if self.options.back_faces => {
                        back.cards.push(self.with_image(face, &mut issues).await?)
                    }
                    FaceRole::BackFace => {}
                    _ if self.options.front_faces => {
                        front.cards.push(self.with_image(face, &mut issues).await?)
                    }
                    _ => {}
                }
            }

            if self.options.tokens {
                self.expand_tokens(&card, &mut seen_tokens, &mut tokens, &mut issues)
                    .await?;
            }
        }

        let mut sections = Vec::new();
        for (enabled, section) in [
            (self.options.front_faces, front),
            (self.options.back_faces, back),
            (self.options.tokens, tokens),
        ] {
            if enabled && !section.is_empty() {
                sections.push(section);
            }
        }

        log::info!(
            "Expanded deck {:?}: {} ({} dropped, {} without image)",
            deck.name,
            sections
                .iter()
                .map(|s| format!("{} {}", s.len(), s.kind))
                .collect::<Vec<_>>()
                .join(", "),
            issues.iter().filter(|i| i.is_dropped()).count(),
            issues.iter().filter(|i| !i.is_dropped()).count()
        );

        Ok(Expansion { sections, issues })
    }

    /// Initial lookup, then the localized printing if another language is requested
    async fn resolve_request(
        &self,
        request: &CardRequest,
    ) -> std::result::Result<ScryfallCard, (Stage, ProxyError)> {
        let pin = request.version.as_ref();
        let set = pin.and_then(|v| v.set.as_deref()).filter(|s| !s.is_empty());
        let number = pin
            .and_then(|v| v.collector_number.as_deref())
            .filter(|n| !n.is_empty());

        let card = match (set, number) {
            (Some(set), Some(number)) => {
                self.cards
                    .resolve_by_identity(set, number, Lang::English)
                    .await
            }
            (Some(set), None) => self.cards.resolve_by_name_in_set(&request.name, set).await,
            _ => self.cards.resolve_by_name(&request.name).await,
        }
        .map_err(|e| (Stage::Resolve, e))?;

        if self.options.lang == Lang::English {
            return Ok(card);
        }

        // No fallback to the English printing
        self.cards
            .resolve_by_identity(&card.set, &card.collector_number, self.options.lang)
            .await
            .map_err(|e| (Stage::Localize, e))
    }

    /// Append `token_copies` copies of every token not seen before
    async fn expand_tokens(
        &self,
        card: &ScryfallCard,
        seen: &mut HashSet<String>,
        tokens: &mut PrintSection,
        issues: &mut Vec<Issue>,
    ) -> Result<()> {
        for part in card.token_parts() {
            // Looked up once per pass, whether or not the lookup succeeds
            if !seen.insert(part.name.clone()) {
                continue;
            }

            let token_card = match self.cards.resolve_related(&part.uri).await {
                Ok(token_card) => token_card,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    log::warn!("Skipping token {:?} of {:?}: {}", part.name, card.name, e);
                    issues.push(Issue {
                        card: part.name.clone(),
                        stage: Stage::Token,
                        error: e,
                    });
                    continue;
                }
            };

            // The same token may be referenced under another name
            let already_printed =
                token_card.name != part.name && !seen.insert(token_card.name.clone());
            if already_printed {
                continue;
            }

            let token = ResolvedCard::from_card(&token_card, FaceRole::Token);
            let token = self.with_image(token, issues).await?;
            log::debug!(
                "Adding {} copies of token {:?}",
                self.options.token_copies,
                token.name
            );
            tokens
                .cards
                .extend(std::iter::repeat(token).take(self.options.token_copies));
        }
        Ok(())
    }

    /// Attach the image; a missing image is recorded and the card is kept
    async fn with_image(
        &self,
        mut card: ResolvedCard,
        issues: &mut Vec<Issue>,
    ) -> Result<ResolvedCard> {
        if !self.options.fetch_images {
            return Ok(card);
        }
        match self.images.image_for(&card).await {
            Ok(bytes) => card.image = Some(Arc::from(bytes)),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("No image for {:?}: {}", card.name, e);
                issues.push(Issue {
                    card: card.name.clone(),
                    stage: Stage::Image,
                    error: e,
                });
            }
        }
        Ok(card)
    }
}

#[cfg(test)]
#[path = "expand_tests.rs"]
mod tests;
