//! Decks, print sections and resolved cards

use crate::api::scryfall::{CardFace, ImageUris, ScryfallCard};
use crate::error::{ProxyError, Result};
use std::fmt;
use std::sync::Arc;

/// Printing a card request is pinned to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub set: Option<String>,
    pub collector_number: Option<String>,
}

impl Version {
    pub fn new(set: impl Into<String>, collector_number: impl Into<String>) -> Self {
        Self {
            set: Some(set.into()),
            collector_number: Some(collector_number.into()),
        }
    }

    pub fn set_only(set: impl Into<String>) -> Self {
        Self {
            set: Some(set.into()),
            collector_number: None,
        }
    }

    /// Version of a Scryfall printing, if both parts are known
    pub fn of(card: &ScryfallCard) -> Option<Self> {
        if card.set.is_empty() || card.collector_number.is_empty() {
            return None;
        }
        Some(Self::new(card.set.clone(), card.collector_number.clone()))
    }
}

/// Section names. Print sections use the three fixed ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Main,
    FrontFaces,
    BackFaces,
    Tokens,
    Custom(String),
}

impl SectionKind {
    pub fn as_str(&self) -> &str {
        match self {
            SectionKind::Main => "Main",
            SectionKind::FrontFaces => "FrontFaces",
            SectionKind::BackFaces => "BackFaces",
            SectionKind::Tokens => "Tokens",
            SectionKind::Custom(name) => name,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical copy of a card in the deck list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRequest {
    pub name: String,
    pub version: Option<Version>,
}

impl CardRequest {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn pinned(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version: Some(version),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeckSection {
    pub kind: SectionKind,
    pub cards: Vec<CardRequest>,
}

/// Parsed deck list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deck {
    /// Printed on every proxy when not empty
    pub name: String,
    sections: Vec<DeckSection>,
}

impl Deck {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    /// Deck made of one section
    pub fn from_section(name: impl Into<String>, section: DeckSection) -> Self {
        Self {
            name: name.into(),
            sections: vec![section],
        }
    }

    /// Append a section. Section names must be unique within a deck.
    pub fn add_section(&mut self, section: DeckSection) -> Result<()> {
        if self.sections.iter().any(|s| s.kind == section.kind) {
            return Err(ProxyError::InvalidDeck(format!(
                "duplicate section: {}",
                section.kind
            )));
        }
        self.sections.push(section);
        Ok(())
    }

    pub fn sections(&self) -> &[DeckSection] {
        &self.sections
    }

    /// All requests in deck order
    pub fn cards(&self) -> impl Iterator<Item = &CardRequest> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    /// Total number of physical copies
    pub fn len(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Which printed side a resolved card is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceRole {
    Single,
    FrontFace,
    BackFace,
    Token,
}

/// A card ready to be printed. Plain data; never refers back to a resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCard {
    pub name: String,
    pub mana_cost: Option<String>,
    pub type_line: Option<String>,
    pub oracle_text: Option<String>,
    pub power: Option<String>,
    pub toughness: Option<String>,
    pub loyalty: Option<String>,
    /// Image variants this face can be printed from
    pub image_uris: ImageUris,
    /// Image bytes, absent when not fetched or the fetch failed
    pub image: Option<Arc<[u8]>>,
    pub version: Option<Version>,
    pub role: FaceRole,
}

impl ResolvedCard {
    /// The whole card as one record
    pub fn from_card(card: &ScryfallCard, role: FaceRole) -> Self {
        Self {
            name: card.name.clone(),
            mana_cost: card.mana_cost.clone(),
            type_line: card.type_line.clone(),
            oracle_text: card.oracle_text.clone(),
            power: card.power.clone(),
            toughness: card.toughness.clone(),
            loyalty: card.loyalty.clone(),
            image_uris: card.image_uris().cloned().unwrap_or_default(),
            image: None,
            version: Version::of(card),
            role,
        }
    }

    /// One face of a multi-faced card, sharing the parent's version
    pub fn from_face(parent: &ScryfallCard, face: &CardFace, role: FaceRole) -> Self {
        Self {
            name: face.name.clone(),
            mana_cost: face.mana_cost.clone(),
            type_line: face.type_line.clone(),
            oracle_text: face.oracle_text.clone(),
            power: face.power.clone(),
            toughness: face.toughness.clone(),
            loyalty: face.loyalty.clone(),
            image_uris: face.image_uris.clone().unwrap_or_default(),
            image: None,
            version: Version::of(parent),
            role,
        }
    }

    /// Printed sides of `card`: front and back for double-faced cards, otherwise one single record
    pub fn faces(card: &ScryfallCard) -> Vec<Self> {
        match (card.is_double_faced(), card.front(), card.back()) {
            (true, Some(front), Some(back)) => vec![
                Self::from_face(card, front, FaceRole::FrontFace),
                Self::from_face(card, back, FaceRole::BackFace),
            ],
            _ => vec![Self::from_card(card, FaceRole::Single)],
        }
    }

    /// A bare card backed only by image bytes (local image files)
    pub fn from_image(name: impl Into<String>, image: Option<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mana_cost: None,
            type_line: None,
            oracle_text: None,
            power: None,
            toughness: None,
            loyalty: None,
            image_uris: ImageUris::new(),
            image: image.map(Arc::from),
            version: None,
            role: FaceRole::Single,
        }
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }
}

/// Ordered cards printed together, never sharing a page with another section
#[derive(Debug, Clone, PartialEq)]
pub struct PrintSection {
    pub kind: SectionKind,
    pub cards: Vec<ResolvedCard>,
}

impl PrintSection {
    pub fn new(kind: SectionKind) -> Self {
        Self {
            kind,
            cards: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
