//! Scryfall card objects
//!
//! Only the fields needed to print a proxy are modelled; everything else in the
//! response is ignored on decode.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Image variant name -> URL, as found in `image_uris`
pub type ImageUris = BTreeMap<String, String>;

/// Scryfall card response
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ScryfallCard {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub lang: Lang,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub set: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
    /// For double-faced cards, images and text are in card_faces
    #[serde(default)]
    pub card_faces: Option<Vec<CardFace>>,
    /// Tokens, meld pieces and other cards this one refers to
    #[serde(default)]
    pub all_parts: Option<Vec<RelatedCard>>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct CardFace {
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub type_line: Option<String>,
    #[serde(default)]
    pub oracle_text: Option<String>,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub toughness: Option<String>,
    #[serde(default)]
    pub loyalty: Option<String>,
    #[serde(default)]
    pub image_uris: Option<ImageUris>,
}

/// Entry of `all_parts`
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RelatedCard {
    #[serde(default)]
    pub id: String,
    pub component: Component,
    pub name: String,
    #[serde(default)]
    pub type_line: Option<String>,
    /// Full API URI of the related card object
    pub uri: String,
}

/// Role a related card plays in its relationship
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Token,
    MeldPart,
    MeldResult,
    ComboPiece,
    #[serde(other)]
    Unknown,
}

/// Scryfall layout classification
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Normal,
    Split,
    Flip,
    Transform,
    ModalDfc,
    Meld,
    Leveler,
    Saga,
    Adventure,
    Planar,
    Scheme,
    Vanguard,
    Token,
    DoubleFacedToken,
    Emblem,
    Augment,
    Host,
    ReversibleCard,
    #[serde(other)]
    Other,
}

impl Layout {
    /// Layouts printed on two physical sides, each with its own image
    pub fn is_double_faced(self) -> bool {
        matches!(
            self,
            Layout::Transform | Layout::ModalDfc | Layout::DoubleFacedToken | Layout::ReversibleCard
        )
    }
}

/// Printing language
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "zhs")]
    SimplifiedChinese,
    #[serde(rename = "zht")]
    TraditionalChinese,
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "la")]
    Latin,
    #[serde(rename = "grc")]
    AncientGreek,
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "sa")]
    Sanskrit,
    #[serde(rename = "ph")]
    Phyrexian,
}

impl Lang {
    const ALL: [Lang; 17] = [
        Lang::English,
        Lang::Spanish,
        Lang::French,
        Lang::German,
        Lang::Italian,
        Lang::Portuguese,
        Lang::Japanese,
        Lang::Korean,
        Lang::Russian,
        Lang::SimplifiedChinese,
        Lang::TraditionalChinese,
        Lang::Hebrew,
        Lang::Latin,
        Lang::AncientGreek,
        Lang::Arabic,
        Lang::Sanskrit,
        Lang::Phyrexian,
    ];

    /// Scryfall language code
    pub fn code(self) -> &'static str {
        match self {
            Lang::English => "en",
            Lang::Spanish => "es",
            Lang::French => "fr",
            Lang::German => "de",
            Lang::Italian => "it",
            Lang::Portuguese => "pt",
            Lang::Japanese => "ja",
            Lang::Korean => "ko",
            Lang::Russian => "ru",
            Lang::SimplifiedChinese => "zhs",
            Lang::TraditionalChinese => "zht",
            Lang::Hebrew => "he",
            Lang::Latin => "la",
            Lang::AncientGreek => "grc",
            Lang::Arabic => "ar",
            Lang::Sanskrit => "sa",
            Lang::Phyrexian => "ph",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        Lang::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| format!("Unknown language code: {}", s))
    }
}

/// Named image size/format in `image_uris`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageVariant {
    Small,
    Normal,
    #[default]
    Large,
    Png,
    ArtCrop,
    BorderCrop,
}

impl ImageVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageVariant::Small => "small",
            ImageVariant::Normal => "normal",
            ImageVariant::Large => "large",
            ImageVariant::Png => "png",
            ImageVariant::ArtCrop => "art_crop",
            ImageVariant::BorderCrop => "border_crop",
        }
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScryfallCard {
    /// Front face, if this card has faces
    pub fn front(&self) -> Option<&CardFace> {
        self.card_faces.as_ref().and_then(|faces| faces.first())
    }

    /// Back face, if this card has at least two faces
    pub fn back(&self) -> Option<&CardFace> {
        self.card_faces.as_ref().and_then(|faces| faces.get(1))
    }

    /// True if this card prints as two separate sides
    pub fn is_double_faced(&self) -> bool {
        self.layout.is_double_faced() && self.back().is_some()
    }

    /// Image URIs for printing the card as a single record
    pub fn image_uris(&self) -> Option<&ImageUris> {
        // Try direct image_uris first
        if let Some(ref uris) = self.image_uris {
            return Some(uris);
        }
        // For double-faced cards, use the front face image
        self.front().and_then(|face| face.image_uris.as_ref())
    }

    /// Related parts that are tokens created by this card
    pub fn token_parts(&self) -> impl Iterator<Item = &RelatedCard> {
        self.all_parts
            .iter()
            .flatten()
            .filter(|part| part.component == Component::Token)
    }
}

#[cfg(test)]
#[path = "scryfall_tests.rs"]
mod tests;
