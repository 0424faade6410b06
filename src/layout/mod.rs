//! Page layout for proxy sheets
//!
//! Cards are placed on an A4 landscape page in a 4 x 2 grid of 63 x 88 mm cells,
//! with crop marks along the page edges. Layout produces a list of drawing
//! instructions per page which a [`PageCanvas`] turns into output.

pub mod directory;
#[cfg(feature = "pdf")]
pub mod pdf;

pub use directory::section_from_directory;
#[cfg(feature = "pdf")]
pub use pdf::PdfCanvas;

use crate::error::Result;
use crate::models::{PrintSection, ResolvedCard};
use std::sync::Arc;

// All measures in millimetres, origin top left
pub const PAGE_WIDTH: f32 = 297.0;
pub const PAGE_HEIGHT: f32 = 210.0;
pub const X_OFFSET: f32 = 22.0;
pub const Y_OFFSET: f32 = 18.0;
pub const CARD_WIDTH: f32 = 63.0;
pub const CARD_HEIGHT: f32 = 88.0;
pub const COLUMNS: usize = 4;
pub const ROWS: usize = 2;
pub const CARDS_PER_PAGE: usize = COLUMNS * ROWS;
pub const CROP_MARK_LENGTH: f32 = 10.0;
/// Deck name label, relative to the cell
pub const LABEL_X: f32 = 5.0;
pub const LABEL_Y: f32 = 44.0;
pub const LABEL_WIDTH: f32 = 53.0;
pub const LABEL_HEIGHT: f32 = 5.0;

/// Inset of the inner frame and text of text proxies
const TEXT_INSET: f32 = 2.0;
const TEXT_ROW_HEIGHT: f32 = 6.0;
const RULES_LINE_HEIGHT: f32 = 3.8;

/// Axis aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Area {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
}

/// How a piece of text is set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f32,
    pub bold: bool,
    pub align: Align,
    /// Draw a bordered white box behind the text
    pub boxed: bool,
    /// Break into lines of this height (mm) starting at the top, instead of one centered line
    pub line_height: Option<f32>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 8.0,
            bold: false,
            align: Align::Left,
            boxed: false,
            line_height: None,
        }
    }
}

/// One drawing instruction
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    /// Rectangle outline
    Frame(Area),
    /// Image bytes scaled into the area
    Image { data: Arc<[u8]>, area: Area },
    /// Deck name on a bar
    Label { text: String, area: Area },
    Text {
        text: String,
        area: Area,
        style: TextStyle,
    },
}

/// Drawing instructions of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    /// Cells taken, including blank ones
    pub occupied: usize,
}

impl Page {
    fn new() -> Self {
        Self {
            ops: crop_marks(),
            occupied: 0,
        }
    }

    pub fn images(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Image { .. }))
    }

    pub fn labels(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops.iter().filter(|op| matches!(op, DrawOp::Label { .. }))
    }
}

/// Output target for laid out pages
pub trait PageCanvas {
    /// Start a new page; following drawing goes there
    fn add_page(&mut self) -> Result<()>;
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()>;
    fn draw_frame(&mut self, area: Area) -> Result<()>;
    fn place_image(&mut self, data: &[u8], area: Area) -> Result<()>;
    fn draw_label(&mut self, text: &str, area: Area) -> Result<()>;
    fn draw_text(&mut self, text: &str, area: Area, style: &TextStyle) -> Result<()>;
}

/// What a proxy looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProxyStyle {
    /// The card image fills the cell
    #[default]
    Image,
    /// Name, cost, type line, rules text and stats in a frame
    Text,
}

/// Cell `index` of a section, as the top left corner of the card
pub fn cell_position(index: usize) -> (f32, f32) {
    let column = index % COLUMNS;
    let row = (index % CARDS_PER_PAGE) / COLUMNS;
    (
        X_OFFSET + column as f32 * CARD_WIDTH,
        Y_OFFSET + row as f32 * CARD_HEIGHT,
    )
}

/// Pages needed for `cards` cards of one section
pub fn page_count(cards: usize) -> usize {
    cards.div_ceil(CARDS_PER_PAGE)
}

/// Crop mark ticks on the page edges, extending the grid lines
pub fn crop_marks() -> Vec<DrawOp> {
    let mut marks = Vec::with_capacity(2 * (COLUMNS + 1) + 2 * (ROWS + 1));
    for i in 0..=COLUMNS {
        let x = X_OFFSET + i as f32 * CARD_WIDTH;
        marks.push(DrawOp::Line {
            x1: x,
            y1: 0.0,
            x2: x,
            y2: CROP_MARK_LENGTH,
        });
        marks.push(DrawOp::Line {
            x1: x,
            y1: PAGE_HEIGHT - CROP_MARK_LENGTH,
            x2: x,
            y2: PAGE_HEIGHT,
        });
    }
    for i in 0..=ROWS {
        let y = Y_OFFSET + i as f32 * CARD_HEIGHT;
        marks.push(DrawOp::Line {
            x1: 0.0,
            y1: y,
            x2: CROP_MARK_LENGTH,
            y2: y,
        });
        marks.push(DrawOp::Line {
            x1: PAGE_WIDTH - CROP_MARK_LENGTH,
            y1: y,
            x2: PAGE_WIDTH,
            y2: y,
        });
    }
    marks
}

/// Rules text as printed: real minus signs become hyphens, paragraphs get a blank line
fn printable_rules(text: &str) -> String {
    text.replace('\u{2212}', "-").replace('\n', "\n\n")
}

/// Lays out print sections for one deck
#[derive(Debug, Clone, Default)]
pub struct SheetLayout {
    /// Printed on every card when not empty
    pub deck_name: String,
    pub style: ProxyStyle,
}

impl SheetLayout {
    pub fn new(deck_name: impl Into<String>, style: ProxyStyle) -> Self {
        Self {
            deck_name: deck_name.into(),
            style,
        }
    }

    /// Pages of one section. Every section starts on a fresh page; an empty
    /// section has none.
    pub fn layout(&self, section: &PrintSection) -> Vec<Page> {
        let mut pages: Vec<Page> = Vec::with_capacity(page_count(section.len()));
        for (i, card) in section.cards.iter().enumerate() {
            if i % CARDS_PER_PAGE == 0 {
                pages.push(Page::new());
            }
            if let Some(page) = pages.last_mut() {
                let (x, y) = cell_position(i);
                self.layout_card(card, x, y, &mut page.ops);
                page.occupied += 1;
            }
        }
        pages
    }

    /// Pages of all sections, in order
    pub fn layout_all(&self, sections: &[PrintSection]) -> Vec<Page> {
        sections.iter().flat_map(|s| self.layout(s)).collect()
    }

    /// Lay out `sections` and draw them onto `canvas`. Returns the number of pages written.
    pub fn render<C: PageCanvas + ?Sized>(
        &self,
        sections: &[PrintSection],
        canvas: &mut C,
    ) -> Result<usize> {
        let mut written = 0;
        for section in sections {
            let pages = self.layout(section);
            log::debug!("{}: {} cards on {} pages", section.kind, section.len(), pages.len());
            for page in &pages {
                canvas.add_page()?;
                for op in &page.ops {
                    draw(canvas, op)?;
                }
                written += 1;
            }
        }
        Ok(written)
    }

    fn label(&self, x: f32, y: f32, ops: &mut Vec<DrawOp>) {
        if self.deck_name.is_empty() {
            return;
        }
        ops.push(DrawOp::Label {
            text: self.deck_name.clone(),
            area: Area::new(x + LABEL_X, y + LABEL_Y, LABEL_WIDTH, LABEL_HEIGHT),
        });
    }

    fn layout_card(&self, card: &ResolvedCard, x: f32, y: f32, ops: &mut Vec<DrawOp>) {
        match self.style {
            ProxyStyle::Image => {
                // No image: the cell stays blank
                if let Some(data) = &card.image {
                    ops.push(DrawOp::Image {
                        data: data.clone(),
                        area: Area::new(x, y, CARD_WIDTH, CARD_HEIGHT),
                    });
                    self.label(x, y, ops);
                }
            }
            ProxyStyle::Text => {
                layout_text_card(card, x, y, ops);
                self.label(x, y, ops);
            }
        }
    }
}

fn layout_text_card(card: &ResolvedCard, x: f32, y: f32, ops: &mut Vec<DrawOp>) {
    let inner_w = CARD_WIDTH - 2.0 * TEXT_INSET;
    let left = x + TEXT_INSET;
    let right = x + CARD_WIDTH - TEXT_INSET;
    let title = Area::new(left, y + TEXT_INSET, inner_w, TEXT_ROW_HEIGHT);
    let title_rule = title.bottom();
    let stats_rule = y + CARD_HEIGHT - TEXT_ROW_HEIGHT - TEXT_INSET;

    ops.push(DrawOp::Frame(Area::new(x, y, CARD_WIDTH, CARD_HEIGHT)));
    ops.push(DrawOp::Frame(Area::new(
        left,
        y + TEXT_INSET,
        inner_w,
        CARD_HEIGHT - 2.0 * TEXT_INSET,
    )));
    ops.push(DrawOp::Text {
        text: card.name.clone(),
        area: title,
        style: TextStyle {
            size: 10.0,
            bold: true,
            ..TextStyle::default()
        },
    });
    if let Some(cost) = card.mana_cost.as_deref().filter(|c| !c.is_empty()) {
        ops.push(DrawOp::Text {
            text: cost.to_string(),
            area: title,
            style: TextStyle {
                align: Align::Right,
                ..TextStyle::default()
            },
        });
    }
    ops.push(DrawOp::Line {
        x1: left,
        y1: title_rule,
        x2: right,
        y2: title_rule,
    });
    ops.push(DrawOp::Text {
        text: card.type_line.clone().unwrap_or_default(),
        area: Area::new(left, title_rule, inner_w, TEXT_ROW_HEIGHT),
        style: TextStyle::default(),
    });
    let rules_top = title_rule + TEXT_ROW_HEIGHT + 1.0;
    ops.push(DrawOp::Text {
        text: printable_rules(card.oracle_text.as_deref().unwrap_or_default()),
        area: Area::new(left, rules_top, inner_w, stats_rule - rules_top),
        style: TextStyle {
            line_height: Some(RULES_LINE_HEIGHT),
            ..TextStyle::default()
        },
    });
    ops.push(DrawOp::Line {
        x1: left,
        y1: stats_rule,
        x2: right,
        y2: stats_rule,
    });

    let stats_box = Area::new(x + CARD_WIDTH - 15.0, stats_rule - 2.0, 10.0, 5.0);
    let boxed = TextStyle {
        align: Align::Center,
        boxed: true,
        ..TextStyle::default()
    };
    let power = card.power.as_deref().filter(|p| !p.is_empty());
    let toughness = card.toughness.as_deref().filter(|t| !t.is_empty());
    if let (Some(power), Some(toughness)) = (power, toughness) {
        ops.push(DrawOp::Text {
            text: format!("{} / {}", power, toughness),
            area: stats_box,
            style: boxed,
        });
    }
    if let Some(loyalty) = card.loyalty.as_deref().filter(|l| !l.is_empty()) {
        ops.push(DrawOp::Text {
            text: loyalty.to_string(),
            area: stats_box,
            style: boxed,
        });
    }
}

fn draw<C: PageCanvas + ?Sized>(canvas: &mut C, op: &DrawOp) -> Result<()> {
    match op {
        DrawOp::Line { x1, y1, x2, y2 } => canvas.draw_line(*x1, *y1, *x2, *y2),
        DrawOp::Frame(area) => canvas.draw_frame(*area),
        DrawOp::Image { data, area } => canvas.place_image(data, *area),
        DrawOp::Label { text, area } => canvas.draw_label(text, *area),
        DrawOp::Text { text, area, style } => canvas.draw_text(text, *area, style),
    }
}

#[cfg(test)]
#[path = "layout_tests.rs"]
mod tests;
