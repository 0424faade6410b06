//! PDF output via printpdf

use super::{Align, Area, PageCanvas, TextStyle, PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::{ProxyError, Result};
use printpdf::image_crate::GenericImageView;
use printpdf::path::PaintMode;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const PT_TO_MM: f32 = 0.3528;
/// Helvetica has no metrics in printpdf; average glyph width relative to the font size
const AVG_GLYPH_WIDTH: f32 = 0.5;
const IMAGE_DPI: f32 = 300.0;
const LABEL_FONT_SIZE: f32 = 10.0;

fn rgb(r: f32, g: f32, b: f32) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

fn canvas_error(e: impl std::fmt::Display) -> ProxyError {
    ProxyError::Canvas(e.to_string())
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH * PT_TO_MM
}

/// Greedy word wrap of every paragraph to `width` millimetres
fn wrap(text: &str, size: f32, width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", line, word)
            };
            if !line.is_empty() && text_width(&candidate, size) > width {
                lines.push(std::mem::replace(&mut line, word.to_string()));
            } else {
                line = candidate;
            }
        }
        lines.push(line);
    }
    lines
}

/// A4 landscape PDF document
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: Option<PdfLayerReference>,
    font: IndirectFontRef,
    font_bold: IndirectFontRef,
    pages: usize,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Result<Self> {
        let doc = PdfDocument::empty(title);
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(canvas_error)?;
        let font_bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(canvas_error)?;
        Ok(Self {
            doc,
            layer: None,
            font,
            font_bold,
            pages: 0,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Write the document to `path`
    pub fn save(self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(canvas_error)?;
        log::info!("Wrote {} pages to {}", self.pages, path.display());
        Ok(())
    }

    fn layer(&self) -> Result<&PdfLayerReference> {
        self.layer
            .as_ref()
            .ok_or_else(|| ProxyError::Canvas("no page to draw on".to_string()))
    }

    /// Page coordinates have their origin at the bottom left
    fn point(x: f32, y: f32) -> Point {
        Point::new(Mm(x), Mm(PAGE_HEIGHT - y))
    }

    fn rect(area: Area, mode: PaintMode) -> Rect {
        Rect::new(
            Mm(area.x),
            Mm(PAGE_HEIGHT - area.bottom()),
            Mm(area.right()),
            Mm(PAGE_HEIGHT - area.y),
        )
        .with_mode(mode)
    }

    fn set_line(
        &self,
        text: &str,
        size: f32,
        font: &IndirectFontRef,
        area: Area,
        align: Align,
        baseline: f32,
    ) -> Result<()> {
        let x = match align {
            Align::Left => area.x,
            Align::Right => area.right() - text_width(text, size),
            Align::Center => area.x + (area.w - text_width(text, size)) / 2.0,
        };
        self.layer()?
            .use_text(text, size, Mm(x), Mm(PAGE_HEIGHT - baseline), font);
        Ok(())
    }
}

impl PageCanvas for PdfCanvas {
    fn add_page(&mut self) -> Result<()> {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            format!("Page {}", self.pages),
        );
        let layer = self.doc.get_page(page).get_layer(layer);
        layer.set_outline_color(rgb(0.0, 0.0, 0.0));
        layer.set_fill_color(rgb(0.0, 0.0, 0.0));
        layer.set_outline_thickness(0.5);
        self.layer = Some(layer);
        Ok(())
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<()> {
        let line = Line {
            points: vec![(Self::point(x1, y1), false), (Self::point(x2, y2), false)],
            is_closed: false,
        };
        self.layer()?.add_line(line);
        Ok(())
    }

    fn draw_frame(&mut self, area: Area) -> Result<()> {
        self.layer()?.add_rect(Self::rect(area, PaintMode::Stroke));
        Ok(())
    }

    fn place_image(&mut self, data: &[u8], area: Area) -> Result<()> {
        // An undecodable image leaves the cell blank
        let decoded = match printpdf::image_crate::load_from_memory(data) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Skipping undecodable image ({} bytes): {}", data.len(), e);
                return Ok(());
            }
        };
        let (width_px, height_px) = decoded.dimensions();
        if width_px == 0 || height_px == 0 {
            return Ok(());
        }
        let natural_w = width_px as f32 / IMAGE_DPI * 25.4;
        let natural_h = height_px as f32 / IMAGE_DPI * 25.4;

        let image = Image::from_dynamic_image(&decoded);
        image.add_to_layer(
            self.layer()?.clone(),
            ImageTransform {
                translate_x: Some(Mm(area.x)),
                translate_y: Some(Mm(PAGE_HEIGHT - area.bottom())),
                scale_x: Some(area.w / natural_w),
                scale_y: Some(area.h / natural_h),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn draw_label(&mut self, text: &str, area: Area) -> Result<()> {
        let layer = self.layer()?;
        layer.add_rect(Self::rect(area, PaintMode::Fill));
        layer.set_fill_color(rgb(1.0, 1.0, 1.0));
        let baseline = area.y + area.h / 2.0 + LABEL_FONT_SIZE * PT_TO_MM * 0.35;
        self.set_line(text, LABEL_FONT_SIZE, &self.font, area, Align::Center, baseline)?;
        self.layer()?.set_fill_color(rgb(0.0, 0.0, 0.0));
        Ok(())
    }

    fn draw_text(&mut self, text: &str, area: Area, style: &TextStyle) -> Result<()> {
        if style.boxed {
            let layer = self.layer()?;
            layer.set_fill_color(rgb(1.0, 1.0, 1.0));
            layer.add_rect(Self::rect(area, PaintMode::FillStroke));
            layer.set_fill_color(rgb(0.0, 0.0, 0.0));
        }
        let font = if style.bold {
            &self.font_bold
        } else {
            &self.font
        };

        match style.line_height {
            Some(line_height) => {
                let mut baseline = area.y + line_height * 0.8;
                for line in wrap(text, style.size, area.w) {
                    if baseline > area.bottom() {
                        log::debug!("Text overflows its area: {:?}", line);
                        break;
                    }
                    self.set_line(&line, style.size, font, area, style.align, baseline)?;
                    baseline += line_height;
                }
            }
            None => {
                let baseline = area.y + area.h / 2.0 + style.size * PT_TO_MM * 0.35;
                self.set_line(text, style.size, font, area, style.align, baseline)?;
            }
        }
        Ok(())
    }
}
