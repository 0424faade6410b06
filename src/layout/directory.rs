//! Sheets from a directory of card images

use crate::error::Result;
use crate::models::{PrintSection, ResolvedCard, SectionKind};
use std::fs;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Build a `Main` section from the image files in `dir`, sorted by file name.
///
/// Each image is repeated `copies` times. A file that cannot be read keeps its
/// slots, printed blank.
pub fn section_from_directory(dir: impl AsRef<Path>, copies: usize) -> Result<PrintSection> {
    let dir = dir.as_ref();
    let mut files: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image(path))
        .collect();
    files.sort();

    let mut section = PrintSection::new(SectionKind::Main);
    for path in files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let image = match fs::read(&path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                None
            }
        };
        let card = ResolvedCard::from_image(name, image);
        section
            .cards
            .extend(std::iter::repeat(card).take(copies));
    }

    log::info!(
        "Loaded {} cards from {}",
        section.len(),
        dir.display()
    );
    Ok(section)
}
