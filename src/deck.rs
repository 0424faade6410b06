//! Deck list parsing
//!
//! ```text
//! // Lines starting with two slashes are ignored
//! 4 Lightning Bolt
//! 1 [DOM:205] Slimefoot, the Stowaway # everything after '#' is a comment
//! 2 [M19] Plains
//! ```

use crate::models::{CardRequest, Deck, DeckSection, SectionKind, Version};

/// Parse a deck list into a deck with a single `Main` section.
///
/// Each line yields `count` identical requests. Lines without a leading count
/// are skipped.
pub fn parse_deck(text: &str) -> Deck {
    let mut main = DeckSection {
        kind: SectionKind::Main,
        cards: Vec::new(),
    };

    for (line_no, raw) in text.lines().enumerate() {
        if raw.trim_start().starts_with("//") {
            continue;
        }
        match parse_line(raw) {
            Some((count, request)) => {
                main.cards
                    .extend(std::iter::repeat(request).take(count));
            }
            None => {
                if !strip_comment(raw).trim().is_empty() {
                    log::debug!("Skipping deck line {}: {:?}", line_no + 1, raw);
                }
            }
        }
    }

    Deck::from_section("", main)
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line,
    }
}

/// `[SET]` or `[SET:NUMBER]`, removed from the line
fn take_version(line: &str) -> (Option<Version>, String) {
    if let Some(open) = line.find('[') {
        if let Some(close) = line[open..].find(']').map(|i| open + i) {
            let pin = &line[open + 1..close];
            let parts: Vec<&str> = pin.split(':').collect();
            let version = match parts.as_slice() {
                [set] if !set.trim().is_empty() => Some(Version::set_only(set.trim())),
                [set, number] => Some(Version::new(set.trim(), number.trim())),
                _ => None,
            };
            let rest = format!("{}{}", &line[..open], &line[close + 1..]);
            return (version, rest);
        }
    }
    (None, line.to_string())
}

fn parse_line(raw: &str) -> Option<(usize, CardRequest)> {
    let line = strip_comment(raw).trim();
    if line.is_empty() {
        return None;
    }

    let (version, line) = take_version(line);
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 2 {
        return None;
    }
    let count: usize = fields[0].parse().ok()?;
    let name = fields[1..].join(" ");

    Some((count, CardRequest { name, version }))
}

#[cfg(test)]
#[path = "deck_tests.rs"]
mod tests;
