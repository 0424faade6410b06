//! MTG Proxy - command line front end
//!
//! `mtg_proxy deck` resolves a deck list against Scryfall and writes proxy sheets,
//! `mtg_proxy layout` lays out a directory of card images.

use clap::{Parser, Subcommand, ValueEnum};
use mtg_proxy::layout::PdfCanvas;
use mtg_proxy::{
    parse_deck, section_from_directory, CardResolver, ClientConfig, DeckExpander, DirStore,
    ExpandOptions, ImageResolver, Lang, PrintSection, ProxyError, ProxyStyle, ScryfallClient,
    SheetLayout,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// MTG proxy sheet generator
#[derive(Parser, Debug)]
#[command(name = "mtg_proxy")]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print proxies for a deck list
    Deck {
        /// Deck list file, one "<count> <name>" per line
        file: PathBuf,

        /// Deck name printed on every card
        #[arg(short, long, default_value = "")]
        name: String,

        /// Cache directory (default: user cache dir)
        #[arg(short, long)]
        cache: Option<PathBuf>,

        /// Card images or text only
        #[arg(short, long, value_enum, default_value_t = Format::Image)]
        format: Format,

        /// Also print the tokens the deck creates
        #[arg(long, default_value_t = false)]
        with_tokens: bool,

        /// Print only the tokens the deck creates
        #[arg(long, default_value_t = false)]
        only_tokens: bool,

        /// Copies of each token
        #[arg(long, default_value_t = mtg_proxy::expand::DEFAULT_TOKEN_COPIES)]
        number_of_tokens: usize,

        /// Print language (en, de, fr, ja, ...)
        #[arg(short, long, default_value_t = Lang::English)]
        lang: Lang,

        /// Skip the back faces of double-faced cards
        #[arg(long, default_value_t = false)]
        no_back_faces: bool,

        /// Fail if any card could not be resolved
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Output file (default: deck file with .pdf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Lay out a directory of card images
    Layout {
        /// Directory with .jpg, .jpeg, .png or .gif files
        dir: PathBuf,

        /// Deck name printed on every card
        #[arg(short, long, default_value = "")]
        name: String,

        /// Copies of each image
        #[arg(long, default_value_t = 1)]
        copies: usize,

        /// At least four copies of each image
        #[arg(long, default_value_t = false)]
        playset: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Image,
    Text,
}

impl From<Format> for ProxyStyle {
    fn from(format: Format) -> Self {
        match format {
            Format::Image => ProxyStyle::Image,
            Format::Text => ProxyStyle::Text,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let result = match args.command {
        Command::Deck {
            file,
            name,
            cache,
            format,
            with_tokens,
            only_tokens,
            number_of_tokens,
            lang,
            no_back_faces,
            strict,
            output,
        } => {
            let mut options = ExpandOptions {
                lang,
                back_faces: !no_back_faces,
                token_copies: number_of_tokens,
                fetch_images: format == Format::Image,
                ..ExpandOptions::default()
            };
            if with_tokens {
                options = options.with_tokens();
            }
            if only_tokens {
                options = options.only_tokens();
            }
            let output = output.unwrap_or_else(|| file.with_extension("pdf"));
            let cache = cache.unwrap_or_else(DirStore::default_dir);
            run_deck(&file, name, &cache, format.into(), options, strict, &output).await
        }
        Command::Layout {
            dir,
            name,
            copies,
            playset,
        } => {
            let copies = if playset { copies.max(4) } else { copies };
            run_layout(&dir, name, copies)
        }
    };

    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run_deck(
    file: &Path,
    name: String,
    cache_dir: &Path,
    style: ProxyStyle,
    options: ExpandOptions,
    strict: bool,
    output: &Path,
) -> Result<(), ProxyError> {
    let text = std::fs::read_to_string(file)?;
    let mut deck = parse_deck(&text);
    deck.name = name;
    log::info!("Read {} cards from {}", deck.len(), file.display());

    let store = Arc::new(DirStore::open(cache_dir)?);

    let client = ScryfallClient::new(ClientConfig::default())?;
    let cards = CardResolver::new(client.clone(), store.clone());
    let images = ImageResolver::new(client, store);

    let expansion = DeckExpander::new(&cards, &images, options)
        .expand(&deck)
        .await?;

    let dropped = expansion.dropped().count();
    if strict && dropped > 0 {
        for issue in expansion.dropped() {
            log::error!("{}: {}", issue.card, issue.error);
        }
        return Err(ProxyError::Incomplete { dropped });
    }

    write_sheets(&deck.name, style, &expansion.sections, output)
}

fn run_layout(dir: &Path, name: String, copies: usize) -> Result<(), ProxyError> {
    let section = section_from_directory(dir, copies)?;
    write_sheets(&name, ProxyStyle::Image, &[section], &layout_output(dir))
}

/// `cards/` -> `cards.pdf`
fn layout_output(dir: &Path) -> PathBuf {
    let trimmed = dir.to_string_lossy().trim_end_matches('/').to_string();
    PathBuf::from(format!("{}.pdf", trimmed))
}

fn write_sheets(
    deck_name: &str,
    style: ProxyStyle,
    sections: &[PrintSection],
    output: &Path,
) -> Result<(), ProxyError> {
    let layout = SheetLayout::new(deck_name, style);
    let mut canvas = PdfCanvas::new(if deck_name.is_empty() {
        "Proxies"
    } else {
        deck_name
    })?;
    let pages = layout.render(sections, &mut canvas)?;
    if pages == 0 {
        log::warn!("Nothing to print, {} not written", output.display());
        return Ok(());
    }
    canvas.save(output)
}
