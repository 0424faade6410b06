//! End-to-end tests: deck list -> Scryfall (mocked) -> sections -> pages

use std::sync::Arc;
use std::time::{Duration, Instant};

use mtg_proxy::layout::DrawOp;
use mtg_proxy::models::FaceRole;
use mtg_proxy::{
    parse_deck, CacheStore, CardResolver, ClientConfig, DeckExpander, DirStore, ExpandOptions,
    ImageResolver, MemoryStore, ProxyStyle, RateLimiter, ScryfallClient, SectionKind, SheetLayout,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const JPEG: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

fn client(server: &MockServer, min_interval: Duration) -> ScryfallClient {
    ScryfallClient::new(ClientConfig {
        min_interval,
        ..ClientConfig::with_base_url(server.uri())
    })
    .unwrap()
}

fn resolvers(
    server: &MockServer,
    store: Arc<dyn CacheStore>,
) -> (CardResolver, ImageResolver) {
    let client = client(server, Duration::from_millis(1));
    (
        CardResolver::new(client.clone(), store.clone()),
        ImageResolver::new(client, store),
    )
}

fn plains_json(server: &MockServer) -> serde_json::Value {
    serde_json::json!({
        "object": "card",
        "id": "plains-id",
        "name": "Plains",
        "lang": "en",
        "layout": "normal",
        "set": "m19",
        "collector_number": "261",
        "type_line": "Basic Land — Plains",
        "oracle_text": "({T}: Add {W}.)",
        "image_uris": {
            "small": format!("{}/small/plains.jpg", server.uri()),
            "large": format!("{}/large/plains.jpg", server.uri())
        }
    })
}

fn nicol_bolas_json(server: &MockServer) -> serde_json::Value {
    serde_json::json!({
        "object": "card",
        "id": "bolas-id",
        "name": "Nicol Bolas, the Ravager // Nicol Bolas, the Arisen",
        "lang": "en",
        "layout": "transform",
        "set": "m19",
        "collector_number": "218",
        "card_faces": [
            {
                "object": "card_face",
                "name": "Nicol Bolas, the Ravager",
                "mana_cost": "{1}{U}{B}{R}",
                "type_line": "Legendary Creature — Elder Dragon",
                "oracle_text": "Flying",
                "power": "4",
                "toughness": "4",
                "image_uris": { "large": format!("{}/large/bolas-front.jpg", server.uri()) }
            },
            {
                "object": "card_face",
                "name": "Nicol Bolas, the Arisen",
                "mana_cost": "",
                "type_line": "Legendary Planeswalker — Bolas",
                "oracle_text": "+2: Draw two cards.\n−3: Nicol Bolas deals 10 damage.",
                "loyalty": "7",
                "image_uris": { "large": format!("{}/large/bolas-back.jpg", server.uri()) }
            }
        ]
    })
}

async fn mount_scryfall(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .and(query_param("fuzzy", "Plains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(plains_json(server)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/cards/named"))
        .and(query_param("fuzzy", "Nicol Bolas, the Ravager"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nicol_bolas_json(server)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/large/.*\.jpg$"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG.to_vec()))
        .mount(server)
        .await;
}

async fn count_requests(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn four_plains_fill_one_page() {
    let server = MockServer::start().await;
    mount_scryfall(&server).await;
    let (cards, images) = resolvers(&server, Arc::new(MemoryStore::new()));

    let deck = parse_deck("4 Plains\n");
    let expansion = DeckExpander::new(&cards, &images, ExpandOptions::default().with_tokens())
        .expand(&deck)
        .await
        .unwrap();

    assert_eq!(expansion.sections.len(), 1);
    let front = expansion.cards(&SectionKind::FrontFaces);
    assert_eq!(front.len(), 4);
    assert!(front.iter().all(|c| c.name == "Plains" && c.has_image()));
    assert!(expansion.cards(&SectionKind::BackFaces).is_empty());
    assert!(expansion.cards(&SectionKind::Tokens).is_empty());

    let pages = SheetLayout::new("", ProxyStyle::Image).layout_all(&expansion.sections);
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].occupied, 4);
    assert_eq!(pages[0].images().count(), 4);

    // One card lookup, one image download; the rest are cache hits
    assert_eq!(count_requests(&server).await, 2);
}

#[tokio::test]
async fn transform_card_prints_front_and_back_on_separate_pages() {
    let server = MockServer::start().await;
    mount_scryfall(&server).await;
    let (cards, images) = resolvers(&server, Arc::new(MemoryStore::new()));

    let deck = parse_deck("1 Nicol Bolas, the Ravager\n");
    let expansion = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&deck)
        .await
        .unwrap();

    let front = expansion.cards(&SectionKind::FrontFaces);
    let back = expansion.cards(&SectionKind::BackFaces);
    assert_eq!(front.len(), 1);
    assert_eq!(back.len(), 1);
    assert_eq!(front[0].name, "Nicol Bolas, the Ravager");
    assert_eq!(front[0].role, FaceRole::FrontFace);
    assert_eq!(back[0].name, "Nicol Bolas, the Arisen");
    assert_eq!(back[0].role, FaceRole::BackFace);
    assert_eq!(back[0].loyalty.as_deref(), Some("7"));
    assert_eq!(front[0].version, back[0].version);

    let pages = SheetLayout::new("Grixis", ProxyStyle::Image).layout_all(&expansion.sections);
    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.occupied == 1));
    assert!(pages.iter().all(|p| p.labels().count() == 1));
}

#[tokio::test]
async fn front_and_back_counts_follow_the_deck() {
    let server = MockServer::start().await;
    mount_scryfall(&server).await;
    let (cards, images) = resolvers(&server, Arc::new(MemoryStore::new()));

    let deck = parse_deck(
        "// Test deck\n3 Plains\n2 Nicol Bolas, the Ravager\n1 No Such Card # typo\n",
    );
    assert_eq!(deck.len(), 6);

    let expansion = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&deck)
        .await
        .unwrap();

    let front = expansion.cards(&SectionKind::FrontFaces);
    let back = expansion.cards(&SectionKind::BackFaces);
    assert_eq!(front.len() + back.len(), 5 + 2);
    assert_eq!(front.len(), 5);
    assert_eq!(back.len(), 2);
    assert_eq!(expansion.dropped().count(), 1);
    assert_eq!(expansion.dropped().next().map(|i| i.card.as_str()), Some("No Such Card"));
}

#[tokio::test]
async fn text_proxies_need_no_images() {
    let server = MockServer::start().await;
    mount_scryfall(&server).await;
    let (cards, images) = resolvers(&server, Arc::new(MemoryStore::new()));

    let options = ExpandOptions {
        fetch_images: false,
        ..ExpandOptions::default()
    };
    let expansion = DeckExpander::new(&cards, &images, options)
        .expand(&parse_deck("1 Nicol Bolas, the Ravager"))
        .await
        .unwrap();

    let pages = SheetLayout::new("", ProxyStyle::Text).layout_all(&expansion.sections);
    assert_eq!(pages.len(), 2);
    let back_texts: Vec<&str> = pages[1]
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert!(back_texts.contains(&"Nicol Bolas, the Arisen"));
    assert!(back_texts.contains(&"+2: Draw two cards.\n\n-3: Nicol Bolas deals 10 damage."));
    assert!(back_texts.contains(&"7"));

    let image_requests = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path().starts_with("/large/"))
        .count();
    assert_eq!(image_requests, 0);
}

#[tokio::test]
async fn disk_cache_makes_second_run_offline() {
    let cache_dir = TempDir::new().unwrap();
    let deck = parse_deck("2 Plains\n1 Nicol Bolas, the Ravager\n");

    let server = MockServer::start().await;
    mount_scryfall(&server).await;

    let store = Arc::new(DirStore::open(cache_dir.path()).unwrap());
    let (cards, images) = resolvers(&server, store);
    let cold = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&deck)
        .await
        .unwrap();
    let cold_requests = count_requests(&server).await;
    // Plains + image, Bolas + two face images
    assert_eq!(cold_requests, 5);

    // Fresh store on the same directory, as in a second program run
    let store = Arc::new(DirStore::open(cache_dir.path()).unwrap());
    let (cards, images) = resolvers(&server, store);
    let warm = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&deck)
        .await
        .unwrap();

    assert_eq!(cold.sections, warm.sections);
    assert!(warm.is_complete());
    assert_eq!(count_requests(&server).await, cold_requests);
}

#[tokio::test]
async fn long_card_names_are_dropped_not_fatal_with_disk_cache() {
    let cache_dir = TempDir::new().unwrap();
    let server = MockServer::start().await;
    mount_scryfall(&server).await;

    let store = Arc::new(DirStore::open(cache_dir.path()).unwrap());
    let (cards, images) = resolvers(&server, store);
    let deck = parse_deck(
        "1 Our Market Research Shows That Players Like Really Long Card Names So We Made \
         This Card to Have the Absolute Longest Card Name Ever Elemental\n1 Plains\n",
    );

    let expansion = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&deck)
        .await
        .unwrap();

    let front = expansion.cards(&SectionKind::FrontFaces);
    assert_eq!(front.len(), 1);
    assert_eq!(front[0].name, "Plains");
    let dropped: Vec<_> = expansion.dropped().collect();
    assert_eq!(dropped.len(), 1);
    assert!(dropped[0].error.is_not_found());
}

#[tokio::test]
async fn shared_limiter_spaces_card_and_image_requests() {
    let server = MockServer::start().await;
    mount_scryfall(&server).await;

    let interval = Duration::from_millis(120);
    let limiter = Arc::new(RateLimiter::new(interval));
    let config = ClientConfig {
        min_interval: interval,
        ..ClientConfig::with_base_url(server.uri())
    };
    let card_client = ScryfallClient::with_limiter(config.clone(), limiter.clone()).unwrap();
    let image_client = ScryfallClient::with_limiter(config, limiter).unwrap();
    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
    let cards = CardResolver::new(card_client, store.clone());
    let images = ImageResolver::new(image_client, store);

    let start = Instant::now();
    let expansion = DeckExpander::new(&cards, &images, ExpandOptions::default())
        .expand(&parse_deck("1 Plains\n1 Nicol Bolas, the Ravager"))
        .await
        .unwrap();
    let elapsed = start.elapsed();

    assert!(expansion.is_complete());
    // Plains card + image, Bolas card + two face images
    let requests = count_requests(&server).await;
    assert_eq!(requests, 5);
    assert!(
        elapsed >= interval * (requests as u32 - 1),
        "{} requests finished after {:?}",
        requests,
        elapsed
    );
}
