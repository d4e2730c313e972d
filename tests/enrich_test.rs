//! Integration tests for MetadataEnricher
//!
//! Cover the run-scoped cache guarantee (each distinct URL fetched at most
//! once per field kind), the 404 bookkeeping, and the ambiguity policy end
//! to end against a mock server.

use meguri::crawler::PageFetcher;
use meguri::enrich::{AmbiguityPolicy, EnrichmentContext, MetadataEnricher};
use meguri::registry::{Profile, Registry};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn profile(id: &str, avatar_url: &str, download_url: &str) -> Profile {
    Profile {
        id: id.to_string(),
        avatar_name: format!("Avatar {id}"),
        avatar_name_url: avatar_url.to_string(),
        download_location: download_url.to_string(),
        ..Default::default()
    }
}

fn shop_page(name: &str) -> String {
    format!(r#"<html><body><span class="shop-name-label">{name}</span></body></html>"#)
}

fn price_page(prices: &[&str]) -> String {
    let mut body = String::from("<ul>");
    for price in prices {
        body.push_str(&format!(
            r#"<li class="variation-item"><i class="icon-download"></i><div class="variation-price">¥ {price}</div></li>"#
        ));
    }
    body.push_str("</ul>");
    body
}

fn item_page(shop: &str, prices: &[&str]) -> String {
    format!(
        r#"<html><body><span class="shop-name-label">{shop}</span>{}</body></html>"#,
        price_page(prices)
    )
}

/// N profiles sharing one URL cost exactly one network call per run
#[tokio::test]
async fn test_shared_url_fetched_once() {
    let mock_server = MockServer::start().await;
    let item = "https://mochi.booth.pm/items/111";

    Mock::given(method("GET"))
        .and(path("/items/111"))
        .respond_with(ResponseTemplate::new(200).set_body_string(shop_page("Mochi Shop")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![
            profile("001", item, ""),
            profile("002", item, ""),
            profile("003", item, ""),
        ],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let enricher = MetadataEnricher::new(&fetcher);
    let mut ctx = EnrichmentContext::new();

    let stats = enricher.fill_shop_names(&mut registry, &mut ctx).await;

    assert_eq!(stats.updated, 3);
    for p in &registry.profiles {
        assert_eq!(p.avatar_shop_name, "Mochi Shop");
    }
}

/// A shop pass and a price pass sharing one context never hand each other
/// their values: the same URL is fetched once per field kind and each field
/// gets the value its own extractor produced
#[tokio::test]
async fn test_shop_and_price_passes_share_context_without_mixing() {
    let mock_server = MockServer::start().await;
    let item = "https://mochi.booth.pm/items/42";

    Mock::given(method("GET"))
        .and(path("/items/42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(item_page("Mochi Shop", &["1,200"])),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![profile("001", item, "")],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let enricher = MetadataEnricher::new(&fetcher);
    let mut ctx = EnrichmentContext::new();

    enricher.fill_shop_names(&mut registry, &mut ctx).await;
    enricher.fill_prices(&mut registry, &mut ctx).await;

    assert_eq!(registry.profiles[0].avatar_shop_name, "Mochi Shop");
    assert_eq!(registry.profiles[0].avatar_price, "1200");
}

/// A 404 leaves the field empty, is recorded once, and is never re-fetched
/// within the run
#[tokio::test]
async fn test_not_found_recorded_once_and_not_refetched() {
    let mock_server = MockServer::start().await;
    let item = "https://gone.booth.pm/items/404000";

    Mock::given(method("GET"))
        .and(path("/items/404000"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![profile("001", item, "")],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let enricher = MetadataEnricher::new(&fetcher);
    let mut ctx = EnrichmentContext::new();

    enricher.fill_prices(&mut registry, &mut ctx).await;
    // Field still empty, so a second pass in the same run re-examines it
    enricher.fill_prices(&mut registry, &mut ctx).await;

    assert!(registry.profiles[0].avatar_price.is_empty());
    let not_found: Vec<&str> = ctx.not_found().collect();
    assert_eq!(not_found.len(), 1);
    assert!(not_found[0].contains("404000"));
}

/// Exactly one download-variation price is adopted; zero is a valid price
#[tokio::test]
async fn test_single_price_adopted_including_zero() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page(&["1,200"])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page(&["0"])))
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![
            profile("001", "https://shopa.booth.pm/items/1", ""),
            profile("002", "https://shopb.booth.pm/items/2", ""),
        ],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let enricher = MetadataEnricher::new(&fetcher);
    let mut ctx = EnrichmentContext::new();

    let stats = enricher.fill_prices(&mut registry, &mut ctx).await;

    assert_eq!(stats.updated, 2);
    assert_eq!(registry.profiles[0].avatar_price, "1200");
    assert_eq!(registry.profiles[1].avatar_price, "0");
}

/// Multiple price candidates leave the field empty under the default policy
#[tokio::test]
async fn test_ambiguous_price_left_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page(&["500", "1,000"])))
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![profile("001", "https://shopa.booth.pm/items/3", "")],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let mut ctx = EnrichmentContext::new();

    let stats = MetadataEnricher::new(&fetcher)
        .fill_prices(&mut registry, &mut ctx)
        .await;

    assert_eq!(stats.updated, 0);
    assert!(registry.profiles[0].avatar_price.is_empty());
}

/// The ambiguity policy is overridable per run
#[tokio::test]
async fn test_adopt_first_policy() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/items/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page(&["500", "1,000"])))
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![profile("001", "https://shopa.booth.pm/items/3", "")],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let mut ctx = EnrichmentContext::new();

    MetadataEnricher::new(&fetcher)
        .with_policy(AmbiguityPolicy::AdoptFirst)
        .fill_prices(&mut registry, &mut ctx)
        .await;

    assert_eq!(registry.profiles[0].avatar_price, "500");
}

/// Off-marketplace and empty URLs are skipped without a network call
#[tokio::test]
async fn test_off_marketplace_urls_skipped() {
    let mock_server = MockServer::start().await;

    // Any request at all would violate the skip contract
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(shop_page("nope")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![
            profile("001", "https://gumroad.com/l/abc", ""),
            profile("002", "https://evil.com/booth.pm/items/1", ""),
            profile("003", "", ""),
        ],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let mut ctx = EnrichmentContext::new();

    let stats = MetadataEnricher::new(&fetcher)
        .fill_shop_names(&mut registry, &mut ctx)
        .await;

    assert_eq!(stats.updated, 0);
}

/// Already-filled fields are not touched and cost no request
#[tokio::test]
async fn test_filled_fields_skipped() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page(&["999"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut p = profile("001", "https://shopa.booth.pm/items/1", "");
    p.avatar_price = "1200".to_string();
    let mut registry = Registry {
        profiles: vec![p],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let mut ctx = EnrichmentContext::new();

    let stats = MetadataEnricher::new(&fetcher)
        .fill_prices(&mut registry, &mut ctx)
        .await;

    assert_eq!(stats.examined, 0);
    assert_eq!(registry.profiles[0].avatar_price, "1200");
}

/// Shop name falls back to the nickname link when the label is missing
#[tokio::test]
async fn test_shop_name_nickname_fallback() {
    let mock_server = MockServer::start().await;
    let html = r#"<div class="home-link-container__nickname"><a class="nav">NickName</a></div>"#;

    Mock::given(method("GET"))
        .and(path("/items/7"))
        .respond_with(ResponseTemplate::new(200).set_body_string(html))
        .mount(&mock_server)
        .await;

    let mut registry = Registry {
        profiles: vec![profile("001", "https://shopa.booth.pm/items/7", "")],
        ..Default::default()
    };

    let fetcher = PageFetcher::with_base_url(&mock_server.uri(), 100).unwrap();
    let mut ctx = EnrichmentContext::new();

    MetadataEnricher::new(&fetcher)
        .fill_shop_names(&mut registry, &mut ctx)
        .await;

    assert_eq!(registry.profiles[0].avatar_shop_name, "NickName");
}
