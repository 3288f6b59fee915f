use crate::fixtures::{config_for, dealabs_listing, dealabs_thread, AVENUE_PAGE};
use brickscout::browser::HttpDriver;
use brickscout::storage::{open_store, DealStore};
use brickscout::{Coordinator, ScoutError};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body.into())
}

/// Coordinator fetching every site over plain HTTP
fn http_coordinator(config: brickscout::Config) -> Coordinator {
    let driver = HttpDriver::new(&config.browser).expect("client builds");
    let store = open_store(&config.output).expect("store opens");
    Coordinator::with_driver(config, Arc::new(driver), store)
}

#[tokio::test]
async fn test_static_site_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/promotions"))
        .respond_with(html(AVENUE_PAGE))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("deals_avenue.json");
    let config = config_for("avenuedelabrique", &store_path);

    // Static sites never need a browser, so the production constructor works here
    let coordinator = Coordinator::new(config).unwrap();
    let records = coordinator
        .scrape(&format!("{}/promotions", server.uri()))
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].set_number.as_deref(), Some("76269"));
    assert_eq!(records[1].price, 429.99);

    let stored: Vec<brickscout::DealRecord> =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).unwrap();
    assert_eq!(stored, records);
}

#[tokio::test]
async fn test_detail_then_listing_keeps_detail_fields() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/bons-plans/deal-2700001"))
        .respond_with(html(dealabs_thread(
            "LEGO Star Wars Faucon Millenium 75192",
            "649,99€",
            1203,
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groupe/lego"))
        .respond_with(html(dealabs_listing(&[
            (2700001, "LEGO Faucon", "699€", 1500, 40),
            (2700002, "LEGO Icons 10497", "79,99€", 310, 12),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = config_for("dealabs", &dir.path().join("deals.json"));
    let coordinator = http_coordinator(config);

    let detail = coordinator
        .scrape(&format!("{}/bons-plans/deal-2700001", server.uri()))
        .await
        .unwrap();
    assert_eq!(detail.len(), 1);

    coordinator
        .scrape(&format!("{}/groupe/lego", server.uri()))
        .await
        .unwrap();

    let store = coordinator.store();
    let stored = store.lock().await.load_all().unwrap();
    assert_eq!(stored.len(), 2);

    let faucon = &stored[0];
    assert_eq!(faucon.link, detail[0].link);
    assert_eq!(faucon.title, "LEGO Star Wars Faucon Millenium 75192");
    assert_eq!(faucon.price, 649.99);
    assert_eq!(faucon.set_number.as_deref(), Some("75192"));
    assert!(faucon.posted_date.is_some());
    assert_eq!(faucon.temperature, 1500);
    assert_eq!(faucon.comments_count, 40);

    assert_eq!(stored[1].title, "LEGO Icons 10497");
}

#[tokio::test]
async fn test_same_listing_twice_leaves_store_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groupe/lego"))
        .respond_with(html(dealabs_listing(&[
            (1, "LEGO Technic 42096", "49,99€", 120, 3),
            (2, "LEGO City 60337", "89,99€", 45, 1),
        ])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("deals.json");
    let coordinator = http_coordinator(config_for("dealabs", &store_path));
    let target = format!("{}/groupe/lego", server.uri());

    coordinator.scrape(&target).await.unwrap();
    let first = std::fs::read_to_string(&store_path).unwrap();

    coordinator.scrape(&target).await.unwrap();
    let second = std::fs::read_to_string(&store_path).unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(html(dealabs_listing(&[(7, "LEGO Ideas 21325", "99€", 80, 0)])))
        .with_priority(2)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let coordinator = http_coordinator(config_for("dealabs", &dir.path().join("deals.json")));

    let records = coordinator
        .scrape(&format!("{}/groupe/lego", server.uri()))
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_persistent_failure_yields_empty_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store_path = dir.path().join("deals.json");
    let coordinator = http_coordinator(config_for("dealabs", &store_path));

    let records = coordinator
        .scrape(&format!("{}/groupe/lego", server.uri()))
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
    assert!(!store_path.exists());
}

#[tokio::test]
async fn test_unsupported_target_is_invalid_input() {
    let dir = tempfile::tempdir().unwrap();
    let coordinator = http_coordinator(config_for("dealabs", &dir.path().join("deals.json")));

    let err = coordinator.scrape("https://www.leboncoin.fr/lego").await.unwrap_err();
    assert!(matches!(err, ScoutError::InvalidInput(_)));

    let err = coordinator.scrape("   ").await.unwrap_err();
    assert!(matches!(err, ScoutError::InvalidInput(_)));
}

#[tokio::test]
async fn test_scrape_all_runs_every_target() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/groupe/lego"))
        .respond_with(html(dealabs_listing(&[(1, "LEGO Technic 42096", "49,99€", 120, 3)])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/groupe/lego-star-wars"))
        .respond_with(html(dealabs_listing(&[(2, "LEGO Star Wars 75313", "699€", 900, 50)])))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let coordinator = http_coordinator(config_for("dealabs", &dir.path().join("deals.json")));

    let targets = vec![
        format!("{}/groupe/lego", server.uri()),
        format!("{}/groupe/lego-star-wars", server.uri()),
    ];
    let results = coordinator.scrape_all(&targets).await;

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|(_, r)| r.as_ref().map_or(false, |b| b.len() == 1)));

    let store = coordinator.store();
    assert_eq!(store.lock().await.load_all().unwrap().len(), 2);
}

#[tokio::test]
async fn test_vinted_listing_then_item_page_is_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/catalog"))
        .respond_with(html(
            r#"<html><body>
            <div data-testid="serp-item">
                <a href="/items/4123-lego-chateau?referrer=catalog"></a>
                <span data-testid="title">Lot LEGO château 10305</span>
                <span data-testid="price">85,00 €</span>
                <span data-testid="favorites-count">14</span>
            </div>
            </body></html>"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/4123-lego-chateau"))
        .respond_with(html(
            r#"<html><body>
            <h1>Lot LEGO château 10305</h1>
            <div data-testid="price-text">80,00 €</div>
            <span data-testid="favorites-count">15</span>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let coordinator = http_coordinator(config_for("vinted", &dir.path().join("deals.json")));

    coordinator
        .scrape(&format!("{}/catalog?search_text=lego", server.uri()))
        .await
        .unwrap();
    coordinator
        .scrape(&format!("{}/items/4123-lego-chateau", server.uri()))
        .await
        .unwrap();

    let store = coordinator.store();
    let stored = store.lock().await.load_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].price, 80.0);
    assert_eq!(stored[0].temperature, 15);
    assert!(!stored[0].link.contains('?'));
}
