//! Integration tests for the scrape pipeline over real HTTP.
//!
//! A wiremock server stands in for each search engine, so the full
//! fetch → extract → fallback → filter path runs without touching the
//! internet. Live engine tests are marked `#[ignore]` for manual/periodic
//! validation.

use std::sync::Arc;
use std::time::Duration;

use serpkeep_scrape::{
    FetchError, Fetcher, HeaderRotation, HttpFetcher, Orchestrator, ScrapeConfig,
};
use wiremock::matchers::{header, header_exists, header_regex, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn google_page(titles: &[&str]) -> String {
    let blocks: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                r#"<div class="g"><a href="/url?q=https://result{i}.example/page&amp;sa=U"><h3>{title}</h3></a><cite>result{i}.example › page</cite><div class="VwiC3b">About result {i}.</div></div>"#
            )
        })
        .collect();
    format!("<!DOCTYPE html><html><body><div id=\"search\">{blocks}</div></body></html>")
}

fn bing_page(count: usize) -> String {
    let items: String = (0..count)
        .map(|i| {
            format!(
                r#"<li class="b_algo"><h2><a href="https://bing{i}.example/">Bing result number {i}</a></h2><div class="b_caption"><p>Caption {i}</p></div></li>"#
            )
        })
        .collect();
    format!("<!DOCTYPE html><html><body><ol id=\"b_results\">{items}</ol></body></html>")
}

fn config_for(google: &MockServer, bing: &MockServer) -> ScrapeConfig {
    ScrapeConfig {
        google_base_url: google.uri(),
        bing_base_url: bing.uri(),
        ..ScrapeConfig::default().without_delays()
    }
}

fn orchestrator(config: ScrapeConfig) -> Orchestrator {
    let fetcher = Arc::new(HttpFetcher::new().expect("fetcher"));
    Orchestrator::new(config, fetcher).expect("orchestrator")
}

#[tokio::test]
async fn google_results_are_used_when_present() {
    let google = MockServer::start().await;
    let bing = MockServer::start().await;

    let mut titles: Vec<String> = (0..10).map(|i| format!("Useful page {i}")).collect();
    titles.push("Ads".into());
    titles.push("Maps".into());
    let titles: Vec<&str> = titles.iter().map(String::as_str).collect();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust programming"))
        .and(query_param("num", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_string(google_page(&titles)))
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bing_page(4)))
        .expect(0)
        .mount(&bing)
        .await;

    let results = orchestrator(config_for(&google, &bing))
        .search("rust programming", 15)
        .await;

    assert_eq!(results.len(), 10);
    assert_eq!(results[0].title, "Useful page 0");
    assert_eq!(results[0].url, "https://result0.example/page");
    assert_eq!(results[0].display_url, "result0.example › page");
    assert_eq!(results[0].snippet, "About result 0.");
    assert!(results.iter().all(|r| r.engine == "Google"));
}

#[tokio::test]
async fn bing_is_used_when_google_is_empty() {
    let google = MockServer::start().await;
    let bing = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Before you continue</body></html>"),
        )
        .expect(1)
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust programming"))
        .and(query_param("count", "15"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bing_page(4)))
        .expect(1)
        .mount(&bing)
        .await;

    let results = orchestrator(config_for(&google, &bing))
        .search("rust programming", 15)
        .await;

    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r.engine == "Bing"));
    assert_eq!(results[0].snippet, "Caption 0");
}

#[tokio::test]
async fn blocked_google_falls_back_to_bing() {
    let google = MockServer::start().await;
    let bing = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bing_page(2)))
        .mount(&bing)
        .await;

    let results = orchestrator(config_for(&google, &bing)).search("rust", 15).await;
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn both_engines_failing_yields_empty() {
    let google = MockServer::start().await;
    let bing = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&google)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .mount(&bing)
        .await;

    let results = orchestrator(config_for(&google, &bing)).search("rust", 15).await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn fetcher_maps_status_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().expect("fetcher");
    let headers = HeaderRotation::new(&ScrapeConfig::default().user_agents)
        .expect("headers")
        .next_headers();
    let err = fetcher
        .fetch(&format!("{}/search", server.uri()), &headers, Duration::from_secs(5))
        .await
        .expect_err("503 should fail");
    assert_eq!(err, FetchError::HttpStatus(503));
}

#[tokio::test]
async fn fetcher_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html></html>")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().expect("fetcher");
    let err = fetcher
        .fetch(&server.uri(), &Default::default(), Duration::from_millis(200))
        .await
        .expect_err("should time out");
    assert_eq!(err, FetchError::Timeout);
}

#[tokio::test]
async fn fetcher_sends_browser_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header_exists("user-agent"))
        .and(header("dnt", "1"))
        .and(header_regex("accept-language", r"^en-US,en;q=0\.5$"))
        .and(header("upgrade-insecure-requests", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().expect("fetcher");
    let headers = HeaderRotation::new(&ScrapeConfig::default().user_agents)
        .expect("headers")
        .next_headers();
    let body = fetcher
        .fetch(&server.uri(), &headers, Duration::from_secs(5))
        .await
        .expect("fetch");
    assert_eq!(body, b"ok");
}

#[tokio::test]
#[ignore] // Requires network access
async fn live_search_returns_results() {
    let config = ScrapeConfig::default();
    let results = serpkeep_scrape::search("rust programming language", 10, &config)
        .await
        .expect("search should not error");
    for result in &results {
        assert!(result.url.starts_with("http"));
        assert!(result.title.chars().count() > 5);
    }
}
