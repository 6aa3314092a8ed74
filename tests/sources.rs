// tests/sources.rs
//! Individual live sources against mocked endpoints.

mod common;

use common::*;
use froth_dashboard::config::InsiderConfig;
use froth_dashboard::services::insider::{insider_selling_or_fallback, InsiderSelling};
use froth_dashboard::services::{multpl, trends};
use reqwest::Client;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn insider_config(url: String) -> InsiderConfig {
    InsiderConfig {
        screener_url: url,
        value_column: "Value".to_string(),
        api_key: None,
        fallback_millions: 150.0,
    }
}

#[tokio::test]
async fn latest_ratio_comes_from_first_row() {
    let server = MockServer::start().await;
    mount_ratio(&server, multpl::PE_SLUG, &[("Oct 1, 2025", "29.85"), ("Sep 1, 2025", "28.0")]).await;

    let value = multpl::fetch_latest_ratio(&Client::new(), &server.uri(), multpl::PE_SLUG)
        .await
        .unwrap();
    assert_eq!(value, 29.85);
}

#[tokio::test]
async fn ratio_http_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = multpl::fetch_latest_ratio(&Client::new(), &server.uri(), multpl::CAPE_SLUG).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn search_interest_averages_the_timeline() {
    let server = MockServer::start().await;
    mount_trends(&server).await;

    let keywords = vec!["AI stock".to_string(), "NVDA stock".to_string(), "ChatGPT stock".to_string()];
    let client = Client::builder().cookie_store(true).build().unwrap();
    let value = trends::fetch_search_interest(&client, &server.uri(), &keywords, "today 3-m")
        .await
        .unwrap();
    assert_eq!(value, 50.0);
}

#[tokio::test]
async fn insider_screener_values_are_summed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screener"))
        .and(query_param("apikey", "static-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Ticker,Value\nNVDA,\"-$20,000,000\"\nAVGO,\"-$5,000,000\"\n"),
        )
        .mount(&server)
        .await;

    let mut config = insider_config(format!("{}/screener", server.uri()));
    config.api_key = Some("static-key".to_string());
    let selling = insider_selling_or_fallback(&Client::new(), &config).await;
    assert_eq!(selling, InsiderSelling::Screener(25.0));
    assert!(!selling.is_fallback());
}

#[tokio::test]
async fn insider_transport_failure_falls_back_to_150() {
    // nothing listens on port 1
    let url = "http://127.0.0.1:1/screener".to_string();

    let selling = insider_selling_or_fallback(&Client::new(), &insider_config(url)).await;
    assert_eq!(selling, InsiderSelling::Fallback(150.0));
    assert_eq!(selling.millions(), 150.0);
}

#[tokio::test]
async fn insider_schema_mismatch_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/screener"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Ticker,Qty\nNVDA,10\n"))
        .mount(&server)
        .await;

    let selling = insider_selling_or_fallback(&Client::new(), &insider_config(format!("{}/screener", server.uri()))).await;
    assert!(selling.is_fallback());
}
