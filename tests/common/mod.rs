// tests/common/mod.rs
#![allow(dead_code)]

use froth_dashboard::Config;
use std::collections::HashMap;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn ratio_page(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(date, value)| format!("<tr><td>{}</td><td>&#x2002;{}</td></tr>", date, value))
        .collect();
    format!(
        "<html><body><table id=\"datatable\"><tr><th>Date</th><th>Value</th></tr>{}</table></body></html>",
        body
    )
}

pub const TOBIN_PAGE: &str = r#"<html><body>
<table><caption>Tobin's Q</caption>
<tr><th>Period</th><th>Value</th></tr>
<tr><td>2025:Q3</td><td>1.9</td></tr>
<tr><td>2025:Q2</td><td>1.8</td></tr>
</table></body></html>"#;

pub const HOUSEHOLD_CSV: &str = "\
Z.1 Financial Accounts of the United States
B.101.e Balance Sheet of Households and Nonprofit Organizations
Percent
Source: Federal Reserve Board
Directly and indirectly held corporate equities as a share of financial assets
Year,Q1,Q2,Q3,Q4
2025,0.31,0.32,0.33,
";

pub const EXPLORE_BODY: &str = r#")]}'
{"widgets":[{"id":"TIMESERIES","token":"tok123","request":{"time":"today 3-m","resolution":"DAY"}},{"id":"RELATED_QUERIES","token":"other","request":{}}]}"#;

pub const MULTILINE_BODY: &str = r#")]}',
{"default":{"timelineData":[{"time":"1","value":[40,50,60]},{"time":"2","value":[40,50,60]}]}}"#;

pub async fn mount_ratio(server: &MockServer, slug: &str, rows: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path(format!("/{}/table/by-month", slug)))
        .respond_with(ResponseTemplate::new(200).set_body_string(ratio_page(rows)))
        .mount(server)
        .await;
}

pub async fn mount_trends(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trends/api/explore"))
        .respond_with(ResponseTemplate::new(200).set_body_string(EXPLORE_BODY))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/trends/api/widgetdata/multiline"))
        .and(query_param("token", "tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MULTILINE_BODY))
        .mount(server)
        .await;
}

/// Live ratio tables, Trends and a failing insider screener.
pub async fn mount_daily_sources(server: &MockServer) {
    mount_ratio(server, "s-p-500-pe-ratio", &[("Oct 1, 2025", "29.0"), ("Sep 1, 2025", "28.4")]).await;
    mount_ratio(server, "s-p-500-price-to-sales", &[("Oct 1, 2025", "3.2"), ("Sep 1, 2025", "3.1")]).await;
    mount_trends(server).await;
    Mock::given(method("GET"))
        .and(path("/screener"))
        .respond_with(ResponseTemplate::new(500))
        .mount(server)
        .await;
}

pub const CAPE_ROWS: &[(&str, &str)] = &[
    ("Oct 1, 2025", "† 39.5"),
    ("Sep 1, 2025", "39.0"),
    ("Aug 1, 2025", "38.5"),
    ("Jul 1, 2025", "38.0"),
];

/// Configuration pointing every source at `server`, files inside `dir`.
pub fn config_for(server_uri: &str, dir: &Path, extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    let mut set = |k: &str, v: String| {
        vars.insert(k.to_string(), v);
    };
    set("HISTORY_CACHE_PATH", dir.join("fed_history.csv").display().to_string());
    set("PUBLISHED_SERIES_PATH", dir.join("docs").join("data.csv").display().to_string());
    set("HTTP_TIMEOUT_SECS", "5".to_string());
    set("MULTPL_BASE_URL", server_uri.to_string());
    set("FED_TOBIN_Q_URL", format!("{}/z1/", server_uri));
    set("FED_HOUSEHOLD_CSV_URL", format!("{}/z1/csv/b101e.csv", server_uri));
    set("TRENDS_BASE_URL", server_uri.to_string());
    set("INSIDER_SCREENER_URL", format!("{}/screener", server_uri));
    set("WEBHOOK_URL", format!("{}/hook", server_uri));
    for (k, v) in extra {
        set(k, v.to_string());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).expect("test configuration")
}
