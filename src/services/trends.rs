// src/services/trends.rs
use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::SourceErrorKind;

const HOST_LANGUAGE: &str = "en-US";
/// Minutes west of UTC, i.e. US Central.
const TZ_OFFSET: &str = "360";

#[derive(Debug, Deserialize)]
struct ExploreResponse {
    widgets: Vec<Widget>,
}

#[derive(Debug, Deserialize)]
struct Widget {
    id: String,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    request: Value,
}

#[derive(Debug, Deserialize)]
struct MultilineResponse {
    default: Timeline,
}

#[derive(Debug, Deserialize)]
struct Timeline {
    #[serde(rename = "timelineData", default)]
    timeline_data: Vec<TimelinePoint>,
}

#[derive(Debug, Deserialize)]
struct TimelinePoint {
    #[serde(default)]
    value: Vec<f64>,
}

/// Trends API bodies start with an anti-JSON-hijacking prefix such as `)]}'`.
fn strip_json_prefix(body: &str) -> Result<&str, SourceErrorKind> {
    body.find('{')
        .map(|start| &body[start..])
        .ok_or_else(|| SourceErrorKind::format("Trends response has no JSON object"))
}

fn explore_request(keywords: &[String], timeframe: &str) -> Value {
    let items: Vec<Value> = keywords
        .iter()
        .map(|k| json!({ "keyword": k, "geo": "", "time": timeframe }))
        .collect();
    json!({ "comparisonItem": items, "category": 0, "property": "" })
}

/// Mean over keywords of each keyword's mean over time.
pub fn mean_interest(points: &[Vec<f64>], keywords: usize) -> Option<f64> {
    if keywords == 0 {
        return None;
    }
    let mut column_means = Vec::with_capacity(keywords);
    for k in 0..keywords {
        let column: Vec<f64> = points.iter().filter_map(|p| p.get(k).copied()).collect();
        if column.is_empty() {
            return None;
        }
        column_means.push(column.iter().sum::<f64>() / column.len() as f64);
    }
    Some(column_means.iter().sum::<f64>() / column_means.len() as f64)
}

/// Average search interest for `keywords` over `timeframe`.
pub async fn fetch_search_interest(
    client: &Client,
    base_url: &str,
    keywords: &[String],
    timeframe: &str,
) -> Result<f64, SourceErrorKind> {
    let base = base_url.trim_end_matches('/');

    // The API only answers once the session carries Google's cookies.
    client.get(format!("{}/?geo=US", base)).send().await?;

    let explore_url = format!("{}/trends/api/explore", base);
    let explore_req = explore_request(keywords, timeframe).to_string();
    info!("Querying Trends explore for {:?} over {}", keywords, timeframe);
    let body = client
        .get(&explore_url)
        .query(&[
            ("hl", HOST_LANGUAGE),
            ("tz", TZ_OFFSET),
            ("req", explore_req.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let explore: ExploreResponse = serde_json::from_str(strip_json_prefix(&body)?)?;

    let widget = explore
        .widgets
        .into_iter()
        .find(|w| w.id == "TIMESERIES")
        .ok_or_else(|| SourceErrorKind::format("no TIMESERIES widget"))?;
    let token = widget
        .token
        .ok_or_else(|| SourceErrorKind::format("TIMESERIES widget has no token"))?;

    let multiline_url = format!("{}/trends/api/widgetdata/multiline", base);
    let widget_req = widget.request.to_string();
    let body = client
        .get(&multiline_url)
        .query(&[
            ("hl", HOST_LANGUAGE),
            ("tz", TZ_OFFSET),
            ("req", widget_req.as_str()),
            ("token", token.as_str()),
        ])
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let multiline: MultilineResponse = serde_json::from_str(strip_json_prefix(&body)?)?;

    let points: Vec<Vec<f64>> = multiline
        .default
        .timeline_data
        .into_iter()
        .map(|p| p.value)
        .collect();
    debug!("Trends returned {} points", points.len());

    let interest = mean_interest(&points, keywords.len())
        .ok_or_else(|| SourceErrorKind::format("Trends timeline is empty"))?;
    info!("Average search interest: {:.2}", interest);
    Ok(interest)
}
