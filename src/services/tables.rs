// src/services/tables.rs
//! Generic extraction of HTML tables and numeric cells from scraped pages.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HtmlTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Index of the column whose header equals `name`, ignoring case.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static CSS selector")
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn has_nested_table(table: ElementRef) -> bool {
    table
        .descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .any(|el| el.value().name() == "table")
}

/// First innermost `<table>` whose text contains `needle`.
pub fn find_table(html: &str, needle: &str) -> Option<HtmlTable> {
    let document = Html::parse_document(html);
    let table_selector = selector("table");

    let table = document
        .select(&table_selector)
        .filter(|t| !has_nested_table(*t))
        .find(|t| cell_text(*t).contains(needle))?;

    let row_selector = selector("tr");
    let header_selector = selector("th");
    let data_selector = selector("td");

    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for row in table.select(&row_selector) {
        let header_cells: Vec<String> = row.select(&header_selector).map(cell_text).collect();
        let data_cells: Vec<String> = row.select(&data_selector).map(cell_text).collect();

        if headers.is_empty() && !header_cells.is_empty() && data_cells.is_empty() {
            headers = header_cells;
        } else if !data_cells.is_empty() {
            rows.push(data_cells);
        }
    }

    // Tables without <th> use their first row as the header.
    if headers.is_empty() && !rows.is_empty() {
        headers = rows.remove(0);
    }

    Some(HtmlTable { headers, rows })
}

/// First number in a scraped cell, ignoring currency signs, estimate
/// markers, thousands separators and trailing units.
pub fn parse_number(cell: &str) -> Option<f64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"[-+]?(?:\d[\d,]*(?:\.\d+)?|\.\d+)").expect("static number pattern")
    });
    let found = re.find(cell)?;
    found.as_str().replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATIO_PAGE: &str = r#"
        <html><body>
        <table class="layout"><tr><td>
          <table id="datatable">
            <tr><th>Date</th><th>Value</th></tr>
            <tr class="odd"><td>Oct 1, 2025</td><td>&#x2002;† 39.51</td></tr>
            <tr class="even"><td>Sep 1, 2025</td><td>&#x2002;39.02</td></tr>
          </table>
        </td></tr></table>
        </body></html>"#;

    #[test]
    fn finds_innermost_matching_table() {
        let table = find_table(RATIO_PAGE, "Date").unwrap();
        assert_eq!(table.headers, vec!["Date", "Value"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0][0], "Oct 1, 2025");
        assert_eq!(table.column("value"), Some(1));
    }

    #[test]
    fn missing_table_is_none() {
        assert!(find_table(RATIO_PAGE, "Tobin").is_none());
    }

    #[test]
    fn first_row_becomes_header_without_th() {
        let html = "<table><tr><td>Period</td><td>Value</td></tr><tr><td>2024:Q3</td><td>1.9</td></tr></table>";
        let table = find_table(html, "Period").unwrap();
        assert_eq!(table.headers, vec!["Period", "Value"]);
        assert_eq!(table.rows, vec![vec!["2024:Q3".to_string(), "1.9".to_string()]]);
    }

    #[test]
    fn parses_decorated_numbers() {
        assert_eq!(parse_number("† 39.51"), Some(39.51));
        assert_eq!(parse_number("2.84%"), Some(2.84));
        assert_eq!(parse_number("$-1,234,567"), Some(-1_234_567.0));
        assert_eq!(parse_number("+12"), Some(12.0));
        assert_eq!(parse_number("ND"), None);
        assert_eq!(parse_number(""), None);
    }
}
