// src/chart/mod.rs
//
// Massive Dev Chart acquisition: page URLs, record types, and the
// fetch -> extract -> normalize pipeline. Caching sits above this in
// `store`; this module always goes to the network.

pub mod extract;
pub mod normalize;

use std::time::Duration;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::html::Tokenizer;
use crate::core::net::Fetch;
use crate::error::Result;
use crate::params::{BASE_URL, CHART_PATH};

static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).expect("base url constant"));

/// One row of the dilution/time table, normalized.
///
/// Zero durations mean "no published time for that format"; an empty notes
/// vector means the row has no footnote page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub developer: String,
    /// Always "part+part" ("1+0" for stock) once it gets here.
    pub dilution: String,
    /// Kept as published; the chart has non-numeric ISO fields in the wild.
    pub iso: String,
    pub time_135: Duration,
    pub time_120: Duration,
    pub time_sheet: Duration,
    pub temperature: f64,
    pub notes: Vec<String>,
}

/// The search form's two dropdowns, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub developers: Vec<String>,
    pub stocks: Vec<String>,
}

/// The chart page without a query: serves the search form.
pub fn form_url() -> Url {
    let mut u = BASE.clone();
    u.set_path(CHART_PATH);
    u
}

/// The chart page queried for one developer, all films, Celsius, decimal
/// minutes.
pub fn query_url(developer: &str) -> Url {
    let mut u = form_url();
    u.query_pairs_mut()
        .append_pair("Film", "")
        .append_pair("Developer", developer)
        .append_pair("mdc", "Search")
        .append_pair("TempUnits", "C")
        .append_pair("TimeUnits", "D");
    u
}

/// Fetch and extract the developer/stock enumeration.
pub fn fetch_options(fetch: &dyn Fetch) -> Result<Options> {
    let url = form_url();
    log::info!("fetching options from {url}");
    let body = fetch.get(&url)?;
    Ok(extract::option_lists(Tokenizer::new(&body)))
}

/// Fetch, extract and normalize the full table for one developer. Footnote
/// pages are fetched per row through the same transport.
pub fn fetch_entries(fetch: &dyn Fetch, developer: &str) -> Result<Vec<Entry>> {
    let url = query_url(developer);
    log::info!("fetching entries for {developer:?} from {url}");
    let body = fetch.get(&url)?;
    let rows = extract::table_rows(Tokenizer::new(&body), &url);
    log::debug!("extracted {} raw rows for {developer:?}", rows.len());
    normalize::entries(developer, rows, fetch)
}
