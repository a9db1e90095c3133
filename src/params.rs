// src/params.rs

/// Origin every relative link on the chart resolves against.
pub const BASE_URL: &str = "https://www.digitaltruth.com";
/// The chart page: serves both the search form and the result table.
pub const CHART_PATH: &str = "/devchart.php";

pub const USER_AGENT: &str = concat!("devchart/", env!("CARGO_PKG_VERSION"));
pub const HTTP_TIMEOUT_SECS: u64 = 15;

/// Subdirectory of the cache root holding Massive Dev Chart blobs.
pub const CHART_CACHE_SUBDIR: &str = "mdc";
/// Fixed filename for the cached dropdown enumeration.
pub const OPTIONS_CACHE_FILE: &str = "options";
/// Prefix for per-developer cache files.
pub const ENTRY_CACHE_PREFIX: &str = "dev-";

pub const ALIAS_FILE: &str = "aliases";
