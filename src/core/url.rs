// src/core/url.rs
//
// Hyperlink resolution against the chart's base origin. The chart mostly
// links to itself with relative and root-relative hrefs, occasionally with
// a full URL; cross-origin links pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

static ABSOLUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^https?:").unwrap());

pub fn resolve(base: &Url, href: &str) -> Result<Url> {
    if href.is_empty() {
        return Ok(base.clone());
    }

    let malformed = |source| Error::MalformedUrl { href: href.to_string(), source };

    if ABSOLUTE.is_match(href) || href.starts_with("//") {
        let mut u = if let Some(rest) = href.strip_prefix("//") {
            // Scheme-relative: borrow the base's scheme.
            Url::parse(&format!("{}://{}", base.scheme(), rest)).map_err(malformed)?
        } else {
            Url::parse(href).map_err(malformed)?
        };
        // Same host keeps the base scheme; a foreign host is kept verbatim.
        if u.host_str() == base.host_str() && u.scheme() != base.scheme() {
            let _ = u.set_scheme(base.scheme());
        }
        return Ok(u);
    }

    if href.starts_with('/') {
        let mut u = base.clone();
        let (path, query) = match href.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (href, None),
        };
        u.set_path(path);
        u.set_query(query);
        return Ok(u);
    }

    // Relative path: joined onto the base's directory, href's query wins.
    base.join(href).map_err(malformed)
}
