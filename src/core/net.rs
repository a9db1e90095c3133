// src/core/net.rs

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::params::{HTTP_TIMEOUT_SECS, USER_AGENT};

/// The transport seam. The chart pipeline only ever needs "give me the
/// document behind this URL"; tests swap in canned pages.
pub trait Fetch {
    fn get(&self, url: &Url) -> Result<String>;
}

/// Blocking HTTP client with the crate's UA and a flat timeout.
pub struct Http {
    client: reqwest::blocking::Client,
}

impl Http {
    pub fn new() -> std::result::Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Http { client })
    }
}

impl Fetch for Http {
    fn get(&self, url: &Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::transport(url, e))?;
        response.text().map_err(|e| Error::transport(url, e))
    }
}
