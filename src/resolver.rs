//! Discovery of the subgraph gateway endpoint.
//!
//! The gateway API key used by the public operators dashboard rotates without
//! notice. We scrape it from the dashboard's script bundle and fall back to a
//! known key when anything along the way goes wrong.

use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use crate::client::Transport;

pub const OPERATORS_PAGE_URL: &str = "https://arb1.marlin.org/relay/operators";

pub const GATEWAY_BASE_URL: &str = "https://gateway-arbitrum.network.thegraph.com/api";

pub const SUBGRAPH_ID: &str = "GUh83DEwZWMTkKaydusdkb46mLuAC7FTL4km1bcNjugc";

pub const FALLBACK_API_KEY: &str = "eecb07a46bba6483dbdbd042493c43dc";

lazy_static! {
    static ref BUNDLE_PATTERN: Regex =
        Regex::new(r#"src="([^"]*/main\.[0-9a-zA-Z]+\.js)""#).expect("valid bundle pattern");

    static ref API_KEY_PATTERN: Regex =
        Regex::new(r"gateway-arbitrum\.network\.thegraph\.com/api/([0-9a-f]{32})")
            .expect("valid api key pattern");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn for_key(api_key: &str) -> Self {
        Self(format!("{GATEWAY_BASE_URL}/{api_key}/subgraphs/id/{SUBGRAPH_ID}"))
    }

    pub fn fallback() -> Self {
        Self::for_key(FALLBACK_API_KEY)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reasons the scraped key could not be obtained. Never escapes this module.
#[derive(Debug, Error)]
pub enum ResolutionDegradation {
    #[error("fetching {0} failed: {1}")]
    Fetch(String, crate::prelude::Error),

    #[error("no script bundle referenced by {0}")]
    BundleNotFound(String),

    #[error("invalid bundle url {0}: {1}")]
    BadBundleUrl(String, String),

    #[error("no api key found in {0}")]
    KeyNotFound(String),
}

fn capture(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|x| x.get(1))
        .map(|x| x.as_str().to_string())
}

fn fetch(transport: &impl Transport, url: &str) -> Result<String, ResolutionDegradation> {
    transport
        .get(url)
        .map_err(|e| ResolutionDegradation::Fetch(url.to_string(), e))
}

pub fn find_bundle_url(page_url: &str, page: &str) -> Result<String, ResolutionDegradation> {
    let path = capture(&BUNDLE_PATTERN, page)
        .ok_or_else(|| ResolutionDegradation::BundleNotFound(page_url.to_string()))?;

    let bad_url = |e: &dyn fmt::Display| {
        ResolutionDegradation::BadBundleUrl(path.clone(), e.to_string())
    };

    let base = Url::parse(page_url).map_err(|e| bad_url(&e))?;
    let url = base.join(&path).map_err(|e| bad_url(&e))?;

    Ok(url.to_string())
}

pub fn find_api_key(bundle_url: &str, bundle: &str) -> Result<String, ResolutionDegradation> {
    capture(&API_KEY_PATTERN, bundle)
        .ok_or_else(|| ResolutionDegradation::KeyNotFound(bundle_url.to_string()))
}

pub fn try_resolve(
    transport: &impl Transport,
    page_url: &str,
) -> Result<Endpoint, ResolutionDegradation> {
    let page = fetch(transport, page_url)?;
    let bundle_url = find_bundle_url(page_url, &page)?;
    debug!(%bundle_url, "found script bundle");

    let bundle = fetch(transport, &bundle_url)?;
    let key = find_api_key(&bundle_url, &bundle)?;

    Ok(Endpoint::for_key(&key))
}

/// Resolves the GraphQL endpoint, never failing: any scraping problem yields
/// the endpoint for [`FALLBACK_API_KEY`].
pub fn resolve_graphql_endpoint(transport: &impl Transport) -> Endpoint {
    match try_resolve(transport, OPERATORS_PAGE_URL) {
        Ok(endpoint) => {
            debug!(%endpoint, "resolved graphql endpoint");
            endpoint
        }
        Err(degradation) => {
            warn!(%degradation, "using fallback graphql endpoint");
            Endpoint::fallback()
        }
    }
}
