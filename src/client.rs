//! Thin HTTP clients for the REST and GraphQL data sources.

use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::prelude::*;

/// Minimal HTTP surface the pipeline needs. Implementations return the raw
/// body of a successful response and fail on anything else.
pub trait Transport {
    fn get(&self, url: &str) -> Result<String, Error>;

    fn post_json(&self, url: &str, body: &Value) -> Result<String, Error>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("marlin-monitor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn read(response: reqwest::blocking::Response) -> Result<String, Error> {
        let status = response.status();

        if !status.is_success() {
            return Err(Error::transport(format!(
                "{} responded with status {status}",
                response.url()
            )));
        }

        Ok(response.text()?)
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, Error> {
        debug!(url, "GET");
        let response = self.client.get(url).send()?;
        Self::read(response)
    }

    fn post_json(&self, url: &str, body: &Value) -> Result<String, Error> {
        debug!(url, "POST");
        let response = self.client.post(url).json(body).send()?;
        Self::read(response)
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, Error> {
    serde_json::from_str(body)
        .map_err(|e| Error::transport(format!("malformed json from {url}: {e}")))
}

pub fn fetch_json<T: DeserializeOwned>(transport: &impl Transport, url: &str) -> Result<T, Error> {
    let body = transport.get(url).inspect_err(|e| warn!(url, "{e}"))?;
    decode(url, &body)
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,

    #[serde(default)]
    errors: Vec<GraphQLError>,
}

pub fn fetch_graphql<T: DeserializeOwned>(
    transport: &impl Transport,
    query: &str,
    variables: Value,
    url: &str,
) -> Result<T, Error> {
    let body = json!({ "query": query, "variables": variables });

    let response = transport
        .post_json(url, &body)
        .inspect_err(|e| warn!(url, "{e}"))?;

    let response: GraphQLResponse<T> = decode(url, &response)?;

    if let Some(error) = response.errors.first() {
        return Err(Error::transport(format!(
            "graphql query failed: {}",
            error.message
        )));
    }

    response
        .data
        .ok_or_else(|| Error::transport("graphql response carries no data"))
}
