//! Endpoint client
//!
//! The only async part of the crate. Core operations never call it; the CLI
//! uses it to run rendered queries and to fetch SPIN and service-description
//! graphs.

use super::results::{SelectResults, SPARQL_RESULTS_JSON};
use crate::query::{Query, SerializeOptions, SparqlSerializer};
use crate::rdf::{self, NamespaceManager, RdfFormat, RdfParser, Triple};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const SPARQL_QUERY: &str = "application/sparql-query";
const RDF_ACCEPT: &str = "text/turtle, application/rdf+xml;q=0.9";

/// Endpoint client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid results document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid RDF document: {0}")]
    Rdf(#[from] rdf::ParseError),

    #[error("Unsupported content type: {0}")]
    ContentType(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Talks to SPARQL endpoints
#[async_trait]
pub trait EndpointClient: Send + Sync {
    /// Run SELECT text against an endpoint
    async fn select(&self, endpoint: &str, sparql: &str) -> ClientResult<SelectResults>;

    /// Download an RDF document
    async fn fetch_graph(&self, url: &str) -> ClientResult<Vec<Triple>>;

    /// Serialize a query and run it
    async fn select_query(
        &self,
        endpoint: &str,
        query: &Query,
        namespaces: &NamespaceManager,
        options: &SerializeOptions,
    ) -> ClientResult<SelectResults> {
        let text = SparqlSerializer::new(namespaces).serialize(query, options);
        self.select(endpoint, &text).await
    }
}

/// reqwest-backed client
pub struct HttpEndpointClient {
    client: Client,
}

impl HttpEndpointClient {
    /// Create a new client with a per-request timeout
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn checked(response: reqwest::Response) -> ClientResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl EndpointClient for HttpEndpointClient {
    async fn select(&self, endpoint: &str, sparql: &str) -> ClientResult<SelectResults> {
        debug!("POST {} ({} bytes)", endpoint, sparql.len());
        let response = self
            .client
            .post(endpoint)
            .header(CONTENT_TYPE, SPARQL_QUERY)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .body(sparql.to_string())
            .send()
            .await?;
        let text = Self::checked(response).await?.text().await?;
        Ok(SelectResults::from_json(&text)?)
    }

    async fn fetch_graph(&self, url: &str) -> ClientResult<Vec<Triple>> {
        debug!("GET {}", url);
        let response = self.client.get(url).header(ACCEPT, RDF_ACCEPT).send().await?;
        let response = Self::checked(response).await?;
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/turtle")
            .to_string();
        let format = RdfFormat::from_media_type(&media_type)
            .ok_or_else(|| ClientError::ContentType(media_type.clone()))?;
        let text = response.text().await?;
        Ok(RdfParser::parse(&text, format, Some(url))?)
    }
}
