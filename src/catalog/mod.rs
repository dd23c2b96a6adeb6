//! Catalogs the canvas draws its queries from
//!
//! - [`QueryCatalog`]: SPIN query templates, loaded per endpoint
//! - [`EndpointCatalog`]: known endpoints with label and comment
//! - [`ConceptList`]: classes usable as one-pattern `?id a <Class>` queries

mod concepts;
mod endpoints;
mod queries;

use crate::spin::ParseError;
use thiserror::Error;

pub use concepts::{Concept, ConceptList};
pub use endpoints::{EndpointCatalog, EndpointInfo};
pub use queries::{LoadReport, QueryCatalog};

/// Catalog errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Already in catalog: {0}")]
    Duplicate(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Service description for {0} has no rdfs:label")]
    MissingLabel(String),

    #[error("Cannot import {uri}: {source}")]
    Import {
        uri: String,
        #[source]
        source: ParseError,
    },
}

pub type CatalogResult<T> = Result<T, CatalogError>;
