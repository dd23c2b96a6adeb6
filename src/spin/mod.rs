//! SPIN query descriptions
//!
//! SPIN encodes a SPARQL query as RDF: the query node carries its type
//! (`sp:Select`), an `sp:resultVariables` list, an `sp:where` list of
//! triple-pattern nodes and an optional `sp:orderBy` list. Variables are
//! nodes with an `sp:varName`.
//!
//! Only basic graph patterns and ORDER BY are understood. Anything else
//! (OPTIONAL, FILTER, UNION, sub-queries) is reported as
//! [`ParseError::UnsupportedConstruct`] rather than dropped.

mod exporter;
mod importer;
mod list;

use crate::query::ValidationError;
use crate::rdf::RdfError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use exporter::SpinExporter;
pub use importer::SpinImporter;
pub use list::collect_list;

/// Default cap on the number of members read from one RDF list
pub const DEFAULT_MAX_LIST_LEN: usize = 10_000;

/// SPIN import errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No query type found for {0}")]
    MissingQueryType(String),

    #[error("Only accepts Select queries, found {0}")]
    UnsupportedQueryType(String),

    #[error("Malformed RDF list: {0}")]
    MalformedList(String),

    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rdf(#[from] RdfError),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Importer limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Longest RDF list accepted
    pub max_list_len: usize,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            max_list_len: DEFAULT_MAX_LIST_LEN,
        }
    }
}
