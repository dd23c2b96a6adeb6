//! SPARQL text and endpoint support
//!
//! - [`SparqlParser`] reads SELECT text into a [`Query`](crate::query::Query)
//! - [`SelectResults`] decodes SPARQL JSON results
//! - [`EndpointClient`] runs queries against remote endpoints
//!
//! # Example
//!
//! ```rust
//! use querycanvas::sparql::SparqlParser;
//!
//! let parsed = SparqlParser::parse_select(
//!     "SELECT ?s WHERE { ?s a <http://xmlns.com/foaf/0.1/Person> } LIMIT 5",
//!     "urn:example:people",
//! ).unwrap();
//! assert_eq!(parsed.query.projected_names(), vec!["s"]);
//! assert_eq!(parsed.options.limit, Some(5));
//! ```

mod client;
mod parser;
mod results;

pub use client::{ClientError, ClientResult, EndpointClient, HttpEndpointClient};
pub use parser::{ParsedSelect, SparqlParseError, SparqlParseResult, SparqlParser};
pub use results::{BoundTerm, QuerySolution, SelectResults, SPARQL_RESULTS_JSON};
