//! Query Canvas
//!
//! Composition of SPARQL SELECT queries as editable objects: import them from
//! SPIN descriptions, edit variables, patterns and projections, bind values,
//! join two queries on a shared variable and render canonical SPARQL text.
//!
//! # Layout
//!
//! - [`rdf`]: triples, Turtle/RDF-XML reading, prefix table
//! - [`query`]: the query object model, serializer and templates
//! - [`spin`]: SPIN import and export
//! - [`join`]: join algebra (substitution or SERVICE federation)
//! - [`catalog`]: query, endpoint and concept catalogs
//! - [`canvas`]: the instance registry
//! - [`sparql`]: SPARQL text reading, results and the endpoint client
//! - [`config`]: YAML configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use querycanvas::{JoinMode, QueryCanvas, RdfFormat, RdfParser, RdfStore, SerializeOptions};
//!
//! let ttl = r#"
//!     @prefix sp: <http://spinrdf.org/sp#> .
//!     @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
//!     @prefix ex: <http://example.org/> .
//!
//!     ex:people a sp:Select ;
//!         rdfs:label "People" ;
//!         sp:resultVariables ( _:p ) ;
//!         sp:where ( [ sp:subject _:p ; sp:predicate ex:name ; sp:object _:n ] ) .
//!     _:p sp:varName "id" .
//!     _:n sp:varName "name" .
//!
//!     ex:pets a sp:Select ;
//!         rdfs:label "Pets" ;
//!         sp:resultVariables ( _:o _:m ) ;
//!         sp:where ( [ sp:subject _:o ; sp:predicate ex:pet ; sp:object _:m ] ) .
//!     _:o sp:varName "owner" .
//!     _:m sp:varName "name" .
//! "#;
//! let graph = RdfStore::from_triples(RdfParser::parse(ttl, RdfFormat::Turtle, None).unwrap());
//!
//! let mut canvas = QueryCanvas::new();
//! let importer = querycanvas::SpinImporter::default();
//! canvas.queries_mut().load_graph(&graph, "http://example.org/sparql", &importer);
//!
//! let a = canvas.instantiate("http://example.org/people", None).unwrap();
//! let b = canvas.instantiate("http://example.org/pets", None).unwrap();
//! let joined = canvas.join((a.as_str(), "id"), (b.as_str(), "owner"), JoinMode::Substitution).unwrap();
//!
//! let text = canvas.serialize(&joined, &SerializeOptions::new()).unwrap();
//! assert!(text.contains("?name1"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod canvas;
pub mod catalog;
pub mod config;
pub mod join;
pub mod query;
pub mod rdf;
pub mod spin;
pub mod sparql;

// Re-export main types for convenience
pub use canvas::{CanvasError, CanvasEvent, CanvasResult, InstanceId, NodeArg, QueryCanvas};

pub use catalog::{
    CatalogError, CatalogResult, Concept, ConceptList, EndpointCatalog, EndpointInfo,
    LoadReport, QueryCatalog,
};

pub use config::{CanvasConfig, ConfigError, ConfigResult};

pub use join::{join, JoinMode, JoinOperand};

pub use query::{
    BasicGraphPattern, Constant, Query, QueryTemplate, Resource, SerializeOptions,
    SparqlSerializer, Term, ValidationError, ValidationResult, VarId, Variable, WhereClause,
};

pub use rdf::{NamespaceManager, RdfFormat, RdfParser, RdfStore, Triple};

pub use spin::{ImportOptions, ParseError as SpinParseError, SpinExporter, SpinImporter};

pub use sparql::{
    ClientError, EndpointClient, HttpEndpointClient, SelectResults, SparqlParseError,
    SparqlParser,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
