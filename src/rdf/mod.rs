//! RDF (Resource Description Framework) support
//!
//! This module holds the RDF side of the query canvas:
//! - RDF terms and triples (oxrdf wrappers)
//! - An indexed in-memory triple store for SPIN and service descriptions
//! - Namespace/prefix management used for CURIE compaction
//! - Turtle and RDF/XML parsing
//!
//! # Example
//!
//! ```rust
//! use querycanvas::rdf::{RdfStore, Triple, NamedNode, Literal, RdfPredicate};
//!
//! let mut store = RdfStore::new();
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! store.insert(Triple::new(subject.clone().into(), predicate.clone(), object.into())).unwrap();
//!
//! let names = store.objects(&subject.into(), &predicate);
//! assert_eq!(names.len(), 1);
//! ```

mod namespace;
mod serialization;
mod store;
mod types;
pub mod vocab;

pub use types::{
    BlankNode, Literal, NamedNode, RdfError, RdfObject, RdfPredicate, RdfResult, RdfSubject,
    Triple,
};

pub use store::{RdfStore, RdfStoreError, RdfStoreResult};

pub use namespace::{Namespace, NamespaceManager, PrefixError, PrefixResult};

pub use serialization::{
    ParseError, ParseResult, RdfFormat, RdfParser, RdfSerializer, SerializeError,
    SerializeResult,
};
