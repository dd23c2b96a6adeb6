//! SPARQL query object model
//!
//! This module provides:
//! - Node types (variables, resources, literals, triple patterns)
//! - The [`Query`] aggregate with its arena-style variable table
//! - Canonical SPARQL rendering with pattern compaction
//! - `{{placeholder}}` templates for discovery queries
//!
//! # Example
//!
//! ```rust
//! use querycanvas::query::{BasicGraphPattern, Query, Resource, SerializeOptions, SparqlSerializer, Variable};
//! use querycanvas::rdf::NamespaceManager;
//!
//! let mut query = Query::new("http://example.org/queries/people");
//! let person = query.add_variable(Variable::new("urn:person", "person")).unwrap();
//! let name = query.add_variable(Variable::new("urn:name", "name")).unwrap();
//! query.project(name).unwrap();
//! query.push_clause(
//!     BasicGraphPattern::new(
//!         person.into(),
//!         Resource::new("http://xmlns.com/foaf/0.1/name").into(),
//!         name.into(),
//!     )
//!     .unwrap(),
//! ).unwrap();
//!
//! let namespaces = NamespaceManager::new();
//! let text = SparqlSerializer::new(&namespaces).serialize(&query, &SerializeOptions::new().with_limit(10));
//! assert!(text.contains("?person foaf:name ?name ."));
//! assert!(text.ends_with("LIMIT 10\n"));
//! ```

mod model;
mod names;
mod node;
mod serializer;
mod template;

use thiserror::Error;

pub use model::{BasicGraphPattern, OrderClause, Query, ServiceBlock, WhereClause};
pub use names::unique_name;
pub use node::{
    is_var_name, Constant, Direction, JoinSource, Literal, LiteralKind, RenderContext, Resource,
    Term, VarId, Variable, VariableKind,
};
pub use serializer::{SerializeOptions, SparqlSerializer};
pub use template::{
    QueryTemplate, TemplateValue, DESCRIBE_VARIABLE_CLASSES, DESCRIBE_VARIABLE_PROPERTIES,
};

/// Errors raised when an operation would break a query's invariants
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("Variable id {0} is not in the variable table")]
    UnknownVariableId(usize),

    #[error("Duplicate variable name: {0}")]
    DuplicateVariable(String),

    #[error("Invalid variable name: {0}")]
    InvalidVariableName(String),

    #[error("A literal cannot be used as {0}")]
    LiteralPosition(&'static str),

    #[error("Variable name not in new ordering: {0}")]
    ProjectionMismatch(String),

    #[error("Order expression is not a variable of the query: {0}")]
    OrderExpression(String),

    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    #[error("Template placeholder has no value: {0}")]
    Placeholder(String),

    #[error("Cannot join: {0}")]
    JoinOperand(String),
}

pub type ValidationResult<T> = Result<T, ValidationError>;
