//! SPARQL query results
//!
//! Decodes the `application/sparql-results+json` format into bindings that
//! can be fed back into a query as substitutions.

use crate::query::{Constant, Literal, Resource};
use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Media type of SPARQL JSON results
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// A term bound in a solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundTerm {
    Iri(String),
    BlankNode(String),
    Literal(Literal),
}

impl BoundTerm {
    /// Value usable as a substitution, if any
    ///
    /// Blank nodes are local to the result set and cannot be substituted.
    pub fn to_constant(&self) -> Option<Constant> {
        match self {
            BoundTerm::Iri(iri) => Some(Constant::Resource(Resource::new(iri.clone()))),
            BoundTerm::Literal(lit) => Some(Constant::Literal(lit.clone())),
            BoundTerm::BlankNode(_) => None,
        }
    }

    /// Lexical form for display
    pub fn lexical(&self) -> &str {
        match self {
            BoundTerm::Iri(iri) => iri,
            BoundTerm::BlankNode(id) => id,
            BoundTerm::Literal(lit) => lit.value(),
        }
    }
}

/// Query solution (variable bindings)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuerySolution {
    /// Variable name → bound term; unbound variables are absent
    pub bindings: IndexMap<String, BoundTerm>,
}

impl QuerySolution {
    pub fn get(&self, variable: &str) -> Option<&BoundTerm> {
        self.bindings.get(variable.trim_start_matches('?'))
    }
}

/// Results of a SELECT query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectResults {
    /// Variable names in header order
    pub variables: Vec<String>,
    pub solutions: Vec<QuerySolution>,
}

impl SelectResults {
    /// Create empty results
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    /// Decode a SPARQL JSON results document
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let document: JsonDocument = serde_json::from_str(text)?;
        let solutions = document
            .results
            .bindings
            .into_iter()
            .map(|row| QuerySolution {
                bindings: row
                    .into_iter()
                    .map(|(name, term)| (name, term.into_bound()))
                    .collect(),
            })
            .collect();
        Ok(SelectResults {
            variables: document.head.vars,
            solutions,
        })
    }

    /// Distinct values of one column, in first-seen order
    pub fn column(&self, variable: &str) -> Vec<&BoundTerm> {
        let mut seen = Vec::new();
        for term in self.solutions.iter().filter_map(|s| s.get(variable)) {
            if !seen.contains(&term) {
                seen.push(term);
            }
        }
        seen
    }
}

#[derive(Deserialize)]
struct JsonDocument {
    head: JsonHead,
    results: JsonResults,
}

#[derive(Deserialize)]
struct JsonHead {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Deserialize)]
struct JsonResults {
    bindings: Vec<HashMap<String, JsonTerm>>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
enum JsonTerm {
    Uri {
        value: String,
    },
    Bnode {
        value: String,
    },
    Literal {
        value: String,
        #[serde(rename = "xml:lang")]
        lang: Option<String>,
        datatype: Option<String>,
    },
    // Older endpoints still emit this
    TypedLiteral {
        value: String,
        datatype: Option<String>,
    },
}

impl JsonTerm {
    fn into_bound(self) -> BoundTerm {
        match self {
            JsonTerm::Uri { value } => BoundTerm::Iri(value),
            JsonTerm::Bnode { value } => BoundTerm::BlankNode(value),
            JsonTerm::Literal {
                value,
                lang: Some(lang),
                ..
            } => BoundTerm::Literal(Literal::lang_tagged(value, lang)),
            JsonTerm::Literal {
                value,
                datatype: Some(datatype),
                ..
            } => BoundTerm::Literal(Literal::typed(value, datatype)),
            JsonTerm::Literal { value, .. } => BoundTerm::Literal(Literal::simple(value)),
            JsonTerm::TypedLiteral {
                value,
                datatype: Some(datatype),
            } => BoundTerm::Literal(Literal::typed(value, datatype)),
            JsonTerm::TypedLiteral { value, .. } => BoundTerm::Literal(Literal::simple(value)),
        }
    }
}
