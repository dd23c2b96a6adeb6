//! RDF namespace and prefix management
//!
//! This module handles namespace prefixes for compact IRI notation. The
//! table is bidirectional: prefix → namespace for expansion and
//! namespace → prefix for compaction.

use indexmap::IndexMap;
use std::collections::HashMap;
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace (prefix → IRI mapping)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Prefix
    pub prefix: String,
    /// IRI
    pub iri: String,
}

impl Namespace {
    /// Create a new namespace
    pub fn new(prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            iri: iri.into(),
        }
    }
}

/// Namespace manager with common prefixes
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings
    prefixes: IndexMap<String, String>,
    /// IRI → prefix mappings
    reverse: HashMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with common prefixes
    pub fn new() -> Self {
        let mut mgr = Self::empty();

        mgr.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        mgr.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mgr.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        mgr.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        mgr.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        mgr.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        mgr.add_prefix("dcterms", "http://purl.org/dc/terms/");
        mgr.add_prefix("sp", "http://spinrdf.org/sp#");
        mgr.add_prefix("sioc", "http://rdfs.org/sioc/ns#");
        mgr.add_prefix("geo", "http://www.w3.org/2003/01/geo/wgs84_pos#");
        mgr.add_prefix("time", "http://www.w3.org/2006/time#");
        mgr.add_prefix("sd", "http://www.w3.org/ns/sparql-service-description#");

        mgr
    }

    /// Create a namespace manager without any prefixes
    pub fn empty() -> Self {
        Self {
            prefixes: IndexMap::new(),
            reverse: HashMap::new(),
        }
    }

    /// Add a prefix, replacing any previous binding of the same prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        let prefix = prefix.into();
        let iri = iri.into();
        if let Some(old_iri) = self.prefixes.insert(prefix.clone(), iri.clone()) {
            if self.reverse.get(&old_iri) == Some(&prefix) {
                self.reverse.remove(&old_iri);
            }
        }
        self.reverse.insert(iri, prefix);
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Get the prefix bound to a namespace IRI
    pub fn get_prefix(&self, namespace: &str) -> Option<&str> {
        self.reverse.get(namespace).map(|s| s.as_str())
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        match compact_iri.split_once(':') {
            Some((prefix, local)) => {
                let iri = self.get_iri(prefix)?;
                Ok(format!("{}{}", iri, local))
            }
            None => Err(PrefixError::InvalidIri(compact_iri.to_string())),
        }
    }

    /// Split an IRI into namespace and local name at its last `#` or `/`
    ///
    /// The namespace keeps the delimiter.
    pub fn split(iri: &str) -> Option<(&str, &str)> {
        iri.rfind(|c: char| c == '#' || c == '/').map(|pos| iri.split_at(pos + 1))
    }

    /// Namespace part of an IRI, as `split` computes it
    pub fn namespace_of(iri: &str) -> Option<&str> {
        Self::split(iri).map(|(namespace, _)| namespace)
    }

    /// Compact an IRI using known prefixes
    ///
    /// Returns `None` when the namespace has no prefix or the local name
    /// cannot be written as a prefixed name.
    pub fn compact(&self, iri: &str) -> Option<String> {
        let prefix = self.compacting_prefix(iri)?;
        let (_, local) = Self::split(iri)?;
        Some(format!("{}:{}", prefix, local))
    }

    /// Prefix that `compact` would use for an IRI
    pub fn compacting_prefix(&self, iri: &str) -> Option<&str> {
        let (namespace, local) = Self::split(iri)?;
        if !is_local_name(local) {
            return None;
        }
        self.get_prefix(namespace)
    }

    /// Get all registered prefixes
    pub fn prefixes(&self) -> Vec<Namespace> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| Namespace::new(prefix.clone(), iri.clone()))
            .collect()
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Conservative subset of the SPARQL `PN_LOCAL` production
fn is_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}
