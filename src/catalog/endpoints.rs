//! Endpoint catalog

use super::{CatalogError, CatalogResult};
use crate::rdf::vocab::{rdfs, sd};
use crate::rdf::{RdfObject, RdfPredicate, RdfStore};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A SPARQL endpoint known to the canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub uri: String,
    pub label: String,
    #[serde(default)]
    pub comment: Option<String>,
}

impl EndpointInfo {
    pub fn new(uri: impl Into<String>, label: impl Into<String>) -> Self {
        EndpointInfo {
            uri: uri.into(),
            label: label.into(),
            comment: None,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Endpoints keyed by URI, in insertion order
#[derive(Debug, Clone, Default)]
pub struct EndpointCatalog {
    endpoints: IndexMap<String, EndpointInfo>,
}

impl EndpointCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new endpoint
    pub fn add(&mut self, info: EndpointInfo) -> CatalogResult<()> {
        if self.endpoints.contains_key(&info.uri) {
            return Err(CatalogError::Duplicate(info.uri));
        }
        debug!(endpoint = %info.uri, label = %info.label, "Added endpoint");
        self.endpoints.insert(info.uri.clone(), info);
        Ok(())
    }

    /// Replace the label and comment of a known endpoint
    pub fn update(&mut self, info: EndpointInfo) -> CatalogResult<()> {
        match self.endpoints.get_mut(&info.uri) {
            Some(existing) => {
                *existing = info;
                Ok(())
            }
            None => Err(CatalogError::UnknownEndpoint(info.uri)),
        }
    }

    pub fn remove(&mut self, uri: &str) -> CatalogResult<EndpointInfo> {
        self.endpoints
            .shift_remove(uri)
            .ok_or_else(|| CatalogError::UnknownEndpoint(uri.to_string()))
    }

    pub fn get(&self, uri: &str) -> Option<&EndpointInfo> {
        self.endpoints.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.endpoints.contains_key(uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointInfo> {
        self.endpoints.values()
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Read `sd:endpoint` descriptions from a graph
    ///
    /// Each service node must carry an `rdfs:label`.
    pub fn read_service_description(graph: &RdfStore) -> CatalogResult<Vec<EndpointInfo>> {
        let endpoint = RdfPredicate::from_static(sd::ENDPOINT);
        let label_p = RdfPredicate::from_static(rdfs::LABEL);
        let comment_p = RdfPredicate::from_static(rdfs::COMMENT);

        let mut found = Vec::new();
        for triple in graph.iter().filter(|t| t.predicate == endpoint) {
            let uri = triple.object.lexical().to_string();
            let label = graph
                .object(&triple.subject, &label_p)
                .filter(|o| o.is_literal())
                .map(|o| o.lexical().to_string())
                .ok_or_else(|| CatalogError::MissingLabel(uri.clone()))?;
            let comment = graph
                .object(&triple.subject, &comment_p)
                .filter(|o| o.is_literal())
                .map(RdfObject::lexical)
                .map(str::to_string);
            found.push(EndpointInfo {
                uri,
                label,
                comment,
            });
        }
        Ok(found)
    }

    /// Add or refresh every endpoint a service description names
    pub fn import_service_description(&mut self, graph: &RdfStore) -> CatalogResult<usize> {
        let found = Self::read_service_description(graph)?;
        let count = found.len();
        for info in found {
            info!(endpoint = %info.uri, "Imported service description");
            self.endpoints.insert(info.uri.clone(), info);
        }
        Ok(count)
    }
}
