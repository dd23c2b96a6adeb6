//! Query template catalog

use super::{CatalogError, CatalogResult};
use crate::query::Query;
use crate::rdf::vocab::{rdf, rdfs, sp};
use crate::rdf::{NamedNode, RdfObject, RdfPredicate, RdfStore, RdfSubject};
use crate::spin::SpinImporter;
use indexmap::map::Entry;
use indexmap::IndexMap;
use tracing::{debug, info, warn};

/// Outcome of loading one endpoint's query graph
#[derive(Debug, Default)]
pub struct LoadReport {
    /// URIs of the queries that were imported
    pub loaded: Vec<String>,
    /// Queries that failed to import
    pub failed: Vec<CatalogError>,
}

/// Imported queries keyed by their URI
#[derive(Debug, Clone, Default)]
pub struct QueryCatalog {
    queries: IndexMap<String, Query>,
}

impl QueryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query, replacing any previous query with the same URI
    pub fn insert(&mut self, query: Query) -> Option<Query> {
        self.queries.insert(query.uri().to_string(), query)
    }

    pub fn get(&self, uri: &str) -> Option<&Query> {
        self.queries.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.queries.contains_key(uri)
    }

    pub fn remove(&mut self, uri: &str) -> Option<Query> {
        self.queries.shift_remove(uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        self.queries.values()
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Queries whose active endpoint is `endpoint`
    pub fn for_endpoint<'a>(&'a self, endpoint: &'a str) -> impl Iterator<Item = &'a Query> + 'a {
        self.queries
            .values()
            .filter(move |q| q.active_endpoint() == Some(endpoint))
    }

    /// Import every labelled `sp:Query` of a graph fetched from `endpoint`
    ///
    /// A query that fails to import is logged and reported; the rest of the
    /// batch still loads.
    pub fn load_graph(&mut self, graph: &RdfStore, endpoint: &str, importer: &SpinImporter) -> LoadReport {
        let type_p = RdfPredicate::from_static(rdf::TYPE);
        let label_p = RdfPredicate::from_static(rdfs::LABEL);

        let mut candidates: Vec<&RdfSubject> = Vec::new();
        for class in [sp::QUERY, sp::SELECT] {
            let class: RdfObject = NamedNode::from_static(class).into();
            for subject in graph.subjects(&type_p, &class) {
                if subject.is_named_node() && !candidates.contains(&subject) {
                    candidates.push(subject);
                }
            }
        }

        let mut report = LoadReport::default();
        for subject in candidates {
            if graph.object(subject, &label_p).is_none() {
                debug!(query = subject.as_str(), "Skipping query without rdfs:label");
                continue;
            }
            match importer.import_select(graph, subject.as_str()) {
                Ok(mut query) => {
                    query.set_active_endpoint(endpoint);
                    report.loaded.push(query.uri().to_string());
                    self.insert(query);
                }
                Err(source) => {
                    warn!(query = subject.as_str(), error = %source, "Failed to import query");
                    report.failed.push(CatalogError::Import {
                        uri: subject.as_str().to_string(),
                        source,
                    });
                }
            }
        }

        info!(
            endpoint,
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "Loaded query catalog"
        );
        report
    }

    /// Import a single query and store it
    pub fn load_query(
        &mut self,
        graph: &RdfStore,
        query_uri: &str,
        endpoint: Option<&str>,
        importer: &SpinImporter,
    ) -> CatalogResult<&Query> {
        let mut query = importer
            .import_select(graph, query_uri)
            .map_err(|source| CatalogError::Import {
                uri: query_uri.to_string(),
                source,
            })?;
        if let Some(endpoint) = endpoint {
            query.set_active_endpoint(endpoint);
        }
        Ok(match self.queries.entry(query.uri().to_string()) {
            Entry::Occupied(mut slot) => {
                slot.insert(query);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(query),
        })
    }
}
