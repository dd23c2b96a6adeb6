//! In-memory RDF triple store
//!
//! Holds the raw SPIN descriptions and service descriptions loaded from
//! endpoints. Lookups go through two indices: subject → predicate → objects
//! for walking a query description, and predicate → object → subjects for
//! finding query and endpoint nodes.

use super::types::{RdfObject, RdfPredicate, RdfSubject, Triple};
use indexmap::{IndexMap, IndexSet};
use thiserror::Error;

/// RDF store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RdfStoreError {
    /// Duplicate triple
    #[error("Duplicate triple: {0}")]
    DuplicateTriple(String),
}

pub type RdfStoreResult<T> = Result<T, RdfStoreError>;

/// RDF triple store with subject and predicate indices
///
/// Iteration order is insertion order, so repeated loads of the same
/// document resolve "first value" lookups the same way.
#[derive(Debug, Clone, Default)]
pub struct RdfStore {
    /// All triples (primary storage)
    triples: IndexSet<Triple>,

    /// SPO index: Subject -> Predicate -> Objects
    spo_index: IndexMap<RdfSubject, IndexMap<RdfPredicate, Vec<RdfObject>>>,

    /// POS index: Predicate -> Object -> Subjects
    pos_index: IndexMap<RdfPredicate, IndexMap<RdfObject, Vec<RdfSubject>>>,
}

impl RdfStore {
    /// Create a new empty RDF store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from parsed triples, skipping duplicates
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>) -> Self {
        let mut store = Self::new();
        store.extend(triples);
        store
    }

    /// Insert a triple into the store
    pub fn insert(&mut self, triple: Triple) -> RdfStoreResult<()> {
        if self.triples.contains(&triple) {
            return Err(RdfStoreError::DuplicateTriple(triple.to_string()));
        }
        self.update_indices_insert(&triple);
        self.triples.insert(triple);
        Ok(())
    }

    /// Insert triples, silently skipping the ones already present
    pub fn extend(&mut self, triples: impl IntoIterator<Item = Triple>) {
        for triple in triples {
            let _ = self.insert(triple);
        }
    }

    /// Check if a triple exists in the store
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Get the total number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Get an iterator over all triples
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// All objects of `subject predicate ?o`
    pub fn objects(&self, subject: &RdfSubject, predicate: &RdfPredicate) -> &[RdfObject] {
        self.spo_index
            .get(subject)
            .and_then(|preds| preds.get(predicate))
            .map(|objects| objects.as_slice())
            .unwrap_or(&[])
    }

    /// First object of `subject predicate ?o`
    pub fn object(&self, subject: &RdfSubject, predicate: &RdfPredicate) -> Option<&RdfObject> {
        self.objects(subject, predicate).first()
    }

    /// All subjects of `?s predicate object`
    pub fn subjects(&self, predicate: &RdfPredicate, object: &RdfObject) -> &[RdfSubject] {
        self.pos_index
            .get(predicate)
            .and_then(|objects| objects.get(object))
            .map(|subjects| subjects.as_slice())
            .unwrap_or(&[])
    }

    // Private helper methods

    fn update_indices_insert(&mut self, triple: &Triple) {
        self.spo_index
            .entry(triple.subject.clone())
            .or_default()
            .entry(triple.predicate.clone())
            .or_default()
            .push(triple.object.clone());

        self.pos_index
            .entry(triple.predicate.clone())
            .or_default()
            .entry(triple.object.clone())
            .or_default()
            .push(triple.subject.clone());
    }
}
