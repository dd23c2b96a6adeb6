//! Concept list: classes offered as trivial queries

use crate::query::{BasicGraphPattern, Query, Resource, Term, ValidationResult, Variable};
use crate::rdf::vocab::{owl, rdf, rdfs};
use crate::rdf::{NamedNode, RdfObject, RdfPredicate, RdfStore};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A class that can seed a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub uri: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    /// Endpoint the class was discovered on
    pub endpoint: Option<String>,
}

impl Concept {
    pub fn new(uri: impl Into<String>) -> Self {
        Concept {
            uri: uri.into(),
            label: None,
            comment: None,
            endpoint: None,
        }
    }

    /// `SELECT ?id WHERE { ?id a <class> }`
    pub fn template(&self) -> ValidationResult<Query> {
        let mut query = Query::new(self.uri.clone());
        query.label = self.label.clone();
        query.comment = self.comment.clone();

        let id = query.add_variable(Variable::new(format!("{};var=id", self.uri), "id"))?;
        query.project(id)?;
        query.push_clause(BasicGraphPattern::new(
            Term::Variable(id),
            Term::Resource(Resource::new(rdf::TYPE)),
            Term::Resource(Resource::new(self.uri.clone())),
        )?)?;
        if let Some(endpoint) = &self.endpoint {
            query.set_active_endpoint(endpoint.clone());
        }
        Ok(query)
    }
}

/// Known concepts keyed by class URI
#[derive(Debug, Clone, Default)]
pub struct ConceptList {
    concepts: IndexMap<String, Concept>,
}

impl ConceptList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, concept: Concept) -> Option<Concept> {
        self.concepts.insert(concept.uri.clone(), concept)
    }

    pub fn get(&self, uri: &str) -> Option<&Concept> {
        self.concepts.get(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.concepts.contains_key(uri)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Concept> {
        self.concepts.values()
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Add every `owl:Class` and `rdfs:Class` named in a graph
    pub fn load_graph(&mut self, graph: &RdfStore, endpoint: Option<&str>) -> usize {
        let type_p = RdfPredicate::from_static(rdf::TYPE);
        let label_p = RdfPredicate::from_static(rdfs::LABEL);
        let comment_p = RdfPredicate::from_static(rdfs::COMMENT);
        let literal = |o: Option<&RdfObject>| {
            o.filter(|o| o.is_literal())
                .map(|o| o.lexical().to_string())
        };

        let mut added = 0;
        for class in [owl::CLASS, rdfs::CLASS] {
            let class: RdfObject = NamedNode::from_static(class).into();
            for subject in graph.subjects(&type_p, &class) {
                if !subject.is_named_node() || self.contains(subject.as_str()) {
                    continue;
                }
                self.add(Concept {
                    uri: subject.as_str().to_string(),
                    label: literal(graph.object(subject, &label_p)),
                    comment: literal(graph.object(subject, &comment_p)),
                    endpoint: endpoint.map(str::to_string),
                });
                added += 1;
            }
        }
        debug!(added, "Loaded concepts");
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{SerializeOptions, SparqlSerializer};
    use crate::rdf::{NamespaceManager, RdfFormat, RdfParser};

    #[test]
    fn test_template_query() {
        let mut concept = Concept::new("http://xmlns.com/foaf/0.1/Person");
        concept.label = Some("Person".to_string());
        concept.endpoint = Some("http://example.org/sparql".to_string());

        let query = concept.template().unwrap();
        assert_eq!(query.label.as_deref(), Some("Person"));
        assert_eq!(query.projected_names(), vec!["id"]);
        assert_eq!(query.active_endpoint(), Some("http://example.org/sparql"));

        let ns = NamespaceManager::new();
        let text = SparqlSerializer::new(&ns).serialize(&query, &SerializeOptions::new());
        assert_eq!(
            text,
            "PREFIX foaf: <http://xmlns.com/foaf/0.1/>\nSELECT ?id\nWHERE {\n  ?id a foaf:Person .\n}\n"
        );
    }

    #[test]
    fn test_load_graph() {
        let turtle = r#"
            @prefix owl: <http://www.w3.org/2002/07/owl#> .
            @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
            <http://example.org/Film> a owl:Class ; rdfs:label "Film" .
            <http://example.org/Actor> a rdfs:Class, owl:Class .
            [] a owl:Class .
        "#;
        let graph = RdfStore::from_triples(RdfParser::parse(turtle, RdfFormat::Turtle, None).unwrap());
        let mut list = ConceptList::new();
        assert_eq!(list.load_graph(&graph, None), 2);
        assert_eq!(
            list.get("http://example.org/Film").unwrap().label.as_deref(),
            Some("Film")
        );
        assert!(list.contains("http://example.org/Actor"));
    }
}
