use querycanvas::query::{
    BasicGraphPattern, Literal, Query, Resource, SerializeOptions, SparqlSerializer, Term, Variable,
};
use querycanvas::rdf::vocab::xsd;
use querycanvas::rdf::{NamespaceManager, RdfStore};
use querycanvas::sparql::SparqlParser;
use querycanvas::{SpinExporter, SpinImporter};

const FOAF: &str = "http://xmlns.com/foaf/0.1/";
const URI: &str = "http://example.org/q/friends";

fn foaf(local: &str) -> Term {
    Term::Resource(Resource::new(format!("{}{}", FOAF, local)))
}

fn friends_query() -> Query {
    let mut q = Query::new(URI);
    let person = q
        .add_variable(Variable::new(format!("{};var=person", URI), "person"))
        .unwrap();
    let friend = q
        .add_variable(Variable::new(format!("{};var=friend", URI), "friend"))
        .unwrap();
    let name = q
        .add_variable(Variable::new(format!("{};var=name", URI), "name"))
        .unwrap();
    q.project(person).unwrap();
    q.project(name).unwrap();

    let patterns = [
        (person.into(), foaf("knows"), friend.into()),
        (friend.into(), foaf("name"), name.into()),
        (person.into(), foaf("age"), Term::Literal(Literal::typed("30", xsd::INTEGER))),
        (person.into(), foaf("nick"), Term::Literal(Literal::lang_tagged("bob", "en"))),
    ];
    for (s, p, o) in patterns {
        q.push_clause(BasicGraphPattern::new(s, p, o).unwrap()).unwrap();
    }
    q
}

/// Triple patterns rendered with the query's own names, sorted
fn pattern_multiset(query: &Query, ns: &NamespaceManager) -> Vec<String> {
    let serializer = SparqlSerializer::new(ns);
    let mut patterns: Vec<String> = query
        .patterns()
        .iter()
        .map(|p| {
            format!(
                "{} {} {}",
                serializer.render_term(query, &p.subject),
                serializer.render_term(query, &p.predicate),
                serializer.render_term(query, &p.object)
            )
        })
        .collect();
    patterns.sort();
    patterns
}

#[test]
fn test_round_trip_through_sparql_text() {
    let ns = NamespaceManager::new();
    let original = friends_query();
    let text = SparqlSerializer::new(&ns).serialize(&original, &SerializeOptions::new());

    let parsed = SparqlParser::parse_select(&text, URI).unwrap();
    assert_eq!(parsed.query.projected_names(), original.projected_names());
    assert_eq!(pattern_multiset(&parsed.query, &ns), pattern_multiset(&original, &ns));

    // Canonical text is a fixed point
    let again = SparqlSerializer::new(&ns).serialize(&parsed.query, &parsed.options);
    assert_eq!(again, text);
}

#[test]
fn test_round_trip_through_spin() {
    let ns = NamespaceManager::new();
    let original = friends_query();

    let triples = SpinExporter::export(&original, URI).unwrap();
    let graph = RdfStore::from_triples(triples);
    let imported = SpinImporter::default().import_select(&graph, URI).unwrap();

    assert_eq!(imported.projected_names(), original.projected_names());
    assert_eq!(pattern_multiset(&imported, &ns), pattern_multiset(&original, &ns));
    assert_eq!(
        SparqlSerializer::new(&ns).serialize(&imported, &SerializeOptions::new()),
        SparqlSerializer::new(&ns).serialize(&original, &SerializeOptions::new())
    );
}

#[test]
fn test_clone_is_independent() {
    let original = friends_query();
    let mut copy = original.clone();

    let extra = copy.fresh_variable("name").unwrap();
    assert_eq!(copy.var(extra).name(), "name1");
    copy.push_clause(
        BasicGraphPattern::new(extra.into(), foaf("mbox"), Term::Resource(Resource::new("mailto:a@b")))
            .unwrap(),
    )
    .unwrap();

    assert_eq!(original.where_clauses().len(), 4);
    assert_eq!(original.variable_count(), 3);
    assert!(original.variable("name1").is_none());
    assert_eq!(copy.where_clauses().len(), 5);
}

#[test]
fn test_parameterization_inlines_bound_value() {
    let ns = NamespaceManager::new();
    let mut q = friends_query();
    let age = q
        .add_variable(Variable::new(format!("{};var=x", URI), "x"))
        .unwrap();
    q.project(age).unwrap();
    let person = q.resolve("person").unwrap();
    q.push_clause(BasicGraphPattern::new(person.into(), foaf("age"), age.into()).unwrap())
        .unwrap();
    q.bind(age, Literal::typed("5", xsd::INTEGER).into()).unwrap();

    let text = SparqlSerializer::new(&ns).serialize(&q, &SerializeOptions::new());
    assert!(text.contains("SELECT ?person ?name (5 AS ?x)\n"));
    assert!(text.contains("foaf:age 5"));
    assert_eq!(text.matches("?x").count(), 1);
}
