//! SPIN → Query import

use super::list::collect_list;
use super::{ImportOptions, ParseError, ParseResult};
use crate::query::{
    BasicGraphPattern, Literal, OrderClause, Query, Resource, Term, ValidationError, VarId,
    Variable,
};
use crate::rdf::vocab::{rdf, rdfs, sp, xsd};
use crate::rdf::{Literal as RdfLiteral, NamedNode, RdfObject, RdfPredicate, RdfStore, RdfSubject};
use tracing::debug;

/// Builds queries from SPIN descriptions held in a triple store
#[derive(Debug, Clone, Default)]
pub struct SpinImporter {
    options: ImportOptions,
}

impl SpinImporter {
    /// Create a new importer
    pub fn new(options: ImportOptions) -> Self {
        SpinImporter { options }
    }

    /// Import the `sp:Select` query described at `query_uri`
    pub fn import_select(&self, graph: &RdfStore, query_uri: &str) -> ParseResult<Query> {
        let node = RdfSubject::NamedNode(NamedNode::new(query_uri)?);
        check_query_type(graph, &node, query_uri)?;
        check_modifiers(graph, &node)?;

        let mut query = Query::new(query_uri);
        query.label = literal_value(graph, &node, rdfs::LABEL);
        query.comment = literal_value(graph, &node, rdfs::COMMENT);

        let importer = Import {
            graph,
            query_uri,
            max_list_len: self.options.max_list_len,
        };
        importer.projections(&node, &mut query)?;
        importer.where_clause(&node, &mut query)?;
        importer.order_by(&node, &mut query)?;

        debug!(
            query = query_uri,
            variables = query.variable_count(),
            patterns = query.where_clauses().len(),
            "Imported SPIN query"
        );
        Ok(query)
    }
}

fn check_query_type(graph: &RdfStore, node: &RdfSubject, query_uri: &str) -> ParseResult<()> {
    let types: Vec<&str> = graph
        .objects(node, &RdfPredicate::from_static(rdf::TYPE))
        .iter()
        .filter_map(RdfObject::as_iri)
        .filter(|t| *t != sp::QUERY)
        .collect();

    if types.contains(&sp::SELECT) {
        return Ok(());
    }
    match types.first() {
        Some(other) => Err(ParseError::UnsupportedQueryType(other.to_string())),
        None => Err(ParseError::MissingQueryType(query_uri.to_string())),
    }
}

/// Query-level properties the model cannot represent
const UNSUPPORTED_MODIFIERS: [&str; 9] = [
    sp::DISTINCT,
    sp::REDUCED,
    sp::GROUP_BY,
    sp::HAVING,
    sp::LIMIT,
    sp::OFFSET,
    sp::FROM,
    sp::FROM_NAMED,
    sp::VALUES,
];

fn check_modifiers(graph: &RdfStore, node: &RdfSubject) -> ParseResult<()> {
    for predicate in UNSUPPORTED_MODIFIERS {
        let Some(value) = graph.object(node, &RdfPredicate::from_static(predicate)) else {
            continue;
        };
        // `sp:distinct false` is the default
        let disabled = matches!(predicate, sp::DISTINCT | sp::REDUCED)
            && value.is_literal()
            && matches!(value.lexical(), "false" | "0");
        if !disabled {
            return Err(ParseError::UnsupportedConstruct(format!("<{}>", predicate)));
        }
    }
    Ok(())
}

fn literal_value(graph: &RdfStore, node: &RdfSubject, predicate: &'static str) -> Option<String> {
    graph
        .object(node, &RdfPredicate::from_static(predicate))
        .filter(|o| o.is_literal())
        .map(|o| o.lexical().to_string())
}

struct Import<'a> {
    graph: &'a RdfStore,
    query_uri: &'a str,
    max_list_len: usize,
}

impl<'a> Import<'a> {
    fn list(&self, node: &RdfSubject, predicate: &'static str) -> ParseResult<Vec<RdfObject>> {
        match self.graph.object(node, &RdfPredicate::from_static(predicate)) {
            Some(head) => collect_list(self.graph, head, self.max_list_len),
            None => Ok(Vec::new()),
        }
    }

    fn required(&self, node: &RdfSubject, predicate: &'static str) -> ParseResult<&'a RdfObject> {
        self.graph
            .object(node, &RdfPredicate::from_static(predicate))
            .ok_or_else(|| ParseError::UnsupportedConstruct(format!("{} without <{}>", node, predicate)))
    }

    /// Name of a SPIN variable node
    fn var_name(&self, node: &RdfSubject) -> Option<String> {
        literal_value(self.graph, node, sp::VAR_NAME)
    }

    fn variable(&self, node: &RdfSubject, name: String) -> Variable {
        let uri = match node {
            RdfSubject::NamedNode(n) => n.as_str().to_string(),
            RdfSubject::BlankNode(_) => format!("{};bn={}", self.query_uri, name),
        };
        Variable::new(uri, name)
            .with_label(literal_value(self.graph, node, rdfs::LABEL))
            .with_comment(literal_value(self.graph, node, rdfs::COMMENT))
    }

    fn projections(&self, node: &RdfSubject, query: &mut Query) -> ParseResult<()> {
        for member in self.list(node, sp::RESULT_VARIABLES)? {
            let cell = as_node(&member)?;
            if self.graph.object(&cell, &RdfPredicate::from_static(sp::EXPRESSION)).is_some() {
                return Err(ParseError::UnsupportedConstruct(format!(
                    "computed result variable {}",
                    cell
                )));
            }
            let name = self.var_name(&cell).ok_or_else(|| {
                ParseError::UnsupportedConstruct(format!("result expression {} is not a variable", cell))
            })?;
            let id = query.intern_variable(self.variable(&cell, name))?;
            query.project(id)?;
        }
        Ok(())
    }

    fn where_clause(&self, node: &RdfSubject, query: &mut Query) -> ParseResult<()> {
        let type_predicate = RdfPredicate::from_static(rdf::TYPE);
        for member in self.list(node, sp::WHERE)? {
            let element = as_node(&member)?;
            let kind = self
                .graph
                .objects(&element, &type_predicate)
                .iter()
                .find(|kind| kind.as_iri() != Some(sp::TRIPLE_PATTERN));
            if let Some(kind) = kind {
                return Err(ParseError::UnsupportedConstruct(kind.to_string()));
            }

            let subject = self.term(self.required(&element, sp::SUBJECT)?, query)?;
            let predicate = self.term(self.required(&element, sp::PREDICATE)?, query)?;
            let object = self.term(self.required(&element, sp::OBJECT)?, query)?;
            query.push_clause(BasicGraphPattern::new(subject, predicate, object)?)?;
        }
        Ok(())
    }

    fn term(&self, object: &RdfObject, query: &mut Query) -> ParseResult<Term> {
        if let Some(node) = object.as_subject() {
            if let Some(name) = self.var_name(&node) {
                return Ok(Term::Variable(query.intern_variable(self.variable(&node, name))?));
            }
        }
        Ok(match object {
            RdfObject::NamedNode(n) => Term::Resource(Resource::new(n.as_str())),
            RdfObject::BlankNode(b) => Term::Resource(Resource::blank(b.as_str())),
            RdfObject::Literal(l) => Term::Literal(convert_literal(l)),
        })
    }

    fn order_by(&self, node: &RdfSubject, query: &mut Query) -> ParseResult<()> {
        let type_predicate = RdfPredicate::from_static(rdf::TYPE);
        for member in self.list(node, sp::ORDER_BY)? {
            let cell = as_node(&member)?;
            let kind = self.graph.object(&cell, &type_predicate).and_then(RdfObject::as_iri);
            let (ascending, expression) = match kind {
                Some(sp::ASC) => (true, self.required(&cell, sp::EXPRESSION)?.clone()),
                Some(sp::DESC) => (false, self.required(&cell, sp::EXPRESSION)?.clone()),
                // A bare variable sorts ascending
                _ => (true, member.clone()),
            };

            let id = self.order_variable(&expression, query)?;
            let clause = if ascending {
                OrderClause::asc(id)
            } else {
                OrderClause::desc(id)
            };
            query.push_order(clause)?;
        }
        Ok(())
    }

    fn order_variable(&self, expression: &RdfObject, query: &Query) -> ParseResult<VarId> {
        let name = expression
            .as_subject()
            .and_then(|node| self.var_name(&node))
            .ok_or_else(|| ValidationError::OrderExpression(expression.to_string()))?;
        query
            .variable_id(&name)
            .ok_or_else(|| ValidationError::OrderExpression(name).into())
    }
}

fn as_node(member: &RdfObject) -> ParseResult<RdfSubject> {
    member
        .as_subject()
        .ok_or_else(|| ParseError::UnsupportedConstruct(format!("literal {} where a node is expected", member)))
}

fn convert_literal(literal: &RdfLiteral) -> Literal {
    match literal.language() {
        Some(language) => Literal::lang_tagged(literal.value(), language),
        None if literal.datatype() == xsd::STRING => Literal::simple(literal.value()),
        None => Literal::typed(literal.value(), literal.datatype()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Direction, SerializeOptions, SparqlSerializer};
    use crate::rdf::{NamespaceManager, RdfFormat, RdfParser};

    const PEOPLE: &str = r#"
        @prefix sp: <http://spinrdf.org/sp#> .
        @prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .
        @prefix foaf: <http://xmlns.com/foaf/0.1/> .
        @prefix ex: <http://example.org/> .

        ex:people a sp:Select, sp:Query ;
            rdfs:label "People" ;
            rdfs:comment "Everyone with a name" ;
            sp:resultVariables ( _:person [ sp:varName "name" ; rdfs:label "Name" ] ) ;
            sp:where (
                [ sp:subject _:person ; sp:predicate <http://www.w3.org/1999/02/22-rdf-syntax-ns#type> ; sp:object foaf:Person ]
                [ sp:subject _:person ; sp:predicate foaf:name ; sp:object [ sp:varName "name" ] ]
                [ sp:subject _:person ; sp:predicate foaf:age ; sp:object 42 ]
            ) ;
            sp:orderBy ( [ a sp:Desc ; sp:expression [ sp:varName "name" ] ] _:person ) .

        _:person sp:varName "person" .
    "#;

    fn graph(turtle: &str) -> RdfStore {
        RdfStore::from_triples(RdfParser::parse(turtle, RdfFormat::Turtle, None).unwrap())
    }

    #[test]
    fn test_import_select() {
        let store = graph(PEOPLE);
        let q = SpinImporter::default()
            .import_select(&store, "http://example.org/people")
            .unwrap();

        assert_eq!(q.label.as_deref(), Some("People"));
        assert_eq!(q.comment.as_deref(), Some("Everyone with a name"));
        assert_eq!(q.projected_names(), vec!["person", "name"]);
        assert_eq!(q.variable_count(), 2);
        assert_eq!(q.where_clauses().len(), 3);
        assert_eq!(
            q.variable("name").unwrap().label.as_deref(),
            Some("Name")
        );
        assert_eq!(
            q.variable("name").unwrap().uri(),
            "http://example.org/people;bn=name"
        );

        let person = q.variable_id("person").unwrap();
        for p in q.patterns() {
            assert_eq!(p.subject, Term::Variable(person));
        }

        assert_eq!(q.order().len(), 2);
        assert_eq!(q.order()[0].direction, Direction::Desc);
        assert_eq!(q.order()[1].variable, person);
    }

    #[test]
    fn test_imported_query_compacts() {
        let store = graph(PEOPLE);
        let q = SpinImporter::default()
            .import_select(&store, "http://example.org/people")
            .unwrap();
        let ns = NamespaceManager::new();
        let text = SparqlSerializer::new(&ns).serialize(&q, &SerializeOptions::new());
        assert!(text.contains("  ?person a foaf:Person ;\n    foaf:name ?name ;\n    foaf:age 42 .\n"));
        assert!(text.contains("ORDER BY DESC(?name) ASC(?person)"));
    }

    #[test]
    fn test_missing_query_type() {
        let store = graph(r#"<http://example.org/q> a <http://spinrdf.org/sp#Query> ."#);
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingQueryType(_)));

        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/missing")
            .unwrap_err();
        assert!(matches!(err, ParseError::MissingQueryType(_)));
    }

    #[test]
    fn test_non_select_rejected() {
        let store = graph(r#"<http://example.org/q> a <http://spinrdf.org/sp#Construct> ."#);
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedQueryType(t) if t.ends_with("Construct")));
    }

    #[test]
    fn test_optional_is_rejected() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:where ( [ a sp:Optional ; sp:elements () ] ) .
            "#,
        );
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedConstruct(c) if c.contains("Optional")));
    }

    #[test]
    fn test_typed_triple_pattern_accepted() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:resultVariables ( _:s ) ;
                sp:where ( [ a sp:TriplePattern ; sp:subject _:s ; sp:predicate <http://example.org/p> ; sp:object <http://example.org/o> ] ) .
            _:s sp:varName "s" .
            "#,
        );
        let q = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap();
        assert_eq!(q.patterns().len(), 1);
        assert_eq!(q.projected_names(), vec!["s"]);
    }

    fn modifier_error(modifier: &str) -> ParseError {
        let store = graph(&format!(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                {} ;
                sp:resultVariables ( _:s ) ;
                sp:where ( [ sp:subject _:s ; sp:predicate <http://example.org/p> ; sp:object <http://example.org/o> ] ) .
            _:s sp:varName "s" .
            "#,
            modifier
        ));
        SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err()
    }

    #[test]
    fn test_solution_modifiers_rejected() {
        for (modifier, name) in [
            ("sp:distinct true", "distinct"),
            ("sp:reduced true", "reduced"),
            ("sp:groupBy ( _:s )", "groupBy"),
            ("sp:having ( [ a sp:gt ] )", "having"),
            ("sp:limit 5", "limit"),
            ("sp:offset 10", "offset"),
            ("sp:from <http://example.org/graph>", "from"),
        ] {
            let err = modifier_error(modifier);
            assert!(
                matches!(&err, ParseError::UnsupportedConstruct(c) if c.ends_with(&format!("#{}>", name))),
                "{}: {:?}",
                modifier,
                err
            );
        }
    }

    #[test]
    fn test_distinct_false_is_accepted() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:distinct false ;
                sp:resultVariables ( _:s ) ;
                sp:where ( [ sp:subject _:s ; sp:predicate <http://example.org/p> ; sp:object 1 ] ) .
            _:s sp:varName "s" .
            "#,
        );
        assert!(SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .is_ok());
    }

    #[test]
    fn test_computed_result_variable_rejected() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:resultVariables ( [ sp:varName "c" ; sp:expression [ a sp:Count ; sp:expression _:s ] ] ) ;
                sp:where ( [ sp:subject _:s ; sp:predicate <http://example.org/p> ; sp:object 1 ] ) .
            _:s sp:varName "s" .
            "#,
        );
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedConstruct(c) if c.starts_with("computed result variable")));
    }

    #[test]
    fn test_order_expression_must_be_known_variable() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:orderBy ( [ a sp:Asc ; sp:expression [ sp:varName "ghost" ] ] ) .
            "#,
        );
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Validation(ValidationError::OrderExpression(name)) if name == "ghost"
        ));
    }

    #[test]
    fn test_literal_subject_rejected() {
        let store = graph(
            r#"
            @prefix sp: <http://spinrdf.org/sp#> .
            <http://example.org/q> a sp:Select ;
                sp:where ( [ sp:subject "oops" ; sp:predicate <http://example.org/p> ; sp:object 1 ] ) .
            "#,
        );
        let err = SpinImporter::default()
            .import_select(&store, "http://example.org/q")
            .unwrap_err();
        assert!(matches!(
            err,
            ParseError::Validation(ValidationError::LiteralPosition("subject"))
        ));
    }

    #[test]
    fn test_list_cap_applies() {
        let store = graph(PEOPLE);
        let err = SpinImporter::new(ImportOptions { max_list_len: 1 })
            .import_select(&store, "http://example.org/people")
            .unwrap_err();
        assert!(matches!(err, ParseError::MalformedList(_)));
    }
}
