//! SPARQL text rendering
//!
//! Produces canonical SELECT text:
//! - `PREFIX` lines for the namespaces the rendered text uses, sorted
//! - `SELECT` with the projection list, or `*`
//! - `WHERE { ... }` with `;` and `,` compaction of adjacent patterns
//! - `ORDER BY`, then caller-supplied `OFFSET` and `LIMIT`

use super::model::{BasicGraphPattern, Query, WhereClause};
use super::node::{Constant, Literal, RenderContext, Resource, Term};
use crate::rdf::vocab::rdf;
use crate::rdf::NamespaceManager;
use std::collections::BTreeMap;
use std::fmt::Write;

const INDENT: &str = "  ";

/// Per-call serialization options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Renders queries against a fixed prefix table
pub struct SparqlSerializer<'a> {
    namespaces: &'a NamespaceManager,
}

impl<'a> SparqlSerializer<'a> {
    /// Create a new serializer
    pub fn new(namespaces: &'a NamespaceManager) -> Self {
        SparqlSerializer { namespaces }
    }

    /// Render the full query text
    pub fn serialize(&self, query: &Query, options: &SerializeOptions) -> String {
        let mut out = self.prefix_block(query, &[]);

        out.push_str("SELECT ");
        if query.projections().is_empty() {
            out.push('*');
        } else {
            let projections: Vec<String> = query
                .projected_variables()
                .map(|v| v.render(RenderContext::Projection, self.namespaces))
                .collect();
            out.push_str(&projections.join(" "));
        }
        out.push('\n');

        out.push_str("WHERE {\n");
        out.push_str(&self.where_body(query));
        out.push_str("}\n");

        if !query.order().is_empty() {
            let keys: Vec<String> = query
                .order()
                .iter()
                .map(|o| {
                    format!(
                        "{}({})",
                        o.direction,
                        query
                            .var(o.variable)
                            .render(RenderContext::Inline, self.namespaces)
                    )
                })
                .collect();
            let _ = writeln!(out, "ORDER BY {}", keys.join(" "));
        }
        if let Some(offset) = options.offset {
            let _ = writeln!(out, "OFFSET {}", offset);
        }
        if let Some(limit) = options.limit {
            let _ = writeln!(out, "LIMIT {}", limit);
        }

        out
    }

    /// `PREFIX` lines for the namespaces used by the query and by `extra`
    pub fn prefix_block(&self, query: &Query, extra: &[&Constant]) -> String {
        let mut used = BTreeMap::new();
        self.scan_clauses(query, query.where_clauses(), &mut used);
        for id in query.projections() {
            if let Some(value) = query.var(*id).bound_value() {
                self.scan_constant(value, &mut used);
            }
        }
        for clause in query.order() {
            if let Some(value) = query.var(clause.variable).bound_value() {
                self.scan_constant(value, &mut used);
            }
        }
        for value in extra {
            self.scan_constant(value, &mut used);
        }

        let mut out = String::new();
        for (prefix, iri) in used {
            let _ = writeln!(out, "PREFIX {}: <{}>", prefix, iri);
        }
        out
    }

    /// Body of the WHERE block, one indented statement per line
    pub fn where_body(&self, query: &Query) -> String {
        let mut out = String::new();
        self.write_clauses(query, query.where_clauses(), 1, &mut out);
        out
    }

    /// Render a single term as it appears inside a pattern
    pub fn render_term(&self, query: &Query, term: &Term) -> String {
        match term {
            Term::Variable(id) => query.var(*id).render(RenderContext::Inline, self.namespaces),
            Term::Resource(r) => r.render(self.namespaces),
            Term::Literal(l) => l.render(self.namespaces),
        }
    }

    fn render_predicate(&self, query: &Query, term: &Term) -> String {
        match term {
            Term::Resource(r) if !r.is_blank() && r.uri() == rdf::TYPE => "a".to_string(),
            other => self.render_term(query, other),
        }
    }

    fn write_clauses(&self, query: &Query, clauses: &[WhereClause], depth: usize, out: &mut String) {
        let indent = INDENT.repeat(depth);
        let mut previous: Option<&BasicGraphPattern> = None;

        for clause in clauses {
            match clause {
                WhereClause::Pattern(p) => {
                    let object = self.render_term(query, &p.object);
                    match previous {
                        Some(prev) if prev.subject == p.subject && prev.predicate == p.predicate => {
                            let _ = write!(out, ", {}", object);
                        }
                        Some(prev) if prev.subject == p.subject => {
                            let _ = write!(
                                out,
                                " ;\n{}{}{} {}",
                                indent,
                                INDENT,
                                self.render_predicate(query, &p.predicate),
                                object
                            );
                        }
                        _ => {
                            if previous.is_some() {
                                out.push_str(" .\n");
                            }
                            let _ = write!(
                                out,
                                "{}{} {} {}",
                                indent,
                                self.render_term(query, &p.subject),
                                self.render_predicate(query, &p.predicate),
                                object
                            );
                        }
                    }
                    previous = Some(p);
                }
                WhereClause::Service(block) => {
                    if previous.take().is_some() {
                        out.push_str(" .\n");
                    }
                    let _ = writeln!(out, "{}SERVICE <{}> {{", indent, block.endpoint);
                    self.write_clauses(query, &block.clauses, depth + 1, out);
                    let _ = writeln!(out, "{}}}", indent);
                }
            }
        }

        if previous.is_some() {
            out.push_str(" .\n");
        }
    }

    fn scan_clauses(&self, query: &Query, clauses: &[WhereClause], used: &mut BTreeMap<String, String>) {
        for clause in clauses {
            match clause {
                WhereClause::Pattern(p) => {
                    self.scan_term(query, &p.subject, used);
                    match &p.predicate {
                        Term::Resource(r) if r.uri() == rdf::TYPE => {}
                        other => self.scan_term(query, other, used),
                    }
                    self.scan_term(query, &p.object, used);
                }
                WhereClause::Service(block) => self.scan_clauses(query, &block.clauses, used),
            }
        }
    }

    fn scan_term(&self, query: &Query, term: &Term, used: &mut BTreeMap<String, String>) {
        match term {
            Term::Variable(id) => {
                if let Some(value) = query.var(*id).bound_value() {
                    self.scan_constant(value, used);
                }
            }
            Term::Resource(r) => self.scan_resource(r, used),
            Term::Literal(l) => self.scan_literal(l, used),
        }
    }

    fn scan_constant(&self, value: &Constant, used: &mut BTreeMap<String, String>) {
        match value {
            Constant::Resource(r) => self.scan_resource(r, used),
            Constant::Literal(l) => self.scan_literal(l, used),
        }
    }

    fn scan_literal(&self, literal: &Literal, used: &mut BTreeMap<String, String>) {
        if let Some(dt) = literal.datatype() {
            // Bare numbers carry no datatype in the text
            if !literal.render(self.namespaces).starts_with('"') {
                return;
            }
            self.scan_iri(dt, used);
        }
    }

    fn scan_resource(&self, resource: &Resource, used: &mut BTreeMap<String, String>) {
        if !resource.is_blank() {
            self.scan_iri(resource.uri(), used);
        }
    }

    fn scan_iri(&self, iri: &str, used: &mut BTreeMap<String, String>) {
        if let Some(prefix) = self.namespaces.compacting_prefix(iri) {
            if let Ok(namespace) = self.namespaces.get_iri(prefix) {
                used.insert(prefix.to_string(), namespace.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::{OrderClause, ServiceBlock};
    use crate::query::node::Variable;
    use crate::rdf::vocab::xsd;

    const EX: &str = "http://example.org/";

    fn namespaces() -> NamespaceManager {
        let mut ns = NamespaceManager::new();
        ns.add_prefix("ex", EX);
        ns
    }

    fn ex(local: &str) -> Term {
        Term::Resource(Resource::new(format!("{}{}", EX, local)))
    }

    fn normalize(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_projection_is_star() {
        let ns = namespaces();
        let q = Query::new("urn:q");
        let text = SparqlSerializer::new(&ns).serialize(&q, &SerializeOptions::new());
        assert_eq!(text, "SELECT *\nWHERE {\n}\n");
    }

    #[test]
    fn test_compaction() {
        let ns = namespaces();
        let mut q = Query::new("urn:q");
        let a = q.add_variable(Variable::new("urn:a", "a")).unwrap();
        let o1 = q.add_variable(Variable::new("urn:o1", "o1")).unwrap();
        let o2 = q.add_variable(Variable::new("urn:o2", "o2")).unwrap();
        let o3 = q.add_variable(Variable::new("urn:o3", "o3")).unwrap();
        for (p, o) in [("p1", o1), ("p1", o2), ("p2", o3)] {
            q.push_clause(BasicGraphPattern::new(a.into(), ex(p), o.into()).unwrap())
                .unwrap();
        }

        let body = SparqlSerializer::new(&ns).where_body(&q);
        assert_eq!(body, "  ?a ex:p1 ?o1, ?o2 ;\n    ex:p2 ?o3 .\n");
        assert_eq!(normalize(&body), "?a ex:p1 ?o1, ?o2 ; ex:p2 ?o3 .");
    }

    #[test]
    fn test_full_layout() {
        let ns = namespaces();
        let mut q = Query::new("urn:q");
        let a = q.add_variable(Variable::new("urn:a", "a")).unwrap();
        let b = q.add_variable(Variable::new("urn:b", "b")).unwrap();
        q.project(a).unwrap();
        q.project(b).unwrap();
        q.push_clause(
            BasicGraphPattern::new(a.into(), Term::Resource(Resource::new(rdf::TYPE)), ex("Person"))
                .unwrap(),
        )
        .unwrap();
        q.push_clause(BasicGraphPattern::new(a.into(), ex("knows"), b.into()).unwrap())
            .unwrap();
        q.push_clause(ServiceBlock::new(
            "http://other/sparql",
            vec![BasicGraphPattern::new(b.into(), ex("name"), Literal::simple("Bob").into())
                .unwrap()
                .into()],
        ))
        .unwrap();
        q.push_order(OrderClause::asc(a)).unwrap();
        q.push_order(OrderClause::desc(b)).unwrap();

        let text = SparqlSerializer::new(&ns)
            .serialize(&q, &SerializeOptions::new().with_offset(10).with_limit(25));
        let expected = "PREFIX ex: <http://example.org/>\n\
SELECT ?a ?b\n\
WHERE {\n\
\x20 ?a a ex:Person ;\n\
\x20   ex:knows ?b .\n\
\x20 SERVICE <http://other/sparql> {\n\
\x20   ?b ex:name \"Bob\" .\n\
\x20 }\n\
}\n\
ORDER BY ASC(?a) DESC(?b)\n\
OFFSET 10\n\
LIMIT 25\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_service_block_breaks_compaction() {
        let ns = namespaces();
        let mut q = Query::new("urn:q");
        let a = q.add_variable(Variable::new("urn:a", "a")).unwrap();
        let p = BasicGraphPattern::new(a.into(), ex("p"), ex("o")).unwrap();
        q.push_clause(p.clone()).unwrap();
        q.push_clause(ServiceBlock::new("http://e/sparql", vec![p.clone().into()]))
            .unwrap();
        q.push_clause(p).unwrap();

        let body = SparqlSerializer::new(&ns).where_body(&q);
        assert_eq!(
            body,
            "  ?a ex:p ex:o .\n  SERVICE <http://e/sparql> {\n    ?a ex:p ex:o .\n  }\n  ?a ex:p ex:o .\n"
        );
    }

    #[test]
    fn test_only_used_prefixes() {
        let ns = namespaces();
        let mut q = Query::new("urn:q");
        let a = q.add_variable(Variable::new("urn:a", "a")).unwrap();
        q.push_clause(
            BasicGraphPattern::new(
                a.into(),
                Term::Resource(Resource::new("http://xmlns.com/foaf/0.1/age")),
                Literal::typed("1.5", xsd::DOUBLE).into(),
            )
            .unwrap(),
        )
        .unwrap();
        q.push_clause(
            BasicGraphPattern::new(a.into(), Term::Resource(Resource::new(rdf::TYPE)), ex("T"))
                .unwrap(),
        )
        .unwrap();

        let prefixes = SparqlSerializer::new(&ns).prefix_block(&q, &[]);
        assert_eq!(
            prefixes,
            "PREFIX ex: <http://example.org/>\n\
PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n\
PREFIX xsd: <http://www.w3.org/2001/XMLSchema#>\n"
        );
    }

    #[test]
    fn test_bound_variable_is_inlined() {
        let ns = namespaces();
        let mut q = Query::new("urn:q");
        let s = q.add_variable(Variable::new("urn:s", "s")).unwrap();
        let x = q.add_variable(Variable::new("urn:x", "x")).unwrap();
        q.project(s).unwrap();
        q.project(x).unwrap();
        q.push_clause(BasicGraphPattern::new(s.into(), ex("count"), x.into()).unwrap())
            .unwrap();
        q.bind(x, Literal::typed("5", xsd::INTEGER).into()).unwrap();

        let text = SparqlSerializer::new(&ns).serialize(&q, &SerializeOptions::new());
        assert!(text.contains("SELECT ?s (5 AS ?x)\n"));
        assert!(text.contains("?s ex:count 5 ."));
        assert!(!text.contains("ex:count ?x"));
    }

    #[test]
    fn test_unknown_namespace_uses_brackets() {
        let ns = NamespaceManager::empty();
        let mut q = Query::new("urn:q");
        let a = q.add_variable(Variable::new("urn:a", "a")).unwrap();
        q.push_clause(BasicGraphPattern::new(a.into(), ex("p"), ex("o")).unwrap())
            .unwrap();
        let text = SparqlSerializer::new(&ns).serialize(&q, &SerializeOptions::new());
        assert!(!text.contains("PREFIX"));
        assert!(text.contains("?a <http://example.org/p> <http://example.org/o> ."));
    }
}
