//! Query → SPIN export

use super::{ParseError, ParseResult};
use crate::query::{Direction, Literal, LiteralKind, Query, Term, VarId, WhereClause};
use crate::rdf::vocab::{rdf, rdfs, sp};
use crate::rdf::{
    BlankNode, Literal as RdfLiteral, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple,
};

/// Writes queries as SPIN triples
///
/// Variables, list cells and order keys become blank nodes with stable
/// labels, so exporting the same query twice yields the same triples.
pub struct SpinExporter;

impl SpinExporter {
    /// Encode `query` under the node `query_uri`
    pub fn export(query: &Query, query_uri: &str) -> ParseResult<Vec<Triple>> {
        let mut writer = Writer {
            triples: Vec::new(),
            cells: 0,
        };
        let root = RdfSubject::NamedNode(NamedNode::new(query_uri)?);

        writer.add(root.clone(), rdf::TYPE, NamedNode::from_static(sp::SELECT).into());
        if let Some(label) = &query.label {
            writer.add(root.clone(), rdfs::LABEL, RdfLiteral::new_simple_literal(label).into());
        }
        if let Some(comment) = &query.comment {
            writer.add(root.clone(), rdfs::COMMENT, RdfLiteral::new_simple_literal(comment).into());
        }

        for (id, variable) in query.variables() {
            let node = var_node(id)?;
            writer.add(
                node.clone().into(),
                sp::VAR_NAME,
                RdfLiteral::new_simple_literal(variable.name()).into(),
            );
            if let Some(label) = &variable.label {
                writer.add(node.clone().into(), rdfs::LABEL, RdfLiteral::new_simple_literal(label).into());
            }
            if let Some(comment) = &variable.comment {
                writer.add(node.into(), rdfs::COMMENT, RdfLiteral::new_simple_literal(comment).into());
            }
        }

        let projections = query
            .projections()
            .iter()
            .map(|id| var_node(*id).map(RdfObject::from))
            .collect::<ParseResult<Vec<_>>>()?;
        let head = writer.list(projections)?;
        writer.add(root.clone(), sp::RESULT_VARIABLES, head);

        let mut elements = Vec::new();
        for clause in query.where_clauses() {
            let pattern = match clause {
                WhereClause::Pattern(p) => p,
                WhereClause::Service(block) => {
                    return Err(ParseError::UnsupportedConstruct(format!(
                        "SERVICE <{}>",
                        block.endpoint
                    )))
                }
            };
            let element = writer.cell()?;
            writer.add(element.clone().into(), sp::SUBJECT, term_object(&pattern.subject)?);
            writer.add(element.clone().into(), sp::PREDICATE, term_object(&pattern.predicate)?);
            writer.add(element.clone().into(), sp::OBJECT, term_object(&pattern.object)?);
            elements.push(element.into());
        }
        let head = writer.list(elements)?;
        writer.add(root.clone(), sp::WHERE, head);

        if !query.order().is_empty() {
            let mut keys = Vec::new();
            for clause in query.order() {
                let key = writer.cell()?;
                let kind = match clause.direction {
                    Direction::Asc => sp::ASC,
                    Direction::Desc => sp::DESC,
                };
                writer.add(key.clone().into(), rdf::TYPE, NamedNode::from_static(kind).into());
                writer.add(key.clone().into(), sp::EXPRESSION, var_node(clause.variable)?.into());
                keys.push(key.into());
            }
            let head = writer.list(keys)?;
            writer.add(root, sp::ORDER_BY, head);
        }

        Ok(writer.triples)
    }
}

struct Writer {
    triples: Vec<Triple>,
    cells: usize,
}

impl Writer {
    fn add(&mut self, subject: RdfSubject, predicate: &'static str, object: RdfObject) {
        self.triples
            .push(Triple::new(subject, RdfPredicate::from_static(predicate), object));
    }

    fn cell(&mut self) -> ParseResult<BlankNode> {
        self.cells += 1;
        Ok(BlankNode::from_id(&format!("c{}", self.cells))?)
    }

    /// Write an RDF list and return its head
    fn list(&mut self, items: Vec<RdfObject>) -> ParseResult<RdfObject> {
        let mut head: RdfObject = NamedNode::from_static(rdf::NIL).into();
        let cells = items
            .iter()
            .map(|_| self.cell())
            .collect::<ParseResult<Vec<_>>>()?;
        for (cell, item) in cells.into_iter().zip(items).rev() {
            self.add(cell.clone().into(), rdf::FIRST, item);
            self.add(cell.clone().into(), rdf::REST, head);
            head = cell.into();
        }
        Ok(head)
    }
}

fn var_node(id: VarId) -> ParseResult<BlankNode> {
    Ok(BlankNode::from_id(&format!("v{}", id.index()))?)
}

fn term_object(term: &Term) -> ParseResult<RdfObject> {
    Ok(match term {
        Term::Variable(id) => var_node(*id)?.into(),
        Term::Resource(r) if r.is_blank() => BlankNode::from_id(r.uri())?.into(),
        Term::Resource(r) => NamedNode::new(r.uri())?.into(),
        Term::Literal(l) => literal_object(l)?.into(),
    })
}

fn literal_object(literal: &Literal) -> ParseResult<RdfLiteral> {
    Ok(match literal.kind() {
        LiteralKind::Simple => RdfLiteral::new_simple_literal(literal.value()),
        LiteralKind::Language(lang) => RdfLiteral::new_language_tagged_literal(literal.value(), lang)?,
        LiteralKind::Typed(dt) => RdfLiteral::new_typed_literal(literal.value(), NamedNode::new(dt)?),
    })
}
