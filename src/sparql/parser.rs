//! SPARQL SELECT text → Query, using spargebra
//!
//! Accepts the same subset the rest of the crate handles: basic graph
//! patterns, `SERVICE` blocks, ORDER BY on variables, OFFSET/LIMIT and
//! constant projections `(value AS ?var)`. Everything else is rejected.

use crate::query::{
    BasicGraphPattern, Constant, Literal, OrderClause, Query, Resource, SerializeOptions,
    ServiceBlock, Term, ValidationError, VarId, Variable, WhereClause,
};
use spargebra::algebra::{Expression, GraphPattern, OrderExpression};
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
use spargebra::SparqlSyntaxError;
use thiserror::Error;

/// SPARQL text errors
#[derive(Error, Debug)]
pub enum SparqlParseError {
    #[error(transparent)]
    Syntax(#[from] SparqlSyntaxError),

    #[error("Only SELECT queries are supported")]
    NotSelect,

    #[error("Unsupported construct: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type SparqlParseResult<T> = Result<T, SparqlParseError>;

/// A parsed query with the OFFSET/LIMIT it carried
#[derive(Debug, Clone)]
pub struct ParsedSelect {
    pub query: Query,
    pub options: SerializeOptions,
}

/// SPARQL SELECT reader
pub struct SparqlParser;

impl SparqlParser {
    /// Parse SELECT text into a query identified by `query_uri`
    pub fn parse_select(text: &str, query_uri: &str) -> SparqlParseResult<ParsedSelect> {
        let pattern = match spargebra::Query::parse(text, None)? {
            spargebra::Query::Select {
                dataset, pattern, ..
            } => {
                if dataset.is_some() {
                    return Err(SparqlParseError::Unsupported("FROM".to_string()));
                }
                pattern
            }
            _ => return Err(SparqlParseError::NotSelect),
        };

        let mut reader = Reader {
            query: Query::new(query_uri),
            options: SerializeOptions::default(),
        };
        reader.modifiers(&pattern)?;
        Ok(ParsedSelect {
            query: reader.query,
            options: reader.options,
        })
    }
}

struct Reader {
    query: Query,
    options: SerializeOptions,
}

impl Reader {
    /// Peel solution modifiers in the order spargebra nests them
    fn modifiers(&mut self, pattern: &GraphPattern) -> SparqlParseResult<()> {
        match pattern {
            GraphPattern::Slice {
                inner,
                start,
                length,
            } => {
                if *start > 0 {
                    self.options.offset = Some(*start);
                }
                self.options.limit = *length;
                self.modifiers(inner)
            }
            GraphPattern::Project { inner, variables } => {
                let mut bindings = Vec::new();
                let body = self.extensions(inner, &mut bindings)?;
                let (body, order) = match body {
                    GraphPattern::OrderBy { inner, expression } => (inner.as_ref(), Some(expression)),
                    other => (other, None),
                };
                let body = self.extensions(body, &mut bindings)?;

                for variable in variables {
                    let id = self.variable(variable.as_str())?;
                    self.query.project(id)?;
                }
                for (name, value) in bindings {
                    let id = self.variable(&name)?;
                    self.query.bind(id, value)?;
                }

                let clauses = self.clauses(body)?;
                for clause in clauses {
                    self.query.push_clause(clause)?;
                }
                if let Some(order) = order {
                    self.order(order)?;
                }
                Ok(())
            }
            GraphPattern::Distinct { .. } => Err(SparqlParseError::Unsupported("DISTINCT".to_string())),
            GraphPattern::Reduced { .. } => Err(SparqlParseError::Unsupported("REDUCED".to_string())),
            other => Err(unsupported(other)),
        }
    }

    /// Strip `(constant AS ?var)` extensions, collecting the bindings
    fn extensions<'p>(
        &mut self,
        pattern: &'p GraphPattern,
        bindings: &mut Vec<(String, Constant)>,
    ) -> SparqlParseResult<&'p GraphPattern> {
        match pattern {
            GraphPattern::Extend {
                inner,
                variable,
                expression,
            } => {
                let value = match expression {
                    Expression::NamedNode(n) => Constant::Resource(Resource::new(n.as_str())),
                    Expression::Literal(l) => Constant::Literal(convert_literal(l)),
                    _ => {
                        return Err(SparqlParseError::Unsupported(format!(
                            "expression bound to ?{}",
                            variable.as_str()
                        )))
                    }
                };
                let inner = self.extensions(inner, bindings)?;
                bindings.push((variable.as_str().to_string(), value));
                Ok(inner)
            }
            other => Ok(other),
        }
    }

    fn clauses(&mut self, pattern: &GraphPattern) -> SparqlParseResult<Vec<WhereClause>> {
        let mut out = Vec::new();
        self.collect(pattern, &mut out)?;
        Ok(out)
    }

    fn collect(&mut self, pattern: &GraphPattern, out: &mut Vec<WhereClause>) -> SparqlParseResult<()> {
        match pattern {
            GraphPattern::Bgp { patterns } => {
                for triple in patterns {
                    out.push(WhereClause::Pattern(self.triple(triple)?));
                }
                Ok(())
            }
            GraphPattern::Join { left, right } => {
                self.collect(left, out)?;
                self.collect(right, out)
            }
            GraphPattern::Service {
                name: NamedNodePattern::NamedNode(endpoint),
                inner,
                silent: false,
            } => {
                let clauses = self.clauses(inner)?;
                out.push(WhereClause::Service(ServiceBlock::new(endpoint.as_str(), clauses)));
                Ok(())
            }
            other => Err(unsupported(other)),
        }
    }

    fn triple(&mut self, triple: &TriplePattern) -> SparqlParseResult<BasicGraphPattern> {
        let subject = self.term(&triple.subject)?;
        let predicate = match &triple.predicate {
            NamedNodePattern::NamedNode(n) => Term::Resource(Resource::new(n.as_str())),
            NamedNodePattern::Variable(v) => Term::Variable(self.variable(v.as_str())?),
        };
        let object = self.term(&triple.object)?;
        Ok(BasicGraphPattern::new(subject, predicate, object)?)
    }

    fn term(&mut self, term: &TermPattern) -> SparqlParseResult<Term> {
        Ok(match term {
            TermPattern::NamedNode(n) => Term::Resource(Resource::new(n.as_str())),
            TermPattern::BlankNode(b) => Term::Resource(Resource::blank(b.as_str())),
            TermPattern::Literal(l) => Term::Literal(convert_literal(l)),
            TermPattern::Variable(v) => Term::Variable(self.variable(v.as_str())?),
            #[allow(unreachable_patterns)]
            _ => return Err(SparqlParseError::Unsupported("quoted triple".to_string())),
        })
    }

    fn order(&mut self, keys: &[OrderExpression]) -> SparqlParseResult<()> {
        for key in keys {
            let (expression, ascending) = match key {
                OrderExpression::Asc(e) => (e, true),
                OrderExpression::Desc(e) => (e, false),
            };
            let id = match expression {
                Expression::Variable(v) => self
                    .query
                    .variable_id(v.as_str())
                    .ok_or_else(|| ValidationError::OrderExpression(v.as_str().to_string()))?,
                other => return Err(ValidationError::OrderExpression(other.to_string()).into()),
            };
            self.query.push_order(if ascending {
                OrderClause::asc(id)
            } else {
                OrderClause::desc(id)
            })?;
        }
        Ok(())
    }

    fn variable(&mut self, name: &str) -> SparqlParseResult<VarId> {
        let uri = format!("{};var={}", self.query.uri(), name);
        Ok(self.query.intern_variable(Variable::new(uri, name))?)
    }
}

fn convert_literal(literal: &spargebra::term::Literal) -> Literal {
    match literal.language() {
        Some(language) => Literal::lang_tagged(literal.value(), language),
        None => Literal::typed(literal.value(), literal.datatype().as_str()),
    }
}

fn unsupported(pattern: &GraphPattern) -> SparqlParseError {
    let name = match pattern {
        GraphPattern::LeftJoin { .. } => "OPTIONAL",
        GraphPattern::Filter { .. } => "FILTER",
        GraphPattern::Union { .. } => "UNION",
        GraphPattern::Minus { .. } => "MINUS",
        GraphPattern::Graph { .. } => "GRAPH",
        GraphPattern::Values { .. } => "VALUES",
        GraphPattern::Group { .. } => "GROUP BY",
        GraphPattern::Path { .. } => "property path",
        GraphPattern::Extend { .. } => "BIND",
        GraphPattern::Project { .. } => "sub-SELECT",
        GraphPattern::Service { .. } => "SERVICE SILENT or variable SERVICE",
        _ => "graph pattern",
    };
    SparqlParseError::Unsupported(name.to_string())
}
