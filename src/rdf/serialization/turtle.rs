//! Turtle format implementation

use super::{ParseError, ParseResult, SerializeError, SerializeResult};
use crate::rdf::vocab::xsd;
use crate::rdf::{BlankNode, Literal, NamedNode, RdfObject, RdfPredicate, RdfSubject, Triple};
use oxiri::Iri;
use rio_api::formatter::TriplesFormatter;
use rio_api::model;
use rio_api::parser::TriplesParser;
use rio_turtle::{TurtleFormatter, TurtleParser};
use std::io::BufRead;

/// Turtle parser
pub struct TurtleParserWrapper;

impl TurtleParserWrapper {
    /// Parse Turtle from a reader into Triples
    pub fn parse<R: BufRead>(reader: R, base_iri: Option<Iri<String>>) -> ParseResult<Vec<Triple>> {
        let mut parser = TurtleParser::new(reader, base_iri);
        let mut triples = Vec::new();
        parser.parse_all(&mut |t| -> Result<(), ParseError> {
            triples.push(convert_triple(t)?);
            Ok(())
        })?;
        Ok(triples)
    }
}

/// Turtle serializer
pub struct TurtleSerializerWrapper;

impl TurtleSerializerWrapper {
    /// Serialize Triples to Turtle string
    pub fn serialize(triples: &[Triple]) -> SerializeResult<String> {
        let mut output = Vec::new();
        let mut formatter = TurtleFormatter::new(&mut output);

        for triple in triples {
            let subject = match &triple.subject {
                RdfSubject::NamedNode(n) => model::Subject::NamedNode(model::NamedNode { iri: n.as_str() }),
                RdfSubject::BlankNode(b) => model::Subject::BlankNode(model::BlankNode { id: b.as_str() }),
            };

            let predicate = model::NamedNode { iri: triple.predicate.as_str() };

            let object = match &triple.object {
                RdfObject::NamedNode(n) => model::Term::NamedNode(model::NamedNode { iri: n.as_str() }),
                RdfObject::BlankNode(b) => model::Term::BlankNode(model::BlankNode { id: b.as_str() }),
                RdfObject::Literal(l) => model::Term::Literal(match l.language() {
                    Some(language) => model::Literal::LanguageTaggedString {
                        value: l.value(),
                        language,
                    },
                    None if l.datatype() == xsd::STRING => model::Literal::Simple { value: l.value() },
                    None => model::Literal::Typed {
                        value: l.value(),
                        datatype: model::NamedNode { iri: l.datatype() },
                    },
                }),
            };

            formatter
                .format(&model::Triple {
                    subject,
                    predicate,
                    object,
                })
                .map_err(|e| SerializeError::Serialize(e.to_string()))?;
        }

        formatter
            .finish()
            .map_err(|e| SerializeError::Serialize(e.to_string()))?;

        String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}

pub(super) fn convert_triple(t: model::Triple<'_>) -> Result<Triple, ParseError> {
    Ok(Triple::new(
        convert_subject(t.subject)?,
        convert_predicate(t.predicate)?,
        convert_object(t.object)?,
    ))
}

fn convert_subject(s: model::Subject<'_>) -> Result<RdfSubject, ParseError> {
    match s {
        model::Subject::NamedNode(n) => Ok(RdfSubject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Subject::BlankNode(b) => Ok(RdfSubject::BlankNode(
            BlankNode::from_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        #[allow(unreachable_patterns)]
        _ => Err(ParseError::Parse("Unsupported subject type".to_string())),
    }
}

fn convert_predicate(p: model::NamedNode<'_>) -> Result<RdfPredicate, ParseError> {
    RdfPredicate::new(p.iri).map_err(|e| ParseError::Parse(e.to_string()))
}

fn convert_object(o: model::Term<'_>) -> Result<RdfObject, ParseError> {
    match o {
        model::Term::NamedNode(n) => Ok(RdfObject::NamedNode(
            NamedNode::new(n.iri).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Term::BlankNode(b) => Ok(RdfObject::BlankNode(
            BlankNode::from_id(b.id).map_err(|e| ParseError::Parse(e.to_string()))?,
        )),
        model::Term::Literal(l) => match l {
            model::Literal::Simple { value } => {
                Ok(RdfObject::Literal(Literal::new_simple_literal(value)))
            }
            model::Literal::LanguageTaggedString { value, language } => Ok(RdfObject::Literal(
                Literal::new_language_tagged_literal(value, language)
                    .map_err(|e| ParseError::Parse(e.to_string()))?,
            )),
            model::Literal::Typed { value, datatype } => {
                let dt = NamedNode::new(datatype.iri).map_err(|e| ParseError::Parse(e.to_string()))?;
                Ok(RdfObject::Literal(Literal::new_typed_literal(value, dt)))
            }
        },
        #[allow(unreachable_patterns)]
        _ => Err(ParseError::Parse("Unsupported object type".to_string())),
    }
}
