//! RDF/XML format implementation

use super::turtle::convert_triple;
use super::{ParseError, ParseResult};
use crate::rdf::Triple;
use oxiri::Iri;
use rio_api::parser::TriplesParser;
use rio_xml::RdfXmlParser;
use std::io::BufRead;

/// RDF/XML parser
pub struct RdfXmlParserWrapper;

impl RdfXmlParserWrapper {
    /// Parse RDF/XML from a reader into Triples
    pub fn parse<R: BufRead>(reader: R, base_iri: Option<Iri<String>>) -> ParseResult<Vec<Triple>> {
        let mut parser = RdfXmlParser::new(reader, base_iri);
        let mut triples = Vec::new();
        parser.parse_all(&mut |t| -> Result<(), ParseError> {
            triples.push(convert_triple(t)?);
            Ok(())
        })?;
        Ok(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_spin_list() {
        let input = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:sp="http://spinrdf.org/sp#">
  <sp:Select rdf:about="http://example.org/q">
    <sp:resultVariables rdf:parseType="Collection">
      <rdf:Description><sp:varName>s</sp:varName></rdf:Description>
    </sp:resultVariables>
  </sp:Select>
</rdf:RDF>"#;
        let triples = RdfXmlParserWrapper::parse(Cursor::new(input), None).unwrap();
        // type, resultVariables, first, rest, varName
        assert_eq!(triples.len(), 5);
    }

    #[test]
    fn test_language_tagged_literal() {
        let input = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:rdfs="http://www.w3.org/2000/01/rdf-schema#">
  <rdf:Description rdf:about="http://example.org/q">
    <rdfs:label xml:lang="en">People</rdfs:label>
  </rdf:Description>
</rdf:RDF>"#;
        let triples = RdfXmlParserWrapper::parse(Cursor::new(input), None).unwrap();
        assert_eq!(triples.len(), 1);
        match &triples[0].object {
            crate::rdf::RdfObject::Literal(l) => {
                assert_eq!(l.value(), "People");
                assert_eq!(l.language(), Some("en"));
            }
            other => panic!("expected literal, got {}", other),
        }
    }
}
