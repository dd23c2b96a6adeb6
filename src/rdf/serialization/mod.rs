//! RDF serialization formats
//!
//! Supports reading:
//! - Turtle (TTL)
//! - RDF/XML
//!
//! and writing Turtle, which is enough to move SPIN descriptions in and out
//! of the query catalog.

mod turtle;
mod xml;

use super::Triple;
use oxiri::Iri;
use std::io::{BufReader, Cursor};
use std::path::Path;
use thiserror::Error;

pub use turtle::{TurtleParserWrapper, TurtleSerializerWrapper};
pub use xml::RdfXmlParserWrapper;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// RDF/XML format (.rdf)
    RdfXml,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ttl" | "turtle" | "n3" | "nt" => Some(RdfFormat::Turtle),
            "rdf" | "xml" | "owl" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }

    /// Guess the format from an HTTP content type
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next()?.trim();
        match essence {
            "text/turtle" | "application/x-turtle" | "application/n-triples" => {
                Some(RdfFormat::Turtle)
            }
            "application/rdf+xml" | "application/xml" | "text/xml" => Some(RdfFormat::RdfXml),
            _ => None,
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Turtle syntax error
    #[error("Turtle error: {0}")]
    Turtle(#[from] rio_turtle::TurtleError),

    /// RDF/XML syntax error
    #[error("RDF/XML error: {0}")]
    RdfXml(#[from] rio_xml::RdfXmlError),

    /// Term that cannot be represented
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid base IRI
    #[error("Invalid base IRI: {0}")]
    BaseIri(String),

    /// Unknown file format
    #[error("Cannot determine RDF format of {0}")]
    UnknownFormat(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a string
    pub fn parse(input: &str, format: RdfFormat, base_iri: Option<&str>) -> ParseResult<Vec<Triple>> {
        let base = base_iri
            .map(|b| Iri::parse(b.to_string()).map_err(|e| ParseError::BaseIri(e.to_string())))
            .transpose()?;
        let reader = BufReader::new(Cursor::new(input.as_bytes()));
        match format {
            RdfFormat::Turtle => TurtleParserWrapper::parse(reader, base),
            RdfFormat::RdfXml => RdfXmlParserWrapper::parse(reader, base),
        }
    }

    /// Parse RDF data from a file, guessing the format from its extension
    pub fn parse_file(path: &Path) -> ParseResult<Vec<Triple>> {
        let format = RdfFormat::from_extension(path)
            .ok_or_else(|| ParseError::UnknownFormat(path.display().to_string()))?;
        let input = std::fs::read_to_string(path)?;
        Self::parse(&input, format, None)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize triples to a Turtle string
    pub fn to_turtle(triples: &[Triple]) -> SerializeResult<String> {
        TurtleSerializerWrapper::serialize(triples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(
            RdfFormat::from_extension(Path::new("q.ttl")),
            Some(RdfFormat::Turtle)
        );
        assert_eq!(
            RdfFormat::from_extension(Path::new("q.rdf")),
            Some(RdfFormat::RdfXml)
        );
        assert_eq!(RdfFormat::from_extension(Path::new("q.json")), None);
        assert_eq!(
            RdfFormat::from_media_type("text/turtle; charset=utf-8"),
            Some(RdfFormat::Turtle)
        );
    }

    #[test]
    fn test_parse_dispatch() {
        let turtle = r#"<http://example.org/a> <http://example.org/b> "c" ."#;
        assert_eq!(RdfParser::parse(turtle, RdfFormat::Turtle, None).unwrap().len(), 1);

        let xml = r#"<?xml version="1.0"?>
<rdf:RDF xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:ex="http://example.org/">
  <rdf:Description rdf:about="http://example.org/a">
    <ex:b>c</ex:b>
  </rdf:Description>
</rdf:RDF>"#;
        assert_eq!(RdfParser::parse(xml, RdfFormat::RdfXml, None).unwrap().len(), 1);
    }

    #[test]
    fn test_relative_iris_need_base() {
        let turtle = r#"<a> <http://example.org/b> "c" ."#;
        let triples =
            RdfParser::parse(turtle, RdfFormat::Turtle, Some("http://example.org/")).unwrap();
        assert_eq!(triples[0].subject.as_str(), "http://example.org/a");
        assert!(RdfParser::parse(turtle, RdfFormat::Turtle, Some("not a base")).is_err());
    }
}
