//! RDF collection traversal

use super::{ParseError, ParseResult};
use crate::rdf::vocab::rdf;
use crate::rdf::{RdfObject, RdfPredicate, RdfStore};
use std::collections::HashSet;

/// Collect the members of the RDF list starting at `head`
///
/// Follows `rdf:first`/`rdf:rest` until `rdf:nil`. Fails on cycles, on
/// cells missing either link, and on lists longer than `max_len`.
pub fn collect_list(graph: &RdfStore, head: &RdfObject, max_len: usize) -> ParseResult<Vec<RdfObject>> {
    let first = RdfPredicate::from_static(rdf::FIRST);
    let rest = RdfPredicate::from_static(rdf::REST);

    let mut items = Vec::new();
    let mut visited = HashSet::new();
    let mut current = head.clone();

    loop {
        if current.as_iri() == Some(rdf::NIL) {
            return Ok(items);
        }
        let cell = current
            .as_subject()
            .ok_or_else(|| ParseError::MalformedList(format!("literal {} used as a list cell", current)))?;
        if !visited.insert(cell.clone()) {
            return Err(ParseError::MalformedList(format!("cycle at {}", cell)));
        }
        if items.len() >= max_len {
            return Err(ParseError::MalformedList(format!(
                "more than {} members",
                max_len
            )));
        }

        let member = graph
            .object(&cell, &first)
            .ok_or_else(|| ParseError::MalformedList(format!("{} has no rdf:first", cell)))?;
        let next = graph
            .object(&cell, &rest)
            .ok_or_else(|| ParseError::MalformedList(format!("{} has no rdf:rest", cell)))?;

        items.push(member.clone());
        current = next.clone();
    }
}
