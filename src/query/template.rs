//! Text templates with `{{placeholder}}` substitution
//!
//! `{{prefixes}}` and `{{where}}` expand to the serializer's PREFIX block and
//! WHERE body for a query; any other name must be supplied by the caller.
//! `{{?name}}` expands to a variable called `name`, suffixed until it does
//! not clash with a variable of the query.

use super::model::Query;
use super::names::unique_name;
use super::node::{Constant, Literal, RenderContext, Resource};
use super::serializer::SparqlSerializer;
use super::{ValidationError, ValidationResult};
use crate::rdf::NamespaceManager;
use regex::Regex;
use std::collections::HashMap;

/// Properties used on a variable of the query
pub const DESCRIBE_VARIABLE_PROPERTIES: &str = "{{prefixes}}SELECT DISTINCT {{?property}}
WHERE {
{{where}}  {{variable}} {{?property}} {{?value}} .
}
";

/// Classes of the values of a variable of the query
pub const DESCRIBE_VARIABLE_CLASSES: &str = "{{prefixes}}SELECT DISTINCT {{?class}}
WHERE {
{{where}}  {{variable}} a {{?class}} .
}
";

const PLACEHOLDER: &str = r"\{\{\s*(\?)?([A-Za-z_][A-Za-z0-9_-]*)\s*\}\}";

/// A value spliced into a template
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    /// Variable of the query, by name
    Variable(String),
    Resource(Resource),
    Literal(Literal),
    /// Inserted verbatim
    Raw(String),
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Placeholder(String),
    /// Variable private to the template
    Fresh(String),
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct QueryTemplate {
    segments: Vec<Segment>,
}

impl QueryTemplate {
    /// Split a template into text and placeholders
    pub fn parse(text: &str) -> ValidationResult<Self> {
        let re = Regex::new(PLACEHOLDER).map_err(|e| ValidationError::Placeholder(e.to_string()))?;
        let mut segments = Vec::new();
        let mut last = 0;
        for caps in re.captures_iter(text) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Text(text[last..whole.start()].to_string()));
            }
            let name = name.as_str().to_string();
            segments.push(if caps.get(1).is_some() {
                Segment::Fresh(name)
            } else {
                Segment::Placeholder(name)
            });
            last = whole.end();
        }
        if last < text.len() {
            segments.push(Segment::Text(text[last..].to_string()));
        }
        Ok(QueryTemplate { segments })
    }

    /// Describe-variable-properties template
    pub fn describe_variable_properties() -> ValidationResult<Self> {
        Self::parse(DESCRIBE_VARIABLE_PROPERTIES)
    }

    /// Describe-variable-classes template
    pub fn describe_variable_classes() -> ValidationResult<Self> {
        Self::parse(DESCRIBE_VARIABLE_CLASSES)
    }

    /// Names of all placeholders, in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Placeholder(name) => Some(name.as_str()),
                Segment::Text(_) | Segment::Fresh(_) => None,
            })
            .collect()
    }

    /// Render the template for a query
    pub fn render(
        &self,
        query: &Query,
        namespaces: &NamespaceManager,
        values: &HashMap<String, TemplateValue>,
    ) -> ValidationResult<String> {
        let serializer = SparqlSerializer::new(namespaces);

        let mut extra = Vec::new();
        for name in self.placeholders() {
            match values.get(name) {
                Some(TemplateValue::Resource(r)) => extra.push(Constant::Resource(r.clone())),
                Some(TemplateValue::Literal(l)) => extra.push(Constant::Literal(l.clone())),
                Some(TemplateValue::Variable(v)) => {
                    let id = query.resolve(v)?;
                    if let Some(bound) = query.var(id).bound_value() {
                        extra.push(bound.clone());
                    }
                }
                _ => {}
            }
        }
        let extra_refs: Vec<&Constant> = extra.iter().collect();

        let mut fresh: HashMap<&str, String> = HashMap::new();
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Fresh(base) => {
                    if !fresh.contains_key(base.as_str()) {
                        let name = unique_name(base, |n| {
                            query.variable(n).is_some() || fresh.values().any(|taken| taken == n)
                        });
                        fresh.insert(base.as_str(), name);
                    }
                    if let Some(name) = fresh.get(base.as_str()) {
                        out.push('?');
                        out.push_str(name);
                    }
                }
                Segment::Placeholder(name) => {
                    let rendered = match (name.as_str(), values.get(name)) {
                        (_, Some(TemplateValue::Variable(v))) => query
                            .var(query.resolve(v)?)
                            .render(RenderContext::Inline, namespaces),
                        (_, Some(TemplateValue::Resource(r))) => r.render(namespaces),
                        (_, Some(TemplateValue::Literal(l))) => l.render(namespaces),
                        (_, Some(TemplateValue::Raw(raw))) => raw.clone(),
                        ("prefixes", None) => serializer.prefix_block(query, &extra_refs),
                        ("where", None) => serializer.where_body(query),
                        (other, None) => return Err(ValidationError::Placeholder(other.to_string())),
                    };
                    out.push_str(&rendered);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::model::BasicGraphPattern;
    use crate::query::node::{Term, Variable};

    fn query() -> (Query, NamespaceManager) {
        let mut ns = NamespaceManager::new();
        ns.add_prefix("ex", "http://example.org/");
        let mut q = Query::new("urn:q");
        let s = q.add_variable(Variable::new("urn:s", "s")).unwrap();
        let o = q.add_variable(Variable::new("urn:o", "o")).unwrap();
        q.push_clause(
            BasicGraphPattern::new(
                s.into(),
                Term::Resource(Resource::new("http://example.org/knows")),
                o.into(),
            )
            .unwrap(),
        )
        .unwrap();
        (q, ns)
    }

    #[test]
    fn test_placeholders() {
        let t = QueryTemplate::parse("{{prefixes}}SELECT {{ col }} WHERE { {{where}} }").unwrap();
        assert_eq!(t.placeholders(), vec!["prefixes", "col", "where"]);
    }

    #[test]
    fn test_describe_properties() {
        let (q, ns) = query();
        let mut values = HashMap::new();
        values.insert("variable".to_string(), TemplateValue::Variable("?o".to_string()));

        let text = QueryTemplate::describe_variable_properties()
            .unwrap()
            .render(&q, &ns, &values)
            .unwrap();
        assert_eq!(
            text,
            "PREFIX ex: <http://example.org/>\n\
SELECT DISTINCT ?property\n\
WHERE {\n\
\x20 ?s ex:knows ?o .\n\
\x20 ?o ?property ?value .\n\
}\n"
        );
    }

    #[test]
    fn test_resource_value_adds_prefix() {
        let (q, ns) = query();
        let mut values = HashMap::new();
        values.insert(
            "variable".to_string(),
            TemplateValue::Resource(Resource::new("http://xmlns.com/foaf/0.1/Person")),
        );
        let text = QueryTemplate::describe_variable_classes()
            .unwrap()
            .render(&q, &ns, &values)
            .unwrap();
        assert!(text.contains("PREFIX foaf: <http://xmlns.com/foaf/0.1/>\n"));
        assert!(text.contains("  foaf:Person a ?class .\n"));
    }

    #[test]
    fn test_template_variables_avoid_query_names() {
        let mut ns = NamespaceManager::new();
        ns.add_prefix("ex", "http://example.org/");
        let mut q = Query::new("urn:q");
        let s = q.add_variable(Variable::new("urn:s", "s")).unwrap();
        let class = q.add_variable(Variable::new("urn:class", "class")).unwrap();
        q.push_clause(
            BasicGraphPattern::new(
                s.into(),
                Term::Resource(Resource::new("http://example.org/kind")),
                class.into(),
            )
            .unwrap(),
        )
        .unwrap();

        let mut values = HashMap::new();
        values.insert("variable".to_string(), TemplateValue::Variable("s".to_string()));
        let text = QueryTemplate::describe_variable_classes()
            .unwrap()
            .render(&q, &ns, &values)
            .unwrap();
        assert!(text.contains("SELECT DISTINCT ?class1\n"));
        assert!(text.contains("  ?s ex:kind ?class .\n  ?s a ?class1 .\n"));
    }

    #[test]
    fn test_fresh_placeholders_are_distinct() {
        let (q, ns) = query();
        let t = QueryTemplate::parse("{{?o}} {{?o1}} {{?o}}").unwrap();
        assert!(t.placeholders().is_empty());
        let text = t.render(&q, &ns, &HashMap::new()).unwrap();
        assert_eq!(text, "?o1 ?o2 ?o1");
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let (q, ns) = query();
        let err = QueryTemplate::describe_variable_classes()
            .unwrap()
            .render(&q, &ns, &HashMap::new())
            .unwrap_err();
        assert_eq!(err, ValidationError::Placeholder("variable".to_string()));
    }

    #[test]
    fn test_unknown_variable_is_an_error() {
        let (q, ns) = query();
        let mut values = HashMap::new();
        values.insert("variable".to_string(), TemplateValue::Variable("nope".to_string()));
        let err = QueryTemplate::describe_variable_classes()
            .unwrap()
            .render(&q, &ns, &values)
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownVariable("nope".to_string()));
    }
}
