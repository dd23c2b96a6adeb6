//! Node model: the terms a query is built from
//!
//! Variables live in the owning query's table and are referenced by
//! [`VarId`]; resources and literals are plain values.

use crate::rdf::vocab::xsd;
use crate::rdf::NamespaceManager;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Index of a variable in its query's variable table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct VarId(pub usize);

impl VarId {
    pub fn new(index: usize) -> Self {
        VarId(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for VarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VarId({})", self.0)
    }
}

/// An IRI, or a blank-node placeholder
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resource {
    uri: String,
    blank: bool,
}

impl Resource {
    /// Create a new resource for an IRI
    pub fn new(uri: impl Into<String>) -> Self {
        Resource {
            uri: uri.into(),
            blank: false,
        }
    }

    /// Create a blank-node placeholder with the given label
    pub fn blank(label: impl Into<String>) -> Self {
        let label = label.into();
        let label = label.strip_prefix("_:").map(str::to_string).unwrap_or(label);
        Resource {
            uri: label,
            blank: true,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn is_blank(&self) -> bool {
        self.blank
    }

    /// Render as a prefixed name when the namespace is known, `<iri>` otherwise
    pub fn render(&self, namespaces: &NamespaceManager) -> String {
        if self.blank {
            return format!("_:{}", self.uri);
        }
        namespaces
            .compact(&self.uri)
            .unwrap_or_else(|| format!("<{}>", self.uri))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.blank {
            write!(f, "_:{}", self.uri)
        } else {
            write!(f, "<{}>", self.uri)
        }
    }
}

/// Datatype or language of a literal; the two never coexist
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Simple,
    Typed(String),
    Language(String),
}

/// An RDF literal value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Literal {
    value: String,
    kind: LiteralKind,
}

impl Literal {
    /// Create a plain string literal
    pub fn simple(value: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            kind: LiteralKind::Simple,
        }
    }

    /// Create a typed literal
    ///
    /// `xsd:string` is folded into a plain literal.
    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        let datatype = datatype.into();
        let kind = if datatype == xsd::STRING {
            LiteralKind::Simple
        } else {
            LiteralKind::Typed(datatype)
        };
        Literal {
            value: value.into(),
            kind,
        }
    }

    /// Create a language-tagged literal
    pub fn lang_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Literal {
            value: value.into(),
            kind: LiteralKind::Language(language.into().to_ascii_lowercase()),
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> &LiteralKind {
        &self.kind
    }

    pub fn datatype(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Typed(dt) => Some(dt),
            _ => None,
        }
    }

    pub fn language(&self) -> Option<&str> {
        match &self.kind {
            LiteralKind::Language(lang) => Some(lang),
            _ => None,
        }
    }

    /// Render in SPARQL syntax
    ///
    /// Numbers and booleans with a valid lexical form are written bare.
    pub fn render(&self, namespaces: &NamespaceManager) -> String {
        if let LiteralKind::Typed(dt) = &self.kind {
            if is_bare_lexical(dt, &self.value) {
                return self.value.clone();
            }
        }

        let quoted = quote(&self.value);
        match &self.kind {
            LiteralKind::Simple => quoted,
            LiteralKind::Language(lang) => format!("{}@{}", quoted, lang),
            LiteralKind::Typed(dt) => {
                format!("{}^^{}", quoted, Resource::new(dt.clone()).render(namespaces))
            }
        }
    }
}

fn quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    if value.contains('\n') {
        format!("\"\"\"{}\"\"\"", escaped)
    } else {
        format!("\"{}\"", escaped.replace('\r', "\\r"))
    }
}

fn is_bare_lexical(datatype: &str, value: &str) -> bool {
    match datatype {
        xsd::INTEGER => is_integer(value),
        xsd::DECIMAL => is_decimal(value),
        xsd::DOUBLE => is_double(value),
        xsd::BOOLEAN => value == "true" || value == "false",
        _ => false,
    }
}

fn unsigned(value: &str) -> &str {
    value
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(value)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_integer(value: &str) -> bool {
    is_digits(unsigned(value))
}

fn is_decimal(value: &str) -> bool {
    match unsigned(value).split_once('.') {
        Some((int, frac)) => (int.is_empty() || is_digits(int)) && is_digits(frac),
        None => false,
    }
}

// SPARQL only parses a bare double when it has an exponent
fn is_double(value: &str) -> bool {
    let Some((mantissa, exponent)) = unsigned(value).split_once(|c: char| c == 'e' || c == 'E') else {
        return false;
    };
    let mantissa_ok = match mantissa.split_once('.') {
        Some((int, frac)) => {
            (is_digits(int) && (frac.is_empty() || is_digits(frac)))
                || (int.is_empty() && is_digits(frac))
        }
        None => is_digits(mantissa),
    };
    mantissa_ok && is_digits(unsigned(exponent))
}

/// A value a variable can be bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Constant {
    Resource(Resource),
    Literal(Literal),
}

impl Constant {
    pub fn render(&self, namespaces: &NamespaceManager) -> String {
        match self {
            Constant::Resource(r) => r.render(namespaces),
            Constant::Literal(l) => l.render(namespaces),
        }
    }
}

impl From<Resource> for Constant {
    fn from(r: Resource) -> Self {
        Constant::Resource(r)
    }
}

impl From<Literal> for Constant {
    fn from(l: Literal) -> Self {
        Constant::Literal(l)
    }
}

/// One side of a join, as recorded on the variable it produced
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JoinSource {
    /// URI of the source query
    pub query: String,
    /// Name of the variable in the source query
    pub variable: String,
}

impl JoinSource {
    pub fn new(query: impl Into<String>, variable: impl Into<String>) -> Self {
        JoinSource {
            query: query.into(),
            variable: variable.into(),
        }
    }
}

/// Where a variable came from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableKind {
    /// Declared directly in a query
    Plain,
    /// Produced by unifying two variables in a join
    Joined { left: JoinSource, right: JoinSource },
}

/// Context a variable is rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    /// The SELECT list
    Projection,
    /// Patterns and ORDER BY
    Inline,
}

/// Separates a variable URI from the instance it belongs to
pub(crate) const INSTANCE_MARKER: &str = ";instance=";

/// A query variable
///
/// Two variables are equal when their URI and name match; the bound
/// value, label and provenance do not take part.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variable {
    uri: String,
    name: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    bound: Option<Constant>,
    kind: VariableKind,
}

impl Variable {
    /// Create a new unbound variable
    pub fn new(uri: impl Into<String>, name: impl Into<String>) -> Self {
        Variable {
            uri: uri.into(),
            name: name.into(),
            label: None,
            comment: None,
            bound: None,
            kind: VariableKind::Plain,
        }
    }

    /// Create a variable that unifies two join inputs
    pub fn joined(
        uri: impl Into<String>,
        name: impl Into<String>,
        left: JoinSource,
        right: JoinSource,
    ) -> Self {
        Variable {
            kind: VariableKind::Joined { left, right },
            ..Variable::new(uri, name)
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Tie the URI to one instance, replacing any earlier instance suffix
    pub(crate) fn scope_to(&mut self, instance: &str) {
        let base = self.uri.split(INSTANCE_MARKER).next().unwrap_or_default();
        self.uri = format!("{}{}{}", base, INSTANCE_MARKER, instance);
    }

    pub fn kind(&self) -> &VariableKind {
        &self.kind
    }

    pub fn is_joined(&self) -> bool {
        matches!(self.kind, VariableKind::Joined { .. })
    }

    pub fn bound_value(&self) -> Option<&Constant> {
        self.bound.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Bind the variable to a value; returns the previous binding
    pub fn bind(&mut self, value: Constant) -> Option<Constant> {
        self.bound.replace(value)
    }

    pub fn unbind(&mut self) -> Option<Constant> {
        self.bound.take()
    }

    /// The `?name` token
    pub fn token(&self) -> String {
        format!("?{}", self.name)
    }

    /// Render the variable, substituting its bound value if any
    pub fn render(&self, context: RenderContext, namespaces: &NamespaceManager) -> String {
        match (&self.bound, context) {
            (None, _) => self.token(),
            (Some(value), RenderContext::Projection) => {
                format!("({} AS {})", value.render(namespaces), self.token())
            }
            (Some(value), RenderContext::Inline) => value.render(namespaces),
        }
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri && self.name == other.name
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.uri.hash(state);
        self.name.hash(state);
    }
}

/// Whether a string is a legal SPARQL variable name
pub fn is_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// A slot of a triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    Variable(VarId),
    Resource(Resource),
    Literal(Literal),
}

impl Term {
    pub fn as_variable(&self) -> Option<VarId> {
        match self {
            Term::Variable(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Term::Literal(_))
    }
}

impl From<VarId> for Term {
    fn from(id: VarId) -> Self {
        Term::Variable(id)
    }
}

impl From<Resource> for Term {
    fn from(r: Resource) -> Self {
        Term::Resource(r)
    }
}

impl From<Literal> for Term {
    fn from(l: Literal) -> Self {
        Term::Literal(l)
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        match c {
            Constant::Resource(r) => Term::Resource(r),
            Constant::Literal(l) => Term::Literal(l),
        }
    }
}

/// Sort direction of an ORDER BY clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Asc => write!(f, "ASC"),
            Direction::Desc => write!(f, "DESC"),
        }
    }
}
