//! Query canvas: the registry of working query instances
//!
//! The canvas hands out ids for queries cloned from the catalogs, applies
//! edits to them and joins them. Every operation validates before it
//! mutates, so a failed call leaves the instance untouched.

mod event;
mod id;

use crate::catalog::{ConceptList, EndpointCatalog, QueryCatalog};
use crate::join::{self, JoinMode, JoinOperand};
use crate::query::{
    BasicGraphPattern, Constant, Literal, Query, QueryTemplate, Resource, SerializeOptions,
    SparqlSerializer, TemplateValue, Term, ValidationError, VarId, Variable,
};
use crate::rdf::vocab::rdf;
use crate::rdf::{NamespaceManager, PrefixError};
use indexmap::IndexMap;
use oxiri::Iri;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};

pub use event::CanvasEvent;
pub use id::{source_hash, InstanceId};

/// Canvas errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    #[error("No query instance with id {0}")]
    UnknownInstance(String),

    #[error("Malformed instance id: {0}")]
    InvalidId(String),

    #[error("Not a known query or concept: {0}")]
    UnknownSource(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Prefix(#[from] PrefixError),
}

pub type CanvasResult<T> = Result<T, CanvasError>;

/// A pattern slot as typed by a user
///
/// `?name` is a variable, `"text"` a plain literal, anything else an IRI
/// (`<...>` or bare) or a prefixed name.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeArg {
    Variable(String),
    Resource(String),
    Literal(Literal),
}

impl NodeArg {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(name) = text.strip_prefix('?') {
            return NodeArg::Variable(name.to_string());
        }
        if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
            return NodeArg::Literal(Literal::simple(&text[1..text.len() - 1]));
        }
        NodeArg::Resource(text.to_string())
    }
}

impl From<&str> for NodeArg {
    fn from(text: &str) -> Self {
        NodeArg::parse(text)
    }
}

impl From<Literal> for NodeArg {
    fn from(literal: Literal) -> Self {
        NodeArg::Literal(literal)
    }
}

/// A slot resolved against a query, before anything is registered
enum Slot {
    Existing(VarId),
    New(String),
    Fixed(Term),
}

/// Registry of query instances, with the catalogs they come from
pub struct QueryCanvas {
    namespaces: NamespaceManager,
    queries: QueryCatalog,
    endpoints: EndpointCatalog,
    concepts: ConceptList,
    instances: IndexMap<String, Vec<Option<Query>>>,
    event_sender: Option<UnboundedSender<CanvasEvent>>,
}

impl QueryCanvas {
    /// Create an empty canvas with the default prefixes
    pub fn new() -> Self {
        Self::with_catalogs(
            NamespaceManager::new(),
            QueryCatalog::new(),
            EndpointCatalog::new(),
            ConceptList::new(),
        )
    }

    /// Create a canvas over existing catalogs
    pub fn with_catalogs(
        namespaces: NamespaceManager,
        queries: QueryCatalog,
        endpoints: EndpointCatalog,
        concepts: ConceptList,
    ) -> Self {
        QueryCanvas {
            namespaces,
            queries,
            endpoints,
            concepts,
            instances: IndexMap::new(),
            event_sender: None,
        }
    }

    /// Attach an event channel; returns the receiving end
    pub fn with_events(mut self) -> (Self, UnboundedReceiver<CanvasEvent>) {
        let (tx, rx) = unbounded_channel();
        self.event_sender = Some(tx);
        (self, rx)
    }

    fn emit(&self, event: CanvasEvent) {
        if let Some(sender) = &self.event_sender {
            let _ = sender.send(event);
        }
    }

    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn namespaces_mut(&mut self) -> &mut NamespaceManager {
        &mut self.namespaces
    }

    pub fn queries(&self) -> &QueryCatalog {
        &self.queries
    }

    pub fn queries_mut(&mut self) -> &mut QueryCatalog {
        &mut self.queries
    }

    pub fn endpoints(&self) -> &EndpointCatalog {
        &self.endpoints
    }

    pub fn endpoints_mut(&mut self) -> &mut EndpointCatalog {
        &mut self.endpoints
    }

    pub fn concepts(&self) -> &ConceptList {
        &self.concepts
    }

    pub fn concepts_mut(&mut self) -> &mut ConceptList {
        &mut self.concepts
    }

    // ---- instances ----

    /// Store a query under the next id of its source's bucket
    ///
    /// The query's variables are scoped to the new id, so two instances of
    /// one source never share variable identity.
    pub fn insert(&mut self, source_uri: &str, mut query: Query) -> String {
        let hash = source_hash(source_uri);
        let bucket = self.instances.entry(hash.clone()).or_default();
        let id = InstanceId::new(hash, bucket.len()).to_string();
        query.scope_to_instance(&id);
        bucket.push(Some(query));
        self.emit(CanvasEvent::Instantiated {
            id: id.clone(),
            source: source_uri.to_string(),
        });
        id
    }

    /// Clone a catalog query or a concept template into a new instance
    ///
    /// Concepts take precedence over catalog queries with the same URI.
    pub fn instantiate(&mut self, source_uri: &str, endpoint_hint: Option<&str>) -> CanvasResult<String> {
        let mut query = if let Some(concept) = self.concepts.get(source_uri) {
            concept.template()?
        } else if let Some(query) = self.queries.get(source_uri) {
            query.clone()
        } else {
            return Err(CanvasError::UnknownSource(source_uri.to_string()));
        };
        if let Some(endpoint) = endpoint_hint {
            query.set_active_endpoint(endpoint);
        }

        let id = self.insert(source_uri, query);
        info!(id = %id, source = source_uri, "Instantiated query");
        Ok(id)
    }

    /// Tombstone an instance; other ids stay valid
    pub fn destroy(&mut self, id: &str) -> CanvasResult<Query> {
        let query = self.slot_mut(id)?.take().ok_or_else(|| CanvasError::UnknownInstance(id.to_string()))?;
        debug!(id, "Destroyed query instance");
        self.emit(CanvasEvent::Destroyed { id: id.to_string() });
        Ok(query)
    }

    fn slot_mut(&mut self, id: &str) -> CanvasResult<&mut Option<Query>> {
        let parsed: InstanceId = id.parse()?;
        self.instances
            .get_mut(parsed.hash())
            .and_then(|bucket| bucket.get_mut(parsed.slot()))
            .ok_or_else(|| CanvasError::UnknownInstance(id.to_string()))
    }

    pub fn get(&self, id: &str) -> CanvasResult<&Query> {
        let parsed: InstanceId = id.parse()?;
        self.instances
            .get(parsed.hash())
            .and_then(|bucket| bucket.get(parsed.slot()))
            .and_then(Option::as_ref)
            .ok_or_else(|| CanvasError::UnknownInstance(id.to_string()))
    }

    fn get_mut(&mut self, id: &str) -> CanvasResult<&mut Query> {
        self.slot_mut(id)?
            .as_mut()
            .ok_or_else(|| CanvasError::UnknownInstance(id.to_string()))
    }

    /// Ids of all live instances
    pub fn ids(&self) -> Vec<String> {
        self.instances
            .iter()
            .flat_map(|(hash, bucket)| {
                bucket
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| slot.is_some())
                    .map(move |(slot, _)| InstanceId::new(hash.clone(), slot).to_string())
            })
            .collect()
    }

    // ---- edits ----

    /// Register a new, unprojected variable named after `base_name`
    pub fn add_variable(&mut self, id: &str, base_name: &str) -> CanvasResult<String> {
        let query = self.get_mut(id)?;
        let var = query.fresh_variable(base_name)?;
        let name = query.var(var).name().to_string();
        self.emit(CanvasEvent::VariableAdded {
            id: id.to_string(),
            variable: name.clone(),
        });
        Ok(name)
    }

    /// Add a variable to, or remove it from, the projection list
    pub fn project(&mut self, id: &str, variable: &str, is_projected: bool) -> CanvasResult<()> {
        let query = self.get_mut(id)?;
        let var = query.resolve(variable)?;
        let changed = if is_projected {
            query.project(var)?
        } else {
            query.unproject(var)
        };
        if changed {
            let projections = projected_names(query);
            self.emit(CanvasEvent::ProjectionChanged {
                id: id.to_string(),
                projections,
            });
        }
        Ok(())
    }

    /// Append a triple pattern
    ///
    /// Variables named in the arguments are registered if they are new.
    pub fn add_where_clause(
        &mut self,
        id: &str,
        subject: impl Into<NodeArg>,
        predicate: impl Into<NodeArg>,
        object: impl Into<NodeArg>,
    ) -> CanvasResult<()> {
        let subject = subject.into();
        let predicate = match predicate.into() {
            NodeArg::Resource(text) if text == "a" => NodeArg::Resource(rdf::TYPE.to_string()),
            other => other,
        };
        let object = object.into();

        if matches!(subject, NodeArg::Literal(_)) {
            return Err(ValidationError::LiteralPosition("subject").into());
        }
        if matches!(predicate, NodeArg::Literal(_)) {
            return Err(ValidationError::LiteralPosition("predicate").into());
        }

        let query = self.get(id)?;
        let [s, p, o] = [
            resolve_slot(query, &self.namespaces, subject)?,
            resolve_slot(query, &self.namespaces, predicate)?,
            resolve_slot(query, &self.namespaces, object)?,
        ];

        let query = self.get_mut(id)?;
        let s = realize_slot(query, s)?;
        let p = realize_slot(query, p)?;
        let o = realize_slot(query, o)?;
        query.push_clause(BasicGraphPattern::new(s, p, o)?)?;

        self.emit(CanvasEvent::PatternAdded { id: id.to_string() });
        Ok(())
    }

    /// Reorder the projection list by name
    pub fn reorder_projections<S: AsRef<str>>(&mut self, id: &str, order: &[S]) -> CanvasResult<()> {
        let query = self.get_mut(id)?;
        query.reorder_projections(order)?;
        let projections = projected_names(query);
        self.emit(CanvasEvent::ProjectionChanged {
            id: id.to_string(),
            projections,
        });
        Ok(())
    }

    /// Bind a variable to a resource or literal
    pub fn substitute(&mut self, id: &str, variable: &str, value: impl Into<Constant>) -> CanvasResult<()> {
        let value = value.into();
        let query = self.get_mut(id)?;
        let var = query.resolve(variable)?;
        query.bind(var, value.clone())?;
        let name = query.var(var).name().to_string();
        self.emit(CanvasEvent::VariableBound {
            id: id.to_string(),
            variable: name,
            value: Some(value),
        });
        Ok(())
    }

    /// Remove a variable's binding
    pub fn clear_substitution(&mut self, id: &str, variable: &str) -> CanvasResult<Option<Constant>> {
        let query = self.get_mut(id)?;
        let var = query.resolve(variable)?;
        let previous = query.unbind(var)?;
        let name = query.var(var).name().to_string();
        self.emit(CanvasEvent::VariableBound {
            id: id.to_string(),
            variable: name,
            value: None,
        });
        Ok(previous)
    }

    /// Join two instances on one variable each
    ///
    /// The composite gets a new id. Both operands are tombstoned: the left
    /// one continues as the composite, the right one is absorbed.
    pub fn join(
        &mut self,
        left: (&str, &str),
        right: (&str, &str),
        mode: JoinMode,
    ) -> CanvasResult<String> {
        let (left_id, left_var) = left;
        let (right_id, right_var) = right;
        if left_id == right_id {
            return Err(ValidationError::JoinOperand(format!(
                "cannot join instance {} with itself",
                left_id
            ))
            .into());
        }

        let (composite, effective) = join::join(
            JoinOperand::new(self.get(left_id)?, left_var),
            JoinOperand::new(self.get(right_id)?, right_var),
            mode,
        )?;

        let source = composite.uri().to_string();
        *self.slot_mut(left_id)? = None;
        *self.slot_mut(right_id)? = None;
        let new_id = self.insert(&source, composite);

        info!(left = left_id, right = right_id, new_id = %new_id, mode = %effective, "Joined instances");
        self.emit(CanvasEvent::Joined {
            old_id: left_id.to_string(),
            new_id: new_id.clone(),
            removed_id: right_id.to_string(),
        });
        Ok(new_id)
    }

    // ---- output ----

    /// SPARQL text of an instance
    pub fn serialize(&self, id: &str, options: &SerializeOptions) -> CanvasResult<String> {
        let query = self.get(id)?;
        Ok(SparqlSerializer::new(&self.namespaces).serialize(query, options))
    }

    /// Render a template against an instance
    pub fn render_template(
        &self,
        id: &str,
        template: &QueryTemplate,
        values: &HashMap<String, TemplateValue>,
    ) -> CanvasResult<String> {
        let query = self.get(id)?;
        Ok(template.render(query, &self.namespaces, values)?)
    }
}

impl Default for QueryCanvas {
    fn default() -> Self {
        Self::new()
    }
}

fn projected_names(query: &Query) -> Vec<String> {
    query.projected_names().into_iter().map(str::to_string).collect()
}

fn resolve_slot(query: &Query, namespaces: &NamespaceManager, arg: NodeArg) -> CanvasResult<Slot> {
    Ok(match arg {
        NodeArg::Variable(name) => match query.variable_id(&name) {
            Some(var) => Slot::Existing(var),
            None if crate::query::is_var_name(&name) => Slot::New(name),
            None => return Err(ValidationError::InvalidVariableName(name).into()),
        },
        NodeArg::Literal(literal) => Slot::Fixed(Term::Literal(literal)),
        NodeArg::Resource(text) => Slot::Fixed(Term::Resource(resolve_iri(namespaces, &text)?)),
    })
}

fn realize_slot(query: &mut Query, slot: Slot) -> CanvasResult<Term> {
    Ok(match slot {
        Slot::Existing(var) => Term::Variable(var),
        Slot::New(name) => match query.variable_id(&name) {
            Some(var) => Term::Variable(var),
            None => {
                let uri = query.variable_uri(&name);
                Term::Variable(query.add_variable(Variable::new(uri, name))?)
            }
        },
        Slot::Fixed(term) => term,
    })
}

fn resolve_iri(namespaces: &NamespaceManager, text: &str) -> CanvasResult<Resource> {
    let iri = match text.strip_prefix('<').and_then(|t| t.strip_suffix('>')) {
        Some(full) => full.to_string(),
        None if text.contains("://") || text.starts_with("urn:") => text.to_string(),
        None => namespaces.expand(text)?,
    };
    Iri::parse(iri.as_str()).map_err(|e| ValidationError::InvalidIri(format!("{}: {}", iri, e)))?;
    Ok(Resource::new(iri))
}
