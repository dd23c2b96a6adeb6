//! The query aggregate
//!
//! A [`Query`] owns a name-keyed variable table. Patterns, projections and
//! order clauses refer to table entries by [`VarId`], so two occurrences of
//! the same variable are the same entry. Entries are never removed.

use super::names::unique_name;
use super::node::{is_var_name, Constant, Direction, Term, VarId, Variable, INSTANCE_MARKER};
use super::{ValidationError, ValidationResult};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// A single triple pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BasicGraphPattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl BasicGraphPattern {
    /// Create a new pattern; literals are only allowed as the object
    pub fn new(subject: Term, predicate: Term, object: Term) -> ValidationResult<Self> {
        if subject.is_literal() {
            return Err(ValidationError::LiteralPosition("subject"));
        }
        if predicate.is_literal() {
            return Err(ValidationError::LiteralPosition("predicate"));
        }
        Ok(BasicGraphPattern {
            subject,
            predicate,
            object,
        })
    }

    /// Variables used by the pattern, in slot order
    pub fn variables(&self) -> impl Iterator<Item = VarId> + '_ {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter_map(Term::as_variable)
    }

    fn map_variables(&self, map: impl Fn(VarId) -> VarId) -> Self {
        let remap = |t: &Term| match t {
            Term::Variable(id) => Term::Variable(map(*id)),
            other => other.clone(),
        };
        BasicGraphPattern {
            subject: remap(&self.subject),
            predicate: remap(&self.predicate),
            object: remap(&self.object),
        }
    }
}

/// Patterns evaluated against a remote endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBlock {
    /// Endpoint the block is sent to
    pub endpoint: String,
    /// Wrapped where clauses
    pub clauses: Vec<WhereClause>,
    /// Variables local to the block
    pub variables: Vec<VarId>,
}

impl ServiceBlock {
    pub fn new(endpoint: impl Into<String>, clauses: Vec<WhereClause>) -> Self {
        let mut variables = Vec::new();
        for clause in &clauses {
            clause.collect_variables(&mut variables);
        }
        ServiceBlock {
            endpoint: endpoint.into(),
            clauses,
            variables,
        }
    }
}

/// An entry of the WHERE clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhereClause {
    Pattern(BasicGraphPattern),
    Service(ServiceBlock),
}

impl WhereClause {
    fn collect_variables(&self, out: &mut Vec<VarId>) {
        match self {
            WhereClause::Pattern(p) => {
                for id in p.variables() {
                    if !out.contains(&id) {
                        out.push(id);
                    }
                }
            }
            WhereClause::Service(s) => {
                for clause in &s.clauses {
                    clause.collect_variables(out);
                }
            }
        }
    }

    /// Copy the clause with every variable passed through `map`
    pub(crate) fn map_variables(&self, map: &impl Fn(VarId) -> VarId) -> Self {
        match self {
            WhereClause::Pattern(p) => WhereClause::Pattern(p.map_variables(map)),
            WhereClause::Service(s) => WhereClause::Service(ServiceBlock {
                endpoint: s.endpoint.clone(),
                clauses: s.clauses.iter().map(|c| c.map_variables(map)).collect(),
                variables: s.variables.iter().map(|id| map(*id)).collect(),
            }),
        }
    }
}

impl From<BasicGraphPattern> for WhereClause {
    fn from(p: BasicGraphPattern) -> Self {
        WhereClause::Pattern(p)
    }
}

impl From<ServiceBlock> for WhereClause {
    fn from(s: ServiceBlock) -> Self {
        WhereClause::Service(s)
    }
}

/// An ORDER BY key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderClause {
    pub direction: Direction,
    pub variable: VarId,
}

impl OrderClause {
    pub fn asc(variable: VarId) -> Self {
        OrderClause {
            direction: Direction::Asc,
            variable,
        }
    }

    pub fn desc(variable: VarId) -> Self {
        OrderClause {
            direction: Direction::Desc,
            variable,
        }
    }
}

/// A SPARQL SELECT query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    uri: String,
    pub label: Option<String>,
    pub comment: Option<String>,
    variables: IndexMap<String, Variable>,
    projections: Vec<VarId>,
    where_clauses: Vec<WhereClause>,
    order: Vec<OrderClause>,
    endpoints: IndexSet<String>,
    active_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
}

impl Query {
    /// Create an empty query identified by `uri`
    pub fn new(uri: impl Into<String>) -> Self {
        Query {
            uri: uri.into(),
            label: None,
            comment: None,
            variables: IndexMap::new(),
            projections: Vec::new(),
            where_clauses: Vec::new(),
            order: Vec::new(),
            endpoints: IndexSet::new(),
            active_endpoint: None,
            instance: None,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Instance the variables are scoped to, if any
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Give every variable an identity private to `instance`
    ///
    /// Variables minted afterwards carry the same scope.
    pub fn scope_to_instance(&mut self, instance: &str) {
        for variable in self.variables.values_mut() {
            variable.scope_to(instance);
        }
        self.instance = Some(instance.to_string());
    }

    /// URI for a new variable called `name`
    pub fn variable_uri(&self, name: &str) -> String {
        match &self.instance {
            Some(instance) => format!("{};var={}{}{}", self.uri, name, INSTANCE_MARKER, instance),
            None => format!("{};var={}", self.uri, name),
        }
    }

    /// Label, falling back to the URI
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.uri)
    }

    // ---- variable table ----

    /// All variables in table order
    pub fn variables(&self) -> impl Iterator<Item = (VarId, &Variable)> {
        self.variables.values().enumerate().map(|(i, v)| (VarId(i), v))
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Variable behind an id
    ///
    /// Panics when the id does not come from this query.
    pub fn var(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    pub fn variable_id(&self, name: &str) -> Option<VarId> {
        self.variables.get_index_of(name).map(VarId)
    }

    /// Look up a variable by name, accepting a leading `?`
    pub fn resolve(&self, name: &str) -> ValidationResult<VarId> {
        let name = name.strip_prefix('?').unwrap_or(name);
        self.variable_id(name)
            .ok_or_else(|| ValidationError::UnknownVariable(name.to_string()))
    }

    fn check_id(&self, id: VarId) -> ValidationResult<()> {
        if id.0 < self.variables.len() {
            Ok(())
        } else {
            Err(ValidationError::UnknownVariableId(id.0))
        }
    }

    /// Register a new variable under its own name
    pub fn add_variable(&mut self, variable: Variable) -> ValidationResult<VarId> {
        if !is_var_name(variable.name()) {
            return Err(ValidationError::InvalidVariableName(
                variable.name().to_string(),
            ));
        }
        if self.variables.contains_key(variable.name()) {
            return Err(ValidationError::DuplicateVariable(variable.name().to_string()));
        }
        let (index, _) = self
            .variables
            .insert_full(variable.name().to_string(), variable);
        Ok(VarId(index))
    }

    /// Return the entry named like `variable`, registering it first if absent
    pub fn intern_variable(&mut self, variable: Variable) -> ValidationResult<VarId> {
        match self.variable_id(variable.name()) {
            Some(id) => Ok(id),
            None => self.add_variable(variable),
        }
    }

    /// Mint a variable named after `base`, suffixed until the name is free
    pub fn fresh_variable(&mut self, base: &str) -> ValidationResult<VarId> {
        let base = base.strip_prefix('?').unwrap_or(base);
        if !is_var_name(base) {
            return Err(ValidationError::InvalidVariableName(base.to_string()));
        }
        let name = unique_name(base, |n| self.variables.contains_key(n));
        let uri = self.variable_uri(&name);
        self.add_variable(Variable::new(uri, name))
    }

    /// Bind a variable to a constant; returns the previous binding
    pub fn bind(&mut self, id: VarId, value: Constant) -> ValidationResult<Option<Constant>> {
        self.check_id(id)?;
        Ok(self.variables[id.0].bind(value))
    }

    pub fn unbind(&mut self, id: VarId) -> ValidationResult<Option<Constant>> {
        self.check_id(id)?;
        Ok(self.variables[id.0].unbind())
    }

    // ---- projections ----

    pub fn projections(&self) -> &[VarId] {
        &self.projections
    }

    pub fn projected_variables(&self) -> impl Iterator<Item = &Variable> {
        self.projections.iter().map(|id| self.var(*id))
    }

    pub fn projected_names(&self) -> Vec<&str> {
        self.projected_variables().map(Variable::name).collect()
    }

    pub fn is_projected(&self, id: VarId) -> bool {
        self.projections.contains(&id)
    }

    /// Append a variable to the projection list; returns false if it already was projected
    pub fn project(&mut self, id: VarId) -> ValidationResult<bool> {
        self.check_id(id)?;
        if self.is_projected(id) {
            return Ok(false);
        }
        self.projections.push(id);
        Ok(true)
    }

    /// Remove a variable from the projection list; returns false if it was not projected
    pub fn unproject(&mut self, id: VarId) -> bool {
        let before = self.projections.len();
        self.projections.retain(|p| *p != id);
        before != self.projections.len()
    }

    /// Reorder the projection list by variable name
    ///
    /// `order` must be a permutation of the projected names. On mismatch the
    /// first over- or under-counted name is reported and nothing changes.
    pub fn reorder_projections<S: AsRef<str>>(&mut self, order: &[S]) -> ValidationResult<()> {
        let mut counts: IndexMap<&str, i64> = IndexMap::new();
        for id in &self.projections {
            *counts.entry(self.var(*id).name()).or_insert(0) += 1;
        }
        for name in order {
            let name = name.as_ref();
            let name = name.strip_prefix('?').unwrap_or(name);
            *counts.entry(name).or_insert(0) -= 1;
        }
        if let Some((name, _)) = counts.iter().find(|(_, c)| **c != 0) {
            return Err(ValidationError::ProjectionMismatch(name.to_string()));
        }

        let reordered = order
            .iter()
            .map(|name| self.resolve(name.as_ref()))
            .collect::<ValidationResult<Vec<_>>>()?;
        self.projections = reordered;
        Ok(())
    }

    // ---- where clause ----

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    fn check_clause(&self, clause: &WhereClause) -> ValidationResult<()> {
        let mut ids = Vec::new();
        clause.collect_variables(&mut ids);
        if let WhereClause::Service(s) = clause {
            ids.extend(s.variables.iter().copied());
        }
        ids.into_iter().try_for_each(|id| self.check_id(id))
    }

    /// Append a where-clause entry whose variables belong to this query
    pub fn push_clause(&mut self, clause: impl Into<WhereClause>) -> ValidationResult<()> {
        let clause = clause.into();
        self.check_clause(&clause)?;
        self.where_clauses.push(clause);
        Ok(())
    }

    /// Every triple pattern, including those nested in service blocks
    pub fn patterns(&self) -> Vec<&BasicGraphPattern> {
        fn walk<'a>(clauses: &'a [WhereClause], out: &mut Vec<&'a BasicGraphPattern>) {
            for clause in clauses {
                match clause {
                    WhereClause::Pattern(p) => out.push(p),
                    WhereClause::Service(s) => walk(&s.clauses, out),
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.where_clauses, &mut out);
        out
    }

    // ---- order ----

    pub fn order(&self) -> &[OrderClause] {
        &self.order
    }

    pub fn push_order(&mut self, clause: OrderClause) -> ValidationResult<()> {
        self.check_id(clause.variable)?;
        self.order.push(clause);
        Ok(())
    }

    // ---- endpoints ----

    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(String::as_str)
    }

    pub fn active_endpoint(&self) -> Option<&str> {
        self.active_endpoint.as_deref()
    }

    /// Record a known endpoint without activating it
    pub fn add_endpoint(&mut self, uri: impl Into<String>) {
        self.endpoints.insert(uri.into());
    }

    /// Record an endpoint and make it the active one
    pub fn set_active_endpoint(&mut self, uri: impl Into<String>) {
        let uri = uri.into();
        self.endpoints.insert(uri.clone());
        self.active_endpoint = Some(uri);
    }

    /// Check that every id in the query points into the variable table
    ///
    /// Queries built through this API always pass; deserialized ones may not.
    pub fn validate(&self) -> ValidationResult<()> {
        self.projections.iter().try_for_each(|id| self.check_id(*id))?;
        self.order
            .iter()
            .try_for_each(|o| self.check_id(o.variable))?;
        self.where_clauses
            .iter()
            .try_for_each(|c| self.check_clause(c))?;
        for (name, variable) in &self.variables {
            if name != variable.name() {
                return Err(ValidationError::DuplicateVariable(name.clone()));
            }
        }
        Ok(())
    }
}
