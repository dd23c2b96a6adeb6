//! Join algebra
//!
//! Combines two queries into one by unifying a variable from each side.
//! Queries on the same endpoint are merged inline ([`JoinMode::Substitution`]);
//! queries on different endpoints keep the right side's patterns in a
//! `SERVICE` block ([`JoinMode::Service`]).
//!
//! Chained joins of already federated queries only record the active
//! endpoint of each operand, so nested federation is not represented.

use crate::query::{
    unique_name, JoinSource, OrderClause, Query, ServiceBlock, ValidationError, ValidationResult,
    VarId, Variable, WhereClause,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

/// How the right operand's patterns enter the composite query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinMode {
    /// Patterns are appended inline
    Substitution,
    /// Patterns are wrapped in `SERVICE <right endpoint> { ... }`
    Service,
}

impl fmt::Display for JoinMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JoinMode::Substitution => write!(f, "substitution"),
            JoinMode::Service => write!(f, "service"),
        }
    }
}

/// A query and the name of the variable it is joined on
#[derive(Debug, Clone, Copy)]
pub struct JoinOperand<'a> {
    pub query: &'a Query,
    pub variable: &'a str,
}

impl<'a> JoinOperand<'a> {
    pub fn new(query: &'a Query, variable: &'a str) -> Self {
        JoinOperand { query, variable }
    }

    fn variable_id(&self) -> ValidationResult<VarId> {
        self.query.resolve(self.variable).map_err(|_| {
            ValidationError::JoinOperand(format!(
                "{} has no variable {}",
                self.query.uri(),
                self.variable
            ))
        })
    }
}

/// Mode a join actually runs in
///
/// Different endpoints always force [`JoinMode::Service`]. Without a right
/// endpoint there is nothing to federate to, so the patterns are merged.
pub fn effective_mode(left: &Query, right: &Query, requested: JoinMode) -> JoinMode {
    match right.active_endpoint() {
        None => JoinMode::Substitution,
        Some(endpoint) if left.active_endpoint() == Some(endpoint) => requested,
        Some(_) => JoinMode::Service,
    }
}

/// Join two queries on one variable from each side
///
/// Returns the composite query and the mode that was used.
pub fn join(
    left: JoinOperand<'_>,
    right: JoinOperand<'_>,
    requested: JoinMode,
) -> ValidationResult<(Query, JoinMode)> {
    let left_join = left.variable_id()?;
    let right_join = right.variable_id()?;
    let mode = effective_mode(left.query, right.query, requested);

    let mut composite = Query::new(format!("join({},{})", left.query.uri(), right.query.uri()));
    composite.label = Some(format!(
        "{} ⋈ {}",
        left.query.display_label(),
        right.query.display_label()
    ));

    // Left side keeps its names; its join variable becomes the shared one
    let mut left_map = Vec::with_capacity(left.query.variable_count());
    let mut joined = None;
    for (id, variable) in left.query.variables() {
        let copy = if id == left_join {
            let right_var = right.query.var(right_join);
            let mut shared = Variable::joined(
                variable.uri(),
                variable.name(),
                JoinSource::new(left.query.uri(), variable.name()),
                JoinSource::new(right.query.uri(), right_var.name()),
            )
            .with_label(variable.label.clone().or_else(|| right_var.label.clone()))
            .with_comment(variable.comment.clone().or_else(|| right_var.comment.clone()));
            if let Some(value) = variable.bound_value().or(right_var.bound_value()) {
                shared.bind(value.clone());
            }
            shared
        } else {
            variable.clone()
        };
        let new_id = composite.add_variable(copy)?;
        if id == left_join {
            joined = Some(new_id);
        }
        left_map.push(new_id);
    }
    let joined = joined.ok_or_else(|| ValidationError::UnknownVariable(left.variable.to_string()))?;

    // Right side: join variable → shared, same URI → unified, name clash → renamed.
    // The shared variable and left variables already claimed by the right
    // side are never unified again.
    let left_len = composite.variable_count();
    let mut claimed = HashSet::from([joined]);
    let mut right_map = Vec::with_capacity(right.query.variable_count());
    for (id, variable) in right.query.variables() {
        let unified = find_by_uri(&composite, variable.uri(), left_len)
            .filter(|existing| id != right_join && !claimed.contains(existing));
        let new_id = if id == right_join {
            joined
        } else if let Some(existing) = unified {
            claimed.insert(existing);
            existing
        } else {
            let name = unique_name(variable.name(), |n| composite.variable(n).is_some());
            if name != variable.name() {
                debug!(from = variable.name(), to = %name, "Renamed variable to avoid collision");
            }
            let mut copy = variable.clone();
            copy.rename(name);
            composite.add_variable(copy)?
        };
        right_map.push(new_id);
    }

    for id in left.query.projections() {
        composite.project(lookup(&left_map, *id)?)?;
    }
    for id in right.query.projections() {
        let mapped = lookup(&right_map, *id)?;
        if *id == right_join || mapped.index() < left_len {
            continue;
        }
        composite.project(mapped)?;
    }

    let left_fn = |id: VarId| left_map.get(id.index()).copied().unwrap_or(id);
    for clause in left.query.where_clauses() {
        check_clause(clause, &left_map)?;
        composite.push_clause(clause.map_variables(&left_fn))?;
    }

    let right_fn = |id: VarId| right_map.get(id.index()).copied().unwrap_or(id);
    let mut right_clauses = Vec::with_capacity(right.query.where_clauses().len());
    for clause in right.query.where_clauses() {
        check_clause(clause, &right_map)?;
        right_clauses.push(clause.map_variables(&right_fn));
    }
    match mode {
        JoinMode::Substitution => {
            for clause in right_clauses {
                composite.push_clause(clause)?;
            }
        }
        JoinMode::Service => {
            let endpoint = right.query.active_endpoint().ok_or_else(|| {
                ValidationError::JoinOperand(format!("{} has no endpoint", right.query.uri()))
            })?;
            composite.push_clause(ServiceBlock::new(endpoint, right_clauses))?;
        }
    }

    for (source, map) in [(left.query, &left_map), (right.query, &right_map)] {
        for clause in source.order() {
            let variable = map.get(clause.variable.index()).copied().ok_or_else(|| {
                ValidationError::OrderExpression(clause.variable.to_string())
            })?;
            composite.push_order(OrderClause {
                direction: clause.direction,
                variable,
            })?;
        }
    }

    if let Some(endpoint) = left.query.active_endpoint() {
        composite.set_active_endpoint(endpoint);
    }
    if let Some(endpoint) = right.query.active_endpoint() {
        composite.add_endpoint(endpoint);
    }

    debug!(
        left = left.query.uri(),
        right = right.query.uri(),
        %mode,
        variables = composite.variable_count(),
        "Joined queries"
    );
    Ok((composite, mode))
}

fn find_by_uri(query: &Query, uri: &str, limit: usize) -> Option<VarId> {
    query
        .variables()
        .take(limit)
        .find(|(_, v)| v.uri() == uri)
        .map(|(id, _)| id)
}

fn lookup(map: &[VarId], id: VarId) -> ValidationResult<VarId> {
    map.get(id.index())
        .copied()
        .ok_or(ValidationError::UnknownVariableId(id.index()))
}

fn check_clause(clause: &WhereClause, map: &[VarId]) -> ValidationResult<()> {
    match clause {
        WhereClause::Pattern(p) => p.variables().try_for_each(|id| lookup(map, id).map(|_| ())),
        WhereClause::Service(s) => s.clauses.iter().try_for_each(|c| check_clause(c, map)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{
        BasicGraphPattern, Literal, Resource, SerializeOptions, SparqlSerializer, Term,
        VariableKind,
    };
    use crate::rdf::NamespaceManager;

    const FOAF: &str = "http://xmlns.com/foaf/0.1/";

    fn foaf(local: &str) -> Term {
        Term::Resource(Resource::new(format!("{}{}", FOAF, local)))
    }

    /// `SELECT ?person ?id WHERE { ?person foaf:name ?id }` style query
    fn query(uri: &str, endpoint: Option<&str>, vars: &[&str], predicate: &str) -> Query {
        let mut q = Query::new(uri);
        q.label = Some(uri.rsplit('/').next().unwrap_or(uri).to_string());
        let ids: Vec<VarId> = vars
            .iter()
            .map(|name| {
                q.add_variable(Variable::new(format!("{}#{}", uri, name), *name))
                    .unwrap()
            })
            .collect();
        for id in &ids {
            q.project(*id).unwrap();
        }
        q.push_clause(BasicGraphPattern::new(ids[0].into(), foaf(predicate), ids[1].into()).unwrap())
            .unwrap();
        if let Some(e) = endpoint {
            q.set_active_endpoint(e);
        }
        q
    }

    #[test]
    fn test_name_collision_renames() {
        let q1 = query("http://ex.org/q1", Some("http://e1/sparql"), &["person", "id"], "mbox");
        let q2 = query("http://ex.org/q2", Some("http://e1/sparql"), &["agent", "id"], "nick");

        let (joined, mode) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        assert_eq!(mode, JoinMode::Substitution);
        assert_eq!(joined.projected_names(), vec!["person", "id", "id1"]);
        assert_eq!(joined.where_clauses().len(), 2);
        assert_eq!(joined.uri(), "join(http://ex.org/q1,http://ex.org/q2)");
        assert_eq!(joined.label.as_deref(), Some("q1 ⋈ q2"));

        let ns = NamespaceManager::new();
        let body = SparqlSerializer::new(&ns).where_body(&joined);
        assert_eq!(body, "  ?person foaf:mbox ?id ;\n    foaf:nick ?id1 .\n");
    }

    #[test]
    fn test_joined_variable_provenance() {
        let q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let q2 = query("http://ex.org/q2", None, &["agent", "name"], "name");
        let (joined, _) = join(
            JoinOperand::new(&q1, "?person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        let person = joined.variable("person").unwrap();
        assert!(person.is_joined());
        match person.kind() {
            VariableKind::Joined { left, right } => {
                assert_eq!(left, &JoinSource::new("http://ex.org/q1", "person"));
                assert_eq!(right, &JoinSource::new("http://ex.org/q2", "agent"));
            }
            VariableKind::Plain => panic!("expected a joined variable"),
        }
        assert!(joined.variable("agent").is_none());
    }

    #[test]
    fn test_different_endpoints_force_service() {
        let q1 = query("http://ex.org/q1", Some("http://e1/sparql"), &["person", "id"], "mbox");
        let q2 = query("http://ex.org/q2", Some("http://e2/sparql"), &["agent", "name"], "name");

        let (joined, mode) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        assert_eq!(mode, JoinMode::Service);
        let services: Vec<&ServiceBlock> = joined
            .where_clauses()
            .iter()
            .filter_map(|c| match c {
                WhereClause::Service(s) => Some(s),
                WhereClause::Pattern(_) => None,
            })
            .collect();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].endpoint, "http://e2/sparql");
        assert_eq!(services[0].clauses.len(), 1);

        assert_eq!(joined.active_endpoint(), Some("http://e1/sparql"));
        assert_eq!(joined.endpoints().count(), 2);

        let ns = NamespaceManager::new();
        let body = SparqlSerializer::new(&ns).where_body(&joined);
        assert_eq!(
            body,
            "  ?person foaf:mbox ?id .\n  SERVICE <http://e2/sparql> {\n    ?person foaf:name ?name .\n  }\n"
        );
    }

    #[test]
    fn test_same_endpoint_honors_service_request() {
        let q1 = query("http://ex.org/q1", Some("http://e1/sparql"), &["a", "b"], "knows");
        let q2 = query("http://ex.org/q2", Some("http://e1/sparql"), &["c", "d"], "knows");
        assert_eq!(effective_mode(&q1, &q2, JoinMode::Service), JoinMode::Service);
        assert_eq!(
            effective_mode(&q1, &q2, JoinMode::Substitution),
            JoinMode::Substitution
        );

        let q3 = query("http://ex.org/q3", None, &["c", "d"], "knows");
        assert_eq!(effective_mode(&q1, &q3, JoinMode::Service), JoinMode::Substitution);
    }

    #[test]
    fn test_uri_identical_variables_unify() {
        let q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let mut q2 = Query::new("http://ex.org/q2");
        let agent = q2.add_variable(Variable::new("http://ex.org/q2#agent", "agent")).unwrap();
        // Same URI as q1's ?id, under another name
        let shared = q2.add_variable(Variable::new("http://ex.org/q1#id", "ident")).unwrap();
        q2.project(agent).unwrap();
        q2.project(shared).unwrap();
        q2.push_clause(BasicGraphPattern::new(agent.into(), foaf("account"), shared.into()).unwrap())
            .unwrap();

        let (joined, _) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        assert_eq!(joined.variable_count(), 2);
        assert_eq!(joined.projected_names(), vec!["person", "id"]);
        let id = joined.variable_id("id").unwrap();
        assert!(joined.patterns().iter().all(|p| p.object == Term::Variable(id)));
    }

    #[test]
    fn test_join_variable_is_never_unified_by_uri() {
        let q1 = query("http://ex.org/friends", None, &["a", "b"], "knows");
        let q2 = q1.clone();

        let (joined, _) = join(
            JoinOperand::new(&q1, "b"),
            JoinOperand::new(&q2, "a"),
            JoinMode::Substitution,
        )
        .unwrap();

        assert_eq!(joined.projected_names(), vec!["a", "b", "b1"]);
        let ns = NamespaceManager::new();
        let body = SparqlSerializer::new(&ns).where_body(&joined);
        assert_eq!(body, "  ?a foaf:knows ?b .\n  ?b foaf:knows ?b1 .\n");
    }

    #[test]
    fn test_left_variable_is_unified_once() {
        let q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let mut q2 = Query::new("http://ex.org/q2");
        let agent = q2.add_variable(Variable::new("http://ex.org/q2#agent", "agent")).unwrap();
        let first = q2.add_variable(Variable::new("http://ex.org/q1#id", "x")).unwrap();
        let second = q2.add_variable(Variable::new("http://ex.org/q1#id", "y")).unwrap();
        q2.push_clause(BasicGraphPattern::new(agent.into(), foaf("a"), first.into()).unwrap())
            .unwrap();
        q2.push_clause(BasicGraphPattern::new(agent.into(), foaf("b"), second.into()).unwrap())
            .unwrap();

        let (joined, _) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        assert_eq!(joined.variable_count(), 3);
        assert!(joined.variable("x").is_none());
        assert!(joined.variable("y").is_some());
    }

    #[test]
    fn test_order_clauses_are_mapped() {
        let mut q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let mut q2 = query("http://ex.org/q2", None, &["agent", "id"], "nick");
        q1.push_order(OrderClause::asc(q1.variable_id("id").unwrap())).unwrap();
        q2.push_order(OrderClause::desc(q2.variable_id("id").unwrap())).unwrap();

        let (joined, _) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();

        let ns = NamespaceManager::new();
        let text = SparqlSerializer::new(&ns).serialize(&joined, &SerializeOptions::new());
        assert!(text.contains("ORDER BY ASC(?id) DESC(?id1)\n"));
    }

    #[test]
    fn test_bound_values_survive() {
        let q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let mut q2 = query("http://ex.org/q2", None, &["agent", "age"], "age");
        let age = q2.variable_id("age").unwrap();
        q2.bind(age, Literal::simple("x").into()).unwrap();

        let (joined, _) = join(
            JoinOperand::new(&q1, "person"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap();
        assert!(joined.variable("age").unwrap().is_bound());
    }

    #[test]
    fn test_unknown_join_variable() {
        let q1 = query("http://ex.org/q1", None, &["person", "id"], "mbox");
        let q2 = query("http://ex.org/q2", None, &["agent", "id"], "nick");
        let err = join(
            JoinOperand::new(&q1, "nobody"),
            JoinOperand::new(&q2, "agent"),
            JoinMode::Substitution,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::JoinOperand(msg) if msg.contains("nobody")));
    }
}
