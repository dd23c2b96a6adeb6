//! IRIs of the vocabularies the query core reads and writes
//!
//! Grouped per namespace as plain string constants so they can be compared
//! directly against `NamedNode::as_str()`.

/// RDF syntax vocabulary
pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
}

/// RDF Schema vocabulary
pub mod rdfs {
    pub const NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const CLASS: &str = "http://www.w3.org/2000/01/rdf-schema#Class";
}

/// XML Schema datatypes
pub mod xsd {
    pub const NS: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
}

/// OWL vocabulary
pub mod owl {
    pub const NS: &str = "http://www.w3.org/2002/07/owl#";
    pub const CLASS: &str = "http://www.w3.org/2002/07/owl#Class";
}

/// SPIN SPARQL syntax vocabulary
pub mod sp {
    pub const NS: &str = "http://spinrdf.org/sp#";
    pub const QUERY: &str = "http://spinrdf.org/sp#Query";
    pub const SELECT: &str = "http://spinrdf.org/sp#Select";
    pub const RESULT_VARIABLES: &str = "http://spinrdf.org/sp#resultVariables";
    pub const WHERE: &str = "http://spinrdf.org/sp#where";
    pub const ORDER_BY: &str = "http://spinrdf.org/sp#orderBy";
    pub const VAR_NAME: &str = "http://spinrdf.org/sp#varName";
    pub const SUBJECT: &str = "http://spinrdf.org/sp#subject";
    pub const PREDICATE: &str = "http://spinrdf.org/sp#predicate";
    pub const OBJECT: &str = "http://spinrdf.org/sp#object";
    pub const EXPRESSION: &str = "http://spinrdf.org/sp#expression";
    pub const TRIPLE_PATTERN: &str = "http://spinrdf.org/sp#TriplePattern";
    pub const DISTINCT: &str = "http://spinrdf.org/sp#distinct";
    pub const REDUCED: &str = "http://spinrdf.org/sp#reduced";
    pub const GROUP_BY: &str = "http://spinrdf.org/sp#groupBy";
    pub const HAVING: &str = "http://spinrdf.org/sp#having";
    pub const LIMIT: &str = "http://spinrdf.org/sp#limit";
    pub const OFFSET: &str = "http://spinrdf.org/sp#offset";
    pub const FROM: &str = "http://spinrdf.org/sp#from";
    pub const FROM_NAMED: &str = "http://spinrdf.org/sp#fromNamed";
    pub const VALUES: &str = "http://spinrdf.org/sp#values";
    pub const ASC: &str = "http://spinrdf.org/sp#Asc";
    pub const DESC: &str = "http://spinrdf.org/sp#Desc";
}

/// SPARQL service description vocabulary
pub mod sd {
    pub const NS: &str = "http://www.w3.org/ns/sparql-service-description#";
    pub const SERVICE: &str = "http://www.w3.org/ns/sparql-service-description#Service";
    pub const ENDPOINT: &str = "http://www.w3.org/ns/sparql-service-description#endpoint";
}
