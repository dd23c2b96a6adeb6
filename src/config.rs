//! Canvas configuration
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid configuration:
//!
//! ```yaml
//! prefixes:
//!   ex: http://example.org/
//! endpoints:
//!   - uri: http://dbpedia.org/sparql
//!     label: DBpedia
//! default_limit: 100
//! max_list_len: 10000
//! http_timeout_secs: 30
//! log_level: info
//! ```

use crate::canvas::QueryCanvas;
use crate::catalog::{CatalogError, ConceptList, EndpointCatalog, EndpointInfo, QueryCatalog};
use crate::query::SerializeOptions;
use crate::rdf::NamespaceManager;
use crate::spin::{ImportOptions, SpinImporter, DEFAULT_MAX_LIST_LEN};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Canvas configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Prefixes added on top of the built-in table
    pub prefixes: IndexMap<String, String>,
    /// Known endpoints
    pub endpoints: Vec<EndpointInfo>,
    /// LIMIT applied when a caller gives none (None = no limit)
    pub default_limit: Option<usize>,
    /// Longest RDF list the SPIN importer accepts
    pub max_list_len: usize,
    /// Endpoint request timeout
    pub http_timeout_secs: u64,
    /// tracing filter level
    pub log_level: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            prefixes: IndexMap::new(),
            endpoints: Vec::new(),
            default_limit: None,
            max_list_len: DEFAULT_MAX_LIST_LEN,
            http_timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl CanvasConfig {
    /// Parse a YAML document
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Serialize options carrying the default limit
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            offset: None,
            limit: self.default_limit,
        }
    }

    pub fn importer(&self) -> SpinImporter {
        SpinImporter::new(ImportOptions {
            max_list_len: self.max_list_len,
        })
    }

    /// Built-in prefixes plus the configured ones
    pub fn namespaces(&self) -> NamespaceManager {
        let mut namespaces = NamespaceManager::new();
        for (prefix, iri) in &self.prefixes {
            namespaces.add_prefix(prefix, iri);
        }
        namespaces
    }

    /// A canvas over the configured prefixes and endpoints
    pub fn build_canvas(&self) -> ConfigResult<QueryCanvas> {
        let mut endpoints = EndpointCatalog::new();
        for info in &self.endpoints {
            endpoints.add(info.clone())?;
        }
        Ok(QueryCanvas::with_catalogs(
            self.namespaces(),
            QueryCatalog::new(),
            endpoints,
            ConceptList::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CanvasConfig::from_yaml_str("").unwrap();
        assert_eq!(config, CanvasConfig::default());
        assert_eq!(config.max_list_len, DEFAULT_MAX_LIST_LEN);
        assert_eq!(config.serialize_options(), SerializeOptions::new());
    }

    #[test]
    fn test_partial_document() {
        let config = CanvasConfig::from_yaml_str(
            "prefixes:\n  ex: http://example.org/\ndefault_limit: 50\n",
        )
        .unwrap();
        assert_eq!(config.default_limit, Some(50));
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.namespaces().get_iri("ex").unwrap(), "http://example.org/");
        assert_eq!(config.namespaces().get_iri("rdfs").unwrap(), "http://www.w3.org/2000/01/rdf-schema#");
    }

    #[test]
    fn test_duplicate_endpoint_rejected() {
        let config = CanvasConfig::from_yaml_str(
            "endpoints:\n  - uri: http://a/sparql\n    label: A\n  - uri: http://a/sparql\n    label: B\n",
        )
        .unwrap();
        assert!(matches!(
            config.build_canvas(),
            Err(ConfigError::Catalog(CatalogError::Duplicate(_)))
        ));
    }

    #[test]
    fn test_bad_yaml() {
        assert!(matches!(
            CanvasConfig::from_yaml_str("max_list_len: [1"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
