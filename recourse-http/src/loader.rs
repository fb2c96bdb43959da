//! Chain definitions loaded from TOML or JSON.
//!
//! ```toml
//! [transport]
//! timeout_ms = 5000
//!
//! [[chains]]
//! name = "status"
//!
//! [[chains.nodes]]
//! name = "primary"
//! target = "https://a.example.com/status"
//! json = true
//!
//! [[chains.nodes]]
//! name = "secondary"
//! method = "POST"
//! target = "https://b.example.com/status"
//! body = { probe = true }
//! ```

use recourse_core::{Chain, ChainDirector, Logger, NodeBuilder, Sink};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::{HttpError, HttpTransport, Result, TransportConfig};

/// Supported definition file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(FileFormat::Json),
            "toml" => Some(FileFormat::Toml),
            _ => None,
        }
    }
}

/// Transport settings plus named chain definitions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub transport: TransportConfig,
    pub chains: Vec<ChainSpec>,
}

/// One named chain, listed head first.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainSpec {
    pub name: String,
    pub nodes: Vec<NodeSpec>,
}

/// One node of a chain definition.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default = "default_method")]
    pub method: String,
    pub target: String,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ChainConfig {
    /// Load from a file, picking the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .ok_or_else(|| HttpError::Config(format!("No file extension found: {}", path.display())))?;
        let format = FileFormat::from_extension(ext)
            .ok_or_else(|| HttpError::Config(format!("Unsupported format: {}", ext)))?;

        let content = fs::read_to_string(path)?;
        debug!(path = %path.display(), ?format, "Loading chain definitions");
        Self::from_str_with(&content, format)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::from_str_with(content, FileFormat::Toml)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Self::from_str_with(content, FileFormat::Json)
    }

    fn from_str_with(content: &str, format: FileFormat) -> Result<Self> {
        let config: ChainConfig = match format {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the definitions for structural mistakes.
    pub fn validate(&self) -> Result<()> {
        self.transport.validate()?;

        if self.chains.is_empty() {
            return Err(HttpError::Validation("at least one chain is required".to_string()));
        }

        let mut seen = HashSet::new();
        for chain in &self.chains {
            if chain.name.trim().is_empty() {
                return Err(HttpError::Validation("chain name cannot be empty".to_string()));
            }
            if !seen.insert(chain.name.as_str()) {
                return Err(HttpError::Validation(format!("duplicate chain name '{}'", chain.name)));
            }
            if chain.nodes.is_empty() {
                return Err(HttpError::Validation(format!("chain '{}' has no nodes", chain.name)));
            }
            if chain.nodes.iter().any(|node| node.name.trim().is_empty()) {
                return Err(HttpError::Validation(format!(
                    "chain '{}' has a node without a name",
                    chain.name
                )));
            }
        }
        Ok(())
    }

    /// Look up a chain definition by name.
    pub fn chain(&self, name: &str) -> Option<&ChainSpec> {
        self.chains.iter().find(|chain| chain.name == name)
    }

    /// Build the transport described by the `[transport]` table.
    pub fn transport(&self) -> Result<HttpTransport> {
        HttpTransport::new(self.transport.clone())
    }
}

/// Targets and logger attached to every node of an assembled chain.
#[derive(Clone, Default)]
pub struct Bindings {
    output: Option<Arc<dyn Sink>>,
    error_target: Option<Arc<dyn Sink>>,
    logger: Option<Arc<dyn Logger>>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(mut self, output: impl Sink + 'static) -> Self {
        self.output = Some(Arc::new(output));
        self
    }

    pub fn error_target(mut self, error_target: impl Sink + 'static) -> Self {
        self.error_target = Some(Arc::new(error_target));
        self
    }

    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }
}

impl fmt::Debug for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bindings")
            .field("output", &self.output.is_some())
            .field("error_target", &self.error_target.is_some())
            .field("logger", &self.logger.is_some())
            .finish()
    }
}

impl ChainSpec {
    /// Build the chain through the director, tail first.
    pub fn assemble(&self, bindings: &Bindings) -> Result<Chain> {
        let director = ChainDirector::new();
        let mut chain: Option<Chain> = None;

        for node in self.nodes.iter().rev() {
            let mut builder = NodeBuilder::new(&node.name, &node.method, &node.target).json(node.json);
            if let Some(headers) = &node.headers {
                builder = builder.headers(headers.clone());
            }
            if let Some(body) = &node.body {
                builder = builder.body(body.clone());
            }
            if let Some(output) = &bindings.output {
                builder = builder.shared_output(Arc::clone(output));
            }
            if let Some(error_target) = &bindings.error_target {
                builder = builder.shared_error_target(Arc::clone(error_target));
            }
            if let Some(logger) = &bindings.logger {
                builder = builder.logger(Arc::clone(logger));
            }
            if let Some(fallback) = &chain {
                builder = builder.fallback(fallback);
            }
            chain = Some(director.create(builder)?);
        }

        chain.ok_or_else(|| HttpError::Validation(format!("chain '{}' has no nodes", self.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const DEFINITIONS: &str = r#"
        [transport]
        timeout_ms = 5000

        [[chains]]
        name = "status"

        [[chains.nodes]]
        name = "primary"
        target = "https://a.example.com/status"
        json = true

        [[chains.nodes]]
        name = "secondary"
        method = "POST"
        target = "https://b.example.com/status"
        body = { probe = true }

        [chains.nodes.headers]
        X-Probe = "1"
    "#;

    #[test]
    fn test_parse_toml() {
        let config = ChainConfig::from_toml_str(DEFINITIONS).unwrap();
        assert_eq!(config.transport.timeout, Duration::from_secs(5));

        let spec = config.chain("status").unwrap();
        assert_eq!(spec.nodes.len(), 2);
        assert_eq!(spec.nodes[0].method, "GET");
        assert!(spec.nodes[0].json);
        assert_eq!(spec.nodes[1].method, "POST");
        assert_eq!(spec.nodes[1].body, Some(serde_json::json!({"probe": true})));
        assert_eq!(
            spec.nodes[1].headers.as_ref().and_then(|h| h.get("X-Probe")).map(String::as_str),
            Some("1")
        );
    }

    #[test]
    fn test_assemble_keeps_order() {
        let config = ChainConfig::from_toml_str(DEFINITIONS).unwrap();
        let chain = config.chain("status").unwrap().assemble(&Bindings::new()).unwrap();
        assert_eq!(chain.names(), vec!["primary", "secondary"]);
    }

    #[test]
    fn test_parse_json() {
        let config = ChainConfig::from_json_str(
            r#"{"chains": [{"name": "one", "nodes": [{"name": "only", "target": "http://x.test/"}]}]}"#,
        )
        .unwrap();
        assert_eq!(config.chains[0].nodes[0].method, "GET");
        assert_eq!(config.transport.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_validation() {
        assert!(matches!(ChainConfig::from_toml_str(""), Err(HttpError::Validation(_))));

        let empty_chain = r#"
            [[chains]]
            name = "empty"
            nodes = []
        "#;
        assert!(matches!(ChainConfig::from_toml_str(empty_chain), Err(HttpError::Validation(_))));

        let duplicate = r#"{"chains": [
            {"name": "a", "nodes": [{"name": "n", "target": "http://x.test/"}]},
            {"name": "a", "nodes": [{"name": "n", "target": "http://x.test/"}]}
        ]}"#;
        assert!(matches!(ChainConfig::from_json_str(duplicate), Err(HttpError::Validation(_))));

        let nameless = r#"{"chains": [{"name": "a", "nodes": [{"name": " ", "target": "http://x.test/"}]}]}"#;
        assert!(matches!(ChainConfig::from_json_str(nameless), Err(HttpError::Validation(_))));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(FileFormat::from_extension("TOML").is_some());
        assert!(matches!(ChainConfig::from_file("chains.yaml"), Err(HttpError::Config(_))));
    }
}
