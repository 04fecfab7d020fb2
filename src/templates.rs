//! Device template catalog.
//!
//! This file provides the endpoint loader used at node-creation time:
//! each device category declares a default icon and interface list. A
//! built-in catalog covers the standard devices; additional templates
//! can be merged in from YAML files.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::manager::EndpointSpec;
use crate::topology::types::{InterfaceDecl, InterfaceKind};

/// Errors raised while loading a template file.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("failed to read template file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse template file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A device category's default appearance and port layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
}

/// Catalog of device templates keyed by category name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    templates: HashMap<String, DeviceTemplate>,
}

fn decl(name: &str, kind: InterfaceKind) -> InterfaceDecl {
    InterfaceDecl {
        name: name.to_string(),
        kind: Some(kind),
    }
}

impl TemplateCatalog {
    /// The standard device catalog shipped with the editor.
    pub fn builtin() -> Self {
        use InterfaceKind::{Ethernet, Serial};

        let mut templates = HashMap::new();
        templates.insert(
            "router".to_string(),
            DeviceTemplate {
                icon: "router.svg".to_string(),
                interfaces: vec![
                    decl("Gig0/0", Ethernet),
                    decl("Gig0/1", Ethernet),
                    decl("Ser0/0", Serial),
                    decl("Ser0/1", Serial),
                ],
            },
        );
        templates.insert(
            "switch".to_string(),
            DeviceTemplate {
                icon: "switch.svg".to_string(),
                interfaces: (1..=8).map(|n| decl(&format!("Gig0/{}", n), Ethernet)).collect(),
            },
        );
        templates.insert(
            "server".to_string(),
            DeviceTemplate {
                icon: "server.svg".to_string(),
                interfaces: vec![decl("eth0", Ethernet), decl("eth1", Ethernet)],
            },
        );
        templates.insert(
            "firewall".to_string(),
            DeviceTemplate {
                icon: "firewall.svg".to_string(),
                interfaces: vec![
                    decl("eth0", Ethernet),
                    decl("eth1", Ethernet),
                    decl("eth2", Ethernet),
                ],
            },
        );
        templates.insert(
            "cloud".to_string(),
            DeviceTemplate {
                icon: "cloud.svg".to_string(),
                interfaces: vec![decl("eth0", Ethernet), decl("Ser0/0", Serial)],
            },
        );
        TemplateCatalog { templates }
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, TemplateError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a catalog from a YAML file.
    pub fn load_file(path: &Path) -> Result<Self, TemplateError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Merge another catalog into this one. Templates in `other`
    /// replace same-keyed templates here.
    pub fn merge(&mut self, other: TemplateCatalog) {
        self.templates.extend(other.templates);
    }

    /// Look up a template by device category.
    pub fn template(&self, key: &str) -> Option<&DeviceTemplate> {
        self.templates.get(key)
    }

    /// Endpoint specs for a device category, ready to hand to
    /// `NodeSpec::with_endpoints`. `None` for an unknown category.
    pub fn device_endpoints(&self, key: &str) -> Option<Vec<EndpointSpec>> {
        let template = self.templates.get(key)?;
        Some(
            template
                .interfaces
                .iter()
                .map(|decl| EndpointSpec {
                    name: decl.name.clone(),
                    kind: decl.kind,
                    original_name: Some(decl.name.clone()),
                })
                .collect(),
        )
    }

    /// Declared interface list for a device category, carried on the
    /// node for the validator's template fallback.
    pub fn device_interfaces(&self, key: &str) -> Option<Vec<InterfaceDecl>> {
        self.templates.get(key).map(|t| t.interfaces.clone())
    }

    /// Known device categories, unordered.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.templates.keys()
    }
}
