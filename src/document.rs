//! Versioned topology document format.
//!
//! This file defines the JSON document a diagram is persisted as. The
//! document carries the full node and connection maps plus the opaque
//! UI state, and must round-trip losslessly through serde_json.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::types::{Connection, Node, Position};

/// Format version written into every document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Errors raised while reading a document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The document is not valid JSON or is missing a required
    /// top-level key (`nodes`, `connections`). The current topology is
    /// left untouched.
    #[error("malformed topology document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Ephemeral editor state carried with the topology for serialization
/// convenience. Opaque to the core's invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(rename = "zoomLevel", default = "default_zoom")]
    pub zoom_level: f64,
    #[serde(rename = "panPosition", default)]
    pub pan_position: Position,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_zoom() -> f64 {
    1.0
}

impl Default for UiState {
    fn default() -> Self {
        UiState {
            theme: default_theme(),
            zoom_level: default_zoom(),
            pan_position: Position::default(),
        }
    }
}

/// The serialized form of a topology.
///
/// `nodes` and `connections` are required keys: a document missing
/// either fails to parse and the load is rejected outright.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopologyDocument {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub nodes: HashMap<String, Node>,
    pub connections: HashMap<String, Connection>,
    #[serde(rename = "uiState", default)]
    pub ui_state: UiState,
}

impl TopologyDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, LoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Outcome of loading a document into a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes inserted.
    pub nodes_loaded: usize,
    /// Connections inserted.
    pub connections_loaded: usize,
    /// Connections dropped because a referenced node was missing.
    pub connections_skipped: usize,
}
