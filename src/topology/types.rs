//! Topology model types.
//!
//! This file contains the node, endpoint and connection types that make
//! up a diagram, together with the interface-family classification and
//! the canonical connection key.

use std::cmp::Ordering;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Interface family of an endpoint.
///
/// The editor wires two broad families of physical ports. Families are
/// closed for compatibility checking but the model tolerates endpoints
/// whose family is unknown until connection time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceKind {
    /// Ethernet ports (GigabitEthernet, FastEthernet, eth0, ...)
    Ethernet,
    /// Serial ports (Serial0/0, Ser0/1, ...)
    Serial,
}

impl InterfaceKind {
    /// Lowercase wire name of this family.
    pub fn as_str(&self) -> &'static str {
        match self {
            InterfaceKind::Ethernet => "ethernet",
            InterfaceKind::Serial => "serial",
        }
    }

    /// Infer a family from an interface label.
    ///
    /// Matches the full family name anywhere in the label first, then
    /// falls back to the common device abbreviations (`Gig0/0`, `Fa0/1`,
    /// `Ser0/0`). Returns `None` when the label gives no hint.
    pub fn infer_from_label(label: &str) -> Option<InterfaceKind> {
        let lowered = label.to_lowercase();
        if lowered.contains("ethernet") {
            return Some(InterfaceKind::Ethernet);
        }
        if lowered.contains("serial") {
            return Some(InterfaceKind::Serial);
        }
        match label_prefix(&lowered) {
            "eth" | "gig" | "gi" | "fast" | "fa" => Some(InterfaceKind::Ethernet),
            "ser" | "se" => Some(InterfaceKind::Serial),
            _ => None,
        }
    }

    /// Families this family may be wired to.
    ///
    /// Current policy is symmetric and family-pure: Ethernet to Ethernet,
    /// Serial to Serial.
    pub fn compatible_targets(&self) -> &'static [InterfaceKind] {
        match self {
            InterfaceKind::Ethernet => &[InterfaceKind::Ethernet],
            InterfaceKind::Serial => &[InterfaceKind::Serial],
        }
    }

    /// Check whether this family may be wired to `other`.
    pub fn can_link(&self, other: InterfaceKind) -> bool {
        self.compatible_targets().contains(&other)
    }
}

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Rendered size of a node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Size {
            width: 100.0,
            height: 100.0,
        }
    }
}

/// An interface declared by a device template.
///
/// Declared interfaces are carried on the node so the validator can fall
/// back to them when an endpoint itself does not state its family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDecl {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<InterfaceKind>,
}

/// A wireable port owned by exactly one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Interface label, unique within the owning node (e.g. "Gig0/0").
    pub name: String,
    /// Explicit interface family, when known.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<InterfaceKind>,
    pub id: String,
    /// Owning node. An endpoint cannot outlive its node.
    #[serde(rename = "nodeId")]
    pub node_id: String,
    /// Alternative family spelling accepted from loose documents.
    #[serde(
        rename = "interfaceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub interface_type: Option<InterfaceKind>,
    /// Label given at device-template load time, kept for display.
    #[serde(
        rename = "originalName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub original_name: Option<String>,
}

/// A device on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Device category (router, switch, server, ...).
    #[serde(rename = "type")]
    pub device_type: String,
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub icon: String,
    /// Ports in natural interface order.
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Opaque key/value bag, passed through unchanged.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
    /// Interfaces declared by the device template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceDecl>,
}

impl Node {
    /// Look up an endpoint by interface label.
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    /// Family declared for an interface label by the device template.
    pub fn declared_kind(&self, name: &str) -> Option<InterfaceKind> {
        self.interfaces
            .iter()
            .find(|decl| decl.name == name)
            .and_then(|decl| decl.kind)
    }

    /// Sort endpoints into natural interface order.
    pub fn sort_endpoints(&mut self) {
        self.endpoints
            .sort_by(|a, b| natural_interface_cmp(&a.name, &b.name));
    }
}

/// One side of a connection, referencing an endpoint by node id and
/// interface label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEnd {
    /// Node id of the referenced endpoint.
    pub id: String,
    /// Interface label of the referenced endpoint.
    pub interface: String,
    /// Resolved interface family at connection time.
    #[serde(
        rename = "interfaceType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub interface_type: Option<InterfaceKind>,
}

/// A wire between two endpoints of two different nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    #[serde(rename = "sourceNode")]
    pub source: ConnectionEnd,
    #[serde(rename = "targetNode")]
    pub target: ConnectionEnd,
    /// Creation time. Source/target order is display-only.
    pub timestamp: DateTime<Utc>,
    #[serde(
        rename = "connectionStyle",
        default,
        skip_serializing_if = "Map::is_empty"
    )]
    pub style: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub properties: Map<String, Value>,
}

impl Connection {
    /// Canonical key recomputed from the two ends.
    pub fn canonical_key(&self) -> String {
        connection_key(
            &self.source.id,
            &self.source.interface,
            &self.target.id,
            &self.target.interface,
        )
    }

    /// Whether either end references the given node.
    pub fn touches_node(&self, node_id: &str) -> bool {
        self.source.id == node_id || self.target.id == node_id
    }

    /// Whether either end references the given endpoint.
    pub fn uses_endpoint(&self, node_id: &str, interface: &str) -> bool {
        (self.source.id == node_id && self.source.interface == interface)
            || (self.target.id == node_id && self.target.interface == interface)
    }
}

/// Canonical, side-independent key for a pair of endpoints.
///
/// Node ids and interface labels are each sorted lexicographically, so a
/// source-to-target attempt produces the same key as the reversed attempt.
pub fn connection_key(node_a: &str, iface_a: &str, node_b: &str, iface_b: &str) -> String {
    let mut nodes = [node_a, node_b];
    nodes.sort_unstable();
    let mut ifaces = [iface_a, iface_b];
    ifaces.sort_unstable();
    format!(
        "connection:{}:{}:{}:{}",
        nodes[0], nodes[1], ifaces[0], ifaces[1]
    )
}

/// Aggregate counts over the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopologyStats {
    pub total_nodes: usize,
    pub total_connections: usize,
    pub total_endpoints: usize,
}

/// Compare interface labels in natural device order.
///
/// `Gig0/2` sorts before `Gig0/10`: the alphabetic prefix compares
/// case-insensitively, then each numeric component compares as a number.
/// Labels without numeric components fall back to plain string order.
pub fn natural_interface_cmp(a: &str, b: &str) -> Ordering {
    let prefix_a = label_prefix(a).to_lowercase();
    let prefix_b = label_prefix(b).to_lowercase();
    match prefix_a.cmp(&prefix_b) {
        Ordering::Equal => {}
        other => return other,
    }

    let nums_a = label_numbers(a);
    let nums_b = label_numbers(b);
    for (x, y) in nums_a.iter().zip(nums_b.iter()) {
        match x.cmp(y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    match nums_a.len().cmp(&nums_b.len()) {
        Ordering::Equal => a.cmp(b),
        other => other,
    }
}

/// Leading alphabetic run of an interface label ("Gig0/0" -> "Gig").
fn label_prefix(label: &str) -> &str {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let re = PREFIX.get_or_init(|| Regex::new(r"^[A-Za-z]+").expect("valid regex"));
    re.find(label).map(|m| m.as_str()).unwrap_or("")
}

/// Numeric components of an interface label ("Gig0/10" -> [0, 10]).
fn label_numbers(label: &str) -> Vec<u64> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| Regex::new(r"\d+").expect("valid regex"));
    re.find_iter(label)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}
