//! Topology manager façade.
//!
//! This file owns the store and is the single entry point for all
//! mutations: it orchestrates validation, applies changes, and emits
//! events. Every refusal is decided before any mutation begins, so a
//! rejected operation never leaves partial state behind.

use std::collections::HashSet;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::document::{LoadError, LoadReport, TopologyDocument, UiState, DOCUMENT_VERSION};
use crate::events::{EventBus, EventTopic, SubscriberId, TopologyEvent};
use crate::ident::IdGenerator;
use crate::topology::store::TopologyStore;
use crate::topology::types::{
    connection_key, Connection, ConnectionEnd, Endpoint, InterfaceDecl, InterfaceKind, Node,
    Position, Size, TopologyStats,
};
use crate::topology::validator::{can_connect, resolve_kind, ConnectRefusal};

/// Caller-contract faults on mutation inputs.
///
/// These indicate a defect in the calling code, not a user action, and
/// are kept apart from the user-correctable [`ConnectRefusal`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("node name cannot be empty")]
    EmptyName,
    #[error("node type cannot be empty")]
    EmptyType,
    #[error("node '{node}' declares an endpoint with an empty name")]
    EmptyInterfaceName { node: String },
    #[error("node '{node}' declares interface '{interface}' more than once")]
    DuplicateInterface { node: String, interface: String },
    #[error("node id '{0}' is already present in the topology")]
    NodeIdTaken(String),
}

/// Input for creating an endpoint on a new node.
#[derive(Debug, Clone, Default)]
pub struct EndpointSpec {
    pub name: String,
    pub kind: Option<InterfaceKind>,
    /// Label from the device template, kept for display. Defaults to
    /// `name` when absent.
    pub original_name: Option<String>,
}

impl EndpointSpec {
    pub fn new(name: impl Into<String>, kind: Option<InterfaceKind>) -> Self {
        EndpointSpec {
            name: name.into(),
            kind,
            original_name: None,
        }
    }
}

/// Input for creating a node.
///
/// Identifiers are assigned by the manager when absent; callers never
/// construct [`Node`] values directly.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    pub id: Option<String>,
    pub device_type: String,
    pub name: String,
    pub position: Position,
    pub size: Option<Size>,
    pub icon: Option<String>,
    pub endpoints: Vec<EndpointSpec>,
    pub properties: Map<String, Value>,
    pub interfaces: Vec<InterfaceDecl>,
}

impl NodeSpec {
    pub fn new(device_type: impl Into<String>, name: impl Into<String>) -> Self {
        NodeSpec {
            device_type: device_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Place the node on the canvas.
    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position { x, y };
        self
    }

    /// Add a single endpoint.
    pub fn endpoint(mut self, name: impl Into<String>, kind: Option<InterfaceKind>) -> Self {
        self.endpoints.push(EndpointSpec::new(name, kind));
        self
    }

    /// Replace the endpoint list, e.g. from a device template.
    pub fn with_endpoints(mut self, endpoints: Vec<EndpointSpec>) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Attach the template's declared interface list.
    pub fn with_interfaces(mut self, interfaces: Vec<InterfaceDecl>) -> Self {
        self.interfaces = interfaces;
        self
    }

    /// Set the display icon.
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// The façade the rest of the application talks to.
///
/// Owns the store, the identifier generator and the event bus. All
/// mutation methods are synchronous and run to completion; two
/// mutations can never interleave their partial effects.
#[derive(Debug)]
pub struct TopologyManager {
    store: TopologyStore,
    bus: EventBus,
    ids: IdGenerator,
    ui_state: UiState,
}

impl TopologyManager {
    pub fn new() -> Self {
        TopologyManager {
            store: TopologyStore::new(),
            bus: EventBus::new(),
            ids: IdGenerator::new(),
            ui_state: UiState::default(),
        }
    }

    /// Build a manager with a seeded id generator, for reproducible
    /// output in tests.
    pub fn with_id_generator(ids: IdGenerator) -> Self {
        TopologyManager {
            store: TopologyStore::new(),
            bus: EventBus::new(),
            ids,
            ui_state: UiState::default(),
        }
    }

    // --- mutations ---------------------------------------------------

    /// Create a node from a spec and insert it.
    ///
    /// Assigns node and endpoint ids when absent, wires the endpoint
    /// back-references, and sorts endpoints into natural interface
    /// order. Emits `NodeAdded` on success.
    pub fn add_node(&mut self, spec: NodeSpec) -> Result<Node, ContractViolation> {
        if spec.name.trim().is_empty() {
            return Err(ContractViolation::EmptyName);
        }
        if spec.device_type.trim().is_empty() {
            return Err(ContractViolation::EmptyType);
        }
        let mut seen = HashSet::new();
        for endpoint in &spec.endpoints {
            if endpoint.name.trim().is_empty() {
                return Err(ContractViolation::EmptyInterfaceName {
                    node: spec.name.clone(),
                });
            }
            if !seen.insert(endpoint.name.clone()) {
                return Err(ContractViolation::DuplicateInterface {
                    node: spec.name.clone(),
                    interface: endpoint.name.clone(),
                });
            }
        }

        let id = match spec.id {
            Some(id) => {
                if self.store.contains_node(&id) {
                    return Err(ContractViolation::NodeIdTaken(id));
                }
                id
            }
            None => self.ids.node_id(),
        };

        let endpoints = spec
            .endpoints
            .into_iter()
            .map(|ep| {
                let original_name = ep.original_name.or_else(|| Some(ep.name.clone()));
                Endpoint {
                    name: ep.name,
                    kind: ep.kind,
                    id: self.ids.endpoint_id(),
                    node_id: id.clone(),
                    interface_type: None,
                    original_name,
                }
            })
            .collect();

        let mut node = Node {
            id,
            device_type: spec.device_type,
            name: spec.name,
            position: spec.position,
            size: spec.size.unwrap_or_default(),
            icon: spec.icon.unwrap_or_default(),
            endpoints,
            properties: spec.properties,
            interfaces: spec.interfaces,
        };
        node.sort_endpoints();

        self.store.put_node(node.clone());
        self.bus.emit(&TopologyEvent::NodeAdded { node: node.clone() });
        Ok(node)
    }

    /// Remove a node and every connection touching it.
    ///
    /// Emits `ConnectionRemoved` for each dependent connection, then
    /// `NodeRemoved`. Returns `None` and changes nothing if the id is
    /// unknown.
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        if !self.store.contains_node(node_id) {
            return None;
        }
        for connection_id in self.store.connections_for_node(node_id) {
            if let Some(connection) = self.store.delete_connection(&connection_id) {
                self.bus
                    .emit(&TopologyEvent::ConnectionRemoved { connection });
            }
        }
        let node = self.store.delete_node(node_id)?;
        self.bus.emit(&TopologyEvent::NodeRemoved { node: node.clone() });
        Some(node)
    }

    /// Wire two endpoints together, identified by node id and interface
    /// label.
    ///
    /// Runs the validator; a refusal is returned as a value and
    /// performs no mutation. On acceptance the connection id is the
    /// canonical key, so re-creating the same wiring from either side
    /// is detectable as a duplicate. Emits `ConnectionAdded`.
    pub fn create_connection(
        &mut self,
        source_node: &str,
        source_iface: &str,
        target_node: &str,
        target_iface: &str,
    ) -> Result<Connection, ConnectRefusal> {
        let source = self.resolve_endpoint(source_node, source_iface)?;
        let target = self.resolve_endpoint(target_node, target_iface)?;

        can_connect(&self.store, &source, &target)?;

        let source_kind = self
            .store
            .node(source_node)
            .and_then(|node| resolve_kind(&source, node));
        let target_kind = self
            .store
            .node(target_node)
            .and_then(|node| resolve_kind(&target, node));

        let connection = Connection {
            id: connection_key(source_node, source_iface, target_node, target_iface),
            source: ConnectionEnd {
                id: source_node.to_string(),
                interface: source_iface.to_string(),
                interface_type: source_kind,
            },
            target: ConnectionEnd {
                id: target_node.to_string(),
                interface: target_iface.to_string(),
                interface_type: target_kind,
            },
            timestamp: Utc::now(),
            style: Map::new(),
            properties: Map::new(),
        };

        self.store.put_connection(connection.clone());
        self.bus.emit(&TopologyEvent::ConnectionAdded {
            connection: connection.clone(),
        });
        Ok(connection)
    }

    /// Remove a connection by id. Emits `ConnectionRemoved`; returns
    /// `None` if the id is unknown.
    pub fn remove_connection(&mut self, connection_id: &str) -> Option<Connection> {
        let connection = self.store.delete_connection(connection_id)?;
        self.bus.emit(&TopologyEvent::ConnectionRemoved {
            connection: connection.clone(),
        });
        Some(connection)
    }

    /// Clear all nodes and connections. Emits a single `TopologyReset`,
    /// no per-item events.
    pub fn reset(&mut self) {
        self.store.reset();
        self.bus.emit(&TopologyEvent::TopologyReset);
    }

    // --- reads -------------------------------------------------------

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.store.node(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.store.nodes()
    }

    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.store.connection(id)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.store.connections()
    }

    /// Aggregate counts over the topology.
    pub fn statistics(&self) -> TopologyStats {
        self.store.stats()
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn set_ui_state(&mut self, ui_state: UiState) {
        self.ui_state = ui_state;
    }

    // --- events ------------------------------------------------------

    /// Register a handler for a topic.
    pub fn subscribe(
        &mut self,
        topic: EventTopic,
        handler: impl Fn(&TopologyEvent) + 'static,
    ) -> SubscriberId {
        self.bus.subscribe(topic, handler)
    }

    /// Remove a registration made with [`TopologyManager::subscribe`].
    pub fn unsubscribe(&mut self, topic: EventTopic, id: SubscriberId) -> bool {
        self.bus.unsubscribe(topic, id)
    }

    // --- serialization -----------------------------------------------

    /// Snapshot the topology as a versioned document.
    pub fn serialize(&self) -> TopologyDocument {
        TopologyDocument {
            version: DOCUMENT_VERSION.to_string(),
            timestamp: Utc::now(),
            nodes: self.store.node_map(),
            connections: self.store.connection_map(),
            ui_state: self.ui_state.clone(),
        }
    }

    /// Replace the current topology with the document's contents.
    ///
    /// Nodes are re-inserted verbatim. Connections referencing a node
    /// or interface that did not survive the node pass are skipped with
    /// a logged warning rather than failing the whole load. Emits a
    /// single `TopologyLoaded` at the end.
    pub fn load(&mut self, document: TopologyDocument) -> LoadReport {
        self.store.reset();

        let mut report = LoadReport {
            nodes_loaded: 0,
            connections_loaded: 0,
            connections_skipped: 0,
        };

        for (_, node) in document.nodes {
            self.store.put_node(node);
            report.nodes_loaded += 1;
        }

        for (id, connection) in document.connections {
            let resolves = [&connection.source, &connection.target]
                .iter()
                .all(|end| match self.store.node(&end.id) {
                    Some(node) => node.endpoint(&end.interface).is_some(),
                    None => false,
                });
            if !resolves {
                log::warn!(
                    "skipping connection '{}': references a missing node or interface",
                    id
                );
                report.connections_skipped += 1;
                continue;
            }
            self.store.put_connection(connection);
            report.connections_loaded += 1;
        }

        self.ui_state = document.ui_state;
        self.bus.emit(&TopologyEvent::TopologyLoaded {
            nodes: report.nodes_loaded,
            connections: report.connections_loaded,
        });
        report
    }

    /// Parse JSON text and load it. A malformed document is rejected
    /// before any mutation, leaving the current topology untouched.
    pub fn load_json(&mut self, json: &str) -> Result<LoadReport, LoadError> {
        let document = TopologyDocument::from_json(json)?;
        Ok(self.load(document))
    }

    // --- helpers -----------------------------------------------------

    fn resolve_endpoint(
        &self,
        node_id: &str,
        interface: &str,
    ) -> Result<Endpoint, ConnectRefusal> {
        let node = self
            .store
            .node(node_id)
            .ok_or_else(|| ConnectRefusal::UnknownNode(node_id.to_string()))?;
        let endpoint = node
            .endpoint(interface)
            .ok_or_else(|| ConnectRefusal::UnknownInterface {
                node: node_id.to_string(),
                interface: interface.to_string(),
            })?;
        Ok(endpoint.clone())
    }
}

impl Default for TopologyManager {
    fn default() -> Self {
        Self::new()
    }
}
