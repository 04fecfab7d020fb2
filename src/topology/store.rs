//! Canonical in-memory topology storage.
//!
//! This file holds the authoritative node and connection maps. The store
//! performs no validation of its own; it trusts its caller, which is
//! always the manager.

use std::collections::HashMap;

use crate::topology::types::{Connection, Node, TopologyStats};

/// The authoritative in-memory graph.
#[derive(Debug, Default)]
pub struct TopologyStore {
    nodes: HashMap<String, Node>,
    connections: HashMap<String, Connection>,
}

impl TopologyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a node under its id.
    pub fn put_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Remove a node and every connection touching it.
    ///
    /// Returns the removed node, or `None` if the id was unknown (in
    /// which case nothing changes).
    pub fn delete_node(&mut self, id: &str) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        self.connections.retain(|_, conn| !conn.touches_node(id));
        Some(node)
    }

    /// Insert or replace a connection under its id.
    pub fn put_connection(&mut self, connection: Connection) {
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Look up a connection by id.
    pub fn connection(&self, id: &str) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Remove a connection, returning it if present.
    pub fn delete_connection(&mut self, id: &str) -> Option<Connection> {
        self.connections.remove(id)
    }

    /// Iterate all nodes, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Iterate all connections, in no particular order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    /// Ids of every connection touching the given node.
    pub fn connections_for_node(&self, node_id: &str) -> Vec<String> {
        self.connections
            .values()
            .filter(|conn| conn.touches_node(node_id))
            .map(|conn| conn.id.clone())
            .collect()
    }

    /// Whether any connection already uses the given endpoint.
    pub fn endpoint_in_use(&self, node_id: &str, interface: &str) -> bool {
        self.connections
            .values()
            .any(|conn| conn.uses_endpoint(node_id, interface))
    }

    /// Clear all nodes and connections.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.connections.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Aggregate counts, walking every node for endpoint totals.
    pub fn stats(&self) -> TopologyStats {
        TopologyStats {
            total_nodes: self.nodes.len(),
            total_connections: self.connections.len(),
            total_endpoints: self.nodes.values().map(|n| n.endpoints.len()).sum(),
        }
    }

    /// Snapshot of the node map for serialization.
    pub fn node_map(&self) -> HashMap<String, Node> {
        self.nodes.clone()
    }

    /// Snapshot of the connection map for serialization.
    pub fn connection_map(&self) -> HashMap<String, Connection> {
        self.connections.clone()
    }
}
