//! Connection validation.
//!
//! This file decides whether two endpoints may be wired together. The
//! decision is a pure function of the current store state: it performs
//! no mutation and yields the same verdict for the same inputs.

use thiserror::Error;

use crate::topology::store::TopologyStore;
use crate::topology::types::{connection_key, Endpoint, InterfaceKind, Node};

/// Why a connection attempt was refused.
///
/// Every variant except [`ConnectRefusal::UnboundEndpoint`] and
/// [`ConnectRefusal::UnknownInterface`] is a user-correctable condition
/// meant for toast/log surfacing, not a program error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectRefusal {
    /// The endpoint reference carries no owning node id. This indicates
    /// a defect in the calling code, not a user action.
    #[error("endpoint '{interface}' is not bound to a node")]
    UnboundEndpoint { interface: String },

    /// Single-use ports: the endpoint is already wired.
    #[error("interface '{interface}' on node '{node}' is already in use")]
    EndpointInUse { node: String, interface: String },

    /// The referenced node does not exist in the topology.
    #[error("node '{0}' does not exist in the topology")]
    UnknownNode(String),

    /// The referenced interface does not exist on its node.
    #[error("node '{node}' has no interface named '{interface}'")]
    UnknownInterface { node: String, interface: String },

    /// No step of the inference chain produced an interface family.
    #[error("cannot determine interface type of '{interface}' on node '{node}'")]
    TypeUndeterminable { node: String, interface: String },

    /// Both endpoints belong to the same node.
    #[error("cannot connect a node to itself")]
    SelfConnection,

    /// The two families are not in each other's compatibility set.
    #[error("{source_kind} interfaces cannot be connected to {target_kind} interfaces")]
    IncompatibleKinds {
        source_kind: InterfaceKind,
        target_kind: InterfaceKind,
    },

    /// A connection with the same canonical key already exists.
    #[error("these interfaces are already connected")]
    DuplicateConnection,
}

impl ConnectRefusal {
    /// Whether this refusal reflects a user action rather than an
    /// integration bug in the caller.
    pub fn is_user_correctable(&self) -> bool {
        !matches!(
            self,
            ConnectRefusal::UnboundEndpoint { .. } | ConnectRefusal::UnknownInterface { .. }
        )
    }
}

/// One step of the interface-type inference chain.
type KindStrategy = fn(&Endpoint, &Node) -> Option<InterfaceKind>;

fn explicit_kind(endpoint: &Endpoint, _node: &Node) -> Option<InterfaceKind> {
    endpoint.kind
}

fn loose_interface_type(endpoint: &Endpoint, _node: &Node) -> Option<InterfaceKind> {
    endpoint.interface_type
}

fn inferred_from_label(endpoint: &Endpoint, _node: &Node) -> Option<InterfaceKind> {
    InterfaceKind::infer_from_label(&endpoint.name)
}

fn declared_by_template(endpoint: &Endpoint, node: &Node) -> Option<InterfaceKind> {
    node.declared_kind(&endpoint.name)
}

/// Ordered fallback chain for resolving an endpoint's family. The
/// precedence order is load-bearing: downstream compatibility checks
/// depend on it.
const KIND_STRATEGIES: &[KindStrategy] = &[
    explicit_kind,
    loose_interface_type,
    inferred_from_label,
    declared_by_template,
];

/// Resolve an endpoint's effective interface family, trying each
/// strategy in precedence order.
pub fn resolve_kind(endpoint: &Endpoint, node: &Node) -> Option<InterfaceKind> {
    KIND_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(endpoint, node))
}

/// Decide whether `source` and `target` may be wired together.
///
/// Checks run in a fixed order: unbound references, ports already in
/// use, type resolution, self-connection, family compatibility, and
/// finally duplicate detection against the canonical key. No check
/// mutates anything, so a refusal leaves the store untouched by
/// construction.
pub fn can_connect(
    store: &TopologyStore,
    source: &Endpoint,
    target: &Endpoint,
) -> Result<(), ConnectRefusal> {
    for endpoint in [source, target] {
        if endpoint.node_id.is_empty() {
            return Err(ConnectRefusal::UnboundEndpoint {
                interface: endpoint.name.clone(),
            });
        }
    }

    for endpoint in [source, target] {
        if store.endpoint_in_use(&endpoint.node_id, &endpoint.name) {
            return Err(ConnectRefusal::EndpointInUse {
                node: endpoint.node_id.clone(),
                interface: endpoint.name.clone(),
            });
        }
    }

    let source_node = store
        .node(&source.node_id)
        .ok_or_else(|| ConnectRefusal::UnknownNode(source.node_id.clone()))?;
    let target_node = store
        .node(&target.node_id)
        .ok_or_else(|| ConnectRefusal::UnknownNode(target.node_id.clone()))?;

    let source_kind =
        resolve_kind(source, source_node).ok_or_else(|| ConnectRefusal::TypeUndeterminable {
            node: source.node_id.clone(),
            interface: source.name.clone(),
        })?;
    let target_kind =
        resolve_kind(target, target_node).ok_or_else(|| ConnectRefusal::TypeUndeterminable {
            node: target.node_id.clone(),
            interface: target.name.clone(),
        })?;

    if source_node.id == target_node.id {
        return Err(ConnectRefusal::SelfConnection);
    }

    if !source_kind.can_link(target_kind) {
        return Err(ConnectRefusal::IncompatibleKinds {
            source_kind,
            target_kind,
        });
    }

    let key = connection_key(&source.node_id, &source.name, &target.node_id, &target.name);
    if store.connection(&key).is_some() {
        return Err(ConnectRefusal::DuplicateConnection);
    }

    Ok(())
}
