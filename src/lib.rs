//! # Netsketch - Topology core for a network diagram editor
//!
//! This library implements the topology and connection management core
//! of an interactive network-diagram editor: users drag device icons
//! onto a canvas, wire them together with typed interfaces, and persist
//! the resulting diagram as JSON.
//!
//! ## Overview
//!
//! The core maintains an in-memory graph of nodes and their interface
//! endpoints, enforces wiring integrity rules on every mutation, and
//! notifies observers of state transitions so rendering code can stay
//! decoupled from the model.
//!
//! ## Key Features
//!
//! - **Integrity rules**: single-use ports, no duplicate wiring, no
//!   self-connections, no cross-family wiring, no dangling connections
//!   after a node deletion
//! - **Typed events**: publish/subscribe registry keyed by a topic enum
//! - **Interface-type inference**: ordered fallback chain from explicit
//!   fields through label matching to device-template declarations
//! - **Lossless persistence**: versioned JSON documents that round-trip
//!   exactly, with skip-and-warn recovery for partially corrupt files
//! - **Device templates**: built-in catalog of device categories,
//!   extensible from YAML files
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `topology`: the graph model, store, validator and manager façade
//! - `events`: typed publish/subscribe change notification
//! - `document`: the versioned JSON serialization format
//! - `templates`: device template catalog and endpoint loader
//! - `persistence`: save/load/list gateway over diagram files
//! - `ident`: collision-resistant identifier generation
//!
//! ## Example Usage
//!
//! ```rust
//! use netsketch::topology::{InterfaceKind, NodeSpec, TopologyManager};
//!
//! let mut manager = TopologyManager::new();
//!
//! let r1 = manager.add_node(
//!     NodeSpec::new("router", "R1").endpoint("Gig0/0", Some(InterfaceKind::Ethernet)),
//! )?;
//! let r2 = manager.add_node(
//!     NodeSpec::new("router", "R2").endpoint("Gig0/0", Some(InterfaceKind::Ethernet)),
//! )?;
//!
//! manager.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")?;
//! assert_eq!(manager.statistics().total_connections, 1);
//!
//! // Wiring the same ports again is refused, from either side.
//! assert!(manager.create_connection(&r2.id, "Gig0/0", &r1.id, "Gig0/0").is_err());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! User-correctable wiring refusals are returned as
//! [`topology::ConnectRefusal`] values for toast/log surfacing; caller
//! contract faults are [`topology::ContractViolation`] values. The core
//! performs no logging inside business decisions.

pub mod document;
pub mod events;
pub mod ident;
pub mod persistence;
pub mod templates;
pub mod topology;
