#[cfg(test)]
mod topology_regression_tests {
    use std::cell::RefCell;
    use std::collections::HashSet;
    use std::rc::Rc;

    use netsketch::events::EventTopic;
    use netsketch::ident::IdGenerator;
    use netsketch::persistence::{DiskGateway, PersistenceGateway};
    use netsketch::templates::TemplateCatalog;
    use netsketch::topology::{
        ConnectRefusal, InterfaceKind, NodeSpec, TopologyManager,
    };

    fn manager() -> TopologyManager {
        TopologyManager::with_id_generator(IdGenerator::with_seed(2026))
    }

    fn router(name: &str) -> NodeSpec {
        NodeSpec::new("router", name)
            .endpoint("Gig0/0", Some(InterfaceKind::Ethernet))
            .endpoint("Gig0/1", Some(InterfaceKind::Ethernet))
            .endpoint("Ser0/0", Some(InterfaceKind::Serial))
    }

    /// Check the integrity rules that must hold after every mutation:
    /// connections resolve to existing nodes and interfaces, no port is
    /// used twice, and no two connections share a canonical key.
    fn assert_invariants(mgr: &TopologyManager) {
        let mut used_ports = HashSet::new();
        let mut keys = HashSet::new();
        for conn in mgr.connections() {
            for end in [&conn.source, &conn.target] {
                let node = mgr
                    .node(&end.id)
                    .unwrap_or_else(|| panic!("connection {} references missing node", conn.id));
                assert!(
                    node.endpoint(&end.interface).is_some(),
                    "connection {} references missing interface {}",
                    conn.id,
                    end.interface
                );
                assert!(
                    used_ports.insert((end.id.clone(), end.interface.clone())),
                    "port {}:{} used by more than one connection",
                    end.id,
                    end.interface
                );
            }
            assert_ne!(conn.source.id, conn.target.id, "self-loop in store");
            assert!(
                keys.insert(conn.canonical_key()),
                "duplicate canonical key {}",
                conn.canonical_key()
            );
        }
    }

    /// The concrete scenario from the product brief: two routers, one
    /// wire, a refused duplicate, then a cascading delete.
    #[test]
    fn test_router_pair_scenario() {
        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();

        let conn = mgr
            .create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")
            .unwrap();
        assert!(conn.id.starts_with("connection:"));
        assert_invariants(&mgr);

        assert!(mgr
            .create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")
            .is_err());
        assert_eq!(mgr.statistics().total_connections, 1);

        let removed = mgr.remove_node(&r1.id).unwrap();
        assert_eq!(removed.name, "R1");
        assert_eq!(mgr.statistics().total_connections, 0);
        assert_invariants(&mgr);
    }

    #[test]
    fn test_duplicate_detection_is_side_independent() {
        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();

        mgr.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")
            .unwrap();
        let refusal = mgr
            .create_connection(&r2.id, "Gig0/0", &r1.id, "Gig0/0")
            .unwrap_err();
        assert!(refusal.is_user_correctable());
        assert_eq!(mgr.statistics().total_connections, 1);
        assert_invariants(&mgr);
    }

    /// The canonical key sorts node ids and interface labels
    /// independently, so re-pairing the same four ports collides with
    /// the existing key even though the ports themselves are free.
    #[test]
    fn test_canonical_key_collision_across_pairings() {
        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();

        mgr.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/1")
            .unwrap();
        let refusal = mgr
            .create_connection(&r1.id, "Gig0/1", &r2.id, "Gig0/0")
            .unwrap_err();
        assert_eq!(refusal, ConnectRefusal::DuplicateConnection);
    }

    #[test]
    fn test_cross_family_wiring_refused_regardless_of_side() {
        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();

        for (src, src_if, dst, dst_if) in [
            (&r1.id, "Gig0/0", &r2.id, "Ser0/0"),
            (&r1.id, "Ser0/0", &r2.id, "Gig0/0"),
        ] {
            let refusal = mgr.create_connection(src, src_if, dst, dst_if).unwrap_err();
            assert!(
                matches!(refusal, ConnectRefusal::IncompatibleKinds { .. }),
                "expected incompatibility, got {:?}",
                refusal
            );
        }
        assert_eq!(mgr.statistics().total_connections, 0);
    }

    #[test]
    fn test_invariants_hold_across_mutation_sequence() {
        let mut mgr = manager();
        let a = mgr.add_node(router("A")).unwrap();
        assert_invariants(&mgr);
        let b = mgr.add_node(router("B")).unwrap();
        let c = mgr.add_node(router("C")).unwrap();
        assert_invariants(&mgr);

        mgr.create_connection(&a.id, "Gig0/0", &b.id, "Gig0/0")
            .unwrap();
        assert_invariants(&mgr);
        mgr.create_connection(&b.id, "Gig0/1", &c.id, "Gig0/0")
            .unwrap();
        assert_invariants(&mgr);
        let serial = mgr
            .create_connection(&a.id, "Ser0/0", &c.id, "Ser0/0")
            .unwrap();
        assert_invariants(&mgr);

        mgr.remove_connection(&serial.id);
        assert_invariants(&mgr);
        mgr.remove_node(&b.id);
        assert_invariants(&mgr);
        assert_eq!(mgr.statistics().total_connections, 0);
        assert_eq!(mgr.statistics().total_nodes, 2);

        mgr.reset();
        assert_invariants(&mgr);
        assert_eq!(mgr.statistics().total_nodes, 0);
    }

    #[test]
    fn test_json_round_trip_preserves_observable_state() {
        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1").at(40.0, 80.0)).unwrap();
        let r2 = mgr.add_node(router("R2").at(360.0, 80.0)).unwrap();
        let sw = mgr
            .add_node(
                NodeSpec::new("switch", "SW1")
                    .at(200.0, 240.0)
                    .endpoint("Gig0/1", Some(InterfaceKind::Ethernet))
                    .endpoint("Gig0/2", Some(InterfaceKind::Ethernet)),
            )
            .unwrap();
        mgr.create_connection(&r1.id, "Gig0/0", &sw.id, "Gig0/1")
            .unwrap();
        mgr.create_connection(&r2.id, "Gig0/0", &sw.id, "Gig0/2")
            .unwrap();

        let json = mgr.serialize().to_json().unwrap();
        let mut restored = manager();
        let report = restored.load_json(&json).unwrap();
        assert_eq!(report.nodes_loaded, 3);
        assert_eq!(report.connections_loaded, 2);
        assert_eq!(report.connections_skipped, 0);

        assert_eq!(restored.statistics(), mgr.statistics());
        for node in mgr.nodes() {
            let twin = restored.node(&node.id).expect("node survived round trip");
            assert_eq!(twin, node);
        }
        for conn in mgr.connections() {
            let twin = restored
                .connection(&conn.id)
                .expect("connection survived round trip");
            assert_eq!(twin, conn);
        }
        assert_invariants(&restored);
    }

    #[test]
    fn test_events_track_mutations() {
        let mut mgr = manager();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (topic, label) in [
            (EventTopic::NodeAdded, "node+"),
            (EventTopic::NodeRemoved, "node-"),
            (EventTopic::ConnectionAdded, "conn+"),
            (EventTopic::ConnectionRemoved, "conn-"),
            (EventTopic::TopologyReset, "reset"),
        ] {
            let sink = Rc::clone(&log);
            mgr.subscribe(topic, move |_| sink.borrow_mut().push(label));
        }

        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();
        mgr.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")
            .unwrap();
        // A refused attempt emits nothing.
        let _ = mgr.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0");
        mgr.remove_node(&r2.id);
        mgr.reset();

        assert_eq!(
            *log.borrow(),
            vec!["node+", "node+", "conn+", "conn-", "node-", "reset"]
        );
    }

    #[test]
    fn test_template_driven_node_creation() {
        let catalog = TemplateCatalog::builtin();
        let mut mgr = manager();

        let endpoints = catalog.device_endpoints("router").unwrap();
        let interfaces = catalog.device_interfaces("router").unwrap();
        let r1 = mgr
            .add_node(
                NodeSpec::new("router", "Edge1")
                    .with_endpoints(endpoints.clone())
                    .with_interfaces(interfaces.clone())
                    .with_icon(catalog.template("router").unwrap().icon.clone()),
            )
            .unwrap();
        let r2 = mgr
            .add_node(
                NodeSpec::new("router", "Edge2")
                    .with_endpoints(endpoints)
                    .with_interfaces(interfaces),
            )
            .unwrap();

        assert_eq!(r1.endpoints.len(), 4);
        assert_eq!(r1.icon, "router.svg");
        assert!(mgr
            .create_connection(&r1.id, "Ser0/0", &r2.id, "Ser0/1")
            .is_ok());
    }

    #[test]
    fn test_disk_gateway_round_trip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = DiskGateway::new(dir.path()).unwrap();

        let mut mgr = manager();
        let r1 = mgr.add_node(router("R1")).unwrap();
        let r2 = mgr.add_node(router("R2")).unwrap();
        mgr.create_connection(&r1.id, "Gig0/0", &r2.id, "Gig0/0")
            .unwrap();
        gateway.save("branch office", &mgr.serialize()).unwrap();

        let summaries = gateway.list().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].filename, "branch_office");
        assert_eq!(summaries[0].node_count, 2);
        assert_eq!(summaries[0].connection_count, 1);

        let mut restored = manager();
        restored.load(gateway.load("branch office").unwrap());
        assert_eq!(restored.statistics(), mgr.statistics());
        assert_invariants(&restored);
    }

    #[test]
    fn test_partially_corrupt_document_loads_with_skips() {
        let json = r#"{
            "version": "1.0",
            "timestamp": "2026-02-10T09:30:00Z",
            "nodes": {
                "node-a": {
                    "id": "node-a",
                    "type": "router",
                    "name": "R1",
                    "position": {"x": 0.0, "y": 0.0},
                    "endpoints": [
                        {"name": "Gig0/0", "type": "ethernet",
                         "id": "endpoint-a0", "nodeId": "node-a"}
                    ]
                }
            },
            "connections": {
                "connection:node-a:node-gone:Gig0/0:Gig0/0": {
                    "id": "connection:node-a:node-gone:Gig0/0:Gig0/0",
                    "sourceNode": {"id": "node-a", "interface": "Gig0/0"},
                    "targetNode": {"id": "node-gone", "interface": "Gig0/0"},
                    "timestamp": "2026-02-10T09:29:00Z"
                }
            }
        }"#;

        let mut mgr = manager();
        let report = mgr.load_json(json).unwrap();
        assert_eq!(report.nodes_loaded, 1);
        assert_eq!(report.connections_loaded, 0);
        assert_eq!(report.connections_skipped, 1);
        assert_invariants(&mgr);
    }
}
