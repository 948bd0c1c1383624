//! Integration tests for the logistics network.
//!
//! These tests drive the three application services over shared in-memory
//! repositories and journal, the way a front end would.

use domain::{
    Aggregate, AssignShipments, Center, CenterService, CreateRoute, DomainError, ErrorKind,
    InMemoryRepository, MoveShipment, RegisterCenter, RegisterShipment, Route, RouteService,
    RouteShipment, Shipment, ShipmentKind, ShipmentService, ShipmentStatus, UpdateShipmentStatus,
};
use event_store::{EventQuery, EventStore, InMemoryEventStore, Version};
use std::collections::HashMap;

const ROUTE: &str = "MAD16-BCN03-STD-001";

type Shipments = InMemoryRepository<Shipment>;
type Centers = InMemoryRepository<Center>;
type Routes = InMemoryRepository<Route>;

struct Network {
    shipments: ShipmentService<Shipments, Centers, InMemoryEventStore>,
    centers: CenterService<Centers, Shipments, InMemoryEventStore>,
    routes: RouteService<Routes, Centers, Shipments, InMemoryEventStore>,
    journal: InMemoryEventStore,
}

/// Helper to wire the services over shared storage
fn network() -> Network {
    let shipments = Shipments::new();
    let centers = Centers::new();
    let routes = Routes::new();
    let journal = InMemoryEventStore::new();

    Network {
        shipments: ShipmentService::new(shipments.clone(), centers.clone(), journal.clone()),
        centers: CenterService::new(centers.clone(), shipments.clone(), journal.clone()),
        routes: RouteService::new(routes, centers, shipments, journal.clone()),
        journal,
    }
}

/// Scenario A setup: two centers, one route, one standard shipment assigned.
fn assigned_network() -> Network {
    let net = network();
    net.centers
        .register_center(RegisterCenter::new("MAD16", "Centro Madrid", "Madrid"))
        .unwrap();
    net.centers
        .register_center(RegisterCenter::new("BCN03", "Centro Barcelona", "Barcelona"))
        .unwrap();
    net.routes
        .create_route(CreateRoute::new(ROUTE, "MAD16", "BCN03"))
        .unwrap();
    net.shipments
        .register_shipment(RegisterShipment::new("ABC123", "Ana", "Luis", 1, "STANDARD"))
        .unwrap();
    net.routes
        .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
        .unwrap();
    net
}

fn inventory(net: &Network, center_id: &str) -> Vec<String> {
    net.centers
        .list_shipments_in_center(center_id)
        .unwrap()
        .iter()
        .map(|s| s.tracking_code().to_string())
        .collect()
}

mod scenarios {
    use super::*;

    #[test]
    fn a_assignment_links_shipment_route_and_origin() {
        let net = assigned_network();

        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert_eq!(
            shipment.assigned_route().map(|r| r.as_str()),
            Some("MAD16-BCN03-STD-001")
        );
        assert_eq!(inventory(&net, "MAD16"), ["ABC123"]);
    }

    #[test]
    fn b_dispatch_moves_shipment_in_transit() {
        let net = assigned_network();

        net.routes.dispatch_route(ROUTE).unwrap();

        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert_eq!(shipment.status(), ShipmentStatus::InTransit);
        assert!(inventory(&net, "MAD16").is_empty());
    }

    #[test]
    fn c_completion_delivers_and_closes_route() {
        let net = assigned_network();
        net.routes.dispatch_route(ROUTE).unwrap();

        net.routes.complete_route(ROUTE).unwrap();

        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert_eq!(inventory(&net, "BCN03"), ["ABC123"]);

        let route = net.routes.get_route(ROUTE).unwrap();
        assert!(!route.is_active());
        assert!(route.list_manifest().is_empty());
    }

    #[test]
    fn d_invalid_routes_are_validation_errors() {
        let net = assigned_network();

        let same = net
            .routes
            .create_route(CreateRoute::new("MAD16-MAD16-STD-002", "MAD16", "MAD16"))
            .unwrap_err();
        assert_eq!(same.kind(), ErrorKind::Validation);

        let bad = net
            .routes
            .create_route(CreateRoute::new("bad-id", "MAD16", "BCN03"))
            .unwrap_err();
        assert_eq!(bad.kind(), ErrorKind::Validation);
        assert!(bad.to_string().contains("bad-id"));
    }

    #[test]
    fn e_fixed_and_floored_priorities() {
        let net = network();
        net.shipments
            .register_shipment(RegisterShipment::new("EXP001", "Ana", "Luis", 1, "EXPRESS"))
            .unwrap();
        net.shipments
            .register_shipment(RegisterShipment::new("FRG001", "Ana", "Luis", 2, "FRAGILE"))
            .unwrap();

        let err = net.shipments.increase_priority("EXP001").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = net.shipments.decrease_priority("FRG001").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(net.shipments.get_shipment("FRG001").unwrap().priority(), 2);
    }
}

mod properties {
    use super::*;

    #[test]
    fn history_is_monotonic_and_counts_successful_updates() {
        let net = network();
        net.shipments
            .register_shipment(RegisterShipment::new("ABC123", "Ana", "Luis", 1, "STANDARD"))
            .unwrap();

        let attempts = [
            "DELIVERED",
            "in_transit",
            "REGISTERED",
            "IN_TRANSIT",
            "delivered",
            "DELIVERED",
        ];
        let successes = attempts
            .iter()
            .filter(|status| {
                net.shipments
                    .update_shipment_status(UpdateShipmentStatus::new("ABC123", **status))
                    .is_ok()
            })
            .count();

        let history = net
            .shipments
            .get_shipment("ABC123")
            .unwrap()
            .status_history()
            .to_vec();
        assert_eq!(successes, 2);
        assert_eq!(history.len(), successes + 1);
        assert!(history.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn assign_then_remove_round_trips() {
        let net = assigned_network();

        net.routes
            .remove_shipment_from_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();

        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert!(shipment.assigned_route().is_none());
        assert!(net.routes.get_route(ROUTE).unwrap().list_manifest().is_empty());
        assert!(inventory(&net, "MAD16").is_empty());

        // Free to be assigned again
        net.routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();
    }

    #[test]
    fn completing_twice_fails() {
        let net = assigned_network();
        net.routes.dispatch_route(ROUTE).unwrap();
        net.routes.complete_route(ROUTE).unwrap();

        let err = net.routes.complete_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InactiveRoute);
        assert!(matches!(err, DomainError::Route(_)));
    }

    #[test]
    fn priority_policies_hold_under_any_sequence() {
        let net = network();
        for (code, kind, priority) in [
            ("STD001", "standard", 2),
            ("FRG001", "fragile", 3),
            ("EXP001", "express", 1),
        ] {
            net.shipments
                .register_shipment(RegisterShipment::new(code, "Ana", "Luis", priority, kind))
                .unwrap();
        }

        // Deterministic up/down pattern
        let pattern = [true, false, false, false, true, true, true, false, false, true];
        for code in ["STD001", "FRG001", "EXP001"] {
            for up in pattern {
                let _ = if up {
                    net.shipments.increase_priority(code)
                } else {
                    net.shipments.decrease_priority(code)
                };

                let shipment = net.shipments.get_shipment(code).unwrap();
                let priority = shipment.priority();
                assert!((1..=3).contains(&priority));
                match shipment.kind() {
                    ShipmentKind::Fragile => assert!(priority >= 2),
                    ShipmentKind::Express => assert_eq!(priority, 3),
                    ShipmentKind::Standard => {}
                }
            }
        }
    }

    #[test]
    fn assigned_iff_on_a_manifest() {
        let net = assigned_network();
        net.shipments
            .register_shipment(RegisterShipment::new("DEF456", "Eva", "Leo", 3, "FRAGILE"))
            .unwrap();

        let check = |net: &Network| {
            let routes = net.routes.list_routes();
            for shipment in net.shipments.list_shipments() {
                let carrying: Vec<_> = routes
                    .iter()
                    .filter(|r| r.contains(shipment.tracking_code().as_str()))
                    .collect();
                match shipment.assigned_route() {
                    Some(route_id) => {
                        assert_eq!(carrying.len(), 1);
                        assert_eq!(carrying[0].route_id(), route_id);
                    }
                    None => assert!(carrying.is_empty()),
                }
            }
        };

        check(&net);
        net.routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "DEF456"))
            .unwrap();
        check(&net);
        net.routes.dispatch_route(ROUTE).unwrap();
        check(&net);
        net.routes.complete_route(ROUTE).unwrap();
        check(&net);
    }

    #[test]
    fn each_code_is_held_by_at_most_one_center() {
        enum Step {
            Receive(&'static str, &'static str),
            Dispatch(&'static str, &'static str),
            Assign(&'static str, &'static str),
            Remove(&'static str, &'static str),
            Status(&'static str, &'static str),
            DispatchRoute(&'static str),
            CompleteRoute(&'static str),
        }
        use Step::*;

        const SOUTH: &str = "MAD16-SEV01-EXP-002";

        let net = assigned_network();
        net.centers
            .register_center(RegisterCenter::new("SEV01", "Centro Sevilla", "Sevilla"))
            .unwrap();
        net.routes
            .create_route(CreateRoute::new(SOUTH, "MAD16", "SEV01"))
            .unwrap();
        for code in ["DEF456", "GHI789", "JKL012"] {
            net.shipments
                .register_shipment(RegisterShipment::new(code, "Eva", "Leo", 1, "STANDARD"))
                .unwrap();
        }

        let check = |net: &Network| {
            let mut holders: HashMap<String, String> = HashMap::new();
            for center in net.centers.list_centers() {
                for code in center.list_inventory() {
                    let here = center.center_id().to_string();
                    if let Some(other) = holders.insert(code.to_string(), here.clone()) {
                        panic!("{code} is held by both {other} and {here}");
                    }
                }
            }
        };

        let steps = [
            Receive("SEV01", "ABC123"),
            Receive("BCN03", "DEF456"),
            Status("DEF456", "IN_TRANSIT"),
            Assign(ROUTE, "DEF456"),
            Dispatch("BCN03", "DEF456"),
            Receive("MAD16", "DEF456"),
            Assign(SOUTH, "GHI789"),
            Status("GHI789", "IN_TRANSIT"),
            Dispatch("MAD16", "GHI789"),
            DispatchRoute(ROUTE),
            Receive("SEV01", "ABC123"),
            Receive("BCN03", "ABC123"),
            Status("ABC123", "DELIVERED"),
            Remove(SOUTH, "GHI789"),
            Assign(ROUTE, "GHI789"),
            Receive("SEV01", "JKL012"),
            CompleteRoute(ROUTE),
            DispatchRoute(ROUTE),
            Receive("SEV01", "GHI789"),
            CompleteRoute(ROUTE),
            Receive("SEV01", "ABC123"),
            Dispatch("BCN03", "ABC123"),
            Assign(SOUTH, "JKL012"),
            Dispatch("SEV01", "JKL012"),
            Assign(SOUTH, "JKL012"),
            Status("JKL012", "DELIVERED"),
            Receive("BCN03", "JKL012"),
            Receive("SEV01", "JKL012"),
            CompleteRoute(SOUTH),
        ];

        check(&net);
        for step in steps {
            // Refusals are expected; only the custody invariant is checked
            let _ = match step {
                Receive(center, code) => net
                    .centers
                    .receive_shipment(MoveShipment::new(center, code))
                    .map(drop),
                Dispatch(center, code) => net
                    .centers
                    .dispatch_shipment(MoveShipment::new(center, code))
                    .map(drop),
                Assign(route, code) => net
                    .routes
                    .assign_shipment_to_route(RouteShipment::new(route, code))
                    .map(drop),
                Remove(route, code) => net
                    .routes
                    .remove_shipment_from_route(RouteShipment::new(route, code))
                    .map(drop),
                Status(code, status) => net
                    .shipments
                    .update_shipment_status(UpdateShipmentStatus::new(code, status))
                    .map(drop),
                DispatchRoute(route) => net.routes.dispatch_route(route).map(drop),
                CompleteRoute(route) => net.routes.complete_route(route).map(drop),
            };
            check(&net);
        }

        assert_eq!(inventory(&net, "BCN03"), ["ABC123", "GHI789", "JKL012"]);
        assert_eq!(inventory(&net, "MAD16"), ["DEF456"]);
        assert!(inventory(&net, "SEV01").is_empty());
    }
}

mod custody {
    use super::*;

    fn with_sevilla(net: &Network) {
        net.centers
            .register_center(RegisterCenter::new("SEV01", "Centro Sevilla", "Sevilla"))
            .unwrap();
    }

    fn holders_of(net: &Network, code: &str) -> Vec<String> {
        net.centers
            .list_centers()
            .iter()
            .filter(|c| c.has(code))
            .map(|c| c.center_id().to_string())
            .collect()
    }

    #[test]
    fn shipment_in_transit_on_a_route_cannot_be_received_elsewhere() {
        let net = assigned_network();
        with_sevilla(&net);
        net.routes.dispatch_route(ROUTE).unwrap();

        let err = net
            .centers
            .receive_shipment(MoveShipment::new("SEV01", "ABC123"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(inventory(&net, "SEV01").is_empty());

        net.routes.complete_route(ROUTE).unwrap();
        assert_eq!(holders_of(&net, "ABC123"), ["BCN03"]);
    }

    #[test]
    fn status_cannot_send_a_routed_shipment_ahead_of_its_route() {
        let net = assigned_network();

        let err = net
            .shipments
            .update_shipment_status(UpdateShipmentStatus::new("ABC123", "IN_TRANSIT"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(
            net.shipments.get_shipment("ABC123").unwrap().status(),
            ShipmentStatus::Registered
        );

        net.routes.dispatch_route(ROUTE).unwrap();
        net.routes.complete_route(ROUTE).unwrap();

        assert!(inventory(&net, "MAD16").is_empty());
        assert_eq!(holders_of(&net, "ABC123"), ["BCN03"]);
        assert_eq!(
            net.shipments.get_shipment("ABC123").unwrap().status_history(),
            [
                ShipmentStatus::Registered,
                ShipmentStatus::InTransit,
                ShipmentStatus::Delivered
            ]
        );
    }

    #[test]
    fn routed_shipment_is_delivered_only_by_completion() {
        let net = assigned_network();
        net.routes.dispatch_route(ROUTE).unwrap();

        let err = net
            .shipments
            .update_shipment_status(UpdateShipmentStatus::new("ABC123", "DELIVERED"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains(ROUTE));

        net.routes.complete_route(ROUTE).unwrap();
        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert_eq!(holders_of(&net, "ABC123"), ["BCN03"]);
    }

    #[test]
    fn held_shipment_goes_in_transit_only_through_dispatch() {
        let net = assigned_network();
        net.shipments
            .register_shipment(RegisterShipment::new("DEF456", "Eva", "Leo", 1, "STANDARD"))
            .unwrap();
        net.centers
            .receive_shipment(MoveShipment::new("BCN03", "DEF456"))
            .unwrap();

        let err = net
            .shipments
            .update_shipment_status(UpdateShipmentStatus::new("DEF456", "in transit"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(err.to_string().contains("BCN03"));

        net.centers
            .dispatch_shipment(MoveShipment::new("BCN03", "DEF456"))
            .unwrap();
        let shipment = net
            .shipments
            .update_shipment_status(UpdateShipmentStatus::new("DEF456", "delivered"))
            .unwrap();
        assert_eq!(shipment.status(), ShipmentStatus::Delivered);
        assert!(holders_of(&net, "DEF456").is_empty());
    }
}

mod open_questions {
    use super::*;

    #[test]
    fn reassignment_requires_removal_first() {
        let net = assigned_network();
        net.routes
            .create_route(CreateRoute::new("MAD16-BCN03-EXP-002", "MAD16", "BCN03"))
            .unwrap();

        let err = net
            .routes
            .assign_shipment_to_route(RouteShipment::new("MAD16-BCN03-EXP-002", "ABC123"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);

        net.routes
            .remove_shipment_from_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap();
        net.routes
            .assign_shipment_to_route(RouteShipment::new("MAD16-BCN03-EXP-002", "ABC123"))
            .unwrap();
    }

    #[test]
    fn dispatched_shipment_stays_on_its_route() {
        let net = assigned_network();
        net.routes.dispatch_route(ROUTE).unwrap();

        let err = net
            .routes
            .remove_shipment_from_route(RouteShipment::new(ROUTE, "ABC123"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(net.routes.get_route(ROUTE).unwrap().contains("ABC123"));
    }

    #[test]
    fn completing_without_dispatch_changes_nothing() {
        let net = assigned_network();

        let err = net.routes.complete_route(ROUTE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        let route = net.routes.get_route(ROUTE).unwrap();
        assert!(route.is_active());
        assert_eq!(inventory(&net, "MAD16"), ["ABC123"]);
        assert!(inventory(&net, "BCN03").is_empty());
    }

    #[test]
    fn shipment_held_by_a_center_cannot_join_a_route() {
        let net = assigned_network();
        net.shipments
            .register_shipment(RegisterShipment::new("DEF456", "Eva", "Leo", 1, "STANDARD"))
            .unwrap();
        net.centers
            .receive_shipment(MoveShipment::new("BCN03", "DEF456"))
            .unwrap();

        let err = net
            .routes
            .assign_shipment_to_route(RouteShipment::new(ROUTE, "DEF456"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert!(!inventory(&net, "MAD16").contains(&"DEF456".to_string()));
    }
}

mod journal {
    use super::*;

    #[test]
    fn every_aggregate_stream_is_versioned() {
        let net = assigned_network();
        net.routes.dispatch_route(ROUTE).unwrap();
        net.routes.complete_route(ROUTE).unwrap();

        let route_events = net.journal.get_events_for_aggregate("Route", ROUTE).unwrap();
        let types: Vec<_> = route_events.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(
            types,
            ["RouteCreated", "ShipmentAdded", "RouteDispatched", "RouteCompleted"]
        );

        let route = net.routes.get_route(ROUTE).unwrap();
        assert_eq!(route.version(), Version::new(4));
        assert_eq!(
            net.journal.get_aggregate_version("Route", ROUTE).unwrap(),
            Some(route.version())
        );

        let shipment = net.shipments.get_shipment("ABC123").unwrap();
        assert_eq!(
            net.journal
                .get_aggregate_version("Shipment", "ABC123")
                .unwrap(),
            Some(shipment.version())
        );
    }

    #[test]
    fn operations_are_tagged_in_metadata() {
        let net = assigned_network();

        let assigned = net
            .journal
            .query_events(EventQuery::for_event_type("RouteAssigned"))
            .unwrap();
        assert_eq!(assigned.len(), 1);
        assert_eq!(
            assigned[0].metadata["operation"],
            serde_json::json!("assign_shipment_to_route")
        );
        assert_eq!(assigned[0].payload["type"], "RouteAssigned");
    }

    #[test]
    fn batch_assignment_journals_only_successes() {
        let net = assigned_network();
        net.shipments
            .register_shipment(RegisterShipment::new("DEF456", "Eva", "Leo", 1, "STANDARD"))
            .unwrap();

        let summary = net
            .routes
            .assign_shipments_to_route(AssignShipments::new(ROUTE, ["DEF456", "ABC123"]))
            .unwrap();
        assert_eq!(summary.assigned, ["DEF456"]);
        assert_eq!(summary.failed.len(), 1);

        let added = net.journal.get_events_by_type("ShipmentAdded").unwrap();
        assert_eq!(added.len(), 2);
    }
}
