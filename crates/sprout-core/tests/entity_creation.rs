//! End-to-end entity, prototype, and polygon construction through the engine.

use std::rc::Rc;

use sprout_core::{
    Engine, EngineConfig, EntityOptions, FactoryError, Label, Point, Polygon, PropertyValue,
    Simulation, SimulationError, Specialization, Vec3, World, segments,
};

fn setup_engine() -> Engine {
    Engine::new(EngineConfig::default()).unwrap()
}

#[test]
fn test_lookup_is_idempotent() {
    let engine = setup_engine();
    let db = engine.prototypes();

    let p = db.lookup("truck").unwrap();
    let again = db.lookup(db.lookup(&p).unwrap()).unwrap();
    assert!(Rc::ptr_eq(&p, &again));
}

#[test]
fn test_specialized_property_shadows_parent() {
    let mut engine = setup_engine();
    let db = engine.prototypes_mut();
    db.specialize("entity", Specialization::new("parent").property("p", 1))
        .unwrap();
    db.specialize("parent", Specialization::new("child").property("p", 2))
        .unwrap();

    let mut world = World::new();
    let mut factory = engine.factory(&mut world);
    let child = factory
        .create_entity(EntityOptions::new("c").prototype("child"), false)
        .unwrap();
    let parent = factory
        .create_entity(EntityOptions::new("p").prototype("parent"), false)
        .unwrap();

    assert_eq!(child.borrow().get_prop("p"), Some(&PropertyValue::Number(2.0)));
    assert_eq!(parent.borrow().get_prop("p"), Some(&PropertyValue::Number(1.0)));
}

#[test]
fn test_duplicate_then_fresh_name() {
    let engine = setup_engine();
    let mut world = World::new();
    let mut factory = engine.factory(&mut world);

    factory
        .create_entity(EntityOptions::new("alpha").prototype("truck"), false)
        .unwrap();
    let err = factory
        .create_entity(EntityOptions::new("alpha").prototype("truck"), false)
        .unwrap_err();
    assert!(matches!(
        err,
        FactoryError::Simulation(SimulationError::DuplicateEntityName(_))
    ));

    let beta = factory
        .create_entity(EntityOptions::new("beta").prototype("truck"), false)
        .unwrap();
    let found = world.get_entity("beta").unwrap();
    assert!(Rc::ptr_eq(&beta, &found));
}

#[test]
fn test_truck_with_only_x() {
    let engine = setup_engine();
    let mut world = World::new();

    let truck = engine
        .factory(&mut world)
        .create_entity(EntityOptions::new("a").prototype("truck").x(-100.0), false)
        .unwrap();

    assert_eq!(truck.borrow().position(), Vec3::new(-100.0, 0.0, 0.0));
}

#[test]
fn test_creation_properties_reach_default_capabilities() {
    let engine = setup_engine();
    let mut world = World::new();
    let mut factory = engine.factory(&mut world);

    let rebel = factory
        .create_entity(
            EntityOptions::new("Rebel20")
                .prototype("truck")
                .x(100.0)
                .property("shape.label.visible", false),
            false,
        )
        .unwrap();
    let route = factory
        .polygons()
        .route(
            EntityOptions::new("patrol").property("polygon.closed", true),
            ["Rebel20", "w1"],
        )
        .unwrap();

    let rebel = rebel.borrow();
    assert_eq!(
        rebel.get_prop("shape.label.visible"),
        Some(&PropertyValue::Bool(false))
    );
    assert!(!rebel.capability::<Label>().unwrap().visible);

    let route = route.borrow();
    assert!(route.capability::<Polygon>().unwrap().is_closed());
}

#[test]
fn test_route_from_mixed_points() {
    let engine = setup_engine();
    let mut world = World::new();
    let mut factory = engine.factory(&mut world);
    let known = factory
        .create_entity(EntityOptions::new("known-entity").prototype("truck"), false)
        .unwrap();

    let points: Vec<Point> = vec![
        "known-entity".into(),
        EntityOptions::new("w1").x(5.0).y(5.0).into(),
        "missing-name".into(),
    ];
    let route = factory.polygons().route("r", points).unwrap();

    let route = route.borrow();
    let polygon = route.capability::<Polygon>().unwrap();
    assert_eq!(polygon.points().len(), 3);
    assert!(Rc::ptr_eq(&polygon.points()[0], &known));
    assert_eq!(polygon.points()[1].borrow().position(), Vec3::new(5.0, 5.0, 0.0));
    assert_eq!(polygon.points()[2].borrow().position(), Vec3::ZERO);
    assert_eq!(polygon.point_names(), vec!["known-entity", "w1", "missing-name"]);
}

#[test]
fn test_polygon_created_before_points() {
    let engine = setup_engine();
    let mut world = World::new();

    engine
        .factory(&mut world)
        .polygons()
        .area("zone", ["a", "b", "c"])
        .unwrap();

    let names: Vec<String> = world
        .entities()
        .iter()
        .map(|e| e.borrow().name().to_string())
        .collect();
    assert_eq!(names, vec!["zone", "a", "b", "c"]);
}

#[test]
fn test_segments_chain() {
    let head = segments([("n0", 5.0), ("n1", 6.0), ("n2", 7.0)]).unwrap();

    let n1 = head.next.as_ref().unwrap();
    let n2 = n1.next.as_ref().unwrap();
    assert_eq!(head.waypoint, "n0");
    assert_eq!(n1.waypoint, "n1");
    assert_eq!(n2.waypoint, "n2");
    assert!(n2.next.is_none());
}

#[test]
fn test_segment_waypoints_resolve_in_world() {
    let engine = setup_engine();
    let mut world = World::new();
    engine
        .factory(&mut world)
        .polygons()
        .route("patrol", ["gate", "tower"])
        .unwrap();

    let head = engine.segments(["gate", "tower"]).unwrap();
    for segment in head.iter() {
        assert!(segment.waypoint_entity(&world).is_some());
    }
}

#[test]
fn test_world_snapshot() {
    let engine = setup_engine();
    let mut world = World::new();
    engine
        .factory(&mut world)
        .polygons()
        .route("r", ["a", "b"])
        .unwrap();

    let snapshot = world.snapshot();
    assert_eq!(snapshot[0]["prototype"], "route");
    assert_eq!(snapshot[0]["capabilities"][0]["type"], "polygon");
    assert_eq!(
        snapshot[0]["capabilities"][0]["state"]["points"],
        serde_json::json!(["a", "b"])
    );
}
