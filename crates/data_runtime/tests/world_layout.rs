use collision_static::{LayerMask, SpatialQuery};
use data_runtime::world::{ColliderSpec, LayerName, WorldLayout, load_world};
use glam::Vec3;

const LAYOUT: &str = r#"{
  "name": "courtyard",
  "colliders": [
    { "kind": "box", "min": [-20, -1, -20], "max": [20, 0, 20] },
    { "kind": "box", "min": [-5, 0, -12], "max": [5, 6, -10] },
    { "kind": "cylinder", "center": [0, 2, 8], "radius": 0.05, "half_height": 2, "layer": "thin" }
  ]
}"#;

#[test]
fn layout_parses_and_builds_index() {
    let layout: WorldLayout = serde_json::from_str(LAYOUT).expect("parse");
    layout.validate().expect("valid");
    assert_eq!(layout.colliders.len(), 3);
    assert!(matches!(
        layout.colliders[2],
        ColliderSpec::Cylinder {
            layer: LayerName::Thin,
            ..
        }
    ));
    let idx = layout.build_index();
    assert_eq!(idx.len(), 3);
    let thin = idx.overlap_sphere(Vec3::new(0.0, 2.0, 8.0), 0.2, LayerMask::thin());
    assert_eq!(thin.len(), 1);
}

#[test]
fn unknown_fields_are_rejected() {
    let bad = r#"{ "colliders": [ { "kind": "box", "min": [0,0,0], "max": [1,1,1], "mass": 3 } ] }"#;
    assert!(serde_json::from_str::<WorldLayout>(bad).is_err());
}

#[test]
fn load_world_validates_extents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let p = dir.path().join("world.json");
    std::fs::write(
        &p,
        r#"{ "colliders": [ { "kind": "box", "min": [1,0,0], "max": [0,1,1] } ] }"#,
    )
    .unwrap();
    assert!(load_world(&p).is_err());
    assert!(load_world(dir.path().join("missing.json")).is_err());
}

#[test]
fn shipped_courtyard_loads() {
    let path = data_runtime::loader::data_root()
        .join("worlds")
        .join("courtyard.json");
    let w = load_world(&path).expect("courtyard");
    assert_eq!(w.name, "courtyard");
    assert!(!w.build_index().is_empty());
}
