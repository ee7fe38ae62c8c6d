// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end conversion runs over programmatically built source trees.

use approx::assert_relative_eq;
use geoconv_core::{
    BooleanOperator, MaterialHandle, ShapeHandle, ShapeKind, SourceMaterial, SourceMatrix,
    SourceShape, SourceTree, SourceVolume, TrapParams, VolumeHandle,
};
use geoconv_geometry::{SolidKind, Vector3};
use geoconv_processing::{convert, ConvertConfig, ConvertError, VolumeRef, Warning};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cube(tree: &mut SourceTree, name: &str, half: f64) -> ShapeHandle {
    tree.add_shape(SourceShape::new(
        name,
        ShapeKind::Box {
            dx: half,
            dy: half,
            dz: half,
        },
    ))
}

/// World box of half-length 100 filled with air
fn world(tree: &mut SourceTree) -> (VolumeHandle, MaterialHandle) {
    let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
    let shape = cube(tree, "world", 100.0);
    let world = tree.add_volume(SourceVolume::new("World", shape, air));
    tree.set_top_volume(world);
    (world, air)
}

#[test]
fn shared_objects_are_built_once() {
    init_tracing();
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let cell = cube(&mut tree, "cell", 1.0);
    let cell_volume = tree.add_volume(SourceVolume::new("Cell", cell, air));
    let other_volume = tree.add_volume(SourceVolume::new("Other", cell, air));
    let shift = tree.add_matrix(SourceMatrix::translation("shift", [0.0, 0.0, 5.0]));
    for copy in 0..3 {
        tree.add_daughter(world, "cell_pv", shift, copy, cell_volume).unwrap();
    }
    tree.add_daughter(world, "other_pv", shift, 0, other_volume).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();

    // world box + one shared cell box
    assert_eq!(registry.solids().len(), 2);
    assert_eq!(conversion.shape_references(cell), 2);
    assert_eq!(registry.logical_volumes().count(), 3);
    assert_eq!(conversion.volume_references(cell_volume), 3);
    assert_eq!(conversion.matrix_references(shift), 4);
    // load + World + Cell + Other
    assert_eq!(conversion.material_references(air), 4);
    assert_eq!(registry.physical_volumes().count(), 4);
    assert!(conversion.warnings().is_empty());
}

#[test]
fn distinct_objects_with_equal_parameters_stay_distinct() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let a = cube(&mut tree, "cell", 1.0);
    let b = cube(&mut tree, "cell", 1.0);
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    let va = tree.add_volume(SourceVolume::new("Cell", a, air));
    let vb = tree.add_volume(SourceVolume::new("Cell", b, air));
    tree.add_daughter(world, "pv", id, 0, va).unwrap();
    tree.add_daughter(world, "pv", id, 1, vb).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();
    let mut solid_names: Vec<_> =
        registry.solids().iter().map(|(_, s)| s.name().to_string()).collect();
    solid_names.sort();
    assert_eq!(solid_names, vec!["cell", "cell_1", "world"]);
    assert!(registry.find_logical_volume("Cell").is_some());
    assert!(registry.find_logical_volume("Cell_1").is_some());
    let pv_names: Vec<_> = registry.physical_volumes().map(|(_, pv)| pv.name.clone()).collect();
    assert_eq!(pv_names, vec!["pv", "pv_1"]);
}

#[test]
fn unsupported_primitive_degrades_to_bounding_box() {
    init_tracing();
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let arb = tree.add_shape(SourceShape::new(
        "arb",
        ShapeKind::Unsupported {
            class_name: "Arb8".to_string(),
            dx: 1.0,
            dy: 2.0,
            dz: 3.0,
        },
    ));
    let v = tree.add_volume(SourceVolume::new("Arb", arb, air));
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    tree.add_daughter(world, "arb_pv", id, 0, v).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    assert_eq!(
        conversion.warnings(),
        &[Warning::UnsupportedPrimitive {
            shape: "arb".to_string(),
            class: "Arb8".to_string(),
        }]
    );

    let registry = conversion.registry();
    let lv = registry.find_logical_volume("Arb").and_then(|k| registry.logical_volume(k)).unwrap();
    match registry.solids().get(lv.solid).unwrap().kind() {
        SolidKind::Box { dx, dy, dz } => {
            assert_relative_eq!(*dx, 10.0);
            assert_relative_eq!(*dy, 20.0);
            assert_relative_eq!(*dz, 30.0);
        }
        other => panic!("Expected a bounding box, got {:?}", other),
    }
}

#[test]
fn unknown_boolean_operator_aborts() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let a = cube(&mut tree, "a", 1.0);
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    let odd = tree.add_shape(SourceShape::new(
        "odd",
        ShapeKind::Composite {
            operator: BooleanOperator::Other("symmetric_difference".to_string()),
            left: a,
            right: a,
            left_matrix: id,
            right_matrix: id,
        },
    ));
    let v = tree.add_volume(SourceVolume::new("Odd", odd, air));
    tree.add_daughter(world, "odd_pv", id, 0, v).unwrap();

    match convert(&tree, &ConvertConfig::default()) {
        Err(ConvertError::UnknownBooleanOperator { shape, operator }) => {
            assert_eq!(shape, "odd");
            assert_eq!(operator, "symmetric_difference");
        }
        other => panic!("Expected UnknownBooleanOperator, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn singular_placement_aborts() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let cell = cube(&mut tree, "cell", 1.0);
    let v = tree.add_volume(SourceVolume::new("Cell", cell, air));
    let flat = tree.add_matrix(SourceMatrix::new(
        "flat",
        [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0],
        [0.0; 3],
    ));
    tree.add_daughter(world, "cell_pv", flat, 0, v).unwrap();

    assert!(matches!(
        convert(&tree, &ConvertConfig::default()),
        Err(ConvertError::TransformInversion { matrix }) if matrix == "flat"
    ));
}

#[test]
fn unbuildable_daughter_is_skipped() {
    init_tracing();
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let empty = tree.add_shape(SourceShape::new(
        "empty_trap",
        ShapeKind::Trap(TrapParams {
            dz: 1.0,
            theta: 0.0,
            phi: 0.0,
            h1: 0.0,
            bl1: 1.0,
            tl1: 1.0,
            alpha1: 0.0,
            h2: 1.0,
            bl2: 1.0,
            tl2: 1.0,
            alpha2: 0.0,
        }),
    ));
    let cell = cube(&mut tree, "cell", 1.0);
    let bad = tree.add_volume(SourceVolume::new("Bad", empty, air));
    let good = tree.add_volume(SourceVolume::new("Good", cell, air));
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    tree.add_daughter(world, "bad_pv", id, 0, bad).unwrap();
    tree.add_daughter(world, "bad_again_pv", id, 1, bad).unwrap();
    tree.add_daughter(world, "good_pv", id, 0, good).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();
    let placed: Vec<_> = registry.physical_volumes().map(|(_, pv)| pv.name.clone()).collect();
    assert_eq!(placed, vec!["good_pv"]);
    assert!(registry.find_logical_volume("Bad").is_none());

    let warnings = conversion.warnings();
    assert_eq!(warnings.len(), 3);
    assert!(matches!(
        &warnings[0],
        Warning::DegenerateSolid { shape, .. } if shape == "empty_trap"
    ));
    assert_eq!(
        warnings[1],
        Warning::UnbuildableDaughter {
            placement: "bad_pv".to_string(),
            parent: "World".to_string(),
            volume: "Bad".to_string(),
        }
    );
    assert!(matches!(
        &warnings[2],
        Warning::UnbuildableDaughter { placement, .. } if placement == "bad_again_pv"
    ));
    // the shape is given up on once and not rebuilt for the second placement
    assert_eq!(conversion.shape_references(empty), 1);
}

#[test]
fn unbuildable_world_is_fatal() {
    let mut tree = SourceTree::new();
    let air = tree.add_material(SourceMaterial::single_element("Air", 7.0, 14.0, 0.0012));
    let flat = cube(&mut tree, "flat", 0.0);
    let world = tree.add_volume(SourceVolume::new("World", flat, air));
    tree.set_top_volume(world);

    assert!(matches!(
        convert(&tree, &ConvertConfig::default()),
        Err(ConvertError::UnbuildableWorld(name)) if name == "World"
    ));
}

#[test]
fn zero_density_material_is_replaced_by_vacuum() {
    let mut tree = SourceTree::new();
    let vacuum = tree.add_material(SourceMaterial::single_element("Vacuum", 1.0, 1.01, 0.0));
    let shape = cube(&mut tree, "world", 10.0);
    let world = tree.add_volume(SourceVolume::new("World", shape, vacuum));
    tree.set_top_volume(world);

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();
    let lv = registry
        .find_logical_volume("World")
        .and_then(|k| registry.logical_volume(k))
        .unwrap();
    let material = registry.material(lv.material).unwrap();
    assert_eq!(material.name, "G4_Galactic");
    assert_eq!(material.kind(), "predefined");

    let custom = ConvertConfig::default().with_vacuum_material("G4_AIR");
    let conversion = convert(&tree, &custom).unwrap();
    assert!(conversion.registry().find_material("G4_AIR").is_some());
}

#[test]
fn placements_carry_inverse_frame_rotation() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let cell = cube(&mut tree, "cell", 1.0);
    let v = tree.add_volume(SourceVolume::new("Cell", cell, air));
    let m = tree.add_matrix(SourceMatrix::rotation_z("rot", 90.0, [1.0, 2.0, 3.0]));
    tree.add_daughter(world, "cell_pv", m, 7, v).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let (_, pv) = conversion.registry().physical_volumes().next().unwrap();
    assert_eq!(pv.copy_number, 7);
    assert_relative_eq!(pv.translation(), Vector3::new(10.0, 20.0, 30.0), epsilon = 1e-9);
    // frame rotation is the inverse of the +90° placement rotation
    let quarter_turn = Vector3::new(0.0, 0.0, -std::f64::consts::FRAC_PI_2);
    assert_relative_eq!(pv.rotation, quarter_turn, epsilon = 1e-9);
}

#[test]
fn assemblies_hold_placements() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let cell = cube(&mut tree, "cell", 1.0);
    let v = tree.add_volume(SourceVolume::new("Cell", cell, air));
    let group = tree.add_volume(SourceVolume::assembly("Group"));
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    let up = tree.add_matrix(SourceMatrix::translation("up", [0.0, 0.0, 3.0]));
    tree.add_daughter(group, "low", id, 0, v).unwrap();
    tree.add_daughter(group, "high", up, 1, v).unwrap();
    tree.add_daughter(world, "group_pv", id, 0, group).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();
    let (key, assembly) = registry.assemblies().next().unwrap();
    assert_eq!(assembly.name, "Group");
    assert_eq!(registry.daughters(VolumeRef::Assembly(key)).len(), 2);

    let world_ref = registry.world().unwrap();
    let placed = registry.daughters(world_ref);
    assert_eq!(placed.len(), 1);
    let group_pv = registry.physical_volume(placed[0]).unwrap();
    assert_eq!(group_pv.volume, VolumeRef::Assembly(key));
}

#[test]
fn composite_operands_resolve_before_the_boolean() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let a = cube(&mut tree, "a", 1.0);
    let b = cube(&mut tree, "b", 1.0);
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    let shift = tree.add_matrix(SourceMatrix::translation("shift", [1.0, 0.0, 0.0]));
    let union = tree.add_shape(SourceShape::new(
        "ab",
        ShapeKind::Composite {
            operator: BooleanOperator::Union,
            left: a,
            right: b,
            left_matrix: id,
            right_matrix: shift,
        },
    ));
    let v = tree.add_volume(SourceVolume::new("AB", union, air));
    tree.add_daughter(world, "ab_pv", id, 0, v).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let registry = conversion.registry();
    let names: Vec<_> = registry.solids().iter().map(|(_, s)| s.name().to_string()).collect();
    assert_eq!(names, vec!["world", "a", "b", "ab"]);

    let lv = registry.find_logical_volume("AB").and_then(|k| registry.logical_volume(k)).unwrap();
    let mesh = registry.solid_mesh(lv.solid).unwrap();
    // two 20 mm cubes overlapping by 10 mm along x
    assert_relative_eq!(mesh.volume(), 12000.0, epsilon = 1e-6);
    let (min, max) = mesh.bounds();
    assert_relative_eq!(min.x, -10.0, epsilon = 1e-9);
    assert_relative_eq!(max.x, 20.0, epsilon = 1e-9);
}

#[test]
fn tessellation_on_request() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let tube = tree.add_shape(SourceShape::new(
        "pipe",
        ShapeKind::Tube {
            rmin: 0.5,
            rmax: 1.0,
            dz: 2.0,
        },
    ));
    let v = tree.add_volume(SourceVolume::new("Pipe", tube, air));
    let id = tree.add_matrix(SourceMatrix::identity("id"));
    tree.add_daughter(world, "pipe_pv", id, 0, v).unwrap();

    let config = ConvertConfig::default().with_solids_to_tessellate(["pipe"]);
    let conversion = convert(&tree, &config).unwrap();
    let summary = conversion.registry().summary();
    let pipe = summary.solids.iter().find(|s| s.name == "pipe").unwrap();
    assert_eq!(pipe.kind, "tessellated");
    let world_solid = summary.solids.iter().find(|s| s.name == "world").unwrap();
    assert_eq!(world_solid.kind, "box");
}

#[test]
fn summary_serializes_to_json() {
    let mut tree = SourceTree::new();
    let (world, air) = world(&mut tree);
    let cell = cube(&mut tree, "cell", 1.0);
    let v = tree.add_volume(SourceVolume::new("Cell", cell, air));
    let m = tree.add_matrix(SourceMatrix::translation("m", [0.0, 0.0, 1.0]));
    tree.add_daughter(world, "cell_pv", m, 0, v).unwrap();

    let conversion = convert(&tree, &ConvertConfig::default()).unwrap();
    let text = conversion.registry().to_json().unwrap();
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["world"], "World");
    assert_eq!(json["logical_volumes"][0]["daughters"], 1);
    assert_eq!(json["physical_volumes"][0]["mother"], "World");
    assert_eq!(json["physical_volumes"][0]["translation"][2], 10.0);
    assert_eq!(json["materials"][0]["name"], "Air");
    assert_eq!(json["materials"][0]["kind"], "single_element");
}
