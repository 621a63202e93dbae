use memkmc::analysis::properties::{
    build_properties, compute_grid_fractions, compute_iec, compute_lambda, compute_water_uptake,
    count_grid_voxels, count_particles,
};
use memkmc::{Atom, LabelGrid, TypeClassMap};
use nalgebra::Vector3;
use std::collections::BTreeMap;

fn atom(type_id: u32) -> Atom {
    Atom {
        position: Vector3::zeros(),
        type_id,
    }
}

fn membrane_types() -> TypeClassMap {
    TypeClassMap::from_entries([(1, "polymer"), (2, "water"), (3, "tma")])
}

/// 6 water, 3 polymer, 2 tma particles.
fn sample_atoms() -> Vec<Atom> {
    let mut atoms = Vec::new();
    atoms.extend((0..6).map(|_| atom(2)));
    atoms.extend((0..3).map(|_| atom(1)));
    atoms.extend((0..2).map(|_| atom(3)));
    atoms
}

/// 3x2x1 grid: 2 water, 2 polymer, 1 tma voxels, 1 void.
fn sample_grid() -> LabelGrid {
    let palette = vec!["polymer".into(), "tma".into(), "water".into()];
    let mut grid = LabelGrid::new([3, 2, 1], 4.0, palette);
    grid.set_label([0, 0, 0], "water").unwrap();
    grid.set_label([1, 0, 0], "water").unwrap();
    grid.set_label([2, 0, 0], "polymer").unwrap();
    grid.set_label([0, 1, 0], "polymer").unwrap();
    grid.set_label([1, 1, 0], "tma").unwrap();
    grid
}

#[test]
fn particle_counts_tally_by_class() {
    let counts = count_particles(&sample_atoms(), &membrane_types());
    assert_eq!(counts.total, 11);
    assert_eq!(counts.by_class.get("water"), Some(&6));
    assert_eq!(counts.by_class.get("polymer"), Some(&3));
    assert_eq!(counts.by_class.get("tma"), Some(&2));
}

#[test]
fn unmapped_particle_types_are_counted_as_unknown() {
    let counts = count_particles(&[atom(99)], &membrane_types());
    assert_eq!(counts.by_class.get("unknown"), Some(&1));
}

#[test]
fn grid_counts_include_the_void_sentinel() {
    let counts = count_grid_voxels(&sample_grid());
    assert_eq!(counts.total, 6);
    assert_eq!(counts.by_class.get("water"), Some(&2));
    assert_eq!(counts.by_class.get("polymer"), Some(&2));
    assert_eq!(counts.by_class.get("tma"), Some(&1));
    assert_eq!(counts.by_class.get("void"), Some(&1));
}

#[test]
fn lambda_is_water_per_tma() {
    let counts = count_particles(&sample_atoms(), &membrane_types());
    assert_eq!(compute_lambda(&counts).unwrap(), 3.0);

    let no_tma = count_particles(&[atom(2)], &membrane_types());
    assert!(compute_lambda(&no_tma).is_err());
}

#[test]
fn grid_fractions_follow_reference_formulas() {
    let counts = count_grid_voxels(&sample_grid());
    let (fv, vwu) = compute_grid_fractions(&counts).unwrap();
    // FV = water / (total - tma) = 2 / 5, VWU = water / (total - water) = 2 / 4.
    assert!((fv - 0.4).abs() < 1e-12);
    assert!((vwu - 0.5).abs() < 1e-12);
}

#[test]
fn water_uptake_is_mass_fraction_of_water() {
    let counts = count_particles(&sample_atoms(), &membrane_types());
    let masses: BTreeMap<String, f64> = [
        ("water".to_string(), 18.0),
        ("polymer".to_string(), 100.0),
        ("tma".to_string(), 60.0),
    ]
    .into();
    let wu = compute_water_uptake(&counts, &masses).unwrap();
    // m_water = 108, m_dry = 300 + 120.
    assert!((wu - 108.0 / 528.0).abs() < 1e-12);
}

#[test]
fn iec_scales_with_tma_count_over_dry_mass() {
    let counts = count_particles(&sample_atoms(), &membrane_types());
    let proportional = compute_iec(&counts, 4.0, 1, false).unwrap();
    assert!((proportional - 0.5).abs() < 1e-12);

    let molar = compute_iec(&counts, 4.0, 1, true).unwrap();
    assert!(molar < proportional);
    assert!(compute_iec(&counts, 0.0, 1, false).is_err());
}

#[test]
fn property_record_combines_particle_and_grid_views() {
    let particles = count_particles(&sample_atoms(), &membrane_types());
    let grid_counts = count_grid_voxels(&sample_grid());
    let props = build_properties(&particles, &grid_counts, None, Some(0.2)).unwrap();

    assert_eq!(props.n_water, 6);
    assert_eq!(props.n_tma, 2);
    assert_eq!(props.lam, 3.0);
    assert_eq!(props.n_part, 11);
    assert_eq!(props.n_water_grid, 2);
    assert_eq!(props.n_tma_grid, 1);
    assert_eq!(props.n_pol_grid, 5);
    assert_eq!(props.iec, None);
    assert_eq!(props.wu, Some(0.2));
}
