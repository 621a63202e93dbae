use memkmc::analysis::specnum;
use memkmc::io::{grid as grid_io, lammps, maps, zacros};
use memkmc::{bin_atoms, map_initial_state, LabelGrid, SiteLattice, Stencil};
use std::path::PathBuf;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn scratch(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("memkmc_test_{}_{name}", std::process::id()))
}

#[test]
fn lammps_data_reader_parses_box_and_atoms() {
    let (bbox, atoms) =
        lammps::read_lammps_data(&fixture("small_membrane.data"), [true; 3]).expect("parse .data");

    assert_eq!(atoms.len(), 8);
    assert_eq!(bbox.extents.x, 8.0);
    assert_eq!(bbox.extents.y, 8.0);
    assert_eq!(bbox.extents.z, 8.0);
    assert_eq!(atoms[0].type_id, 2);
    assert_eq!(atoms[0].position.x, 1.0);
    assert_eq!(atoms[7].type_id, 1);
    assert_eq!(atoms[7].position.z, 6.0);
}

#[test]
fn lammpstrj_reader_selects_frames_and_maps_columns() {
    let path = fixture("two_frames.lammpstrj");

    // Frame 0: the water atom starts at x = 1.0.
    let (bbox, first) = lammps::read_lammpstrj(&path, lammps::Frame::Index(0), [true; 3]).unwrap();
    assert_eq!(bbox.extents.x, 8.0);
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].type_id, 2);
    assert_eq!(first[0].position.x, 1.0);
    assert_eq!(first[1].type_id, 1);
    assert_eq!(first[1].position.y, 2.0);

    // Last frame: both atoms have moved. The fixture puts "type" after the
    // coordinates, so this also checks the column lookup.
    let (_, last) = lammps::read_lammpstrj(&path, lammps::Frame::Last, [true; 3]).unwrap();
    assert_eq!(last[0].position.x, 3.0);
    assert_eq!(last[1].position.z, 6.0);
    assert_eq!(last[0].type_id, 2);

    assert!(lammps::read_lammpstrj(&path, lammps::Frame::Index(5), [true; 3]).is_err());
}

#[test]
fn mapping_loaders_skip_comments_and_blanks() {
    let type_map = maps::load_type_classes(&fixture("type_classes.txt")).unwrap();
    assert_eq!(type_map.label_for(1), Some("polymer"));
    assert_eq!(type_map.label_for(2), Some("water"));
    assert_eq!(type_map.label_for(3), None);

    let species = maps::load_label_species(&fixture("label_species.txt")).unwrap();
    assert_eq!(species.species_for("water"), Some("mw*"));
    assert_eq!(species.species_for("polymer"), Some("mem*"));
    assert_eq!(species.species_for("void"), None);
}

#[test]
fn grid_artifact_round_trips_through_file() {
    let (bbox, atoms) =
        lammps::read_lammps_data(&fixture("small_membrane.data"), [true; 3]).unwrap();
    let type_map = maps::load_type_classes(&fixture("type_classes.txt")).unwrap();
    let binned = bin_atoms(&atoms, &bbox, 4.0).unwrap();
    let grid = LabelGrid::assemble(&atoms, &binned, &type_map).unwrap();

    let path = scratch("roundtrip.xyz");
    grid_io::write_grid_xyz_file(&path, &grid).unwrap();
    let reread = grid_io::read_grid_xyz(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(reread.dims(), grid.dims());
    assert_eq!(reread.spacing(), grid.spacing());
    assert_eq!(reread.occupied_count(), grid.occupied_count());
    for (cell, label) in grid.iter_cells() {
        assert_eq!(reread.label_at(cell), label);
    }
}

#[test]
fn grid_artifact_lists_occupied_cells_in_canonical_order() {
    let mut grid = LabelGrid::new([2, 2, 1], 4.0, vec!["water".into(), "polymer".into()]);
    grid.set_label([0, 0, 0], "water").unwrap();
    grid.set_label([1, 1, 0], "polymer").unwrap();

    let mut buf = Vec::new();
    grid_io::write_grid_xyz(&mut buf, &grid).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text, "2\n# 2 2 1 4\nwater 0 0 0\npolymer 1 1 0\n");
}

#[test]
fn zacros_lattice_file_uses_one_based_sorted_neighbors() {
    let mut grid = LabelGrid::new([2, 1, 1], 1.0, vec!["polymer".to_string()]);
    grid.set_label([0, 0, 0], "polymer").unwrap();
    grid.set_label([1, 0, 0], "polymer").unwrap();
    let lattice = SiteLattice::build(&grid, [false; 3], Stencil::VonNeumann).unwrap();

    let mut buf = Vec::new();
    zacros::write_lattice(&mut buf, &lattice, "G").unwrap();
    let text = String::from_utf8(buf).unwrap();
    let expected = "\
lattice explicit
n_sites            2
max_coord          6
n_site_types   1
site_type_names    G
lattice_structure
1 0.000000 0.000000 0.000000 1 2
2 0.500000 0.000000 0.000000 1 1
end_lattice_structure
end_lattice
";
    assert_eq!(text, expected);
}

#[test]
fn zacros_initial_state_file_matches_site_order() {
    let mut grid = LabelGrid::new([2, 1, 1], 1.0, vec!["polymer".into(), "water".into()]);
    grid.set_label([0, 0, 0], "water").unwrap();
    grid.set_label([1, 0, 0], "polymer").unwrap();
    let lattice = SiteLattice::build(&grid, [false; 3], Stencil::VonNeumann).unwrap();
    let species = memkmc::LabelSpeciesMap::from_entries([("water", "mw*"), ("polymer", "mem*")]);
    let occupation = map_initial_state(&lattice, &species).unwrap();

    let mut buf = Vec::new();
    zacros::write_initial_state(&mut buf, &occupation).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(
        text,
        "initial_state\nseed_on_sites mw* 1\nseed_on_sites mem* 2\nend_initial_state\n"
    );
}

#[test]
fn zacros_simulation_file_carries_seed_and_terminator() {
    let params = zacros::SimulationParams::with_seed(4242);
    let mut buf = Vec::new();
    zacros::write_simulation(&mut buf, &params).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("random_seed               4242\n"));
    assert!(text.contains("n_gas_species             3"));
    assert!(text.contains("n_surf_species            4"));
    assert!(text.contains("max_steps                 80000"));
    assert!(text.trim_end().ends_with("finish"));
}

#[test]
fn zacros_mechanism_file_lists_all_four_steps() {
    let mut buf = Vec::new();
    zacros::write_mechanism(&mut buf, &zacros::MechanismRates::default()).unwrap();
    let text = String::from_utf8(buf).unwrap();

    for step in ["sn2_degradation", "wat_removal1", "wat_removal2", "hew_elimination"] {
        assert!(text.contains(&format!("step {step}")), "missing step {step}");
    }
    assert!(text.contains("pre_expon  0.5"));
    // Large pre-exponentials carry a signed two-digit exponent.
    assert!(text.contains("pre_expon  2.5e+12"));
    assert!(text.contains("pre_expon  1e+11"));
    assert!(text.contains("pre_expon  1e+08"));
    assert!(text.trim_end().ends_with("end_mechanism"));
}

#[test]
fn zacros_energetics_file_lists_sites_and_interactions() {
    let mut buf = Vec::new();
    zacros::write_energetics(&mut buf, &zacros::EnergeticsParams::default()).unwrap();
    let text = String::from_utf8(buf).unwrap();

    for cluster in ["mem_site", "mw_site", "tma_site", "hew_site"] {
        assert!(text.contains(&format!("cluster {cluster}")));
    }
    assert!(text.contains("cluster tma*-mw*_Interaction"));
    assert!(text.contains("cluster tma*-hew*_Interaction"));
    assert!(text.contains("cluster_eng -1.00 # eV"));
    assert!(text.trim_end().ends_with("end_energetics"));
}

#[test]
fn zacros_energetics_file_honors_custom_energies() {
    let params = zacros::EnergeticsParams {
        e_mem: -0.50,
        e_mw: -1.25,
        e_tma: -1.0,
        e_hew: -1.0,
        e_tma_mw: -0.25,
        e_tma_hew: -0.18,
    };
    let mut buf = Vec::new();
    zacros::write_energetics(&mut buf, &params).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.contains("cluster_eng -0.50 # eV"));
    assert!(text.contains("cluster_eng -1.25 # eV"));
    assert!(text.contains("cluster_eng -0.25\n"));
    assert!(text.contains("cluster_eng -0.18\n"));
}

#[test]
fn specnum_analysis_reproduces_reference_formulas() {
    let series = specnum::analyze_specnum_file(&fixture("specnum_demo.txt")).unwrap();

    assert_eq!(series.time, vec![0.0, 2.5, 5.0]);
    assert_eq!(series.tma, vec![100.0, 90.0, 80.0]);

    // Row 0: VWU = 50/300, WU = 0.74637 * VWU - 0.07734.
    assert!((series.wu[0] - 0.047056).abs() < 1e-4);
    // Row 0: deg = 0 -> IEC = 330 / (0.33 * 192.28 + 0.67 * 118.133).
    assert!((series.iec[0] - 2.3141).abs() < 1e-3);
    // VH = (MW + TMA) / (MW + TMA + POL[0]).
    assert!((series.vh[0] - 150.0 / 350.0).abs() < 1e-9);
    assert!((series.vh[2] - 150.0 / 350.0).abs() < 1e-9);

    // Degradation raises WU and lowers IEC over time.
    assert!(series.wu[2] > series.wu[0]);
    assert!(series.iec[2] < series.iec[0]);
}

#[test]
fn specnum_series_writes_tab_separated_rows() {
    let series = specnum::analyze_specnum_file(&fixture("specnum_demo.txt")).unwrap();
    let mut buf = Vec::new();
    specnum::write_series(&mut buf, &series).unwrap();
    let text = String::from_utf8(buf).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("time\tIEC\tWU\tVH"));
    assert_eq!(lines.count(), 3);
}
