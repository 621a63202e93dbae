// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
pub mod analysis;
pub mod core;
pub mod io;
pub mod lattice;
pub mod voxel;

// ============================================================================
// RE-EXPORTS (Public API)
// ============================================================================
pub use crate::core::error::PipelineError;
pub use crate::core::structure::{Atom, LabelSpeciesMap, SimBox, Stencil, TypeClassMap};
pub use crate::lattice::builder::{NeighborEdge, Site, SiteLattice};
pub use crate::lattice::state::{map_initial_state, Occupation};
pub use crate::voxel::binner::{bin_atoms, BinnedAtoms};
pub use crate::voxel::grid::LabelGrid;

use anyhow::Result;

// ============================================================================
// HIGH-LEVEL INTERFACE
// ============================================================================

/// Configuration for the voxelization + lattice pipeline.
///
/// `stencil` has no default on purpose: the connectivity mode changes the
/// physics of every downstream simulation and must be chosen explicitly.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Voxel edge length, in the units of the input coordinates.
    pub spacing: f64,
    /// Per-axis periodicity of the lattice (usually matches the box).
    pub periodic: [bool; 3],
    /// Neighbor connectivity mode.
    pub stencil: Stencil,
}

/// Everything the kMC engine needs: the labeled grid, the periodic site
/// graph and the per-site initial occupation.
#[derive(Debug, Clone)]
pub struct LatticeModel {
    pub grid: LabelGrid,
    pub lattice: SiteLattice,
    pub occupation: Occupation,
}

/// The master pipeline: atoms -> binned cells -> labeled grid -> periodic
/// site graph -> initial occupation.
///
/// Each stage fully consumes its input before the next begins; nothing is
/// shared between invocations. Returns the model plus a human-readable
/// report.
pub fn build_lattice_model(
    atoms: &[Atom],
    bbox: &SimBox,
    type_map: &TypeClassMap,
    species_map: &LabelSpeciesMap,
    config: &PipelineConfig,
) -> Result<(LatticeModel, String)> {
    // 1. BINNING
    let binned = bin_atoms(atoms, bbox, config.spacing)?;

    // 2. LABELING + GRID ASSEMBLY
    let grid = LabelGrid::assemble(atoms, &binned, type_map)?;

    // 3. PERIODIC LATTICE
    let site_lattice = SiteLattice::build(&grid, config.periodic, config.stencil)?;

    // 4. INITIAL STATE
    let occupation = map_initial_state(&site_lattice, species_map)?;

    // 5. REPORT
    let [nx, ny, nz] = grid.dims();
    let mut class_summary = String::new();
    for (label, count) in grid.label_counts() {
        class_summary.push_str(&format!("\n • {:<12} {} voxels", label, count));
    }

    let report = format!(
        "--- Lattice Preparation Report ---\n\
         • Grid:            {} x {} x {} (spacing {:.3})\n\
         • Occupied cells:  {} of {}{}\n\
         • Sites:           {}\n\
         • Edges:           {} ({} wrapped)\n\
         • Periodicity:     x={} y={} z={}\n\
         • Stencil:         {:?}",
        nx, ny, nz, config.spacing,
        grid.occupied_count(), grid.cell_count(), class_summary,
        site_lattice.sites.len(),
        site_lattice.edges.len(), site_lattice.wrapped_edge_count(),
        config.periodic[0], config.periodic[1], config.periodic[2],
        config.stencil,
    );

    Ok((
        LatticeModel {
            grid,
            lattice: site_lattice,
            occupation,
        },
        report,
    ))
}
