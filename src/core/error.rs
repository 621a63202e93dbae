use thiserror::Error;

/// Errors raised by the voxelization / lattice pipeline.
///
/// Every variant is raised eagerly at the stage that detects it and carries
/// enough context (atom index, cell, label, axis) to diagnose the input.
/// The pipeline never skips offending atoms or cells silently.
#[derive(Debug, Error, PartialEq)]
pub enum PipelineError {
    /// An atom lies outside the box along a non-periodic axis.
    #[error(
        "atom {atom_index} is outside the box along {axis}: \
         coordinate {coordinate} not in [0, {extent}) after origin shift"
    )]
    OutOfBounds {
        atom_index: usize,
        axis: char,
        coordinate: f64,
        extent: f64,
    },

    /// An atom type has no entry in the type-class mapping.
    #[error("atom {atom_index} has type {type_id} with no entry in the type-class map")]
    UnknownType { atom_index: usize, type_id: u32 },

    /// An occupied cell's label has no entry in the label-species mapping.
    #[error(
        "label '{label}' of cell ({cell:?}) has no entry in the label-species map"
    )]
    UnmappedLabel { label: String, cell: [usize; 3] },

    /// The grid is too small for the configured stencil along a periodic
    /// axis; building it would create self-loops.
    #[error(
        "grid dimension {dimension} along periodic axis {axis} is smaller than \
         {required} required by the neighbor stencil"
    )]
    DegenerateLattice {
        axis: char,
        dimension: usize,
        required: usize,
    },

    /// Spacing and box extents produced an unusable grid.
    #[error("invalid grid geometry: {0}")]
    InvalidGeometry(String),
}
