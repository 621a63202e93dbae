use crate::core::error::PipelineError;
use crate::core::structure::{axis_name, Atom, SimBox};
use std::collections::BTreeMap;

/// Result of spatial binning: grid geometry plus, for every occupied cell,
/// the indices of the atoms that landed in it (input order preserved).
///
/// Cells are keyed by their (ix, iy, iz) triple in a `BTreeMap` so that
/// iteration order is deterministic regardless of insertion order.
#[derive(Debug, Clone)]
pub struct BinnedAtoms {
    pub dims: [usize; 3],
    pub spacing: f64,
    pub cells: BTreeMap<[usize; 3], Vec<usize>>,
}

/// Computes the grid dimensions for a box and spacing: `ceil(extent / spacing)`
/// per axis.
pub fn grid_dims(bbox: &SimBox, spacing: f64) -> Result<[usize; 3], PipelineError> {
    if !(spacing > 0.0) {
        return Err(PipelineError::InvalidGeometry(format!(
            "spacing must be positive, got {spacing}"
        )));
    }
    let mut dims = [0usize; 3];
    for axis in 0..3 {
        let n = (bbox.extents[axis] / spacing).ceil();
        if n < 1.0 {
            return Err(PipelineError::InvalidGeometry(format!(
                "axis {} collapses to zero cells (extent {}, spacing {})",
                axis_name(axis),
                bbox.extents[axis],
                spacing
            )));
        }
        dims[axis] = n as usize;
    }
    Ok(dims)
}

/// Assigns every atom to a grid cell.
///
/// Coordinates are shifted by the box origin, wrapped modulo the extent on
/// periodic axes, and floor-divided by the spacing. On a non-periodic axis a
/// coordinate outside `[0, extent)` raises `OutOfBounds` with the atom index.
///
/// Pure function: no state is shared with other invocations, and the result
/// depends only on the inputs.
pub fn bin_atoms(
    atoms: &[Atom],
    bbox: &SimBox,
    spacing: f64,
) -> Result<BinnedAtoms, PipelineError> {
    let dims = grid_dims(bbox, spacing)?;
    let mut cells: BTreeMap<[usize; 3], Vec<usize>> = BTreeMap::new();

    for (atom_index, atom) in atoms.iter().enumerate() {
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let mut rel = atom.position[axis] - bbox.origin[axis];
            let extent = bbox.extents[axis];

            if bbox.periodic[axis] {
                rel = rel.rem_euclid(extent);
            } else if rel < 0.0 || rel >= extent {
                return Err(PipelineError::OutOfBounds {
                    atom_index,
                    axis: axis_name(axis),
                    coordinate: rel,
                    extent,
                });
            }

            // rem_euclid of a tiny negative value can round to exactly
            // `extent`, so clamp the index into range.
            let idx = (rel / spacing).floor() as i64;
            cell[axis] = idx.clamp(0, dims[axis] as i64 - 1) as usize;
        }
        cells.entry(cell).or_default().push(atom_index);
    }

    Ok(BinnedAtoms { dims, spacing, cells })
}
