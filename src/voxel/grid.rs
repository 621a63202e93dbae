use crate::core::error::PipelineError;
use crate::core::structure::{Atom, TypeClassMap};
use crate::voxel::binner::BinnedAtoms;
use crate::voxel::labeler::resolve_cell_label;

/// The empty-cell sentinel used by text artifacts and reports.
pub const VOID_LABEL: &str = "void";

/// Dense labeled voxel grid.
///
/// Every cell of the `nx * ny * nz` block stores a small integer code:
/// 0 is the explicit "void" sentinel for empty cells, codes >= 1 index the
/// `palette` of phase labels (sorted lexicographically, so the code of a
/// label is stable across runs). Dimensions and spacing are fixed at
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelGrid {
    dims: [usize; 3],
    spacing: f64,
    codes: Vec<u16>,
    palette: Vec<String>,
}

impl LabelGrid {
    /// Creates an all-void grid over a fixed palette. The palette is sorted
    /// and deduplicated so label codes do not depend on input order.
    pub fn new(dims: [usize; 3], spacing: f64, mut palette: Vec<String>) -> Self {
        palette.sort();
        palette.dedup();
        let n = dims[0] * dims[1] * dims[2];
        Self {
            dims,
            spacing,
            codes: vec![0; n],
            palette,
        }
    }

    /// Combines binned atoms and the type-class map into a labeled grid.
    ///
    /// Every occupied cell gets exactly one label via majority reduction;
    /// empty cells keep the void sentinel. Fails eagerly on the first atom
    /// whose type is missing from the map, before any grid is produced.
    pub fn assemble(
        atoms: &[Atom],
        binned: &BinnedAtoms,
        type_map: &TypeClassMap,
    ) -> Result<Self, PipelineError> {
        let mut grid = Self::new(binned.dims, binned.spacing, type_map.sorted_labels());
        for (cell, members) in &binned.cells {
            let label = resolve_cell_label(atoms, members, type_map)?;
            let code = grid
                .code_of(&label)
                .expect("palette covers every label of the type-class map");
            let idx = grid.linear_index(*cell);
            grid.codes[idx] = code;
        }
        Ok(grid)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Total number of cells, occupied or not.
    pub fn cell_count(&self) -> usize {
        self.codes.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.codes.iter().filter(|&&c| c != 0).count()
    }

    /// Canonical linear index: `ix + iy*nx + iz*nx*ny` (iz outer, ix inner).
    /// Every traversal in the crate follows ascending linear index.
    pub fn linear_index(&self, cell: [usize; 3]) -> usize {
        let [nx, ny, _] = self.dims;
        cell[0] + cell[1] * nx + cell[2] * nx * ny
    }

    pub fn cell_of_linear(&self, idx: usize) -> [usize; 3] {
        let [nx, ny, _] = self.dims;
        [idx % nx, (idx / nx) % ny, idx / (nx * ny)]
    }

    /// Label of a cell, or `None` for void.
    pub fn label_at(&self, cell: [usize; 3]) -> Option<&str> {
        let code = self.codes[self.linear_index(cell)];
        if code == 0 {
            None
        } else {
            Some(self.palette[code as usize - 1].as_str())
        }
    }

    /// Numeric code of a label within this grid's palette.
    pub fn code_of(&self, label: &str) -> Option<u16> {
        self.palette
            .iter()
            .position(|l| l == label)
            .map(|p| (p + 1) as u16)
    }

    /// Sets a cell's label. Used by the grid-file reader; the label must be
    /// part of the palette.
    pub fn set_label(&mut self, cell: [usize; 3], label: &str) -> Result<(), PipelineError> {
        let code = self.code_of(label).ok_or_else(|| {
            PipelineError::InvalidGeometry(format!("label '{label}' is not in the grid palette"))
        })?;
        let idx = self.linear_index(cell);
        self.codes[idx] = code;
        Ok(())
    }

    /// Iterates every cell in canonical traversal order, yielding the cell
    /// triple and its label (`None` for void).
    pub fn iter_cells(&self) -> impl Iterator<Item = ([usize; 3], Option<&str>)> {
        self.codes.iter().enumerate().map(move |(idx, &code)| {
            let cell = self.cell_of_linear(idx);
            let label = if code == 0 {
                None
            } else {
                Some(self.palette[code as usize - 1].as_str())
            };
            (cell, label)
        })
    }

    /// Iterates occupied cells only, in canonical traversal order. The
    /// position of a cell in this sequence is its future site id.
    pub fn iter_occupied(&self) -> impl Iterator<Item = ([usize; 3], &str)> {
        self.iter_cells()
            .filter_map(|(cell, label)| label.map(|l| (cell, l)))
    }

    /// Occupied-voxel count per palette label, in palette order.
    pub fn label_counts(&self) -> Vec<(String, usize)> {
        let mut counts = vec![0usize; self.palette.len()];
        for &code in &self.codes {
            if code != 0 {
                counts[code as usize - 1] += 1;
            }
        }
        self.palette
            .iter()
            .cloned()
            .zip(counts)
            .collect()
    }
}
