use nalgebra::Vector3;
use std::collections::BTreeMap;

// ============================================================================
// INPUT DATA STRUCTURES
// ============================================================================

/// One atom of the input structure. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Cartesian position in the same units as the box (usually Å).
    pub position: Vector3<f64>,
    /// Force-field atom type id (e.g. a LAMMPS type).
    pub type_id: u32,
}

/// Orthorhombic simulation box: origin, extents and per-axis periodicity.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBox {
    pub origin: Vector3<f64>,
    pub extents: Vector3<f64>,
    /// Periodic flags for x, y, z. A periodic axis wraps coordinates and
    /// neighbor lookups; a bounded axis rejects out-of-range atoms.
    pub periodic: [bool; 3],
}

impl SimBox {
    pub fn new(origin: Vector3<f64>, extents: Vector3<f64>, periodic: [bool; 3]) -> Result<Self, &'static str> {
        if extents.x <= 0.0 || extents.y <= 0.0 || extents.z <= 0.0 {
            return Err("Box extents must be positive.");
        }
        Ok(Self { origin, extents, periodic })
    }

    /// Box from LAMMPS-style bounds (xlo..xhi etc.).
    pub fn from_bounds(
        xlo: f64, xhi: f64,
        ylo: f64, yhi: f64,
        zlo: f64, zhi: f64,
        periodic: [bool; 3],
    ) -> Result<Self, &'static str> {
        Self::new(
            Vector3::new(xlo, ylo, zlo),
            Vector3::new(xhi - xlo, yhi - ylo, zhi - zlo),
            periodic,
        )
    }
}

// ============================================================================
// CONNECTIVITY STENCIL
// ============================================================================

/// Neighbor stencil for the site lattice. There is deliberately no default:
/// callers must pick the connectivity mode explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stencil {
    /// The 6 axis-aligned nearest neighbors.
    VonNeumann,
    /// All 26 cells of the surrounding 3x3x3 block.
    Moore,
}

impl Stencil {
    /// Candidate offsets in a fixed order: lexicographic over (dx, dy, dz),
    /// never including (0, 0, 0).
    pub fn offsets(&self) -> Vec<[i64; 3]> {
        match self {
            Stencil::VonNeumann => vec![
                [-1, 0, 0], [0, -1, 0], [0, 0, -1],
                [0, 0, 1], [0, 1, 0], [1, 0, 0],
            ],
            Stencil::Moore => {
                let mut offs = Vec::with_capacity(26);
                for dx in -1i64..=1 {
                    for dy in -1i64..=1 {
                        for dz in -1i64..=1 {
                            if (dx, dy, dz) != (0, 0, 0) {
                                offs.push([dx, dy, dz]);
                            }
                        }
                    }
                }
                offs
            }
        }
    }

    /// Maximum coordination number (used for the Zacros `max_coord` field).
    pub fn max_coordination(&self) -> usize {
        match self {
            Stencil::VonNeumann => 6,
            Stencil::Moore => 26,
        }
    }
}

// ============================================================================
// CLASSIFICATION MAPS
// ============================================================================

/// Total mapping from atom type id to an abstract phase label
/// (e.g. 5 -> "water"). Missing entries are a hard error at lookup sites.
#[derive(Debug, Clone, Default)]
pub struct TypeClassMap {
    map: BTreeMap<u32, String>,
}

impl TypeClassMap {
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        Self {
            map: entries.into_iter().map(|(t, l)| (t, l.into())).collect(),
        }
    }

    pub fn insert(&mut self, type_id: u32, label: impl Into<String>) {
        self.map.insert(type_id, label.into());
    }

    pub fn label_for(&self, type_id: u32) -> Option<&str> {
        self.map.get(&type_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Distinct phase labels, sorted. This ordering fixes the grid palette.
    pub fn sorted_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.map.values().cloned().collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// Mapping from phase label to the target simulator's species name
/// (e.g. "water" -> "mw*"). Must cover every occupied label in the grid.
#[derive(Debug, Clone, Default)]
pub struct LabelSpeciesMap {
    map: BTreeMap<String, String>,
}

impl LabelSpeciesMap {
    pub fn new() -> Self {
        Self { map: BTreeMap::new() }
    }

    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            map: entries.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn insert(&mut self, label: impl Into<String>, species: impl Into<String>) {
        self.map.insert(label.into(), species.into());
    }

    pub fn species_for(&self, label: &str) -> Option<&str> {
        self.map.get(label).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Human-readable axis name for diagnostics.
pub fn axis_name(axis: usize) -> char {
    match axis {
        0 => 'x',
        1 => 'y',
        _ => 'z',
    }
}
