use crate::core::structure::{Atom, TypeClassMap};
use crate::voxel::grid::{LabelGrid, VOID_LABEL};
use anyhow::{bail, Result};
use std::collections::BTreeMap;

/// Counts of particles by phase class, from the atomistic input.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleCounts {
    pub total: usize,
    pub by_class: BTreeMap<String, usize>,
}

/// Counts of voxels by phase class, from the label grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCounts {
    pub total: usize,
    pub by_class: BTreeMap<String, usize>,
}

/// Membrane properties derived from particle and voxel counts.
#[derive(Debug, Clone, PartialEq)]
pub struct MembraneProperties {
    pub n_water: usize,
    pub n_tma: usize,
    /// lambda = N_water / N_tma
    pub lam: f64,
    /// Ion-exchange capacity, if computed.
    pub iec: Option<f64>,
    /// Water uptake, if computed.
    pub wu: Option<f64>,
    /// Water voxel fraction excluding TMA voxels.
    pub fv: f64,
    /// Water voxels / non-water voxels.
    pub vwu: f64,

    pub n_part: usize,
    pub n_water_grid: usize,
    pub n_tma_grid: usize,
    /// Non-TMA voxel count.
    pub n_pol_grid: usize,
}

/// Tallies atoms by phase class. Unmapped types are counted as "unknown"
/// (this is a report, not a pipeline stage, so it never aborts).
pub fn count_particles(atoms: &[Atom], type_map: &TypeClassMap) -> ParticleCounts {
    let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
    for atom in atoms {
        let class = type_map.label_for(atom.type_id).unwrap_or("unknown");
        *by_class.entry(class.to_string()).or_insert(0) += 1;
    }
    ParticleCounts {
        total: atoms.len(),
        by_class,
    }
}

/// Tallies voxels by phase class, with void cells under "void".
pub fn count_grid_voxels(grid: &LabelGrid) -> GridCounts {
    let mut by_class: BTreeMap<String, usize> = BTreeMap::new();
    for (label, count) in grid.label_counts() {
        by_class.insert(label, count);
    }
    let occupied: usize = by_class.values().sum();
    by_class.insert(VOID_LABEL.to_string(), grid.cell_count() - occupied);
    GridCounts {
        total: grid.cell_count(),
        by_class,
    }
}

/// lambda = N_water / N_tma.
pub fn compute_lambda(particles: &ParticleCounts) -> Result<f64> {
    let n_water = particles.by_class.get("water").copied().unwrap_or(0);
    let n_tma = particles.by_class.get("tma").copied().unwrap_or(0);
    if n_tma == 0 {
        bail!("cannot compute lambda: no TMA particles");
    }
    Ok(n_water as f64 / n_tma as f64)
}

/// FV = water voxels / (total - tma voxels),
/// VWU = water voxels / (total - water voxels).
/// A non-positive denominator yields 0.
pub fn compute_grid_fractions(grid_counts: &GridCounts) -> Result<(f64, f64)> {
    if grid_counts.total == 0 {
        bail!("grid has zero voxels");
    }
    let n_water = grid_counts.by_class.get("water").copied().unwrap_or(0);
    let n_tma = grid_counts.by_class.get("tma").copied().unwrap_or(0);

    let fv_den = grid_counts.total as f64 - n_tma as f64;
    let vwu_den = grid_counts.total as f64 - n_water as f64;

    let fv = if fv_den > 0.0 { n_water as f64 / fv_den } else { 0.0 };
    let vwu = if vwu_den > 0.0 { n_water as f64 / vwu_den } else { 0.0 };
    Ok((fv, vwu))
}

/// Mass-based water uptake: WU = m_water / (m_water + m_dry), with per-class
/// particle masses supplied by the caller. Classes missing from the mass
/// table are ignored.
pub fn compute_water_uptake(
    particles: &ParticleCounts,
    mass_by_class: &BTreeMap<String, f64>,
) -> Result<f64> {
    let mut m_water = 0.0;
    let mut m_dry = 0.0;
    for (class, &n) in &particles.by_class {
        let Some(&m) = mass_by_class.get(class) else {
            continue;
        };
        let m_total = m * n as f64;
        if class == "water" {
            m_water += m_total;
        } else {
            m_dry += m_total;
        }
    }
    if m_water + m_dry == 0.0 {
        bail!("total mass is zero; cannot compute WU");
    }
    Ok(m_water / (m_water + m_dry))
}

const AVOGADRO: f64 = 6.022_140_76e23;

/// Ion-exchange capacity.
///
/// With `use_moles`: IEC [eq/g] = z * (N_tma / N_A) / mass_dry.
/// Without: the proportional measure z * N_tma / mass_dry.
pub fn compute_iec(
    particles: &ParticleCounts,
    mass_dry: f64,
    charge_per_tma: u32,
    use_moles: bool,
) -> Result<f64> {
    if mass_dry <= 0.0 {
        bail!("mass_dry must be positive");
    }
    let n_tma = particles.by_class.get("tma").copied().unwrap_or(0) as f64;
    let eq = charge_per_tma as f64 * n_tma;
    if use_moles {
        Ok(eq / AVOGADRO / mass_dry)
    } else {
        Ok(eq / mass_dry)
    }
}

/// Assembles the full property record. IEC and WU may be precomputed via
/// `compute_iec` / `compute_water_uptake` or left out.
pub fn build_properties(
    particles: &ParticleCounts,
    grid_counts: &GridCounts,
    iec: Option<f64>,
    wu: Option<f64>,
) -> Result<MembraneProperties> {
    let lam = compute_lambda(particles)?;
    let (fv, vwu) = compute_grid_fractions(grid_counts)?;

    let n_water_grid = grid_counts.by_class.get("water").copied().unwrap_or(0);
    let n_tma_grid = grid_counts.by_class.get("tma").copied().unwrap_or(0);

    Ok(MembraneProperties {
        n_water: particles.by_class.get("water").copied().unwrap_or(0),
        n_tma: particles.by_class.get("tma").copied().unwrap_or(0),
        lam,
        iec,
        wu,
        fv,
        vwu,
        n_part: particles.total,
        n_water_grid,
        n_tma_grid,
        n_pol_grid: grid_counts.total - n_tma_grid,
    })
}
