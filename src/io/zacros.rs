use crate::lattice::builder::SiteLattice;
use crate::lattice::state::Occupation;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

// Zacros site ids are 1-based; everything internal is 0-based.
const ID_BASE: usize = 1;

/// Compact float formatting in the spirit of printf's %g: scientific
/// notation past the usual thresholds, with a signed two-digit exponent
/// ("2.5e+12", "1e+08").
fn fmt_g(x: f64) -> String {
    let a = x.abs();
    if x != 0.0 && (a >= 1e6 || a < 1e-4) {
        let s = format!("{x:e}");
        match s.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => s,
        }
    } else {
        format!("{x}")
    }
}

// ============================================================================
// LATTICE
// ============================================================================

/// Writes a Zacros `lattice explicit` block for the site graph.
///
/// Site ids are 1-based in file order, which matches the canonical traversal
/// order of the grid. Coordinates are fractional cell positions. Neighbor
/// lists are sorted; a double bond (ring of length 2) lists the partner
/// twice.
pub fn write_lattice<W: Write>(
    w: &mut W,
    lattice: &SiteLattice,
    site_type_name: &str,
) -> Result<()> {
    let [nx, ny, nz] = lattice.dims;
    let neighbor_lists = lattice.neighbor_lists();

    writeln!(w, "lattice explicit")?;
    writeln!(w, "n_sites            {}", lattice.sites.len())?;
    writeln!(w, "max_coord          {}", lattice.stencil.max_coordination())?;
    writeln!(w, "n_site_types   1")?;
    writeln!(w, "site_type_names    {site_type_name}")?;
    writeln!(w, "lattice_structure")?;

    for site in &lattice.sites {
        let [ix, iy, iz] = site.cell;
        let neighbors = &neighbor_lists[site.id];
        write!(
            w,
            "{} {:.6} {:.6} {:.6} {} ",
            site.id + ID_BASE,
            ix as f64 / nx as f64,
            iy as f64 / ny as f64,
            iz as f64 / nz as f64,
            neighbors.len(),
        )?;
        let ids: Vec<String> = neighbors.iter().map(|n| (n + ID_BASE).to_string()).collect();
        writeln!(w, "{}", ids.join(" "))?;
    }

    writeln!(w, "end_lattice_structure")?;
    writeln!(w, "end_lattice")?;
    Ok(())
}

pub fn write_lattice_file(path: &Path, lattice: &SiteLattice, site_type_name: &str) -> Result<()> {
    let mut buf = Vec::new();
    write_lattice(&mut buf, lattice, site_type_name)?;
    fs::write(path, buf).with_context(|| format!("could not write lattice file: {path:?}"))
}

// ============================================================================
// INITIAL STATE
// ============================================================================

/// Writes a Zacros `initial_state` block seeding every site with its species.
pub fn write_initial_state<W: Write>(w: &mut W, occupation: &Occupation) -> Result<()> {
    writeln!(w, "initial_state")?;
    for (site_id, species) in occupation {
        writeln!(w, "seed_on_sites {species} {}", site_id + ID_BASE)?;
    }
    writeln!(w, "end_initial_state")?;
    Ok(())
}

pub fn write_initial_state_file(path: &Path, occupation: &Occupation) -> Result<()> {
    let mut buf = Vec::new();
    write_initial_state(&mut buf, occupation)?;
    fs::write(path, buf).with_context(|| format!("could not write initial-state file: {path:?}"))
}

// ============================================================================
// SIMULATION
// ============================================================================

/// Parameters of `simulation_input.dat` for the degradation model.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    pub random_seed: u64,
    pub temperature: f64,
    pub pressure: f64,
    pub gas_names: Vec<String>,
    pub gas_energies: Vec<f64>,
    pub gas_weights: Vec<f64>,
    pub gas_fracs: Vec<f64>,
    pub surf_species: Vec<String>,
    pub surf_dent: Vec<u32>,
    pub snapshots_event: u64,
    pub process_statistics_event: u64,
    pub species_numbers_event: u64,
    pub max_steps: u64,
    pub max_time: String,
    pub wall_time: u64,
}

impl SimulationParams {
    pub fn with_seed(random_seed: u64) -> Self {
        Self {
            random_seed,
            ..Self::default()
        }
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            random_seed: 1,
            temperature: 300.0,
            pressure: 1.0,
            gas_names: vec!["tma".into(), "mem".into(), "mw".into()],
            gas_energies: vec![0.0, 0.0, 0.0],
            gas_weights: vec![18.0, 18.0, 18.0],
            gas_fracs: vec![0.0, 0.0, 0.0],
            surf_species: vec!["tma*".into(), "mem*".into(), "mw*".into(), "hew*".into()],
            surf_dent: vec![1, 1, 1, 1],
            snapshots_event: 100,
            process_statistics_event: 100,
            species_numbers_event: 5,
            max_steps: 80_000,
            max_time: "infinity".into(),
            wall_time: 100_800,
        }
    }
}

pub fn write_simulation<W: Write>(w: &mut W, p: &SimulationParams) -> Result<()> {
    let n_gas = p.gas_names.len();
    anyhow::ensure!(
        p.gas_energies.len() == n_gas && p.gas_weights.len() == n_gas && p.gas_fracs.len() == n_gas,
        "gas parameter arrays must all have the same length as gas_names"
    );
    anyhow::ensure!(
        p.surf_dent.len() == p.surf_species.len(),
        "surf_dent must have the same length as surf_species"
    );

    writeln!(w, "random_seed               {}\n", p.random_seed)?;
    writeln!(w, "temperature               {:.2}", p.temperature)?;
    writeln!(w, "pressure                  {:.2}\n", p.pressure)?;

    writeln!(w, "n_gas_species             {n_gas}")?;
    write!(w, "gas_specs_names           ")?;
    for name in &p.gas_names {
        write!(w, "{name:>6} ")?;
    }
    writeln!(w)?;

    write!(w, "gas_energies              ")?;
    for e in &p.gas_energies {
        write!(w, "{e:>7.3} ")?;
    }
    writeln!(w, "# eV")?;

    write!(w, "gas_molec_weights         ")?;
    for m in &p.gas_weights {
        write!(w, "{m:>7.2} ")?;
    }
    writeln!(w, "# g/mol")?;

    write!(w, "gas_molar_fracs           ")?;
    for x in &p.gas_fracs {
        write!(w, "{x:>7.3} ")?;
    }
    writeln!(w, "\n")?;

    writeln!(w, "n_surf_species            {}", p.surf_species.len())?;
    write!(w, "surf_specs_names          ")?;
    for name in &p.surf_species {
        write!(w, "{name:>4} ")?;
    }
    writeln!(w)?;

    write!(w, "surf_specs_dent           ")?;
    for d in &p.surf_dent {
        write!(w, "{d:>4} ")?;
    }
    writeln!(w, "\n")?;

    writeln!(w, "snapshots                 on event {}", p.snapshots_event)?;
    writeln!(w, "process_statistics        on event {}", p.process_statistics_event)?;
    writeln!(w, "species_numbers           on event {}\n", p.species_numbers_event)?;

    writeln!(w, "max_steps                 {}", p.max_steps)?;
    writeln!(w, "max_time                  {}\n", p.max_time)?;
    writeln!(w, "wall_time                 {} # in seconds\n", p.wall_time)?;
    writeln!(w, "finish")?;
    Ok(())
}

pub fn write_simulation_file(path: &Path, p: &SimulationParams) -> Result<()> {
    let mut buf = Vec::new();
    write_simulation(&mut buf, p)?;
    fs::write(path, buf).with_context(|| format!("could not write simulation file: {path:?}"))
}

// ============================================================================
// MECHANISM
// ============================================================================

/// Pre-exponential factors for the four degradation steps.
#[derive(Debug, Clone, Copy)]
pub struct MechanismRates {
    /// sn2_degradation
    pub ke: f64,
    /// wat_removal1
    pub kwe: f64,
    /// wat_removal2
    pub km: f64,
    /// hew_elimination
    pub kd: f64,
}

impl Default for MechanismRates {
    fn default() -> Self {
        Self {
            ke: 0.5,
            kwe: 2.5e12,
            km: 1.0e11,
            kd: 1.0e8,
        }
    }
}

const RULE: &str =
    "############################################################################";

struct MechStep<'a> {
    name: &'a str,
    initial: &'a [(&'a str, &'a str)],
    final_: &'a [(&'a str, &'a str)],
    pre_expon: f64,
    activ_eng: f64,
}

fn write_mech_step<W: Write>(w: &mut W, step: &MechStep) -> Result<()> {
    writeln!(w, "step {}", step.name)?;
    writeln!(w, "  sites {}", step.initial.len())?;
    let pairs: Vec<String> = (1..step.initial.len())
        .map(|i| format!("{}-{}", i, i + 1))
        .collect();
    writeln!(w, "  neighboring {}", pairs.join(" "))?;
    writeln!(w, "  initial # (entitynumber, species, dentate)")?;
    for (i, (species, dent)) in step.initial.iter().enumerate() {
        writeln!(w, "    {} {species}    {dent}", i + 1)?;
    }
    writeln!(w, "  final")?;
    for (i, (species, dent)) in step.final_.iter().enumerate() {
        writeln!(w, "    {} {species} {dent}", i + 1)?;
    }
    let types = vec!["G"; step.initial.len()].join(" ");
    writeln!(w, "  site_types {types}")?;
    writeln!(w, "  pre_expon  {}", fmt_g(step.pre_expon))?;
    writeln!(w, "  activ_eng  {:.2}", step.activ_eng)?;
    writeln!(w, "end_step")?;
    Ok(())
}

/// Writes the four-step degradation mechanism.
pub fn write_mechanism<W: Write>(w: &mut W, rates: &MechanismRates) -> Result<()> {
    writeln!(w, "mechanism\n")?;
    writeln!(w, "{RULE}\n")?;

    write_mech_step(w, &MechStep {
        name: "sn2_degradation",
        initial: &[("tma*", "1"), ("mw*", "1")],
        final_: &[("mem*", "1"), ("hew*", "1")],
        pre_expon: rates.ke,
        activ_eng: 0.0,
    })?;
    writeln!(w, "\n{RULE}\n")?;

    write_mech_step(w, &MechStep {
        name: "wat_removal1",
        initial: &[("mw*", "1"), ("hew*", "1"), ("mem*", "1")],
        final_: &[("hew*", "1"), ("mem*", "1"), ("mem*", "1")],
        pre_expon: rates.kwe,
        activ_eng: 0.05,
    })?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "{RULE}\n")?;

    write_mech_step(w, &MechStep {
        name: "wat_removal2",
        initial: &[("hew*", "1"), ("mw*", "1")],
        final_: &[("mw*", "1"), ("hew*", "1")],
        pre_expon: rates.km,
        activ_eng: 0.05,
    })?;
    writeln!(w, "\n{RULE}\n")?;

    write_mech_step(w, &MechStep {
        name: "hew_elimination",
        initial: &[("hew*", "1"), ("mem*", "1")],
        final_: &[("mem*", "1"), ("mem*", "1")],
        pre_expon: rates.kd,
        activ_eng: 0.05,
    })?;
    writeln!(w, "{RULE}")?;
    writeln!(w, "end_mechanism")?;
    Ok(())
}

pub fn write_mechanism_file(path: &Path, rates: &MechanismRates) -> Result<()> {
    let mut buf = Vec::new();
    write_mechanism(&mut buf, rates)?;
    fs::write(path, buf).with_context(|| format!("could not write mechanism file: {path:?}"))
}

// ============================================================================
// ENERGETICS
// ============================================================================

/// Site and pair-interaction energies (eV) of the degradation model.
#[derive(Debug, Clone, Copy)]
pub struct EnergeticsParams {
    pub e_mem: f64,
    pub e_mw: f64,
    pub e_tma: f64,
    pub e_hew: f64,
    pub e_tma_mw: f64,
    pub e_tma_hew: f64,
}

impl Default for EnergeticsParams {
    fn default() -> Self {
        Self {
            e_mem: -1.0,
            e_mw: -1.0,
            e_tma: -1.0,
            e_hew: -1.0,
            e_tma_mw: -0.18,
            e_tma_hew: -0.18,
        }
    }
}

fn write_site_cluster<W: Write>(w: &mut W, name: &str, species: &str, energy: f64) -> Result<()> {
    writeln!(w, "cluster {name}")?;
    writeln!(w, "  sites 1")?;
    writeln!(w, "  lattice_state")?;
    writeln!(w, "    1 {species}   1")?;
    writeln!(w, "  site_types G")?;
    writeln!(w, "  graph_multiplicity 1")?;
    writeln!(w, "    cluster_eng {energy:.2} # eV")?;
    writeln!(w, "end_cluster")?;
    Ok(())
}

fn write_pair_cluster<W: Write>(w: &mut W, name: &str, s1: &str, s2: &str, energy: f64) -> Result<()> {
    writeln!(w, "cluster {name}")?;
    writeln!(w, "  sites 2")?;
    writeln!(w, "  neighboring 1-2")?;
    writeln!(w, "  lattice_state")?;
    writeln!(w, "    1 {s1}  1")?;
    writeln!(w, "    2 {s2}   1")?;
    writeln!(w, "  site_types G G")?;
    writeln!(w, "  cluster_eng {energy:.2}")?;
    writeln!(w, "end_cluster")?;
    Ok(())
}

/// Writes the uniform energetics block for the degradation model.
pub fn write_energetics<W: Write>(w: &mut W, p: &EnergeticsParams) -> Result<()> {
    writeln!(w, "energetics\n")?;
    writeln!(w, "{RULE}\n")?;

    write_site_cluster(w, "mem_site", "mem*", p.e_mem)?;
    writeln!(w, "\n{RULE}")?;

    write_site_cluster(w, "mw_site", "mw*", p.e_mw)?;
    writeln!(w, "\n#############################################")?;

    write_site_cluster(w, "tma_site", "tma*", p.e_tma)?;
    writeln!(w, "{RULE}\n")?;

    write_pair_cluster(w, "tma*-mw*_Interaction", "tma*", "mw*", p.e_tma_mw)?;
    writeln!(w, "{RULE}\n")?;

    write_pair_cluster(w, "tma*-hew*_Interaction", "tma*", "hew*", p.e_tma_hew)?;
    writeln!(w, "{RULE}\n")?;

    write_site_cluster(w, "hew_site", "hew*", p.e_hew)?;
    writeln!(w, "\n{RULE}")?;
    writeln!(w, "end_energetics")?;
    Ok(())
}

pub fn write_energetics_file(path: &Path, p: &EnergeticsParams) -> Result<()> {
    let mut buf = Vec::new();
    write_energetics(&mut buf, p)?;
    fs::write(path, buf).with_context(|| format!("could not write energetics file: {path:?}"))
}
