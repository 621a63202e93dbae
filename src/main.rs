use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use std::path::{Path, PathBuf};
use std::time::Instant;

use memkmc::io::{grid as grid_io, lammps, maps, zacros};
use memkmc::{map_initial_state, SiteLattice, Stencil};

#[derive(Parser)]
#[command(author, version, about = "Membrane voxelization & Zacros kMC lattice preparation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StencilArg {
    /// 6 axis-aligned nearest neighbors.
    VonNeumann,
    /// Full 26-neighbor block.
    Moore,
}

impl From<StencilArg> for Stencil {
    fn from(s: StencilArg) -> Self {
        match s {
            StencilArg::VonNeumann => Stencil::VonNeumann,
            StencilArg::Moore => Stencil::Moore,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum InputFormat {
    Data,
    Lammpstrj,
}

/// Parses a periodicity spec like "xyz", "xy", "z" or "none".
fn parse_periodic(s: &str) -> Result<[bool; 3]> {
    if s == "none" {
        return Ok([false; 3]);
    }
    let mut flags = [false; 3];
    for c in s.chars() {
        match c {
            'x' => flags[0] = true,
            'y' => flags[1] = true,
            'z' => flags[2] = true,
            _ => bail!("invalid periodicity spec '{s}' (use a subset of \"xyz\" or \"none\")"),
        }
    }
    Ok(flags)
}

fn parse_frame(s: &str) -> Result<lammps::Frame> {
    if s == "last" {
        Ok(lammps::Frame::Last)
    } else {
        let idx: usize = s
            .parse()
            .with_context(|| format!("frame must be 'last' or an integer index, got '{s}'"))?;
        Ok(lammps::Frame::Index(idx))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Voxelizes a membrane structure into a labeled grid file.
    Voxelize {
        /// LAMMPS .data or .lammpstrj file.
        input: PathBuf,

        #[arg(long, value_enum, default_value_t = InputFormat::Data)]
        format: InputFormat,

        /// For trajectories: 'last' or a 0-based frame index.
        #[arg(long, default_value = "last")]
        frame: String,

        /// Voxel spacing in input units.
        #[arg(long, default_value_t = 0.4)]
        spacing: f64,

        /// Type-class mapping file (lines of "type class").
        #[arg(long)]
        types: PathBuf,

        /// Periodic axes, e.g. "xyz", "xy" or "none".
        #[arg(long, default_value = "xyz")]
        periodic: String,

        #[arg(short, long, default_value = "grid.xyz")]
        output: PathBuf,
    },

    /// Generates a Zacros lattice_input.dat from a grid file.
    Lattice {
        /// Grid file produced by `voxelize`.
        grid: PathBuf,

        /// Neighbor connectivity mode (required, no default).
        #[arg(long, value_enum)]
        stencil: StencilArg,

        #[arg(long, default_value = "xyz")]
        periodic: String,

        #[arg(long, default_value = "G")]
        site_type_name: String,

        #[arg(short, long, default_value = "lattice_input.dat")]
        output: PathBuf,
    },

    /// Generates a Zacros state_input.dat from a grid file.
    InitialState {
        grid: PathBuf,

        /// Label-species mapping file (lines of "label species").
        #[arg(long)]
        mapping: PathBuf,

        #[arg(long, value_enum)]
        stencil: StencilArg,

        #[arg(long, default_value = "xyz")]
        periodic: String,

        #[arg(short, long, default_value = "state_input.dat")]
        output: PathBuf,
    },

    /// Prepares complete per-seed Zacros run directories.
    PrepareRun {
        grid: PathBuf,

        #[arg(long)]
        mapping: PathBuf,

        #[arg(long, value_enum)]
        stencil: StencilArg,

        #[arg(long, default_value = "xyz")]
        periodic: String,

        /// Random seeds, one run directory each.
        #[arg(long, num_args = 1.., required = true)]
        seeds: Vec<u64>,

        #[arg(long, default_value = "runs")]
        outdir: PathBuf,

        #[arg(long, default_value = "G")]
        site_type_name: String,

        /// Pre-exponential for sn2_degradation.
        #[arg(long, default_value_t = 0.5)]
        ke: f64,
        /// Pre-exponential for wat_removal1.
        #[arg(long, default_value_t = 2.5e12)]
        kwe: f64,
        /// Pre-exponential for wat_removal2.
        #[arg(long, default_value_t = 1.0e11)]
        km: f64,
        /// Pre-exponential for hew_elimination.
        #[arg(long, default_value_t = 1.0e8)]
        kd: f64,

        /// Site energy for mem* (eV).
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        e_mem: f64,
        /// Site energy for mw* (eV).
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        e_mw: f64,
        /// Site energy for tma* (eV).
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        e_tma: f64,
        /// Site energy for hew* (eV).
        #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
        e_hew: f64,
        /// tma*-mw* pair interaction energy (eV).
        #[arg(long, default_value_t = -0.18, allow_negative_numbers = true)]
        e_tma_mw: f64,
        /// tma*-hew* pair interaction energy (eV).
        #[arg(long, default_value_t = -0.18, allow_negative_numbers = true)]
        e_tma_hew: f64,

        /// Overwrite existing input files in seed_* directories.
        #[arg(long)]
        overwrite: bool,
    },

    /// Computes IEC / WU / VH time series from a Zacros run directory.
    Analyze {
        /// Run directory containing a specnum_*.txt file (or the file itself).
        run_dir: PathBuf,

        #[arg(short, long, default_value = "iec_wu.dat")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let start_time = Instant::now();

    match cli.command {
        Commands::Voxelize {
            input,
            format,
            frame,
            spacing,
            types,
            periodic,
            output,
        } => {
            println!("--- Membrane Voxelizer ---");
            let periodic = parse_periodic(&periodic)?;

            println!("Reading structure from {:?}...", input);
            let (bbox, atoms) = match format {
                InputFormat::Data => lammps::read_lammps_data(&input, periodic)?,
                InputFormat::Lammpstrj => {
                    lammps::read_lammpstrj(&input, parse_frame(&frame)?, periodic)?
                }
            };
            println!("-> Loaded {} atoms.", atoms.len());

            let type_map = maps::load_type_classes(&types)?;

            let binned = memkmc::bin_atoms(&atoms, &bbox, spacing)?;
            let grid = memkmc::LabelGrid::assemble(&atoms, &binned, &type_map)?;
            let [nx, ny, nz] = grid.dims();
            println!(
                "-> Grid {} x {} x {}: {} occupied of {} cells.",
                nx, ny, nz,
                grid.occupied_count(),
                grid.cell_count()
            );
            for (label, count) in grid.label_counts() {
                println!("   {:<12} {} voxels", label, count);
            }

            grid_io::write_grid_xyz_file(&output, &grid)?;
            println!("Wrote grid to {:?}.", output);
        }

        Commands::Lattice {
            grid,
            stencil,
            periodic,
            site_type_name,
            output,
        } => {
            println!("--- Zacros Lattice Generator ---");
            let periodic = parse_periodic(&periodic)?;
            let label_grid = grid_io::read_grid_xyz(&grid)?;
            let lattice = SiteLattice::build(&label_grid, periodic, stencil.into())?;
            println!(
                "-> {} sites, {} edges ({} wrapped).",
                lattice.sites.len(),
                lattice.edges.len(),
                lattice.wrapped_edge_count()
            );
            zacros::write_lattice_file(&output, &lattice, &site_type_name)?;
            println!("Wrote lattice to {:?}.", output);
        }

        Commands::InitialState {
            grid,
            mapping,
            stencil,
            periodic,
            output,
        } => {
            println!("--- Zacros Initial State Generator ---");
            let periodic = parse_periodic(&periodic)?;
            let label_grid = grid_io::read_grid_xyz(&grid)?;
            let species_map = maps::load_label_species(&mapping)?;
            let lattice = SiteLattice::build(&label_grid, periodic, stencil.into())?;
            let occupation = map_initial_state(&lattice, &species_map)?;
            zacros::write_initial_state_file(&output, &occupation)?;
            println!("Wrote initial state for {} sites to {:?}.", occupation.len(), output);
        }

        Commands::PrepareRun {
            grid,
            mapping,
            stencil,
            periodic,
            seeds,
            outdir,
            site_type_name,
            ke,
            kwe,
            km,
            kd,
            e_mem,
            e_mw,
            e_tma,
            e_hew,
            e_tma_mw,
            e_tma_hew,
            overwrite,
        } => {
            println!("--- Zacros Run Preparation ---");
            let periodic = parse_periodic(&periodic)?;
            let label_grid = grid_io::read_grid_xyz(&grid)?;
            let species_map = maps::load_label_species(&mapping)?;

            let lattice = SiteLattice::build(&label_grid, periodic, stencil.into())?;
            let occupation = map_initial_state(&lattice, &species_map)?;
            println!(
                "-> Using grid {:?}: {} sites, {} edges.",
                grid,
                lattice.sites.len(),
                lattice.edges.len()
            );

            std::fs::create_dir_all(&outdir)
                .with_context(|| format!("could not create output directory {outdir:?}"))?;

            let rates = zacros::MechanismRates { ke, kwe, km, kd };
            let energetics = zacros::EnergeticsParams {
                e_mem,
                e_mw,
                e_tma,
                e_hew,
                e_tma_mw,
                e_tma_hew,
            };

            for seed in seeds {
                let seed_dir = outdir.join(format!("seed_{seed}"));
                std::fs::create_dir_all(&seed_dir)
                    .with_context(|| format!("could not create seed directory {seed_dir:?}"))?;

                let files = [
                    seed_dir.join("lattice_input.dat"),
                    seed_dir.join("state_input.dat"),
                    seed_dir.join("simulation_input.dat"),
                    seed_dir.join("mechanism_input.dat"),
                    seed_dir.join("energetics_input.dat"),
                ];
                if !overwrite && files.iter().any(|p| p.exists()) {
                    println!(
                        "  - Skipping seed {seed}: input files already exist (use --overwrite)."
                    );
                    continue;
                }

                zacros::write_lattice_file(&files[0], &lattice, &site_type_name)?;
                zacros::write_initial_state_file(&files[1], &occupation)?;
                zacros::write_simulation_file(&files[2], &zacros::SimulationParams::with_seed(seed))?;
                zacros::write_mechanism_file(&files[3], &rates)?;
                zacros::write_energetics_file(&files[4], &energetics)?;
                println!("  - Seed {seed}: 5 input files written in {seed_dir:?}.");
            }
            println!("Done. Seed directories are ready for Zacros runs.");
        }

        Commands::Analyze { run_dir, output } => {
            println!("--- Specnum Analysis ---");
            let specnum = find_specnum(&run_dir)?;
            println!("Analyzing {:?}...", specnum);
            let series = memkmc::analysis::specnum::analyze_specnum_file(&specnum)?;
            memkmc::analysis::specnum::write_series_file(&output, &series)?;
            println!("Wrote {} rows to {:?}.", series.time.len(), output);
        }
    }

    println!("Done in {:.2?}", start_time.elapsed());
    Ok(())
}

/// Accepts either a specnum file directly or a run directory containing one.
fn find_specnum(run_dir: &Path) -> Result<PathBuf> {
    if run_dir.is_file() {
        return Ok(run_dir.to_path_buf());
    }
    let pattern = run_dir.join("specnum_*.txt");
    let pattern = pattern
        .to_str()
        .context("run directory path is not valid UTF-8")?;
    let mut matches: Vec<PathBuf> = glob(pattern)
        .context("invalid glob pattern for specnum files")?
        .filter_map(|m| m.ok())
        .collect();
    matches.sort();
    match matches.len() {
        0 => bail!("no specnum_*.txt found in {run_dir:?}"),
        1 => Ok(matches.remove(0)),
        n => bail!("{n} specnum files found in {run_dir:?}; pass one explicitly"),
    }
}
