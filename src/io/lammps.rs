use crate::core::structure::{Atom, SimBox};
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Which trajectory frame to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Last,
    /// 0-based index in file order.
    Index(usize),
}

fn parse_f64(s: &str) -> Result<f64> {
    s.parse::<f64>()
        .with_context(|| format!("failed to parse '{s}' as float"))
}

fn parse_u32(s: &str) -> Result<u32> {
    s.parse::<u32>()
        .with_context(|| format!("failed to parse '{s}' as integer"))
}

/// Reads a LAMMPS data file and returns the box plus atoms.
///
/// Supports the `atomic`, `charge` and `full` atom styles; anything else
/// falls back to "type in column 2, coordinates in the last three columns".
/// The data file carries no periodicity information, so the flags come from
/// the caller.
pub fn read_lammps_data(path: &Path, periodic: [bool; 3]) -> Result<(SimBox, Vec<Atom>)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read LAMMPS data file: {path:?}"))?;
    let lines: Vec<&str> = contents.lines().collect();

    // 1. Header: atom count and box bounds.
    let mut n_atoms: Option<usize> = None;
    let mut bounds: HashMap<&str, (f64, f64)> = HashMap::new();

    for line in &lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.ends_with("atoms") {
            let first = line.split_whitespace().next().unwrap_or("");
            n_atoms = Some(
                first
                    .parse()
                    .with_context(|| format!("bad atom count line: '{line}'"))?,
            );
        } else {
            for key in ["xlo xhi", "ylo yhi", "zlo zhi"] {
                if line.contains(key) {
                    let parts: Vec<&str> = line.split_whitespace().collect();
                    if parts.len() < 2 {
                        bail!("bad bounds line: '{line}'");
                    }
                    bounds.insert(key, (parse_f64(parts[0])?, parse_f64(parts[1])?));
                }
            }
        }
    }

    let n_atoms = n_atoms.context("no atom count found in LAMMPS data header")?;
    let get = |key: &str| -> Result<(f64, f64)> {
        bounds
            .get(key)
            .copied()
            .ok_or_else(|| anyhow!("no '{key}' bounds found in LAMMPS data header"))
    };
    let (xlo, xhi) = get("xlo xhi")?;
    let (ylo, yhi) = get("ylo yhi")?;
    let (zlo, zhi) = get("zlo zhi")?;
    let bbox = SimBox::from_bounds(xlo, xhi, ylo, yhi, zlo, zhi, periodic)
        .map_err(|e| anyhow!(e))?;

    // 2. Atoms section (the style may be annotated after '#').
    let mut atoms_start = None;
    let mut atoms_style = "atomic".to_string();
    for (i, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.starts_with("Atoms") {
            atoms_start = Some(i);
            if let Some((_, style)) = line.split_once('#') {
                atoms_style = style.trim().to_string();
            }
            break;
        }
    }
    let atoms_start = atoms_start.context("no 'Atoms' section found in LAMMPS data file")?;

    // 3. Parse atom lines until the next blank separator.
    let mut i = atoms_start + 1;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }

    let mut atoms = Vec::with_capacity(n_atoms);
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            i += 1;
            continue;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();
        let (type_col, coord_cols): (usize, [usize; 3]) = if atoms_style.starts_with("atomic") {
            // atom-ID atom-type x y z
            (1, [2, 3, 4])
        } else if atoms_style.starts_with("charge") {
            // atom-ID atom-type q x y z
            (1, [3, 4, 5])
        } else if atoms_style.starts_with("full") {
            // atom-ID molecule-ID atom-type q x y z
            (2, [4, 5, 6])
        } else {
            if parts.len() < 5 {
                bail!("atom line too short for fallback parsing: '{line}'");
            }
            (1, [parts.len() - 3, parts.len() - 2, parts.len() - 1])
        };

        let max_col = coord_cols[2].max(type_col);
        if parts.len() <= max_col {
            bail!("atom line has too few columns for style '{atoms_style}': '{line}'");
        }

        atoms.push(Atom {
            type_id: parse_u32(parts[type_col])?,
            position: Vector3::new(
                parse_f64(parts[coord_cols[0]])?,
                parse_f64(parts[coord_cols[1]])?,
                parse_f64(parts[coord_cols[2]])?,
            ),
        });
        i += 1;
    }

    if atoms.len() != n_atoms {
        bail!(
            "expected {n_atoms} atom lines, found {} in Atoms section",
            atoms.len()
        );
    }

    Ok((bbox, atoms))
}

/// Reads one frame of a LAMMPS trajectory (.lammpstrj).
pub fn read_lammpstrj(path: &Path, frame: Frame, periodic: [bool; 3]) -> Result<(SimBox, Vec<Atom>)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read LAMMPS trajectory: {path:?}"))?;
    let mut lines = contents.lines();

    let mut chosen: Option<(SimBox, Vec<Atom>)> = None;
    let mut remaining = match frame {
        Frame::Last => usize::MAX,
        Frame::Index(i) => i,
    };

    let next_line = |lines: &mut std::str::Lines<'_>| -> Result<String> {
        lines
            .next()
            .map(str::to_string)
            .context("unexpected end of trajectory file")
    };

    while let Some(line) = lines.next() {
        if !line.starts_with("ITEM: TIMESTEP") {
            continue;
        }
        let _timestep = next_line(&mut lines)?;

        let header = next_line(&mut lines)?;
        if !header.starts_with("ITEM: NUMBER OF ATOMS") {
            bail!("expected 'ITEM: NUMBER OF ATOMS', got '{header}'");
        }
        let n_atoms: usize = next_line(&mut lines)?
            .trim()
            .parse()
            .context("bad atom count in trajectory frame")?;

        let header = next_line(&mut lines)?;
        if !header.starts_with("ITEM: BOX BOUNDS") {
            bail!("expected 'ITEM: BOX BOUNDS', got '{header}'");
        }
        let mut lo = [0.0f64; 3];
        let mut hi = [0.0f64; 3];
        for axis in 0..3 {
            let line = next_line(&mut lines)?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                bail!("bad box bounds line: '{line}'");
            }
            lo[axis] = parse_f64(parts[0])?;
            hi[axis] = parse_f64(parts[1])?;
        }
        let bbox = SimBox::from_bounds(lo[0], hi[0], lo[1], hi[1], lo[2], hi[2], periodic)
            .map_err(|e| anyhow!(e))?;

        let header = next_line(&mut lines)?;
        if !header.starts_with("ITEM: ATOMS") {
            bail!("expected 'ITEM: ATOMS', got '{header}'");
        }
        let fields: Vec<&str> = header.split_whitespace().skip(2).collect();
        let col = |name: &str| -> Result<usize> {
            fields
                .iter()
                .position(|&f| f == name)
                .ok_or_else(|| anyhow!("trajectory is missing the '{name}' column"))
        };
        let (ct, cx, cy, cz) = (col("type")?, col("x")?, col("y")?, col("z")?);

        let mut atoms = Vec::with_capacity(n_atoms);
        for _ in 0..n_atoms {
            let line = next_line(&mut lines)?;
            let parts: Vec<&str> = line.split_whitespace().collect();
            let max_col = ct.max(cx).max(cy).max(cz);
            if parts.len() <= max_col {
                bail!("atom line has too few columns: '{line}'");
            }
            atoms.push(Atom {
                type_id: parse_u32(parts[ct])?,
                position: Vector3::new(
                    parse_f64(parts[cx])?,
                    parse_f64(parts[cy])?,
                    parse_f64(parts[cz])?,
                ),
            });
        }

        match frame {
            Frame::Last => chosen = Some((bbox, atoms)),
            Frame::Index(_) => {
                if remaining == 0 {
                    return Ok((bbox, atoms));
                }
                remaining -= 1;
            }
        }
    }

    match frame {
        Frame::Last => chosen.ok_or_else(|| anyhow!("no frames found in trajectory {path:?}")),
        Frame::Index(i) => bail!("trajectory {path:?} has no frame with index {i}"),
    }
}
