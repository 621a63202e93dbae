use crate::voxel::grid::LabelGrid;
use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes the grid artifact: occupied-cell count, a header carrying the
/// geometry, then one `label ix iy iz` line per occupied cell in canonical
/// traversal order.
///
/// The line number of an occupied cell (0-based, after the two header lines)
/// equals its lattice site id, which is what keeps the grid artifact, the
/// lattice file and the initial-state file aligned.
pub fn write_grid_xyz<W: Write>(w: &mut W, grid: &LabelGrid) -> Result<()> {
    let [nx, ny, nz] = grid.dims();
    writeln!(w, "{}", grid.occupied_count())?;
    writeln!(w, "# {} {} {} {}", nx, ny, nz, grid.spacing())?;
    for (cell, label) in grid.iter_occupied() {
        writeln!(w, "{} {} {} {}", label, cell[0], cell[1], cell[2])?;
    }
    Ok(())
}

pub fn write_grid_xyz_file(path: &Path, grid: &LabelGrid) -> Result<()> {
    let mut buf = Vec::new();
    write_grid_xyz(&mut buf, grid)?;
    fs::write(path, buf).with_context(|| format!("could not write grid file: {path:?}"))
}

/// Reads a grid artifact back into a `LabelGrid`.
///
/// Dimensions and spacing come from the header line, never from the maximum
/// cell index seen in the data (edge cells may be void). The palette is the
/// sorted set of labels present in the file.
pub fn read_grid_xyz(path: &Path) -> Result<LabelGrid> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read grid file: {path:?}"))?;
    let mut lines = contents.lines();

    let count_line = lines.next().context("grid file is empty")?;
    let n_occupied: usize = count_line
        .trim()
        .parse()
        .with_context(|| format!("bad occupied-cell count: '{count_line}'"))?;

    let header = lines.next().context("grid file is missing its header line")?;
    let fields: Vec<&str> = header.trim_start_matches('#').split_whitespace().collect();
    if fields.len() < 4 {
        bail!("grid header must be '# nx ny nz spacing', got '{header}'");
    }
    let nx: usize = fields[0].parse().context("bad nx in grid header")?;
    let ny: usize = fields[1].parse().context("bad ny in grid header")?;
    let nz: usize = fields[2].parse().context("bad nz in grid header")?;
    let spacing: f64 = fields[3].parse().context("bad spacing in grid header")?;

    let mut entries: Vec<(String, [usize; 3])> = Vec::with_capacity(n_occupied);
    for line in lines {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.is_empty() {
            continue;
        }
        if parts.len() < 4 {
            bail!("bad grid line: '{line}'");
        }
        let cell = [
            parts[1].parse::<usize>().with_context(|| format!("bad ix in '{line}'"))?,
            parts[2].parse::<usize>().with_context(|| format!("bad iy in '{line}'"))?,
            parts[3].parse::<usize>().with_context(|| format!("bad iz in '{line}'"))?,
        ];
        if cell[0] >= nx || cell[1] >= ny || cell[2] >= nz {
            bail!("cell ({} {} {}) outside grid {}x{}x{}", cell[0], cell[1], cell[2], nx, ny, nz);
        }
        entries.push((parts[0].to_string(), cell));
    }

    if entries.len() != n_occupied {
        bail!(
            "grid file announces {n_occupied} occupied cells but contains {}",
            entries.len()
        );
    }

    let palette: Vec<String> = entries.iter().map(|(l, _)| l.clone()).collect();
    let mut grid = LabelGrid::new([nx, ny, nz], spacing, palette);
    for (label, cell) in &entries {
        grid.set_label(*cell, label).map_err(anyhow::Error::new)?;
    }
    Ok(grid)
}
