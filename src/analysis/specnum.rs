use anyhow::{bail, Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// IEC / WU / VH time series derived from a Zacros species_numbers file.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecnumSeries {
    pub time: Vec<f64>,
    pub tma: Vec<f64>,
    pub pol: Vec<f64>,
    pub mw: Vec<f64>,
    pub iec: Vec<f64>,
    pub wu: Vec<f64>,
    /// Hydrophilic volume fraction.
    pub vh: Vec<f64>,
}

// Molar masses of the degradation model (g/mol).
const M_CHARGED: f64 = 192.28;
const M_NEUTRAL: f64 = 118.133;
const M_DEGRADED: f64 = M_NEUTRAL + 14.0 + 13.0;

// Empirical linear map from voxel water uptake to gravimetric water uptake.
const WU_SLOPE: f64 = 0.74637;
const WU_INTERCEPT: f64 = -0.07734;

/// Reads a `specnum_*.txt` file: one header line, then rows where
/// time is column 3 and the TMA / POL / MW populations are columns 6-8.
fn read_specnum(path: &Path) -> Result<(Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>)> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read specnum file: {path:?}"))?;

    let mut time = Vec::new();
    let mut tma = Vec::new();
    let mut pol = Vec::new();
    let mut mw = Vec::new();

    for line in contents.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 8 {
            continue;
        }
        let get = |i: usize| -> Result<f64> {
            parts[i]
                .parse()
                .with_context(|| format!("bad numeric field '{}' in specnum line", parts[i]))
        };
        time.push(get(2)?);
        tma.push(get(5)?);
        pol.push(get(6)?);
        mw.push(get(7)?);
    }

    if time.is_empty() {
        bail!("no data lines found in {path:?}");
    }
    Ok((time, tma, pol, mw))
}

/// Computes IEC, WU and VH over time from a specnum file.
///
/// Formulas (j indexes rows):
///   VWU = MW[j] / (POL[0] + TMA[0]),  WU = 0.74637 * VWU - 0.07734
///   deg = (TMA[0] - TMA[j]) / TMA[0], clipped to [0, 1]
///   IEC = 1000 * 0.33 * (1 - deg)
///         / (0.33 * (1 - deg) * Mc + 0.67 * Mn + deg * 0.33 * Md)
///   VH  = (MW[j] + TMA[j]) / (MW[j] + TMA[j] + POL[0])
pub fn analyze_specnum_file(path: &Path) -> Result<SpecnumSeries> {
    let (time, tma, pol, mw) = read_specnum(path)?;

    let tma0 = tma[0];
    let pol0 = pol[0];
    if tma0 == 0.0 {
        bail!("initial TMA count is zero; cannot compute degradation fraction");
    }
    if pol0 + tma0 == 0.0 {
        bail!("POL[0] + TMA[0] == 0; cannot compute VWU");
    }

    let n = time.len();
    let mut iec = Vec::with_capacity(n);
    let mut wu = Vec::with_capacity(n);
    let mut vh = Vec::with_capacity(n);

    for j in 0..n {
        let vwu = mw[j] / (pol0 + tma0);
        wu.push(WU_SLOPE * vwu + WU_INTERCEPT);

        let deg = ((tma0 - tma[j]) / tma0).clamp(0.0, 1.0);
        let num = 1000.0 * 0.33 * (1.0 - deg);
        let den = 0.33 * (1.0 - deg) * M_CHARGED + 0.67 * M_NEUTRAL + deg * 0.33 * M_DEGRADED;
        iec.push(num / den);

        vh.push((mw[j] + tma[j]) / (mw[j] + tma[j] + pol0));
    }

    Ok(SpecnumSeries {
        time,
        tma,
        pol,
        mw,
        iec,
        wu,
        vh,
    })
}

/// Writes the time series as a tab-separated `.dat` file.
pub fn write_series<W: Write>(w: &mut W, series: &SpecnumSeries) -> Result<()> {
    writeln!(w, "time\tIEC\tWU\tVH")?;
    for j in 0..series.time.len() {
        writeln!(
            w,
            "{:8.4}\t{:8.4}\t{:8.4}\t{:8.4}",
            series.time[j], series.iec[j], series.wu[j], series.vh[j]
        )?;
    }
    Ok(())
}

pub fn write_series_file(path: &Path, series: &SpecnumSeries) -> Result<()> {
    let mut buf = Vec::new();
    write_series(&mut buf, series)?;
    fs::write(path, buf).with_context(|| format!("could not write series file: {path:?}"))
}
