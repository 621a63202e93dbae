use crate::core::structure::{LabelSpeciesMap, TypeClassMap};
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

/// Strips a trailing `#` comment and surrounding whitespace.
fn clean(line: &str) -> &str {
    line.split('#').next().unwrap_or(line).trim()
}

/// Loads a type-class mapping file.
///
/// Format, one entry per line (comments after `#`, blanks ignored):
/// ```text
/// # type  class
/// 1       polymer
/// 3       tma
/// 5       water
/// ```
pub fn load_type_classes(path: &Path) -> Result<TypeClassMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read type-class file: {path:?}"))?;

    let mut map = TypeClassMap::new();
    for line in contents.lines() {
        let line = clean(line);
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(t), Some(class)) = (parts.next(), parts.next()) else {
            continue;
        };
        let type_id: u32 = t
            .parse()
            .with_context(|| format!("bad type id '{t}' in {path:?}"))?;
        map.insert(type_id, class);
    }

    if map.is_empty() {
        bail!("no type-class entries found in {path:?}");
    }
    Ok(map)
}

/// Loads a label-species mapping file.
///
/// Format, one entry per line:
/// ```text
/// # label    species
/// water      mw*
/// polymer    mem*
/// tma        tma*
/// ```
pub fn load_label_species(path: &Path) -> Result<LabelSpeciesMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("could not read label-species file: {path:?}"))?;

    let mut map = LabelSpeciesMap::new();
    for line in contents.lines() {
        let line = clean(line);
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(label), Some(species)) = (parts.next(), parts.next()) else {
            continue;
        };
        map.insert(label, species);
    }

    if map.is_empty() {
        bail!("no label-species entries found in {path:?}");
    }
    Ok(map)
}
