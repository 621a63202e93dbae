use crate::core::error::PipelineError;
use crate::core::structure::{Atom, TypeClassMap};
use std::collections::BTreeMap;

/// Resolves the single phase label of one occupied cell.
///
/// Each member atom is mapped to its label through the type-class map
/// (`UnknownType` if an atom type is missing), then the labels are reduced by
/// majority vote. Ties are broken deterministically: the lexicographically
/// smallest label among the tied ones wins. The rule is independent of atom
/// order, so repeated runs over the same input agree byte for byte.
pub fn resolve_cell_label(
    atoms: &[Atom],
    members: &[usize],
    type_map: &TypeClassMap,
) -> Result<String, PipelineError> {
    debug_assert!(!members.is_empty(), "empty cells have no label");

    // BTreeMap keeps the tally in lexicographic label order, which is what
    // makes the strict-greater comparison below implement the tie-break.
    let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
    for &atom_index in members {
        let atom = &atoms[atom_index];
        let label = type_map
            .label_for(atom.type_id)
            .ok_or(PipelineError::UnknownType {
                atom_index,
                type_id: atom.type_id,
            })?;
        *tally.entry(label).or_insert(0) += 1;
    }

    let mut winner: Option<(&str, usize)> = None;
    for (label, count) in tally {
        match winner {
            Some((_, best)) if count <= best => {}
            _ => winner = Some((label, count)),
        }
    }

    // members is non-empty, so the tally has at least one entry.
    Ok(winner.map(|(label, _)| label.to_string()).unwrap_or_default())
}
