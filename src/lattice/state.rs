use crate::core::error::PipelineError;
use crate::core::structure::LabelSpeciesMap;
use crate::lattice::builder::SiteLattice;

/// Initial occupation of the lattice: one `(site_id, species)` pair per site.
pub type Occupation = Vec<(usize, String)>;

/// Maps every site's phase label to a simulator species name, in site id
/// order.
///
/// Fails with `UnmappedLabel` on the first site whose label is missing from
/// the map; by that point grid and site construction have already succeeded,
/// so the error names the cell for diagnosis.
pub fn map_initial_state(
    lattice: &SiteLattice,
    species_map: &LabelSpeciesMap,
) -> Result<Occupation, PipelineError> {
    let mut occupation = Vec::with_capacity(lattice.sites.len());
    for site in &lattice.sites {
        let species = species_map
            .species_for(&site.label)
            .ok_or_else(|| PipelineError::UnmappedLabel {
                label: site.label.clone(),
                cell: site.cell,
            })?;
        occupation.push((site.id, species.to_string()));
    }
    Ok(occupation)
}
