use schema::{EvolutionMethod, ItemId, SpeciesData, SpeciesId};

/// The species this one may become at `level`, if a level rule allows it.
/// Evolution is only reported, never applied.
pub fn evolution_ready(species: &SpeciesData, level: u8) -> Option<SpeciesId> {
    let rule = species.evolution.as_ref()?;
    match rule.method {
        EvolutionMethod::Level(required_level) if level >= required_level => {
            Some(rule.evolves_into)
        }
        EvolutionMethod::Level(_) | EvolutionMethod::Item(_) => None, // Items handled separately
    }
}

pub fn evolution_ready_with_item(species: &SpeciesData, item: ItemId) -> Option<SpeciesId> {
    let rule = species.evolution.as_ref()?;
    match rule.method {
        EvolutionMethod::Item(required) if required == item => Some(rule.evolves_into),
        _ => None,
    }
}
