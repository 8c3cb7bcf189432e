//! Static species and move tables.
//!
//! The engine never reaches for global data: every operation that needs a
//! species or move record takes a `&Dex`.

use crate::errors::{ConfigResult, ConfigurationError};
use schema::{MoveData, MoveId, SpeciesData, SpeciesId};
use std::collections::HashMap;
use tracing::debug;

const BUILTIN_SPECIES: &str = include_str!("../data/species.ron");
const BUILTIN_MOVES: &str = include_str!("../data/moves.ron");

#[derive(Debug, Clone, Default)]
pub struct Dex {
    species: HashMap<SpeciesId, SpeciesData>,
    moves: HashMap<MoveId, MoveData>,
}

impl Dex {
    /// An empty dex. Fill it with `insert_species` / `insert_move`.
    pub fn new() -> Self {
        Self::default()
    }

    /// The tables shipped with the crate.
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_ron_str(BUILTIN_SPECIES, BUILTIN_MOVES)
    }

    pub fn from_ron_str(species_source: &str, moves_source: &str) -> ConfigResult<Self> {
        let species: Vec<SpeciesData> = parse_table("species table", species_source)?;
        let moves: Vec<MoveData> = parse_table("move table", moves_source)?;

        let mut dex = Self::new();
        for move_data in moves {
            dex.insert_move(move_data)?;
        }
        for species_data in species {
            dex.insert_species(species_data)?;
        }
        dex.validate_references()?;

        debug!(
            species = dex.species.len(),
            moves = dex.moves.len(),
            "loaded dex"
        );
        Ok(dex)
    }

    pub fn insert_species(&mut self, data: SpeciesData) -> ConfigResult<()> {
        let type_count = data.types.len();
        if !(1..=2).contains(&type_count) {
            return Err(ConfigurationError::InvalidTyping {
                species: data.id,
                count: type_count,
            });
        }
        if data.types.contains(&schema::ElementType::Typeless) {
            return Err(ConfigurationError::Invalid(format!(
                "species {} cannot be Typeless",
                data.name
            )));
        }
        if self.species.contains_key(&data.id) {
            return Err(ConfigurationError::DuplicateEntry(format!(
                "species {}",
                data.id
            )));
        }
        self.species.insert(data.id, data);
        Ok(())
    }

    pub fn insert_move(&mut self, data: MoveData) -> ConfigResult<()> {
        if self.moves.contains_key(&data.id) {
            return Err(ConfigurationError::DuplicateEntry(format!("move {}", data.id)));
        }
        self.moves.insert(data.id, data);
        Ok(())
    }

    pub fn species(&self, id: SpeciesId) -> ConfigResult<&SpeciesData> {
        self.species
            .get(&id)
            .ok_or(ConfigurationError::SpeciesNotFound(id))
    }

    pub fn move_data(&self, id: MoveId) -> ConfigResult<&MoveData> {
        self.moves.get(&id).ok_or(ConfigurationError::MoveNotFound(id))
    }

    /// Case-insensitive lookup by display name.
    pub fn species_by_name(&self, name: &str) -> Option<&SpeciesData> {
        self.species
            .values()
            .find(|data| data.name.eq_ignore_ascii_case(name))
    }

    /// All species ids in ascending order.
    pub fn species_ids(&self) -> Vec<SpeciesId> {
        let mut ids: Vec<SpeciesId> = self.species.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Every learnset move and evolution target must exist.
    pub fn validate_references(&self) -> ConfigResult<()> {
        for data in self.species.values() {
            for move_id in data.learnset.all_moves() {
                self.move_data(move_id)?;
            }
            if let Some(evolution) = &data.evolution {
                self.species(evolution.evolves_into)?;
            }
        }
        Ok(())
    }
}

fn parse_table<T: serde::de::DeserializeOwned>(source_name: &str, source: &str) -> ConfigResult<T> {
    ron::from_str(source).map_err(|err| ConfigurationError::Parse {
        source_name: source_name.to_string(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::{
        BaseStats, ElementType, EvolutionMethod, EvolutionRule, ExperienceGroup, Learnset,
        MoveCategory,
    };
    use std::collections::BTreeMap;

    fn species(id: u16, types: Vec<ElementType>) -> SpeciesData {
        SpeciesData {
            id: SpeciesId(id),
            name: format!("Species{}", id),
            types,
            base_stats: BaseStats {
                hp: 50,
                attack: 50,
                defense: 50,
                sp_attack: 50,
                sp_defense: 50,
                speed: 50,
            },
            catch_rate: 100,
            base_exp: 60,
            experience_group: ExperienceGroup::MediumFast,
            learnset: Learnset::default(),
            evolution: None,
        }
    }

    fn tackle() -> MoveData {
        MoveData {
            id: MoveId(1),
            name: "Tackle".to_string(),
            move_type: ElementType::Normal,
            category: MoveCategory::Physical,
            power: Some(40),
            accuracy: Some(100),
            priority: 0,
            max_pp: 35,
            effects: vec![],
        }
    }

    #[test]
    fn test_builtin_tables_load() {
        let dex = Dex::builtin().expect("builtin data should load");
        assert_eq!(dex.species_ids().len(), 12);
        let cub = dex.species_by_name("cindercub").expect("Cindercub exists");
        assert_eq!(cub.types, vec![ElementType::Fire]);
        assert!(dex.move_data(MoveId(3)).is_ok());
    }

    #[test]
    fn test_typing_arity_is_enforced() {
        let mut dex = Dex::new();
        assert_eq!(
            dex.insert_species(species(1, vec![])),
            Err(ConfigurationError::InvalidTyping {
                species: SpeciesId(1),
                count: 0
            })
        );
        assert_eq!(
            dex.insert_species(species(
                2,
                vec![ElementType::Fire, ElementType::Water, ElementType::Grass]
            )),
            Err(ConfigurationError::InvalidTyping {
                species: SpeciesId(2),
                count: 3
            })
        );
        assert!(dex.insert_species(species(3, vec![ElementType::Fire, ElementType::Flying])).is_ok());
    }

    #[test]
    fn test_duplicates_are_rejected() {
        let mut dex = Dex::new();
        dex.insert_move(tackle()).unwrap();
        assert!(matches!(
            dex.insert_move(tackle()),
            Err(ConfigurationError::DuplicateEntry(_))
        ));
        dex.insert_species(species(1, vec![ElementType::Normal])).unwrap();
        assert!(matches!(
            dex.insert_species(species(1, vec![ElementType::Normal])),
            Err(ConfigurationError::DuplicateEntry(_))
        ));
    }

    #[test]
    fn test_dangling_references_fail_validation() {
        let mut dex = Dex::new();
        let mut learner = species(1, vec![ElementType::Normal]);
        let mut level_up = BTreeMap::new();
        level_up.insert(1, vec![MoveId(42)]);
        learner.learnset = Learnset { level_up };
        dex.insert_species(learner).unwrap();
        assert_eq!(
            dex.validate_references(),
            Err(ConfigurationError::MoveNotFound(MoveId(42)))
        );

        let mut dex = Dex::new();
        let mut evolver = species(1, vec![ElementType::Normal]);
        evolver.evolution = Some(EvolutionRule {
            evolves_into: SpeciesId(9),
            method: EvolutionMethod::Level(10),
        });
        dex.insert_species(evolver).unwrap();
        assert_eq!(
            dex.validate_references(),
            Err(ConfigurationError::SpeciesNotFound(SpeciesId(9)))
        );
    }

    #[test]
    fn test_missing_lookup_errors() {
        let dex = Dex::new();
        assert_eq!(
            dex.species(SpeciesId(7)).unwrap_err(),
            ConfigurationError::SpeciesNotFound(SpeciesId(7))
        );
        assert_eq!(
            dex.move_data(MoveId(7)).unwrap_err(),
            ConfigurationError::MoveNotFound(MoveId(7))
        );
    }

    #[test]
    fn test_bad_ron_is_reported_with_table_name() {
        let result = Dex::from_ron_str("[ (id: 1, ", "[]");
        match result {
            Err(ConfigurationError::Parse { source_name, .. }) => {
                assert_eq!(source_name, "species table")
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }
}
