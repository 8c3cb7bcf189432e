use crate::battle::state::Side;
use crate::creature::{calculate_stats, CreatureInstance, MoveSlot, StatusCondition, Stats, MAX_MOVES};
use crate::dex::Dex;
use crate::errors::{ConfigResult, ConfigurationError};
use schema::{ElementType, SpeciesId, StatType};
use serde::{Deserialize, Serialize};

pub const MAX_STAT_STAGE: i8 = 6;

/// Stat stages for Attack, Defense, SpecialAttack, SpecialDefense, Speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatStages([i8; 5]);

impl StatStages {
    pub fn get(&self, stat: StatType) -> i8 {
        self.0[stat.index()]
    }

    /// Apply `delta` clamped to ±6. Returns (old, new).
    pub fn apply(&mut self, stat: StatType, delta: i8) -> (i8, i8) {
        let old = self.get(stat);
        let new = (old + delta).clamp(-MAX_STAT_STAGE, MAX_STAT_STAGE);
        self.0[stat.index()] = new;
        (old, new)
    }

    pub fn at_limit(&self, stat: StatType, delta: i8) -> bool {
        let current = self.get(stat);
        (delta > 0 && current >= MAX_STAT_STAGE) || (delta < 0 && current <= -MAX_STAT_STAGE)
    }
}

/// Battle-scoped view of one creature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantState {
    pub side: Side,
    pub species: SpeciesId,
    pub name: String,
    pub nickname: Option<String>,
    pub types: Vec<ElementType>,
    pub level: u8,
    pub experience: u32,
    pub ivs: [u8; 6],
    pub evs: [u8; 6],
    pub stats: Stats,
    pub current_hp: u16,
    pub status: Option<StatusCondition>,
    pub moves: [Option<MoveSlot>; MAX_MOVES],
    pub stat_stages: StatStages,
}

impl CombatantState {
    pub fn from_instance(dex: &Dex, instance: &CreatureInstance, side: Side) -> ConfigResult<Self> {
        let species_data = dex.species(instance.species)?;
        for slot in instance.moves.iter().flatten() {
            dex.move_data(slot.move_id)?;
        }
        if instance.moves.iter().all(|slot| slot.is_none()) {
            return Err(ConfigurationError::Invalid(format!(
                "{} knows no moves",
                species_data.name
            )));
        }

        let stats = calculate_stats(
            &species_data.base_stats,
            instance.level,
            &instance.ivs,
            &instance.evs,
        );

        Ok(Self {
            side,
            species: instance.species,
            name: instance
                .nickname
                .clone()
                .unwrap_or_else(|| species_data.name.clone()),
            nickname: instance.nickname.clone(),
            types: species_data.types.clone(),
            level: instance.level,
            experience: instance.experience,
            ivs: instance.ivs,
            evs: instance.evs,
            stats,
            current_hp: instance.current_hp.min(stats.hp),
            status: instance.status,
            moves: instance.moves,
            stat_stages: StatStages::default(),
        })
    }

    /// Snapshot for write-back. Volatile conditions do not outlive the battle.
    pub fn to_instance(&self) -> CreatureInstance {
        CreatureInstance {
            species: self.species,
            nickname: self.nickname.clone(),
            level: self.level,
            experience: self.experience,
            ivs: self.ivs,
            evs: self.evs,
            current_hp: self.current_hp,
            status: self.status.filter(|status| !status.is_volatile()),
            moves: self.moves,
        }
    }

    pub fn max_hp(&self) -> u16 {
        self.stats.hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }

    /// Returns the HP actually removed.
    pub fn take_damage(&mut self, amount: u16) -> u16 {
        let dealt = amount.min(self.current_hp);
        self.current_hp -= dealt;
        dealt
    }

    /// Returns the HP actually restored.
    pub fn heal(&mut self, amount: u16) -> u16 {
        let healed = amount.min(self.max_hp() - self.current_hp);
        self.current_hp += healed;
        healed
    }

    pub fn has_usable_move(&self) -> bool {
        self.moves.iter().flatten().any(|slot| slot.pp > 0)
    }

    /// The fixed fallback applies once every known move is out of PP.
    pub fn must_use_fallback(&self) -> bool {
        !self.has_usable_move()
    }

    pub fn first_empty_slot(&self) -> Option<usize> {
        self.moves.iter().position(|slot| slot.is_none())
    }
}
