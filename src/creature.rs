use crate::dex::Dex;
use crate::errors::{ConfigResult, ConfigurationError};
use schema::{BaseStats, MoveId, SpeciesId, StatusType};
use serde::{Deserialize, Serialize};

pub const MAX_MOVES: usize = 4;
pub const DEFAULT_IVS: [u8; 6] = [15; 6];
pub const MAX_EV_PER_STAT: u8 = 252;

/// At most one of these is active on a creature at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusCondition {
    Poison,
    Paralysis,
    Sleep { turns_remaining: u8 },
    Burn,
    Freeze,
    Confusion { turns_remaining: u8 },
}

impl StatusCondition {
    pub fn status_type(&self) -> StatusType {
        match self {
            StatusCondition::Poison => StatusType::Poison,
            StatusCondition::Paralysis => StatusType::Paralysis,
            StatusCondition::Sleep { .. } => StatusType::Sleep,
            StatusCondition::Burn => StatusType::Burn,
            StatusCondition::Freeze => StatusType::Freeze,
            StatusCondition::Confusion { .. } => StatusType::Confusion,
        }
    }

    /// Volatile conditions last only for the battle that caused them.
    pub fn is_volatile(&self) -> bool {
        matches!(self, StatusCondition::Confusion { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub move_id: MoveId,
    pub pp: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_attack: u16,
    pub sp_defense: u16,
    pub speed: u16,
}

/// Calculate current stats based on base stats, level, IVs, and EVs
/// Uses Gen 3+ stat calculation formula without natures
pub fn calculate_stats(base_stats: &BaseStats, level: u8, ivs: &[u8; 6], evs: &[u8; 6]) -> Stats {
    let base = base_stats.as_array();
    let mut stats = [0u16; 6];

    for i in 0..6 {
        let base_calculation = 2 * base[i] as u32 + ivs[i] as u32 + (evs[i] as u32 / 4);
        let scaled = base_calculation * level as u32 / 100;
        let stat = if i == 0 {
            // HP = floor(0.01 * (2 * Base + IV + floor(0.25 * EV)) * Level) + Level + 10
            scaled + level as u32 + 10
        } else {
            // Other Stat = floor(0.01 * (2 * Base + IV + floor(0.25 * EV)) * Level) + 5
            scaled + 5
        };
        stats[i] = stat.min(u16::MAX as u32) as u16;
    }

    Stats {
        hp: stats[0],
        attack: stats[1],
        defense: stats[2],
        sp_attack: stats[3],
        sp_defense: stats[4],
        speed: stats[5],
    }
}

/// Persistent creature snapshot owned by the caller. The engine reads it at
/// battle start and hands an updated copy back when the battle concludes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatureInstance {
    pub species: SpeciesId,
    pub nickname: Option<String>,
    pub level: u8,
    pub experience: u32,
    pub ivs: [u8; 6],
    pub evs: [u8; 6],
    pub current_hp: u16,
    pub status: Option<StatusCondition>,
    pub moves: [Option<MoveSlot>; MAX_MOVES],
}

impl CreatureInstance {
    /// A fresh creature at `level` with full HP, default IVs, and the last four
    /// learnset moves it would know at that level.
    pub fn new(dex: &Dex, species: SpeciesId, level: u8) -> ConfigResult<Self> {
        let species_data = dex.species(species)?;
        let known = species_data.learnset.learned_up_to(level);
        let start = known.len().saturating_sub(MAX_MOVES);
        Self::with_moves(dex, species, level, &known[start..])
    }

    /// A fresh creature with an explicit move list (first four are kept).
    pub fn with_moves(
        dex: &Dex,
        species: SpeciesId,
        level: u8,
        moves: &[MoveId],
    ) -> ConfigResult<Self> {
        if !(1..=100).contains(&level) {
            return Err(ConfigurationError::Invalid(format!(
                "level {} is outside 1..=100",
                level
            )));
        }
        let species_data = dex.species(species)?;

        let mut move_slots = [None; MAX_MOVES];
        for (slot, move_id) in move_slots.iter_mut().zip(moves.iter().take(MAX_MOVES)) {
            let move_data = dex.move_data(*move_id)?;
            *slot = Some(MoveSlot {
                move_id: *move_id,
                pp: move_data.max_pp,
            });
        }

        let ivs = DEFAULT_IVS;
        let evs = [0; 6];
        let stats = calculate_stats(&species_data.base_stats, level, &ivs, &evs);

        Ok(Self {
            species,
            nickname: None,
            level,
            experience: species_data.experience_group.exp_for_level(level),
            ivs,
            evs,
            current_hp: stats.hp,
            status: None,
            moves: move_slots,
        })
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    pub fn stats(&self, dex: &Dex) -> ConfigResult<Stats> {
        let species_data = dex.species(self.species)?;
        Ok(calculate_stats(
            &species_data.base_stats,
            self.level,
            &self.ivs,
            &self.evs,
        ))
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }
}
