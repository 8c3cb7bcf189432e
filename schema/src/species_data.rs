use crate::{ElementType, ItemId, MoveId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub sp_attack: u8,
    pub sp_defense: u8,
    pub speed: u8,
}

impl BaseStats {
    /// Base stat total.
    pub fn total(&self) -> u16 {
        self.hp as u16
            + self.attack as u16
            + self.defense as u16
            + self.sp_attack as u16
            + self.sp_defense as u16
            + self.speed as u16
    }

    /// HP, ATK, DEF, SP.ATK, SP.DEF, SPD
    pub fn as_array(&self) -> [u8; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_attack,
            self.sp_defense,
            self.speed,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Learnset {
    pub level_up: BTreeMap<u8, Vec<MoveId>>, // level -> moves learned at that level
}

impl Learnset {
    pub fn learns_at_level(&self, level: u8) -> &[MoveId] {
        self.level_up
            .get(&level)
            .map(|moves| moves.as_slice())
            .unwrap_or(&[])
    }

    /// Every move learned at or below `level`, in learn order.
    pub fn learned_up_to(&self, level: u8) -> Vec<MoveId> {
        self.level_up
            .range(..=level)
            .flat_map(|(_, moves)| moves.iter().copied())
            .collect()
    }

    pub fn all_moves(&self) -> impl Iterator<Item = MoveId> + '_ {
        self.level_up.values().flatten().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionMethod {
    Level(u8),
    Item(ItemId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionRule {
    pub evolves_into: SpeciesId,
    pub method: EvolutionMethod,
}

/// Growth curve deciding how much total experience each level requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceGroup {
    Fast,
    MediumFast,
    MediumSlow,
    Slow,
}

impl ExperienceGroup {
    /// Total experience required to reach `level`. Level 1 always needs 0.
    pub fn exp_for_level(&self, level: u8) -> u32 {
        if level <= 1 {
            return 0;
        }
        let n = level as i64;
        let exp = match self {
            ExperienceGroup::Fast => 4 * n.pow(3) / 5,
            ExperienceGroup::MediumFast => n.pow(3),
            ExperienceGroup::MediumSlow => 6 * n.pow(3) / 5 - 15 * n.pow(2) + 100 * n - 140,
            ExperienceGroup::Slow => 5 * n.pow(3) / 4,
        };
        exp.max(0) as u32
    }

    /// Highest level whose threshold is covered by `exp`, capped at `max_level`.
    pub fn level_for_exp(&self, exp: u32, max_level: u8) -> u8 {
        let mut level = 1;
        while level < max_level && self.exp_for_level(level + 1) <= exp {
            level += 1;
        }
        level
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
    pub catch_rate: u8,
    pub base_exp: u16,
    pub experience_group: ExperienceGroup,
    #[serde(default)]
    pub learnset: Learnset,
    #[serde(default)]
    pub evolution: Option<EvolutionRule>,
}

impl SpeciesData {
    pub fn has_type(&self, element: ElementType) -> bool {
        self.types.contains(&element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_groups() {
        assert_eq!(ExperienceGroup::Fast.exp_for_level(1), 0);
        assert_eq!(ExperienceGroup::MediumFast.exp_for_level(10), 1000);
        assert!(ExperienceGroup::Fast.exp_for_level(50) < ExperienceGroup::Slow.exp_for_level(50));

        let fast_exp_50 = ExperienceGroup::Fast.exp_for_level(50);
        assert_eq!(ExperienceGroup::Fast.level_for_exp(fast_exp_50 - 1, 100), 49);
        assert_eq!(ExperienceGroup::Fast.level_for_exp(fast_exp_50, 100), 50);
    }

    #[test]
    fn test_medium_slow_never_negative_and_monotonic() {
        let mut previous = 0;
        for level in 1..=100u8 {
            let exp = ExperienceGroup::MediumSlow.exp_for_level(level);
            assert!(exp >= previous, "level {} dropped below level {}", level, level - 1);
            previous = exp;
        }
    }

    #[test]
    fn test_level_for_exp_respects_cap() {
        assert_eq!(ExperienceGroup::MediumFast.level_for_exp(u32::MAX, 100), 100);
        assert_eq!(ExperienceGroup::MediumFast.level_for_exp(u32::MAX, 50), 50);
    }

    #[test]
    fn test_learnset_queries() {
        let mut level_up = BTreeMap::new();
        level_up.insert(1, vec![MoveId(1), MoveId(2)]);
        level_up.insert(7, vec![MoveId(3)]);
        level_up.insert(12, vec![MoveId(4)]);
        let learnset = Learnset { level_up };

        assert_eq!(learnset.learns_at_level(7), &[MoveId(3)]);
        assert!(learnset.learns_at_level(8).is_empty());
        assert_eq!(learnset.learned_up_to(7), vec![MoveId(1), MoveId(2), MoveId(3)]);
    }
}
