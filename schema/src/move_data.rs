use crate::{ElementType, StatusType};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u16);

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "move#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

/// Stats that can be raised or lowered in battle. HP is never staged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatType {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
}

impl StatType {
    pub const ALL: [StatType; 5] = [
        StatType::Attack,
        StatType::Defense,
        StatType::SpecialAttack,
        StatType::SpecialDefense,
        StatType::Speed,
    ];

    pub fn index(self) -> usize {
        match self {
            StatType::Attack => 0,
            StatType::Defense => 1,
            StatType::SpecialAttack => 2,
            StatType::SpecialDefense => 3,
            StatType::Speed => 4,
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatType::Attack => "Attack",
            StatType::Defense => "Defense",
            StatType::SpecialAttack => "Special Attack",
            StatType::SpecialDefense => "Special Defense",
            StatType::Speed => "Speed",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    User,
    Target,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MoveEffect {
    /// Inflict a major status with `chance` percent.
    InflictStatus { status: StatusType, chance: u8 },
    /// Raise or lower a stat stage with `chance` percent.
    StatChange {
        target: Target,
        stat: StatType,
        stages: i8,
        chance: u8,
    },
    /// User takes this percentage of the damage dealt.
    Recoil(u8),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: ElementType,
    pub category: MoveCategory,
    pub power: Option<u8>,
    pub accuracy: Option<u8>, // None = never misses
    #[serde(default)]
    pub priority: i8,
    pub max_pp: u8,
    #[serde(default)]
    pub effects: Vec<MoveEffect>,
}

impl MoveData {
    pub fn is_damaging(&self) -> bool {
        self.category != MoveCategory::Status && self.power.unwrap_or(0) > 0
    }

    pub fn recoil_percent(&self) -> Option<u8> {
        self.effects.iter().find_map(|effect| match effect {
            MoveEffect::Recoil(percent) => Some(*percent),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_move(category: MoveCategory, power: Option<u8>) -> MoveData {
        MoveData {
            id: MoveId(1),
            name: "Sample".to_string(),
            move_type: ElementType::Normal,
            category,
            power,
            accuracy: Some(100),
            priority: 0,
            max_pp: 10,
            effects: vec![MoveEffect::Recoil(33)],
        }
    }

    #[test]
    fn test_is_damaging() {
        assert!(sample_move(MoveCategory::Physical, Some(40)).is_damaging());
        assert!(!sample_move(MoveCategory::Status, None).is_damaging());
        assert!(!sample_move(MoveCategory::Special, Some(0)).is_damaging());
    }

    #[test]
    fn test_recoil_percent_lookup() {
        assert_eq!(sample_move(MoveCategory::Physical, Some(90)).recoil_percent(), Some(33));
    }

    #[test]
    fn test_stat_indices_are_unique() {
        let mut seen = [false; 5];
        for stat in StatType::ALL {
            assert!(!seen[stat.index()]);
            seen[stat.index()] = true;
        }
    }
}
