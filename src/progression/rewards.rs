use crate::battle::state::BattleKind;
use crate::config::BattleConfig;
use schema::{BaseStats, SpeciesData};
use serde::{Deserialize, Serialize};

// Experience yield divisor: base_exp * level / 7
const EXP_LEVEL_DIVISOR: u32 = 7;

// BST thresholds for EV yield
const BST_LOW_THRESHOLD: u16 = 300;
const BST_HIGH_THRESHOLD: u16 = 500;
const EV_YIELD_LOW: u8 = 1;
const EV_YIELD_MEDIUM: u8 = 2;
const EV_YIELD_HIGH: u8 = 3;

/// Effort Values awarded when a creature faints
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvYield {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub special_attack: u8,
    pub special_defense: u8,
    pub speed: u8,
}

impl EvYield {
    pub fn total(&self) -> u8 {
        self.hp
            + self.attack
            + self.defense
            + self.special_attack
            + self.special_defense
            + self.speed
    }

    /// Same stat order as `BaseStats::as_array`.
    pub fn as_array(&self) -> [u8; 6] {
        [
            self.hp,
            self.attack,
            self.defense,
            self.special_attack,
            self.special_defense,
            self.speed,
        ]
    }

    fn set(&mut self, index: usize, value: u8) {
        match index {
            0 => self.hp = value,
            1 => self.attack = value,
            2 => self.defense = value,
            3 => self.special_attack = value,
            4 => self.special_defense = value,
            _ => self.speed = value,
        }
    }
}

/// Calculator for experience and EV rewards based on the fainted species
pub struct RewardCalculator;

impl RewardCalculator {
    /// Experience for defeating `species` at `level`.
    /// Formula: base_exp * level / 7, times the trainer multiplier in trainer battles
    pub fn calculate_exp_yield(
        &self,
        species: &SpeciesData,
        level: u8,
        kind: BattleKind,
        config: &BattleConfig,
    ) -> u32 {
        let base = species.base_exp as u32 * level as u32 / EXP_LEVEL_DIVISOR;
        match kind {
            BattleKind::Wild => base,
            BattleKind::Trainer => (base as f32 * config.trainer_exp_multiplier) as u32,
        }
    }

    /// Calculate EV yield when this species faints
    /// Total EVs: 1 if BST < 300, 2 if 300 ≤ BST < 500, 3 if BST ≥ 500
    /// Distribution: EVs awarded in highest base stat(s)
    pub fn calculate_ev_yield(&self, species: &SpeciesData) -> EvYield {
        let bst = species.base_stats.total();

        let total_evs = match bst {
            0..BST_LOW_THRESHOLD => EV_YIELD_LOW,
            BST_LOW_THRESHOLD..BST_HIGH_THRESHOLD => EV_YIELD_MEDIUM,
            _ => EV_YIELD_HIGH,
        };

        let highest_stats = self.find_highest_base_stats(&species.base_stats);
        self.distribute_evs(total_evs, &highest_stats)
    }

    /// Indices of the base stats tied for highest value
    fn find_highest_base_stats(&self, base_stats: &BaseStats) -> Vec<usize> {
        let values = base_stats.as_array();
        let max_value = values.iter().max().copied().unwrap_or(0);

        values
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == max_value)
            .map(|(index, _)| index)
            .collect()
    }

    /// Distribute total EVs among the highest stats
    /// If tied stats, distribute evenly with remainder going to first stats
    fn distribute_evs(&self, total_evs: u8, highest_stats: &[usize]) -> EvYield {
        let mut ev_yield = EvYield::default();
        let num_highest = highest_stats.len();

        if num_highest == 0 {
            return ev_yield;
        }

        let evs_per_stat = total_evs as usize / num_highest;
        let remainder = total_evs as usize % num_highest;

        for (i, stat) in highest_stats.iter().enumerate() {
            let evs = evs_per_stat + if i < remainder { 1 } else { 0 };
            ev_yield.set(*stat, evs as u8);
        }

        ev_yield
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::tests::common::test_dex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ev_yield_distribution() {
        let calculator = RewardCalculator;

        // Single highest stat
        let base_stats = BaseStats {
            hp: 100,
            attack: 80,
            defense: 60,
            sp_attack: 40,
            sp_defense: 40,
            speed: 30,
        };
        let highest_stats = calculator.find_highest_base_stats(&base_stats);
        assert_eq!(highest_stats, vec![0]);

        let ev_yield = calculator.distribute_evs(3, &highest_stats);
        assert_eq!(ev_yield.hp, 3);
        assert_eq!(ev_yield.total(), 3);

        // Tied highest stats: remainder goes to the first
        let base_stats_tied = BaseStats {
            attack: 100,
            ..base_stats
        };
        let highest_stats_tied = calculator.find_highest_base_stats(&base_stats_tied);
        assert_eq!(highest_stats_tied, vec![0, 1]);

        let ev_yield_tied = calculator.distribute_evs(3, &highest_stats_tied);
        assert_eq!(ev_yield_tied.as_array(), [2, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_trainer_battles_pay_more() {
        let dex = test_dex();
        let config = BattleConfig::default();
        let calculator = RewardCalculator;
        let species = dex.species_by_name("Cindercub").unwrap();

        let wild = calculator.calculate_exp_yield(species, 10, BattleKind::Wild, &config);
        let trainer = calculator.calculate_exp_yield(species, 10, BattleKind::Trainer, &config);
        assert_eq!(wild, species.base_exp as u32 * 10 / 7);
        assert!(trainer > wild);
    }

    #[test]
    fn test_ev_yield_total_follows_bst_band() {
        let dex = test_dex();
        let calculator = RewardCalculator;
        for id in dex.species_ids() {
            let species = dex.species(id).unwrap();
            let expected = match species.base_stats.total() {
                0..300 => 1,
                300..500 => 2,
                _ => 3,
            };
            assert_eq!(calculator.calculate_ev_yield(species).total(), expected, "{}", species.name);
        }
    }
}
