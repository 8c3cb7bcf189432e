//! Tunable battle constants.

use crate::errors::{ConfigResult, ConfigurationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    // --- Damage ---
    pub stab_multiplier: f32,
    pub critical_multiplier: f32,
    /// Percent chance of a critical hit on a damaging move.
    pub crit_chance: u8,
    pub damage_roll_min: u8,
    pub damage_roll_max: u8,
    pub fallback_power: u8,
    pub fallback_recoil_percent: u8,

    // --- Status ---
    pub paralysis_full_chance: u8,
    pub confusion_self_hit_chance: u8,
    pub confusion_self_hit_power: u8,
    pub freeze_thaw_chance: u8,
    pub poison_divisor: u16,
    pub burn_divisor: u16,
    pub sleep_turns_min: u8,
    pub sleep_turns_max: u8,
    pub confusion_turns_min: u8,
    pub confusion_turns_max: u8,

    // --- Capture ---
    pub catch_value_min: f32,
    pub catch_value_max: f32,

    // --- Progression ---
    pub trainer_exp_multiplier: f32,
    pub max_level: u8,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            stab_multiplier: 1.5,
            critical_multiplier: 2.0,
            crit_chance: 6,
            damage_roll_min: 85,
            damage_roll_max: 100,
            fallback_power: 50,
            fallback_recoil_percent: 25,
            paralysis_full_chance: 25,
            confusion_self_hit_chance: 33,
            confusion_self_hit_power: 40,
            freeze_thaw_chance: 20,
            poison_divisor: 8,
            burn_divisor: 16,
            sleep_turns_min: 1,
            sleep_turns_max: 3,
            confusion_turns_min: 2,
            confusion_turns_max: 5,
            catch_value_min: 1.0,
            catch_value_max: 255.0,
            trainer_exp_multiplier: 1.5,
            max_level: 100,
        }
    }
}

impl BattleConfig {
    /// Parse a config from RON text. Missing fields take their defaults.
    pub fn from_ron_str(source: &str) -> ConfigResult<Self> {
        let config: BattleConfig =
            ron::from_str(source).map_err(|err| ConfigurationError::Parse {
                source_name: "battle config".to_string(),
                message: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|err| ConfigurationError::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        })?;
        Self::from_ron_str(&source)
    }

    /// Reject values that would make the formulas meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |msg: &str| Err(ConfigurationError::Invalid(msg.to_string()));

        if self.damage_roll_min > self.damage_roll_max || self.damage_roll_max > 100 {
            return invalid("damage roll range must satisfy min <= max <= 100");
        }
        if self.damage_roll_min == 0 {
            return invalid("damage_roll_min must be positive");
        }
        if self.catch_value_min <= 0.0 || self.catch_value_min > self.catch_value_max {
            return invalid("catch value bounds must satisfy 0 < min <= max");
        }
        if self.catch_value_max > 255.0 {
            return invalid("catch_value_max cannot exceed 255");
        }
        if self.poison_divisor == 0 || self.burn_divisor == 0 {
            return invalid("status damage divisors must be non-zero");
        }
        if self.sleep_turns_min == 0 || self.sleep_turns_min > self.sleep_turns_max {
            return invalid("sleep turn range must satisfy 0 < min <= max");
        }
        if self.confusion_turns_min == 0 || self.confusion_turns_min > self.confusion_turns_max {
            return invalid("confusion turn range must satisfy 0 < min <= max");
        }
        let chances = [
            ("crit_chance", self.crit_chance),
            ("paralysis_full_chance", self.paralysis_full_chance),
            ("confusion_self_hit_chance", self.confusion_self_hit_chance),
            ("freeze_thaw_chance", self.freeze_thaw_chance),
            ("fallback_recoil_percent", self.fallback_recoil_percent),
        ];
        if let Some((name, _)) = chances.iter().find(|(_, value)| *value > 100) {
            return Err(ConfigurationError::Invalid(format!(
                "{} is a percentage and cannot exceed 100",
                name
            )));
        }
        if self.max_level == 0 || self.max_level > 100 {
            return invalid("max_level must be within 1..=100");
        }
        if self.stab_multiplier < 1.0 || self.critical_multiplier < 1.0 {
            return invalid("stab and critical multipliers must be at least 1.0");
        }
        if self.trainer_exp_multiplier < 0.0 {
            return invalid("trainer_exp_multiplier cannot be negative");
        }
        Ok(())
    }
}
