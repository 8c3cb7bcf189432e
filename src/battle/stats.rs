use crate::battle::combatant::CombatantState;
use crate::creature::StatusCondition;
use schema::{MoveCategory, StatType};

/// Calculate the effective offensive stat for a move category including stat stages.
/// Status moves don't use attack stats.
pub fn effective_attack(combatant: &CombatantState, category: MoveCategory) -> u16 {
    match category {
        MoveCategory::Physical => staged_stat(combatant, StatType::Attack),
        MoveCategory::Special => staged_stat(combatant, StatType::SpecialAttack),
        MoveCategory::Status => 0,
    }
}

/// Calculate the effective defensive stat for a move category including stat stages.
pub fn effective_defense(combatant: &CombatantState, category: MoveCategory) -> u16 {
    match category {
        MoveCategory::Physical => staged_stat(combatant, StatType::Defense),
        MoveCategory::Special => staged_stat(combatant, StatType::SpecialDefense),
        MoveCategory::Status => 0,
    }
}

/// Calculate effective speed including stat stages and paralysis
pub fn effective_speed(combatant: &CombatantState) -> u16 {
    let mut speed = staged_stat(combatant, StatType::Speed);

    // Apply paralysis (quarter speed)
    if matches!(combatant.status, Some(StatusCondition::Paralysis)) {
        speed /= 4;
    }

    speed
}

fn staged_stat(combatant: &CombatantState, stat: StatType) -> u16 {
    let base = match stat {
        StatType::Attack => combatant.stats.attack,
        StatType::Defense => combatant.stats.defense,
        StatType::SpecialAttack => combatant.stats.sp_attack,
        StatType::SpecialDefense => combatant.stats.sp_defense,
        StatType::Speed => combatant.stats.speed,
    };
    apply_stat_stage_multiplier(base, combatant.stat_stages.get(stat))
}

/// Apply stat stage multipliers
/// Stages range from -6 to +6
/// Negative stages: (2 / (2 + |stage|))
/// Positive stages: ((2 + stage) / 2)
pub fn apply_stat_stage_multiplier(base_stat: u16, stage: i8) -> u16 {
    let clamped_stage = stage.clamp(-6, 6);

    if clamped_stage == 0 {
        return base_stat;
    }

    let multiplier = if clamped_stage < 0 {
        2.0 / (2.0 + (-clamped_stage) as f64)
    } else {
        (2.0 + clamped_stage as f64) / 2.0
    };

    ((base_stat as f64) * multiplier).round() as u16
}
