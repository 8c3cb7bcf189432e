use crate::battle::combatant::CombatantState;
use crate::errors::{BattleResult, InvalidActionError};
use schema::ItemId;
use serde::{Deserialize, Serialize};

pub const POTION: ItemId = ItemId(10);
pub const SUPER_POTION: ItemId = ItemId(11);
pub const FULL_HEAL: ItemId = ItemId(12);
pub const ETHER: ItemId = ItemId(13);

/// What an item does to its user once the handler accepts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemEffect {
    Heal(u16),
    CureStatus,
    RestorePp { slot: usize, amount: u8 },
    NoEffect,
}

/// Inventory seam. The engine never owns an inventory; it asks this.
pub trait ItemHandler {
    fn use_item(&self, item: ItemId, user: &CombatantState) -> BattleResult<ItemEffect>;

    /// Items the player may currently submit.
    fn available_items(&self) -> Vec<ItemId> {
        Vec::new()
    }
}

/// Rejects every item.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoItems;

impl ItemHandler for NoItems {
    fn use_item(&self, item: ItemId, _user: &CombatantState) -> BattleResult<ItemEffect> {
        Err(InvalidActionError::ItemRejected(format!("no items are carried ({})", item)).into())
    }
}

/// A bag with unlimited basic medicine.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicItems;

impl BasicItems {
    const ETHER_AMOUNT: u8 = 10;
}

impl ItemHandler for BasicItems {
    fn use_item(&self, item: ItemId, user: &CombatantState) -> BattleResult<ItemEffect> {
        let effect = match item {
            POTION | SUPER_POTION => {
                if user.current_hp == user.max_hp() {
                    ItemEffect::NoEffect
                } else if item == POTION {
                    ItemEffect::Heal(20)
                } else {
                    ItemEffect::Heal(50)
                }
            }
            FULL_HEAL => match user.status {
                Some(_) => ItemEffect::CureStatus,
                None => ItemEffect::NoEffect,
            },
            ETHER => {
                // Lowest-PP known slot; earliest slot wins ties
                let lowest = user
                    .moves
                    .iter()
                    .enumerate()
                    .filter_map(|(index, slot)| slot.map(|slot| (index, slot.pp)))
                    .min_by_key(|(_, pp)| *pp);
                match lowest {
                    Some((slot, _)) => ItemEffect::RestorePp {
                        slot,
                        amount: Self::ETHER_AMOUNT,
                    },
                    None => ItemEffect::NoEffect,
                }
            }
            other => {
                return Err(
                    InvalidActionError::ItemRejected(format!("unknown item {}", other)).into(),
                )
            }
        };
        Ok(effect)
    }

    fn available_items(&self) -> Vec<ItemId> {
        vec![POTION, SUPER_POTION, FULL_HEAL, ETHER]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::state::Side;
    use crate::battle::tests::common::TestCreatureBuilder;
    use crate::creature::StatusCondition;
    use crate::errors::BattleEngineError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_no_items_rejects_everything() {
        let user = TestCreatureBuilder::new("Voltmouse", 10).build_combatant(Side::Player);
        assert!(matches!(
            NoItems.use_item(POTION, &user),
            Err(BattleEngineError::InvalidAction(InvalidActionError::ItemRejected(_)))
        ));
        assert!(NoItems.available_items().is_empty());
    }

    #[test]
    fn test_potion_does_nothing_at_full_health() {
        let mut user = TestCreatureBuilder::new("Voltmouse", 10).build_combatant(Side::Player);
        assert_eq!(BasicItems.use_item(POTION, &user), Ok(ItemEffect::NoEffect));
        user.current_hp -= 5;
        assert_eq!(BasicItems.use_item(POTION, &user), Ok(ItemEffect::Heal(20)));
        assert_eq!(BasicItems.use_item(SUPER_POTION, &user), Ok(ItemEffect::Heal(50)));
    }

    #[test]
    fn test_full_heal_needs_a_status() {
        let mut user = TestCreatureBuilder::new("Voltmouse", 10).build_combatant(Side::Player);
        assert_eq!(BasicItems.use_item(FULL_HEAL, &user), Ok(ItemEffect::NoEffect));
        user.status = Some(StatusCondition::Burn);
        assert_eq!(BasicItems.use_item(FULL_HEAL, &user), Ok(ItemEffect::CureStatus));
    }

    #[test]
    fn test_ether_targets_lowest_pp_slot() {
        let mut user = TestCreatureBuilder::new("Voltmouse", 10).build_combatant(Side::Player);
        if let Some(slot) = user.moves[1].as_mut() {
            slot.pp = 0;
        }
        assert_eq!(
            BasicItems.use_item(ETHER, &user),
            Ok(ItemEffect::RestorePp { slot: 1, amount: 10 })
        );
    }

    #[test]
    fn test_unknown_item_is_rejected() {
        let user = TestCreatureBuilder::new("Voltmouse", 10).build_combatant(Side::Player);
        assert!(BasicItems.use_item(ItemId(999), &user).is_err());
    }
}
