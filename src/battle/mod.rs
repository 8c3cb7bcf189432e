pub mod action_stack;
pub mod ai;
pub mod catch;
pub mod combatant;
pub mod commands;
pub mod damage;
pub mod effectiveness;
pub mod engine;
pub mod items;
pub mod state;
pub mod stats;

#[cfg(test)]
pub(crate) mod tests;
