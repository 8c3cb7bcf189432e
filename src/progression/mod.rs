pub mod evolution;
pub mod experience;
pub mod rewards;

pub use evolution::{evolution_ready, evolution_ready_with_item};
pub use experience::{award_experience, BlockedMove, ExperienceAward, LearnedMove};
pub use rewards::{EvYield, RewardCalculator};
