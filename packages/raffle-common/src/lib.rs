pub mod types;
pub mod vrf;

pub use types::RaffleState;
pub use vrf::{derive_random_words, ConsumerExecuteMsg, CoordinatorExecuteMsg, CoordinatorQueryMsg};
