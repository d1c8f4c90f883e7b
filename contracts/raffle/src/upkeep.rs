use cosmwasm_std::Timestamp;
use raffle_common::types::RaffleState;

use crate::state::{EntryLedger, RaffleConfig, RaffleStatus};

/// The four conditions that must all hold before a round may be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpkeepCheck {
    pub is_open: bool,
    pub time_passed: bool,
    pub has_balance: bool,
    pub has_players: bool,
}

impl UpkeepCheck {
    pub fn upkeep_needed(&self) -> bool {
        self.is_open && self.time_passed && self.has_balance && self.has_players
    }
}

/// Evaluate upkeep eligibility at `now`. Pure: reads its inputs only.
pub fn evaluate_upkeep(
    config: &RaffleConfig,
    status: &RaffleStatus,
    ledger: &EntryLedger,
    now: Timestamp,
) -> UpkeepCheck {
    let elapsed = now.seconds().saturating_sub(status.last_timestamp.seconds());
    UpkeepCheck {
        is_open: status.state == RaffleState::Open,
        time_passed: elapsed >= config.interval_seconds,
        has_balance: ledger.has_balance(),
        has_players: ledger.has_players(),
    }
}
