use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Timestamp, Uint128, Uint256};
use cw_storage_plus::{Item, Map};
use raffle_common::types::RaffleState;

pub const CONFIG: Item<RaffleConfig> = Item::new("config");
pub const RAFFLE: Item<RaffleStatus> = Item::new("raffle");
pub const LEDGER: Item<EntryLedger> = Item::new("ledger");
/// Participant slots keyed by (round, index). Settlement prunes at most
/// `PRUNE_LIMIT` slots of the settled round; any remainder is never read again.
pub const PLAYERS: Map<(u64, u32), Addr> = Map::new("players");
pub const ROUND_RESULTS: Map<u64, RoundResult> = Map::new("round_results");

/// Fixed at instantiation; there is no message that updates it.
#[cw_serde]
pub struct RaffleConfig {
    pub admin: Addr,
    pub vrf_coordinator: Addr,
    pub denom: String,
    pub entrance_fee: Uint128,
    /// Minimum seconds between settlements
    pub interval_seconds: u64,
}

#[cw_serde]
pub struct RaffleStatus {
    pub state: RaffleState,
    /// Time of the last settlement, or instantiation time before the first one
    pub last_timestamp: Timestamp,
    pub pending_request: Option<PendingRequest>,
    pub recent_winner: Option<Addr>,
}

#[cw_serde]
pub struct PendingRequest {
    pub request_id: u64,
    pub issued_at: Timestamp,
}

#[cw_serde]
pub struct EntryLedger {
    pub round: u64,
    pub num_players: u32,
    pub pool_balance: Uint128,
}

#[cw_serde]
pub struct RoundResult {
    pub round: u64,
    pub winner: Addr,
    pub prize: Uint128,
    pub request_id: u64,
    pub random_word: Uint256,
    pub winner_index: u32,
    pub num_players: u32,
    pub settled_at: Timestamp,
}
