use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128, Uint256};
use raffle_common::types::RaffleState;

use crate::state::{PendingRequest, RaffleConfig, RoundResult};

#[cw_serde]
pub struct InstantiateMsg {
    pub vrf_coordinator: String,
    pub denom: String,
    pub entrance_fee: Uint128,
    pub interval_seconds: u64,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Buy one slot in the current round. Send at least the entrance fee.
    EnterRaffle {},
    /// Close the round and request randomness. Anyone can call; succeeds only
    /// when `CheckUpkeep` would return true.
    PerformUpkeep { perform_data: Binary },
    /// Randomness callback. Coordinator only.
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(RaffleConfig)]
    Config {},
    #[returns(CheckUpkeepResponse)]
    CheckUpkeep { check_data: Binary },
    #[returns(RaffleStateResponse)]
    RaffleState {},
    #[returns(Uint128)]
    EntranceFee {},
    #[returns(u64)]
    Interval {},
    #[returns(Addr)]
    Player { index: u32 },
    #[returns(u32)]
    NumberOfPlayers {},
    #[returns(Timestamp)]
    LatestTimestamp {},
    #[returns(Option<Addr>)]
    RecentWinner {},
    #[returns(u32)]
    NumWords {},
    #[returns(Option<PendingRequest>)]
    PendingRequest {},
    #[returns(Option<RoundResult>)]
    RoundResult { round: u64 },
    #[returns(RoundHistoryResponse)]
    RoundHistory {
        start_after: Option<u64>,
        limit: Option<u32>,
    },
}

#[cw_serde]
pub struct MigrateMsg {}

#[cw_serde]
pub struct CheckUpkeepResponse {
    pub upkeep_needed: bool,
    pub perform_data: Binary,
}

#[cw_serde]
pub struct RaffleStateResponse {
    pub state: RaffleState,
    /// 0 = open, 1 = calculating
    pub state_code: u8,
    pub round: u64,
    pub num_players: u32,
    pub pool_balance: Uint128,
    pub last_timestamp: Timestamp,
    pub pending_request: Option<PendingRequest>,
}

#[cw_serde]
pub struct RoundHistoryResponse {
    pub results: Vec<RoundResult>,
}
