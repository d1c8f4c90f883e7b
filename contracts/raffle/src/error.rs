use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("insufficient fee: entrance fee is {required}, got {paid}")]
    InsufficientFee { required: Uint128, paid: Uint128 },

    #[error("raffle is not open (state: {state})")]
    NotOpen { state: String },

    #[error("upkeep not needed (balance: {pool_balance}, players: {num_players}, state: {raffle_state})")]
    UpkeepNotNeeded {
        pool_balance: Uint128,
        num_players: u32,
        raffle_state: String,
    },

    #[error("randomness request {request_id} is already pending")]
    RequestAlreadyPending { request_id: u64 },

    #[error("unknown randomness request {request_id}")]
    UnknownRequest { request_id: u64 },

    #[error("fulfillment carried no random words")]
    NoRandomWords,

    #[error("round {round} has no players")]
    NoPlayers { round: u64 },

    #[error("no player at index {index} in round {round}")]
    PlayerNotFound { round: u64, index: u32 },

    #[error("payout failed: {reason}")]
    PayoutFailed { reason: String },

    #[error("must send {expected}, got {denom}")]
    WrongDenom { expected: String, denom: String },

    #[error("must send exactly one coin")]
    InvalidFunds,

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}
