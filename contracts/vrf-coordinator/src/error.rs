use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("unauthorized: {reason}")]
    Unauthorized { reason: String },

    #[error("nonexistent request {request_id}")]
    NonexistentRequest { request_id: u64 },

    #[error("num_words must be between 1 and {max}, got {got}")]
    InvalidNumWords { got: u32, max: u32 },

    #[error("beacon for round {round} already exists")]
    BeaconAlreadyExists { round: u64 },

    #[error("beacon not found for round {round}")]
    BeaconNotFound { round: u64 },

    #[error("beacon round {round} is too early for request {request_id} (min round {min_round})")]
    BeaconTooEarly {
        request_id: u64,
        round: u64,
        min_round: u64,
    },

    #[error("BLS verification failed: {reason}")]
    VerificationFailed { reason: String },

    #[error("invalid hex input: {field}")]
    InvalidHex { field: String },

    #[error("invalid pubkey length: expected 96 bytes, got {got}")]
    InvalidPubkeyLength { got: usize },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: String },
}
