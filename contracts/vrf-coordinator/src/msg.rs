use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::state::{CoordinatorConfig, RandomnessRequest, StoredBeacon};

#[cw_serde]
pub struct InstantiateMsg {
    pub operators: Vec<String>,
    /// Hex-encoded quicknet public key (96 bytes = 192 hex chars)
    pub quicknet_pubkey_hex: String,
    pub chain_hash: String,
    pub genesis_time: u64,
    pub period_seconds: u64,
    pub max_num_words: u32,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Request random words. The sender is called back on fulfillment.
    RequestRandomWords { num_words: u32 },
    /// Submit a drand beacon for verification and storage (operators only).
    SubmitBeacon {
        round: u64,
        /// Hex-encoded BLS signature (48 bytes = 96 hex chars)
        signature_hex: String,
    },
    /// Seed a pending request from a stored beacon and call its consumer
    /// (operators only).
    FulfillRandomWords { request_id: u64, round: u64 },
    /// Update operator list (admin only).
    UpdateOperators {
        add: Vec<String>,
        remove: Vec<String>,
    },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    #[returns(CoordinatorConfig)]
    Config {},

    #[returns(Option<StoredBeacon>)]
    Beacon { round: u64 },

    #[returns(u64)]
    LatestRound {},

    #[returns(Option<RandomnessRequest>)]
    Request { request_id: u64 },

    #[returns(u64)]
    NextRequestId {},
}

#[cw_serde]
pub struct MigrateMsg {}
