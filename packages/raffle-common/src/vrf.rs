use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint256;
use sha2::{Digest, Sha256};

/// Subset of the coordinator's execute interface used by consumer contracts.
#[cw_serde]
pub enum CoordinatorExecuteMsg {
    /// Ask for `num_words` random words. The coordinator calls back the
    /// sender with `ConsumerExecuteMsg::FulfillRandomWords`.
    RequestRandomWords { num_words: u32 },
}

/// Subset of the coordinator's query interface used by consumer contracts.
#[cw_serde]
pub enum CoordinatorQueryMsg {
    /// Id the coordinator will assign to the next request (`u64`).
    NextRequestId {},
}

/// Callback every randomness consumer must accept.
#[cw_serde]
pub enum ConsumerExecuteMsg {
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<Uint256>,
    },
}

/// Expand a 32-byte beacon randomness into `num_words` words bound to a request.
///
/// `word_i = uint256_be( sha256( randomness || request_id_u64_be || i_u32_be ) )`
///
/// Mixing in the request id keeps two requests fulfilled from the same beacon
/// from receiving identical words.
pub fn derive_random_words(randomness: &[u8], request_id: u64, num_words: u32) -> Vec<Uint256> {
    (0..num_words)
        .map(|i| {
            let mut hasher = Sha256::new();
            hasher.update(randomness);
            hasher.update(request_id.to_be_bytes());
            hasher.update(i.to_be_bytes());
            let digest: [u8; 32] = hasher.finalize().into();
            Uint256::from_be_bytes(digest)
        })
        .collect()
}
