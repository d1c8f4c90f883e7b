use cosmwasm_schema::cw_serde;

/// Lifecycle phase of a raffle instance.
///
/// `Open` accepts entries. `Calculating` is entered when upkeep closes the
/// round and lasts until the randomness callback pays the winner.
#[cw_serde]
pub enum RaffleState {
    Open,
    Calculating,
}

impl RaffleState {
    /// Numeric form of the phase (`0` = open, `1` = calculating).
    pub fn code(&self) -> u8 {
        match self {
            RaffleState::Open => 0,
            RaffleState::Calculating => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RaffleState::Open => "open",
            RaffleState::Calculating => "calculating",
        }
    }
}
