use cosmwasm_std::{Addr, Order, StdResult, Storage, Uint128, Uint256};

use crate::state::{EntryLedger, PLAYERS};

/// Upper bound on settled-round slots removed per settlement.
pub const PRUNE_LIMIT: usize = 50;

impl EntryLedger {
    pub fn new(round: u64) -> Self {
        EntryLedger {
            round,
            num_players: 0,
            pool_balance: Uint128::zero(),
        }
    }

    /// Append `player` as a new slot of the current round and add `fee` to
    /// the pool. Returns the slot index.
    pub fn append(
        &mut self,
        storage: &mut dyn Storage,
        player: &Addr,
        fee: Uint128,
    ) -> StdResult<u32> {
        let index = self.num_players;
        PLAYERS.save(storage, (self.round, index), player)?;
        self.num_players += 1;
        self.pool_balance = self.pool_balance.checked_add(fee)?;
        Ok(index)
    }

    pub fn player_at(&self, storage: &dyn Storage, index: u32) -> StdResult<Option<Addr>> {
        if index >= self.num_players {
            return Ok(None);
        }
        PLAYERS.may_load(storage, (self.round, index))
    }

    pub fn has_players(&self) -> bool {
        self.num_players > 0
    }

    pub fn has_balance(&self) -> bool {
        !self.pool_balance.is_zero()
    }

    /// Empty the ledger by moving on to the next round. Constant cost: the
    /// old round's slots stay in storage until `prune_round` removes them.
    pub fn reset(&mut self) {
        *self = EntryLedger::new(self.round + 1);
    }
}

/// Delete up to `limit` slots of a settled `round`. Returns how many were
/// removed.
pub fn prune_round(storage: &mut dyn Storage, round: u64, limit: usize) -> StdResult<usize> {
    let indexes = PLAYERS
        .prefix(round)
        .keys(storage, None, None, Order::Ascending)
        .take(limit)
        .collect::<StdResult<Vec<u32>>>()?;
    for index in &indexes {
        PLAYERS.remove(storage, (round, *index));
    }
    Ok(indexes.len())
}

/// Map a random word onto a slot index: `random_word mod num_players`.
pub fn winner_index(random_word: Uint256, num_players: u32) -> Option<u32> {
    if num_players == 0 {
        return None;
    }
    let index = random_word % Uint256::from(num_players as u128);
    // index < num_players, so it always fits
    Uint128::try_from(index).ok().map(|i| i.u128() as u32)
}
