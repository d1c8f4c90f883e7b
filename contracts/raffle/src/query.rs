use cosmwasm_std::{to_json_binary, Binary, Deps, Env, Order, StdResult};
use cw_storage_plus::Bound;

use crate::execute::NUM_WORDS;
use crate::msg::{CheckUpkeepResponse, RaffleStateResponse, RoundHistoryResponse};
use crate::state::{CONFIG, LEDGER, PLAYERS, RAFFLE, ROUND_RESULTS};
use crate::upkeep::evaluate_upkeep;

pub fn query_config(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config)
}

/// Read-only upkeep evaluation for keepers. `check_data` is not used.
pub fn query_check_upkeep(deps: Deps, env: Env, _check_data: Binary) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    let status = RAFFLE.load(deps.storage)?;
    let ledger = LEDGER.load(deps.storage)?;

    let check = evaluate_upkeep(&config, &status, &ledger, env.block.time);
    to_json_binary(&CheckUpkeepResponse {
        upkeep_needed: check.upkeep_needed(),
        perform_data: Binary::default(),
    })
}

pub fn query_raffle_state(deps: Deps) -> StdResult<Binary> {
    let status = RAFFLE.load(deps.storage)?;
    let ledger = LEDGER.load(deps.storage)?;
    to_json_binary(&RaffleStateResponse {
        state_code: status.state.code(),
        state: status.state,
        round: ledger.round,
        num_players: ledger.num_players,
        pool_balance: ledger.pool_balance,
        last_timestamp: status.last_timestamp,
        pending_request: status.pending_request,
    })
}

pub fn query_entrance_fee(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.entrance_fee)
}

pub fn query_interval(deps: Deps) -> StdResult<Binary> {
    let config = CONFIG.load(deps.storage)?;
    to_json_binary(&config.interval_seconds)
}

/// Player at `index` in the current round; errors when the slot is empty.
pub fn query_player(deps: Deps, index: u32) -> StdResult<Binary> {
    let ledger = LEDGER.load(deps.storage)?;
    let player = PLAYERS.load(deps.storage, (ledger.round, index))?;
    to_json_binary(&player)
}

pub fn query_number_of_players(deps: Deps) -> StdResult<Binary> {
    let ledger = LEDGER.load(deps.storage)?;
    to_json_binary(&ledger.num_players)
}

pub fn query_latest_timestamp(deps: Deps) -> StdResult<Binary> {
    let status = RAFFLE.load(deps.storage)?;
    to_json_binary(&status.last_timestamp)
}

pub fn query_recent_winner(deps: Deps) -> StdResult<Binary> {
    let status = RAFFLE.load(deps.storage)?;
    to_json_binary(&status.recent_winner)
}

pub fn query_num_words() -> StdResult<Binary> {
    to_json_binary(&NUM_WORDS)
}

pub fn query_pending_request(deps: Deps) -> StdResult<Binary> {
    let status = RAFFLE.load(deps.storage)?;
    to_json_binary(&status.pending_request)
}

pub fn query_round_result(deps: Deps, round: u64) -> StdResult<Binary> {
    let result = ROUND_RESULTS.may_load(deps.storage, round)?;
    to_json_binary(&result)
}

pub fn query_round_history(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<Binary> {
    let limit = limit.unwrap_or(20).min(100) as usize;
    let start = start_after.map(Bound::exclusive);

    let results: Vec<_> = ROUND_RESULTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .filter_map(|r| r.ok())
        .map(|(_, result)| result)
        .collect();

    to_json_binary(&RoundHistoryResponse { results })
}
