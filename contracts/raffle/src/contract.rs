use cosmwasm_std::{
    entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response, StdError, StdResult,
};
use cw2::{get_contract_version, set_contract_version};
use raffle_common::types::RaffleState;

use crate::error::ContractError;
use crate::execute::{self, PAYOUT_REPLY_ID};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query;
use crate::state::{EntryLedger, RaffleConfig, RaffleStatus, CONFIG, LEDGER, RAFFLE};

const CONTRACT_NAME: &str = "crates.io:keeper-raffle";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

const FIRST_ROUND: u64 = 1;

#[entry_point]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.entrance_fee.is_zero() {
        return Err(ContractError::InvalidConfig {
            reason: "entrance_fee must be positive".to_string(),
        });
    }
    if msg.interval_seconds == 0 {
        return Err(ContractError::InvalidConfig {
            reason: "interval_seconds must be positive".to_string(),
        });
    }
    if msg.denom.is_empty() {
        return Err(ContractError::InvalidConfig {
            reason: "denom must not be empty".to_string(),
        });
    }

    let config = RaffleConfig {
        admin: info.sender.clone(),
        vrf_coordinator: deps.api.addr_validate(&msg.vrf_coordinator)?,
        denom: msg.denom,
        entrance_fee: msg.entrance_fee,
        interval_seconds: msg.interval_seconds,
    };
    CONFIG.save(deps.storage, &config)?;

    let status = RaffleStatus {
        state: RaffleState::Open,
        last_timestamp: env.block.time,
        pending_request: None,
        recent_winner: None,
    };
    RAFFLE.save(deps.storage, &status)?;
    LEDGER.save(deps.storage, &EntryLedger::new(FIRST_ROUND))?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("contract", "keeper-raffle")
        .add_attribute("admin", info.sender.to_string())
        .add_attribute("entrance_fee", config.entrance_fee.to_string())
        .add_attribute("interval_seconds", config.interval_seconds.to_string()))
}

#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::EnterRaffle {} => execute::enter_raffle(deps, env, info),
        ExecuteMsg::PerformUpkeep { perform_data } => {
            execute::perform_upkeep(deps, env, info, perform_data)
        }
        ExecuteMsg::FulfillRandomWords {
            request_id,
            random_words,
        } => execute::fulfill_random_words(deps, env, info, request_id, random_words),
    }
}

#[entry_point]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => query::query_config(deps),
        QueryMsg::CheckUpkeep { check_data } => query::query_check_upkeep(deps, env, check_data),
        QueryMsg::RaffleState {} => query::query_raffle_state(deps),
        QueryMsg::EntranceFee {} => query::query_entrance_fee(deps),
        QueryMsg::Interval {} => query::query_interval(deps),
        QueryMsg::Player { index } => query::query_player(deps, index),
        QueryMsg::NumberOfPlayers {} => query::query_number_of_players(deps),
        QueryMsg::LatestTimestamp {} => query::query_latest_timestamp(deps),
        QueryMsg::RecentWinner {} => query::query_recent_winner(deps),
        QueryMsg::NumWords {} => query::query_num_words(),
        QueryMsg::PendingRequest {} => query::query_pending_request(deps),
        QueryMsg::RoundResult { round } => query::query_round_result(deps, round),
        QueryMsg::RoundHistory { start_after, limit } => {
            query::query_round_history(deps, start_after, limit)
        }
    }
}

#[entry_point]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        PAYOUT_REPLY_ID => execute::handle_payout_reply(deps, msg.result),
        id => Err(StdError::generic_err(format!("unknown reply id {}", id)).into()),
    }
}

#[entry_point]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let stored = get_contract_version(deps.storage)?;
    if stored.contract != CONTRACT_NAME {
        return Err(ContractError::Unauthorized {
            reason: "Cannot migrate from different contract type".to_string(),
        });
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("from_version", stored.version)
        .add_attribute("to_version", CONTRACT_VERSION))
}
