use cosmwasm_std::{
    coins, to_json_binary, BankMsg, Binary, DepsMut, Env, Event, MessageInfo, Response, SubMsg,
    SubMsgResult, Uint128, Uint256, WasmMsg,
};
use raffle_common::types::RaffleState;
use raffle_common::vrf::{CoordinatorExecuteMsg, CoordinatorQueryMsg};

use crate::error::ContractError;
use crate::ledger::{prune_round, winner_index, PRUNE_LIMIT};
use crate::state::{PendingRequest, RoundResult, CONFIG, LEDGER, RAFFLE, ROUND_RESULTS};
use crate::upkeep::evaluate_upkeep;

/// One winner per round, so one random word per request.
pub const NUM_WORDS: u32 = 1;

pub const PAYOUT_REPLY_ID: u64 = 1;

/// Amount of `denom` attached to the call. No funds counts as zero.
fn paid_amount(info: &MessageInfo, denom: &str) -> Result<Uint128, ContractError> {
    match info.funds.as_slice() {
        [] => Ok(Uint128::zero()),
        [coin] if coin.denom == denom => Ok(coin.amount),
        [coin] => Err(ContractError::WrongDenom {
            expected: denom.to_string(),
            denom: coin.denom.clone(),
        }),
        _ => Err(ContractError::InvalidFunds),
    }
}

/// Buy one slot in the current round.
///
/// Exactly `entrance_fee` joins the pool; any excess is refunded in the same
/// response so the pool always equals `entrance_fee * num_players`.
pub fn enter_raffle(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let paid = paid_amount(&info, &config.denom)?;
    if paid < config.entrance_fee {
        return Err(ContractError::InsufficientFee {
            required: config.entrance_fee,
            paid,
        });
    }

    let status = RAFFLE.load(deps.storage)?;
    if status.state != RaffleState::Open {
        return Err(ContractError::NotOpen {
            state: status.state.as_str().to_string(),
        });
    }

    let mut ledger = LEDGER.load(deps.storage)?;
    let index = ledger.append(deps.storage, &info.sender, config.entrance_fee)?;
    LEDGER.save(deps.storage, &ledger)?;

    let excess = paid - config.entrance_fee;

    let mut response = Response::new()
        .add_attribute("action", "enter_raffle")
        .add_attribute("player", info.sender.to_string())
        .add_attribute("round", ledger.round.to_string())
        .add_attribute("index", index.to_string())
        .add_event(
            Event::new("raffle_enter")
                .add_attribute("player", info.sender.to_string())
                .add_attribute("round", ledger.round.to_string())
                .add_attribute("index", index.to_string())
                .add_attribute("pool_balance", ledger.pool_balance.to_string()),
        );

    if !excess.is_zero() {
        response = response
            .add_message(BankMsg::Send {
                to_address: info.sender.to_string(),
                amount: coins(excess.u128(), &config.denom),
            })
            .add_attribute("refund", excess.to_string());
    }

    Ok(response)
}

/// Close the current round and request randomness. Anyone can call.
///
/// Eligibility is re-evaluated here rather than trusted from the caller's
/// earlier `CheckUpkeep`.
pub fn perform_upkeep(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    _perform_data: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let mut status = RAFFLE.load(deps.storage)?;
    let ledger = LEDGER.load(deps.storage)?;

    let check = evaluate_upkeep(&config, &status, &ledger, env.block.time);
    if !check.upkeep_needed() {
        return Err(ContractError::UpkeepNotNeeded {
            pool_balance: ledger.pool_balance,
            num_players: ledger.num_players,
            raffle_state: status.state.as_str().to_string(),
        });
    }
    if let Some(pending) = &status.pending_request {
        return Err(ContractError::RequestAlreadyPending {
            request_id: pending.request_id,
        });
    }

    // The request message below runs right after this call returns, so the
    // coordinator assigns exactly this id.
    let request_id: u64 = deps
        .querier
        .query_wasm_smart(&config.vrf_coordinator, &CoordinatorQueryMsg::NextRequestId {})?;

    status.state = RaffleState::Calculating;
    status.pending_request = Some(PendingRequest {
        request_id,
        issued_at: env.block.time,
    });
    RAFFLE.save(deps.storage, &status)?;

    let request_msg = WasmMsg::Execute {
        contract_addr: config.vrf_coordinator.to_string(),
        msg: to_json_binary(&CoordinatorExecuteMsg::RequestRandomWords {
            num_words: NUM_WORDS,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(request_msg)
        .add_attribute("action", "perform_upkeep")
        .add_attribute("request_id", request_id.to_string())
        .add_event(
            Event::new("raffle_requested_winner")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round", ledger.round.to_string())
                .add_attribute("num_players", ledger.num_players.to_string())
                .add_attribute("pool_balance", ledger.pool_balance.to_string()),
        ))
}

/// Randomness callback from the coordinator.
///
/// 1. Match `request_id` against the pending request (consumed exactly once)
/// 2. winner_index = random_words[0] % num_players
/// 3. Send the whole pool to the winner (reply on error → PayoutFailed)
/// 4. Record the result, reset the ledger, reopen and stamp last_timestamp
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    random_words: Vec<Uint256>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.vrf_coordinator {
        return Err(ContractError::Unauthorized {
            reason: "only the vrf coordinator can fulfill".to_string(),
        });
    }

    let mut status = RAFFLE.load(deps.storage)?;
    match &status.pending_request {
        Some(pending) if pending.request_id == request_id => {}
        _ => return Err(ContractError::UnknownRequest { request_id }),
    }

    let random_word = *random_words.first().ok_or(ContractError::NoRandomWords)?;

    let mut ledger = LEDGER.load(deps.storage)?;
    let index = winner_index(random_word, ledger.num_players)
        .ok_or(ContractError::NoPlayers { round: ledger.round })?;
    let winner = ledger
        .player_at(deps.storage, index)?
        .ok_or(ContractError::PlayerNotFound {
            round: ledger.round,
            index,
        })?;

    let prize = ledger.pool_balance;
    let balance = deps
        .querier
        .query_balance(&env.contract.address, &config.denom)?;
    if balance.amount < prize {
        return Err(ContractError::PayoutFailed {
            reason: format!(
                "contract holds {}{}, pool is {}{}",
                balance.amount, config.denom, prize, config.denom
            ),
        });
    }

    let result = RoundResult {
        round: ledger.round,
        winner: winner.clone(),
        prize,
        request_id,
        random_word,
        winner_index: index,
        num_players: ledger.num_players,
        settled_at: env.block.time,
    };
    ROUND_RESULTS.save(deps.storage, result.round, &result)?;

    ledger.reset();
    LEDGER.save(deps.storage, &ledger)?;
    let pruned = prune_round(deps.storage, result.round, PRUNE_LIMIT)?;

    status.state = RaffleState::Open;
    status.pending_request = None;
    status.recent_winner = Some(winner.clone());
    status.last_timestamp = env.block.time;
    RAFFLE.save(deps.storage, &status)?;

    let payout = SubMsg::reply_on_error(
        BankMsg::Send {
            to_address: winner.to_string(),
            amount: coins(prize.u128(), &config.denom),
        },
        PAYOUT_REPLY_ID,
    );

    Ok(Response::new()
        .add_submessage(payout)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("winner", winner.to_string())
        .add_attribute("prize", prize.to_string())
        .add_attribute("pruned_slots", pruned.to_string())
        .add_event(
            Event::new("raffle_winner_picked")
                .add_attribute("winner", winner.to_string())
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("round", result.round.to_string())
                .add_attribute("prize", prize.to_string())
                .add_attribute("winner_index", index.to_string())
                .add_attribute("num_players", result.num_players.to_string())
                .add_attribute("random_word", random_word.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// A rejected payout aborts the whole fulfillment: returning an error here
/// reverts the ledger reset and the state change made above.
pub fn handle_payout_reply(
    deps: DepsMut,
    result: SubMsgResult,
) -> Result<Response, ContractError> {
    match result {
        SubMsgResult::Ok(_) => Ok(Response::new()),
        SubMsgResult::Err(err) => {
            let winner = RAFFLE
                .load(deps.storage)?
                .recent_winner
                .map(|w| w.to_string())
                .unwrap_or_default();
            Err(ContractError::PayoutFailed {
                reason: format!("transfer to {} rejected: {}", winner, err),
            })
        }
    }
}
