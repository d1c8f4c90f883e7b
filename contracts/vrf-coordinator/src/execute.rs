use cosmwasm_std::{to_json_binary, DepsMut, Env, Event, MessageInfo, Response, WasmMsg};
use raffle_common::vrf::{derive_random_words, ConsumerExecuteMsg};

use crate::error::ContractError;
use crate::state::{
    CoordinatorConfig, RandomnessRequest, StoredBeacon, BEACONS, CONFIG, LATEST_ROUND,
    NEXT_REQUEST_ID, REQUESTS,
};
use crate::verify::{published_round_at, verify_beacon};

fn ensure_operator(
    config: &CoordinatorConfig,
    info: &MessageInfo,
    action: &str,
) -> Result<(), ContractError> {
    if !config.operators.contains(&info.sender) {
        return Err(ContractError::Unauthorized {
            reason: format!("only operators can {}", action),
        });
    }
    Ok(())
}

/// Register a randomness request for the sender. Anyone can call; the sender
/// becomes the consumer that receives the callback.
pub fn request_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    num_words: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if num_words == 0 || num_words > config.max_num_words {
        return Err(ContractError::InvalidNumWords {
            got: num_words,
            max: config.max_num_words,
        });
    }

    let request_id = NEXT_REQUEST_ID.load(deps.storage)?;
    NEXT_REQUEST_ID.save(deps.storage, &(request_id + 1))?;

    // The seeding beacon must not exist yet when the request is recorded.
    let min_round = published_round_at(
        config.genesis_time,
        config.period_seconds,
        env.block.time.seconds(),
    ) + 1;

    let request = RandomnessRequest {
        id: request_id,
        consumer: info.sender.clone(),
        num_words,
        min_round,
        requested_at: env.block.time,
    };
    REQUESTS.save(deps.storage, request_id, &request)?;

    Ok(Response::new()
        .set_data(to_json_binary(&request_id)?)
        .add_attribute("action", "request_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("consumer", info.sender.to_string())
        .add_event(
            Event::new("vrf_random_words_requested")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("consumer", info.sender.to_string())
                .add_attribute("num_words", num_words.to_string())
                .add_attribute("min_round", min_round.to_string()),
        ))
}

/// Submit a drand beacon. Only operators can call this.
pub fn submit_beacon(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    round: u64,
    signature_hex: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info, "submit beacons")?;

    if BEACONS.has(deps.storage, round) {
        return Err(ContractError::BeaconAlreadyExists { round });
    }

    let signature = hex::decode(&signature_hex).map_err(|_| ContractError::InvalidHex {
        field: "signature_hex".to_string(),
    })?;

    let randomness = verify_beacon(&config.quicknet_pubkey, round, &signature).map_err(|e| {
        ContractError::VerificationFailed {
            reason: e.to_string(),
        }
    })?;

    let beacon = StoredBeacon {
        round,
        randomness: randomness.to_vec(),
        signature,
        submitted_at: env.block.time,
        submitted_by: info.sender.clone(),
    };
    BEACONS.save(deps.storage, round, &beacon)?;

    let current_latest = LATEST_ROUND.may_load(deps.storage)?.unwrap_or(0);
    if round > current_latest {
        LATEST_ROUND.save(deps.storage, &round)?;
    }

    Ok(Response::new()
        .add_attribute("action", "submit_beacon")
        .add_attribute("round", round.to_string())
        .add_attribute("submitted_by", info.sender.to_string())
        .add_event(
            Event::new("vrf_beacon_submitted")
                .add_attribute("round", round.to_string())
                .add_attribute("randomness", hex::encode(randomness))
                .add_attribute("submitted_by", info.sender.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Fulfill a pending request from a stored beacon. Operators only.
///
/// The request is deleted before the consumer callback is dispatched, so a
/// request id can be fulfilled at most once. If the callback fails the whole
/// transaction reverts and the request stays pending.
pub fn fulfill_random_words(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: u64,
    round: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    ensure_operator(&config, &info, "fulfill requests")?;

    let request = REQUESTS
        .may_load(deps.storage, request_id)?
        .ok_or(ContractError::NonexistentRequest { request_id })?;

    let beacon = BEACONS
        .may_load(deps.storage, round)?
        .ok_or(ContractError::BeaconNotFound { round })?;

    if round < request.min_round {
        return Err(ContractError::BeaconTooEarly {
            request_id,
            round,
            min_round: request.min_round,
        });
    }

    let random_words = derive_random_words(&beacon.randomness, request_id, request.num_words);
    REQUESTS.remove(deps.storage, request_id);

    let callback = WasmMsg::Execute {
        contract_addr: request.consumer.to_string(),
        msg: to_json_binary(&ConsumerExecuteMsg::FulfillRandomWords {
            request_id,
            random_words,
        })?,
        funds: vec![],
    };

    Ok(Response::new()
        .add_message(callback)
        .add_attribute("action", "fulfill_random_words")
        .add_attribute("request_id", request_id.to_string())
        .add_attribute("consumer", request.consumer.to_string())
        .add_event(
            Event::new("vrf_random_words_fulfilled")
                .add_attribute("request_id", request_id.to_string())
                .add_attribute("consumer", request.consumer.to_string())
                .add_attribute("round", round.to_string())
                .add_attribute("timestamp", env.block.time.seconds().to_string()),
        ))
}

/// Update the operator list. Admin only.
pub fn update_operators(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    add: Vec<String>,
    remove: Vec<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;

    if info.sender != config.admin {
        return Err(ContractError::Unauthorized {
            reason: "only admin can update operators".to_string(),
        });
    }

    for addr_str in &remove {
        let addr = deps.api.addr_validate(addr_str)?;
        config.operators.retain(|a| a != &addr);
    }

    for addr_str in &add {
        let addr = deps.api.addr_validate(addr_str)?;
        if !config.operators.contains(&addr) {
            config.operators.push(addr);
        }
    }

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("action", "update_operators")
        .add_attribute("added", add.join(","))
        .add_attribute("removed", remove.join(",")))
}
