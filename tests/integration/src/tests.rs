//! Integration tests for the keeper raffle.
//!
//! Both contracts run in their own mock environment and are driven through
//! their `instantiate` / `execute` / `query` entry points. Messages that
//! one contract emits for the other are routed by hand:
//!
//! - raffle `PerformUpkeep` -> coordinator `RequestRandomWords`
//! - coordinator `FulfillRandomWords` -> raffle `FulfillRandomWords`
//!
//! The raffle's `NextRequestId` query is answered with the coordinator's real
//! response through `MockQuerier::update_wasm`.
//!
//! Run:
//! ```bash
//! cargo test -p raffle-integration-tests
//! ```

use cosmwasm_std::testing::{message_info, mock_dependencies, mock_env, MockApi, MockQuerier};
use cosmwasm_std::{
    coins, from_json, to_json_binary, Addr, BankMsg, ContractResult, CosmosMsg, Env,
    MemoryStorage, OwnedDeps, Response, SubMsg, SystemResult, Uint128, WasmMsg, WasmQuery,
};
use raffle_common::vrf::derive_random_words;
use raffle_common::RaffleState;

type TestDeps = OwnedDeps<MemoryStorage, MockApi, MockQuerier>;

// ─── Constants ───

/// Real drand quicknet public key
const QUICKNET_PK_HEX: &str = "83cf0f2896adee7eb8b5f01fcad3912212c437e0073e911fb90022d3e760183c8c4b450b6a0a6c3ac6a5776a2d1064510d1fec758c921cc22b0e17e63aaf4bcb5ed66304de9cf809bd274ca73bab4af5a6e9c76a4bc09e76eae8991ef5ece45a";

/// Real quicknet test vectors
const TEST_ROUND: u64 = 1000;
const TEST_SIG_HEX: &str = "b44679b9a59af2ec876b1a6b1ad52ea9b1615fc3982b19576350f93447cb1125e342b73a8dd2bacbe47e4b6b63ed5e39";
const TEST_RANDOMNESS_HEX: &str =
    "fe290beca10872ef2fb164d2aa4442de4566183ec51c56ff3cd603d930e54fdd";

const DENOM: &str = "inj";
const FEE: u128 = 1_000_000;
const INTERVAL: u64 = 300;

// ─── Environment helpers ───

/// Both contracts share one block clock; only the contract address differs.
fn raffle_env(seconds: u64) -> Env {
    let mut env = mock_env();
    env.block.time = env.block.time.plus_seconds(seconds);
    env
}

fn coordinator_env(seconds: u64) -> Env {
    let mut env = raffle_env(seconds);
    env.contract.address = MockApi::default().addr_make("coordinator");
    env
}

fn raffle_addr() -> Addr {
    mock_env().contract.address
}

fn coordinator_addr() -> Addr {
    MockApi::default().addr_make("coordinator")
}

// ─── Coordinator helpers ───

fn setup_coordinator(deps: &mut TestDeps) {
    let admin = deps.api.addr_make("admin");
    let operator = deps.api.addr_make("operator");
    let msg = raffle_vrf_coordinator::msg::InstantiateMsg {
        operators: vec![operator.to_string()],
        quicknet_pubkey_hex: QUICKNET_PK_HEX.to_string(),
        chain_hash: "52db9ba70e0cc0f6eaf7803dd07447a1f5477735fd3f661792ba94600c84e971".to_string(),
        genesis_time: 1692803367,
        period_seconds: 3,
        max_num_words: 10,
    };
    raffle_vrf_coordinator::contract::instantiate(
        deps.as_mut(),
        coordinator_env(0),
        message_info(&admin, &[]),
        msg,
    )
    .unwrap();
}

fn coordinator_next_request_id(deps: &TestDeps) -> u64 {
    let res = raffle_vrf_coordinator::contract::query(
        deps.as_ref(),
        coordinator_env(0),
        raffle_vrf_coordinator::msg::QueryMsg::NextRequestId {},
    )
    .unwrap();
    from_json(res).unwrap()
}

fn submit_test_beacon(deps: &mut TestDeps) {
    let operator = deps.api.addr_make("operator");
    raffle_vrf_coordinator::contract::execute(
        deps.as_mut(),
        coordinator_env(0),
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::SubmitBeacon {
            round: TEST_ROUND,
            signature_hex: TEST_SIG_HEX.to_string(),
        },
    )
    .unwrap();
}

/// Operator fulfills `request_id` from the round 1000 beacon; returns the
/// callback addressed to the consumer.
fn coordinator_fulfill(coordinator: &mut TestDeps, seconds: u64, request_id: u64) -> WasmMsg {
    let operator = coordinator.api.addr_make("operator");
    let res = raffle_vrf_coordinator::contract::execute(
        coordinator.as_mut(),
        coordinator_env(seconds),
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
            request_id,
            round: TEST_ROUND,
        },
    )
    .unwrap();
    assert_eq!(res.messages.len(), 1);
    match res.messages[0].msg.clone() {
        CosmosMsg::Wasm(msg) => msg,
        other => panic!("expected wasm callback, got {:?}", other),
    }
}

// ─── Raffle helpers ───

fn setup_raffle(deps: &mut TestDeps) {
    let admin = deps.api.addr_make("admin");
    let msg = keeper_raffle::msg::InstantiateMsg {
        vrf_coordinator: coordinator_addr().to_string(),
        denom: DENOM.to_string(),
        entrance_fee: Uint128::new(FEE),
        interval_seconds: INTERVAL,
    };
    keeper_raffle::contract::instantiate(deps.as_mut(), raffle_env(0), message_info(&admin, &[]), msg)
        .unwrap();
}

fn enter(deps: &mut TestDeps, player: &Addr) {
    keeper_raffle::contract::execute(
        deps.as_mut(),
        raffle_env(0),
        message_info(player, &coins(FEE, DENOM)),
        keeper_raffle::msg::ExecuteMsg::EnterRaffle {},
    )
    .unwrap();
}

fn raffle_state(deps: &TestDeps) -> keeper_raffle::msg::RaffleStateResponse {
    let res = keeper_raffle::contract::query(
        deps.as_ref(),
        raffle_env(0),
        keeper_raffle::msg::QueryMsg::RaffleState {},
    )
    .unwrap();
    from_json(res).unwrap()
}

fn check_upkeep(deps: &TestDeps, seconds: u64) -> bool {
    let res = keeper_raffle::contract::query(
        deps.as_ref(),
        raffle_env(seconds),
        keeper_raffle::msg::QueryMsg::CheckUpkeep {
            check_data: Default::default(),
        },
    )
    .unwrap();
    let res: keeper_raffle::msg::CheckUpkeepResponse = from_json(res).unwrap();
    res.upkeep_needed
}

/// Keeper closes the round. The raffle's request message is then delivered
/// to the coordinator with the raffle as sender. Returns the assigned id.
fn close_round(raffle: &mut TestDeps, coordinator: &mut TestDeps, seconds: u64) -> u64 {
    let next_id = coordinator_next_request_id(coordinator);
    raffle.querier.update_wasm(move |query| match query {
        WasmQuery::Smart { contract_addr, .. } if *contract_addr == coordinator_addr().to_string() => {
            SystemResult::Ok(ContractResult::Ok(to_json_binary(&next_id).unwrap()))
        }
        _ => panic!("unexpected query: {:?}", query),
    });

    let keeper = raffle.api.addr_make("keeper");
    let res = keeper_raffle::contract::execute(
        raffle.as_mut(),
        raffle_env(seconds),
        message_info(&keeper, &[]),
        keeper_raffle::msg::ExecuteMsg::PerformUpkeep {
            perform_data: Default::default(),
        },
    )
    .unwrap();

    let request = match &res.messages[0].msg {
        CosmosMsg::Wasm(WasmMsg::Execute {
            contract_addr, msg, ..
        }) => {
            assert_eq!(*contract_addr, coordinator_addr().to_string());
            from_json::<raffle_vrf_coordinator::msg::ExecuteMsg>(msg).unwrap()
        }
        other => panic!("expected request message, got {:?}", other),
    };

    let res = raffle_vrf_coordinator::contract::execute(
        coordinator.as_mut(),
        coordinator_env(seconds),
        message_info(&raffle_addr(), &[]),
        request,
    )
    .unwrap();
    let assigned: u64 = from_json(res.data.unwrap()).unwrap();
    assert_eq!(assigned, next_id);
    assigned
}

/// Deliver the coordinator's callback to the raffle, as the chain would.
fn deliver_callback(
    raffle: &mut TestDeps,
    callback: WasmMsg,
    seconds: u64,
) -> Result<Response, keeper_raffle::ContractError> {
    let WasmMsg::Execute {
        contract_addr, msg, ..
    } = callback
    else {
        panic!("expected execute callback");
    };
    assert_eq!(contract_addr, raffle_addr().to_string());
    keeper_raffle::contract::execute(
        raffle.as_mut(),
        raffle_env(seconds),
        message_info(&coordinator_addr(), &[]),
        from_json(msg).unwrap(),
    )
}

fn expected_winner_index(request_id: u64, num_players: u32) -> u32 {
    let randomness = hex::decode(TEST_RANDOMNESS_HEX).unwrap();
    let word = derive_random_words(&randomness, request_id, 1)[0];
    let index = word % cosmwasm_std::Uint256::from(num_players as u128);
    Uint128::try_from(index).unwrap().u128() as u32
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[test]
fn test_full_round_with_real_beacon() {
    let mut coordinator = mock_dependencies();
    let mut raffle = mock_dependencies();
    setup_coordinator(&mut coordinator);
    setup_raffle(&mut raffle);
    submit_test_beacon(&mut coordinator);

    // 1. Three players buy in
    let players: Vec<Addr> = ["alice", "bob", "carol"]
        .iter()
        .map(|p| raffle.api.addr_make(p))
        .collect();
    for player in &players {
        enter(&mut raffle, player);
    }
    let state = raffle_state(&raffle);
    assert_eq!(state.num_players, 3);
    assert_eq!(state.pool_balance, Uint128::new(3 * FEE));

    // 2. Keeper waits for the interval
    assert!(!check_upkeep(&raffle, INTERVAL - 1));
    assert!(check_upkeep(&raffle, INTERVAL + 1));

    // 3. Close the round; the coordinator records the raffle as consumer
    let request_id = close_round(&mut raffle, &mut coordinator, INTERVAL + 1);
    assert_eq!(request_id, 1);
    let state = raffle_state(&raffle);
    assert_eq!(state.state, RaffleState::Calculating);
    assert_eq!(state.pending_request.unwrap().request_id, request_id);

    let res = raffle_vrf_coordinator::contract::query(
        coordinator.as_ref(),
        coordinator_env(0),
        raffle_vrf_coordinator::msg::QueryMsg::Request { request_id },
    )
    .unwrap();
    let request: Option<raffle_vrf_coordinator::state::RandomnessRequest> =
        from_json(res).unwrap();
    assert_eq!(request.unwrap().consumer, raffle_addr());

    // 4. Operator fulfills from the verified beacon
    let callback = coordinator_fulfill(&mut coordinator, INTERVAL + 10, request_id);

    raffle
        .querier
        .bank
        .update_balance(raffle_addr(), coins(3 * FEE, DENOM));
    let res = deliver_callback(&mut raffle, callback, INTERVAL + 10).unwrap();

    // 5. Winner gets the whole pool
    let winner = players[expected_winner_index(request_id, 3) as usize].clone();
    assert_eq!(
        res.messages,
        vec![SubMsg::reply_on_error(
            BankMsg::Send {
                to_address: winner.to_string(),
                amount: coins(3 * FEE, DENOM),
            },
            keeper_raffle::execute::PAYOUT_REPLY_ID,
        )]
    );

    let state = raffle_state(&raffle);
    assert_eq!(state.state, RaffleState::Open);
    assert_eq!(state.num_players, 0);
    assert_eq!(state.pool_balance, Uint128::zero());
    assert_eq!(state.last_timestamp, raffle_env(INTERVAL + 10).block.time);

    let res = keeper_raffle::contract::query(
        raffle.as_ref(),
        raffle_env(0),
        keeper_raffle::msg::QueryMsg::RecentWinner {},
    )
    .unwrap();
    let recent: Option<Addr> = from_json(res).unwrap();
    assert_eq!(recent, Some(winner));
}

#[test]
fn test_fulfillment_cannot_be_replayed() {
    let mut coordinator = mock_dependencies();
    let mut raffle = mock_dependencies();
    setup_coordinator(&mut coordinator);
    setup_raffle(&mut raffle);
    submit_test_beacon(&mut coordinator);

    let alice = raffle.api.addr_make("alice");
    enter(&mut raffle, &alice);
    let request_id = close_round(&mut raffle, &mut coordinator, INTERVAL);

    let callback = coordinator_fulfill(&mut coordinator, INTERVAL + 5, request_id);
    raffle
        .querier
        .bank
        .update_balance(raffle_addr(), coins(FEE, DENOM));
    deliver_callback(&mut raffle, callback.clone(), INTERVAL + 5).unwrap();

    // Coordinator consumed the request
    let operator = coordinator.api.addr_make("operator");
    let err = raffle_vrf_coordinator::contract::execute(
        coordinator.as_mut(),
        coordinator_env(INTERVAL + 6),
        message_info(&operator, &[]),
        raffle_vrf_coordinator::msg::ExecuteMsg::FulfillRandomWords {
            request_id,
            round: TEST_ROUND,
        },
    )
    .unwrap_err();
    assert!(
        format!("{:?}", err).contains("NonexistentRequest"),
        "Expected nonexistent request, got: {:?}",
        err
    );

    // Raffle rejects the same callback delivered twice
    let err = deliver_callback(&mut raffle, callback, INTERVAL + 6).unwrap_err();
    assert!(
        format!("{:?}", err).contains("UnknownRequest"),
        "Expected unknown request, got: {:?}",
        err
    );
}

#[test]
fn test_consecutive_rounds_use_fresh_requests() {
    let mut coordinator = mock_dependencies();
    let mut raffle = mock_dependencies();
    setup_coordinator(&mut coordinator);
    setup_raffle(&mut raffle);
    submit_test_beacon(&mut coordinator);

    let alice = raffle.api.addr_make("alice");
    let bob = raffle.api.addr_make("bob");

    // Round 1: alice alone
    enter(&mut raffle, &alice);
    let first = close_round(&mut raffle, &mut coordinator, INTERVAL);
    let callback = coordinator_fulfill(&mut coordinator, INTERVAL + 3, first);
    raffle
        .querier
        .bank
        .update_balance(raffle_addr(), coins(FEE, DENOM));
    deliver_callback(&mut raffle, callback, INTERVAL + 3).unwrap();

    // Round 2: interval restarts at the settlement
    enter(&mut raffle, &alice);
    enter(&mut raffle, &bob);
    assert!(!check_upkeep(&raffle, 2 * INTERVAL + 2));
    assert!(check_upkeep(&raffle, 2 * INTERVAL + 3));

    let second = close_round(&mut raffle, &mut coordinator, 2 * INTERVAL + 3);
    assert_eq!(second, first + 1);

    let callback = coordinator_fulfill(&mut coordinator, 2 * INTERVAL + 6, second);
    raffle
        .querier
        .bank
        .update_balance(raffle_addr(), coins(2 * FEE, DENOM));
    deliver_callback(&mut raffle, callback, 2 * INTERVAL + 6).unwrap();

    let res = keeper_raffle::contract::query(
        raffle.as_ref(),
        raffle_env(0),
        keeper_raffle::msg::QueryMsg::RoundHistory {
            start_after: None,
            limit: None,
        },
    )
    .unwrap();
    let history: keeper_raffle::msg::RoundHistoryResponse = from_json(res).unwrap();
    assert_eq!(history.results.len(), 2);
    assert_eq!(history.results[0].winner, alice);
    assert_eq!(history.results[0].request_id, first);
    assert_eq!(history.results[1].request_id, second);
    assert_eq!(history.results[1].prize, Uint128::new(2 * FEE));

    let expected = [&alice, &bob][expected_winner_index(second, 2) as usize];
    assert_eq!(history.results[1].winner, *expected);
}

#[test]
fn test_underfunded_payout_leaves_round_pending() {
    let mut coordinator = mock_dependencies();
    let mut raffle = mock_dependencies();
    setup_coordinator(&mut coordinator);
    setup_raffle(&mut raffle);
    submit_test_beacon(&mut coordinator);

    let alice = raffle.api.addr_make("alice");
    enter(&mut raffle, &alice);
    let request_id = close_round(&mut raffle, &mut coordinator, INTERVAL);
    let callback = coordinator_fulfill(&mut coordinator, INTERVAL + 3, request_id);

    // No balance recorded for the raffle
    let err = deliver_callback(&mut raffle, callback.clone(), INTERVAL + 3).unwrap_err();
    assert!(
        format!("{:?}", err).contains("PayoutFailed"),
        "Expected payout failure, got: {:?}",
        err
    );
    let state = raffle_state(&raffle);
    assert_eq!(state.state, RaffleState::Calculating);
    assert_eq!(state.pool_balance, Uint128::new(FEE));

    // Same callback succeeds once the pool is actually held
    raffle
        .querier
        .bank
        .update_balance(raffle_addr(), coins(FEE, DENOM));
    deliver_callback(&mut raffle, callback, INTERVAL + 4).unwrap();
    assert_eq!(raffle_state(&raffle).state, RaffleState::Open);
}

#[test]
fn test_upkeep_blocked_while_request_in_flight() {
    let mut coordinator = mock_dependencies();
    let mut raffle = mock_dependencies();
    setup_coordinator(&mut coordinator);
    setup_raffle(&mut raffle);

    let alice = raffle.api.addr_make("alice");
    enter(&mut raffle, &alice);
    close_round(&mut raffle, &mut coordinator, INTERVAL);

    assert!(!check_upkeep(&raffle, 10 * INTERVAL));
    let keeper = raffle.api.addr_make("keeper");
    let err = keeper_raffle::contract::execute(
        raffle.as_mut(),
        raffle_env(10 * INTERVAL),
        message_info(&keeper, &[]),
        keeper_raffle::msg::ExecuteMsg::PerformUpkeep {
            perform_data: Default::default(),
        },
    )
    .unwrap_err();
    assert!(
        format!("{:?}", err).contains("UpkeepNotNeeded"),
        "Expected upkeep not needed, got: {:?}",
        err
    );

    // Entries are closed until the winner is picked
    let bob = raffle.api.addr_make("bob");
    let err = keeper_raffle::contract::execute(
        raffle.as_mut(),
        raffle_env(10 * INTERVAL),
        message_info(&bob, &coins(FEE, DENOM)),
        keeper_raffle::msg::ExecuteMsg::EnterRaffle {},
    )
    .unwrap_err();
    assert!(format!("{:?}", err).contains("NotOpen"));

    // Coordinator still has exactly one request for the raffle
    assert_eq!(coordinator_next_request_id(&coordinator), 2);
}
