//! Integration tests for the sightmind CLI: the full stack end to end
//! (game rules, search kernel, belief inference, and the engine facade
//! wired together the way the `play`/`match`/`sight` commands use them).

use sightmind_core::{connect_four::ConnectFour, demo_ai::AlphaBetaAi, GameState, Player};
use sightmind_engine::{
    compute_adaptive_move, compute_move, compute_move_capped, update_prior, Belief, ComputeOptions,
    LinkMatrix,
};
use sightmind_mcts::sight_array;

fn fast_options() -> ComputeOptions {
    ComputeOptions {
        number_of_threads: 1,
        max_iterations: 400,
        max_time_s: -1.0,
        verbose: false,
    }
}

// ============================================================================
// GAME LOGIC
// ============================================================================

#[test]
fn connect_four_reaches_a_terminal_state_from_an_empty_board() {
    let mut state = ConnectFour::default();
    for _ in 0..3 {
        state.apply(3);
        state.apply(4);
    }
    state.apply(3);
    assert!(!state.has_moves());
    assert_eq!(state.result(Player::One), 1.0);
}

#[test]
fn alpha_beta_demonstrator_is_never_on_the_hot_path_but_still_plays_legally() {
    let state = ConnectFour::default();
    let ai = AlphaBetaAi::new(3);
    let mv = ai.best_move(&state).unwrap();
    assert!(state.legal_moves().contains(&mv));
}

// ============================================================================
// SEARCH KERNEL
// ============================================================================

#[test]
fn compute_move_and_compute_move_capped_agree_when_the_cap_exceeds_game_depth() {
    // A near-full board has a short remaining game tree; a generous cap
    // should behave like uncapped UCT since it never actually triggers.
    let mut state = ConnectFour::new(4, 4);
    let fill: [u8; 10] = [0, 1, 0, 1, 2, 3, 2, 3, 0, 1];
    for mv in fill {
        state.apply(mv);
    }
    assert!(state.has_moves());

    let options = fast_options();
    let capped = compute_move_capped(&state, 20, &options).unwrap();
    let uncapped = compute_move(&state, &options).unwrap();
    assert!(state.legal_moves().contains(&capped));
    assert!(state.legal_moves().contains(&uncapped));
}

#[test]
fn sight_array_always_has_length_k() {
    let state = ConnectFour::default();
    let array = sight_array(&state, 5, &fast_options()).unwrap();
    assert_eq!(array.len(), 5);
}

// ============================================================================
// ADAPTIVE ENGINE + BAYESIAN INFERENCE
// ============================================================================

#[test]
fn compute_adaptive_move_falls_back_to_plain_search_with_a_uniform_belief() {
    let state = ConnectFour::default();
    let belief = Belief::uniform(5);
    let mv = compute_adaptive_move(&state, 5, &belief, &fast_options()).unwrap();
    assert!(state.legal_moves().contains(&mv));
}

#[test]
fn compute_adaptive_move_runs_the_pruned_search_once_a_sight_level_is_confidently_inferred() {
    let state = ConnectFour::default();
    let belief = Belief::from_vec(vec![0.99, 0.0025, 0.0025, 0.0025, 0.0025]);
    let mv = compute_adaptive_move(&state, 5, &belief, &fast_options()).unwrap();
    assert!(state.legal_moves().contains(&mv));
}

#[test]
fn belief_concentrates_over_several_rounds_of_consistent_evidence() {
    // The observed move always matches the sight array's index-2 entry
    // (sight level 3); repeated updates should drive mass toward it.
    let link = LinkMatrix::default_k5();
    let mut belief = Belief::uniform(5);
    let sight = [0u8, 1, 3, 2, 4];

    for _ in 0..20 {
        belief.update(&3u8, &sight, &link);
    }

    let level_3 = belief.as_slice()[2];
    assert!(
        level_3 > 0.9,
        "expected belief to concentrate on level 3, got {:?}",
        belief.as_slice()
    );
}

// ============================================================================
// FULL GAME LOOP (engine vs. a fixed-sight capped-MCTS opponent)
// ============================================================================

#[test]
fn a_full_game_between_the_adaptive_engine_and_a_capped_opponent_terminates() {
    let engine_player = Player::One;
    let mut state = ConnectFour::default();
    let link = LinkMatrix::default_k5();
    let mut belief = Belief::uniform(5);
    let mut recorded_sight: Option<Vec<u8>> = None;
    let options = fast_options();

    let mut rounds = 0;
    while state.has_moves() && rounds < 84 {
        if state.player_to_move() == engine_player {
            let mv = compute_adaptive_move(&state, 5, &belief, &options).unwrap();
            state.apply(mv);
            recorded_sight = if state.has_moves() {
                Some(sight_array(&state, 5, &options).unwrap())
            } else {
                None
            };
        } else {
            let mv = compute_move_capped(&state, 2, &options).unwrap();
            if let Some(array) = recorded_sight.take() {
                let next = update_prior(&mv, &array, belief.as_slice(), &link);
                belief = Belief::from_vec(next);
            }
            state.apply(mv);
        }
        rounds += 1;
    }

    assert!(!state.has_moves(), "game should reach a terminal state within 84 rounds");
    let sum: f64 = belief.as_slice().iter().sum();
    assert!((sum - 1.0).abs() < 1e-9, "belief must stay a normalized distribution");
}
