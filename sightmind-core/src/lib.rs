//! sightmind-core - the game-state contract the search engine consumes
//!
//! This crate provides:
//! - `GameState`, the small trait the MCTS/inference core is generic over
//! - `connect_four`, a reference implementation used to demonstrate the engine
//! - `demo_ai`, an alpha-beta player kept for comparison only - never used
//!   by the core search/inference machinery

pub mod connect_four;
pub mod demo_ai;
pub mod state;

pub use connect_four::ConnectFour;
pub use demo_ai::AlphaBetaAi;
pub use state::{GameState, Player};
