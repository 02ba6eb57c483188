//! Match flow service - bridges pure domain rules with the shared document store.
//!
//! Every operation re-reads the documents it depends on, checks its
//! preconditions against them and turns anything stale into an ignored
//! [`Disposition`]. The store offers no compare-and-swap, so these checks
//! narrow race windows rather than close them; the "round transition in
//! progress" flag is advisory and every reader is expected to honour it.

mod ai_coordinator;
mod mutation;
mod orchestration;
mod player_actions;
mod round_lifecycle;
pub mod seats;
mod turn_timers;

use std::sync::Arc;

use dashmap::{DashMap, DashSet};
use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

pub use mutation::{Disposition, IgnoreReason, RollOutcome, TurnStamp};
pub use orchestration::TransitionReport;
pub use seats::MatchStart;
use turn_timers::TurnTimers;

use crate::config::EngineConfig;
use crate::domain::seed_derivation::{derive_dice_seed, derive_lineup_seed, derive_seating_seed};
use crate::domain::{DiceSource, RandomDice};
use crate::state::AppState;
use crate::store::{DocumentStore, GameCode};

/// `(game code, table id)`
pub(crate) type TableKey = (String, u32);

pub(crate) fn table_key(code: &GameCode, table_id: u32) -> TableKey {
    (code.as_str().to_string(), table_id)
}

/// The bot turn a loop has been started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BotTurnClaim {
    pub round: u8,
    pub turn: usize,
    pub player_id: String,
}

/// Shared by every agent in a process; hold it in an `Arc`.
pub struct GameFlowService {
    store: Arc<dyn DocumentStore>,
    config: Arc<EngineConfig>,
    dice: Arc<dyn DiceSource>,
    lineup_rng: Mutex<ChaCha8Rng>,
    seating_rng: Mutex<ChaCha8Rng>,
    bot_claims: DashMap<TableKey, BotTurnClaim>,
    rolls_in_flight: DashSet<TableKey>,
    timers: TurnTimers,
}

fn rng_for(seed: Option<u64>, derive: fn(u64) -> u64) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(derive(seed)),
        None => ChaCha8Rng::from_os_rng(),
    }
}

impl GameFlowService {
    /// Dice come from the configured seed, or the OS when unseeded.
    pub fn new(state: &AppState) -> Arc<Self> {
        let dice: Arc<dyn DiceSource> = match state.config.seed {
            Some(seed) => Arc::new(RandomDice::seeded(derive_dice_seed(seed))),
            None => Arc::new(RandomDice::new()),
        };
        Self::with_dice(state, dice)
    }

    pub fn with_dice(state: &AppState, dice: Arc<dyn DiceSource>) -> Arc<Self> {
        let seed = state.config.seed;
        Arc::new(Self {
            store: state.store.clone(),
            config: state.config.clone(),
            dice,
            lineup_rng: Mutex::new(rng_for(seed, derive_lineup_seed)),
            seating_rng: Mutex::new(rng_for(seed, derive_seating_seed)),
            bot_claims: DashMap::new(),
            rolls_in_flight: DashSet::new(),
            timers: TurnTimers::default(),
        })
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drop the bot claims and pending timers kept for a finished game.
    pub fn forget_game(&self, code: &GameCode) {
        let game = code.as_str();
        self.bot_claims.retain(|(claim_game, _), _| claim_game != game);
        self.timers.cancel_game(game);
        debug!(game = %code, "Released turn state for finished game");
    }

    /// Cancel every pending turn timer, e.g. on shutdown.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
    }
}
