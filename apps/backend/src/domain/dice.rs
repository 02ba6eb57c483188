use std::collections::VecDeque;

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::rules::DIE_FACES;

pub type Dice = [u8; 3];

/// Dice shown on a table before its first roll.
pub const RESTING_DICE: Dice = [1, 1, 1];

/// Source of die rolls. Injected so tests can script outcomes.
pub trait DiceSource: Send + Sync {
    fn roll(&self) -> Dice;
}

pub struct RandomDice {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceSource for RandomDice {
    fn roll(&self) -> Dice {
        let mut rng = self.rng.lock();
        [
            rng.random_range(1..=DIE_FACES),
            rng.random_range(1..=DIE_FACES),
            rng.random_range(1..=DIE_FACES),
        ]
    }
}

/// Plays back a fixed sequence of rolls, then repeats `fallback` forever.
pub struct ScriptedDice {
    queue: Mutex<VecDeque<Dice>>,
    fallback: Dice,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = Dice>, fallback: Dice) -> Self {
        Self {
            queue: Mutex::new(rolls.into_iter().collect()),
            fallback,
        }
    }

    /// Always rolls `dice`.
    pub fn always(dice: Dice) -> Self {
        Self::new([], dice)
    }

    pub fn push(&self, dice: Dice) {
        self.queue.lock().push_back(dice);
    }

    pub fn remaining(&self) -> usize {
        self.queue.lock().len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&self) -> Dice {
        self.queue.lock().pop_front().unwrap_or(self.fallback)
    }
}
