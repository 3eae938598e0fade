use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

pub const DIE_FACES: u8 = 6;

/// Source of die rolls for the engine
pub trait Dice {
    /// Roll one six-sided die
    fn roll(&mut self) -> u8;
}

/// Uniform, independent rolls
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    pub fn new() -> Self {
        RandomDice {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of rolls for the given seed
    pub fn seeded(seed: u64) -> Self {
        RandomDice {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl Dice for RandomDice {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=DIE_FACES)
    }
}

/// Replays a fixed list of rolls, starting over once the list is used up.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    script: Vec<u8>,
    pending: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        let script: Vec<u8> = rolls.into_iter().collect();
        ScriptedDice {
            pending: script.iter().copied().collect(),
            script,
        }
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> u8 {
        if self.pending.is_empty() {
            self.pending.extend(self.script.iter().copied());
        }
        // An empty script yields 0, which the engine rejects as an invalid roll
        self.pending.pop_front().unwrap_or(0)
    }
}
