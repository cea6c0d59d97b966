//! Deterministic dice.
//!
//! Every roll in the rules core is derived from a seed, so a world replayed
//! from the same seed and commands resolves every check identically. Tests
//! substitute a scripted [`RngOracle`] to force exact rolls.

use std::cell::Cell;

/// Seed-to-number oracle. Implementations must be pure functions of the seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Roll a die with N sides (1-N inclusive).
    fn roll_die(&self, seed: u64, sides: u32) -> u32 {
        if sides == 0 {
            return 0;
        }
        (self.next_u32(seed) % sides) + 1
    }

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        self.roll_die(seed, 100)
    }
}

/// PCG-XSH-RR: 64-bit LCG state, 32-bit permuted output.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Mixes the world seed, the tick, the acting actor and a roll counter.
pub fn compute_seed(game_seed: u64, tick: u64, actor_id: u32, context: u32) -> u64 {
    let mut hash = game_seed;
    hash ^= tick.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(actor_id).wrapping_mul(0x517cc1b727220a95);
    hash ^= u64::from(context).wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;
    hash
}

/// A stream of rolls for one actor within one tick.
///
/// Each roll advances an internal counter so consecutive rolls differ while
/// the whole stream stays reproducible. Distinct `stream` numbers give the
/// same actor independent streams within the same tick.
pub struct Dice<'a> {
    rng: &'a dyn RngOracle,
    game_seed: u64,
    tick: u64,
    actor: u32,
    stream: u32,
    counter: Cell<u32>,
}

impl<'a> Dice<'a> {
    pub fn new(rng: &'a dyn RngOracle, game_seed: u64, tick: u64, actor: u32) -> Self {
        Self {
            rng,
            game_seed,
            tick,
            actor,
            stream: 0,
            counter: Cell::new(0),
        }
    }

    #[must_use]
    pub fn with_stream(mut self, stream: u32) -> Self {
        self.stream = stream;
        self
    }

    fn next_seed(&self) -> u64 {
        let context = self.counter.get();
        self.counter.set(context.wrapping_add(1));
        let seed = self.game_seed ^ u64::from(self.stream).wrapping_mul(0xc2b2ae3d27d4eb4f);
        compute_seed(seed, self.tick, self.actor, context)
    }

    /// 1..=sides.
    pub fn die(&self, sides: u32) -> i32 {
        self.rng.roll_die(self.next_seed(), sides) as i32
    }

    pub fn d20(&self) -> i32 {
        self.die(20)
    }

    /// 1..=100.
    pub fn percent(&self) -> i32 {
        self.rng.roll_d100(self.next_seed()) as i32
    }

    /// Sum of `count` dice of `sides`. Zero when either is zero.
    pub fn roll(&self, count: u32, sides: u32) -> i32 {
        if count == 0 || sides == 0 {
            return 0;
        }
        (0..count).map(|_| self.die(sides)).sum()
    }

    /// True with `percent`% probability.
    pub fn chance(&self, percent: u32) -> bool {
        self.percent() <= percent as i32
    }

    /// True with probability 1 in `n`.
    pub fn one_in(&self, n: u32) -> bool {
        n != 0 && self.die(n) == 1
    }
}
