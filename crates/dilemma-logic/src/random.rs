//! Seeded pseudo-random number generator
//!
//! Deterministic PRNG behind the random opponent, so a game can be replayed
//! from its seed. Uses xorshift64*.

/// Seeded random number generator
///
/// Deterministic: same seed = same sequence
#[derive(Clone, Debug)]
pub struct SeededRng {
    state: u64,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 0x853c49e6748fea9b } else { seed };

        let mut rng = Self { state };
        for _ in 0..8 {
            rng.next_u64();
        }
        rng
    }

    /// Independent stream for one game, derived from this generator's state.
    /// `Opponent` reseeds from it at every game start.
    pub fn for_game(&self, game_id: u32) -> Self {
        let state = self.state ^ (game_id as u64).wrapping_mul(0x9e3779b97f4a7c15);
        Self::new(state)
    }

    /// Generate next u64
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state >> 12;
        self.state ^= self.state << 25;
        self.state ^= self.state >> 27;
        self.state.wrapping_mul(0x2545f4914f6cdd1d)
    }

    /// Generate next u32
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Fair coin flip
    pub fn next_bool(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// Generate a value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }
}
