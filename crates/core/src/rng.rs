//! RNG module - 7-bag random piece generation
//!
//! Implements the "7-bag" randomization algorithm: each bag contains one of
//! each piece (I, O, T, S, Z, J, L), shuffled. Draws come from the bag until it
//! is empty, then a new bag is generated. Every shape therefore appears exactly
//! once per cycle of seven draws, which bounds droughts to 12 pieces.
//!
//! Also provides a simple LCG so games are reproducible from a seed.

use std::collections::VecDeque;

use crate::types::{PieceKind, PREVIEW_LEN};

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        // a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }

    /// Generate random value in range [0, max)
    pub fn next_range(&mut self, max: u32) -> u32 {
        self.next_u32() % max
    }

    /// Shuffle a slice using Fisher-Yates
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }
}

/// Shuffle-without-replacement source of piece kinds.
#[derive(Debug, Clone)]
pub struct BagRandomizer {
    bag: [PieceKind; 7],
    /// Index of the next undrawn piece; 7 means the bag is spent
    index: usize,
    rng: SimpleRng,
}

impl BagRandomizer {
    pub fn new(seed: u32) -> Self {
        Self {
            bag: PieceKind::ALL,
            index: PieceKind::ALL.len(),
            rng: SimpleRng::new(seed),
        }
    }

    fn refill(&mut self) {
        self.bag = PieceKind::ALL;
        self.rng.shuffle(&mut self.bag);
        self.index = 0;
    }

    pub fn draw(&mut self) -> PieceKind {
        if self.index >= self.bag.len() {
            self.refill();
        }
        let piece = self.bag[self.index];
        self.index += 1;
        piece
    }

    /// Current RNG state (seeds a continuation of the sequence)
    pub fn seed(&self) -> u32 {
        self.rng.state()
    }
}

/// Pending-piece queue with a fixed lookahead fed by a [`BagRandomizer`].
#[derive(Debug, Clone)]
pub struct PieceQueue {
    pending: VecDeque<PieceKind>,
    bag: BagRandomizer,
}

impl PieceQueue {
    /// Create a new piece queue with the given seed
    pub fn new(seed: u32) -> Self {
        Self::scripted(seed, &[])
    }

    /// Create a queue whose first draws are `pieces`, followed by bag draws.
    ///
    /// Used to replay a known opening.
    pub fn scripted(seed: u32, pieces: &[PieceKind]) -> Self {
        let mut queue = Self {
            pending: pieces.iter().copied().collect(),
            bag: BagRandomizer::new(seed),
        };
        queue.top_up();
        queue
    }

    fn top_up(&mut self) {
        while self.pending.len() < PREVIEW_LEN {
            self.pending.push_back(self.bag.draw());
        }
    }

    /// Peek at the next piece without removing it
    pub fn peek(&self) -> Option<PieceKind> {
        self.pending.front().copied()
    }

    /// Upcoming pieces, next first
    pub fn preview(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.pending.iter().copied()
    }

    /// Draw the next piece from the queue
    pub fn draw(&mut self) -> PieceKind {
        let piece = match self.pending.pop_front() {
            Some(piece) => piece,
            None => self.bag.draw(),
        };
        self.top_up();
        piece
    }

    /// RNG state to continue the sequence after a reset
    pub fn seed(&self) -> u32 {
        self.bag.seed()
    }
}

impl Default for PieceQueue {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_full_bag(drawn: &[PieceKind]) {
        assert_eq!(drawn.len(), 7);
        for kind in PieceKind::ALL {
            assert_eq!(
                drawn.iter().filter(|&&k| k == kind).count(),
                1,
                "{:?} must appear exactly once in {:?}",
                kind,
                drawn
            );
        }
    }

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(12345);
        let mut rng2 = SimpleRng::new(12345);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
        }
    }

    #[test]
    fn test_rng_zero_seed_is_remapped() {
        let mut zero = SimpleRng::new(0);
        let mut one = SimpleRng::new(1);
        assert_eq!(zero.next_u32(), one.next_u32());
    }

    #[test]
    fn test_bag_cycles_contain_each_shape_once() {
        for seed in [1, 7, 42, 12345, 987654321] {
            let mut bag = BagRandomizer::new(seed);
            for _ in 0..20 {
                let drawn: Vec<_> = (0..7).map(|_| bag.draw()).collect();
                assert_full_bag(&drawn);
            }
        }
    }

    #[test]
    fn test_queue_draws_follow_bag_cycles() {
        let mut queue = PieceQueue::new(99);
        for _ in 0..10 {
            let drawn: Vec<_> = (0..7).map(|_| queue.draw()).collect();
            assert_full_bag(&drawn);
        }
    }

    #[test]
    fn test_queue_peek_matches_draw() {
        let mut queue = PieceQueue::new(1);
        for _ in 0..15 {
            let peeked = queue.peek().unwrap();
            assert_eq!(queue.preview().count(), PREVIEW_LEN);
            assert_eq!(queue.draw(), peeked);
        }
    }

    #[test]
    fn test_scripted_queue_draws_prefix_first() {
        let mut queue = PieceQueue::scripted(5, &[PieceKind::I, PieceKind::I, PieceKind::O]);
        assert_eq!(queue.draw(), PieceKind::I);
        assert_eq!(queue.draw(), PieceKind::I);
        assert_eq!(queue.draw(), PieceKind::O);

        let drawn: Vec<_> = (0..7).map(|_| queue.draw()).collect();
        assert_full_bag(&drawn);
    }
}
