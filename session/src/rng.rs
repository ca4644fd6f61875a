//! Seeded random stream backing all session selections.

/// SplitMix64 stream owned by the session so every draw replays exactly.
#[derive(Clone, Debug)]
pub(crate) struct SplitMix64 {
    state: u64,
}

impl SplitMix64 {
    pub(crate) fn new(seed: u64) -> Self {
        let seed = if seed == 0 { 0x9e37_79b9_7f4a_7c15 } else { seed };
        Self { state: seed }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Draws a uniform index in `0..len`. `len` must be non-zero.
    pub(crate) fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "next_index requires a non-empty range");
        (self.next_u64() % len as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::SplitMix64;

    #[test]
    fn zero_seed_is_remapped() {
        let mut zero = SplitMix64::new(0);
        let mut remapped = SplitMix64::new(0x9e37_79b9_7f4a_7c15);
        assert_eq!(zero.next_u64(), remapped.next_u64());
    }

    #[test]
    fn identical_seeds_replay_identical_streams() {
        let mut first = SplitMix64::new(0x4d59_5df4_d0f3_3173);
        let mut second = SplitMix64::new(0x4d59_5df4_d0f3_3173);
        for _ in 0..32 {
            assert_eq!(first.next_u64(), second.next_u64());
        }
    }

    #[test]
    fn next_index_stays_in_range() {
        let mut rng = SplitMix64::new(7);
        for _ in 0..64 {
            assert!(rng.next_index(5) < 5);
        }
    }
}
