// Minimal PRNG (no external crates).
//
// This is NOT cryptographically secure.
// It drives board shuffles, obstacle placement, Simon colours and number
// targets. Seeding it makes every layout reproducible in tests.

#[derive(Debug, Clone)]
pub struct Prng {
    state: u64,
}

impl Prng {
    pub fn new(seed: u64) -> Self {
        // Avoid a zero state.
        let seed = if seed == 0 { 0x9E3779B97F4A7C15 } else { seed };
        Self { state: seed }
    }

    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform integer in `low..high`. Returns `low` for an empty range.
    #[inline]
    pub fn gen_range_usize(&mut self, low: usize, high: usize) -> usize {
        if high <= low {
            return low;
        }
        let span = (high - low) as u64;
        // Multiply-shift keeps the result uniform enough for spans this small
        // without the modulo bias of `%`.
        let v = ((self.next_u32() as u64) * span) >> 32;
        low + v as usize
    }

    /// Uniform integer in `low..=high`.
    #[inline]
    pub fn gen_inclusive_u32(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.gen_range_usize(low as usize, high as usize + 1) as u32
    }

    /// Fisher-Yates shuffle.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range_usize(0, i + 1);
            items.swap(i, j);
        }
    }

    pub fn choose<T: Copy>(&mut self, items: &[T]) -> Option<T> {
        if items.is_empty() {
            return None;
        }
        Some(items[self.gen_range_usize(0, items.len())])
    }

    /// Derive an independent seed for a child generator.
    pub fn fork_seed(&mut self) -> u64 {
        self.next_u64() ^ 0xA5A5_5A5A_C3C3_3C3C
    }
}
