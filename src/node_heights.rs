use oorandom::Rand32;

/// The maximum height a node in a [`SkipList`](crate::skiplist::SkipList) may have.
///
/// With [`random_height`], one node is generated with this maximum height per approximately
/// 4 million entries inserted into the list (on average).
pub const MAX_HEIGHT: usize = 12;

/// The branching factor used by [`random_height`]'s geometric distribution: each additional
/// level is `1 / BRANCHING_FACTOR` as likely as the one below it.
pub const BRANCHING_FACTOR: u32 = 4;

/// A source of random bits used only for height sampling.
///
/// Kept as a trait so the geometric-sampling algorithm in [`random_height`] doesn't care which
/// concrete generator backs it; production code uses [`oorandom::Rand32`], seeded at
/// construction so that tests are reproducible.
pub(crate) trait Prng32 {
    /// Produces a random `u32` in the range `[0, u32::MAX]`.
    fn rand_u32(&mut self) -> u32;
}

impl Prng32 for Rand32 {
    #[inline]
    fn rand_u32(&mut self) -> u32 {
        Self::rand_u32(self)
    }
}

/// Return a random value in `1..=MAX_HEIGHT`, geometrically distributed with branching factor
/// [`BRANCHING_FACTOR`] (higher values are exponentially less likely).
///
/// Technically, `MAX_HEIGHT` is somewhat more likely than it would be in an exact, unbounded
/// geometric distribution, since what would be higher values are capped to `MAX_HEIGHT`.
pub(crate) fn random_height<P: Prng32>(prng: &mut P) -> usize {
    let mut height = 1;
    while height < MAX_HEIGHT && prng.rand_u32() % BRANCHING_FACTOR == 0 {
        height += 1;
    }
    height
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ConstPrng(u32);

    impl Prng32 for ConstPrng {
        fn rand_u32(&mut self) -> u32 {
            self.0
        }
    }

    #[test]
    fn always_continuing_caps_at_max_height() {
        let mut prng = ConstPrng(0);
        assert_eq!(random_height(&mut prng), MAX_HEIGHT);
    }

    #[test]
    fn never_continuing_yields_one() {
        let mut prng = ConstPrng(1);
        assert_eq!(random_height(&mut prng), 1);
    }

    #[test]
    fn distribution_matches_branching_factor() {
        let mut prng = Rand32::new(0x_deadbeef);
        let mut counts = [0u32; MAX_HEIGHT + 1];
        const SAMPLES: u32 = 200_000;

        for _ in 0..SAMPLES {
            counts[random_height(&mut prng)] += 1;
        }

        // P(height >= 2) should be close to 1/4.
        let at_least_two: u32 = counts[2..].iter().sum();
        let ratio = f64::from(at_least_two) / f64::from(SAMPLES);
        assert!((ratio - 0.25).abs() < 0.02, "ratio was {ratio}");
    }
}
