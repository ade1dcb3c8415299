use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform `[0, 1)` generator consumed by challenge generation
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;

    /// Uniform integer in `0..n` (returns 0 when `n` is 0)
    fn below(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        ((self.next_unit() * n as f64).floor() as u32).min(n - 1)
    }

    /// Uniform integer in `lo..=hi`
    fn between(&mut self, lo: u32, hi: u32) -> u32 {
        lo + self.below(hi - lo + 1)
    }
}

/// Fisher-Yates shuffle driven by a [`RandomSource`]
pub fn shuffle<T>(rng: &mut dyn RandomSource, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = rng.below(i as u32 + 1) as usize;
        items.swap(i, j);
    }
}

/// Production source backed by `rand`
#[derive(Debug)]
pub struct RngSource {
    rng: StdRng,
}

impl RngSource {
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RngSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for RngSource {
    fn next_unit(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of values, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`; an empty script always yields 0.
#[derive(Debug, Clone)]
pub struct ScriptedSource {
    values: Vec<f64>,
    pos: usize,
}

impl ScriptedSource {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            pos: 0,
        }
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.pos % self.values.len()];
        self.pos += 1;
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_source_cycles() {
        let mut src = ScriptedSource::new(vec![0.1, 0.5]);
        assert_eq!(src.next_unit(), 0.1);
        assert_eq!(src.next_unit(), 0.5);
        assert_eq!(src.next_unit(), 0.1);
    }

    #[test]
    fn below_never_reaches_n() {
        let mut src = ScriptedSource::new(vec![1.0]);
        assert_eq!(src.below(10), 9);
        assert_eq!(src.below(0), 0);
    }

    #[test]
    fn between_is_inclusive() {
        let mut low = ScriptedSource::new(vec![0.0]);
        let mut high = ScriptedSource::new(vec![0.999]);
        assert_eq!(low.between(1, 100), 1);
        assert_eq!(high.between(1, 100), 100);
    }

    #[test]
    fn shuffle_keeps_every_item() {
        let mut rng = RngSource::seeded(7);
        let mut items: Vec<u32> = (0..20).collect();
        shuffle(&mut rng, &mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn seeded_sources_repeat() {
        let mut a = RngSource::seeded(42);
        let mut b = RngSource::seeded(42);
        for _ in 0..5 {
            let x = a.next_unit();
            assert_eq!(x, b.next_unit());
            assert!((0.0..1.0).contains(&x));
        }
    }
}
