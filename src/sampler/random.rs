//! Random sampler implementation.

use parking_lot::Mutex;

use crate::distribution::Distribution;
use crate::param::ParamValue;
use crate::rng_util;
use crate::sampler::{Sampler, TrialRecord};

/// A simple random sampler that samples uniformly from distributions.
///
/// This sampler ignores the trial history and samples uniformly at random,
/// respecting log scale constraints. It is the study's default search
/// algorithm; smarter samplers plug in through the same [`Sampler`] trait.
///
/// # Examples
///
/// ```
/// use tuner::sampler::random::RandomSampler;
///
/// // Create with default RNG
/// let sampler = RandomSampler::new();
///
/// // Create with a fixed seed for reproducibility
/// let sampler = RandomSampler::with_seed(42);
/// ```
pub struct RandomSampler {
    rng: Mutex<fastrand::Rng>,
}

impl RandomSampler {
    /// Creates a new random sampler with a default random seed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Creates a new random sampler with a fixed seed for reproducibility.
    ///
    /// Using the same seed will produce the same sequence of sampled values.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn sample(
        &self,
        distribution: &Distribution,
        _trial_id: u64,
        _history: &[TrialRecord],
    ) -> ParamValue {
        let mut rng = self.rng.lock();

        match distribution {
            Distribution::Float(d) => {
                let value = if d.log_scale {
                    // Sample uniformly in log space
                    let log_low = d.low.ln();
                    let log_high = d.high.ln();
                    rng_util::f64_range(&mut rng, log_low, log_high).exp()
                } else {
                    rng_util::f64_range(&mut rng, d.low, d.high)
                };
                ParamValue::Float(value)
            }
            Distribution::Int(d) => {
                let value = if d.log_scale {
                    // Sample uniformly in log space, then round
                    let log_low = (d.low as f64).ln();
                    let log_high = (d.high as f64).ln();
                    let raw = rng_util::f64_range(&mut rng, log_low, log_high)
                        .exp()
                        .round() as i64;
                    // Clamp to bounds since rounding might push outside
                    raw.clamp(d.low, d.high)
                } else {
                    rng.i64(d.low..=d.high)
                };
                ParamValue::Int(value)
            }
            Distribution::Categorical(d) => {
                let index = rng.usize(0..d.n_choices);
                ParamValue::Categorical(index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::{CategoricalDistribution, FloatDistribution, IntDistribution};

    #[test]
    fn samples_float_within_bounds() {
        let sampler = RandomSampler::with_seed(42);
        let dist = Distribution::Float(FloatDistribution {
            low: 0.0,
            high: 1.0,
            log_scale: false,
        });

        for _ in 0..100 {
            let value = sampler.sample(&dist, 0, &[]);
            if let ParamValue::Float(v) = value {
                assert!((0.0..=1.0).contains(&v));
            } else {
                panic!("Expected Float value");
            }
        }
    }

    #[test]
    fn samples_log_float_within_bounds() {
        let sampler = RandomSampler::with_seed(42);
        let dist = Distribution::Float(FloatDistribution {
            low: 1e-4,
            high: 0.5,
            log_scale: true,
        });

        for _ in 0..100 {
            let value = sampler.sample(&dist, 0, &[]);
            if let ParamValue::Float(v) = value {
                assert!((1e-4..=0.5).contains(&v));
            } else {
                panic!("Expected Float value");
            }
        }
    }

    #[test]
    fn samples_int_within_bounds() {
        let sampler = RandomSampler::with_seed(42);
        let dist = Distribution::Int(IntDistribution {
            low: 1,
            high: 5,
            log_scale: false,
        });

        for _ in 0..100 {
            let value = sampler.sample(&dist, 0, &[]);
            if let ParamValue::Int(v) = value {
                assert!((1..=5).contains(&v));
            } else {
                panic!("Expected Int value");
            }
        }
    }

    #[test]
    fn samples_log_int_within_bounds() {
        let sampler = RandomSampler::with_seed(42);
        let dist = Distribution::Int(IntDistribution {
            low: 1,
            high: 1000,
            log_scale: true,
        });

        for _ in 0..100 {
            let value = sampler.sample(&dist, 0, &[]);
            if let ParamValue::Int(v) = value {
                assert!((1..=1000).contains(&v));
            } else {
                panic!("Expected Int value");
            }
        }
    }

    #[test]
    fn samples_every_categorical_choice() {
        let sampler = RandomSampler::with_seed(42);
        let dist = Distribution::Categorical(CategoricalDistribution { n_choices: 2 });

        let mut seen = [false; 2];
        for _ in 0..200 {
            if let ParamValue::Categorical(idx) = sampler.sample(&dist, 0, &[]) {
                assert!(idx < 2);
                seen[idx] = true;
            } else {
                panic!("Expected Categorical value");
            }
        }
        // Over a large sample both choices must be drawn.
        assert!(seen[0] && seen[1]);
    }

    #[test]
    fn seeded_sampling_is_reproducible() {
        let sampler1 = RandomSampler::with_seed(42);
        let sampler2 = RandomSampler::with_seed(42);
        let dist = Distribution::Float(FloatDistribution {
            low: 0.0,
            high: 1.0,
            log_scale: false,
        });

        for _ in 0..10 {
            let v1 = sampler1.sample(&dist, 0, &[]);
            let v2 = sampler2.sample(&dist, 0, &[]);
            assert_eq!(v1, v2);
        }
    }
}
