//! Stochastic duration sampling.
//!
//! Service and inter-arrival durations are drawn from a normal
//! distribution and floored at an eighth of the mean, so a sampled
//! duration is never negative and never collapses to zero for a
//! positive mean. The deviation defaults to a quarter of the mean
//! (at least 0.25).

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Sample a duration with mean `mean` and the default deviation
/// `max(0.25, mean / 4)`.
pub fn service_time(rng: &mut impl Rng, mean: f64) -> f64 {
    let dev = (mean * 0.25).max(0.25);
    service_time_with(rng, mean, dev)
}

/// Sample a duration with mean `mean` and deviation `dev`, floored at
/// `mean / 8`.
///
/// A deviation the distribution rejects (negative or non-finite)
/// degrades to the mean itself rather than failing: durations feed
/// straight into token delays, which must stay well-formed.
pub fn service_time_with(rng: &mut impl Rng, mean: f64, dev: f64) -> f64 {
    let floor = mean * 0.125;
    let sample = Normal::new(mean, dev).map_or(mean, |normal| normal.sample(rng));
    sample.max(floor)
}
