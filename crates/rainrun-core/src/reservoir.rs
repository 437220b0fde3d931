//! Single bounded bucket with a recession coefficient.
//!
//! Storage is a depth of water. `capacity` is informative for [`Reservoir::update`]
//! and enforced by [`Reservoir::overflow`].

use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::validate;

/// Storage below which a decaying reservoir is emptied outright.
pub const MIN_FRACTION: f64 = 1e-4;

/// Rates below this are treated as zero.
pub const NEGLIGIBLE: f64 = 1e-10;

/// Outcome of adding a net volume to a capacity-bounded reservoir.
///
/// Keeps a storage deficit (negative input larger than storage) apart from
/// water spilling over the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Spill {
    Contained,
    /// Unmet withdrawal, always negative.
    Shortfall(f64),
    /// Water above capacity, always positive.
    Excess(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reservoir {
    storage: f64,
    capacity: f64,
    recession: f64,
}

impl Reservoir {
    /// Create an empty reservoir. `capacity` may be infinite for unbounded stores.
    pub fn new(capacity: f64, recession_coefficient: f64) -> Result<Self, ConstructionError> {
        Ok(Self {
            storage: 0.0,
            capacity: validate::positive("capacity", capacity)?,
            recession: validate::fraction("recession_coefficient", recession_coefficient)?,
        })
    }

    /// Builder-style initial storage.
    pub fn with_storage(mut self, storage: f64) -> Self {
        self.storage = storage.max(0.0);
        self
    }

    pub fn storage(&self) -> f64 {
        self.storage
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn recession_coefficient(&self) -> f64 {
        self.recession
    }

    /// `storage / capacity`; zero for unbounded stores.
    pub fn storage_fraction(&self) -> f64 {
        self.storage / self.capacity
    }

    /// Add `net` without enforcing capacity. Returns the (negative) shortfall
    /// when the result would drop below zero, otherwise zero.
    pub fn update(&mut self, net: f64) -> f64 {
        self.storage += net;
        if self.storage < 0.0 {
            let shortfall = self.storage;
            self.storage = 0.0;
            shortfall
        } else {
            0.0
        }
    }

    /// Add `net` and clamp to `[0, capacity]`.
    pub fn spill(&mut self, net: f64) -> Spill {
        self.storage += net;
        if self.storage < 0.0 {
            let shortfall = self.storage;
            self.storage = 0.0;
            Spill::Shortfall(shortfall)
        } else if self.storage > self.capacity {
            let excess = self.storage - self.capacity;
            self.storage = self.capacity;
            Spill::Excess(excess)
        } else {
            Spill::Contained
        }
    }

    /// Signed form of [`Reservoir::spill`]: negative shortfall, positive excess, or zero.
    pub fn overflow(&mut self, net: f64) -> f64 {
        match self.spill(net) {
            Spill::Contained => 0.0,
            Spill::Shortfall(d) => d,
            Spill::Excess(x) => x,
        }
    }

    /// Release `recession × storage`. A residual below [`MIN_FRACTION`] is released too.
    pub fn decay_exponential(&mut self) -> f64 {
        let mut released = self.recession * self.storage;
        self.storage -= released;
        if self.storage < MIN_FRACTION {
            released += self.storage;
            self.storage = 0.0;
        }
        released
    }

    /// Exponential decay that reflects storage back above `min_storage`
    /// (PRMS convention: storage becomes `2 × min − s`).
    ///
    /// Returns the decay amount before the reflection.
    pub fn decay_with_minimum(&mut self, min_storage: f64) -> f64 {
        let released = self.recession * self.storage;
        self.storage -= released;
        if self.storage < min_storage {
            self.storage = 2.0 * min_storage - self.storage;
        }
        released
    }

    /// Closed-form decay for a per-second `rate` applied over `timestep_seconds`.
    pub fn decay_exponential_continuous(&mut self, rate: f64, timestep_seconds: f64) -> f64 {
        if rate < NEGLIGIBLE {
            return 0.0;
        }
        let before = self.storage;
        if self.storage_fraction() < MIN_FRACTION || rate >= self.storage {
            self.storage = 0.0;
            return before;
        }
        self.storage *= (1.0 - rate / self.storage).powf(timestep_seconds);
        before - self.storage
    }

    /// Rescale capacity, e.g. when the exposed area changes. Any overflow this
    /// creates is resolved by the next [`Reservoir::spill`].
    pub(crate) fn scale_capacity(&mut self, factor: f64) {
        self.capacity *= factor;
    }

    /// Remove exactly `amount` (caller guarantees `amount <= storage`).
    pub(crate) fn withdraw(&mut self, amount: f64) {
        self.storage = (self.storage - amount).max(0.0);
    }

    pub(crate) fn set_storage(&mut self, storage: f64) {
        self.storage = storage;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bucket(storage: f64) -> Reservoir {
        Reservoir::new(10.0, 0.2).unwrap().with_storage(storage)
    }

    #[test]
    fn decay_releases_recession_share() {
        let mut r = bucket(6.0);
        assert_relative_eq!(r.decay_exponential(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(r.storage(), 4.8, epsilon = 1e-12);
    }

    #[test]
    fn decay_drains_stranded_residual() {
        let mut r = bucket(5e-5);
        let released = r.decay_exponential();
        assert_eq!(r.storage(), 0.0);
        assert_relative_eq!(released, 5e-5, epsilon = 1e-18);
    }

    #[test]
    fn update_clamps_deficit() {
        let mut r = bucket(0.0);
        assert_eq!(r.update(-20.0), -20.0);
        assert_eq!(r.storage(), 0.0);
    }

    #[test]
    fn update_allows_storage_above_capacity() {
        let mut r = bucket(8.0);
        assert_eq!(r.update(5.0), 0.0);
        assert_eq!(r.storage(), 13.0);
    }

    #[test]
    fn overflow_reports_positive_excess() {
        let mut r = bucket(8.0);
        assert_relative_eq!(r.overflow(5.0), 3.0, epsilon = 1e-12);
        assert_eq!(r.storage(), 10.0);
    }

    #[test]
    fn spill_distinguishes_shortfall_from_excess() {
        let mut r = bucket(2.0);
        assert_eq!(r.spill(-3.0), Spill::Shortfall(-1.0));
        assert_eq!(r.spill(4.0), Spill::Contained);
        assert!(matches!(r.spill(7.0), Spill::Excess(x) if (x - 1.0).abs() < 1e-12));
    }

    #[test]
    fn decay_with_minimum_reflects() {
        let mut r = Reservoir::new(10.0, 0.5).unwrap().with_storage(2.0);
        let released = r.decay_with_minimum(1.5);
        assert_relative_eq!(released, 1.0, epsilon = 1e-12);
        // 1.0 left, reflected to 2 * 1.5 - 1.0
        assert_relative_eq!(r.storage(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn continuous_decay_matches_closed_form() {
        let mut r = bucket(5.0);
        let released = r.decay_exponential_continuous(1e-6, 86400.0);
        let expected = 5.0 * (1.0 - 1e-6_f64 / 5.0).powf(86400.0);
        assert_relative_eq!(r.storage(), expected, epsilon = 1e-12);
        assert_relative_eq!(released, 5.0 - expected, epsilon = 1e-12);
    }

    #[test]
    fn continuous_decay_ignores_negligible_rate() {
        let mut r = bucket(5.0);
        assert_eq!(r.decay_exponential_continuous(0.0, 86400.0), 0.0);
        assert_eq!(r.storage(), 5.0);
    }

    #[test]
    fn unbounded_fraction_is_zero() {
        let r = Reservoir::new(f64::INFINITY, 0.1).unwrap().with_storage(3.0);
        assert_eq!(r.storage_fraction(), 0.0);
    }

    #[test]
    fn rejects_non_positive_capacity() {
        assert!(Reservoir::new(0.0, 0.1).is_err());
        assert!(Reservoir::new(-1.0, 0.1).is_err());
        assert!(Reservoir::new(1.0, 1.5).is_err());
    }
}
