/// Exposed (Manabe) reservoir.
///
/// A [`Reservoir`] with a share of its surface open to evaporative demand and a
/// minimum storage below which evaporation is limited by what remains.
use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::reservoir::{Reservoir, Spill, NEGLIGIBLE};
use crate::validate;

/// Losses and runoff from one [`ExposedReservoir::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExposedFluxes {
    pub evaporation: f64,
    /// Water spilled above capacity.
    pub runoff: f64,
    pub percolation: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExposedReservoir {
    store: Reservoir,
    exposure: f64,
    minimum_storage: f64,
}

impl ExposedReservoir {
    pub fn new(capacity: f64, exposure: f64, minimum_storage: f64) -> Result<Self, ConstructionError> {
        let store = Reservoir::new(capacity, 0.0)?;
        let exposure = validate::non_negative("exposed_fraction", exposure)?;
        let minimum_storage = validate::range("minimum_storage", minimum_storage, 0.0, capacity)?;
        Ok(Self {
            store,
            exposure,
            minimum_storage,
        })
    }

    pub fn with_storage(mut self, storage: f64) -> Self {
        self.store = self.store.with_storage(storage);
        self
    }

    pub fn storage(&self) -> f64 {
        self.store.storage()
    }

    pub fn capacity(&self) -> f64 {
        self.store.capacity()
    }

    pub fn exposure(&self) -> f64 {
        self.exposure
    }

    pub fn minimum_storage(&self) -> f64 {
        self.minimum_storage
    }

    pub fn storage_fraction(&self) -> f64 {
        self.store.storage_fraction()
    }

    /// Add `precip`, then remove evaporation and percolation.
    ///
    /// `precip` must be non-negative. `pet` is the demand over the whole
    /// reservoir surface; `percolation_rate` is the most that may drain this
    /// step.
    pub fn update(&mut self, precip: f64, pet: f64, percolation_rate: f64) -> ExposedFluxes {
        debug_assert!(precip >= 0.0, "negative precip {precip} into exposed reservoir");
        let runoff = match self.store.spill(precip) {
            Spill::Excess(x) => x,
            // only reachable with negative precip
            Spill::Contained | Spill::Shortfall(_) => 0.0,
        };
        if self.store.storage() == 0.0 || (pet < NEGLIGIBLE && percolation_rate < NEGLIGIBLE) {
            return ExposedFluxes {
                runoff,
                ..ExposedFluxes::default()
            };
        }
        let (evaporation, percolation) = self.partition_losses(pet, percolation_rate);
        ExposedFluxes {
            evaporation,
            runoff,
            percolation,
        }
    }

    /// Split the free storage above the minimum between evaporation and
    /// percolation, then let unmet evaporation draw on the minimum buffer.
    fn partition_losses(&mut self, pet: f64, percolation_rate: f64) -> (f64, f64) {
        let storage = self.store.storage();
        let minimum = self.minimum_storage;
        let mut epx = self.exposure * pet * self.store.storage_fraction();

        if storage <= minimum {
            if pet == 0.0 {
                return (0.0, 0.0);
            }
            let evaporation = epx.min(storage);
            self.store.withdraw(evaporation);
            return (evaporation, 0.0);
        }

        let free = storage - minimum;
        if epx + percolation_rate > free {
            let percolation = percolation_rate / (epx + percolation_rate) * free;
            let mut evaporation = free - percolation;
            epx -= evaporation;
            if epx >= minimum {
                evaporation += minimum;
                self.store.set_storage(0.0);
            } else {
                evaporation += epx;
                self.store.set_storage(minimum - epx);
            }
            (evaporation, percolation)
        } else {
            self.store.set_storage(storage - epx - percolation_rate);
            (epx, percolation_rate)
        }
    }

    /// Change the exposed share of the surface; capacity scales with it.
    pub fn update_exposure(&mut self, exposure: f64) -> Result<(), ConstructionError> {
        let exposure = validate::non_negative("exposed_fraction", exposure)?;
        if self.exposure > 0.0 {
            self.store.scale_capacity(exposure / self.exposure);
        }
        self.exposure = exposure;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn balance(before: f64, precip: f64, after: f64, f: &ExposedFluxes) -> f64 {
        (after - before) - (precip - f.evaporation - f.runoff - f.percolation)
    }

    // -- Construction --

    #[test]
    fn rejects_minimum_above_capacity() {
        assert!(ExposedReservoir::new(10.0, 1.0, 11.0).is_err());
        assert!(ExposedReservoir::new(10.0, -0.1, 1.0).is_err());
        assert!(ExposedReservoir::new(10.0, 1.0, 10.0).is_ok());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "negative precip")]
    fn negative_precip_is_a_caller_bug() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 0.0).unwrap().with_storage(2.0);
        r.update(-5.0, 0.0, 0.0);
    }

    #[test]
    fn zero_precip_leaves_storage_alone() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 0.0).unwrap().with_storage(2.0);
        let f = r.update(0.0, 0.0, 0.0);
        assert_eq!(f, ExposedFluxes::default());
        assert_eq!(r.storage(), 2.0);
    }

    // -- Runoff --

    #[test]
    fn spills_above_capacity() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 0.0).unwrap().with_storage(8.0);
        let f = r.update(5.0, 0.0, 0.0);
        assert_relative_eq!(f.runoff, 3.0, epsilon = 1e-12);
        assert_eq!(r.storage(), 10.0);
    }

    #[test]
    fn negligible_losses_skip_partition() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 0.0).unwrap();
        let f = r.update(4.0, 0.0, 0.0);
        assert_eq!(f, ExposedFluxes::default());
        assert_eq!(r.storage(), 4.0);
    }

    // -- Loss partition --

    #[test]
    fn direct_losses_when_free_storage_suffices() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 1.0).unwrap().with_storage(5.0);
        let f = r.update(0.0, 2.0, 1.0);
        // epx = 2 * 0.5
        assert_relative_eq!(f.evaporation, 1.0, epsilon = 1e-12);
        assert_relative_eq!(f.percolation, 1.0, epsilon = 1e-12);
        assert_relative_eq!(r.storage(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn apportions_free_storage_then_draws_buffer() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 2.0).unwrap().with_storage(4.0);
        let f = r.update(0.0, 10.0, 2.0);
        // epx = 4, free = 2, g = 2/6 * 2, a = 2 - g, remaining demand 4 - a from buffer
        let g = 2.0 / 6.0 * 2.0;
        let a0 = 2.0 - g;
        assert_relative_eq!(f.percolation, g, epsilon = 1e-12);
        assert!(4.0 - a0 >= 2.0);
        assert_relative_eq!(f.evaporation, a0 + 2.0, epsilon = 1e-12);
        assert_eq!(r.storage(), 0.0);
        assert_relative_eq!(balance(4.0, 0.0, r.storage(), &f), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn below_minimum_only_evaporates() {
        let mut r = ExposedReservoir::new(10.0, 1.0, 5.0).unwrap().with_storage(3.0);
        let f = r.update(0.0, 5.0, 4.0);
        assert_relative_eq!(f.evaporation, 1.5, epsilon = 1e-12);
        assert_eq!(f.percolation, 0.0);
        assert_relative_eq!(r.storage(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn unbounded_store_has_no_exposed_demand() {
        let mut r = ExposedReservoir::new(f64::INFINITY, 1.0, 0.0).unwrap().with_storage(5.0);
        let f = r.update(0.0, 3.0, 1.0);
        assert_eq!(f.evaporation, 0.0);
        assert_relative_eq!(f.percolation, 1.0, epsilon = 1e-12);
    }

    // -- Exposure --

    #[test]
    fn exposure_rescales_capacity() {
        let mut r = ExposedReservoir::new(10.0, 0.5, 0.0).unwrap();
        r.update_exposure(1.0).unwrap();
        assert_relative_eq!(r.capacity(), 20.0, epsilon = 1e-12);
        assert!(r.update_exposure(-1.0).is_err());
    }

    #[test]
    fn zero_exposure_keeps_capacity() {
        let mut r = ExposedReservoir::new(10.0, 0.0, 0.0).unwrap();
        r.update_exposure(0.7).unwrap();
        assert_eq!(r.capacity(), 10.0);
        assert_eq!(r.exposure(), 0.7);
    }
}
