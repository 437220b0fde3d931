/// Common contract shared by every lumped model.
///
/// A model is a stateful, single-threaded machine: build it once from a
/// validated configuration, then call `update` once per timestep in order.
use rainrun_macros::Series;

use crate::error::{ConstructionError, ForcingError, ModelResult, NumericalInconsistency};

/// Fluxes leaving one `update` call, as depths per timestep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Series)]
pub struct StepFluxes {
    pub actual_et: f64,
    pub runoff: f64,
    pub recharge: f64,
}

/// What a model's `recharge` output means for its own water balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RechargeRole {
    /// Recharge leaves the modelled stores (deep percolation).
    Leaves,
    /// Recharge moves water between stores that `total_storage` already counts.
    Internal,
    /// Recharge is a derived diagnostic, not a flux.
    Diagnostic,
}

impl RechargeRole {
    /// Residual of `Δstorage = P − AET − Q − (recharge if it leaves)`.
    pub fn closure_error(self, storage_before: f64, storage_after: f64, precip: f64, fluxes: &StepFluxes) -> f64 {
        let leaving = match self {
            RechargeRole::Leaves => fluxes.recharge,
            RechargeRole::Internal | RechargeRole::Diagnostic => 0.0,
        };
        (storage_after - storage_before) - (precip - fluxes.actual_et - fluxes.runoff - leaving)
    }
}

/// Strongly typed parameter record with a positional adapter for samplers.
pub trait ModelConfig: Sized {
    const NAME: &'static str;
    /// Names in positional order.
    const PARAM_NAMES: &'static [&'static str];
    /// Shortest accepted vector; trailing parameters beyond this are optional.
    const MIN_PARAMS: usize = Self::PARAM_NAMES.len();

    /// Map positions to fields. Only the count is checked here.
    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError>;

    fn to_vector(&self) -> Vec<f64>;

    /// Physical invariants, enforced by every model constructor.
    fn validate(&self) -> Result<(), ConstructionError>;
}

pub trait Lumper: Sized {
    type Config;
    const RECHARGE: RechargeRole;

    /// Validate `config` and build a model with empty stores.
    fn new(config: Self::Config) -> Result<Self, ConstructionError>;

    fn config(&self) -> &Self::Config;

    /// Advance one timestep.
    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency>;

    /// Sum of every internal store, including water in flight in routing buffers.
    fn total_storage(&self) -> f64;

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError>
    where
        Self::Config: ModelConfig,
    {
        Self::new(Self::Config::from_vector(params)?)
    }

    /// Step through paired forcing series, collecting every step's fluxes.
    fn run(&mut self, precip: &[f64], pet: &[f64]) -> ModelResult<StepFluxesSeries> {
        if precip.len() != pet.len() {
            return Err(ForcingError::LengthMismatch {
                series: "pet",
                expected: precip.len(),
                got: pet.len(),
            }
            .into());
        }
        let mut outputs = StepFluxesSeries::with_capacity(precip.len());
        for (&p, &ep) in precip.iter().zip(pet) {
            outputs.push(&self.update(p, ep)?);
        }
        Ok(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn closure_counts_recharge_only_when_it_leaves() {
        let f = StepFluxes {
            actual_et: 1.0,
            runoff: 2.0,
            recharge: 3.0,
        };
        assert_relative_eq!(RechargeRole::Leaves.closure_error(10.0, 14.0, 10.0, &f), 0.0);
        assert_relative_eq!(RechargeRole::Internal.closure_error(10.0, 17.0, 10.0, &f), 0.0);
    }

    #[test]
    fn series_collects_columns() {
        let mut s = StepFluxesSeries::with_capacity(2);
        s.push(&StepFluxes {
            actual_et: 1.0,
            runoff: 0.5,
            recharge: 0.0,
        });
        s.push(&StepFluxes {
            actual_et: 2.0,
            runoff: 1.5,
            recharge: 0.25,
        });
        assert_eq!(s.len(), 2);
        assert_eq!(s.runoff, vec![0.5, 1.5]);
        assert_eq!(s.totals().actual_et, 3.0);
        assert_eq!(StepFluxes::field_names(), &["actual_et", "runoff", "recharge"]);
    }
}
