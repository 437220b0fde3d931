/// Simple parallel linear reservoirs (three-tank model).
///
/// Net precipitation is split three ways by fixed ratios; each tank drains
/// independently. Actual ET is the balance residual of the input step.
///
/// Buytaert, W., K. Beven, 2011. Hydrological Processes 25, 1784-1799.
use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, NumericalInconsistency};
use crate::reservoir::Reservoir;
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplrConfig {
    /// Share of net precipitation sent to the first tank.
    pub r12: f64,
    /// Share of the remainder sent to the second tank.
    pub r23: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
}

impl ModelConfig for SplrConfig {
    const NAME: &'static str = "splr";
    const PARAM_NAMES: &'static [&'static str] = &["r12", "r23", "k1", "k2", "k3"];

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self {
            r12: params[0],
            r23: params[1],
            k1: params[2],
            k2: params[3],
            k3: params[4],
        })
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![self.r12, self.r23, self.k1, self.k2, self.k3]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::fraction("r12", self.r12)?;
        validate::fraction("r23", self.r23)?;
        validate::fraction("k1", self.k1)?;
        validate::fraction("k2", self.k2)?;
        validate::fraction("k3", self.k3)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Splr {
    config: SplrConfig,
    tanks: [Reservoir; 3],
}

impl Splr {
    /// The tanks are unbounded, so their fractions are always zero.
    pub fn storage_fractions(&self) -> Vec<f64> {
        self.tanks.iter().map(Reservoir::storage_fraction).collect()
    }

    fn shares(&self) -> [f64; 3] {
        let SplrConfig { r12, r23, .. } = self.config;
        [r12, (1.0 - r12) * r23, (1.0 - r12) * (1.0 - r23)]
    }
}

impl Lumper for Splr {
    type Config = SplrConfig;
    const RECHARGE: RechargeRole = RechargeRole::Leaves;

    fn new(config: SplrConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        let tanks = [
            Reservoir::new(f64::INFINITY, config.k1)?,
            Reservoir::new(f64::INFINITY, config.k2)?,
            Reservoir::new(f64::INFINITY, config.k3)?,
        ];
        Ok(Self { config, tanks })
    }

    fn config(&self) -> &SplrConfig {
        &self.config
    }

    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let net = precip - pet;
        let before = self.total_storage();
        let shares = self.shares();
        for (tank, share) in self.tanks.iter_mut().zip(shares) {
            tank.update(share * net);
        }
        let actual_et = before - self.total_storage() + precip;
        let runoff = self.tanks.iter_mut().map(Reservoir::decay_exponential).sum();
        Ok(StepFluxes {
            actual_et,
            runoff,
            recharge: 0.0,
        })
    }

    fn total_storage(&self) -> f64 {
        self.tanks.iter().map(Reservoir::storage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> SplrConfig {
        SplrConfig {
            r12: 0.5,
            r23: 0.4,
            k1: 0.3,
            k2: 0.1,
            k3: 0.01,
        }
    }

    #[test]
    fn rejects_partition_outside_unit_interval() {
        let mut c = config();
        c.r23 = 1.2;
        assert!(Splr::new(c).is_err());
    }

    #[test]
    fn splits_net_precipitation() {
        let mut m = Splr::new(config()).unwrap();
        let f = m.update(12.0, 2.0).unwrap();
        assert_relative_eq!(f.actual_et, 2.0, epsilon = 1e-12);
        // tanks hold 5, 2, 3 before draining
        assert_relative_eq!(f.runoff, 1.5 + 0.2 + 0.03, epsilon = 1e-12);
    }

    #[test]
    fn aet_is_limited_by_storage() {
        let mut m = Splr::new(config()).unwrap();
        let f = m.update(1.0, 5.0).unwrap();
        // nothing stored, so only the precipitation itself evaporates
        assert_relative_eq!(f.actual_et, 1.0, epsilon = 1e-12);
        assert_eq!(m.total_storage(), 0.0);
    }

    #[test]
    fn residual_identity_holds() {
        let mut m = Splr::new(config()).unwrap();
        for (p, ep) in [(20.0, 1.0), (0.0, 8.0), (3.0, 1.0), (0.0, 50.0)] {
            let before = m.total_storage();
            let f = m.update(p, ep).unwrap();
            let err = Splr::RECHARGE.closure_error(before, m.total_storage(), p, &f);
            assert!(err.abs() < 1e-9, "closure error {err}");
        }
    }
}
