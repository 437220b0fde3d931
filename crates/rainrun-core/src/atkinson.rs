/// Atkinson single-store model.
///
/// One soil store with a vegetation/bare-soil evapotranspiration split, a
/// canopy interception store, saturation-excess runoff above the bucket
/// capacity, power-law sub-surface flow above field capacity and linear baseflow.
///
/// Atkinson, S.E., M. Sivapalan, N.R. Viney, R.A. Woods, 2003. Hydrological
/// Processes 17, 2171-2193.
use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, NumericalInconsistency};
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtkinsonConfig {
    /// Bucket capacity.
    pub sbc: f64,
    /// Field-capacity threshold for sub-surface flow.
    pub sfc: f64,
    /// Fractional vegetation cover.
    pub coverdense: f64,
    /// Interception capacity.
    pub intcap: f64,
    /// Baseflow recession coefficient.
    pub kb: f64,
    pub a: f64,
    pub b: f64,
}

impl AtkinsonConfig {
    /// Derive the storage thresholds from soil properties.
    #[allow(clippy::too_many_arguments)]
    pub fn from_soil(
        depth: f64,
        porosity: f64,
        field_capacity: f64,
        wilting_point: f64,
        coverdense: f64,
        intcap: f64,
        kb: f64,
        a: f64,
        b: f64,
    ) -> Self {
        Self {
            sbc: depth * (porosity - wilting_point),
            sfc: depth * (field_capacity - wilting_point),
            coverdense,
            intcap,
            kb,
            a,
            b,
        }
    }
}

impl ModelConfig for AtkinsonConfig {
    const NAME: &'static str = "atkinson";
    const PARAM_NAMES: &'static [&'static str] = &["sbc", "sfc", "coverdense", "intcap", "kb", "a", "b"];

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self {
            sbc: params[0],
            sfc: params[1],
            coverdense: params[2],
            intcap: params[3],
            kb: params[4],
            a: params[5],
            b: params[6],
        })
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![self.sbc, self.sfc, self.coverdense, self.intcap, self.kb, self.a, self.b]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::positive("sbc", self.sbc)?;
        validate::range("sfc", self.sfc, 0.0, self.sbc)?;
        validate::fraction("coverdense", self.coverdense)?;
        validate::non_negative("intcap", self.intcap)?;
        validate::fraction("kb", self.kb)?;
        validate::positive("a", self.a)?;
        validate::positive("b", self.b)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Atkinson {
    config: AtkinsonConfig,
    soil: f64,
    interception: f64,
}

impl Atkinson {
    pub fn soil_storage(&self) -> f64 {
        self.soil
    }

    /// Fill of the soil bucket and, when it has capacity, the canopy.
    pub fn storage_fractions(&self) -> Vec<f64> {
        let mut fractions = vec![self.soil / self.config.sbc];
        if self.config.intcap > 0.0 {
            fractions.push(self.interception / self.config.intcap);
        }
        fractions
    }

    /// Canopy interception: evaporate first, then pass anything above capacity.
    fn intercept(&mut self, precip: f64, pet: f64) -> (f64, f64) {
        let available = self.interception + precip;
        let evaporation = pet.min(available);
        let throughfall = (available - evaporation - self.config.intcap).max(0.0);
        self.interception = available - evaporation - throughfall;
        (evaporation, throughfall)
    }

    /// Saturation excess, sub-surface flow and baseflow from storage `s`.
    fn drainage(&self, s: f64) -> (f64, f64, f64) {
        let c = &self.config;
        let saturation_excess = (s - c.sbc).max(0.0);
        let subsurface = if s > c.sfc {
            ((s.min(c.sbc) - c.sfc) / c.a).powf(1.0 / c.b)
        } else {
            0.0
        };
        (saturation_excess, subsurface, c.kb * s)
    }

    /// Transpiration and bare-soil evaporation demand from storage `s`.
    fn soil_demand(&self, s: f64, pet: f64) -> f64 {
        let c = &self.config;
        let mut transpiration = c.coverdense * pet;
        if s < c.sfc {
            transpiration *= s / c.sfc;
        }
        let bare_soil = (1.0 - c.coverdense) * pet * (s / c.sbc).min(1.0);
        transpiration + bare_soil
    }
}

impl Lumper for Atkinson {
    type Config = AtkinsonConfig;
    const RECHARGE: RechargeRole = RechargeRole::Diagnostic;

    fn new(config: AtkinsonConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        Ok(Self {
            config,
            soil: 0.0,
            interception: 0.0,
        })
    }

    fn config(&self) -> &AtkinsonConfig {
        &self.config
    }

    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let antecedent = self.soil;
        let (interception_et, throughfall) = self.intercept(precip, pet);

        // fluxes are driven by antecedent storage, then limited to what the store holds
        let (qse, qss, qbf) = self.drainage(antecedent);
        let available = antecedent + throughfall;
        let mut runoff = (qse + qss + qbf).min(available);
        let soil_et = self.soil_demand(antecedent, pet - interception_et).min(available - runoff);

        // the bucket never ends a step above capacity
        let remaining = available - runoff - soil_et;
        let spill = (remaining - self.config.sbc).max(0.0);
        runoff += spill;
        self.soil = (remaining - spill).max(0.0);

        Ok(StepFluxes {
            actual_et: interception_et + soil_et,
            runoff,
            recharge: (antecedent - self.soil).max(0.0),
        })
    }

    fn total_storage(&self) -> f64 {
        self.soil + self.interception
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn config() -> AtkinsonConfig {
        AtkinsonConfig {
            sbc: 300.0,
            sfc: 100.0,
            coverdense: 0.6,
            intcap: 2.0,
            kb: 0.02,
            a: 50.0,
            b: 0.8,
        }
    }

    // -- Construction --

    #[test]
    fn rejects_cover_outside_unit_interval() {
        let mut c = config();
        c.coverdense = 1.2;
        assert!(Atkinson::new(c).is_err());
        c.coverdense = -0.1;
        assert!(Atkinson::new(c).is_err());
    }

    #[test]
    fn rejects_field_capacity_above_bucket() {
        let mut c = config();
        c.sfc = 400.0;
        assert!(matches!(
            Atkinson::new(c),
            Err(ConstructionError::OutOfRange { name: "sfc", .. })
        ));
    }

    #[test]
    fn from_soil_derives_thresholds() {
        let c = AtkinsonConfig::from_soil(1000.0, 0.4, 0.25, 0.1, 0.5, 1.0, 0.05, 10.0, 1.0);
        assert_relative_eq!(c.sbc, 300.0, epsilon = 1e-9);
        assert_relative_eq!(c.sfc, 150.0, epsilon = 1e-9);
    }

    #[test]
    fn vector_round_trip_keeps_order() {
        let c = config();
        assert_eq!(AtkinsonConfig::from_vector(&c.to_vector()).unwrap(), c);
        assert!(AtkinsonConfig::from_vector(&[1.0; 6]).is_err());
    }

    // -- Update --

    #[test]
    fn interception_fills_before_throughfall() {
        let mut m = Atkinson::new(config()).unwrap();
        let f = m.update(1.5, 0.0).unwrap();
        assert_eq!(f.runoff, 0.0);
        assert_eq!(m.soil_storage(), 0.0);
        assert_relative_eq!(m.total_storage(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn no_subsurface_flow_below_field_capacity() {
        let mut m = Atkinson::new(config()).unwrap();
        m.update(52.0, 0.0).unwrap(); // 50 reaches the soil
        let f = m.update(0.0, 0.0).unwrap();
        // baseflow only
        assert_relative_eq!(f.runoff, 0.02 * 50.0, epsilon = 1e-12);
    }

    #[test]
    fn saturation_excess_spills_within_the_step() {
        let mut m = Atkinson::new(config()).unwrap();
        let f = m.update(352.0, 0.0).unwrap();
        assert_relative_eq!(f.runoff, 50.0, epsilon = 1e-9);
        assert_relative_eq!(m.soil_storage(), 300.0, epsilon = 1e-9);

        let f = m.update(0.0, 0.0).unwrap();
        let qss = ((300.0_f64 - 100.0) / 50.0).powf(1.0 / 0.8);
        assert_relative_eq!(f.runoff, qss + 0.02 * 300.0, epsilon = 1e-9);
    }

    #[test]
    fn storm_on_empty_store_stays_within_bucket() {
        let mut m = Atkinson::new(config()).unwrap();
        let before = m.total_storage();
        let f = m.update(500.0, 0.0).unwrap();
        assert!(m.storage_fractions().iter().all(|&x| (0.0..=1.0).contains(&x)));
        assert_relative_eq!(m.soil_storage(), 300.0, epsilon = 1e-9);
        let err = Atkinson::RECHARGE.closure_error(before, m.total_storage(), 500.0, &f);
        assert!(err.abs() < 1e-9, "closure error {err}");
    }

    #[test]
    fn recharge_is_storage_drawdown() {
        let mut m = Atkinson::new(config()).unwrap();
        let f = m.update(202.0, 0.0).unwrap();
        assert_eq!(f.recharge, 0.0);
        let before = m.soil_storage();
        let f = m.update(0.0, 3.0).unwrap();
        assert_relative_eq!(f.recharge, before - m.soil_storage(), epsilon = 1e-12);
        assert!(f.recharge > 0.0);
    }

    #[test]
    fn balance_closes_over_sequence() {
        let mut m = Atkinson::new(config()).unwrap();
        let forcing = [(20.0, 2.0), (0.0, 5.0), (80.0, 1.0), (3.0, 6.0), (0.0, 4.0)];
        for (p, ep) in forcing {
            let before = m.total_storage();
            let f = m.update(p, ep).unwrap();
            let err = Atkinson::RECHARGE.closure_error(before, m.total_storage(), p, &f);
            assert!(err.abs() < 1e-9, "closure error {err}");
            assert!(f.actual_et <= ep + 1e-12);
        }
    }
}
