use crate::error::{ConstructionError, NumericalInconsistency};
use crate::routing::RoutingBuffer;
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};

use super::params::HbvConfig;
use super::processes;

#[derive(Debug, Clone, PartialEq)]
pub struct Hbv {
    config: HbvConfig,
    /// Soil moisture.
    sm: f64,
    /// Upper zone.
    suz: f64,
    /// Lower zone, which also holds the lake.
    slz: f64,
    transfer: RoutingBuffer,
}

impl Hbv {
    /// Builder-style initial storages.
    pub fn with_storages(mut self, soil_moisture: f64, upper: f64, lower: f64) -> Self {
        self.sm = soil_moisture.clamp(0.0, self.config.fc);
        self.suz = upper.max(0.0);
        self.slz = lower.max(0.0);
        self
    }

    /// (soil moisture, upper zone, lower zone)
    pub fn storages(&self) -> (f64, f64, f64) {
        (self.sm, self.suz, self.slz)
    }

    /// Soil moisture relative to field capacity. The response zones are unbounded.
    pub fn storage_fractions(&self) -> Vec<f64> {
        vec![self.sm / self.config.fc]
    }

    /// Lake share of precipitation joins the lower zone, which then evaporates.
    fn lake(&mut self, precip: f64, pet: f64) -> f64 {
        let lake = self.config.lake_fraction;
        self.slz += precip * lake;
        let evaporation = (pet * lake).min(self.slz);
        self.slz -= evaporation;
        evaporation
    }

    fn infiltrate(&mut self, p: f64) -> Result<(), NumericalInconsistency> {
        let HbvConfig { fc, beta, .. } = self.config;
        let to_upper = processes::infiltration_excess(p, self.sm, fc, beta);
        if to_upper > p {
            return Err(NumericalInconsistency::new("hbv", "infiltration exceeds precipitation"));
        }
        self.sm += p - to_upper;
        self.suz += to_upper;
        if self.sm > fc {
            self.suz += self.sm - fc;
            self.sm = fc;
        }
        Ok(())
    }
}

impl Lumper for Hbv {
    type Config = HbvConfig;
    const RECHARGE: RechargeRole = RechargeRole::Internal;

    fn new(config: HbvConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        Ok(Self {
            transfer: RoutingBuffer::triangular(config.maxbas),
            config,
            sm: 0.0,
            suz: 0.0,
            slz: 0.0,
        })
    }

    fn config(&self) -> &HbvConfig {
        &self.config
    }

    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let HbvConfig {
            fc,
            lp,
            uzl,
            k0,
            k1,
            k2,
            perc,
            lake_fraction,
            ..
        } = self.config;
        let land = 1.0 - lake_fraction;

        let mut actual_et = if lake_fraction > 0.0 { self.lake(precip, pet) } else { 0.0 };
        self.infiltrate(precip * land)?;

        let et = processes::soil_evaporation(self.sm, fc, lp, pet * land);
        self.sm -= et;
        actual_et += et;

        let (q0, q1) = processes::upper_zone_outflows(self.suz, k0, k1, uzl);
        self.suz -= q0 + q1;
        let q2 = k2 * self.slz;
        self.slz -= q2;
        let runoff = self.transfer.route(q0 + q1 + q2);

        let recharge = processes::percolation(self.suz, perc);
        self.suz -= recharge;
        self.slz += recharge;

        Ok(StepFluxes {
            actual_et,
            runoff,
            recharge,
        })
    }

    fn total_storage(&self) -> f64 {
        self.sm + self.suz + self.slz + self.transfer.in_flight()
    }
}
