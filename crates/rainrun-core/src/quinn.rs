/// Quinn and Beven (1993) storage model.
///
/// Interception, impervious, root-zone and gravity stores, each an
/// [`ExposedReservoir`]. Every store and flux is a catchment-average depth:
/// impervious quantities are weighted by `f_imp`, pervious ones by `1 − f_imp`.
///
/// Quinn P.F., K.J. Beven, 1993. Hydrological Processes 7, 425-448.
use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, NumericalInconsistency};
use crate::exposed::ExposedReservoir;
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuinnConfig {
    pub int_cap: f64,
    pub imp_cap: f64,
    pub grav_cap: f64,
    /// Impervious fraction.
    pub f_imp: f64,
    pub ksat: f64,
    pub root_depth: f64,
    pub porosity: f64,
    pub field_cap: f64,
    /// Conductivity decay with depth.
    pub f: f64,
    pub alpha: f64,
    /// Long-term mean depth to the watertable.
    pub zwt: f64,
}

impl ModelConfig for QuinnConfig {
    const NAME: &'static str = "quinn";
    const PARAM_NAMES: &'static [&'static str] = &[
        "int_cap",
        "imp_cap",
        "grav_cap",
        "f_imp",
        "ksat",
        "root_depth",
        "porosity",
        "field_cap",
        "f",
        "alpha",
        "zwt",
    ];

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self {
            int_cap: params[0],
            imp_cap: params[1],
            grav_cap: params[2],
            f_imp: params[3],
            ksat: params[4],
            root_depth: params[5],
            porosity: params[6],
            field_cap: params[7],
            f: params[8],
            alpha: params[9],
            zwt: params[10],
        })
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![
            self.int_cap,
            self.imp_cap,
            self.grav_cap,
            self.f_imp,
            self.ksat,
            self.root_depth,
            self.porosity,
            self.field_cap,
            self.f,
            self.alpha,
            self.zwt,
        ]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::non_negative("int_cap", self.int_cap)?;
        validate::non_negative("imp_cap", self.imp_cap)?;
        validate::positive("grav_cap", self.grav_cap)?;
        validate::fraction("f_imp", self.f_imp)?;
        if self.f_imp >= 1.0 {
            return Err(ConstructionError::Inconsistent {
                what: "f_imp leaves no pervious area",
            });
        }
        validate::non_negative("ksat", self.ksat)?;
        validate::positive("root_depth", self.root_depth)?;
        validate::range("porosity", self.porosity, f64::MIN_POSITIVE, 1.0)?;
        validate::range("field_cap", self.field_cap, 0.0, self.porosity)?;
        if self.field_cap >= self.porosity {
            return Err(ConstructionError::Inconsistent {
                what: "field_cap must be below porosity",
            });
        }
        validate::non_negative("f", self.f)?;
        validate::non_negative("alpha", self.alpha)?;
        validate::non_negative("zwt", self.zwt)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quinn {
    config: QuinnConfig,
    interception: Option<ExposedReservoir>,
    impervious: Option<ExposedReservoir>,
    root_zone: ExposedReservoir,
    gravity: ExposedReservoir,
    /// Gravity storage at the mean watertable depth.
    watertable_storage: f64,
    /// Recharge rate at the mean watertable depth.
    recharge_rate: f64,
}

impl Quinn {
    /// Fill of the canopy, impervious, root-zone and gravity stores that exist.
    pub fn storage_fractions(&self) -> Vec<f64> {
        let mut fractions: Vec<f64> = self
            .interception
            .iter()
            .chain(self.impervious.iter())
            .map(ExposedReservoir::storage_fraction)
            .collect();
        fractions.push(self.root_zone.storage_fraction());
        fractions.push(self.gravity.storage_fraction());
        fractions
    }

    fn pervious(&self) -> f64 {
        1.0 - self.config.f_imp
    }

    /// Evaporate from the gravity store when the watertable is near the surface.
    fn gravity_evaporation(&mut self, demand: f64) -> f64 {
        let cap = self.gravity.capacity();
        let sto = self.gravity.storage();
        let gx = self.watertable_storage;
        if gx - sto >= cap {
            return 0.0;
        }
        let reach = if demand <= cap - gx - sto {
            demand
        } else {
            cap - gx + sto
        };
        self.gravity.update(0.0, reach.clamp(0.0, demand), 0.0).evaporation
    }
}

impl Lumper for Quinn {
    type Config = QuinnConfig;
    const RECHARGE: RechargeRole = RechargeRole::Leaves;

    fn new(config: QuinnConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        let pervious = 1.0 - config.f_imp;
        let interception = if config.int_cap > 0.0 {
            Some(ExposedReservoir::new(config.int_cap, 1.0, 0.0)?)
        } else {
            None
        };
        let impervious_cap = config.imp_cap * config.f_imp;
        let impervious = if impervious_cap > 0.0 {
            Some(ExposedReservoir::new(impervious_cap, config.f_imp, 0.0)?)
        } else {
            None
        };
        let drainable = config.porosity - config.field_cap;
        let root_zone = ExposedReservoir::new(config.root_depth * drainable * pervious, pervious, 0.0)?;
        let gravity = ExposedReservoir::new(config.grav_cap * pervious, pervious, 0.0)?;
        Ok(Self {
            watertable_storage: config.zwt * drainable * pervious,
            recharge_rate: config.alpha * config.ksat * pervious * (-config.f * config.zwt).exp(),
            config,
            interception,
            impervious,
            root_zone,
            gravity,
        })
    }

    fn config(&self) -> &QuinnConfig {
        &self.config
    }

    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let pervious = self.pervious();
        let mut net = precip;
        let mut demand = pet;
        let mut runoff = 0.0;

        if let Some(canopy) = self.interception.as_mut() {
            let f = canopy.update(net, demand, 0.0);
            net = f.runoff;
            demand -= f.evaporation;
        }

        let on_impervious = net * self.config.f_imp;
        match self.impervious.as_mut() {
            Some(imp) => {
                let f = imp.update(on_impervious, demand, 0.0);
                runoff += f.runoff;
                demand -= f.evaporation;
            }
            None => runoff += on_impervious,
        }

        // no Hortonian mechanism on the pervious area
        let root_demand = demand * (1.0 - self.root_zone.storage_fraction());
        let rz = self
            .root_zone
            .update(net * pervious, root_demand, self.config.ksat * pervious);
        demand -= rz.evaporation;

        runoff += self.gravity.update(rz.runoff + rz.percolation, 0.0, 0.0).runoff;
        demand -= self.gravity_evaporation(demand.max(0.0));

        let rate = self.gravity.storage().min(self.recharge_rate);
        let recharge = self.gravity.update(0.0, 0.0, rate).percolation;

        Ok(StepFluxes {
            actual_et: pet - demand,
            runoff,
            recharge,
        })
    }

    fn total_storage(&self) -> f64 {
        self.interception.map_or(0.0, |r| r.storage())
            + self.impervious.map_or(0.0, |r| r.storage())
            + self.root_zone.storage()
            + self.gravity.storage()
    }
}
