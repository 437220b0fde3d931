/// Multi-layer capacitance soil model.
///
/// Up to three stacked layers. Each drains downward as a power law of its
/// storage above a tension threshold; vegetation transpires from the top two
/// layers and bare soil evaporates from the top one. Every flux is computed
/// from antecedent storages, then layers are updated top-down and any layer
/// above capacity spills to runoff.
///
/// Struthers, I., C. Hinz, M. Sivapalan, et al., 2003. Hydrological Processes 17, 2151-2169.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{ConstructionError, NumericalInconsistency};
use crate::reservoir::{Reservoir, Spill};
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};
use crate::validate;

/// Number of layers that may transpire.
const ROOT_LAYERS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiLayerCapacitanceConfig {
    /// Fractional vegetation cover.
    pub cover: f64,
    pub depth: f64,
    pub porosity: f64,
    /// Field capacity as a volumetric fraction.
    pub fc: f64,
    pub a: f64,
    pub b: f64,
    /// Layer thickness fractions, summing to one.
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
}

impl ModelConfig for MultiLayerCapacitanceConfig {
    const NAME: &'static str = "multilayer_capacitance";
    const PARAM_NAMES: &'static [&'static str] = &["cover", "depth", "porosity", "fc", "a", "b", "l1", "l2", "l3"];

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self {
            cover: params[0],
            depth: params[1],
            porosity: params[2],
            fc: params[3],
            a: params[4],
            b: params[5],
            l1: params[6],
            l2: params[7],
            l3: params[8],
        })
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![
            self.cover,
            self.depth,
            self.porosity,
            self.fc,
            self.a,
            self.b,
            self.l1,
            self.l2,
            self.l3,
        ]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::fraction("cover", self.cover)?;
        validate::positive("depth", self.depth)?;
        validate::range("porosity", self.porosity, f64::MIN_POSITIVE, 1.0)?;
        validate::range("fc", self.fc, 0.0, self.porosity)?;
        validate::positive("a", self.a)?;
        validate::positive("b", self.b)?;
        validate::positive("l1", self.l1)?;
        validate::fraction("l2", self.l2)?;
        validate::fraction("l3", self.l3)?;
        if ((self.l1 + self.l2 + self.l3) - 1.0).abs() > 1e-9 {
            return Err(ConstructionError::Inconsistent {
                what: "layer fractions must sum to one",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Layer {
    store: Reservoir,
    /// Transmission coefficient, scaled by layer thickness.
    a: f64,
    transpires: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultiLayerCapacitance {
    config: MultiLayerCapacitanceConfig,
    layers: SmallVec<[Layer; 3]>,
    /// Tension storage as a share of layer capacity.
    tension: f64,
    /// Tension storage of the transpiring layers.
    root_tension: f64,
}

impl MultiLayerCapacitance {
    pub fn layer_storages(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.store.storage()).collect()
    }

    pub fn storage_fractions(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.store.storage_fraction()).collect()
    }

    /// Downward transmission from a layer holding `s`, capped at its free water.
    fn transmission(&self, layer: &Layer, s: f64) -> f64 {
        let free = s - layer.store.capacity() * self.tension;
        if free <= 0.0 {
            return 0.0;
        }
        (free / layer.a).powf(1.0 / self.config.b).min(free)
    }

    fn transpiration(&self, layer: &Layer, s: f64, pet: f64) -> f64 {
        if !layer.transpires || self.root_tension <= 0.0 {
            return 0.0;
        }
        let held = s.min(layer.store.capacity() * self.tension);
        self.config.cover * pet * held / self.root_tension
    }
}

impl Lumper for MultiLayerCapacitance {
    type Config = MultiLayerCapacitanceConfig;
    const RECHARGE: RechargeRole = RechargeRole::Leaves;

    fn new(config: MultiLayerCapacitanceConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        let total = config.depth * config.porosity;
        let tension = config.fc / config.porosity;
        let mut layers: SmallVec<[Layer; 3]> = SmallVec::new();
        for (i, share) in [config.l1, config.l2, config.l3].into_iter().enumerate() {
            if share > 0.0 {
                layers.push(Layer {
                    store: Reservoir::new(share * total, 0.0)?,
                    a: share * config.a,
                    transpires: i < ROOT_LAYERS,
                });
            }
        }
        let root_tension: f64 = layers
            .iter()
            .filter(|l| l.transpires)
            .map(|l| l.store.capacity() * tension)
            .sum();
        Ok(Self {
            config,
            layers,
            tension,
            root_tension,
        })
    }

    fn config(&self) -> &MultiLayerCapacitanceConfig {
        &self.config
    }

    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let bare_soil = 1.0 - self.config.cover;
        let mut inflow = precip;
        let mut actual_et = 0.0;
        let mut runoff = 0.0;
        let mut recharge = 0.0;

        let n = self.layers.len();
        for i in 0..n {
            let layer = self.layers[i];
            let s = layer.store.storage();
            let drained = self.transmission(&layer, s);

            let mut demand = self.transpiration(&layer, s, pet);
            if i == 0 {
                demand += bare_soil * pet * layer.store.storage_fraction();
            }
            let et = demand.min(s - drained);

            if let Spill::Excess(x) = self.layers[i].store.spill(inflow - drained - et) {
                runoff += x;
            }
            actual_et += et;
            inflow = drained;
            if i + 1 == n {
                recharge = drained;
            }
        }

        Ok(StepFluxes {
            actual_et,
            runoff,
            recharge,
        })
    }

    fn total_storage(&self) -> f64 {
        self.layers.iter().map(|l| l.store.storage()).sum()
    }
}
