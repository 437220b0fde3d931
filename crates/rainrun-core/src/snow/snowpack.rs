/// Cold-content-factor (CCF) snowpack.
///
/// Degree-day melt adjusted by `ddfc`, a cold content that must be satisfied
/// before melt or rain can leave the pack, and a liquid water holding capacity.
/// Depths are in metres of water equivalent.
use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::validate;

/// Degree-day factor [m/°C/d].
pub const DEGREE_DAY_FACTOR: f64 = 0.0045;

/// Liquid water the pack holds, as a share of its SWE.
pub const HOLDING_CAPACITY: f64 = 0.05;

/// Specific heat of ice over latent heat of fusion [1/°C].
const ICE_HEAT_RATIO: f64 = 2.1 / 334.0;

/// Below this SWE the pack is gone.
const MIN_SWE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnowpackConfig {
    /// Cold content gained per degree below `base_t` [m/°C/d].
    pub tindex: f64,
    /// Melt factor adjustment [-].
    pub ddfc: f64,
    /// Melt threshold temperature [°C].
    pub base_t: f64,
    /// Surface-to-air temperature factor [-].
    pub tsf: f64,
}

impl SnowpackConfig {
    pub const NAME: &'static str = "ccf";
    pub const PARAM_NAMES: &'static [&'static str] = &["tindex", "ddfc", "base_t", "tsf"];

    pub fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        let n = Self::PARAM_NAMES.len();
        validate::count(Self::NAME, params, n, n)?;
        Ok(Self {
            tindex: params[0],
            ddfc: params[1],
            base_t: params[2],
            tsf: params[3],
        })
    }

    pub fn to_vector(&self) -> Vec<f64> {
        vec![self.tindex, self.ddfc, self.base_t, self.tsf]
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        validate::non_negative("tindex", self.tindex)?;
        validate::non_negative("ddfc", self.ddfc)?;
        validate::finite("base_t", self.base_t)?;
        validate::fraction("tsf", self.tsf)?;
        Ok(())
    }
}

/// One day of snowpack accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SnowStep {
    pub melt: f64,
    pub refreeze: f64,
    /// Liquid water released to the ground.
    pub release: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snowpack {
    config: SnowpackConfig,
    swe: f64,
    liquid: f64,
    cold_content: f64,
}

impl Snowpack {
    pub fn new(config: SnowpackConfig) -> Result<Self, ConstructionError> {
        config.validate()?;
        Ok(Self {
            config,
            swe: 0.0,
            liquid: 0.0,
            cold_content: 0.0,
        })
    }

    pub fn config(&self) -> &SnowpackConfig {
        &self.config
    }

    /// Frozen water equivalent.
    pub fn swe(&self) -> f64 {
        self.swe
    }

    pub fn liquid(&self) -> f64 {
        self.liquid
    }

    pub fn cold_content(&self) -> f64 {
        self.cold_content
    }

    /// Water held by the pack, frozen and liquid.
    pub fn storage(&self) -> f64 {
        self.swe + self.liquid
    }

    /// Add the day's rain and snowfall at mean air temperature `tmean`.
    pub fn update(&mut self, rain: f64, snowfall: f64, tmean: f64) -> SnowStep {
        self.swe += snowfall;
        let melt = self.exchange_heat(tmean);
        self.absorb(rain, melt)
    }

    /// Rain onto the pack with no heat exchange with the air.
    pub fn add_rain(&mut self, rain: f64) -> SnowStep {
        self.absorb(rain, 0.0)
    }

    /// Cold content gain below the threshold, melt above it. Returns melt.
    fn exchange_heat(&mut self, tmean: f64) -> f64 {
        let SnowpackConfig {
            tindex,
            ddfc,
            base_t,
            tsf,
        } = self.config;
        let surface = tsf * tmean;
        if surface < base_t {
            let deficit = base_t - surface;
            let ceiling = self.swe * ICE_HEAT_RATIO * deficit;
            self.cold_content = (self.cold_content + tindex * deficit).min(ceiling);
            return 0.0;
        }
        let mut potential = DEGREE_DAY_FACTOR * ddfc * (tmean - base_t).max(0.0);
        let warming = potential.min(self.cold_content);
        self.cold_content -= warming;
        potential -= warming;
        potential.min(self.swe)
    }

    fn absorb(&mut self, rain: f64, melt: f64) -> SnowStep {
        let refreeze = rain.min(self.cold_content).max(0.0);
        self.cold_content -= refreeze;
        self.swe += refreeze - melt;
        self.liquid += rain - refreeze + melt;

        let mut release = (self.liquid - HOLDING_CAPACITY * self.swe).max(0.0);
        self.liquid -= release;
        if self.swe < MIN_SWE {
            release += self.liquid + self.swe;
            self.swe = 0.0;
            self.liquid = 0.0;
            self.cold_content = 0.0;
        }

        SnowStep {
            melt,
            refreeze,
            release,
        }
    }
}
