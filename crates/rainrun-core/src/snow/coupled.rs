//! Snowpack-coupled models.
//!
//! Each day the CCF snowpack turns rain and snowfall into liquid yield, Makkink
//! PET is derived from the site's radiation and the temperature range, and the
//! wrapped model receives (yield, PET).

use std::fmt;
use std::str::FromStr;

use rainrun_macros::Series;
use serde::{Deserialize, Serialize};

use crate::error::{ConstructionError, ModelResult, NumericalInconsistency, UnknownModel};
use crate::gr4j::Gr4j;
use crate::hbv::Hbv;
use crate::model::ModelKind;
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes};

use super::pet::Makkink;
use super::snowpack::{Snowpack, SnowpackConfig};
use super::solar::Site;

/// Days in the cycle used by `run_daily`.
const DAYS_PER_YEAR: u32 = 365;

/// One day of weather. Temperatures in °C, depths in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyWeather {
    pub tmax: f64,
    pub tmin: f64,
    pub rain: f64,
    pub snow: f64,
}

impl DailyWeather {
    pub fn tmean(&self) -> f64 {
        0.5 * (self.tmax + self.tmin)
    }
}

/// Fluxes of one coupled day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Series)]
#[series(name = "CcfSeries")]
pub struct CcfFluxes {
    /// Liquid water leaving the snowpack.
    pub snow_yield: f64,
    pub pet: f64,
    pub actual_et: f64,
    pub runoff: f64,
    pub recharge: f64,
    pub swe: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CcfConfig<C> {
    pub model: C,
    pub snow: SnowpackConfig,
    pub site: Site,
    #[serde(default)]
    pub pet: Makkink,
}

impl<C: ModelConfig> CcfConfig<C> {
    /// The wrapped model's vector followed by `[tindex, ddfc, base_t, tsf]`.
    pub fn from_vector(params: &[f64], site: Site) -> Result<Self, ConstructionError> {
        let n_snow = SnowpackConfig::PARAM_NAMES.len();
        if params.len() < C::MIN_PARAMS + n_snow {
            return Err(ConstructionError::ParameterCount {
                model: C::NAME,
                min: C::MIN_PARAMS + n_snow,
                max: C::PARAM_NAMES.len() + n_snow,
                got: params.len(),
            });
        }
        let (head, tail) = params.split_at(params.len() - n_snow);
        Ok(Self {
            model: C::from_vector(head)?,
            snow: SnowpackConfig::from_vector(tail)?,
            site,
            pet: Makkink::default(),
        })
    }

    pub fn to_vector(&self) -> Vec<f64> {
        let mut v = self.model.to_vector();
        v.extend(self.snow.to_vector());
        v
    }

    pub fn validate(&self) -> Result<(), ConstructionError> {
        self.model.validate()?;
        self.snow.validate()?;
        Site::new(self.site.latitude_deg)?;
        Ok(())
    }
}

/// A model fed by a CCF snowpack.
#[derive(Debug, Clone)]
pub struct Ccf<M: Lumper> {
    config: CcfConfig<M::Config>,
    model: M,
    pack: Snowpack,
}

pub type CcfGr4j = Ccf<Gr4j>;
pub type CcfHbv = Ccf<Hbv>;

/// Snow-coupled model selected at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CcfKind {
    Gr4j,
    Hbv,
}

impl CcfKind {
    pub const ALL: [CcfKind; 2] = [CcfKind::Gr4j, CcfKind::Hbv];

    pub fn name(self) -> &'static str {
        match self {
            CcfKind::Gr4j => "ccf_gr4j",
            CcfKind::Hbv => "ccf_hbv",
        }
    }

    /// The wrapped base model.
    pub fn base(self) -> ModelKind {
        match self {
            CcfKind::Gr4j => ModelKind::Gr4j,
            CcfKind::Hbv => ModelKind::Hbv,
        }
    }

    /// Coordinates per hypercube point: the base model's, then the snowpack's.
    pub fn dim(self) -> usize {
        self.base().param_names().len() + SnowpackConfig::PARAM_NAMES.len()
    }
}

impl fmt::Display for CcfKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CcfKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CcfKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

impl<M> Ccf<M>
where
    M: Lumper,
    M::Config: ModelConfig + Clone,
{
    pub fn from_vector(params: &[f64], site: Site) -> Result<Self, ConstructionError> {
        Self::new(CcfConfig::from_vector(params, site)?)
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn snowpack(&self) -> &Snowpack {
        &self.pack
    }

    /// Advance one day. `doy` is the day of year of `weather`.
    pub fn update_daily(&mut self, weather: &DailyWeather, doy: u32) -> Result<CcfFluxes, NumericalInconsistency> {
        let tmean = weather.tmean();
        let snow = self.pack.update(weather.rain, weather.snow, tmean);
        let radiation = self.config.site.global(doy, weather.tmax, weather.tmin);
        let pet = self.config.pet.evaporation(radiation, tmean);
        let f = self.model.update(snow.release, pet)?;
        Ok(CcfFluxes {
            snow_yield: snow.release,
            pet,
            actual_et: f.actual_et,
            runoff: f.runoff,
            recharge: f.recharge,
            swe: self.pack.swe(),
        })
    }

    /// Step through consecutive days starting on `first_doy`.
    pub fn run_daily(&mut self, weather: &[DailyWeather], first_doy: u32) -> ModelResult<CcfSeries> {
        let mut outputs = CcfSeries::with_capacity(weather.len());
        let start = first_doy.clamp(1, DAYS_PER_YEAR) - 1;
        for (t, day) in weather.iter().enumerate() {
            let doy = (start + t as u32) % DAYS_PER_YEAR + 1;
            outputs.push(&self.update_daily(day, doy)?);
        }
        Ok(outputs)
    }
}

impl<M> Lumper for Ccf<M>
where
    M: Lumper,
    M::Config: ModelConfig + Clone,
{
    type Config = CcfConfig<M::Config>;
    const RECHARGE: RechargeRole = M::RECHARGE;

    fn new(config: Self::Config) -> Result<Self, ConstructionError> {
        config.validate()?;
        Ok(Self {
            model: M::new(config.model.clone())?,
            pack: Snowpack::new(config.snow)?,
            config,
        })
    }

    fn config(&self) -> &Self::Config {
        &self.config
    }

    /// Precipitation falls as rain on the pack; no heat is exchanged.
    fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        let snow = self.pack.add_rain(precip);
        self.model.update(snow.release, pet)
    }

    fn total_storage(&self) -> f64 {
        self.model.total_storage() + self.pack.storage()
    }
}
