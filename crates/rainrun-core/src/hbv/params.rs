/// HBV parameters.
///
/// - `fc`: maximum soil moisture storage
/// - `lp`: soil moisture share above which ET is at its potential rate [-]
/// - `beta`: shape of the infiltration curve [-]
/// - `uzl`: upper zone threshold for fast flow
/// - `k0`, `k1`, `k2`: fast, slow and baseflow recession coefficients [-]
/// - `perc`: maximum upper-to-lower zone percolation per timestep
/// - `maxbas`: base of the triangular transfer function [timesteps]
/// - `lake_fraction`: share of the catchment draining straight to the lower zone [-]
use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::routing::MAX_ORDINATES;
use crate::traits::ModelConfig;
use crate::validate;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HbvConfig {
    pub fc: f64,
    pub lp: f64,
    pub beta: f64,
    pub uzl: f64,
    pub k0: f64,
    pub k1: f64,
    pub k2: f64,
    pub perc: f64,
    pub maxbas: f64,
    #[serde(default)]
    pub lake_fraction: f64,
}

impl ModelConfig for HbvConfig {
    const NAME: &'static str = "hbv";
    const PARAM_NAMES: &'static [&'static str] = &[
        "fc",
        "lp",
        "beta",
        "uzl",
        "k0",
        "k1",
        "k2",
        "perc",
        "maxbas",
        "lake_fraction",
    ];
    const MIN_PARAMS: usize = 9;

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self {
            fc: params[0],
            lp: params[1],
            beta: params[2],
            uzl: params[3],
            k0: params[4],
            k1: params[5],
            k2: params[6],
            perc: params[7],
            maxbas: params[8],
            lake_fraction: params.get(9).copied().unwrap_or(0.0),
        })
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![
            self.fc,
            self.lp,
            self.beta,
            self.uzl,
            self.k0,
            self.k1,
            self.k2,
            self.perc,
            self.maxbas,
            self.lake_fraction,
        ]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::positive("fc", self.fc)?;
        validate::fraction("lp", self.lp)?;
        validate::non_negative("beta", self.beta)?;
        validate::non_negative("uzl", self.uzl)?;
        validate::fraction("k0", self.k0)?;
        validate::fraction("k1", self.k1)?;
        validate::fraction("k2", self.k2)?;
        validate::non_negative("perc", self.perc)?;
        validate::range("maxbas", self.maxbas, 0.0, MAX_ORDINATES as f64)?;
        validate::fraction("lake_fraction", self.lake_fraction)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> HbvConfig {
        HbvConfig {
            fc: 250.0,
            lp: 0.7,
            beta: 2.0,
            uzl: 20.0,
            k0: 0.2,
            k1: 0.05,
            k2: 0.01,
            perc: 1.5,
            maxbas: 2.5,
            lake_fraction: 0.0,
        }
    }

    #[test]
    fn lake_fraction_is_optional() {
        let v = config().to_vector();
        let nine = HbvConfig::from_vector(&v[..9]).unwrap();
        assert_eq!(nine, config());
        let mut ten = v.clone();
        ten[9] = 0.1;
        assert_eq!(HbvConfig::from_vector(&ten).unwrap().lake_fraction, 0.1);
        assert!(HbvConfig::from_vector(&v[..8]).is_err());
    }

    #[test]
    fn rejects_each_fraction_outside_unit_interval() {
        let cases: [fn(&mut HbvConfig); 4] = [
            |c| c.lp = 1.1,
            |c| c.k0 = -0.1,
            |c| c.k1 = 2.0,
            |c| c.k2 = f64::NAN,
        ];
        for mutate in cases {
            let mut c = config();
            mutate(&mut c);
            assert!(c.validate().is_err());
        }
    }

    #[test]
    fn rejects_huge_transfer_base() {
        for maxbas in [MAX_ORDINATES as f64 + 1.0, 1e12, 1e300] {
            let mut c = config();
            c.maxbas = maxbas;
            assert!(matches!(c.validate(), Err(ConstructionError::OutOfRange { name: "maxbas", .. })));
        }
    }

    #[test]
    fn deserializes_without_lake() {
        let json = r#"{"fc":250,"lp":0.7,"beta":2,"uzl":20,"k0":0.2,"k1":0.05,"k2":0.01,"perc":1.5,"maxbas":2.5}"#;
        let c: HbvConfig = serde_json::from_str(json).unwrap();
        assert_eq!(c, config());
    }
}
