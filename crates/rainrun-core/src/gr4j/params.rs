/// GR4J parameters.
///
/// - `x1`: production store capacity
/// - `x3`: routing store reference capacity
/// - `x4`: unit hydrograph time base [timesteps]
/// - `qsplt`: share of effective rainfall routed through the single hydrograph
/// - `x2`: groundwater exchange coefficient (>0 imports, <0 exports)
use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::routing::MAX_ORDINATES;
use crate::traits::ModelConfig;
use crate::validate;

/// Smallest accepted unit hydrograph time base.
pub const MIN_X4: f64 = 0.5;

/// Largest accepted time base; the dual hydrograph spans `2·x4` steps.
pub const MAX_X4: f64 = (MAX_ORDINATES / 2) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gr4jConfig {
    pub x1: f64,
    pub x3: f64,
    pub x4: f64,
    pub qsplt: f64,
    pub x2: f64,
}

impl Gr4jConfig {
    pub fn new(x1: f64, x3: f64, x4: f64, qsplt: f64, x2: f64) -> Self {
        Self { x1, x3, x4, qsplt, x2 }
    }
}

impl ModelConfig for Gr4jConfig {
    const NAME: &'static str = "gr4j";
    const PARAM_NAMES: &'static [&'static str] = &["x1", "x3", "x4", "qsplt", "x2"];

    fn from_vector(params: &[f64]) -> Result<Self, ConstructionError> {
        validate::count(Self::NAME, params, Self::MIN_PARAMS, Self::PARAM_NAMES.len())?;
        Ok(Self::new(params[0], params[1], params[2], params[3], params[4]))
    }

    fn to_vector(&self) -> Vec<f64> {
        vec![self.x1, self.x3, self.x4, self.qsplt, self.x2]
    }

    fn validate(&self) -> Result<(), ConstructionError> {
        validate::positive("x1", self.x1)?;
        validate::positive("x3", self.x3)?;
        validate::range("x4", self.x4, MIN_X4, MAX_X4)?;
        if !(self.qsplt > 0.0 && self.qsplt < 1.0) {
            return Err(ConstructionError::OutOfRange {
                name: "qsplt",
                value: self.qsplt,
                min: 0.0,
                max: 1.0,
            });
        }
        validate::finite("x2", self.x2)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_parameters() {
        let p = Gr4jConfig::new(350.0, 90.0, 1.7, 0.9, 0.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn from_vector_uses_positional_order() {
        let p = Gr4jConfig::from_vector(&[350.0, 90.0, 1.7, 0.9, -0.5]).unwrap();
        assert_eq!(p.x3, 90.0);
        assert_eq!(p.x2, -0.5);
        assert_eq!(p.to_vector(), vec![350.0, 90.0, 1.7, 0.9, -0.5]);
    }

    #[test]
    fn from_vector_wrong_length() {
        assert!(Gr4jConfig::from_vector(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn rejects_short_time_base() {
        let p = Gr4jConfig::new(350.0, 90.0, 0.4, 0.9, 0.0);
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_huge_time_base() {
        for x4 in [MAX_X4 + 1.0, 1e12, 1e300, f64::INFINITY] {
            let p = Gr4jConfig::new(350.0, 90.0, x4, 0.9, 0.0);
            assert!(matches!(p.validate(), Err(ConstructionError::OutOfRange { name: "x4", .. })));
        }
        assert!(Gr4jConfig::new(350.0, 90.0, MAX_X4, 0.9, 0.0).validate().is_ok());
    }

    #[test]
    fn rejects_closed_split_bounds() {
        for qsplt in [0.0, 1.0, f64::NAN] {
            let p = Gr4jConfig::new(350.0, 90.0, 1.7, qsplt, 0.0);
            assert!(p.validate().is_err());
        }
    }
}
