//! Runtime selection of a base model by name.
//!
//! Samplers and bindings only know a model name and a parameter vector;
//! `AnyModel` forwards the common contract to the concrete type.

use std::fmt;
use std::str::FromStr;

use crate::atkinson::Atkinson;
use crate::dawdy_odonnell::DawdyODonnell;
use crate::error::{ConstructionError, ModelResult, NumericalInconsistency, UnknownModel};
use crate::gr4j::Gr4j;
use crate::hbv::Hbv;
use crate::multilayer::MultiLayerCapacitance;
use crate::quinn::Quinn;
use crate::sixpar::Sixpar;
use crate::splr::Splr;
use crate::traits::{Lumper, ModelConfig, RechargeRole, StepFluxes, StepFluxesSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    Atkinson,
    DawdyODonnell,
    Gr4j,
    Hbv,
    Quinn,
    Sixpar,
    Splr,
    MultiLayerCapacitance,
}

impl ModelKind {
    pub const ALL: [ModelKind; 8] = [
        ModelKind::Atkinson,
        ModelKind::DawdyODonnell,
        ModelKind::Gr4j,
        ModelKind::Hbv,
        ModelKind::Quinn,
        ModelKind::Sixpar,
        ModelKind::Splr,
        ModelKind::MultiLayerCapacitance,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ModelKind::Atkinson => crate::atkinson::AtkinsonConfig::NAME,
            ModelKind::DawdyODonnell => crate::dawdy_odonnell::DawdyODonnellConfig::NAME,
            ModelKind::Gr4j => crate::gr4j::Gr4jConfig::NAME,
            ModelKind::Hbv => crate::hbv::HbvConfig::NAME,
            ModelKind::Quinn => crate::quinn::QuinnConfig::NAME,
            ModelKind::Sixpar => crate::sixpar::SixparConfig::NAME,
            ModelKind::Splr => crate::splr::SplrConfig::NAME,
            ModelKind::MultiLayerCapacitance => crate::multilayer::MultiLayerCapacitanceConfig::NAME,
        }
    }

    /// Positional parameter names, including optional trailing ones.
    pub fn param_names(self) -> &'static [&'static str] {
        match self {
            ModelKind::Atkinson => crate::atkinson::AtkinsonConfig::PARAM_NAMES,
            ModelKind::DawdyODonnell => crate::dawdy_odonnell::DawdyODonnellConfig::PARAM_NAMES,
            ModelKind::Gr4j => crate::gr4j::Gr4jConfig::PARAM_NAMES,
            ModelKind::Hbv => crate::hbv::HbvConfig::PARAM_NAMES,
            ModelKind::Quinn => crate::quinn::QuinnConfig::PARAM_NAMES,
            ModelKind::Sixpar => crate::sixpar::SixparConfig::PARAM_NAMES,
            ModelKind::Splr => crate::splr::SplrConfig::PARAM_NAMES,
            ModelKind::MultiLayerCapacitance => crate::multilayer::MultiLayerCapacitanceConfig::PARAM_NAMES,
        }
    }

    pub fn recharge_role(self) -> RechargeRole {
        match self {
            ModelKind::Atkinson => Atkinson::RECHARGE,
            ModelKind::DawdyODonnell => DawdyODonnell::RECHARGE,
            ModelKind::Gr4j => Gr4j::RECHARGE,
            ModelKind::Hbv => Hbv::RECHARGE,
            ModelKind::Quinn => Quinn::RECHARGE,
            ModelKind::Sixpar => Sixpar::RECHARGE,
            ModelKind::Splr => Splr::RECHARGE,
            ModelKind::MultiLayerCapacitance => MultiLayerCapacitance::RECHARGE,
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = UnknownModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ModelKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| UnknownModel(s.to_string()))
    }
}

/// Any base model behind one type.
#[derive(Debug, Clone)]
pub enum AnyModel {
    Atkinson(Atkinson),
    DawdyODonnell(DawdyODonnell),
    Gr4j(Gr4j),
    Hbv(Hbv),
    Quinn(Quinn),
    Sixpar(Sixpar),
    Splr(Splr),
    MultiLayerCapacitance(MultiLayerCapacitance),
}

/// Expands `$body` once per variant with `$m` bound to the inner model.
macro_rules! dispatch {
    ($self:expr, $m:ident => $body:expr) => {
        match $self {
            AnyModel::Atkinson($m) => $body,
            AnyModel::DawdyODonnell($m) => $body,
            AnyModel::Gr4j($m) => $body,
            AnyModel::Hbv($m) => $body,
            AnyModel::Quinn($m) => $body,
            AnyModel::Sixpar($m) => $body,
            AnyModel::Splr($m) => $body,
            AnyModel::MultiLayerCapacitance($m) => $body,
        }
    };
}

impl AnyModel {
    pub fn from_vector(kind: ModelKind, params: &[f64]) -> Result<Self, ConstructionError> {
        Ok(match kind {
            ModelKind::Atkinson => AnyModel::Atkinson(Atkinson::from_vector(params)?),
            ModelKind::DawdyODonnell => AnyModel::DawdyODonnell(DawdyODonnell::from_vector(params)?),
            ModelKind::Gr4j => AnyModel::Gr4j(Gr4j::from_vector(params)?),
            ModelKind::Hbv => AnyModel::Hbv(Hbv::from_vector(params)?),
            ModelKind::Quinn => AnyModel::Quinn(Quinn::from_vector(params)?),
            ModelKind::Sixpar => AnyModel::Sixpar(Sixpar::from_vector(params)?),
            ModelKind::Splr => AnyModel::Splr(Splr::from_vector(params)?),
            ModelKind::MultiLayerCapacitance => {
                AnyModel::MultiLayerCapacitance(MultiLayerCapacitance::from_vector(params)?)
            }
        })
    }

    pub fn kind(&self) -> ModelKind {
        match self {
            AnyModel::Atkinson(_) => ModelKind::Atkinson,
            AnyModel::DawdyODonnell(_) => ModelKind::DawdyODonnell,
            AnyModel::Gr4j(_) => ModelKind::Gr4j,
            AnyModel::Hbv(_) => ModelKind::Hbv,
            AnyModel::Quinn(_) => ModelKind::Quinn,
            AnyModel::Sixpar(_) => ModelKind::Sixpar,
            AnyModel::Splr(_) => ModelKind::Splr,
            AnyModel::MultiLayerCapacitance(_) => ModelKind::MultiLayerCapacitance,
        }
    }

    pub fn recharge_role(&self) -> RechargeRole {
        self.kind().recharge_role()
    }

    /// Current configuration as a positional vector.
    pub fn to_vector(&self) -> Vec<f64> {
        dispatch!(self, m => m.config().to_vector())
    }

    pub fn update(&mut self, precip: f64, pet: f64) -> Result<StepFluxes, NumericalInconsistency> {
        dispatch!(self, m => m.update(precip, pet))
    }

    pub fn total_storage(&self) -> f64 {
        dispatch!(self, m => m.total_storage())
    }

    /// Storage fraction of every bounded store in the model.
    pub fn storage_fractions(&self) -> Vec<f64> {
        dispatch!(self, m => m.storage_fractions())
    }

    pub fn run(&mut self, precip: &[f64], pet: &[f64]) -> ModelResult<StepFluxesSeries> {
        dispatch!(self, m => m.run(precip, pet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_name() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.name());
        }
        assert_eq!(" GR4J ".parse::<ModelKind>().unwrap(), ModelKind::Gr4j);
        assert!("topmodel".parse::<ModelKind>().is_err());
    }

    #[test]
    fn dispatches_to_concrete_model() {
        let params = [350.0, 90.0, 1.7, 0.9, 0.0];
        let mut any = AnyModel::from_vector(ModelKind::Gr4j, &params).unwrap();
        let mut direct = Gr4j::from_vector(&params).unwrap();
        for (p, ep) in [(20.0, 1.0), (0.0, 3.0), (5.0, 2.0)] {
            assert_eq!(any.update(p, ep).unwrap(), direct.update(p, ep).unwrap());
        }
        assert_eq!(any.total_storage(), direct.total_storage());
        assert_eq!(any.to_vector(), params.to_vec());
        assert_eq!(any.kind(), ModelKind::Gr4j);
    }

    #[test]
    fn wrong_count_is_a_construction_error() {
        for kind in ModelKind::ALL {
            assert!(matches!(
                AnyModel::from_vector(kind, &[1.0]),
                Err(ConstructionError::ParameterCount { .. })
            ));
        }
    }

    #[test]
    fn recharge_roles() {
        assert_eq!(ModelKind::Quinn.recharge_role(), RechargeRole::Leaves);
        assert_eq!(ModelKind::Atkinson.recharge_role(), RechargeRole::Diagnostic);
        assert_eq!(ModelKind::Hbv.recharge_role(), RechargeRole::Internal);
    }
}
