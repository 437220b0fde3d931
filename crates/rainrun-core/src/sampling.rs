//! Unit-hypercube transforms.
//!
//! Maps a point in `[0, 1]^n` to a physical parameter vector in the model's
//! positional order. Every output passes the model's `validate`, so a sampler
//! never needs to know the physical constraints. Depths are in millimetres;
//! rates are sampled per day and converted to the forcing timestep.

use crate::error::ConstructionError;
use crate::forcing::Resolution;
use crate::gr4j::params::MIN_X4;
use crate::model::ModelKind;
use crate::snow::{CcfKind, SnowpackConfig};
use crate::validate;

/// Closed physical interval sampled by one coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lo: f64,
    pub hi: f64,
}

impl Bounds {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn linear(self, u: f64) -> f64 {
        linear(self.lo, self.hi, u)
    }

    pub fn log_linear(self, u: f64) -> f64 {
        log_linear(self.lo, self.hi, u)
    }
}

pub fn linear(lo: f64, hi: f64, u: f64) -> f64 {
    lo + (hi - lo) * u
}

/// Uniform in log space. Both bounds must be positive.
pub fn log_linear(lo: f64, hi: f64, u: f64) -> f64 {
    (lo.ln() + (hi.ln() - lo.ln()) * u).exp()
}

/// Two coordinates mapped into `bounds` so that the second never exceeds the first.
///
/// Returns (upper, lower).
pub fn nested2(bounds: Bounds, u_upper: f64, u_lower: f64) -> (f64, f64) {
    let upper = bounds.linear(u_upper);
    (upper, linear(bounds.lo, upper, u_lower))
}

/// Shares that sum to one, each strictly positive.
///
/// Each coordinate is pushed through the exponential quantile function and
/// the results normalised, which is uniform over the simplex.
pub fn sum_to_one<const N: usize>(u: [f64; N]) -> [f64; N] {
    const MARGIN: f64 = 1e-9;
    let mut weights = u.map(|ui| -(1.0 - linear(MARGIN, 1.0 - MARGIN, ui)).ln());
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Daily recession coefficient expressed per timestep.
fn per_step(k_day: f64, days: f64) -> f64 {
    1.0 - (1.0 - k_day).powf(days)
}

/// Check the coordinate count and range.
fn check_unit(model: &'static str, u: &[f64], min: usize, max: usize) -> Result<(), ConstructionError> {
    validate::count(model, u, min, max)?;
    for &ui in u {
        validate::fraction("u", ui)?;
    }
    Ok(())
}

/// Physical parameters for `kind` from hypercube coordinates `u`.
///
/// `u` has one coordinate per parameter; HBV accepts 9 or 10 (lake fraction).
pub fn hypercube_to_parameters(kind: ModelKind, u: &[f64], resolution: Resolution) -> Result<Vec<f64>, ConstructionError> {
    let names = kind.param_names();
    let min = if kind == ModelKind::Hbv { 9 } else { names.len() };
    check_unit(kind.name(), u, min, names.len())?;
    let days = resolution.days_per_timestep();

    let params = match kind {
        ModelKind::Atkinson => {
            let sfc = linear(0.0, 100.0, u[1]);
            vec![
                sfc + linear(1.0, 300.0, u[0]),
                sfc,
                u[2],
                linear(0.0, 10.0, u[3]),
                per_step(log_linear(1e-5, 1.0, u[4]), days),
                linear(0.1, 100.0, u[5]),
                linear(0.01, 1.0, u[6]),
            ]
        }
        ModelKind::DawdyODonnell => vec![
            log_linear(1e-3, 1e3, u[0]) * days,
            linear(0.1, 100.0, u[1]),
            linear(0.0, 1000.0, u[2]),
            linear(1.0, 1000.0, u[3]),
            per_step(log_linear(1e-5, 1.0, u[4]), days),
            per_step(log_linear(1e-5, 1.0, u[5]), days),
        ],
        ModelKind::Gr4j => vec![
            linear(1.0, 1000.0, u[0]),
            linear(1.0, 300.0, u[1]),
            (linear(0.5, 10.0, u[2]) / days).max(MIN_X4),
            linear(0.05, 0.95, u[3]),
            linear(-5.0, 5.0, u[4]) * days,
        ],
        ModelKind::Hbv => {
            let mut p = vec![
                linear(1.0, 1000.0, u[0]),
                u[1],
                linear(0.0, 10.0, u[2]),
                linear(0.0, 100.0, u[3]),
                per_step(u[4], days),
                per_step(u[5], days),
                per_step(u[6], days),
                log_linear(1e-3, 100.0, u[7]) * days,
                linear(1.0, 10.0, u[8]) / days,
            ];
            if let Some(&lake) = u.get(9) {
                p.push(lake);
            }
            p
        }
        ModelKind::Quinn => {
            let porosity = linear(0.05, 0.6, u[6]);
            vec![
                linear(0.0, 10.0, u[0]),
                linear(0.0, 10.0, u[1]),
                linear(1.0, 100.0, u[2]),
                linear(0.0, 0.95, u[3]),
                log_linear(1e-3, 1e3, u[4]) * days,
                linear(10.0, 1000.0, u[5]),
                porosity,
                porosity * linear(0.0, 0.95, u[7]),
                linear(0.0, 1e-3, u[8]),
                u[9],
                linear(0.0, 10_000.0, u[10]),
            ]
        }
        ModelKind::Sixpar => vec![
            linear(1.0, 100.0, u[0]),
            linear(0.0, 100.0, u[1]),
            per_step(u[2], days),
            per_step(u[3], days),
            u[4],
            u[5],
        ],
        ModelKind::Splr => vec![u[0], u[1], per_step(u[2], days), per_step(u[3], days), per_step(u[4], days)],
        ModelKind::MultiLayerCapacitance => {
            let (porosity, fc) = nested2(Bounds::new(0.05, 0.6), u[2], u[3]);
            let [l1, l2, l3] = sum_to_one([u[6], u[7], u[8]]);
            vec![
                u[0],
                linear(10.0, 1000.0, u[1]),
                porosity,
                fc,
                linear(0.1, 100.0, u[4]),
                linear(0.01, 1.0, u[5]),
                l1,
                l2,
                l3,
            ]
        }
    };
    Ok(params)
}

/// CCF snowpack parameters `[tindex, ddfc, base_t, tsf]` from four coordinates.
pub fn snowpack_parameters(u: &[f64]) -> Result<[f64; 4], ConstructionError> {
    check_unit(SnowpackConfig::NAME, u, 4, 4)?;
    Ok([
        log_linear(0.0002, 0.05, u[0]),
        linear(0.0, 10.0, u[1]),
        linear(-5.0, 5.0, u[2]),
        linear(0.1, 0.7, u[3]),
    ])
}

/// Millimetres per metre.
const MM_PER_M: f64 = 1000.0;

/// Positions of the depth-valued parameters in each wrapped model's vector.
fn depth_indices(kind: CcfKind) -> &'static [usize] {
    match kind {
        // x1, x3, x2
        CcfKind::Gr4j => &[0, 1, 4],
        // fc, uzl, perc
        CcfKind::Hbv => &[0, 3, 7],
    }
}

/// Physical parameters of a snow-coupled model from hypercube coordinates.
///
/// The base model's coordinates come first, mapped at daily resolution with
/// depths converted to metres to match the snowpack; the last four are the
/// snowpack's.
pub fn ccf_hypercube_to_parameters(kind: CcfKind, u: &[f64]) -> Result<Vec<f64>, ConstructionError> {
    let n_snow = SnowpackConfig::PARAM_NAMES.len();
    let base = kind.base();
    let min = if base == ModelKind::Hbv { 9 } else { base.param_names().len() };
    validate::count(kind.name(), u, min + n_snow, kind.dim())?;

    let (head, tail) = u.split_at(u.len() - n_snow);
    let mut params = hypercube_to_parameters(base, head, Resolution::Daily)?;
    for &i in depth_indices(kind) {
        params[i] /= MM_PER_M;
    }
    params.extend(snowpack_parameters(tail)?);
    Ok(params)
}
