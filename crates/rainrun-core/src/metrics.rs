//! Goodness-of-fit metrics for calibration objectives.
//!
//! Each metric takes observed and simulated slices of equal length. Timesteps
//! whose observation is missing (non-finite) are skipped. With nothing left to
//! compare the result is NaN.

/// Pairs with a finite observation.
///
/// Returns (observed, simulated).
fn paired(observed: &[f64], simulated: &[f64]) -> (Vec<f64>, Vec<f64>) {
    observed
        .iter()
        .zip(simulated)
        .filter(|(o, _)| o.is_finite())
        .map(|(&o, &s)| (o, s))
        .unzip()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Nash-Sutcliffe Efficiency. Range: (-inf, 1], 1 = perfect.
pub fn nse(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = paired(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let mean_obs = mean(&obs);
    let sse: f64 = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).sum();
    let variance: f64 = obs.iter().map(|o| (o - mean_obs).powi(2)).sum();
    if variance == 0.0 {
        return f64::NEG_INFINITY;
    }
    1.0 - sse / variance
}

/// Kling-Gupta Efficiency (Gupta et al., 2009). Range: (-inf, 1], 1 = perfect.
pub fn kge(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = paired(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let n = obs.len() as f64;
    let (mean_o, mean_s) = (mean(&obs), mean(&sim));
    let std = |v: &[f64], m: f64| (v.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n).sqrt();
    let (std_o, std_s) = (std(&obs, mean_o), std(&sim, mean_s));

    let r = if std_o == 0.0 || std_s == 0.0 {
        0.0
    } else {
        obs.iter()
            .zip(&sim)
            .map(|(o, s)| (o - mean_o) * (s - mean_s))
            .sum::<f64>()
            / (n * std_o * std_s)
    };
    let alpha = if std_o == 0.0 { 0.0 } else { std_s / std_o };
    let beta = if mean_o == 0.0 { 0.0 } else { mean_s / mean_o };

    1.0 - ((r - 1.0).powi(2) + (alpha - 1.0).powi(2) + (beta - 1.0).powi(2)).sqrt()
}

/// Offset keeping the log transform finite at zero flow.
const LOG_OFFSET: f64 = 0.01;

fn log_flows(values: &[f64]) -> Vec<f64> {
    values.iter().map(|x| (x + LOG_OFFSET).ln()).collect()
}

/// NSE on log flows, weighting low flows. Uses log(x + 0.01) to avoid log(0).
pub fn log_nse(observed: &[f64], simulated: &[f64]) -> f64 {
    nse(&log_flows(observed), &log_flows(simulated))
}

/// KGE on log flows. Uses log(x + 0.01) to avoid log(0).
pub fn log_kge(observed: &[f64], simulated: &[f64]) -> f64 {
    kge(&log_flows(observed), &log_flows(simulated))
}

/// Percent bias. Optimal = 0, positive = overestimation.
pub fn pbias(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = paired(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let total: f64 = obs.iter().sum();
    if total == 0.0 {
        return f64::INFINITY;
    }
    let excess: f64 = sim.iter().zip(&obs).map(|(s, o)| s - o).sum();
    100.0 * excess / total
}

/// Root mean square error. Range: [0, inf), 0 = perfect.
pub fn rmse(observed: &[f64], simulated: &[f64]) -> f64 {
    let (obs, sim) = paired(observed, simulated);
    if obs.is_empty() {
        return f64::NAN;
    }
    let sq: Vec<f64> = obs.iter().zip(&sim).map(|(o, s)| (o - s).powi(2)).collect();
    mean(&sq).sqrt()
}

/// Scalar to minimise during calibration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    /// 1 − KGE
    #[default]
    Kge,
    /// 1 − NSE
    Nse,
    Rmse,
    /// |PBIAS| / 100
    Bias,
    /// 1 − KGE of log flows
    LogKge,
    /// 1 − NSE of log flows
    LogNse,
}

impl Objective {
    pub fn loss(self, observed: &[f64], simulated: &[f64]) -> f64 {
        match self {
            Objective::Kge => 1.0 - kge(observed, simulated),
            Objective::Nse => 1.0 - nse(observed, simulated),
            Objective::Rmse => rmse(observed, simulated),
            Objective::Bias => pbias(observed, simulated).abs() / 100.0,
            Objective::LogKge => 1.0 - log_kge(observed, simulated),
            Objective::LogNse => 1.0 - log_nse(observed, simulated),
        }
    }
}
