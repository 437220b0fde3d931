//! Objective evaluation over a shared forcing context.
//!
//! Evaluations are independent: each builds its own model from a hypercube
//! point and only reads the `ForcingContext`, so batches run on the rayon
//! pool. A rejected parameter set is a value (`Err`), never a panic.
//!
//! The snow-coupled models read a `WeatherContext` instead and are scored
//! the same way.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::forcing::{ForcingContext, WeatherContext};
use crate::metrics::Objective;
use crate::model::{AnyModel, ModelKind};
use crate::sampling::{ccf_hypercube_to_parameters, hypercube_to_parameters};
use crate::snow::{CcfGr4j, CcfHbv, CcfKind};

/// A scored hypercube point.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub u: Vec<f64>,
    pub params: Vec<f64>,
    pub loss: f64,
}

/// Simulated runoff for a physical parameter vector over the whole context.
pub fn simulate(kind: ModelKind, params: &[f64], ctx: &ForcingContext) -> ModelResult<Vec<f64>> {
    let mut model = AnyModel::from_vector(kind, params)?;
    Ok(model.run(&ctx.precip, &ctx.pet)?.runoff)
}

/// Loss of a physical parameter vector, scored after warmup.
pub fn evaluate_params(
    kind: ModelKind,
    params: &[f64],
    ctx: &ForcingContext,
    objective: Objective,
) -> ModelResult<f64> {
    let runoff = simulate(kind, params, ctx)?;
    score(objective, ctx.scored_observed(), &runoff[ctx.warmup..])
}

fn score(objective: Objective, observed: &[f64], simulated: &[f64]) -> ModelResult<f64> {
    let loss = objective.loss(observed, simulated);
    if !loss.is_finite() {
        return Err(ModelError::NonFiniteObjective { value: loss });
    }
    Ok(loss)
}

/// Loss of a hypercube point.
pub fn evaluate(kind: ModelKind, u: &[f64], ctx: &ForcingContext, objective: Objective) -> ModelResult<f64> {
    let params = hypercube_to_parameters(kind, u, ctx.resolution)?;
    evaluate_params(kind, &params, ctx, objective)
}

fn logged(model: &str, u: &[f64], result: ModelResult<f64>) -> ModelResult<f64> {
    if let Err(err) = &result {
        debug!(model, ?u, %err, "sample rejected");
    }
    result
}

/// Evaluate many hypercube points in parallel. Results keep the input order.
pub fn evaluate_batch(
    kind: ModelKind,
    points: &[Vec<f64>],
    ctx: &ForcingContext,
    objective: Objective,
) -> Vec<ModelResult<f64>> {
    let results: Vec<ModelResult<f64>> = points
        .par_iter()
        .map(|u| logged(kind.name(), u, evaluate(kind, u, ctx, objective)))
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let best = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .copied()
        .fold(f64::INFINITY, f64::min);
    info!(
        model = %kind,
        accepted,
        rejected = results.len() - accepted,
        best,
        "batch evaluated"
    );
    results
}

/// Uniform random points in `[0, 1)^dim`, reproducible from `seed`.
pub fn uniform_points(dim: usize, n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| (0..dim).map(|_| rng.gen::<f64>()).collect()).collect()
}

/// Seeded Monte-Carlo sampling. Returns the accepted samples, best first.
pub fn monte_carlo(
    kind: ModelKind,
    ctx: &ForcingContext,
    objective: Objective,
    n: usize,
    seed: u64,
) -> Vec<Sample> {
    let points = uniform_points(kind.param_names().len(), n, seed);
    sample_points(kind.name(), points, seed, |u| {
        let params = hypercube_to_parameters(kind, u, ctx.resolution)?;
        let loss = evaluate_params(kind, &params, ctx, objective)?;
        Ok((params, loss))
    })
}

/// Score every point in parallel and keep the accepted ones, best first.
fn sample_points<F>(model: &str, points: Vec<Vec<f64>>, seed: u64, score_point: F) -> Vec<Sample>
where
    F: Fn(&[f64]) -> ModelResult<(Vec<f64>, f64)> + Sync,
{
    let n = points.len();
    let mut samples: Vec<Sample> = points
        .into_par_iter()
        .filter_map(|u| match score_point(&u) {
            Ok((params, loss)) => Some(Sample { u, params, loss }),
            Err(err) => {
                debug!(model, ?u, %err, "sample rejected");
                None
            }
        })
        .collect();
    samples.sort_by(|a, b| a.loss.total_cmp(&b.loss));

    info!(
        model,
        seed,
        accepted = samples.len(),
        rejected = n - samples.len(),
        best = samples.first().map_or(f64::NAN, |s| s.loss),
        "monte carlo finished"
    );
    samples
}

// ---------------------------------------------------------------------------
// Snow-coupled models
// ---------------------------------------------------------------------------

/// Simulated runoff [m/d] of a snow-coupled model over the whole context.
pub fn simulate_ccf(kind: CcfKind, params: &[f64], ctx: &WeatherContext) -> ModelResult<Vec<f64>> {
    let series = match kind {
        CcfKind::Gr4j => CcfGr4j::from_vector(params, ctx.site)?.run_daily(&ctx.weather, ctx.first_doy)?,
        CcfKind::Hbv => CcfHbv::from_vector(params, ctx.site)?.run_daily(&ctx.weather, ctx.first_doy)?,
    };
    Ok(series.runoff)
}

/// Loss of a snow-coupled parameter vector, scored after warmup.
pub fn evaluate_ccf_params(
    kind: CcfKind,
    params: &[f64],
    ctx: &WeatherContext,
    objective: Objective,
) -> ModelResult<f64> {
    let runoff = simulate_ccf(kind, params, ctx)?;
    score(objective, ctx.scored_observed(), &runoff[ctx.warmup..])
}

/// Loss of a hypercube point for a snow-coupled model.
pub fn evaluate_ccf(kind: CcfKind, u: &[f64], ctx: &WeatherContext, objective: Objective) -> ModelResult<f64> {
    let params = ccf_hypercube_to_parameters(kind, u)?;
    evaluate_ccf_params(kind, &params, ctx, objective)
}

/// Seeded Monte-Carlo sampling of a snow-coupled model. Returns the accepted
/// samples, best first.
pub fn monte_carlo_ccf(
    kind: CcfKind,
    ctx: &WeatherContext,
    objective: Objective,
    n: usize,
    seed: u64,
) -> Vec<Sample> {
    let points = uniform_points(kind.dim(), n, seed);
    sample_points(kind.name(), points, seed, |u| {
        let params = ccf_hypercube_to_parameters(kind, u)?;
        let loss = evaluate_ccf_params(kind, &params, ctx, objective)?;
        Ok((params, loss))
    })
}
