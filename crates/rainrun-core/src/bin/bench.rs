/// Benchmarks every model over synthetic daily forcing.
///
/// Timing uses std::time::Instant with a deterministic LCG for the data and
/// std::hint::black_box against dead-code elimination. A final Monte-Carlo
/// batch exercises the parallel calibration path.
use std::hint::black_box;
use std::time::{Duration, Instant};

use rainrun_core::calibration::monte_carlo;
use rainrun_core::metrics::Objective;
use rainrun_core::sampling::hypercube_to_parameters;
use rainrun_core::snow::{CcfGr4j, DailyWeather, Site};
use rainrun_core::{AnyModel, ForcingContext, ModelKind, Resolution};

const REPEATS: usize = 7;

/// Daily precipitation, PET and mean temperature.
fn make_data(n: usize, seed: u64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut state = seed;
    let mut next_f64 = || -> f64 {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as f64 / (1u64 << 31) as f64
    };

    let precip: Vec<f64> = (0..n).map(|_| (next_f64() * 20.0 - 8.0).max(0.0)).collect();
    let pet: Vec<f64> = (0..n).map(|_| 0.5 + next_f64() * 4.5).collect();
    let temp: Vec<f64> = (0..n).map(|_| -10.0 + next_f64() * 30.0).collect();
    (precip, pet, temp)
}

/// Median of `REPEATS` runs.
fn median_time<F: FnMut()>(mut f: F) -> Duration {
    let mut times: Vec<Duration> = (0..REPEATS)
        .map(|_| {
            let start = Instant::now();
            f();
            start.elapsed()
        })
        .collect();
    times.sort();
    times[REPEATS / 2]
}

fn bench_model(kind: ModelKind, sizes: &[usize]) -> Vec<(String, usize, Duration)> {
    let centre = vec![0.5; kind.param_names().len()];
    let Ok(params) = hypercube_to_parameters(kind, &centre, Resolution::Daily) else {
        tracing::warn!(model = %kind, "no parameters at the hypercube centre");
        return Vec::new();
    };
    let mut results = Vec::new();

    for &n in sizes {
        let (precip, pet, _) = make_data(n, 42);
        let run = || {
            let mut model = AnyModel::from_vector(kind, &params).ok()?;
            model.run(&precip, &pet).ok()
        };

        // Warmup
        black_box(run());

        let dur = median_time(|| {
            black_box(run());
        });
        results.push((kind.to_string(), n, dur));
    }
    results
}

fn bench_ccf_gr4j(sizes: &[usize]) -> Vec<(String, usize, Duration)> {
    let params = [0.35, 0.09, 1.7, 0.9, 0.0, 0.002, 1.0, 0.0, 0.5];
    let mut results = Vec::new();
    let Ok(site) = Site::new(45.0) else {
        return results;
    };

    for &n in sizes {
        let (precip, _, temp) = make_data(n, 42);
        let weather: Vec<DailyWeather> = precip
            .iter()
            .zip(&temp)
            .map(|(&p, &t)| {
                let depth = p / 1000.0;
                let (rain, snow) = if t > 0.0 { (depth, 0.0) } else { (0.0, depth) };
                DailyWeather {
                    tmax: t + 5.0,
                    tmin: t - 5.0,
                    rain,
                    snow,
                }
            })
            .collect();
        let run = || {
            let mut model = CcfGr4j::from_vector(&params, site).ok()?;
            model.run_daily(&weather, 1).ok()
        };

        black_box(run());

        let dur = median_time(|| {
            black_box(run());
        });
        results.push(("ccf_gr4j".to_string(), n, dur));
    }
    results
}

fn bench_monte_carlo(n_samples: usize) -> Option<(String, usize, Duration)> {
    let (precip, pet, _) = make_data(3650, 7);
    let truth = hypercube_to_parameters(ModelKind::Gr4j, &[0.4; 5], Resolution::Daily).ok()?;
    let observed = AnyModel::from_vector(ModelKind::Gr4j, &truth).ok()?.run(&precip, &pet).ok()?.runoff;
    let ctx = ForcingContext::new(precip, pet, observed, 365, Resolution::Daily).ok()?;

    let start = Instant::now();
    let samples = monte_carlo(ModelKind::Gr4j, &ctx, Objective::Kge, n_samples, 1);
    let dur = start.elapsed();
    black_box(samples);
    Some(("monte_carlo gr4j".to_string(), n_samples, dur))
}

fn main() {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    println!("rainrun core benchmarks");
    println!("============================================================");
    println!("{:<24} {:>6}   {:>12}", "Model", "N", "Median (ms)");
    println!("--------------------------------------------");

    let mut all_results: Vec<(String, usize, Duration)> = Vec::new();

    for kind in ModelKind::ALL {
        all_results.extend(bench_model(kind, &[3650, 36500]));
    }
    all_results.extend(bench_ccf_gr4j(&[3650, 36500]));
    all_results.extend(bench_monte_carlo(256));

    for (model, n, dur) in &all_results {
        let ms = dur.as_secs_f64() * 1000.0;
        println!("{:<24} {:>6}      {:>8.2}", model, n, ms);
    }

    println!("============================================================");
}
