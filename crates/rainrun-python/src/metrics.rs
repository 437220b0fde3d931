use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::convert::contiguous_slice;

use rainrun_core::metrics;

fn pair<'py>(
    observed: &'py PyReadonlyArray1<'py, f64>,
    simulated: &'py PyReadonlyArray1<'py, f64>,
) -> PyResult<(&'py [f64], &'py [f64])> {
    let obs = contiguous_slice(observed)?;
    let sim = contiguous_slice(simulated)?;
    if obs.len() != sim.len() {
        return Err(PyValueError::new_err(format!(
            "observed has {} elements but simulated has {}",
            obs.len(),
            sim.len()
        )));
    }
    Ok((obs, sim))
}

#[pyfunction]
fn kge(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::kge(obs, sim))
}

#[pyfunction]
fn nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::nse(obs, sim))
}

#[pyfunction]
fn log_kge(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::log_kge(obs, sim))
}

#[pyfunction]
fn log_nse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::log_nse(obs, sim))
}

#[pyfunction]
fn pbias(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::pbias(obs, sim))
}

#[pyfunction]
fn rmse(observed: PyReadonlyArray1<'_, f64>, simulated: PyReadonlyArray1<'_, f64>) -> PyResult<f64> {
    let (obs, sim) = pair(&observed, &simulated)?;
    Ok(metrics::rmse(obs, sim))
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "metrics")?;
    m.add_function(wrap_pyfunction!(kge, &m)?)?;
    m.add_function(wrap_pyfunction!(nse, &m)?)?;
    m.add_function(wrap_pyfunction!(log_kge, &m)?)?;
    m.add_function(wrap_pyfunction!(log_nse, &m)?)?;
    m.add_function(wrap_pyfunction!(pbias, &m)?)?;
    m.add_function(wrap_pyfunction!(rmse, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
