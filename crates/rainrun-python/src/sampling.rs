use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;

use crate::convert::{self, ccf_kind, checked_slice, contiguous_slice, model_kind, value_error};

use rainrun_core::sampling::{ccf_hypercube_to_parameters, hypercube_to_parameters, snowpack_parameters};

/// Map a unit-hypercube point to the physical parameter vector of `name`.
#[pyfunction]
#[pyo3(signature = (name, u, resolution="daily"))]
fn sample_parameters<'py>(
    py: Python<'py>,
    name: &str,
    u: PyReadonlyArray1<'py, f64>,
    resolution: &str,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let kind = model_kind(name)?;
    let step = convert::resolution(resolution)?;
    let params = hypercube_to_parameters(kind, contiguous_slice(&u)?, step).map_err(value_error)?;
    Ok(PyArray1::from_vec(py, params))
}

/// The four snowpack parameters from a unit-hypercube point.
#[pyfunction]
fn sample_snowpack<'py>(py: Python<'py>, u: PyReadonlyArray1<'py, f64>) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let params = snowpack_parameters(checked_slice(&u, 4, "u")?).map_err(value_error)?;
    Ok(PyArray1::from_vec(py, params.to_vec()))
}

/// Parameters of a snow-coupled model (`ccf_gr4j`, `ccf_hbv`), depths in metres.
#[pyfunction]
fn sample_ccf_parameters<'py>(
    py: Python<'py>,
    name: &str,
    u: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let kind = ccf_kind(name)?;
    let params = ccf_hypercube_to_parameters(kind, contiguous_slice(&u)?).map_err(value_error)?;
    Ok(PyArray1::from_vec(py, params))
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "sampling")?;
    m.add_function(wrap_pyfunction!(sample_parameters, &m)?)?;
    m.add_function(wrap_pyfunction!(sample_snowpack, &m)?)?;
    m.add_function(wrap_pyfunction!(sample_ccf_parameters, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}

