use numpy::PyReadonlyArray1;
use pyo3::prelude::*;

use crate::convert::{contiguous_slice, model_kind, value_error};

use rainrun_core::{AnyModel, ModelKind, StepFluxes, StepFluxesSeries};

// ---------------------------------------------------------------------------
// Typed pyclass result objects
// ---------------------------------------------------------------------------

define_series_result! {
    /// Run results with one numpy array per flux.
    pub struct RunResult from StepFluxesSeries {
        actual_et, runoff, recharge,
    }
}

define_step_result! {
    /// Single-timestep flux results.
    pub struct StepResult from StepFluxes {
        actual_et, runoff, recharge,
    }
}

// ---------------------------------------------------------------------------
// Model handle
// ---------------------------------------------------------------------------

/// A stateful model built from a registry name and a positional parameter vector.
#[pyclass(name = "Model")]
pub struct PyModel {
    inner: AnyModel,
}

#[pymethods]
impl PyModel {
    #[new]
    fn new(name: &str, params: PyReadonlyArray1<'_, f64>) -> PyResult<Self> {
        let kind = model_kind(name)?;
        let inner = AnyModel::from_vector(kind, contiguous_slice(&params)?).map_err(value_error)?;
        Ok(Self { inner })
    }

    #[getter]
    fn name(&self) -> &'static str {
        self.inner.kind().name()
    }

    fn parameters(&self) -> Vec<f64> {
        self.inner.to_vector()
    }

    fn update(&mut self, precip: f64, pet: f64) -> PyResult<StepResult> {
        let fluxes = self.inner.update(precip, pet).map_err(value_error)?;
        Ok(StepResult::from_fluxes(&fluxes))
    }

    fn total_storage(&self) -> f64 {
        self.inner.total_storage()
    }

    fn run(
        &mut self,
        py: Python<'_>,
        precip: PyReadonlyArray1<'_, f64>,
        pet: PyReadonlyArray1<'_, f64>,
    ) -> PyResult<RunResult> {
        let series = self
            .inner
            .run(contiguous_slice(&precip)?, contiguous_slice(&pet)?)
            .map_err(value_error)?;
        Ok(RunResult::from_series(py, series))
    }

    fn __repr__(&self) -> String {
        format!("Model('{}', {:?})", self.inner.kind(), self.inner.to_vector())
    }
}

/// Registry names of every model.
#[pyfunction]
fn model_names() -> Vec<&'static str> {
    ModelKind::ALL.iter().map(|k| k.name()).collect()
}

#[pyfunction]
fn parameter_names(name: &str) -> PyResult<Vec<&'static str>> {
    Ok(model_kind(name)?.param_names().to_vec())
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let m = PyModule::new(parent.py(), "models")?;
    m.add_class::<PyModel>()?;
    m.add_class::<RunResult>()?;
    m.add_class::<StepResult>()?;
    m.add_function(wrap_pyfunction!(model_names, &m)?)?;
    m.add_function(wrap_pyfunction!(parameter_names, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
