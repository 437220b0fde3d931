use std::fmt::Display;

use numpy::PyReadonlyArray1;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use rainrun_core::snow::CcfKind;
use rainrun_core::{ModelKind, Resolution};

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice()
        .map_err(|_| PyValueError::new_err("array must be C-contiguous"))
}

/// Validate length + contiguity of a numpy array.
pub fn checked_slice<'py>(
    arr: &'py PyReadonlyArray1<'py, f64>,
    expected_len: usize,
    name: &str,
) -> PyResult<&'py [f64]> {
    let slice = contiguous_slice(arr)?;
    if slice.len() != expected_len {
        return Err(PyValueError::new_err(format!(
            "{} must have {} elements, got {}",
            name,
            expected_len,
            slice.len()
        )));
    }
    Ok(slice)
}

/// Any core error becomes a `ValueError` carrying its message.
pub fn value_error<E: Display>(err: E) -> PyErr {
    PyValueError::new_err(err.to_string())
}

pub fn model_kind(name: &str) -> PyResult<ModelKind> {
    name.parse().map_err(value_error)
}

pub fn ccf_kind(name: &str) -> PyResult<CcfKind> {
    name.parse().map_err(value_error)
}

pub fn resolution(name: &str) -> PyResult<Resolution> {
    match name.trim().to_ascii_lowercase().as_str() {
        "hourly" => Ok(Resolution::Hourly),
        "daily" => Ok(Resolution::Daily),
        "monthly" => Ok(Resolution::Monthly),
        "annual" => Ok(Resolution::Annual),
        other => Err(PyValueError::new_err(format!("unknown resolution '{}'", other))),
    }
}
