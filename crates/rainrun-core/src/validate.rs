//! Range checks shared by every model configuration.
//!
//! Each check rejects NaN as well, since a NaN never lies inside a range.

use crate::error::ConstructionError;

pub(crate) fn range(name: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ConstructionError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ConstructionError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn fraction(name: &'static str, value: f64) -> Result<f64, ConstructionError> {
    range(name, value, 0.0, 1.0)
}

pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<f64, ConstructionError> {
    range(name, value, 0.0, f64::INFINITY)
}

pub(crate) fn positive(name: &'static str, value: f64) -> Result<f64, ConstructionError> {
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConstructionError::OutOfRange {
            name,
            value,
            min: f64::MIN_POSITIVE,
            max: f64::INFINITY,
        })
    }
}

pub(crate) fn finite(name: &'static str, value: f64) -> Result<f64, ConstructionError> {
    range(name, value, f64::MIN, f64::MAX)
}

pub(crate) fn count(model: &'static str, params: &[f64], min: usize, max: usize) -> Result<(), ConstructionError> {
    if (min..=max).contains(&params.len()) {
        Ok(())
    } else {
        Err(ConstructionError::ParameterCount {
            model,
            min,
            max,
            got: params.len(),
        })
    }
}
