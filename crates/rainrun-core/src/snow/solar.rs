//! Daily radiation from site latitude and air temperature range.
//!
//! Extraterrestrial radiation follows FAO-56 (Allen et al., 1998, eq. 21).
//! Global radiation uses the Bristow-Campbell (1984) transmissivity curve.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ConstructionError;
use crate::validate;

/// Solar constant [MJ/m²/min].
const SOLAR_CONSTANT: f64 = 0.0820;

/// Bristow-Campbell coefficients, fitted for the default site.
pub const BC_A: f64 = 1.0;
pub const BC_B: f64 = 0.060639679562861176;
pub const BC_C: f64 = 0.8972864886528819;

/// A location on a horizontal surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub latitude_deg: f64,
}

impl Site {
    pub fn new(latitude_deg: f64) -> Result<Self, ConstructionError> {
        validate::range("latitude_deg", latitude_deg, -90.0, 90.0)?;
        Ok(Self { latitude_deg })
    }

    /// Extraterrestrial radiation on day `doy` (1-366) [MJ/m²/d].
    pub fn extraterrestrial(&self, doy: u32) -> f64 {
        let phi = self.latitude_deg.to_radians();
        let (dr, delta) = earth_sun(doy);
        let ws = (-phi.tan() * delta.tan()).clamp(-1.0, 1.0).acos();
        let ra = 24.0 * 60.0 / PI
            * SOLAR_CONSTANT
            * dr
            * (ws * phi.sin() * delta.sin() + phi.cos() * delta.cos() * ws.sin());
        ra.max(0.0)
    }

    /// Global radiation reaching the ground [MJ/m²/d].
    pub fn global(&self, doy: u32, tmax: f64, tmin: f64) -> f64 {
        self.extraterrestrial(doy) * transmissivity(tmax - tmin)
    }
}

/// Inverse relative Earth-Sun distance and solar declination [rad].
///
/// Returns (dr, delta).
fn earth_sun(doy: u32) -> (f64, f64) {
    let angle = 2.0 * PI * f64::from(doy) / 365.0;
    let dr = 1.0 + 0.033 * angle.cos();
    let delta = 0.409 * (angle - 1.39).sin();
    (dr, delta)
}

/// Bristow-Campbell atmospheric transmissivity from the diurnal range [°C].
pub fn transmissivity(range: f64) -> f64 {
    if range <= 0.0 {
        return 0.0;
    }
    BC_A * (1.0 - (-BC_B * range.powf(BC_C)).exp())
}
