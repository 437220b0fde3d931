/// Makkink potential evaporation from global radiation and air temperature.
///
/// `PET = alpha · Δ/(Δ + γ) · Rs/λ + beta`, converted to metres per day.
use serde::{Deserialize, Serialize};

/// Sea-level air pressure [Pa].
pub const STANDARD_PRESSURE: f64 = 101_300.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Makkink {
    pub alpha: f64,
    /// Offset [m/d].
    pub beta: f64,
    /// Air pressure [Pa].
    pub pressure: f64,
}

impl Default for Makkink {
    fn default() -> Self {
        Self {
            alpha: 1.3265625764694242,
            beta: -0.0003664953523919842,
            pressure: STANDARD_PRESSURE,
        }
    }
}

impl Makkink {
    /// Daily PET [m/d] from global radiation [MJ/m²/d] at mean temperature [°C].
    pub fn evaporation(&self, radiation: f64, tmean: f64) -> f64 {
        let slope = saturation_slope(tmean);
        let gamma = psychrometric(self.pressure, tmean);
        let latent = 2.501 - 0.002361 * tmean;
        // MJ/m² over MJ/kg gives kg/m², i.e. mm
        let mm = self.alpha * slope / (slope + gamma) * radiation / latent;
        (mm / 1000.0 + self.beta).max(0.0)
    }
}

/// Slope of the saturation vapour pressure curve [kPa/°C].
fn saturation_slope(t: f64) -> f64 {
    let es = 0.6108 * (17.27 * t / (t + 237.3)).exp();
    4098.0 * es / (t + 237.3).powi(2)
}

/// Psychrometric constant [kPa/°C].
fn psychrometric(pressure: f64, t: f64) -> f64 {
    let latent = 2.501 - 0.002361 * t;
    0.001013 * (pressure / 1000.0) / (0.622 * latent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn slope_at_twenty_degrees() {
        // FAO-56 table 2.4
        assert_relative_eq!(saturation_slope(20.0), 0.145, epsilon = 1e-3);
    }

    #[test]
    fn psychrometric_at_sea_level() {
        assert_relative_eq!(psychrometric(101_300.0, 20.0), 0.067, epsilon = 1e-3);
    }

    #[test]
    fn summer_day_is_a_few_millimetres() {
        let pet = Makkink::default().evaporation(20.0, 20.0);
        assert!(pet > 0.002 && pet < 0.008, "pet {pet}");
    }

    #[test]
    fn never_negative() {
        assert_eq!(Makkink::default().evaporation(0.0, -15.0), 0.0);
    }

    #[test]
    fn warmer_air_evaporates_more() {
        let m = Makkink::default();
        assert!(m.evaporation(15.0, 25.0) > m.evaporation(15.0, 5.0));
    }
}
