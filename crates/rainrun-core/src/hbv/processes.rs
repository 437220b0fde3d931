//! HBV soil moisture and response routine functions.

/// Share of `p` passed to the upper zone: `p × (sm / fc)^beta`.
pub fn infiltration_excess(p: f64, sm: f64, fc: f64, beta: f64) -> f64 {
    if p <= 0.0 {
        return 0.0;
    }
    p * (sm / fc).powf(beta)
}

/// Actual ET from soil moisture, at the potential rate above `lp × fc`.
///
/// Limited by available soil moisture.
pub fn soil_evaporation(sm: f64, fc: f64, lp: f64, pet: f64) -> f64 {
    let threshold = lp * fc;
    let ratio = if threshold > 0.0 { (sm / threshold).min(1.0) } else { 1.0 };
    (ratio * pet).min(sm).max(0.0)
}

/// Fast flow above `uzl`, then slow flow from what remains.
///
/// Returns (q0, q1).
pub fn upper_zone_outflows(suz: f64, k0: f64, k1: f64, uzl: f64) -> (f64, f64) {
    let q0 = (k0 * (suz - uzl)).max(0.0);
    let q1 = k1 * (suz - q0);
    (q0, q1)
}

/// Percolation limited by the upper zone storage.
pub fn percolation(suz: f64, perc_max: f64) -> f64 {
    perc_max.min(suz.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -- Soil moisture --

    #[test]
    fn linear_infiltration_half_full() {
        assert_relative_eq!(infiltration_excess(10.0, 50.0, 100.0, 1.0), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_soil_keeps_everything() {
        assert_eq!(infiltration_excess(10.0, 0.0, 100.0, 2.0), 0.0);
    }

    #[test]
    fn et_at_potential_above_lp() {
        assert_relative_eq!(soil_evaporation(80.0, 100.0, 0.7, 3.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn et_reduced_below_lp() {
        assert_relative_eq!(soil_evaporation(35.0, 100.0, 0.7, 3.0), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn et_capped_by_storage() {
        assert_relative_eq!(soil_evaporation(0.5, 100.0, 0.0, 3.0), 0.5, epsilon = 1e-12);
    }

    // -- Response routine --

    #[test]
    fn fast_flow_above_threshold() {
        let (q0, q1) = upper_zone_outflows(50.0, 0.4, 0.1, 20.0);
        assert_relative_eq!(q0, 12.0, epsilon = 1e-12);
        assert_relative_eq!(q1, 3.8, epsilon = 1e-12);
    }

    #[test]
    fn no_fast_flow_below_threshold() {
        let (q0, q1) = upper_zone_outflows(15.0, 0.4, 0.1, 20.0);
        assert_eq!(q0, 0.0);
        assert_relative_eq!(q1, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn percolation_limits() {
        assert_eq!(percolation(100.0, 2.0), 2.0);
        assert_eq!(percolation(1.0, 2.0), 1.0);
        assert_eq!(percolation(-5.0, 2.0), 0.0);
    }
}
