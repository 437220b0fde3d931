//! GR4J store functions.
//!
//! Pure functions of the current storage and the store's capacity.

/// Split rainfall and PET into net rainfall and net evaporation demand.
///
/// Returns (pn, en).
pub fn net_inputs(precip: f64, pet: f64) -> (f64, f64) {
    if precip >= pet {
        (precip - pet, 0.0)
    } else {
        (0.0, pet - precip)
    }
}

/// Share of net rainfall entering the production store.
pub fn production_infiltration(pn: f64, storage: f64, x1: f64) -> f64 {
    if pn <= 0.0 {
        return 0.0;
    }
    let sf = storage / x1;
    let t = (pn / x1).tanh();
    x1 * (1.0 - sf * sf) * t / (1.0 + sf * t)
}

/// Evaporation from the production store under net demand `en`.
pub fn production_evaporation(en: f64, storage: f64, x1: f64) -> f64 {
    if en <= 0.0 {
        return 0.0;
    }
    let sf = storage / x1;
    let t = (en / x1).tanh();
    storage * (2.0 - sf) * t / (1.0 + (1.0 - sf) * t)
}

/// Percolation leakage from the production store.
pub fn percolation(storage: f64, x1: f64) -> f64 {
    let r = 4.0 * storage / (9.0 * x1);
    storage * (1.0 - (1.0 + r.powi(4)).powf(-0.25))
}

/// Groundwater exchange as a power of the routing store fill.
pub fn groundwater_exchange(routing: f64, x3: f64, x2: f64) -> f64 {
    x2 * (routing / x3).powf(3.5)
}

/// Outflow from the non-linear routing store.
pub fn routing_outflow(routing: f64, x3: f64) -> f64 {
    let r = routing / x3;
    routing * (1.0 - (1.0 + r.powi(4)).powf(-0.25))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -- Net inputs --

    #[test]
    fn net_rainfall_when_wet() {
        assert_eq!(net_inputs(10.0, 3.0), (7.0, 0.0));
    }

    #[test]
    fn net_demand_when_dry() {
        assert_eq!(net_inputs(1.0, 3.0), (0.0, 2.0));
    }

    // -- Production store --

    #[test]
    fn infiltration_bounded_by_net_rainfall() {
        for s in [0.0, 100.0, 250.0, 349.0] {
            let ps = production_infiltration(20.0, s, 350.0);
            assert!(ps >= 0.0 && ps <= 20.0);
        }
    }

    #[test]
    fn full_store_takes_nothing() {
        assert_relative_eq!(production_infiltration(20.0, 350.0, 350.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn evaporation_bounded_by_storage() {
        let es = production_evaporation(1000.0, 50.0, 350.0);
        assert!(es <= 50.0);
        assert_eq!(production_evaporation(5.0, 0.0, 350.0), 0.0);
    }

    #[test]
    fn percolation_small_relative_to_storage() {
        let perc = percolation(200.0, 350.0);
        assert!(perc > 0.0 && perc < 200.0 * 0.05);
    }

    // -- Routing store --

    #[test]
    fn routing_outflow_below_storage() {
        let qr = routing_outflow(90.0, 90.0);
        assert_relative_eq!(qr, 90.0 * (1.0 - 2.0_f64.powf(-0.25)), epsilon = 1e-12);
    }

    #[test]
    fn exchange_sign_follows_x2() {
        assert!(groundwater_exchange(45.0, 90.0, -1.0) < 0.0);
        assert!(groundwater_exchange(45.0, 90.0, 1.0) > 0.0);
        assert_eq!(groundwater_exchange(0.0, 90.0, 1.0), 0.0);
    }
}
