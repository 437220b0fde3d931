/// Impulse-response routing buffers.
///
/// A buffer spreads each generated pulse over the current and following
/// timesteps. Ordinates are increments of a cumulative response curve
/// evaluated at integer offsets, so they sum to one and routing conserves mass.
use serde::{Deserialize, Serialize};

use crate::error::NumericalInconsistency;

/// Exponent of the GR4J S-curves.
const S_CURVE_EXPONENT: f64 = 2.5;

/// Longest response a buffer may hold, in timesteps.
pub const MAX_ORDINATES: usize = 10_000;

/// Unit-hydrograph family of a GR4J buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HydrographShape {
    /// Rises to one over `[0, x4]`.
    Single,
    /// Rises to one over `[0, 2·x4]`, inflecting at `x4`.
    Dual,
}

impl HydrographShape {
    fn time_base(self, x4: f64) -> f64 {
        match self {
            HydrographShape::Single => x4,
            HydrographShape::Dual => 2.0 * x4,
        }
    }

    /// Cumulative response at time `t`.
    fn s_curve(self, t: f64, x4: f64) -> f64 {
        match self {
            HydrographShape::Single => {
                if t <= 0.0 {
                    0.0
                } else if t < x4 {
                    (t / x4).powf(S_CURVE_EXPONENT)
                } else {
                    1.0
                }
            }
            HydrographShape::Dual => {
                if t <= 0.0 {
                    0.0
                } else if t < x4 {
                    0.5 * (t / x4).powf(S_CURVE_EXPONENT)
                } else if t < 2.0 * x4 {
                    1.0 - 0.5 * (2.0 - t / x4).powf(S_CURVE_EXPONENT)
                } else {
                    1.0
                }
            }
        }
    }
}

/// Number of future timesteps held for a time base `tb`: `floor(tb)`, less
/// one when `tb` is an exact integer. `None` below zero or at `MAX_ORDINATES`
/// and beyond.
fn pending_len(time_base: f64) -> Option<usize> {
    if !time_base.is_finite() {
        return None;
    }
    let whole = time_base.floor();
    let n = if time_base == whole { whole - 1.0 } else { whole };
    if n < 0.0 || n >= MAX_ORDINATES as f64 {
        None
    } else {
        Some(n as usize)
    }
}

/// Cumulative triangular response with base `maxbas` and peak at `maxbas / 2`.
fn triangle_cdf(t: f64, maxbas: f64) -> f64 {
    let half = maxbas / 2.0;
    if t <= 0.0 {
        0.0
    } else if t <= half {
        2.0 * t * t / (maxbas * maxbas)
    } else if t < maxbas {
        let r = maxbas - t;
        1.0 - 2.0 * r * r / (maxbas * maxbas)
    } else {
        1.0
    }
}

/// Triangular transfer-function weights over `ceil(maxbas)` steps, normalised
/// to sum to one. At most `MAX_ORDINATES` weights are produced.
pub fn triangular_weights(maxbas: f64) -> Vec<f64> {
    if maxbas.is_nan() || maxbas <= 1.0 {
        return vec![1.0];
    }
    let n = maxbas.min(MAX_ORDINATES as f64).ceil() as usize;
    let mut weights: Vec<f64> = (0..n)
        .map(|i| triangle_cdf((i + 1) as f64, maxbas) - triangle_cdf(i as f64, maxbas))
        .collect();

    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in &mut weights {
            *w /= total;
        }
    } else {
        weights = vec![1.0];
    }
    weights
}

/// Convolution state: one ordinate per offset and one accumulator per future step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingBuffer {
    ordinates: Vec<f64>,
    pending: Vec<f64>,
}

impl RoutingBuffer {
    /// GR4J unit hydrograph for time parameter `x4`.
    pub fn unit_hydrograph(x4: f64, shape: HydrographShape) -> Result<Self, NumericalInconsistency> {
        let time_base = shape.time_base(x4);
        let n = pending_len(time_base)
            .ok_or_else(|| NumericalInconsistency::new("routing", "unit hydrograph has no ordinates"))?;
        let ordinates = (1..=n + 1)
            .map(|k| {
                let t = k as f64;
                shape.s_curve(t, x4) - shape.s_curve(t - 1.0, x4)
            })
            .collect();
        Ok(Self {
            ordinates,
            pending: vec![0.0; n],
        })
    }

    /// HBV triangular transfer function with base `maxbas` timesteps.
    pub fn triangular(maxbas: f64) -> Self {
        Self::from_ordinates(triangular_weights(maxbas))
    }

    /// Buffer with explicit ordinates; an empty set routes everything immediately.
    pub fn from_ordinates(ordinates: Vec<f64>) -> Self {
        let ordinates = if ordinates.is_empty() { vec![1.0] } else { ordinates };
        let pending = vec![0.0; ordinates.len() - 1];
        Self { ordinates, pending }
    }

    /// Add `pulse` and release this step's routed flow.
    pub fn route(&mut self, pulse: f64) -> f64 {
        let n = self.pending.len();
        let out = self.pending.first().copied().unwrap_or(0.0) + self.ordinates[0] * pulse;
        for k in 0..n {
            let carried = if k + 1 < n { self.pending[k + 1] } else { 0.0 };
            self.pending[k] = carried + self.ordinates[k + 1] * pulse;
        }
        out
    }

    /// Number of future timesteps held.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn ordinates(&self) -> &[f64] {
        &self.ordinates
    }

    /// Water already routed but not yet released.
    pub fn in_flight(&self) -> f64 {
        self.pending.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -- Sizing --

    #[test]
    fn exact_integer_time_base_drops_one() {
        let single = RoutingBuffer::unit_hydrograph(1.5, HydrographShape::Single).unwrap();
        let dual = RoutingBuffer::unit_hydrograph(1.5, HydrographShape::Dual).unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(dual.len(), 2);
    }

    #[test]
    fn integer_x4_sizes() {
        let single = RoutingBuffer::unit_hydrograph(3.0, HydrographShape::Single).unwrap();
        assert_eq!(single.len(), 2);
        let single = RoutingBuffer::unit_hydrograph(3.2, HydrographShape::Single).unwrap();
        assert_eq!(single.len(), 3);
    }

    #[test]
    fn zero_time_base_underflows() {
        assert!(RoutingBuffer::unit_hydrograph(0.0, HydrographShape::Single).is_err());
        assert!(RoutingBuffer::unit_hydrograph(f64::NAN, HydrographShape::Dual).is_err());
    }

    #[test]
    fn oversized_time_base_is_an_error() {
        for x4 in [MAX_ORDINATES as f64 + 0.5, 1e12, 1e300, f64::INFINITY] {
            assert!(RoutingBuffer::unit_hydrograph(x4, HydrographShape::Single).is_err());
            assert!(RoutingBuffer::unit_hydrograph(x4, HydrographShape::Dual).is_err());
        }
        let longest = RoutingBuffer::unit_hydrograph(MAX_ORDINATES as f64, HydrographShape::Single).unwrap();
        assert_eq!(longest.len(), MAX_ORDINATES - 1);
    }

    #[test]
    fn triangular_weights_are_capped() {
        assert_eq!(triangular_weights(1e300).len(), MAX_ORDINATES);
    }

    // -- Ordinates --

    #[test]
    fn ordinates_sum_to_one() {
        for x4 in [0.5, 1.0, 1.7, 2.0, 4.3] {
            for shape in [HydrographShape::Single, HydrographShape::Dual] {
                let uh = RoutingBuffer::unit_hydrograph(x4, shape).unwrap();
                let sum: f64 = uh.ordinates().iter().sum();
                assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
                assert!(uh.ordinates().iter().all(|&o| o >= 0.0));
            }
        }
    }

    #[test]
    fn dual_curve_half_at_x4() {
        assert_relative_eq!(HydrographShape::Dual.s_curve(1.7, 1.7), 0.5, epsilon = 1e-12);
        assert_relative_eq!(HydrographShape::Single.s_curve(1.7, 1.7), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn triangular_weights_sum_and_length() {
        for maxbas in [0.0, 1.0, 2.0, 2.5, 3.0, 5.5, 7.0] {
            let w = triangular_weights(maxbas);
            assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
            assert_eq!(w.len(), (maxbas.ceil() as usize).max(1));
        }
    }

    #[test]
    fn integer_maxbas_symmetric() {
        let w = triangular_weights(4.0);
        assert_relative_eq!(w[0], w[3], epsilon = 1e-12);
        assert_relative_eq!(w[1], w[2], epsilon = 1e-12);
    }

    // -- Convolution --

    #[test]
    fn route_conserves_mass() {
        let mut uh = RoutingBuffer::unit_hydrograph(2.6, HydrographShape::Dual).unwrap();
        let mut out = uh.route(100.0);
        for _ in 0..10 {
            out += uh.route(0.0);
        }
        assert_relative_eq!(out, 100.0, epsilon = 1e-9);
        assert_eq!(uh.in_flight(), 0.0);
    }

    #[test]
    fn first_ordinate_released_same_step() {
        let mut tf = RoutingBuffer::from_ordinates(vec![0.25, 0.5, 0.25]);
        assert_relative_eq!(tf.route(8.0), 2.0, epsilon = 1e-12);
        assert_relative_eq!(tf.in_flight(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(tf.route(0.0), 4.0, epsilon = 1e-12);
        assert_relative_eq!(tf.route(4.0), 2.0 + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn single_ordinate_passes_through() {
        let mut tf = RoutingBuffer::triangular(1.0);
        assert!(tf.is_empty());
        assert_eq!(tf.route(3.5), 3.5);
    }
}
