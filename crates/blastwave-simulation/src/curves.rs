//! Hermite float curves and the empirical blast curves
//!
//! Overpressure and positive impulse follow the Kinney & Graham (1985)
//! closed-form fits as functions of scaled distance `z = R / W^(1/3)`
//! (metres per cube-root kilogram of TNT). Both are sampled into cubic
//! Hermite splines using their analytic derivatives as tangents.

use serde::{Deserialize, Serialize};

/// Upper end of the sampled scaled-distance domain
const MAX_SCALED_DISTANCE: f64 = 1000.0;

/// A single keyframe of a [`FloatCurve`]
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub time: f64,
    pub value: f64,
    pub in_tangent: f64,
    pub out_tangent: f64,
}

/// Piecewise cubic Hermite spline over ordered keyframes
///
/// Arguments before the first key or after the last key clamp to the
/// respective end value. An empty curve evaluates to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FloatCurve {
    keys: Vec<CurveKey>,
}

impl FloatCurve {
    pub fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Insert a keyframe, keeping keys ordered by time
    pub fn add(&mut self, time: f64, value: f64, in_tangent: f64, out_tangent: f64) {
        let idx = self.keys.partition_point(|k| k.time < time);
        self.keys.insert(
            idx,
            CurveKey {
                time,
                value,
                in_tangent,
                out_tangent,
            },
        );
    }

    /// Build a curve from `(time, value)` points, deriving smooth tangents
    /// from the neighbouring points
    pub fn from_points(points: &[(f64, f64)]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut curve = Self::new();
        for (i, &(time, value)) in sorted.iter().enumerate() {
            let tangent = smooth_tangent(&sorted, i);
            curve.add(time, value, tangent, tangent);
        }
        curve
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn evaluate(&self, time: f64) -> f64 {
        let (first, last) = match (self.keys.first(), self.keys.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        if time <= first.time {
            return first.value;
        }
        if time >= last.time {
            return last.value;
        }

        // First key strictly after `time`; the bracketing segment ends there
        let hi = self.keys.partition_point(|k| k.time <= time);
        let k0 = &self.keys[hi - 1];
        let k1 = &self.keys[hi];

        let dt = k1.time - k0.time;
        if dt <= 0.0 {
            return k1.value;
        }

        let s = (time - k0.time) / dt;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * k0.value + h10 * dt * k0.out_tangent + h01 * k1.value + h11 * dt * k1.in_tangent
    }
}

/// Central difference on interior points, one-sided at the ends
fn smooth_tangent(points: &[(f64, f64)], i: usize) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let (lo, hi) = if i == 0 {
        (0, 1)
    } else if i == points.len() - 1 {
        (i - 1, i)
    } else {
        (i - 1, i + 1)
    };
    let dx = points[hi].0 - points[lo].0;
    if dx.abs() < f64::EPSILON {
        0.0
    } else {
        (points[hi].1 - points[lo].1) / dx
    }
}

/// Sample points over (0, 1000], refining by one decade below each power of ten
///
/// Produces `k * 10^e` for `e` in -5..=2 and `k` in 1..=9, followed by 1000.
pub fn scaled_distance_samples() -> Vec<f64> {
    let mut samples = Vec::with_capacity(8 * 9 + 1);
    for exponent in -5..=2 {
        let step = 10f64.powi(exponent);
        for k in 1..=9 {
            samples.push(k as f64 * step);
        }
    }
    samples.push(MAX_SCALED_DISTANCE);
    samples
}

/// Peak overpressure ratio (overpressure / ambient pressure) and its derivative
fn overpressure_ratio(z: f64) -> (f64, f64) {
    const A: f64 = 1.0 / (4.5 * 4.5);
    const B: [f64; 3] = [1.0 / (0.048 * 0.048), 1.0 / (0.32 * 0.32), 1.0 / (1.35 * 1.35)];

    let z2 = z * z;
    let numerator = 1.0 + A * z2;
    let denominator: f64 = B.iter().map(|b| 1.0 + b * z2).product();
    let value = 808.0 * numerator / denominator.sqrt();

    // d/dz ln f
    let log_slope = 2.0 * A * z / numerator - B.iter().map(|b| b * z / (1.0 + b * z2)).sum::<f64>();

    (value, value * log_slope)
}

/// Scaled positive-phase impulse (kPa·s per unit ambient pressure) and its derivative
fn positive_impulse(z: f64) -> (f64, f64) {
    const C: f64 = 1.0 / (0.23 * 0.23 * 0.23 * 0.23);
    const D: f64 = 1.0 / (1.55 * 1.55 * 1.55);

    let z2 = z * z;
    let z3 = z2 * z;
    let z4 = z2 * z2;

    let root = (1.0 + C * z4).sqrt();
    let cube_root = (1.0 + D * z3).cbrt();
    // 0.067 ms converted to seconds
    let value = 0.067e-3 * root / (z2 * cube_root);

    let log_slope = 2.0 * C * z3 / (1.0 + C * z4) - 2.0 / z - D * z2 / (1.0 + D * z3);

    (value, value * log_slope)
}

/// The two empirical blast curves plus their cached zero-distance peaks
#[derive(Clone, Debug)]
pub struct BlastCurves {
    overpressure: FloatCurve,
    impulse: FloatCurve,
    peak_overpressure: f64,
    peak_impulse: f64,
}

impl BlastCurves {
    /// Sample the Kinney-Graham fits over the full scaled-distance domain
    pub fn kinney_graham() -> Self {
        let mut overpressure = FloatCurve::new();
        let mut impulse = FloatCurve::new();

        for z in scaled_distance_samples() {
            let (p, dp) = overpressure_ratio(z);
            overpressure.add(z, p, dp, dp);

            let (i, di) = positive_impulse(z);
            impulse.add(z, i, di, di);
        }

        let peak_overpressure = overpressure.evaluate(0.0);
        let peak_impulse = impulse.evaluate(0.0);

        log::debug!(
            "Built blast curves: {} keys, peak overpressure ratio {:.3}, peak impulse {:.3e}",
            overpressure.keys().len(),
            peak_overpressure,
            peak_impulse
        );

        Self {
            overpressure,
            impulse,
            peak_overpressure,
            peak_impulse,
        }
    }

    /// Overpressure ratio at a scaled distance
    pub fn overpressure(&self, scaled_distance: f64) -> f64 {
        self.overpressure.evaluate(scaled_distance)
    }

    /// Positive impulse per unit ambient pressure at a scaled distance
    pub fn impulse(&self, scaled_distance: f64) -> f64 {
        self.impulse.evaluate(scaled_distance)
    }

    pub fn peak_overpressure(&self) -> f64 {
        self.peak_overpressure
    }

    pub fn peak_impulse(&self) -> f64 {
        self.peak_impulse
    }

    pub fn overpressure_curve(&self) -> &FloatCurve {
        &self.overpressure
    }

    pub fn impulse_curve(&self) -> &FloatCurve {
        &self.impulse
    }
}

impl Default for BlastCurves {
    fn default() -> Self {
        Self::kinney_graham()
    }
}
