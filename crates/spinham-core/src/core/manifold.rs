//! Helpers for vectors that live on the unit sphere.
//!
//! Spin configurations are interpreted as points on the direct product of `N`
//! unit spheres. The energy models only ever evaluate plain Cartesian derivatives;
//! projecting them into the tangent space is left to the caller, for which
//! [`project_tangential`] is provided.

use nalgebra::Vector3;

const NORM_EPSILON: f64 = 1e-12;
const SERIES_THRESHOLD: f64 = 1e-4;

/// Renormalizes a direction to unit length.
///
/// Returns `None` for zero-length or non-finite input, for which no direction exists.
pub fn normalize_direction(v: &Vector3<f64>) -> Option<Vector3<f64>> {
    if !v.iter().all(|c| c.is_finite()) {
        return None;
    }
    let norm = v.norm();
    if norm < NORM_EPSILON {
        return None;
    }
    Some(v / norm)
}

/// Great-circle (geodesic) distance between two unit vectors, in radians.
#[inline]
pub fn dist_greatcircle(v1: &Vector3<f64>, v2: &Vector3<f64>) -> f64 {
    v1.dot(v2).clamp(-1.0, 1.0).acos()
}

/// Derivative factors of the geodesic distance `θ = acos(x)` used by landscape models.
///
/// For `x = m · c` returns `(θ, g1, g2)` with `g1 = θ / sin θ` and
/// `g2 = d(θ / sin θ)/dx = -(sin θ - θ cos θ) / sin³ θ`. These are the factors that
/// turn derivatives with respect to `θ²/2` into Cartesian derivatives along `c`.
///
/// Near `θ = 0` the series limits `g1 → 1`, `g2 → -1/3` are used. At the antipode the
/// embedding gradient is undefined and both factors are reported as zero.
pub fn geodesic_factors(x: f64) -> (f64, f64, f64) {
    let x = x.clamp(-1.0, 1.0);
    let theta = x.acos();
    let sin_theta = theta.sin();

    if sin_theta < SERIES_THRESHOLD {
        if x > 0.0 {
            let theta2 = theta * theta;
            return (theta, 1.0 + theta2 / 6.0, -1.0 / 3.0 - 2.0 * theta2 / 15.0);
        }
        return (theta, 0.0, 0.0);
    }

    let g1 = theta / sin_theta;
    let g2 = -(sin_theta - theta * x) / sin_theta.powi(3);
    (theta, g1, g2)
}

/// Projects every vector of `field` into the tangent plane of the matching unit spin.
pub fn project_tangential(field: &mut [Vector3<f64>], spins: &[Vector3<f64>]) {
    for (f, m) in field.iter_mut().zip(spins) {
        *f -= m * f.dot(m);
    }
}
