//! Closed-form energy, field and curvature kernels of the individual interaction terms.
//!
//! Fields are `-∂E/∂m`. Curvature blocks are `∂²E/∂m_i∂m_j` for the ordered pair of
//! sites a kernel is called with; the mirrored block is its transpose.

use nalgebra::{Matrix3, Vector3};

#[inline]
pub fn zeeman_energy(mu_s: f64, magnitude: f64, normal: &Vector3<f64>, m: &Vector3<f64>) -> f64 {
    -mu_s * magnitude * m.dot(normal)
}

#[inline]
pub fn zeeman_field(mu_s: f64, magnitude: f64, normal: &Vector3<f64>) -> Vector3<f64> {
    normal * (mu_s * magnitude)
}

#[inline]
pub fn anisotropy_energy(magnitude: f64, axis: &Vector3<f64>, m: &Vector3<f64>) -> f64 {
    -magnitude * m.dot(axis).powi(2)
}

#[inline]
pub fn anisotropy_field(magnitude: f64, axis: &Vector3<f64>, m: &Vector3<f64>) -> Vector3<f64> {
    axis * (2.0 * magnitude * m.dot(axis))
}

#[inline]
pub fn anisotropy_hessian(magnitude: f64, axis: &Vector3<f64>) -> Matrix3<f64> {
    axis * axis.transpose() * (-2.0 * magnitude)
}

#[inline]
pub fn exchange_energy(magnitude: f64, mi: &Vector3<f64>, mj: &Vector3<f64>) -> f64 {
    -magnitude * mi.dot(mj)
}

#[inline]
pub fn exchange_hessian(magnitude: f64) -> Matrix3<f64> {
    Matrix3::identity() * -magnitude
}

#[inline]
pub fn dmi_energy(
    magnitude: f64,
    normal: &Vector3<f64>,
    mi: &Vector3<f64>,
    mj: &Vector3<f64>,
) -> f64 {
    -magnitude * normal.dot(&mi.cross(mj))
}

/// DMI fields on `(i, j)`: `D (m_j × n)` and `D (n × m_i)`.
#[inline]
pub fn dmi_fields(
    magnitude: f64,
    normal: &Vector3<f64>,
    mi: &Vector3<f64>,
    mj: &Vector3<f64>,
) -> (Vector3<f64>, Vector3<f64>) {
    (mj.cross(normal) * magnitude, normal.cross(mi) * magnitude)
}

#[inline]
pub fn dmi_hessian(magnitude: f64, normal: &Vector3<f64>) -> Matrix3<f64> {
    normal.cross_matrix() * magnitude
}

/// Dipole-dipole energy of a pair; `coupling` already contains `μ_i μ_j μ0 / (4π r³)`.
#[inline]
pub fn ddi_energy(
    coupling: f64,
    normal: &Vector3<f64>,
    mi: &Vector3<f64>,
    mj: &Vector3<f64>,
) -> f64 {
    -coupling * (3.0 * mi.dot(normal) * mj.dot(normal) - mi.dot(mj))
}

/// Dipolar field exerted on a moment by its partner `m_other`.
#[inline]
pub fn ddi_field(coupling: f64, normal: &Vector3<f64>, m_other: &Vector3<f64>) -> Vector3<f64> {
    (normal * (3.0 * m_other.dot(normal)) - m_other) * coupling
}

#[inline]
pub fn ddi_hessian(coupling: f64, normal: &Vector3<f64>) -> Matrix3<f64> {
    (normal * normal.transpose() * 3.0 - Matrix3::identity()) * -coupling
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    fn unit(x: f64, y: f64, z: f64) -> Vector3<f64> {
        Vector3::new(x, y, z).normalize()
    }

    #[test]
    fn zeeman_energy_is_minimal_along_field() {
        let e_parallel = zeeman_energy(2.0, 1.5, &Vector3::z(), &Vector3::z());
        let e_anti = zeeman_energy(2.0, 1.5, &Vector3::z(), &-Vector3::z());
        assert!(f64_approx_equal(e_parallel, -3.0));
        assert!(f64_approx_equal(e_anti, 3.0));
    }

    #[test]
    fn anisotropy_energy_is_degenerate_under_reversal() {
        let axis = Vector3::z();
        let up = anisotropy_energy(0.5, &axis, &Vector3::z());
        let down = anisotropy_energy(0.5, &axis, &-Vector3::z());
        assert!(f64_approx_equal(up, -0.5));
        assert!(f64_approx_equal(up, down));
        assert!(f64_approx_equal(anisotropy_energy(0.5, &axis, &Vector3::x()), 0.0));
    }

    #[test]
    fn exchange_energy_favours_parallel_alignment_for_positive_coupling() {
        let e_parallel = exchange_energy(1.0, &Vector3::x(), &Vector3::x());
        let e_anti = exchange_energy(1.0, &Vector3::x(), &-Vector3::x());
        assert!(e_parallel < e_anti);
    }

    #[test]
    fn dmi_energy_changes_sign_with_handedness() {
        let n = Vector3::z();
        let left = dmi_energy(1.0, &n, &Vector3::x(), &Vector3::y());
        let right = dmi_energy(1.0, &n, &Vector3::y(), &Vector3::x());
        assert!(f64_approx_equal(left, -1.0));
        assert!(f64_approx_equal(right, 1.0));
    }

    #[test]
    fn dmi_fields_are_negative_gradients() {
        let n = unit(0.3, -0.2, 0.9);
        let mi = unit(1.0, 0.4, -0.2);
        let mj = unit(-0.3, 0.8, 0.5);
        let (hi, hj) = dmi_fields(0.7, &n, &mi, &mj);
        let h = 1e-6;
        for a in 0..3 {
            let mut step = Vector3::zeros();
            step[a] = h;
            let di = (dmi_energy(0.7, &n, &(mi + step), &mj)
                - dmi_energy(0.7, &n, &(mi - step), &mj))
                / (2.0 * h);
            let dj = (dmi_energy(0.7, &n, &mi, &(mj + step))
                - dmi_energy(0.7, &n, &mi, &(mj - step)))
                / (2.0 * h);
            assert!((hi[a] + di).abs() < 1e-6);
            assert!((hj[a] + dj).abs() < 1e-6);
        }
    }

    #[test]
    fn dmi_hessian_block_is_mixed_second_derivative() {
        let n = unit(0.1, 0.5, -0.7);
        let block = dmi_hessian(1.3, &n);
        for b in 0..3 {
            for c in 0..3 {
                let mut ei = Vector3::zeros();
                let mut ej = Vector3::zeros();
                ei[b] = 1.0;
                ej[c] = 1.0;
                // The energy is bilinear, so the mixed derivative is E(e_b, e_c).
                let expected = dmi_energy(1.3, &n, &ei, &ej);
                assert!(f64_approx_equal(block[(b, c)], expected));
            }
        }
    }

    #[test]
    fn ddi_energy_prefers_head_to_tail_alignment() {
        let n = Vector3::x();
        let head_to_tail = ddi_energy(1.0, &n, &Vector3::x(), &Vector3::x());
        let side_by_side = ddi_energy(1.0, &n, &Vector3::z(), &Vector3::z());
        assert!(f64_approx_equal(head_to_tail, -2.0));
        assert!(f64_approx_equal(side_by_side, 1.0));
    }

    #[test]
    fn ddi_field_is_negative_gradient() {
        let n = unit(0.2, 0.4, 0.8);
        let mi = unit(0.5, -0.1, 0.3);
        let mj = unit(-0.6, 0.2, 0.9);
        let field = ddi_field(0.3, &n, &mj);
        let h = 1e-6;
        for a in 0..3 {
            let mut step = Vector3::zeros();
            step[a] = h;
            let d = (ddi_energy(0.3, &n, &(mi + step), &mj)
                - ddi_energy(0.3, &n, &(mi - step), &mj))
                / (2.0 * h);
            assert!((field[a] + d).abs() < 1e-6);
        }
    }

    #[test]
    fn anisotropy_field_and_hessian_match_energy_derivatives() {
        let axis = unit(0.0, 0.6, 0.8);
        let m = unit(0.3, 0.3, 0.9);
        let field = anisotropy_field(0.4, &axis, &m);
        let hessian = anisotropy_hessian(0.4, &axis);
        // The energy is quadratic: -∂E/∂m = -H m.
        let expected = -(hessian * m);
        for a in 0..3 {
            assert!(f64_approx_equal(field[a], expected[a]));
        }
    }
}
