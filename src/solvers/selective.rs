use nalgebra::{DMatrix, DVector};

use super::svd::decompose_or_warn;
use super::DeltaTheta;
use crate::config::SolverConfig;

/// Singular values below this are treated as exact zeros.
const SIGMA_EPS: f64 = 1.0e-10;

/// Selectively damped least squares (Buss & Kim).
///
/// Each singular triple `(σ_i, u_i, v_i)` contributes its pseudoinverse
/// response `φ_i = ⟨u_i, e⟩/σ_i · v_i`, damped by its own angle budget
/// `γ_i = γ_max · min(1, N_i / M_i)`, where `N_i` sums the 3-row block norms of
/// `u_i` and `M_i` estimates how far the effector would move under `v_i / σ_i`.
pub fn sdls(jacobian: &DMatrix<f64>, error: &DVector<f64>, config: &SolverConfig) -> DeltaTheta {
    let (rows, num_q) = jacobian.shape();
    let Some(svd) = decompose_or_warn(jacobian, config) else {
        return DeltaTheta::unsolved(num_q);
    };
    let blocks = rows / 3;
    let target = clamp_blocks(error, config.sdls_error_clamp);
    let gamma_max = config.sdls_max_angle;

    // ρ_j: summed block norms of joint j's column
    let column_norms: Vec<f64> = (0..num_q)
        .map(|c| {
            (0..blocks)
                .map(|b| jacobian.view((3 * b, c), (3, 1)).norm())
                .sum()
        })
        .collect();

    let mut delta = DVector::zeros(num_q);
    for (i, sigma) in svd.sigma.iter().enumerate() {
        if sigma.abs() < SIGMA_EPS {
            continue;
        }
        let sigma_inv = sigma.recip();
        let u = svd.u.column(i);
        let v = svd.v_t.row(i).transpose();

        let alpha = u.dot(&target);
        let n: f64 = (0..blocks).map(|b| u.rows(3 * b, 3).norm()).sum();
        let m = sigma_inv.abs()
            * v.iter()
                .zip(&column_norms)
                .map(|(v_j, rho)| v_j.abs() * rho)
                .sum::<f64>();
        let gamma = if n < m { gamma_max * n / m } else { gamma_max };

        let phi = v * (alpha * sigma_inv);
        let max = phi.amax();
        delta += phi * (gamma / (gamma + max));
    }

    let max_change = delta.amax();
    if max_change > gamma_max {
        delta *= gamma_max / (gamma_max + max_change);
    }
    DeltaTheta::new(delta)
}

/// Shorten each 3-row block of `error` to at most `limit`.
fn clamp_blocks(error: &DVector<f64>, limit: Option<f64>) -> DVector<f64> {
    let mut clamped = error.clone();
    let Some(limit) = limit else {
        return clamped;
    };
    for b in 0..clamped.len() / 3 {
        let mut block = clamped.rows_mut(3 * b, 3);
        let norm = block.norm();
        if norm > limit {
            block *= limit / norm;
        }
    }
    clamped
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use core::f64::consts::FRAC_PI_4;

    #[test]
    fn test_single_joint_hand_computed() {
        // σ = 1, u = v = 1, N = 1, M = 1 → γ = γ_max, φ = d
        let j = DMatrix::from_row_slice(3, 1, &[1., 0., 0.]);
        let e = DVector::from_vec(vec![0.2, 0., 0.]);
        let step = sdls(&j, &e, &SolverConfig::default());
        let expected = 0.2 * FRAC_PI_4 / (FRAC_PI_4 + 0.2);
        assert_relative_eq!(step.delta[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn test_small_error_tracks_pseudo_inverse() {
        let j = DMatrix::from_row_slice(3, 3, &[1., 0., 0., 0., 2., 0., 0., 0., 0.5]);
        let e = DVector::from_vec(vec![1e-6, -2e-6, 1e-6]);
        let step = sdls(&j, &e, &SolverConfig::default());
        assert_relative_eq!(
            step.delta,
            DVector::from_vec(vec![1e-6, -1e-6, 2e-6]),
            max_relative = 1e-4
        );
    }

    #[test]
    fn test_bounded_near_singularity() {
        // nearly parallel columns: pure pseudoinverse would explode
        let j = DMatrix::from_row_slice(3, 2, &[1., 1., 0., 1e-7, 0., 0.]);
        let e = DVector::from_vec(vec![0., 1., 0.]);
        let step = sdls(&j, &e, &SolverConfig::default());
        assert!(step.delta.iter().all(|v| v.is_finite()));
        assert!(step.delta.amax() <= FRAC_PI_4);
    }

    #[test]
    fn test_zero_jacobian() {
        let j = DMatrix::zeros(6, 3);
        let e = DVector::from_element(6, 1.0);
        let step = sdls(&j, &e, &SolverConfig::default());
        assert!(step.solved);
        assert_abs_diff_eq!(step.delta, DVector::zeros(3));
    }

    #[test]
    fn test_final_step_bounded() {
        let j = DMatrix::from_row_slice(3, 1, &[0.01, 0., 0.]);
        let e = DVector::from_vec(vec![10., 0., 0.]);
        let step = sdls(&j, &e, &SolverConfig::default());
        assert!(step.delta.amax() < FRAC_PI_4);
    }

    #[test]
    fn test_clamp_blocks() {
        let e = DVector::from_vec(vec![3., 4., 0., 0., 0., 0.1]);
        let clamped = clamp_blocks(&e, Some(1.0));
        assert_relative_eq!(
            clamped,
            DVector::from_vec(vec![0.6, 0.8, 0., 0., 0., 0.1]),
            epsilon = 1e-12
        );
        assert_eq!(clamp_blocks(&e, None), e);
    }
}
