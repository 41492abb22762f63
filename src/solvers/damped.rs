use nalgebra::{DMatrix, DVector};

use super::{limit_max_angle, DeltaTheta};
use crate::config::SolverConfig;

/// Damped least squares: solve `(JJᵗ + λ²I) y = e`, then `Δθ = Jᵗy`.
///
/// The damped system is symmetric positive definite for `λ > 0` and is
/// factored with Cholesky; LU is the fallback for `λ = 0`.
pub fn dls(jacobian: &DMatrix<f64>, error: &DVector<f64>, config: &SolverConfig) -> DeltaTheta {
    let m = jacobian.nrows();
    let lambda_sq = config.dls_lambda * config.dls_lambda;
    let damped = jacobian * jacobian.transpose() + DMatrix::identity(m, m) * lambda_sq;

    let y = match damped.clone().cholesky() {
        Some(chol) => Some(chol.solve(error)),
        None => damped.lu().solve(error),
    };
    let Some(y) = y.filter(|y| y.iter().all(|v| v.is_finite())) else {
        tracing::warn!(lambda = config.dls_lambda, "damped system is singular, returning a zero step");
        return DeltaTheta::unsolved(jacobian.ncols());
    };

    let mut delta = jacobian.tr_mul(&y);
    limit_max_angle(&mut delta, config.max_angle_dls);
    DeltaTheta::new(delta)
}
