use nalgebra::{DMatrix, DVector};

use super::{limit_max_angle, DeltaTheta};
use crate::config::SolverConfig;

/// Thin SVD `J = U Σ Vᵗ` of a task Jacobian.
pub(super) struct Decomposition {
    pub u: DMatrix<f64>,
    pub sigma: DVector<f64>,
    pub v_t: DMatrix<f64>,
}

impl Decomposition {
    /// `None` when the iteration does not converge within `max_iterations`.
    pub fn of(jacobian: &DMatrix<f64>, max_iterations: usize) -> Option<Self> {
        let svd = jacobian
            .clone()
            .try_svd(true, true, f64::EPSILON, max_iterations)?;
        Some(Self {
            u: svd.u?,
            sigma: svd.singular_values,
            v_t: svd.v_t?,
        })
    }

    /// `Σ_i w(σ_i) ⟨u_i, e⟩ v_i` over the singular triples `w` accepts.
    pub fn weighted_solve(&self, error: &DVector<f64>, weight: impl Fn(f64) -> Option<f64>) -> DVector<f64> {
        let mut delta = DVector::zeros(self.v_t.ncols());
        for (i, sigma) in self.sigma.iter().enumerate() {
            let Some(w) = weight(*sigma) else {
                continue;
            };
            let coefficient = w * self.u.column(i).dot(error);
            delta += self.v_t.row(i).transpose() * coefficient;
        }
        delta
    }

    pub fn max_singular_value(&self) -> f64 {
        self.sigma.iter().fold(0.0, |acc, s| acc.max(s.abs()))
    }
}

pub(super) fn decompose_or_warn(jacobian: &DMatrix<f64>, config: &SolverConfig) -> Option<Decomposition> {
    let svd = Decomposition::of(jacobian, config.svd_max_iterations);
    if svd.is_none() {
        tracing::warn!(
            rows = jacobian.nrows(),
            cols = jacobian.ncols(),
            max_iterations = config.svd_max_iterations,
            "svd did not converge, returning a zero step"
        );
    }
    svd
}

/// Damped least squares through the SVD: `Δθ = Σ σ_i/(σ_i² + λ²) ⟨u_i,e⟩ v_i`.
pub fn dls_svd(jacobian: &DMatrix<f64>, error: &DVector<f64>, config: &SolverConfig) -> DeltaTheta {
    let Some(svd) = decompose_or_warn(jacobian, config) else {
        return DeltaTheta::unsolved(jacobian.ncols());
    };
    let lambda_sq = config.dls_lambda * config.dls_lambda;
    let mut delta = svd.weighted_solve(error, |sigma| {
        let denom = sigma * sigma + lambda_sq;
        (denom > 0.0).then(|| sigma / denom)
    });
    limit_max_angle(&mut delta, config.max_angle_dls);
    DeltaTheta::new(delta)
}

/// Moore-Penrose pseudoinverse applied to `e`.
///
/// Singular values at or below `pinv_threshold * σ_max` are treated as zero,
/// so an all-zero Jacobian yields a zero step.
pub fn pseudo_inverse(jacobian: &DMatrix<f64>, error: &DVector<f64>, config: &SolverConfig) -> DeltaTheta {
    let Some(svd) = decompose_or_warn(jacobian, config) else {
        return DeltaTheta::unsolved(jacobian.ncols());
    };
    let cutoff = config.pinv_threshold * svd.max_singular_value();
    let mut delta = svd.weighted_solve(error, |sigma| {
        (sigma.abs() > cutoff && sigma != 0.0).then(|| sigma.recip())
    });
    limit_max_angle(&mut delta, config.max_angle_pseudo_inverse);
    DeltaTheta::new(delta)
}
