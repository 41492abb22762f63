use nalgebra::{DMatrix, DVector};

use super::{limit_max_angle, DeltaTheta};
use crate::config::{SolverConfig, TransposeScaling};

/// Jacobian transpose: `Δθ = Jᵗe`.
///
/// With [`TransposeScaling::Greedy`] the step is rescaled by
/// `α = ⟨e, JJᵗe⟩ / ‖JJᵗe‖²`, the length along `Jᵗe` that best reproduces
/// `e` to first order.
pub fn transpose(jacobian: &DMatrix<f64>, error: &DVector<f64>, config: &SolverConfig) -> DeltaTheta {
    let mut delta = jacobian.tr_mul(error);

    if config.transpose_scaling == TransposeScaling::Greedy {
        let response = jacobian * &delta;
        let response_sq = response.norm_squared();
        let alpha = error.dot(&response) / response_sq;
        if response_sq > 0.0 && alpha.is_finite() {
            delta *= alpha;
        } else {
            delta.fill(0.0);
        }
    }

    limit_max_angle(&mut delta, config.max_angle_transpose);
    DeltaTheta::new(delta)
}
