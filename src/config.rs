use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_dls_lambda() -> f64 {
    0.6
}
const fn default_pinv_threshold() -> f64 {
    0.01
}
fn default_sdls_max_angle() -> f64 {
    45.0 * DEG
}
const fn default_svd_max_iterations() -> usize {
    1000
}

const DEG: f64 = core::f64::consts::PI / 180.0;

/// How the Jacobian-transpose step is scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransposeScaling {
    /// `Δθ = Jᵗe` as is.
    #[default]
    None,
    /// Scale by the step length that best reproduces `e` along `JJᵗe`.
    Greedy,
}

/// Fixed constants used by the delta-theta strategies.
///
/// The `max_angle_*` limits cap the largest joint change of a step (radians).
/// They are off by default; [`SolverConfig::clamped`] turns them all on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Damping λ for both DLS variants.
    #[serde(default = "default_dls_lambda")]
    pub dls_lambda: f64,

    /// Singular values below `pinv_threshold * σ_max` are dropped by the pseudoinverse.
    #[serde(default = "default_pinv_threshold")]
    pub pinv_threshold: f64,

    /// γ_max of selectively damped least squares.
    #[serde(default = "default_sdls_max_angle")]
    pub sdls_max_angle: f64,

    /// Length limit applied to each 3-row block of the task error before SDLS.
    #[serde(default)]
    pub sdls_error_clamp: Option<f64>,

    #[serde(default)]
    pub transpose_scaling: TransposeScaling,

    #[serde(default)]
    pub max_angle_transpose: Option<f64>,

    #[serde(default)]
    pub max_angle_pseudo_inverse: Option<f64>,

    /// Shared by DLS and DLS via SVD.
    #[serde(default)]
    pub max_angle_dls: Option<f64>,

    /// Iteration cap handed to the SVD; 0 means iterate until convergence.
    #[serde(default = "default_svd_max_iterations")]
    pub svd_max_iterations: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            dls_lambda: default_dls_lambda(),
            pinv_threshold: default_pinv_threshold(),
            sdls_max_angle: default_sdls_max_angle(),
            sdls_error_clamp: None,
            transpose_scaling: TransposeScaling::None,
            max_angle_transpose: None,
            max_angle_pseudo_inverse: None,
            max_angle_dls: None,
            svd_max_iterations: default_svd_max_iterations(),
        }
    }
}

impl SolverConfig {
    /// Greedy transpose scaling plus per-method step limits:
    /// 30° transpose, 5° pseudoinverse, 45° DLS.
    pub fn clamped() -> Self {
        Self {
            transpose_scaling: TransposeScaling::Greedy,
            max_angle_transpose: Some(30.0 * DEG),
            max_angle_pseudo_inverse: Some(5.0 * DEG),
            max_angle_dls: Some(45.0 * DEG),
            ..Self::default()
        }
    }

    pub fn with_dls_lambda(mut self, lambda: f64) -> Self {
        self.dls_lambda = lambda;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.dls_lambda.is_finite() && self.dls_lambda >= 0.0) {
            return Err(invalid("dls_lambda", self.dls_lambda, "must be finite and >= 0"));
        }
        if !(self.pinv_threshold > 0.0 && self.pinv_threshold < 1.0) {
            return Err(invalid(
                "pinv_threshold",
                self.pinv_threshold,
                "must lie in (0, 1)",
            ));
        }
        if !(self.sdls_max_angle.is_finite() && self.sdls_max_angle > 0.0) {
            return Err(invalid("sdls_max_angle", self.sdls_max_angle, "must be > 0"));
        }
        let limits = [
            ("sdls_error_clamp", self.sdls_error_clamp),
            ("max_angle_transpose", self.max_angle_transpose),
            ("max_angle_pseudo_inverse", self.max_angle_pseudo_inverse),
            ("max_angle_dls", self.max_angle_dls),
        ];
        for (field, limit) in limits {
            if let Some(v) = limit {
                if !(v.is_finite() && v > 0.0) {
                    return Err(invalid(field, v, "must be > 0 when set"));
                }
            }
        }
        Ok(())
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

fn invalid(field: &'static str, value: f64, rule: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        message: format!("{value} {rule}"),
    }
}
