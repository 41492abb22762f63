use nalgebra::DVector;

use crate::config::SolverConfig;
use crate::error::{ConfigError, IkError};
use crate::jacobian::TaskJacobian;
use crate::pose::{pose_error, Pose};
use crate::solvers::{delta_theta, SolveMethod};

/// Everything one differential IK step needs. All inputs are borrowed and
/// left untouched.
#[derive(Debug, Clone)]
pub struct StepRequest<'a> {
    pub target: Pose,
    pub current: Pose,
    pub q_current: &'a [f64],
    /// `3 x num_q`, row-major.
    pub linear_jacobian: &'a [f64],
    /// `3 x num_q`, row-major. May be empty unless the method uses orientation.
    pub angular_jacobian: &'a [f64],
    /// Per-axis gains: linear x, y, z then angular x, y, z.
    pub damping: [f64; 6],
    pub method: SolveMethod,
    /// Effector the Jacobian belongs to. Only used for diagnostics.
    pub effector_index: usize,
}

/// Outcome of a step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    /// `q_current + delta`.
    pub q_new: Vec<f64>,
    pub delta: DVector<f64>,
    /// Damped task-space error the step was solved for (3 or 6 rows).
    pub task_error: DVector<f64>,
    /// `‖e - JΔθ‖`: how much of the error the linearized step leaves behind.
    pub predicted_residual: f64,
    /// False when the strategy's linear solve or SVD failed and the step is zero.
    pub solved: bool,
}

/// Stateless differential IK solver. Holds only immutable constants, so one
/// instance can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct StepSolver {
    config: SolverConfig,
}

impl StepSolver {
    /// Wrap `config` as is. Callers building a config by hand should run
    /// [`SolverConfig::validate`] first or use [`StepSolver::try_new`]; a NaN
    /// constant here silently zeroes the affected strategy.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Validate `config` and wrap it.
    pub fn try_new(config: SolverConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn with_defaults() -> Self {
        Self::new(SolverConfig::default())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Compute one joint update driving the effector toward `request.target`.
    pub fn step(&self, request: &StepRequest<'_>) -> Result<StepReport, IkError> {
        let num_q = request.q_current.len();
        if num_q == 0 {
            return Err(IkError::NoJoints);
        }
        check_finite(request.q_current, "current joint angles")?;
        check_finite(&request.damping, "damping")?;
        check_pose(&request.target, "target pose")?;
        check_pose(&request.current, "current pose")?;

        let task_space = request.method.task_space();
        let jacobian = TaskJacobian::from_blocks(
            request.linear_jacobian,
            request.angular_jacobian,
            num_q,
            task_space,
        )?;
        let task_error = pose_error(&request.target, &request.current, &request.damping, task_space);

        tracing::trace!(
            method = ?request.method,
            num_q,
            effector = request.effector_index,
            error_norm = task_error.norm(),
            "ik step"
        );

        let mut step = delta_theta(request.method, jacobian.matrix(), &task_error, &self.config)?;
        if step.delta.iter().any(|v| !v.is_finite()) {
            tracing::warn!(method = ?request.method, "non-finite joint step, returning a zero step");
            step.delta.fill(0.0);
            step.solved = false;
        }

        let predicted_residual = (&task_error - jacobian.matrix() * &step.delta).norm();
        let q_new = step
            .delta
            .iter()
            .zip(request.q_current)
            .map(|(d, q)| d + q)
            .collect();

        Ok(StepReport {
            q_new,
            delta: step.delta,
            task_error,
            predicted_residual,
            solved: step.solved,
        })
    }

    /// Flat-array entry point.
    ///
    /// Orientations are `[x, y, z, w]` quaternions, Jacobian blocks are
    /// `3 x num_q` row-major, `method` is a [`SolveMethod`] code (unknown codes
    /// leave `q_new == q_current`). `jacobian_size` is an element-count hint:
    /// 0 skips the check, otherwise it must be the size of one block
    /// (`3 * num_q`) or of both blocks together (`6 * num_q`).
    /// `q_new` must already have `num_q` entries and is filled completely.
    ///
    /// Succeeds for every well-formed input, however badly conditioned the
    /// Jacobian is.
    #[allow(clippy::too_many_arguments)]
    pub fn compute_ik(
        &self,
        target_position: &[f64; 3],
        target_orientation: &[f64; 4],
        current_position: &[f64; 3],
        current_orientation: &[f64; 4],
        q_current: &[f64],
        num_q: usize,
        effector_index: usize,
        q_new: &mut [f64],
        method: i32,
        linear_jacobian: &[f64],
        angular_jacobian: &[f64],
        jacobian_size: usize,
        damping: &[f64],
    ) -> Result<(), IkError> {
        if num_q == 0 {
            return Err(IkError::NoJoints);
        }
        for got in [q_current.len(), q_new.len()] {
            if got != num_q {
                return Err(IkError::JointCountMismatch {
                    expected: num_q,
                    got,
                });
            }
        }
        if ![0, 3 * num_q, 6 * num_q].contains(&jacobian_size) {
            return Err(IkError::JacobianCountMismatch {
                expected: 3 * num_q,
                got: jacobian_size,
            });
        }
        let damping: [f64; 6] = damping
            .try_into()
            .map_err(|_| IkError::DampingSizeMismatch { got: damping.len() })?;

        let request = StepRequest {
            target: Pose::from_raw(target_position, target_orientation, "target pose")?,
            current: Pose::from_raw(current_position, current_orientation, "current pose")?,
            q_current,
            linear_jacobian,
            angular_jacobian,
            damping,
            method: SolveMethod::from_code(method),
            effector_index,
        };
        let report = self.step(&request)?;
        q_new.copy_from_slice(&report.q_new);
        Ok(())
    }
}

/// [`StepSolver::compute_ik`] with the default [`SolverConfig`].
#[allow(clippy::too_many_arguments)]
pub fn compute_ik(
    target_position: &[f64; 3],
    target_orientation: &[f64; 4],
    current_position: &[f64; 3],
    current_orientation: &[f64; 4],
    q_current: &[f64],
    num_q: usize,
    effector_index: usize,
    q_new: &mut [f64],
    method: i32,
    linear_jacobian: &[f64],
    angular_jacobian: &[f64],
    jacobian_size: usize,
    damping: &[f64],
) -> Result<(), IkError> {
    StepSolver::with_defaults().compute_ik(
        target_position,
        target_orientation,
        current_position,
        current_orientation,
        q_current,
        num_q,
        effector_index,
        q_new,
        method,
        linear_jacobian,
        angular_jacobian,
        jacobian_size,
        damping,
    )
}

fn check_finite(values: &[f64], what: &'static str) -> Result<(), IkError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(IkError::NonFiniteInput(what))
    }
}

fn check_pose(pose: &Pose, what: &'static str) -> Result<(), IkError> {
    check_finite(pose.position.as_slice(), what)?;
    check_finite(pose.orientation.coords.as_slice(), what)
}
