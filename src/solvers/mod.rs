//! Delta-theta strategies.
//!
//! Every strategy is a pure function of the task Jacobian `J` (m x n), the
//! task error `e` (length m) and the fixed constants in [`SolverConfig`].
//! None of them fail on degenerate geometry: a rank-deficient or all-zero
//! `J` yields a bounded (possibly zero) delta.

mod damped;
mod jacobian_transpose;
mod selective;
mod svd;

use nalgebra::{DMatrix, DVector};

use crate::config::SolverConfig;
use crate::error::IkError;

pub use self::damped::dls;
pub use self::jacobian_transpose::transpose;
pub use self::selective::sdls;
pub use self::svd::{dls_svd, pseudo_inverse};

/// Which part of the effector pose a step controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskSpace {
    /// Position only, 3 rows.
    Position,
    /// Position then orientation, 6 rows.
    Pose,
}

impl TaskSpace {
    pub const fn rows(self) -> usize {
        match self {
            TaskSpace::Position => 3,
            TaskSpace::Pose => 6,
        }
    }
}

/// Strategy selector. The integer codes are stable and accepted by
/// [`compute_ik`](crate::compute_ik).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolveMethod {
    JacobianTranspose,
    PseudoInverse,
    DampedLeastSquares,
    SelectivelyDamped,
    DampedLeastSquaresSvd,
    /// Same solve as [`SolveMethod::DampedLeastSquares`].
    VelocityDampedLeastSquares,
    /// DLS on the stacked linear + angular task.
    DampedLeastSquaresWithOrientation,
    /// Any other code; produces a zero delta.
    Unrecognized(i32),
}

impl SolveMethod {
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => SolveMethod::JacobianTranspose,
            1 => SolveMethod::PseudoInverse,
            2 => SolveMethod::DampedLeastSquares,
            3 => SolveMethod::SelectivelyDamped,
            4 => SolveMethod::DampedLeastSquaresSvd,
            5 => SolveMethod::VelocityDampedLeastSquares,
            6 => SolveMethod::DampedLeastSquaresWithOrientation,
            other => SolveMethod::Unrecognized(other),
        }
    }

    pub const fn code(self) -> i32 {
        match self {
            SolveMethod::JacobianTranspose => 0,
            SolveMethod::PseudoInverse => 1,
            SolveMethod::DampedLeastSquares => 2,
            SolveMethod::SelectivelyDamped => 3,
            SolveMethod::DampedLeastSquaresSvd => 4,
            SolveMethod::VelocityDampedLeastSquares => 5,
            SolveMethod::DampedLeastSquaresWithOrientation => 6,
            SolveMethod::Unrecognized(code) => code,
        }
    }

    pub const fn task_space(self) -> TaskSpace {
        match self {
            SolveMethod::DampedLeastSquaresWithOrientation => TaskSpace::Pose,
            _ => TaskSpace::Position,
        }
    }
}

impl From<i32> for SolveMethod {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

/// Joint-space step produced by one strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaTheta {
    pub delta: DVector<f64>,
    /// False when the underlying linear solve or SVD failed and the delta
    /// fell back to zero.
    pub solved: bool,
}

impl DeltaTheta {
    fn new(delta: DVector<f64>) -> Self {
        Self {
            delta,
            solved: true,
        }
    }

    fn zeros(num_q: usize) -> Self {
        Self::new(DVector::zeros(num_q))
    }

    fn unsolved(num_q: usize) -> Self {
        Self {
            delta: DVector::zeros(num_q),
            solved: false,
        }
    }
}

/// Scale `delta` so its largest entry does not exceed `limit`.
fn limit_max_angle(delta: &mut DVector<f64>, limit: Option<f64>) {
    let Some(limit) = limit else {
        return;
    };
    let max_change = delta.amax();
    if max_change > limit {
        *delta *= limit / max_change;
    }
}

/// Dispatch to the strategy selected by `method`.
///
/// `jacobian` and `error` must both have the row count of the method's
/// [`TaskSpace`]; anything else is an input-shape error.
pub fn delta_theta(
    method: SolveMethod,
    jacobian: &DMatrix<f64>,
    error: &DVector<f64>,
    config: &SolverConfig,
) -> Result<DeltaTheta, IkError> {
    let expected = method.task_space().rows();
    if jacobian.nrows() != expected || error.len() != expected {
        return Err(IkError::TaskDimensionMismatch {
            expected,
            jacobian_rows: jacobian.nrows(),
            error_len: error.len(),
        });
    }
    if jacobian.ncols() == 0 {
        return Err(IkError::NoJoints);
    }

    let step = match method {
        SolveMethod::JacobianTranspose => transpose(jacobian, error, config),
        SolveMethod::PseudoInverse => pseudo_inverse(jacobian, error, config),
        SolveMethod::DampedLeastSquares
        | SolveMethod::VelocityDampedLeastSquares
        | SolveMethod::DampedLeastSquaresWithOrientation => dls(jacobian, error, config),
        SolveMethod::DampedLeastSquaresSvd => dls_svd(jacobian, error, config),
        SolveMethod::SelectivelyDamped => sdls(jacobian, error, config),
        SolveMethod::Unrecognized(code) => {
            tracing::debug!(code, "unrecognized ik method, returning a zero step");
            DeltaTheta::zeros(jacobian.ncols())
        }
    };
    Ok(step)
}
