//! # ikstep is a differential inverse kinematics step solver.
//! One call maps (target pose, current pose, joint angles, Jacobian blocks)
//! to the next joint angles, using one of several delta-theta strategies:
//! Jacobian transpose, damped least squares (direct or through the SVD),
//! pure pseudoinverse and selectively damped least squares.

// #![deny(missing_docs)]
#![deny(unsafe_code)]

mod config;
mod error;
mod jacobian;
mod pose;
mod solvers;
mod step;

pub use config::{SolverConfig, TransposeScaling};
pub use error::{ConfigError, IkError};
pub use jacobian::TaskJacobian;
pub use pose::{orientation_error, pose_error, Pose};
pub use solvers::{
    delta_theta, dls, dls_svd, pseudo_inverse, sdls, transpose, DeltaTheta, SolveMethod, TaskSpace,
};
pub use step::{compute_ik, StepReport, StepRequest, StepSolver};
