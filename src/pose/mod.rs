use nalgebra::{DVector, Quaternion, UnitQuaternion, Vector3};

use crate::error::IkError;
use crate::solvers::TaskSpace;

/// Position and orientation of an end effector in the world frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub orientation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(position: Vector3<f64>, orientation: UnitQuaternion<f64>) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// Build a pose from `[x, y, z]` and an `[x, y, z, w]` quaternion.
    ///
    /// The quaternion is normalized; a zero or non-finite one is rejected.
    pub fn from_raw(
        position: &[f64; 3],
        orientation: &[f64; 4],
        what: &'static str,
    ) -> Result<Self, IkError> {
        if position.iter().chain(orientation.iter()).any(|v| !v.is_finite()) {
            return Err(IkError::NonFiniteInput(what));
        }
        let [x, y, z, w] = *orientation;
        let q = Quaternion::new(w, x, y, z);
        if q.norm() <= f64::EPSILON {
            return Err(IkError::DegenerateQuaternion(what));
        }
        Ok(Self::new(
            Vector3::from_row_slice(position),
            UnitQuaternion::from_quaternion(q),
        ))
    }
}

/// Rotation vector (`axis * angle`) of a relative rotation.
///
/// The rotation is taken along the short way round, so the angle lies in
/// `[0, π]`. Identity maps to the zero vector.
pub fn orientation_error(delta: &UnitQuaternion<f64>) -> Vector3<f64> {
    let q = delta.quaternion();
    // q and -q are the same rotation
    let (w, v) = if q.w >= 0.0 {
        (q.w, q.imag())
    } else {
        (-q.w, -q.imag())
    };
    let sin_half = v.norm();
    if sin_half == 0.0 {
        return Vector3::zeros();
    }
    // atan2 keeps precision near identity where acos(w) does not
    let angle = 2.0 * sin_half.atan2(w);
    v * (angle / sin_half)
}

/// Damped task-space error driving one step from `current` toward `target`.
///
/// Rows 0..3 are `damping[0..3] * (p_target - p_current)`. For a
/// [`TaskSpace::Pose`] request rows 3..6 hold the damped rotation vector of
/// `q_target * q_current⁻¹`.
pub fn pose_error(
    target: &Pose,
    current: &Pose,
    damping: &[f64; 6],
    task_space: TaskSpace,
) -> DVector<f64> {
    let mut error = DVector::zeros(task_space.rows());
    let linear = target.position - current.position;
    for i in 0..3 {
        error[i] = damping[i] * linear[i];
    }
    if task_space == TaskSpace::Pose {
        let angular = orientation_error(&current.orientation.rotation_to(&target.orientation));
        for i in 0..3 {
            error[i + 3] = damping[i + 3] * angular[i];
        }
    }
    error
}
