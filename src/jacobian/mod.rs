use nalgebra::DMatrix;

use crate::error::IkError;
use crate::solvers::TaskSpace;

/// Combined task Jacobian: the linear block in rows 0..3 and, for pose
/// tasks, the angular block in rows 3..6. One column per joint.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskJacobian {
    val: DMatrix<f64>,
}

impl TaskJacobian {
    fn zeros(task_space: TaskSpace, num_q: usize) -> Self {
        Self {
            val: DMatrix::zeros(task_space.rows(), num_q),
        }
    }

    fn set_block(&mut self, row: usize, block: &[f64]) {
        let num_q = self.val.ncols();
        self.val
            .view_mut((row, 0), (3, num_q))
            .copy_from(&DMatrix::from_row_slice(3, num_q, block));
    }

    /// Assemble from caller-supplied `3 x num_q` row-major blocks.
    ///
    /// `angular` is only read for [`TaskSpace::Pose`]; for position tasks it
    /// may be empty, but if present it must still have `3 * num_q` entries.
    pub fn from_blocks(
        linear: &[f64],
        angular: &[f64],
        num_q: usize,
        task_space: TaskSpace,
    ) -> Result<Self, IkError> {
        if num_q == 0 {
            return Err(IkError::NoJoints);
        }
        let expected = 3 * num_q;
        check_block("linear", "linear jacobian", linear, expected)?;
        if task_space == TaskSpace::Pose || !angular.is_empty() {
            check_block("angular", "angular jacobian", angular, expected)?;
        }

        let mut jacobian = Self::zeros(task_space, num_q);
        jacobian.set_block(0, linear);
        if task_space == TaskSpace::Pose {
            jacobian.set_block(3, angular);
        }
        Ok(jacobian)
    }

    pub fn task_space(&self) -> TaskSpace {
        if self.val.nrows() == 6 {
            TaskSpace::Pose
        } else {
            TaskSpace::Position
        }
    }

    pub fn num_q(&self) -> usize {
        self.val.ncols()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.val
    }

    pub fn into_matrix(self) -> DMatrix<f64> {
        self.val
    }
}

fn check_block(
    block: &'static str,
    label: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), IkError> {
    if values.len() != expected {
        return Err(IkError::JacobianSizeMismatch {
            block,
            expected,
            got: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(IkError::NonFiniteInput(label));
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    const LINEAR: [f64; 6] = [1., 2., 3., 4., 5., 6.];
    const ANGULAR: [f64; 6] = [-1., -2., -3., -4., -5., -6.];

    #[test]
    fn test_position_layout() {
        let j = TaskJacobian::from_blocks(&LINEAR, &[], 2, TaskSpace::Position).unwrap();
        assert_eq!(j.task_space(), TaskSpace::Position);
        assert_eq!(j.matrix().shape(), (3, 2));
        // row-major: row i pairs with linear axis i
        assert_eq!(j.matrix()[(0, 0)], 1.);
        assert_eq!(j.matrix()[(0, 1)], 2.);
        assert_eq!(j.matrix()[(2, 1)], 6.);
    }

    #[test]
    fn test_position_ignores_angular() {
        let j = TaskJacobian::from_blocks(&LINEAR, &ANGULAR, 2, TaskSpace::Position).unwrap();
        assert_eq!(j.matrix().nrows(), 3);
        assert!(j.matrix().iter().all(|v| *v > 0.));
    }

    #[test]
    fn test_pose_layout() {
        let j = TaskJacobian::from_blocks(&LINEAR, &ANGULAR, 2, TaskSpace::Pose).unwrap();
        assert_eq!(j.task_space(), TaskSpace::Pose);
        assert_eq!(j.num_q(), 2);
        let m = j.into_matrix();
        assert_eq!(m.shape(), (6, 2));
        for i in 0..3 {
            for k in 0..2 {
                assert_eq!(m[(i, k)], LINEAR[i * 2 + k]);
                assert_eq!(m[(i + 3, k)], ANGULAR[i * 2 + k]);
            }
        }
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            TaskJacobian::from_blocks(&LINEAR, &[], 0, TaskSpace::Position),
            Err(IkError::NoJoints)
        );
        assert_eq!(
            TaskJacobian::from_blocks(&LINEAR[..5], &[], 2, TaskSpace::Position),
            Err(IkError::JacobianSizeMismatch {
                block: "linear",
                expected: 6,
                got: 5
            })
        );
        assert_eq!(
            TaskJacobian::from_blocks(&LINEAR, &[], 2, TaskSpace::Pose),
            Err(IkError::JacobianSizeMismatch {
                block: "angular",
                expected: 6,
                got: 0
            })
        );
        assert_eq!(
            TaskJacobian::from_blocks(&LINEAR, &ANGULAR[..3], 2, TaskSpace::Position),
            Err(IkError::JacobianSizeMismatch {
                block: "angular",
                expected: 6,
                got: 3
            })
        );
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut linear = LINEAR;
        linear[4] = f64::INFINITY;
        assert_eq!(
            TaskJacobian::from_blocks(&linear, &[], 2, TaskSpace::Position),
            Err(IkError::NonFiniteInput("linear jacobian"))
        );

        let mut angular = ANGULAR;
        angular[0] = f64::NAN;
        assert_eq!(
            TaskJacobian::from_blocks(&LINEAR, &angular, 2, TaskSpace::Pose),
            Err(IkError::NonFiniteInput("angular jacobian"))
        );
    }
}
