use thiserror::Error;

/// Input-shape errors rejected before any computation.
///
/// Numerical trouble (rank loss, SVD non-convergence) is never reported here;
/// the solvers absorb it and return a bounded delta instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IkError {
    #[error("chain has no joints")]
    NoJoints,

    #[error("joint count mismatch: expected {expected}, got {got}")]
    JointCountMismatch { expected: usize, got: usize },

    #[error("{block} jacobian has {got} elements, expected {expected}")]
    JacobianSizeMismatch {
        block: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("jacobian element count hint is {got}, expected {expected}")]
    JacobianCountMismatch { expected: usize, got: usize },

    #[error(
        "task dimension mismatch: method expects {expected} rows, jacobian has {jacobian_rows}, error has {error_len}"
    )]
    TaskDimensionMismatch {
        expected: usize,
        jacobian_rows: usize,
        error_len: usize,
    },

    #[error("damping must have 6 gains, got {got}")]
    DampingSizeMismatch { got: usize },

    #[error("non-finite value in {0}")]
    NonFiniteInput(&'static str),

    #[error("zero-norm quaternion in {0}")]
    DegenerateQuaternion(&'static str),
}

/// Errors raised while loading or validating a [`SolverConfig`](crate::SolverConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn ik_error_display() {
        assert_eq!(IkError::NoJoints.to_string(), "chain has no joints");
        assert_eq!(
            IkError::JointCountMismatch {
                expected: 7,
                got: 6
            }
            .to_string(),
            "joint count mismatch: expected 7, got 6"
        );
        assert_eq!(
            IkError::JacobianSizeMismatch {
                block: "angular",
                expected: 21,
                got: 18
            }
            .to_string(),
            "angular jacobian has 18 elements, expected 21"
        );
        assert_eq!(
            IkError::TaskDimensionMismatch {
                expected: 6,
                jacobian_rows: 3,
                error_len: 3
            }
            .to_string(),
            "task dimension mismatch: method expects 6 rows, jacobian has 3, error has 3"
        );
        assert_eq!(
            IkError::NonFiniteInput("target position").to_string(),
            "non-finite value in target position"
        );
    }

    #[test]
    fn ik_error_is_copy() {
        let err = IkError::DampingSizeMismatch { got: 5 };
        let err2 = err;
        assert_eq!(err, err2);
    }

    #[test]
    fn config_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io_err.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
