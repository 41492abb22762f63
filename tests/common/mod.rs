use ikstep::Pose;
use nalgebra::{UnitQuaternion, Vector3};

/// Planar serial arm in the xy plane, every joint turning about z.
pub struct PlanarArm {
    pub lengths: Vec<f64>,
}

impl PlanarArm {
    pub fn new(lengths: &[f64]) -> Self {
        Self {
            lengths: lengths.to_vec(),
        }
    }

    pub fn dof(&self) -> usize {
        self.lengths.len()
    }

    fn headings(&self, q: &[f64]) -> Vec<f64> {
        q.iter()
            .scan(0.0, |phi, qi| {
                *phi += qi;
                Some(*phi)
            })
            .collect()
    }

    pub fn fk(&self, q: &[f64]) -> Pose {
        let phis = self.headings(q);
        let mut p = Vector3::zeros();
        for (l, phi) in self.lengths.iter().zip(&phis) {
            p += Vector3::new(l * phi.cos(), l * phi.sin(), 0.);
        }
        let heading = phis.last().copied().unwrap_or(0.);
        Pose::new(p, UnitQuaternion::from_axis_angle(&Vector3::z_axis(), heading))
    }

    /// Row-major `3 x n` linear and angular blocks.
    pub fn jacobian(&self, q: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let n = self.dof();
        let phis = self.headings(q);
        let mut linear = vec![0.; 3 * n];
        let mut angular = vec![0.; 3 * n];
        for j in 0..n {
            for i in j..n {
                linear[j] -= self.lengths[i] * phis[i].sin();
                linear[n + j] += self.lengths[i] * phis[i].cos();
            }
            angular[2 * n + j] = 1.;
        }
        (linear, angular)
    }
}
