use ikstep::{compute_ik, SolveMethod};

const LENGTHS: [f64; 3] = [0.4, 0.3, 0.2];

fn fk(q: &[f64; 3]) -> ([f64; 3], [f64; 4]) {
    let (mut x, mut y, mut phi) = (0., 0., 0.);
    for (l, qi) in LENGTHS.iter().zip(q) {
        phi += qi;
        x += l * f64::cos(phi);
        y += l * f64::sin(phi);
    }
    ([x, y, 0.], [0., 0., (phi / 2.).sin(), (phi / 2.).cos()])
}

fn jacobian(q: &[f64; 3]) -> ([f64; 9], [f64; 9]) {
    let mut linear = [0.; 9];
    let mut angular = [0.; 9];
    let mut phis = [0.; 3];
    let mut phi = 0.;
    for (p, qi) in phis.iter_mut().zip(q) {
        phi += qi;
        *p = phi;
    }
    for j in 0..3 {
        for i in j..3 {
            linear[j] -= LENGTHS[i] * phis[i].sin();
            linear[3 + j] += LENGTHS[i] * phis[i].cos();
        }
        angular[6 + j] = 1.;
    }
    (linear, angular)
}

fn main() {
    let (target_p, target_o) = fk(&[0.9, -0.4, 0.7]);
    let methods = [
        SolveMethod::JacobianTranspose,
        SolveMethod::PseudoInverse,
        SolveMethod::DampedLeastSquares,
        SolveMethod::DampedLeastSquaresSvd,
        SolveMethod::SelectivelyDamped,
        SolveMethod::DampedLeastSquaresWithOrientation,
    ];
    for method in methods {
        let mut q = [0.3, 0.5, 0.4];
        let mut steps = 0;
        for _ in 0..2000 {
            let (p, o) = fk(&q);
            let err = ((target_p[0] - p[0]).powi(2) + (target_p[1] - p[1]).powi(2)).sqrt();
            if err < 1e-6 {
                break;
            }
            let (linear, angular) = jacobian(&q);
            let mut q_new = [0.; 3];
            compute_ik(
                &target_p,
                &target_o,
                &p,
                &o,
                &q,
                3,
                2,
                &mut q_new,
                method.code(),
                &linear,
                &angular,
                9,
                &[1.; 6],
            )
            .unwrap();
            q = q_new;
            steps += 1;
        }
        println!("{method:?}: {steps} steps, q = {q:.4?}");
    }
}
