use std::cell::Cell;
use approx::assert_relative_eq;
use ndarray as nd;
use jshoot::{
    error::ShootError,
    ivp,
    profile::{ self, Params },
    solve::{ self, Status, System },
    utils::trapz,
};

// F(J) = J - ∫₀¹ R, so the exact root is the integrated rate
fn exact_root(params: &Params) -> f64 {
    let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 200_001);
    trapz(&params.rate_profile(&x), x[1] - x[0])
}

fn bisection(epsilon: f64) -> solve::Method {
    solve::Method::Bisection {
        bracket: (0.0, 5.0),
        epsilon: Some(epsilon),
        maxiters: Some(1000),
    }
}

#[test]
fn worked_example_converges() {
    let sys = System::new_linspace(Params::new(0.9, 1.0, 0.6), 1001);
    let sol = sys.solve(ivp::Method::RK4, bisection(1e-6)).unwrap();
    assert_eq!(sol.status, Status::Converged);
    assert!(sol.iters <= 30, "iters = {}", sol.iters);
    assert!(sol.residual.abs() < 1e-6);
    assert!(sys.residual(ivp::Method::RK4, sol.j).unwrap().abs() < 1e-6);
    assert_relative_eq!(sol.j, exact_root(sys.get_params()), epsilon = 2e-6);

    // bracket width halves every iteration
    let (lo, hi) = sol.bracket.unwrap();
    assert_relative_eq!(
        hi - lo, 5.0 / 2.0_f64.powi(sol.iters as i32), epsilon = 1e-15);
    assert!(lo <= sol.j && sol.j <= hi);

    // boundary conditions and conservation on the returned curves
    let cur = &sol.currents;
    assert_eq!(cur.jp[0], sol.j);
    assert_eq!(cur.jn[0], sol.j);
    for tk in cur.total() {
        assert_relative_eq!(tk, 2.0 * sol.j, epsilon = 1e-12);
    }
}

#[test]
fn solve_default_matches_explicit() {
    let sys = System::new_linspace(Params::default(), 1001);
    let sol = sys.solve_default().unwrap();
    let explicit = sys.solve(ivp::Method::RK4, bisection(1e-6)).unwrap();
    assert_eq!(sol.j, explicit.j);
    assert_eq!(sol.iters, explicit.iters);
}

#[test]
fn invalid_bracket_costs_two_integrations() {
    // strong generation pushes the root past the top of the bracket
    let params = Params::new(0.9, 10.0, 0.6);
    let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 101);
    let count = Cell::new(0_usize);
    let f = |j: f64| {
        count.set(count.get() + 1);
        solve::residual(&params, ivp::Method::RK4, j, &x)
    };
    let res = solve::bisect(f, (0.0, 5.0), 1e-6, 100);
    match res {
        Err(ShootError::InvalidBracket { flo, fhi, .. }) => {
            assert!(flo < 0.0 && fhi < 0.0);
        },
        other => panic!("expected an invalid bracket, got {other:?}"),
    }
    assert_eq!(count.get(), 2);

    let sys = System::new_linspace(params, 101);
    assert!(matches!(
        sys.solve(ivp::Method::RK4, bisection(1e-6)),
        Err(ShootError::InvalidBracket { .. }),
    ));
}

#[test]
fn methods_agree() {
    let sys = System::new_linspace(Params::default(), 501);
    let bis = sys.solve(ivp::Method::RK4, bisection(1e-10)).unwrap();
    let sec = sys.solve(
        ivp::Method::RK4,
        solve::Method::Secant { guesses: (0.0, 5.0), epsilon: Some(1e-10), maxiters: None },
    ).unwrap();
    let rka = sys.solve(ivp::Method::RKA { epsilon: 1e-10 }, bisection(1e-10))
        .unwrap();
    let js: nd::Array1<f64> = nd::Array1::linspace(0.0, 5.0, 51);
    let scanned = sys.solve_all(
        ivp::Method::RK4,
        solve::Method::Scan { J: js, epsilon: Some(1e-9) },
    ).unwrap();

    assert!(sec.is_converged());
    assert!(sec.iters <= 3, "iters = {}", sec.iters);
    assert!(sec.bracket.is_none());
    assert_relative_eq!(sec.j, bis.j, epsilon = 1e-9);
    assert_relative_eq!(rka.j, bis.j, epsilon = 1e-8);
    assert_eq!(scanned.len(), 1);
    assert_relative_eq!(scanned[0].j, bis.j, epsilon = 1e-9);
    assert!(scanned[0].residual.abs() < 1e-9);
    assert!(scanned[0].is_converged());
    assert_eq!(scanned[0].iters, 0);
}

#[test]
fn euler_is_less_accurate() {
    let params = Params::default();
    let exact = exact_root(&params);
    let sys = System::new_linspace(params, 101);
    let euler = sys.solve(ivp::Method::Euler, bisection(1e-10)).unwrap();
    let rk4 = sys.solve(ivp::Method::RK4, bisection(1e-10)).unwrap();
    assert!((euler.j - exact).abs() > (rk4.j - exact).abs());
    assert!((euler.j - exact).abs() < 1e-2);
    assert!(euler.residual.abs() < 1e-9);
}

#[test]
fn non_convergence_is_flagged_not_fatal() {
    let sys = System::new_linspace(Params::default(), 101);
    let method = solve::Method::Bisection {
        bracket: (0.0, 5.0),
        epsilon: Some(1e-9),
        maxiters: Some(4),
    };
    let sol = sys.solve(ivp::Method::RK4, method).unwrap();
    assert_eq!(sol.status, Status::MaxIters);
    assert_eq!(sol.iters, 4);
    let (lo, hi) = sol.bracket.unwrap();
    assert_relative_eq!(hi - lo, 5.0 / 16.0, epsilon = 1e-15);
    assert!(matches!(
        sol.into_converged(),
        Err(ShootError::NonConvergence { .. }),
    ));
}

#[test]
fn uneven_grid() {
    let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 401)
        .mapv(|s: f64| s * s);
    let sys = System::new_grid(Params::default(), x).unwrap();
    let sol = sys.solve(ivp::Method::RK4, bisection(1e-8)).unwrap();
    assert!(sol.is_converged());
    assert_relative_eq!(sol.j, exact_root(sys.get_params()), epsilon = 1e-7);
    let (n, p) = sys.densities();
    assert_eq!(n[0], profile::n(0.0));
    assert!(p[400] < 1e-20);
}
