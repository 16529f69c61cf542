//! Explicit integrators for first-order initial value problems over an ordered
//! coordinate grid, and their specialisation to the current-continuity
//! system.
//!
//! In all 2D arrays, the first (or zero-th) axis indexes position.

use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::{
    Arr1,
    error::IvpError,
    profile::Params,
    utils::{ all_finite, array_diff, array_step },
};

pub type IvpResult<T> = Result<T, IvpError>;

/// Integration scheme selector and parameters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Forward Euler, one step per grid interval. Global error *O*(*h*).
    Euler,
    /// Classical fourth-order Runge-Kutta, one step per grid interval. Global
    /// error *O*(*h*⁴).
    #[default]
    RK4,
    /// Fourth-order Runge-Kutta with adaptive sub-steps between grid points.
    RKA {
        /// Relative local error bound for each sub-step.
        epsilon: f64,
    },
}

impl Method {
    /// Return `true` if `self` is `Euler`.
    pub fn is_euler(&self) -> bool { matches!(self, Self::Euler) }

    /// Return `true` if `self` is `RK4`.
    pub fn is_rk4(&self) -> bool { matches!(self, Self::RK4) }

    /// Return `true` if `self` is `RKA`.
    pub fn is_rka(&self) -> bool { matches!(self, Self::RKA { .. }) }
}

fn check_finite(y: &nd::Array1<f64>, x: f64) -> IvpResult<()> {
    all_finite(y).then_some(()).ok_or(IvpError::Overflow { x })
}

// take a single Euler step *in place*
fn euler_step<F>(rhs: &mut F, x: f64, y: &mut nd::Array1<f64>, h: f64)
where F: FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
{
    let k1 = rhs(x, &*y);
    y.scaled_add(h, &k1);
}

// take a single RK4 step *in place*
fn rk4_step<F>(rhs: &mut F, x: f64, y: &mut nd::Array1<f64>, h: f64)
where F: FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
{
    let k1 = rhs(x, &*y);
    let k2 = rhs(x + h / 2.0, &array_step(&*y, h / 2.0, &k1));
    let k3 = rhs(x + h / 2.0, &array_step(&*y, h / 2.0, &k2));
    let k4 = rhs(x + h, &array_step(&*y, h, &k3));
    nd::Zip::from(y).and(&k1).and(&k2).and(&k3).and(&k4)
        .for_each(|yk, k1k, k2k, k3k, k4k| {
            *yk += h / 6.0 * (k1k + 2.0 * (k2k + k3k) + k4k);
        });
}

// estimate the ratio between truncation errors at different step sizes for a
// fourth-order Runge-Kutta scheme with array values
fn error_ratio(z: &nd::Array1<f64>, w: &nd::Array1<f64>, err: f64) -> f64 {
    z.iter().zip(w)
        .map(|(zk, wk)| {
            let scale: f64 = err * (zk.abs() + wk.abs()) / 2.0;
            (zk - wk).abs() / (scale + f64::EPSILON)
        })
        .fold(0.0, f64::max)
}

// attempt a single adaptive RK4 step of size at most `h` *in place*, returning
// the size of the step taken and a suggested size for the next one
fn rka_step<F>(
    rhs: &mut F,
    x: f64,
    y: &mut nd::Array1<f64>,
    h: f64,
    err: f64,
) -> IvpResult<(f64, f64)>
where F: FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
{
    // safety numbers -- particular to rk4
    const SAFE1: f64 = 0.9;
    const SAFE2: f64 = 4.0;

    let mut h_try = h;
    let mut y_half: nd::Array1<f64>;
    let mut y_full: nd::Array1<f64>;
    let mut er: f64;
    for _ in 0_usize..100 {
        // step too small to move x
        if x + h_try <= x { break; }

        // take two half-sized steps
        y_half = y.clone();
        rk4_step(rhs, x, &mut y_half, h_try / 2.0);
        rk4_step(rhs, x + h_try / 2.0, &mut y_half, h_try / 2.0);

        // take one full-sized step
        y_full = y.clone();
        rk4_step(rhs, x, &mut y_full, h_try);

        check_finite(&y_half, x + h_try)?;
        check_finite(&y_full, x + h_try)?;

        // estimate new step size (with safety factors)
        er = error_ratio(&y_half, &y_full, err);
        let h_new
            = if er == 0.0 {
                h_try * SAFE2
            } else {
                (h_try * er.powf(-0.2) * SAFE1)
                    .clamp(h_try / SAFE2, h_try * SAFE2)
            };
        if er < 1.0 {
            *y = y_half;
            return Ok((h_try, h_new));
        }
        h_try = h_new;
    }
    Err(IvpError::ErrorBound { x })
}

// maximum number of adaptive sub-steps per grid interval
const RKA_MAXSTEPS: usize = 100_000;

// carry `y` from `x0` to `x1` with adaptive sub-steps, returning the last
// suggested step size
fn rka_interval<F>(
    rhs: &mut F,
    y: &mut nd::Array1<f64>,
    x0: f64,
    x1: f64,
    h0: f64,
    err: f64,
) -> IvpResult<f64>
where F: FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
{
    let mut x = x0;
    let mut h = h0;
    let mut steps: usize = 0;
    while x < x1 {
        if steps >= RKA_MAXSTEPS { return Err(IvpError::ErrorBound { x }); }
        let last = h >= x1 - x;
        if last { h = x1 - x; }
        let (taken, h_next) = rka_step(rhs, x, y, h, err)?;
        let x_next = if last && taken == h { x1 } else { x + taken };
        if x_next <= x { return Err(IvpError::ErrorBound { x }); }
        x = x_next;
        h = h_next;
        steps += 1;
    }
    Ok(h)
}

/// Integrate `dy/dx = rhs(x, y)` from the initial state `y0` over the
/// coordinate grid `x`, returning the state at each grid point.
///
/// Row `k` of the returned array is the state at `x[k]`; row 0 is `y0`. The
/// grid must be strictly increasing with at least two points. Integration
/// stops with [`IvpError::Overflow`] as soon as the state becomes non-finite.
/// The adaptive scheme fails with [`IvpError::ErrorBound`] if its error bound
/// would need sub-steps too small to advance `x`, or more than 100000 of them
/// within one grid interval.
///
/// ```
/// use ndarray as nd;
/// use jshoot::ivp::{ integrate, Method };
///
/// // exponential decay
/// let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, 101);
/// let y = integrate(Method::RK4, |_, y| -y, &nd::array![1.0], &x).unwrap();
/// assert!((y[[100, 0]] - (-1.0_f64).exp()).abs() < 1e-9);
/// ```
pub fn integrate<F, S, T>(
    method: Method,
    mut rhs: F,
    y0: &Arr1<S>,
    x: &Arr1<T>,
) -> IvpResult<nd::Array2<f64>>
where
    F: FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>,
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    IvpError::check_grid(x)?;
    all_finite(y0).then_some(()).ok_or(IvpError::BadInitial)?;
    if let Method::RKA { epsilon } = method {
        IvpError::check_epsilon(epsilon)?;
    }

    let dx = array_diff(x);
    let mut y: nd::Array2<f64> = nd::Array2::zeros((x.len(), y0.len()));
    let mut y_temp: nd::Array1<f64> = y0.to_owned();
    y.slice_mut(nd::s![0, ..]).assign(y0);
    let mut h_next: f64 = dx[0];
    let iter
        = dx.iter().zip(x.iter().zip(x.iter().skip(1)))
        .zip(y.axis_iter_mut(nd::Axis(0)).skip(1));
    for ((&dxk, (&xk, &xkp1)), ykp1) in iter {
        match method {
            Method::Euler => euler_step(&mut rhs, xk, &mut y_temp, dxk),
            Method::RK4 => rk4_step(&mut rhs, xk, &mut y_temp, dxk),
            Method::RKA { epsilon } => {
                h_next = rka_interval(
                    &mut rhs, &mut y_temp, xk, xkp1, h_next, epsilon)?;
            },
        }
        check_finite(&y_temp, xkp1)?;
        y_temp.clone().move_into(ykp1);
    }
    Ok(y)
}

/// Hole and electron current densities sampled over a coordinate grid.
#[derive(Clone, Debug)]
pub struct Currents {
    /// Coordinates
    pub x: nd::Array1<f64>,
    /// Hole current density
    pub jp: nd::Array1<f64>,
    /// Electron current density
    pub jn: nd::Array1<f64>,
}

impl Currents {
    /// Electron current at the right-hand boundary, i.e. the shooting
    /// residual.
    pub fn residual(&self) -> f64 { self.jn[self.jn.len() - 1] }

    /// Total current `j_p + j_n` at each grid point.
    pub fn total(&self) -> nd::Array1<f64> { &self.jp + &self.jn }

    /// Number of grid points.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.x.len() }
}

/// Right-hand side of the current-continuity system for state `(j_p, j_n)`.
///
/// The derivatives are independent of the state and equal and opposite, so
/// `j_p + j_n` is conserved.
pub fn continuity_rhs(params: Params)
    -> impl FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
{
    move |x: f64, _: &nd::Array1<f64>| {
        let r = params.rate(x);
        nd::array![r, -r]
    }
}

/// Integrate the current-continuity system from `j_p(0) = j_n(0) = j` over
/// the coordinate grid `x`.
pub fn shoot<S>(params: &Params, method: Method, j: f64, x: &Arr1<S>)
    -> IvpResult<Currents>
where S: nd::Data<Elem = f64>
{
    let y = integrate(method, continuity_rhs(*params), &nd::array![j, j], x)?;
    Ok(Currents {
        x: x.to_owned(),
        jp: y.column(0).to_owned(),
        jn: y.column(1).to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use crate::utils::trapz;

    fn grid(n: usize) -> nd::Array1<f64> { nd::Array1::linspace(0.0, 1.0, n) }

    // exact ∫₀ˣ R for comparison, via a very fine trapezoidal rule
    fn rate_integral(params: &Params) -> f64 {
        let xf = grid(200_001);
        trapz(&params.rate_profile(&xf), xf[1] - xf[0])
    }

    #[test]
    fn total_current_is_conserved() {
        let params = Params::default();
        let x = grid(201);
        let methods = [Method::Euler, Method::RK4, Method::RKA { epsilon: 1e-9 }];
        for method in methods {
            for j in [-2.0, 0.0, 0.7, 5.0] {
                let cur = shoot(&params, method, j, &x).unwrap();
                assert_eq!(cur.len(), x.len());
                for tk in cur.total() {
                    assert_relative_eq!(tk, 2.0 * j, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn boundary_value_matches_quadrature() {
        let params = Params::default();
        let exact = 1.0 - rate_integral(&params);
        let x = grid(101);
        let rk4 = shoot(&params, Method::RK4, 1.0, &x).unwrap();
        let rka = shoot(&params, Method::RKA { epsilon: 1e-10 }, 1.0, &x)
            .unwrap();
        let euler = shoot(&params, Method::Euler, 1.0, &x).unwrap();
        assert_relative_eq!(rk4.residual(), exact, epsilon = 1e-8);
        assert_relative_eq!(rka.residual(), exact, epsilon = 1e-8);
        let euler_err = (euler.residual() - exact).abs();
        assert!(euler_err < 1e-2);
        assert!(euler_err > (rk4.residual() - exact).abs());
    }

    #[test]
    fn euler_is_first_order() {
        let params = Params::default();
        let exact = 1.0 - rate_integral(&params);
        let e1 = (shoot(&params, Method::Euler, 1.0, &grid(101)).unwrap()
            .residual() - exact).abs();
        let e2 = (shoot(&params, Method::Euler, 1.0, &grid(201)).unwrap()
            .residual() - exact).abs();
        let ratio = e1 / e2;
        assert!(ratio > 1.8 && ratio < 2.2, "ratio = {ratio}");
    }

    #[test]
    fn exponential_decay() {
        let x = grid(11);
        let y0 = nd::array![1.0, 2.0];
        let rk4 = integrate(Method::RK4, |_, y| -y, &y0, &x).unwrap();
        let rka = integrate(Method::RKA { epsilon: 1e-10 }, |_, y| -y, &y0, &x)
            .unwrap();
        for (k, &xk) in x.iter().enumerate() {
            assert_relative_eq!(rka[[k, 0]], (-xk).exp(), epsilon = 1e-8);
            assert_relative_eq!(rka[[k, 1]], 2.0 * (-xk).exp(), epsilon = 1e-8);
        }
        assert_relative_eq!(rk4[[10, 0]], (-1.0_f64).exp(), epsilon = 1e-6);
    }

    #[test]
    fn overflow_is_reported() {
        let params = Params::new(f64::MAX, f64::MAX, 10.0);
        let res = shoot(&params, Method::RK4, 1.0, &grid(11));
        assert!(matches!(res, Err(IvpError::Overflow { .. })));
        let res = shoot(&params, Method::RKA { epsilon: 1e-6 }, 1.0, &grid(11));
        assert!(matches!(res, Err(IvpError::Overflow { .. })));
    }

    // bounded right-hand side with no smoothness for the error estimate to
    // exploit
    fn noise(amplitude: f64)
        -> impl FnMut(f64, &nd::Array1<f64>) -> nd::Array1<f64>
    {
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        move |_: f64, _: &nd::Array1<f64>| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let u = (state >> 11) as f64 / (1_u64 << 53) as f64;
            nd::array![amplitude * (u - 0.5)]
        }
    }

    #[test]
    fn rka_error_bound_is_reported() {
        let method = Method::RKA { epsilon: 1e-9 };
        let y0 = nd::array![1.0];

        // accepted sub-steps exist but are far too small to finish an interval
        let res = integrate(method, noise(1e6), &y0, &grid(11));
        assert!(matches!(res, Err(IvpError::ErrorBound { .. })));

        // required sub-step is below the resolution of x
        let x: nd::Array1<f64> = nd::Array1::linspace(1.0, 2.0, 11);
        let res = integrate(method, noise(5e11), &y0, &x);
        match res {
            Err(IvpError::ErrorBound { x }) => assert_eq!(x, 1.0),
            other => panic!("expected an error bound failure, got {other:?}"),
        }
    }

    #[test]
    fn bad_inputs() {
        let params = Params::default();
        assert!(matches!(
            shoot(&params, Method::RK4, 1.0, &nd::array![0.0]),
            Err(IvpError::GridTooShort(1)),
        ));
        assert!(matches!(
            shoot(&params, Method::RK4, 1.0, &nd::array![0.0, 1.0, 0.5]),
            Err(IvpError::GridNotIncreasing(2)),
        ));
        assert!(matches!(
            shoot(&params, Method::RK4, f64::NAN, &grid(3)),
            Err(IvpError::BadInitial),
        ));
        assert!(matches!(
            shoot(&params, Method::RKA { epsilon: 0.0 }, 1.0, &grid(3)),
            Err(IvpError::BadEpsilon(_)),
        ));
    }

    #[test]
    fn method_serde_names() {
        let m: Method = serde_json::from_str("\"euler\"").unwrap();
        assert!(m.is_euler());
        let m: Method = serde_json::from_str("\"rk4\"").unwrap();
        assert!(m.is_rk4());
        let m: Method
            = serde_json::from_str(r#"{"rka":{"epsilon":1e-8}}"#).unwrap();
        assert_eq!(m, Method::RKA { epsilon: 1e-8 });
    }
}
