//! Functions to solve the current-continuity boundary value problem by
//! shooting on the common initial current `J = j_p(0) = j_n(0)`.
//!
//! Each trial `J` costs one full integration over the coordinate grid; the
//! boundary residual `F(J) = j_n(1; J)` is then driven to zero by one of the
//! root-finders below. The generic finders ([`bisect`], [`secant`], [`scan`])
//! accept any fallible scalar function, so they can be exercised apart from
//! the integrator.

use log::{ debug, info, warn };
use ndarray as nd;
use crate::{
    Arr1,
    error::{ IvpError, ShootError },
    interp,
    ivp::{ self, Currents },
    profile::{ self, Params },
    DEF_EPSILON,
    DEF_MAXITERS,
};

pub type ShootResult<T> = Result<T, ShootError>;

/// Default bracket for the common initial current.
pub const DEF_BRACKET: (f64, f64) = (0.0, 5.0);

/// Terminal state of an iterative root search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// The tolerance was met.
    Converged,
    /// The iteration limit was reached first; the returned value is the best
    /// available estimate.
    MaxIters,
    /// An interpolated estimate from a scan whose residual is not within the
    /// tolerance.
    Inexact,
}

/// A root of a scalar residual, as found by one of the generic root-finders.
#[derive(Copy, Clone, Debug)]
pub struct Root {
    /// Location of the root
    pub j: f64,
    /// Residual at `j`
    pub residual: f64,
    /// Number of iterations performed, not counting initial evaluations; zero
    /// for a scan
    pub iters: usize,
    /// Terminal state
    pub status: Status,
    /// Final bracket, for bracketing methods
    pub bracket: Option<(f64, f64)>,
}

impl Root {
    /// Return `true` if the tolerance was met.
    pub fn is_converged(&self) -> bool { self.status == Status::Converged }
}

#[derive(Copy, Clone, Debug)]
struct Bounds<T>(T, T);

impl Bounds<f64> {
    fn midpoint(self) -> f64 { (self.0 + self.1) / 2.0 }

    fn diff(self) -> f64 { self.1 - self.0 }
}

impl<T: PartialOrd> Bounds<T> {
    fn from_ord(xx: (T, T)) -> Self {
        if xx.0 > xx.1 { Self(xx.1, xx.0) } else { Self(xx.0, xx.1) }
    }
}

impl<T> Bounds<T> {
    fn pair(self) -> (T, T) { (self.0, self.1) }
}

// evaluate a residual, refusing to pass non-finite values on as a sign
fn eval<F>(f: &mut F, j: f64) -> ShootResult<f64>
where F: FnMut(f64) -> ShootResult<f64>
{
    let fj = f(j)?;
    fj.is_finite().then_some(fj).ok_or(ShootError::NonFiniteResidual(j))
}

/// Find a root of `f` by bisection within `bracket`.
///
/// `f` is evaluated at both ends of the bracket first; if the values have the
/// same sign, [`ShootError::InvalidBracket`] is returned and no further
/// evaluations are made. Each iteration then halves the bracket, so that after
/// `k` iterations its width is exactly `(hi - lo) / 2^k`. Iteration stops when
/// either `|f(J)| < epsilon` or the bracket width drops below `epsilon`; if
/// neither happens within `maxiters` iterations, the last midpoint is returned
/// with [`Status::MaxIters`].
///
/// ```
/// use jshoot::solve::bisect;
///
/// let root = bisect(|j| Ok(j * j - 2.0), (0.0, 2.0), 1e-10, 100).unwrap();
/// assert!(root.is_converged());
/// assert!((root.j - 2.0_f64.sqrt()).abs() < 1e-9);
/// ```
pub fn bisect<F>(mut f: F, bracket: (f64, f64), epsilon: f64, maxiters: usize)
    -> ShootResult<Root>
where F: FnMut(f64) -> ShootResult<f64>
{
    ShootError::check_epsilon(epsilon)?;
    ShootError::check_maxiters(maxiters)?;
    ShootError::check_bracket(bracket)?;

    let mut jb: Bounds<f64> = Bounds::from_ord(bracket);
    let mut fb: Bounds<f64> = Bounds(eval(&mut f, jb.0)?, eval(&mut f, jb.1)?);
    if fb.0 == 0.0 || fb.1 == 0.0 {
        let (j, residual) = if fb.0 == 0.0 { (jb.0, fb.0) } else { (jb.1, fb.1) };
        let status = Status::Converged;
        return Ok(Root { j, residual, iters: 0, status, bracket: Some(jb.pair()) });
    }
    if fb.0.signum() == fb.1.signum() {
        return Err(ShootError::InvalidBracket {
            lo: jb.0, hi: jb.1, flo: fb.0, fhi: fb.1 });
    }

    let mut j: f64 = jb.midpoint();
    let mut fj: f64 = f64::NAN;
    let mut iters: usize = 0;
    let mut status = Status::MaxIters;
    while iters < maxiters {
        j = jb.midpoint();
        fj = eval(&mut f, j)?;
        if fj.signum() == fb.0.signum() {
            jb.0 = j;
            fb.0 = fj;
        } else {
            jb.1 = j;
            fb.1 = fj;
        }
        iters += 1;
        debug!(
            "solve::bisect: iter {iters}: J = {j:.12e}, F(J) = {fj:.3e}, \
            width = {:.3e}",
            jb.diff(),
        );
        if fj.abs() < epsilon || jb.diff() < epsilon {
            status = Status::Converged;
            break;
        }
    }
    match status {
        Status::Converged => info!(
            "solve::bisect: converged to J = {j:.12e} in {iters} iterations"),
        _ => warn!(
            "solve::bisect: reached maxiters with |F(J)| = {:.3e}", fj.abs()),
    }
    Ok(Root { j, residual: fj, iters, status, bracket: Some(jb.pair()) })
}

/// Find a root of `f` by a secant search starting from two initial guesses.
///
/// Iteration stops when `|f(J)| < epsilon` or the step in `J` falls below
/// `epsilon * max(1, |J|)`. Returns [`ShootError::Stalled`] if two successive
/// residuals are equal, since no secant step can then be taken.
pub fn secant<F>(mut f: F, guesses: (f64, f64), epsilon: f64, maxiters: usize)
    -> ShootResult<Root>
where F: FnMut(f64) -> ShootResult<f64>
{
    ShootError::check_epsilon(epsilon)?;
    ShootError::check_maxiters(maxiters)?;
    ShootError::check_bracket(guesses)?;

    let (mut jlast, mut j): (f64, f64) = guesses;
    let mut flast: f64 = eval(&mut f, jlast)?;
    let mut fj: f64 = eval(&mut f, j)?;
    if flast.abs() < fj.abs() {
        std::mem::swap(&mut jlast, &mut j);
        std::mem::swap(&mut flast, &mut fj);
    }
    if fj.abs() < epsilon {
        let status = Status::Converged;
        return Ok(Root { j, residual: fj, iters: 0, status, bracket: None });
    }

    let mut iters: usize = 0;
    let mut status = Status::MaxIters;
    let mut jnext: f64;
    while iters < maxiters {
        if fj == flast { return Err(ShootError::Stalled(j)); }
        jnext = j - fj * (j - jlast) / (fj - flast);
        jlast = j;
        flast = fj;
        j = jnext;
        fj = eval(&mut f, j)?;
        iters += 1;
        debug!("solve::secant: iter {iters}: J = {j:.12e}, F(J) = {fj:.3e}");
        if fj.abs() < epsilon || (j - jlast).abs() < epsilon * j.abs().max(1.0) {
            status = Status::Converged;
            break;
        }
    }
    match status {
        Status::Converged => info!(
            "solve::secant: converged to J = {j:.12e} in {iters} iterations"),
        _ => warn!(
            "solve::secant: reached maxiters with |F(J)| = {:.3e}", fj.abs()),
    }
    Ok(Root { j, residual: fj, iters, status, bracket: None })
}

/// Evaluate `f` over a set of trial values and return every sign change
/// located by Lagrange interpolation of the sampled residual.
///
/// The trial values must be ordered and number at least 5. `f` is evaluated
/// once more at each interpolated root; roots whose residual is not below
/// `epsilon` are returned with [`Status::Inexact`].
pub fn scan<F, S>(mut f: F, js: &Arr1<S>, epsilon: f64)
    -> ShootResult<Vec<Root>>
where
    F: FnMut(f64) -> ShootResult<f64>,
    S: nd::Data<Elem = f64>,
{
    ShootError::check_epsilon(epsilon)?;
    let fjs: nd::Array1<f64>
        = js.iter()
        .map(|j| eval(&mut f, *j))
        .collect::<ShootResult<_>>()?;
    let zeros = interp::find_zeros(js, &fjs, interp::Zero::All)?;
    debug!("solve::scan: {} root(s) in {} samples", zeros.len(), js.len());
    zeros.into_iter()
        .map(|j| {
            let residual = eval(&mut f, j)?;
            let status
                = if residual.abs() < epsilon {
                    Status::Converged
                } else {
                    warn!(
                        "solve::scan: root at J = {j:.12e} has \
                        |F(J)| = {:.3e}",
                        residual.abs(),
                    );
                    Status::Inexact
                };
            Ok(Root { j, residual, iters: 0, status, bracket: None })
        })
        .collect()
}

/// Compute the boundary residual `F(J) = j_n(1; J)` for a single trial value.
pub fn residual<S>(params: &Params, method: ivp::Method, j: f64, x: &Arr1<S>)
    -> ShootResult<f64>
where S: nd::Data<Elem = f64>
{
    Ok(ivp::shoot(params, method, j, x)?.residual())
}

/// Compute the boundary residual for a set of trial values.
pub fn residuals<S, T>(
    params: &Params,
    method: ivp::Method,
    js: &Arr1<S>,
    x: &Arr1<T>,
) -> ShootResult<nd::Array1<f64>>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    js.iter()
        .map(|j| residual(params, method, *j, x))
        .collect()
}

/// A solution to the boundary value problem.
///
/// This struct is usually only returned by a solver function; you probably
/// won't ever instantiate it yourself.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Common initial current `J*`
    pub j: f64,
    /// Boundary residual `j_n(1; J*)`
    pub residual: f64,
    /// Number of root-finder iterations
    pub iters: usize,
    /// Terminal state of the root search
    pub status: Status,
    /// Final bracket, for bracketing methods
    pub bracket: Option<(f64, f64)>,
    /// Current densities integrated from `J*`
    pub currents: Currents,
}

impl Solution {
    /// Return `true` if the root search met its tolerance.
    pub fn is_converged(&self) -> bool { self.status == Status::Converged }

    /// Convert a solution that missed its tolerance into
    /// [`ShootError::NonConvergence`].
    pub fn into_converged(self) -> ShootResult<Self> {
        match self.status {
            Status::Converged => Ok(self),
            Status::MaxIters | Status::Inexact => Err(ShootError::NonConvergence {
                j: self.j,
                residual: self.residual,
                iters: self.iters,
            }),
        }
    }
}

/// Root-finding method selector and parameters.
#[derive(Clone, Debug)]
pub enum Method {
    /// Use [bisection][bisect].
    Bisection {
        /// Bracket containing a sign change of the residual.
        bracket: (f64, f64),
        /// Desired accuracy bound (default: `1e-6`).
        epsilon: Option<f64>,
        /// Maximum number of iterations (default: `1000`).
        maxiters: Option<usize>,
    },
    /// Use a [secant search][secant].
    Secant {
        /// Initial guesses.
        guesses: (f64, f64),
        /// Desired accuracy bound (default: `1e-6`).
        epsilon: Option<f64>,
        /// Maximum number of iterations (default: `1000`).
        maxiters: Option<usize>,
    },
    /// Use a [residual scan][scan].
    Scan {
        /// Ordered trial values over which to compute the residual.
        J: nd::Array1<f64>,
        /// Desired accuracy bound (default: `1e-6`).
        epsilon: Option<f64>,
    },
}

impl Default for Method {
    fn default() -> Self {
        Self::Bisection { bracket: DEF_BRACKET, epsilon: None, maxiters: None }
    }
}

impl Method {
    /// Return `true` if `self` is `Bisection`.
    pub fn is_bisection(&self) -> bool {
        matches!(self, Self::Bisection { .. })
    }

    /// Return `true` if `self` is `Secant`.
    pub fn is_secant(&self) -> bool {
        matches!(self, Self::Secant { .. })
    }

    /// Return `true` if `self` is `Scan`.
    pub fn is_scan(&self) -> bool {
        matches!(self, Self::Scan { .. })
    }
}

// integrate once more at an accepted root to recover the full curves
fn finish<S>(params: &Params, ivp_method: ivp::Method, x: &Arr1<S>, root: Root)
    -> ShootResult<Solution>
where S: nd::Data<Elem = f64>
{
    let currents = ivp::shoot(params, ivp_method, root.j, x)?;
    Ok(Solution {
        j: root.j,
        residual: currents.residual(),
        iters: root.iters,
        status: root.status,
        bracket: root.bracket,
        currents,
    })
}

/// Master solving function for all [methods][Method], returning every root
/// found.
///
/// Bracketing and secant methods return a single solution; a scan returns one
/// per sign change of the residual.
pub fn solve_all<S>(
    params: &Params,
    x: &Arr1<S>,
    ivp_method: ivp::Method,
    method: Method,
) -> ShootResult<Vec<Solution>>
where S: nd::Data<Elem = f64>
{
    IvpError::check_grid(x)?;
    let f = |j: f64| residual(params, ivp_method, j, x);
    match method {
        Method::Bisection { bracket, epsilon, maxiters } => {
            let root = bisect(
                f,
                bracket,
                epsilon.unwrap_or(DEF_EPSILON),
                maxiters.unwrap_or(DEF_MAXITERS),
            )?;
            finish(params, ivp_method, x, root).map(|s| vec![s])
        },
        Method::Secant { guesses, epsilon, maxiters } => {
            let root = secant(
                f,
                guesses,
                epsilon.unwrap_or(DEF_EPSILON),
                maxiters.unwrap_or(DEF_MAXITERS),
            )?;
            finish(params, ivp_method, x, root).map(|s| vec![s])
        },
        Method::Scan { J, epsilon } => {
            scan(f, &J, epsilon.unwrap_or(DEF_EPSILON))?.into_iter()
                .map(|root| finish(params, ivp_method, x, root))
                .collect()
        },
    }
}

/// Master solving function for all [methods][Method].
///
/// For a scan, the root with the smallest `J` is returned.
pub fn solve<S>(
    params: &Params,
    x: &Arr1<S>,
    ivp_method: ivp::Method,
    method: Method,
) -> ShootResult<Solution>
where S: nd::Data<Elem = f64>
{
    solve_all(params, x, ivp_method, method)?
        .into_iter()
        .next()
        .ok_or(ShootError::NoRoots)
}

/// Simple record to keep track of material constants and the coordinate grid.
///
/// Grids held by this type are guaranteed to be strictly increasing with at
/// least two points.
#[derive(Clone, Debug)]
pub struct System {
    // material constants
    params: Params,
    // coordinate array
    x: nd::Array1<f64>,
}

impl System {
    /// Create a new `System` over the unit interval with `npoints` evenly
    /// spaced points.
    ///
    /// *Panics if the number of points is less than 2*.
    pub fn new_linspace(params: Params, npoints: usize) -> Self {
        assert!(npoints >= 2, "System::new_linspace: npoints must be at least 2");
        let x: nd::Array1<f64> = nd::Array1::linspace(0.0, 1.0, npoints);
        Self { params, x }
    }

    /// Create a new `System` from a bare coordinate array.
    pub fn new_grid(params: Params, x: nd::Array1<f64>) -> ShootResult<Self> {
        IvpError::check_grid(&x)?;
        Ok(Self { params, x })
    }

    /// Get a reference to the material constants.
    pub fn get_params(&self) -> &Params { &self.params }

    /// Get a reference to the coordinate array.
    pub fn get_x(&self) -> &nd::Array1<f64> { &self.x }

    /// Get the length of the coordinate array.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.x.len() }

    /// Carrier densities `(n, p)` over the coordinate array.
    pub fn densities(&self) -> (nd::Array1<f64>, nd::Array1<f64>) {
        (profile::n_profile(&self.x), profile::p_profile(&self.x))
    }

    /// Thin interface to [`ivp::shoot`].
    pub fn shoot(&self, ivp_method: ivp::Method, j: f64) -> ShootResult<Currents> {
        Ok(ivp::shoot(&self.params, ivp_method, j, &self.x)?)
    }

    /// Thin interface to [`residual`].
    pub fn residual(&self, ivp_method: ivp::Method, j: f64) -> ShootResult<f64> {
        residual(&self.params, ivp_method, j, &self.x)
    }

    /// Thin interface to [`solve`].
    pub fn solve(&self, ivp_method: ivp::Method, method: Method)
        -> ShootResult<Solution>
    {
        solve(&self.params, &self.x, ivp_method, method)
    }

    /// Thin interface to [`solve_all`].
    pub fn solve_all(&self, ivp_method: ivp::Method, method: Method)
        -> ShootResult<Vec<Solution>>
    {
        solve_all(&self.params, &self.x, ivp_method, method)
    }

    /// Solve with fixed-step RK4 and bisection over the default bracket.
    pub fn solve_default(&self) -> ShootResult<Solution> {
        self.solve(ivp::Method::default(), Method::default())
    }
}
