//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use thiserror::Error;

/// Returned when an operation requiring equal-length arrays encounters arrays
/// with unequal length.
#[derive(Debug, Error)]
#[error("encountered arrays with incompatible lengths; got {0} and {1}")]
pub struct LengthError(pub usize, pub usize);

impl LengthError {
    pub(crate) fn check<S, A, T, B>(
        a: &nd::ArrayBase<S, nd::Ix1>,
        b: &nd::ArrayBase<T, nd::Ix1>,
    ) -> Result<(), Self>
    where
        S: nd::Data<Elem = A>,
        T: nd::Data<Elem = B>,
    {
        let na = a.len();
        let nb = b.len();
        (na == nb).then_some(()).ok_or(Self(na, nb))
    }
}

/// Returned from a call to [`find_zeros`][crate::interp::find_zeros] when data
/// arrays are less than 5 elements long.
#[derive(Debug, Error)]
#[error("coordinate arrays in interpolation must be longer than 4 elements; got {0}")]
pub struct LagrangeError(pub usize);

impl LagrangeError {
    pub(crate) fn check<S, A>(a: &nd::ArrayBase<S, nd::Ix1>)
        -> Result<(), Self>
    where S: nd::Data<Elem = A>
    {
        let n = a.len();
        (n > 4).then_some(()).ok_or(Self(n))
    }
}

/// Returned from functions in [`interp`][crate::interp].
#[derive(Debug, Error)]
pub enum InterpError {
    /// [`LengthError`]
    #[error("length error: {0}")]
    Length(#[from] LengthError),

    /// [`LagrangeError`]
    #[error("lagrange error: {0}")]
    Lagrange(#[from] LagrangeError),
}

/// Returned from initial value problem integrators in [`ivp`][crate::ivp].
#[derive(Debug, Error)]
pub enum IvpError {
    /// Returned when a coordinate grid has fewer than two points.
    #[error("coordinate grid must have at least 2 points; got {0}")]
    GridTooShort(usize),

    /// Returned when a coordinate grid is not strictly increasing.
    #[error("coordinate grid must be strictly increasing; violated at index {0}")]
    GridNotIncreasing(usize),

    /// Returned when a non-positive `epsilon` value is encountered.
    #[error("epsilon values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when the initial state contains non-finite values.
    #[error("initial state must be finite")]
    BadInitial,

    /// Returned when the integrated state becomes non-finite.
    #[error("integration produced non-finite values at x = {x}")]
    Overflow {
        /// Coordinate at which the overflow was detected.
        x: f64,
    },

    /// Returned when the adaptive integrator cannot satisfy its local error
    /// bound with a step size that still advances the coordinate.
    #[error("rka error bound could not be satisfied at x = {x}")]
    ErrorBound {
        /// Coordinate at which the step was attempted.
        x: f64,
    },
}

impl IvpError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_grid<S>(x: &nd::ArrayBase<S, nd::Ix1>)
        -> Result<(), Self>
    where S: nd::Data<Elem = f64>
    {
        let n = x.len();
        if n < 2 { return Err(Self::GridTooShort(n)); }
        match x.iter().zip(x.iter().skip(1)).position(|(xk, xkp1)| xkp1 <= xk) {
            Some(k) => Err(Self::GridNotIncreasing(k + 1)),
            None => Ok(()),
        }
    }
}

/// Returned from shooting solver functions in [`solve`][crate::solve].
#[derive(Debug, Error)]
pub enum ShootError {
    /// Returned when a non-positive `epsilon` value is encountered.
    #[error("epsilon values must be greater than 0; got {0}")]
    BadEpsilon(f64),

    /// Returned when a non-positive `maxiters` value is encountered.
    #[error("maxiters must be greater than 0; got {0}")]
    BadMaxiters(usize),

    /// Returned when a bracket or pair of initial guesses is non-finite or
    /// degenerate.
    #[error("bracket endpoints must be finite and distinct; got ({0}, {1})")]
    BadBracket(f64, f64),

    /// Returned when the residual has the same sign at both ends of a bracket.
    #[error("no sign change in bracket: F({lo}) = {flo:e}, F({hi}) = {fhi:e}")]
    InvalidBracket {
        /// Lower end of the bracket.
        lo: f64,
        /// Upper end of the bracket.
        hi: f64,
        /// Residual at `lo`.
        flo: f64,
        /// Residual at `hi`.
        fhi: f64,
    },

    /// Returned when a residual evaluation is non-finite without having been
    /// flagged by the integrator.
    #[error("residual is non-finite at J = {0}")]
    NonFiniteResidual(f64),

    /// Returned when a secant step cannot be taken because two successive
    /// residuals are equal.
    #[error("secant search stalled at J = {0}: zero residual slope")]
    Stalled(f64),

    /// Returned by [`Solution::into_converged`][crate::solve::Solution::into_converged]
    /// when the iteration limit was reached before the tolerance was met.
    #[error("iteration limit reached after {iters} iterations; best estimate J = {j} with residual {residual:e}")]
    NonConvergence {
        /// Best estimate of the shooting parameter.
        j: f64,
        /// Residual at the best estimate.
        residual: f64,
        /// Number of iterations performed.
        iters: usize,
    },

    /// Returned when a scan finds no sign change in the residual.
    #[error("residual scan found no roots")]
    NoRoots,

    /// [`IvpError`]
    #[error("integration error: {0}")]
    Ivp(#[from] IvpError),

    /// [`InterpError`]
    #[error("interpolation error: {0}")]
    Interp(#[from] InterpError),
}

impl ShootError {
    pub(crate) fn check_epsilon(epsilon: f64) -> Result<(), Self> {
        (epsilon > 0.0).then_some(()).ok_or(Self::BadEpsilon(epsilon))
    }

    pub(crate) fn check_maxiters(maxiters: usize) -> Result<(), Self> {
        (maxiters != 0).then_some(()).ok_or(Self::BadMaxiters(maxiters))
    }

    pub(crate) fn check_bracket(bracket: (f64, f64)) -> Result<(), Self> {
        let (a, b) = bracket;
        (a.is_finite() && b.is_finite() && a != b)
            .then_some(())
            .ok_or(Self::BadBracket(a, b))
    }
}

/// Returned when loading a [`Config`][crate::config::Config].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Returned when a configuration file cannot be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when a configuration cannot be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Returned when a configuration has fewer than two grid points.
    #[error("npoints must be at least 2; got {0}")]
    BadNpoints(usize),

    /// Returned when a configured log level is not a recognized name.
    #[error("unknown log level '{0}'")]
    BadLogLevel(String),

    /// Returned when a configured parameter is out of range.
    #[error("invalid setting: {0}")]
    Shoot(#[from] ShootError),
}
