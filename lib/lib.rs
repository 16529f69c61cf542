#![allow(non_snake_case)]

//! Provides functions and higher-level constructs for the solution of the
//! one-dimensional, steady-state current-continuity equations of a
//! semiconductor via the shooting method.
//!
//! The two-point boundary value problem
//! ```text
//! d(j_p)/dx =  Θ (n_i² - n(x) p(x)) + G
//! d(j_n)/dx = -Θ (n_i² - n(x) p(x)) - G
//! j_p(0) = j_n(0) = J,  j_n(1) = 0
//! ```
//! is converted to an initial value problem in the unknown `J`, which is then
//! found by root-finding on the boundary residual `F(J) = j_n(1; J)`.
//!
//! Provides implementations for the following numerical routines:
//! - Initial value problems:
//!     - Forward Euler
//!     - Fourth-order Runge-Kutta (fixed or adaptive stepsize)
//! - Root-finding on the boundary residual:
//!     - Bisection
//!     - Secant search
//!     - Residual scan with Lagrange-interpolated zero detection
//!
//! See [`docs`] for theoretical background.
//!
//! ```
//! use jshoot::{ profile::Params, solve::System };
//!
//! let sys = System::new_linspace(Params::default(), 1001);
//! let sol = sys.solve_default().unwrap();
//! assert!(sol.is_converged());
//! assert!(sol.residual.abs() < 1e-6);
//! ```

pub mod config;
pub mod error;
pub mod interp;
pub mod ivp;
pub mod profile;
pub mod solve;
pub mod utils;

pub mod docs;

pub(crate) const DEF_EPSILON: f64 = 1e-6;
pub(crate) const DEF_MAXITERS: usize = 1000;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
