//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Shooting](#shooting)
//! - [Integrators](#integrators)
//! - [Root-finding](#root-finding)
//!
//! # Background
//! In one dimension and at steady state, the hole and electron current
//! densities *j*<sub>p</sub> and *j*<sub>n</sub> in a semiconductor obey the
//! continuity equations
//! ```text
//! ∂j_p
//! ---- =  R(x)
//!  ∂x
//!
//! ∂j_n
//! ---- = -R(x)
//!  ∂x
//! ```
//! where the net generation-recombination term takes the bimolecular form
//! ```text
//! R(x) = Θ (n_i² - n(x) p(x)) + G
//! ```
//! with *Θ* a reaction-rate coefficient, *G* a uniform generation rate and
//! *n*<sub>i</sub> the intrinsic carrier density. Here the carrier densities
//! are taken to be fixed,
//! ```text
//! n(x) = exp(-x - x²/100) (1 - x²)²
//! p(x) = exp( x - x²/100) (1 - x²)²
//! ```
//! so that both are equal to 1 at *x* = 0 and vanish at *x* = 1. Because the
//! two right-hand sides are equal and opposite, the total current
//! *j*<sub>p</sub> + *j*<sub>n</sub> is constant over the device.
//!
//! # Shooting
//! We look for the solution on *x* ∊ \[0, 1\] satisfying
//! ```text
//! j_p(0) = j_n(0)
//! j_n(1) = 0
//! ```
//! which is a two-point boundary value problem. The shooting method replaces
//! it with an initial value problem parameterized by the unknown common value
//! *J* = *j*<sub>p</sub>(0) = *j*<sub>n</sub>(0): for each trial *J* the
//! system is integrated from *x* = 0 to *x* = 1, and the boundary residual
//! ```text
//! F(J) = j_n(1; J)
//! ```
//! is recorded. The solution of the boundary value problem is then the root
//! *J*\* of *F*.
//!
//! For this particular system *R* does not depend on the currents, so that
//! ```text
//!               1
//! F(J) = J - ∫ R(x) dx
//!              0
//! ```
//! is affine in *J* with unit slope. This makes the problem a convenient test
//! case: bisection converges at exactly its linear rate, the secant method
//! converges in a single step, and the exact answer is available by
//! quadrature.
//!
//! # Integrators
//! The [`ivp`][crate::ivp] module provides three explicit schemes, each
//! taking a state vector from one grid point to the next.
//!
//! Forward Euler,
//! ```text
//! y[k + 1] = y[k] + h f(x[k], y[k])
//! ```
//! has a global error of *O*(*h*).
//!
//! The classical fourth-order Runge-Kutta scheme,
//! ```text
//! k₁ = f(x, y)
//! k₂ = f(x + h/2, y + (h/2) k₁)
//! k₃ = f(x + h/2, y + (h/2) k₂)
//! k₄ = f(x + h, y + h k₃)
//! y → y + (h/6) (k₁ + 2 k₂ + 2 k₃ + k₄)
//! ```
//! has a global error of *O*(*h*⁴). When *f* depends only on *x*, as it does
//! here, this reduces to Simpson's rule on each interval.
//!
//! The adaptive variant takes sub-steps between grid points whose size is
//! chosen by step doubling: one step of size *h* is compared against two of
//! size *h*/2, and the difference is used as an estimate of the local
//! truncation error. The step is accepted if the estimate lies below the
//! requested relative bound, and the next step size is scaled by the usual
//! factor of (error ratio)<sup>-1/5</sup>, clamped to within a factor of 4.
//!
//! # Root-finding
//! Given a bracket \[*J*<sub>lo</sub>, *J*<sub>hi</sub>\] over which *F*
//! changes sign, bisection evaluates *F* at the midpoint and keeps whichever
//! half still contains a sign change. The bracket width after *k* iterations is
//! (*J*<sub>hi</sub> - *J*<sub>lo</sub>) / 2<sup>*k*</sup>, so reaching a
//! tolerance *ε* from a bracket of width *w* takes ⌈log₂(*w*/*ε*)⌉ iterations.
//!
//! The secant method instead extrapolates the line through the two most recent
//! evaluations to zero,
//! ```text
//!                  J[k] - J[k - 1]
//! J[k + 1] = J[k] - ----------------- F(J[k])
//!                  F(J[k]) - F(J[k - 1])
//! ```
//! and converges superlinearly near a simple root, but without a bracket it
//! carries no guarantee of convergence.
//!
//! Finally, *F* can be sampled over a set of trial values and its zeros located
//! by [interpolation][crate::interp::find_zeros], which finds every root in
//! the sampled range at the cost of one integration per sample.
