//! Fixed carrier-density profiles and the net generation-recombination term
//! they drive.
//!
//! Both densities vanish at `x = ±1` and equal 1 at `x = 0`:
//! ```text
//! n(x) = exp(-x - x²/100) (1 - x²)²
//! p(x) = exp( x - x²/100) (1 - x²)²
//! ```

use ndarray as nd;
use serde::{ Deserialize, Serialize };
use crate::Arr1;

/// Electron density at position `x`.
pub fn n(x: f64) -> f64 {
    (-x - x.powi(2) / 100.0).exp() * (1.0 - x.powi(2)).powi(2)
}

/// Hole density at position `x`.
pub fn p(x: f64) -> f64 {
    (x - x.powi(2) / 100.0).exp() * (1.0 - x.powi(2)).powi(2)
}

/// Electron density sampled over a coordinate array.
pub fn n_profile<S>(x: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    x.mapv(n)
}

/// Hole density sampled over a coordinate array.
pub fn p_profile<S>(x: &Arr1<S>) -> nd::Array1<f64>
where S: nd::Data<Elem = f64>
{
    x.mapv(p)
}

/// Material constants of the continuity model.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Params {
    /// Reaction-rate coefficient Θ
    pub theta: f64,
    /// Generation rate G
    pub g: f64,
    /// Intrinsic carrier density n_i
    pub ni: f64,
}

impl Default for Params {
    fn default() -> Self { Self { theta: 0.9, g: 1.0, ni: 0.6 } }
}

impl Params {
    pub fn new(theta: f64, g: f64, ni: f64) -> Self { Self { theta, g, ni } }

    /// Net rate `Θ (n_i² - n(x) p(x)) + G`, equal to `d(j_p)/dx` and
    /// `-d(j_n)/dx`.
    pub fn rate(&self, x: f64) -> f64 {
        self.theta * (self.ni.powi(2) - n(x) * p(x)) + self.g
    }

    /// [`Self::rate`] sampled over a coordinate array.
    pub fn rate_profile<S>(&self, x: &Arr1<S>) -> nd::Array1<f64>
    where S: nd::Data<Elem = f64>
    {
        x.mapv(|xk| self.rate(xk))
    }
}
