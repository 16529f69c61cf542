//! Run configuration for the shooting solver, loadable from JSON.
//!
//! Every field has a default, so an empty object `{}` describes the worked
//! example: Θ = 0.9, G = 1, n_i = 0.6 on 1001 points, bisection over
//! `J ∈ [0, 5]` to `1e-6` with fixed-step RK4.
//!
//! ```
//! use jshoot::config::Config;
//!
//! let config = Config::from_json_str(r#"{ "g": 0.5, "root": "secant" }"#)
//!     .unwrap();
//! assert_eq!(config.g, 0.5);
//! assert_eq!(config.theta, 0.9);
//! ```

use std::{ fs, path::Path };
use serde::{ Deserialize, Serialize };
use log::LevelFilter;
use crate::{
    error::{ ConfigError, ShootError },
    ivp,
    profile::Params,
    solve::{ self, System, DEF_BRACKET },
    DEF_EPSILON,
    DEF_MAXITERS,
};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Root-finder choice for a configured run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootMethod {
    /// Bisection over `bracket`.
    #[default]
    Bisection,
    /// Secant search using the ends of `bracket` as initial guesses.
    Secant,
}

/// Parameters for a single solve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Reaction-rate coefficient Θ
    pub theta: f64,
    /// Generation rate G
    pub g: f64,
    /// Intrinsic carrier density n_i
    pub ni: f64,
    /// Number of evenly spaced grid points on [0, 1]
    pub npoints: usize,
    /// Bracket (or initial guesses) for `J`
    pub bracket: (f64, f64),
    /// Convergence tolerance on the residual and bracket width
    pub epsilon: f64,
    /// Iteration limit for the root-finder
    pub maxiters: usize,
    /// Integration scheme
    pub integrator: ivp::Method,
    /// Root-finding scheme
    pub root: RootMethod,
    /// Log verbosity: `off`, `error`, `warn`, `info`, `debug` or `trace`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let params = Params::default();
        Self {
            theta: params.theta,
            g: params.g,
            ni: params.ni,
            npoints: 1001,
            bracket: DEF_BRACKET,
            epsilon: DEF_EPSILON,
            maxiters: DEF_MAXITERS,
            integrator: ivp::Method::default(),
            root: RootMethod::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Parse and validate a configuration from a JSON string.
    pub fn from_json_str(s: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Check that all settings are in range.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.npoints < 2 { return Err(ConfigError::BadNpoints(self.npoints)); }
        ShootError::check_epsilon(self.epsilon)?;
        ShootError::check_maxiters(self.maxiters)?;
        ShootError::check_bracket(self.bracket)?;
        if let ivp::Method::RKA { epsilon } = self.integrator {
            ShootError::check_epsilon(epsilon)?;
        }
        self.level_filter()?;
        Ok(())
    }

    /// Material constants.
    pub fn params(&self) -> Params { Params::new(self.theta, self.g, self.ni) }

    /// Validate and build the [`System`] described by this configuration.
    pub fn system(&self) -> ConfigResult<System> {
        self.validate()?;
        Ok(System::new_linspace(self.params(), self.npoints))
    }

    /// Integration and root-finding methods described by this configuration.
    pub fn methods(&self) -> (ivp::Method, solve::Method) {
        let root
            = match self.root {
                RootMethod::Bisection => solve::Method::Bisection {
                    bracket: self.bracket,
                    epsilon: Some(self.epsilon),
                    maxiters: Some(self.maxiters),
                },
                RootMethod::Secant => solve::Method::Secant {
                    guesses: self.bracket,
                    epsilon: Some(self.epsilon),
                    maxiters: Some(self.maxiters),
                },
            };
        (self.integrator, root)
    }

    /// Log verbosity.
    pub fn level_filter(&self) -> ConfigResult<LevelFilter> {
        self.log_level.parse()
            .map_err(|_| ConfigError::BadLogLevel(self.log_level.clone()))
    }
}
