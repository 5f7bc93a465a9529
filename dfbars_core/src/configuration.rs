use std::sync::{LazyLock, RwLock};
use std::time::Duration;

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Default lower flux bound applied to reactions without an explicit bound
    pub lower_bound: f64,
    /// Default upper flux bound applied to reactions without an explicit bound
    pub upper_bound: f64,
    /// Tolerance used when comparing solved fluxes against pinned values
    pub tolerance: f64,
    /// Concentrations below this are treated as exhausted and snapped to zero
    pub concentration_epsilon: f64,
    /// Wall clock budget for a single solve, enforced by [`crate::optimize::GuardedSolver`]
    pub solve_time_limit: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            concentration_epsilon: 1e-07,
            solve_time_limit: Duration::from_secs(60),
        }
    }
}
