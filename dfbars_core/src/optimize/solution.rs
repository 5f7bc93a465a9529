//! Provides struct representing a solved flux distribution
use indexmap::IndexMap;

use crate::optimize::OptimizationStatus;

/// Struct representing the solution to one flux optimization
///
/// Immutable once produced. A solution normally lives for a single timestep;
/// the integrator retains the last valid one only to drive the
/// post-exhaustion extrapolation tail.
#[derive(Clone, Debug)]
pub struct FluxSolution {
    /// The status the solver finished with
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    pub objective_value: f64,
    /// Flux per reaction at the optimum, keyed by reaction id
    pub fluxes: IndexMap<String, f64>,
}

impl FluxSolution {
    /// Create a new solution with Optimal status
    pub fn new(objective_value: f64, fluxes: IndexMap<String, f64>) -> Self {
        FluxSolution {
            status: OptimizationStatus::Optimal,
            objective_value,
            fluxes,
        }
    }

    /// Flux carried by a reaction, None if the reaction is not in the solution
    pub fn flux(&self, reaction_id: &str) -> Option<f64> {
        self.fluxes.get(reaction_id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flux_lookup() {
        let mut fluxes = IndexMap::new();
        fluxes.insert("biomass".to_string(), 0.004);
        fluxes.insert("EX_exVA".to_string(), -0.3);
        let solution = FluxSolution::new(0.004, fluxes);

        assert_eq!(solution.status, OptimizationStatus::Optimal);
        assert!((solution.flux("EX_exVA").unwrap() - -0.3).abs() < 1e-25);
        assert!(solution.flux("EX_missing").is_none());
    }
}
