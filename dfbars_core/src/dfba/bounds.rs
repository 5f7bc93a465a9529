//! Per-step translation of concentrations into exchange flux bounds
use log::warn;

use crate::configuration::CONFIGURATION;
use crate::dfba::species::{ResolvedSpecies, SpeciesRole};
use crate::dfba::trajectory::Trajectory;
use crate::dfba::DfbaError;
use crate::kinetics::KineticsTable;
use crate::metabolic_model::model::Model;

/// What the bound refresh observed this step
#[derive(Clone, Debug, Default)]
pub(crate) struct BoundRefresh {
    /// Species whose uptake rate was capped to the remaining concentration
    pub capped: Vec<String>,
}

impl BoundRefresh {
    /// Whether any species outside the given carbon sources was capped
    ///
    /// Capping on the carbon source is the expected way a run winds down;
    /// capping anywhere else feeds the stagnation stop condition.
    pub fn capped_outside(&self, carbon_sources: &[String]) -> bool {
        self.capped.iter().any(|id| !carbon_sources.contains(id))
    }
}

/// Refresh the exchange bounds of every tracked species on every live model
///
/// For substrates and media components the instantaneous uptake rate comes
/// from the kinetics table (substrate-inhibited and plain saturation laws
/// respectively), capped so one step can consume at most the remaining
/// concentration, and applied symmetrically as `[-rate, +rate]` (negative
/// flux is uptake, positive is secretion). Substrates below the exhaustion
/// epsilon are snapped to exactly zero first. Any exhausted species except
/// out-fluxes gets both bounds forced to zero on every model.
///
/// All model instances receive identical bounds so that the baseline and a
/// derived knockout strain stay comparable within the step.
pub(crate) fn refresh_bounds(
    trajectory: &mut Trajectory,
    species: &[ResolvedSpecies],
    kinetics: &KineticsTable,
    biomass: f64,
    step_minutes: f64,
    models: &mut [&mut Model],
) -> Result<BoundRefresh, DfbaError> {
    let epsilon = CONFIGURATION.read().unwrap().concentration_epsilon;
    let mut refresh = BoundRefresh::default();

    for sp in species {
        if matches!(sp.role, SpeciesRole::KineticSubstrate | SpeciesRole::MediaComponent) {
            let concentration = trajectory.latest(&sp.id);
            let parameters = kinetics.parameters_for(&sp.id);

            let mut rate = match sp.role {
                SpeciesRole::KineticSubstrate => {
                    if concentration < epsilon {
                        trajectory.snap_latest_zero(&sp.id);
                        0.0
                    } else {
                        parameters.inhibited_rate(concentration)
                    }
                }
                _ => parameters.saturating_rate(concentration),
            };

            let available = trajectory.latest(&sp.id);
            if available < rate * biomass * step_minutes {
                warn!(
                    "Maximum allowed rate exceeds remaining concentration of {} - resetting max rate {}",
                    sp.id, rate
                );
                rate = available / (biomass * step_minutes);
                refresh.capped.push(sp.id.clone());
            }

            for model in models.iter_mut() {
                model.update_bounds(&sp.reaction, -rate, rate)?;
            }
        }

        if sp.role.clamps_on_exhaustion() && trajectory.latest(&sp.id) <= 0.0 {
            for model in models.iter_mut() {
                model.update_bounds(&sp.reaction, 0.0, 0.0)?;
            }
        }
    }

    Ok(refresh)
}
