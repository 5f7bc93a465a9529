//! Pins a derived model's transport fluxes to a baseline solution
//!
//! A strain engineered for product formation would, under free optimization
//! for biomass, never take up the shared carbon and aromatic sources — the
//! product pathway is a metabolic burden. The derived (gene-deleted) model is
//! therefore not allowed to choose its own uptake: each designated transport
//! reaction is pinned to the flux the baseline model solved for under the
//! same environmental bounds. The coupling runs one way, once per timestep.
use crate::dfba::DfbaError;
use crate::metabolic_model::model::Model;
use crate::optimize::FluxSolution;

/// Pin each designated transport reaction of `derived` to the baseline flux
///
/// Bound writes go through [`Model::pin_flux`], which widens before it
/// narrows so the bound pair never holds `lower > upper` mid-update.
pub(crate) fn pin_transports(
    derived: &mut Model,
    baseline_solution: &FluxSolution,
    transport_reactions: &[String],
) -> Result<(), DfbaError> {
    for reaction in transport_reactions {
        let flux = baseline_solution
            .flux(reaction)
            .ok_or_else(|| DfbaError::MissingFlux {
                model: "baseline".to_string(),
                reaction: reaction.clone(),
            })?;
        derived.pin_flux(reaction, flux)?;
    }
    Ok(())
}
