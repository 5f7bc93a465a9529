//! Run configuration shared by every experiment variant
use derive_builder::Builder;

use crate::dfba::species::{SpeciesRole, TrackedSpecies, TrackedSpeciesBuilder};
use crate::kinetics::KineticsTable;
use crate::metabolic_model::coupling::FluxCoupling;

/// Configuration of one dFBA run
///
/// One struct covers the wild-type co-metabolism runs (single model, any
/// number of substrates), the knockout-strain runs (derived model plus
/// transport pinning and a product), and the bioproduct overexpression runs
/// (single model plus a demand-to-uptake ratio coupling).
#[derive(Builder, Clone, Debug)]
pub struct Experiment {
    /// Inoculum density at time zero, g/L
    #[builder(default = "0.001")]
    pub starting_biomass: f64,
    /// Minutes between timepoints
    #[builder(default = "30.0")]
    pub step_minutes: f64,
    /// Number of integration steps after the initial condition
    #[builder(default = "1000")]
    pub steps: usize,
    /// Every species the run tracks, in output column order
    pub species: Vec<TrackedSpecies>,
    /// Species whose summed concentration drives the exhaustion stop
    pub carbon_sources: Vec<String>,
    /// Reactions pinned from the baseline into the derived model each step
    #[builder(default = "Vec::new()")]
    pub transport_reactions: Vec<String>,
    /// Product watched by the stagnation stop condition
    #[builder(default = "None")]
    pub product: Option<String>,
    /// Extra flux couplings installed on the baseline model before the run
    ///
    /// The derived model is left uncoupled: with its product pathway carrying
    /// no degradative flux, a ratio constraint there would force every flux
    /// to zero.
    #[builder(default = "Vec::new()")]
    pub couplings: Vec<FluxCoupling>,
    /// Whether a negative growth flux halts the run instead of only warning
    #[builder(default = "false")]
    pub halt_on_reverse_growth: bool,
    /// Kinetic parameter table used by the bound setter
    #[builder(default = "KineticsTable::with_defaults()")]
    pub kinetics: KineticsTable,
}

impl Experiment {
    /// The mineral medium species of DSMZ 1185 standard mineral base plus the
    /// diffusion-fed environment species
    ///
    /// Iron, ammonia, phosphate and sulfate under saturation kinetics;
    /// hydrogen, water and oxygen effectively unconstrained.
    pub fn standard_mineral_base() -> Vec<TrackedSpecies> {
        let media = [
            ("exC14818", 45.54),
            ("exC00014", 10.0),
            ("exC00009", 26.1),
            ("exC00059", 8.0),
        ];
        let environment = [("C00282", 10.0), ("exC00001", 100.0), ("exC00007", 10.0)];

        let mut species = Vec::new();
        for (id, concentration) in media {
            species.push(
                TrackedSpeciesBuilder::default()
                    .id(id.to_string())
                    .role(SpeciesRole::MediaComponent)
                    .initial_concentration(concentration)
                    .build()
                    .unwrap(),
            );
        }
        for (id, concentration) in environment {
            species.push(
                TrackedSpeciesBuilder::default()
                    .id(id.to_string())
                    .role(SpeciesRole::Environment)
                    .initial_concentration(concentration)
                    .build()
                    .unwrap(),
            );
        }
        species
    }

    /// The out-flux species the base model must be allowed to secrete
    pub fn default_outfluxes() -> Vec<TrackedSpecies> {
        let outfluxes = [
            ("C00067", 0.0),
            ("C00058", 0.0),
            ("C00033", 0.0),
            ("C00010", 1.0),
            ("C00162", 1.0),
            ("C00132", 0.0),
            ("C00054", 0.0),
            ("C00011", 0.0),
            ("C05198", 0.0),
            ("C04425", 0.0),
            ("C00266", 0.0),
            ("C00153", 0.0),
        ];
        outfluxes
            .into_iter()
            .map(|(id, concentration)| {
                TrackedSpeciesBuilder::default()
                    .id(id.to_string())
                    .role(SpeciesRole::OutFlux)
                    .initial_concentration(concentration)
                    .build()
                    .unwrap()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let experiment = ExperimentBuilder::default()
            .species(vec![TrackedSpeciesBuilder::default()
                .id("exVA".to_string())
                .role(SpeciesRole::KineticSubstrate)
                .initial_concentration(4.0)
                .build()
                .unwrap()])
            .carbon_sources(vec!["exVA".to_string()])
            .build()
            .unwrap();

        assert!((experiment.starting_biomass - 0.001).abs() < 1e-25);
        assert!((experiment.step_minutes - 30.0).abs() < 1e-25);
        assert_eq!(experiment.steps, 1000);
        assert!(experiment.transport_reactions.is_empty());
        assert!(experiment.product.is_none());
        assert!(!experiment.halt_on_reverse_growth);
    }

    #[test]
    fn mineral_base_composition() {
        let species = Experiment::standard_mineral_base();
        assert_eq!(species.len(), 7);
        let ammonia = species.iter().find(|s| s.id == "exC00014").unwrap();
        assert_eq!(ammonia.role, SpeciesRole::MediaComponent);
        assert!((ammonia.initial_concentration - 10.0).abs() < 1e-25);
        let water = species.iter().find(|s| s.id == "exC00001").unwrap();
        assert_eq!(water.role, SpeciesRole::Environment);
    }

    #[test]
    fn outflux_roles() {
        let species = Experiment::default_outfluxes();
        assert!(species.iter().all(|s| s.role == SpeciesRole::OutFlux));
        let coa = species.iter().find(|s| s.id == "C00010").unwrap();
        assert!((coa.initial_concentration - 1.0).abs() < 1e-25);
    }
}
