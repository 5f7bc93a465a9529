//! Module providing JSON IO for experiment definitions
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dfba::experiment::{Experiment, ExperimentBuilder};
use crate::dfba::species::{SpeciesRole, TrackedSpecies, TrackedSpeciesBuilder};
use crate::io::IoError;
use crate::kinetics::KineticsTable;
use crate::metabolic_model::coupling::FluxCoupling;

// region JSON Experiment
/// Represents a JSON serialized experiment, used for reading run definitions
#[derive(Serialize, Deserialize)]
struct JsonExperiment {
    starting_biomass: Option<f64>,
    step_minutes: Option<f64>,
    steps: Option<usize>,
    species: Vec<JsonSpecies>,
    carbon_sources: Vec<String>,
    transport_reactions: Option<Vec<String>>,
    product: Option<String>,
    couplings: Option<Vec<FluxCoupling>>,
    halt_on_reverse_growth: Option<bool>,
    /// Full kinetics table override; when absent the published defaults apply
    kinetics: Option<KineticsTable>,
}

#[derive(Serialize, Deserialize)]
struct JsonSpecies {
    id: String,
    role: SpeciesRole,
    initial_concentration: Option<f64>,
    boundary_reaction: Option<String>,
}

impl JsonExperiment {
    /// Read a json file into a JsonExperiment
    fn read_to_json_experiment<P: AsRef<Path>>(path: P) -> Result<JsonExperiment, IoError> {
        let json_data = fs::read_to_string(&path)
            .map_err(|_| IoError::FileNotFound(path.as_ref().display().to_string()))?;
        Ok(serde_json::from_str(&json_data)?)
    }

    /// Convert the mirror struct into a validated domain Experiment
    fn into_experiment(self) -> Result<Experiment, IoError> {
        let species = self
            .species
            .into_iter()
            .map(|sp| sp.into_tracked_species())
            .collect::<Result<Vec<_>, _>>()?;

        let mut builder = ExperimentBuilder::default();
        builder.species(species).carbon_sources(self.carbon_sources);
        if let Some(value) = self.starting_biomass {
            builder.starting_biomass(value);
        }
        if let Some(value) = self.step_minutes {
            builder.step_minutes(value);
        }
        if let Some(value) = self.steps {
            builder.steps(value);
        }
        if let Some(value) = self.transport_reactions {
            builder.transport_reactions(value);
        }
        builder.product(self.product);
        if let Some(value) = self.couplings {
            builder.couplings(value);
        }
        if let Some(value) = self.halt_on_reverse_growth {
            builder.halt_on_reverse_growth(value);
        }
        if let Some(value) = self.kinetics {
            builder.kinetics(value);
        }
        builder
            .build()
            .map_err(|e| IoError::InvalidExperiment(e.to_string()))
    }
}

impl JsonSpecies {
    fn into_tracked_species(self) -> Result<TrackedSpecies, IoError> {
        let mut builder = TrackedSpeciesBuilder::default();
        builder.id(self.id).role(self.role);
        if let Some(value) = self.initial_concentration {
            builder.initial_concentration(value);
        }
        builder.boundary_reaction(self.boundary_reaction);
        builder
            .build()
            .map_err(|e| IoError::InvalidExperiment(e.to_string()))
    }
}
// endregion JSON Experiment

/// Read an experiment definition from a JSON file
pub fn experiment_from_json_file<P: AsRef<Path>>(path: P) -> Result<Experiment, IoError> {
    JsonExperiment::read_to_json_experiment(path)?.into_experiment()
}

/// Read an experiment definition from a JSON string
pub fn experiment_from_json_string(data: &str) -> Result<Experiment, IoError> {
    let json_experiment: JsonExperiment = serde_json::from_str(data)?;
    json_experiment.into_experiment()
}
