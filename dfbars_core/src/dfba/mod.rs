//! Module providing the dynamic flux balance analysis loop
//!
//! The submodules follow the flow of one timestep: kinetic rate bounds are
//! refreshed on every live model ([`bounds`]), the models are solved through
//! the external adapter (with the derived model pinned to the baseline's
//! transport fluxes, [`coupler`]), and the solution drives the mass-balance
//! update recorded in the [`trajectory`]. The [`integrator`] owns the loop
//! and its stop conditions; [`experiment`] is the run configuration shared
//! by every variant.

pub mod bounds;
pub mod coupler;
pub mod experiment;
pub mod integrator;
pub mod species;
pub mod trajectory;

use thiserror::Error;

use crate::metabolic_model::model::ModelError;

/// Configuration and bookkeeping errors raised by a dFBA run
///
/// Everything here is fatal: it aborts the run with no partial output.
/// Solver infeasibility is deliberately absent; it is a simulation outcome
/// handled by the integrator, not an error.
#[derive(Error, Debug, Clone)]
pub enum DfbaError {
    /// Error from the underlying model surface
    #[error(transparent)]
    Model(#[from] ModelError),
    /// Error when the starting biomass is zero or negative
    #[error("Starting biomass must be positive, got {0}")]
    InvalidStartingBiomass(f64),
    /// Error when the step duration is zero or negative
    #[error("Step duration must be positive, got {0} minutes")]
    InvalidStepDuration(f64),
    /// Error when the step budget is zero
    #[error("Step budget must be at least 1")]
    EmptyStepBudget,
    /// Error when the same species id is tracked twice
    #[error("Species {0} is tracked more than once")]
    DuplicateSpecies(String),
    /// Error when a species starts below zero concentration
    #[error("Initial concentration of {species} is negative ({concentration})")]
    NegativeInitialConcentration { species: String, concentration: f64 },
    /// Error when a species' boundary reaction is absent from a model
    #[error("Species {species} resolves to boundary reaction {reaction}, which is missing from the {model} model")]
    MissingBoundaryReaction {
        species: String,
        reaction: String,
        model: String,
    },
    /// Error when no carbon source is designated for the stop condition
    #[error("No carbon source designated for the stop condition")]
    NoCarbonSource,
    /// Error when a designated carbon source is not a tracked species
    #[error("Carbon source {0} is not among the tracked species")]
    UnknownCarbonSource(String),
    /// Error when the designated product is not a tracked species
    #[error("Product {0} is not among the tracked species")]
    UnknownProduct(String),
    /// Error when transport reactions are designated without a derived model
    #[error("Transport reactions designated but no derived model supplied")]
    MissingDerivedModel,
    /// Error when a designated transport reaction is absent from a model
    #[error("Transport reaction {reaction} is missing from the {model} model")]
    MissingTransportReaction { reaction: String, model: String },
    /// Error when a model's objective reaction is absent from that model
    #[error("Objective reaction {reaction} is missing from the {model} model")]
    MissingObjective { reaction: String, model: String },
    /// Error when a solution carries no flux for a reaction the run tracks
    #[error("Solution from the {model} model carries no flux for reaction {reaction}")]
    MissingFlux { model: String, reaction: String },
}
