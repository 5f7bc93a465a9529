//! This module provides the Model struct for representing an entire metabolic model
use crate::configuration::CONFIGURATION;
use crate::metabolic_model::coupling::FluxCoupling;
use crate::metabolic_model::reaction::Reaction;

use indexmap::IndexMap;
use thiserror::Error;

/// Represents the bound surface of a Genome Scale Metabolic Model
///
/// The stoichiometric interior of the model belongs to the external solver;
/// this struct carries what the simulation loop needs to read and mutate
/// between solves: reactions with their bound pairs, the objective reaction
/// id, and any fixed-ratio flux couplings.
#[derive(Clone, Debug)]
pub struct Model {
    /// Map of reaction ids to Reaction objects
    pub reactions: IndexMap<String, Reaction>,
    /// Id of the reaction whose flux is the optimization objective
    pub objective_reaction: String,
    /// Linear couplings between reaction fluxes, honored by the solver
    pub couplings: Vec<FluxCoupling>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

impl Model {
    /// Create a new model with no reactions and the given objective reaction id
    pub fn new(objective_reaction: &str) -> Self {
        Model {
            reactions: IndexMap::new(),
            objective_reaction: objective_reaction.to_string(),
            couplings: Vec::new(),
            id: None,
            version: None,
        }
    }

    /// Add a reaction to the model
    ///
    /// # Parameters
    /// - reaction: Reaction to add
    ///
    /// # Examples
    /// ```rust
    /// use dfbars_core::metabolic_model::model::Model;
    /// use dfbars_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new("biomass");
    /// let new_reaction = ReactionBuilder::default().id("new_reaction".to_string()).build().unwrap();
    /// model.add_reaction(new_reaction);
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) {
        let id = reaction.id.clone();
        self.reactions.insert(id, reaction);
    }

    /// Whether the model contains a reaction with the given id
    pub fn has_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    /// Get a reference to a reaction by id
    pub fn reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))
    }

    /// Get the bound pair of a reaction by id
    pub fn bounds(&self, id: &str) -> Result<(f64, f64), ModelError> {
        let reaction = self.reaction(id)?;
        Ok((reaction.lower_bound, reaction.upper_bound))
    }

    /// Update the bound pair of a reaction
    ///
    /// Rejects `lower_bound > upper_bound`; callers that need to move both
    /// bounds through a narrow target should use [`Model::pin_flux`], which
    /// orders the writes so the pair never transits an invalid state.
    pub fn update_bounds(
        &mut self,
        id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        if lower_bound > upper_bound {
            return Err(ModelError::InvalidBounds {
                reaction: id.to_string(),
                lower_bound,
                upper_bound,
            });
        }
        let reaction = self
            .reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))?;
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(())
    }

    /// Pin a reaction's flux to an exact value
    ///
    /// Widens the upper bound first, then raises the lower bound, then
    /// narrows the upper bound onto the target, so that `lower <= upper`
    /// holds after every individual write regardless of the starting pair.
    pub fn pin_flux(&mut self, id: &str, value: f64) -> Result<(), ModelError> {
        let default_upper = CONFIGURATION.read().unwrap().upper_bound;
        let reaction = self
            .reactions
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownReaction(id.to_string()))?;
        reaction.upper_bound = if value > default_upper { value } else { default_upper };
        reaction.lower_bound = value;
        reaction.upper_bound = value;
        Ok(())
    }

    /// Add a flux coupling to the model
    ///
    /// # Parameters
    /// - coupling: FluxCoupling to add
    ///
    /// Validates that the coupling's bounds are ordered, its id is unused,
    /// and every reaction it references exists in the model.
    pub fn add_coupling(&mut self, coupling: FluxCoupling) -> Result<(), ModelError> {
        if coupling.lower_bound > coupling.upper_bound {
            return Err(ModelError::InvalidCouplingBounds(coupling.id));
        }
        if self.couplings.iter().any(|c| c.id == coupling.id) {
            return Err(ModelError::CouplingAlreadyExists(coupling.id));
        }
        for term in &coupling.terms {
            if !self.has_reaction(&term.reaction) {
                return Err(ModelError::UnknownReactionInCoupling {
                    coupling: coupling.id.clone(),
                    reaction: term.reaction.clone(),
                });
            }
        }
        self.couplings.push(coupling);
        Ok(())
    }
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone)]
pub enum ModelError {
    /// Error when accessing a reaction id that is not in the model
    #[error("Reaction {0} is not present in the model")]
    UnknownReaction(String),
    /// Error when trying to set a bound pair with lower_bound > upper_bound
    #[error("Tried to set bounds on {reaction} with lower_bound {lower_bound} > upper_bound {upper_bound}")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    /// Error when trying to add a coupling with the same id as an existing coupling
    #[error("Tried to add a coupling with the same id as existing coupling {0}")]
    CouplingAlreadyExists(String),
    /// Error when trying to add a coupling with lower_bound > upper_bound
    #[error("Tried to add coupling {0} with lower_bound > upper_bound")]
    InvalidCouplingBounds(String),
    /// Error when a coupling references a reaction not in the model
    #[error("Coupling {coupling} references reaction {reaction} which is not in the model")]
    UnknownReactionInCoupling { coupling: String, reaction: String },
}
