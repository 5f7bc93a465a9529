//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Represents a reaction in the metabolic model
///
/// Only the surface the simulation loop touches is modeled here: an
/// identifier, a mutable bound pair, and the reaction's boundary role.
/// Stoichiometry and gene associations live in the external solver's
/// representation of the same model.
#[derive(Builder, Debug, Clone)]
pub struct Reaction {
    /// Used to identify the reaction
    pub id: String,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Role the reaction plays at the model boundary (see [`ReactionKind`])
    #[builder(default = "ReactionKind::Internal")]
    pub kind: ReactionKind,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
}

impl Reaction {
    /// Whether this reaction crosses the model boundary (exchange or demand)
    pub fn is_boundary(&self) -> bool {
        matches!(self.kind, ReactionKind::Exchange | ReactionKind::Demand)
    }

    /// Whether the bound pair allows no flux in either direction
    pub fn is_blocked(&self) -> bool {
        self.lower_bound == 0.0 && self.upper_bound == 0.0
    }
}

/// Role of a reaction at the model boundary
///
/// Exchange reactions carry uptake (negative flux) and secretion (positive
/// flux) of a metabolite; demand reactions force one-way output. Transport
/// reactions move metabolites across internal compartments and are the
/// reactions pinned during two-model coupling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactionKind {
    /// Boundary reaction for uptake and secretion of one metabolite
    Exchange,
    /// Boundary reaction forcing output of one metabolite
    Demand,
    /// Cross-membrane transport reaction
    Transport,
    /// Any other reaction in the network
    Internal,
}
