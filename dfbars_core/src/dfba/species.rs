//! This module provides a struct for representing tracked species
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Category a tracked species belongs to
///
/// The role decides which rate law bounds the species' exchange, whether the
/// species can exhaust, and which boundary reaction prefix resolves its
/// default reaction id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciesRole {
    /// Carbon substrate consumed under substrate-inhibition kinetics
    KineticSubstrate,
    /// Mineral medium component consumed under plain saturation kinetics
    MediaComponent,
    /// Species in large excess through diffusion, not rate-bounded
    Environment,
    /// Secreted product tracked through a demand reaction
    OutFlux,
}

impl SpeciesRole {
    /// Prefix of the default boundary reaction id for this role
    pub fn boundary_prefix(&self) -> &'static str {
        match self {
            SpeciesRole::OutFlux => "DM_",
            _ => "EX_",
        }
    }

    /// Whether an exhausted species must have its boundary forced shut
    ///
    /// Out-fluxes only ever leave the cell; everything else gets both bounds
    /// pinned to zero the moment its concentration reaches zero.
    pub fn clamps_on_exhaustion(&self) -> bool {
        !matches!(self, SpeciesRole::OutFlux)
    }
}

/// A species whose concentration the simulation tracks over time
#[derive(Builder, Clone, Debug)]
pub struct TrackedSpecies {
    /// Used to identify the species (compound id)
    pub id: String,
    /// Category of the species (see [`SpeciesRole`])
    pub role: SpeciesRole,
    /// Concentration at the start of the run, mmol/L
    #[builder(default = "0.0")]
    pub initial_concentration: f64,
    /// Boundary reaction override
    ///
    /// When None, the reaction id is the role's prefix followed by the
    /// species id (`EX_exVA`, `DM_PDC`). The resolved id is validated against
    /// every model instance before the run starts.
    #[builder(default = "None")]
    pub boundary_reaction: Option<String>,
}

impl TrackedSpecies {
    /// The boundary reaction id this species reads and writes
    pub fn boundary_reaction_id(&self) -> String {
        match &self.boundary_reaction {
            Some(id) => id.clone(),
            None => format!("{}{}", self.role.boundary_prefix(), self.id),
        }
    }
}

/// A tracked species with its boundary reaction resolved and validated
#[derive(Clone, Debug)]
pub(crate) struct ResolvedSpecies {
    pub id: String,
    pub role: SpeciesRole,
    pub reaction: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_boundary_reactions() {
        let substrate = TrackedSpeciesBuilder::default()
            .id("exVA".to_string())
            .role(SpeciesRole::KineticSubstrate)
            .initial_concentration(4.0)
            .build()
            .unwrap();
        assert_eq!(substrate.boundary_reaction_id(), "EX_exVA");

        let product = TrackedSpeciesBuilder::default()
            .id("PDC".to_string())
            .role(SpeciesRole::OutFlux)
            .build()
            .unwrap();
        assert_eq!(product.boundary_reaction_id(), "DM_PDC");
    }

    #[test]
    fn boundary_override() {
        let species = TrackedSpeciesBuilder::default()
            .id("exSA".to_string())
            .role(SpeciesRole::KineticSubstrate)
            .boundary_reaction(Some("EX_syringate".to_string()))
            .build()
            .unwrap();
        assert_eq!(species.boundary_reaction_id(), "EX_syringate");
    }

    #[test]
    fn exhaustion_clamping_by_role() {
        assert!(SpeciesRole::KineticSubstrate.clamps_on_exhaustion());
        assert!(SpeciesRole::MediaComponent.clamps_on_exhaustion());
        assert!(SpeciesRole::Environment.clamps_on_exhaustion());
        assert!(!SpeciesRole::OutFlux.clamps_on_exhaustion());
    }
}
