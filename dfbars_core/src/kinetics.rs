//! Saturation kinetics for substrate uptake rate bounds
//!
//! Rates are pure functions of a parameter triple and the current
//! concentration; the classification of species ids into chemical families
//! lives in a [`KineticsTable`] that experiments can extend or override
//! (including from JSON) rather than a hard-coded lookup.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Kinetic parameter triple for one chemical family
///
/// Units follow the source data: vmax in mmol/(g·min), ks and ki in mmol/L.
/// The parameters are literature estimates from related bacteria, not
/// experimentally verified.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct KineticParameters {
    /// Maximum uptake rate
    pub vmax: f64,
    /// Half-saturation constant
    pub ks: f64,
    /// Substrate inhibition constant
    pub ki: f64,
}

impl KineticParameters {
    /// Uptake rate with substrate inhibition
    ///
    /// `vmax * c / ((c + ks) * (1 + c/ki))`
    pub fn inhibited_rate(&self, concentration: f64) -> f64 {
        if concentration <= 0.0 {
            return 0.0;
        }
        self.vmax * concentration
            / ((concentration + self.ks) * (1.0 + concentration / self.ki))
    }

    /// Uptake rate with plain saturation, no inhibition term
    ///
    /// `vmax * c / (c + ks)`
    pub fn saturating_rate(&self, concentration: f64) -> f64 {
        if concentration <= 0.0 {
            return 0.0;
        }
        self.vmax * concentration / (concentration + self.ks)
    }
}

/// Chemical families sharing one kinetic parameter triple
///
/// The three aromatic classes follow the structural types of lignin-derived
/// monomers and dimers (syringyl, hydroxyphenyl, guaiacyl).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubstrateFamily {
    /// Sugars and other non-aromatic carbon sources
    Sugar,
    /// S-type (syringyl) aromatics
    AromaticS,
    /// H-type (hydroxyphenyl) aromatics
    AromaticH,
    /// G-type (guaiacyl) aromatics
    AromaticG,
    Ammonia,
    Phosphate,
    Sulfate,
    Iron,
}

/// Classification of species ids into families, plus per-family parameters
///
/// Species ids not present in the table are inert: their parameters carry a
/// zero vmax, so every rate law returns 0 for them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KineticsTable {
    /// Map of species id to its chemical family
    families: IndexMap<String, SubstrateFamily>,
    /// Map of family to its kinetic parameters
    parameters: IndexMap<SubstrateFamily, KineticParameters>,
    /// Parameters returned for unclassified species
    #[serde(default = "KineticsTable::inert_parameters")]
    inert: KineticParameters,
}

impl KineticsTable {
    /// Create an empty table: every species is inert until assigned
    pub fn empty() -> Self {
        KineticsTable {
            families: IndexMap::new(),
            parameters: IndexMap::new(),
            inert: Self::inert_parameters(),
        }
    }

    /// Create a table with the published family assignments and parameters
    pub fn with_defaults() -> Self {
        let mut table = Self::empty();

        table.set_parameters(
            SubstrateFamily::Sugar,
            KineticParameters { vmax: 0.5, ks: 0.139, ki: 0.139 },
        );
        table.set_parameters(
            SubstrateFamily::AromaticS,
            KineticParameters { vmax: 0.582, ks: 0.05, ki: 0.05 },
        );
        table.set_parameters(
            SubstrateFamily::AromaticH,
            KineticParameters { vmax: 0.902, ks: 0.05, ki: 0.05 },
        );
        table.set_parameters(
            SubstrateFamily::AromaticG,
            KineticParameters { vmax: 0.569, ks: 0.1, ki: 0.1 },
        );
        table.set_parameters(
            SubstrateFamily::Ammonia,
            KineticParameters { vmax: 0.5, ks: 0.1, ki: 0.1 },
        );
        table.set_parameters(
            SubstrateFamily::Phosphate,
            KineticParameters { vmax: 0.060, ks: 0.002, ki: 0.1 },
        );
        table.set_parameters(
            SubstrateFamily::Sulfate,
            KineticParameters { vmax: 0.0017, ks: 0.003, ki: 0.1 },
        );
        table.set_parameters(
            SubstrateFamily::Iron,
            KineticParameters { vmax: 0.0017, ks: 0.003, ki: 0.1 },
        );

        for id in [
            "exC00031", "exC00243", "exC00033", "exC00022", "exC00095", "exC00181", "exC00208",
            "exC00185",
        ] {
            table.assign(id, SubstrateFamily::Sugar);
        }
        for id in ["exSA", "exS", "exSDK"] {
            table.assign(id, SubstrateFamily::AromaticS);
        }
        for id in ["expHBA", "exPCA", "exC00633", "exC00180", "exC00156"] {
            table.assign(id, SubstrateFamily::AromaticH);
        }
        for id in [
            "exVA", "exV", "exFA", "exGDK", "exSRGGE", "exSSGGE", "exRRGGE", "exRSGGE",
        ] {
            table.assign(id, SubstrateFamily::AromaticG);
        }
        table.assign("exC00014", SubstrateFamily::Ammonia);
        table.assign("exC00009", SubstrateFamily::Phosphate);
        table.assign("exC00059", SubstrateFamily::Sulfate);
        table.assign("exC14818", SubstrateFamily::Iron);

        table
    }

    /// Assign a species id to a family
    pub fn assign(&mut self, species_id: &str, family: SubstrateFamily) {
        self.families.insert(species_id.to_string(), family);
    }

    /// Set the parameters for a family
    pub fn set_parameters(&mut self, family: SubstrateFamily, parameters: KineticParameters) {
        self.parameters.insert(family, parameters);
    }

    /// Family of a species, None if unclassified
    pub fn family(&self, species_id: &str) -> Option<SubstrateFamily> {
        self.families.get(species_id).copied()
    }

    /// Parameters for a species, falling back to the inert triple
    pub fn parameters_for(&self, species_id: &str) -> KineticParameters {
        self.families
            .get(species_id)
            .and_then(|family| self.parameters.get(family))
            .copied()
            .unwrap_or(self.inert)
    }

    fn inert_parameters() -> KineticParameters {
        KineticParameters { vmax: 0.0, ks: 0.0, ki: 0.1 }
    }
}
