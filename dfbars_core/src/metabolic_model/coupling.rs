//! Provides struct for representing a linear coupling between reaction fluxes
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Represents a linear constraint over reaction fluxes
///
/// The constraint requires the weighted sum of the named fluxes to stay
/// within `[lower_bound, upper_bound]`. An equality coupling (such as pinning
/// a product demand to a fixed proportion of carbon uptake) uses the same
/// value for both bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxCoupling {
    /// Used to identify the coupling
    pub id: String,
    /// Linear terms which are added together, see [`CouplingTerm`] for more
    pub terms: Vec<CouplingTerm>,
    /// The lowest value the sum of the terms can take
    pub lower_bound: f64,
    /// The highest value the sum of the terms can take
    pub upper_bound: f64,
}

impl FluxCoupling {
    /// Create a new equality coupling
    ///
    /// # Parameters
    /// - `id`: Identifier for the coupling
    /// - `reactions`: A slice of reaction ids
    /// - `coefficients`: A slice of coefficients for the reactions
    /// - `equals`: The value the weighted sum must take
    ///
    /// # Examples
    /// ```rust
    /// use dfbars_core::metabolic_model::coupling::FluxCoupling;
    /// // Require flux through A031 to be 15% of the flux through A015
    /// let coupling = FluxCoupling::new_equality("SA_flux", &["A031", "A015"], &[1.0, -0.15], 0.0);
    /// ```
    pub fn new_equality(id: &str, reactions: &[&str], coefficients: &[f64], equals: f64) -> Self {
        FluxCoupling {
            id: id.to_string(),
            terms: Self::zip_into_terms(reactions, coefficients),
            lower_bound: equals,
            upper_bound: equals,
        }
    }

    /// Create a new inequality coupling
    pub fn new_inequality(
        id: &str,
        reactions: &[&str],
        coefficients: &[f64],
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        FluxCoupling {
            id: id.to_string(),
            terms: Self::zip_into_terms(reactions, coefficients),
            lower_bound,
            upper_bound,
        }
    }

    /// Evaluate the weighted sum of this coupling against a flux distribution
    ///
    /// Returns None if any reaction in the coupling is missing from the
    /// distribution.
    pub fn evaluate(&self, fluxes: &IndexMap<String, f64>) -> Option<f64> {
        let mut total = 0.0;
        for term in &self.terms {
            total += term.coefficient * fluxes.get(&term.reaction)?;
        }
        Some(total)
    }

    /// Take a slice of reaction ids, and a slice of coefficients and zip
    /// them together into a vec of CouplingTerms
    fn zip_into_terms(reactions: &[&str], coefficients: &[f64]) -> Vec<CouplingTerm> {
        reactions
            .iter()
            .zip(coefficients)
            .map(|(reaction, coefficient)| CouplingTerm {
                reaction: reaction.to_string(),
                coefficient: *coefficient,
            })
            .collect()
    }
}

impl Display for FluxCoupling {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let terms = self
            .terms
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(" + ");
        write!(f, "{} <= {} <= {}", self.lower_bound, terms, self.upper_bound)
    }
}

/// Represents a single term in a coupling, specifically
/// the multiplication of the `reaction` flux by the `coefficient`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouplingTerm {
    /// Id of a reaction in the model
    pub reaction: String,
    /// The coefficient for the reaction flux
    pub coefficient: f64,
}

impl Display for CouplingTerm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}*{}", self.coefficient, self.reaction)
    }
}
