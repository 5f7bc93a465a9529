//! The dFBA time-step integrator
//!
//! Advances concentrations and biomass one explicit Euler step at a time,
//! with each step's fluxes taken from a fresh loopless solve under bounds
//! derived from the current concentrations. Once a stop condition fires the
//! run switches to an extrapolation tail that freezes biomass and keeps
//! mass-balancing from the last valid solution, mirroring the lab
//! observation that consumption and product formation continue for a while
//! after growth stops being solvable.
use log::warn;

use crate::dfba::bounds;
use crate::dfba::coupler;
use crate::dfba::experiment::Experiment;
use crate::dfba::species::{ResolvedSpecies, SpeciesRole};
use crate::dfba::trajectory::Trajectory;
use crate::dfba::DfbaError;
use crate::metabolic_model::model::Model;
use crate::optimize::{FluxSolution, FluxSolver};

/// Why a run stopped
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// The step budget was used up without any stop condition firing
    BudgetExhausted,
    /// The designated carbon sources were fully consumed
    CarbonExhausted { step: usize },
    /// The product stagnated while a non-carbon uptake was capped
    Stalled { step: usize },
    /// A solve failed (infeasible, unbounded, numerical, or guard tripped)
    SolverFailed { step: usize },
    /// Growth flux went negative and the experiment halts on reverse growth
    ReverseGrowth { step: usize },
}

/// Result of a completed run
#[derive(Clone, Debug)]
pub struct RunReport {
    /// The recorded time series
    pub trajectory: Trajectory,
    /// Why the run ended
    pub stop: StopReason,
}

/// What one integration step decided about the run's continuation
enum StepOutcome {
    /// Keep stepping
    Continue,
    /// Stop before the next step begins (this step's row is kept)
    RaiseNext(StopReason),
    /// Stop now
    StopNow(StopReason),
}

/// One dFBA run over a baseline model and an optional derived model
///
/// Owns the model instances for the duration of the run: bounds are mutated
/// in place every step by this single owner, and each step's bound state is
/// consumed by the solve before the next step begins.
pub struct DfbaRun<S> {
    experiment: Experiment,
    species: Vec<ResolvedSpecies>,
    baseline: Model,
    derived: Option<Model>,
    solver: S,
    trajectory: Trajectory,
    last_solution: Option<FluxSolution>,
}

impl<S: FluxSolver> DfbaRun<S> {
    /// Validate an experiment against its model instances and set up the run
    ///
    /// Every tracked species' boundary reaction, every transport reaction,
    /// and each model's objective reaction are resolved here, once; a
    /// missing reaction id is a configuration error and nothing is solved.
    pub fn new(
        experiment: Experiment,
        mut baseline: Model,
        derived: Option<Model>,
        solver: S,
    ) -> Result<Self, DfbaError> {
        if experiment.starting_biomass <= 0.0 {
            return Err(DfbaError::InvalidStartingBiomass(experiment.starting_biomass));
        }
        if experiment.step_minutes <= 0.0 {
            return Err(DfbaError::InvalidStepDuration(experiment.step_minutes));
        }
        if experiment.steps == 0 {
            return Err(DfbaError::EmptyStepBudget);
        }
        if experiment.carbon_sources.is_empty() {
            return Err(DfbaError::NoCarbonSource);
        }
        if !experiment.transport_reactions.is_empty() && derived.is_none() {
            return Err(DfbaError::MissingDerivedModel);
        }

        let mut species = Vec::with_capacity(experiment.species.len());
        for (index, sp) in experiment.species.iter().enumerate() {
            if experiment.species[..index].iter().any(|other| other.id == sp.id) {
                return Err(DfbaError::DuplicateSpecies(sp.id.clone()));
            }
            if sp.initial_concentration < 0.0 {
                return Err(DfbaError::NegativeInitialConcentration {
                    species: sp.id.clone(),
                    concentration: sp.initial_concentration,
                });
            }
            species.push(ResolvedSpecies {
                id: sp.id.clone(),
                role: sp.role,
                reaction: sp.boundary_reaction_id(),
            });
        }

        let mut instances: Vec<(&str, &Model)> = vec![("baseline", &baseline)];
        if let Some(model) = &derived {
            instances.push(("derived", model));
        }
        for (label, model) in &instances {
            for sp in &species {
                if !model.has_reaction(&sp.reaction) {
                    return Err(DfbaError::MissingBoundaryReaction {
                        species: sp.id.clone(),
                        reaction: sp.reaction.clone(),
                        model: label.to_string(),
                    });
                }
            }
            if !model.has_reaction(&model.objective_reaction) {
                return Err(DfbaError::MissingObjective {
                    reaction: model.objective_reaction.clone(),
                    model: label.to_string(),
                });
            }
            for reaction in &experiment.transport_reactions {
                if !model.has_reaction(reaction) {
                    return Err(DfbaError::MissingTransportReaction {
                        reaction: reaction.clone(),
                        model: label.to_string(),
                    });
                }
            }
        }

        for id in &experiment.carbon_sources {
            if !species.iter().any(|sp| &sp.id == id) {
                return Err(DfbaError::UnknownCarbonSource(id.clone()));
            }
        }
        if let Some(product) = &experiment.product {
            if !species.iter().any(|sp| &sp.id == product) {
                return Err(DfbaError::UnknownProduct(product.clone()));
            }
        }

        for coupling in &experiment.couplings {
            baseline.add_coupling(coupling.clone())?;
        }

        let mut trajectory = Trajectory::new(experiment.starting_biomass);
        for sp in &experiment.species {
            trajectory.add_species(&sp.id, sp.initial_concentration);
        }

        Ok(DfbaRun {
            experiment,
            species,
            baseline,
            derived,
            solver,
            trajectory,
            last_solution: None,
        })
    }

    /// The time series recorded so far
    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    /// Drive the run to completion and return the recorded trajectory
    pub fn run(mut self) -> Result<RunReport, DfbaError> {
        let mut stop = None;
        let mut raised: Option<StopReason> = None;

        for step in 1..=self.experiment.steps {
            if let Some(reason) = raised.take() {
                stop = Some(reason);
                break;
            }
            match self.advance(step)? {
                StepOutcome::Continue => {}
                StepOutcome::RaiseNext(reason) => raised = Some(reason),
                StepOutcome::StopNow(reason) => {
                    stop = Some(reason);
                    break;
                }
            }
        }
        // A stop raised on the final step never got consumed by the loop
        let stop = stop.or(raised).unwrap_or(StopReason::BudgetExhausted);

        if matches!(
            stop,
            StopReason::CarbonExhausted { .. }
                | StopReason::Stalled { .. }
                | StopReason::SolverFailed { .. }
        ) {
            self.extrapolate()?;
        }

        Ok(RunReport {
            trajectory: self.trajectory,
            stop,
        })
    }

    /// Run one integration step
    fn advance(&mut self, step: usize) -> Result<StepOutcome, DfbaError> {
        let biomass = self.trajectory.latest_biomass();
        let step_minutes = self.experiment.step_minutes;

        let refresh = {
            let mut models: Vec<&mut Model> = Vec::with_capacity(2);
            models.push(&mut self.baseline);
            if let Some(derived) = self.derived.as_mut() {
                models.push(derived);
            }
            bounds::refresh_bounds(
                &mut self.trajectory,
                &self.species,
                &self.experiment.kinetics,
                biomass,
                step_minutes,
                &mut models,
            )?
        };

        let baseline_solution = match self.solver.solve_loopless(&self.baseline) {
            Ok(solution) => solution,
            Err(err) => {
                warn!("step {}: baseline solve failed: {}", step, err);
                return Ok(StepOutcome::StopNow(StopReason::SolverFailed { step }));
            }
        };

        // The derived model's solution, when present, is the one that drives
        // the mass balance from here on
        let authoritative = match self.derived.as_mut() {
            Some(derived) => {
                coupler::pin_transports(
                    derived,
                    &baseline_solution,
                    &self.experiment.transport_reactions,
                )?;
                match self.solver.solve_loopless(derived) {
                    Ok(solution) => solution,
                    Err(err) => {
                        warn!("step {}: derived solve failed: {}", step, err);
                        return Ok(StepOutcome::StopNow(StopReason::SolverFailed { step }));
                    }
                }
            }
            None => baseline_solution,
        };

        let authoritative_label = if self.derived.is_some() { "derived" } else { "baseline" };
        let objective = match &self.derived {
            Some(model) => model.objective_reaction.clone(),
            None => self.baseline.objective_reaction.clone(),
        };
        let growth = authoritative
            .flux(&objective)
            .ok_or_else(|| DfbaError::MissingFlux {
                model: authoritative_label.to_string(),
                reaction: objective,
            })?;

        self.trajectory
            .record_biomass(biomass + growth * biomass * step_minutes);

        self.emit_limiting_diagnostics(step, &authoritative);

        // Mass balance, reading each species' resolved boundary reaction
        let product_before = self
            .experiment
            .product
            .as_ref()
            .map(|id| self.trajectory.latest(id));
        self.trajectory
            .record_time(self.trajectory.latest_time() + step_minutes);
        for sp in &self.species {
            let flux = authoritative
                .flux(&sp.reaction)
                .ok_or_else(|| DfbaError::MissingFlux {
                    model: authoritative_label.to_string(),
                    reaction: sp.reaction.clone(),
                })?;
            let previous = self.trajectory.latest(&sp.id);
            let updated = (previous + flux * biomass * step_minutes).max(0.0);
            self.trajectory.record(&sp.id, updated);
        }

        // The tail phase reuses this solution if the next solve never happens
        self.last_solution = Some(authoritative);

        // Exhaustion is checked first and wins a same-step tie with the
        // stagnation stop; this step's row is kept either way
        let mut outcome = StepOutcome::Continue;
        if self.remaining_carbon() <= 0.0 {
            warn!("step {}: all carbon consumed", step);
            outcome = StepOutcome::RaiseNext(StopReason::CarbonExhausted { step });
        }

        if matches!(outcome, StepOutcome::Continue) {
            if let (Some(product), Some(before)) = (&self.experiment.product, product_before) {
                let unchanged = self.trajectory.latest(product) - before == 0.0;
                if unchanged && refresh.capped_outside(&self.experiment.carbon_sources) {
                    warn!("step {}: model solving no longer feasible", step);
                    return Ok(StepOutcome::StopNow(StopReason::Stalled { step }));
                }
            }
        }

        if growth < 0.0 {
            warn!("step {}: biomass running in reverse ({})", step, growth);
            if self.experiment.halt_on_reverse_growth
                && matches!(outcome, StepOutcome::Continue)
            {
                return Ok(StepOutcome::StopNow(StopReason::ReverseGrowth { step }));
            }
        }

        Ok(outcome)
    }

    /// Warn for any non-substrate species whose solved flux sits exactly on
    /// one of its own bounds
    ///
    /// The carbon substrate is supposed to be limiting, so it is skipped;
    /// anywhere else a flux at its bound usually means something besides
    /// carbon is limiting growth. Advisory only.
    fn emit_limiting_diagnostics(&self, step: usize, solution: &FluxSolution) {
        for sp in &self.species {
            if matches!(sp.role, SpeciesRole::KineticSubstrate) {
                continue;
            }
            let Ok((lower, upper)) = self.baseline.bounds(&sp.reaction) else {
                continue;
            };
            let Some(rate) = solution.flux(&sp.reaction) else {
                continue;
            };
            if (rate == upper && rate != 0.0) || (rate == lower && rate != 0.0) {
                warn!("step {}: {} uptake rate is limiting: {}", step, sp.id, rate);
            }
        }
    }

    /// Sum of the designated carbon sources' latest concentrations
    fn remaining_carbon(&self) -> f64 {
        self.experiment
            .carbon_sources
            .iter()
            .map(|id| self.trajectory.latest(id))
            .sum()
    }

    /// The frozen tail after a stop: no further solves, biomass held at its
    /// last value, concentrations advanced from the last valid solution
    /// until the carbon check trips or the step budget runs out
    fn extrapolate(&mut self) -> Result<(), DfbaError> {
        let Some(solution) = self.last_solution.take() else {
            return Ok(());
        };
        let step_minutes = self.experiment.step_minutes;
        let biomass = self.trajectory.latest_biomass();
        let mut completed = self.trajectory.rows() - 1;

        while completed < self.experiment.steps {
            if self.remaining_carbon() <= 0.0 {
                break;
            }
            self.trajectory
                .record_time(self.trajectory.latest_time() + step_minutes);
            self.trajectory.record_biomass(biomass);
            for sp in &self.species {
                let flux = solution
                    .flux(&sp.reaction)
                    .ok_or_else(|| DfbaError::MissingFlux {
                        model: "frozen".to_string(),
                        reaction: sp.reaction.clone(),
                    })?;
                let previous = self.trajectory.latest(&sp.id);
                let updated = (previous + flux * biomass * step_minutes).max(0.0);
                self.trajectory.record(&sp.id, updated);
            }
            completed += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dfba::experiment::ExperimentBuilder;
    use crate::dfba::species::{SpeciesRole, TrackedSpecies, TrackedSpeciesBuilder};
    use crate::metabolic_model::reaction::{ReactionBuilder, ReactionKind};
    use crate::optimize::solver::testing::FnSolver;
    use crate::optimize::SolverError;
    use indexmap::IndexMap;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn species(id: &str, role: SpeciesRole, initial: f64) -> TrackedSpecies {
        TrackedSpeciesBuilder::default()
            .id(id.to_string())
            .role(role)
            .initial_concentration(initial)
            .build()
            .unwrap()
    }

    fn model_with(id: &str, reactions: &[(&str, ReactionKind)]) -> Model {
        let mut model = Model::new("biomass");
        model.id = Some(id.to_string());
        model.add_reaction(
            ReactionBuilder::default()
                .id("biomass".to_string())
                .lower_bound(0.0)
                .build()
                .unwrap(),
        );
        for (reaction, kind) in reactions {
            model.add_reaction(
                ReactionBuilder::default()
                    .id(reaction.to_string())
                    .kind(*kind)
                    .build()
                    .unwrap(),
            );
        }
        model
    }

    /// Solver that grows at a fixed rate and takes up the full allowed
    /// uptake of every exchange reaction
    fn full_uptake_solver(
        growth: f64,
    ) -> FnSolver<impl FnMut(&Model) -> Result<FluxSolution, SolverError>> {
        FnSolver(move |model: &Model| {
            let mut fluxes = IndexMap::new();
            for (id, reaction) in &model.reactions {
                if id == "biomass" {
                    fluxes.insert(id.clone(), growth);
                } else if matches!(reaction.kind, ReactionKind::Exchange) {
                    fluxes.insert(id.clone(), reaction.lower_bound);
                } else {
                    fluxes.insert(id.clone(), 0.0);
                }
            }
            Ok(FluxSolution::new(growth, fluxes))
        })
    }

    fn single_substrate_experiment(initial: f64, steps: usize) -> Experiment {
        ExperimentBuilder::default()
            .species(vec![species("exVA", SpeciesRole::KineticSubstrate, initial)])
            .carbon_sources(vec!["exVA".to_string()])
            .steps(steps)
            .build()
            .unwrap()
    }

    #[test]
    fn biomass_follows_growth_recurrence() {
        let experiment = single_substrate_experiment(4.0, 3);
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(experiment, baseline, None, full_uptake_solver(0.004)).unwrap();
        let report = run.run().unwrap();

        assert_eq!(report.stop, StopReason::BudgetExhausted);
        let biomass = report.trajectory.biomass();
        assert_eq!(biomass.len(), 4);
        for i in 1..biomass.len() {
            let expected = biomass[i - 1] * (1.0 + 0.004 * 30.0);
            assert!((biomass[i] - expected).abs() < 1e-15);
        }
        // Substrate is consumed and never goes negative
        let substrate = report.trajectory.series("exVA").unwrap();
        for window in substrate.windows(2) {
            assert!(window[1] < window[0]);
            assert!(window[1] >= 0.0);
        }
    }

    #[test]
    fn mass_balance_uses_previous_biomass() {
        let experiment = single_substrate_experiment(4.0, 1);
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(experiment, baseline, None, full_uptake_solver(0.004)).unwrap();
        let report = run.run().unwrap();

        // The uptake bound for step 1 comes from the kinetics at 4.0 mmol/L
        let rate = crate::kinetics::KineticsTable::with_defaults()
            .parameters_for("exVA")
            .inhibited_rate(4.0);
        let expected = 4.0 - rate * 0.001 * 30.0;
        let substrate = report.trajectory.series("exVA").unwrap();
        assert!((substrate[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn zero_initial_carbon_halts_after_first_step() {
        let experiment = single_substrate_experiment(0.0, 100);
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(experiment, baseline, None, full_uptake_solver(0.0)).unwrap();
        let report = run.run().unwrap();

        assert_eq!(report.stop, StopReason::CarbonExhausted { step: 1 });
        // Initial row plus the single executed step; no extrapolation rows
        assert_eq!(report.trajectory.rows(), 2);
        for x in report.trajectory.biomass() {
            assert!((x - 0.001).abs() < 1e-25);
        }
    }

    #[test]
    fn capped_rate_drains_exactly_to_zero() {
        let experiment = ExperimentBuilder::default()
            .species(vec![species("exC00031", SpeciesRole::KineticSubstrate, 0.002)])
            .carbon_sources(vec!["exC00031".to_string()])
            .starting_biomass(50.0)
            .steps(10)
            .build()
            .unwrap();
        let baseline = model_with("wt", &[("EX_exC00031", ReactionKind::Exchange)]);
        let run = DfbaRun::new(experiment, baseline, None, full_uptake_solver(0.0)).unwrap();
        let report = run.run().unwrap();

        assert!(matches!(report.stop, StopReason::CarbonExhausted { .. }));
        let substrate = report.trajectory.series("exC00031").unwrap();
        // The capped rate consumes the remaining concentration; any sub-epsilon
        // rounding residue is snapped to exactly zero before the next solve
        assert_eq!(*substrate.last().unwrap(), 0.0);
        for value in substrate {
            assert!(*value >= 0.0);
        }
    }

    #[test]
    fn exhausted_substrate_bounds_forced_to_zero() {
        let bounds_seen = Rc::new(RefCell::new(Vec::new()));
        let record = bounds_seen.clone();
        let solver = FnSolver(move |model: &Model| {
            record
                .borrow_mut()
                .push(model.bounds("EX_exVA").unwrap());
            let mut fluxes = IndexMap::new();
            fluxes.insert("biomass".to_string(), 0.0);
            fluxes.insert("EX_exVA".to_string(), model.reaction("EX_exVA").unwrap().lower_bound);
            fluxes.insert("EX_exSA".to_string(), model.reaction("EX_exSA").unwrap().lower_bound);
            Ok(FluxSolution::new(0.0, fluxes))
        });

        // Second species keeps carbon positive so the run continues past the
        // exhaustion of the first
        let experiment = ExperimentBuilder::default()
            .species(vec![
                species("exVA", SpeciesRole::KineticSubstrate, 0.0),
                species("exSA", SpeciesRole::KineticSubstrate, 5.0),
            ])
            .carbon_sources(vec!["exVA".to_string(), "exSA".to_string()])
            .steps(2)
            .build()
            .unwrap();
        let baseline = model_with(
            "wt",
            &[
                ("EX_exVA", ReactionKind::Exchange),
                ("EX_exSA", ReactionKind::Exchange),
            ],
        );
        let run = DfbaRun::new(experiment, baseline, None, solver).unwrap();
        let report = run.run().unwrap();

        assert_eq!(report.stop, StopReason::BudgetExhausted);
        for (lower, upper) in bounds_seen.borrow().iter() {
            assert_eq!(*lower, 0.0);
            assert_eq!(*upper, 0.0);
        }
    }

    #[test]
    fn derived_model_transports_pinned_to_baseline() {
        let pinned_seen = Rc::new(RefCell::new(Vec::new()));
        let record = pinned_seen.clone();
        let solver = FnSolver(move |model: &Model| {
            let mut fluxes = IndexMap::new();
            match model.id.as_deref() {
                Some("wt") => {
                    fluxes.insert("biomass".to_string(), 0.004);
                    fluxes.insert("EX_exVA".to_string(), -0.2);
                    fluxes.insert("t0030".to_string(), 0.37);
                    fluxes.insert("DM_PDC".to_string(), 0.0);
                    Ok(FluxSolution::new(0.004, fluxes))
                }
                _ => {
                    let (lower, upper) = model.bounds("t0030").unwrap();
                    record.borrow_mut().push((lower, upper));
                    fluxes.insert("biomass".to_string(), 0.002);
                    fluxes.insert("EX_exVA".to_string(), -0.2);
                    // The derived model can only carry the pinned flux
                    fluxes.insert("t0030".to_string(), upper);
                    fluxes.insert("DM_PDC".to_string(), 0.05);
                    Ok(FluxSolution::new(0.002, fluxes))
                }
            }
        });

        let experiment = ExperimentBuilder::default()
            .species(vec![
                species("exVA", SpeciesRole::KineticSubstrate, 4.0),
                species("PDC", SpeciesRole::OutFlux, 0.0),
            ])
            .carbon_sources(vec!["exVA".to_string()])
            .transport_reactions(vec!["t0030".to_string()])
            .product(Some("PDC".to_string()))
            .steps(2)
            .build()
            .unwrap();
        let reactions = [
            ("EX_exVA", ReactionKind::Exchange),
            ("t0030", ReactionKind::Transport),
            ("DM_PDC", ReactionKind::Demand),
        ];
        let baseline = model_with("wt", &reactions);
        let derived = model_with("pdc", &reactions);
        let run = DfbaRun::new(experiment, baseline, Some(derived), solver).unwrap();
        let report = run.run().unwrap();

        // The derived model saw exactly the baseline's transport flux
        for (lower, upper) in pinned_seen.borrow().iter() {
            assert!((lower - 0.37).abs() < 1e-7);
            assert!((upper - 0.37).abs() < 1e-7);
        }

        // The derived solution is authoritative: biomass grows at 0.002 and
        // the product accumulates through its demand reaction
        let biomass = report.trajectory.biomass();
        assert!((biomass[1] - 0.001 * (1.0 + 0.002 * 30.0)).abs() < 1e-15);
        let product = report.trajectory.series("PDC").unwrap();
        assert!((product[1] - 0.05 * 0.001 * 30.0).abs() < 1e-15);
        assert!(product[2] > product[1]);
    }

    #[test]
    fn stagnant_product_with_capped_media_stalls_and_extrapolates() {
        let solver = FnSolver(|model: &Model| {
            let mut fluxes = IndexMap::new();
            fluxes.insert("biomass".to_string(), 0.001);
            fluxes.insert(
                "EX_exVA".to_string(),
                model.reaction("EX_exVA").unwrap().lower_bound,
            );
            fluxes.insert("EX_exC00014".to_string(), 0.0);
            // Product never moves
            fluxes.insert("DM_PDC".to_string(), 0.0);
            Ok(FluxSolution::new(0.001, fluxes))
        });

        // Ammonia is scarce enough that its saturating rate overdraws the
        // remaining concentration at 1 g/L biomass, forcing a cap event
        let experiment = ExperimentBuilder::default()
            .species(vec![
                species("exVA", SpeciesRole::KineticSubstrate, 4.0),
                species("exC00014", SpeciesRole::MediaComponent, 0.01),
                species("PDC", SpeciesRole::OutFlux, 0.0),
            ])
            .carbon_sources(vec!["exVA".to_string()])
            .product(Some("PDC".to_string()))
            .starting_biomass(1.0)
            .steps(5)
            .build()
            .unwrap();
        let baseline = model_with(
            "wt",
            &[
                ("EX_exVA", ReactionKind::Exchange),
                ("EX_exC00014", ReactionKind::Exchange),
                ("DM_PDC", ReactionKind::Demand),
            ],
        );
        let run = DfbaRun::new(experiment, baseline, None, solver).unwrap();
        let report = run.run().unwrap();

        assert_eq!(report.stop, StopReason::Stalled { step: 1 });

        // Extrapolation freezes biomass at its last value while the
        // substrate keeps being consumed
        let biomass = report.trajectory.biomass();
        assert!(report.trajectory.rows() > 2);
        for x in &biomass[1..] {
            assert!((x - biomass[1]).abs() < 1e-25);
        }
        let substrate = report.trajectory.series("exVA").unwrap();
        for window in substrate.windows(2) {
            assert!(window[1] <= window[0]);
            assert!(window[1] >= 0.0);
        }
    }

    #[test]
    fn solver_failure_extrapolates_from_last_solution() {
        let calls = Rc::new(RefCell::new(0usize));
        let count = calls.clone();
        let solver = FnSolver(move |model: &Model| {
            *count.borrow_mut() += 1;
            if *count.borrow() >= 3 {
                return Err(SolverError::Infeasible("wt".to_string()));
            }
            let mut fluxes = IndexMap::new();
            fluxes.insert("biomass".to_string(), 0.002);
            fluxes.insert(
                "EX_exVA".to_string(),
                model.reaction("EX_exVA").unwrap().lower_bound,
            );
            Ok(FluxSolution::new(0.002, fluxes))
        });

        let experiment = single_substrate_experiment(4.0, 5);
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(experiment, baseline, None, solver).unwrap();
        let report = run.run().unwrap();

        assert_eq!(report.stop, StopReason::SolverFailed { step: 3 });
        // Two solved rows, then extrapolated rows out to the budget
        assert_eq!(report.trajectory.rows(), 6);
        let biomass = report.trajectory.biomass();
        for x in &biomass[2..] {
            assert!((x - biomass[2]).abs() < 1e-25);
        }
        // Consumption continues through the tail
        let substrate = report.trajectory.series("exVA").unwrap();
        assert!(substrate[5] < substrate[2]);
    }

    #[test]
    fn reverse_growth_warns_by_default_and_halts_on_request() {
        let tolerant = single_substrate_experiment(4.0, 3);
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(tolerant, baseline, None, full_uptake_solver(-0.001)).unwrap();
        let report = run.run().unwrap();
        assert_eq!(report.stop, StopReason::BudgetExhausted);
        assert_eq!(report.trajectory.rows(), 4);

        let mut strict = single_substrate_experiment(4.0, 3);
        strict.halt_on_reverse_growth = true;
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);
        let run = DfbaRun::new(strict, baseline, None, full_uptake_solver(-0.001)).unwrap();
        let report = run.run().unwrap();
        assert_eq!(report.stop, StopReason::ReverseGrowth { step: 1 });
        // The reverse step's row is recorded before the halt
        assert_eq!(report.trajectory.rows(), 2);
    }

    #[test]
    fn identical_runs_produce_identical_trajectories() {
        let run_once = || {
            let experiment = ExperimentBuilder::default()
                .species(vec![
                    species("exVA", SpeciesRole::KineticSubstrate, 4.0),
                    species("exC00031", SpeciesRole::KineticSubstrate, 1.0),
                ])
                .carbon_sources(vec!["exVA".to_string(), "exC00031".to_string()])
                .steps(20)
                .build()
                .unwrap();
            let baseline = model_with(
                "wt",
                &[
                    ("EX_exVA", ReactionKind::Exchange),
                    ("EX_exC00031", ReactionKind::Exchange),
                ],
            );
            let run = DfbaRun::new(experiment, baseline, None, full_uptake_solver(0.003)).unwrap();
            let report = run.run().unwrap();
            let mut buffer = Vec::new();
            crate::io::table::write_trajectory(&report.trajectory, &mut buffer).unwrap();
            buffer
        };

        assert_eq!(run_once(), run_once());
    }

    #[test]
    fn validation_rejects_bad_configurations() {
        let baseline = model_with("wt", &[("EX_exVA", ReactionKind::Exchange)]);

        let unknown_carbon = ExperimentBuilder::default()
            .species(vec![species("exVA", SpeciesRole::KineticSubstrate, 4.0)])
            .carbon_sources(vec!["exSA".to_string()])
            .build()
            .unwrap();
        assert!(matches!(
            DfbaRun::new(unknown_carbon, baseline.clone(), None, full_uptake_solver(0.0))
                .err()
                .unwrap(),
            DfbaError::UnknownCarbonSource(_)
        ));

        let missing_reaction = ExperimentBuilder::default()
            .species(vec![species("exSA", SpeciesRole::KineticSubstrate, 4.0)])
            .carbon_sources(vec!["exSA".to_string()])
            .build()
            .unwrap();
        assert!(matches!(
            DfbaRun::new(missing_reaction, baseline.clone(), None, full_uptake_solver(0.0))
                .err()
                .unwrap(),
            DfbaError::MissingBoundaryReaction { .. }
        ));

        let transports_without_derived = ExperimentBuilder::default()
            .species(vec![species("exVA", SpeciesRole::KineticSubstrate, 4.0)])
            .carbon_sources(vec!["exVA".to_string()])
            .transport_reactions(vec!["t0030".to_string()])
            .build()
            .unwrap();
        assert!(matches!(
            DfbaRun::new(
                transports_without_derived,
                baseline.clone(),
                None,
                full_uptake_solver(0.0)
            )
            .err()
            .unwrap(),
            DfbaError::MissingDerivedModel
        ));

        let duplicate = ExperimentBuilder::default()
            .species(vec![
                species("exVA", SpeciesRole::KineticSubstrate, 4.0),
                species("exVA", SpeciesRole::KineticSubstrate, 2.0),
            ])
            .carbon_sources(vec!["exVA".to_string()])
            .build()
            .unwrap();
        assert!(matches!(
            DfbaRun::new(duplicate, baseline.clone(), None, full_uptake_solver(0.0))
                .err()
                .unwrap(),
            DfbaError::DuplicateSpecies(_)
        ));

        let negative_start = ExperimentBuilder::default()
            .species(vec![species("exVA", SpeciesRole::KineticSubstrate, 4.0)])
            .carbon_sources(vec!["exVA".to_string()])
            .starting_biomass(0.0)
            .build()
            .unwrap();
        assert!(matches!(
            DfbaRun::new(negative_start, baseline, None, full_uptake_solver(0.0))
                .err()
                .unwrap(),
            DfbaError::InvalidStartingBiomass(_)
        ));
    }
}
