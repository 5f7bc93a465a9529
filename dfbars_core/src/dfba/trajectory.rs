//! Append-only record of a run's concentration and biomass time series
use indexmap::IndexMap;

/// The time series a run accumulates: Time, Biomass, one series per species
///
/// Rows are indexed by timestep. Column order is fixed at construction
/// (species insertion order), so two runs of the same configuration produce
/// identically ordered output.
#[derive(Clone, Debug)]
pub struct Trajectory {
    time: Vec<f64>,
    biomass: Vec<f64>,
    series: IndexMap<String, Vec<f64>>,
}

impl Trajectory {
    /// Create a trajectory holding the initial row at time zero
    pub(crate) fn new(starting_biomass: f64) -> Self {
        Trajectory {
            time: vec![0.0],
            biomass: vec![starting_biomass],
            series: IndexMap::new(),
        }
    }

    /// Add a species column with its initial concentration
    pub(crate) fn add_species(&mut self, id: &str, initial_concentration: f64) {
        self.series
            .insert(id.to_string(), vec![initial_concentration]);
    }

    /// Number of recorded rows (timesteps including the initial condition)
    pub fn rows(&self) -> usize {
        self.time.len()
    }

    /// The recorded time points, in minutes
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// The recorded biomass series, in g/L
    pub fn biomass(&self) -> &[f64] {
        &self.biomass
    }

    /// The concentration series of one species, None if not tracked
    pub fn series(&self, id: &str) -> Option<&[f64]> {
        self.series.get(id).map(|s| s.as_slice())
    }

    /// Ids of the tracked species, in column order
    pub fn species_ids(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|id| id.as_str())
    }

    pub(crate) fn latest(&self, id: &str) -> f64 {
        *self.series[id].last().unwrap()
    }

    pub(crate) fn latest_biomass(&self) -> f64 {
        *self.biomass.last().unwrap()
    }

    pub(crate) fn latest_time(&self) -> f64 {
        *self.time.last().unwrap()
    }

    pub(crate) fn record(&mut self, id: &str, value: f64) {
        self.series[id].push(value);
    }

    pub(crate) fn record_time(&mut self, value: f64) {
        self.time.push(value);
    }

    pub(crate) fn record_biomass(&mut self, value: f64) {
        self.biomass.push(value);
    }

    /// Overwrite the most recent value of a species with exactly zero
    ///
    /// Used when a concentration drifts below the exhaustion epsilon, so the
    /// recorded series never carries a floating point residue of a consumed
    /// substrate.
    pub(crate) fn snap_latest_zero(&mut self, id: &str) {
        if let Some(last) = self.series[id].last_mut() {
            *last = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_trajectory() -> Trajectory {
        let mut trajectory = Trajectory::new(0.001);
        trajectory.add_species("exVA", 4.0);
        trajectory.add_species("PDC", 0.0);
        trajectory
    }

    #[test]
    fn initial_row() {
        let trajectory = setup_trajectory();
        assert_eq!(trajectory.rows(), 1);
        assert_eq!(trajectory.time(), &[0.0]);
        assert_eq!(trajectory.biomass(), &[0.001]);
        assert_eq!(trajectory.series("exVA").unwrap(), &[4.0]);
        assert!(trajectory.series("exMissing").is_none());
    }

    #[test]
    fn append_rows() {
        let mut trajectory = setup_trajectory();
        trajectory.record_time(30.0);
        trajectory.record_biomass(0.00112);
        trajectory.record("exVA", 3.9);
        trajectory.record("PDC", 0.05);

        assert_eq!(trajectory.rows(), 2);
        assert!((trajectory.latest("exVA") - 3.9).abs() < 1e-25);
        assert!((trajectory.latest_biomass() - 0.00112).abs() < 1e-25);
        assert!((trajectory.latest_time() - 30.0).abs() < 1e-25);
    }

    #[test]
    fn snap_to_zero() {
        let mut trajectory = setup_trajectory();
        trajectory.record("exVA", 4.2e-8);
        trajectory.snap_latest_zero("exVA");
        assert_eq!(trajectory.latest("exVA"), 0.0);
        // Earlier rows are untouched
        assert_eq!(trajectory.series("exVA").unwrap()[0], 4.0);
    }

    #[test]
    fn column_order_is_insertion_order() {
        let trajectory = setup_trajectory();
        let ids: Vec<&str> = trajectory.species_ids().collect();
        assert_eq!(ids, vec!["exVA", "PDC"]);
    }
}
