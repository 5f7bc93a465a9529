//! CSV output for finished trajectories
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::dfba::trajectory::Trajectory;
use crate::io::IoError;

/// Write a trajectory as delimited text, one row per timestep
///
/// Columns are Time, Biomass, then every tracked species in configuration
/// order. The output of two runs of the same configuration is byte
/// identical.
pub fn write_trajectory<W: Write>(trajectory: &Trajectory, writer: W) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec!["Time".to_string(), "Biomass".to_string()];
    header.extend(trajectory.species_ids().map(|id| id.to_string()));
    writer.write_record(&header)?;

    for row in 0..trajectory.rows() {
        let mut record = Vec::with_capacity(header.len());
        record.push(trajectory.time()[row].to_string());
        record.push(trajectory.biomass()[row].to_string());
        for id in trajectory.species_ids() {
            // Every series has one value per recorded row
            record.push(trajectory.series(id).unwrap()[row].to_string());
        }
        writer.write_record(&record)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a trajectory to a CSV file at the given path
pub fn write_trajectory_to_path<P: AsRef<Path>>(
    trajectory: &Trajectory,
    path: P,
) -> Result<(), IoError> {
    let file = fs::File::create(&path)
        .map_err(|_| IoError::FileNotFound(path.as_ref().display().to_string()))?;
    write_trajectory(trajectory, file)
}
