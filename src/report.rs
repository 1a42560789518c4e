//! Run statistics for presentation.

use std::fmt;

use serde::Serialize;

use crate::measurements::Measurements;
use crate::vehicle::Tick;

/// Summary of the exit times recorded at one exit.
///
/// The statistics are `None` until at least one vehicle has left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExitSummary {
    /// Vehicles that have left through this exit.
    pub stored: usize,
    /// Mean ticks in system.
    pub mean: Option<f64>,
    /// Shortest time in system.
    pub min: Option<f64>,
    /// Longest time in system.
    pub max: Option<f64>,
    /// Population standard deviation of the time in system.
    pub std_dev: Option<f64>,
}

impl From<&Measurements> for ExitSummary {
    fn from(m: &Measurements) -> Self {
        Self {
            stored: m.stored(),
            mean: m.mean().ok(),
            min: m.min().ok(),
            max: m.max().ok(),
            std_dev: m.std_dev().ok(),
        }
    }
}

fn fmt_stat(f: &mut fmt::Formatter<'_>, label: &str, value: Option<f64>, precision: usize) -> fmt::Result {
    match value {
        Some(v) => writeln!(f, "\t{label}:\t{v:.precision$}"),
        None => writeln!(f, "\t{label}:\t-"),
    }
}

impl fmt::Display for ExitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\tNumber:\t{}", self.stored)?;
        fmt_stat(f, "Mean", self.mean, 1)?;
        fmt_stat(f, "Min", self.min, 0)?;
        fmt_stat(f, "Max", self.max, 0)
    }
}

/// Statistics collected by a traffic system up to some tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Ticks simulated so far.
    pub tick: Tick,
    /// Vehicles generated so far.
    pub arrived: usize,
    /// Vehicles that have left through either exit.
    pub departed: usize,
    /// Vehicles still in the lanes or the overflow queue.
    pub in_system: usize,
    /// Exit times at the west-bound exit.
    pub west: ExitSummary,
    /// Exit times at the south-bound exit.
    pub south: ExitSummary,
    /// Ticks during which the main lane's exit vehicle could not move on.
    pub blocked_ticks: u64,
    /// Ticks that ended with vehicles in the overflow queue.
    pub queue_ticks: u64,
}

impl Statistics {
    pub(crate) fn new(
        tick: Tick,
        in_system: usize,
        west: &Measurements,
        south: &Measurements,
        blocked_ticks: u64,
        queue_ticks: u64,
    ) -> Self {
        let departed = west.stored() + south.stored();
        Self {
            tick,
            arrived: in_system + departed,
            departed,
            in_system,
            west: west.into(),
            south: south.into(),
            blocked_ticks,
            queue_ticks,
        }
    }

    /// Percentage of ticks with a blocked main lane exit.
    #[must_use]
    pub fn blocked_percent(&self) -> f64 {
        percent(self.blocked_ticks, self.tick)
    }

    /// Percentage of ticks that ended with a non-empty overflow queue.
    #[must_use]
    pub fn queue_percent(&self) -> f64 {
        percent(self.queue_ticks, self.tick)
    }
}

fn percent(count: u64, ticks: Tick) -> f64 {
    if ticks == 0 {
        0.0
    } else {
        count as f64 / ticks as f64 * 100.0
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Statistics after {} timesteps:", self.tick)?;
        writeln!(f, "Number of arrived:\t{}", self.arrived)?;
        writeln!(f, "Number of left:\t{}", self.departed)?;
        writeln!(f, "Number in the system:\t{}", self.in_system)?;
        writeln!(f)?;
        writeln!(f, "Exit west")?;
        writeln!(f, "{}", self.west)?;
        writeln!(f, "Exit south")?;
        writeln!(f, "{}", self.south)?;
        writeln!(f, "Percent time step with block:\t{:.1}", self.blocked_percent())?;
        write!(f, "Percent time step with queue:\t{:.1}", self.queue_percent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_empty_exit_has_no_statistics() {
        let summary = ExitSummary::from(&Measurements::new());
        assert_eq!(summary.stored, 0);
        assert!(summary.mean.is_none());
        assert!(summary.to_string().contains("Mean:\t-"));
    }

    #[test]
    fn statistics_totals_and_percentages() {
        let west = Measurements::from_values(&[4.0, 6.0]);
        let south = Measurements::from_values(&[10.0]);
        let stats = Statistics::new(40, 3, &west, &south, 10, 4);
        assert_eq!(stats.departed, 3);
        assert_eq!(stats.arrived, 6);
        assert_eq!(stats.west.mean, Some(5.0));
        assert!((stats.blocked_percent() - 25.0).abs() < 1e-12);
        assert!((stats.queue_percent() - 10.0).abs() < 1e-12);

        let text = stats.to_string();
        assert!(text.starts_with("Statistics after 40 timesteps:"));
        assert!(text.contains("Mean:\t5.0"));
        assert!(text.contains("with block:\t25.0"));
    }

    #[test]
    fn percentages_are_zero_before_first_tick() {
        let stats = Statistics::new(0, 0, &Measurements::new(), &Measurements::new(), 0, 0);
        assert_eq!(stats.blocked_percent(), 0.0);
        assert_eq!(stats.queue_percent(), 0.0);
    }

    #[test]
    fn serializes_to_json() {
        let stats = Statistics::new(5, 0, &Measurements::from_values(&[5.0]), &Measurements::new(), 0, 0);
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["west"]["stored"], 1);
        assert!(json["south"]["mean"].is_null());
    }
}
