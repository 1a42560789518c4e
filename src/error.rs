//! Error types for mergeflow.
//!
//! All errors are strongly typed using thiserror so callers can match on
//! the specific failure family: configuration, invariant violation, or
//! statistics over an empty buffer.

use std::path::PathBuf;

use thiserror::Error;

/// Errors detected while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A lane was configured with no slots.
    #[error("Lane '{lane}' must have a length of at least 1")]
    ZeroLaneLength {
        /// Which lane.
        lane: String,
    },

    /// A light was configured with a period of 0.
    #[error("Light period must be at least 1")]
    ZeroLightPeriod,

    /// A light is green for longer than its period.
    #[error("Green time {green} exceeds light period {period}")]
    GreenExceedsPeriod {
        /// Configured green ticks.
        green: u32,
        /// Configured period.
        period: u32,
    },

    /// A required property key is absent.
    #[error("Required property '{key}' is missing")]
    MissingProperty {
        /// The missing key.
        key: String,
    },

    /// A value could not be parsed as a number of the expected type.
    #[error("Property '{key}' has invalid value '{value}'")]
    InvalidNumber {
        /// Where the value came from.
        key: String,
        /// The raw text.
        value: String,
    },

    /// A line matched neither a comment nor the expected layout.
    #[error("Malformed line {line}: '{content}'")]
    MalformedLine {
        /// 1-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// An arrival probability lies outside `[0, 1]`.
    #[error("Arrival probability {value} for {route} is out of range [0.0, 1.0]")]
    ProbabilityOutOfRange {
        /// Route the probability belongs to.
        route: String,
        /// The probability.
        value: f64,
    },

    /// West and south probabilities together exceed 1.
    #[error("Arrival probabilities sum to {sum}, which exceeds 1.0")]
    ProbabilitySumExceedsOne {
        /// Their sum.
        sum: f64,
    },

    /// An arrival period lasts 0 ticks.
    #[error("Arrival period must last at least one tick")]
    ZeroPeriodDuration,

    /// An arrival schedule has no periods.
    #[error("Arrival schedule has no periods")]
    EmptySchedule,

    /// The total schedule length does not fit in a `Tick`.
    #[error("Arrival schedule durations overflow the tick counter")]
    ScheduleTooLong,

    /// A configuration file could not be read.
    #[error("Failed to read {path}: {message}")]
    Io {
        /// The file.
        path: PathBuf,
        /// The underlying I/O error.
        message: String,
    },

    /// A JSON configuration could not be decoded.
    #[error("Failed to decode JSON configuration: {message}")]
    Json {
        /// The decoder error.
        message: String,
    },
}

/// Violations of container invariants.
///
/// These indicate a bug in the caller: the orchestrator always checks
/// `Lane::last_free` before placing a vehicle.
#[derive(Debug, Error)]
pub enum StateError {
    /// `put_last` was called while the entry slot was taken.
    #[error("Entry slot of lane (length {length}) is already occupied")]
    LaneEntryOccupied {
        /// Length of the lane.
        length: usize,
    },
}

/// Errors from statistics over a `Measurements` buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatsError {
    /// No values have been recorded.
    #[error("No values have been recorded")]
    Empty,

    /// An index past the last stored value.
    #[error("Index {index} is out of range ({stored} values stored)")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Values stored.
        stored: usize,
    },
}

/// Top-level error type for mergeflow.
#[derive(Debug, Error)]
pub enum SimError {
    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Container invariant violated.
    #[error("Invalid state: {0}")]
    State(#[from] StateError),

    /// Statistics over unusable data.
    #[error("Statistics error: {0}")]
    Statistics(#[from] StatsError),
}

impl SimError {
    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if this is an invariant violation.
    #[must_use]
    pub const fn is_state(&self) -> bool {
        matches!(self, Self::State(_))
    }

    /// Returns true if this is a statistics error.
    #[must_use]
    pub const fn is_statistics(&self) -> bool {
        matches!(self, Self::Statistics(_))
    }

    /// Returns true if the simulation cannot continue after this error.
    ///
    /// Nothing is retryable: the simulation is deterministic.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::State(_) => true,
            Self::Statistics(_) => false,
        }
    }
}

/// Result type alias for mergeflow operations.
pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_green_exceeds_period() {
        let err = ConfigError::GreenExceedsPeriod { green: 9, period: 4 };
        let msg = format!("{err}");
        assert!(msg.contains('9'));
        assert!(msg.contains("period 4"));
    }

    #[test]
    fn test_config_error_io_includes_path() {
        let err = ConfigError::Io {
            path: PathBuf::from("properties.txt"),
            message: "not found".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("properties.txt"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn test_state_error_message() {
        let err = StateError::LaneEntryOccupied { length: 8 };
        assert!(format!("{err}").contains("length 8"));
    }

    #[test]
    fn test_stats_error_index() {
        let err = StatsError::IndexOutOfRange { index: 5, stored: 2 };
        let msg = format!("{err}");
        assert!(msg.contains("Index 5"));
        assert!(msg.contains("2 values"));
    }

    #[test]
    fn test_sim_error_classification() {
        let err: SimError = ConfigError::ZeroLightPeriod.into();
        assert!(err.is_config());
        assert!(err.is_fatal());

        let err: SimError = StateError::LaneEntryOccupied { length: 1 }.into();
        assert!(err.is_state());
        assert!(err.is_fatal());

        let err: SimError = StatsError::Empty.into();
        assert!(err.is_statistics());
        assert!(!err.is_fatal());
    }
}
