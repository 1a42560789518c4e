//! Simulation parameters and the loaders that read them.
//!
//! Parameters come from a Java-style properties file:
//!
//! ```text
//! laneLength      : 10
//! laneWSLength    :  8
//! lightPeriod     : 14
//! lightWestGreen  :  6
//! lightSouthGreen :  4
//! ```
//!
//! or from a JSON file with the snake_case field names of [`SystemConfig`].

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

static PROPERTY_LINE: OnceLock<Regex> = OnceLock::new();

fn property_line() -> &'static Regex {
    PROPERTY_LINE.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_.]*)(?:\s*[:=]\s*|\s+)(.*?)\s*$")
            .expect("property line regex is valid")
    })
}

/// Reads a file into a string, mapping I/O failures to `ConfigError::Io`.
pub(crate) fn read_file(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Parses `key : value`, `key = value` and `key value` lines.
///
/// Blank lines and lines starting with `#` or `!` are ignored. A later
/// definition of a key replaces an earlier one.
///
/// # Errors
///
/// Returns `ConfigError::MalformedLine` for a line with no key.
pub fn parse_properties(text: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut properties = HashMap::new();
    for (idx, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
            continue;
        }
        let caps = property_line()
            .captures(line)
            .ok_or_else(|| ConfigError::MalformedLine {
                line: idx + 1,
                content: line.to_string(),
            })?;
        properties.insert(caps[1].to_string(), caps[2].to_string());
    }
    Ok(properties)
}

fn required<T: std::str::FromStr>(
    properties: &HashMap<String, String>,
    key: &str,
) -> Result<T, ConfigError> {
    let raw = properties
        .get(key)
        .ok_or_else(|| ConfigError::MissingProperty {
            key: key.to_string(),
        })?;
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        key: key.to_string(),
        value: raw.clone(),
    })
}

/// Geometry of the merge point and timing of its two lights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Length of the main lane, in vehicles.
    pub lane_length: usize,
    /// Length of each branch lane in front of a light.
    pub branch_length: usize,
    /// Period shared by both lights, in ticks.
    pub light_period: u32,
    /// Green ticks per period for the west-bound light.
    pub west_green: u32,
    /// Green ticks per period for the south-bound light.
    pub south_green: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            lane_length: 10,
            branch_length: 8,
            light_period: 14,
            west_green: 6,
            south_green: 4,
        }
    }
}

impl SystemConfig {
    /// Checks lengths and light timings.
    ///
    /// A green time of 0 is legal (that light never turns green) but is
    /// almost always a mistake, so it is logged.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lane_length == 0 {
            return Err(ConfigError::ZeroLaneLength {
                lane: "main".to_string(),
            });
        }
        if self.branch_length == 0 {
            return Err(ConfigError::ZeroLaneLength {
                lane: "branch".to_string(),
            });
        }
        if self.light_period == 0 {
            return Err(ConfigError::ZeroLightPeriod);
        }
        for green in [self.west_green, self.south_green] {
            if green > self.light_period {
                return Err(ConfigError::GreenExceedsPeriod {
                    green,
                    period: self.light_period,
                });
            }
        }
        if self.west_green == 0 || self.south_green == 0 {
            warn!(
                west_green = self.west_green,
                south_green = self.south_green,
                "a light with zero green time never releases its lane"
            );
        }
        Ok(())
    }

    /// Parses and validates a properties document.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed lines, missing or non-numeric keys,
    /// and values that fail `validate`.
    pub fn from_properties(text: &str) -> Result<Self, ConfigError> {
        let properties = parse_properties(text)?;
        let config = Self {
            lane_length: required(&properties, "laneLength")?,
            branch_length: required(&properties, "laneWSLength")?,
            light_period: required(&properties, "lightPeriod")?,
            west_green: required(&properties, "lightWestGreen")?,
            south_green: required(&properties, "lightSouthGreen")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` on decode failure, or a validation error.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|e| ConfigError::Json {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file, choosing the format by extension:
    /// `.json` is JSON, anything else is a properties file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of the chosen parser.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = read_file(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_properties(&text)
        }
    }
}

impl fmt::Display for SystemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t Simulation parameters:")?;
        writeln!(f, "\t laneLength      :\t{}", self.lane_length)?;
        writeln!(f, "\t laneWSLength    :\t{}", self.branch_length)?;
        writeln!(f, "\t lightPeriod     :\t{}", self.light_period)?;
        writeln!(f, "\t lightWestGreen  :\t{}", self.west_green)?;
        write!(f, "\t lightSouthGreen :\t{}", self.south_green)
    }
}
