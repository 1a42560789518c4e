//! Periodic two-phase traffic lights.

use std::fmt;

use crate::error::ConfigError;

/// A traffic light that is green for the first `green` ticks of every
/// `period` ticks, then red for the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Light {
    period: u32,
    green: u32,
    phase: u32,
}

impl Light {
    /// Creates a light at phase 0.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLightPeriod` if `period` is 0 and
    /// `ConfigError::GreenExceedsPeriod` if `green > period`.
    pub fn new(period: u32, green: u32) -> Result<Self, ConfigError> {
        if period == 0 {
            return Err(ConfigError::ZeroLightPeriod);
        }
        if green > period {
            return Err(ConfigError::GreenExceedsPeriod { green, period });
        }
        Ok(Self {
            period,
            green,
            phase: 0,
        })
    }

    /// Advances the internal clock, wrapping at the period.
    pub fn step(&mut self) {
        self.phase += 1;
        if self.phase == self.period {
            self.phase = 0;
        }
    }

    /// Returns true while the phase is within the green time.
    #[must_use]
    pub const fn is_green(&self) -> bool {
        self.phase < self.green
    }

    /// Current position in the cycle, in `[0, period)`.
    #[must_use]
    pub const fn phase(&self) -> u32 {
        self.phase
    }

    /// Ticks in one full cycle.
    #[must_use]
    pub const fn period(&self) -> u32 {
        self.period
    }

    /// Green ticks at the start of each cycle.
    #[must_use]
    pub const fn green(&self) -> u32 {
        self.green
    }
}

impl fmt::Display for Light {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_green() {
            write!(f, "G")
        } else {
            write!(f, "R")
        }
    }
}
