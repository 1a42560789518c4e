//! Vehicle sources.
//!
//! The traffic system pulls at most one new vehicle per tick from a
//! [`VehicleSource`]. [`ArrivalGenerator`] draws arrivals at random from a
//! cyclic [`ArrivalSchedule`]; [`ScriptedSource`] replays a fixed list and
//! is what tests and demos use.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::read_file;
use crate::error::ConfigError;
use crate::vehicle::{Route, Tick, Vehicle};

/// Default seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

/// Pull interface for new vehicles.
pub trait VehicleSource {
    /// Returns the vehicle arriving at `tick`, if any.
    fn next(&mut self, tick: Tick) -> Option<Vehicle>;
}

impl<S: VehicleSource + ?Sized> VehicleSource for Box<S> {
    fn next(&mut self, tick: Tick) -> Option<Vehicle> {
        (**self).next(tick)
    }
}

/// Arrival probabilities that hold for a stretch of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrivalPeriod {
    /// How many ticks this period lasts.
    pub duration: Tick,
    /// Per-tick probability of a west-bound arrival.
    pub west: f64,
    /// Per-tick probability of a south-bound arrival.
    pub south: f64,
}

impl ArrivalPeriod {
    /// Checks the duration and that the probabilities form a distribution.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration == 0 {
            return Err(ConfigError::ZeroPeriodDuration);
        }
        for (route, value) in [(Route::West, self.west), (Route::South, self.south)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    route: route.to_string(),
                    value,
                });
            }
        }
        let sum = self.west + self.south;
        if sum > 1.0 {
            return Err(ConfigError::ProbabilitySumExceedsOne { sum });
        }
        Ok(())
    }

    /// Maps a uniform draw in `[0, 1)` to an arrival.
    fn route_for(&self, draw: f64) -> Option<Route> {
        if draw < self.west {
            Some(Route::West)
        } else if draw < self.west + self.south {
            Some(Route::South)
        } else {
            None
        }
    }
}

static SCHEDULE_LINE: OnceLock<Regex> = OnceLock::new();

fn schedule_line() -> &'static Regex {
    SCHEDULE_LINE.get_or_init(|| {
        Regex::new(r"^\s*([^\s:,]+)\s*[\s:,]\s*([^\s:,]+)\s*[\s,]\s*([^\s:,]+)\s*$")
            .expect("schedule line regex is valid")
    })
}

/// Arrival periods that repeat end to end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrivalSchedule {
    periods: Vec<ArrivalPeriod>,
    #[serde(skip)]
    cycle_length: Tick,
}

impl ArrivalSchedule {
    /// Creates a validated schedule.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySchedule` for no periods, the first
    /// period that fails validation, or `ConfigError::ScheduleTooLong` if
    /// the durations do not fit in a tick counter.
    pub fn new(periods: Vec<ArrivalPeriod>) -> Result<Self, ConfigError> {
        if periods.is_empty() {
            return Err(ConfigError::EmptySchedule);
        }
        let mut cycle_length: Tick = 0;
        for period in &periods {
            period.validate()?;
            cycle_length = cycle_length
                .checked_add(period.duration)
                .ok_or(ConfigError::ScheduleTooLong)?;
        }
        Ok(Self {
            periods,
            cycle_length,
        })
    }

    /// A single period with constant probabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the probabilities are invalid.
    pub fn constant(west: f64, south: f64) -> Result<Self, ConfigError> {
        Self::new(vec![ArrivalPeriod {
            duration: 1,
            west,
            south,
        }])
    }

    /// Parses lines of `<duration> <west> <south>`.
    ///
    /// Fields may be separated by whitespace, commas, or a colon after the
    /// duration. Blank lines and `#` comments are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MalformedLine` or `ConfigError::InvalidNumber`
    /// for unparseable lines, then the errors of `new`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut periods = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let caps = schedule_line()
                .captures(line)
                .ok_or_else(|| ConfigError::MalformedLine {
                    line: idx + 1,
                    content: line.to_string(),
                })?;
            periods.push(ArrivalPeriod {
                duration: parse_field(&caps[1], "duration", idx)?,
                west: parse_field(&caps[2], "west", idx)?,
                south: parse_field(&caps[3], "south", idx)?,
            });
        }
        Self::new(periods)
    }

    /// Loads and parses a schedule file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file cannot be read, otherwise the
    /// errors of `parse`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::parse(&read_file(path.as_ref())?)
    }

    /// The periods in order.
    #[must_use]
    pub fn periods(&self) -> &[ArrivalPeriod] {
        &self.periods
    }

    /// Total ticks before the schedule repeats.
    #[must_use]
    pub const fn cycle_length(&self) -> Tick {
        self.cycle_length
    }

    /// The period in force at `tick`.
    #[must_use]
    pub fn period_at(&self, tick: Tick) -> &ArrivalPeriod {
        let mut offset = tick % self.cycle_length;
        for period in &self.periods {
            if offset < period.duration {
                return period;
            }
            offset -= period.duration;
        }
        // Offsets are reduced modulo the cycle, so the loop always returns.
        &self.periods[self.periods.len() - 1]
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, key: &str, idx: usize) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        key: format!("{key} (line {})", idx + 1),
        value: raw.to_string(),
    })
}

impl fmt::Display for ArrivalSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t Traffic periods and probabilities:")?;
        write!(f, "\t Ticks\tWest\tSouth")?;
        for period in &self.periods {
            write!(f, "\n\t {}\t{:.2}\t{:.2}", period.duration, period.west, period.south)?;
        }
        Ok(())
    }
}

/// Random arrivals following an [`ArrivalSchedule`].
///
/// Uses `ChaCha8Rng` so identical seeds produce identical runs on every
/// platform.
#[derive(Debug, Clone)]
pub struct ArrivalGenerator {
    schedule: ArrivalSchedule,
    rng: ChaCha8Rng,
}

impl ArrivalGenerator {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub fn new(schedule: ArrivalSchedule, seed: u64) -> Self {
        Self {
            schedule,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The schedule being followed.
    #[must_use]
    pub fn schedule(&self) -> &ArrivalSchedule {
        &self.schedule
    }
}

impl VehicleSource for ArrivalGenerator {
    fn next(&mut self, tick: Tick) -> Option<Vehicle> {
        let draw: f64 = self.rng.gen();
        self.schedule
            .period_at(tick)
            .route_for(draw)
            .map(|route| Vehicle::new(route, tick))
    }
}

/// Replays pre-scheduled arrivals.
///
/// Each entry is `(tick, route)`. Entries are released in tick order, one
/// per call; an entry whose tick has already passed is released late,
/// stamped with the tick it was actually released at.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    pending: VecDeque<(Tick, Route)>,
}

impl ScriptedSource {
    /// Creates a source from `(tick, route)` pairs in any order.
    #[must_use]
    pub fn new(arrivals: impl IntoIterator<Item = (Tick, Route)>) -> Self {
        let mut arrivals: Vec<_> = arrivals.into_iter().collect();
        arrivals.sort_by_key(|&(tick, _)| tick);
        Self {
            pending: arrivals.into(),
        }
    }

    /// A source that never produces a vehicle.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Arrivals not yet released.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl VehicleSource for ScriptedSource {
    fn next(&mut self, tick: Tick) -> Option<Vehicle> {
        match self.pending.front() {
            Some(&(due, _)) if due <= tick => self
                .pending
                .pop_front()
                .map(|(_, route)| Vehicle::new(route, tick)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# ticks west south
100  0.30  0.10
50 : 0.05, 0.60
";

    #[test]
    fn parses_schedule() {
        let schedule = ArrivalSchedule::parse(SAMPLE).unwrap();
        assert_eq!(schedule.periods().len(), 2);
        assert_eq!(schedule.periods()[1].duration, 50);
        assert!((schedule.periods()[1].south - 0.6).abs() < 1e-12);
        assert_eq!(schedule.cycle_length(), 150);
    }

    #[test]
    fn period_at_cycles() {
        let schedule = ArrivalSchedule::parse(SAMPLE).unwrap();
        assert_eq!(schedule.period_at(0).duration, 100);
        assert_eq!(schedule.period_at(99).duration, 100);
        assert_eq!(schedule.period_at(100).duration, 50);
        assert_eq!(schedule.period_at(149).duration, 50);
        assert_eq!(schedule.period_at(150).duration, 100);
    }

    #[test]
    fn rejects_invalid_schedules() {
        assert!(matches!(ArrivalSchedule::parse("# nothing\n"), Err(ConfigError::EmptySchedule)));
        assert!(matches!(
            ArrivalSchedule::parse("0 0.1 0.1"),
            Err(ConfigError::ZeroPeriodDuration)
        ));
        assert!(matches!(
            ArrivalSchedule::parse("10 1.5 0.0"),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));
        assert!(matches!(
            ArrivalSchedule::parse("10 0.7 0.7"),
            Err(ConfigError::ProbabilitySumExceedsOne { .. })
        ));
        assert!(matches!(
            ArrivalSchedule::parse("10 x 0.1"),
            Err(ConfigError::InvalidNumber { .. })
        ));
        assert!(matches!(
            ArrivalSchedule::parse("10 0.1"),
            Err(ConfigError::MalformedLine { line: 1, .. })
        ));
    }

    #[test]
    fn rejects_schedule_longer_than_tick_range() {
        let err = ArrivalSchedule::parse("18446744073709551615 0.1 0.1\n1 0.1 0.1\n").unwrap_err();
        assert!(matches!(err, ConfigError::ScheduleTooLong));
    }

    #[test]
    fn longest_representable_schedule_is_usable() {
        let schedule = ArrivalSchedule::parse("18446744073709551614 0.0 0.0\n1 1.0 0.0\n").unwrap();
        assert_eq!(schedule.cycle_length(), u64::MAX);
        let mut generator = ArrivalGenerator::new(schedule, DEFAULT_SEED);
        assert_eq!(generator.next(0), None);
        assert_eq!(
            generator.next(u64::MAX - 1),
            Some(Vehicle::new(Route::West, u64::MAX - 1))
        );
    }

    #[test]
    fn route_for_partitions_unit_interval() {
        let period = ArrivalPeriod {
            duration: 1,
            west: 0.25,
            south: 0.5,
        };
        assert_eq!(period.route_for(0.0), Some(Route::West));
        assert_eq!(period.route_for(0.25), Some(Route::South));
        assert_eq!(period.route_for(0.74), Some(Route::South));
        assert_eq!(period.route_for(0.75), None);
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let schedule = ArrivalSchedule::constant(0.3, 0.3).unwrap();
        let mut a = ArrivalGenerator::new(schedule.clone(), 7);
        let mut b = ArrivalGenerator::new(schedule, 7);
        for tick in 0..200 {
            assert_eq!(a.next(tick), b.next(tick));
        }
    }

    #[test]
    fn generator_stamps_arrival_tick() {
        let schedule = ArrivalSchedule::constant(1.0, 0.0).unwrap();
        let mut generator = ArrivalGenerator::new(schedule, DEFAULT_SEED);
        for tick in 0..10 {
            assert_eq!(generator.next(tick), Some(Vehicle::new(Route::West, tick)));
        }
    }

    #[test]
    fn generator_with_zero_probability_is_silent() {
        let schedule = ArrivalSchedule::constant(0.0, 0.0).unwrap();
        let mut generator = ArrivalGenerator::new(schedule, DEFAULT_SEED);
        assert!((0..100).all(|tick| generator.next(tick).is_none()));
    }

    #[test]
    fn scripted_source_releases_in_order() {
        let mut source = ScriptedSource::new([(3, Route::South), (0, Route::West), (3, Route::West)]);
        assert_eq!(source.next(0), Some(Vehicle::new(Route::West, 0)));
        assert_eq!(source.next(1), None);
        assert_eq!(source.next(3), Some(Vehicle::new(Route::South, 3)));
        assert_eq!(source.next(4), Some(Vehicle::new(Route::West, 4)));
        assert_eq!(source.remaining(), 0);
        assert_eq!(source.next(5), None);
    }
}
