//! Vehicles and the routes they are bound for.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One discrete simulation step.
pub type Tick = u64;

/// Exit route a vehicle is bound for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// West-bound exit.
    West,
    /// South-bound exit.
    South,
}

impl Route {
    /// All routes, in routing priority order.
    pub const ALL: [Self; 2] = [Self::West, Self::South];

    /// Single-letter tag used in console output.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::West => 'W',
            Self::South => 'S',
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::West => write!(f, "west"),
            Self::South => write!(f, "south"),
        }
    }
}

/// A vehicle: a route and the tick it arrived at.
///
/// Vehicles are immutable once created. They move between containers by
/// value, so a vehicle is held by exactly one lane or queue at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    route: Route,
    arrival: Tick,
}

impl Vehicle {
    /// Creates a vehicle bound for `route` that arrived at `arrival`.
    #[must_use]
    pub const fn new(route: Route, arrival: Tick) -> Self {
        Self { route, arrival }
    }

    /// The exit this vehicle is bound for.
    #[must_use]
    pub const fn route(&self) -> Route {
        self.route
    }

    /// The tick this vehicle was generated.
    #[must_use]
    pub const fn arrival(&self) -> Tick {
        self.arrival
    }

    /// Ticks spent in the system if the vehicle exits at `now`.
    #[must_use]
    pub const fn time_in_system(&self, now: Tick) -> Tick {
        now.saturating_sub(self.arrival)
    }
}

impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.route.tag())
    }
}
