//! The merge point: one main lane splitting into two light-controlled
//! branch lanes, fed from an unbounded overflow queue.
//!
//! ```text
//!  (light W) <west branch>  <------- main lane <------- [overflow queue] <- source
//!  (light S) <south branch> <--'
//! ```

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::arrivals::VehicleSource;
use crate::config::SystemConfig;
use crate::error::SimResult;
use crate::lane::Lane;
use crate::light::Light;
use crate::measurements::Measurements;
use crate::report::Statistics;
use crate::vehicle::{Route, Tick, Vehicle};

/// A branch lane, its light, and the exit times recorded behind it.
#[derive(Debug, Clone)]
struct Branch {
    lane: Lane,
    light: Light,
    exits: Measurements,
}

impl Branch {
    fn new(route: Route, length: usize, period: u32, green: u32) -> SimResult<Self> {
        Ok(Self {
            lane: Lane::new(&route.to_string(), length)?,
            light: Light::new(period, green)?,
            exits: Measurements::new(),
        })
    }

    /// Lets the exit vehicle through on green and records its time in the
    /// system.
    fn release(&mut self, route: Route, now: Tick) {
        if !self.light.is_green() {
            return;
        }
        if let Some(vehicle) = self.lane.remove_first() {
            let elapsed = vehicle.time_in_system(now);
            trace!(%route, tick = now, elapsed, "vehicle exited");
            self.exits.add(elapsed as f64);
        }
    }
}

/// State of the whole merge point.
///
/// The system owns the tick counter: `step` stamps arrivals and measures
/// exits with the current tick, then advances it.
#[derive(Debug)]
pub struct TrafficSystem<S> {
    config: SystemConfig,
    tick: Tick,
    lane: Lane,
    west: Branch,
    south: Branch,
    queue: VecDeque<Vehicle>,
    source: S,
    blocked_ticks: u64,
    queue_ticks: u64,
}

impl<S: VehicleSource> TrafficSystem<S> {
    /// Builds an empty system at tick 0.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(config: SystemConfig, source: S) -> SimResult<Self> {
        config.validate()?;
        debug!(?config, "building traffic system");
        Ok(Self {
            config,
            tick: 0,
            lane: Lane::new("main", config.lane_length)?,
            west: Branch::new(
                Route::West,
                config.branch_length,
                config.light_period,
                config.west_green,
            )?,
            south: Branch::new(
                Route::South,
                config.branch_length,
                config.light_period,
                config.south_green,
            )?,
            queue: VecDeque::new(),
            source,
            blocked_ticks: 0,
            queue_ticks: 0,
        })
    }

    /// Advances the whole system one tick.
    ///
    /// The order of the phases below determines the results and must not
    /// change:
    ///
    /// 1. Green branches release their exit vehicle.
    /// 2. Branch lanes advance.
    /// 3. The main lane's exit vehicle moves into its branch if there is
    ///    room, trying west before south; otherwise the tick counts as
    ///    blocked.
    /// 4. The main lane advances.
    /// 5. A new arrival joins the overflow queue, and the oldest queued
    ///    vehicle enters the main lane if its entry is free.
    /// 6. Lights advance.
    ///
    /// # Errors
    ///
    /// Returns a state error if a vehicle is placed on an occupied slot,
    /// which means the routing guards are broken. The system should not be
    /// stepped again after an error.
    pub fn step(&mut self) -> SimResult<()> {
        let now = self.tick;

        self.west.release(Route::West, now);
        self.south.release(Route::South, now);

        self.west.lane.step();
        self.south.lane.step();

        let mut routed = false;
        for route in Route::ALL {
            // Re-read the exit slot for each route: the previous check may
            // have emptied it.
            let waiting = self.lane.first().map(Vehicle::route);
            if waiting != Some(route) || !self.branch(route).lane.last_free() {
                continue;
            }
            if let Some(vehicle) = self.lane.remove_first() {
                trace!(%route, tick = now, "vehicle routed into branch");
                self.branch_mut(route).lane.put_last(vehicle)?;
                routed = true;
            }
        }
        if !routed && self.lane.first().is_some() {
            self.blocked_ticks += 1;
        }

        self.lane.step();

        if let Some(vehicle) = self.source.next(now) {
            self.queue.push_back(vehicle);
        }
        if self.lane.last_free() {
            if let Some(vehicle) = self.queue.pop_front() {
                self.lane.put_last(vehicle)?;
            }
        }
        if !self.queue.is_empty() {
            self.queue_ticks += 1;
        }

        self.west.light.step();
        self.south.light.step();

        self.tick += 1;
        Ok(())
    }

    /// Runs `ticks` steps.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error from `step`.
    pub fn run(&mut self, ticks: u64) -> SimResult<()> {
        for _ in 0..ticks {
            self.step()?;
        }
        Ok(())
    }
}

impl<S> TrafficSystem<S> {
    fn branch(&self, route: Route) -> &Branch {
        match route {
            Route::West => &self.west,
            Route::South => &self.south,
        }
    }

    fn branch_mut(&mut self, route: Route) -> &mut Branch {
        match route {
            Route::West => &mut self.west,
            Route::South => &mut self.south,
        }
    }

    /// Vehicles in the lanes and the overflow queue.
    #[must_use]
    pub fn number_in_system(&self) -> usize {
        self.west.lane.number_of_vehicles()
            + self.south.lane.number_of_vehicles()
            + self.lane.number_of_vehicles()
            + self.queue.len()
    }

    /// The tick the next `step` will simulate.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// The parameters the system was built with.
    #[must_use]
    pub const fn config(&self) -> &SystemConfig {
        &self.config
    }

    /// The main lane feeding both branches.
    #[must_use]
    pub const fn main_lane(&self) -> &Lane {
        &self.lane
    }

    /// The branch lane in front of `route`'s light.
    #[must_use]
    pub fn branch_lane(&self, route: Route) -> &Lane {
        &self.branch(route).lane
    }

    /// The light controlling `route`.
    #[must_use]
    pub fn light(&self, route: Route) -> &Light {
        &self.branch(route).light
    }

    /// Ticks in system of every vehicle that has left through `route`.
    #[must_use]
    pub fn exits(&self, route: Route) -> &Measurements {
        &self.branch(route).exits
    }

    /// Vehicles waiting to enter the main lane, oldest first.
    #[must_use]
    pub fn queue(&self) -> &VecDeque<Vehicle> {
        &self.queue
    }

    /// Ticks during which the main lane's exit vehicle could not move on.
    #[must_use]
    pub const fn blocked_ticks(&self) -> u64 {
        self.blocked_ticks
    }

    /// Ticks that ended with vehicles waiting in the overflow queue.
    #[must_use]
    pub const fn queue_ticks(&self) -> u64 {
        self.queue_ticks
    }

    /// The vehicle source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Snapshot of the collected statistics.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        Statistics::new(
            self.tick,
            self.number_in_system(),
            &self.west.exits,
            &self.south.exits,
            self.blocked_ticks,
            self.queue_ticks,
        )
    }
}

impl<S> fmt::Display for TrafficSystem<S> {
    /// Renders the lights, lanes and queue, e.g.
    ///
    /// ```text
    /// (G)<W  >< S  W>[W, S]
    /// (R)<   >
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}){}{}[", self.west.light, self.west.lane, self.lane)?;
        for (i, vehicle) in self.queue.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{vehicle}")?;
        }
        writeln!(f, "]")?;
        write!(f, "({}){}", self.south.light, self.south.lane)
    }
}
