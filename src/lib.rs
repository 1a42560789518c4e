//! # mergeflow - discrete-time traffic at a merge point
//!
//! mergeflow models a single main lane that splits into two branch lanes,
//! each held back by a periodic traffic light. Time advances in ticks; on
//! every tick vehicles exit on green, move one slot toward the exit, are
//! routed into their branch when there is room, and new arrivals wait in an
//! unbounded overflow queue until the main lane can take them.
//!
//! ## Core Concepts
//!
//! - **Lane**: fixed-length row of slots; vehicles enter at the back and
//!   leave from the front
//! - **Light**: green for the first `green` ticks of every `period`
//! - **Measurements**: growable buffer of exit times with summary statistics
//! - **TrafficSystem**: owns everything above and drives one tick at a time
//!
//! ## Usage
//!
//! ```rust
//! use mergeflow::{Route, ScriptedSource, SystemConfig, TrafficSystem};
//!
//! let config = SystemConfig {
//!     lane_length: 3,
//!     branch_length: 2,
//!     light_period: 4,
//!     west_green: 2,
//!     south_green: 2,
//! };
//! let source = ScriptedSource::new([(0, Route::West)]);
//! let mut system = TrafficSystem::new(config, source)?;
//! system.run(20)?;
//!
//! assert_eq!(system.exits(Route::West).stored(), 1);
//! assert_eq!(system.number_in_system(), 0);
//! # Ok::<(), mergeflow::SimError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

// Building blocks
pub mod error;
pub mod lane;
pub mod light;
pub mod measurements;
pub mod vehicle;

// Configuration and collaborators
pub mod arrivals;
pub mod config;

// Orchestration and reporting
pub mod report;
pub mod system;

// Re-export primary types at crate root for convenience
pub use arrivals::{ArrivalGenerator, ArrivalPeriod, ArrivalSchedule, ScriptedSource, VehicleSource, DEFAULT_SEED};
pub use config::SystemConfig;
pub use error::{ConfigError, SimError, SimResult, StateError, StatsError};
pub use lane::Lane;
pub use light::Light;
pub use measurements::Measurements;
pub use report::{ExitSummary, Statistics};
pub use system::TrafficSystem;
pub use vehicle::{Route, Tick, Vehicle};
