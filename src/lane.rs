//! Fixed-capacity lanes.
//!
//! A lane is a row of slots, each empty or holding one vehicle. Vehicles
//! enter at the highest index and leave from index 0.

use std::fmt;

use crate::error::{ConfigError, StateError};
use crate::vehicle::Vehicle;

/// A lane of fixed length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    slots: Box<[Option<Vehicle>]>,
}

impl Lane {
    /// Creates an empty lane with `length` slots.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ZeroLaneLength` if `length` is 0.
    pub fn new(name: &str, length: usize) -> Result<Self, ConfigError> {
        if length == 0 {
            return Err(ConfigError::ZeroLaneLength {
                lane: name.to_string(),
            });
        }
        Ok(Self {
            slots: vec![None; length].into_boxed_slice(),
        })
    }

    /// Number of slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no slot is occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Advances vehicles toward the exit.
    ///
    /// Slots are visited from index 1 upward; a vehicle moves into slot
    /// `i - 1` when that slot is empty, so a vehicle closes up behind one
    /// that moved earlier in the same pass. For example `<XX  X   X X X  XX>`
    /// becomes `<XX X   X X X  XX >`. The vehicle at index 0 never moves.
    pub fn step(&mut self) {
        for i in 1..self.slots.len() {
            if self.slots[i - 1].is_none() {
                self.slots[i - 1] = self.slots[i].take();
            }
        }
    }

    /// Removes and returns the vehicle at the exit, if any.
    pub fn remove_first(&mut self) -> Option<Vehicle> {
        self.slots[0].take()
    }

    /// The vehicle at the exit, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Vehicle> {
        self.slots[0].as_ref()
    }

    /// Returns true if the entry slot is empty.
    #[must_use]
    pub fn last_free(&self) -> bool {
        self.slots[self.slots.len() - 1].is_none()
    }

    /// Places `vehicle` in the entry slot.
    ///
    /// # Errors
    ///
    /// Returns `StateError::LaneEntryOccupied` if the entry slot is taken;
    /// check `last_free` first.
    pub fn put_last(&mut self, vehicle: Vehicle) -> Result<(), StateError> {
        let length = self.slots.len();
        let last = &mut self.slots[length - 1];
        if last.is_some() {
            return Err(StateError::LaneEntryOccupied { length });
        }
        *last = Some(vehicle);
        Ok(())
    }

    /// Number of occupied slots.
    #[must_use]
    pub fn number_of_vehicles(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// The slots from exit (index 0) to entry.
    #[must_use]
    pub fn slots(&self) -> &[Option<Vehicle>] {
        &self.slots
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<")?;
        for slot in self.slots.iter() {
            match slot {
                Some(vehicle) => write!(f, "{vehicle}")?,
                None => write!(f, " ")?,
            }
        }
        write!(f, ">")
    }
}
