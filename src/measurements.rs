//! Growable buffer of recorded values with summary statistics.
//!
//! Backing storage doubles whenever it fills up and never shrinks, so
//! appends are amortized O(1) and earlier values keep their order.

use std::fmt;

use serde::Serialize;

use crate::error::StatsError;

/// Recorded values, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurements {
    values: Vec<f64>,
    capacity: usize,
}

impl Default for Measurements {
    fn default() -> Self {
        Self::with_capacity(1)
    }
}

impl Measurements {
    /// Creates an empty buffer with room for one value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty buffer with room for `capacity` values.
    ///
    /// A capacity of 0 is raised to 1 so that doubling always grows.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Creates a buffer holding a copy of `values`.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let mut measurements = Self::with_capacity(values.len());
        for &value in values {
            measurements.add(value);
        }
        measurements
    }

    /// Appends `value`, doubling the capacity first if the buffer is full.
    pub fn add(&mut self, value: f64) {
        if self.values.len() == self.capacity {
            self.capacity *= 2;
            self.values.reserve_exact(self.capacity - self.values.len());
        }
        self.values.push(value);
    }

    /// Number of values stored.
    #[must_use]
    pub fn stored(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of values that fit before the next doubling.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Value at `index` in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::IndexOutOfRange` if `index >= stored()`.
    pub fn get(&self, index: usize) -> Result<f64, StatsError> {
        self.values
            .get(index)
            .copied()
            .ok_or(StatsError::IndexOutOfRange {
                index,
                stored: self.values.len(),
            })
    }

    /// All stored values in insertion order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Arithmetic mean.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Empty` if nothing has been recorded.
    pub fn mean(&self) -> Result<f64, StatsError> {
        if self.values.is_empty() {
            return Err(StatsError::Empty);
        }
        let sum: f64 = self.values.iter().sum();
        Ok(sum / self.values.len() as f64)
    }

    /// Smallest value.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Empty` if nothing has been recorded.
    pub fn min(&self) -> Result<f64, StatsError> {
        self.values
            .iter()
            .copied()
            .reduce(f64::min)
            .ok_or(StatsError::Empty)
    }

    /// Largest value.
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Empty` if nothing has been recorded.
    pub fn max(&self) -> Result<f64, StatsError> {
        self.values
            .iter()
            .copied()
            .reduce(f64::max)
            .ok_or(StatsError::Empty)
    }

    /// Population standard deviation (divides by the count, not count - 1).
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Empty` if nothing has been recorded.
    pub fn std_dev(&self) -> Result<f64, StatsError> {
        let mean = self.mean()?;
        let squared: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
        Ok((squared / self.values.len() as f64).sqrt())
    }

    /// Three-point moving average.
    ///
    /// The first and last values are copied unchanged; every interior value
    /// becomes the mean of itself and its two neighbours.
    #[must_use]
    pub fn smooth(&self) -> Self {
        let n = self.values.len();
        let mut smoothed = Self::with_capacity(n);
        match n {
            0 => {}
            1 => smoothed.add(self.values[0]),
            _ => {
                smoothed.add(self.values[0]);
                for window in self.values.windows(3) {
                    smoothed.add((window[0] + window[1] + window[2]) / 3.0);
                }
                smoothed.add(self.values[n - 1]);
            }
        }
        smoothed
    }
}

impl fmt::Display for Measurements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value:?}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn sample() -> Measurements {
        let mut m = Measurements::new();
        for v in [3.0, 1.0, 4.0, 1.0, 5.0] {
            m.add(v);
        }
        m
    }

    #[test]
    fn summary_statistics() {
        let m = sample();
        assert_eq!(m.stored(), 5);
        assert_eq!(m.min().unwrap(), 1.0);
        assert_eq!(m.max().unwrap(), 5.0);
        assert!((m.mean().unwrap() - 2.8).abs() < EPS);
    }

    #[test]
    fn std_dev_is_population() {
        let m = Measurements::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert!((m.std_dev().unwrap() - 2.0).abs() < EPS);
    }

    #[test]
    fn smooth_three_point_average() {
        let smoothed = sample().smooth();
        let expected = [3.0, 8.0 / 3.0, 2.0, 10.0 / 3.0, 5.0];
        assert_eq!(smoothed.stored(), expected.len());
        for (got, want) in smoothed.values().iter().zip(expected) {
            assert!((got - want).abs() < EPS, "{got} != {want}");
        }
    }

    #[test]
    fn smooth_short_buffers() {
        assert!(Measurements::new().smooth().is_empty());
        assert_eq!(Measurements::from_values(&[7.0]).smooth().values(), &[7.0]);
        assert_eq!(
            Measurements::from_values(&[1.0, 2.0]).smooth().values(),
            &[1.0, 2.0]
        );
    }

    #[test]
    fn growth_preserves_order() {
        let mut m = Measurements::with_capacity(1);
        let mut capacity = m.capacity();
        for i in 0..10u32 {
            m.add(f64::from(i));
            assert!(m.capacity() >= capacity);
            assert!(m.capacity() >= m.stored());
            capacity = m.capacity();
        }
        assert_eq!(m.stored(), 10);
        assert_eq!(m.capacity(), 16);
        for (i, expected) in (0..10u32).map(f64::from).enumerate() {
            assert_eq!(m.get(i).unwrap(), expected);
        }
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut m = Measurements::with_capacity(0);
        assert_eq!(m.capacity(), 1);
        m.add(1.0);
        m.add(2.0);
        assert_eq!(m.capacity(), 2);
    }

    #[test]
    fn empty_statistics_are_errors() {
        let m = Measurements::new();
        assert_eq!(m.mean(), Err(StatsError::Empty));
        assert_eq!(m.min(), Err(StatsError::Empty));
        assert_eq!(m.max(), Err(StatsError::Empty));
        assert_eq!(m.std_dev(), Err(StatsError::Empty));
    }

    #[test]
    fn get_past_end_is_error() {
        let m = sample();
        assert_eq!(
            m.get(5),
            Err(StatsError::IndexOutOfRange { index: 5, stored: 5 })
        );
    }

    #[test]
    fn display_lists_values() {
        assert_eq!(sample().to_string(), "[3.0, 1.0, 4.0, 1.0, 5.0]");
        assert_eq!(Measurements::new().to_string(), "[]");
    }
}
