//! Gyroscope smoothing.
//!
//! An exponential moving average applied per axis. Each update moves the
//! filtered value 20% of the way toward the new raw sample and truncates the
//! result to `i16`, so the filter settles within a few counts of a constant
//! input rather than exactly on it.

#![deny(static_mut_refs)]

use crate::types::Vec3;

/// Fraction of the remaining distance covered per sample.
pub const GYRO_SMOOTHING_FACTOR: f64 = 0.2;

/// Running state of the gyroscope filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GyroSmoother {
    filtered: Vec3,
}

impl GyroSmoother {
    pub const fn new() -> Self {
        Self {
            filtered: Vec3::ZERO,
        }
    }

    /// Seed the filter from a previously published value.
    pub const fn with_seed(seed: Vec3) -> Self {
        Self { filtered: seed }
    }

    /// Feed one raw sample and return the new filtered value.
    pub fn update(&mut self, raw: Vec3) -> Vec3 {
        self.filtered = Vec3 {
            x: smooth_axis(self.filtered.x, raw.x),
            y: smooth_axis(self.filtered.y, raw.y),
            z: smooth_axis(self.filtered.z, raw.z),
        };
        self.filtered
    }

    pub fn current(&self) -> Vec3 {
        self.filtered
    }

    pub fn reset(&mut self) {
        self.filtered = Vec3::ZERO;
    }
}

/// One filter step on a single axis. The `as` cast truncates toward zero and
/// saturates, which keeps the result inside `i16` for every input pair.
fn smooth_axis(filtered: i16, raw: i16) -> i16 {
    let filtered = f64::from(filtered);
    let next = filtered + (f64::from(raw) - filtered) * GYRO_SMOOTHING_FACTOR;
    next as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_step_moves_twenty_percent() -> Result<(), Box<dyn std::error::Error>> {
        let mut smoother = GyroSmoother::new();
        let out = smoother.update(Vec3::new(1000, -1000, 0));
        assert_eq!(out, Vec3::new(200, -200, 0));
        Ok(())
    }

    #[test]
    fn test_sequence_truncates_each_step() -> Result<(), Box<dyn std::error::Error>> {
        let mut smoother = GyroSmoother::new();
        let xs: Vec<i16> = (0..4)
            .map(|_| smoother.update(Vec3::new(1000, 0, 0)).x)
            .collect();
        // 200, 360, 488, 590.4 -> 590
        assert_eq!(xs, vec![200, 360, 488, 590]);
        Ok(())
    }

    #[test]
    fn test_seeded_filter_starts_from_seed() -> Result<(), Box<dyn std::error::Error>> {
        let mut smoother = GyroSmoother::with_seed(Vec3::new(100, 100, 100));
        let out = smoother.update(Vec3::new(100, 200, 0));
        assert_eq!(out, Vec3::new(100, 120, 80));
        Ok(())
    }

    #[test]
    fn test_extremes_do_not_overflow() -> Result<(), Box<dyn std::error::Error>> {
        let mut smoother = GyroSmoother::with_seed(Vec3::new(i16::MIN, i16::MAX, 0));
        let out = smoother.update(Vec3::new(i16::MAX, i16::MIN, i16::MAX));
        assert!(out.x > i16::MIN);
        assert!(out.y < i16::MAX);
        Ok(())
    }

    #[test]
    fn test_reset_clears_state() -> Result<(), Box<dyn std::error::Error>> {
        let mut smoother = GyroSmoother::new();
        smoother.update(Vec3::new(500, 500, 500));
        smoother.reset();
        assert_eq!(smoother.current(), Vec3::ZERO);
        Ok(())
    }
}
