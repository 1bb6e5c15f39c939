//! Adaptive gain control parameters.

use crate::error::{Result, VisualizerError};

/// Per-band adaptive gain parameters
#[derive(Debug, Clone, PartialEq)]
pub struct GainConfig {
    /// Fractional gain step per cycle (0.1 = 10% up or down)
    pub adapt_speed: f32,

    /// Lower gain clamp
    pub min_gain: f32,

    /// Upper gain clamp
    pub max_gain: f32,

    /// Scaled level above which a band's gain decays
    pub saturation_threshold: f32,

    /// Scaled level below which a band's gain grows
    pub target_level: f32,
}

impl Default for GainConfig {
    fn default() -> Self {
        Self {
            adapt_speed: 0.1,
            min_gain: 0.5,
            max_gain: 10.0,
            saturation_threshold: 0.95,
            target_level: 0.7,
        }
    }
}

impl GainConfig {
    /// Validate ranges: speed in (0, 1], 0 < min <= max, 0 < target < saturation <= 1
    pub fn validate(&self) -> Result<()> {
        if !(self.adapt_speed > 0.0 && self.adapt_speed <= 1.0) {
            return Err(VisualizerError::InvalidConfig(format!(
                "Adapt speed must be in (0, 1], got {}",
                self.adapt_speed
            )));
        }
        if !(self.min_gain > 0.0 && self.min_gain.is_finite()) {
            return Err(VisualizerError::InvalidConfig(format!(
                "Minimum gain must be > 0, got {}",
                self.min_gain
            )));
        }
        if !(self.max_gain >= self.min_gain && self.max_gain.is_finite()) {
            return Err(VisualizerError::InvalidConfig(format!(
                "Maximum gain must be >= minimum gain ({}), got {}",
                self.min_gain, self.max_gain
            )));
        }
        if !(self.saturation_threshold > 0.0 && self.saturation_threshold <= 1.0) {
            return Err(VisualizerError::InvalidConfig(format!(
                "Saturation threshold must be in (0, 1], got {}",
                self.saturation_threshold
            )));
        }
        if !(self.target_level > 0.0 && self.target_level < self.saturation_threshold) {
            return Err(VisualizerError::InvalidConfig(format!(
                "Target level must be in (0, {}), got {}",
                self.saturation_threshold, self.target_level
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(GainConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_gain_above_max_rejected() {
        let config = GainConfig {
            min_gain: 5.0,
            max_gain: 1.0,
            ..GainConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("Maximum gain"));
    }

    #[test]
    fn test_equal_gain_bounds_accepted() {
        let config = GainConfig {
            min_gain: 2.0,
            max_gain: 2.0,
            ..GainConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_adapt_speed_range() {
        for speed in [0.0, -0.1, 1.5, f32::NAN] {
            let config = GainConfig {
                adapt_speed: speed,
                ..GainConfig::default()
            };
            assert!(config.validate().is_err(), "speed {} accepted", speed);
        }

        let full_step = GainConfig {
            adapt_speed: 1.0,
            ..GainConfig::default()
        };
        assert!(full_step.validate().is_ok());
    }

    #[test]
    fn test_target_must_sit_below_saturation() {
        let config = GainConfig {
            target_level: 0.95,
            saturation_threshold: 0.95,
            ..GainConfig::default()
        };
        assert!(config.validate().is_err());

        let config = GainConfig {
            saturation_threshold: 1.2,
            ..GainConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
