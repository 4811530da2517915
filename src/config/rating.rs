//! Rating system configuration

use crate::error::{RankingError, Result};
use serde::{Deserialize, Serialize};
use skillratings::elo::{EloConfig, EloRating};

/// ELO parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatingSettings {
    /// Maximum rating change per match up
    pub k_factor: f64,
    /// Rating given to an item the first time it is seen
    pub initial_rating: f64,
}

impl Default for RatingSettings {
    fn default() -> Self {
        Self {
            k_factor: EloConfig::new().k,
            initial_rating: EloRating::new().rating,
        }
    }
}

impl RatingSettings {
    /// Build the skillratings configuration
    pub fn elo_config(&self) -> EloConfig {
        EloConfig { k: self.k_factor }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !self.k_factor.is_finite() || self.k_factor <= 0.0 {
            return Err(RankingError::ConfigurationError {
                message: "K factor must be positive".to_string(),
            }
            .into());
        }

        if !self.initial_rating.is_finite() {
            return Err(RankingError::ConfigurationError {
                message: "Initial rating must be finite".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_conventional_elo() {
        let settings = RatingSettings::default();
        assert_eq!(settings.k_factor, 32.0);
        assert_eq!(settings.initial_rating, 1000.0);
        assert_eq!(settings.elo_config().k, 32.0);
    }

    #[test]
    fn test_validation() {
        assert!(RatingSettings::default().validate().is_ok());

        let negative_k = RatingSettings {
            k_factor: -4.0,
            ..Default::default()
        };
        assert!(negative_k.validate().is_err());

        let nan_rating = RatingSettings {
            initial_rating: f64::NAN,
            ..Default::default()
        };
        assert!(nan_rating.validate().is_err());
    }
}
