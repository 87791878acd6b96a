use props_core::{ErrorInfo, PropsError};
use props_estimators::yamamoto::{DEFAULT_DELTA, DEFAULT_MIN_DELTA, DEFAULT_TOLERANCE};
use props_estimators::FiniteDifference;
use serde::{Deserialize, Serialize};

/// Settings read by the finite-difference kinetic estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertiesConfig {
    /// Initial displacement; negative enables adaptive halving.
    #[serde(default = "default_fd_delta")]
    pub fd_delta: f64,
    /// Tolerance on the symmetric-displacement error.
    #[serde(default = "default_fd_error")]
    pub fd_error: f64,
    /// Smallest displacement adaptation may reach.
    #[serde(default = "default_min_fd")]
    pub min_fd: f64,
}

fn default_fd_delta() -> f64 {
    -DEFAULT_DELTA
}

fn default_fd_error() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_min_fd() -> f64 {
    DEFAULT_MIN_DELTA
}

impl Default for PropertiesConfig {
    fn default() -> Self {
        Self {
            fd_delta: default_fd_delta(),
            fd_error: default_fd_error(),
            min_fd: default_min_fd(),
        }
    }
}

impl PropertiesConfig {
    /// Parses a YAML document and validates the result. Missing fields take
    /// their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, PropsError> {
        let config: Self = serde_yaml::from_str(contents).map_err(|err| {
            PropsError::Config(ErrorInfo::new("yaml-deserialize", err.to_string()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialises the configuration as YAML.
    pub fn to_yaml_string(&self) -> Result<String, PropsError> {
        serde_yaml::to_string(self)
            .map_err(|err| PropsError::Config(ErrorInfo::new("yaml-serialize", err.to_string())))
    }

    /// Rejects values the estimator cannot run with.
    pub fn validate(&self) -> Result<(), PropsError> {
        self.finite_difference().validate()
    }

    /// Estimator parameters described by this configuration.
    pub fn finite_difference(&self) -> FiniteDifference {
        FiniteDifference {
            delta: self.fd_delta,
            tolerance: self.fd_error,
            min_delta: self.min_fd,
        }
    }
}
