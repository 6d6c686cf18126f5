//! # Configuration
//! Parameters of the iteration controller and of the demo run.
//!
//! All structs deserialize from json, missing keys take their
//! default value.
use crate::solver::SolverKind;
use crate::types::DomainSize;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How bad sub-solves are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    /// Thresholds depend on warm-up, continuity may freeze as well
    FixTimeStep,
    /// Every bad momentum solve freezes, continuity is never bad
    Iterative,
}

impl Default for FallbackMode {
    fn default() -> Self {
        Self::FixTimeStep
    }
}

/// Thresholds of the fallback policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackThresholds {
    /// Minimum tolerance used during warm-up
    pub warm_up_tolerance: f64,
    /// Number of time steps of the warm-up
    pub warm_up_steps: usize,
    /// Minimum tolerance of the momentum error
    pub momentum_tolerance: f64,
    /// Momentum error above which the step freezes
    pub momentum_freeze: f64,
    /// Minimum tolerance of the continuity error
    pub continuity_tolerance: f64,
    /// Continuity error above which the step freezes
    pub continuity_freeze: f64,
    /// Minimum tolerance of [`FallbackMode::Iterative`]
    pub iterative_tolerance: f64,
}

impl Default for FallbackThresholds {
    fn default() -> Self {
        Self {
            warm_up_tolerance: 10.,
            warm_up_steps: 10,
            momentum_tolerance: 0.005,
            momentum_freeze: 0.05,
            continuity_tolerance: 0.01,
            continuity_freeze: 0.9999,
            iterative_tolerance: 0.99999,
        }
    }
}

/// Parameters of the fractional step strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    /// Relative tolerance of the momentum solve
    pub velocity_tolerance: f64,
    /// Relative tolerance of the continuity solve
    pub pressure_tolerance: f64,
    /// Maximum number of iterations per time step
    pub max_iterations: usize,
    /// Spatial dimension
    pub domain_size: DomainSize,
    /// Rebuild the dof sets of both sub-solvers every time step
    pub reform_dof_set: bool,
    /// Treatment of bad sub-solves
    pub fallback: FallbackMode,
    /// Thresholds of the fallback policy
    pub thresholds: FallbackThresholds,
    /// Linear solver backend of the reference sub-solvers
    pub linear_solver: SolverKind,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            velocity_tolerance: 1e-4,
            pressure_tolerance: 1e-4,
            max_iterations: 10,
            domain_size: DomainSize::Two,
            reform_dof_set: true,
            fallback: FallbackMode::default(),
            thresholds: FallbackThresholds::default(),
            linear_solver: SolverKind::default(),
        }
    }
}

impl StrategyConfig {
    /// Load configuration from json file and validate it
    ///
    /// # Errors
    /// File can not be read, is no valid json or fails [`Self::validate`]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    ///
    /// # Errors
    /// First invalid parameter
    pub fn validate(&self) -> Result<()> {
        if !(self.velocity_tolerance > 0.) {
            return Err(Error::config(
                "velocity_tolerance",
                self.velocity_tolerance,
                "must be positive",
            ));
        }
        if !(self.pressure_tolerance > 0.) {
            return Err(Error::config(
                "pressure_tolerance",
                self.pressure_tolerance,
                "must be positive",
            ));
        }
        if self.max_iterations == 0 {
            return Err(Error::config(
                "max_iterations",
                self.max_iterations,
                "at least one iteration is required",
            ));
        }
        let t = &self.thresholds;
        for (key, value) in [
            ("thresholds.warm_up_tolerance", t.warm_up_tolerance),
            ("thresholds.momentum_tolerance", t.momentum_tolerance),
            ("thresholds.momentum_freeze", t.momentum_freeze),
            ("thresholds.continuity_tolerance", t.continuity_tolerance),
            ("thresholds.continuity_freeze", t.continuity_freeze),
            ("thresholds.iterative_tolerance", t.iterative_tolerance),
        ] {
            if !(value > 0.) {
                return Err(Error::config(key, value, "must be positive"));
            }
        }
        if t.momentum_freeze < t.momentum_tolerance {
            return Err(Error::config(
                "thresholds.momentum_freeze",
                t.momentum_freeze,
                "must not be below momentum_tolerance",
            ));
        }
        if t.continuity_freeze < t.continuity_tolerance {
            return Err(Error::config(
                "thresholds.continuity_freeze",
                t.continuity_freeze,
                "must not be below continuity_tolerance",
            ));
        }
        Ok(())
    }
}

/// Parameters of the lid driven cavity demo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of cells in x
    pub nx: usize,
    /// Number of cells in y
    pub ny: usize,
    /// Length of the cavity
    pub length: f64,
    /// Height of the cavity
    pub height: f64,
    /// Kinematic viscosity
    pub viscosity: f64,
    /// Density
    pub density: f64,
    /// Velocity of the lid
    pub lid_velocity: f64,
    /// Time step size
    pub dt: f64,
    /// Final time
    pub max_time: f64,
    /// Interval between snapshots, no output if `None`
    pub save_intervall: Option<f64>,
    /// Amplitude of the initial random velocity disturbance
    pub disturbance: f64,
    /// Parameters of the iteration controller
    pub strategy: StrategyConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            nx: 16,
            ny: 16,
            length: 1.,
            height: 1.,
            viscosity: 1e-2,
            density: 1.,
            lid_velocity: 1.,
            dt: 1e-2,
            max_time: 1.,
            save_intervall: Some(0.5),
            disturbance: 0.,
            strategy: StrategyConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from json file and validate it
    ///
    /// # Errors
    /// File can not be read, is no valid json or fails [`Self::validate`]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check parameter ranges
    ///
    /// # Errors
    /// First invalid parameter
    pub fn validate(&self) -> Result<()> {
        if self.nx == 0 || self.ny == 0 {
            return Err(Error::config(
                "nx, ny",
                format!("{}, {}", self.nx, self.ny),
                "need at least one cell per direction",
            ));
        }
        for (key, value) in [
            ("length", self.length),
            ("height", self.height),
            ("viscosity", self.viscosity),
            ("density", self.density),
            ("dt", self.dt),
        ] {
            if !(value > 0.) {
                return Err(Error::config(key, value, "must be positive"));
            }
        }
        if self.strategy.domain_size != DomainSize::Two {
            return Err(Error::config(
                "strategy.domain_size",
                usize::from(self.strategy.domain_size),
                "the cavity is two dimensional",
            ));
        }
        self.strategy.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config: StrategyConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StrategyConfig::default());
        assert_eq!(config.thresholds.momentum_freeze, 0.05);
        assert_eq!(config.thresholds.continuity_freeze, 0.9999);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SimulationConfig::default();
        config.strategy.fallback = FallbackMode::Iterative;
        config.strategy.domain_size = DomainSize::Two;
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"iterative\""));
        let back: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"max_iterations": 3, "domain_size": 3, "thresholds": {"warm_up_steps": 2}}"#;
        let config: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_iterations, 3);
        assert_eq!(config.domain_size, DomainSize::Three);
        assert_eq!(config.thresholds.warm_up_steps, 2);
        assert_eq!(config.thresholds.warm_up_tolerance, 10.);
    }

    #[test]
    fn test_invalid_domain_size() {
        let json = r#"{"domain_size": 4}"#;
        assert!(serde_json::from_str::<StrategyConfig>(json).is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = StrategyConfig::default();
        config.max_iterations = 0;
        assert!(matches!(config.validate(), Err(Error::Config { .. })));
        let mut config = StrategyConfig::default();
        config.velocity_tolerance = f64::NAN;
        assert!(config.validate().is_err());
        let mut config = StrategyConfig::default();
        config.thresholds.momentum_freeze = 1e-4;
        assert!(config.validate().is_err());
    }
}
