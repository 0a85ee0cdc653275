//! Run configuration for cost evaluation and VQE.
//!
//! Supports loading configuration from:
//! 1. YAML files (JSON is accepted by the same parser)
//! 2. Environment variables (with `VQA_` prefix)
//!
//! Precedence (highest to lowest): environment, file, defaults.
//!
//! ```yaml
//! hamiltonian:
//!   - { coefficient: 0.5, pauli: "IZZ" }
//!   - { coefficient: -0.3, pauli: "ZZI" }
//! ansatz: { kind: two_local, reps: 1 }
//! shots: 10000
//! seed: 7
//! optimizer: { kind: cobyla, maxiter: 100, tol: 1.0e-6 }
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::ansatz::{HardwareEfficient, RyAnsatz, TwoLocal};
use crate::cost::DEFAULT_SHOTS;
use crate::hamiltonian::{PauliTerm, WeightedHamiltonian};
use crate::objective::Ansatz;
use crate::optimizer::{Cobyla, OptimizerKind, Spsa};
use crate::pauli::PauliString;

/// Complete run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Weighted Pauli terms of the cost operator.
    #[serde(default)]
    pub hamiltonian: Vec<TermConfig>,

    /// State-preparation template.
    #[serde(default)]
    pub ansatz: AnsatzConfig,

    /// Shots per term
    #[serde(default = "default_shots")]
    pub shots: u32,

    /// Seed for the simulator and initial parameters
    #[serde(default)]
    pub seed: Option<u64>,

    /// Evaluate terms in parallel
    #[serde(default)]
    pub parallel: bool,

    /// Classical optimizer settings.
    #[serde(default)]
    pub optimizer: OptimizerConfig,
}

/// One Hamiltonian term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermConfig {
    /// Real part of the weight.
    pub coefficient: f64,
    /// Imaginary part of the weight.
    #[serde(default)]
    pub imag: f64,
    /// Pauli label string, e.g. `"XIZ"`.
    pub pauli: String,
}

/// Ansatz family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsatzKind {
    /// Single Ry layer.
    Ry,
    /// Ry layers with CZ entanglers.
    TwoLocal,
    /// Ry·Rz layers with CZ entanglers.
    HardwareEfficient,
}

/// Ansatz settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnsatzConfig {
    /// Template family
    #[serde(default = "default_ansatz_kind")]
    pub kind: AnsatzKind,

    /// Entangling layers (ignored for `ry`)
    #[serde(default = "default_reps")]
    pub reps: usize,
}

/// Optimizer family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizerChoice {
    /// Trust-region simplex.
    Cobyla,
    /// Simultaneous perturbation.
    Spsa,
}

impl FromStr for OptimizerChoice {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cobyla" => Ok(OptimizerChoice::Cobyla),
            "spsa" => Ok(OptimizerChoice::Spsa),
            other => Err(ConfigError::Validation(format!("Unknown optimizer: {other}"))),
        }
    }
}

/// Optimizer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Optimizer family
    #[serde(default = "default_optimizer")]
    pub kind: OptimizerChoice,

    /// Maximum iterations
    #[serde(default = "default_maxiter")]
    pub maxiter: usize,

    /// Convergence tolerance
    #[serde(default = "default_tol")]
    pub tol: f64,
}

fn default_shots() -> u32 {
    DEFAULT_SHOTS
}

fn default_ansatz_kind() -> AnsatzKind {
    AnsatzKind::TwoLocal
}

fn default_reps() -> usize {
    1
}

fn default_optimizer() -> OptimizerChoice {
    OptimizerChoice::Cobyla
}

fn default_maxiter() -> usize {
    100
}

fn default_tol() -> f64 {
    1e-6
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            hamiltonian: Vec::new(),
            ansatz: AnsatzConfig::default(),
            shots: default_shots(),
            seed: None,
            parallel: false,
            optimizer: OptimizerConfig::default(),
        }
    }
}

impl Default for AnsatzConfig {
    fn default() -> Self {
        AnsatzConfig {
            kind: default_ansatz_kind(),
            reps: default_reps(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfig {
            kind: default_optimizer(),
            maxiter: default_maxiter(),
            tol: default_tol(),
        }
    }
}

impl RunConfig {
    /// Load and validate a configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::read(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML (or JSON) text.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config = Self::parse(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with the following precedence:
    /// 1. Load from file if provided
    /// 2. Apply environment variable overrides
    /// 3. Validate the result
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match config_file {
            Some(path) => Self::read(path)?,
            None => RunConfig::default(),
        };
        let config = config.merge_env();
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {e}", path.display())))?;
        Self::parse(&contents)
    }

    fn parse(contents: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Merge `VQA_*` environment variables into this configuration.
    pub fn merge_env(self) -> Self {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// Merge overrides from `lookup`.
    ///
    /// Only keys that are present and parse override the current values;
    /// absent or unparsable keys leave the fields unchanged.
    pub fn merge_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("VQA_SHOTS").and_then(|v| v.parse().ok()) {
            self.shots = v;
        }
        if let Some(v) = lookup("VQA_SEED").and_then(|v| v.parse().ok()) {
            self.seed = Some(v);
        }
        if let Some(v) = lookup("VQA_PARALLEL").and_then(|v| v.parse().ok()) {
            self.parallel = v;
        }
        if let Some(v) = lookup("VQA_MAXITER").and_then(|v| v.parse().ok()) {
            self.optimizer.maxiter = v;
        }
        if let Some(v) = lookup("VQA_OPTIMIZER").and_then(|v| v.parse().ok()) {
            self.optimizer.kind = v;
        }
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shots == 0 {
            return Err(ConfigError::Validation(
                "shots must be greater than 0".to_string(),
            ));
        }
        if self.hamiltonian.is_empty() {
            return Err(ConfigError::Validation(
                "hamiltonian must contain at least one term".to_string(),
            ));
        }
        self.hamiltonian()?;

        if self.ansatz.kind != AnsatzKind::Ry && self.ansatz.reps == 0 {
            return Err(ConfigError::Validation(
                "ansatz reps must be at least 1".to_string(),
            ));
        }
        if self.optimizer.maxiter == 0 {
            return Err(ConfigError::Validation(
                "optimizer maxiter must be greater than 0".to_string(),
            ));
        }
        if !self.optimizer.tol.is_finite() || self.optimizer.tol < 0.0 {
            return Err(ConfigError::Validation(format!(
                "Invalid optimizer tolerance: {}",
                self.optimizer.tol
            )));
        }
        Ok(())
    }

    /// Build the cost operator.
    pub fn hamiltonian(&self) -> Result<WeightedHamiltonian, ConfigError> {
        let terms = self
            .hamiltonian
            .iter()
            .map(|t| {
                let pauli = PauliString::parse(&t.pauli)
                    .map_err(|e| ConfigError::Validation(e.to_string()))?;
                Ok(PauliTerm::new(Complex64::new(t.coefficient, t.imag), pauli))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        WeightedHamiltonian::new(terms).map_err(|e| ConfigError::Validation(e.to_string()))
    }

    /// Build the ansatz sized to the Hamiltonian.
    pub fn ansatz(&self) -> Result<Box<dyn Ansatz>, ConfigError> {
        let n = self.hamiltonian()?.num_qubits().unwrap_or(0);
        let reps = self.ansatz.reps;
        let built: Box<dyn Ansatz> = match self.ansatz.kind {
            AnsatzKind::Ry => Box::new(RyAnsatz::new(n).map_err(invalid)?),
            AnsatzKind::TwoLocal => Box::new(TwoLocal::new(n, reps).map_err(invalid)?),
            AnsatzKind::HardwareEfficient => {
                Box::new(HardwareEfficient::new(n, reps).map_err(invalid)?)
            }
        };
        Ok(built)
    }

    /// Build the optimizer.
    pub fn optimizer(&self) -> OptimizerKind {
        let OptimizerConfig { kind, maxiter, tol } = self.optimizer;
        match kind {
            OptimizerChoice::Cobyla => {
                OptimizerKind::Cobyla(Cobyla::new().with_maxiter(maxiter).with_tol(tol))
            }
            OptimizerChoice::Spsa => {
                OptimizerKind::Spsa(Spsa::new().with_maxiter(maxiter).with_tol(tol))
            }
        }
    }
}

fn invalid(e: crate::error::VqaError) -> ConfigError {
    ConfigError::Validation(e.to_string())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The file could not be read.
    #[error("IO error: {0}")]
    Io(String),

    /// The file is not valid YAML for this schema.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A value is out of range or inconsistent.
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    const SAMPLE: &str = r#"
hamiltonian:
  - { coefficient: 0.5, pauli: "IZZ" }
  - { coefficient: -0.3, imag: 0.0, pauli: "zzi" }
  - { coefficient: 1.2, pauli: "ZIZ" }
ansatz: { kind: hardware_efficient, reps: 2 }
shots: 2048
seed: 7
optimizer: { kind: spsa, maxiter: 50 }
"#;

    #[test]
    fn test_parse_sample() {
        let config = RunConfig::from_yaml_str(SAMPLE).unwrap();
        assert_eq!(config.shots, 2048);
        assert_eq!(config.seed, Some(7));
        assert!(!config.parallel);
        assert_eq!(config.ansatz.kind, AnsatzKind::HardwareEfficient);
        assert_eq!(config.optimizer.kind, OptimizerChoice::Spsa);
        assert_eq!(config.optimizer.tol, 1e-6);

        let h = config.hamiltonian().unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h.terms()[1].pauli.to_string(), "ZZI");

        let ansatz = config.ansatz().unwrap();
        assert_eq!(ansatz.num_qubits(), 3);
        assert_eq!(ansatz.num_parameters(), 18);
        assert_eq!(config.optimizer().name(), "spsa");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config =
            RunConfig::from_yaml_str("hamiltonian: [{coefficient: 1.0, pauli: Z}]").unwrap();
        assert_eq!(config.shots, DEFAULT_SHOTS);
        assert_eq!(config.ansatz, AnsatzConfig::default());
        assert_eq!(config.optimizer, OptimizerConfig::default());
    }

    #[test]
    fn test_json_is_accepted() {
        let json = r#"{"hamiltonian": [{"coefficient": 2.0, "pauli": "XX"}], "shots": 10}"#;
        let config = RunConfig::from_yaml_str(json).unwrap();
        assert_eq!(config.shots, 10);
    }

    #[test]
    fn test_validation_errors() {
        let mut config = RunConfig::from_yaml_str(SAMPLE).unwrap();
        config.shots = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let mut config = RunConfig::from_yaml_str(SAMPLE).unwrap();
        config.hamiltonian[0].pauli = "ZQ".to_string();
        assert!(config.validate().is_err());

        let mut config = RunConfig::from_yaml_str(SAMPLE).unwrap();
        config.hamiltonian[0].pauli = "ZZZZ".to_string();
        assert!(config.validate().is_err());

        let mut config = RunConfig::from_yaml_str(SAMPLE).unwrap();
        config.ansatz.reps = 0;
        assert!(config.validate().is_err());
        config.ansatz.kind = AnsatzKind::Ry;
        assert!(config.validate().is_ok());

        assert!(RunConfig::default().validate().is_err());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RunConfig::from_yaml_str("shots: [not a number"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            RunConfig::from_yaml_str("ansatz: { kind: banana }"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("VQA_SHOTS", "512"),
            ("VQA_SEED", "99"),
            ("VQA_PARALLEL", "true"),
            ("VQA_MAXITER", "not-a-number"),
            ("VQA_OPTIMIZER", "COBYLA"),
        ]
        .into_iter()
        .collect();

        let config = RunConfig::from_yaml_str(SAMPLE)
            .unwrap()
            .merge_env_with(|k| env.get(k).map(|v| (*v).to_string()));
        assert_eq!(config.shots, 512);
        assert_eq!(config.seed, Some(99));
        assert!(config.parallel);
        assert_eq!(config.optimizer.maxiter, 50);
        assert_eq!(config.optimizer.kind, OptimizerChoice::Cobyla);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = RunConfig::from_file(file.path()).unwrap();
        assert_eq!(config.hamiltonian.len(), 3);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.yaml");
        assert!(matches!(
            RunConfig::from_file(&missing),
            Err(ConfigError::Io(_))
        ));
    }
}
