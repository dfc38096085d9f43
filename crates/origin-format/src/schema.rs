//! Run file schema and loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// Top-level run specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    /// Run name, used only in logs.
    #[serde(default)]
    pub name: String,
    pub grid: GridSpec,
    /// Fields in declaration order.
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub cross_couplings: Vec<CrossCouplingSpec>,
    /// Non-cancellation constraint; absent means an unconstrained run.
    #[serde(default)]
    pub constraint: Option<ConstraintSpec>,
    pub integration: IntegrationSpec,
    #[serde(default)]
    pub initial: InitialSpec,
}

/// Lattice configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Sites per axis.
    pub dims: Vec<usize>,
    #[serde(default = "default_wave_speed")]
    pub wave_speed: f64,
}

fn default_wave_speed() -> f64 {
    1.0
}

/// One complex field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub mass: f64,
    #[serde(default)]
    pub self_coupling: f64,
}

/// Quartic coupling `g·|a|²|b|²` between two named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossCouplingSpec {
    pub a: String,
    pub b: String,
    pub g: f64,
}

/// Constraint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    pub epsilon: f64,
    /// Reference amplitude as `[re, im]`.
    #[serde(default)]
    pub reference: [f64; 2],
    pub combination: Vec<TermSpec>,
    #[serde(default)]
    pub policy: PolicySpec,
}

/// One term of the constrained combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermSpec {
    pub field: String,
    #[serde(default = "default_coefficient")]
    pub coefficient: f64,
}

fn default_coefficient() -> f64 {
    1.0
}

/// How a correcting shift is split between fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicySpec {
    #[default]
    EvenSplit,
    /// The named field absorbs the whole shift.
    SingleField(String),
}

/// Time stepping schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationSpec {
    pub dt: f64,
    pub steps: usize,
    /// Take a diagnostic sample every this many steps.
    #[serde(default = "default_sample_every")]
    pub sample_every: usize,
}

fn default_sample_every() -> usize {
    1
}

/// Initial condition generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialSpec {
    #[serde(default)]
    pub kind: InitialKind,
    /// Standard deviation of each real component.
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_mean_subtract")]
    pub mean_subtract: bool,
}

fn default_amplitude() -> f64 {
    1e-3
}

fn default_mean_subtract() -> bool {
    true
}

impl Default for InitialSpec {
    fn default() -> Self {
        Self {
            kind: InitialKind::default(),
            amplitude: default_amplitude(),
            seed: 0,
            mean_subtract: default_mean_subtract(),
        }
    }
}

/// Initial condition kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InitialKind {
    /// Independent complex Gaussian noise on every field.
    #[default]
    GaussianNoise,
    /// All fields start at zero.
    Zero,
}

impl RunSpec {
    /// Parse and validate a run from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        let spec: RunSpec = serde_json::from_str(json)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load and validate a run file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the run as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check every parameter and build each core object once.
    pub fn validate(&self) -> Result<()> {
        self.check_schedule()?;
        let fields = self.build_fields(self.build_grid()?)?;
        self.build_potential()?;
        self.build_constraint(&fields)?;
        Ok(())
    }

    /// Check the integration schedule and initial-condition parameters.
    ///
    /// These are the only values the `build_*` methods do not check
    /// themselves.
    pub fn check_schedule(&self) -> Result<()> {
        let dt = self.integration.dt;
        if !dt.is_finite() || dt <= 0.0 {
            return Err(FormatError::InvalidParameter(format!(
                "integration.dt must be finite and positive, got {dt}"
            )));
        }
        if self.integration.sample_every == 0 {
            return Err(FormatError::InvalidParameter(
                "integration.sample_every must be at least 1".to_string(),
            ));
        }
        let amplitude = self.initial.amplitude;
        if !amplitude.is_finite() || amplitude < 0.0 {
            return Err(FormatError::InvalidParameter(format!(
                "initial.amplitude must be finite and non-negative, got {amplitude}"
            )));
        }
        Ok(())
    }

    /// Position of a field in declaration order.
    pub fn field_index(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| FormatError::UnknownField(name.to_string()))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}
