use std::path::{Path, PathBuf};

use anyhow::{Context, bail, ensure};
use pricing_model::{ModelSet, Variant};
use serde::{Deserialize, Serialize};

/// The range a user input may take and the value used when none is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl Bounds {
    pub const fn new(min: f32, max: f32, default: f32) -> Self {
        Self { min, max, default }
    }

    /// Returns `value`, or the default when it's `None`, after checking it lies within the
    /// bounds.
    pub fn resolve(&self, what: &str, value: Option<f32>) -> anyhow::Result<f32> {
        let value = value.unwrap_or(self.default);
        if !(self.min..=self.max).contains(&value) {
            bail!(
                "{what} must be within [{}, {}], got {value}",
                self.min,
                self.max
            );
        }

        Ok(value)
    }

    fn validate(&self, what: &str) -> anyhow::Result<()> {
        ensure!(
            self.min < self.max,
            "{what}: min ({}) must be below max ({})",
            self.min,
            self.max
        );
        ensure!(
            (self.min..=self.max).contains(&self.default),
            "{what}: default ({}) must be within [{}, {}]",
            self.default,
            self.min,
            self.max
        );
        Ok(())
    }
}

/// Settings of the pricing demo, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Model used when a command doesn't name one.
    pub default_model: Variant,
    pub model_dir: PathBuf,
    pub black_scholes_file: String,
    pub heston_file: String,
    pub spot: Bounds,
    pub maturity: Bounds,
    pub volatility: Bounds,
    pub surface_points: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            default_model: Variant::BlackScholes,
            model_dir: PathBuf::from("saved_models"),
            black_scholes_file: "black_scholes_model.safetensors".into(),
            heston_file: "heston_model.safetensors".into(),
            spot: Bounds::new(1.0, 200.0, 100.0),
            maturity: Bounds::new(0.01, 1.0, 0.5),
            volatility: Bounds::new(0.01, 0.5, 0.04),
            surface_points: 50,
        }
    }
}

impl DemoConfig {
    /// Loads and validates a `DemoConfig` from a JSON file.
    ///
    /// # Errors
    /// If the file can't be read, isn't valid JSON for this struct, or fails validation.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("invalid config '{}'", path.display()))?;

        config.validate()?;
        log::debug!("loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.spot.validate("spot")?;
        self.maturity.validate("maturity")?;
        self.volatility.validate("volatility")?;
        ensure!(
            self.surface_points >= 2,
            "surface_points must be at least 2, got {}",
            self.surface_points
        );
        Ok(())
    }

    /// Returns where the parameter file of `variant` is expected.
    pub fn model_path(&self, variant: Variant) -> PathBuf {
        let file = match variant {
            Variant::BlackScholes => &self.black_scholes_file,
            Variant::Heston => &self.heston_file,
        };

        self.model_dir.join(file)
    }

    /// Returns a model set pointing at every configured parameter file.
    pub fn model_set(&self) -> ModelSet {
        ModelSet::new(Variant::ALL.map(|variant| (variant, self.model_path(variant))))
    }
}
