//! Inference for the neural option-pricing surrogates: the fixed `d → 64 → 64 → 1` tanh
//! architectures, their parameter files, and batch evaluation over price grids.

pub mod arch;
pub mod error;
pub mod loader;
mod model_set;
mod predict;
pub mod surface;
mod variant;

pub use arch::PricingNet;
pub use error::{LoadError, Mismatch, PricingErr, Result};
pub use loader::{load, save};
pub use model_set::ModelSet;
pub use predict::{evaluate, predict};
pub use variant::{MarketParams, UnknownVariant, Variant};
